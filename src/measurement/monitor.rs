//! Interference monitoring during a timed run.

/// Watches the execution environment for activity that could contaminate
/// samples: scheduling stalls, background reclamation pauses, code
/// recompilation.
///
/// Reports are advisory. The sampler logs them at WARN and carries on;
/// interference never fails a measurement.
pub trait InterferenceMonitor {
    /// (Re)start watching. Called whenever the sampler restarts its
    /// memory sampling from scratch.
    fn start(&mut self);

    /// Stop watching, just before the final memory snapshot.
    fn stop(&mut self);

    /// Human-readable description of interference observed between the
    /// last `start` and `stop`, if any.
    fn report(&self) -> Option<String>;
}

/// A monitor that never reports interference.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmonitored;

impl InterferenceMonitor for Unmonitored {
    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn report(&self) -> Option<String> {
        None
    }
}
