//! Byte quantities and time rendering with fixed significant-figure rules.
//!
//! Both scales use the same rule: two decimal places below 10, one below
//! 100, integers above. Time scales from seconds down to picoseconds;
//! bytes from plain bytes up to exabytes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A non-negative byte quantity.
///
/// Values below 995 B render exactly; larger ones are scaled to the
/// nearest decimal unit (kB, MB, ... EB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bytes(u64);

impl Bytes {
    /// An exact byte count.
    pub const fn bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Kilobytes (decimal: 1 kB = 1,000 B).
    pub fn kilobytes(kilobytes: f64) -> Self {
        Self((kilobytes.max(0.0) * 1_000.0) as u64)
    }

    /// Megabytes (decimal).
    pub fn megabytes(megabytes: f64) -> Self {
        Self((megabytes.max(0.0) * 1_000_000.0) as u64)
    }

    /// Gigabytes (decimal).
    pub fn gigabytes(gigabytes: f64) -> Self {
        Self((gigabytes.max(0.0) * 1_000_000_000.0) as u64)
    }

    /// Terabytes (decimal).
    pub fn terabytes(terabytes: f64) -> Self {
        Self((terabytes.max(0.0) * 1_000_000_000_000.0) as u64)
    }

    /// Petabytes (decimal).
    pub fn petabytes(petabytes: f64) -> Self {
        Self((petabytes.max(0.0) * 1_000_000_000_000_000.0) as u64)
    }

    /// Exabytes (decimal).
    pub fn exabytes(exabytes: f64) -> Self {
        Self((exabytes.max(0.0) * 1_000_000_000_000_000_000.0) as u64)
    }

    /// The raw byte count.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Render the constructor call that would produce this quantity, for
    /// use in suggested assertion rewrites.
    pub(crate) fn suggested_constructor(self) -> String {
        if self.0 < 995 {
            return format!("Bytes::bytes({})", self.0);
        }
        let (significand, scale) = scale_decimal(self.0 as f64);
        const CONSTRUCTORS: [&str; 7] = [
            "bytes",
            "kilobytes",
            "megabytes",
            "gigabytes",
            "terabytes",
            "petabytes",
            "exabytes",
        ];
        format!("Bytes::{}({})", CONSTRUCTORS[scale], significand)
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 995 {
            return write!(f, "{}B", self.0);
        }
        let (significand, scale) = scale_decimal(self.0 as f64);
        const SCALES: [&str; 7] = ["", "k", "M", "G", "T", "P", "E"];
        write!(f, "{}{}B", significand, SCALES[scale])
    }
}

/// Scale a value down by thousands and render the significand with the
/// shared significant-figure rule.
fn scale_decimal(value: f64) -> (String, usize) {
    let mut scaled = value;
    let mut scale = 0usize;
    while scaled >= 999.0 && scale < 6 {
        scaled /= 1000.0;
        scale += 1;
    }
    (significand(scaled), scale)
}

/// Two decimal places below 10, one below 100, integers above.
fn significand(value: f64) -> String {
    if value < 9.995 {
        format!("{value:.2}")
    } else if value < 99.95 {
        format!("{value:.1}")
    } else {
        format!("{}", value.round() as i64)
    }
}

/// Render a nanosecond quantity with unit scaling from seconds down to
/// picoseconds. Values that scale below picoseconds fall back to
/// exponent notation.
pub fn format_nanos(nanos: f64) -> String {
    let nanos = nanos.max(0.0);
    if nanos == 0.0 {
        return "0s".to_string();
    }
    let mut time = nanos;
    let mut scale: i32 = -9;
    while time < 1.0 {
        time *= 1000.0;
        scale -= 3;
    }
    while time >= 999.0 && scale < 0 {
        time /= 1000.0;
        scale += 3;
    }
    let significand = significand(time);
    match scale {
        0 => format!("{significand} s"),
        -3 => format!("{significand} ms"),
        -6 => format!("{significand} μs"),
        -9 => format!("{significand} ns"),
        -12 => format!("{significand} ps"),
        _ => format!("{significand}e{scale} s"),
    }
}
