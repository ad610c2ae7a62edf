//! Metric verbosity levels

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI8, Ordering};

/// Importance of a metric, ordered like log levels.
///
/// `Disabled` sorts below every other level and, when configured, turns
/// everything off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i8)]
pub enum Level {
    /// Nothing is recorded
    Disabled = -1,
    /// Essential business metrics (SLA, errors, core counters)
    Critical = 0,
    /// Operational metrics (latency, throughput)
    #[default]
    Important = 1,
    /// Detailed breakdowns and internal state
    Debug = 2,
    /// Per-user and per-request detail, for troubleshooting
    Verbose = 3,
}

impl Level {
    /// Every level, lowest first
    pub const ALL: [Level; 5] = [
        Level::Disabled,
        Level::Critical,
        Level::Important,
        Level::Debug,
        Level::Verbose,
    ];

    /// Whether a metric declared at `self` is recorded under `configured`
    #[inline]
    pub fn enabled(self, configured: Level) -> bool {
        configured != Level::Disabled && self <= configured
    }

    /// Parse a level name, falling back to [`Level::Important`] on anything
    /// unrecognised
    pub fn parse(s: &str) -> Level {
        match s.trim().to_ascii_uppercase().as_str() {
            "DISABLED" => Level::Disabled,
            "CRITICAL" => Level::Critical,
            "IMPORTANT" => Level::Important,
            "DEBUG" => Level::Debug,
            "VERBOSE" => Level::Verbose,
            _ => Level::Important,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Disabled => "DISABLED",
            Level::Critical => "CRITICAL",
            Level::Important => "IMPORTANT",
            Level::Debug => "DEBUG",
            Level::Verbose => "VERBOSE",
        }
    }

    fn from_i8(raw: i8) -> Level {
        match raw {
            -1 => Level::Disabled,
            0 => Level::Critical,
            1 => Level::Important,
            2 => Level::Debug,
            3 => Level::Verbose,
            _ => Level::Important,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Level::parse(s))
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Accepted config encodings: a level name or its numeric value
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Name(String),
    Number(i64),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawLevel::deserialize(deserializer)? {
            RawLevel::Name(name) => Level::parse(&name),
            RawLevel::Number(raw) => i8::try_from(raw).map_or(Level::Important, Level::from_i8),
            RawLevel::Other(_) => Level::Important,
        })
    }
}

/// A level that can be replaced through a shared reference
#[derive(Debug)]
pub(crate) struct AtomicLevel(AtomicI8);

impl AtomicLevel {
    pub(crate) fn new(level: Level) -> Self {
        Self(AtomicI8::new(level as i8))
    }

    #[inline]
    pub(crate) fn get(&self) -> Level {
        Level::from_i8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, level: Level) {
        self.0.store(level as i8, Ordering::Release);
    }
}
