//! Metric category masks

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of metric categories.
///
/// Masks are orthogonal to [`Level`](super::Level): a metric is only recorded
/// when both its level and one of its category bits are enabled.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask(u64);

impl Mask {
    /// Basic counters
    pub const COUNTERS: Mask = Mask(1 << 0);
    /// Latency and timing
    pub const LATENCY: Mask = Mask(1 << 1);
    /// Rates and throughput
    pub const THROUGHPUT: Mask = Mask(1 << 2);
    /// Errors
    pub const ERRORS: Mask = Mask(1 << 3);
    /// CPU, memory, disk
    pub const RESOURCES: Mask = Mask(1 << 4);
    /// Queue depths and processing
    pub const QUEUES: Mask = Mask(1 << 5);
    /// Connections and pools
    pub const CONNECTIONS: Mask = Mask(1 << 6);
    /// Cache hit/miss rates
    pub const CACHE: Mask = Mask(1 << 7);
    /// Circuit breaker state
    pub const CIRCUIT_BREAKER: Mask = Mask(1 << 8);
    /// Health checks
    pub const HEALTH: Mask = Mask(1 << 9);
    /// Auth and rate limiting
    pub const SECURITY: Mask = Mask(1 << 10);
    /// Detailed performance breakdowns
    pub const PERFORMANCE: Mask = Mask(1 << 11);
    /// Internal state
    pub const INTERNAL: Mask = Mask(1 << 12);
    /// Per-user series
    pub const PER_USER: Mask = Mask(1 << 13);
    /// Per-request series
    pub const PER_REQUEST: Mask = Mask(1 << 14);
    /// Very detailed breakdowns
    pub const DETAILED: Mask = Mask(1 << 15);

    pub const NONE: Mask = Mask(0);
    pub const ESSENTIAL: Mask = Mask::COUNTERS.union(Mask::LATENCY).union(Mask::ERRORS);
    pub const PRODUCTION: Mask = Mask::ESSENTIAL
        .union(Mask::THROUGHPUT)
        .union(Mask::RESOURCES)
        .union(Mask::QUEUES);
    pub const ALL: Mask = Mask(u64::MAX);

    const FLAGS: [(Mask, &'static str); 16] = [
        (Mask::COUNTERS, "COUNTERS"),
        (Mask::LATENCY, "LATENCY"),
        (Mask::THROUGHPUT, "THROUGHPUT"),
        (Mask::ERRORS, "ERRORS"),
        (Mask::RESOURCES, "RESOURCES"),
        (Mask::QUEUES, "QUEUES"),
        (Mask::CONNECTIONS, "CONNECTIONS"),
        (Mask::CACHE, "CACHE"),
        (Mask::CIRCUIT_BREAKER, "CIRCUIT_BREAKER"),
        (Mask::HEALTH, "HEALTH"),
        (Mask::SECURITY, "SECURITY"),
        (Mask::PERFORMANCE, "PERFORMANCE"),
        (Mask::INTERNAL, "INTERNAL"),
        (Mask::PER_USER, "PER_USER"),
        (Mask::PER_REQUEST, "PER_REQUEST"),
        (Mask::DETAILED, "DETAILED"),
    ];

    pub const fn from_bits(bits: u64) -> Mask {
        Mask(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn union(self, other: Mask) -> Mask {
        Mask(self.0 | other.0)
    }

    /// Whether any bit of `flag` is set in this mask
    #[inline]
    pub const fn has(self, flag: Mask) -> bool {
        self.0 & flag.0 != 0
    }

    /// A copy of this mask with `flag` set
    pub const fn add(self, flag: Mask) -> Mask {
        Mask(self.0 | flag.0)
    }

    /// A copy of this mask with `flag` cleared
    pub const fn remove(self, flag: Mask) -> Mask {
        Mask(self.0 & !flag.0)
    }

    /// Parse a named union (`NONE`, `ESSENTIAL`, `PRODUCTION`, `ALL`) or a
    /// `|`-separated list of flag names.
    ///
    /// Unknown flag names are ignored and an empty string yields
    /// [`Mask::PRODUCTION`].
    pub fn parse(s: &str) -> Mask {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "" => return Mask::PRODUCTION,
            "NONE" => return Mask::NONE,
            "ESSENTIAL" => return Mask::ESSENTIAL,
            "PRODUCTION" => return Mask::PRODUCTION,
            "ALL" => return Mask::ALL,
            _ => {}
        }

        upper
            .split('|')
            .map(str::trim)
            .filter_map(|token| {
                Mask::FLAGS
                    .iter()
                    .find(|(_, name)| *name == token)
                    .map(|(flag, _)| *flag)
            })
            .fold(Mask::NONE, Mask::add)
    }
}

impl BitOr for Mask {
    type Output = Mask;

    fn bitor(self, rhs: Mask) -> Mask {
        self.union(rhs)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Mask) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Mask::NONE {
            return f.write_str("NONE");
        }
        if *self == Mask::ALL {
            return f.write_str("ALL");
        }

        let names: Vec<&str> = Mask::FLAGS
            .iter()
            .filter(|(flag, _)| self.has(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask({})", self)
    }
}

impl Serialize for Mask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Accepted config encodings: flag names or raw bits
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMask {
    Names(String),
    Bits(u64),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for Mask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawMask::deserialize(deserializer)? {
            RawMask::Names(names) => Mask::parse(&names),
            RawMask::Bits(bits) => Mask::from_bits(bits),
            RawMask::Other(_) => Mask::PRODUCTION,
        })
    }
}
