//! Enablement policy: levels, masks and call-site contexts
//!
//! A metric declared at `(level, mask)` is recorded under a [`Context`] only
//! when the context's level admits the declared level *and* the context's mask
//! shares at least one category bit with the declared mask.

mod context;
mod level;
mod mask;


pub use context::Context;
pub use level::Level;
pub use mask::Mask;

pub(crate) use level::AtomicLevel;

/// Options for group and registry reconfiguration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelOpts {
    /// Rebuild noop-backed metrics that the new policy enables as real ones
    pub replace_noops: bool,
}

impl LevelOpts {
    /// Options that upgrade newly enabled noop metrics
    pub const fn replace_noops() -> Self {
        Self { replace_noops: true }
    }
}
