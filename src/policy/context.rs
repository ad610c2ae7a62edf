//! Call-site enablement context

use super::{Level, Mask};

/// What may currently be recorded, evaluated at each metric call site.
///
/// Contexts are plain values: deriving a new one never touches the original,
/// so they can be shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Context {
    level: Level,
    mask: Mask,
}

impl Context {
    pub const fn new(level: Level, mask: Mask) -> Self {
        Self { level, mask }
    }

    /// A context at `level` that does not filter by category
    pub const fn at(level: Level) -> Self {
        Self::new(level, Mask::ALL)
    }

    /// A context under which nothing is recorded
    pub const fn disabled() -> Self {
        Self::new(Level::Disabled, Mask::NONE)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Whether metrics declared at `level` should be processed
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level.enabled(self.level)
    }

    /// Whether metrics in the `mask` categories should be processed
    #[inline]
    pub fn enabled_mask(&self, mask: Mask) -> bool {
        self.mask.has(mask)
    }

    /// Both gates at once
    #[inline]
    pub fn allows(&self, level: Level, mask: Mask) -> bool {
        self.enabled(level) && self.enabled_mask(mask)
    }

    #[must_use]
    pub fn with_level(&self, level: Level) -> Self {
        Self::new(level, self.mask)
    }

    #[must_use]
    pub fn with_mask(&self, mask: Mask) -> Self {
        Self::new(self.level, mask)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Level::Important, Mask::PRODUCTION)
    }
}
