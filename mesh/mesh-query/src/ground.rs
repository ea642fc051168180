//! Ground level bookkeeping.

use std::sync::atomic::{AtomicU64, Ordering};

/// Height of the print platform relative to a mesh.
///
/// Holds the base level (the mesh's lowest Z by default) and an offset the
/// caller may adjust, for example when the model is elevated on a pad.
/// Both values are stored as atomic bit patterns so they can be changed
/// through a shared reference while other threads run queries; readers
/// never need a consistent snapshot of both, so relaxed ordering is enough.
///
/// # Example
///
/// ```
/// use mesh_query::GroundLevel;
///
/// let ground = GroundLevel::new(-2.0);
/// ground.set_offset(0.5);
/// assert_eq!(ground.level(), -2.0);
/// assert_eq!(ground.effective(), -1.5);
/// ```
#[derive(Debug, Default)]
pub struct GroundLevel {
    level: AtomicU64,
    offset: AtomicU64,
}

impl GroundLevel {
    /// Ground level `level` with zero offset.
    #[must_use]
    pub fn new(level: f64) -> Self {
        Self {
            level: AtomicU64::new(level.to_bits()),
            offset: AtomicU64::new(0.0_f64.to_bits()),
        }
    }

    /// Base level.
    #[must_use]
    pub fn level(&self) -> f64 {
        f64::from_bits(self.level.load(Ordering::Relaxed))
    }

    /// Replace the base level.
    pub fn set_level(&self, level: f64) {
        self.level.store(level.to_bits(), Ordering::Relaxed);
    }

    /// Offset added to the base level.
    #[must_use]
    pub fn offset(&self) -> f64 {
        f64::from_bits(self.offset.load(Ordering::Relaxed))
    }

    /// Replace the offset.
    pub fn set_offset(&self, offset: f64) {
        self.offset.store(offset.to_bits(), Ordering::Relaxed);
    }

    /// `level + offset`.
    #[must_use]
    pub fn effective(&self) -> f64 {
        self.level() + self.offset()
    }
}

impl Clone for GroundLevel {
    fn clone(&self) -> Self {
        let copy = Self::new(self.level());
        copy.set_offset(self.offset());
        copy
    }
}
