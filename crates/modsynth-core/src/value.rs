//! Lock-free scalar shared between the scheduler and a controller.
//!
//! A [`SharedValue`] is the storage behind every Constant node. The controller
//! thread writes it with [`set()`](SharedValue::set); the scheduler thread reads
//! it once per tick with [`get()`](SharedValue::get). Both sides use
//! `Ordering::Relaxed`: the value is a single independent scalar, so a reader
//! may observe a stale value for one sample but never a torn one.
//!
//! The `f32` is stored as its bit pattern in an `AtomicU32`, the same encoding
//! used by the GUI parameter bridges.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use core::sync::atomic::{AtomicU32, Ordering};

/// A cloneable handle to an atomically updated `f32`.
///
/// Clones share the same storage.
///
/// # Example
///
/// ```rust
/// use modsynth_core::SharedValue;
///
/// let value = SharedValue::new(440.0);
/// let control = value.clone();
/// control.set(880.0);
/// assert_eq!(value.get(), 880.0);
/// ```
#[derive(Clone)]
pub struct SharedValue(Arc<AtomicU32>);

impl SharedValue {
    /// Creates a new shared value.
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(value.to_bits())))
    }

    /// Reads the current value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Stores a new value.
    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl core::fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("SharedValue").field(&self.get()).finish()
    }
}
