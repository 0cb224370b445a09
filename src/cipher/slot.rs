//! Hand-off slot for freshly seeded encryption contexts.
//!
//! Seeding can take up to a million map iterations, so it runs in the configuring task.
//! The finished context is parked here and picked up by the owning coordinator on its
//! next poll. The lock is held only for the move, never while seeding.

use core::cell::RefCell;
use critical_section::Mutex;

use super::EncryptionContext;

/// Single-entry mailbox carrying an [`EncryptionContext`] between tasks.
pub struct ContextSlot {
    pending: Mutex<RefCell<Option<EncryptionContext>>>,
}

impl ContextSlot {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(RefCell::new(None)),
        }
    }

    /// Park a context, replacing any that was not yet collected.
    ///
    /// Returns `true` if an uncollected context was replaced.
    pub fn offer(&self, ctx: EncryptionContext) -> bool {
        critical_section::with(|cs| self.pending.borrow_ref_mut(cs).replace(ctx).is_some())
    }

    /// Collect the parked context, if any.
    pub fn take(&self) -> Option<EncryptionContext> {
        critical_section::with(|cs| self.pending.borrow_ref_mut(cs).take())
    }

    /// Whether a context is waiting to be collected.
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow_ref(cs).is_some())
    }
}

impl Default for ContextSlot {
    fn default() -> Self {
        Self::new()
    }
}
