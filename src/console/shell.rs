//! Link state the console commands operate on.
//!
//! The shell owns the TX encryption context (the console task is the TX word producer)
//! and hands freshly seeded RX contexts to the RX coordinator through a
//! [`ContextSlot`]. It never touches a framer or ring from the consumer side.

use crate::cipher::{ContextSlot, EncryptionContext};
use crate::config::nvs::{NvsError, ParamStore};
use crate::config::{ConfigError, Direction, EncryptionParams, RING_CAPACITY};
use crate::framing;
use crate::ring::WordRing;
use crate::rx::RxFramer;
use crate::stats::{LinkStats, StatsSnapshot};
use crate::tx::{self, TxFramer};

/// Console-side view of the link.
pub struct Shell<'a> {
    tx_ring: &'a WordRing<RING_CAPACITY>,
    tx_framer: &'a TxFramer,
    rx_ring: &'a WordRing<RING_CAPACITY>,
    rx_framer: &'a RxFramer,
    rx_slot: &'a ContextSlot,
    store: Option<ParamStore>,
    tx_ctx: Option<EncryptionContext>,
    tx_params: Option<EncryptionParams>,
    rx_params: Option<EncryptionParams>,
    /// RX context as it was at seeding, for display only.
    rx_seeded: Option<EncryptionContext>,
}

/// Result of queueing a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Queued {
    pub words: usize,
    pub dropped: u32,
}

impl<'a> Shell<'a> {
    pub fn new(
        tx_ring: &'a WordRing<RING_CAPACITY>,
        tx_framer: &'a TxFramer,
        rx_ring: &'a WordRing<RING_CAPACITY>,
        rx_framer: &'a RxFramer,
        rx_slot: &'a ContextSlot,
    ) -> Self {
        Self {
            tx_ring,
            tx_framer,
            rx_ring,
            rx_framer,
            rx_slot,
            store: None,
            tx_ctx: None,
            tx_params: None,
            rx_params: None,
            rx_seeded: None,
        }
    }

    /// Attach persistent storage for `save` and boot-time restore.
    pub fn with_store(mut self, store: ParamStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Validate `params` and seed the context for `direction`.
    ///
    /// Seeding runs the full warm-up here, in the console task.
    pub fn configure(
        &mut self,
        direction: Direction,
        params: EncryptionParams,
    ) -> Result<EncryptionParams, ConfigError> {
        let params = params.validate()?;
        let ctx = EncryptionContext::from_params(&params);
        match direction {
            Direction::Tx => {
                self.tx_ctx = Some(ctx);
                self.tx_params = Some(params);
            }
            Direction::Rx => {
                if self.rx_slot.offer(ctx.clone()) {
                    log::warn!("RX context replaced before pickup");
                }
                self.rx_seeded = Some(ctx);
                self.rx_params = Some(params);
            }
        }
        log::info!("{} encryption set: {}", direction, params.variant);
        Ok(params)
    }

    /// Load both directions from storage, if attached. Returns how many were restored.
    pub fn restore(&mut self) -> usize {
        let mut loaded = [None, None];
        if let Some(store) = &self.store {
            for (slot, direction) in loaded.iter_mut().zip([Direction::Tx, Direction::Rx]) {
                match store.load(direction) {
                    Ok(params) => *slot = params,
                    Err(e) => log::warn!("{} params not restored: {}", direction, e),
                }
            }
        }

        let mut restored = 0;
        for (params, direction) in loaded.into_iter().zip([Direction::Tx, Direction::Rx]) {
            if let Some(params) = params {
                match self.configure(direction, params) {
                    Ok(_) => restored += 1,
                    Err(e) => log::warn!("stored {} params rejected: {}", direction, e),
                }
            }
        }
        restored
    }

    /// Persist every configured direction.
    ///
    /// Returns `Ok(false)` if no storage is attached.
    pub fn save(&mut self) -> Result<bool, NvsError> {
        let Some(store) = self.store.as_mut() else {
            return Ok(false);
        };
        for (direction, params) in [(Direction::Tx, self.tx_params), (Direction::Rx, self.rx_params)]
        {
            if let Some(params) = params {
                store.save(direction, &params)?;
            }
        }
        Ok(true)
    }

    pub fn params(&self, direction: Direction) -> Option<&EncryptionParams> {
        match direction {
            Direction::Tx => self.tx_params.as_ref(),
            Direction::Rx => self.rx_params.as_ref(),
        }
    }

    /// Current TX context, or the RX context as seeded.
    pub fn context(&self, direction: Direction) -> Option<&EncryptionContext> {
        match direction {
            Direction::Tx => self.tx_ctx.as_ref(),
            Direction::Rx => self.rx_seeded.as_ref(),
        }
    }

    pub fn is_configured(&self, direction: Direction) -> bool {
        self.params(direction).is_some()
    }

    /// Encrypt `message` and queue it on the TX ring.
    ///
    /// Returns `None` if the TX direction has no context.
    pub fn transmit(&mut self, message: &[u8]) -> Option<Queued> {
        let ctx = self.tx_ctx.as_mut()?;
        let before = self.tx_ring.dropped();
        tx::enqueue_message(ctx, self.tx_ring, message);
        Some(Queued {
            words: framing::word_count(message.len()),
            dropped: self.tx_ring.dropped().wrapping_sub(before),
        })
    }

    pub fn stats(&self) -> StatsSnapshot {
        LinkStats {
            tx_framer: self.tx_framer,
            tx_ring: self.tx_ring,
            rx_framer: self.rx_framer,
            rx_ring: self.rx_ring,
        }
        .snapshot()
    }
}
