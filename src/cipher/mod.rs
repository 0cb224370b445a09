//! Link cipher: chaotic-map-driven MSWS keystream, XORed word by word.
//!
//! Pure logic, no hardware dependencies. Fully testable on host.

pub mod chaos;
pub mod keystream;
pub mod msws;
pub mod slot;

pub use chaos::{ChaoticMapState, MapVariant};
pub use keystream::{ChaoticMap, EncryptionContext};
pub use msws::MswsState;
pub use slot::ContextSlot;
