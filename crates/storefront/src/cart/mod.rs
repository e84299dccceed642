//! Cart state: guest persistence, reconciliation, and mutation.
//!
//! Two collections hold cart lines:
//!
//! - the **guest cart**, persisted in the session key-value store and the
//!   only collection this system ever mutates
//! - the **remote cart**, the signed-in user's cart as reported by the
//!   external service, treated as a read-only snapshot refreshed by
//!   re-fetching
//!
//! [`reconcile`] merges the two into display items de-duplicated by product
//! identity, with a [`Provenance`](superstore_core::Provenance) tag recording
//! which collection(s) contributed each quantity. The mutators in [`mutate`]
//! touch only the guest lines: removing or clearing an item whose quantity
//! came partly from the account cart zeroes the guest contribution, and the
//! account contribution reappears on the next reconciliation pass.

pub mod mutate;
mod reconcile;
mod store;

pub use reconcile::{DisplayItem, reconcile};
pub use store::CartStore;
