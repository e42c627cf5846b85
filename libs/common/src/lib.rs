//! Client-side core for the Drips funds-streaming protocol: canonical
//! receiver ordering, settlement-cycle math, and off-chain balance
//! estimation over historical configuration events.
//!
//! Everything in this crate is synchronous and side-effect-free; the
//! asynchronous account data source lives in `drips-account-sync`.

pub mod cycle;
pub mod error;
pub mod estimate;
pub mod events;
pub mod math;
pub mod network;
pub mod receivers;
