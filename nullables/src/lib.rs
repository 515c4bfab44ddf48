//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the verification engine (clock, storage,
//! chain facts) is abstracted behind a trait. The doubles here stay in
//! memory, answer only what a test programs into them, and count the calls
//! they receive so tests can assert that a path never reached storage.

pub mod chain;
pub mod clock;
pub mod store;

pub use chain::{FactMode, NullFactSource};
pub use clock::NullClock;
pub use store::NullStore;
