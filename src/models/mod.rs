//! Domain records.

pub mod order;

pub use order::{Order, StoredOrder};
