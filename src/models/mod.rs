//! # Models
//!
//! Domain entities handled by the batch reprocessor.

pub mod record;

pub use record::{Record, RecordId};
