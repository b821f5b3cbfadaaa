//! # Record Model
//!
//! A persisted domain entity with a mutable status tag.
//!
//! Records are created and owned by the store. The batch reprocessor takes
//! ownership of one record for the duration of a single per-identifier task and
//! only ever rewrites its `status`.

use crate::constants::status;
use serde::{Deserialize, Serialize};

/// Store-assigned record identifier
pub type RecordId = i64;

/// A persisted record.
///
/// `id` is `None` until the store assigns one on first persist. The `email`
/// contact identifier is validated before it reaches the store and is carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Option<RecordId>,
    pub name: String,
    pub description: String,
    pub status: String,
    pub email: String,
}

impl Record {
    /// Build an unsaved record with the `NEW` status
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            status: status::NEW.to_string(),
            email: email.into(),
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, tag: impl Into<String>) -> Self {
        self.status = tag.into();
        self
    }

    /// Move the record into the terminal `PROCESSED` state.
    ///
    /// Applying this to an already processed record leaves it unchanged.
    pub fn mark_processed(&mut self) {
        self.status = status::PROCESSED.to_string();
    }

    pub fn is_processed(&self) -> bool {
        status::is_processed(&self.status)
    }
}
