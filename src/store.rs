//! The persistence collaborator contract.
//!
//! The editing core never talks to storage directly. It goes through
//! [`CountryStore`], implemented by the SQLite [`crate::db::Database`] and by
//! the HTTP [`crate::client::ChronicleClient`].

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Country, CountryInput};

/// Failures reported by a persistence collaborator.
///
/// These are surfaced to the operator verbatim; the draft is kept so the save
/// can be retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Country not found: {0}")]
    NotFound(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub trait CountryStore {
    fn load(&self, id: Uuid) -> impl Future<Output = Result<Country, StoreError>> + Send;

    fn create(
        &self,
        payload: CountryInput,
    ) -> impl Future<Output = Result<Country, StoreError>> + Send;

    fn update(
        &self,
        id: Uuid,
        payload: CountryInput,
    ) -> impl Future<Output = Result<Country, StoreError>> + Send;
}
