//! Response-shape validation.
//!
//! Every successful body goes through [`decode`] before a binding returns it,
//! so a driver that answers with the wrong shape fails the same way an
//! unreachable one does.

use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

pub(crate) fn decode<T: DeserializeOwned>(operation: &'static str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| ClientError::Validation { operation, source })
}
