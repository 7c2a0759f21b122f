//! Wire types for the gateway admin API.
//!
//! Every backend response is wrapped in the same envelope:
//!
//! ```json
//! { "code": 200, "message": "ok", "data": [ ... ] }
//! ```
//!
//! `code == 200` is the only success signal. Any other code is a logical failure reported by
//! the backend and is surfaced through [`Error::Backend`].

pub mod models;

use serde::Deserialize;

use crate::errors::{Error, Result};

/// Success code carried by the envelope.
pub const SUCCESS_CODE: i64 = 200;

/// The `{code, data, message}` wrapper used by every backend response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the envelope, turning a non-success code into an error.
    ///
    /// A successful envelope may still carry `data: null`; callers decide what the empty
    /// value is.
    pub fn into_result(self) -> Result<Option<T>> {
        if self.code == SUCCESS_CODE {
            Ok(self.data)
        } else {
            Err(Error::Backend {
                code: self.code,
                message: self.message,
            })
        }
    }
}
