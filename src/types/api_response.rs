use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The `{success, data?, error?}` envelope every endpoint responds with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the server considers the call successful.
    pub success: bool,

    /// Payload, when the endpoint has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Server-supplied error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Creates a failed envelope.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Converts the envelope into the payload, or an error when `success` is false or the
    /// payload is missing.
    ///
    /// `fallback` is the message used when the server did not say what went wrong.
    pub fn into_result(self, status_code: u16, fallback: &str) -> Result<T> {
        match self.into_unit(status_code, fallback)? {
            Some(data) => Ok(data),
            None => Err(Error::serialization(
                format!("{fallback}: response has no data"),
                None,
            )),
        }
    }

    /// Like [`into_result`](Self::into_result), for endpoints whose payload is optional.
    pub fn into_unit(self, status_code: u16, fallback: &str) -> Result<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            let message = self
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| fallback.to_string());
            Err(Error::api(status_code, None, message))
        }
    }
}
