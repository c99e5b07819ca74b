//! Request cleaning for web framework adapters.
//!
//! This module provides a framework-neutral seam: an adapter extracts the
//! body and uploaded files into [`RequestParts`], runs a [`RequestCleaner`],
//! and turns a [`RequestError::Rejected`] into its own HTTP response. The
//! cleaners are passed in explicitly; nothing is registered globally.
//!
//! # Example
//!
//! ```rust
//! use cleanse::request::{RequestError, RequestParts, RequestSchema};
//! use cleanse::{Context, Schema};
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let cleaner = RequestSchema::new()
//!     .body(
//!         Schema::object()
//!             .field("name", Schema::string().build().unwrap())
//!             .build()
//!             .unwrap(),
//!     )
//!     .error_code(422)
//!     .build();
//!
//! let parts = RequestParts::new().with_body(json!({}));
//! match cleaner.clean(&parts, &Context::new()).await {
//!     Err(RequestError::Rejected(response)) => {
//!         assert_eq!(response.status, 422);
//!         assert_eq!(response.body, json!({"errors": {"name": ["Value required."]}}));
//!         assert_eq!(response.content_type, "application/json");
//!     }
//!     _ => unreachable!(),
//! }
//! # });
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::context::Context;
use crate::error::{CleanError, ValidationError};
use crate::schema::{Cleaner, ValueCleaner};

/// Status used for rejected requests unless overridden.
pub const DEFAULT_ERROR_STATUS: u16 = 400;

/// Content type of every rejection body.
pub const ERROR_CONTENT_TYPE: &str = "application/json";

/// The parts of an incoming request that can be cleaned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParts {
    /// Parsed request body, if any.
    pub body: Option<Value>,
    /// Uploaded files, keyed by form field, if any.
    pub files: Option<Value>,
}

impl RequestParts {
    /// Creates empty request parts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parsed body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the uploaded files.
    pub fn with_files(mut self, files: Value) -> Self {
        self.files = Some(files);
        self
    }
}

/// Cleaned request parts.
///
/// A part is `None` when no cleaner was configured for it or its cleaner
/// produced no value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedRequest {
    /// Cleaned body.
    pub body: Option<Value>,
    /// Cleaned files.
    pub files: Option<Value>,
}

/// A transport-level rejection built from a validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body: `{"errors": <messages or field errors>}`.
    pub body: Value,
    /// Always [`ERROR_CONTENT_TYPE`]. Adapters must not let the framework
    /// replace it.
    pub content_type: &'static str,
}

impl ErrorResponse {
    /// Builds a rejection for `err` with the given status.
    pub fn new(status: u16, err: &ValidationError) -> Self {
        Self {
            status,
            body: json!({ "errors": err.to_json() }),
            content_type: ERROR_CONTENT_TYPE,
        }
    }

    /// Serializes the body.
    pub fn body_text(&self) -> String {
        self.body.to_string()
    }
}

/// Failure of a request clean.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The request data was invalid; send this response.
    #[error("request rejected with status {}", .0.status)]
    Rejected(ErrorResponse),

    /// Any failure other than invalid data.
    #[error(transparent)]
    Clean(CleanError),
}

/// Builder for a [`RequestCleaner`].
#[derive(Clone, Default)]
pub struct RequestSchema {
    body: Option<Arc<dyn ValueCleaner>>,
    files: Option<Arc<dyn ValueCleaner>>,
    error_code: Option<u16>,
}

impl RequestSchema {
    /// Creates a schema that cleans nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the body cleaner.
    pub fn body<C: Cleaner + 'static>(mut self, cleaner: C) -> Self {
        self.body = Some(Arc::new(cleaner));
        self
    }

    /// Sets the files cleaner.
    pub fn files<C: Cleaner + 'static>(mut self, cleaner: C) -> Self {
        self.files = Some(Arc::new(cleaner));
        self
    }

    /// Overrides the rejection status (default 400).
    pub fn error_code(mut self, status: u16) -> Self {
        self.error_code = Some(status);
        self
    }

    /// Builds the request cleaner.
    pub fn build(&self) -> RequestCleaner {
        RequestCleaner {
            body: self.body.clone(),
            files: self.files.clone(),
            status: self.error_code.unwrap_or(DEFAULT_ERROR_STATUS),
        }
    }
}

impl fmt::Debug for RequestSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSchema")
            .field("body", &self.body.is_some())
            .field("files", &self.files.is_some())
            .field("error_code", &self.error_code)
            .finish()
    }
}

/// Cleans request parts and maps validation failures to an [`ErrorResponse`].
#[derive(Clone)]
pub struct RequestCleaner {
    body: Option<Arc<dyn ValueCleaner>>,
    files: Option<Arc<dyn ValueCleaner>>,
    status: u16,
}

impl RequestCleaner {
    /// Returns the status used for rejections.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Cleans the body, then the files.
    pub async fn clean(
        &self,
        parts: &RequestParts,
        ctx: &Context,
    ) -> Result<CleanedRequest, RequestError> {
        let body = clean_part(self.body.as_deref(), parts.body.as_ref(), ctx).await;
        let body = self.respond(body)?;
        let files = clean_part(self.files.as_deref(), parts.files.as_ref(), ctx).await;
        let files = self.respond(files)?;
        Ok(CleanedRequest { body, files })
    }

    fn respond(&self, result: Result<Option<Value>, CleanError>) -> Result<Option<Value>, RequestError> {
        result.map_err(|err| match err {
            CleanError::Invalid(err) => {
                tracing::debug!(status = self.status, error = %err, "request rejected");
                RequestError::Rejected(ErrorResponse::new(self.status, &err))
            }
            other => RequestError::Clean(other),
        })
    }
}

async fn clean_part(
    cleaner: Option<&dyn ValueCleaner>,
    value: Option<&Value>,
    ctx: &Context,
) -> Result<Option<Value>, CleanError> {
    match cleaner {
        Some(cleaner) => Ok(cleaner.clean_value(value, ctx).await?.into_json()),
        None => Ok(None),
    }
}
