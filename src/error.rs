// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::session::Role;

/// Rejections raised before any request leaves the client.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("'{0}' is required")]
    MissingField(&'static str),

    #[error("Amount must be greater than zero (got {0})")]
    NonPositiveAmount(Decimal),

    #[error("Withdrawal of {requested:.2} exceeds available balance {available:.2}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Cannot assign {requested} units; only {available} in stock")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("Quantity must be greater than zero (got {0})")]
    NonPositiveQuantity(i64),

    #[error("Feedback must be between {min} and {max} characters (got {len})")]
    FeedbackLength { len: usize, min: usize, max: usize },

    #[error("Rating must be between 1 and 5 (got {0})")]
    RatingOutOfRange(u8),

    #[error("A previous request is still in flight")]
    RequestInFlight,

    #[error("This action requires the '{0}' role")]
    RoleRequired(Role),
}

/// Failures talking to the AquaLink backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response from {endpoint}: {source}")]
    Malformed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Event stream closed")]
    StreamClosed,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl<W> From<csv::IntoInnerError<W>> for ExportError {
    fn from(e: csv::IntoInnerError<W>) -> Self {
        ExportError::Io(e.into_error())
    }
}
