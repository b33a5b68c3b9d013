// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Errors module
//!

use thiserror::Error;

use std::time::Duration;

/// Failed test expectation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExpectError {
    /// Nothing satisfying the expectation arrived in time.
    #[error("Timeout ({timeout:?}) while waiting for {expected}.")]
    Timeout { expected: String, timeout: Duration },
    /// Something arrived, but not what was expected.
    #[error("Expected {expected}, found {actual}.")]
    Mismatch { expected: String, actual: String },
    /// Something arrived while nothing was expected.
    #[error("Expected {expected}, received {actual}.")]
    Unexpected { expected: String, actual: String },
    /// Wrong number of log records matched a filter.
    #[error("Expected {expected} log records matching {filter}, found {actual}.")]
    LogCount {
        filter: String,
        expected: usize,
        actual: usize,
    },
    /// The fixture could not be built.
    #[error("Test setup failed: {0}")]
    Setup(String),
}

impl From<actor::Error> for ExpectError {
    fn from(error: actor::Error) -> Self {
        ExpectError::Setup(error.to_string())
    }
}
