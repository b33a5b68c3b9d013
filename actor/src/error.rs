// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Errors module
//!

use crate::ActorPath;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::time::Duration;

/// Error type for the actor system.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// An actor with the same path is already running.
    #[error("Actor {0} exist.")]
    Exists(ActorPath),
    /// The actor could not be started (`pre_start` failed or the runner died).
    #[error("An error occurred while starting the actor: {0}.")]
    Start(String),
    /// An error occurred while stopping an actor.
    #[error("An error occurred while stopping an actor.")]
    Stop,
    /// The target actor is no longer running. Only asks observe this error,
    /// tells to a terminated actor end up as dead letters.
    #[error("Actor {0} is terminated.")]
    Terminated(ActorPath),
    /// No reply arrived before the deadline.
    #[error("Ask to {target} timed out after {timeout:?}.")]
    AskTimeout {
        /// Actor the request was sent to.
        target: ActorPath,
        /// Deadline that elapsed.
        timeout: Duration,
    },
    /// The behavior of an actor failed while handling a message.
    #[error("Behavior fault: {0}")]
    Behavior(String),
    /// Error that does not compromise the operation of the system.
    #[error("Error: {0}")]
    Functional(String),
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::AskTimeout {
            target: ActorPath::from("/user/auth"),
            timeout: Duration::from_secs(2),
        };
        assert_eq!(error.to_string(), "Ask to /user/auth timed out after 2s.");
        let error = Error::Terminated(ActorPath::from("/user/gone"));
        assert_eq!(error.to_string(), "Actor /user/gone is terminated.");
    }
}
