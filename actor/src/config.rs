// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Configuration
//!
//! Resolved settings consumed by the actor system. Loading them (from a file, environment or
//! any other source) is left to the application; any serde format works.
//!

use crate::{Error, LogLevel};

use serde::{Deserialize, Serialize};

use std::time::Duration;

/// Actor system settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Records below this level are dropped by the event bus.
    #[serde(alias = "loglevel")]
    pub log_level: LogLevel,
    /// Timeout used by `ActorRef::ask` when no explicit timeout is given.
    #[serde(with = "millis")]
    pub ask_timeout: Duration,
    /// Messages an actor processes before yielding its worker.
    pub throughput: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            ask_timeout: Duration::from_secs(5),
            throughput: 10,
        }
    }
}

impl Config {
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn with_ask_timeout(mut self, ask_timeout: Duration) -> Self {
        self.ask_timeout = ask_timeout;
        self
    }

    pub fn with_throughput(mut self, throughput: usize) -> Self {
        self.throughput = throughput;
        self
    }

    /// Checks the values the runtime can not work with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.ask_timeout.is_zero() {
            return Err(Error::Config("ask-timeout must be greater than zero".to_owned()));
        }
        if self.throughput == 0 {
            return Err(Error::Config("throughput must be greater than zero".to_owned()));
        }
        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};

    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).map_err(serde::ser::Error::custom)?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
