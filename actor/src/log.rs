// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Log records
//!
//! Actors log through the [`EventBus`](crate::EventBus) rather than straight into `tracing`, so
//! that tests can intercept what an actor logged. Every record published through a [`Logger`]
//! is mirrored into `tracing` at the same level.
//!

use crate::{ActorPath, Error, bus::EventBus};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use std::{fmt, str::FromStr, time::SystemTime};

/// Severity of a log record, ordered from the least to the most severe.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(Error::Config(format!("unknown log level '{}'", other))),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.to_string()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A structured log record published on the event bus.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    /// Path of the actor (or system component) that emitted the record.
    pub source: ActorPath,
    pub timestamp: SystemTime,
}

impl LogRecord {
    pub fn new(level: LogLevel, source: ActorPath, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            source,
            timestamp: SystemTime::now(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.level, self.source, self.message)
    }
}

/// Logging adapter bound to a source path.
#[derive(Clone)]
pub struct Logger {
    source: ActorPath,
    bus: EventBus,
}

impl Logger {
    pub(crate) fn new(source: ActorPath, bus: EventBus) -> Self {
        Self { source, bus }
    }

    pub fn source(&self) -> &ActorPath {
        &self.source
    }

    /// Publishes a record with the given level.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let record = LogRecord::new(level, self.source.clone(), message);
        match level {
            LogLevel::Debug => debug!("{}: {}", record.source, record.message),
            LogLevel::Info => info!("{}: {}", record.source, record.message),
            LogLevel::Warning => warn!("{}: {}", record.source, record.message),
            LogLevel::Error => error!("{}: {}", record.source, record.message),
        }
        self.bus.publish(record);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_level_order_and_parse() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_level_from_string() {
        assert_eq!(
            LogLevel::try_from("error".to_owned()).unwrap(),
            LogLevel::Error
        );
        assert!(matches!(
            LogLevel::try_from("LOUD".to_owned()),
            Err(Error::Config(_))
        ));
        assert_eq!(String::from(LogLevel::Debug), "DEBUG");
    }

    #[test]
    fn test_record_display() {
        let record =
            LogRecord::new(LogLevel::Info, ActorPath::from("/user/a"), "indexing users");
        assert_eq!(record.to_string(), "[INFO] [/user/a] indexing users");
    }
}
