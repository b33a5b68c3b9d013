// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Troupe test kit
//!
//! Deterministic assertions over the asynchronous traffic of an actor system.
//!
//! A [`TestProbe`] is an actor that records everything it receives; a [`LogProbe`] records the
//! log records published on the event bus. Assertions wait on those records with a timeout and
//! fail with an [`ExpectError`] describing what was expected and what was found. [`TestKit`]
//! bundles a system, a default probe and the usual helpers.
//!
//! ```ignore
//! let kit = TestKit::new().await?;
//! let echo = kit.actor_of("echo", EchoActor::<String>::new()).await?;
//! kit.tell(&echo, "hello".to_owned());
//! kit.expect_message_eq("hello".to_owned(), DEFAULT_TIMEOUT).await?;
//! ```
//!

mod actors;
mod error;
mod kit;
mod log_probe;
mod probe;
mod recording;

pub use actors::{BlackHoleActor, EchoActor};
pub use error::ExpectError;
pub use kit::{DEFAULT_TIMEOUT, TestKit};
pub use log_probe::LogProbe;
pub use probe::{Envelope, ProbeActor, TestProbe};
pub use recording::{Arrival, Recording};
