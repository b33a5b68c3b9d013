// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Troupe actor runtime
//!
//! A small actor runtime on top of tokio. Actors are isolated units of state that only interact
//! through asynchronous messages. Each actor owns a FIFO mailbox and processes one message at a
//! time, while the tokio worker pool runs many actors concurrently.
//!
//! In response to a message, an actor can:
//! - Update its private state, including the state tag that selects how the next message is
//!   handled
//! - Send messages to other actors, to its parent or to a reply address
//! - Create child actors
//! - Publish log records on the system event bus
//!
//! ## Core Architecture
//!
//! ### Messaging
//!
//! A send (`tell`) never blocks and never fails at the call site. Messages between one sender and
//! one receiver are delivered in send order. A message addressed to an actor that has terminated
//! is a *dead letter*: it is published on the event bus as an Info record and otherwise dropped.
//!
//! Request/response is built on top of one-way sends: `ask` attaches a temporary reply address
//! to the message and resolves exactly once, either with the first reply or with a timeout.
//! Handlers never block on an ask; they pipe the outcome back to themselves (or to the original
//! requester) with [`pipe_to`].
//!
//! ### Hierarchy
//!
//! Top level actors live under `/user`; children are named after their parent
//! (`/user/parent/child`). Stopping an actor stops its children. A child keeps a direct link to
//! the actor that created it, so it never reaches a different actor that later took over the
//! same path.
//!
//! ### Faults
//!
//! A handler that returns an error or panics stops its actor. There is no restart: the fault is
//! published as an Error record and the parent receives a [`Terminated`] notice carrying it.
//!
//! ### Event bus
//!
//! Every actor has a [`Logger`] bound to its path. Records at or above the configured level are
//! delivered to every subscriber whose [`LogFilter`] accepts them, in publish order.
//!
//! ## Getting Started
//!
//! ```ignore
//! use actor::{Actor, ActorContext, ActorPath, ActorSystem, Error, Handler, Message, Response};
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Counter {
//!     value: u64,
//! }
//!
//! #[derive(Debug, Clone)]
//! enum CounterMsg {
//!     Increment(u64),
//!     Get,
//! }
//!
//! impl Message for CounterMsg {}
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Value(u64);
//!
//! impl Response for Value {}
//!
//! #[async_trait]
//! impl Actor for Counter {
//!     type Message = CounterMsg;
//!     type Response = Value;
//! }
//!
//! #[async_trait]
//! impl Handler<Counter> for Counter {
//!     async fn handle_message(
//!         &mut self,
//!         _sender: ActorPath,
//!         msg: CounterMsg,
//!         _ctx: &mut ActorContext<Counter>,
//!     ) -> Result<Option<Value>, Error> {
//!         match msg {
//!             CounterMsg::Increment(n) => {
//!                 self.value += n;
//!                 Ok(None)
//!             }
//!             CounterMsg::Get => Ok(Some(Value(self.value))),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let (system, mut runner) = ActorSystem::create(CancellationToken::new());
//!     tokio::spawn(async move { runner.run().await });
//!
//!     let counter = system.create_root_actor("counter", Counter { value: 0 }).await?;
//!     counter.tell(CounterMsg::Increment(5));
//!     assert_eq!(counter.ask(CounterMsg::Get).await?, Value(5));
//!
//!     system.stop_system();
//!     Ok(())
//! }
//! ```
//!

// Private modules containing the implementation
mod actor;
mod ask;
mod bus;
mod config;
mod error;
mod log;
mod mailbox;
mod path;
mod runner;
mod sink;
mod system;

//
// Core Actor System Types
//

/// The actor trait: message and response types plus lifecycle hooks.
///
/// See [`ActorContext`] and [`ActorRef`] for detailed usage examples.
pub use actor::Actor;

/// Execution context handed to every handler and lifecycle hook.
///
/// Gives access to the actor's own reference, its parent, its logger, the reply address of the
/// message being handled and child creation.
pub use actor::ActorContext;

/// Lifecycle states an actor goes through, from creation to termination.
pub use actor::ActorLifecycle;

/// A reference to a running actor.
///
/// `ActorRef` supports fire-and-forget sends (`tell`) and request-response (`ask`). References
/// are cheap to clone and may outlive the actor; sends then become dead letters.
pub use actor::ActorRef;

/// Type-erased message, used to talk to a parent of unknown type.
pub use actor::AnyMessage;

/// Message handling for an actor.
///
/// See the [`Actor`] trait for message handler implementation examples.
pub use actor::Handler;

/// Marker trait implemented by all messages that can be sent to actors.
pub use actor::Message;

/// Marker trait implemented by all values an actor replies with.
pub use actor::Response;

/// Notice delivered to a parent when one of its children stops.
pub use actor::Terminated;

//
// Reply addresses
//

/// Runs a future in its own task and sends its output to a recipient.
pub use ask::pipe_to;

/// Type-erased, send-only address accepting one message type.
///
/// Used as reply address for requests and to hand an actor's inbox to code that should not know
/// the actor's type.
pub use ask::Recipient;

//
// Error Handling
//

/// Error type for all actor system operations.
pub use error::Error;

//
// Actor Addressing
//

/// Hierarchical path naming an actor within the system tree.
///
/// Paths are assigned by the system on creation and appear in logs and dead letters.
pub use path::ActorPath;

//
// Event System
//

/// Publish/subscribe channel for log records and dead letters.
pub use bus::EventBus;

/// Subscription predicate over level, source and content of a record.
pub use bus::LogFilter;

/// Content matcher used by a [`LogFilter`].
pub use bus::Matcher;

/// Active subscription to the event bus.
pub use bus::Subscription;

/// Logging adapter bound to the path of an actor.
pub use log::Logger;

/// Severity of a log record.
pub use log::LogLevel;

/// Record published on the event bus.
pub use log::LogRecord;

/// Task draining one bus subscription into a [`Subscriber`].
///
/// See [`Subscriber`] for record processing implementation patterns.
pub use sink::Sink;

/// Trait for components that consume log records.
///
/// See [`Sink`] for connecting subscribers to the bus.
pub use sink::Subscriber;

//
// System Management
//

/// Actor system settings: minimum log level, default ask timeout and dispatcher throughput.
pub use config::Config;

/// Primary entry point for creating actor systems.
///
/// See [`SystemRef`] and [`SystemRunner`] for system management.
pub use system::ActorSystem;

/// System-level events used to coordinate the shutdown.
pub use system::SystemEvent;

/// Reference to the actor system providing system-level operations.
///
/// Enables actor creation and lookup, access to the event bus and the configuration, and
/// system shutdown.
pub use system::SystemRef;

/// System runner. Execute using `runner.run().await` in a dedicated async task; it returns
/// once the system is stopped.
pub use system::SystemRunner;
