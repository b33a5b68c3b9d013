// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Core library for the Troupe framework.
//! Provides the actor runtime (mailboxes, dispatch, request/response, event bus) and the test
//! kit used to assert on the messages and log records actors produce.

pub use actor::{
    Actor, ActorContext, ActorLifecycle, ActorPath, ActorRef, ActorSystem, AnyMessage, Config,
    Error as ActorError, EventBus, Handler, LogFilter, LogLevel, LogRecord, Logger, Matcher,
    Message, Recipient, Response, Sink, Subscriber, Subscription, SystemEvent, SystemRef,
    SystemRunner, Terminated, pipe_to,
};

pub use testkit::{
    BlackHoleActor, DEFAULT_TIMEOUT, EchoActor, ExpectError, LogProbe, TestKit, TestProbe,
};
