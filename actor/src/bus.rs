// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Event bus
//!
//! System-wide publish/subscribe channel for [`LogRecord`]s, independent of actor mailboxes.
//! Every subscriber owns an unbounded channel, so publishing never waits on a slow subscriber
//! and each subscriber observes records in publish order.
//!

use crate::{ActorPath, LogLevel, LogRecord};

use tokio::sync::mpsc;
use tracing::debug;

use std::{
    collections::HashMap,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

/// Identifier of a bus subscription.
pub type SubscriptionId = u64;

/// Receiver side of a bus subscription.
pub type LogReceiver = mpsc::UnboundedReceiver<LogRecord>;

/// Content matcher for log messages.
#[derive(Clone, Debug, PartialEq)]
pub enum Matcher {
    /// Whole message, case-sensitive.
    Exact(String),
    /// Substring, case-insensitive.
    Contains(String),
}

impl Matcher {
    pub fn matches(&self, message: &str) -> bool {
        match self {
            Matcher::Exact(expected) => message == expected,
            Matcher::Contains(part) => {
                message.to_lowercase().contains(&part.to_lowercase())
            }
        }
    }
}

/// Selects the records a subscriber (or an assertion) is interested in. An empty filter
/// matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogFilter {
    level: Option<LogLevel>,
    source: Option<ActorPath>,
    matcher: Option<Matcher>,
}

impl LogFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn debug() -> Self {
        Self::any().level(LogLevel::Debug)
    }

    pub fn info() -> Self {
        Self::any().level(LogLevel::Info)
    }

    pub fn warning() -> Self {
        Self::any().level(LogLevel::Warning)
    }

    pub fn error() -> Self {
        Self::any().level(LogLevel::Error)
    }

    /// Only records with exactly this level.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Only records emitted by this path.
    pub fn source(mut self, source: ActorPath) -> Self {
        self.source = Some(source);
        self
    }

    /// Only records whose message is exactly `message`.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.matcher = Some(Matcher::Exact(message.into()));
        self
    }

    /// Only records whose message contains `part`, ignoring case.
    pub fn contains(mut self, part: impl Into<String>) -> Self {
        self.matcher = Some(Matcher::Contains(part.into()));
        self
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        self.level.map_or(true, |level| level == record.level)
            && self.source.as_ref().map_or(true, |source| *source == record.source)
            && self
                .matcher
                .as_ref()
                .map_or(true, |matcher| matcher.matches(&record.message))
    }
}

struct Subscriber {
    filter: LogFilter,
    sender: mpsc::UnboundedSender<LogRecord>,
}

struct Inner {
    min_level: LogLevel,
    next_id: AtomicU64,
    subscribers: RwLock<HashMap<SubscriptionId, Subscriber>>,
}

/// Handle to the event bus. Clones share the same subscriber table.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

/// An active subscription: its id and the receiver records are delivered to.
pub struct Subscription {
    pub id: SubscriptionId,
    pub receiver: LogReceiver,
}

impl EventBus {
    /// Creates a bus dropping every record below `min_level`.
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            inner: Arc::new(Inner {
                min_level,
                next_id: AtomicU64::new(1),
                subscribers: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.inner.min_level
    }

    /// Registers a subscriber for the records matching `filter`.
    pub fn subscribe(&self, filter: LogFilter) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Subscriber { filter, sender });
        debug!("Subscriber {} registered on the event bus.", id);
        Subscription { id, receiver }
    }

    /// Removes a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    /// Number of registered subscribers.
    pub fn subscribers(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Publishes a record to every matching subscriber.
    pub fn publish(&self, record: LogRecord) {
        if record.level < self.inner.min_level {
            return;
        }
        let mut closed = Vec::new();
        {
            let subscribers = self
                .inner
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            for (id, subscriber) in subscribers.iter() {
                if subscriber.filter.matches(&record)
                    && subscriber.sender.send(record.clone()).is_err()
                {
                    closed.push(*id);
                }
            }
        }
        for id in closed {
            debug!("Removing closed subscriber {} from the event bus.", id);
            self.unsubscribe(id);
        }
    }

    /// Reports a message that could not be delivered to `target`.
    pub fn dead_letter(&self, target: &ActorPath, type_name: &str) {
        debug!("Dead letter {} to {}.", type_name, target);
        self.publish(LogRecord::new(
            LogLevel::Info,
            target.clone(),
            format!(
                "Message [{}] to {} was not delivered. [dead letter]",
                type_name, target
            ),
        ));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}
