// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Event sink and subscriber pattern implementation.
//!
//! A sink runs in its own task, pulls the records of one bus subscription and hands each of
//! them to a [`Subscriber`]. Records reach the subscriber in publish order.

use crate::{LogRecord, bus::Subscription};

use async_trait::async_trait;

use tracing::debug;

/// A sink that receives records from the event bus and notifies a subscriber.
pub struct Sink {
    /// The subscriber that will be notified of records.
    subscriber: Box<dyn Subscriber>,
    /// The bus subscription records are read from.
    subscription: Subscription,
}

impl Sink {
    /// Creates a new sink for the given subscription.
    pub fn new(subscription: Subscription, subscriber: impl Subscriber) -> Self {
        Sink {
            subscriber: Box::new(subscriber),
            subscription,
        }
    }

    /// Id of the bus subscription feeding this sink.
    pub fn subscription_id(&self) -> u64 {
        self.subscription.id
    }

    /// Runs the sink's processing loop until the subscription is closed (unsubscribed or
    /// the bus dropped). Should be spawned in a separate task.
    pub async fn run(&mut self) {
        while let Some(record) = self.subscription.receiver.recv().await {
            self.subscriber.notify(record).await;
        }
        debug!("Sink {} finished.", self.subscription.id);
    }
}

/// Trait for types that consume log records delivered by a [`Sink`].
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Called once for every record delivered to the sink.
    async fn notify(&self, record: LogRecord);
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::{ActorPath, EventBus, LogFilter, LogLevel};

    use std::sync::{Arc, Mutex};

    struct Collect(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl Subscriber for Collect {
        async fn notify(&self, record: LogRecord) {
            self.0.lock().unwrap().push(record.message);
        }
    }

    #[tokio::test]
    async fn test_sink_delivers_in_order_and_stops() {
        let bus = EventBus::new(LogLevel::Debug);
        let collected = Arc::new(Mutex::new(Vec::new()));
        let subscription = bus.subscribe(LogFilter::any());
        let id = subscription.id;
        let mut sink = Sink::new(subscription, Collect(collected.clone()));
        assert_eq!(sink.subscription_id(), id);
        let task = tokio::spawn(async move { sink.run().await });

        for i in 0..5 {
            bus.publish(LogRecord::new(
                LogLevel::Debug,
                ActorPath::from("/user/a"),
                i.to_string(),
            ));
        }
        bus.unsubscribe(id);
        task.await.unwrap();

        assert_eq!(*collected.lock().unwrap(), vec!["0", "1", "2", "3", "4"]);
    }
}
