// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Log probe
//!
//! Records every log record published on the event bus of a system (at or above the system's
//! minimum level) and asserts on the records matching a [`LogFilter`].
//!

use crate::{Arrival, ExpectError, Recording};

use actor::{EventBus, LogFilter, LogRecord, Sink, Subscriber, SystemRef};

use async_trait::async_trait;
use tokio::time::Instant;

use std::{collections::VecDeque, time::Duration};

struct RecordingSubscriber(Recording<LogRecord>);

#[async_trait]
impl Subscriber for RecordingSubscriber {
    async fn notify(&self, record: LogRecord) {
        self.0.push(record);
    }
}

/// Bus subscriber fed by a [`Sink`]. Unsubscribes when dropped.
pub struct LogProbe {
    record: Recording<LogRecord>,
    bus: EventBus,
    subscription_id: u64,
}

impl LogProbe {
    /// Subscribes to the bus of `system`. Records published from now on are captured.
    pub fn new(system: &SystemRef) -> Self {
        let record = Recording::new();
        let subscription = system.event_bus().subscribe(LogFilter::any());
        let subscription_id = subscription.id;
        system.run_sink(Sink::new(
            subscription,
            RecordingSubscriber(record.clone()),
        ));
        Self {
            record,
            bus: system.event_bus().clone(),
            subscription_id,
        }
    }

    /// Unconsumed records.
    pub fn records(&self) -> Vec<LogRecord> {
        self.record
            .inspect(|items| items.iter().map(|arrival| arrival.item.clone()).collect())
    }

    /// Expects exactly `count` records matching `filter` and consumes them.
    ///
    /// With `count > 0`, waits until `count` matching records were captured and fails if more
    /// than `count` match. With `count == 0`, fails on the first match within `timeout`.
    /// Records not matching the filter stay in place.
    pub async fn expect_log_matching(
        &self,
        filter: LogFilter,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<LogRecord>, ExpectError> {
        let deadline = Instant::now() + timeout;
        // Counting and consuming happen under one lock, so a record arriving meanwhile is
        // neither taken nor counted.
        let found = self
            .record
            .wait_until(deadline, |items| {
                let matches = items
                    .iter()
                    .filter(|arrival| filter.matches(&arrival.item))
                    .count();
                let reached = if count == 0 {
                    matches > 0
                } else {
                    matches >= count
                };
                if !reached {
                    return None;
                }
                if matches == count {
                    Some(Ok(take_matching(items, &filter)))
                } else {
                    Some(Err(matches))
                }
            })
            .await;

        match found {
            Some(Ok(records)) => Ok(records),
            Some(Err(actual)) => Err(ExpectError::LogCount {
                filter: format!("{:?}", filter),
                expected: count,
                actual,
            }),
            None if count == 0 => Ok(Vec::new()),
            None => {
                let actual = self.record.inspect(|items| {
                    items
                        .iter()
                        .filter(|arrival| filter.matches(&arrival.item))
                        .count()
                });
                Err(ExpectError::LogCount {
                    filter: format!("{:?}", filter),
                    expected: count,
                    actual,
                })
            }
        }
    }

    /// Expects exactly one matching record and returns it.
    pub async fn expect_one(
        &self,
        filter: LogFilter,
        timeout: Duration,
    ) -> Result<LogRecord, ExpectError> {
        let mut records = self.expect_log_matching(filter, 1, timeout).await?;
        records.pop().ok_or(ExpectError::Timeout {
            expected: "one log record".to_owned(),
            timeout,
        })
    }

    /// Expects no matching record within `window`.
    pub async fn expect_none(
        &self,
        filter: LogFilter,
        window: Duration,
    ) -> Result<(), ExpectError> {
        self.expect_log_matching(filter, 0, window).await.map(|_| ())
    }
}

impl Drop for LogProbe {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription_id);
    }
}

fn take_matching(
    items: &mut VecDeque<Arrival<LogRecord>>,
    filter: &LogFilter,
) -> Vec<LogRecord> {
    let mut taken = Vec::new();
    items.retain(|arrival| {
        if filter.matches(&arrival.item) {
            taken.push(arrival.item.clone());
            false
        } else {
            true
        }
    });
    taken
}
