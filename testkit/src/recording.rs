// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Recording
//!
//! Append-only record of everything delivered to a probe. Deliveries append and wake waiters;
//! assertions inspect (and possibly consume) the unconsumed part under the same lock.
//!

use tokio::{
    sync::Notify,
    time::{Instant, timeout_at},
};

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// One delivery with its arrival time.
#[derive(Clone, Debug)]
pub struct Arrival<T> {
    pub at: Instant,
    pub item: T,
}

struct Shared<T> {
    items: Mutex<VecDeque<Arrival<T>>>,
    notify: Notify,
}

/// Shared handle to a record. Clones see the same items.
pub struct Recording<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Recording<T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                items: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
            }),
        }
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<Arrival<T>>> {
        self.shared
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item and wakes every waiting assertion.
    pub fn push(&self, item: T) {
        self.items().push_back(Arrival {
            at: Instant::now(),
            item,
        });
        self.shared.notify.notify_waiters();
    }

    /// Number of unconsumed items.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Removes and returns every unconsumed item.
    pub fn drain(&self) -> Vec<T> {
        self.items().drain(..).map(|arrival| arrival.item).collect()
    }

    /// Runs `inspect` over the unconsumed items.
    pub fn inspect<R>(&self, inspect: impl FnOnce(&mut VecDeque<Arrival<T>>) -> R) -> R {
        inspect(&mut self.items())
    }

    /// Re-runs `check` after every arrival until it returns `Some` or `deadline` passes.
    ///
    /// The wake-up is registered before the items are inspected, so an arrival racing the
    /// check is seen either by the check or by the next wake-up.
    pub async fn wait_until<R>(
        &self,
        deadline: Instant,
        mut check: impl FnMut(&mut VecDeque<Arrival<T>>) -> Option<R>,
    ) -> Option<R> {
        loop {
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(result) = check(&mut self.items()) {
                return Some(result);
            }
            if timeout_at(deadline, notified).await.is_err() {
                return check(&mut self.items());
            }
        }
    }
}

impl<T> Default for Recording<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Recording<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_sees_concurrent_push() {
        let recording = Recording::new();
        let writer = recording.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.push(1u32);
            writer.push(2u32);
        });

        let deadline = Instant::now() + Duration::from_secs(1);
        let found = recording
            .wait_until(deadline, |items| {
                (items.len() == 2).then(|| items.iter().map(|a| a.item).sum::<u32>())
            })
            .await;
        assert_eq!(found, Some(3));
        assert_eq!(recording.drain(), vec![1, 2]);
        assert!(recording.is_empty());
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let recording: Recording<u32> = Recording::default();
        let started = Instant::now();
        let deadline = started + Duration::from_millis(50);
        let found = recording.wait_until(deadline, |items| items.pop_front()).await;
        assert!(found.is_none());
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
