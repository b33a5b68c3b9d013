// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Reply addresses and the ask pattern
//!
//! Sends are one-way. A request/response exchange is built by attaching a reply address (a
//! [`Recipient`]) to the outgoing message. For an ask, that recipient completes a one-shot
//! slot guarded by a mutex, so a reply racing the deadline resolves the ask exactly once:
//! either the reply is delivered or the ask times out, never both. Replies arriving after the
//! slot is closed are reported as dead letters.
//!

use crate::{ActorPath, Error, EventBus};

use tokio::sync::oneshot;
use tracing::debug;

use std::{
    any::type_name,
    fmt,
    future::Future,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

static NEXT_ASK: AtomicU64 = AtomicU64::new(1);

/// Send-only handle accepting messages of type `M`.
///
/// Recipients are obtained from an [`ActorRef`](crate::ActorRef) whose message type can be
/// built from `M`, from a test probe, or internally from a pending ask.
pub struct Recipient<M> {
    path: ActorPath,
    deliver: Arc<dyn Fn(M) + Send + Sync>,
}

impl<M: Send + 'static> Recipient<M> {
    /// Creates a recipient from a delivery function. The function must not block.
    pub fn new(path: ActorPath, deliver: impl Fn(M) + Send + Sync + 'static) -> Self {
        Self {
            path,
            deliver: Arc::new(deliver),
        }
    }

    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    /// Delivers a message. Undeliverable messages become dead letters.
    pub fn tell(&self, message: M) {
        (self.deliver)(message)
    }

    /// Adapts the recipient to accept `N`, converting with `f` before delivery.
    pub fn map<N, F>(self, f: F) -> Recipient<N>
    where
        N: Send + 'static,
        F: Fn(N) -> M + Send + Sync + 'static,
    {
        let path = self.path.clone();
        Recipient::new(path, move |message| self.tell(f(message)))
    }
}

impl<M> Clone for Recipient<M> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            deliver: self.deliver.clone(),
        }
    }
}

impl<M> fmt::Debug for Recipient<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recipient({})", self.path)
    }
}

/// Runs `future` in its own task and delivers its output to `recipient`.
///
/// This is how an actor composes with an ask without waiting inside its handler: the
/// outcome comes back later as an ordinary message.
pub fn pipe_to<F>(future: F, recipient: Recipient<F::Output>)
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(async move {
        let value = future.await;
        recipient.tell(value);
    });
}

enum Slot<R> {
    Pending(oneshot::Sender<R>),
    Fulfilled,
    TimedOut,
    Cancelled,
}

type SharedSlot<R> = Arc<Mutex<Slot<R>>>;

fn lock<R>(slot: &SharedSlot<R>) -> std::sync::MutexGuard<'_, Slot<R>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One outstanding request waiting for its reply.
pub(crate) struct PendingAsk<R> {
    target: ActorPath,
    timeout: Duration,
    slot: SharedSlot<R>,
    receiver: oneshot::Receiver<R>,
}

impl<R: Send + 'static> PendingAsk<R> {
    /// Allocates the slot and the reply address that completes it.
    pub(crate) fn new(
        target: ActorPath,
        timeout: Duration,
        bus: EventBus,
    ) -> (Self, Recipient<R>) {
        let (sender, receiver) = oneshot::channel();
        let slot: SharedSlot<R> = Arc::new(Mutex::new(Slot::Pending(sender)));
        let reply_path = ActorPath::temp(NEXT_ASK.fetch_add(1, Ordering::Relaxed));

        let reply_slot = slot.clone();
        let dead_path = reply_path.clone();
        let recipient = Recipient::new(reply_path, move |reply: R| {
            let mut state = lock(&reply_slot);
            match std::mem::replace(&mut *state, Slot::Fulfilled) {
                Slot::Pending(sender) => {
                    // Sent under the lock so a timer firing now finds the reply queued.
                    let _ = sender.send(reply);
                }
                closed => {
                    *state = closed;
                    drop(state);
                    debug!("Discarding reply to closed ask {}.", dead_path);
                    bus.dead_letter(&dead_path, type_name::<R>());
                }
            }
        });

        (
            Self {
                target,
                timeout,
                slot,
                receiver,
            },
            recipient,
        )
    }

    /// Waits for the reply or the deadline, whichever comes first.
    pub(crate) async fn wait(mut self) -> Result<R, Error> {
        match tokio::time::timeout(self.timeout, &mut self.receiver).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(Error::Terminated(self.target.clone())),
            Err(_) => {
                let mut state = lock(&self.slot);
                if let Slot::Pending(_) = *state {
                    *state = Slot::TimedOut;
                    debug!("Ask to {} timed out.", self.target);
                    Err(Error::AskTimeout {
                        target: self.target.clone(),
                        timeout: self.timeout,
                    })
                } else {
                    drop(state);
                    // A reply won the race against the timer.
                    self.receiver.try_recv().map_err(|_| Error::AskTimeout {
                        target: self.target.clone(),
                        timeout: self.timeout,
                    })
                }
            }
        }
    }

    /// Closes the slot when the request could not even be enqueued.
    pub(crate) fn cancel(&self) {
        let mut state = lock(&self.slot);
        if let Slot::Pending(_) = *state {
            *state = Slot::Cancelled;
        }
    }
}

impl<R> Drop for PendingAsk<R> {
    fn drop(&mut self) {
        let mut state = lock(&self.slot);
        if let Slot::Pending(_) = *state {
            *state = Slot::Cancelled;
        }
    }
}
