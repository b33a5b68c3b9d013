// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Test probe
//!
//! A probe is an actor that accepts any message and records it, together with the termination
//! notices of its children. Tests send through it (as reply address or as parent) and then
//! assert on what arrived.
//!

use crate::{ExpectError, Recording, recording::Arrival};

use actor::{
    Actor, ActorContext, ActorPath, ActorRef, AnyMessage, Error, Handler, Recipient, SystemRef,
    Terminated,
};

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use std::{any::type_name, collections::VecDeque, fmt::Debug, time::Duration};

/// A delivery recorded by a probe.
#[derive(Clone, Debug)]
pub struct Envelope {
    /// Reply address of the delivery, or `/deadLetters`.
    pub sender: ActorPath,
    pub message: AnyMessage,
}

/// Actor behind a [`TestProbe`].
pub struct ProbeActor {
    record: Recording<Envelope>,
}

#[async_trait]
impl Actor for ProbeActor {
    type Message = AnyMessage;
    type Response = ();

    fn from_any(message: AnyMessage) -> Option<AnyMessage> {
        Some(message)
    }
}

#[async_trait]
impl Handler<ProbeActor> for ProbeActor {
    async fn handle_message(
        &mut self,
        sender: ActorPath,
        msg: AnyMessage,
        ctx: &mut ActorContext<ProbeActor>,
    ) -> Result<Option<()>, Error> {
        debug!("Probe {} received {:?}.", ctx.path(), msg);
        self.record.push(Envelope {
            sender,
            message: msg,
        });
        Ok(None)
    }

    async fn on_child_terminated(
        &mut self,
        child: ActorPath,
        fault: Option<Error>,
        _ctx: &mut ActorContext<ProbeActor>,
    ) {
        self.record.push(Envelope {
            sender: child.clone(),
            message: AnyMessage::new(Terminated {
                actor: child,
                fault,
            }),
        });
    }
}

/// Handle to a probe actor plus the assertions over its record.
#[derive(Clone)]
pub struct TestProbe {
    actor_ref: ActorRef<ProbeActor>,
    record: Recording<Envelope>,
}

impl TestProbe {
    /// Starts a probe as top level actor `name`.
    pub async fn new(system: &SystemRef, name: &str) -> Result<Self, Error> {
        let record = Recording::new();
        let actor_ref = system
            .create_root_actor(
                name,
                ProbeActor {
                    record: record.clone(),
                },
            )
            .await?;
        Ok(Self { actor_ref, record })
    }

    pub fn actor_ref(&self) -> &ActorRef<ProbeActor> {
        &self.actor_ref
    }

    pub fn path(&self) -> ActorPath {
        self.actor_ref.path()
    }

    /// Reply address recording every `M` delivered to it.
    pub fn recipient<M>(&self) -> Recipient<M>
    where
        M: Debug + Send + Sync + 'static,
    {
        let actor_ref = self.actor_ref.clone();
        Recipient::new(self.path(), move |message: M| {
            actor_ref.tell(AnyMessage::new(message))
        })
    }

    /// Sender of the most recent unconsumed delivery.
    pub fn last_sender(&self) -> Option<ActorPath> {
        self.record
            .inspect(|items| items.back().map(|arrival| arrival.item.sender.clone()))
    }

    /// Unconsumed deliveries.
    pub fn pending(&self) -> usize {
        self.record.len()
    }

    /// Waits for the next delivery and returns it if it is a `T`.
    ///
    /// Fails with [`ExpectError::Mismatch`] if the next delivery has another type (it is left
    /// in the record) and with [`ExpectError::Timeout`] if nothing arrives in time.
    pub async fn expect_message<T>(&self, timeout: Duration) -> Result<T, ExpectError>
    where
        T: Clone + 'static,
    {
        let expected = format!("message of type {}", type_name::<T>());
        let deadline = Instant::now() + timeout;
        self.record
            .wait_until(deadline, |items| take_head::<T>(items, &expected))
            .await
            .unwrap_or_else(|| {
                Err(ExpectError::Timeout {
                    expected: expected.clone(),
                    timeout,
                })
            })
    }

    /// As [`TestProbe::expect_message`], and the message must equal `value`.
    pub async fn expect_message_eq<T>(
        &self,
        value: T,
        timeout: Duration,
    ) -> Result<T, ExpectError>
    where
        T: Clone + Debug + PartialEq + 'static,
    {
        let message = self.expect_message::<T>(timeout).await?;
        if message == value {
            Ok(message)
        } else {
            Err(ExpectError::Mismatch {
                expected: format!("{:?}", value),
                actual: format!("{:?}", message),
            })
        }
    }

    /// Fails as soon as anything is delivered within `window`, or if something is already
    /// waiting unconsumed.
    pub async fn expect_no_message(&self, window: Duration) -> Result<(), ExpectError> {
        let deadline = Instant::now() + window;
        let arrived = self
            .record
            .wait_until(deadline, |items| items.front().map(describe))
            .await;
        match arrived {
            Some(actual) => Err(ExpectError::Unexpected {
                expected: format!("no message within {:?}", window),
                actual,
            }),
            None => Ok(()),
        }
    }

    /// Waits for the termination notice of the child at `path`.
    pub async fn expect_terminated(
        &self,
        path: &ActorPath,
        timeout: Duration,
    ) -> Result<Terminated, ExpectError> {
        let notice = self.expect_message::<Terminated>(timeout).await?;
        if &notice.actor == path {
            Ok(notice)
        } else {
            Err(ExpectError::Mismatch {
                expected: format!("termination of {}", path),
                actual: format!("termination of {}", notice.actor),
            })
        }
    }
}

fn describe(arrival: &Arrival<Envelope>) -> String {
    format!(
        "{} {:?}",
        arrival.item.message.type_name(),
        arrival.item.message
    )
}

fn take_head<T: Clone + 'static>(
    items: &mut VecDeque<Arrival<Envelope>>,
    expected: &str,
) -> Option<Result<T, ExpectError>> {
    let head = items.front()?;
    match head.item.message.downcast::<T>() {
        Some(message) => {
            items.pop_front();
            Some(Ok(message))
        }
        None => Some(Err(ExpectError::Mismatch {
            expected: expected.to_owned(),
            actual: describe(head),
        })),
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use actor::ActorSystem;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_expect_message_by_type() {
        let (system, _runner) = ActorSystem::create(CancellationToken::new());
        let probe = TestProbe::new(&system, "probe").await.unwrap();

        probe.recipient::<String>().tell("hello".to_owned());
        probe.recipient::<u32>().tell(7);

        let error = probe
            .expect_message::<u32>(Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(error, ExpectError::Mismatch { .. }));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(probe.pending(), 2);
        assert_eq!(probe.last_sender(), Some(ActorPath::no_sender()));

        assert_eq!(
            probe
                .expect_message_eq("hello".to_owned(), Duration::from_secs(1))
                .await
                .unwrap(),
            "hello"
        );
        assert_eq!(
            probe.expect_message::<u32>(Duration::from_secs(1)).await,
            Ok(7)
        );
        assert_eq!(probe.pending(), 0);
    }

    #[tokio::test]
    async fn test_expect_message_timeout() {
        let (system, _runner) = ActorSystem::create(CancellationToken::new());
        let probe = TestProbe::new(&system, "probe").await.unwrap();
        let started = Instant::now();
        let error = probe
            .expect_message::<String>(Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert_eq!(
            error,
            ExpectError::Timeout {
                expected: format!("message of type {}", type_name::<String>()),
                timeout: Duration::from_millis(100),
            }
        );
    }

    #[tokio::test]
    async fn test_expect_no_message_fails_on_arrival() {
        let (system, _runner) = ActorSystem::create(CancellationToken::new());
        let probe = TestProbe::new(&system, "probe").await.unwrap();

        let recipient = probe.recipient::<String>();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            recipient.tell("late".to_owned());
        });

        let started = Instant::now();
        let error = probe
            .expect_no_message(Duration::from_secs(2))
            .await
            .unwrap_err();
        // Fails on the arrival, not at the end of the window.
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(error, ExpectError::Unexpected { .. }));

        probe.expect_message::<String>(Duration::from_secs(1)).await.unwrap();
        assert!(probe.expect_no_message(Duration::from_millis(50)).await.is_ok());
    }
}
