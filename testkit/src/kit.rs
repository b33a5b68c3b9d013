// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Test kit
//!
//! Fixture owning an actor system, a default probe (the *test actor*) and the helpers most
//! tests need. Messages sent with [`TestKit::tell`] carry the test actor as reply address, so
//! replies can be asserted with [`TestKit::expect_message`].
//!

use crate::{ExpectError, LogProbe, TestProbe};

use actor::{Actor, ActorRef, ActorSystem, Config, Handler, SystemRef};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use std::{
    fmt::Debug,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

/// Timeout used by the shortcuts when a test does not give one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

pub struct TestKit {
    system: SystemRef,
    token: CancellationToken,
    runner: JoinHandle<()>,
    test_actor: TestProbe,
    probes: AtomicUsize,
}

impl TestKit {
    /// Builds a kit on a system with the default configuration.
    pub async fn new() -> Result<Self, ExpectError> {
        Self::with_config(Config::default()).await
    }

    /// Builds a kit on a system with the given configuration.
    pub async fn with_config(config: Config) -> Result<Self, ExpectError> {
        let token = CancellationToken::new();
        let (system, mut runner) = ActorSystem::with_config(token.clone(), config)?;
        let runner = tokio::spawn(async move {
            runner.run().await;
        });
        let test_actor = TestProbe::new(&system, "testActor").await?;
        debug!("Test kit ready.");
        Ok(Self {
            system,
            token,
            runner,
            test_actor,
            probes: AtomicUsize::new(0),
        })
    }

    pub fn system(&self) -> &SystemRef {
        &self.system
    }

    /// The default probe.
    pub fn test_actor(&self) -> &TestProbe {
        &self.test_actor
    }

    /// Creates a top level actor.
    pub async fn actor_of<A>(&self, name: &str, actor: A) -> Result<ActorRef<A>, ExpectError>
    where
        A: Actor + Handler<A>,
    {
        Ok(self.system.create_root_actor(name, actor).await?)
    }

    /// Creates an actor whose parent is the test actor. Whatever it sends to its parent, and
    /// its termination notice, is recorded by the test actor.
    pub async fn child_of_test_actor<A>(
        &self,
        name: &str,
        actor: A,
    ) -> Result<ActorRef<A>, ExpectError>
    where
        A: Actor + Handler<A>,
    {
        Ok(self
            .system
            .create_child_of(self.test_actor.actor_ref(), name, actor)
            .await?)
    }

    /// Creates a fresh probe with a generated name.
    pub async fn create_probe(&self) -> Result<TestProbe, ExpectError> {
        let id = self.probes.fetch_add(1, Ordering::Relaxed);
        Ok(TestProbe::new(&self.system, &format!("probe-{}", id)).await?)
    }

    /// Starts capturing the log records of the system.
    pub fn log_probe(&self) -> LogProbe {
        LogProbe::new(&self.system)
    }

    /// Sends `message` to `target` with the test actor as sender of record.
    pub fn tell<A>(&self, target: &ActorRef<A>, message: A::Message)
    where
        A: Actor + Handler<A>,
        A::Response: Debug,
    {
        target.tell_from(message, self.test_actor.recipient());
    }

    /// [`TestProbe::expect_message`] on the test actor.
    pub async fn expect_message<T>(&self, timeout: Duration) -> Result<T, ExpectError>
    where
        T: Clone + 'static,
    {
        self.test_actor.expect_message(timeout).await
    }

    /// [`TestProbe::expect_message_eq`] on the test actor.
    pub async fn expect_message_eq<T>(&self, value: T, timeout: Duration) -> Result<T, ExpectError>
    where
        T: Clone + Debug + PartialEq + 'static,
    {
        self.test_actor.expect_message_eq(value, timeout).await
    }

    /// [`TestProbe::expect_no_message`] on the test actor.
    pub async fn expect_no_message(&self, window: Duration) -> Result<(), ExpectError> {
        self.test_actor.expect_no_message(window).await
    }

    /// Stops every actor and waits for the system runner to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(error) = self.runner.await {
            debug!("System runner ended abnormally: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::EchoActor;

    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn test_tell_replies_to_test_actor() {
        let kit = TestKit::new().await.unwrap();
        assert!(logs_contain("Test kit ready."));
        let echo = kit
            .actor_of("echo", EchoActor::<String>::new())
            .await
            .unwrap();
        kit.tell(&echo, "hi".to_owned());
        assert_eq!(
            kit.expect_message_eq("hi".to_owned(), DEFAULT_TIMEOUT)
                .await
                .unwrap(),
            "hi"
        );
        assert!(logs_contain("Probe /user/testActor received"));
        assert!(
            kit.expect_no_message(Duration::from_millis(100))
                .await
                .is_ok()
        );

        let probe = kit.create_probe().await.unwrap();
        assert_eq!(probe.path().to_string(), "/user/probe-0");
        kit.shutdown().await;
        assert!(echo.is_closed());
        assert!(probe.actor_ref().is_closed());
    }
}
