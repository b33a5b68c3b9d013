// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Ready-made actors for tests.

use actor::{Actor, ActorContext, ActorPath, Error, Handler, Message, Response};

use async_trait::async_trait;
use tracing::debug;

use std::marker::PhantomData;

/// Accepts every `M` and never replies. Asks to it always time out.
pub struct BlackHoleActor<M, R> {
    _marker: PhantomData<fn() -> (M, R)>,
}

impl<M, R> BlackHoleActor<M, R> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<M, R> Default for BlackHoleActor<M, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M, R> Actor for BlackHoleActor<M, R>
where
    M: Message,
    R: Response,
{
    type Message = M;
    type Response = R;
}

#[async_trait]
impl<M, R> Handler<BlackHoleActor<M, R>> for BlackHoleActor<M, R>
where
    M: Message,
    R: Response,
{
    async fn handle_message(
        &mut self,
        sender: ActorPath,
        _msg: M,
        ctx: &mut ActorContext<BlackHoleActor<M, R>>,
    ) -> Result<Option<R>, Error> {
        debug!("{} swallowed a message from {}.", ctx.path(), sender);
        Ok(None)
    }
}

/// Replies to every message with the message itself.
pub struct EchoActor<M> {
    _marker: PhantomData<fn() -> M>,
}

impl<M> EchoActor<M> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<M> Default for EchoActor<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M> Actor for EchoActor<M>
where
    M: Message + Response,
{
    type Message = M;
    type Response = M;
}

#[async_trait]
impl<M> Handler<EchoActor<M>> for EchoActor<M>
where
    M: Message + Response,
{
    async fn handle_message(
        &mut self,
        _sender: ActorPath,
        msg: M,
        _ctx: &mut ActorContext<EchoActor<M>>,
    ) -> Result<Option<M>, Error> {
        Ok(Some(msg))
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use actor::ActorSystem;
    use tokio_util::sync::CancellationToken;

    use std::time::Duration;

    #[tokio::test]
    async fn test_echo_and_black_hole() {
        let (system, _runner) = ActorSystem::create(CancellationToken::new());
        let echo = system
            .create_root_actor("echo", EchoActor::<String>::new())
            .await
            .unwrap();
        assert_eq!(echo.ask("ping".to_owned()).await.unwrap(), "ping");

        let hole = system
            .create_root_actor("hole", BlackHoleActor::<String, bool>::new())
            .await
            .unwrap();
        let result = hole
            .ask_timeout("anyone?".to_owned(), Duration::from_millis(100))
            .await;
        assert!(matches!(result, Err(Error::AskTimeout { .. })));
    }
}
