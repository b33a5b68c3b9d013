// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

use actor::{
    Actor, ActorContext, ActorPath, ActorRef, Error, Handler, Message, Response, pipe_to,
};
use testkit::{BlackHoleActor, TestKit};

use async_trait::async_trait;
use tokio::time::Instant;

use std::time::Duration;

const AUTH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
struct CreateUser {
    name: String,
}

impl Message for CreateUser {}

#[derive(Debug, Clone, PartialEq)]
struct UserResult {
    successful: bool,
}

impl Response for UserResult {}

/// Creates users once the authenticator approved them, within two seconds.
struct IdentityManagerActor<A>
where
    A: Actor<Message = CreateUser, Response = UserResult> + Handler<A>,
{
    authenticator: ActorRef<A>,
}

#[async_trait]
impl<A> Actor for IdentityManagerActor<A>
where
    A: Actor<Message = CreateUser, Response = UserResult> + Handler<A>,
{
    type Message = CreateUser;
    type Response = UserResult;
}

#[async_trait]
impl<A> Handler<IdentityManagerActor<A>> for IdentityManagerActor<A>
where
    A: Actor<Message = CreateUser, Response = UserResult> + Handler<A>,
{
    async fn handle_message(
        &mut self,
        _sender: ActorPath,
        msg: CreateUser,
        ctx: &mut ActorContext<IdentityManagerActor<A>>,
    ) -> Result<Option<UserResult>, Error> {
        // The reply address of this request, captured before the next message replaces it.
        let Some(reply_to) = ctx.reply_to() else {
            return Ok(None);
        };
        let authenticator = self.authenticator.clone();
        pipe_to(
            async move {
                authenticator
                    .ask_timeout(msg, AUTH_TIMEOUT)
                    .await
                    .unwrap_or(UserResult { successful: false })
            },
            reply_to,
        );
        Ok(None)
    }
}

/// Approves every user with a name.
struct AuthenticationActor;

#[async_trait]
impl Actor for AuthenticationActor {
    type Message = CreateUser;
    type Response = UserResult;
}

#[async_trait]
impl Handler<AuthenticationActor> for AuthenticationActor {
    async fn handle_message(
        &mut self,
        _sender: ActorPath,
        msg: CreateUser,
        _ctx: &mut ActorContext<AuthenticationActor>,
    ) -> Result<Option<UserResult>, Error> {
        Ok(Some(UserResult {
            successful: !msg.name.is_empty(),
        }))
    }
}

#[tokio::test]
async fn identity_manager_fails_create_user_on_timeout() {
    let kit = TestKit::new().await.unwrap();
    let blackhole = kit
        .actor_of("blackhole", BlackHoleActor::<CreateUser, UserResult>::new())
        .await
        .unwrap();
    let identity = kit
        .actor_of(
            "identity",
            IdentityManagerActor {
                authenticator: blackhole,
            },
        )
        .await
        .unwrap();

    let started = Instant::now();
    kit.tell(
        &identity,
        CreateUser {
            name: "alice".to_owned(),
        },
    );
    let result = kit
        .expect_message::<UserResult>(Duration::from_secs(3))
        .await
        .unwrap();
    assert!(!result.successful);
    assert!(started.elapsed() >= AUTH_TIMEOUT);
}

#[tokio::test]
async fn identity_manager_forwards_the_authentication_result() {
    let kit = TestKit::new().await.unwrap();
    let authenticator = kit.actor_of("auth", AuthenticationActor).await.unwrap();
    let identity = kit
        .actor_of("identity", IdentityManagerActor { authenticator })
        .await
        .unwrap();

    kit.tell(
        &identity,
        CreateUser {
            name: "bob".to_owned(),
        },
    );
    kit.tell(
        &identity,
        CreateUser {
            name: String::new(),
        },
    );

    let mut results = vec![
        kit.expect_message::<UserResult>(Duration::from_secs(3))
            .await
            .unwrap()
            .successful,
        kit.expect_message::<UserResult>(Duration::from_secs(3))
            .await
            .unwrap()
            .successful,
    ];
    // The two continuations run independently.
    results.sort();
    assert_eq!(results, vec![false, true]);
}
