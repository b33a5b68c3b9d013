// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

use actor::{Actor, ActorContext, ActorPath, Error, Handler, LogFilter, Message, Response};
use testkit::{DEFAULT_TIMEOUT, TestKit};

use async_trait::async_trait;

use std::time::Duration;

#[derive(Debug, Clone)]
enum UserCommand {
    CreateUserWithValidUserInfo,
    CreateUserWithInvalidUserInfo,
    IndexUsers,
}

impl Message for UserCommand {}

#[derive(Debug, Clone, PartialEq)]
struct OperationResult {
    successful: bool,
}

impl Response for OperationResult {}

struct UserIdentityActor;

#[async_trait]
impl Actor for UserIdentityActor {
    type Message = UserCommand;
    type Response = OperationResult;
}

#[async_trait]
impl Handler<UserIdentityActor> for UserIdentityActor {
    async fn handle_message(
        &mut self,
        _sender: ActorPath,
        msg: UserCommand,
        ctx: &mut ActorContext<UserIdentityActor>,
    ) -> Result<Option<OperationResult>, Error> {
        match msg {
            UserCommand::CreateUserWithValidUserInfo => {
                Ok(Some(OperationResult { successful: true }))
            }
            UserCommand::CreateUserWithInvalidUserInfo => {
                Ok(Some(OperationResult { successful: false }))
            }
            UserCommand::IndexUsers => {
                ctx.log().info("indexing users");
                Ok(None)
            }
        }
    }
}

#[tokio::test]
async fn identity_actor_confirms_user_creation_success() {
    let kit = TestKit::new().await.unwrap();
    let identity = kit.actor_of("identity", UserIdentityActor).await.unwrap();

    kit.tell(&identity, UserCommand::CreateUserWithValidUserInfo);
    let result = kit
        .expect_message::<OperationResult>(DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert!(result.successful);
    assert_eq!(kit.test_actor().pending(), 0);
}

#[tokio::test]
async fn identity_actor_confirms_user_creation_failure() {
    let kit = TestKit::new().await.unwrap();
    let identity = kit.actor_of("identity", UserIdentityActor).await.unwrap();

    kit.tell(&identity, UserCommand::CreateUserWithInvalidUserInfo);
    let result = kit
        .expect_message::<OperationResult>(DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert!(!result.successful);
}

#[tokio::test]
async fn identity_actor_does_not_respond_to_index_messages() {
    let kit = TestKit::new().await.unwrap();
    let identity = kit.actor_of("identity", UserIdentityActor).await.unwrap();

    kit.tell(&identity, UserCommand::IndexUsers);
    kit.expect_no_message(Duration::from_millis(500))
        .await
        .unwrap();
}

#[tokio::test]
async fn identity_actor_logs_user_indexing() {
    let kit = TestKit::new().await.unwrap();
    let identity = kit.actor_of("identity", UserIdentityActor).await.unwrap();
    let logs = kit.log_probe();

    identity.tell(UserCommand::IndexUsers);
    let record = logs
        .expect_one(LogFilter::info().message("indexing users"), DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(record.source, ActorPath::from("/user/identity"));
}

#[tokio::test]
async fn ask_returns_the_reply() {
    let kit = TestKit::new().await.unwrap();
    let identity = kit.actor_of("identity", UserIdentityActor).await.unwrap();

    let result = identity
        .ask(UserCommand::CreateUserWithValidUserInfo)
        .await
        .unwrap();
    assert_eq!(result, OperationResult { successful: true });
    // Replies to an ask never reach the test actor.
    kit.expect_no_message(Duration::from_millis(200))
        .await
        .unwrap();
    kit.shutdown().await;
}
