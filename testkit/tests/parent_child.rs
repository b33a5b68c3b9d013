// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

use actor::{Actor, ActorContext, ActorPath, Error, Handler};
use testkit::{DEFAULT_TIMEOUT, TestKit};

use async_trait::async_trait;

use std::time::Duration;

struct ParentGreeter;

#[async_trait]
impl Actor for ParentGreeter {
    type Message = String;
    type Response = ();
}

#[async_trait]
impl Handler<ParentGreeter> for ParentGreeter {
    async fn handle_message(
        &mut self,
        _sender: ActorPath,
        msg: String,
        ctx: &mut ActorContext<ParentGreeter>,
    ) -> Result<Option<()>, Error> {
        match msg.as_str() {
            "greet parent" => ctx.tell_parent("Hello parent!".to_owned()),
            "fail" => return Err(Error::Functional("greeter gave up".to_owned())),
            _ => {}
        }
        Ok(None)
    }
}

#[tokio::test]
async fn parent_greeter_greets_parent() {
    let kit = TestKit::new().await.unwrap();
    let greeter = kit
        .child_of_test_actor("greeter", ParentGreeter)
        .await
        .unwrap();
    assert_eq!(greeter.path(), ActorPath::from("/user/testActor/greeter"));

    greeter.tell("greet parent".to_owned());
    kit.expect_message_eq("Hello parent!".to_owned(), DEFAULT_TIMEOUT)
        .await
        .unwrap();

    greeter.tell("something else".to_owned());
    kit.expect_no_message(Duration::from_millis(300))
        .await
        .unwrap();
}

#[tokio::test]
async fn parent_is_told_when_child_fails() {
    let kit = TestKit::new().await.unwrap();
    let greeter = kit
        .child_of_test_actor("greeter", ParentGreeter)
        .await
        .unwrap();

    greeter.tell("fail".to_owned());
    let notice = kit
        .test_actor()
        .expect_terminated(&greeter.path(), DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(
        notice.fault,
        Some(Error::Functional("greeter gave up".to_owned()))
    );
    assert!(greeter.is_closed());
}

#[tokio::test]
async fn stopped_child_notifies_without_fault() {
    let kit = TestKit::new().await.unwrap();
    let greeter = kit
        .child_of_test_actor("greeter", ParentGreeter)
        .await
        .unwrap();

    greeter.ask_stop().await.unwrap();
    let notice = kit
        .test_actor()
        .expect_terminated(&ActorPath::from("/user/testActor/greeter"), DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(notice.fault, None);
    kit.shutdown().await;
}
