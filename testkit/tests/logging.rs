// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

use actor::{
    Actor, ActorContext, ActorPath, ActorRef, Error, Handler, LogFilter, LogLevel, Message,
};
use testkit::{DEFAULT_TIMEOUT, ExpectError, LogProbe, TestKit};

use async_trait::async_trait;

use std::time::Duration;

#[derive(Debug, Clone)]
enum NormalOperation {
    ValidData,
    InvalidData,
}

impl Message for NormalOperation {}

struct LoggingActor;

#[async_trait]
impl Actor for LoggingActor {
    type Message = NormalOperation;
    type Response = ();
}

#[async_trait]
impl Handler<LoggingActor> for LoggingActor {
    async fn handle_message(
        &mut self,
        _sender: ActorPath,
        msg: NormalOperation,
        ctx: &mut ActorContext<LoggingActor>,
    ) -> Result<Option<()>, Error> {
        match msg {
            NormalOperation::ValidData => {
                ctx.log().info("Completed operation with valid data")
            }
            NormalOperation::InvalidData => {
                ctx.log().error("Could not complete operation! Data is invalid.")
            }
        }
        Ok(None)
    }
}

async fn setup() -> (TestKit, ActorRef<LoggingActor>, LogProbe) {
    let kit = TestKit::new().await.unwrap();
    let logger = kit.actor_of("logger", LoggingActor).await.unwrap();
    let logs = kit.log_probe();
    (kit, logger, logs)
}

#[tokio::test]
async fn logging_actor_logs_info_on_valid_operation() {
    let (_kit, logger, logs) = setup().await;

    // Exact match on the whole message.
    logger.tell(NormalOperation::ValidData);
    logs.expect_one(
        LogFilter::info().message("Completed operation with valid data"),
        DEFAULT_TIMEOUT,
    )
    .await
    .unwrap();

    // Same record, matched on a part of it regardless of case.
    logger.tell(NormalOperation::ValidData);
    let record = logs
        .expect_one(LogFilter::info().contains("completed"), DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(record.level, LogLevel::Info);
    assert_eq!(record.source, ActorPath::from("/user/logger"));
}

#[tokio::test]
async fn exact_match_is_case_sensitive() {
    let (_kit, logger, logs) = setup().await;

    logger.tell(NormalOperation::ValidData);
    let error = logs
        .expect_one(
            LogFilter::info().message("completed operation with valid data"),
            Duration::from_millis(300),
        )
        .await
        .unwrap_err();
    assert_eq!(
        error,
        ExpectError::LogCount {
            filter: format!(
                "{:?}",
                LogFilter::info().message("completed operation with valid data")
            ),
            expected: 1,
            actual: 0,
        }
    );
}

#[tokio::test]
async fn logging_actor_logs_no_errors_on_valid_operation() {
    let (_kit, logger, logs) = setup().await;

    logger.tell(NormalOperation::ValidData);
    logs.expect_log_matching(LogFilter::error(), 0, Duration::from_millis(500))
        .await
        .unwrap();
    // The info record is still there for other assertions.
    logs.expect_one(LogFilter::info(), DEFAULT_TIMEOUT)
        .await
        .unwrap();
}

#[tokio::test]
async fn logging_actor_logs_one_error_on_invalid_operation() {
    let (_kit, logger, logs) = setup().await;

    logger.tell(NormalOperation::InvalidData);
    let record = logs
        .expect_one(LogFilter::error(), DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(record.message, "Could not complete operation! Data is invalid.");
}

#[tokio::test]
async fn send_to_stopped_actor_is_a_dead_letter() {
    let (_kit, logger, logs) = setup().await;

    logger.ask_stop().await.unwrap();
    logger.tell(NormalOperation::ValidData);
    let record = logs
        .expect_one(LogFilter::info().contains("[dead letter]"), DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert!(record.message.contains("/user/logger"));
    logs.expect_none(
        LogFilter::info().message("Completed operation with valid data"),
        Duration::from_millis(200),
    )
    .await
    .unwrap();
}
