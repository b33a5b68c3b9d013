// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor runner
//!
//! Each actor is driven by one runner task that owns the mailbox receiver, so at most one
//! worker processes a given actor at any instant while distinct actors run concurrently on
//! the tokio worker pool. The runner walks the actor through its lifecycle and drains the
//! mailbox, yielding its worker every `throughput` messages.
//!

use crate::{
    ActorPath, Config, Error, EventBus,
    actor::{Actor, ActorContext, ActorLifecycle, ActorRef, Handler, UntypedRef},
    mailbox::{HandleHelper, MailboxReceiver, mailbox},
    system::SystemRef,
};

use futures::FutureExt;
use tokio::{
    select,
    sync::{mpsc, oneshot},
};
use tracing::{debug, error};

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

pub type StopReceiver = mpsc::Receiver<Option<oneshot::Sender<()>>>;

pub type StopSender = mpsc::Sender<Option<oneshot::Sender<()>>>;

/// Signals the creator whether `pre_start` succeeded.
pub(crate) type StartSender = oneshot::Sender<Result<(), Error>>;

pub(crate) struct ActorRunner<A: Actor> {
    path: ActorPath,
    actor: A,
    lifecycle: ActorLifecycle,
    receiver: MailboxReceiver<A>,
    stop_receiver: StopReceiver,
    parent: Option<Arc<dyn UntypedRef>>,
    bus: EventBus,
    throughput: usize,
    /// Behavior fault that stopped the actor.
    fault: Option<Error>,
    /// Acknowledgement for the stop request being served.
    stop_ack: Option<oneshot::Sender<()>>,
}

impl<A> ActorRunner<A>
where
    A: Actor + Handler<A>,
{
    pub(crate) fn create(
        path: ActorPath,
        actor: A,
        parent: Option<Arc<dyn UntypedRef>>,
        bus: EventBus,
        config: &Config,
    ) -> (Self, ActorRef<A>, StopSender) {
        debug!("Creating new actor runner.");
        let (sender, receiver) = mailbox();
        let (stop_sender, stop_receiver) = mpsc::channel(100);
        let helper = HandleHelper::new(sender);

        let actor_ref = ActorRef::new(
            path.clone(),
            helper,
            stop_sender.clone(),
            bus.clone(),
            config.ask_timeout,
        );
        let runner: ActorRunner<A> = ActorRunner {
            path,
            actor,
            lifecycle: ActorLifecycle::Created,
            receiver,
            stop_receiver,
            parent,
            bus,
            throughput: config.throughput.max(1),
            fault: None,
            stop_ack: None,
        };
        (runner, actor_ref, stop_sender)
    }

    pub(crate) async fn init(
        &mut self,
        system: SystemRef,
        stop_sender: StopSender,
        myself: ActorRef<A>,
        mut started: Option<StartSender>,
    ) {
        debug!("Initializing actor {} runner.", &self.path);

        let mut ctx: ActorContext<A> = ActorContext::new(
            stop_sender,
            self.path.clone(),
            system,
            myself,
            self.parent.clone(),
        );

        loop {
            match self.lifecycle {
                // State: CREATED
                ActorLifecycle::Created => {
                    debug!("Actor {} is created.", &self.path);
                    match self.actor.pre_start(&mut ctx).await {
                        Ok(_) => {
                            debug!("Actor '{}' has started successfully.", &self.path);
                            self.lifecycle = ActorLifecycle::Started;
                        }
                        Err(err) => {
                            error!("Actor {} failed to start: {:?}", &self.path, err);
                            self.fault = Some(Error::Start(format!(
                                "actor {} failed to start: {}",
                                self.path, err
                            )));
                            ctx.stop_children().await;
                            self.lifecycle = ActorLifecycle::Terminated;
                        }
                    }
                }
                // State: STARTED
                ActorLifecycle::Started => {
                    debug!("Actor {} is started.", &self.path);
                    if let Some(sender) = started.take() {
                        sender.send(Ok(())).unwrap_or_else(|err| {
                            error!("Failed to send signal: {:?}", err);
                        });
                    }
                    self.run(&mut ctx).await;
                }
                // State: FAILED
                ActorLifecycle::Failed => {
                    debug!("Actor {} is faulty.", &self.path);
                    self.lifecycle = ActorLifecycle::Stopped;
                }
                // State: STOPPED
                ActorLifecycle::Stopped => {
                    debug!("Actor {} is stopped.", &self.path);
                    if self.actor.post_stop(&mut ctx).await.is_err() {
                        error!("Actor '{}' failed to stop!", &self.path);
                    }
                    self.lifecycle = ActorLifecycle::Terminated;
                }
                // State: TERMINATED
                ActorLifecycle::Terminated => {
                    debug!("Actor {} is terminated.", &self.path);
                    ctx.remove_actor().await;
                    self.close_mailbox();
                    match started.take() {
                        Some(sender) => {
                            let fault = self.fault.take().unwrap_or_else(|| {
                                Error::Start(format!("actor {} did not start", self.path))
                            });
                            let _ = sender.send(Err(fault));
                        }
                        None => {
                            if let Some(parent) = &self.parent {
                                parent.child_terminated(self.path.clone(), self.fault.take());
                            }
                        }
                    }
                    if let Some(ack) = self.stop_ack.take() {
                        let _ = ack.send(());
                    }
                    break;
                }
            }
        }
    }

    pub(crate) async fn run(&mut self, ctx: &mut ActorContext<A>) {
        debug!("Running actor {}.", &self.path);

        let mut processed = 0;
        loop {
            select! {
                biased;
                stop = self.stop_receiver.recv() => {
                    debug!("Stopping actor.");
                    if self.actor.pre_stop(ctx).await.is_err() {
                        error!("Failed to stop actor {}!", &self.path);
                    }
                    ctx.stop_children().await;
                    self.stop_ack = stop.flatten();
                    self.lifecycle = ActorLifecycle::Stopped;
                    break;
                }
                msg = self.receiver.recv() => {
                    let Some(mut msg) = msg else {
                        ctx.stop_children().await;
                        self.lifecycle = ActorLifecycle::Stopped;
                        break;
                    };
                    let result = AssertUnwindSafe(msg.handle(&mut self.actor, ctx))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|panic| Err(Error::Behavior(panic_message(panic))));
                    if let Err(fault) = result {
                        self.fail(fault, ctx).await;
                        break;
                    }
                    processed += 1;
                    if processed >= self.throughput {
                        processed = 0;
                        tokio::task::yield_now().await;
                    }
                }
            }
        }
    }

    /// Stops message processing after a behavior fault. No restart is attempted.
    async fn fail(&mut self, fault: Error, ctx: &mut ActorContext<A>) {
        error!("Actor {} failed: {}", &self.path, fault);
        ctx.log().error(format!("Actor failed: {}", fault));
        if self.actor.pre_stop(ctx).await.is_err() {
            error!("Failed to stop actor {}!", &self.path);
        }
        ctx.stop_children().await;
        self.fault = Some(fault);
        self.lifecycle = ActorLifecycle::Failed;
    }

    /// Closes the mailbox and reports every message still queued as a dead letter.
    fn close_mailbox(&mut self) {
        self.receiver.close();
        while let Ok(item) = self.receiver.try_recv() {
            if !item.is_system() {
                self.bus.dead_letter(&self.path, item.type_name());
            }
        }
        // Pending stop requests are acknowledged so no caller waits on a gone actor.
        self.stop_receiver.close();
        while let Ok(Some(ack)) = self.stop_receiver.try_recv() {
            let _ = ack.send(());
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_owned()
    }
}
