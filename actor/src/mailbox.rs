// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Mailbox
//!
//! Every actor owns one unbounded FIFO mailbox. Items are type-erased [`MessageHandler`]s so
//! user messages and system signals (child terminated, child adopted) share the same queue
//! and keep their relative order.
//!

use crate::{
    ActorPath, Error,
    actor::{Actor, ActorContext, Handler},
    ask::Recipient,
    runner::StopSender,
};

use async_trait::async_trait;

use tokio::sync::mpsc;

use tracing::debug;

use std::any::type_name;

/// Unit of work stored in a mailbox.
#[async_trait]
pub trait MessageHandler<A: Actor>: Send + Sync {
    /// Runs the item against the actor. An error is a behavior fault.
    async fn handle(&mut self, actor: &mut A, ctx: &mut ActorContext<A>) -> Result<(), Error>;

    /// Name reported when the item ends up as a dead letter.
    fn type_name(&self) -> &'static str;

    /// System signals are never reported as dead letters.
    fn is_system(&self) -> bool {
        false
    }
}

/// User message together with its optional reply address.
pub(crate) struct ActorMessage<A>
where
    A: Actor + Handler<A>,
{
    message: Option<A::Message>,
    reply_to: Option<Recipient<A::Response>>,
}

impl<A> ActorMessage<A>
where
    A: Actor + Handler<A>,
{
    pub(crate) fn new(message: A::Message, reply_to: Option<Recipient<A::Response>>) -> Self {
        Self {
            message: Some(message),
            reply_to,
        }
    }
}

#[async_trait]
impl<A> MessageHandler<A> for ActorMessage<A>
where
    A: Actor + Handler<A>,
{
    async fn handle(&mut self, actor: &mut A, ctx: &mut ActorContext<A>) -> Result<(), Error> {
        let Some(message) = self.message.take() else {
            return Ok(());
        };
        let sender = self
            .reply_to
            .as_ref()
            .map(|reply_to| reply_to.path().clone())
            .unwrap_or_else(ActorPath::no_sender);

        ctx.set_reply_to(self.reply_to.clone());
        let result = actor.handle_message(sender, message, ctx).await;
        ctx.set_reply_to(None);

        if let Some(response) = result? {
            match self.reply_to.take() {
                Some(reply_to) => reply_to.tell(response),
                None => {
                    debug!("Response from {} without reply address.", ctx.path());
                    ctx.system()
                        .event_bus()
                        .dead_letter(&ActorPath::no_sender(), type_name::<A::Response>());
                }
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        type_name::<A::Message>()
    }
}

/// A child of the actor stopped. `fault` is set when it stopped because of a behavior fault.
pub(crate) struct ChildTerminated {
    pub(crate) child: ActorPath,
    pub(crate) fault: Option<Error>,
}

#[async_trait]
impl<A> MessageHandler<A> for ChildTerminated
where
    A: Actor + Handler<A>,
{
    async fn handle(&mut self, actor: &mut A, ctx: &mut ActorContext<A>) -> Result<(), Error> {
        debug!("Actor {} received termination of {}.", ctx.path(), self.child);
        ctx.forget_child(&self.child);
        actor
            .on_child_terminated(self.child.clone(), self.fault.take(), ctx)
            .await;
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "ChildTerminated"
    }

    fn is_system(&self) -> bool {
        true
    }
}

/// A child created from outside the parent (`SystemRef::create_child_of`) is handed to the
/// parent so it gets stopped together with it.
pub(crate) struct AdoptChild {
    pub(crate) child: ActorPath,
    pub(crate) stop_sender: Option<StopSender>,
}

#[async_trait]
impl<A> MessageHandler<A> for AdoptChild
where
    A: Actor + Handler<A>,
{
    async fn handle(&mut self, _actor: &mut A, ctx: &mut ActorContext<A>) -> Result<(), Error> {
        if let Some(stop_sender) = self.stop_sender.take() {
            ctx.adopt_child(self.child.clone(), stop_sender);
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "AdoptChild"
    }

    fn is_system(&self) -> bool {
        true
    }
}

/// Boxed message handler for type-erased message handling.
pub type BoxedMessageHandler<A> = Box<dyn MessageHandler<A>>;

/// Mailbox receiver side, owned by the actor runner.
pub type MailboxReceiver<A> = mpsc::UnboundedReceiver<BoxedMessageHandler<A>>;

/// Mailbox sender side, shared by every reference to the actor.
pub type MailboxSender<A> = mpsc::UnboundedSender<BoxedMessageHandler<A>>;

/// Creates a new unbounded mailbox for an actor.
pub fn mailbox<A>() -> (MailboxSender<A>, MailboxReceiver<A>)
where
    A: Actor + Handler<A>,
{
    mpsc::unbounded_channel()
}

/// Sending half of a mailbox. Enqueueing never blocks; when the actor is gone the item is
/// handed back to the caller.
pub(crate) struct HandleHelper<A>
where
    A: Actor + Handler<A>,
{
    sender: MailboxSender<A>,
}

impl<A> HandleHelper<A>
where
    A: Actor + Handler<A>,
{
    pub(crate) fn new(sender: MailboxSender<A>) -> Self {
        debug!("Creating new handle reference.");
        Self { sender }
    }

    pub(crate) fn enqueue(
        &self,
        item: BoxedMessageHandler<A>,
    ) -> Result<(), BoxedMessageHandler<A>> {
        self.sender.send(item).map_err(|error| error.0)
    }

    pub(crate) fn tell(
        &self,
        message: A::Message,
        reply_to: Option<Recipient<A::Response>>,
    ) -> Result<(), BoxedMessageHandler<A>> {
        self.enqueue(Box::new(ActorMessage::new(message, reply_to)))
    }

    /// True once the runner dropped the receiving half.
    pub(crate) fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl<A> Clone for HandleHelper<A>
where
    A: Actor + Handler<A>,
{
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
