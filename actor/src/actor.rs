// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor
//!
//! Core actor types: the [`Actor`] and [`Handler`] traits implemented by user actors, the
//! [`ActorContext`] handed to every handler invocation and the [`ActorRef`] used to talk to a
//! running actor.
//!
//! An actor processes one message at a time. Its message type is a closed set of variants
//! (usually an enum) dispatched with `match`; behavior changes are expressed as a state tag
//! inside the actor, which the next message observes.
//!

use crate::{
    ActorPath, Error, EventBus, Logger,
    ask::{PendingAsk, Recipient, pipe_to},
    mailbox::{AdoptChild, ChildTerminated, HandleHelper},
    runner::StopSender,
    system::SystemRef,
};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::debug;

use std::{
    any::{Any, type_name},
    fmt::{self, Debug},
    future::Future,
    sync::Arc,
    time::Duration,
};

/// Execution context of an actor, passed to every handler and lifecycle hook.
pub struct ActorContext<A: Actor + Handler<A>> {
    /// Stop channel of this actor.
    stop: StopSender,
    /// The path of the actor.
    path: ActorPath,
    /// The actor system.
    system: SystemRef,
    /// Reference to the actor itself.
    myself: ActorRef<A>,
    /// The actor that created this one. Fixed at creation.
    parent: Option<Arc<dyn UntypedRef>>,
    /// Reply address of the message being handled.
    reply_to: Option<Recipient<A::Response>>,
    /// Children stopped together with this actor.
    children: Vec<(ActorPath, StopSender)>,
    logger: Logger,
}

impl<A> ActorContext<A>
where
    A: Actor + Handler<A>,
{
    pub(crate) fn new(
        stop: StopSender,
        path: ActorPath,
        system: SystemRef,
        myself: ActorRef<A>,
        parent: Option<Arc<dyn UntypedRef>>,
    ) -> Self {
        let logger = Logger::new(path.clone(), system.event_bus().clone());
        Self {
            stop,
            path,
            system,
            myself,
            parent,
            reply_to: None,
            children: Vec::new(),
            logger,
        }
    }

    /// Path of this actor.
    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    /// The actor system this actor runs in.
    pub fn system(&self) -> &SystemRef {
        &self.system
    }

    /// Reference to this actor.
    pub fn myself(&self) -> &ActorRef<A> {
        &self.myself
    }

    /// Recipient delivering `M` to this actor.
    pub fn recipient<M>(&self) -> Recipient<M>
    where
        M: Send + 'static,
        A::Message: From<M>,
    {
        self.myself.recipient()
    }

    /// Logger publishing records tagged with this actor's path.
    pub fn log(&self) -> &Logger {
        &self.logger
    }

    /// The parent as a typed reference, if the parent is an actor of type `P`.
    ///
    /// This is the actor that created this one. If it has terminated, messages sent through
    /// the returned reference are dead letters; they never reach a newer actor at the same
    /// path.
    pub fn parent<P>(&self) -> Option<ActorRef<P>>
    where
        P: Actor + Handler<P>,
    {
        self.parent
            .as_ref()
            .and_then(|parent| parent.as_any().downcast_ref::<ActorRef<P>>().cloned())
    }

    /// Path of the parent, if any.
    pub fn parent_path(&self) -> Option<ActorPath> {
        self.parent.as_ref().map(|parent| parent.path().clone())
    }

    /// Sends a message to the parent without knowing its type. The parent decides whether it
    /// accepts the message (see [`Actor::from_any`]); rejected messages are dead letters.
    pub fn tell_parent<M>(&self, message: M)
    where
        M: Message + Debug,
    {
        match &self.parent {
            Some(parent) => parent.tell_any(AnyMessage::new(message)),
            None => self
                .system
                .event_bus()
                .dead_letter(&self.path.parent(), type_name::<M>()),
        }
    }

    /// Reply address of the message being handled. Keep it to answer later, after the
    /// handler returned (for instance from a [`pipe_to`] continuation).
    pub fn reply_to(&self) -> Option<Recipient<A::Response>> {
        self.reply_to.clone()
    }

    pub(crate) fn set_reply_to(&mut self, reply_to: Option<Recipient<A::Response>>) {
        self.reply_to = reply_to;
    }

    /// Runs `future` outside the actor and delivers its output as a message to this actor.
    pub fn pipe_to_self<F>(&self, future: F)
    where
        F: Future<Output = A::Message> + Send + 'static,
    {
        pipe_to(future, self.myself.recipient());
    }

    /// Creates a child actor. The child is stopped when this actor stops.
    pub async fn create_child<C>(
        &mut self,
        name: &str,
        actor: C,
    ) -> Result<ActorRef<C>, Error>
    where
        C: Actor + Handler<C>,
    {
        let path = self.path.clone() / name;
        let parent: Arc<dyn UntypedRef> = Arc::new(self.myself.clone());
        let (actor_ref, stop_sender) = self
            .system
            .create_actor_path(path.clone(), actor, Some(parent))
            .await?;
        self.children.push((path, stop_sender));
        Ok(actor_ref)
    }

    /// Running child with the given name.
    pub async fn get_child<C>(&self, name: &str) -> Option<ActorRef<C>>
    where
        C: Actor + Handler<C>,
    {
        let path = self.path.clone() / name;
        self.system.get_actor(&path).await
    }

    /// Paths of the children still registered with this actor.
    pub fn children(&self) -> Vec<ActorPath> {
        self.children.iter().map(|(path, _)| path.clone()).collect()
    }

    pub(crate) fn adopt_child(&mut self, path: ActorPath, stop_sender: StopSender) {
        self.children.push((path, stop_sender));
    }

    pub(crate) fn forget_child(&mut self, path: &ActorPath) {
        self.children.retain(|(child, _)| child != path);
    }

    pub(crate) async fn stop_children(&mut self) {
        while let Some((path, sender)) = self.children.pop() {
            debug!("Stopping child {}.", path);
            let (stop_sender, stop_receiver) = oneshot::channel();
            if sender.send(Some(stop_sender)).await.is_ok() {
                let _ = stop_receiver.await;
            }
        }
    }

    pub(crate) async fn remove_actor(&self) {
        self.system.remove_actor(&self.path).await;
    }

    /// Asks the runner to stop this actor once the current message is handled.
    pub async fn stop(&self, sender: Option<oneshot::Sender<()>>) {
        debug!("Stopping actor from handle reference.");
        let _ = self.stop.send(sender).await;
    }
}

/// Lifecycle states of an actor runner.
#[derive(Debug, Clone, PartialEq)]
pub enum ActorLifecycle {
    /// Created, `pre_start` not run yet.
    Created,
    /// Processing messages.
    Started,
    /// A behavior fault stopped message processing.
    Failed,
    /// Message processing ended, `post_stop` pending.
    Stopped,
    /// Removed from the system.
    Terminated,
}

/// Notice delivered to a parent when one of its children stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Terminated {
    /// Path of the child.
    pub actor: ActorPath,
    /// The behavior fault that stopped the child, if any.
    pub fault: Option<Error>,
}

impl Message for Terminated {}

/// The actor trait: associated types and lifecycle hooks.
#[async_trait]
pub trait Actor: Send + Sync + Sized + 'static + Handler<Self> {
    /// Messages accepted by the actor.
    type Message: Message;

    /// Replies produced by the actor.
    type Response: Response;

    /// Runs before the first message. An error aborts the creation of the actor.
    async fn pre_start(
        &mut self,
        _context: &mut ActorContext<Self>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Runs when the actor stops, before its children are stopped.
    async fn pre_stop(
        &mut self,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Runs once the actor and its children are stopped.
    async fn post_stop(
        &mut self,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Converts an untyped message (see [`ActorContext::tell_parent`]) into the actor's
    /// message type. By default only values of `Self::Message` are accepted.
    fn from_any(message: AnyMessage) -> Option<Self::Message> {
        message.downcast::<Self::Message>()
    }
}

/// Marker for messages.
pub trait Message: Clone + Send + Sync + 'static {}

/// Marker for responses.
pub trait Response: Send + Sync + 'static {}

impl Message for () {}
impl Message for String {}
impl Response for () {}
impl Response for String {}
impl Response for bool {}

/// Message handling.
#[async_trait]
pub trait Handler<A: Actor + Handler<A>>: Send + Sync {
    /// Handles one message.
    ///
    /// `Ok(Some(response))` is sent to the reply address of the message (if it has one),
    /// `Ok(None)` sends nothing, and `Err` is a behavior fault: the actor stops and its parent
    /// receives a [`Terminated`] notice carrying the error.
    async fn handle_message(
        &mut self,
        sender: ActorPath,
        msg: A::Message,
        ctx: &mut ActorContext<A>,
    ) -> Result<Option<A::Response>, Error>;

    /// Called when a child stops.
    async fn on_child_terminated(
        &mut self,
        child: ActorPath,
        fault: Option<Error>,
        _ctx: &mut ActorContext<A>,
    ) {
        debug!("Child {} terminated (fault: {:?}).", child, fault);
    }
}

/// Type-erased message with its type name and debug rendering.
#[derive(Clone)]
pub struct AnyMessage {
    payload: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    repr: String,
}

impl AnyMessage {
    pub fn new<M>(message: M) -> Self
    where
        M: Debug + Send + Sync + 'static,
    {
        Self {
            repr: format!("{:?}", message),
            type_name: type_name::<M>(),
            payload: Arc::new(message),
        }
    }

    /// Name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.payload.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    pub fn downcast<T: Clone + 'static>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }
}

impl Debug for AnyMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl Message for AnyMessage {}

/// Untyped view of an actor reference, used for parent links.
pub(crate) trait UntypedRef: Send + Sync {
    fn path(&self) -> &ActorPath;
    fn tell_any(&self, message: AnyMessage);
    fn child_terminated(&self, child: ActorPath, fault: Option<Error>);
    fn adopt(&self, child: ActorPath, stop_sender: StopSender) -> bool;
    fn as_any(&self) -> &dyn Any;
}

/// Reference to a running actor.
pub struct ActorRef<A>
where
    A: Actor + Handler<A>,
{
    path: ActorPath,
    sender: HandleHelper<A>,
    stop_sender: StopSender,
    bus: EventBus,
    ask_timeout: Duration,
}

impl<A> ActorRef<A>
where
    A: Actor + Handler<A>,
{
    pub(crate) fn new(
        path: ActorPath,
        sender: HandleHelper<A>,
        stop_sender: StopSender,
        bus: EventBus,
        ask_timeout: Duration,
    ) -> Self {
        Self {
            path,
            sender,
            stop_sender,
            bus,
            ask_timeout,
        }
    }

    /// Sends a message without reply address. Never blocks; a message to a terminated actor
    /// becomes a dead letter.
    pub fn tell(&self, message: A::Message) {
        if let Err(item) = self.sender.tell(message, None) {
            self.bus.dead_letter(&self.path, item.type_name());
        }
    }

    /// Sends a message whose replies go to `reply_to`.
    pub fn tell_from(&self, message: A::Message, reply_to: Recipient<A::Response>) {
        if let Err(item) = self.sender.tell(message, Some(reply_to)) {
            self.bus.dead_letter(&self.path, item.type_name());
        }
    }

    /// Sends a message and waits for the reply, at most the system's default ask timeout.
    pub async fn ask(&self, message: A::Message) -> Result<A::Response, Error> {
        self.ask_timeout(message, self.ask_timeout).await
    }

    /// Sends a message and waits for the reply, at most `timeout`.
    ///
    /// Resolves exactly once: to the first reply, to [`Error::AskTimeout`] when the deadline
    /// passes first, or to [`Error::Terminated`] when the actor is already gone. Never await
    /// this inside a handler; use [`pipe_to`] or [`ActorContext::pipe_to_self`] instead.
    pub async fn ask_timeout(
        &self,
        message: A::Message,
        timeout: Duration,
    ) -> Result<A::Response, Error> {
        let (pending, reply_to) =
            PendingAsk::new(self.path.clone(), timeout, self.bus.clone());
        if let Err(item) = self.sender.tell(message, Some(reply_to)) {
            pending.cancel();
            self.bus.dead_letter(&self.path, item.type_name());
            return Err(Error::Terminated(self.path.clone()));
        }
        pending.wait().await
    }

    /// Stops the actor and waits until it is terminated.
    pub async fn ask_stop(&self) -> Result<(), Error> {
        debug!("Stopping actor from handle reference.");
        let (response_sender, response_receiver) = oneshot::channel();

        if self.stop_sender.send(Some(response_sender)).await.is_ok() {
            // The runner may drop the acknowledgement if it was already stopping.
            let _ = response_receiver.await;
        }
        Ok(())
    }

    /// Stops the actor without waiting.
    pub async fn tell_stop(&self) {
        debug!("Stopping actor from handle reference.");
        let _ = self.stop_sender.send(None).await;
    }

    pub fn path(&self) -> ActorPath {
        self.path.clone()
    }

    /// True once the actor terminated.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Recipient delivering `M` to this actor, converted into its message type.
    pub fn recipient<M>(&self) -> Recipient<M>
    where
        M: Send + 'static,
        A::Message: From<M>,
    {
        let actor_ref = self.clone();
        Recipient::new(self.path.clone(), move |message: M| {
            actor_ref.tell(A::Message::from(message))
        })
    }
}

impl<A> UntypedRef for ActorRef<A>
where
    A: Actor + Handler<A>,
{
    fn path(&self) -> &ActorPath {
        &self.path
    }

    fn tell_any(&self, message: AnyMessage) {
        let type_name = message.type_name();
        match A::from_any(message) {
            Some(message) => self.tell(message),
            None => {
                debug!("Actor {} does not accept {}.", self.path, type_name);
                self.bus.dead_letter(&self.path, type_name);
            }
        }
    }

    fn child_terminated(&self, child: ActorPath, fault: Option<Error>) {
        let notice = ChildTerminated { child, fault };
        if self.sender.enqueue(Box::new(notice)).is_err() {
            debug!("Parent {} is gone, termination notice dropped.", self.path);
        }
    }

    fn adopt(&self, child: ActorPath, stop_sender: StopSender) -> bool {
        let adopt = AdoptChild {
            child,
            stop_sender: Some(stop_sender),
        };
        self.sender.enqueue(Box::new(adopt)).is_ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<A> Clone for ActorRef<A>
where
    A: Actor + Handler<A>,
{
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            sender: self.sender.clone(),
            stop_sender: self.stop_sender.clone(),
            bus: self.bus.clone(),
            ask_timeout: self.ask_timeout,
        }
    }
}

impl<A> Debug for ActorRef<A>
where
    A: Actor + Handler<A>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({})", self.path)
    }
}
