// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor system
//!
//! The `system` module provides the `ActorSystem` type. The `ActorSystem` type is the responsible for
//! creating and managing actors.
//!

use crate::{
    Actor, ActorPath, ActorRef, Config, Error, EventBus, Handler, Logger,
    actor::UntypedRef,
    runner::{ActorRunner, StopSender},
    sink::Sink,
};

use tokio::sync::{RwLock, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use tracing::{debug, error};

use std::{any::Any, collections::HashMap, sync::Arc};

/// Actor system.
///
pub struct ActorSystem {}

/// Default implementation for `ActorSystem`.
impl ActorSystem {
    /// Create a new actor system with the default configuration.
    ///
    /// # Returns
    ///
    /// Returns a tuple with the system reference and the system runner.
    pub fn create(token: CancellationToken) -> (SystemRef, SystemRunner) {
        let (event_sender, event_receiver) = mpsc::channel(100);
        let system = SystemRef::new(event_sender, token, Config::default());
        let runner = SystemRunner::new(event_receiver);
        (system, runner)
    }

    /// Create a new actor system with the given configuration.
    ///
    /// # Error
    ///
    /// Returns `Error::Config` if the configuration is not usable.
    ///
    pub fn with_config(
        token: CancellationToken,
        config: Config,
    ) -> Result<(SystemRef, SystemRunner), Error> {
        config.validate()?;
        let (event_sender, event_receiver) = mpsc::channel(100);
        let system = SystemRef::new(event_sender, token, config);
        let runner = SystemRunner::new(event_receiver);
        Ok((system, runner))
    }
}

/// System event.
///
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Stop the actor system.
    StopSystem,
}

/// System reference.
///
#[derive(Clone)]
pub struct SystemRef {
    /// The actors running in this actor system.
    actors:
        Arc<RwLock<HashMap<ActorPath, Box<dyn Any + Send + Sync + 'static>>>>,

    /// Stop channels of the top level actors, in creation order.
    root_senders: Arc<RwLock<Vec<StopSender>>>,

    token: CancellationToken,

    bus: EventBus,

    config: Arc<Config>,
}

impl SystemRef {
    /// Create system reference.
    pub(crate) fn new(
        event_sender: mpsc::Sender<SystemEvent>,
        token: CancellationToken,
        config: Config,
    ) -> Self {
        let root_senders = Arc::new(RwLock::new(Vec::<StopSender>::new()));
        let root_sender_clone = root_senders.clone();
        let token_clone = token.clone();

        tokio::spawn(async move {
            token_clone.cancelled().await;
            debug!("Stopping actor system...");
            let mut root_senders = root_sender_clone.write().await;
            while let Some(sender) = root_senders.pop() {
                let (stop_sender, stop_receiver) = oneshot::channel();
                // Actors that already stopped are skipped.
                if sender.send(Some(stop_sender)).await.is_ok() {
                    let _ = stop_receiver.await;
                }
            }

            let _ = event_sender.send(SystemEvent::StopSystem).await;
        });

        SystemRef {
            actors: Arc::new(RwLock::new(HashMap::new())),
            root_senders,
            token,
            bus: EventBus::new(config.log_level),
            config: Arc::new(config),
        }
    }

    /// Retrieves an actor running in this actor system. If actor does not exist, a None
    /// is returned instead.
    ///
    /// # Arguments
    ///
    /// * `path` - The path of the actor to retrieve.
    ///
    /// # Returns
    ///
    /// Returns the actor reference.
    ///
    pub async fn get_actor<A>(&self, path: &ActorPath) -> Option<ActorRef<A>>
    where
        A: Actor + Handler<A>,
    {
        let actors = self.actors.read().await;
        actors
            .get(path)
            .and_then(|any| any.downcast_ref::<ActorRef<A>>().cloned())
    }

    /// Creates an actor in this actor system with the given path and actor type and waits
    /// until its `pre_start` hook ran. If the path is taken, an error is returned.
    pub(crate) async fn create_actor_path<A>(
        &self,
        path: ActorPath,
        actor: A,
        parent: Option<Arc<dyn UntypedRef>>,
    ) -> Result<(ActorRef<A>, StopSender), Error>
    where
        A: Actor + Handler<A>,
    {
        let system = self.clone();
        let (mut runner, actor_ref, stop_sender) = ActorRunner::create(
            path.clone(),
            actor,
            parent,
            self.bus.clone(),
            &self.config,
        );

        // Check and reserve the path under the same lock.
        {
            let mut actors = self.actors.write().await;
            if actors.contains_key(&path) {
                error!("Actor '{}' already exists!", &path);
                return Err(Error::Exists(path));
            }
            actors.insert(path.clone(), Box::new(actor_ref.clone()));
        }
        let (sender, receiver) = oneshot::channel();

        let stop_sender_clone = stop_sender.clone();
        let myself = actor_ref.clone();
        tokio::spawn(async move {
            runner
                .init(system, stop_sender_clone, myself, Some(sender))
                .await;
        });

        match receiver.await {
            Ok(Ok(())) => Ok((actor_ref, stop_sender)),
            Ok(Err(error)) => Err(error),
            Err(_) => {
                // The runner task died before signalling.
                self.remove_actor(&path).await;
                Err(Error::Start(format!("Runner can not init {}", path)))
            }
        }
    }

    /// Launches a new top level actor on this actor system at the '/user'
    /// actor path. If another actor with the same name already exists,
    /// an `Err(Error::Exists(ActorPath))` is returned instead.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the actor to create.
    /// * `actor` - The type with `Actor` trait to create.
    ///
    /// # Returns
    ///
    /// Returns the actor reference.
    ///
    /// # Error
    ///
    /// Returns an error if the actor already exists or `pre_start` failed.
    ///
    pub async fn create_root_actor<A>(
        &self,
        name: &str,
        actor: A,
    ) -> Result<ActorRef<A>, Error>
    where
        A: Actor + Handler<A>,
    {
        let path = ActorPath::from("/user") / name;
        let (actor_ref, stop_sender) =
            self.create_actor_path::<A>(path, actor, None).await?;
        let mut senders = self.root_senders.write().await;
        senders.retain(|sender| !sender.is_closed());
        senders.push(stop_sender);
        Ok(actor_ref)
    }

    /// Creates an actor as child of `parent` from outside of it. The parent receives the
    /// termination notices of the child and stops it when it stops itself.
    ///
    /// # Error
    ///
    /// Returns `Error::Terminated` if the parent is gone.
    ///
    pub async fn create_child_of<P, C>(
        &self,
        parent: &ActorRef<P>,
        name: &str,
        actor: C,
    ) -> Result<ActorRef<C>, Error>
    where
        P: Actor + Handler<P>,
        C: Actor + Handler<C>,
    {
        if parent.is_closed() {
            return Err(Error::Terminated(parent.path()));
        }
        let path = parent.path() / name;
        let link: Arc<dyn UntypedRef> = Arc::new(parent.clone());
        let (child, stop_sender) = self
            .create_actor_path(path.clone(), actor, Some(link.clone()))
            .await?;
        if link.adopt(path, stop_sender) {
            Ok(child)
        } else {
            debug!("Parent {} stopped while creating {}.", parent.path(), child.path());
            child.ask_stop().await?;
            Err(Error::Terminated(parent.path()))
        }
    }

    /// Remove an actor from this actor system.
    /// If the actor does not exist, nothing happens.
    ///
    /// # Arguments
    ///
    /// * `path` - The path of the actor to remove.
    ///
    pub(crate) async fn remove_actor(&self, path: &ActorPath) {
        let mut actors = self.actors.write().await;
        actors.remove(path);
    }

    /// Stops every top level actor (and with them their children), then the system runner.
    pub fn stop_system(&self) {
        self.token.cancel();
    }

    /// The event bus log records and dead letters are published on.
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Logger for records that do not come from an actor.
    pub fn log(&self) -> Logger {
        Logger::new(ActorPath::from("/system"), self.bus.clone())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a sink. The sink will be run in a separate task.
    ///
    pub fn run_sink(&self, mut sink: Sink) {
        tokio::spawn(async move {
            sink.run().await;
        });
    }
}

/// System runner.
pub struct SystemRunner {
    /// The event receiver.
    event_receiver: mpsc::Receiver<SystemEvent>,
}

impl SystemRunner {
    /// Create a new system runner.
    pub(crate) fn new(event_receiver: mpsc::Receiver<SystemEvent>) -> Self {
        Self { event_receiver }
    }

    /// Run the actor system until it is stopped.
    pub async fn run(&mut self) {
        debug!("Running actor system...");
        if let Some(SystemEvent::StopSystem) = self.event_receiver.recv().await {
            debug!("Actor system stopped.");
        }
    }
}
