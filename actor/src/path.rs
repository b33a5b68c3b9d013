// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor path
//!
//! The `path` module provides the `ActorPath` type, the hierarchical name of an actor inside the
//! actor system (`/user/parent/child`). Paths name actors in logs, dead letters and the system
//! registry; they are not used to route messages.
//!

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;
use std::fmt::{Error, Formatter};

/// Path of an actor, stored as its list of segments.
#[derive(
    Clone, Default, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ActorPath(Vec<String>);

impl ActorPath {
    /// Path used as sender when a message carries no reply address.
    pub fn no_sender() -> Self {
        ActorPath::from("/deadLetters")
    }

    /// Path of the temporary reply address used by an ask.
    pub(crate) fn temp(id: u64) -> Self {
        ActorPath::from("/temp") / format!("ask-{}", id).as_str()
    }

    /// Parent path. The parent of a top level path is the empty path.
    pub fn parent(&self) -> Self {
        if self.0.len() > 1 {
            let mut tokens = self.0.clone();
            tokens.truncate(tokens.len() - 1);
            ActorPath(tokens)
        } else {
            ActorPath(Vec::new())
        }
    }

    /// Last segment of the path.
    pub fn key(&self) -> String {
        self.0.last().cloned().unwrap_or_default()
    }

    /// Number of segments.
    pub fn level(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &ActorPath) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_child_of(&self, other: &ActorPath) -> bool {
        self.parent() == *other && !self.is_empty()
    }
}

impl From<&str> for ActorPath {
    fn from(str: &str) -> Self {
        ActorPath(
            str.split('/')
                .filter(|x| !x.trim().is_empty())
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl From<String> for ActorPath {
    fn from(string: String) -> Self {
        ActorPath::from(string.as_str())
    }
}

impl std::ops::Div<&str> for ActorPath {
    type Output = ActorPath;

    fn div(self, rhs: &str) -> Self::Output {
        let mut keys = self.0;
        keys.extend(
            rhs.split('/')
                .filter(|x| !x.trim().is_empty())
                .map(|s| s.to_string()),
        );
        ActorPath(keys)
    }
}

impl std::fmt::Display for ActorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self.level().cmp(&1) {
            Ordering::Less => write!(f, "/"),
            _ => write!(f, "/{}", self.0.join("/")),
        }
    }
}

impl std::fmt::Debug for ActorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        std::fmt::Display::fmt(self, f)
    }
}
