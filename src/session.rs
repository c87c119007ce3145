//! Session registry — at most one live session per actor.

use std::collections::HashMap;

use tracing::info;

use crate::platform::UserId;

/// Which side of the pipeline a registry serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Reporter,
    Moderator,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reporter => write!(f, "reporter"),
            Self::Moderator => write!(f, "moderator"),
        }
    }
}

/// Sessions of one kind keyed by actor id.
pub struct SessionRegistry<S> {
    kind: SessionKind,
    sessions: HashMap<UserId, S>,
}

impl<S> SessionRegistry<S> {
    pub fn new(kind: SessionKind) -> Self {
        Self {
            kind,
            sessions: HashMap::new(),
        }
    }

    /// Start a session for `actor`. An existing session is kept and returned
    /// instead.
    pub fn start(&mut self, actor: UserId, create: impl FnOnce() -> S) -> &mut S {
        let kind = self.kind;
        self.sessions.entry(actor).or_insert_with(|| {
            info!(kind = %kind, actor, "Session started");
            create()
        })
    }

    pub fn get_mut(&mut self, actor: UserId) -> Option<&mut S> {
        self.sessions.get_mut(&actor)
    }

    pub fn contains(&self, actor: UserId) -> bool {
        self.sessions.contains_key(&actor)
    }

    /// Drop the actor's session.
    pub fn finish(&mut self, actor: UserId) -> Option<S> {
        let session = self.sessions.remove(&actor);
        if session.is_some() {
            info!(kind = %self.kind, actor, "Session finished");
        }
        session
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
