// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Binds a [`SyncClient`] to the signed-in user and a local board replica.
//!
//! The binder owns one listener per inbound event, built once so their `Arc`
//! identities never change. Binding registers all of them (registration is
//! idempotent per identity) and unbinding removes exactly that set, leaving any
//! listeners the application added itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tack_core::{BoardReplica, EventName};
use tracing::{debug, info};

use crate::client::{SyncClient, SyncNotification};
use crate::error::{ListenerError, SyncResult};
use crate::registry::{listener, Listener};
use crate::transport::{Credential, Transport, WebSocketTransport};

/// Replica shared between the binder's listeners and the application.
pub type SharedReplica = Arc<Mutex<BoardReplica>>;

/// Authentication state as seen by the sync layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    SignedIn(Credential),
}

/// Owns the sync client for the lifetime of a signed-in session.
pub struct SessionBinder<T: Transport = WebSocketTransport> {
    client: SyncClient<T>,
    replica: SharedReplica,
    handlers: HashMap<EventName, Listener>,
    bound: bool,
    active_board: Option<String>,
    /// Last credential signed in; survives the client dropping its own copy.
    signed_in_as: Option<Credential>,
}

impl<T: Transport> SessionBinder<T> {
    pub fn new(client: SyncClient<T>) -> Self {
        Self::with_replica(client, Arc::new(Mutex::new(BoardReplica::new())))
    }

    /// Use an existing replica instead of a fresh one.
    pub fn with_replica(client: SyncClient<T>, replica: SharedReplica) -> Self {
        let handlers = EventName::ALL
            .into_iter()
            .map(|event| (event, apply_to(&replica)))
            .collect();
        SessionBinder {
            client,
            replica,
            handlers,
            bound: false,
            active_board: None,
            signed_in_as: None,
        }
    }

    pub fn replica(&self) -> SharedReplica {
        Arc::clone(&self.replica)
    }

    pub fn client(&self) -> &SyncClient<T> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut SyncClient<T> {
        &mut self.client
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Board the session has joined, re-joined after every reconnect.
    pub fn active_board(&self) -> Option<&str> {
        self.active_board.as_deref()
    }

    /// React to a sign-in, sign-out or credential change.
    ///
    /// Returns the connect notification when a session was started.
    pub async fn set_auth(&mut self, auth: AuthState) -> SyncResult<Option<SyncNotification>> {
        match auth {
            AuthState::SignedIn(credential) => {
                if self.client.credential() == Some(&credential) && self.client.is_connected() {
                    debug!("already signed in with this credential");
                    return Ok(None);
                }
                // A different user must not see the previous user's board
                if self
                    .signed_in_as
                    .as_ref()
                    .is_some_and(|previous| previous != &credential)
                {
                    self.clear_replica();
                    self.active_board = None;
                }
                let notification = self.client.connect(credential.clone()).await?;
                self.signed_in_as = Some(credential);
                self.bind();
                self.track(notification).await;
                Ok(Some(notification))
            }
            AuthState::SignedOut => {
                self.unbind();
                self.client.disconnect().await;
                self.active_board = None;
                self.signed_in_as = None;
                self.clear_replica();
                info!("signed out");
                Ok(None)
            }
        }
    }

    /// Reconnect after retries were exhausted.
    pub async fn retry(&mut self) -> SyncResult<SyncNotification> {
        let notification = self.client.retry().await?;
        self.bind();
        self.track(notification).await;
        Ok(notification)
    }

    fn clear_replica(&self) {
        self.replica
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    async fn track(&mut self, notification: SyncNotification) {
        match notification {
            SyncNotification::Connected { .. } => {
                self.bind();
                if let Some(board_id) = self.active_board.clone() {
                    debug!(%board_id, "rejoining board");
                    if let Err(e) = self.client.join_board(&board_id).await {
                        debug!(error = %e, "failed to rejoin board");
                    }
                }
            }
            SyncNotification::Ended(end) => {
                info!(%end, "session ended");
                self.unbind();
            }
            SyncNotification::Event(_) | SyncNotification::RetryScheduled { .. } => {}
        }
    }

    /// Register every replica listener. Idempotent.
    pub fn bind(&mut self) {
        for (event, handler) in &self.handlers {
            self.client.on(*event, Arc::clone(handler));
        }
        self.bound = true;
    }

    /// Remove exactly the listeners `bind` registered.
    pub fn unbind(&mut self) {
        for (event, handler) in &self.handlers {
            self.client.off_listener(*event, handler);
        }
        self.bound = false;
    }

    /// Join a board and remember it for reconnects.
    pub async fn join_board(&mut self, board_id: &str) -> SyncResult<()> {
        self.client.join_board(board_id).await?;
        self.active_board = Some(board_id.to_string());
        Ok(())
    }

    pub async fn leave_board(&mut self, board_id: &str) -> SyncResult<()> {
        self.client.leave_board(board_id).await?;
        if self.active_board.as_deref() == Some(board_id) {
            self.active_board = None;
        }
        Ok(())
    }

    /// Drive the client, keeping listeners and board membership in step with
    /// the connection.
    pub async fn next_event(&mut self) -> Option<SyncNotification> {
        let notification = self.client.next_event().await?;
        self.track(notification).await;
        Some(notification)
    }
}

fn apply_to(replica: &SharedReplica) -> Listener {
    let replica = Arc::clone(replica);
    listener(move |msg| {
        let mut replica = replica
            .lock()
            .map_err(|_| ListenerError::new("replica lock poisoned"))?;
        replica.apply(msg);
        Ok(())
    })
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
