// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync client for a collaborative board server.
//!
//! Provides a high-level interface for:
//! - Connecting with a session credential
//! - Sending board, task, column, chat and presence commands
//! - Dispatching inbound events to registered listeners
//! - Automatic reconnection with exponential backoff
//!
//! The client is driven by [`SyncClient::next_event`]. Nothing happens in the
//! background: inbound frames are read, listeners run, and scheduled retries
//! fire only while a caller awaits that method.

use std::path::Path;
use std::time::Duration;

use tack_core::{ClientMessage, EventName, NewChatMessage, NewColumn, NewTask, Point, Updates};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::reconnect::{ConnectionState, ReconnectController, RetryDecision};
use crate::registry::{Listener, ListenerId, ListenerRegistry};
use crate::transport::{
    Credential, DisconnectReason, Transport, TransportError, TransportOptions, TransportSignal,
    WebSocketTransport,
};

/// Why a session ended for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionEnd {
    /// The server closed the session on purpose. Not retried.
    #[error("server ended the session")]
    ServerTerminated,
    /// Every scheduled reconnect failed.
    #[error("max reconnection attempts reached ({attempts})")]
    RetriesExhausted { attempts: u32 },
}

/// What [`SyncClient::next_event`] (or `connect`) observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncNotification {
    /// A transport handle is open.
    Connected {
        /// True when this connection replaced a dropped one.
        reconnect: bool,
    },
    /// An inbound event was dispatched to its listeners.
    Event(EventName),
    /// The connection is down and another attempt is scheduled.
    RetryScheduled { attempt: u32, delay: Duration },
    /// The session is over; the client is `Idle`.
    Ended(SessionEnd),
}

/// Sync client for board operations.
pub struct SyncClient<T: Transport = WebSocketTransport> {
    config: SyncConfig,
    options: TransportOptions,
    transport: T,
    controller: ReconnectController,
    registry: ListenerRegistry,
}

impl SyncClient<WebSocketTransport> {
    /// Create a new sync client with the WebSocket transport.
    pub fn new(config: SyncConfig) -> SyncResult<Self> {
        Self::with_transport(config, WebSocketTransport::new())
    }

    /// Create a client from a config file.
    pub fn from_config_file(path: &Path) -> SyncResult<Self> {
        Self::new(SyncConfig::load(path)?)
    }
}

impl<T: Transport> SyncClient<T> {
    /// Create a new sync client with a custom transport (for testing).
    pub fn with_transport(config: SyncConfig, transport: T) -> SyncResult<Self> {
        config.validate()?;
        Ok(SyncClient {
            options: config.transport_options(),
            controller: ReconnectController::new(config.backoff()),
            registry: ListenerRegistry::new(),
            config,
            transport,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.controller.state()
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.controller.state() == ConnectionState::Connected && self.transport.is_open()
    }

    /// Credential of the current session, if any.
    pub fn credential(&self) -> Option<&Credential> {
        self.controller.credential()
    }

    /// When the pending reconnect will fire, if one is scheduled.
    pub fn retry_deadline(&self) -> Option<Instant> {
        self.controller.pending().map(|p| p.deadline)
    }

    /// Start a session with `credential`, replacing any live one.
    ///
    /// A failed open is not an error: it schedules a retry and returns
    /// [`SyncNotification::RetryScheduled`].
    pub async fn connect(
        &mut self,
        credential: impl Into<Credential>,
    ) -> SyncResult<SyncNotification> {
        let credential = credential.into();
        if credential.is_empty() {
            return Err(SyncError::EmptyCredential);
        }
        if self.controller.state() != ConnectionState::Idle {
            self.disconnect().await;
        }
        self.controller.begin(credential.clone());
        self.open(credential, false).await
    }

    /// Reconnect after the session ended with [`SessionEnd::RetriesExhausted`].
    pub async fn retry(&mut self) -> SyncResult<SyncNotification> {
        if self.controller.state() != ConnectionState::Idle {
            return Err(SyncError::InvalidCommand(
                "retry is only possible after the session ended".to_string(),
            ));
        }
        let credential = self
            .controller
            .credential()
            .cloned()
            .ok_or_else(|| SyncError::InvalidCommand("no session to retry".to_string()))?;
        self.controller.begin(credential.clone());
        self.open(credential, true).await
    }

    /// End the session: cancel any pending retry, close the transport and
    /// forget the credential. Listeners stay registered.
    pub async fn disconnect(&mut self) {
        let was = self.controller.state();
        self.controller.reset();
        if let Err(e) = self.transport.close().await {
            debug!(error = %e, "error closing transport");
        }
        if was != ConnectionState::Idle {
            info!("disconnected");
        }
    }

    /// Remove every listener, then disconnect. Safe to call repeatedly.
    pub async fn cleanup(&mut self) {
        self.registry.teardown_all();
        self.disconnect().await;
    }

    /// Register `listener` for `event`.
    pub fn on(&mut self, event: EventName, listener: Listener) -> ListenerId {
        self.registry.register(event, listener)
    }

    /// Register `listener` for the next `event` only.
    pub fn once(&mut self, event: EventName, listener: Listener) -> ListenerId {
        self.registry.register_once(event, listener)
    }

    /// Remove one listener by id, or all listeners for `event`.
    pub fn off(&mut self, event: EventName, id: Option<ListenerId>) -> usize {
        self.registry.unregister(event, id)
    }

    /// Remove `listener` from `event`.
    pub fn off_listener(&mut self, event: EventName, listener: &Listener) -> bool {
        self.registry.unregister_listener(event, listener)
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    /// Drive the connection until something observable happens.
    ///
    /// Returns `None` when there is no session. Inbound events are dispatched
    /// to listeners before their notification is returned. Dropping the
    /// future loses no inbound frame and keeps any scheduled retry.
    ///
    /// If the connection state cannot take the transition a frame or open
    /// result calls for, the session is abandoned and `None` is returned.
    pub async fn next_event(&mut self) -> Option<SyncNotification> {
        let result = match self.controller.state() {
            ConnectionState::Idle => return None,
            ConnectionState::Connected => self.read().await,
            ConnectionState::Disconnected => {
                let pending = self.controller.pending()?;
                tokio::time::sleep_until(pending.deadline).await;
                self.controller.start_retry(Instant::now())?;
                let credential = self.controller.credential().cloned()?;
                debug!(attempt = pending.attempt, "reconnecting");
                self.open(credential, true).await
            }
            ConnectionState::Connecting => {
                // A previous open was dropped before it finished
                let credential = self.controller.credential().cloned()?;
                let reconnect = self.controller.retry_count() > 0;
                self.open(credential, reconnect).await
            }
        };
        match result {
            Ok(notification) => Some(notification),
            Err(e) => {
                warn!(error = %e, "abandoning session");
                self.disconnect().await;
                None
            }
        }
    }

    async fn open(&mut self, credential: Credential, reconnect: bool) -> SyncResult<SyncNotification> {
        let timeout = self.options.connect_timeout;
        let result = tokio::time::timeout(
            timeout,
            self.transport.open(&self.config.url, &credential, &self.options),
        )
        .await
        .unwrap_or(Err(TransportError::Timeout(timeout)));

        match result {
            Ok(()) => {
                if !self.controller.on_connected() {
                    return Err(SyncError::UnexpectedState(self.controller.state()));
                }
                info!(url = %self.config.url, reconnect, "connected");
                Ok(SyncNotification::Connected { reconnect })
            }
            Err(e) => {
                warn!(url = %self.config.url, error = %e, "connection attempt failed");
                let decision = self.controller.on_connect_failed(Instant::now());
                decision_notification(decision, self.controller.state())
            }
        }
    }

    async fn read(&mut self) -> SyncResult<SyncNotification> {
        loop {
            match self.transport.recv().await {
                Ok(TransportSignal::Message(msg)) => {
                    let event = msg.name();
                    let report = self.registry.dispatch(&msg);
                    trace!(
                        %event,
                        delivered = report.delivered,
                        failed = report.failed,
                        "dispatched"
                    );
                    return Ok(SyncNotification::Event(event));
                }
                Ok(TransportSignal::Closed(reason)) => return self.lost(reason).await,
                Err(TransportError::Decode(e)) => {
                    warn!(error = %e, "dropping undecodable frame");
                }
                Err(e) => {
                    return self
                        .lost(DisconnectReason::TransportError(e.to_string()))
                        .await
                }
            }
        }
    }

    async fn lost(&mut self, reason: DisconnectReason) -> SyncResult<SyncNotification> {
        if let Err(e) = self.transport.close().await {
            debug!(error = %e, "error closing dropped transport");
        }
        let decision = self.controller.on_disconnected(&reason, Instant::now());
        decision_notification(decision, self.controller.state())
    }

    async fn emit(&mut self, msg: ClientMessage) {
        if !self.is_connected() {
            debug!(command = %msg.name(), "not connected, dropping command");
            return;
        }
        let command = msg.name();
        if let Err(e) = self.transport.send(msg).await {
            warn!(%command, error = %e, "failed to send command");
        }
    }

    /// Subscribe to a board's broadcasts.
    pub async fn join_board(&mut self, board_id: &str) -> SyncResult<()> {
        require("board id", board_id)?;
        self.emit(ClientMessage::BoardJoin(board_id.to_string())).await;
        Ok(())
    }

    pub async fn leave_board(&mut self, board_id: &str) -> SyncResult<()> {
        require("board id", board_id)?;
        self.emit(ClientMessage::BoardLeave(board_id.to_string())).await;
        Ok(())
    }

    pub async fn update_board(&mut self, board_id: &str, updates: Updates) -> SyncResult<()> {
        require("board id", board_id)?;
        require_updates("board", &updates)?;
        self.emit(ClientMessage::BoardUpdate {
            board_id: board_id.to_string(),
            updates,
        })
        .await;
        Ok(())
    }

    pub async fn create_task(&mut self, task: NewTask) -> SyncResult<()> {
        require("column id", &task.column_id)?;
        require("task title", &task.title)?;
        self.emit(ClientMessage::TaskCreate(task)).await;
        Ok(())
    }

    pub async fn update_task(&mut self, task_id: &str, updates: Updates) -> SyncResult<()> {
        require("task id", task_id)?;
        require_updates("task", &updates)?;
        self.emit(ClientMessage::TaskUpdate {
            task_id: task_id.to_string(),
            updates,
        })
        .await;
        Ok(())
    }

    pub async fn delete_task(&mut self, task_id: &str) -> SyncResult<()> {
        require("task id", task_id)?;
        self.emit(ClientMessage::TaskDelete(task_id.to_string())).await;
        Ok(())
    }

    /// Move a task to `position` within `to_column_id`.
    pub async fn move_task(
        &mut self,
        task_id: &str,
        to_column_id: &str,
        position: u32,
    ) -> SyncResult<()> {
        require("task id", task_id)?;
        require("column id", to_column_id)?;
        self.emit(ClientMessage::TaskMove {
            task_id: task_id.to_string(),
            to_column_id: to_column_id.to_string(),
            position,
        })
        .await;
        Ok(())
    }

    pub async fn create_column(&mut self, column: NewColumn) -> SyncResult<()> {
        require("board id", &column.board_id)?;
        require("column title", &column.title)?;
        self.emit(ClientMessage::ColumnCreate(column)).await;
        Ok(())
    }

    pub async fn update_column(&mut self, column_id: &str, updates: Updates) -> SyncResult<()> {
        require("column id", column_id)?;
        require_updates("column", &updates)?;
        self.emit(ClientMessage::ColumnUpdate {
            column_id: column_id.to_string(),
            updates,
        })
        .await;
        Ok(())
    }

    pub async fn delete_column(&mut self, column_id: &str) -> SyncResult<()> {
        require("column id", column_id)?;
        self.emit(ClientMessage::ColumnDelete(column_id.to_string())).await;
        Ok(())
    }

    pub async fn send_message(&mut self, message: NewChatMessage) -> SyncResult<()> {
        require("board id", &message.board_id)?;
        require("message content", &message.content)?;
        self.emit(ClientMessage::ChatSend(message)).await;
        Ok(())
    }

    pub async fn start_typing(&mut self) {
        self.emit(ClientMessage::ChatTyping).await;
    }

    pub async fn stop_typing(&mut self) {
        self.emit(ClientMessage::ChatStopTyping).await;
    }

    pub async fn update_cursor(&mut self, position: Point) -> SyncResult<()> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(SyncError::InvalidCommand(format!(
                "cursor position ({}, {}) is not finite",
                position.x, position.y
            )));
        }
        self.emit(ClientMessage::UserCursor(position)).await;
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> SyncResult<()> {
    if value.trim().is_empty() {
        return Err(SyncError::MissingField(field));
    }
    Ok(())
}

fn require_updates(entity: &str, updates: &Updates) -> SyncResult<()> {
    if updates.is_empty() {
        return Err(SyncError::InvalidCommand(format!("{} update has no fields", entity)));
    }
    Ok(())
}

/// `None` means the controller refused the transition from `state`.
pub(crate) fn decision_notification(
    decision: Option<RetryDecision>,
    state: ConnectionState,
) -> SyncResult<SyncNotification> {
    match decision {
        Some(RetryDecision::Retry { attempt, delay }) => {
            Ok(SyncNotification::RetryScheduled { attempt, delay })
        }
        Some(RetryDecision::Terminated) => {
            Ok(SyncNotification::Ended(SessionEnd::ServerTerminated))
        }
        Some(RetryDecision::Exhausted { attempts }) => {
            Ok(SyncNotification::Ended(SessionEnd::RetriesExhausted { attempts }))
        }
        None => Err(SyncError::UnexpectedState(state)),
    }
}
