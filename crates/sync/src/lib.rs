// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tack-sync: Real-time sync client for collaborative boards.
//!
//! Keeps a client-local board replica in step with a board server over a
//! persistent WebSocket connection.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────┐
//! │ SessionBinder │────►│ SyncClient  │────►│  Transport  │────►│  Board   │
//! │  (auth state) │◄────│  (façade)   │◄────│   (trait)   │◄────│  Server  │
//! └───────────────┘     └─────────────┘     └─────────────┘     └──────────┘
//!        │                 │        │
//!        ▼                 ▼        ▼
//! ┌───────────────┐  ┌──────────┐ ┌────────────┐
//! │ BoardReplica  │  │ Listener │ │ Reconnect  │
//! │ (shared)      │  │ Registry │ │ Controller │
//! └───────────────┘  └──────────┘ └────────────┘
//! ```
//!
//! # Features
//!
//! - Credential sent in the WebSocket handshake
//! - Per-event listeners with idempotent registration
//! - Automatic reconnect with exponential backoff, cancelled on teardown
//! - Board membership restored after a reconnect
//! - Injectable transport trait for testing

pub mod client;
pub mod config;
pub mod error;
pub mod reconnect;
pub mod registry;
pub mod session;
pub mod transport;

pub use client::{SessionEnd, SyncClient, SyncNotification};
pub use config::{ConfigError, ReconnectConfig, SyncConfig};
pub use error::{ListenerError, SyncError, SyncResult};
pub use reconnect::{Backoff, ConnectionState, ReconnectController, RetryDecision};
pub use registry::{listener, DispatchReport, Listener, ListenerId, ListenerRegistry};
pub use session::{AuthState, SessionBinder, SharedReplica};
pub use transport::{
    Credential, DisconnectReason, Mechanism, Transport, TransportError, TransportOptions,
    TransportSignal, WebSocketTransport,
};
