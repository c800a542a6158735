// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tack-core: Shared library for the tack board sync client
//!
//! This crate provides the wire contract (event names and messages), the board
//! entities they carry, and the client-local replica those events are applied to.

pub mod error;
pub mod event;
pub mod model;
pub mod protocol;
pub mod replica;

pub use error::{Error, Result};
pub use event::{CommandName, EventName};
pub use model::{
    Board, ChatMessage, Column, Cursor, NewChatMessage, NewColumn, NewTask, Notification, Point,
    ServerError, Task, TypingInfo, Updates, User,
};
pub use protocol::{ClientMessage, ServerMessage};
pub use replica::BoardReplica;
