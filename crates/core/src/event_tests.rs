// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    board_updated = { "board:updated", EventName::BoardUpdated },
    task_moved = { "task:moved", EventName::TaskMoved },
    users_online = { "users:online", EventName::UsersOnline },
    stop_typing = { "chat:stop-typing", EventName::ChatStopTyping },
    error = { "error", EventName::Error },
)]
fn event_name_from_str_valid(input: &str, expected: EventName) {
    assert_eq!(input.parse::<EventName>().unwrap(), expected);
}

#[parameterized(
    outbound_only = { "task:move" },
    wrong_case = { "Task:Moved" },
    empty = { "" },
)]
fn event_name_from_str_invalid(input: &str) {
    let err = input.parse::<EventName>().unwrap_err();
    assert!(matches!(err, Error::UnknownEvent(_)));
}

#[test]
fn all_names_parse_back() {
    for name in EventName::ALL {
        assert_eq!(name.as_str().parse::<EventName>().unwrap(), name);
    }
}

#[test]
fn all_names_are_distinct() {
    let mut names: Vec<_> = EventName::ALL.iter().map(|n| n.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), EventName::ALL.len());
}

#[test]
fn serde_uses_wire_name() {
    let json = serde_json::to_string(&EventName::ChatStopTyping).unwrap();
    assert_eq!(json, "\"chat:stop-typing\"");
    let parsed: EventName = serde_json::from_str("\"column:deleted\"").unwrap();
    assert_eq!(parsed, EventName::ColumnDeleted);
}

#[parameterized(
    cursor = { EventName::UserCursor, true },
    online = { EventName::UsersOnline, true },
    task = { EventName::TaskCreated, false },
    error = { EventName::Error, false },
)]
fn presence_classification(name: EventName, expected: bool) {
    assert_eq!(name.is_presence(), expected);
}

#[test]
fn command_name_display() {
    assert_eq!(CommandName::TaskMove.to_string(), "task:move");
    assert_eq!(CommandName::ChatStopTyping.as_str(), "chat:stop-typing");
}
