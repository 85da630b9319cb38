// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for daemon communication.
//!
//! Structured requests travel as 4-byte length prefix (big-endian) + JSON
//! payload. The routed command surface additionally speaks the `erl` wire
//! format: printable term text, handled by the [`term`] codec and bridged
//! to JSON values for a single serde path.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod bridge;
mod request;
mod response;
pub mod term;
mod wire;

pub use bridge::{json_to_term, term_to_json};
pub use request::Request;
pub use response::{QueueStatusEntry, Response};
pub use term::{Term, TermError};
pub use wire::{decode, encode, read_message, write_message, ProtocolError};
pub use wire::{read_request, write_response};

#[cfg(test)]
mod property_tests;
