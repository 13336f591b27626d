//! Integration tests for tickr.
//!
//! These tests drive a full `Session` against:
//! - a local WebSocket feed server
//! - a scripted snapshot provider
//! - a surface that records what the board shows

pub mod common;
