//! HTTP and WebSocket front end for wolfgame sessions.

pub mod api;
pub mod config;
pub mod logging;
