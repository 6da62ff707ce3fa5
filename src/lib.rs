// src/lib.rs
// DevBridge - maps developer intents onto safety-gated make targets

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod ai_service;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod intent;
pub mod make;
pub mod mcp;
pub mod suggest;
pub mod utils;
pub use error::{BridgeError, Result};
