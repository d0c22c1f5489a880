//! Slack integration - deploy-status slash command
//!
//! This crate turns a slash-command webhook into an ephemeral status reply:
//! - **Commands** (`commands`) - body decoding (base64 + form) into a payload
//! - **Status** (`status`) - per-region indicator lines
//! - **Block Kit** (`blocks`) - message envelope builders
//! - **Webhook** (`webhook`) - the request handler and response envelope
//!
//! # Architecture
//!
//! ```text
//! WebhookEvent → DeployStatusHandler → FetchCoordinator (x5 regions)
//!                      ↓
//!             Block Kit reply ← StatusBoard
//! ```

pub mod blocks;
pub mod commands;
pub mod status;
pub mod webhook;

pub use webhook::{DeployStatusHandler, InvocationContext, WebhookEvent, WebhookResponse};
