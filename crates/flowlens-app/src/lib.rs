//! # flowlens-app - Application State and Orchestration
//!
//! Owns everything between the capture data and the terminal: the flow
//! store, the table controller (sort, selection, focus, pinned
//! filter), the content format pipeline, and configuration loading.
//!
//! ## Public API
//!
//! - [`AppState`] - Top-level mutable state and key routing
//! - [`FlowTableState`] - Sort/selection/focus state machine
//! - [`FlowStore`] - Identity-keyed flow storage with pruning
//! - [`format_content`] - Content-format negotiation and transcoding
//! - [`InputKey`] - Terminal-library-independent key events
//! - [`Config`] - `.flowlens/config.toml` settings

pub mod config;
pub mod content;
pub mod input_key;
pub mod state;
pub mod store;
pub mod table;

pub use config::Config;
pub use content::{format_content, ContentData, ContentEncoding, FormatTag, FormattedContent};
pub use input_key::InputKey;
pub use state::{AppState, BodyTab};
pub use store::FlowStore;
pub use table::{FlowTableState, KeyOutcome, NavEffect, SortDirection, COLUMNS, SELECT_ALL};
