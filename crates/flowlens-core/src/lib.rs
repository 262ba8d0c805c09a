//! # flowlens-core - Core Domain Types
//!
//! Foundation crate for flowlens. Provides the flow data model, the
//! accessors that normalize the four protocol variants into uniform
//! display facts, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, chrono, thiserror, tracing, url).
//!
//! ## Public API
//!
//! ### Flow Model (`flow`)
//! - [`FlowRecord`] - Closed tagged union over Http/Dns/Tcp/Udp flows
//! - [`Flow`] - A record plus user-only metadata (`pinned`, `note`)
//! - [`FlowStatus`], [`StatusClass`] - Normalized status and color bucket
//! - [`IconCategory`] - Iconographic category for the leading column
//! - [`Headers`], [`Timestamp`] - Supporting value types
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use flowlens_core::prelude::*;
//! ```

pub mod error;
pub mod flow;
pub mod logging;
pub mod prelude;

pub use error::{Error, Result};
pub use flow::{
    format_bytes, format_duration_ms, DnsFlow, DnsQuestion, Flow, FlowId, FlowRecord, FlowStatus,
    Headers, HttpFlow, HttpMessage, HttpRequest, HttpResponse, IconCategory, SocketConnection,
    SocketMessage, StatusClass, TcpFlow, Timestamp, UdpFlow,
};
