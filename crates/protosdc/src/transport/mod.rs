// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport boundary between consumer and provider.
//!
//! The core only needs whole messages moved as indivisible units:
//!
//! ```ignore
//! pub trait Transport: Send + Sync {
//!     fn call(&self, request: &WireMessage) -> Result<WireMessage>;
//!     fn episodic_reports(&self, filters: Vec<String>) -> Result<Box<dyn ReportSource>>;
//!     fn operation_invoked_reports(&self) -> Result<Box<dyn ReportSource>>;
//! }
//! ```
//!
//! # Implementations
//!
//! - [`LocalTransport`]: in-process provider, every unit passes the binary codec

mod local;

pub use local::LocalTransport;

use crate::error::Result;
use crate::wire::WireMessage;
use std::time::Duration;

/// Transfer counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransportStats {
    pub requests: u64,
    pub reports: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Request/response calls and report streams towards one provider.
pub trait Transport: Send + Sync {
    /// Send a get or set request and wait for its response.
    fn call(&self, request: &WireMessage) -> Result<WireMessage>;

    /// Open an episodic report stream; an empty filter list selects all
    /// episodic reports.
    fn episodic_reports(&self, filters: Vec<String>) -> Result<Box<dyn ReportSource>>;

    /// Open the operation invoked report stream.
    fn operation_invoked_reports(&self) -> Result<Box<dyn ReportSource>>;

    /// Default implementation returns empty statistics.
    fn stats(&self) -> TransportStats {
        TransportStats::default()
    }
}

/// Receiving end of a server-streaming call.
pub trait ReportSource: Send {
    /// Next report.
    ///
    /// * `Ok(Some(msg))` on a report
    /// * `Ok(None)` once the stream ended for good
    /// * `Err(Timeout)` when nothing arrived within `timeout`
    fn next_report(&mut self, timeout: Duration) -> Result<Option<WireMessage>>;

    /// End the stream from the receiving side.
    fn close(&mut self);
}
