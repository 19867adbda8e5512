// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Protocol constants and runtime configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: constants fixed by the protocol or by the
//!   queueing model (queue capacities, action prefix, anonymous source).
//! - **Level 2 (Dynamic)**: [`ProviderConfig`] and [`ConsumerConfig`],
//!   cloneable handles whose values can be swapped while components run.
//!
//! # Example
//!
//! ```
//! use protosdc::config::{ConsumerConfig, GapPolicy, ProviderConfig};
//! use std::time::Duration;
//!
//! let provider = ProviderConfig::new();
//! provider.set_invocation_timeout(Duration::from_secs(5));
//!
//! let consumer = ConsumerConfig::new().with_log_prefix("icu-3");
//! consumer.set_gap_policy(GapPolicy::RejectGaps);
//! assert_eq!(consumer.gap_policy(), GapPolicy::RejectGaps);
//! ```

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// =======================================================================
// Queueing model
// =======================================================================

/// Capacity of a subscription's pending report FIFO.
///
/// A full FIFO blocks the dispatching thread until the stream drains
/// (bounded queue backpressure, no silent drop).
pub const SUBSCRIPTION_QUEUE_CAPACITY: usize = 50;

/// Capacity of the delayed-operation queue of the SCO worker.
pub const OPERATION_QUEUE_CAPACITY: usize = 10;

/// Enqueue timeout for the delayed-operation queue.
pub const OPERATION_ENQUEUE_TIMEOUT: Duration = Duration::from_secs(1);

/// Poll interval of the SCO worker; every idle poll runs the invocation timeout check.
pub const WORKER_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default deadline for a non-terminal operation invocation.
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(30);

// =======================================================================
// Consumer mirror
// =======================================================================

/// Sample count kept per real-time sample array metric.
pub const MAX_REALTIME_SAMPLES: usize = 100;

/// Number of operation invoked reports kept for diagnostics.
pub const LAST_OPERATION_REPORTS: usize = 50;

/// Poll interval of the consumer report receivers; bounds the stop latency.
pub const REPORT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// =======================================================================
// Report vocabulary
// =======================================================================

/// Prefix shared by all report action identifiers.
pub const ACTION_PREFIX: &str = "org.somda.protosdc.mdib_reporting.action.";

/// Root of the anonymous invocation source identifier.
pub const INVOCATION_SOURCE_ROOT: &str =
    "http://standards.ieee.org/downloads/11073/11073-20701-2018";

/// Extension of the anonymous invocation source identifier.
pub const INVOCATION_SOURCE_EXTENSION: &str = "AnonymousSdcParticipant";

/// Placeholder written into `source_mds` of every report part.
pub const SOURCE_MDS_PLACEHOLDER: &str = "ToDo";

/// Language tag of generated invocation error messages.
pub const ERROR_MESSAGE_LANG: &str = "EN_en";

// =======================================================================
// Logging
// =======================================================================

/// Logger handle owned by a component.
///
/// Carries the `log` target and an optional instance prefix so that
/// several providers or consumers in one process can be told apart.
#[derive(Clone, Debug)]
pub struct LogTarget {
    target: &'static str,
    tag: Arc<str>,
}

impl LogTarget {
    /// Create a handle for `component`, optionally prefixed by an instance name.
    pub fn new(target: &'static str, component: &str, prefix: Option<&str>) -> Self {
        let tag: Arc<str> = match prefix {
            Some(p) if !p.is_empty() => format!("[{}/{}]", p, component).into(),
            _ => format!("[{}]", component).into(),
        };
        Self { target, tag }
    }

    /// `log` target string.
    #[inline]
    pub fn target(&self) -> &'static str {
        self.target
    }
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

// =======================================================================
// Runtime configuration
// =======================================================================

/// How the consumer treats a report whose mdib version skips ahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapPolicy {
    /// Accept any strictly greater version; gaps are logged.
    AcceptNewer,
    /// Accept only the exact successor of the current version.
    RejectGaps,
}

/// Provider side runtime configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    invocation_timeout: Arc<ArcSwap<Duration>>,
    log_prefix: Arc<ArcSwap<Option<Arc<str>>>>,
}

impl ProviderConfig {
    /// Create a configuration with default values.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            invocation_timeout: Arc::new(ArcSwap::from_pointee(DEFAULT_INVOCATION_TIMEOUT)),
            log_prefix: Arc::new(ArcSwap::from_pointee(None)),
        }
    }

    /// Set the instance prefix used in log messages.
    #[must_use]
    pub fn with_log_prefix(self, prefix: &str) -> Self {
        self.log_prefix.store(Arc::new(Some(prefix.into())));
        self
    }

    /// Deadline after which a non-terminal invocation is resolved as failed.
    pub fn invocation_timeout(&self) -> Duration {
        **self.invocation_timeout.load()
    }

    /// Change the invocation deadline; applies to the next timeout check.
    pub fn set_invocation_timeout(&self, timeout: Duration) {
        self.invocation_timeout.store(Arc::new(timeout));
    }

    /// Logger handle for a provider component.
    pub fn log_target(&self, target: &'static str, component: &str) -> LogTarget {
        let prefix = self.log_prefix.load();
        LogTarget::new(target, component, prefix.as_deref())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer side runtime configuration.
#[derive(Clone)]
pub struct ConsumerConfig {
    gap_policy: Arc<ArcSwap<GapPolicy>>,
    operation_timeout: Arc<ArcSwap<Duration>>,
    log_prefix: Arc<ArcSwap<Option<Arc<str>>>>,
}

impl ConsumerConfig {
    /// Create a configuration with default values.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            gap_policy: Arc::new(ArcSwap::from_pointee(GapPolicy::AcceptNewer)),
            operation_timeout: Arc::new(ArcSwap::from_pointee(DEFAULT_INVOCATION_TIMEOUT)),
            log_prefix: Arc::new(ArcSwap::from_pointee(None)),
        }
    }

    /// Set the instance prefix used in log messages.
    #[must_use]
    pub fn with_log_prefix(self, prefix: &str) -> Self {
        self.log_prefix.store(Arc::new(Some(prefix.into())));
        self
    }

    /// Current mdib version gap policy.
    pub fn gap_policy(&self) -> GapPolicy {
        **self.gap_policy.load()
    }

    /// Replace the gap policy.
    pub fn set_gap_policy(&self, policy: GapPolicy) {
        self.gap_policy.store(Arc::new(policy));
    }

    /// How long a watched operation may stay without a final state.
    pub fn operation_timeout(&self) -> Duration {
        **self.operation_timeout.load()
    }

    pub fn set_operation_timeout(&self, timeout: Duration) {
        self.operation_timeout.store(Arc::new(timeout));
    }

    /// Logger handle for a consumer component.
    pub fn log_target(&self, target: &'static str, component: &str) -> LogTarget {
        let prefix = self.log_prefix.load();
        LogTarget::new(target, component, prefix.as_deref())
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self::new()
    }
}
