// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process transport.
//!
//! Connects a consumer directly to an [`SdcProvider`] in the same
//! process. Every request, response and report is encoded to bytes and
//! decoded again, so both ends only ever see what a real wire delivers.

use super::{ReportSource, Transport, TransportStats};
use crate::error::{Error, Result};
use crate::provider::{SdcProvider, Subscription};
use crate::wire::{decode_message, encode_message, WireMessage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

#[derive(Debug, Default)]
struct LocalStats {
    requests: AtomicU64,
    reports: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

impl LocalStats {
    /// Pass a unit through the codec, counting it in `counter`.
    fn transfer(&self, msg: &WireMessage, counter: &AtomicU64) -> Result<WireMessage> {
        let bytes = encode_message(msg);
        counter.fetch_add(bytes.len() as u64, Ordering::Relaxed);
        decode_message(&bytes)
    }
}

/// Transport to a provider living in the same process.
pub struct LocalTransport {
    provider: Weak<SdcProvider>,
    stats: Arc<LocalStats>,
}

impl LocalTransport {
    pub fn new(provider: &Arc<SdcProvider>) -> Self {
        Self {
            provider: Arc::downgrade(provider),
            stats: Arc::new(LocalStats::default()),
        }
    }

    fn provider(&self) -> Result<Arc<SdcProvider>> {
        self.provider.upgrade().ok_or(Error::Disconnected)
    }

    fn open(&self, subscription: Arc<Subscription>) -> Box<dyn ReportSource> {
        Box::new(LocalReportSource {
            subscription: Some(subscription),
            provider: self.provider.clone(),
            stats: self.stats.clone(),
        })
    }
}

impl Transport for LocalTransport {
    fn call(&self, request: &WireMessage) -> Result<WireMessage> {
        let provider = self.provider()?;
        self.stats.requests.fetch_add(1, Ordering::Relaxed);
        let request = self.stats.transfer(request, &self.stats.bytes_sent)?;
        let response = provider.handle_request(&request)?;
        self.stats.transfer(&response, &self.stats.bytes_received)
    }

    fn episodic_reports(&self, filters: Vec<String>) -> Result<Box<dyn ReportSource>> {
        let subscription = self.provider()?.subscribe(filters);
        Ok(self.open(subscription))
    }

    fn operation_invoked_reports(&self) -> Result<Box<dyn ReportSource>> {
        let subscription = self.provider()?.subscribe_operation_invoked();
        Ok(self.open(subscription))
    }

    fn stats(&self) -> TransportStats {
        TransportStats {
            requests: self.stats.requests.load(Ordering::Relaxed),
            reports: self.stats.reports.load(Ordering::Relaxed),
            bytes_sent: self.stats.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.stats.bytes_received.load(Ordering::Relaxed),
        }
    }
}

/// Report stream backed by a provider subscription.
struct LocalReportSource {
    /// `None` after close.
    subscription: Option<Arc<Subscription>>,
    provider: Weak<SdcProvider>,
    stats: Arc<LocalStats>,
}

impl ReportSource for LocalReportSource {
    fn next_report(&mut self, timeout: Duration) -> Result<Option<WireMessage>> {
        let Some(subscription) = &self.subscription else {
            return Ok(None);
        };
        match subscription.recv_timeout(timeout)? {
            Some(report) => {
                self.stats.reports.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .transfer(&report, &self.stats.bytes_received)
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        match self.provider.upgrade() {
            Some(provider) => provider.unsubscribe(subscription.id()),
            None => subscription.close(),
        }
    }
}

impl Drop for LocalReportSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::messages::{self, GetAction};

    #[test]
    fn test_call_passes_codec() {
        let provider = Arc::new(SdcProvider::new(ProviderConfig::new()));
        let transport = LocalTransport::new(&provider);
        let request = messages::get_request(GetAction::GetMdState, &[]);
        let response = transport.call(&request).expect("call");
        assert_eq!(response.type_name(), "GetMdStateResponse");
        assert_eq!(messages::relates_id(&response), messages::message_id(&request));
        let stats = transport.stats();
        assert_eq!(stats.requests, 1);
        assert!(stats.bytes_sent > 0 && stats.bytes_received > 0);
    }

    #[test]
    fn test_dropped_provider_disconnects() {
        let provider = Arc::new(SdcProvider::new(ProviderConfig::new()));
        let transport = LocalTransport::new(&provider);
        let mut source = transport.episodic_reports(vec![]).expect("stream");
        drop(provider);
        assert!(matches!(
            transport.call(&messages::get_request(GetAction::GetMdib, &[])),
            Err(Error::Disconnected)
        ));
        // Provider drop closed the subscription.
        assert!(matches!(source.next_report(Duration::from_millis(10)), Ok(None)));
    }

    #[test]
    fn test_close_unsubscribes() {
        let provider = Arc::new(SdcProvider::new(ProviderConfig::new()));
        let transport = LocalTransport::new(&provider);
        let mut source = transport.episodic_reports(vec![]).expect("stream");
        assert_eq!(provider.mdib().subscriptions().len(), 1);
        source.close();
        assert!(provider.mdib().subscriptions().is_empty());
        assert!(matches!(source.next_report(Duration::ZERO), Ok(None)));
    }
}
