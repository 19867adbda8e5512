// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Report subscriptions and the dispatcher.
//!
//! One producer (the committing provider) fans out to N subscriptions,
//! each with its own bounded FIFO drained by a dedicated sender thread.
//!
//! # Backpressure
//!
//! The FIFO holds [`SUBSCRIPTION_QUEUE_CAPACITY`] reports. A full FIFO
//! blocks the committing thread until the slow subscriber catches up or
//! is removed; reports are never dropped silently.

use super::reports::{
    self, StateReportLayout, ALERT_REPORT, COMPONENT_REPORT, CONTEXT_REPORT, METRIC_REPORT,
    OPERATIONAL_STATE_REPORT,
};
use crate::actions::Action;
use crate::config::{LogTarget, SUBSCRIPTION_QUEUE_CAPACITY};
use crate::error::{Error, Result};
use crate::invocation::OperationInvokedPart;
use crate::mdib::{DescriptorContainer, MdibVersionGroup, StateContainer, TransactionResult};
use crate::wire::WireMessage;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Unit travelling through a subscription FIFO.
#[derive(Debug, Clone)]
pub enum ReportItem {
    /// One built report, shared by every matching subscription.
    Report(Arc<WireMessage>),
    /// Close sentinel; the sender thread exits on receipt.
    Stop,
}

/// One subscriber: `OPEN` until closed, then `CLOSED` for good.
pub struct Subscription {
    id: String,
    filters: Vec<String>,
    actions: Vec<Action>,
    tx: Sender<ReportItem>,
    rx: Receiver<ReportItem>,
    closed: AtomicBool,
}

impl Subscription {
    fn new(filters: Vec<String>) -> Self {
        let (tx, rx) = channel::bounded(SUBSCRIPTION_QUEUE_CAPACITY);
        let actions = Action::selected_by(&filters);
        Self {
            id: format!("urn:uuid:{}", uuid::Uuid::new_v4()),
            filters,
            actions,
            tx,
            rx,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Whether reports of `action` go to this subscription.
    pub fn matches(&self, action: Action) -> bool {
        !self.is_closed() && self.actions.contains(&action)
    }

    /// Enqueue a report, blocking while the FIFO is full.
    pub fn send_report(&self, report: Arc<WireMessage>) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Disconnected);
        }
        self.tx
            .send(ReportItem::Report(report))
            .map_err(|_| Error::Disconnected)
    }

    /// Next item, blocking. `None` once the sentinel was consumed.
    pub fn recv(&self) -> Option<Arc<WireMessage>> {
        match self.rx.recv() {
            Ok(ReportItem::Report(r)) => Some(r),
            Ok(ReportItem::Stop) | Err(_) => None,
        }
    }

    /// Next item within `timeout`.
    ///
    /// `Err(Timeout)` when nothing arrived, `Ok(None)` after close.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Arc<WireMessage>>> {
        match self.rx.recv_timeout(timeout) {
            Ok(ReportItem::Report(r)) => Ok(Some(r)),
            Ok(ReportItem::Stop) | Err(RecvTimeoutError::Disconnected) => Ok(None),
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout),
        }
    }

    /// Mark closed and push the sentinel.
    ///
    /// If the FIFO is full the oldest pending report makes room for it.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        while self.tx.try_send(ReportItem::Stop).is_err() {
            if let Err(TryRecvError::Disconnected) = self.rx.try_recv() {
                break;
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Reports waiting in the FIFO.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Discard every queued item; returns how many reports were dropped.
    fn drain(&self) -> usize {
        self.rx
            .try_iter()
            .filter(|item| matches!(item, ReportItem::Report(_)))
            .count()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("filters", &self.filters)
            .field("closed", &self.is_closed())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Registry of live subscriptions plus the report dispatcher.
pub struct SubscriptionManager {
    subscriptions: DashMap<String, Arc<Subscription>>,
    log: LogTarget,
}

impl SubscriptionManager {
    pub fn new(log: LogTarget) -> Self {
        Self {
            subscriptions: DashMap::new(),
            log,
        }
    }

    /// Register a subscriber; an empty filter list selects every
    /// episodic report kind.
    pub fn on_subscribe_request(&self, filters: Vec<String>) -> Arc<Subscription> {
        let subscription = Arc::new(Subscription::new(filters));
        log::info!(
            target: self.log.target(),
            "{} new subscription {} filters={:?}",
            self.log,
            subscription.id,
            subscription.filters
        );
        self.subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        subscription
    }

    /// Close a subscription and discard its unread reports.
    pub fn remove_subscription(&self, id: &str) -> Option<Arc<Subscription>> {
        let (_, subscription) = self.subscriptions.remove(id)?;
        let dropped = subscription.drain();
        subscription.close();
        log::info!(
            target: self.log.target(),
            "{} removed subscription {} ({} pending reports discarded)",
            self.log,
            id,
            dropped
        );
        Some(subscription)
    }

    /// Close every subscription.
    pub fn stop_all(&self) {
        let ids: Vec<String> = self.subscriptions.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.remove_subscription(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Open subscriptions receiving `action`.
    pub fn subscribers_for(&self, action: Action) -> Vec<Arc<Subscription>> {
        self.subscriptions
            .iter()
            .filter(|e| e.value().matches(action))
            .map(|e| e.value().clone())
            .collect()
    }

    /// Build the report only if someone listens, then fan it out.
    ///
    /// Returns the number of subscriptions that received it.
    fn fan_out(
        &self,
        action: Action,
        build: impl FnOnce() -> Result<WireMessage>,
    ) -> Result<usize> {
        let subscribers = self.subscribers_for(action);
        if subscribers.is_empty() {
            return Ok(0);
        }
        let report = Arc::new(build()?);
        let mut delivered = 0;
        for subscription in subscribers {
            match subscription.send_report(report.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => log::debug!(
                    target: self.log.target(),
                    "{} subscription {} closed during {}",
                    self.log,
                    subscription.id,
                    action.short_name()
                ),
            }
        }
        log::trace!(
            target: self.log.target(),
            "{} {} sent to {} subscriber(s)",
            self.log,
            action.short_name(),
            delivered
        );
        Ok(delivered)
    }

    fn send_states(
        &self,
        layout: &'static StateReportLayout,
        states: &[StateContainer],
        group: &MdibVersionGroup,
    ) -> Result<usize> {
        self.fan_out(layout.action, || reports::state_report(layout, states, group))
    }

    pub fn send_episodic_metric_report(
        &self,
        states: &[StateContainer],
        group: &MdibVersionGroup,
    ) -> Result<usize> {
        self.send_states(&METRIC_REPORT, states, group)
    }

    pub fn send_episodic_alert_report(
        &self,
        states: &[StateContainer],
        group: &MdibVersionGroup,
    ) -> Result<usize> {
        self.send_states(&ALERT_REPORT, states, group)
    }

    pub fn send_episodic_component_state_report(
        &self,
        states: &[StateContainer],
        group: &MdibVersionGroup,
    ) -> Result<usize> {
        self.send_states(&COMPONENT_REPORT, states, group)
    }

    pub fn send_episodic_context_report(
        &self,
        states: &[StateContainer],
        group: &MdibVersionGroup,
    ) -> Result<usize> {
        self.send_states(&CONTEXT_REPORT, states, group)
    }

    pub fn send_episodic_operational_state_report(
        &self,
        states: &[StateContainer],
        group: &MdibVersionGroup,
    ) -> Result<usize> {
        self.send_states(&OPERATIONAL_STATE_REPORT, states, group)
    }

    pub fn send_waveform(
        &self,
        states: &[StateContainer],
        group: &MdibVersionGroup,
    ) -> Result<usize> {
        self.fan_out(Action::Waveform, || reports::waveform_report(states, group))
    }

    pub fn send_description_modification_report(
        &self,
        created: &[DescriptorContainer],
        updated: &[DescriptorContainer],
        deleted: &[DescriptorContainer],
        states: &[StateContainer],
        group: &MdibVersionGroup,
    ) -> Result<usize> {
        self.fan_out(Action::DescriptionModificationReport, || {
            reports::description_modification_report(created, updated, deleted, states, group)
        })
    }

    pub fn send_operation_invoked_report(
        &self,
        parts: &[OperationInvokedPart],
        group: &MdibVersionGroup,
    ) -> Result<usize> {
        self.fan_out(Action::OperationInvokedReport, || {
            reports::operation_invoked_report(parts, group)
        })
    }

    /// Route one committed change-set: descriptors first, then each
    /// state kind with updates.
    pub fn dispatch(&self, result: &TransactionResult) -> Result<()> {
        let group = &result.version_group;
        if result.has_descriptor_updates() {
            self.send_description_modification_report(
                &result.descr_created,
                &result.descr_updated,
                &result.descr_deleted,
                &result.descr_states,
                group,
            )?;
        }
        if !result.metric_updates.is_empty() {
            self.send_episodic_metric_report(&result.metric_updates, group)?;
        }
        if !result.alert_updates.is_empty() {
            self.send_episodic_alert_report(&result.alert_updates, group)?;
        }
        if !result.comp_updates.is_empty() {
            self.send_episodic_component_state_report(&result.comp_updates, group)?;
        }
        if !result.ctxt_updates.is_empty() {
            self.send_episodic_context_report(&result.ctxt_updates, group)?;
        }
        if !result.op_updates.is_empty() {
            self.send_episodic_operational_state_report(&result.op_updates, group)?;
        }
        if !result.rt_updates.is_empty() {
            self.send_waveform(&result.rt_updates, group)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::{states, PmObject, PmValue};

    fn manager() -> SubscriptionManager {
        SubscriptionManager::new(LogTarget::new("protosdc::test", "subscriptions", None))
    }

    fn metric(handle: &str) -> StateContainer {
        StateContainer::new(
            PmObject::new(&states::NUMERIC_METRIC_STATE)
                .with("DescriptorHandle", handle)
                .and_then(|o| o.with("StateVersion", PmValue::UInt(1)))
                .expect("metric state"),
        )
    }

    #[test]
    fn test_no_subscriber_short_circuits() {
        let m = manager();
        let group = MdibVersionGroup::new_sequence();
        assert_eq!(
            m.send_episodic_metric_report(&[metric("m1")], &group)
                .expect("send"),
            0
        );
    }

    #[test]
    fn test_close_unblocks_receiver() {
        let m = manager();
        let sub = m.on_subscribe_request(vec![]);
        let reader = {
            let sub = sub.clone();
            std::thread::spawn(move || sub.recv().is_none())
        };
        m.remove_subscription(sub.id());
        assert!(reader.join().expect("reader"));
        assert!(sub.is_closed());
        assert!(m.is_empty());
    }

    #[test]
    fn test_close_on_full_queue() {
        let m = manager();
        let sub = m.on_subscribe_request(vec!["EpisodicMetricReport".to_string()]);
        let group = MdibVersionGroup::new_sequence();
        for _ in 0..SUBSCRIPTION_QUEUE_CAPACITY {
            m.send_episodic_metric_report(&[metric("m1")], &group)
                .expect("send");
        }
        assert_eq!(sub.pending(), SUBSCRIPTION_QUEUE_CAPACITY);
        sub.close();
        let mut reports = 0;
        while sub.recv().is_some() {
            reports += 1;
        }
        assert_eq!(reports, SUBSCRIPTION_QUEUE_CAPACITY - 1);
        assert!(sub.send_report(Arc::new(WireMessage::new("X"))).is_err());
    }

    #[test]
    fn test_operation_invoked_needs_explicit_filter() {
        let m = manager();
        let all = m.on_subscribe_request(vec![]);
        let ops = m.on_subscribe_request(vec!["OperationInvokedReport".to_string()]);
        let subscribers = m.subscribers_for(Action::OperationInvokedReport);
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].id(), ops.id());
        assert!(all.matches(Action::Waveform));
    }
}
