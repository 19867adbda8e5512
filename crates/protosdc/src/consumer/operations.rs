// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client-side tracking of set operations.
//!
//! A set response carries the transaction id of the invocation; the
//! final outcome arrives later in an operation invoked report. Pending
//! invocations live in a registry keyed by transaction id, each holding
//! the sending half of a one-shot channel. The caller keeps the
//! [`OperationFuture`]; giving up is an explicit [`OperationsManager::cancel`]
//! or an expired deadline, never an implicit drop.

use crate::config::{ConsumerConfig, LogTarget, LAST_OPERATION_REPORTS};
use crate::error::{Error, Result};
use crate::invocation::{InvocationInfo, InvocationState, OperationInvokedPart};
use crate::messages;
use crate::pm::PmObject;
use crate::provider::reports::read_operation_invoked;
use crate::wire::WireMessage;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Final outcome of one set operation.
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub invocation_info: InvocationInfo,
    /// `InstanceIdentifier` of the invoking participant, if reported.
    pub invocation_source: Option<PmObject>,
    pub operation_handle: Option<String>,
    pub operation_target: Option<String>,
    pub set_response: Arc<WireMessage>,
    /// Every report part seen for the transaction, final one included.
    pub report_parts: Vec<OperationInvokedPart>,
}

impl OperationResult {
    pub fn invocation_state(&self) -> InvocationState {
        self.invocation_info.invocation_state
    }

    pub fn is_failed(&self) -> bool {
        self.invocation_state() == InvocationState::Failed
    }
}

#[derive(Debug)]
enum Resolution {
    Completed(Box<OperationResult>),
    Cancelled,
    Expired,
    Disconnected,
}

impl Resolution {
    fn into_result(self) -> Result<OperationResult> {
        match self {
            Self::Completed(r) => Ok(*r),
            Self::Cancelled => Err(Error::Cancelled),
            Self::Expired => Err(Error::Timeout),
            Self::Disconnected => Err(Error::Disconnected),
        }
    }
}

/// Handle on a pending operation result.
#[derive(Debug)]
pub struct OperationFuture {
    transaction_id: u64,
    rx: Receiver<Resolution>,
}

impl OperationFuture {
    pub fn transaction_id(&self) -> u64 {
        self.transaction_id
    }

    /// Block until resolved.
    ///
    /// `Err(Cancelled)` after cancel, `Err(Timeout)` after the deadline
    /// passed, `Err(Disconnected)` when the report stream ended.
    pub fn wait(self) -> Result<OperationResult> {
        self.rx
            .recv()
            .map_err(|_| Error::Disconnected)
            .and_then(Resolution::into_result)
    }

    /// Like [`wait`](Self::wait) but gives the future back on a local timeout.
    pub fn wait_timeout(self, timeout: Duration) -> std::result::Result<Result<OperationResult>, Self> {
        match self.rx.recv_timeout(timeout) {
            Ok(resolution) => Ok(resolution.into_result()),
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => Ok(Err(Error::Disconnected)),
        }
    }

    /// Result if already resolved.
    pub fn try_result(&self) -> Option<Result<OperationResult>> {
        match self.rx.try_recv() {
            Ok(resolution) => Some(resolution.into_result()),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::Disconnected)),
        }
    }
}

struct Pending {
    tx: Sender<Resolution>,
    set_response: Arc<WireMessage>,
    parts: Vec<OperationInvokedPart>,
    deadline: Instant,
}

#[derive(Default)]
struct Registry {
    pending: HashMap<u64, Pending>,
    last_reports: VecDeque<OperationInvokedPart>,
}

/// Matches operation invoked reports to watched transactions.
pub struct OperationsManager {
    registry: Mutex<Registry>,
    config: ConsumerConfig,
    log: LogTarget,
}

impl OperationsManager {
    pub fn new(config: &ConsumerConfig) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            config: config.clone(),
            log: config.log_target("protosdc::operations", "operations"),
        }
    }

    /// Start tracking the invocation answered by `set_response`.
    ///
    /// A FAILED response resolves at once. Report parts that arrived
    /// before the response are taken from the recent-report history.
    pub fn watch_operation(&self, set_response: WireMessage) -> Result<OperationFuture> {
        let (info, _) = messages::read_set_response(&set_response)?;
        let transaction_id = info.transaction_id;
        let action = set_response.type_name().to_string();
        let set_response = Arc::new(set_response);
        let (tx, rx) = channel::bounded(1);
        let future = OperationFuture { transaction_id, rx };

        if info.invocation_state == InvocationState::Failed {
            log::warn!(
                target: self.log.target(),
                "{} operation failed: transaction_id = {}, invocation state = {}, action = {}, error msg = {}",
                self.log,
                transaction_id,
                info.invocation_state.symbol(),
                action,
                info.error_text()
            );
            let result = OperationResult {
                invocation_info: info,
                invocation_source: None,
                operation_handle: None,
                operation_target: None,
                set_response,
                report_parts: Vec::new(),
            };
            let _ = tx.send(Resolution::Completed(Box::new(result)));
            return Ok(future);
        }

        log::info!(
            target: self.log.target(),
            "{} watch_operation: transaction_id = {}, invocation state = {}, action = {}",
            self.log,
            transaction_id,
            info.invocation_state.symbol(),
            action
        );
        let mut registry = self.registry.lock();
        let seen: Vec<OperationInvokedPart> = registry
            .last_reports
            .iter()
            .filter(|p| p.invocation_info.transaction_id == transaction_id)
            .cloned()
            .collect();
        let pending = Pending {
            tx,
            set_response,
            parts: seen,
            deadline: Instant::now() + self.config.operation_timeout(),
        };
        let early_final = pending
            .parts
            .iter()
            .rev()
            .find(|p| p.invocation_info.invocation_state.is_final())
            .cloned();
        match early_final {
            Some(part) => self.resolve(pending, &part),
            None => {
                registry.pending.insert(transaction_id, pending);
            }
        }
        Ok(future)
    }

    /// Route the parts of an operation invoked stream to their futures.
    pub fn on_operation_invoked_report(&self, stream: &WireMessage) -> Result<()> {
        let (_, parts) = read_operation_invoked(stream)?;
        let mut registry = self.registry.lock();
        for part in parts {
            if registry.last_reports.len() == LAST_OPERATION_REPORTS {
                registry.last_reports.pop_front();
            }
            registry.last_reports.push_back(part.clone());

            let transaction_id = part.invocation_info.transaction_id;
            let state = part.invocation_info.invocation_state;
            let Some(pending) = registry.pending.get_mut(&transaction_id) else {
                log::debug!(
                    target: self.log.target(),
                    "{} transaction id {} is not watched",
                    self.log,
                    transaction_id
                );
                continue;
            };
            pending.parts.push(part.clone());
            if !state.is_final() {
                log::info!(
                    target: self.log.target(),
                    "{} transaction id {}: state = {}, still waiting for a final state",
                    self.log,
                    transaction_id,
                    state.symbol()
                );
                continue;
            }
            if let Some(pending) = registry.pending.remove(&transaction_id) {
                self.resolve(pending, &part);
            }
        }
        Ok(())
    }

    fn resolve(&self, pending: Pending, last: &OperationInvokedPart) {
        let info = &last.invocation_info;
        if info.invocation_state == InvocationState::Failed {
            log::warn!(
                target: self.log.target(),
                "{} transaction id {} finished with error: error={:?}, error-message={}",
                self.log,
                info.transaction_id,
                info.invocation_error,
                info.error_text()
            );
        } else {
            log::info!(
                target: self.log.target(),
                "{} final state {} detected for transaction {}",
                self.log,
                info.invocation_state.symbol(),
                info.transaction_id
            );
        }
        let result = OperationResult {
            invocation_info: info.clone(),
            invocation_source: Some(last.invocation_source.clone()),
            operation_handle: Some(last.operation_handle.clone()),
            operation_target: last.operation_target.clone(),
            set_response: pending.set_response,
            report_parts: pending.parts,
        };
        if pending
            .tx
            .send(Resolution::Completed(Box::new(result)))
            .is_err()
        {
            log::info!(
                target: self.log.target(),
                "{} transaction id {} given up",
                self.log,
                info.transaction_id
            );
        }
    }

    /// Stop waiting for `transaction_id`; its future yields `Err(Cancelled)`.
    pub fn cancel(&self, transaction_id: u64) -> bool {
        let removed = self.registry.lock().pending.remove(&transaction_id);
        match removed {
            Some(pending) => {
                let _ = pending.tx.send(Resolution::Cancelled);
                true
            }
            None => false,
        }
    }

    /// Resolve every watched invocation past its deadline with `Err(Timeout)`.
    pub fn expire_overdue(&self) -> Vec<u64> {
        let now = Instant::now();
        let mut registry = self.registry.lock();
        let overdue: Vec<u64> = registry
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in &overdue {
            if let Some(pending) = registry.pending.remove(id) {
                log::warn!(
                    target: self.log.target(),
                    "{} transaction id {} timed out after {} report parts",
                    self.log,
                    id,
                    pending.parts.len()
                );
                let _ = pending.tx.send(Resolution::Expired);
            }
        }
        overdue
    }

    /// Release every waiter; called when the report stream is gone.
    pub fn close(&self) {
        let drained: Vec<Pending> = self.registry.lock().pending.drain().map(|(_, p)| p).collect();
        for pending in drained {
            let _ = pending.tx.send(Resolution::Disconnected);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.registry.lock().pending.len()
    }

    /// Recent report parts, oldest first.
    pub fn last_reports(&self) -> Vec<OperationInvokedPart> {
        self.registry.lock().last_reports.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{InvocationError, SetArgument};
    use crate::mdib::MdibVersionGroup;
    use crate::messages::SetAction;
    use crate::provider::reports::operation_invoked_report;

    fn response(info: &InvocationInfo) -> WireMessage {
        let request = messages::set_request("op", &SetArgument::String("x".into())).expect("request");
        messages::set_response(&request, SetAction::SetString, info, &MdibVersionGroup::default())
            .expect("response")
    }

    fn report(transaction_id: u64, state: InvocationState) -> WireMessage {
        let part = OperationInvokedPart::new("op", InvocationInfo::new(transaction_id, state));
        operation_invoked_report(&[part], &MdibVersionGroup::default()).expect("report")
    }

    #[test]
    fn test_failed_response_resolves_immediately() {
        let ops = OperationsManager::new(&ConsumerConfig::new());
        let info = InvocationInfo::failed(4, InvocationError::InvalidValue, "nope");
        let future = ops.watch_operation(response(&info)).expect("watch");
        let result = future.wait().expect("result");
        assert!(result.is_failed());
        assert!(result.report_parts.is_empty());
        assert_eq!(ops.pending_count(), 0);
    }

    #[test]
    fn test_wait_and_start_are_not_final() {
        let ops = OperationsManager::new(&ConsumerConfig::new());
        let future = ops
            .watch_operation(response(&InvocationInfo::new(5, InvocationState::Wait)))
            .expect("watch");
        ops.on_operation_invoked_report(&report(5, InvocationState::Wait)).expect("wait");
        ops.on_operation_invoked_report(&report(5, InvocationState::Start)).expect("start");
        let future = match future.wait_timeout(Duration::from_millis(10)) {
            Err(f) => f,
            Ok(r) => panic!("resolved early: {:?}", r),
        };
        ops.on_operation_invoked_report(&report(5, InvocationState::Finished)).expect("fin");
        let result = future.wait().expect("result");
        assert_eq!(result.invocation_state(), InvocationState::Finished);
        assert_eq!(result.report_parts.len(), 3);
        assert_eq!(result.operation_handle.as_deref(), Some("op"));
    }

    #[test]
    fn test_report_before_response_is_picked_up() {
        let ops = OperationsManager::new(&ConsumerConfig::new());
        ops.on_operation_invoked_report(&report(6, InvocationState::Finished)).expect("fin");
        let future = ops
            .watch_operation(response(&InvocationInfo::new(6, InvocationState::Finished)))
            .expect("watch");
        assert!(future.try_result().is_some_and(|r| r.is_ok()));
    }

    #[test]
    fn test_cancel_and_expiry() {
        let config = ConsumerConfig::new();
        config.set_operation_timeout(Duration::ZERO);
        let ops = OperationsManager::new(&config);
        let a = ops
            .watch_operation(response(&InvocationInfo::new(7, InvocationState::Wait)))
            .expect("watch");
        assert!(ops.cancel(7));
        assert!(matches!(a.wait(), Err(Error::Cancelled)));

        let b = ops
            .watch_operation(response(&InvocationInfo::new(8, InvocationState::Wait)))
            .expect("watch");
        assert_eq!(ops.expire_overdue(), vec![8]);
        assert!(matches!(b.wait(), Err(Error::Timeout)));
    }

    #[test]
    fn test_history_is_bounded() {
        let ops = OperationsManager::new(&ConsumerConfig::new());
        for id in 0..(LAST_OPERATION_REPORTS as u64 + 5) {
            ops.on_operation_invoked_report(&report(id, InvocationState::Finished))
                .expect("report");
        }
        let history = ops.last_reports();
        assert_eq!(history.len(), LAST_OPERATION_REPORTS);
        assert_eq!(history[0].invocation_info.transaction_id, 5);
    }
}
