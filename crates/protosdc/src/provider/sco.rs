// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service control object: operation registry and worker.
//!
//! Delayed operations go through a bounded queue drained by one worker
//! thread, which reports `Wait`, `Start` and the final state as
//! operation invoked reports. Immediate operations execute on the
//! calling thread and report only the final state.
//!
//! Invocations still in the queue carry a deadline. An invocation picked
//! up after its deadline is reported failed instead of executed, and the
//! worker sweeps expired ones after every item and on every idle poll.
//! Stopping the worker fails whatever is still queued.

use super::ProviderMdib;
use crate::config::{
    LogTarget, ProviderConfig, OPERATION_ENQUEUE_TIMEOUT, OPERATION_QUEUE_CAPACITY,
    WORKER_POLL_INTERVAL,
};
use crate::error::{Error, Result};
use crate::invocation::{
    InvocationError, InvocationInfo, InvocationState, OperationInvokedPart, SetArgument,
};
use crossbeam::channel::{self, RecvTimeoutError, SendTimeoutError, Sender};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Outcome of a successful execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteResult {
    pub invocation_state: InvocationState,
    pub operation_target: Option<String>,
}

impl ExecuteResult {
    pub fn finished(operation_target: Option<&str>) -> Self {
        Self {
            invocation_state: InvocationState::Finished,
            operation_target: operation_target.map(str::to_string),
        }
    }
}

/// Device-side implementation of one operation.
pub trait OperationHandler: Send + Sync {
    /// Operation descriptor handle.
    fn handle(&self) -> &str;

    /// Run on the worker thread (`true`) or on the calling thread.
    fn delayed_processing(&self) -> bool {
        true
    }

    /// Execute the operation; `Err` resolves the invocation as failed.
    fn execute(&self, mdib: &ProviderMdib, argument: &SetArgument) -> Result<ExecuteResult>;
}

struct Enqueued {
    transaction_id: u64,
    handler: Arc<dyn OperationHandler>,
    argument: SetArgument,
}

enum WorkItem {
    Run(Enqueued),
    Stop,
}

struct Pending {
    operation_handle: String,
    deadline: Instant,
}

struct Worker {
    tx: Sender<WorkItem>,
    thread: JoinHandle<()>,
}

/// Registered operations of a provider, looked up by handle.
pub struct ScoOperationsRegistry {
    operations: DashMap<String, Arc<dyn OperationHandler>>,
    /// Delayed invocations not yet picked up by the worker.
    pending: Mutex<HashMap<u64, Pending>>,
    worker: Mutex<Option<Worker>>,
    /// Set by `stop_worker`; queued items are no longer executed.
    stopping: AtomicBool,
    mdib: Arc<ProviderMdib>,
    config: ProviderConfig,
    log: LogTarget,
}

impl ScoOperationsRegistry {
    pub fn new(mdib: Arc<ProviderMdib>, config: &ProviderConfig) -> Self {
        Self {
            operations: DashMap::new(),
            pending: Mutex::new(HashMap::new()),
            worker: Mutex::new(None),
            stopping: AtomicBool::new(false),
            mdib,
            config: config.clone(),
            log: config.log_target("protosdc::sco", "sco"),
        }
    }

    /// Register a handler; an existing handler for the handle is replaced.
    pub fn register_operation(&self, handler: Arc<dyn OperationHandler>) {
        let handle = handler.handle().to_string();
        if self.operations.contains_key(&handle) {
            log::debug!(
                target: self.log.target(),
                "{} handle {} is already registered, replacing it",
                self.log,
                handle
            );
        }
        log::info!(target: self.log.target(), "{} register operation {}", self.log, handle);
        self.operations.insert(handle, handler);
    }

    pub fn unregister_operation_by_handle(&self, handle: &str) -> Option<Arc<dyn OperationHandler>> {
        self.operations.remove(handle).map(|(_, h)| h)
    }

    pub fn get_operation_by_handle(&self, handle: &str) -> Option<Arc<dyn OperationHandler>> {
        self.operations.get(handle).map(|e| e.value().clone())
    }

    pub fn operation_handles(&self) -> Vec<String> {
        self.operations.iter().map(|e| e.key().clone()).collect()
    }

    fn report(&self, operation_handle: &str, info: InvocationInfo, target: Option<String>) {
        let mut part = OperationInvokedPart::new(operation_handle, info);
        part.operation_target = target;
        let group = self.mdib.version_group();
        if let Err(e) = self
            .mdib
            .subscriptions()
            .send_operation_invoked_report(&[part], &group)
        {
            log::error!(
                target: self.log.target(),
                "{} operation invoked report for {} failed: {}",
                self.log,
                operation_handle,
                e
            );
        }
    }

    fn report_failed(&self, operation_handle: &str, transaction_id: u64, error: InvocationError, message: &str) {
        self.report(
            operation_handle,
            InvocationInfo::failed(transaction_id, error, message),
            None,
        );
    }

    /// Handle a request immediately or hand it to the worker, depending
    /// on the handler.
    ///
    /// The returned info is what the set response carries: `Wait` for
    /// an enqueued invocation, the final state otherwise.
    pub fn handle_operation_request(
        &self,
        handler: Arc<dyn OperationHandler>,
        argument: SetArgument,
        transaction_id: u64,
    ) -> InvocationInfo {
        if handler.delayed_processing() {
            return self.enqueue(handler, argument, transaction_id);
        }
        let handle = handler.handle().to_string();
        match handler.execute(&self.mdib, &argument) {
            Ok(result) => {
                log::info!(
                    target: self.log.target(),
                    "{} successfully finished operation {}",
                    self.log,
                    handle
                );
                self.report(
                    &handle,
                    InvocationInfo::new(transaction_id, result.invocation_state),
                    result.operation_target,
                );
                InvocationInfo::new(transaction_id, result.invocation_state)
            }
            Err(e) => {
                log::error!(
                    target: self.log.target(),
                    "{} error executing operation {}: {}",
                    self.log,
                    handle,
                    e
                );
                let message = e.to_string();
                self.report_failed(&handle, transaction_id, InvocationError::Other, &message);
                InvocationInfo::failed(transaction_id, InvocationError::Other, &message)
            }
        }
    }

    fn enqueue(
        &self,
        handler: Arc<dyn OperationHandler>,
        argument: SetArgument,
        transaction_id: u64,
    ) -> InvocationInfo {
        let tx = match self.worker.lock().as_ref() {
            Some(worker) => worker.tx.clone(),
            None => {
                log::warn!(
                    target: self.log.target(),
                    "{} operation {} rejected, worker not running",
                    self.log,
                    handler.handle()
                );
                return InvocationInfo::failed(
                    transaction_id,
                    InvocationError::Other,
                    "operation worker not running",
                );
            }
        };
        let handle = handler.handle().to_string();
        self.pending.lock().insert(
            transaction_id,
            Pending {
                operation_handle: handle.clone(),
                deadline: Instant::now() + self.config.invocation_timeout(),
            },
        );
        let item = WorkItem::Run(Enqueued {
            transaction_id,
            handler,
            argument,
        });
        match tx.send_timeout(item, OPERATION_ENQUEUE_TIMEOUT) {
            Ok(()) => InvocationInfo::new(transaction_id, InvocationState::Wait),
            Err(e) => {
                self.pending.lock().remove(&transaction_id);
                let message = match e {
                    SendTimeoutError::Timeout(_) => "operation queue full",
                    SendTimeoutError::Disconnected(_) => "operation worker not running",
                };
                log::warn!(
                    target: self.log.target(),
                    "{} operation {} rejected: {}",
                    self.log,
                    handle,
                    message
                );
                InvocationInfo::failed(transaction_id, InvocationError::Other, message)
            }
        }
    }

    /// Resolve every expired queued invocation as failed.
    ///
    /// Returns the transaction ids that timed out.
    pub fn check_invocation_timeouts(&self) -> Vec<u64> {
        let now = Instant::now();
        let expired: Vec<(u64, Pending)> = {
            let mut pending = self.pending.lock();
            let ids: Vec<u64> = pending
                .iter()
                .filter(|(_, p)| p.deadline <= now)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| pending.remove(&id).map(|p| (id, p)))
                .collect()
        };
        for (transaction_id, p) in &expired {
            log::warn!(
                target: self.log.target(),
                "{} invocation {} of {} timed out",
                self.log,
                transaction_id,
                p.operation_handle
            );
            self.report_failed(
                &p.operation_handle,
                *transaction_id,
                InvocationError::Other,
                "invocation timed out",
            );
        }
        expired.into_iter().map(|(id, _)| id).collect()
    }

    /// Number of queued invocations not yet started.
    pub fn pending_invocations(&self) -> usize {
        self.pending.lock().len()
    }

    /// Fail every queued invocation with `message`.
    fn fail_pending(&self, message: &str) -> usize {
        let drained: Vec<(u64, Pending)> = self.pending.lock().drain().collect();
        for (transaction_id, p) in &drained {
            log::warn!(
                target: self.log.target(),
                "{} invocation {} of {}: {}",
                self.log,
                transaction_id,
                p.operation_handle,
                message
            );
            self.report_failed(&p.operation_handle, *transaction_id, InvocationError::Other, message);
        }
        drained.len()
    }

    fn process(&self, item: Enqueued) {
        let handle = item.handler.handle().to_string();
        if self.stopping.load(Ordering::Acquire) {
            return;
        }
        let Some(pending) = self.pending.lock().remove(&item.transaction_id) else {
            log::debug!(
                target: self.log.target(),
                "{} skipping timed out invocation {} of {}",
                self.log,
                item.transaction_id,
                handle
            );
            return;
        };
        if pending.deadline <= Instant::now() {
            log::warn!(
                target: self.log.target(),
                "{} invocation {} of {} timed out in queue",
                self.log,
                item.transaction_id,
                handle
            );
            self.report_failed(
                &handle,
                item.transaction_id,
                InvocationError::Other,
                "invocation timed out",
            );
            return;
        }
        log::info!(
            target: self.log.target(),
            "{} starting {} operation {}",
            self.log,
            item.argument.operation_name(),
            handle
        );
        // The response already said Wait; repeat it as a report.
        self.report(
            &handle,
            InvocationInfo::new(item.transaction_id, InvocationState::Wait),
            None,
        );
        self.report(
            &handle,
            InvocationInfo::new(item.transaction_id, InvocationState::Start),
            None,
        );
        match item.handler.execute(&self.mdib, &item.argument) {
            Ok(result) => {
                log::info!(
                    target: self.log.target(),
                    "{} successfully finished operation {}",
                    self.log,
                    handle
                );
                self.report(
                    &handle,
                    InvocationInfo::new(item.transaction_id, result.invocation_state),
                    result.operation_target,
                );
            }
            Err(e) => {
                log::error!(
                    target: self.log.target(),
                    "{} error executing operation {}: {}",
                    self.log,
                    handle,
                    e
                );
                self.report_failed(
                    &handle,
                    item.transaction_id,
                    InvocationError::Other,
                    &e.to_string(),
                );
            }
        }
    }

    /// Spawn the worker thread.
    pub fn start_worker(self: &Arc<Self>) -> Result<()> {
        let mut slot = self.worker.lock();
        if slot.is_some() {
            return Err(Error::WorkerRunning);
        }
        self.stopping.store(false, Ordering::Release);
        let (tx, rx) = channel::bounded::<WorkItem>(OPERATION_QUEUE_CAPACITY);
        let registry: Weak<Self> = Arc::downgrade(self);
        let log = self.log.clone();
        let thread = thread::Builder::new()
            .name("protosdc-sco-worker".into())
            .spawn(move || loop {
                let received = rx.recv_timeout(WORKER_POLL_INTERVAL);
                let Some(registry) = registry.upgrade() else {
                    return;
                };
                match received {
                    Ok(WorkItem::Run(item)) => {
                        registry.process(item);
                        registry.check_invocation_timeouts();
                    }
                    Ok(WorkItem::Stop) | Err(RecvTimeoutError::Disconnected) => {
                        log::info!(target: log.target(), "{} stop request found, terminating", log);
                        return;
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        registry.check_invocation_timeouts();
                    }
                }
            })?;
        *slot = Some(Worker { tx, thread });
        Ok(())
    }

    /// Stop and join the worker.
    ///
    /// The running invocation completes; queued ones are reported failed.
    pub fn stop_worker(&self) {
        let Some(worker) = self.worker.lock().take() else {
            return;
        };
        self.stopping.store(true, Ordering::Release);
        let _ = worker.tx.send(WorkItem::Stop);
        if worker.thread.join().is_err() {
            log::error!(target: self.log.target(), "{} worker thread panicked", self.log);
        }
        self.fail_pending("operation worker stopped");
    }

    pub fn is_worker_running(&self) -> bool {
        self.worker.lock().is_some()
    }
}

impl Drop for ScoOperationsRegistry {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            let _ = worker.tx.send(WorkItem::Stop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::mdib::{Mdib, MdibVersionGroup};
    use crate::provider::handlers::ActivateHandler;
    use crate::provider::reports::read_operation_invoked;
    use crate::provider::subscription::{Subscription, SubscriptionManager};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn registry(timeout: Duration) -> (Arc<ScoOperationsRegistry>, Arc<Subscription>) {
        let config = ProviderConfig::new();
        config.set_invocation_timeout(timeout);
        let mdib = Arc::new(ProviderMdib::new(
            Mdib::new(
                MdibVersionGroup::new(0, "urn:uuid:sco", None),
                LogTarget::new("protosdc::mdib", "mdib", None),
            ),
            SubscriptionManager::new(LogTarget::new("protosdc::test", "subscriptions", None)),
        ));
        let sub = mdib
            .subscriptions()
            .on_subscribe_request(vec![Action::OperationInvokedReport.identifier()]);
        let sco = Arc::new(ScoOperationsRegistry::new(mdib, &config));
        sco.start_worker().expect("start worker");
        (sco, sub)
    }

    fn sleeper(handle: &str, runs: &Arc<AtomicUsize>, millis: u64) -> Arc<dyn OperationHandler> {
        let runs = runs.clone();
        Arc::new(ActivateHandler::new(handle, move |_, _| {
            runs.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(millis));
            Ok(ExecuteResult::finished(None))
        }))
    }

    /// Last reported info per transaction id.
    fn final_infos(sub: &Subscription) -> HashMap<u64, InvocationInfo> {
        let mut last = HashMap::new();
        while let Ok(Some(report)) = sub.recv_timeout(Duration::from_secs(1)) {
            let (_, parts) = read_operation_invoked(&report).expect("report");
            for part in parts {
                last.insert(part.invocation_info.transaction_id, part.invocation_info);
            }
        }
        last
    }

    #[test]
    fn test_overdue_invocation_is_failed_not_executed() {
        let (sco, sub) = registry(Duration::from_millis(100));
        let slow_runs = Arc::new(AtomicUsize::new(0));
        let late_runs = Arc::new(AtomicUsize::new(0));
        let activate = || SetArgument::Activate(vec![]);

        let info = sco.handle_operation_request(sleeper("op.slow", &slow_runs, 300), activate(), 1);
        assert_eq!(info.invocation_state, InvocationState::Wait);
        let info = sco.handle_operation_request(sleeper("op.late", &late_runs, 0), activate(), 2);
        assert_eq!(info.invocation_state, InvocationState::Wait);

        let last = final_infos(&sub);
        assert_eq!(slow_runs.load(Ordering::SeqCst), 1);
        assert_eq!(late_runs.load(Ordering::SeqCst), 0);
        assert_eq!(last[&1].invocation_state, InvocationState::Finished);
        assert_eq!(last[&2].invocation_state, InvocationState::Failed);
        assert!(last[&2].error_text().contains("timed out"));
        assert_eq!(sco.pending_invocations(), 0);
    }

    #[test]
    fn test_stop_fails_queued_invocations() {
        let (sco, sub) = registry(Duration::from_secs(10));
        let runs = Arc::new(AtomicUsize::new(0));
        let handler = sleeper("op.slow", &runs, 200);
        sco.handle_operation_request(handler.clone(), SetArgument::Activate(vec![]), 1);
        sco.handle_operation_request(handler, SetArgument::Activate(vec![]), 2);
        thread::sleep(Duration::from_millis(50));

        sco.stop_worker();
        assert!(!sco.is_worker_running());
        assert_eq!(sco.pending_invocations(), 0);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        let last = final_infos(&sub);
        assert_eq!(last[&1].invocation_state, InvocationState::Finished);
        assert_eq!(last[&2].invocation_state, InvocationState::Failed);
        assert!(last[&2].error_text().contains("stopped"));
    }
}
