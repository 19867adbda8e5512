// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Consumer side.
//!
//! ```text
//! SdcConsumer
//! ├── Transport (call + report streams)
//! ├── ConsumerMdib ◄── episodic receiver thread
//! └── OperationsManager ◄── operation invoked receiver thread
//! ```
//!
//! # Usage
//!
//! 1. [`SdcConsumer::start_all`] opens both report streams.
//! 2. [`SdcConsumer::init_mdib`] fetches the snapshot; reports that
//!    arrived in between are replayed.
//! 3. Set operations return an [`OperationFuture`].
//!
//! A stream that ends or fails stops its receiver; pending operation
//! futures then resolve with `Err(Disconnected)`.

pub mod mdib;
pub mod observable;
pub mod operations;

pub use mdib::{
    AgeStats, ConsumerMdib, ConsumerTopics, DescriptorsByHandle, MirrorPhase, RealtimeBuffer,
    RealtimeSample, ReportOutcome, StatesByHandle,
};
pub use observable::{ListenerId, Observable};
pub use operations::{OperationFuture, OperationResult, OperationsManager};

use crate::config::{ConsumerConfig, LogTarget, REPORT_POLL_INTERVAL};
use crate::error::{Error, Result};
use crate::invocation::SetArgument;
use crate::mdib::{DescriptorContainer, DescriptorLink, StateContainer};
use crate::messages::{self, GetAction};
use crate::pm::{Decimal, PmObject};
use crate::reader::MessageReader;
use crate::transport::{ReportSource, Transport};
use crate::wire::WireMessage;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

struct Receiver {
    name: &'static str,
    thread: JoinHandle<()>,
}

/// A consumer connected to one provider.
pub struct SdcConsumer {
    transport: Arc<dyn Transport>,
    mdib: Arc<ConsumerMdib>,
    operations: Arc<OperationsManager>,
    reader: MessageReader,
    receivers: Mutex<Vec<Receiver>>,
    stop: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    log: LogTarget,
}

impl SdcConsumer {
    pub fn new(transport: Arc<dyn Transport>, config: ConsumerConfig) -> Self {
        Self {
            transport,
            mdib: Arc::new(ConsumerMdib::new(&config)),
            operations: Arc::new(OperationsManager::new(&config)),
            reader: MessageReader::new(config.log_target("protosdc::reader", "reader")),
            receivers: Mutex::new(Vec::new()),
            stop: Arc::new(AtomicBool::new(false)),
            connected: Arc::new(AtomicBool::new(false)),
            log: config.log_target("protosdc::consumer", "consumer"),
        }
    }

    pub fn mdib(&self) -> &Arc<ConsumerMdib> {
        &self.mdib
    }

    pub fn operations(&self) -> &Arc<OperationsManager> {
        &self.operations
    }

    /// True while both report streams deliver.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Open the episodic stream (with `filters`) and the operation
    /// invoked stream, each on its own receiver thread.
    pub fn start_all(&self, filters: Vec<String>) -> Result<()> {
        let mut receivers = self.receivers.lock();
        if !receivers.is_empty() {
            return Err(Error::WorkerRunning);
        }
        self.stop.store(false, Ordering::Release);
        let episodic = self.transport.episodic_reports(filters)?;
        let invoked = self.transport.operation_invoked_reports()?;
        self.connected.store(true, Ordering::Release);

        let mdib = self.mdib.clone();
        let log = self.log.clone();
        let thread = self.spawn(
            "protosdc-episodic",
            episodic,
            move |report| {
                if let Err(e) = mdib.on_report(Arc::new(report)) {
                    log::warn!(target: log.target(), "{} report not applied: {}", log, e);
                }
            },
            || {},
        )?;
        receivers.push(Receiver {
            name: "episodic",
            thread,
        });

        let operations = self.operations.clone();
        let on_idle = self.operations.clone();
        let log = self.log.clone();
        let thread = self.spawn(
            "protosdc-invoked",
            invoked,
            move |report| {
                if let Err(e) = operations.on_operation_invoked_report(&report) {
                    log::warn!(target: log.target(), "{} operation report dropped: {}", log, e);
                }
            },
            move || {
                on_idle.expire_overdue();
            },
        )?;
        receivers.push(Receiver {
            name: "operation invoked",
            thread,
        });
        log::info!(target: self.log.target(), "{} report streams started", self.log);
        Ok(())
    }

    /// Receiver loop: `on_report` per report, `on_idle` per empty poll.
    fn spawn<R, I>(
        &self,
        name: &str,
        mut source: Box<dyn ReportSource>,
        on_report: R,
        on_idle: I,
    ) -> Result<JoinHandle<()>>
    where
        R: Fn(WireMessage) + Send + 'static,
        I: Fn() + Send + 'static,
    {
        let stop = self.stop.clone();
        let connected = self.connected.clone();
        let operations = self.operations.clone();
        let log = self.log.clone();
        let stream = name.to_string();
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            loop {
                if stop.load(Ordering::Acquire) {
                    source.close();
                    return;
                }
                match source.next_report(REPORT_POLL_INTERVAL) {
                    Ok(Some(report)) => on_report(report),
                    Err(Error::Timeout) => on_idle(),
                    Ok(None) => {
                        log::info!(target: log.target(), "{} {} stream ended", log, stream);
                        break;
                    }
                    Err(e) => {
                        log::warn!(target: log.target(), "{} {} stream broken: {}", log, stream, e);
                        break;
                    }
                }
            }
            connected.store(false, Ordering::Release);
            operations.close();
        })?;
        Ok(handle)
    }

    /// Stop both receivers and wait for them.
    pub fn stop_all(&self) {
        self.stop.store(true, Ordering::Release);
        let receivers: Vec<Receiver> = self.receivers.lock().drain(..).collect();
        for receiver in receivers {
            if receiver.thread.join().is_err() {
                log::error!(
                    target: self.log.target(),
                    "{} {} receiver panicked",
                    self.log,
                    receiver.name
                );
            }
        }
        self.connected.store(false, Ordering::Release);
        self.operations.close();
    }

    /// Load the mirror from a `GetMdib` call.
    pub fn init_mdib(&self) -> Result<()> {
        let transport = self.transport.clone();
        self.mdib
            .init_mdib(|| transport.call(&messages::get_request(GetAction::GetMdib, &[])))
    }

    // ===================================================================
    // Get
    // ===================================================================

    fn get(&self, action: GetAction, handles: &[String]) -> Result<WireMessage> {
        self.transport.call(&messages::get_request(action, handles))
    }

    /// Raw `GetMdib` response.
    pub fn get_mdib(&self) -> Result<WireMessage> {
        self.get(GetAction::GetMdib, &[])
    }

    pub fn get_md_description(&self) -> Result<Vec<DescriptorContainer>> {
        let response = self.get(GetAction::GetMdDescription, &[])?;
        self.reader
            .read_md_description(messages::payload(&response)?.require_msg("md_description")?)
    }

    /// States of `handles` (all when empty), linked against the mirror.
    pub fn get_md_state(&self, handles: &[String]) -> Result<Vec<StateContainer>> {
        let response = self.get(GetAction::GetMdState, handles)?;
        let ps = messages::payload(&response)?
            .require_msg("md_state")?
            .repeated_msgs("state")?;
        self.link_states(&ps)
    }

    /// Context states by descriptor handle or own handle.
    pub fn get_context_states(&self, handles: &[String]) -> Result<Vec<StateContainer>> {
        let response = self.get(GetAction::GetContextStates, handles)?;
        let ps = messages::payload(&response)?.repeated_msgs("context_state")?;
        self.link_states(&ps)
    }

    fn link_states(&self, ps: &[&WireMessage]) -> Result<Vec<StateContainer>> {
        self.mdib.mdib().read(|tables, _| {
            self.reader
                .read_states(ps, |h| tables.descriptor(h).map(DescriptorLink::of))
        })
    }

    // ===================================================================
    // Set
    // ===================================================================

    /// Send a set request and watch its outcome.
    ///
    /// The operation invoked stream must be running, or only the
    /// immediate FAILED responses resolve.
    pub fn invoke(&self, operation_handle: &str, argument: SetArgument) -> Result<OperationFuture> {
        let request = messages::set_request(operation_handle, &argument)?;
        let response = self.transport.call(&request)?;
        self.operations.watch_operation(response)
    }

    pub fn set_value(&self, operation_handle: &str, value: Decimal) -> Result<OperationFuture> {
        self.invoke(operation_handle, SetArgument::Value(value))
    }

    pub fn set_string(&self, operation_handle: &str, value: &str) -> Result<OperationFuture> {
        self.invoke(operation_handle, SetArgument::String(value.to_string()))
    }

    pub fn activate(&self, operation_handle: &str, arguments: Vec<String>) -> Result<OperationFuture> {
        self.invoke(operation_handle, SetArgument::Activate(arguments))
    }

    pub fn set_metric_state(
        &self,
        operation_handle: &str,
        proposed: Vec<PmObject>,
    ) -> Result<OperationFuture> {
        self.invoke(operation_handle, SetArgument::MetricStates(proposed))
    }

    pub fn set_component_state(
        &self,
        operation_handle: &str,
        proposed: Vec<PmObject>,
    ) -> Result<OperationFuture> {
        self.invoke(operation_handle, SetArgument::ComponentStates(proposed))
    }

    pub fn set_context_state(
        &self,
        operation_handle: &str,
        proposed: Vec<PmObject>,
    ) -> Result<OperationFuture> {
        self.invoke(operation_handle, SetArgument::ContextStates(proposed))
    }

    pub fn set_alert_state(&self, operation_handle: &str, proposed: PmObject) -> Result<OperationFuture> {
        self.invoke(operation_handle, SetArgument::AlertState(proposed))
    }
}

impl Drop for SdcConsumer {
    fn drop(&mut self) {
        self.stop_all();
    }
}
