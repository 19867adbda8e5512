// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Provider side.
//!
//! ```text
//! SdcProvider
//! ├── ProviderMdib ── Mdib (tree lock)
//! │                └─ SubscriptionManager (report fan-out)
//! ├── ScoOperationsRegistry (handlers + worker thread)
//! ├── GetService / SetService
//! └── TransactionIds (own lock)
//! ```
//!
//! Every [`ProviderMdib::commit`] applies a transaction and routes the
//! resulting change-set to the subscriptions before the next commit
//! may start, so reports leave in mdib version order.

pub mod get_service;
pub mod handlers;
pub mod reports;
pub mod sco;
pub mod set_service;
pub mod subscription;

pub use handlers::{ActivateHandler, MetricValueHandler, ProposedStatesHandler};
pub use sco::{ExecuteResult, OperationHandler, ScoOperationsRegistry};
pub use subscription::{ReportItem, Subscription, SubscriptionManager};

use crate::actions::Action;
use crate::config::{LogTarget, ProviderConfig};
use crate::error::Result;
use crate::mdib::{Mdib, MdibVersionGroup, Transaction, TransactionResult};
use crate::messages::RequestKind;
use crate::wire::WireMessage;
use get_service::GetService;
use parking_lot::Mutex;
use set_service::SetService;
use std::sync::Arc;

/// Provider mdib: the store plus the dispatcher fed by its commits.
pub struct ProviderMdib {
    mdib: Mdib,
    subscriptions: SubscriptionManager,
    /// Serializes commit and dispatch.
    commit_lock: Mutex<()>,
}

impl ProviderMdib {
    pub fn new(mdib: Mdib, subscriptions: SubscriptionManager) -> Self {
        Self {
            mdib,
            subscriptions,
            commit_lock: Mutex::new(()),
        }
    }

    pub fn mdib(&self) -> &Mdib {
        &self.mdib
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    pub fn version_group(&self) -> MdibVersionGroup {
        self.mdib.version_group()
    }

    /// Apply `tx`, bump the mdib version and send the reports.
    ///
    /// A report that cannot be built is returned as error after the
    /// transaction is already committed.
    pub fn commit(&self, tx: Transaction) -> Result<TransactionResult> {
        let _guard = self.commit_lock.lock();
        let result = self.mdib.commit(tx)?;
        self.subscriptions.dispatch(&result)?;
        Ok(result)
    }
}

/// Transaction id source; ids start at 1.
#[derive(Debug, Default)]
pub struct TransactionIds {
    last: Mutex<u64>,
}

impl TransactionIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        let mut last = self.last.lock();
        *last += 1;
        *last
    }
}

/// A provider: mdib, reporting, get/set services and operations.
pub struct SdcProvider {
    config: ProviderConfig,
    mdib: Arc<ProviderMdib>,
    sco: Arc<ScoOperationsRegistry>,
    transaction_ids: Arc<TransactionIds>,
    get_service: GetService,
    set_service: SetService,
    log: LogTarget,
}

impl SdcProvider {
    /// Provider with an empty mdib at version 0 of a new sequence.
    pub fn new(config: ProviderConfig) -> Self {
        Self::with_version_group(config, MdibVersionGroup::new_sequence())
    }

    pub fn with_version_group(config: ProviderConfig, version_group: MdibVersionGroup) -> Self {
        let mdib = Mdib::new(version_group, config.log_target("protosdc::mdib", "mdib"));
        let subscriptions =
            SubscriptionManager::new(config.log_target("protosdc::subscriptions", "subscriptions"));
        let mdib = Arc::new(ProviderMdib::new(mdib, subscriptions));
        let sco = Arc::new(ScoOperationsRegistry::new(mdib.clone(), &config));
        let transaction_ids = Arc::new(TransactionIds::new());
        let get_service = GetService::new(mdib.clone(), &config);
        let set_service =
            SetService::new(mdib.clone(), sco.clone(), transaction_ids.clone(), &config);
        Self {
            log: config.log_target("protosdc::provider", "provider"),
            config,
            mdib,
            sco,
            transaction_ids,
            get_service,
            set_service,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn mdib(&self) -> &Arc<ProviderMdib> {
        &self.mdib
    }

    pub fn sco(&self) -> &Arc<ScoOperationsRegistry> {
        &self.sco
    }

    /// Start the operation worker.
    pub fn start(&self) -> Result<()> {
        self.sco.start_worker()?;
        log::info!(target: self.log.target(), "{} started", self.log);
        Ok(())
    }

    /// Stop the operation worker, then close all subscriptions.
    ///
    /// Queued invocations are reported failed before the streams close.
    pub fn stop(&self) {
        self.sco.stop_worker();
        self.mdib.subscriptions().stop_all();
        log::info!(target: self.log.target(), "{} stopped", self.log);
    }

    pub fn commit(&self, tx: Transaction) -> Result<TransactionResult> {
        self.mdib.commit(tx)
    }

    pub fn register_operation(&self, handler: Arc<dyn OperationHandler>) {
        self.sco.register_operation(handler);
    }

    pub fn generate_transaction_id(&self) -> u64 {
        self.transaction_ids.next()
    }

    /// Subscribe to episodic reports; an empty filter list means all.
    pub fn subscribe(&self, filters: Vec<String>) -> Arc<Subscription> {
        self.mdib.subscriptions().on_subscribe_request(filters)
    }

    /// Subscribe to operation invoked reports only.
    pub fn subscribe_operation_invoked(&self) -> Arc<Subscription> {
        self.subscribe(vec![Action::OperationInvokedReport.identifier()])
    }

    pub fn unsubscribe(&self, id: &str) {
        self.mdib.subscriptions().remove_subscription(id);
    }

    /// Route a get or set request to its service.
    pub fn handle_request(&self, request: &WireMessage) -> Result<WireMessage> {
        match RequestKind::of_request(request)? {
            RequestKind::Get(action) => self.get_service.handle(action, request),
            RequestKind::Set(action) => self.set_service.handle(action, request),
        }
    }
}

impl Drop for SdcProvider {
    fn drop(&mut self) {
        self.stop();
    }
}
