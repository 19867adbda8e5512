// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Set service: converts set requests and hands them to the SCO.

use super::sco::ScoOperationsRegistry;
use super::{ProviderMdib, TransactionIds};
use crate::config::{LogTarget, ProviderConfig};
use crate::error::Result;
use crate::invocation::{InvocationError, InvocationInfo};
use crate::messages::{self, SetAction};
use crate::wire::WireMessage;
use std::sync::Arc;

pub struct SetService {
    mdib: Arc<ProviderMdib>,
    sco: Arc<ScoOperationsRegistry>,
    transaction_ids: Arc<TransactionIds>,
    log: LogTarget,
}

impl SetService {
    pub fn new(
        mdib: Arc<ProviderMdib>,
        sco: Arc<ScoOperationsRegistry>,
        transaction_ids: Arc<TransactionIds>,
        config: &ProviderConfig,
    ) -> Self {
        Self {
            mdib,
            sco,
            transaction_ids,
            log: config.log_target("protosdc::set", "set"),
        }
    }

    /// Answer one set request.
    ///
    /// Every request gets a fresh transaction id. A request for an
    /// unregistered handle is answered as failed without touching the
    /// SCO.
    pub fn handle(&self, action: SetAction, request: &WireMessage) -> Result<WireMessage> {
        let transaction_id = self.transaction_ids.next();
        let operation_handle = messages::set_request_handle(request)
            .unwrap_or_default()
            .to_string();
        let info = match self.sco.get_operation_by_handle(&operation_handle) {
            None => {
                let info = InvocationInfo::failed(
                    transaction_id,
                    InvocationError::InvalidValue,
                    &format!("no handler registered for \"{}\"", operation_handle),
                );
                log::warn!(
                    target: self.log.target(),
                    "{} operation request {} failed, transaction id = {}, invocation-state={}",
                    self.log,
                    operation_handle,
                    transaction_id,
                    info.invocation_state.symbol()
                );
                info
            }
            Some(handler) => {
                let (_, _, argument) = messages::read_set_request(request)?;
                let info = self
                    .sco
                    .handle_operation_request(handler, argument, transaction_id);
                log::info!(
                    target: self.log.target(),
                    "{} {} request {} handled, transaction id = {}, invocation-state={}",
                    self.log,
                    action.name(),
                    operation_handle,
                    transaction_id,
                    info.invocation_state.symbol()
                );
                info
            }
        };
        messages::set_response(request, action, &info, &self.mdib.version_group())
    }
}
