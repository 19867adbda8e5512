// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Get service: full and partial snapshots of the provider mdib.
//!
//! Each response is built under one read lock, so descriptors, states
//! and version group always belong to the same mdib version.

use super::ProviderMdib;
use crate::config::{LogTarget, ProviderConfig};
use crate::error::Result;
use crate::mapping::primitive::mdib_version_group_to_p;
use crate::mapping::{state_to_one_of, OneOfFamily};
use crate::mdib::StateContainer;
use crate::messages::{self, GetAction};
use crate::reader::{md_description_to_p, md_state_to_p};
use crate::wire::{WireMessage, WireValue};
use std::sync::Arc;

pub struct GetService {
    mdib: Arc<ProviderMdib>,
    log: LogTarget,
}

impl GetService {
    pub fn new(mdib: Arc<ProviderMdib>, config: &ProviderConfig) -> Self {
        Self {
            mdib,
            log: config.log_target("protosdc::get", "get"),
        }
    }

    /// Answer one get request.
    pub fn handle(&self, action: GetAction, request: &WireMessage) -> Result<WireMessage> {
        let handles = messages::requested_handles(request)?;
        log::debug!(
            target: self.log.target(),
            "{} {} called, handles={:?}",
            self.log,
            action.name(),
            handles
        );
        let wanted = |h: &str| handles.is_empty() || handles.iter().any(|x| x == h);
        self.mdib.mdib().read(|tables, group| {
            let content = match action {
                GetAction::GetMdib => {
                    let mdib = WireMessage::new("MdibMsg")
                        .with(
                            "mdib_version_group_attr",
                            WireValue::Msg(mdib_version_group_to_p(group)),
                        )
                        .with("md_description", WireValue::Msg(md_description_to_p(tables)?))
                        .with("md_state", WireValue::Msg(md_state_to_p(tables.all_states())?));
                    vec![("mdib", WireValue::Msg(mdib))]
                }
                // The handle list of GetMdDescription is not evaluated.
                GetAction::GetMdDescription => {
                    vec![("md_description", WireValue::Msg(md_description_to_p(tables)?))]
                }
                GetAction::GetMdState => {
                    let states = tables.states().filter(|s| wanted(s.descriptor_handle()));
                    vec![("md_state", WireValue::Msg(md_state_to_p(states)?))]
                }
                GetAction::GetContextStates => {
                    let states: Vec<&StateContainer> = tables
                        .context_states()
                        .filter(|s| {
                            wanted(s.descriptor_handle()) || s.handle().is_some_and(&wanted)
                        })
                        .collect();
                    let wrapped = states
                        .into_iter()
                        .map(|s| {
                            state_to_one_of(&s.node, OneOfFamily::AbstractContextState)
                                .map(WireValue::Msg)
                        })
                        .collect::<Result<Vec<_>>>()?;
                    vec![("context_state", WireValue::Repeated(wrapped))]
                }
            };
            Ok(messages::get_response(request, action, group, content))
        })
    }
}
