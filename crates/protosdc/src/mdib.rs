// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Minimal MDIB store.
//!
//! Descriptors are kept flat with their parent handle; states are keyed
//! by descriptor handle, context states by their own handle. [`Mdib`] is
//! the shared, lock-owning handle used by provider and consumer.

use crate::config::LogTarget;
use crate::error::{Error, Result};
use crate::pm::{states, PmClass, PmObject, PmValue};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// =======================================================================
// Containers
// =======================================================================

/// Identity of one MDIB snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MdibVersionGroup {
    pub mdib_version: u64,
    pub sequence_id: String,
    pub instance_id: Option<u64>,
}

impl MdibVersionGroup {
    pub fn new(mdib_version: u64, sequence_id: impl Into<String>, instance_id: Option<u64>) -> Self {
        Self {
            mdib_version,
            sequence_id: sequence_id.into(),
            instance_id,
        }
    }

    /// Version 0 of a new sequence with a random `urn:uuid:` id.
    pub fn new_sequence() -> Self {
        Self::new(0, format!("urn:uuid:{}", uuid::Uuid::new_v4()), None)
    }
}

/// A descriptor and its position in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorContainer {
    pub node: PmObject,
    /// `None` only for the tree root (mds).
    pub parent_handle: Option<String>,
}

impl DescriptorContainer {
    pub fn new(node: PmObject, parent_handle: Option<&str>) -> Self {
        Self {
            node,
            parent_handle: parent_handle.map(str::to_string),
        }
    }

    pub fn handle(&self) -> &str {
        self.node.handle().unwrap_or_default()
    }

    pub fn class(&self) -> &'static PmClass {
        self.node.class()
    }

    pub fn version(&self) -> u64 {
        self.node.descriptor_version()
    }
}

/// Link from a state to the descriptor it was validated against.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorLink {
    pub handle: String,
    pub class: &'static PmClass,
    pub version: u64,
}

impl DescriptorLink {
    pub fn of(descriptor: &DescriptorContainer) -> Self {
        Self {
            handle: descriptor.handle().to_string(),
            class: descriptor.class(),
            version: descriptor.version(),
        }
    }
}

/// Report category of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Metric,
    /// Real-time sample arrays travel in waveform reports.
    Waveform,
    Alert,
    Component,
    Context,
    Operation,
}

impl StateKind {
    pub fn of(class: &PmClass) -> Option<Self> {
        if class.is_subclass_of(&states::REAL_TIME_SAMPLE_ARRAY_METRIC_STATE) {
            Some(Self::Waveform)
        } else if class.is_subclass_of(&states::ABSTRACT_METRIC_STATE) {
            Some(Self::Metric)
        } else if class.is_subclass_of(&states::ABSTRACT_ALERT_STATE) {
            Some(Self::Alert)
        } else if class.is_subclass_of(&states::ABSTRACT_DEVICE_COMPONENT_STATE) {
            Some(Self::Component)
        } else if class.is_subclass_of(&states::ABSTRACT_CONTEXT_STATE) {
            Some(Self::Context)
        } else if class.is_subclass_of(&states::ABSTRACT_OPERATION_STATE) {
            Some(Self::Operation)
        } else {
            None
        }
    }
}

/// A state and its (optional) descriptor link.
#[derive(Debug, Clone, PartialEq)]
pub struct StateContainer {
    pub node: PmObject,
    /// `None` when the descriptor is unknown or its version did not match.
    pub descriptor: Option<DescriptorLink>,
}

impl StateContainer {
    pub fn new(node: PmObject) -> Self {
        Self {
            node,
            descriptor: None,
        }
    }

    pub fn linked(node: PmObject, descriptor: &DescriptorContainer) -> Self {
        Self {
            node,
            descriptor: Some(DescriptorLink::of(descriptor)),
        }
    }

    pub fn descriptor_handle(&self) -> &str {
        self.node.descriptor_handle().unwrap_or_default()
    }

    /// Own handle of a context state.
    pub fn handle(&self) -> Option<&str> {
        self.node.handle()
    }

    pub fn state_version(&self) -> u64 {
        self.node.state_version()
    }

    pub fn kind(&self) -> Option<StateKind> {
        StateKind::of(self.node.class())
    }

    pub fn is_context(&self) -> bool {
        self.kind() == Some(StateKind::Context)
    }
}

// =======================================================================
// Version policy
// =======================================================================

/// Decides whether an incoming state supersedes the one held locally.
pub trait VersionPolicy: Send + Sync {
    fn is_usable(&self, current: &PmObject, incoming: &PmObject) -> bool;
}

/// Usable iff the incoming state version is strictly greater.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewerStateVersion;

impl VersionPolicy for NewerStateVersion {
    fn is_usable(&self, current: &PmObject, incoming: &PmObject) -> bool {
        incoming.state_version() > current.state_version()
    }
}

// =======================================================================
// Tables
// =======================================================================

/// Ordered descriptor and state storage.
#[derive(Debug, Default, Clone)]
pub struct MdibTables {
    descriptors: HashMap<String, DescriptorContainer>,
    order: Vec<String>,
    states: HashMap<String, StateContainer>,
    context_states: HashMap<String, StateContainer>,
    context_order: Vec<String>,
}

impl MdibTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.descriptors.clear();
        self.order.clear();
        self.states.clear();
        self.context_states.clear();
        self.context_order.clear();
    }

    /// Insert or replace a descriptor; a new handle goes to the end.
    pub fn add_descriptor(&mut self, descriptor: DescriptorContainer) {
        let handle = descriptor.handle().to_string();
        if self.descriptors.insert(handle.clone(), descriptor).is_none() {
            self.order.push(handle);
        }
    }

    pub fn descriptor(&self, handle: &str) -> Option<&DescriptorContainer> {
        self.descriptors.get(handle)
    }

    pub fn descriptor_mut(&mut self, handle: &str) -> Option<&mut DescriptorContainer> {
        self.descriptors.get_mut(handle)
    }

    /// Descriptors in insertion order.
    pub fn descriptors(&self) -> impl Iterator<Item = &DescriptorContainer> {
        self.order.iter().filter_map(|h| self.descriptors.get(h))
    }

    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Children of `parent` in insertion order.
    pub fn children_of<'a>(
        &'a self,
        parent: &'a str,
    ) -> impl Iterator<Item = &'a DescriptorContainer> + 'a {
        self.descriptors()
            .filter(move |d| d.parent_handle.as_deref() == Some(parent))
    }

    /// Descriptors without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &DescriptorContainer> {
        self.descriptors().filter(|d| d.parent_handle.is_none())
    }

    /// Remove a descriptor with all descendants and every state
    /// referencing one of them.
    pub fn remove_descriptor_tree(
        &mut self,
        handle: &str,
    ) -> (Vec<DescriptorContainer>, Vec<StateContainer>) {
        let mut doomed: Vec<String> = Vec::new();
        if self.descriptors.contains_key(handle) {
            doomed.push(handle.to_string());
        }
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i].clone();
            doomed.extend(self.children_of(&parent).map(|d| d.handle().to_string()));
            i += 1;
        }
        let doomed_set: HashSet<&str> = doomed.iter().map(String::as_str).collect();

        let mut removed_states = Vec::new();
        for h in &doomed {
            if let Some(s) = self.states.remove(h) {
                removed_states.push(s);
            }
        }
        let context_handles: Vec<String> = self
            .context_order
            .iter()
            .filter(|h| {
                self.context_states
                    .get(*h)
                    .is_some_and(|s| doomed_set.contains(s.descriptor_handle()))
            })
            .cloned()
            .collect();
        for h in &context_handles {
            if let Some(s) = self.context_states.remove(h) {
                removed_states.push(s);
            }
        }
        self.context_order
            .retain(|h| !context_handles.iter().any(|c| c == h));

        let removed: Vec<DescriptorContainer> = doomed
            .iter()
            .filter_map(|h| self.descriptors.remove(h))
            .collect();
        self.order.retain(|h| !doomed_set.contains(h.as_str()));
        (removed, removed_states)
    }

    /// Insert or replace a state; context states are keyed by their handle.
    pub fn add_state(&mut self, state: StateContainer) {
        if state.is_context() {
            let handle = state.handle().unwrap_or_default().to_string();
            if self.context_states.insert(handle.clone(), state).is_none() {
                self.context_order.push(handle);
            }
        } else {
            self.states
                .insert(state.descriptor_handle().to_string(), state);
        }
    }

    /// Single state of a descriptor.
    pub fn state(&self, descriptor_handle: &str) -> Option<&StateContainer> {
        self.states.get(descriptor_handle)
    }

    pub fn state_mut(&mut self, descriptor_handle: &str) -> Option<&mut StateContainer> {
        self.states.get_mut(descriptor_handle)
    }

    pub fn context_state(&self, handle: &str) -> Option<&StateContainer> {
        self.context_states.get(handle)
    }

    pub fn context_state_mut(&mut self, handle: &str) -> Option<&mut StateContainer> {
        self.context_states.get_mut(handle)
    }

    /// Context states of one descriptor.
    pub fn context_states_of<'a>(
        &'a self,
        descriptor_handle: &'a str,
    ) -> impl Iterator<Item = &'a StateContainer> + 'a {
        self.context_states()
            .filter(move |s| s.descriptor_handle() == descriptor_handle)
    }

    /// Single states in descriptor order.
    pub fn states(&self) -> impl Iterator<Item = &StateContainer> {
        self.order.iter().filter_map(|h| self.states.get(h))
    }

    /// Context states in insertion order.
    pub fn context_states(&self) -> impl Iterator<Item = &StateContainer> {
        self.context_order
            .iter()
            .filter_map(|h| self.context_states.get(h))
    }

    /// Single states followed by context states.
    pub fn all_states(&self) -> impl Iterator<Item = &StateContainer> {
        self.states().chain(self.context_states())
    }

    /// State matching the key of `state` (handle for contexts).
    pub fn matching_state_mut(&mut self, state: &PmObject) -> Option<&mut StateContainer> {
        if StateKind::of(state.class()) == Some(StateKind::Context) {
            self.context_states.get_mut(state.handle()?)
        } else {
            self.states.get_mut(state.descriptor_handle()?)
        }
    }
}

// =======================================================================
// Transactions
// =======================================================================

enum TxOp {
    CreateDescriptor(DescriptorContainer, Vec<PmObject>),
    UpdateDescriptor(PmObject),
    DeleteDescriptor(String),
    UpdateState(PmObject),
}

/// Pending modifications, applied atomically by [`Mdib::commit`].
#[derive(Default)]
pub struct Transaction {
    ops: Vec<TxOp>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a descriptor together with its initial states.
    pub fn create_descriptor(&mut self, descriptor: DescriptorContainer, initial: Vec<PmObject>) {
        self.ops.push(TxOp::CreateDescriptor(descriptor, initial));
    }

    /// Replace the content of an existing descriptor; its version is bumped.
    pub fn update_descriptor(&mut self, node: PmObject) {
        self.ops.push(TxOp::UpdateDescriptor(node));
    }

    pub fn delete_descriptor(&mut self, handle: impl Into<String>) {
        self.ops.push(TxOp::DeleteDescriptor(handle.into()));
    }

    /// Replace the content of a state; unknown context handles create a
    /// new context state. The state version is bumped.
    pub fn update_state(&mut self, node: PmObject) {
        self.ops.push(TxOp::UpdateState(node));
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Change-set of one committed transaction.
#[derive(Debug, Default, Clone)]
pub struct TransactionResult {
    pub descr_created: Vec<DescriptorContainer>,
    pub descr_updated: Vec<DescriptorContainer>,
    pub descr_deleted: Vec<DescriptorContainer>,
    /// States belonging to created, updated or deleted descriptors.
    pub descr_states: Vec<StateContainer>,
    pub metric_updates: Vec<StateContainer>,
    pub alert_updates: Vec<StateContainer>,
    pub comp_updates: Vec<StateContainer>,
    pub ctxt_updates: Vec<StateContainer>,
    pub op_updates: Vec<StateContainer>,
    pub rt_updates: Vec<StateContainer>,
    pub version_group: MdibVersionGroup,
}

impl TransactionResult {
    pub fn has_descriptor_updates(&self) -> bool {
        !(self.descr_created.is_empty()
            && self.descr_updated.is_empty()
            && self.descr_deleted.is_empty())
    }

    fn push_state(&mut self, state: StateContainer) {
        match state.kind() {
            Some(StateKind::Metric) => self.metric_updates.push(state),
            Some(StateKind::Waveform) => self.rt_updates.push(state),
            Some(StateKind::Alert) => self.alert_updates.push(state),
            Some(StateKind::Component) => self.comp_updates.push(state),
            Some(StateKind::Context) => self.ctxt_updates.push(state),
            Some(StateKind::Operation) => self.op_updates.push(state),
            None => {}
        }
    }
}

// =======================================================================
// Shared handle
// =======================================================================

struct MdibInner {
    tables: MdibTables,
    version_group: MdibVersionGroup,
}

/// Lock-owning MDIB handle; clones share the same tree.
#[derive(Clone)]
pub struct Mdib {
    inner: Arc<RwLock<MdibInner>>,
    log: LogTarget,
}

impl Mdib {
    pub fn new(version_group: MdibVersionGroup, log: LogTarget) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MdibInner {
                tables: MdibTables::new(),
                version_group,
            })),
            log,
        }
    }

    pub fn version_group(&self) -> MdibVersionGroup {
        self.inner.read().version_group.clone()
    }

    pub fn mdib_version(&self) -> u64 {
        self.inner.read().version_group.mdib_version
    }

    /// Run `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&MdibTables, &MdibVersionGroup) -> R) -> R {
        let guard = self.inner.read();
        f(&guard.tables, &guard.version_group)
    }

    /// Run `f` under the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut MdibTables, &mut MdibVersionGroup) -> R) -> R {
        let mut guard = self.inner.write();
        let MdibInner {
            tables,
            version_group,
        } = &mut *guard;
        f(tables, version_group)
    }

    /// Apply a transaction, bump the mdib version and return the change-set.
    ///
    /// The transaction is validated first; a rejected transaction leaves
    /// the tree untouched.
    pub fn commit(&self, tx: Transaction) -> Result<TransactionResult> {
        let log = self.log.clone();
        self.write(|tables, version_group| {
            validate(tables, &tx)?;
            // Later ops can fail on what earlier ones removed; the live
            // tables are replaced only after every op succeeded.
            let mut scratch = tables.clone();
            let mut result = TransactionResult::default();
            for op in tx.ops {
                apply(&mut scratch, op, &mut result)?;
            }
            *tables = scratch;
            version_group.mdib_version += 1;
            result.version_group = version_group.clone();
            log::debug!(
                target: log.target(),
                "{} committed mdib version {}",
                log,
                version_group.mdib_version
            );
            Ok(result)
        })
    }
}

fn unknown_handle(handle: &str) -> Error {
    Error::InvalidData(format!("unknown descriptor handle {:?}", handle))
}

fn validate(tables: &MdibTables, tx: &Transaction) -> Result<()> {
    let mut created: HashSet<&str> = HashSet::new();
    let known = |h: &str, created: &HashSet<&str>| {
        tables.descriptor(h).is_some() || created.contains(h)
    };
    for op in &tx.ops {
        match op {
            TxOp::CreateDescriptor(d, initial) => {
                if known(d.handle(), &created) {
                    return Err(Error::InvalidData(format!(
                        "descriptor handle {:?} already exists",
                        d.handle()
                    )));
                }
                if let Some(parent) = d.parent_handle.as_deref() {
                    if !known(parent, &created) {
                        return Err(unknown_handle(parent));
                    }
                }
                for s in initial {
                    if s.descriptor_handle() != Some(d.handle()) {
                        return Err(Error::InvalidData(format!(
                            "initial state of {:?} references {:?}",
                            d.handle(),
                            s.descriptor_handle()
                        )));
                    }
                }
                created.insert(d.handle());
            }
            TxOp::UpdateDescriptor(node) => {
                let h = node.handle().unwrap_or_default();
                if !known(h, &created) {
                    return Err(unknown_handle(h));
                }
            }
            TxOp::DeleteDescriptor(h) => {
                if !known(h, &created) {
                    return Err(unknown_handle(h));
                }
            }
            TxOp::UpdateState(node) => {
                let h = node.descriptor_handle().unwrap_or_default();
                if !known(h, &created) {
                    return Err(unknown_handle(h));
                }
                match StateKind::of(node.class()) {
                    None => return Err(Error::UnregisteredType(node.class_name().to_string())),
                    Some(StateKind::Context) if node.handle().is_none() => {
                        return Err(Error::MissingField {
                            message_type: node.class_name().to_string(),
                            field: "Handle".to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
    }
    Ok(())
}

fn apply(tables: &mut MdibTables, op: TxOp, result: &mut TransactionResult) -> Result<()> {
    match op {
        TxOp::CreateDescriptor(descriptor, initial) => {
            for node in initial {
                let state = StateContainer::linked(node, &descriptor);
                tables.add_state(state.clone());
                result.descr_states.push(state);
            }
            result.descr_created.push(descriptor.clone());
            tables.add_descriptor(descriptor);
        }
        TxOp::UpdateDescriptor(node) => {
            let handle = node.handle().unwrap_or_default().to_string();
            let descriptor = tables
                .descriptor_mut(&handle)
                .ok_or_else(|| unknown_handle(&handle))?;
            let version = descriptor.version() + 1;
            descriptor.node.update_from(&node);
            descriptor
                .node
                .set("DescriptorVersion", PmValue::UInt(version))?;
            let updated = descriptor.clone();
            let mut affected: Vec<StateContainer> = Vec::new();
            if let Some(state) = tables.state_mut(&handle) {
                relink(state, &updated)?;
                affected.push(state.clone());
            }
            let contexts: Vec<String> = tables
                .context_states_of(&handle)
                .filter_map(|s| s.handle().map(str::to_string))
                .collect();
            for h in contexts {
                if let Some(state) = tables.context_state_mut(&h) {
                    relink(state, &updated)?;
                    affected.push(state.clone());
                }
            }
            result.descr_states.extend(affected);
            result.descr_updated.push(updated);
        }
        TxOp::DeleteDescriptor(handle) => {
            let (descriptors, removed_states) = tables.remove_descriptor_tree(&handle);
            result.descr_deleted.extend(descriptors);
            result.descr_states.extend(removed_states);
        }
        TxOp::UpdateState(node) => {
            let handle = node.descriptor_handle().unwrap_or_default().to_string();
            let descriptor = tables
                .descriptor(&handle)
                .cloned()
                .ok_or_else(|| unknown_handle(&handle))?;
            let state = match tables.matching_state_mut(&node) {
                Some(existing) => {
                    let version = existing.state_version() + 1;
                    existing.node.update_from(&node);
                    existing.node.set("StateVersion", PmValue::UInt(version))?;
                    existing.node.set(
                        "DescriptorVersion",
                        PmValue::UInt(descriptor.version()),
                    )?;
                    existing.descriptor = Some(DescriptorLink::of(&descriptor));
                    existing.clone()
                }
                None => {
                    let mut node = node;
                    node.set("DescriptorVersion", PmValue::UInt(descriptor.version()))?;
                    let state = StateContainer::linked(node, &descriptor);
                    tables.add_state(state.clone());
                    state
                }
            };
            result.push_state(state);
        }
    }
    Ok(())
}

fn relink(state: &mut StateContainer, descriptor: &DescriptorContainer) -> Result<()> {
    let version = state.state_version() + 1;
    state.node.set("StateVersion", PmValue::UInt(version))?;
    state
        .node
        .set("DescriptorVersion", PmValue::UInt(descriptor.version()))?;
    state.descriptor = Some(DescriptorLink::of(descriptor));
    Ok(())
}
