// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Consumer mirror of a provider mdib.
//!
//! # Lifecycle
//!
//! ```text
//! UNINITIALIZED ──init_mdib──> INITIALIZING ──replay──> READY
//! ```
//!
//! Report delivery starts before the initial `GetMdib` fetch. Reports
//! arriving while the mirror is `INITIALIZING` are buffered and replayed
//! in arrival order once the snapshot is loaded.
//!
//! # Report application
//!
//! Each report is checked against the mirror version first and then
//! merged under the tree write lock. A report is decoded completely
//! before the first change, so it is applied whole or not at all.
//! Observers are notified after the lock is released.

use super::observable::Observable;
use crate::actions::Action;
use crate::config::{ConsumerConfig, GapPolicy, LogTarget, MAX_REALTIME_SAMPLES};
use crate::error::{Error, Result};
use crate::messages;
use crate::mdib::{
    DescriptorContainer, DescriptorLink, Mdib, MdibTables, MdibVersionGroup, NewerStateVersion,
    StateContainer, VersionPolicy,
};
use crate::pm::{Decimal, PmObject, PmValue};
use crate::provider::reports::{
    modification_parts, read_episodic, report_states, state_layout, waveform_states,
    ModificationType, StateReportLayout,
};
use crate::reader::MessageReader;
use crate::wire::WireMessage;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub type StatesByHandle = HashMap<String, StateContainer>;
pub type DescriptorsByHandle = HashMap<String, DescriptorContainer>;

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

// =======================================================================
// Real-time samples
// =======================================================================

/// One reconstructed waveform sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeSample {
    pub value: Decimal,
    /// Seconds since the epoch.
    pub determination_time: f64,
    pub validity: Option<String>,
}

/// Age statistics in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeStats {
    pub mean: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
}

impl AgeStats {
    fn of(ages: impl Iterator<Item = f64>) -> Option<Self> {
        let ages: Vec<f64> = ages.collect();
        if ages.is_empty() {
            return None;
        }
        let n = ages.len() as f64;
        let mean = ages.iter().sum::<f64>() / n;
        let variance = ages.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            stdev: variance.sqrt(),
            min: ages.iter().copied().fold(f64::INFINITY, f64::min),
            max: ages.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Ring buffer of the most recent samples of one waveform.
#[derive(Debug, Clone)]
pub struct RealtimeBuffer {
    sample_period: f64,
    max_samples: usize,
    samples: VecDeque<RealtimeSample>,
    /// Age of the newest sample of each received batch.
    ages: VecDeque<f64>,
}

impl RealtimeBuffer {
    pub fn new(sample_period: f64, max_samples: usize) -> Self {
        Self {
            sample_period,
            max_samples,
            samples: VecDeque::with_capacity(max_samples),
            ages: VecDeque::with_capacity(max_samples),
        }
    }

    pub fn sample_period(&self) -> f64 {
        self.sample_period
    }

    /// Append the samples of a waveform state; returns the age of the
    /// newest one.
    ///
    /// Sample `i` is dated `DeterminationTime + i * sample_period`.
    pub fn add_state(&mut self, state: &PmObject, now: f64) -> Option<f64> {
        let value = state.node("MetricValue")?;
        let start = value
            .get("DeterminationTime")
            .and_then(PmValue::as_f64)
            .unwrap_or(now);
        let validity = value
            .node("MetricQuality")
            .and_then(|q| q.str("Validity"))
            .map(str::to_string);
        let mut newest = None;
        for (i, sample) in value.list("Samples").iter().enumerate() {
            let Some(d) = sample.as_decimal() else {
                continue;
            };
            let determination_time = start + i as f64 * self.sample_period;
            newest = Some(determination_time);
            if self.samples.len() == self.max_samples {
                self.samples.pop_front();
            }
            self.samples.push_back(RealtimeSample {
                value: d,
                determination_time,
                validity: validity.clone(),
            });
        }
        let age = now - newest?;
        if self.ages.len() == self.max_samples {
            self.ages.pop_front();
        }
        self.ages.push_back(age);
        Some(age)
    }

    pub fn samples(&self) -> impl Iterator<Item = &RealtimeSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn age_stats(&self) -> Option<AgeStats> {
        AgeStats::of(self.ages.iter().copied())
    }
}

// =======================================================================
// Topics
// =======================================================================

/// By-handle notification topics of a mirror.
///
/// Each applied report publishes the states or descriptors it changed;
/// a report that changed nothing of a kind publishes nothing there.
#[derive(Debug, Default)]
pub struct ConsumerTopics {
    pub metrics_by_handle: Observable<StatesByHandle>,
    pub alert_by_handle: Observable<StatesByHandle>,
    pub component_by_handle: Observable<StatesByHandle>,
    /// Keyed by context state handle.
    pub context_by_handle: Observable<StatesByHandle>,
    pub operation_by_handle: Observable<StatesByHandle>,
    pub waveform_by_handle: Observable<StatesByHandle>,
    pub new_descriptors_by_handle: Observable<DescriptorsByHandle>,
    pub updated_descriptors_by_handle: Observable<DescriptorsByHandle>,
    pub deleted_descriptors_by_handle: Observable<DescriptorsByHandle>,
    /// Version group after every load or applied report.
    pub mdib_version: Observable<MdibVersionGroup>,
}

// =======================================================================
// Mirror
// =======================================================================

/// Lifecycle of the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPhase {
    Uninitialized,
    Initializing,
    Ready,
}

/// What happened to one delivered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Applied(Action),
    /// Held until the initial fetch is loaded.
    Buffered,
    /// Rejected by the version check.
    Discarded,
    /// Arrived before `init_mdib`.
    Ignored,
}

struct Lifecycle {
    phase: MirrorPhase,
    buffered: Vec<Arc<WireMessage>>,
}

#[derive(Default)]
struct Applied {
    states: StatesByHandle,
    created: DescriptorsByHandle,
    updated: DescriptorsByHandle,
    deleted: DescriptorsByHandle,
}

/// A decoded description modification part.
struct DecodedPart {
    modification: ModificationType,
    descriptors: Vec<DescriptorContainer>,
    states: Vec<StateContainer>,
}

pub struct ConsumerMdib {
    mdib: Mdib,
    lifecycle: Mutex<Lifecycle>,
    reader: MessageReader,
    policy: Arc<dyn VersionPolicy>,
    config: ConsumerConfig,
    rt_buffers: Mutex<HashMap<String, RealtimeBuffer>>,
    topics: ConsumerTopics,
    log: LogTarget,
}

impl ConsumerMdib {
    pub fn new(config: &ConsumerConfig) -> Self {
        Self {
            mdib: Mdib::new(
                MdibVersionGroup::default(),
                config.log_target("protosdc::consumer", "mirror"),
            ),
            lifecycle: Mutex::new(Lifecycle {
                phase: MirrorPhase::Uninitialized,
                buffered: Vec::new(),
            }),
            reader: MessageReader::new(config.log_target("protosdc::reader", "reader")),
            policy: Arc::new(NewerStateVersion),
            config: config.clone(),
            rt_buffers: Mutex::new(HashMap::new()),
            topics: ConsumerTopics::default(),
            log: config.log_target("protosdc::consumer", "mdib"),
        }
    }

    /// Replace the state version acceptance predicate.
    #[must_use]
    pub fn with_version_policy(mut self, policy: Arc<dyn VersionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// The mirrored tree; callers take its lock through `read`.
    pub fn mdib(&self) -> &Mdib {
        &self.mdib
    }

    pub fn topics(&self) -> &ConsumerTopics {
        &self.topics
    }

    pub fn phase(&self) -> MirrorPhase {
        self.lifecycle.lock().phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == MirrorPhase::Ready
    }

    pub fn version_group(&self) -> MdibVersionGroup {
        self.mdib.version_group()
    }

    /// Load the snapshot returned by `fetch`, then replay buffered reports.
    ///
    /// `fetch` returns a `GetMdib` response. Report delivery should
    /// already be running when this is called. A failed fetch returns
    /// the mirror to `UNINITIALIZED`.
    pub fn init_mdib<F>(&self, fetch: F) -> Result<()>
    where
        F: FnOnce() -> Result<WireMessage>,
    {
        {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.phase != MirrorPhase::Uninitialized {
                return Err(Error::AlreadyInitialized);
            }
            lifecycle.phase = MirrorPhase::Initializing;
        }
        if let Err(e) = fetch().and_then(|response| self.load(&response)) {
            let mut lifecycle = self.lifecycle.lock();
            lifecycle.phase = MirrorPhase::Uninitialized;
            lifecycle.buffered.clear();
            return Err(e);
        }
        loop {
            let pending = {
                let mut lifecycle = self.lifecycle.lock();
                if lifecycle.buffered.is_empty() {
                    lifecycle.phase = MirrorPhase::Ready;
                    break;
                }
                std::mem::take(&mut lifecycle.buffered)
            };
            log::info!(
                target: self.log.target(),
                "{} replaying {} buffered reports",
                self.log,
                pending.len()
            );
            for report in pending {
                if let Err(e) = self.apply(&report, true) {
                    log::warn!(
                        target: self.log.target(),
                        "{} buffered report dropped: {}",
                        self.log,
                        e
                    );
                }
            }
        }
        log::info!(
            target: self.log.target(),
            "{} mdib ready, version {}",
            self.log,
            self.mdib.mdib_version()
        );
        Ok(())
    }

    fn load(&self, response: &WireMessage) -> Result<()> {
        let p_mdib = messages::payload(response)?.require_msg("mdib")?;
        let (descriptors, states, group) = self.reader.read_mdib(p_mdib)?;
        log::info!(
            target: self.log.target(),
            "{} loaded {} descriptors, {} states, mdib version {}",
            self.log,
            descriptors.len(),
            states.len(),
            group.mdib_version
        );
        self.mdib.write(|tables, version_group| {
            tables.clear();
            for descriptor in descriptors {
                tables.add_descriptor(descriptor);
            }
            for state in states {
                tables.add_state(state);
            }
            *version_group = group.clone();
        });
        self.rt_buffers.lock().clear();
        self.topics.mdib_version.publish(group);
        Ok(())
    }

    /// Handle one episodic report stream.
    ///
    /// Decode failures are returned; the caller decides whether the
    /// stream goes on.
    pub fn on_report(&self, stream: Arc<WireMessage>) -> Result<ReportOutcome> {
        {
            let mut lifecycle = self.lifecycle.lock();
            match lifecycle.phase {
                MirrorPhase::Uninitialized => {
                    log::debug!(
                        target: self.log.target(),
                        "{} report before init_mdib ignored",
                        self.log
                    );
                    return Ok(ReportOutcome::Ignored);
                }
                MirrorPhase::Initializing => {
                    lifecycle.buffered.push(stream);
                    return Ok(ReportOutcome::Buffered);
                }
                MirrorPhase::Ready => {}
            }
        }
        self.apply(&stream, false)
    }

    fn apply(&self, stream: &WireMessage, buffered: bool) -> Result<ReportOutcome> {
        let report = read_episodic(stream)?;
        let now = now_seconds();
        let applied = self.mdib.write(|tables, group| -> Result<Option<Applied>> {
            if !self.version_acceptable(group, &report.version_group, report.action, buffered) {
                return Ok(None);
            }
            let applied = match report.action {
                Action::Waveform => self.apply_waveform(tables, report.body, buffered, now)?,
                Action::DescriptionModificationReport => {
                    self.apply_description(tables, report.body)?
                }
                action => {
                    let layout = state_layout(action).ok_or_else(|| {
                        Error::NotImplemented(format!("{} in episodic stream", action))
                    })?;
                    self.apply_states(tables, layout, report.body, buffered, now)?
                }
            };
            group.mdib_version = report.version_group.mdib_version;
            if !report.version_group.sequence_id.is_empty() {
                group.sequence_id = report.version_group.sequence_id.clone();
                group.instance_id = report.version_group.instance_id;
            }
            Ok(Some(applied))
        })?;
        let Some(applied) = applied else {
            return Ok(ReportOutcome::Discarded);
        };
        self.publish(report.action, applied);
        self.topics.mdib_version.publish(self.mdib.version_group());
        Ok(ReportOutcome::Applied(report.action))
    }

    /// Mdib version check of an incoming report.
    ///
    /// A new sequence id restarts the numbering and is accepted.
    fn version_acceptable(
        &self,
        current: &MdibVersionGroup,
        incoming: &MdibVersionGroup,
        action: Action,
        buffered: bool,
    ) -> bool {
        if !incoming.sequence_id.is_empty() && incoming.sequence_id != current.sequence_id {
            log::warn!(
                target: self.log.target(),
                "{} {}: sequence id changed from {} to {}",
                self.log,
                action,
                current.sequence_id,
                incoming.sequence_id
            );
            return true;
        }
        let (have, got) = (current.mdib_version, incoming.mdib_version);
        if got <= have {
            if buffered {
                log::debug!(
                    target: self.log.target(),
                    "{} buffered {} mdib version {} already in snapshot {}",
                    self.log,
                    action,
                    got,
                    have
                );
            } else {
                log::warn!(
                    target: self.log.target(),
                    "{} {}: mdib version {} not newer than {}, report discarded",
                    self.log,
                    action,
                    got,
                    have
                );
            }
            return false;
        }
        if got != have + 1 {
            match self.config.gap_policy() {
                GapPolicy::AcceptNewer => log::warn!(
                    target: self.log.target(),
                    "{} {}: mdib version gap {} -> {}",
                    self.log,
                    action,
                    have,
                    got
                ),
                GapPolicy::RejectGaps => {
                    log::warn!(
                        target: self.log.target(),
                        "{} {}: mdib version gap {} -> {}, report discarded",
                        self.log,
                        action,
                        have,
                        got
                    );
                    return false;
                }
            }
        }
        true
    }

    fn read_states(&self, tables: &MdibTables, ps: &[&WireMessage]) -> Result<Vec<StateContainer>> {
        self.reader
            .read_states(ps, |h| tables.descriptor(h).map(DescriptorLink::of))
    }

    fn apply_states(
        &self,
        tables: &mut MdibTables,
        layout: &StateReportLayout,
        body: &WireMessage,
        buffered: bool,
        now: f64,
    ) -> Result<Applied> {
        let incoming = self.read_states(tables, &report_states(layout, body)?)?;
        if layout.action == Action::EpisodicMetricReport {
            self.log_metric_age(&incoming, now);
        }
        Ok(Applied {
            states: self.merge(tables, incoming, layout.action, buffered),
            ..Applied::default()
        })
    }

    fn apply_waveform(
        &self,
        tables: &mut MdibTables,
        body: &WireMessage,
        buffered: bool,
        now: f64,
    ) -> Result<Applied> {
        let incoming = self.read_states(tables, &waveform_states(body)?)?;
        let states = self.merge(tables, incoming, Action::Waveform, buffered);
        {
            // Only merged states carry samples not seen before.
            let mut buffers = self.rt_buffers.lock();
            for state in states.values() {
                let handle = state.descriptor_handle();
                let buffer = buffers.entry(handle.to_string()).or_insert_with(|| {
                    let sample_period = tables
                        .descriptor(handle)
                        .and_then(|d| d.node.get("SamplePeriod"))
                        .and_then(PmValue::as_f64)
                        .unwrap_or(0.0);
                    RealtimeBuffer::new(sample_period, MAX_REALTIME_SAMPLES)
                });
                buffer.add_state(&state.node, now);
            }
        }
        Ok(Applied {
            states,
            ..Applied::default()
        })
    }

    /// Parts are applied create, update, delete, whatever their wire order.
    fn apply_description(&self, tables: &mut MdibTables, body: &WireMessage) -> Result<Applied> {
        let mut decoded = Vec::new();
        for part in modification_parts(body)? {
            let descriptors = self
                .reader
                .read_descriptors(&part.descriptors, part.parent_handle.as_deref())?;
            // States are linked to the descriptors of their own part first.
            let states = self.reader.read_states(&part.states, |h| {
                descriptors
                    .iter()
                    .find(|d| d.handle() == h)
                    .or_else(|| tables.descriptor(h))
                    .map(DescriptorLink::of)
            })?;
            decoded.push(DecodedPart {
                modification: part.modification,
                descriptors,
                states,
            });
        }

        let mut applied = Applied::default();
        for modification in ModificationType::APPLY_ORDER {
            for part in decoded.iter().filter(|p| p.modification == modification) {
                match modification {
                    ModificationType::Create => self.create_part(tables, part, &mut applied),
                    ModificationType::Update => self.update_part(tables, part, &mut applied),
                    ModificationType::Delete => self.delete_part(tables, part, &mut applied),
                }
            }
        }
        Ok(applied)
    }

    fn create_part(&self, tables: &mut MdibTables, part: &DecodedPart, applied: &mut Applied) {
        for descriptor in &part.descriptors {
            log::debug!(
                target: self.log.target(),
                "{} created descriptor {} (parent={:?})",
                self.log,
                descriptor.handle(),
                descriptor.parent_handle
            );
            tables.add_descriptor(descriptor.clone());
            applied
                .created
                .insert(descriptor.handle().to_string(), descriptor.clone());
        }
        for state in &part.states {
            tables.add_state(state.clone());
        }
    }

    fn update_part(&self, tables: &mut MdibTables, part: &DecodedPart, applied: &mut Applied) {
        for descriptor in &part.descriptors {
            match tables.descriptor_mut(descriptor.handle()) {
                Some(current) => {
                    current.node.update_from(&descriptor.node);
                    log::info!(
                        target: self.log.target(),
                        "{} updated descriptor {} (parent={:?})",
                        self.log,
                        descriptor.handle(),
                        current.parent_handle
                    );
                    applied
                        .updated
                        .insert(descriptor.handle().to_string(), current.clone());
                }
                None => log::warn!(
                    target: self.log.target(),
                    "{} update of unknown descriptor {} skipped",
                    self.log,
                    descriptor.handle()
                ),
            }
        }
        for state in &part.states {
            match tables.matching_state_mut(&state.node) {
                Some(current) => {
                    current.node.update_from(&state.node);
                    current.descriptor.clone_from(&state.descriptor);
                }
                None => log::warn!(
                    target: self.log.target(),
                    "{} update of unknown state {} skipped",
                    self.log,
                    state.descriptor_handle()
                ),
            }
        }
    }

    fn delete_part(&self, tables: &mut MdibTables, part: &DecodedPart, applied: &mut Applied) {
        let mut buffers = self.rt_buffers.lock();
        for descriptor in &part.descriptors {
            let (removed, removed_states) = tables.remove_descriptor_tree(descriptor.handle());
            log::debug!(
                target: self.log.target(),
                "{} removed descriptor {} with {} descendants and {} states",
                self.log,
                descriptor.handle(),
                removed.len().saturating_sub(1),
                removed_states.len()
            );
            for d in removed {
                buffers.remove(d.handle());
                applied.deleted.insert(d.handle().to_string(), d);
            }
        }
    }

    /// Merge states in place; new keys are inserted.
    ///
    /// Context states are keyed by their own handle, all others by
    /// descriptor handle.
    fn merge(
        &self,
        tables: &mut MdibTables,
        incoming: Vec<StateContainer>,
        action: Action,
        buffered: bool,
    ) -> StatesByHandle {
        let mut changed = StatesByHandle::new();
        for state in incoming {
            let key = if state.is_context() {
                state.handle().unwrap_or_default().to_string()
            } else {
                state.descriptor_handle().to_string()
            };
            match tables.matching_state_mut(&state.node) {
                Some(current) => {
                    if self.policy.is_usable(&current.node, &state.node) {
                        current.node.update_from(&state.node);
                        current.descriptor = state.descriptor;
                        changed.insert(key, current.clone());
                    } else if buffered {
                        log::debug!(
                            target: self.log.target(),
                            "{} {}: buffered state {} version {} already known",
                            self.log,
                            action,
                            key,
                            state.node.state_version()
                        );
                    } else {
                        log::warn!(
                            target: self.log.target(),
                            "{} {}: state {} version {} not newer than {}",
                            self.log,
                            action,
                            key,
                            state.node.state_version(),
                            current.node.state_version()
                        );
                    }
                }
                None => {
                    log::info!(
                        target: self.log.target(),
                        "{} {}: new state {} DescriptorVersion={}",
                        self.log,
                        action,
                        key,
                        state.node.descriptor_version()
                    );
                    tables.add_state(state.clone());
                    changed.insert(key, state);
                }
            }
        }
        changed
    }

    fn log_metric_age(&self, states: &[StateContainer], now: f64) {
        let ages = states.iter().filter_map(|s| {
            s.node
                .node("MetricValue")
                .and_then(|v| v.get("DeterminationTime"))
                .and_then(PmValue::as_f64)
                .map(|t| now - t)
        });
        if let Some(stats) = AgeStats::of(ages) {
            log::debug!(
                target: self.log.target(),
                "{} metric age min={:.3}s max={:.3}s",
                self.log,
                stats.min,
                stats.max
            );
        }
    }

    fn publish(&self, action: Action, applied: Applied) {
        let topics = &self.topics;
        let states_topic = match action {
            Action::EpisodicMetricReport => Some(&topics.metrics_by_handle),
            Action::EpisodicAlertReport => Some(&topics.alert_by_handle),
            Action::EpisodicComponentReport => Some(&topics.component_by_handle),
            Action::EpisodicContextReport => Some(&topics.context_by_handle),
            Action::EpisodicOperationalStateReport => Some(&topics.operation_by_handle),
            Action::Waveform => Some(&topics.waveform_by_handle),
            Action::DescriptionModificationReport | Action::OperationInvokedReport => None,
        };
        if let Some(topic) = states_topic {
            if !applied.states.is_empty() {
                topic.publish(applied.states);
            }
        }
        for (topic, descriptors) in [
            (&topics.new_descriptors_by_handle, applied.created),
            (&topics.updated_descriptors_by_handle, applied.updated),
            (&topics.deleted_descriptors_by_handle, applied.deleted),
        ] {
            if !descriptors.is_empty() {
                topic.publish(descriptors);
            }
        }
    }

    /// Samples held for a waveform.
    pub fn realtime_samples(&self, descriptor_handle: &str) -> Vec<RealtimeSample> {
        self.rt_buffers
            .lock()
            .get(descriptor_handle)
            .map(|b| b.samples().cloned().collect())
            .unwrap_or_default()
    }

    /// Age statistics over all waveform buffers.
    pub fn waveform_age_stats(&self) -> Option<AgeStats> {
        let buffers = self.rt_buffers.lock();
        AgeStats::of(buffers.values().flat_map(|b| b.ages.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::{states, types};

    fn waveform_state(start: f64, samples: &[&str]) -> PmObject {
        let quality = PmObject::new(&types::METRIC_QUALITY)
            .with("Validity", PmValue::Enum("Vld".into()))
            .expect("quality");
        let values = samples
            .iter()
            .map(|s| PmValue::Decimal(s.parse().expect("decimal")))
            .collect::<Vec<_>>();
        let value = PmObject::new(&types::SAMPLE_ARRAY_VALUE)
            .with("MetricQuality", quality)
            .and_then(|v| v.with("DeterminationTime", PmValue::Timestamp(start)))
            .and_then(|v| v.with("Samples", PmValue::List(values)))
            .expect("value");
        PmObject::new(&states::REAL_TIME_SAMPLE_ARRAY_METRIC_STATE)
            .with("DescriptorHandle", "rtsa")
            .and_then(|s| s.with("MetricValue", value))
            .expect("state")
    }

    #[test]
    fn test_rt_buffer_dates_samples_and_caps_length() {
        let mut buffer = RealtimeBuffer::new(0.01, 3);
        let age = buffer
            .add_state(&waveform_state(100.0, &["1", "2"]), 100.5)
            .expect("age");
        assert!((age - 0.49).abs() < 1e-9);
        buffer.add_state(&waveform_state(100.02, &["3", "4"]), 100.6);
        assert_eq!(buffer.len(), 3);
        let values: Vec<String> = buffer.samples().map(|s| s.value.to_string()).collect();
        assert_eq!(values, vec!["2", "3", "4"]);
        let last = buffer.samples().last().expect("sample");
        assert!((last.determination_time - 100.03).abs() < 1e-9);
        assert_eq!(last.validity.as_deref(), Some("Vld"));
    }

    #[test]
    fn test_age_stats() {
        let stats = AgeStats::of([1.0, 3.0].into_iter()).expect("stats");
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.stdev, 1.0);
        assert_eq!((stats.min, stats.max), (1.0, 3.0));
        assert!(AgeStats::of(std::iter::empty()).is_none());
    }

    fn ready_mirror() -> ConsumerMdib {
        let mirror = ConsumerMdib::new(&ConsumerConfig::new());
        let request = messages::get_request(messages::GetAction::GetMdib, &[]);
        let mdib = WireMessage::new("MdibMsg").with(
            "md_description",
            crate::wire::WireValue::Msg(WireMessage::new("MdDescriptionMsg")),
        );
        let response = messages::get_response(
            &request,
            messages::GetAction::GetMdib,
            &MdibVersionGroup::new(4, "urn:uuid:s", None),
            vec![("mdib", crate::wire::WireValue::Msg(mdib))],
        );
        mirror.init_mdib(|| Ok(response)).expect("init");
        mirror
    }

    fn waveform(mdib_version: u64, state_version: u64, samples: &[&str]) -> Arc<WireMessage> {
        let state = waveform_state(100.0, samples)
            .with("StateVersion", PmValue::UInt(state_version))
            .expect("state version");
        let group = MdibVersionGroup::new(mdib_version, "urn:uuid:s", None);
        Arc::new(
            crate::provider::reports::waveform_report(&[StateContainer::new(state)], &group)
                .expect("report"),
        )
    }

    #[test]
    fn test_stale_waveform_state_adds_no_samples() {
        let mirror = ready_mirror();
        mirror.on_report(waveform(5, 2, &["1", "2"])).expect("first");
        assert_eq!(mirror.realtime_samples("rtsa").len(), 2);

        let outcome = mirror.on_report(waveform(6, 1, &["7", "8", "9"])).expect("stale");
        assert_eq!(outcome, ReportOutcome::Applied(Action::Waveform));
        let values: Vec<String> = mirror
            .realtime_samples("rtsa")
            .iter()
            .map(|s| s.value.to_string())
            .collect();
        assert_eq!(values, vec!["1", "2"]);

        mirror.on_report(waveform(7, 3, &["3"])).expect("newer");
        assert_eq!(mirror.realtime_samples("rtsa").len(), 3);
    }

    #[test]
    fn test_second_init_is_rejected() {
        let mirror = ConsumerMdib::new(&ConsumerConfig::new());
        let failed = mirror.init_mdib(|| Err(Error::Disconnected));
        assert!(matches!(failed, Err(Error::Disconnected)));
        assert_eq!(mirror.phase(), MirrorPhase::Uninitialized);

        let request = messages::get_request(messages::GetAction::GetMdib, &[]);
        let group = MdibVersionGroup::new(4, "urn:uuid:s", None);
        let mdib = WireMessage::new("MdibMsg").with(
            "md_description",
            crate::wire::WireValue::Msg(WireMessage::new("MdDescriptionMsg")),
        );
        let response = messages::get_response(
            &request,
            messages::GetAction::GetMdib,
            &group,
            vec![("mdib", crate::wire::WireValue::Msg(mdib))],
        );
        mirror.init_mdib(|| Ok(response.clone())).expect("init");
        assert!(mirror.is_ready());
        assert!(matches!(
            mirror.init_mdib(|| Ok(response)),
            Err(Error::AlreadyInitialized)
        ));
    }
}
