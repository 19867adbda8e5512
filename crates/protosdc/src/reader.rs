// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor tree assembly.
//!
//! The wire description nests descriptors by a fixed schema:
//!
//! ```text
//! mds ─┬─ vmd ─┬─ channel ── metric
//!      │       └─ alert_system / sco
//!      ├─ system_context ── ensemble / means / operator / workflow
//!      │                    location / patient
//!      ├─ clock
//!      ├─ battery
//!      └─ alert_system ─┬─ alert_condition   sco ── operation
//!                       └─ alert_signal
//! ```
//!
//! The store keeps the same descriptors flat with parent handles.
//! [`MessageReader`] flattens, [`md_description_to_p`] nests.

use crate::config::LogTarget;
use crate::error::{Error, Result};
use crate::mapping::naming::name_to_p;
use crate::mapping::{descriptor_from_p, state_from_p, to_p, OneOfFamily};
use crate::mapping::primitive::mdib_version_group_from_p;
use crate::mdib::{DescriptorContainer, DescriptorLink, MdibTables, MdibVersionGroup, StateContainer};
use crate::pm::descriptors::ABSTRACT_COMPLEX_DEVICE_COMPONENT_DESCRIPTOR;
use crate::wire::{WireMessage, WireValue};
use std::collections::HashMap;

const COMPLEX_LEVEL: &str = "abstract_complex_device_component_descriptor";

/// Converts wire descriptions and states into store containers.
pub struct MessageReader {
    log: LogTarget,
}

impl MessageReader {
    pub fn new(log: LogTarget) -> Self {
        Self { log }
    }

    /// Flatten a description into descriptors with parent handles.
    pub fn read_md_description(&self, p: &WireMessage) -> Result<Vec<DescriptorContainer>> {
        let mut out = Vec::new();
        for p_mds in p.repeated_msgs("mds")? {
            let mds = read_one(p_mds, None)?;
            let mds_handle = mds.handle().to_string();
            out.push(mds);
            for p_vmd in p_mds.repeated_msgs("vmd")? {
                let vmd = read_one(p_vmd, Some(&mds_handle))?;
                let vmd_handle = vmd.handle().to_string();
                out.push(vmd);
                read_complex_children(p_vmd, &vmd_handle, &mut out)?;
                for p_channel in p_vmd.repeated_msgs("channel")? {
                    let channel = read_one(p_channel, Some(&vmd_handle))?;
                    let channel_handle = channel.handle().to_string();
                    out.push(channel);
                    for p_metric in p_channel.repeated_msgs("metric")? {
                        out.push(read_one(p_metric, Some(&channel_handle))?);
                    }
                }
            }
            if let Some(p_sc) = p_mds.msg("system_context") {
                let sc = read_one(p_sc, Some(&mds_handle))?;
                let sc_handle = sc.handle().to_string();
                out.push(sc);
                for field in [
                    "ensemble_context",
                    "means_context",
                    "operator_context",
                    "workflow_context",
                ] {
                    for p_ctx in p_sc.repeated_msgs(field)? {
                        out.push(read_one(p_ctx, Some(&sc_handle))?);
                    }
                }
                for field in ["location_context", "patient_context"] {
                    if let Some(p_ctx) = p_sc.msg(field) {
                        out.push(read_one(p_ctx, Some(&sc_handle))?);
                    }
                }
            }
            if let Some(p_clock) = p_mds.msg("clock") {
                out.push(read_one(p_clock, Some(&mds_handle))?);
            }
            for p_battery in p_mds.repeated_msgs("battery")? {
                out.push(read_one(p_battery, Some(&mds_handle))?);
            }
            read_complex_children(p_mds, &mds_handle, &mut out)?;
        }
        log::debug!(
            target: self.log.target(),
            "{} read {} descriptors",
            self.log,
            out.len()
        );
        Ok(out)
    }

    /// Decode a list of descriptors sharing one parent.
    pub fn read_descriptors(
        &self,
        ps: &[&WireMessage],
        parent_handle: Option<&str>,
    ) -> Result<Vec<DescriptorContainer>> {
        ps.iter().map(|p| read_one(p, parent_handle)).collect()
    }

    /// Decode states and link each to its descriptor.
    ///
    /// A state whose `DescriptorVersion` differs from the descriptor's
    /// version is kept but left unlinked.
    pub fn read_states<F>(&self, ps: &[&WireMessage], lookup: F) -> Result<Vec<StateContainer>>
    where
        F: Fn(&str) -> Option<DescriptorLink>,
    {
        let mut out = Vec::with_capacity(ps.len());
        for p in ps {
            let node = state_from_p(p)?;
            let mut state = StateContainer::new(node);
            match lookup(state.descriptor_handle()) {
                Some(link) if link.version == state.node.descriptor_version() => {
                    state.descriptor = Some(link);
                }
                Some(link) => {
                    log::warn!(
                        target: self.log.target(),
                        "{} state {} references descriptor version {}, descriptor has {}",
                        self.log,
                        state.descriptor_handle(),
                        state.node.descriptor_version(),
                        link.version
                    );
                }
                None => {
                    log::debug!(
                        target: self.log.target(),
                        "{} no descriptor for state {}",
                        self.log,
                        state.descriptor_handle()
                    );
                }
            }
            out.push(state);
        }
        Ok(out)
    }

    /// Descriptors, states and version group of a full mdib message.
    pub fn read_mdib(
        &self,
        p_mdib: &WireMessage,
    ) -> Result<(Vec<DescriptorContainer>, Vec<StateContainer>, MdibVersionGroup)> {
        let descriptors = self.read_md_description(p_mdib.require_msg("md_description")?)?;
        let by_handle: HashMap<&str, &DescriptorContainer> =
            descriptors.iter().map(|d| (d.handle(), d)).collect();
        let p_states = match p_mdib.msg("md_state") {
            Some(md_state) => md_state.repeated_msgs("state")?,
            None => Vec::new(),
        };
        let states = self.read_states(&p_states, |h| {
            by_handle.get(h).map(|d| DescriptorLink::of(d))
        })?;
        let group = p_mdib
            .msg("mdib_version_group_attr")
            .map(mdib_version_group_from_p)
            .unwrap_or_default();
        Ok((descriptors, states, group))
    }
}

fn read_one(p: &WireMessage, parent_handle: Option<&str>) -> Result<DescriptorContainer> {
    Ok(DescriptorContainer::new(descriptor_from_p(p)?, parent_handle))
}

/// Alert system and sco of an mds or vmd.
fn read_complex_children(
    p: &WireMessage,
    parent_handle: &str,
    out: &mut Vec<DescriptorContainer>,
) -> Result<()> {
    let Some(complex) = p.msg(COMPLEX_LEVEL) else {
        return Ok(());
    };
    if let Some(p_as) = complex.msg("alert_system") {
        let alert_system = read_one(p_as, Some(parent_handle))?;
        let as_handle = alert_system.handle().to_string();
        out.push(alert_system);
        for p_cond in p_as.repeated_msgs("alert_condition")? {
            out.push(read_one(p_cond, Some(&as_handle))?);
        }
        for p_sig in p_as.repeated_msgs("alert_signal")? {
            out.push(read_one(p_sig, Some(&as_handle))?);
        }
    }
    if let Some(p_sco) = complex.msg("sco") {
        let sco = read_one(p_sco, Some(parent_handle))?;
        let sco_handle = sco.handle().to_string();
        out.push(sco);
        for p_op in p_sco.repeated_msgs("operation")? {
            out.push(read_one(p_op, Some(&sco_handle))?);
        }
    }
    Ok(())
}

// =======================================================================
// Encode direction
// =======================================================================

/// Child slot of a descriptor message.
enum Slot {
    /// Singular field.
    One(&'static str),
    /// Repeated field.
    Many(&'static str),
    /// Repeated field holding unions of the family.
    ManyOneOf(&'static str, OneOfFamily),
    /// Singular field at the complex component level.
    Complex(&'static str),
}

fn slot_for(parent: &str, child: &str) -> Option<Slot> {
    let slot = match (parent, child) {
        ("MdsDescriptor", "VmdDescriptor") => Slot::Many("vmd"),
        ("MdsDescriptor", "SystemContextDescriptor") => Slot::One("system_context"),
        ("MdsDescriptor", "ClockDescriptor") => Slot::One("clock"),
        ("MdsDescriptor", "BatteryDescriptor") => Slot::Many("battery"),
        ("MdsDescriptor" | "VmdDescriptor", "AlertSystemDescriptor") => Slot::Complex("alert_system"),
        ("MdsDescriptor" | "VmdDescriptor", "ScoDescriptor") => Slot::Complex("sco"),
        ("VmdDescriptor", "ChannelDescriptor") => Slot::Many("channel"),
        ("ChannelDescriptor", _) if child.ends_with("MetricDescriptor") => {
            Slot::ManyOneOf("metric", OneOfFamily::AbstractMetricDescriptor)
        }
        ("AlertSystemDescriptor", "AlertConditionDescriptor" | "LimitAlertConditionDescriptor") => {
            Slot::ManyOneOf("alert_condition", OneOfFamily::AlertConditionDescriptor)
        }
        ("AlertSystemDescriptor", "AlertSignalDescriptor") => Slot::Many("alert_signal"),
        ("ScoDescriptor", _) if child.ends_with("OperationDescriptor") => {
            Slot::ManyOneOf("operation", OneOfFamily::AbstractOperationDescriptor)
        }
        ("SystemContextDescriptor", "PatientContextDescriptor") => Slot::One("patient_context"),
        ("SystemContextDescriptor", "LocationContextDescriptor") => Slot::One("location_context"),
        (
            "SystemContextDescriptor",
            "EnsembleContextDescriptor"
            | "MeansContextDescriptor"
            | "OperatorContextDescriptor"
            | "WorkflowContextDescriptor",
        ) => Slot::Many(context_list_field(child)),
        _ => return None,
    };
    Some(slot)
}

/// `EnsembleContextDescriptor` -> `ensemble_context`.
fn context_list_field(child: &str) -> &'static str {
    match child {
        "EnsembleContextDescriptor" => "ensemble_context",
        "MeansContextDescriptor" => "means_context",
        "OperatorContextDescriptor" => "operator_context",
        _ => "workflow_context",
    }
}

/// Nest the flat descriptor tree into a description message.
///
/// Fails with `NotImplemented` when a child kind has no slot under its
/// parent.
pub fn md_description_to_p(tables: &MdibTables) -> Result<WireMessage> {
    let mut p = WireMessage::new("MdDescriptionMsg");
    for mds in tables.roots() {
        p.push("mds", WireValue::Msg(subtree_to_p(tables, mds)?));
    }
    Ok(p)
}

fn subtree_to_p(tables: &MdibTables, descriptor: &DescriptorContainer) -> Result<WireMessage> {
    let mut p = to_p(&descriptor.node)?;
    let parent = descriptor.class().name;
    let mut single: HashMap<&str, &str> = HashMap::new();
    for child in tables.children_of(descriptor.handle()) {
        let child_name = child.class().name;
        let slot = slot_for(parent, child_name).ok_or_else(|| {
            Error::NotImplemented(format!("{} as child of {}", child_name, parent))
        })?;
        if let Slot::One(field) | Slot::Complex(field) = slot {
            if let Some(first) = single.insert(field, child.handle()) {
                return Err(Error::InvalidData(format!(
                    "{} {:?} holds one {} but has {:?} and {:?}",
                    parent,
                    descriptor.handle(),
                    field,
                    first,
                    child.handle()
                )));
            }
        }
        let child_p = subtree_to_p(tables, child)?;
        match slot {
            Slot::One(field) => p.set(field, WireValue::Msg(child_p)),
            Slot::Many(field) => p.push(field, WireValue::Msg(child_p)),
            Slot::ManyOneOf(field, family) => {
                p.push(field, WireValue::Msg(family.wrap(child.class(), child_p)?))
            }
            Slot::Complex(field) => p
                .msg_mut(COMPLEX_LEVEL, ABSTRACT_COMPLEX_DEVICE_COMPONENT_DESCRIPTOR.msg)
                .set(field, WireValue::Msg(child_p)),
        }
    }
    Ok(p)
}

/// States as a list of `AbstractStateOneOfMsg`.
pub fn md_state_to_p<'a>(states: impl IntoIterator<Item = &'a StateContainer>) -> Result<WireMessage> {
    let mut p = WireMessage::new("MdStateMsg");
    for state in states {
        let wrapped = OneOfFamily::AbstractState.wrap(state.node.class(), to_p(&state.node)?)?;
        p.push("state", WireValue::Msg(wrapped));
    }
    Ok(p)
}

/// Field name of a descriptor kind inside a report part, e.g. `numeric_metric_descriptor`.
pub fn descriptor_field(descriptor: &DescriptorContainer) -> String {
    name_to_p(descriptor.class().name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::descriptors::{
        CHANNEL_DESCRIPTOR, CLOCK_DESCRIPTOR, MDS_DESCRIPTOR, NUMERIC_METRIC_DESCRIPTOR,
        PATIENT_CONTEXT_DESCRIPTOR, SYSTEM_CONTEXT_DESCRIPTOR,
    };
    use crate::pm::{types::CODED_VALUE, Decimal, PmClass, PmObject, PmValue};

    fn descr(class: &'static PmClass, handle: &str, parent: Option<&str>) -> DescriptorContainer {
        DescriptorContainer::new(
            PmObject::new(class).with("Handle", handle).expect("handle"),
            parent,
        )
    }

    fn metric(handle: &str, parent: &str) -> DescriptorContainer {
        let unit = PmObject::new(&CODED_VALUE).with("Code", "262688").expect("unit");
        let node = PmObject::new(&NUMERIC_METRIC_DESCRIPTOR)
            .with("Handle", handle)
            .and_then(|o| o.with("Unit", unit))
            .and_then(|o| o.with("MetricCategory", PmValue::Enum("Msrmt".into())))
            .and_then(|o| o.with("MetricAvailability", PmValue::Enum("Cont".into())))
            .and_then(|o| o.with("Resolution", Decimal::from(1)))
            .expect("metric");
        DescriptorContainer::new(node, Some(parent))
    }

    fn reader() -> MessageReader {
        MessageReader::new(LogTarget::new("protosdc::reader", "reader", None))
    }

    #[test]
    fn test_unexpected_child_is_not_implemented() {
        let mut tables = MdibTables::new();
        tables.add_descriptor(descr(&MDS_DESCRIPTOR, "mds0", None));
        tables.add_descriptor(metric("m0", "mds0"));
        let err = md_description_to_p(&tables).expect_err("metric under mds");
        assert_eq!(
            err.to_string(),
            "handling of NumericMetricDescriptor as child of MdsDescriptor not implemented"
        );
    }

    #[test]
    fn test_second_clock_is_rejected() {
        let mut tables = MdibTables::new();
        tables.add_descriptor(descr(&MDS_DESCRIPTOR, "mds0", None));
        tables.add_descriptor(descr(&CLOCK_DESCRIPTOR, "clk1", Some("mds0")));
        tables.add_descriptor(descr(&CLOCK_DESCRIPTOR, "clk2", Some("mds0")));
        let err = md_description_to_p(&tables).expect_err("two clocks");
        let text = err.to_string();
        assert!(matches!(err, Error::InvalidData(_)));
        assert!(text.contains("clk1") && text.contains("clk2"), "{}", text);
    }

    #[test]
    fn test_system_context_roundtrip() {
        let mut tables = MdibTables::new();
        tables.add_descriptor(descr(&MDS_DESCRIPTOR, "mds0", None));
        tables.add_descriptor(descr(&SYSTEM_CONTEXT_DESCRIPTOR, "sc0", Some("mds0")));
        tables.add_descriptor(descr(&PATIENT_CONTEXT_DESCRIPTOR, "pat", Some("sc0")));
        tables.add_descriptor(descr(&CHANNEL_DESCRIPTOR, "orphan", Some("nowhere")));
        let p = md_description_to_p(&tables).expect("encode");
        let mds = p.repeated_msgs("mds").expect("mds")[0];
        assert!(mds
            .msg("system_context")
            .is_some_and(|sc| sc.has("patient_context")));
        let flat = reader().read_md_description(&p).expect("decode");
        let handles: Vec<_> = flat.iter().map(DescriptorContainer::handle).collect();
        assert_eq!(handles, vec!["mds0", "sc0", "pat"]);
        assert_eq!(flat[2].parent_handle.as_deref(), Some("sc0"));
    }

    #[test]
    fn test_version_mismatch_drops_link() {
        let d = metric("m0", "ch0");
        let state = PmObject::new(&crate::pm::states::NUMERIC_METRIC_STATE)
            .with("DescriptorHandle", "m0")
            .and_then(|o| o.with("DescriptorVersion", PmValue::UInt(3)))
            .expect("state");
        let p = OneOfFamily::AbstractState
            .wrap(state.class(), to_p(&state).expect("encode"))
            .expect("wrap");
        let states = reader()
            .read_states(&[&p], |_| Some(DescriptorLink::of(&d)))
            .expect("read");
        assert_eq!(states.len(), 1);
        assert!(states[0].descriptor.is_none());
        assert_eq!(states[0].node, state);
    }
}
