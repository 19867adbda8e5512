// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Report message layout.
//!
//! Every episodic report travels in an `EpisodicReportStream`:
//!
//! ```text
//! EpisodicReportStream
//! ├── addressing { action, message_id }
//! └── report { metric | alert | component | context
//!              | operational_state | waveform | description }
//! ```
//!
//! State reports nest the version group one level below the report
//! (`abstract_metric_report.abstract_report`); waveform and description
//! reports carry `abstract_report` directly. Builders and readers live
//! side by side so that both directions share one layout table.

use crate::actions::Action;
use crate::error::{Error, Result};
use crate::invocation::{abstract_report_part, OperationInvokedPart};
use crate::mapping::primitive::{
    enum_attr_from_p, enum_attr_to_p, mdib_version_group_from_p, mdib_version_group_to_p,
    string_wrapper,
};
use crate::mapping::{descriptor_to_one_of, state_to_one_of, to_p, OneOfFamily};
use crate::mdib::{DescriptorContainer, MdibVersionGroup, StateContainer};
use crate::pm::enums::DESCRIPTION_MODIFICATION_TYPE;
use crate::wire::{WireMessage, WireValue};

const VERSION_GROUP: &str = "mdib_version_group_attr";

/// Layout of one episodic state report.
#[derive(Debug, Clone, Copy)]
pub struct StateReportLayout {
    pub action: Action,
    /// Branch of `EpisodicReportMsg`.
    pub report_field: &'static str,
    pub report_msg: &'static str,
    /// Intermediate level holding `abstract_report` and `report_part`.
    pub abstract_field: &'static str,
    pub abstract_msg: &'static str,
    pub state_field: &'static str,
    pub family: OneOfFamily,
    /// Component and context reports put each state in its own part.
    pub part_per_state: bool,
}

pub const METRIC_REPORT: StateReportLayout = StateReportLayout {
    action: Action::EpisodicMetricReport,
    report_field: "metric",
    report_msg: "EpisodicMetricReportMsg",
    abstract_field: "abstract_metric_report",
    abstract_msg: "AbstractMetricReportMsg",
    state_field: "metric_state",
    family: OneOfFamily::AbstractMetricState,
    part_per_state: false,
};

pub const ALERT_REPORT: StateReportLayout = StateReportLayout {
    action: Action::EpisodicAlertReport,
    report_field: "alert",
    report_msg: "EpisodicAlertReportMsg",
    abstract_field: "abstract_alert_report",
    abstract_msg: "AbstractAlertReportMsg",
    state_field: "alert_state",
    family: OneOfFamily::AbstractAlertState,
    part_per_state: false,
};

pub const COMPONENT_REPORT: StateReportLayout = StateReportLayout {
    action: Action::EpisodicComponentReport,
    report_field: "component",
    report_msg: "EpisodicComponentReportMsg",
    abstract_field: "abstract_component_report",
    abstract_msg: "AbstractComponentReportMsg",
    state_field: "component_state",
    family: OneOfFamily::AbstractDeviceComponentState,
    part_per_state: true,
};

pub const CONTEXT_REPORT: StateReportLayout = StateReportLayout {
    action: Action::EpisodicContextReport,
    report_field: "context",
    report_msg: "EpisodicContextReportMsg",
    abstract_field: "abstract_context_report",
    abstract_msg: "AbstractContextReportMsg",
    state_field: "context_state",
    family: OneOfFamily::AbstractContextState,
    part_per_state: true,
};

pub const OPERATIONAL_STATE_REPORT: StateReportLayout = StateReportLayout {
    action: Action::EpisodicOperationalStateReport,
    report_field: "operational_state",
    report_msg: "EpisodicOperationalStateReportMsg",
    abstract_field: "abstract_operational_state_report",
    abstract_msg: "AbstractOperationalStateReportMsg",
    state_field: "operation_state",
    family: OneOfFamily::AbstractOperationState,
    part_per_state: false,
};

const STATE_REPORTS: [StateReportLayout; 5] = [
    METRIC_REPORT,
    ALERT_REPORT,
    COMPONENT_REPORT,
    CONTEXT_REPORT,
    OPERATIONAL_STATE_REPORT,
];

const WAVEFORM_FIELD: &str = "waveform";
const DESCRIPTION_FIELD: &str = "description";

fn abstract_report(group: &MdibVersionGroup) -> WireMessage {
    WireMessage::new("AbstractReportMsg")
        .with(VERSION_GROUP, WireValue::Msg(mdib_version_group_to_p(group)))
}

fn addressing(action: Action) -> WireMessage {
    WireMessage::new("AddressingMsg")
        .with("action", WireValue::Str(action.identifier()))
        .with(
            "message_id",
            WireValue::Str(format!("urn:uuid:{}", uuid::Uuid::new_v4())),
        )
}

fn stream(action: Action, report_field: &str, report: WireMessage) -> WireMessage {
    WireMessage::new("EpisodicReportStream")
        .with("addressing", WireValue::Msg(addressing(action)))
        .with(
            "report",
            WireValue::Msg(
                WireMessage::new("EpisodicReportMsg").with(report_field, WireValue::Msg(report)),
            ),
        )
}

// =======================================================================
// Builders
// =======================================================================

/// Metric, alert, component, context or operational state report.
pub fn state_report(
    layout: &StateReportLayout,
    states: &[StateContainer],
    group: &MdibVersionGroup,
) -> Result<WireMessage> {
    let mut level = WireMessage::new(layout.abstract_msg);
    level.set("abstract_report", WireValue::Msg(abstract_report(group)));
    let new_part = || {
        WireMessage::new("ReportPartMsg")
            .with("abstract_report_part", WireValue::Msg(abstract_report_part()))
    };
    if layout.part_per_state {
        for state in states {
            let mut part = new_part();
            part.push(
                layout.state_field,
                WireValue::Msg(state_to_one_of(&state.node, layout.family)?),
            );
            level.push("report_part", WireValue::Msg(part));
        }
    } else {
        let mut part = new_part();
        for state in states {
            part.push(
                layout.state_field,
                WireValue::Msg(state_to_one_of(&state.node, layout.family)?),
            );
        }
        level.push("report_part", WireValue::Msg(part));
    }
    let report = WireMessage::new(layout.report_msg)
        .with(layout.abstract_field, WireValue::Msg(level));
    Ok(stream(layout.action, layout.report_field, report))
}

/// Real-time sample array states, listed directly.
pub fn waveform_report(states: &[StateContainer], group: &MdibVersionGroup) -> Result<WireMessage> {
    let mut report = WireMessage::new("WaveformStreamMsg");
    report.set("abstract_report", WireValue::Msg(abstract_report(group)));
    for state in states {
        report.push("state", WireValue::Msg(to_p(&state.node)?));
    }
    Ok(stream(Action::Waveform, WAVEFORM_FIELD, report))
}

/// Kind of a description modification report part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModificationType {
    Create,
    Update,
    Delete,
}

impl ModificationType {
    /// Order in which an applier must process the parts.
    pub const APPLY_ORDER: [ModificationType; 3] = [Self::Create, Self::Update, Self::Delete];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Create => "Crt",
            Self::Update => "Upt",
            Self::Delete => "Del",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        Self::APPLY_ORDER.into_iter().find(|m| m.symbol() == symbol)
    }
}

/// One part per descriptor, each with the states of that descriptor.
///
/// Parts are grouped create, update, delete.
pub fn description_modification_report(
    created: &[DescriptorContainer],
    updated: &[DescriptorContainer],
    deleted: &[DescriptorContainer],
    states: &[StateContainer],
    group: &MdibVersionGroup,
) -> Result<WireMessage> {
    let mut report = WireMessage::new("DescriptionModificationReportMsg");
    report.set("abstract_report", WireValue::Msg(abstract_report(group)));
    for (modification, descriptors) in [
        (ModificationType::Create, created),
        (ModificationType::Update, updated),
        (ModificationType::Delete, deleted),
    ] {
        for descriptor in descriptors {
            let mut part = WireMessage::new("DescriptionModificationReportMsg.ReportPartMsg");
            part.set("abstract_report_part", WireValue::Msg(abstract_report_part()));
            part.set(
                "modification_type_attr",
                WireValue::Msg(enum_attr_to_p(
                    &DESCRIPTION_MODIFICATION_TYPE,
                    modification.symbol(),
                )?),
            );
            if let Some(parent) = &descriptor.parent_handle {
                part.set(
                    "parent_descriptor_attr",
                    WireValue::Msg(string_wrapper("HandleRefMsg", parent)),
                );
            }
            part.push(
                "p_descriptor",
                WireValue::Msg(descriptor_to_one_of(
                    &descriptor.node,
                    OneOfFamily::AbstractDescriptor,
                )?),
            );
            for state in states
                .iter()
                .filter(|s| s.descriptor_handle() == descriptor.handle())
            {
                part.push(
                    "state",
                    WireValue::Msg(state_to_one_of(&state.node, OneOfFamily::AbstractState)?),
                );
            }
            report.push("report_part", WireValue::Msg(part));
        }
    }
    Ok(stream(
        Action::DescriptionModificationReport,
        DESCRIPTION_FIELD,
        report,
    ))
}

/// Operation invoked reports travel in their own stream type.
pub fn operation_invoked_report(
    parts: &[OperationInvokedPart],
    group: &MdibVersionGroup,
) -> Result<WireMessage> {
    let mut report = WireMessage::new("OperationInvokedReportMsg");
    report.set("abstract_report", WireValue::Msg(abstract_report(group)));
    for part in parts {
        report.push("report_part", WireValue::Msg(part.to_p()?));
    }
    Ok(WireMessage::new("OperationInvokedReportStream")
        .with(
            "addressing",
            WireValue::Msg(addressing(Action::OperationInvokedReport)),
        )
        .with("operation_invoked", WireValue::Msg(report)))
}

// =======================================================================
// Readers
// =======================================================================

/// The populated branch of an episodic report stream.
#[derive(Debug)]
pub struct EpisodicReport<'a> {
    pub action: Action,
    pub version_group: MdibVersionGroup,
    /// Content of the populated `EpisodicReportMsg` branch.
    pub body: &'a WireMessage,
}

/// Resolve which report a stream carries and read its version group.
pub fn read_episodic(stream: &WireMessage) -> Result<EpisodicReport<'_>> {
    let report = stream.require_msg("report")?;
    if report.len() != 1 {
        return Err(Error::OneOfCount {
            message_type: report.type_name().to_string(),
            populated: report.len(),
        });
    }
    let (field, _) = report
        .fields()
        .next()
        .ok_or_else(|| report.missing("report"))?;
    let body = report.require_msg(field)?;
    let (action, abstract_level) = match field {
        WAVEFORM_FIELD => (Action::Waveform, body),
        DESCRIPTION_FIELD => (Action::DescriptionModificationReport, body),
        _ => {
            let layout = STATE_REPORTS
                .iter()
                .find(|l| l.report_field == field)
                .ok_or_else(|| Error::NotImplemented(format!("report branch {}", field)))?;
            (layout.action, body.require_msg(layout.abstract_field)?)
        }
    };
    let version_group = abstract_level
        .msg("abstract_report")
        .and_then(|r| r.msg(VERSION_GROUP))
        .map(mdib_version_group_from_p)
        .unwrap_or_default();
    Ok(EpisodicReport {
        action,
        version_group,
        body,
    })
}

/// Layout of a state report action.
pub fn state_layout(action: Action) -> Option<&'static StateReportLayout> {
    STATE_REPORTS.iter().find(|l| l.action == action)
}

/// All state messages of a state report, across its parts.
pub fn report_states<'a>(
    layout: &StateReportLayout,
    body: &'a WireMessage,
) -> Result<Vec<&'a WireMessage>> {
    let level = body.require_msg(layout.abstract_field)?;
    let mut out = Vec::new();
    for part in level.repeated_msgs("report_part")? {
        out.extend(part.repeated_msgs(layout.state_field)?);
    }
    Ok(out)
}

/// State messages of a waveform report.
pub fn waveform_states(body: &WireMessage) -> Result<Vec<&WireMessage>> {
    body.repeated_msgs("state")
}

/// One decoded description modification part, still in wire form.
#[derive(Debug)]
pub struct ModificationPart<'a> {
    pub modification: ModificationType,
    pub parent_handle: Option<String>,
    pub descriptors: Vec<&'a WireMessage>,
    pub states: Vec<&'a WireMessage>,
}

pub fn modification_parts(body: &WireMessage) -> Result<Vec<ModificationPart<'_>>> {
    let mut out = Vec::new();
    for part in body.repeated_msgs("report_part")? {
        let symbol = enum_attr_from_p(
            &DESCRIPTION_MODIFICATION_TYPE,
            part.require_msg("modification_type_attr")?,
            "modification_type_attr",
        )?;
        let modification = ModificationType::from_symbol(&symbol).ok_or_else(|| {
            Error::NotImplemented(format!("modification type {}", symbol))
        })?;
        out.push(ModificationPart {
            modification,
            parent_handle: part
                .msg("parent_descriptor_attr")
                .and_then(|m| m.str("string"))
                .map(str::to_string),
            descriptors: part.repeated_msgs("p_descriptor")?,
            states: part.repeated_msgs("state")?,
        });
    }
    Ok(out)
}

/// Version group and parts of an operation invoked stream.
pub fn read_operation_invoked(
    stream: &WireMessage,
) -> Result<(MdibVersionGroup, Vec<OperationInvokedPart>)> {
    let report = stream.require_msg("operation_invoked")?;
    let group = report
        .msg("abstract_report")
        .and_then(|r| r.msg(VERSION_GROUP))
        .map(mdib_version_group_from_p)
        .unwrap_or_default();
    let parts = report
        .repeated_msgs("report_part")?
        .into_iter()
        .map(OperationInvokedPart::from_p)
        .collect::<Result<Vec<_>>>()?;
    Ok((group, parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::{states, PmObject, PmValue};

    fn context(handle: &str) -> StateContainer {
        StateContainer::new(
            PmObject::new(&states::PATIENT_CONTEXT_STATE)
                .with("DescriptorHandle", "pat")
                .and_then(|o| o.with("Handle", handle))
                .and_then(|o| o.with("StateVersion", PmValue::UInt(1)))
                .expect("context"),
        )
    }

    #[test]
    fn test_context_report_one_part_per_state() {
        let group = MdibVersionGroup::new(4, "urn:uuid:seq", None);
        let p = state_report(&CONTEXT_REPORT, &[context("c1"), context("c2")], &group)
            .expect("build");
        let read = read_episodic(&p).expect("read");
        assert_eq!(read.action, Action::EpisodicContextReport);
        assert_eq!(read.version_group, group);
        let level = read.body.msg("abstract_context_report").expect("level");
        assert_eq!(level.repeated("report_part").len(), 2);
        assert_eq!(report_states(&CONTEXT_REPORT, read.body).expect("states").len(), 2);
    }

    #[test]
    fn test_action_in_addressing() {
        let group = MdibVersionGroup::new(1, "urn:uuid:seq", None);
        let p = state_report(&METRIC_REPORT, &[], &group).expect("build");
        assert_eq!(
            p.msg("addressing").and_then(|a| a.str("action")),
            Some("org.somda.protosdc.mdib_reporting.action.EpisodicMetricReport")
        );
    }

    #[test]
    fn test_report_with_two_branches_is_rejected() {
        let report = WireMessage::new("EpisodicReportMsg")
            .with("metric", WireValue::Msg(WireMessage::new("EpisodicMetricReportMsg")))
            .with("alert", WireValue::Msg(WireMessage::new("EpisodicAlertReportMsg")));
        let p = WireMessage::new("EpisodicReportStream").with("report", WireValue::Msg(report));
        assert!(matches!(
            read_episodic(&p),
            Err(Error::OneOfCount { populated: 2, .. })
        ));
    }
}
