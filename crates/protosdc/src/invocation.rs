// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Operation invocation vocabulary shared by provider and consumer.

use crate::config::{
    ERROR_MESSAGE_LANG, INVOCATION_SOURCE_EXTENSION, INVOCATION_SOURCE_ROOT,
    SOURCE_MDS_PLACEHOLDER,
};
use crate::error::{Error, Result};
use crate::mapping::primitive::{enum_attr_from_p, enum_attr_to_p, string_wrapper};
use crate::mapping::{from_p, to_p, OneOfFamily};
use crate::pm::enums::{INVOCATION_ERROR, INVOCATION_STATE};
use crate::pm::types::{INSTANCE_IDENTIFIER, LOCALIZED_TEXT};
use crate::pm::{Decimal, PmObject, PmValue};
use crate::wire::{WireMessage, WireValue};

/// Argument of a set request, converted to domain values.
#[derive(Debug, Clone, PartialEq)]
pub enum SetArgument {
    Value(Decimal),
    String(String),
    /// Activate arguments in request order.
    Activate(Vec<String>),
    MetricStates(Vec<PmObject>),
    ComponentStates(Vec<PmObject>),
    ContextStates(Vec<PmObject>),
    AlertState(PmObject),
}

impl SetArgument {
    /// Name of the set operation carrying this argument.
    pub fn operation_name(&self) -> &'static str {
        match self {
            Self::Value(_) => "SetValue",
            Self::String(_) => "SetString",
            Self::Activate(_) => "Activate",
            Self::MetricStates(_) => "SetMetricState",
            Self::ComponentStates(_) => "SetComponentState",
            Self::ContextStates(_) => "SetContextState",
            Self::AlertState(_) => "SetAlertState",
        }
    }
}

/// Progress of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationState {
    Wait,
    Start,
    Cancelled,
    CancelledManually,
    Finished,
    FinishedWithModification,
    Failed,
}

impl InvocationState {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Wait => "Wait",
            Self::Start => "Start",
            Self::Cancelled => "Cnclld",
            Self::CancelledManually => "CnclldMan",
            Self::Finished => "Fin",
            Self::FinishedWithModification => "FinMod",
            Self::Failed => "Fail",
        }
    }

    pub fn from_symbol(symbol: &str) -> Result<Self> {
        Ok(match symbol {
            "Wait" => Self::Wait,
            "Start" => Self::Start,
            "Cnclld" => Self::Cancelled,
            "CnclldMan" => Self::CancelledManually,
            "Fin" => Self::Finished,
            "FinMod" => Self::FinishedWithModification,
            "Fail" => Self::Failed,
            other => {
                return Err(Error::UnknownEnum {
                    value: other.to_string(),
                    field: "invocation_state".to_string(),
                    declaring_type: INVOCATION_STATE.name.to_string(),
                })
            }
        })
    }

    /// Wait and Start are followed by further reports.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Wait | Self::Start)
    }
}

/// Classification of a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationError {
    Unspecified,
    Unknown,
    InvalidValue,
    Other,
}

impl InvocationError {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Unspecified => "Unspec",
            Self::Unknown => "Unkn",
            Self::InvalidValue => "Inv",
            Self::Other => "Oth",
        }
    }

    pub fn from_symbol(symbol: &str) -> Result<Self> {
        Ok(match symbol {
            "Unspec" => Self::Unspecified,
            "Unkn" => Self::Unknown,
            "Inv" => Self::InvalidValue,
            "Oth" => Self::Other,
            other => {
                return Err(Error::UnknownEnum {
                    value: other.to_string(),
                    field: "invocation_error".to_string(),
                    declaring_type: INVOCATION_ERROR.name.to_string(),
                })
            }
        })
    }
}

/// Transaction id, state and optional error of an invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationInfo {
    pub transaction_id: u64,
    pub invocation_state: InvocationState,
    pub invocation_error: Option<InvocationError>,
    /// `LocalizedText` instances.
    pub error_messages: Vec<PmObject>,
}

impl InvocationInfo {
    pub fn new(transaction_id: u64, invocation_state: InvocationState) -> Self {
        Self {
            transaction_id,
            invocation_state,
            invocation_error: None,
            error_messages: Vec::new(),
        }
    }

    /// A failed invocation with one message in the default language.
    pub fn failed(transaction_id: u64, error: InvocationError, message: &str) -> Self {
        let mut info = Self::new(transaction_id, InvocationState::Failed);
        info.invocation_error = Some(error);
        info.error_messages.push(error_text(message));
        info
    }

    /// All error message texts joined by `, `.
    pub fn error_text(&self) -> String {
        self.error_messages
            .iter()
            .filter_map(|m| m.str("text"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_p(&self) -> Result<WireMessage> {
        let mut p = WireMessage::new("InvocationInfoMsg");
        p.set(
            "transaction_id",
            WireValue::Msg(
                WireMessage::new("TransactionIdMsg")
                    .with("unsigned_int", WireValue::UInt(self.transaction_id)),
            ),
        );
        p.set(
            "invocation_state",
            WireValue::Msg(enum_attr_to_p(&INVOCATION_STATE, self.invocation_state.symbol())?),
        );
        if let Some(error) = self.invocation_error {
            p.set(
                "invocation_error",
                WireValue::Msg(enum_attr_to_p(&INVOCATION_ERROR, error.symbol())?),
            );
        }
        for message in &self.error_messages {
            p.push("invocation_error_message", WireValue::Msg(to_p(message)?));
        }
        Ok(p)
    }

    pub fn from_p(p: &WireMessage) -> Result<Self> {
        let transaction_id = p
            .require_msg("transaction_id")?
            .u64("unsigned_int")
            .unwrap_or(0);
        let state = enum_attr_from_p(
            &INVOCATION_STATE,
            p.require_msg("invocation_state")?,
            "invocation_state",
        )?;
        let invocation_error = match p.msg("invocation_error") {
            Some(m) => Some(InvocationError::from_symbol(&enum_attr_from_p(
                &INVOCATION_ERROR,
                m,
                "invocation_error",
            )?)?),
            None => None,
        };
        let error_messages = p
            .repeated_msgs("invocation_error_message")?
            .into_iter()
            .map(from_p)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            transaction_id,
            invocation_state: InvocationState::from_symbol(&state)?,
            invocation_error,
            error_messages,
        })
    }
}

fn error_text(message: &str) -> PmObject {
    let mut text = PmObject::new(&LOCALIZED_TEXT);
    for (name, value) in [("text", message), ("Lang", ERROR_MESSAGE_LANG)] {
        if let Some(prop) = LOCALIZED_TEXT.find_prop(name) {
            text.insert(prop, PmValue::Str(value.to_string()));
        }
    }
    text
}

/// The only supported invocation source: an anonymous participant.
pub fn anonymous_invocation_source() -> PmObject {
    let mut source = PmObject::new(&INSTANCE_IDENTIFIER);
    for (name, value) in [
        ("Root", INVOCATION_SOURCE_ROOT),
        ("Extension", INVOCATION_SOURCE_EXTENSION),
    ] {
        if let Some(prop) = INSTANCE_IDENTIFIER.find_prop(name) {
            source.insert(prop, PmValue::Str(value.to_string()));
        }
    }
    source
}

/// `{source_mds}` part header shared by every report part.
pub(crate) fn abstract_report_part() -> WireMessage {
    WireMessage::new("AbstractReportPartMsg").with(
        "source_mds",
        WireValue::Msg(string_wrapper("HandleRefMsg", SOURCE_MDS_PLACEHOLDER)),
    )
}

/// One report part of an operation invoked report.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationInvokedPart {
    pub invocation_info: InvocationInfo,
    /// `InstanceIdentifier`.
    pub invocation_source: PmObject,
    pub operation_handle: String,
    pub operation_target: Option<String>,
}

impl OperationInvokedPart {
    pub fn new(operation_handle: &str, invocation_info: InvocationInfo) -> Self {
        Self {
            invocation_info,
            invocation_source: anonymous_invocation_source(),
            operation_handle: operation_handle.to_string(),
            operation_target: None,
        }
    }

    pub fn to_p(&self) -> Result<WireMessage> {
        let mut p = WireMessage::new("OperationInvokedReportMsg.ReportPartMsg");
        p.set("abstract_report_part", WireValue::Msg(abstract_report_part()));
        p.set("invocation_info", WireValue::Msg(self.invocation_info.to_p()?));
        let source = OneOfFamily::InstanceIdentifier
            .wrap(self.invocation_source.class(), to_p(&self.invocation_source)?)?;
        p.set("invocation_source", WireValue::Msg(source));
        p.set(
            "operation_handle_ref_attr",
            WireValue::Msg(string_wrapper("HandleRefMsg", &self.operation_handle)),
        );
        if let Some(target) = &self.operation_target {
            p.set(
                "operation_target_attr",
                WireValue::Msg(string_wrapper("HandleRefMsg", target)),
            );
        }
        Ok(p)
    }

    pub fn from_p(p: &WireMessage) -> Result<Self> {
        let handle_of = |field: &str| p.msg(field).and_then(|m| m.str("string")).map(str::to_string);
        Ok(Self {
            invocation_info: InvocationInfo::from_p(p.require_msg("invocation_info")?)?,
            invocation_source: from_p(p.require_msg("invocation_source")?)?,
            operation_handle: handle_of("operation_handle_ref_attr").unwrap_or_default(),
            operation_target: handle_of("operation_target_attr"),
        })
    }
}
