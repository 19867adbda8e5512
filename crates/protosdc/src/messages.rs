// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Get and set request/response layout.
//!
//! Every request and response is an envelope:
//!
//! ```text
//! {Name}Request  { addressing { action, message_id },             payload: {Name}Msg }
//! {Name}Response { addressing { action, message_id, relates_id }, payload: {Name}ResponseMsg }
//! ```
//!
//! Get payloads carry `abstract_get` and an optional `handle_ref` list;
//! get responses carry `abstract_get_response` with the version group.
//! Set payloads carry `abstract_set.operation_handle_ref` plus one
//! argument field; set responses carry `abstract_set_response` with the
//! version group and the invocation info.

use crate::error::{Error, Result};
use crate::invocation::{InvocationInfo, SetArgument};
use crate::mapping::primitive::{
    decimal_from_p, decimal_to_p, mdib_version_group_from_p, mdib_version_group_to_p,
    string_wrapper,
};
use crate::mapping::{state_from_p, state_to_one_of, OneOfFamily};
use crate::mdib::MdibVersionGroup;
use crate::pm::PmObject;
use crate::wire::{WireMessage, WireValue};

const VERSION_GROUP: &str = "mdib_version_group_attr";

/// The four get operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GetAction {
    GetMdib,
    GetMdDescription,
    GetMdState,
    GetContextStates,
}

impl GetAction {
    pub const ALL: [GetAction; 4] = [
        Self::GetMdib,
        Self::GetMdDescription,
        Self::GetMdState,
        Self::GetContextStates,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetMdib => "GetMdib",
            Self::GetMdDescription => "GetMdDescription",
            Self::GetMdState => "GetMdState",
            Self::GetContextStates => "GetContextStates",
        }
    }
}

/// The seven set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetAction {
    SetValue,
    SetString,
    Activate,
    SetMetricState,
    SetComponentState,
    SetContextState,
    SetAlertState,
}

impl SetAction {
    pub const ALL: [SetAction; 7] = [
        Self::SetValue,
        Self::SetString,
        Self::Activate,
        Self::SetMetricState,
        Self::SetComponentState,
        Self::SetContextState,
        Self::SetAlertState,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SetValue => "SetValue",
            Self::SetString => "SetString",
            Self::Activate => "Activate",
            Self::SetMetricState => "SetMetricState",
            Self::SetComponentState => "SetComponentState",
            Self::SetContextState => "SetContextState",
            Self::SetAlertState => "SetAlertState",
        }
    }

    /// Set operation that carries `argument`.
    pub fn of(argument: &SetArgument) -> Self {
        match argument {
            SetArgument::Value(_) => Self::SetValue,
            SetArgument::String(_) => Self::SetString,
            SetArgument::Activate(_) => Self::Activate,
            SetArgument::MetricStates(_) => Self::SetMetricState,
            SetArgument::ComponentStates(_) => Self::SetComponentState,
            SetArgument::ContextStates(_) => Self::SetContextState,
            SetArgument::AlertState(_) => Self::SetAlertState,
        }
    }
}

/// Which operation a request envelope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Get(GetAction),
    Set(SetAction),
}

impl RequestKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Get(a) => a.name(),
            Self::Set(a) => a.name(),
        }
    }

    /// Resolve a `{Name}Request` type name.
    pub fn of_request(request: &WireMessage) -> Result<Self> {
        let type_name = request.type_name();
        let name = type_name
            .strip_suffix("Request")
            .ok_or_else(|| Error::UnregisteredType(type_name.to_string()))?;
        GetAction::ALL
            .into_iter()
            .find(|a| a.name() == name)
            .map(Self::Get)
            .or_else(|| {
                SetAction::ALL
                    .into_iter()
                    .find(|a| a.name() == name)
                    .map(Self::Set)
            })
            .ok_or_else(|| Error::UnregisteredType(type_name.to_string()))
    }
}

// =======================================================================
// Envelope
// =======================================================================

fn new_message_id() -> String {
    format!("urn:uuid:{}", uuid::Uuid::new_v4())
}

fn request(name: &str, payload: WireMessage) -> WireMessage {
    let request_type = format!("{}Request", name);
    let addressing = WireMessage::new("AddressingMsg")
        .with("action", WireValue::Str(request_type.clone()))
        .with("message_id", WireValue::Str(new_message_id()));
    WireMessage::new(request_type)
        .with("addressing", WireValue::Msg(addressing))
        .with("payload", WireValue::Msg(payload))
}

/// Response envelope answering `request`.
fn response(request: &WireMessage, name: &str, payload: WireMessage) -> WireMessage {
    let response_type = format!("{}Response", name);
    let mut addressing = WireMessage::new("AddressingMsg")
        .with("action", WireValue::Str(response_type.clone()))
        .with("message_id", WireValue::Str(new_message_id()));
    if let Some(id) = message_id(request) {
        addressing.set("relates_id", WireValue::Str(id.to_string()));
    }
    WireMessage::new(response_type)
        .with("addressing", WireValue::Msg(addressing))
        .with("payload", WireValue::Msg(payload))
}

pub fn message_id(envelope: &WireMessage) -> Option<&str> {
    envelope.msg("addressing").and_then(|a| a.str("message_id"))
}

pub fn relates_id(envelope: &WireMessage) -> Option<&str> {
    envelope.msg("addressing").and_then(|a| a.str("relates_id"))
}

pub fn payload(envelope: &WireMessage) -> Result<&WireMessage> {
    envelope.require_msg("payload")
}

fn handle_refs(payload: &mut WireMessage, handles: &[String]) {
    for handle in handles {
        payload.push("handle_ref", WireValue::Msg(string_wrapper("HandleRefMsg", handle)));
    }
}

fn read_handle_refs(payload: &WireMessage) -> Result<Vec<String>> {
    Ok(payload
        .repeated_msgs("handle_ref")?
        .into_iter()
        .filter_map(|m| m.str("string"))
        .map(str::to_string)
        .collect())
}

// =======================================================================
// Get
// =======================================================================

/// Get request; `handles` is ignored by `GetMdib`.
pub fn get_request(action: GetAction, handles: &[String]) -> WireMessage {
    let mut payload = WireMessage::new(format!("{}Msg", action.name()))
        .with("abstract_get", WireValue::Msg(WireMessage::new("AbstractGetMsg")));
    if action != GetAction::GetMdib {
        handle_refs(&mut payload, handles);
    }
    request(action.name(), payload)
}

/// Handles listed in a get request; empty means all.
pub fn requested_handles(request: &WireMessage) -> Result<Vec<String>> {
    read_handle_refs(payload(request)?)
}

/// Get response with `content` fields next to `abstract_get_response`.
///
/// Repeated content is passed as `WireValue::Repeated`.
pub fn get_response(
    request: &WireMessage,
    action: GetAction,
    group: &MdibVersionGroup,
    content: Vec<(&str, WireValue)>,
) -> WireMessage {
    let mut payload = WireMessage::new(format!("{}ResponseMsg", action.name())).with(
        "abstract_get_response",
        WireValue::Msg(
            WireMessage::new("AbstractGetResponseMsg")
                .with(VERSION_GROUP, WireValue::Msg(mdib_version_group_to_p(group))),
        ),
    );
    for (field, value) in content {
        payload.set(field, value);
    }
    response(request, action.name(), payload)
}

/// Version group of a get response.
pub fn get_response_version_group(response: &WireMessage) -> Result<MdibVersionGroup> {
    Ok(payload(response)?
        .msg("abstract_get_response")
        .and_then(|r| r.msg(VERSION_GROUP))
        .map(mdib_version_group_from_p)
        .unwrap_or_default())
}

// =======================================================================
// Set
// =======================================================================

fn argument_field(action: SetAction) -> &'static str {
    match action {
        SetAction::SetValue => "requested_numeric_value",
        SetAction::SetString => "requested_string_value",
        SetAction::Activate => "argument",
        SetAction::SetMetricState => "proposed_metric_state",
        SetAction::SetComponentState => "proposed_component_state",
        SetAction::SetContextState => "proposed_context_state",
        SetAction::SetAlertState => "proposed_alert_state",
    }
}

fn push_states(
    payload: &mut WireMessage,
    field: &str,
    states: &[PmObject],
    family: OneOfFamily,
) -> Result<()> {
    for state in states {
        payload.push(field, WireValue::Msg(state_to_one_of(state, family)?));
    }
    Ok(())
}

/// Set request invoking `operation_handle` with `argument`.
pub fn set_request(operation_handle: &str, argument: &SetArgument) -> Result<WireMessage> {
    let action = SetAction::of(argument);
    let field = argument_field(action);
    let abstract_set = WireMessage::new("AbstractSetMsg").with(
        "operation_handle_ref",
        WireValue::Msg(string_wrapper("HandleRefMsg", operation_handle)),
    );
    let mut payload = WireMessage::new(format!("{}Msg", action.name()))
        .with("abstract_set", WireValue::Msg(abstract_set));
    match argument {
        SetArgument::Value(value) => payload.set(field, WireValue::Msg(decimal_to_p(value)?)),
        SetArgument::String(value) => payload.set(field, WireValue::Str(value.clone())),
        SetArgument::Activate(args) => {
            for arg in args {
                payload.push(
                    field,
                    WireValue::Msg(
                        WireMessage::new("ArgumentMsg")
                            .with("arg_value", WireValue::Str(arg.clone())),
                    ),
                );
            }
        }
        SetArgument::MetricStates(states) => {
            push_states(&mut payload, field, states, OneOfFamily::AbstractMetricState)?
        }
        SetArgument::ComponentStates(states) => push_states(
            &mut payload,
            field,
            states,
            OneOfFamily::AbstractDeviceComponentState,
        )?,
        SetArgument::ContextStates(states) => {
            push_states(&mut payload, field, states, OneOfFamily::AbstractContextState)?
        }
        SetArgument::AlertState(state) => payload.set(
            field,
            WireValue::Msg(state_to_one_of(state, OneOfFamily::AbstractAlertState)?),
        ),
    }
    Ok(request(action.name(), payload))
}

fn read_states(payload: &WireMessage, field: &str) -> Result<Vec<PmObject>> {
    payload
        .repeated_msgs(field)?
        .into_iter()
        .map(state_from_p)
        .collect()
}

/// Operation handle and argument of a set request.
pub fn read_set_request(request: &WireMessage) -> Result<(SetAction, String, SetArgument)> {
    let action = match RequestKind::of_request(request)? {
        RequestKind::Set(action) => action,
        RequestKind::Get(action) => {
            return Err(Error::TypeMismatch {
                expected: "set request".to_string(),
                found: action.name().to_string(),
            })
        }
    };
    let payload = payload(request)?;
    let handle = payload
        .require_msg("abstract_set")?
        .require_msg("operation_handle_ref")?
        .str("string")
        .unwrap_or_default()
        .to_string();
    let field = argument_field(action);
    let argument = match action {
        SetAction::SetValue => SetArgument::Value(decimal_from_p(payload.require_msg(field)?)?),
        SetAction::SetString => SetArgument::String(
            payload
                .str(field)
                .ok_or_else(|| payload.missing(field))?
                .to_string(),
        ),
        SetAction::Activate => SetArgument::Activate(
            payload
                .repeated_msgs(field)?
                .into_iter()
                .map(|a| a.str("arg_value").unwrap_or_default().to_string())
                .collect(),
        ),
        SetAction::SetMetricState => SetArgument::MetricStates(read_states(payload, field)?),
        SetAction::SetComponentState => SetArgument::ComponentStates(read_states(payload, field)?),
        SetAction::SetContextState => SetArgument::ContextStates(read_states(payload, field)?),
        SetAction::SetAlertState => {
            SetArgument::AlertState(state_from_p(payload.require_msg(field)?)?)
        }
    };
    Ok((action, handle, argument))
}

/// Handle named by a set request, without decoding the argument.
pub fn set_request_handle(request: &WireMessage) -> Option<&str> {
    request
        .msg("payload")?
        .msg("abstract_set")?
        .msg("operation_handle_ref")?
        .str("string")
}

pub fn set_response(
    request: &WireMessage,
    action: SetAction,
    info: &InvocationInfo,
    group: &MdibVersionGroup,
) -> Result<WireMessage> {
    let abstract_set_response = WireMessage::new("AbstractSetResponseMsg")
        .with(VERSION_GROUP, WireValue::Msg(mdib_version_group_to_p(group)))
        .with("invocation_info", WireValue::Msg(info.to_p()?));
    let payload = WireMessage::new(format!("{}ResponseMsg", action.name()))
        .with("abstract_set_response", WireValue::Msg(abstract_set_response));
    Ok(response(request, action.name(), payload))
}

/// Invocation info and version group of a set response.
pub fn read_set_response(response: &WireMessage) -> Result<(InvocationInfo, MdibVersionGroup)> {
    let inner = payload(response)?.require_msg("abstract_set_response")?;
    let info = InvocationInfo::from_p(inner.require_msg("invocation_info")?)?;
    let group = inner
        .msg(VERSION_GROUP)
        .map(mdib_version_group_from_p)
        .unwrap_or_default();
    Ok((info, group))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{InvocationError, InvocationState};
    use crate::pm::{states, Decimal, PmObject};

    #[test]
    fn test_set_value_request_roundtrip() {
        let value: Decimal = "-12.50".parse().expect("decimal");
        let request = set_request("op.set", &SetArgument::Value(value.clone())).expect("request");
        assert_eq!(request.type_name(), "SetValueRequest");
        assert_eq!(set_request_handle(&request), Some("op.set"));
        let (action, handle, argument) = read_set_request(&request).expect("read");
        assert_eq!(action, SetAction::SetValue);
        assert_eq!(handle, "op.set");
        assert_eq!(argument, SetArgument::Value(value));
    }

    #[test]
    fn test_context_request_keeps_states() {
        let state = PmObject::new(&states::PATIENT_CONTEXT_STATE)
            .with("DescriptorHandle", "pat")
            .and_then(|o| o.with("Handle", "pat.1"))
            .expect("state");
        let request =
            set_request("op.ctx", &SetArgument::ContextStates(vec![state.clone()])).expect("request");
        let (_, _, argument) = read_set_request(&request).expect("read");
        assert_eq!(argument, SetArgument::ContextStates(vec![state]));
    }

    #[test]
    fn test_response_relates_to_request() {
        let request = get_request(GetAction::GetMdState, &["m1".to_string()]);
        assert_eq!(requested_handles(&request).expect("handles"), vec!["m1"]);
        let group = MdibVersionGroup::new(3, "urn:uuid:s", Some(1));
        let response = get_response(&request, GetAction::GetMdState, &group, vec![]);
        assert_eq!(response.type_name(), "GetMdStateResponse");
        assert_eq!(relates_id(&response), message_id(&request));
        assert_eq!(get_response_version_group(&response).expect("group"), group);
    }

    #[test]
    fn test_set_response_carries_failure() {
        let request = set_request("x", &SetArgument::String("a".into())).expect("request");
        let info = InvocationInfo::failed(9, InvocationError::InvalidValue, "bad");
        let group = MdibVersionGroup::new(2, "urn:uuid:s", None);
        let response = set_response(&request, SetAction::SetString, &info, &group).expect("response");
        let (back, back_group) = read_set_response(&response).expect("read");
        assert_eq!(back.invocation_state, InvocationState::Failed);
        assert_eq!(back, info);
        assert_eq!(back_group, group);
    }

    #[test]
    fn test_unknown_request_type() {
        assert!(RequestKind::of_request(&WireMessage::new("FooRequest")).is_err());
        assert_eq!(
            RequestKind::of_request(&get_request(GetAction::GetMdib, &[])).expect("kind"),
            RequestKind::Get(GetAction::GetMdib)
        );
    }
}
