// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged-union families.
//!
//! Every union on the wire is `{Base}OneOfMsg` with one field per
//! concrete class of the family, named after the class. Exactly one
//! field is populated.

use super::naming::name_to_p;
use crate::error::{Error, Result};
use crate::pm::{descriptors as d, states as s, types as t, PmClass};
use crate::wire::{WireMessage, WireValue, ONE_OF_SUFFIX};

/// A closed set of tagged-union families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OneOfFamily {
    AbstractDescriptor,
    AbstractMetricDescriptor,
    AbstractOperationDescriptor,
    AlertConditionDescriptor,
    AbstractState,
    AbstractMetricState,
    AbstractAlertState,
    AbstractContextState,
    AbstractDeviceComponentState,
    AbstractOperationState,
    InstanceIdentifier,
    PersonReference,
    BaseDemographics,
    PatientDemographicsCoreData,
}

const ALL_FAMILIES: [OneOfFamily; 14] = [
    OneOfFamily::AbstractDescriptor,
    OneOfFamily::AbstractMetricDescriptor,
    OneOfFamily::AbstractOperationDescriptor,
    OneOfFamily::AlertConditionDescriptor,
    OneOfFamily::AbstractState,
    OneOfFamily::AbstractMetricState,
    OneOfFamily::AbstractAlertState,
    OneOfFamily::AbstractContextState,
    OneOfFamily::AbstractDeviceComponentState,
    OneOfFamily::AbstractOperationState,
    OneOfFamily::InstanceIdentifier,
    OneOfFamily::PersonReference,
    OneOfFamily::BaseDemographics,
    OneOfFamily::PatientDemographicsCoreData,
];

impl OneOfFamily {
    /// Abstract base class of the family.
    pub fn base(&self) -> &'static PmClass {
        match self {
            Self::AbstractDescriptor => &d::ABSTRACT_DESCRIPTOR,
            Self::AbstractMetricDescriptor => &d::ABSTRACT_METRIC_DESCRIPTOR,
            Self::AbstractOperationDescriptor => &d::ABSTRACT_OPERATION_DESCRIPTOR,
            Self::AlertConditionDescriptor => &d::ALERT_CONDITION_DESCRIPTOR,
            Self::AbstractState => &s::ABSTRACT_STATE,
            Self::AbstractMetricState => &s::ABSTRACT_METRIC_STATE,
            Self::AbstractAlertState => &s::ABSTRACT_ALERT_STATE,
            Self::AbstractContextState => &s::ABSTRACT_CONTEXT_STATE,
            Self::AbstractDeviceComponentState => &s::ABSTRACT_DEVICE_COMPONENT_STATE,
            Self::AbstractOperationState => &s::ABSTRACT_OPERATION_STATE,
            Self::InstanceIdentifier => &t::INSTANCE_IDENTIFIER,
            Self::PersonReference => &t::PERSON_REFERENCE,
            Self::BaseDemographics => &t::BASE_DEMOGRAPHICS,
            Self::PatientDemographicsCoreData => &t::PATIENT_DEMOGRAPHICS_CORE_DATA,
        }
    }

    /// Wire message type of the union.
    pub fn type_name(&self) -> String {
        format!("{}{}", self.base().name, ONE_OF_SUFFIX)
    }

    /// Family of a union message type name.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let base = type_name.strip_suffix(ONE_OF_SUFFIX)?;
        ALL_FAMILIES.into_iter().find(|f| f.base().name == base)
    }

    /// Union family of a property declared with class `declared`.
    ///
    /// Property types with subclasses travel as unions; the descriptor
    /// and state families are only used by reports and the tree reader.
    pub fn for_declared(declared: &PmClass) -> Option<Self> {
        match declared.name {
            "InstanceIdentifier" => Some(Self::InstanceIdentifier),
            "PersonReference" => Some(Self::PersonReference),
            "BaseDemographics" => Some(Self::BaseDemographics),
            "PatientDemographicsCoreData" => Some(Self::PatientDemographicsCoreData),
            _ => None,
        }
    }

    /// Concrete classes that may populate the union.
    pub fn branches(&self) -> Vec<&'static PmClass> {
        let base = self.base();
        let candidates: &[&'static PmClass] = match self {
            Self::AbstractDescriptor
            | Self::AbstractMetricDescriptor
            | Self::AbstractOperationDescriptor
            | Self::AlertConditionDescriptor => d::CONCRETE,
            Self::AbstractState
            | Self::AbstractMetricState
            | Self::AbstractAlertState
            | Self::AbstractContextState
            | Self::AbstractDeviceComponentState
            | Self::AbstractOperationState => s::CONCRETE,
            Self::InstanceIdentifier
            | Self::PersonReference
            | Self::BaseDemographics
            | Self::PatientDemographicsCoreData => t::ALL,
        };
        candidates
            .iter()
            .copied()
            .filter(|c| c.is_subclass_of(base))
            .collect()
    }

    /// Check whether `class` is a branch of this family.
    pub fn accepts(&self, class: &PmClass) -> bool {
        class.is_subclass_of(self.base()) && !class.name.starts_with("Abstract")
    }

    /// Wrap an encoded concrete message into its branch.
    pub fn wrap(&self, class: &PmClass, msg: WireMessage) -> Result<WireMessage> {
        if !self.accepts(class) {
            return Err(Error::UnregisteredType(format!(
                "{} in {}",
                class.name,
                self.type_name()
            )));
        }
        Ok(WireMessage::new(self.type_name()).with(name_to_p(class.name), WireValue::Msg(msg)))
    }

    /// Resolve the populated branch into its class and message.
    pub fn unwrap<'a>(&self, p: &'a WireMessage) -> Result<(&'static PmClass, &'a WireMessage)> {
        let (field, inner) = populated_field(p)?;
        let class = self
            .branches()
            .into_iter()
            .find(|c| name_to_p(c.name) == field)
            .ok_or_else(|| {
                Error::UnregisteredType(format!("{}.{}", p.type_name(), field))
            })?;
        Ok((class, inner))
    }
}

fn populated_field(p: &WireMessage) -> Result<(&str, &WireMessage)> {
    let mut fields = p.fields();
    match (fields.next(), fields.next()) {
        (Some((name, WireValue::Msg(inner))), None) => Ok((name, inner)),
        (Some((_, other)), None) => Err(Error::TypeMismatch {
            expected: format!("message branch in {}", p.type_name()),
            found: other.shape().to_string(),
        }),
        _ => Err(Error::OneOfCount {
            message_type: p.type_name().to_string(),
            populated: p.len(),
        }),
    }
}

/// The single populated branch of a union; other messages are returned
/// as they are.
pub fn find_populated_one_of(p: &WireMessage) -> Result<&WireMessage> {
    if !p.is_one_of() {
        return Ok(p);
    }
    let (_, inner) = populated_field(p)?;
    find_populated_one_of(inner)
}
