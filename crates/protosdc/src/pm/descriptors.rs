// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor classes.
//!
//! Child descriptors (channels of a vmd, metrics of a channel, ...) are
//! not properties here: the tree is stored flat with parent handles and
//! assembled into the nested wire shape by [`crate::reader`].

use super::class::{opt, req, PmClass, PropKind::*, ScalarKind::*};
use super::enums::*;
use super::types::*;

pub static ABSTRACT_DESCRIPTOR: PmClass = PmClass {
    name: "AbstractDescriptor",
    parent: None,
    msg: "AbstractDescriptorMsg",
    props: &[
        opt("Type", Node(&CODED_VALUE)),
        req("Handle", Attr(Handle)),
        opt("DescriptorVersion", Attr(VersionCounter)),
        opt("SafetyClassification", Attr(Enum(&SAFETY_CLASSIFICATION))),
    ],
};

// ---- components ----

pub static ABSTRACT_DEVICE_COMPONENT_DESCRIPTOR: PmClass = PmClass {
    name: "AbstractDeviceComponentDescriptor",
    parent: Some(&ABSTRACT_DESCRIPTOR),
    msg: "AbstractDeviceComponentDescriptorMsg",
    props: &[opt(
        "ProductionSpecification",
        NodeList(&PRODUCTION_SPECIFICATION),
    )],
};

pub static ABSTRACT_COMPLEX_DEVICE_COMPONENT_DESCRIPTOR: PmClass = PmClass {
    name: "AbstractComplexDeviceComponentDescriptor",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_DESCRIPTOR),
    msg: "AbstractComplexDeviceComponentDescriptorMsg",
    props: &[],
};

pub static MDS_DESCRIPTOR: PmClass = PmClass {
    name: "MdsDescriptor",
    parent: Some(&ABSTRACT_COMPLEX_DEVICE_COMPONENT_DESCRIPTOR),
    msg: "MdsDescriptorMsg",
    props: &[opt("MetaData", Node(&META_DATA))],
};

pub static VMD_DESCRIPTOR: PmClass = PmClass {
    name: "VmdDescriptor",
    parent: Some(&ABSTRACT_COMPLEX_DEVICE_COMPONENT_DESCRIPTOR),
    msg: "VmdDescriptorMsg",
    props: &[],
};

pub static CHANNEL_DESCRIPTOR: PmClass = PmClass {
    name: "ChannelDescriptor",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_DESCRIPTOR),
    msg: "ChannelDescriptorMsg",
    props: &[],
};

pub static SCO_DESCRIPTOR: PmClass = PmClass {
    name: "ScoDescriptor",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_DESCRIPTOR),
    msg: "ScoDescriptorMsg",
    props: &[],
};

pub static CLOCK_DESCRIPTOR: PmClass = PmClass {
    name: "ClockDescriptor",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_DESCRIPTOR),
    msg: "ClockDescriptorMsg",
    props: &[
        opt("TimeProtocol", NodeList(&CODED_VALUE)),
        opt("Resolution", Attr(Duration)),
    ],
};

pub static BATTERY_DESCRIPTOR: PmClass = PmClass {
    name: "BatteryDescriptor",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_DESCRIPTOR),
    msg: "BatteryDescriptorMsg",
    props: &[
        opt("CapacityFullCharge", Node(&MEASUREMENT)),
        opt("CapacitySpecified", Node(&MEASUREMENT)),
        opt("VoltageSpecified", Node(&MEASUREMENT)),
    ],
};

pub static SYSTEM_CONTEXT_DESCRIPTOR: PmClass = PmClass {
    name: "SystemContextDescriptor",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_DESCRIPTOR),
    msg: "SystemContextDescriptorMsg",
    props: &[],
};

// ---- contexts ----

pub static ABSTRACT_CONTEXT_DESCRIPTOR: PmClass = PmClass {
    name: "AbstractContextDescriptor",
    parent: Some(&ABSTRACT_DESCRIPTOR),
    msg: "AbstractContextDescriptorMsg",
    props: &[],
};

pub static PATIENT_CONTEXT_DESCRIPTOR: PmClass = PmClass {
    name: "PatientContextDescriptor",
    parent: Some(&ABSTRACT_CONTEXT_DESCRIPTOR),
    msg: "PatientContextDescriptorMsg",
    props: &[],
};

pub static LOCATION_CONTEXT_DESCRIPTOR: PmClass = PmClass {
    name: "LocationContextDescriptor",
    parent: Some(&ABSTRACT_CONTEXT_DESCRIPTOR),
    msg: "LocationContextDescriptorMsg",
    props: &[],
};

pub static WORKFLOW_CONTEXT_DESCRIPTOR: PmClass = PmClass {
    name: "WorkflowContextDescriptor",
    parent: Some(&ABSTRACT_CONTEXT_DESCRIPTOR),
    msg: "WorkflowContextDescriptorMsg",
    props: &[],
};

pub static OPERATOR_CONTEXT_DESCRIPTOR: PmClass = PmClass {
    name: "OperatorContextDescriptor",
    parent: Some(&ABSTRACT_CONTEXT_DESCRIPTOR),
    msg: "OperatorContextDescriptorMsg",
    props: &[],
};

pub static MEANS_CONTEXT_DESCRIPTOR: PmClass = PmClass {
    name: "MeansContextDescriptor",
    parent: Some(&ABSTRACT_CONTEXT_DESCRIPTOR),
    msg: "MeansContextDescriptorMsg",
    props: &[],
};

pub static ENSEMBLE_CONTEXT_DESCRIPTOR: PmClass = PmClass {
    name: "EnsembleContextDescriptor",
    parent: Some(&ABSTRACT_CONTEXT_DESCRIPTOR),
    msg: "EnsembleContextDescriptorMsg",
    props: &[],
};

// ---- metrics ----

pub static ABSTRACT_METRIC_DESCRIPTOR: PmClass = PmClass {
    name: "AbstractMetricDescriptor",
    parent: Some(&ABSTRACT_DESCRIPTOR),
    msg: "AbstractMetricDescriptorMsg",
    props: &[
        req("Unit", Node(&CODED_VALUE)),
        opt("BodySite", NodeList(&CODED_VALUE)),
        opt("Relation", NodeList(&RELATION)),
        req("MetricCategory", Attr(Enum(&METRIC_CATEGORY))),
        opt("DerivationMethod", Attr(Enum(&DERIVATION_METHOD))),
        req("MetricAvailability", Attr(Enum(&METRIC_AVAILABILITY))),
        opt("MaxMeasurementTime", Attr(Duration)),
        opt("MaxDelayTime", Attr(Duration)),
        opt("DeterminationPeriod", Attr(Duration)),
        opt("LifeTimePeriod", Attr(Duration)),
        opt("ActivationDuration", Attr(Duration)),
    ],
};

pub static NUMERIC_METRIC_DESCRIPTOR: PmClass = PmClass {
    name: "NumericMetricDescriptor",
    parent: Some(&ABSTRACT_METRIC_DESCRIPTOR),
    msg: "NumericMetricDescriptorMsg",
    props: &[
        opt("TechnicalRange", NodeList(&RANGE)),
        req("Resolution", Attr(Decimal)),
        opt("AveragingPeriod", Attr(Duration)),
    ],
};

pub static STRING_METRIC_DESCRIPTOR: PmClass = PmClass {
    name: "StringMetricDescriptor",
    parent: Some(&ABSTRACT_METRIC_DESCRIPTOR),
    msg: "StringMetricDescriptorMsg",
    props: &[],
};

pub static ENUM_STRING_METRIC_DESCRIPTOR: PmClass = PmClass {
    name: "EnumStringMetricDescriptor",
    parent: Some(&STRING_METRIC_DESCRIPTOR),
    msg: "EnumStringMetricDescriptorMsg",
    props: &[opt("AllowedValue", NodeList(&ALLOWED_VALUE))],
};

pub static REAL_TIME_SAMPLE_ARRAY_METRIC_DESCRIPTOR: PmClass = PmClass {
    name: "RealTimeSampleArrayMetricDescriptor",
    parent: Some(&ABSTRACT_METRIC_DESCRIPTOR),
    msg: "RealTimeSampleArrayMetricDescriptorMsg",
    props: &[
        opt("TechnicalRange", NodeList(&RANGE)),
        req("Resolution", Attr(Decimal)),
        req("SamplePeriod", Attr(Duration)),
    ],
};

pub static DISTRIBUTION_SAMPLE_ARRAY_METRIC_DESCRIPTOR: PmClass = PmClass {
    name: "DistributionSampleArrayMetricDescriptor",
    parent: Some(&ABSTRACT_METRIC_DESCRIPTOR),
    msg: "DistributionSampleArrayMetricDescriptorMsg",
    props: &[
        opt("TechnicalRange", NodeList(&RANGE)),
        req("DomainUnit", Node(&CODED_VALUE)),
        req("DistributionRange", Node(&RANGE)),
        req("Resolution", Attr(Decimal)),
    ],
};

// ---- operations ----

pub static ABSTRACT_OPERATION_DESCRIPTOR: PmClass = PmClass {
    name: "AbstractOperationDescriptor",
    parent: Some(&ABSTRACT_DESCRIPTOR),
    msg: "AbstractOperationDescriptorMsg",
    props: &[
        req("OperationTarget", Attr(HandleRef)),
        opt("MaxTimeToFinish", Attr(Duration)),
        opt("InvocationEffectiveTimeout", Attr(Duration)),
        opt("Retriggerable", Attr(Bool)),
    ],
};

pub static ABSTRACT_SET_STATE_OPERATION_DESCRIPTOR: PmClass = PmClass {
    name: "AbstractSetStateOperationDescriptor",
    parent: Some(&ABSTRACT_OPERATION_DESCRIPTOR),
    msg: "AbstractSetStateOperationDescriptorMsg",
    props: &[opt("ModifiableData", TextList)],
};

pub static SET_VALUE_OPERATION_DESCRIPTOR: PmClass = PmClass {
    name: "SetValueOperationDescriptor",
    parent: Some(&ABSTRACT_OPERATION_DESCRIPTOR),
    msg: "SetValueOperationDescriptorMsg",
    props: &[],
};

pub static SET_STRING_OPERATION_DESCRIPTOR: PmClass = PmClass {
    name: "SetStringOperationDescriptor",
    parent: Some(&ABSTRACT_OPERATION_DESCRIPTOR),
    msg: "SetStringOperationDescriptorMsg",
    props: &[opt("MaxLength", Attr(Int))],
};

pub static ACTIVATE_OPERATION_DESCRIPTOR: PmClass = PmClass {
    name: "ActivateOperationDescriptor",
    parent: Some(&ABSTRACT_SET_STATE_OPERATION_DESCRIPTOR),
    msg: "ActivateOperationDescriptorMsg",
    props: &[opt(
        "Argument",
        NodeList(&ACTIVATE_OPERATION_DESCRIPTOR_ARGUMENT),
    )],
};

pub static SET_CONTEXT_STATE_OPERATION_DESCRIPTOR: PmClass = PmClass {
    name: "SetContextStateOperationDescriptor",
    parent: Some(&ABSTRACT_SET_STATE_OPERATION_DESCRIPTOR),
    msg: "SetContextStateOperationDescriptorMsg",
    props: &[],
};

pub static SET_METRIC_STATE_OPERATION_DESCRIPTOR: PmClass = PmClass {
    name: "SetMetricStateOperationDescriptor",
    parent: Some(&ABSTRACT_SET_STATE_OPERATION_DESCRIPTOR),
    msg: "SetMetricStateOperationDescriptorMsg",
    props: &[],
};

pub static SET_COMPONENT_STATE_OPERATION_DESCRIPTOR: PmClass = PmClass {
    name: "SetComponentStateOperationDescriptor",
    parent: Some(&ABSTRACT_SET_STATE_OPERATION_DESCRIPTOR),
    msg: "SetComponentStateOperationDescriptorMsg",
    props: &[],
};

pub static SET_ALERT_STATE_OPERATION_DESCRIPTOR: PmClass = PmClass {
    name: "SetAlertStateOperationDescriptor",
    parent: Some(&ABSTRACT_SET_STATE_OPERATION_DESCRIPTOR),
    msg: "SetAlertStateOperationDescriptorMsg",
    props: &[],
};

// ---- alerts ----

pub static ABSTRACT_ALERT_DESCRIPTOR: PmClass = PmClass {
    name: "AbstractAlertDescriptor",
    parent: Some(&ABSTRACT_DESCRIPTOR),
    msg: "AbstractAlertDescriptorMsg",
    props: &[],
};

pub static ALERT_SYSTEM_DESCRIPTOR: PmClass = PmClass {
    name: "AlertSystemDescriptor",
    parent: Some(&ABSTRACT_ALERT_DESCRIPTOR),
    msg: "AlertSystemDescriptorMsg",
    props: &[
        opt("MaxPhysiologicalParallelAlarms", Attr(UInt)),
        opt("MaxTechnicalParallelAlarms", Attr(UInt)),
        opt("SelfCheckPeriod", Attr(Duration)),
    ],
};

pub static ALERT_CONDITION_DESCRIPTOR: PmClass = PmClass {
    name: "AlertConditionDescriptor",
    parent: Some(&ABSTRACT_ALERT_DESCRIPTOR),
    msg: "AlertConditionDescriptorMsg",
    props: &[
        opt("Source", HandleRefElementList),
        opt("CauseInfo", NodeList(&CAUSE_INFO)),
        req("Kind", Attr(Enum(&ALERT_CONDITION_KIND))),
        req("Priority", Attr(Enum(&ALERT_CONDITION_PRIORITY))),
        opt("DefaultConditionGenerationDelay", Attr(Duration)),
    ],
};

pub static LIMIT_ALERT_CONDITION_DESCRIPTOR: PmClass = PmClass {
    name: "LimitAlertConditionDescriptor",
    parent: Some(&ALERT_CONDITION_DESCRIPTOR),
    msg: "LimitAlertConditionDescriptorMsg",
    props: &[
        req("MaxLimits", Node(&RANGE)),
        opt("AutoLimitSupported", Attr(Bool)),
    ],
};

pub static ALERT_SIGNAL_DESCRIPTOR: PmClass = PmClass {
    name: "AlertSignalDescriptor",
    parent: Some(&ABSTRACT_ALERT_DESCRIPTOR),
    msg: "AlertSignalDescriptorMsg",
    props: &[
        opt("ConditionSignaled", Attr(HandleRef)),
        req("Manifestation", Attr(Enum(&ALERT_SIGNAL_MANIFESTATION))),
        req("Latching", Attr(Bool)),
        opt("DefaultSignalGenerationDelay", Attr(Duration)),
        opt("MinSignalGenerationDelay", Attr(Duration)),
        opt("MaxSignalGenerationDelay", Attr(Duration)),
        opt("SignalDelegationSupported", Attr(Bool)),
        opt("AcknowledgementSupported", Attr(Bool)),
        opt("AcknowledgeTimeout", Attr(Duration)),
    ],
};

/// Concrete descriptor classes.
pub static CONCRETE: &[&PmClass] = &[
    &MDS_DESCRIPTOR,
    &VMD_DESCRIPTOR,
    &CHANNEL_DESCRIPTOR,
    &SCO_DESCRIPTOR,
    &CLOCK_DESCRIPTOR,
    &BATTERY_DESCRIPTOR,
    &SYSTEM_CONTEXT_DESCRIPTOR,
    &PATIENT_CONTEXT_DESCRIPTOR,
    &LOCATION_CONTEXT_DESCRIPTOR,
    &WORKFLOW_CONTEXT_DESCRIPTOR,
    &OPERATOR_CONTEXT_DESCRIPTOR,
    &MEANS_CONTEXT_DESCRIPTOR,
    &ENSEMBLE_CONTEXT_DESCRIPTOR,
    &NUMERIC_METRIC_DESCRIPTOR,
    &STRING_METRIC_DESCRIPTOR,
    &ENUM_STRING_METRIC_DESCRIPTOR,
    &REAL_TIME_SAMPLE_ARRAY_METRIC_DESCRIPTOR,
    &DISTRIBUTION_SAMPLE_ARRAY_METRIC_DESCRIPTOR,
    &SET_VALUE_OPERATION_DESCRIPTOR,
    &SET_STRING_OPERATION_DESCRIPTOR,
    &ACTIVATE_OPERATION_DESCRIPTOR,
    &SET_CONTEXT_STATE_OPERATION_DESCRIPTOR,
    &SET_METRIC_STATE_OPERATION_DESCRIPTOR,
    &SET_COMPONENT_STATE_OPERATION_DESCRIPTOR,
    &SET_ALERT_STATE_OPERATION_DESCRIPTOR,
    &ALERT_SYSTEM_DESCRIPTOR,
    &ALERT_CONDITION_DESCRIPTOR,
    &LIMIT_ALERT_CONDITION_DESCRIPTOR,
    &ALERT_SIGNAL_DESCRIPTOR,
];
