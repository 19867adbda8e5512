// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! State classes.

use super::class::{opt, req, PmClass, PropKind::*, ScalarKind::*};
use super::enums::*;
use super::types::*;

pub static ABSTRACT_STATE: PmClass = PmClass {
    name: "AbstractState",
    parent: None,
    msg: "AbstractStateMsg",
    props: &[
        opt("StateVersion", Attr(VersionCounter)),
        req("DescriptorHandle", Attr(HandleRef)),
        opt("DescriptorVersion", Attr(ReferencedVersion)),
    ],
};

// ---- operations ----

pub static ABSTRACT_OPERATION_STATE: PmClass = PmClass {
    name: "AbstractOperationState",
    parent: Some(&ABSTRACT_STATE),
    msg: "AbstractOperationStateMsg",
    props: &[req("OperatingMode", Attr(Enum(&OPERATING_MODE)))],
};

pub static SET_VALUE_OPERATION_STATE: PmClass = PmClass {
    name: "SetValueOperationState",
    parent: Some(&ABSTRACT_OPERATION_STATE),
    msg: "SetValueOperationStateMsg",
    props: &[opt("AllowedRange", NodeList(&RANGE))],
};

pub static SET_STRING_OPERATION_STATE: PmClass = PmClass {
    name: "SetStringOperationState",
    parent: Some(&ABSTRACT_OPERATION_STATE),
    msg: "SetStringOperationStateMsg",
    props: &[opt("AllowedValues", Node(&ALLOWED_VALUES))],
};

pub static ACTIVATE_OPERATION_STATE: PmClass = PmClass {
    name: "ActivateOperationState",
    parent: Some(&ABSTRACT_OPERATION_STATE),
    msg: "ActivateOperationStateMsg",
    props: &[],
};

pub static SET_CONTEXT_STATE_OPERATION_STATE: PmClass = PmClass {
    name: "SetContextStateOperationState",
    parent: Some(&ABSTRACT_OPERATION_STATE),
    msg: "SetContextStateOperationStateMsg",
    props: &[],
};

pub static SET_METRIC_STATE_OPERATION_STATE: PmClass = PmClass {
    name: "SetMetricStateOperationState",
    parent: Some(&ABSTRACT_OPERATION_STATE),
    msg: "SetMetricStateOperationStateMsg",
    props: &[],
};

pub static SET_COMPONENT_STATE_OPERATION_STATE: PmClass = PmClass {
    name: "SetComponentStateOperationState",
    parent: Some(&ABSTRACT_OPERATION_STATE),
    msg: "SetComponentStateOperationStateMsg",
    props: &[],
};

pub static SET_ALERT_STATE_OPERATION_STATE: PmClass = PmClass {
    name: "SetAlertStateOperationState",
    parent: Some(&ABSTRACT_OPERATION_STATE),
    msg: "SetAlertStateOperationStateMsg",
    props: &[],
};

// ---- metrics ----

pub static ABSTRACT_METRIC_STATE: PmClass = PmClass {
    name: "AbstractMetricState",
    parent: Some(&ABSTRACT_STATE),
    msg: "AbstractMetricStateMsg",
    props: &[
        opt("BodySite", NodeList(&CODED_VALUE)),
        opt("PhysicalConnector", Node(&PHYSICAL_CONNECTOR_INFO)),
        opt("ActivationState", Attr(Enum(&COMPONENT_ACTIVATION))),
        opt("ActiveDeterminationPeriod", Attr(Duration)),
        opt("LifeTimePeriod", Attr(Duration)),
    ],
};

pub static NUMERIC_METRIC_STATE: PmClass = PmClass {
    name: "NumericMetricState",
    parent: Some(&ABSTRACT_METRIC_STATE),
    msg: "NumericMetricStateMsg",
    props: &[
        opt("MetricValue", Node(&NUMERIC_METRIC_VALUE)),
        opt("PhysiologicalRange", NodeList(&RANGE)),
        opt("ActiveAveragingPeriod", Attr(Duration)),
    ],
};

pub static STRING_METRIC_STATE: PmClass = PmClass {
    name: "StringMetricState",
    parent: Some(&ABSTRACT_METRIC_STATE),
    msg: "StringMetricStateMsg",
    props: &[opt("MetricValue", Node(&STRING_METRIC_VALUE))],
};

pub static ENUM_STRING_METRIC_STATE: PmClass = PmClass {
    name: "EnumStringMetricState",
    parent: Some(&STRING_METRIC_STATE),
    msg: "EnumStringMetricStateMsg",
    props: &[],
};

pub static REAL_TIME_SAMPLE_ARRAY_METRIC_STATE: PmClass = PmClass {
    name: "RealTimeSampleArrayMetricState",
    parent: Some(&ABSTRACT_METRIC_STATE),
    msg: "RealTimeSampleArrayMetricStateMsg",
    props: &[
        opt("MetricValue", Node(&SAMPLE_ARRAY_VALUE)),
        opt("PhysiologicalRange", NodeList(&RANGE)),
    ],
};

pub static DISTRIBUTION_SAMPLE_ARRAY_METRIC_STATE: PmClass = PmClass {
    name: "DistributionSampleArrayMetricState",
    parent: Some(&ABSTRACT_METRIC_STATE),
    msg: "DistributionSampleArrayMetricStateMsg",
    props: &[
        opt("MetricValue", Node(&SAMPLE_ARRAY_VALUE)),
        opt("PhysiologicalRange", NodeList(&RANGE)),
    ],
};

// ---- components ----

pub static ABSTRACT_DEVICE_COMPONENT_STATE: PmClass = PmClass {
    name: "AbstractDeviceComponentState",
    parent: Some(&ABSTRACT_STATE),
    msg: "AbstractDeviceComponentStateMsg",
    props: &[
        opt("CalibrationInfo", Node(&CALIBRATION_INFO)),
        opt("NextCalibration", Node(&CALIBRATION_INFO)),
        opt("PhysicalConnector", Node(&PHYSICAL_CONNECTOR_INFO)),
        opt("ActivationState", Attr(Enum(&COMPONENT_ACTIVATION))),
        opt("OperatingHours", Attr(UInt)),
        opt("OperatingCycles", Attr(Int)),
    ],
};

pub static ABSTRACT_COMPLEX_DEVICE_COMPONENT_STATE: PmClass = PmClass {
    name: "AbstractComplexDeviceComponentState",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_STATE),
    msg: "AbstractComplexDeviceComponentStateMsg",
    props: &[],
};

pub static MDS_STATE: PmClass = PmClass {
    name: "MdsState",
    parent: Some(&ABSTRACT_COMPLEX_DEVICE_COMPONENT_STATE),
    msg: "MdsStateMsg",
    props: &[
        opt("OperatingJurisdiction", Node(&OPERATING_JURISDICTION)),
        opt("Lang", Attr(String)),
        opt("OperatingMode", Attr(Enum(&MDS_OPERATING_MODE))),
    ],
};

pub static VMD_STATE: PmClass = PmClass {
    name: "VmdState",
    parent: Some(&ABSTRACT_COMPLEX_DEVICE_COMPONENT_STATE),
    msg: "VmdStateMsg",
    props: &[opt("OperatingJurisdiction", Node(&OPERATING_JURISDICTION))],
};

pub static CHANNEL_STATE: PmClass = PmClass {
    name: "ChannelState",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_STATE),
    msg: "ChannelStateMsg",
    props: &[],
};

pub static SCO_STATE: PmClass = PmClass {
    name: "ScoState",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_STATE),
    msg: "ScoStateMsg",
    props: &[
        opt("OperationGroup", NodeList(&OPERATION_GROUP)),
        opt("InvocationRequested", HandleRefList),
        opt("InvocationRequired", HandleRefList),
    ],
};

pub static CLOCK_STATE: PmClass = PmClass {
    name: "ClockState",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_STATE),
    msg: "ClockStateMsg",
    props: &[
        opt("ActiveSyncProtocol", Node(&CODED_VALUE)),
        opt("ReferenceSource", TextList),
        opt("DateAndTime", Attr(Timestamp)),
        req("RemoteSync", Attr(Bool)),
        opt("Accuracy", Attr(Decimal)),
        opt("LastSet", Attr(Timestamp)),
        opt("TimeZone", Attr(String)),
        opt("CriticalUse", Attr(Bool)),
    ],
};

pub static SYSTEM_CONTEXT_STATE: PmClass = PmClass {
    name: "SystemContextState",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_STATE),
    msg: "SystemContextStateMsg",
    props: &[],
};

pub static BATTERY_STATE: PmClass = PmClass {
    name: "BatteryState",
    parent: Some(&ABSTRACT_DEVICE_COMPONENT_STATE),
    msg: "BatteryStateMsg",
    props: &[
        opt("CapacityRemaining", Node(&MEASUREMENT)),
        opt("Voltage", Node(&MEASUREMENT)),
        opt("Current", Node(&MEASUREMENT)),
        opt("Temperature", Node(&MEASUREMENT)),
        opt("RemainingBatteryTime", Node(&MEASUREMENT)),
        opt("ChargeStatus", Attr(Enum(&CHARGE_STATUS))),
        opt("ChargeCycles", Attr(UInt)),
    ],
};

// ---- alerts ----

pub static ABSTRACT_ALERT_STATE: PmClass = PmClass {
    name: "AbstractAlertState",
    parent: Some(&ABSTRACT_STATE),
    msg: "AbstractAlertStateMsg",
    props: &[req("ActivationState", Attr(Enum(&ALERT_ACTIVATION)))],
};

pub static ALERT_SYSTEM_STATE: PmClass = PmClass {
    name: "AlertSystemState",
    parent: Some(&ABSTRACT_ALERT_STATE),
    msg: "AlertSystemStateMsg",
    props: &[
        opt("SystemSignalActivation", NodeList(&SYSTEM_SIGNAL_ACTIVATION)),
        opt("LastSelfCheck", Attr(Timestamp)),
        opt("SelfCheckCount", Attr(Int)),
        opt("PresentPhysiologicalAlarmConditions", HandleRefList),
        opt("PresentTechnicalAlarmConditions", HandleRefList),
    ],
};

pub static ALERT_SIGNAL_STATE: PmClass = PmClass {
    name: "AlertSignalState",
    parent: Some(&ABSTRACT_ALERT_STATE),
    msg: "AlertSignalStateMsg",
    props: &[
        opt("ActualSignalGenerationDelay", Attr(Duration)),
        opt("Presence", Attr(Enum(&ALERT_SIGNAL_PRESENCE))),
        opt("Location", Attr(Enum(&ALERT_SIGNAL_PRIMARY_LOCATION))),
        opt("Slot", Attr(UInt)),
    ],
};

pub static ALERT_CONDITION_STATE: PmClass = PmClass {
    name: "AlertConditionState",
    parent: Some(&ABSTRACT_ALERT_STATE),
    msg: "AlertConditionStateMsg",
    props: &[
        opt("ActualConditionGenerationDelay", Attr(Duration)),
        opt("ActualPriority", Attr(Enum(&ALERT_CONDITION_PRIORITY))),
        opt("Rank", Attr(Int)),
        opt("Presence", Attr(Bool)),
        opt("DeterminationTime", Attr(Timestamp)),
    ],
};

pub static LIMIT_ALERT_CONDITION_STATE: PmClass = PmClass {
    name: "LimitAlertConditionState",
    parent: Some(&ALERT_CONDITION_STATE),
    msg: "LimitAlertConditionStateMsg",
    props: &[
        req("Limits", Node(&RANGE)),
        req(
            "MonitoredAlertLimits",
            Attr(Enum(&ALERT_CONDITION_MONITORED_LIMITS)),
        ),
        opt("AutoLimitActivationState", Attr(Enum(&ALERT_ACTIVATION))),
    ],
};

// ---- contexts ----

pub static ABSTRACT_MULTI_STATE: PmClass = PmClass {
    name: "AbstractMultiState",
    parent: Some(&ABSTRACT_STATE),
    msg: "AbstractMultiStateMsg",
    props: &[
        opt("Category", Node(&CODED_VALUE)),
        req("Handle", Attr(Handle)),
    ],
};

pub static ABSTRACT_CONTEXT_STATE: PmClass = PmClass {
    name: "AbstractContextState",
    parent: Some(&ABSTRACT_MULTI_STATE),
    msg: "AbstractContextStateMsg",
    props: &[
        opt("Validator", NodeList(&INSTANCE_IDENTIFIER)),
        opt("Identification", NodeList(&INSTANCE_IDENTIFIER)),
        opt("ContextAssociation", Attr(Enum(&CONTEXT_ASSOCIATION))),
        opt("BindingMdibVersion", Attr(ReferencedVersion)),
        opt("UnbindingMdibVersion", Attr(ReferencedVersion)),
        opt("BindingStartTime", Attr(Timestamp)),
        opt("BindingEndTime", Attr(Timestamp)),
    ],
};

pub static PATIENT_CONTEXT_STATE: PmClass = PmClass {
    name: "PatientContextState",
    parent: Some(&ABSTRACT_CONTEXT_STATE),
    msg: "PatientContextStateMsg",
    props: &[opt("CoreData", Node(&PATIENT_DEMOGRAPHICS_CORE_DATA))],
};

pub static LOCATION_CONTEXT_STATE: PmClass = PmClass {
    name: "LocationContextState",
    parent: Some(&ABSTRACT_CONTEXT_STATE),
    msg: "LocationContextStateMsg",
    props: &[opt("LocationDetail", Node(&LOCATION_DETAIL))],
};

pub static WORKFLOW_CONTEXT_STATE: PmClass = PmClass {
    name: "WorkflowContextState",
    parent: Some(&ABSTRACT_CONTEXT_STATE),
    msg: "WorkflowContextStateMsg",
    props: &[opt("WorkflowDetail", Node(&WORKFLOW_DETAIL))],
};

pub static OPERATOR_CONTEXT_STATE: PmClass = PmClass {
    name: "OperatorContextState",
    parent: Some(&ABSTRACT_CONTEXT_STATE),
    msg: "OperatorContextStateMsg",
    props: &[opt("OperatorDetails", Node(&BASE_DEMOGRAPHICS))],
};

pub static MEANS_CONTEXT_STATE: PmClass = PmClass {
    name: "MeansContextState",
    parent: Some(&ABSTRACT_CONTEXT_STATE),
    msg: "MeansContextStateMsg",
    props: &[],
};

pub static ENSEMBLE_CONTEXT_STATE: PmClass = PmClass {
    name: "EnsembleContextState",
    parent: Some(&ABSTRACT_CONTEXT_STATE),
    msg: "EnsembleContextStateMsg",
    props: &[],
};

/// Concrete state classes.
pub static CONCRETE: &[&PmClass] = &[
    &SET_VALUE_OPERATION_STATE,
    &SET_STRING_OPERATION_STATE,
    &ACTIVATE_OPERATION_STATE,
    &SET_CONTEXT_STATE_OPERATION_STATE,
    &SET_METRIC_STATE_OPERATION_STATE,
    &SET_COMPONENT_STATE_OPERATION_STATE,
    &SET_ALERT_STATE_OPERATION_STATE,
    &NUMERIC_METRIC_STATE,
    &STRING_METRIC_STATE,
    &ENUM_STRING_METRIC_STATE,
    &REAL_TIME_SAMPLE_ARRAY_METRIC_STATE,
    &DISTRIBUTION_SAMPLE_ARRAY_METRIC_STATE,
    &MDS_STATE,
    &VMD_STATE,
    &CHANNEL_STATE,
    &SCO_STATE,
    &CLOCK_STATE,
    &SYSTEM_CONTEXT_STATE,
    &BATTERY_STATE,
    &ALERT_SYSTEM_STATE,
    &ALERT_SIGNAL_STATE,
    &ALERT_CONDITION_STATE,
    &LIMIT_ALERT_CONDITION_STATE,
    &PATIENT_CONTEXT_STATE,
    &LOCATION_CONTEXT_STATE,
    &WORKFLOW_CONTEXT_STATE,
    &OPERATOR_CONTEXT_STATE,
    &MEANS_CONTEXT_STATE,
    &ENSEMBLE_CONTEXT_STATE,
];
