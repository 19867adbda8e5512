// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enumerations of the participant model and of the message model.

use super::class::EnumDesc;

pub static MEASUREMENT_VALIDITY: EnumDesc = EnumDesc {
    name: "MeasurementValidity",
    members: &[
        "Vld", "Vldated", "Ong", "Qst", "Calib", "Inv", "Oflw", "Uflw", "NA",
    ],
};

pub static GENERATION_MODE: EnumDesc = EnumDesc {
    name: "GenerationMode",
    members: &["Real", "Test", "Demo"],
};

pub static COMPONENT_ACTIVATION: EnumDesc = EnumDesc {
    name: "ComponentActivation",
    members: &["On", "NotRdy", "StndBy", "Off", "Shtdn", "Fail"],
};

pub static METRIC_CATEGORY: EnumDesc = EnumDesc {
    name: "MetricCategory",
    members: &["Unspec", "Msrmt", "Clc", "Set", "Preset", "Rcmm"],
};

pub static DERIVATION_METHOD: EnumDesc = EnumDesc {
    name: "DerivationMethod",
    members: &["Auto", "Man"],
};

pub static METRIC_AVAILABILITY: EnumDesc = EnumDesc {
    name: "MetricAvailability",
    members: &["Intr", "Cont"],
};

pub static SAFETY_CLASSIFICATION: EnumDesc = EnumDesc {
    name: "SafetyClassification",
    members: &["Inf", "MedA", "MedB", "MedC"],
};

pub static ALERT_ACTIVATION: EnumDesc = EnumDesc {
    name: "AlertActivation",
    members: &["On", "Off", "Psd"],
};

pub static ALERT_CONDITION_KIND: EnumDesc = EnumDesc {
    name: "AlertConditionKind",
    members: &["Phy", "Tec", "Oth"],
};

pub static ALERT_CONDITION_PRIORITY: EnumDesc = EnumDesc {
    name: "AlertConditionPriority",
    members: &["Lo", "Me", "Hi", "None"],
};

pub static ALERT_CONDITION_MONITORED_LIMITS: EnumDesc = EnumDesc {
    name: "AlertConditionMonitoredLimits",
    members: &["All", "LoOff", "HiOff", "None"],
};

pub static ALERT_SIGNAL_MANIFESTATION: EnumDesc = EnumDesc {
    name: "AlertSignalManifestation",
    members: &["Aud", "Vis", "Tan", "Oth"],
};

pub static ALERT_SIGNAL_PRESENCE: EnumDesc = EnumDesc {
    name: "AlertSignalPresence",
    members: &["On", "Off", "Latch", "Ack"],
};

pub static ALERT_SIGNAL_PRIMARY_LOCATION: EnumDesc = EnumDesc {
    name: "AlertSignalPrimaryLocation",
    members: &["Loc", "Rem"],
};

pub static CONTEXT_ASSOCIATION: EnumDesc = EnumDesc {
    name: "ContextAssociation",
    members: &["No", "Pre", "Assoc", "Dis"],
};

pub static OPERATING_MODE: EnumDesc = EnumDesc {
    name: "OperatingMode",
    members: &["Dis", "En", "NA"],
};

pub static MDS_OPERATING_MODE: EnumDesc = EnumDesc {
    name: "MdsOperatingMode",
    members: &["Nml", "Dmo", "Srv", "Mtn"],
};

pub static SEX: EnumDesc = EnumDesc {
    name: "Sex",
    members: &["Unspec", "M", "F", "Unkn"],
};

pub static PATIENT_TYPE: EnumDesc = EnumDesc {
    name: "PatientType",
    members: &["Unspec", "Ad", "Ado", "Ped", "Inf", "Neo", "Oth"],
};

pub static TEXT_WIDTH: EnumDesc = EnumDesc {
    name: "LocalizedTextWidth",
    members: &["xs", "s", "m", "l", "xl", "xxl"],
};

pub static KIND_OF_RELATION: EnumDesc = EnumDesc {
    name: "Kind",
    members: &["Rcm", "PS", "SST", "ECE", "DCE", "Oth"],
};

pub static CALIBRATION_STATE: EnumDesc = EnumDesc {
    name: "CalibrationState",
    members: &["No", "Req", "Run", "Cal", "Oth"],
};

pub static CHARGE_STATUS: EnumDesc = EnumDesc {
    name: "ChargeStatus",
    members: &["Ful", "ChBa", "DisChBa", "DEB"],
};

// ===== message model =====

pub static INVOCATION_STATE: EnumDesc = EnumDesc {
    name: "InvocationState",
    members: &["Wait", "Start", "Cnclld", "CnclldMan", "Fin", "FinMod", "Fail"],
};

pub static INVOCATION_ERROR: EnumDesc = EnumDesc {
    name: "InvocationError",
    members: &["Unspec", "Unkn", "Inv", "Oth"],
};

pub static DESCRIPTION_MODIFICATION_TYPE: EnumDesc = EnumDesc {
    name: "DescriptionModificationType",
    members: &["Crt", "Upt", "Del"],
};
