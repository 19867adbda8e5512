// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property types: the building blocks of descriptors and states.

use super::class::{opt, req, PmClass, PropKind::*, ScalarKind::*};
use super::enums::*;

pub static LOCALIZED_TEXT: PmClass = PmClass {
    name: "LocalizedText",
    parent: None,
    msg: "LocalizedTextMsg",
    props: &[
        opt("Ref", Attr(LocalizedTextRef)),
        opt("Lang", Attr(String)),
        opt("Version", Attr(ReferencedVersion)),
        opt("TextWidth", Attr(Enum(&TEXT_WIDTH))),
        opt("text", Text),
    ],
};

pub static TRANSLATION: PmClass = PmClass {
    name: "Translation",
    parent: None,
    msg: "CodedValueMsg.TranslationMsg",
    props: &[
        req("Code", Attr(CodeIdentifier)),
        opt("CodingSystem", Attr(AnyUri)),
        opt("CodingSystemVersion", Attr(String)),
    ],
};

pub static CODED_VALUE: PmClass = PmClass {
    name: "CodedValue",
    parent: None,
    msg: "CodedValueMsg",
    props: &[
        opt("CodingSystemName", NodeList(&LOCALIZED_TEXT)),
        opt("ConceptDescription", NodeList(&LOCALIZED_TEXT)),
        opt("Translation", NodeList(&TRANSLATION)),
        req("Code", Attr(CodeIdentifier)),
        opt("CodingSystem", Attr(AnyUri)),
        opt("CodingSystemVersion", Attr(String)),
        opt("SymbolicCodeName", Attr(SymbolicCodeName)),
    ],
};

pub static INSTANCE_IDENTIFIER: PmClass = PmClass {
    name: "InstanceIdentifier",
    parent: None,
    msg: "InstanceIdentifierMsg",
    props: &[
        opt("Type", Node(&CODED_VALUE)),
        opt("IdentifierName", NodeList(&LOCALIZED_TEXT)),
        opt("Root", Attr(AnyUri)),
        opt("Extension", Attr(Extension)),
    ],
};

pub static OPERATING_JURISDICTION: PmClass = PmClass {
    name: "OperatingJurisdiction",
    parent: Some(&INSTANCE_IDENTIFIER),
    msg: "OperatingJurisdictionMsg",
    props: &[],
};

pub static RANGE: PmClass = PmClass {
    name: "Range",
    parent: None,
    msg: "RangeMsg",
    props: &[
        opt("Lower", Attr(Decimal)),
        opt("Upper", Attr(Decimal)),
        opt("StepWidth", Attr(Decimal)),
        opt("RelativeAccuracy", Attr(Decimal)),
        opt("AbsoluteAccuracy", Attr(Decimal)),
    ],
};

pub static MEASUREMENT: PmClass = PmClass {
    name: "Measurement",
    parent: None,
    msg: "MeasurementMsg",
    props: &[
        req("MeasurementUnit", Node(&CODED_VALUE)),
        req("MeasuredValue", Attr(Decimal)),
    ],
};

pub static ALLOWED_VALUE: PmClass = PmClass {
    name: "AllowedValue",
    parent: None,
    msg: "EnumStringMetricDescriptorMsg.AllowedValueMsg",
    props: &[
        req("Value", Text),
        opt("Type", Node(&CODED_VALUE)),
        opt("Identification", Node(&INSTANCE_IDENTIFIER)),
        opt("Characteristic", Node(&MEASUREMENT)),
    ],
};

pub static ALLOWED_VALUES: PmClass = PmClass {
    name: "AllowedValues",
    parent: None,
    msg: "SetStringOperationStateMsg.AllowedValuesMsg",
    props: &[opt("Value", TextList)],
};

pub static METRIC_QUALITY: PmClass = PmClass {
    name: "MetricQuality",
    parent: None,
    msg: "AbstractMetricValueMsg.MetricQualityMsg",
    props: &[
        req("Validity", Attr(Enum(&MEASUREMENT_VALIDITY))),
        opt("Mode", Attr(Enum(&GENERATION_MODE))),
        opt("Qi", Attr(QualityIndicator)),
    ],
};

pub static ANNOTATION: PmClass = PmClass {
    name: "Annotation",
    parent: None,
    msg: "AbstractMetricValueMsg.AnnotationMsg",
    props: &[req("Type", Node(&CODED_VALUE))],
};

pub static ABSTRACT_METRIC_VALUE: PmClass = PmClass {
    name: "AbstractMetricValue",
    parent: None,
    msg: "AbstractMetricValueMsg",
    props: &[
        req("MetricQuality", Node(&METRIC_QUALITY)),
        opt("Annotation", NodeList(&ANNOTATION)),
        opt("StartTime", Attr(Timestamp)),
        opt("StopTime", Attr(Timestamp)),
        opt("DeterminationTime", Attr(Timestamp)),
    ],
};

pub static NUMERIC_METRIC_VALUE: PmClass = PmClass {
    name: "NumericMetricValue",
    parent: Some(&ABSTRACT_METRIC_VALUE),
    msg: "NumericMetricValueMsg",
    props: &[opt("Value", Attr(Decimal))],
};

pub static STRING_METRIC_VALUE: PmClass = PmClass {
    name: "StringMetricValue",
    parent: Some(&ABSTRACT_METRIC_VALUE),
    msg: "StringMetricValueMsg",
    props: &[opt("Value", Attr(String))],
};

pub static APPLY_ANNOTATION: PmClass = PmClass {
    name: "ApplyAnnotation",
    parent: None,
    msg: "SampleArrayValueMsg.ApplyAnnotationMsg",
    props: &[
        req("AnnotationIndex", Attr(UInt)),
        req("SampleIndex", Attr(UInt)),
    ],
};

pub static SAMPLE_ARRAY_VALUE: PmClass = PmClass {
    name: "SampleArrayValue",
    parent: Some(&ABSTRACT_METRIC_VALUE),
    msg: "SampleArrayValueMsg",
    props: &[
        opt("ApplyAnnotation", NodeList(&APPLY_ANNOTATION)),
        opt("Samples", DecimalList),
    ],
};

pub static REMEDY_INFO: PmClass = PmClass {
    name: "RemedyInfo",
    parent: None,
    msg: "RemedyInfoMsg",
    props: &[opt("Description", NodeList(&LOCALIZED_TEXT))],
};

pub static CAUSE_INFO: PmClass = PmClass {
    name: "CauseInfo",
    parent: None,
    msg: "CauseInfoMsg",
    props: &[
        opt("RemedyInfo", Node(&REMEDY_INFO)),
        opt("Description", NodeList(&LOCALIZED_TEXT)),
    ],
};

pub static PHYSICAL_CONNECTOR_INFO: PmClass = PmClass {
    name: "PhysicalConnectorInfo",
    parent: None,
    msg: "PhysicalConnectorInfoMsg",
    props: &[
        opt("Label", NodeList(&LOCALIZED_TEXT)),
        opt("Number", Attr(Int)),
    ],
};

pub static SYSTEM_SIGNAL_ACTIVATION: PmClass = PmClass {
    name: "SystemSignalActivation",
    parent: None,
    msg: "SystemSignalActivationMsg",
    props: &[
        req("Manifestation", Attr(Enum(&ALERT_SIGNAL_MANIFESTATION))),
        req("State", Attr(Enum(&ALERT_ACTIVATION))),
    ],
};

pub static PRODUCTION_SPECIFICATION: PmClass = PmClass {
    name: "ProductionSpecification",
    parent: None,
    msg: "AbstractDeviceComponentDescriptorMsg.ProductionSpecificationMsg",
    props: &[
        req("SpecType", Node(&CODED_VALUE)),
        req("ProductionSpec", Text),
        opt("ComponentId", Node(&INSTANCE_IDENTIFIER)),
    ],
};

pub static BASE_DEMOGRAPHICS: PmClass = PmClass {
    name: "BaseDemographics",
    parent: None,
    msg: "BaseDemographicsMsg",
    props: &[
        opt("Givenname", Text),
        opt("Middlename", TextList),
        opt("Familyname", Text),
        opt("Birthname", Text),
        opt("Title", Text),
    ],
};

pub static PERSON_REFERENCE: PmClass = PmClass {
    name: "PersonReference",
    parent: None,
    msg: "PersonReferenceMsg",
    props: &[
        opt("Identification", NodeList(&INSTANCE_IDENTIFIER)),
        opt("Name", Node(&BASE_DEMOGRAPHICS)),
    ],
};

pub static PERSON_PARTICIPATION: PmClass = PmClass {
    name: "PersonParticipation",
    parent: Some(&PERSON_REFERENCE),
    msg: "PersonParticipationMsg",
    props: &[opt("Role", NodeList(&CODED_VALUE))],
};

pub static PATIENT_DEMOGRAPHICS_CORE_DATA: PmClass = PmClass {
    name: "PatientDemographicsCoreData",
    parent: Some(&BASE_DEMOGRAPHICS),
    msg: "PatientDemographicsCoreDataMsg",
    props: &[
        opt("Sex", EnumText(&SEX)),
        opt("PatientType", EnumText(&PATIENT_TYPE)),
        opt("DateOfBirth", Text),
        opt("Height", Node(&MEASUREMENT)),
        opt("Weight", Node(&MEASUREMENT)),
        opt("Race", Node(&CODED_VALUE)),
    ],
};

pub static NEONATAL_PATIENT_DEMOGRAPHICS_CORE_DATA: PmClass = PmClass {
    name: "NeonatalPatientDemographicsCoreData",
    parent: Some(&PATIENT_DEMOGRAPHICS_CORE_DATA),
    msg: "NeonatalPatientDemographicsCoreDataMsg",
    props: &[
        opt("GestationalAge", Node(&MEASUREMENT)),
        opt("BirthLength", Node(&MEASUREMENT)),
        opt("BirthWeight", Node(&MEASUREMENT)),
        opt("HeadCircumference", Node(&MEASUREMENT)),
        opt("Mother", Node(&PERSON_REFERENCE)),
    ],
};

pub static LOCATION_DETAIL: PmClass = PmClass {
    name: "LocationDetail",
    parent: None,
    msg: "LocationDetailMsg",
    props: &[
        opt("PoC", Attr(String)),
        opt("Room", Attr(String)),
        opt("Bed", Attr(String)),
        opt("Facility", Attr(String)),
        opt("Building", Attr(String)),
        opt("Floor", Attr(String)),
    ],
};

pub static LOCATION_REFERENCE: PmClass = PmClass {
    name: "LocationReference",
    parent: None,
    msg: "LocationReferenceMsg",
    props: &[
        opt("Identification", NodeList(&INSTANCE_IDENTIFIER)),
        opt("LocationDetail", Node(&LOCATION_DETAIL)),
    ],
};

pub static REFERENCE_RANGE: PmClass = PmClass {
    name: "ReferenceRange",
    parent: None,
    msg: "ClinicalInfoMsg.RelatedMeasurementMsg.ReferenceRangeMsg",
    props: &[
        req("Range", Node(&RANGE)),
        opt("Meaning", Node(&CODED_VALUE)),
    ],
};

pub static RELATED_MEASUREMENT: PmClass = PmClass {
    name: "RelatedMeasurement",
    parent: None,
    msg: "ClinicalInfoMsg.RelatedMeasurementMsg",
    props: &[
        req("Value", Node(&MEASUREMENT)),
        opt("ReferenceRange", NodeList(&REFERENCE_RANGE)),
        opt("Validity", Attr(Enum(&MEASUREMENT_VALIDITY))),
    ],
};

pub static CLINICAL_INFO: PmClass = PmClass {
    name: "ClinicalInfo",
    parent: None,
    msg: "ClinicalInfoMsg",
    props: &[
        opt("Type", Node(&CODED_VALUE)),
        opt("Code", Node(&CODED_VALUE)),
        opt("Description", NodeList(&LOCALIZED_TEXT)),
        opt("RelatedMeasurement", NodeList(&RELATED_MEASUREMENT)),
    ],
};

pub static IMAGING_PROCEDURE: PmClass = PmClass {
    name: "ImagingProcedure",
    parent: None,
    msg: "ImagingProcedureMsg",
    props: &[
        req("AccessionIdentifier", Node(&INSTANCE_IDENTIFIER)),
        req("RequestedProcedureId", Node(&INSTANCE_IDENTIFIER)),
        req("StudyInstanceUid", Node(&INSTANCE_IDENTIFIER)),
        req("ScheduledProcedureStepId", Node(&INSTANCE_IDENTIFIER)),
        opt("Modality", Node(&CODED_VALUE)),
        opt("ProtocolCode", Node(&CODED_VALUE)),
    ],
};

pub static ORDER_DETAIL: PmClass = PmClass {
    name: "OrderDetail",
    parent: None,
    msg: "OrderDetailMsg",
    props: &[
        opt("Start", Text),
        opt("End", Text),
        opt("Performer", NodeList(&PERSON_PARTICIPATION)),
        opt("Service", NodeList(&CODED_VALUE)),
        opt("ImagingProcedure", NodeList(&IMAGING_PROCEDURE)),
    ],
};

pub static REQUESTED_ORDER_DETAIL: PmClass = PmClass {
    name: "RequestedOrderDetail",
    parent: Some(&ORDER_DETAIL),
    msg: "WorkflowContextStateMsg.WorkflowDetailMsg.RequestedOrderDetailMsg",
    props: &[
        opt("ReferringPhysician", Node(&PERSON_REFERENCE)),
        opt("RequestingPhysician", Node(&PERSON_REFERENCE)),
        req("PlacerOrderNumber", Node(&INSTANCE_IDENTIFIER)),
    ],
};

pub static PERFORMED_ORDER_DETAIL: PmClass = PmClass {
    name: "PerformedOrderDetail",
    parent: Some(&ORDER_DETAIL),
    msg: "WorkflowContextStateMsg.WorkflowDetailMsg.PerformedOrderDetailMsg",
    props: &[
        opt("FillerOrderNumber", Node(&INSTANCE_IDENTIFIER)),
        opt("ResultingClinicalInfo", NodeList(&CLINICAL_INFO)),
    ],
};

pub static WORKFLOW_DETAIL: PmClass = PmClass {
    name: "WorkflowDetail",
    parent: None,
    msg: "WorkflowContextStateMsg.WorkflowDetailMsg",
    props: &[
        req("Patient", Node(&PERSON_REFERENCE)),
        opt("AssignedLocation", Node(&LOCATION_REFERENCE)),
        opt("VisitNumber", Node(&INSTANCE_IDENTIFIER)),
        opt("DangerCode", NodeList(&CODED_VALUE)),
        opt("RelevantClinicalInfo", NodeList(&CLINICAL_INFO)),
        opt("RequestedOrderDetail", Node(&REQUESTED_ORDER_DETAIL)),
        opt("PerformedOrderDetail", Node(&PERFORMED_ORDER_DETAIL)),
    ],
};

pub static RELATION: PmClass = PmClass {
    name: "Relation",
    parent: None,
    msg: "AbstractMetricDescriptorMsg.RelationMsg",
    props: &[
        opt("Code", Node(&CODED_VALUE)),
        opt("Identification", Node(&INSTANCE_IDENTIFIER)),
        req("Kind", Attr(Enum(&KIND_OF_RELATION))),
        req("Entries", HandleRefList),
    ],
};

pub static UDI: PmClass = PmClass {
    name: "Udi",
    parent: None,
    msg: "MdsDescriptorMsg.MetaDataMsg.UdiMsg",
    props: &[
        req("DeviceIdentifier", Text),
        req("HumanReadableForm", Text),
        req("Issuer", Node(&INSTANCE_IDENTIFIER)),
        opt("Jurisdiction", Node(&INSTANCE_IDENTIFIER)),
    ],
};

pub static META_DATA: PmClass = PmClass {
    name: "MetaData",
    parent: None,
    msg: "MdsDescriptorMsg.MetaDataMsg",
    props: &[
        opt("Udi", NodeList(&UDI)),
        opt("LotNumber", Text),
        opt("Manufacturer", NodeList(&LOCALIZED_TEXT)),
        opt("ManufactureDate", Text),
        opt("ExpirationDate", Text),
        opt("ModelName", NodeList(&LOCALIZED_TEXT)),
        opt("ModelNumber", Text),
        opt("SerialNumber", TextList),
    ],
};

pub static OPERATION_GROUP: PmClass = PmClass {
    name: "OperationGroup",
    parent: None,
    msg: "ScoStateMsg.OperationGroupMsg",
    props: &[
        req("Type", Node(&CODED_VALUE)),
        opt("OperatingMode", Attr(Enum(&OPERATING_MODE))),
        opt("Operations", HandleRefList),
    ],
};

pub static ACTIVATE_OPERATION_DESCRIPTOR_ARGUMENT: PmClass = PmClass {
    name: "ActivateOperationDescriptorArgument",
    parent: None,
    msg: "ActivateOperationDescriptorMsg.ArgumentMsg",
    props: &[req("ArgName", Node(&CODED_VALUE)), req("Arg", QName)],
};

pub static CALIBRATION_DOCUMENTATION: PmClass = PmClass {
    name: "CalibrationDocumentation",
    parent: None,
    msg: "CalibrationInfoMsg.CalibrationDocumentationMsg",
    props: &[opt("Documentation", NodeList(&LOCALIZED_TEXT))],
};

pub static CALIBRATION_INFO: PmClass = PmClass {
    name: "CalibrationInfo",
    parent: None,
    msg: "CalibrationInfoMsg",
    props: &[
        opt("CalibrationDocumentation", NodeList(&CALIBRATION_DOCUMENTATION)),
        opt("ComponentCalibrationState", Attr(Enum(&CALIBRATION_STATE))),
        opt("Time", Attr(Timestamp)),
    ],
};

/// Every property type, for registry construction.
pub static ALL: &[&PmClass] = &[
    &LOCALIZED_TEXT,
    &TRANSLATION,
    &CODED_VALUE,
    &INSTANCE_IDENTIFIER,
    &OPERATING_JURISDICTION,
    &RANGE,
    &MEASUREMENT,
    &ALLOWED_VALUE,
    &ALLOWED_VALUES,
    &METRIC_QUALITY,
    &ANNOTATION,
    &ABSTRACT_METRIC_VALUE,
    &NUMERIC_METRIC_VALUE,
    &STRING_METRIC_VALUE,
    &APPLY_ANNOTATION,
    &SAMPLE_ARRAY_VALUE,
    &REMEDY_INFO,
    &CAUSE_INFO,
    &PHYSICAL_CONNECTOR_INFO,
    &SYSTEM_SIGNAL_ACTIVATION,
    &PRODUCTION_SPECIFICATION,
    &BASE_DEMOGRAPHICS,
    &PERSON_REFERENCE,
    &PERSON_PARTICIPATION,
    &PATIENT_DEMOGRAPHICS_CORE_DATA,
    &NEONATAL_PATIENT_DEMOGRAPHICS_CORE_DATA,
    &LOCATION_DETAIL,
    &LOCATION_REFERENCE,
    &REFERENCE_RANGE,
    &RELATED_MEASUREMENT,
    &CLINICAL_INFO,
    &IMAGING_PROCEDURE,
    &ORDER_DETAIL,
    &REQUESTED_ORDER_DETAIL,
    &PERFORMED_ORDER_DETAIL,
    &WORKFLOW_DETAIL,
    &RELATION,
    &UDI,
    &META_DATA,
    &OPERATION_GROUP,
    &ACTIVATE_OPERATION_DESCRIPTOR_ARGUMENT,
    &CALIBRATION_DOCUMENTATION,
    &CALIBRATION_INFO,
];
