// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural walker between domain objects and wire messages.
//!
//! Each inheritance level of a class is one projection: the most-derived
//! level fills the root message, every ancestor level fills a
//! sub-message nested one step deeper and named after the ancestor.
//!
//! ```text
//! NumericMetricDescriptorMsg
//! ├── resolution_attr
//! └── abstract_metric_descriptor
//!     ├── unit, metric_category_attr, ...
//!     └── abstract_descriptor
//!         └── handle_attr, descriptor_version_attr, ...
//! ```

use super::naming::{name_to_p, p_name_for};
use super::oneof::OneOfFamily;
use super::primitive::{
    decimal_list_from_p, decimal_list_to_p, enum_attr_from_p, enum_attr_to_p,
    handle_ref_list_from_p, handle_ref_list_to_p, qname_from_p, qname_to_p, scalar_from_p,
    scalar_to_p, string_wrapper, value_wrapper,
};
use super::{registry, special};
use crate::error::{Error, Result};
use crate::pm::{PmClass, PmObject, PmValue, PropDesc, PropKind};
use crate::wire::{WireMessage, WireValue};

/// Encode a domain object into a message of its registered type.
pub fn to_p(obj: &PmObject) -> Result<WireMessage> {
    if let Some(result) = special::encode(obj) {
        return result;
    }
    let class = obj.class();
    let mut root = WireMessage::new(registry::msg_for_class(class)?);
    let levels = projections(class);
    encode_levels(obj, &levels, &mut root)?;
    Ok(root)
}

/// Decode a message, resolving the domain class from its type.
///
/// Unions resolve to their populated branch first.
pub fn from_p(p: &WireMessage) -> Result<PmObject> {
    if p.is_one_of() {
        let family = OneOfFamily::from_type_name(p.type_name())
            .ok_or_else(|| Error::UnregisteredType(p.type_name().to_string()))?;
        let (class, inner) = family.unwrap(p)?;
        return from_p_as(class, inner);
    }
    from_p_as(registry::class_for_msg(p.type_name())?, p)
}

/// Decode a message into an instance of `class`.
pub fn from_p_as(class: &'static PmClass, p: &WireMessage) -> Result<PmObject> {
    if let Some(result) = special::decode(class, p) {
        return result;
    }
    if p.type_name() != class.msg {
        return Err(Error::TypeMismatch {
            expected: class.msg.to_string(),
            found: p.type_name().to_string(),
        });
    }
    let mut obj = PmObject::new(class);
    let levels = projections(class);
    decode_levels(&mut obj, &levels, p)?;
    Ok(obj)
}

/// Inheritance levels, most-derived first, without internal marker classes.
fn projections(class: &'static PmClass) -> Vec<&'static PmClass> {
    let mut levels: Vec<_> = class
        .chain()
        .into_iter()
        .filter(|c| !c.name.starts_with('_'))
        .collect();
    levels.reverse();
    levels
}

fn encode_levels(obj: &PmObject, levels: &[&'static PmClass], p: &mut WireMessage) -> Result<()> {
    let Some((&level, ancestors)) = levels.split_first() else {
        return Ok(());
    };
    for prop in level.props {
        match obj.get(prop.name) {
            Some(value) if !value.is_empty_list() => encode_prop(level, prop, value, p)?,
            _ => {}
        }
    }
    if let Some(parent) = ancestors.first() {
        let sub = p.msg_mut(&name_to_p(parent.name), parent.msg);
        encode_levels(obj, ancestors, sub)?;
    }
    Ok(())
}

fn decode_levels(obj: &mut PmObject, levels: &[&'static PmClass], p: &WireMessage) -> Result<()> {
    let Some((&level, ancestors)) = levels.split_first() else {
        return Ok(());
    };
    for prop in level.props {
        let field = p_name_for(level, prop);
        match p.get(&field) {
            Some(wire) => {
                let value = decode_prop(prop, wire, &field)?;
                obj.insert(prop, value);
            }
            None if prop.optional || prop.kind.is_list() => {}
            None => return Err(p.missing(&field)),
        }
    }
    if let Some(parent) = ancestors.first() {
        let field = name_to_p(parent.name);
        match p.msg(&field) {
            Some(sub) => decode_levels(obj, ancestors, sub)?,
            // absent level: only optional properties may live there
            None => decode_levels(obj, ancestors, &WireMessage::new(parent.msg))?,
        }
    }
    Ok(())
}

fn shape_error(prop: &PropDesc, found: &str) -> Error {
    Error::TypeMismatch {
        expected: format!("{:?} for {}", prop.kind, prop.name),
        found: found.to_string(),
    }
}

fn list_of<'a>(prop: &PropDesc, value: &'a PmValue) -> Result<&'a [PmValue]> {
    value.as_list().ok_or_else(|| shape_error(prop, value.shape()))
}

fn node_of<'a>(prop: &PropDesc, value: &'a PmValue) -> Result<&'a PmObject> {
    value.as_node().ok_or_else(|| shape_error(prop, value.shape()))
}

/// Encode one present property into its wire field of `p`.
pub(super) fn encode_prop(
    class: &PmClass,
    prop: &PropDesc,
    value: &PmValue,
    p: &mut WireMessage,
) -> Result<()> {
    let field = p_name_for(class, prop);
    let wire = match prop.kind {
        PropKind::Attr(kind) => scalar_to_p(&kind, prop.optional, value)?,
        PropKind::HandleRefList => WireValue::Msg(handle_ref_list_to_p(list_of(prop, value)?)?),
        PropKind::DecimalList => WireValue::Msg(decimal_list_to_p(list_of(prop, value)?)?),
        PropKind::Text => {
            let text = value.as_str().ok_or_else(|| shape_error(prop, value.shape()))?;
            if prop.optional {
                WireValue::Msg(value_wrapper(
                    "google.protobuf.StringValue",
                    WireValue::Str(text.to_string()),
                ))
            } else {
                WireValue::Str(text.to_string())
            }
        }
        PropKind::EnumText(desc) => {
            let symbol = value.as_str().ok_or_else(|| shape_error(prop, value.shape()))?;
            WireValue::Msg(enum_attr_to_p(desc, symbol)?)
        }
        PropKind::QName => match value {
            PmValue::QName(q) => WireValue::Msg(qname_to_p(q)),
            other => return Err(shape_error(prop, other.shape())),
        },
        PropKind::Node(declared) => WireValue::Msg(encode_node(declared, node_of(prop, value)?)?),
        PropKind::NodeList(declared) => WireValue::Repeated(
            list_of(prop, value)?
                .iter()
                .map(|v| encode_node(declared, node_of(prop, v)?).map(WireValue::Msg))
                .collect::<Result<_>>()?,
        ),
        PropKind::HandleRefElementList => WireValue::Repeated(
            list_of(prop, value)?
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(|s| WireValue::Msg(string_wrapper("HandleRefMsg", s)))
                        .ok_or_else(|| shape_error(prop, v.shape()))
                })
                .collect::<Result<_>>()?,
        ),
        PropKind::TextList => WireValue::Repeated(
            list_of(prop, value)?
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(|s| WireValue::Str(s.to_string()))
                        .ok_or_else(|| shape_error(prop, v.shape()))
                })
                .collect::<Result<_>>()?,
        ),
    };
    p.set(field, wire);
    Ok(())
}

/// Decode one wire field into the value of `prop`.
pub(super) fn decode_prop(prop: &PropDesc, wire: &WireValue, field: &str) -> Result<PmValue> {
    let msg = || wire.as_msg().ok_or_else(|| shape_error(prop, wire.shape()));
    Ok(match prop.kind {
        PropKind::Attr(kind) => scalar_from_p(&kind, prop.optional, wire, field)?,
        PropKind::HandleRefList => PmValue::List(handle_ref_list_from_p(msg()?)?),
        PropKind::DecimalList => PmValue::List(decimal_list_from_p(msg()?)?),
        PropKind::Text => {
            let inner = if prop.optional {
                let m = msg()?;
                m.get("value").ok_or_else(|| m.missing("value"))?
            } else {
                wire
            };
            match inner {
                WireValue::Str(s) => PmValue::Str(s.clone()),
                other => return Err(shape_error(prop, other.shape())),
            }
        }
        PropKind::EnumText(desc) => PmValue::Enum(enum_attr_from_p(desc, msg()?, field)?),
        PropKind::QName => PmValue::QName(qname_from_p(msg()?)),
        PropKind::Node(declared) => PmValue::Node(decode_node(declared, msg()?)?),
        PropKind::NodeList(declared) => PmValue::List(
            elements(prop, wire)?
                .iter()
                .map(|v| {
                    let m = v.as_msg().ok_or_else(|| shape_error(prop, v.shape()))?;
                    decode_node(declared, m).map(PmValue::Node)
                })
                .collect::<Result<_>>()?,
        ),
        PropKind::HandleRefElementList => PmValue::List(
            elements(prop, wire)?
                .iter()
                .map(|v| {
                    let m = v.as_msg().ok_or_else(|| shape_error(prop, v.shape()))?;
                    m.str("string")
                        .map(|s| PmValue::Str(s.to_string()))
                        .ok_or_else(|| m.missing("string"))
                })
                .collect::<Result<_>>()?,
        ),
        PropKind::TextList => PmValue::List(
            elements(prop, wire)?
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(|s| PmValue::Str(s.to_string()))
                        .ok_or_else(|| shape_error(prop, v.shape()))
                })
                .collect::<Result<_>>()?,
        ),
    })
}

fn elements<'a>(prop: &PropDesc, wire: &'a WireValue) -> Result<&'a [WireValue]> {
    match wire {
        WireValue::Repeated(items) => Ok(items),
        other => Err(shape_error(prop, other.shape())),
    }
}

/// Nested object; classes with subclasses travel as their union.
fn encode_node(declared: &'static PmClass, obj: &PmObject) -> Result<WireMessage> {
    if !obj.class().is_subclass_of(declared) {
        return Err(Error::TypeMismatch {
            expected: declared.name.to_string(),
            found: obj.class_name().to_string(),
        });
    }
    match OneOfFamily::for_declared(declared) {
        Some(family) => family.wrap(obj.class(), to_p(obj)?),
        None => to_p(obj),
    }
}

fn decode_node(declared: &'static PmClass, p: &WireMessage) -> Result<PmObject> {
    match OneOfFamily::for_declared(declared) {
        Some(family) => {
            if p.type_name() != family.type_name() {
                return Err(Error::TypeMismatch {
                    expected: family.type_name(),
                    found: p.type_name().to_string(),
                });
            }
            let (class, inner) = family.unwrap(p)?;
            from_p_as(class, inner)
        }
        None => from_p_as(declared, p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::descriptors::NUMERIC_METRIC_DESCRIPTOR;
    use crate::pm::states::{MDS_STATE, NUMERIC_METRIC_STATE, PATIENT_CONTEXT_STATE};
    use crate::pm::types::{
        CODED_VALUE, INSTANCE_IDENTIFIER, METRIC_QUALITY, NEONATAL_PATIENT_DEMOGRAPHICS_CORE_DATA,
        NUMERIC_METRIC_VALUE, OPERATING_JURISDICTION,
    };
    use crate::pm::Decimal;

    fn numeric_descriptor() -> PmObject {
        let unit = PmObject::new(&CODED_VALUE).with("Code", "262688").expect("unit");
        PmObject::new(&NUMERIC_METRIC_DESCRIPTOR)
            .with("Handle", "hr")
            .and_then(|o| o.with("DescriptorVersion", PmValue::UInt(2)))
            .and_then(|o| o.with("Unit", unit))
            .and_then(|o| o.with("MetricCategory", PmValue::Enum("Msrmt".into())))
            .and_then(|o| o.with("MetricAvailability", PmValue::Enum("Cont".into())))
            .and_then(|o| o.with("Resolution", "0.01".parse::<Decimal>().expect("decimal")))
            .and_then(|o| o.with("AveragingPeriod", PmValue::Duration(1.5)))
            .expect("descriptor")
    }

    #[test]
    fn test_projection_nesting() {
        let p = to_p(&numeric_descriptor()).expect("encode");
        assert_eq!(p.type_name(), "NumericMetricDescriptorMsg");
        assert!(p.has("resolution_attr"));
        let metric = p.msg("abstract_metric_descriptor").expect("metric level");
        assert!(metric.has("unit"));
        assert_eq!(
            metric
                .msg("metric_category_attr")
                .and_then(|m| m.enum_symbol("enum_type")),
            Some("MSRMT")
        );
        let base = metric.msg("abstract_descriptor").expect("base level");
        assert_eq!(
            base.msg("handle_attr").and_then(|m| m.str("string")),
            Some("hr")
        );
        assert!(!base.has("safety_classification_attr"));
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let d = numeric_descriptor();
        let back = from_p(&to_p(&d).expect("encode")).expect("decode");
        assert_eq!(back, d);
    }

    #[test]
    fn test_missing_required_field() {
        let mut p = to_p(&numeric_descriptor()).expect("encode");
        p.remove("resolution_attr");
        assert!(matches!(
            from_p(&p),
            Err(Error::MissingField { ref field, .. }) if field == "resolution_attr"
        ));
    }

    #[test]
    fn test_state_with_nested_value() {
        let quality = PmObject::new(&METRIC_QUALITY)
            .with("Validity", PmValue::Enum("Vld".into()))
            .expect("quality");
        let value = PmObject::new(&NUMERIC_METRIC_VALUE)
            .with("MetricQuality", quality)
            .and_then(|o| o.with("Value", "72".parse::<Decimal>().expect("decimal")))
            .and_then(|o| o.with("DeterminationTime", PmValue::Timestamp(1_700_000_000.25)))
            .expect("value");
        let state = PmObject::new(&NUMERIC_METRIC_STATE)
            .with("DescriptorHandle", "hr")
            .and_then(|o| o.with("StateVersion", PmValue::UInt(0)))
            .and_then(|o| o.with("MetricValue", value))
            .expect("state");
        let back = from_p(&to_p(&state).expect("encode")).expect("decode");
        assert_eq!(back, state);
        assert_eq!(back.state_version(), 0);
        assert!(back.get("StateVersion").is_some());
    }

    #[test]
    fn test_union_property_resolves_subclass() {
        let jurisdiction = PmObject::new(&OPERATING_JURISDICTION)
            .with("Root", "urn:oid:1.2.3")
            .expect("jurisdiction");
        let id = PmObject::new(&INSTANCE_IDENTIFIER)
            .with("Extension", "42")
            .expect("id");
        let core = PmObject::new(&NEONATAL_PATIENT_DEMOGRAPHICS_CORE_DATA)
            .with("Givenname", "Ada")
            .and_then(|o| o.with("Sex", PmValue::Enum("F".into())))
            .expect("core");
        let patient = PmObject::new(&PATIENT_CONTEXT_STATE)
            .with("DescriptorHandle", "pat")
            .and_then(|o| o.with("Handle", "pat.1"))
            .and_then(|o| o.with("Identification", vec![id, jurisdiction]))
            .and_then(|o| o.with("CoreData", core))
            .expect("patient");
        let p = to_p(&patient).expect("encode");
        let core_p = p.msg("core_data").expect("core data");
        assert_eq!(core_p.type_name(), "PatientDemographicsCoreDataOneOfMsg");
        assert!(core_p.has("neonatal_patient_demographics_core_data"));
        let back = from_p(&p).expect("decode");
        assert_eq!(back, patient);
        assert_eq!(
            back.list("Identification")[1]
                .as_node()
                .map(PmObject::class_name),
            Some("OperatingJurisdiction")
        );
    }

    #[test]
    fn test_direct_subclass_property_is_not_a_union() {
        let jurisdiction = PmObject::new(&OPERATING_JURISDICTION)
            .with("Root", "urn:oid:1.2.3")
            .expect("jurisdiction");
        let state = PmObject::new(&MDS_STATE)
            .with("DescriptorHandle", "mds0")
            .and_then(|o| o.with("OperatingJurisdiction", jurisdiction))
            .expect("mds state");
        let p = to_p(&state).expect("encode");
        assert_eq!(
            p.msg("operating_jurisdiction").map(WireMessage::type_name),
            Some("OperatingJurisdictionMsg")
        );
        assert_eq!(from_p(&p).expect("decode"), state);
    }
}
