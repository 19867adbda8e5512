// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Whole-type handlers for classes the structural walker cannot map.

use super::generic::{decode_prop, encode_prop};
use super::naming::{attr_name_to_p, p_name_for};
use super::primitive::string_wrapper;
use crate::error::Result;
use crate::pm::types::{ALLOWED_VALUES, APPLY_ANNOTATION, LOCALIZED_TEXT};
use crate::pm::{PmClass, PmObject, PmValue};
use crate::wire::{WireMessage, WireValue};

const LOCALIZED_TEXT_CONTENT: &str = "localized_text_content";

/// Encode with a special handler, `None` when the class has none.
pub(super) fn encode(obj: &PmObject) -> Option<Result<WireMessage>> {
    match obj.class_name() {
        "LocalizedText" => Some(localized_text_to_p(obj)),
        "ApplyAnnotation" => Some(Ok(apply_annotation_to_p(obj))),
        "AllowedValues" => Some(Ok(allowed_values_to_p(obj))),
        _ => None,
    }
}

/// Decode with a special handler, `None` when the class has none.
pub(super) fn decode(class: &'static PmClass, p: &WireMessage) -> Option<Result<PmObject>> {
    match class.name {
        "LocalizedText" => Some(localized_text_from_p(p)),
        "ApplyAnnotation" => Some(Ok(apply_annotation_from_p(p))),
        "AllowedValues" => Some(Ok(allowed_values_from_p(p))),
        _ => None,
    }
}

// =======================================================================
// LocalizedText: content travels as a `{string}` wrapper
// =======================================================================

fn localized_text_to_p(obj: &PmObject) -> Result<WireMessage> {
    let mut p = WireMessage::new(LOCALIZED_TEXT.msg);
    for prop in LOCALIZED_TEXT.props {
        let Some(value) = obj.get(prop.name) else {
            continue;
        };
        if prop.name == "text" {
            if let Some(text) = value.as_str() {
                p.set(
                    LOCALIZED_TEXT_CONTENT,
                    WireValue::Msg(string_wrapper("LocalizedTextContentMsg", text)),
                );
            }
        } else {
            encode_prop(&LOCALIZED_TEXT, prop, value, &mut p)?;
        }
    }
    Ok(p)
}

fn localized_text_from_p(p: &WireMessage) -> Result<PmObject> {
    let mut obj = PmObject::new(&LOCALIZED_TEXT);
    for prop in LOCALIZED_TEXT.props {
        if prop.name == "text" {
            if let Some(text) = p.msg(LOCALIZED_TEXT_CONTENT).and_then(|m| m.str("string")) {
                obj.insert(prop, PmValue::Str(text.to_string()));
            }
            continue;
        }
        let field = p_name_for(&LOCALIZED_TEXT, prop);
        if let Some(wire) = p.get(&field) {
            obj.insert(prop, decode_prop(prop, wire, &field)?);
        }
    }
    Ok(obj)
}

// =======================================================================
// ApplyAnnotation: plain indices, zero when absent
// =======================================================================

const APPLY_ANNOTATION_INDICES: [&str; 2] = ["AnnotationIndex", "SampleIndex"];

fn apply_annotation_to_p(obj: &PmObject) -> WireMessage {
    let mut p = WireMessage::new(APPLY_ANNOTATION.msg);
    for name in APPLY_ANNOTATION_INDICES {
        p.set(
            attr_name_to_p(name),
            WireValue::UInt(obj.u64(name).unwrap_or(0)),
        );
    }
    p
}

fn apply_annotation_from_p(p: &WireMessage) -> PmObject {
    let mut obj = PmObject::new(&APPLY_ANNOTATION);
    for prop in APPLY_ANNOTATION.props {
        let index = p.u64(&attr_name_to_p(prop.name)).unwrap_or(0);
        obj.insert(prop, PmValue::UInt(index));
    }
    obj
}

// =======================================================================
// AllowedValues: a bare repeated string
// =======================================================================

fn allowed_values_to_p(obj: &PmObject) -> WireMessage {
    let mut p = WireMessage::new(ALLOWED_VALUES.msg);
    for v in obj.list("Value") {
        if let Some(s) = v.as_str() {
            p.push("value", WireValue::Str(s.to_string()));
        }
    }
    p
}

fn allowed_values_from_p(p: &WireMessage) -> PmObject {
    let mut obj = PmObject::new(&ALLOWED_VALUES);
    let values: Vec<PmValue> = p
        .repeated("value")
        .iter()
        .filter_map(|v| v.as_str().map(|s| PmValue::Str(s.to_string())))
        .collect();
    if let Some(prop) = ALLOWED_VALUES.find_prop("Value") {
        obj.insert(prop, PmValue::List(values));
    }
    obj
}
