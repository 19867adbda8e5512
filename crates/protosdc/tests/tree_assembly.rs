// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Description tree assembly.
//!
//! Nests a flat descriptor table into a description message, pushes it
//! through the unit codec and flattens it again.

mod common;

use common::{device_tree, DESCRIPTOR_COUNT};
use protosdc::config::LogTarget;
use protosdc::mdib::{DescriptorContainer, Mdib, MdibVersionGroup};
use protosdc::messages::{self, GetAction};
use protosdc::reader::{md_description_to_p, md_state_to_p, MessageReader};
use protosdc::wire::{decode_message, encode_message, WireValue};
use std::collections::HashMap;

fn fixture() -> Mdib {
    let mdib = Mdib::new(
        MdibVersionGroup::new(0, "urn:uuid:tree", None),
        LogTarget::new("protosdc::mdib", "mdib", None),
    );
    mdib.commit(device_tree()).expect("commit fixture");
    mdib
}

fn reader() -> MessageReader {
    MessageReader::new(LogTarget::new("protosdc::reader", "reader", None))
}

#[test]
fn test_flat_tree_survives_nesting_and_codec() {
    let mdib = fixture();
    let p = mdib.read(|tables, _| md_description_to_p(tables)).expect("nest");
    let bytes = encode_message(&p);
    let decoded = decode_message(&bytes).expect("decode");
    assert_eq!(decoded, p);

    let flat = reader().read_md_description(&decoded).expect("flatten");
    assert_eq!(flat.len(), DESCRIPTOR_COUNT);

    let parents: HashMap<&str, Option<&str>> = flat
        .iter()
        .map(|d| (d.handle(), d.parent_handle.as_deref()))
        .collect();
    assert_eq!(parents["mds0"], None);
    for (child, parent) in [
        ("vmd0", "mds0"),
        ("vmd1", "mds0"),
        ("ch0", "vmd0"),
        ("ch1", "vmd1"),
        ("m00", "ch0"),
        ("m01", "ch0"),
        ("m10", "ch1"),
        ("m11", "ch1"),
        ("sc0", "mds0"),
        ("pat", "sc0"),
    ] {
        assert_eq!(parents[child], Some(parent), "parent of {}", child);
    }

    // Parents always precede their children.
    let position: HashMap<&str, usize> = flat
        .iter()
        .enumerate()
        .map(|(i, d)| (d.handle(), i))
        .collect();
    for d in &flat {
        if let Some(parent) = d.parent_handle.as_deref() {
            assert!(position[parent] < position[d.handle()], "{} before parent", d.handle());
        }
    }

    // The flattened nodes equal the stored ones.
    mdib.read(|tables, _| {
        for d in &flat {
            let stored = tables.descriptor(d.handle()).expect("stored");
            assert_eq!(&stored.node, &d.node, "descriptor {}", d.handle());
        }
    });
}

#[test]
fn test_renested_tree_is_identical() {
    let mdib = fixture();
    let p = mdib.read(|tables, _| md_description_to_p(tables)).expect("nest");
    let flat = reader().read_md_description(&p).expect("flatten");

    let copy = Mdib::new(
        MdibVersionGroup::default(),
        LogTarget::new("protosdc::mdib", "mdib", None),
    );
    copy.write(|tables, _| {
        for d in flat {
            tables.add_descriptor(d);
        }
    });
    let again = copy.read(|tables, _| md_description_to_p(tables)).expect("nest copy");
    assert_eq!(again, p);
}

#[test]
fn test_get_mdib_response_reads_back() {
    let mdib = fixture();
    let group = mdib.version_group();
    let (md_description, md_state) = mdib
        .read(|tables, _| {
            let states: Vec<_> = tables.all_states().collect();
            Ok::<_, protosdc::Error>((md_description_to_p(tables)?, md_state_to_p(states)?))
        })
        .expect("encode");
    let p_mdib = protosdc::wire::WireMessage::new("MdibMsg")
        .with(
            "mdib_version_group_attr",
            WireValue::Msg(protosdc::mapping::primitive::mdib_version_group_to_p(&group)),
        )
        .with("md_description", WireValue::Msg(md_description))
        .with("md_state", WireValue::Msg(md_state));
    let request = messages::get_request(GetAction::GetMdib, &[]);
    let response = messages::get_response(
        &request,
        GetAction::GetMdib,
        &group,
        vec![("mdib", WireValue::Msg(p_mdib))],
    );
    let response = decode_message(&encode_message(&response)).expect("codec");

    let p_mdib = messages::payload(&response)
        .and_then(|p| p.require_msg("mdib"))
        .expect("mdib");
    let (descriptors, states, read_group) = reader().read_mdib(p_mdib).expect("read mdib");
    assert_eq!(read_group, group);
    assert_eq!(descriptors.len(), DESCRIPTOR_COUNT);
    // One state per descriptor, the patient context included.
    assert_eq!(states.len(), DESCRIPTOR_COUNT);
    assert!(states.iter().all(|s| s.descriptor.is_some()));
    let context = states
        .iter()
        .find(|s| s.is_context())
        .expect("context state");
    assert_eq!(context.handle(), Some("pat.1"));
    assert!(descriptors
        .iter()
        .map(DescriptorContainer::handle)
        .any(|h| h == "pat"));
}

#[test]
fn test_two_vmd_device_yields_nine_descriptors() {
    let mdib = fixture();
    let mut tx = protosdc::mdib::Transaction::new();
    tx.delete_descriptor("sc0");
    mdib.commit(tx).expect("drop system context");

    let p = mdib.read(|tables, _| md_description_to_p(tables)).expect("nest");
    let mds = p.repeated_msgs("mds").expect("mds");
    assert_eq!(mds.len(), 1);
    assert_eq!(mds[0].repeated("vmd").len(), 2);
    assert!(!mds[0].has("system_context"));

    let flat = reader()
        .read_md_description(&decode_message(&encode_message(&p)).expect("codec"))
        .expect("flatten");
    let handles: Vec<&str> = flat.iter().map(DescriptorContainer::handle).collect();
    assert_eq!(
        handles,
        vec!["mds0", "vmd0", "ch0", "m00", "m01", "vmd1", "ch1", "m10", "m11"]
    );
}
