// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared device fixture for integration tests.
//!
//! ```text
//! mds0
//! ├── vmd0 ── ch0 ── m00, m01
//! ├── vmd1 ── ch1 ── m10, m11
//! └── sc0 ── pat
//! ```

#![allow(dead_code)]

use protosdc::mdib::{DescriptorContainer, Transaction};
use protosdc::pm::descriptors::{
    CHANNEL_DESCRIPTOR, MDS_DESCRIPTOR, NUMERIC_METRIC_DESCRIPTOR, PATIENT_CONTEXT_DESCRIPTOR,
    SYSTEM_CONTEXT_DESCRIPTOR, VMD_DESCRIPTOR,
};
use protosdc::pm::states::{
    CHANNEL_STATE, MDS_STATE, NUMERIC_METRIC_STATE, PATIENT_CONTEXT_STATE, SYSTEM_CONTEXT_STATE,
    VMD_STATE,
};
use protosdc::pm::types::{CODED_VALUE, METRIC_QUALITY, NUMERIC_METRIC_VALUE};
use protosdc::pm::{Decimal, PmClass, PmObject, PmValue};
use std::time::{Duration, Instant};

pub const METRICS: [&str; 4] = ["m00", "m01", "m10", "m11"];

pub fn descriptor(class: &'static PmClass, handle: &str, parent: Option<&str>) -> DescriptorContainer {
    DescriptorContainer::new(
        PmObject::new(class).with("Handle", handle).expect("handle"),
        parent,
    )
}

pub fn metric_descriptor(handle: &str, parent: &str) -> DescriptorContainer {
    let unit = PmObject::new(&CODED_VALUE).with("Code", "262688").expect("unit");
    let node = PmObject::new(&NUMERIC_METRIC_DESCRIPTOR)
        .with("Handle", handle)
        .and_then(|o| o.with("Unit", unit))
        .and_then(|o| o.with("MetricCategory", PmValue::Enum("Msrmt".into())))
        .and_then(|o| o.with("MetricAvailability", PmValue::Enum("Cont".into())))
        .and_then(|o| o.with("Resolution", Decimal::from(1)))
        .expect("metric descriptor");
    DescriptorContainer::new(node, Some(parent))
}

pub fn state(class: &'static PmClass, descriptor_handle: &str) -> PmObject {
    PmObject::new(class)
        .with("DescriptorHandle", descriptor_handle)
        .expect("state")
}

pub fn metric_state(descriptor_handle: &str, value: i64) -> PmObject {
    let quality = PmObject::new(&METRIC_QUALITY)
        .with("Validity", PmValue::Enum("Vld".into()))
        .expect("quality");
    let metric_value = PmObject::new(&NUMERIC_METRIC_VALUE)
        .with("MetricQuality", quality)
        .and_then(|v| v.with("Value", Decimal::from(value)))
        .expect("metric value");
    state(&NUMERIC_METRIC_STATE, descriptor_handle)
        .with("MetricValue", metric_value)
        .expect("metric state")
}

pub fn patient(handle: &str) -> PmObject {
    state(&PATIENT_CONTEXT_STATE, "pat")
        .with("Handle", handle)
        .expect("context handle")
}

/// Transaction creating the whole fixture tree with one state per
/// single-state descriptor.
pub fn device_tree() -> Transaction {
    let mut tx = Transaction::new();
    tx.create_descriptor(
        descriptor(&MDS_DESCRIPTOR, "mds0", None),
        vec![state(&MDS_STATE, "mds0")],
    );
    for (vmd, ch) in [("vmd0", "ch0"), ("vmd1", "ch1")] {
        tx.create_descriptor(
            descriptor(&VMD_DESCRIPTOR, vmd, Some("mds0")),
            vec![state(&VMD_STATE, vmd)],
        );
        tx.create_descriptor(
            descriptor(&CHANNEL_DESCRIPTOR, ch, Some(vmd)),
            vec![state(&CHANNEL_STATE, ch)],
        );
    }
    for handle in METRICS {
        let channel = if handle.starts_with("m0") { "ch0" } else { "ch1" };
        tx.create_descriptor(
            metric_descriptor(handle, channel),
            vec![metric_state(handle, 0)],
        );
    }
    tx.create_descriptor(
        descriptor(&SYSTEM_CONTEXT_DESCRIPTOR, "sc0", Some("mds0")),
        vec![state(&SYSTEM_CONTEXT_STATE, "sc0")],
    );
    tx.create_descriptor(
        descriptor(&PATIENT_CONTEXT_DESCRIPTOR, "pat", Some("sc0")),
        vec![patient("pat.1")],
    );
    tx
}

pub const DESCRIPTOR_COUNT: usize = 11;

/// Poll `cond` until it holds or `timeout` passes.
pub fn eventually(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
