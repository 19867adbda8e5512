// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Consumer mirror: initial load, version checks and report application.
//!
//! Reports are built with the provider side builders and handed to the
//! mirror directly, so every version number is under test control.

mod common;

use common::{device_tree, metric_descriptor, metric_state, patient, DESCRIPTOR_COUNT};
use protosdc::actions::Action;
use protosdc::config::{ConsumerConfig, GapPolicy, ProviderConfig};
use protosdc::consumer::{ConsumerMdib, ReportOutcome};
use protosdc::mdib::{MdibVersionGroup, StateContainer};
use protosdc::messages::{self, GetAction};
use protosdc::pm::{PmObject, PmValue};
use protosdc::provider::reports::{
    description_modification_report, state_report, CONTEXT_REPORT, METRIC_REPORT,
};
use protosdc::provider::SdcProvider;
use protosdc::transport::{LocalTransport, Transport};
use protosdc::wire::{WireMessage, WireValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn versioned(state: PmObject, version: u64) -> StateContainer {
    StateContainer::new(
        state
            .with("StateVersion", PmValue::UInt(version))
            .expect("state version"),
    )
}

/// Mirror loaded from a provider holding the fixture.
fn loaded(config: &ConsumerConfig) -> (Arc<SdcProvider>, ConsumerMdib) {
    let provider = Arc::new(SdcProvider::new(ProviderConfig::new()));
    provider.commit(device_tree()).expect("fixture");
    let transport = LocalTransport::new(&provider);
    let mirror = ConsumerMdib::new(config);
    mirror
        .init_mdib(|| transport.call(&messages::get_request(GetAction::GetMdib, &[])))
        .expect("init");
    (provider, mirror)
}

fn at(mirror: &ConsumerMdib, mdib_version: u64) -> MdibVersionGroup {
    MdibVersionGroup {
        mdib_version,
        ..mirror.version_group()
    }
}

fn metric_report(group: &MdibVersionGroup, value: i64, state_version: u64) -> Arc<WireMessage> {
    let states = [versioned(metric_state("m00", value), state_version)];
    Arc::new(state_report(&METRIC_REPORT, &states, group).expect("report"))
}

fn value_of(mirror: &ConsumerMdib, handle: &str) -> Option<String> {
    mirror.mdib().read(|tables, _| {
        tables
            .state(handle)
            .and_then(|s| s.node.node("MetricValue"))
            .and_then(|v| v.get("Value"))
            .map(|v| format!("{:?}", v))
    })
}

#[test]
fn test_initial_load_matches_provider() {
    let (provider, mirror) = loaded(&ConsumerConfig::new());
    assert!(mirror.is_ready());
    assert_eq!(mirror.version_group(), provider.mdib().version_group());
    mirror.mdib().read(|tables, _| {
        assert_eq!(tables.descriptor_count(), DESCRIPTOR_COUNT);
        assert_eq!(tables.context_states_of("pat").count(), 1);
        assert!(tables.state("m11").is_some_and(|s| s.descriptor.is_some()));
    });
}

#[test]
fn test_mdib_version_must_increase() {
    let (_provider, mirror) = loaded(&ConsumerConfig::new());
    let n = mirror.version_group().mdib_version;

    let outcome = mirror
        .on_report(metric_report(&at(&mirror, n + 1), 10, 1))
        .expect("n+1");
    assert_eq!(outcome, ReportOutcome::Applied(Action::EpisodicMetricReport));
    let after_first = value_of(&mirror, "m00");

    // Same and older versions are dropped without touching the tree.
    for version in [n + 1, n] {
        let outcome = mirror
            .on_report(metric_report(&at(&mirror, version), 20, 2))
            .expect("stale");
        assert_eq!(outcome, ReportOutcome::Discarded, "version {}", version);
    }
    assert_eq!(value_of(&mirror, "m00"), after_first);
    assert_eq!(mirror.version_group().mdib_version, n + 1);

    // A gap is accepted by default.
    let outcome = mirror
        .on_report(metric_report(&at(&mirror, n + 3), 30, 3))
        .expect("gap");
    assert_eq!(outcome, ReportOutcome::Applied(Action::EpisodicMetricReport));
    assert_eq!(mirror.version_group().mdib_version, n + 3);
    assert_ne!(value_of(&mirror, "m00"), after_first);
}

#[test]
fn test_reject_gaps_policy() {
    let config = ConsumerConfig::new();
    config.set_gap_policy(GapPolicy::RejectGaps);
    let (_provider, mirror) = loaded(&config);
    let n = mirror.version_group().mdib_version;

    let outcome = mirror
        .on_report(metric_report(&at(&mirror, n + 2), 10, 1))
        .expect("gap");
    assert_eq!(outcome, ReportOutcome::Discarded);
    assert_eq!(mirror.version_group().mdib_version, n);

    let outcome = mirror
        .on_report(metric_report(&at(&mirror, n + 1), 10, 1))
        .expect("successor");
    assert_eq!(outcome, ReportOutcome::Applied(Action::EpisodicMetricReport));
}

#[test]
fn test_new_sequence_restarts_numbering() {
    let (_provider, mirror) = loaded(&ConsumerConfig::new());
    let n = mirror.version_group().mdib_version;
    let group = MdibVersionGroup::new(0, "urn:uuid:restarted", None);
    let outcome = mirror
        .on_report(metric_report(&group, 5, 1))
        .expect("new sequence");
    assert_eq!(outcome, ReportOutcome::Applied(Action::EpisodicMetricReport));
    let current = mirror.version_group();
    assert_eq!(current.sequence_id, "urn:uuid:restarted");
    assert_eq!(current.mdib_version, 0);
    assert!(n > 0);
}

#[test]
fn test_older_state_version_is_not_merged() {
    let (_provider, mirror) = loaded(&ConsumerConfig::new());
    let n = mirror.version_group().mdib_version;
    mirror
        .on_report(metric_report(&at(&mirror, n + 1), 10, 4))
        .expect("v4");
    let held = value_of(&mirror, "m00");
    // Newer mdib version, older state version.
    let outcome = mirror
        .on_report(metric_report(&at(&mirror, n + 2), 99, 3))
        .expect("v3");
    assert_eq!(outcome, ReportOutcome::Applied(Action::EpisodicMetricReport));
    assert_eq!(value_of(&mirror, "m00"), held);
}

#[test]
fn test_modification_parts_apply_create_update_delete() {
    let (_provider, mirror) = loaded(&ConsumerConfig::new());
    let deleted_seen = Arc::new(AtomicUsize::new(0));
    let seen = deleted_seen.clone();
    mirror
        .topics()
        .deleted_descriptors_by_handle
        .subscribe(move |deleted| {
            if deleted.contains_key("m02") {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

    let n = mirror.version_group().mdib_version;
    let created = [metric_descriptor("m02", "ch0")];
    let states = [versioned(metric_state("m02", 7), 0)];
    let mut stream = description_modification_report(
        &created,
        &[],
        &created,
        &states,
        &at(&mirror, n + 1),
    )
    .expect("report");

    // Put the delete part on the wire first.
    let body = stream
        .msg_mut("report", "EpisodicReportMsg")
        .msg_mut("description", "DescriptionModificationReportMsg");
    if let Some(WireValue::Repeated(mut parts)) = body.remove("report_part") {
        parts.reverse();
        body.set("report_part", WireValue::Repeated(parts));
    }

    let outcome = mirror.on_report(Arc::new(stream)).expect("apply");
    assert_eq!(
        outcome,
        ReportOutcome::Applied(Action::DescriptionModificationReport)
    );
    mirror.mdib().read(|tables, _| {
        assert!(tables.descriptor("m02").is_none());
        assert!(tables.state("m02").is_none());
        assert_eq!(tables.descriptor_count(), DESCRIPTOR_COUNT);
    });
    assert_eq!(deleted_seen.load(Ordering::SeqCst), 1);
    let created_topic = mirror
        .topics()
        .new_descriptors_by_handle
        .latest()
        .expect("created published");
    assert!(created_topic.contains_key("m02"));
}

#[test]
fn test_create_after_delete_on_wire_is_applied() {
    let (_provider, mirror) = loaded(&ConsumerConfig::new());
    let n = mirror.version_group().mdib_version;
    let vmd1 = mirror
        .mdib()
        .read(|tables, _| tables.descriptor("vmd1").cloned())
        .expect("vmd1");
    let created = [metric_descriptor("m02", "ch0")];
    let states = [versioned(metric_state("m02", 3), 0)];
    let mut stream =
        description_modification_report(&created, &[], &[vmd1], &states, &at(&mirror, n + 1))
            .expect("report");
    let body = stream
        .msg_mut("report", "EpisodicReportMsg")
        .msg_mut("description", "DescriptionModificationReportMsg");
    if let Some(WireValue::Repeated(mut parts)) = body.remove("report_part") {
        parts.reverse();
        body.set("report_part", WireValue::Repeated(parts));
    }

    mirror.on_report(Arc::new(stream)).expect("apply");
    mirror.mdib().read(|tables, _| {
        assert_eq!(
            tables.descriptor("m02").and_then(|d| d.parent_handle.as_deref()),
            Some("ch0")
        );
        assert!(tables.state("m02").is_some_and(|s| s.descriptor.is_some()));
        assert!(tables.descriptor("vmd1").is_none());
        assert!(tables.descriptor("m11").is_none());
    });
}

#[test]
fn test_delete_removes_subtree() {
    let (_provider, mirror) = loaded(&ConsumerConfig::new());
    let n = mirror.version_group().mdib_version;
    let vmd1 = mirror
        .mdib()
        .read(|tables, _| tables.descriptor("vmd1").cloned())
        .expect("vmd1");
    let stream = description_modification_report(&[], &[], &[vmd1], &[], &at(&mirror, n + 1))
        .expect("report");
    mirror.on_report(Arc::new(stream)).expect("apply");
    mirror.mdib().read(|tables, _| {
        for handle in ["vmd1", "ch1", "m10", "m11"] {
            assert!(tables.descriptor(handle).is_none(), "{} still present", handle);
            assert!(tables.state(handle).is_none(), "state {} still present", handle);
        }
        assert_eq!(tables.descriptor_count(), DESCRIPTOR_COUNT - 4);
    });
}

#[test]
fn test_context_states_keyed_by_own_handle() {
    let (_provider, mirror) = loaded(&ConsumerConfig::new());
    let n = mirror.version_group().mdib_version;
    let states = [versioned(patient("pat.1"), 1), versioned(patient("pat.2"), 0)];
    let stream = state_report(&CONTEXT_REPORT, &states, &at(&mirror, n + 1)).expect("report");
    let outcome = mirror.on_report(Arc::new(stream)).expect("apply");
    assert_eq!(outcome, ReportOutcome::Applied(Action::EpisodicContextReport));

    mirror.mdib().read(|tables, _| {
        let mut handles: Vec<_> = tables
            .context_states_of("pat")
            .filter_map(StateContainer::handle)
            .collect();
        handles.sort_unstable();
        assert_eq!(handles, vec!["pat.1", "pat.2"]);
        assert_eq!(
            tables.context_state("pat.1").map(StateContainer::state_version),
            Some(1)
        );
    });
    let published = mirror
        .topics()
        .context_by_handle
        .latest()
        .expect("context topic");
    assert_eq!(published.len(), 2);
    assert!(published.contains_key("pat.1") && published.contains_key("pat.2"));
}

#[test]
fn test_reports_before_init_are_ignored() {
    let mirror = ConsumerMdib::new(&ConsumerConfig::new());
    let group = MdibVersionGroup::new(5, "urn:uuid:early", None);
    let outcome = mirror
        .on_report(metric_report(&group, 1, 1))
        .expect("early");
    assert_eq!(outcome, ReportOutcome::Ignored);
}
