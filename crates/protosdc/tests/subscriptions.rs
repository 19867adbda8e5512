// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Report fan-out from provider commits to filtered subscriptions.

mod common;

use common::{device_tree, metric_state, patient};
use protosdc::actions::Action;
use protosdc::config::ProviderConfig;
use protosdc::mdib::Transaction;
use protosdc::provider::reports::read_episodic;
use protosdc::provider::{SdcProvider, Subscription};
use protosdc::Error;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_millis(200);
const QUIET: Duration = Duration::from_millis(20);

fn next_action(subscription: &Subscription) -> Action {
    let report = subscription
        .recv_timeout(WAIT)
        .expect("report in time")
        .expect("subscription open");
    read_episodic(&report).expect("episodic").action
}

fn assert_quiet(subscription: &Subscription) {
    assert!(
        matches!(subscription.recv_timeout(QUIET), Err(Error::Timeout)),
        "unexpected report for {:?}",
        subscription.filters()
    );
}

fn provider() -> Arc<SdcProvider> {
    let provider = Arc::new(SdcProvider::new(ProviderConfig::new()));
    provider.commit(device_tree()).expect("fixture");
    provider
}

#[test]
fn test_filters_select_report_kinds() {
    let provider = provider();
    let metrics = provider.subscribe(vec!["EpisodicMetricReport".to_string()]);
    let alerts = provider.subscribe(vec!["EpisodicAlertReport".to_string()]);
    let all = provider.subscribe(vec![]);

    let mut tx = Transaction::new();
    tx.update_state(metric_state("m00", 72));
    tx.update_state(metric_state("m11", 98));
    provider.commit(tx).expect("metric commit");

    assert_eq!(next_action(&metrics), Action::EpisodicMetricReport);
    assert_eq!(next_action(&all), Action::EpisodicMetricReport);
    assert_quiet(&alerts);

    let mut tx = Transaction::new();
    tx.update_state(patient("pat.2"));
    provider.commit(tx).expect("context commit");

    assert_eq!(next_action(&all), Action::EpisodicContextReport);
    assert_quiet(&metrics);
    assert_quiet(&alerts);
}

#[test]
fn test_reports_leave_in_version_order() {
    let provider = provider();
    let all = provider.subscribe(vec![]);
    let start = provider.mdib().version_group().mdib_version;
    for value in 0..10 {
        let mut tx = Transaction::new();
        tx.update_state(metric_state("m01", value));
        provider.commit(tx).expect("commit");
    }
    for expected in start + 1..=start + 10 {
        let report = all.recv_timeout(WAIT).expect("in time").expect("open");
        let episodic = read_episodic(&report).expect("episodic");
        assert_eq!(episodic.version_group.mdib_version, expected);
    }
}

#[test]
fn test_descriptor_change_precedes_state_reports() {
    let provider = provider();
    let all = provider.subscribe(vec![]);

    let mut tx = Transaction::new();
    tx.create_descriptor(common::metric_descriptor("m02", "ch0"), vec![metric_state("m02", 1)]);
    tx.update_state(metric_state("m00", 5));
    provider.commit(tx).expect("commit");

    assert_eq!(next_action(&all), Action::DescriptionModificationReport);
    assert_eq!(next_action(&all), Action::EpisodicMetricReport);
    assert_quiet(&all);
}

#[test]
fn test_operation_invoked_needs_explicit_filter() {
    let provider = provider();
    let all = provider.subscribe(vec![]);
    let invoked = provider.subscribe_operation_invoked();
    assert!(!all.matches(Action::OperationInvokedReport));
    assert!(invoked.matches(Action::OperationInvokedReport));
    assert!(!invoked.matches(Action::EpisodicMetricReport));

    let mut tx = Transaction::new();
    tx.update_state(metric_state("m10", 3));
    provider.commit(tx).expect("commit");
    assert_quiet(&invoked);
    assert_eq!(next_action(&all), Action::EpisodicMetricReport);
}

#[test]
fn test_unsubscribe_closes_stream() {
    let provider = provider();
    let all = provider.subscribe(vec![]);
    assert_eq!(provider.mdib().subscriptions().len(), 1);

    let mut tx = Transaction::new();
    tx.update_state(metric_state("m00", 1));
    provider.commit(tx).expect("commit");

    provider.unsubscribe(all.id());
    assert!(all.is_closed());
    assert!(provider.mdib().subscriptions().is_empty());
    // Queued reports are dropped; only the close remains.
    assert!(matches!(all.recv_timeout(WAIT), Ok(None)));

    let mut tx = Transaction::new();
    tx.update_state(metric_state("m00", 2));
    provider.commit(tx).expect("commit after unsubscribe");
}
