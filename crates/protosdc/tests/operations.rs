// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Set operations end to end: consumer, in-process transport, provider
//! services and the SCO worker.

mod common;

use common::{device_tree, eventually, patient};
use protosdc::config::{ConsumerConfig, ProviderConfig};
use protosdc::consumer::SdcConsumer;
use protosdc::invocation::{InvocationError, InvocationState};
use protosdc::pm::{Decimal, PmValue};
use protosdc::provider::{
    ActivateHandler, ExecuteResult, MetricValueHandler, ProposedStatesHandler, SdcProvider,
};
use protosdc::transport::{LocalTransport, Transport};
use protosdc::Error;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

struct Setup {
    // Dropped first so its receivers close before the provider goes.
    consumer: SdcConsumer,
    provider: Arc<SdcProvider>,
    transport: Arc<LocalTransport>,
}

fn setup(consumer_config: ConsumerConfig) -> Setup {
    let provider = Arc::new(SdcProvider::new(ProviderConfig::new()));
    provider.commit(device_tree()).expect("fixture");
    provider.register_operation(Arc::new(MetricValueHandler::new("op.m00", "m00")));
    provider.register_operation(Arc::new(MetricValueHandler::new("op.m01", "m01").immediate()));
    provider.register_operation(Arc::new(ProposedStatesHandler::new("op.ctx")));
    provider.register_operation(Arc::new(ActivateHandler::new("op.slow", |_, _| {
        thread::sleep(Duration::from_millis(400));
        Ok(ExecuteResult::finished(None))
    })));
    provider.register_operation(Arc::new(
        ActivateHandler::new("op.broken", |_, _| {
            Err(Error::InvalidData("device refused".to_string()))
        })
        .immediate(),
    ));
    provider.start().expect("start provider");

    let transport = Arc::new(LocalTransport::new(&provider));
    let consumer = SdcConsumer::new(transport.clone(), consumer_config);
    consumer.start_all(vec![]).expect("start consumer");
    consumer.init_mdib().expect("init mdib");
    Setup {
        consumer,
        provider,
        transport,
    }
}

fn mirrored_value(consumer: &SdcConsumer, handle: &str) -> Option<Decimal> {
    consumer.mdib().mdib().read(|tables, _| {
        match tables
            .state(handle)
            .and_then(|s| s.node.node("MetricValue"))
            .and_then(|v| v.get("Value"))
        {
            Some(PmValue::Decimal(d)) => Some(*d),
            _ => None,
        }
    })
}

#[test]
fn test_unknown_handle_fails_immediately() {
    let s = setup(ConsumerConfig::new());
    let future = s
        .consumer
        .set_value("no.such.op", Decimal::from(1))
        .expect("request");
    let result = future.wait().expect("resolved");
    assert!(result.is_failed());
    assert_eq!(
        result.invocation_info.invocation_error,
        Some(InvocationError::InvalidValue)
    );
    assert!(result.report_parts.is_empty());
    assert_eq!(s.consumer.operations().pending_count(), 0);
}

#[test]
fn test_delayed_operation_reports_wait_start_finished() {
    let s = setup(ConsumerConfig::new());
    let value: Decimal = "37.5".parse().expect("decimal");
    let future = s.consumer.set_value("op.m00", value).expect("request");
    let transaction_id = future.transaction_id();
    let result = future.wait().expect("resolved");

    assert_eq!(result.invocation_state(), InvocationState::Finished);
    assert_eq!(result.invocation_info.transaction_id, transaction_id);
    assert_eq!(result.operation_handle.as_deref(), Some("op.m00"));
    assert_eq!(result.operation_target.as_deref(), Some("m00"));
    let states: Vec<InvocationState> = result
        .report_parts
        .iter()
        .map(|p| p.invocation_info.invocation_state)
        .collect();
    assert_eq!(
        states,
        vec![
            InvocationState::Wait,
            InvocationState::Start,
            InvocationState::Finished
        ]
    );

    // The commit done by the handler reaches the mirror as a metric report.
    assert!(eventually(WAIT, || mirrored_value(&s.consumer, "m00") == Some(value)));
    assert_eq!(
        mirrored_value(&s.consumer, "m00"),
        s.provider.mdib().mdib().read(|tables, _| {
            match tables
                .state("m00")
                .and_then(|st| st.node.node("MetricValue"))
                .and_then(|v| v.get("Value"))
            {
                Some(PmValue::Decimal(d)) => Some(*d),
                _ => None,
            }
        })
    );
}

#[test]
fn test_immediate_operation_resolves_from_history() {
    let s = setup(ConsumerConfig::new());
    let future = s
        .consumer
        .set_value("op.m01", Decimal::from(12))
        .expect("request");
    let result = future.wait().expect("resolved");
    assert_eq!(result.invocation_state(), InvocationState::Finished);
    // Immediate execution reports only the final state.
    assert_eq!(result.report_parts.len(), 1);
    assert!(eventually(WAIT, || {
        mirrored_value(&s.consumer, "m01") == Some(Decimal::from(12))
    }));
}

#[test]
fn test_handler_error_resolves_failed() {
    let s = setup(ConsumerConfig::new());
    let result = s
        .consumer
        .activate("op.broken", vec![])
        .expect("request")
        .wait()
        .expect("resolved");
    assert!(result.is_failed());
    assert_eq!(result.invocation_info.invocation_error, Some(InvocationError::Other));
    assert!(result.invocation_info.error_text().contains("device refused"));
}

#[test]
fn test_set_context_state_adds_context() {
    let s = setup(ConsumerConfig::new());
    let result = s
        .consumer
        .set_context_state("op.ctx", vec![patient("pat.2")])
        .expect("request")
        .wait()
        .expect("resolved");
    assert_eq!(result.invocation_state(), InvocationState::Finished);
    assert_eq!(result.operation_target.as_deref(), Some("pat"));
    assert!(eventually(WAIT, || {
        s.consumer
            .mdib()
            .mdib()
            .read(|tables, _| tables.context_states_of("pat").count() == 2)
    }));
    let fetched = s
        .consumer
        .get_context_states(&["pat".to_string()])
        .expect("get context states");
    assert_eq!(fetched.len(), 2);
}

#[test]
fn test_watch_times_out() {
    let config = ConsumerConfig::new();
    config.set_operation_timeout(Duration::from_millis(50));
    let s = setup(config);
    let future = s.consumer.activate("op.slow", vec![]).expect("request");
    assert!(matches!(future.wait(), Err(Error::Timeout)));
    assert_eq!(s.consumer.operations().pending_count(), 0);
}

#[test]
fn test_cancel_releases_waiter() {
    let s = setup(ConsumerConfig::new());
    let future = s.consumer.activate("op.slow", vec![]).expect("request");
    assert!(s.consumer.operations().cancel(future.transaction_id()));
    assert!(matches!(future.wait(), Err(Error::Cancelled)));
}

#[test]
fn test_provider_stop_disconnects_waiters() {
    let s = setup(ConsumerConfig::new());
    let future = s.consumer.activate("op.slow", vec![]).expect("request");
    s.provider.mdib().subscriptions().stop_all();
    assert!(matches!(future.wait(), Err(Error::Disconnected)));
    assert!(eventually(WAIT, || !s.consumer.is_connected()));
}

#[test]
fn test_get_services_over_transport() {
    let s = setup(ConsumerConfig::new());
    let descriptors = s.consumer.get_md_description().expect("description");
    assert_eq!(descriptors.len(), common::DESCRIPTOR_COUNT);
    let states = s
        .consumer
        .get_md_state(&["m10".to_string(), "ch1".to_string()])
        .expect("states");
    assert_eq!(states.len(), 2);
    assert!(states.iter().all(|st| st.descriptor.is_some()));
    let stats = s.transport.stats();
    assert!(stats.requests >= 3);
    assert!(stats.bytes_received > stats.bytes_sent);
}
