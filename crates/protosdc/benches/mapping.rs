// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mapping Benchmark
//!
//! Measures the cost of the generic mapper and the unit codec:
//! - state and descriptor conversion to and from wire messages
//! - union wrapping of metric states
//! - a metric report from commit to bytes

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use protosdc::mapping::{from_p, state_from_p, state_to_one_of, to_p, OneOfFamily};
use protosdc::mdib::{MdibVersionGroup, StateContainer};
use protosdc::pm::descriptors::NUMERIC_METRIC_DESCRIPTOR;
use protosdc::pm::states::NUMERIC_METRIC_STATE;
use protosdc::pm::types::{CODED_VALUE, METRIC_QUALITY, NUMERIC_METRIC_VALUE};
use protosdc::pm::{Decimal, PmObject, PmValue};
use protosdc::provider::reports::{state_report, METRIC_REPORT};
use protosdc::wire::{decode_message, encode_message};

fn metric_state(handle: &str, value: i64) -> PmObject {
    let quality = PmObject::new(&METRIC_QUALITY)
        .with("Validity", PmValue::Enum("Vld".into()))
        .expect("quality");
    let metric_value = PmObject::new(&NUMERIC_METRIC_VALUE)
        .with("MetricQuality", quality)
        .and_then(|v| v.with("Value", Decimal::new(i128::from(value), 2)))
        .and_then(|v| v.with("DeterminationTime", PmValue::Timestamp(1_700_000_000.5)))
        .expect("value");
    PmObject::new(&NUMERIC_METRIC_STATE)
        .with("DescriptorHandle", handle)
        .and_then(|s| s.with("StateVersion", PmValue::UInt(12)))
        .and_then(|s| s.with("MetricValue", metric_value))
        .expect("state")
}

fn metric_descriptor() -> PmObject {
    let unit = PmObject::new(&CODED_VALUE).with("Code", "262688").expect("unit");
    PmObject::new(&NUMERIC_METRIC_DESCRIPTOR)
        .with("Handle", "hr")
        .and_then(|o| o.with("Unit", unit))
        .and_then(|o| o.with("MetricCategory", PmValue::Enum("Msrmt".into())))
        .and_then(|o| o.with("MetricAvailability", PmValue::Enum("Cont".into())))
        .and_then(|o| o.with("Resolution", Decimal::from(1)))
        .expect("descriptor")
}

fn bench_state_mapping(c: &mut Criterion) {
    let state = metric_state("hr", 7250);
    let p = to_p(&state).expect("encode");
    c.bench_function("state_to_p", |b| b.iter(|| to_p(black_box(&state))));
    c.bench_function("state_from_p", |b| b.iter(|| from_p(black_box(&p))));

    c.bench_function("state_one_of_roundtrip", |b| {
        b.iter(|| {
            let w = state_to_one_of(black_box(&state), OneOfFamily::AbstractMetricState)
                .expect("wrap");
            state_from_p(black_box(&w))
        })
    });
}

fn bench_descriptor_mapping(c: &mut Criterion) {
    let descriptor = metric_descriptor();
    let p = to_p(&descriptor).expect("encode");
    c.bench_function("descriptor_to_p", |b| b.iter(|| to_p(black_box(&descriptor))));
    c.bench_function("descriptor_from_p", |b| b.iter(|| from_p(black_box(&p))));
}

fn bench_metric_report(c: &mut Criterion) {
    let group = MdibVersionGroup::new(42, "urn:uuid:bench", None);
    let mut g = c.benchmark_group("metric_report_bytes");
    for count in [1usize, 10, 100] {
        let states: Vec<StateContainer> = (0..count)
            .map(|i| StateContainer::new(metric_state(&format!("m{}", i), i as i64)))
            .collect();
        g.bench_with_input(BenchmarkId::from_parameter(count), &states, |b, states| {
            b.iter(|| {
                let report = state_report(&METRIC_REPORT, black_box(states), &group)
                    .expect("report");
                let bytes = encode_message(&report);
                decode_message(black_box(&bytes)).expect("decode")
            })
        });
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_state_mapping,
    bench_descriptor_mapping,
    bench_metric_report
);
criterion_main!(benches);
