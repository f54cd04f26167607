#![allow(dead_code)]

use mot2yolo::split::{Split, SplitPolicy, SplitRatios};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_split() -> impl Strategy<Value = Split> {
    prop_oneof![Just(Split::Train), Just(Split::Valid), Just(Split::Test)]
}

/// Ratios on a 1/100 grid that sum to exactly 1.
pub fn arb_ratios() -> impl Strategy<Value = SplitRatios> {
    (0u32..=100)
        .prop_flat_map(|train| (Just(train), 0u32..=(100 - train)))
        .prop_map(|(train, valid)| {
            let test = 100 - train - valid;
            SplitRatios::new(
                train as f64 / 100.0,
                valid as f64 / 100.0,
                test as f64 / 100.0,
            )
        })
}

pub fn arb_policy() -> impl Strategy<Value = SplitPolicy> {
    prop_oneof![
        arb_split().prop_map(|split| SplitPolicy::Single { split }),
        (0u32..=100, any::<u64>()).prop_map(|(train, seed)| SplitPolicy::Shuffle {
            ratios: SplitRatios::new(train as f64 / 100.0, (100 - train) as f64 / 100.0, 0.0),
            seed,
        }),
        arb_ratios().prop_map(|ratios| SplitPolicy::Chronological { ratios }),
    ]
}

/// Pixel boxes that may stick out of, or lie entirely outside, the frame.
pub fn arb_pixel_box() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (
        -2000.0f64..4000.0,
        -2000.0f64..4000.0,
        0.001f64..3000.0,
        0.001f64..3000.0,
    )
}

pub fn arb_frame_size() -> impl Strategy<Value = (u32, u32)> {
    (1u32..4000, 1u32..4000)
}
