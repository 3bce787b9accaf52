//! # End-to-end BB84 scenarios
//!
//! Full runs through `Bb84Service` against every channel adapter.
//!
//! ## Test Categories
//!
//! 1. **Honest channels** - key length, QBER, channel accounting
//! 2. **Eavesdropping and noise** - gate aborts and acceptance
//! 3. **Channel failures** - quotas, batch budgets, bad parameters
//! 4. **Reproducibility and concurrency**

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use qkd_bb84::algorithms::{estimate_qber, protocol_rng, SecurityGate};
use qkd_bb84::domain::{SiftedPair, SiftedSequence};
use qkd_bb84::{
    BB84Result, Basis, Bb84Service, Bit, ChannelError, ChannelSelector, IdealChannel,
    KeyDistributionApi, Metrics, ProtocolConfig, ProtocolConfigBuilder, ProtocolError,
    QuantumChannelAdapter,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

fn config(n: usize, s: usize, seed: u64) -> ProtocolConfig {
    ProtocolConfigBuilder::new()
        .key_length(n)
        .sample_size(s)
        .seed(seed)
        .build()
        .unwrap()
}

/// Counts adapter calls and forwards to an ideal channel.
struct CountingChannel {
    inner: IdealChannel,
    calls: AtomicUsize,
}

impl CountingChannel {
    fn new() -> Self {
        Self {
            inner: IdealChannel::new(Some(0)),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QuantumChannelAdapter for CountingChannel {
    async fn measure(
        &self,
        alice_bits: &[Bit],
        alice_bases: &[Basis],
        bob_bases: &[Basis],
    ) -> Result<Vec<Bit>, ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.measure(alice_bits, alice_bases, bob_bases).await
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn assert_partition(result: &BB84Result) {
    let sampled: HashSet<usize> = result.sample_indices.iter().copied().collect();
    let kept: HashSet<usize> = result.kept_indices.iter().copied().collect();

    assert_eq!(sampled.len(), result.sample_indices.len(), "duplicate sample index");
    assert!(sampled.is_disjoint(&kept));
    assert!(result
        .sample_indices
        .iter()
        .chain(&result.kept_indices)
        .all(|&i| i < result.sifted_size_before_sample));
    assert!(result.kept_indices.windows(2).all(|w| w[0] < w[1]));
}

// =============================================================================
// HONEST CHANNELS
// =============================================================================

#[tokio::test]
async fn test_ideal_channel_single_batch() {
    let result = Bb84Service::new()
        .generate_key(&config(100, 10, 42))
        .await
        .unwrap();

    assert_eq!(result.key_bits.len(), 100);
    assert_eq!(result.qber_sample, 0.0);
    assert_eq!(result.raw_transmissions, 1024);
    assert!(result.sifted_size_before_sample >= 110);
    assert_eq!(result.sample_indices.len(), 10);
    assert_eq!(result.kept_indices.len(), 100);
    assert_partition(&result);
}

#[tokio::test]
async fn test_long_key_spans_batches() {
    let cfg = ProtocolConfigBuilder::new()
        .key_length(2000)
        .sample_size(200)
        .batch_size(512)
        .seed(11)
        .build()
        .unwrap();

    let result = Bb84Service::new().generate_key(&cfg).await.unwrap();

    assert_eq!(result.key_bits.len(), 2000);
    assert_eq!(result.raw_transmissions % 512, 0);
    assert!(result.raw_transmissions >= 4096);
    assert!(result.sifted_size_before_sample >= 2200);
    assert_partition(&result);
}

#[tokio::test]
async fn test_key_length_one() {
    let result = Bb84Service::new()
        .generate_key(&config(1, 1, 5))
        .await
        .unwrap();
    assert_eq!(result.key_bits.len(), 1);
    assert_eq!(result.qber_sample, 0.0);
}

#[tokio::test]
async fn test_result_serializes_to_json() {
    let result = Bb84Service::new()
        .generate_key(&config(16, 4, 8))
        .await
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let back: BB84Result = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[tokio::test]
async fn test_unchecked_result_serializes_to_json() {
    let result = Bb84Service::new()
        .generate_key(&config(16, 0, 8))
        .await
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"qber_sample\":null"));

    let back: BB84Result = serde_json::from_str(&json).unwrap();
    assert!(back.qber_sample.is_nan());
    assert_eq!(back, result);
}

// =============================================================================
// EAVESDROPPING AND NOISE
// =============================================================================

#[tokio::test]
async fn test_full_intercept_resend_is_detected() {
    let cfg = config(100, 100, 21).with_channel(ChannelSelector::InterceptResend {
        intercept_ratio: 1.0,
    });

    let err = Bb84Service::new().generate_key(&cfg).await.unwrap_err();
    assert!(err.is_security_violation(), "got {err}");
}

#[tokio::test]
async fn test_intercept_resend_qber_averages_a_quarter() {
    let service = Bb84Service::new();
    let mut total = 0.0;
    let runs = 10;

    for seed in 0..runs {
        let cfg = ProtocolConfigBuilder::new()
            .key_length(100)
            .sample_size(400)
            .qber_threshold(1.0)
            .seed(seed)
            .channel(ChannelSelector::InterceptResend { intercept_ratio: 1.0 })
            .build()
            .unwrap();
        total += service.generate_key(&cfg).await.unwrap().qber_sample;
    }

    let mean = total / runs as f64;
    assert!((mean - 0.25).abs() < 0.04, "mean QBER {mean}");
}

#[test]
fn test_ten_percent_sample_error_is_reported_exactly() {
    // Sample covers every sifted position, so one mismatch in ten is exact
    let sifted: SiftedSequence = (0..10)
        .map(|i| SiftedPair {
            alice: Bit::One,
            bob: if i == 4 { Bit::Zero } else { Bit::One },
        })
        .collect();

    let mut rng = protocol_rng(Some(42));
    let report = estimate_qber(&sifted, 10, &mut rng).unwrap();
    assert_eq!(report.errors, 1);

    let mut gate = SecurityGate::new(0.02);
    match gate.evaluate(&report) {
        Err(ProtocolError::SecurityViolation { qber, threshold }) => {
            assert_eq!(qber, 0.10);
            assert_eq!(threshold, 0.02);
        }
        other => panic!("expected security violation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_noise_above_threshold_aborts() {
    let cfg = config(100, 400, 9).with_channel(ChannelSelector::Noisy {
        flip_probability: 0.1,
    });

    match Bb84Service::new().generate_key(&cfg).await {
        Err(ProtocolError::SecurityViolation { qber, threshold }) => {
            assert!(qber > threshold);
            assert_eq!(threshold, 0.02);
        }
        other => panic!("expected security violation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_noise_below_relaxed_threshold_is_accepted() {
    let cfg = ProtocolConfigBuilder::new()
        .key_length(100)
        .sample_size(400)
        .qber_threshold(0.2)
        .seed(9)
        .channel(ChannelSelector::Noisy { flip_probability: 0.1 })
        .build()
        .unwrap();

    let result = Bb84Service::new().generate_key(&cfg).await.unwrap();
    assert!(result.qber_sample > 0.0 && result.qber_sample <= 0.2);
    assert_eq!(result.key_bits.len(), 100);
}

#[tokio::test]
async fn test_zero_sample_accepts_despite_eavesdropper() {
    let cfg = config(64, 0, 3).with_channel(ChannelSelector::InterceptResend {
        intercept_ratio: 1.0,
    });

    let result = Bb84Service::new().generate_key(&cfg).await.unwrap();
    assert!(result.qber_sample.is_nan());
    assert!(result.sample_indices.is_empty());
    assert_eq!(result.key_bits.len(), 64);
}

// =============================================================================
// CHANNEL FAILURES
// =============================================================================

#[tokio::test]
async fn test_session_quota_exhausts_channel() {
    let cfg = config(1000, 0, 4).with_channel(ChannelSelector::Limited {
        inner: Box::new(ChannelSelector::Ideal),
        max_transmissions: 1024,
    });

    match Bb84Service::new().generate_key(&cfg).await {
        Err(ProtocolError::ChannelExhausted { batch, source }) => {
            assert_eq!(batch, 2);
            assert_eq!(
                source,
                ChannelError::QueueLimit {
                    used: 1024,
                    limit: 1024
                }
            );
        }
        other => panic!("expected channel exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_config_never_touches_channel() {
    let channel = CountingChannel::new();
    let service = Bb84Service::new();

    let bad = [
        ProtocolConfig {
            key_length: 0,
            ..Default::default()
        },
        ProtocolConfig {
            batch_size: 0,
            ..Default::default()
        },
        ProtocolConfig {
            qber_threshold: 1.5,
            ..Default::default()
        },
    ];

    for cfg in &bad {
        let result = service.run_with_channel(cfg, &channel).await;
        assert!(matches!(result, Err(ProtocolError::Configuration(_))));
    }
    assert_eq!(channel.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bad_channel_parameter_is_configuration_error() {
    let cfg = config(10, 2, 1).with_channel(ChannelSelector::Noisy {
        flip_probability: 2.0,
    });
    let result = Bb84Service::new().generate_key(&cfg).await;
    assert!(matches!(result, Err(ProtocolError::Configuration(_))));
}

#[tokio::test]
async fn test_batch_budget_reports_insufficient_material() {
    let cfg = ProtocolConfigBuilder::new()
        .key_length(5000)
        .sample_size(0)
        .batch_size(256)
        .max_batches(3)
        .seed(2)
        .build()
        .unwrap();

    match Bb84Service::new().generate_key(&cfg).await {
        Err(ProtocolError::InsufficientKeyMaterial { have, need }) => {
            assert_eq!(need, 5000);
            assert!(have <= 768);
        }
        other => panic!("expected insufficient material, got {other:?}"),
    }
}

// =============================================================================
// REPRODUCIBILITY AND CONCURRENCY
// =============================================================================

#[tokio::test]
async fn test_same_seed_same_result() {
    let cfg = ProtocolConfigBuilder::new()
        .key_length(300)
        .sample_size(50)
        .batch_size(256)
        .qber_threshold(0.5)
        .seed(1234)
        .channel(ChannelSelector::Noisy { flip_probability: 0.05 })
        .build()
        .unwrap();

    let service = Bb84Service::new();
    let a = service.generate_key(&cfg).await.unwrap();
    let b = service.generate_key(&cfg).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_same_seed_same_unchecked_result() {
    let cfg = config(16, 0, 8).with_channel(ChannelSelector::Noisy {
        flip_probability: 0.05,
    });

    let service = Bb84Service::new();
    let a = service.generate_key(&cfg).await.unwrap();
    let b = service.generate_key(&cfg).await.unwrap();
    assert!(a.qber_sample.is_nan());
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_different_seeds_differ() {
    let service = Bb84Service::new();
    let a = service.generate_key(&config(128, 16, 1)).await.unwrap();
    let b = service.generate_key(&config(128, 16, 2)).await.unwrap();
    assert_ne!(a.key_bits, b.key_bits);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_runs_are_independent() {
    let metrics = Arc::new(Metrics::new());
    let service = Arc::new(Bb84Service::with_metrics(metrics.clone()));

    let honest = config(200, 20, 77);
    let tapped = config(200, 100, 78).with_channel(ChannelSelector::InterceptResend {
        intercept_ratio: 1.0,
    });

    let (ok, aborted) = tokio::join!(service.generate_key(&honest), service.generate_key(&tapped));

    assert_eq!(ok.unwrap().key_bits.len(), 200);
    assert!(aborted.unwrap_err().is_security_violation());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.runs_started, 2);
    assert_eq!(snapshot.keys_accepted, 1);
    assert_eq!(snapshot.security_aborts, 1);
    assert_eq!(snapshot.key_bits, 200);
    assert_eq!(snapshot.sampled_bits, 120);
}
