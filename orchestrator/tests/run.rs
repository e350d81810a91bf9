use machine_learning::LogisticRegression;
use orchestrator::{
    OrchestratorError,
    configs::{DatasetConfig, SwampConfig},
    report,
};
use tokio_test::{assert_err, assert_ok};

fn config() -> SwampConfig {
    SwampConfig {
        trainer_number: 3,
        epochs: 3,
        batch_size: 16,
        learning_rate: 0.05,
        free_trial_steps: 2,
        pull_probability: 0.5,
        log_interval: 500,
        loss_sample_interval: 10,
        validate_batch_size: 32,
        recv_timeout_ms: 20,
        dataset: DatasetConfig {
            samples: 20_000,
            validation_samples: 500,
            features: 8,
            separation: 2.0,
        },
        ..SwampConfig::default()
    }
}

#[test]
fn full_run_reports_every_actor() {
    let cfg = config();
    let (train_set, held_out) = assert_ok!(cfg.dataset.generate(cfg.seed));
    let features = cfg.dataset.features;

    let session = assert_ok!(orchestrator::train(&cfg, train_set, held_out, || {
        LogisticRegression::new(features, cfg.learning_rate, cfg.momentum)
    }));
    let report = assert_ok!(session.wait());

    assert!(report.coordinator_failure.is_none());
    assert_eq!(report.trainers.len(), 3);
    assert!(report.trainers.iter().all(|t| t.failure.is_none()));

    for id in 0..3 {
        assert!(report.series.contains_key(&report::trainer_key(id)));
        assert!(report.series.contains_key(&report::pull_key(id)));
    }

    let ps = report.ps();
    assert!(!ps.is_empty());
    assert!(ps.windows(2).all(|w| w[1].loss <= w[0].loss));

    let stats = report.server.unwrap();
    assert_eq!(stats.accepted, ps.len() as u64);
    assert!(stats.received >= stats.accepted + stats.rejected + stats.pre_filtered);

    let best = report.best_metrics();
    assert_eq!(best.lowest_loss, ps[ps.len() - 1].loss);
    assert!(best.best_accuracy > 0.5);

    let json: serde_json::Value = serde_json::from_str(&assert_ok!(report.to_json())).unwrap();
    assert!(json["series"]["ps"].is_array());
    assert!(json["series"]["trainer-2-pull"].is_array());
}

#[test]
fn invalid_config_never_starts() {
    let cfg = SwampConfig {
        pull_probability: 1.5,
        ..config()
    };
    let (train_set, held_out) = assert_ok!(cfg.dataset.generate(Some(3)));

    let err = assert_err!(orchestrator::train(&cfg, train_set, held_out, || {
        LogisticRegression::new(8, 0.1, 0.0)
    }));
    assert!(matches!(err, OrchestratorError::InvalidConfig(_)));
}

#[test]
fn mismatched_datasets_never_start() {
    let cfg = config();
    let (train_set, _) = assert_ok!(cfg.dataset.generate(Some(3)));
    let other = DatasetConfig {
        features: 4,
        ..cfg.dataset.clone()
    };
    let (_, held_out) = assert_ok!(other.generate(Some(3)));

    let err = assert_err!(orchestrator::train(&cfg, train_set, held_out, || {
        LogisticRegression::new(8, 0.1, 0.0)
    }));
    assert!(matches!(err, OrchestratorError::InvalidConfig(_)));
}
