use std::{env, fs};

use anyhow::Context;
use log::{info, warn};
use machine_learning::LogisticRegression;
use orchestrator::configs::SwampConfig;

/// Path of the json configuration, defaults are used when unset.
const CONFIG_VAR: &str = "SWAMP_CONFIG";
/// Path the json report is written to, nothing is written when unset.
const REPORT_VAR: &str = "SWAMP_REPORT";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cfg = match env::var(CONFIG_VAR) {
        Ok(path) => SwampConfig::load(&path).with_context(|| format!("loading config {path}"))?,
        Err(_) => {
            info!("{CONFIG_VAR} not set, using the default config");
            SwampConfig::default()
        }
    };

    let (train_set, held_out) = cfg
        .dataset
        .generate(cfg.seed)
        .context("generating the datasets")?;

    let features = cfg.dataset.features;
    let (learning_rate, momentum) = (cfg.learning_rate, cfg.momentum);
    let session = orchestrator::train(&cfg, train_set, held_out, || {
        LogisticRegression::new(features, learning_rate, momentum)
    })?;

    let report = session.wait()?;

    if let Some(failure) = &report.coordinator_failure {
        warn!("the parameter server stopped early: {failure}");
    }

    for trainer in report.trainers.iter().filter(|t| t.failure.is_some()) {
        warn!(trainer_id = trainer.id; "trainer did not finish");
    }

    let best = report.best_metrics();
    println!(
        "lowest loss: {}, best accuracy: {}",
        best.lowest_loss, best.best_accuracy
    );

    if let Ok(path) = env::var(REPORT_VAR) {
        let json = report.to_json()?;
        fs::write(&path, json).with_context(|| format!("writing report {path}"))?;
        info!("report written to {path}");
    }

    Ok(())
}
