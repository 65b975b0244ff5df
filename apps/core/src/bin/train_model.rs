// Trains the stress classifier on the built-in corpus and writes the artifact.

use anyhow::Context;
use escapestress_core::brain::corpus::TRAINING_EXAMPLES;
use escapestress_core::brain::training::train;
use escapestress_core::config::Settings;
use escapestress_core::logging::init_tracing;
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let settings = Settings::from_env().context("Invalid configuration")?;
    init_tracing(settings.log_format);

    let (model, report) = train(TRAINING_EXAMPLES);
    info!("Classification report:\n{}", report);

    model
        .save(&settings.model_path)
        .with_context(|| format!("Cannot write {:?}", settings.model_path))?;
    info!("✅ Model saved at {:?}", settings.model_path);
    Ok(())
}
