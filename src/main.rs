use behr_downloader::utils::{logger, validation::Validate};
use behr_downloader::{CliConfig, Outcome, OutputTarget, RetrievalEngine, RetrievalError, TomlConfig};
use anyhow::Context;
use clap::Parser;

fn report_failure(e: &RetrievalError) -> ! {
    tracing::error!(
        "Retrieval failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    let settings = match &config.config {
        Some(path) => {
            tracing::info!("Loading settings from {}", path.display());
            TomlConfig::from_file(path)
        }
        None => Ok(TomlConfig::default()),
    };
    let settings = match settings.and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => report_failure(&e),
    };

    if let Err(e) = config.validate() {
        report_failure(&e);
    }

    let engine = match RetrievalEngine::new(&settings) {
        Ok(engine) => engine.with_monitoring(config.monitor),
        Err(e) => report_failure(&e),
    };

    match engine.run(&config.request()).await {
        Ok(Outcome::Links(links)) => {
            let target = OutputTarget::from_arg(&config.out_file);
            target
                .write_lines(&links)
                .with_context(|| format!("Failed to write links to {}", config.out_file))?;
            tracing::info!("Listed {} links", links.len());
        }
        Ok(Outcome::Downloaded(paths)) => {
            tracing::info!(
                "Downloaded {} archives to {}",
                paths.len(),
                config.out_dir.display()
            );
        }
        Err(e) => report_failure(&e),
    }

    Ok(())
}
