use anyhow::Context;
use clap::Parser;
use finance_client::config::cli::Command;
use finance_client::core::fetcher::render_value;
use finance_client::finance::ProjectionKind;
use finance_client::utils::{logger, validation::Validate};
use finance_client::{
    CliConfig, ConfigProvider, ConsoleSink, Dashboard, FileSink, FinanceClientError, OutputSink,
    RefreshReport, ResourceFetcher, TomlConfig,
};
use std::path::Path;

const EXIT_REMOTE_FAILURE: i32 = 3;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting finance-client");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::error!("❌ {:#}", err);
            eprintln!("❌ {:#}", err);

            let code = match err.downcast_ref::<FinanceClientError>() {
                Some(e) => {
                    eprintln!("💡 {}", e.recovery_suggestion());
                    e.exit_code()
                }
                None => 1,
            };
            std::process::exit(code);
        }
    }
}

fn load_settings(cli: &CliConfig) -> anyhow::Result<Box<dyn ConfigProvider>> {
    match &cli.config {
        Some(path) => {
            let mut config = TomlConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            let overridden = cli.merge_into(&mut config);
            if !overridden.is_empty() {
                tracing::warn!(
                    "Flags override {}: {}",
                    path.display(),
                    overridden.join(", ")
                );
            }
            config.validate()?;
            Ok(Box::new(config))
        }
        None => {
            cli.validate()?;
            Ok(Box::new(cli.clone()))
        }
    }
}

fn build_sink(settings: &dyn ConfigProvider) -> Box<dyn OutputSink> {
    if settings.write_to_stdout() {
        Box::new(ConsoleSink::new())
    } else {
        let sink = FileSink::new(settings.output_dir());
        tracing::debug!("Writing targets under {}", sink.base_path().display());
        Box::new(sink)
    }
}

async fn run(cli: &CliConfig) -> anyhow::Result<i32> {
    let settings = load_settings(cli)?;
    let fetcher = ResourceFetcher::from_config(settings.as_ref())?;

    match cli.command() {
        Command::Fetch { names } => {
            let dashboard =
                Dashboard::from_config(settings.as_ref(), fetcher, build_sink(settings.as_ref()));
            let report = if names.is_empty() {
                dashboard.refresh_all().await
            } else {
                dashboard.refresh_selected(&names).await?
            };
            Ok(summarize(&report))
        }
        Command::Health => {
            let health = fetcher.health().await?;
            println!("{}: {}", fetcher.base_url(), health.status);
            if health.is_healthy() {
                Ok(0)
            } else {
                tracing::warn!("Service reported status {}", health.status);
                Ok(EXIT_REMOTE_FAILURE)
            }
        }
        Command::Index => {
            let index = fetcher.index().await?;
            println!("{}", index.message);
            for (name, path) in &index.endpoints {
                println!("  {:<12} {}", name, path);
            }
            Ok(0)
        }
        Command::Project {
            kind,
            input,
            remote,
        } => {
            project(&fetcher, build_sink(settings.as_ref()).as_ref(), kind, &input, remote).await?;
            Ok(0)
        }
    }
}

async fn project(
    fetcher: &ResourceFetcher,
    sink: &dyn OutputSink,
    kind: ProjectionKind,
    input: &Path,
    remote: bool,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let assumptions: serde_json::Value =
        serde_json::from_str(&raw).map_err(FinanceClientError::from)?;

    let (source, value) = if remote {
        let value = fetcher.post_json(kind.endpoint(), &assumptions).await?;
        (fetcher.endpoint_url(kind.endpoint()), value)
    } else {
        tracing::debug!("Computing {:?} projection locally", kind);
        (input.display().to_string(), kind.compute(assumptions)?)
    };

    let rendered = render_value(kind.endpoint(), kind.target(), source, &value, sink).await?;
    tracing::info!("✅ Projection written to {}", rendered.target);
    Ok(())
}

fn summarize(report: &RefreshReport) -> i32 {
    for rendered in report.outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        tracing::info!("✅ {} -> {}", rendered.url, rendered.target);
    }
    for (resource, e) in report.errors() {
        tracing::error!("❌ {}: {}", resource, e);
        eprintln!("❌ {}: {}", resource, e);
        eprintln!("💡 {}", e.recovery_suggestion());
    }

    tracing::info!(
        "Refreshed {} of {} resources",
        report.succeeded(),
        report.outcomes.len()
    );

    if report.is_success() {
        0
    } else {
        EXIT_REMOTE_FAILURE
    }
}
