//! ytstats - Main Entry Point

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use ytstats::{
    format_report, AnalysisCoordinator, AnalysisReport, AnalyzeArgs, Analyzer, Cli, Command,
    ResultStore,
};
use ytstats_common::{init_logging, LoggingConfig, RequestedCount, YouTubeClient};
use ytstats_config::{Config, ConfigLoader};
use ytstats_graphs::{GraphConfig, GraphRenderer, LineChartRenderer, SpreadsheetExporter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }

    let _log_guard = init_logging(&LoggingConfig::from(&config.logging))?;
    info!("Starting ytstats {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Counts => {
            for count in RequestedCount::choices() {
                println!("{count}");
            }
            Ok(())
        }
        Command::Analyze(args) => {
            let result = analyze(&config, &args).await;
            if let Err(e) = &result {
                error!("Analysis failed: {:#}", e);
            }
            result
        }
    }
}

async fn analyze(config: &Config, args: &AnalyzeArgs) -> Result<()> {
    let api_key = ConfigLoader::load_api_key(&config.youtube.api_key_file)
        .context("Cannot start without an API key")?;
    let client = YouTubeClient::new(config.youtube.client_config(api_key))?;
    let analyzer = Analyzer::from_settings(Arc::new(client), &config.fetch);

    let mut coordinator = AnalysisCoordinator::with_settings(analyzer, ResultStore::new(), &config.app);
    let requested = args
        .count
        .unwrap_or_else(|| config.fetch.default_requested_count());
    coordinator.start(args.url.clone(), requested)?;

    let outcome = tokio::select! {
        result = coordinator.finish(|line| println!("{line}")) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let report = match outcome {
        Some(result) => result?,
        None => {
            info!("Received interrupt, stopping analysis");
            let stopped = coordinator.shutdown().await;
            bail!("Analysis interrupted ({stopped:?})");
        }
    };

    print!("\n{}", format_report(&report));

    if !report.series.is_empty() {
        if let Some(path) = &args.chart {
            write_chart(config, &report, path).await?;
        }
        if args.export {
            export_workbook(config, args, &report)?;
        }
    }

    coordinator.shutdown().await;
    Ok(())
}

async fn write_chart(config: &Config, report: &AnalysisReport, path: &std::path::Path) -> Result<()> {
    let graph = GraphConfig::from(&config.chart).for_channel(&report.channel.title);
    LineChartRenderer::new()
        .render_to_file(&graph, &report.series, path)
        .await
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;
    println!("Chart written to {}", path.display());
    Ok(())
}

fn export_workbook(config: &Config, args: &AnalyzeArgs, report: &AnalysisReport) -> Result<()> {
    let mut exporter = SpreadsheetExporter::from(&config.export);
    if let Some(dir) = &args.export_dir {
        exporter = exporter.with_directory(dir);
    }

    let path = exporter
        .export(
            &report.channel.title,
            report.requested,
            chrono::Local::now().date_naive(),
            &report.series,
        )
        .context("Failed to export data")?;
    println!("Data exported successfully to {}", path.display());
    Ok(())
}
