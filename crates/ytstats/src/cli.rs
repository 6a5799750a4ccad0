//! Command line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use ytstats_common::RequestedCount;
use ytstats_config::is_channel_url;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ytstats", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level, overriding the configuration
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse a channel's view counts
    Analyze(AnalyzeArgs),

    /// List the accepted video counts
    Counts,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Channel URL (/channel/, /user/, /c/ or /@handle)
    #[arg(value_parser = parse_channel_url)]
    pub url: String,

    /// How many recent videos to analyse: `all` or a multiple of 50 up to 1000
    #[arg(short = 'n', long)]
    pub count: Option<RequestedCount>,

    /// Write the chart as SVG to this path
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Export the data and chart to an .xlsx workbook
    #[arg(short, long)]
    pub export: bool,

    /// Directory for the workbook, overriding the configuration
    #[arg(long, requires = "export")]
    pub export_dir: Option<PathBuf>,
}

fn parse_channel_url(url: &str) -> Result<String, String> {
    let url = url.trim();
    if is_channel_url(url) {
        Ok(url.to_string())
    } else {
        Err(format!(
            "'{url}' is not a YouTube channel URL (expected https://www.youtube.com/...)"
        ))
    }
}
