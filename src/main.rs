mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::CampaignApp;
use campaign_dashboard::config::DashboardConfig;
use campaign_dashboard::{apply, global_kpis, load_file_with, FilterChoices, FilterSelection};
use clap::Parser;
use eframe::egui;
use serde::Serialize;
use state::AppState;

/// Explore the bank marketing campaign dataset.
#[derive(Debug, Parser)]
#[command(name = "campaign-dashboard", version)]
struct Cli {
    /// Dataset to open (.csv, .json or .parquet).
    data: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field separator for delimited text (default `;`).
    #[arg(long)]
    delimiter: Option<char>,

    /// Print the aggregates as JSON instead of opening a window.
    #[arg(long)]
    summary: bool,

    /// Restrict `--summary` to one job.
    #[arg(long, requires = "summary")]
    job: Option<String>,

    /// Restrict `--summary` to one education level.
    #[arg(long, requires = "summary")]
    education: Option<String>,

    /// Restrict `--summary` to one contact month.
    #[arg(long, requires = "summary")]
    month: Option<String>,
}

impl Cli {
    /// Config file values, overridden by anything given on the command line.
    fn resolve_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(data) = &self.data {
            config.data_path = Some(data.clone());
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        config.delimiter_byte()?;
        Ok(config)
    }

    fn selection(&self) -> FilterSelection {
        FilterSelection {
            job: self.job.clone(),
            education: self.education.clone(),
            month: self.month.clone(),
        }
    }
}

#[derive(Serialize)]
struct Summary {
    source: String,
    global: campaign_dashboard::GlobalKpis,
    choices: FilterChoices,
    filtered: campaign_dashboard::AggregateResult,
}

fn print_summary(config: &DashboardConfig, selection: &FilterSelection) -> Result<()> {
    let path = config
        .data_path
        .as_deref()
        .context("--summary needs a dataset path")?;
    let dataset = load_file_with(path, config.delimiter_byte()?)
        .with_context(|| format!("loading {}", path.display()))?;

    let summary = Summary {
        source: dataset.source().to_owned(),
        global: global_kpis(&dataset),
        choices: FilterChoices::from_dataset(&dataset),
        filtered: apply(&dataset, selection),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_gui(config: DashboardConfig) -> Result<()> {
    let [width, height] = config.window_size;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let initial = config.data_path.clone();
    let mut state = AppState::new(config);
    if let Some(path) = initial {
        state.open(&path);
    }

    eframe::run_native(
        "Campaign Dashboard – Bank Marketing",
        options,
        Box::new(move |_cc| Ok(Box::new(CampaignApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if cli.summary {
        print_summary(&config, &cli.selection())
    } else {
        run_gui(config)
    }
}
