use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::{Args, Commands};
use crate::config::Config;
use crate::metric::{Metric, NamespacedMetric};
use crate::recorder::StoreRecorder;
use crate::reporter::Reporter;
use crate::sink::LogSink;
use crate::store::MetricStore;

pub async fn execute(args: Args) -> Result<()> {
    setup_logging(&args)?;

    match args.command {
        Commands::Run {
            pipelines,
            events,
            interval,
        } => run_pipelines(args.config, pipelines, events, interval).await,
        Commands::Config { file, show } => validate_config(file, show),
    }
}

async fn run_pipelines(
    config_path: Option<PathBuf>,
    pipelines: usize,
    events: u64,
    interval: Option<u64>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    if let Some(interval) = interval {
        config.reporter.interval = Duration::from_millis(interval);
    }
    config.validate()?;
    info!(?config, "Configuration loaded");

    let store = Arc::new(MetricStore::new());

    let recorder = StoreRecorder::new(Arc::clone(&store)).with_separator(config.recorder.separator);
    if let Err(e) = recorder.install() {
        warn!("Metrics recorder already installed: {}", e);
    }

    let sink = Arc::new(LogSink::new(config.reporter.separator.clone()));
    let reporter = Reporter::spawn(Arc::clone(&store), config.reporter.clone(), sink);

    let metric = Metric::new(Arc::clone(&store));
    let started = Instant::now();

    let mut handles = Vec::with_capacity(pipelines);
    for id in 0..pipelines {
        let name = format!("pipeline_{id:02}");
        let pipeline = metric.namespace(&["node", "pipelines", name.as_str()])?;
        handles.push(tokio::task::spawn_blocking(move || {
            simulate_pipeline(pipeline, id, events)
        }));
    }

    for handle in handles {
        handle.await??;
    }

    let records = reporter.report_once()?;
    info!(
        pipelines,
        events,
        records,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Pipelines finished"
    );

    println!("{}", serde_json::to_string_pretty(&store.snapshot())?);

    Ok(())
}

fn simulate_pipeline(pipeline: NamespacedMetric, id: usize, events: u64) -> crate::Result<()> {
    let filter = pipeline.namespace(&["plugins", "filter"]);
    let output = pipeline.namespace(&["plugins", "output"]);

    for event in 0..events {
        pipeline.increment("events_in")?;

        let parsed = filter.time("duration", || std::hint::black_box(event.wrapping_mul(31)))?;
        filter.increment("events_out")?;

        if parsed % 97 == 0 {
            output.increment("dropped")?;
        } else {
            output.increment("events_out")?;
        }

        metrics::counter!("node.workers.events_total", "pipeline" => id.to_string()).increment(1);
    }

    pipeline.gauge("queue_depth", 0.0)?;
    pipeline.increment("events_out")
}

fn validate_config(file: PathBuf, show: bool) -> Result<()> {
    let config = Config::load_from_file(&file)?;
    info!("Configuration {} is valid", file.display());

    if show {
        println!("{}", toml::to_string_pretty(&config)?);
    }

    Ok(())
}

fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let log_level = match args.verbose {
        0 => args.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let use_json_format = args.log_format.eq_ignore_ascii_case("json")
        || std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

    if use_json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_thread_names(true)
                    .flatten_event(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_thread_ids(false)
                    .compact(),
            )
            .init();
    }

    Ok(())
}
