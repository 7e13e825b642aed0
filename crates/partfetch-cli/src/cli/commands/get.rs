//! `partfetch get <url> [segments] [output]` – segmented download, then save.

use anyhow::{Context, Result};
use partfetch_core::config::PartfetchConfig;
use partfetch_core::progress::ProgressStats;
use partfetch_core::{downloader, storage, url_model, FetchOptions};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::cli::GetArgs;

const PROGRESS_INTERVAL_MS: u64 = 500;

/// Configured options with the command-line overrides applied.
pub(crate) fn fetch_options(cfg: &PartfetchConfig, args: &GetArgs) -> FetchOptions {
    let mut opts = FetchOptions::from(cfg);
    if let Some(n) = args.max_concurrent {
        opts.max_concurrent = Some(n.get());
    }
    if let Some(secs) = args.timeout {
        opts.overall_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(n) = args.retries {
        opts.retry.max_attempts = n.saturating_add(1);
    }
    opts
}

/// Output path: explicit argument, else the name derived from the URL.
pub(crate) fn output_path(args: &GetArgs) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(url_model::derive_filename(&args.url)))
}

fn format_progress(stats: &ProgressStats) -> String {
    let eta = stats
        .eta_secs()
        .map(|s| format!("{:.0}s", s))
        .unwrap_or_else(|| "?".to_string());
    format!(
        "  {:.1} / {:.1} MiB ({:.1}%)  {}/{} segments  {:.2} MiB/s  ETA {}",
        stats.bytes_done as f64 / 1_048_576.0,
        stats.total_bytes as f64 / 1_048_576.0,
        stats.fraction() * 100.0,
        stats.segments_done,
        stats.segment_count,
        stats.bytes_per_sec() / 1_048_576.0,
        eta
    )
}

pub async fn run_get(cfg: &PartfetchConfig, args: GetArgs) -> Result<()> {
    let segments = args
        .segments
        .map(NonZeroUsize::get)
        .unwrap_or(cfg.default_segments);
    let opts = fetch_options(cfg, &args);
    let output = output_path(&args);
    tracing::info!(url = %args.url, segments, output = %output.display(), "get");

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(64);
    let printer = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        while let Some(stats) = progress_rx.recv().await {
            let due = last_print
                .map(|t| t.elapsed().as_millis() as u64 >= PROGRESS_INTERVAL_MS)
                .unwrap_or(true);
            if due || stats.is_done() {
                println!("{}", format_progress(&stats));
                last_print = Some(Instant::now());
            }
        }
    });

    let started = Instant::now();
    let url = args.url.clone();
    let fetched = tokio::task::spawn_blocking(move || {
        downloader::download(&url, segments, &opts, Some(&progress_tx))
    })
    .await
    .context("download task join")?;
    let _ = printer.await;
    let data = fetched.with_context(|| format!("download of {} failed", args.url))?;
    println!("Downloaded {} bytes in {:.2?}", data.len(), started.elapsed());

    let saved = tokio::task::spawn_blocking({
        let output = output.clone();
        move || storage::save(&output, &data)
    })
    .await
    .context("save task join")??;
    println!("Saved {} bytes to {}", saved, output.display());
    Ok(())
}
