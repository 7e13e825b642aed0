//! `partfetch probe <url>` – HEAD the URL and show what the server reports.

use anyhow::{Context, Result};
use partfetch_core::config::PartfetchConfig;
use partfetch_core::{fetch_head, FetchOptions};

pub async fn run_probe(cfg: &PartfetchConfig, url: &str) -> Result<()> {
    let opts = FetchOptions::from(cfg);
    let head = tokio::task::spawn_blocking({
        let url = url.to_string();
        move || fetch_head::probe(&url, &opts)
    })
    .await
    .context("probe task join")??;

    match head.content_length() {
        Ok(size) => println!("Size:          {} bytes", size),
        Err(issue) => println!("Size:          unknown ({})", issue),
    }
    println!(
        "Range support: {}",
        if head.accept_ranges { "bytes" } else { "not advertised" }
    );
    if let Some(t) = &head.content_type {
        println!("Content-Type:  {}", t);
    }
    if let Some(etag) = &head.etag {
        println!("ETag:          {}", etag);
    }
    if let Some(lm) = &head.last_modified {
        println!("Last-Modified: {}", lm);
    }
    Ok(())
}
