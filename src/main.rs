use anyhow::{bail, Context};
use std::path::Path;
use tokio::fs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ativeplay_catalog::config::Config;
use ativeplay_catalog::models::{Category, CategoryContent, Library};
use ativeplay_catalog::services::library::IngestReport;
use ativeplay_catalog::services::{ingest, LibraryStore, MemoryStore, Snapshot};

/// Read the playlist file, enforcing the size cap and UTF-8 input
async fn read_playlist(path: &str, max_bytes: u64) -> anyhow::Result<String> {
    let meta = fs::metadata(path)
        .await
        .with_context(|| format!("Failed to stat playlist {}", path))?;

    if meta.len() > max_bytes {
        bail!(
            "Playlist too large: {:.1}MB (limit {}MB)",
            meta.len() as f64 / 1024f64 / 1024f64,
            max_bytes / 1024 / 1024
        );
    }

    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read playlist {}", path))?;
    tracing::info!("Playlist size: {:.2} MB", bytes.len() as f64 / 1024.0 / 1024.0);

    String::from_utf8(bytes).context("Playlist is not valid UTF-8")
}

/// Write the library snapshot as JSON
async fn write_library(path: &str, report: &IngestReport, snapshot: &Snapshot) -> anyhow::Result<()> {
    let document = serde_json::json!({
        "hash": report.source_hash,
        "updatedAt": snapshot.updated_at,
        "stats": report.stats,
        "library": snapshot.library.as_ref(),
    });

    let body = serde_json::to_vec_pretty(&document)?;
    fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write library file {}", path))?;

    tracing::info!("Library saved to {}", path);
    Ok(())
}

/// Write one `<category>.m3u` per non-empty category
async fn write_exports(dir: &str, library: &Library) -> anyhow::Result<usize> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create export dir {}", dir))?;

    let mut written = 0;
    for category in Category::ALL {
        let Some(content) = library.get(category) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }

        let export = library.export(category);
        let target = Path::new(dir).join(&export.filename);
        fs::write(&target, export.body.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", target.display()))?;

        tracing::info!(
            %category,
            entries = content.len(),
            content_type = export.content_type,
            "Exported {}",
            target.display()
        );
        written += 1;
    }

    Ok(written)
}

fn log_summary(library: &Library) {
    for (category, content) in &library.categories {
        match content {
            CategoryContent::Flat(items) => {
                tracing::info!(%category, items = items.len(), "Category summary");
            }
            CategoryContent::Episodic(shows) => {
                tracing::info!(%category, shows = shows.len(), episodes = content.len(), "Category summary");
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ativeplay_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration; a CLI argument overrides PLAYLIST_PATH
    let mut config = Config::from_env();
    if let Some(arg) = std::env::args().nth(1) {
        config.playlist_path = Some(arg);
    }

    tracing::info!("Starting AtivePlay Catalog v{}", env!("CARGO_PKG_VERSION"));

    let path = config
        .playlist_path
        .clone()
        .context("No playlist given: pass a path or set PLAYLIST_PATH")?;

    let text = read_playlist(&path, config.max_m3u_bytes()).await?;
    let report = ingest(&text, &config.parse_options());

    if report.stats.total == 0 {
        tracing::warn!("No entries parsed from {}", path);
    }

    let store = MemoryStore::new();
    let snapshot = store.replace(report.library.clone());
    log_summary(&snapshot.library);

    write_library(&config.library_file, &report, &snapshot).await?;
    let exported = write_exports(&config.export_dir, &snapshot.library).await?;

    tracing::info!(
        exported,
        duplicates_skipped = report.duplicates_skipped,
        "Done: {} entries from {}",
        report.stats.total,
        path
    );

    Ok(())
}
