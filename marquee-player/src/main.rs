use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Target};
use log::{LevelFilter, info, warn};

use marquee_config::ConfigLoader;
use marquee_model::ItemId;
use marquee_player::domains::playback::track_selection::format_selected;
use marquee_player::domains::playback::{PlaybackCoordinator, PlaybackServices};
use marquee_player::infra::api_client::ApiClient;
use marquee_player::infra::runtime_config::{RuntimeConfig, track_preferences};
use marquee_player::infra::services::{
    FileCheckpointStore, HttpMediaServer, InMemoryQueue,
};

/// Headless playback driver: negotiates a stream, prints its URL and keeps
/// the server's session reporting alive until Ctrl-C.
#[derive(Debug, Parser)]
#[command(name = "marquee-player", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Item to play (server id)
    #[arg(long)]
    item: Option<String>,

    /// Start position, instead of the server's resume position
    #[arg(long)]
    start_ms: Option<u64>,

    /// Resume the unfinished session found in the checkpoint
    #[arg(long)]
    resume: bool,
}

fn init_logger() {
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("marquee_player", LevelFilter::Info)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    let load = loader.load().context("Failed to load configuration")?;
    info!(
        "Configuration loaded (file: {:?}, .env: {})",
        load.file_path, load.env_file_loaded
    );
    let config = load.config;

    let client = Arc::new(ApiClient::new(&config.server)?);
    let services = PlaybackServices {
        media_server: Arc::new(HttpMediaServer::new(
            client,
            config.server.user_id.clone(),
        )),
        queue: Arc::new(InMemoryQueue::default()),
        checkpoints: Arc::new(FileCheckpointStore::new(
            &config.storage.checkpoint_path,
        )),
    };
    let coordinator = PlaybackCoordinator::new(
        services,
        RuntimeConfig::from(&config.playback),
        track_preferences(&config.tracks),
    );

    let pending = match coordinator.pending_resume().await {
        Ok(pending) => pending,
        Err(err) => {
            warn!("Ignoring unreadable checkpoint: {}", err);
            None
        }
    };
    if let Some(checkpoint) = &pending {
        println!(
            "Unfinished session: {} at {} ms (use --resume to continue)",
            checkpoint.item_id,
            checkpoint.position_ms()
        );
    }

    let (item_id, start_ms) = match (args.item, pending) {
        (Some(raw), _) => {
            let item_id: ItemId = raw.parse()?;
            (item_id, args.start_ms)
        }
        (None, Some(checkpoint)) if args.resume => {
            (checkpoint.item_id, Some(checkpoint.position_ms()))
        }
        (None, _) => {
            println!("Nothing to play; pass --item <id>");
            return Ok(());
        }
    };

    coordinator.load_item(item_id, start_ms).await?;
    let view = coordinator.view();
    if let Some(url) = &view.stream_url {
        println!("{}", url);
    }
    info!(
        "Audio: {}, subtitles: {}",
        format_selected(&view.audio_streams, view.selected_audio_index),
        format_selected(&view.subtitle_streams, view.selected_subtitle_index)
    );

    coordinator.set_player_ready();
    let start = view
        .session
        .as_ref()
        .map(|session| session.start_position_ms)
        .unwrap_or(0);
    let duration = view.item.as_ref().and_then(|item| item.duration_ms());
    coordinator.on_playback_started(start).await;

    let started_at = tokio::time::Instant::now();
    let position = || {
        let elapsed = start + started_at.elapsed().as_millis() as u64;
        duration.map_or(elapsed, |duration| elapsed.min(duration))
    };
    let mut ticker =
        tokio::time::interval(coordinator.config().progress_interval());
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let now = position();
                if let Some(duration) = duration
                    && now >= duration
                {
                    coordinator.check_video_completion(duration, duration).await;
                    break;
                }
                coordinator.report_progress(now, false).await;
                if coordinator.update_active_segment(now)
                    && let Some(label) = coordinator.get_skip_button_label()
                {
                    println!("{}", label);
                }
                if let Some(duration) = duration {
                    coordinator.check_video_completion(now, duration).await;
                }
            }
        }
    }

    coordinator.stop_playback(position()).await;
    coordinator.finalize().await;
    Ok(())
}
