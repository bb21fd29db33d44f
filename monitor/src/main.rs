use anyhow::Context;
use audio::{CommandAudio, LogAudio};
use clap::Parser;
use feed::FeedClient;
use gui_bridge::bridge::GuiBridge;
use location::{FilePosition, NoPositioning, PositionSource};
use settings::SettingsStore;
use std::path::PathBuf;
use std::time::Duration;
use swarecore::alert::{spawn_audio_worker, AudioAlertQueue};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{WorkflowConfig, DEFAULT_FEED_BASE};
use workflow::monitor::Monitor;
use workflow::runner::Runner;

mod audio;
mod feed;
mod gui_bridge;
mod location;
mod settings;
mod workflow;

const LEGAL_NOTICE: &str = "sware is not to be used while driving and shall not be used to \
guarantee one's safety. It is alpha software - use at your own risk!";

#[derive(Parser)]
#[command(author, version, about = "Severe-weather event monitor with audio alerts")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_FEED_BASE)]
    feed_base: String,
    #[arg(long, default_value_t = 60)]
    poll_secs: u64,
    /// Directory holding the persisted settings blobs
    #[arg(long, default_value = ".")]
    settings_dir: PathBuf,
    /// Poll the feed once, print a summary and exit after queued alerts play
    #[arg(long, default_value_t = false)]
    once: bool,
    /// Expose the display view over HTTP
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.feed_base.clone(),
            args.poll_secs,
            args.settings_dir.clone(),
        )
    };

    println!("{}", LEGAL_NOTICE);

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating monitor runtime")?;
    runtime.block_on(run(args, workflow_config))
}

async fn run(args: Args, config: WorkflowConfig) -> anyhow::Result<()> {
    let store = SettingsStore::new(&config.settings_dir);
    let settings = store.load();

    let mut queue = AudioAlertQueue::new(config.settle_delay());
    queue.set_enabled(settings.toggles.audio_alerts);
    let (audio, worker) = match &config.speech_command {
        Some(speech) => spawn_audio_worker(
            queue,
            CommandAudio::new(
                speech,
                config.clip_command.as_deref(),
                config.clip_dir.clone(),
            ),
        ),
        None => spawn_audio_worker(queue, LogAudio),
    };

    let feed = FeedClient::new(&config.feed_base)?;
    let monitor = Monitor::new(Runner::new(&config, settings), feed, store, audio);

    if args.once {
        monitor.poll().await?;
        let view = monitor.view();
        let counters = monitor.metrics().snapshot();
        println!(
            "Single poll -> merged {}, displayed {}, alerts {}, dropped {}",
            counters.merged,
            view.events.len(),
            counters.alerts,
            counters.dropped
        );
        drop(monitor);
        worker.await.context("waiting for queued alerts")?;
        return Ok(());
    }

    let _server = if args.serve {
        Some(GuiBridge::new(monitor.clone()).serve(config.bind_addr()?))
    } else {
        None
    };

    let position: Box<dyn PositionSource> = match &config.position_file {
        Some(path) => Box::new(FilePosition::new(path.clone())),
        None => Box::new(NoPositioning),
    };

    let mut poll = tokio::time::interval(config.poll_interval());
    let mut locate = tokio::time::interval(config.location_interval());
    let mut clock = tokio::time::interval(Duration::from_secs(1));
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    log::info!("polling {} every {:?}", config.feed_base, config.poll_interval());
    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Err(err) = monitor.poll().await {
                    log::error!("poll cycle failed: {:#}", err);
                }
            }
            _ = locate.tick() => {
                if let Err(err) = monitor.refresh_location(position.as_ref()).await {
                    log::warn!("location refresh failed: {:#}", err);
                }
            }
            _ = clock.tick() => monitor.tick_clock(),
            res = &mut shutdown => {
                res.context("awaiting Ctrl+C to exit")?;
                log::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
