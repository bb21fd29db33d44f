use async_trait::async_trait;
use std::path::PathBuf;
use swarecore::alert::AudioOutput;
use swarecore::prelude::{CoreError, CoreResult};
use tokio::process::Command;

/// Speaks and plays clips through external programs (`espeak`, `aplay`, ...).
pub struct CommandAudio {
    speech: Vec<String>,
    clip_player: Option<Vec<String>>,
    clip_dir: PathBuf,
}

fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

async fn run(argv: &[String], last: &str) -> CoreResult<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| CoreError::Playback("empty command".into()))?;
    let status = Command::new(program)
        .args(args)
        .arg(last)
        .status()
        .await
        .map_err(|err| CoreError::Playback(format!("{}: {}", program, err)))?;
    if status.success() {
        Ok(())
    } else {
        Err(CoreError::Playback(format!("{} exited with {}", program, status)))
    }
}

impl CommandAudio {
    pub fn new(speech: &str, clip_player: Option<&str>, clip_dir: PathBuf) -> Self {
        Self {
            speech: split_command(speech),
            clip_player: clip_player.map(split_command),
            clip_dir,
        }
    }

    pub fn clip_path(&self, clip: &str) -> PathBuf {
        self.clip_dir.join(format!("{}.mp3", clip))
    }
}

#[async_trait]
impl AudioOutput for CommandAudio {
    async fn speak(&mut self, text: &str) -> CoreResult<()> {
        run(&self.speech, text).await
    }

    async fn play_clip(&mut self, clip: &str) -> CoreResult<()> {
        let player = self
            .clip_player
            .as_ref()
            .ok_or_else(|| CoreError::Playback("no clip player configured".into()))?;
        let path = self.clip_path(clip);
        run(player, &path.to_string_lossy()).await
    }
}

/// Writes alerts to the log instead of a sound device.
pub struct LogAudio;

#[async_trait]
impl AudioOutput for LogAudio {
    async fn speak(&mut self, text: &str) -> CoreResult<()> {
        log::info!("ALERT: {}", text);
        Ok(())
    }

    async fn play_clip(&mut self, clip: &str) -> CoreResult<()> {
        log::info!("ALERT TONE: {}", clip);
        Ok(())
    }
}
