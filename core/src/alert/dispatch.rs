use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::alert::intent::AlertIntent;
use crate::alert::queue::{AlertItem, AudioAlertQueue, QueueAction};
use crate::prelude::{CoreError, CoreResult};

/// Speech and clip playback capability.
///
/// Each call must resolve exactly once, with `Ok` on normal completion or `Err`
/// when playback failed. Either outcome advances the queue.
#[async_trait]
pub trait AudioOutput: Send {
    async fn speak(&mut self, text: &str) -> CoreResult<()>;
    async fn play_clip(&mut self, clip: &str) -> CoreResult<()>;
}

#[derive(Debug)]
enum AudioCommand {
    Enqueue(AlertItem),
    SetEnabled(bool),
}

/// Cloneable sender side of a running audio worker.
#[derive(Debug, Clone)]
pub struct AudioHandle {
    tx: mpsc::UnboundedSender<AudioCommand>,
}

impl AudioHandle {
    pub fn enqueue(&self, item: AlertItem) -> CoreResult<()> {
        self.tx
            .send(AudioCommand::Enqueue(item))
            .map_err(|_| CoreError::ChannelClosed)
    }

    /// Queues the EAS tone (when requested) followed by the spoken text.
    pub fn announce(&self, intent: &AlertIntent) -> CoreResult<()> {
        AlertItem::for_intent(intent)
            .into_iter()
            .try_for_each(|item| self.enqueue(item))
    }

    pub fn set_enabled(&self, enabled: bool) -> CoreResult<()> {
        self.tx
            .send(AudioCommand::SetEnabled(enabled))
            .map_err(|_| CoreError::ChannelClosed)
    }
}

/// Starts the drain loop on the current runtime.
///
/// The worker exits once every handle is dropped and the queue is idle.
pub fn spawn_audio_worker<O>(queue: AudioAlertQueue, output: O) -> (AudioHandle, JoinHandle<()>)
where
    O: AudioOutput + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(drain(queue, output, rx));
    (AudioHandle { tx }, worker)
}

fn apply(queue: &mut AudioAlertQueue, command: AudioCommand) -> QueueAction {
    match command {
        AudioCommand::Enqueue(item) => queue.enqueue(item),
        AudioCommand::SetEnabled(enabled) => {
            queue.set_enabled(enabled);
            QueueAction::Nothing
        }
    }
}

async fn play<O: AudioOutput>(output: &mut O, item: &AlertItem) -> CoreResult<()> {
    match item {
        AlertItem::Clip(clip) => output.play_clip(clip).await,
        AlertItem::Utterance(text) => output.speak(text).await,
    }
}

async fn drain<O: AudioOutput>(
    mut queue: AudioAlertQueue,
    mut output: O,
    mut rx: mpsc::UnboundedReceiver<AudioCommand>,
) {
    let mut open = true;
    let mut action = QueueAction::Nothing;

    loop {
        action = match action {
            QueueAction::Play(item) => {
                let outcome = {
                    let playback = play(&mut output, &item);
                    tokio::pin!(playback);
                    loop {
                        tokio::select! {
                            outcome = &mut playback => break outcome,
                            command = rx.recv(), if open => match command {
                                // Busy: enqueues only append.
                                Some(command) => {
                                    apply(&mut queue, command);
                                }
                                None => open = false,
                            },
                        }
                    }
                };
                if let Err(err) = outcome {
                    log::warn!("audio item {:?} failed: {}", item, err);
                }
                queue.complete()
            }
            QueueAction::Wait(delay) => {
                let settle = tokio::time::sleep(delay);
                tokio::pin!(settle);
                loop {
                    tokio::select! {
                        _ = &mut settle => break,
                        command = rx.recv(), if open => match command {
                            Some(command) => {
                                apply(&mut queue, command);
                            }
                            None => open = false,
                        },
                    }
                }
                queue.settle_elapsed()
            }
            QueueAction::Nothing => {
                if !open {
                    break;
                }
                match rx.recv().await {
                    Some(command) => apply(&mut queue, command),
                    None => {
                        open = false;
                        QueueAction::Nothing
                    }
                }
            }
        };
    }

    log::debug!("audio worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    const ITEM_LENGTH: Duration = Duration::from_secs(1);

    #[derive(Debug, Clone)]
    struct Played {
        name: String,
        started: Instant,
        ended: Instant,
    }

    #[derive(Clone, Default)]
    struct FakeOutput {
        log: Arc<Mutex<Vec<Played>>>,
        busy: Arc<Mutex<bool>>,
    }

    impl FakeOutput {
        async fn perform(&self, name: &str) {
            {
                let mut busy = self.busy.lock().unwrap();
                assert!(!*busy, "overlapping playback of {name}");
                *busy = true;
            }
            let started = Instant::now();
            tokio::time::sleep(ITEM_LENGTH).await;
            *self.busy.lock().unwrap() = false;
            self.log.lock().unwrap().push(Played {
                name: name.to_string(),
                started,
                ended: Instant::now(),
            });
        }

        fn names(&self) -> Vec<String> {
            self.log.lock().unwrap().iter().map(|p| p.name.clone()).collect()
        }
    }

    #[async_trait]
    impl AudioOutput for FakeOutput {
        async fn speak(&mut self, text: &str) -> CoreResult<()> {
            self.perform(text).await;
            Ok(())
        }

        async fn play_clip(&mut self, clip: &str) -> CoreResult<()> {
            self.perform(clip).await;
            Err(CoreError::Playback("no audio device".into()))
        }
    }

    fn say(text: &str) -> AlertItem {
        AlertItem::Utterance(text.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn drains_fifo_with_settle_delay_and_survives_failures() {
        let output = FakeOutput::default();
        let (handle, worker) = spawn_audio_worker(AudioAlertQueue::default(), output.clone());

        handle.enqueue(say("first")).unwrap();
        handle.enqueue(AlertItem::Clip("eas".into())).unwrap();
        handle.enqueue(say("second")).unwrap();
        drop(handle);
        worker.await.unwrap();

        assert_eq!(output.names(), vec!["first", "eas", "second"]);
        let log = output.log.lock().unwrap();
        for pair in log.windows(2) {
            assert!(pair[1].started >= pair[0].ended + Duration::from_secs(2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_during_playback_appends() {
        let output = FakeOutput::default();
        let (handle, worker) = spawn_audio_worker(AudioAlertQueue::default(), output.clone());

        handle.enqueue(say("first")).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle
            .announce(&AlertIntent::MesoscaleDiscussion {
                id: 12,
                watch_probability: None,
            })
            .unwrap();
        drop(handle);
        worker.await.unwrap();

        assert_eq!(
            output.names(),
            vec![
                "first".to_string(),
                "The Storm Prediction Center has issued mesoscale discussion 12.".to_string()
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_queue_ignores_new_items() {
        let output = FakeOutput::default();
        let (handle, worker) = spawn_audio_worker(AudioAlertQueue::default(), output.clone());

        handle.set_enabled(false).unwrap();
        handle.enqueue(say("muted")).unwrap();
        handle.set_enabled(true).unwrap();
        handle.enqueue(say("heard")).unwrap();
        drop(handle);
        worker.await.unwrap();

        assert_eq!(output.names(), vec!["heard"]);
    }
}
