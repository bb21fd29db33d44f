use std::collections::VecDeque;
use std::time::Duration;

use crate::alert::intent::AlertIntent;

/// Clip played ahead of watch and PDS statement announcements.
pub const EAS_CLIP: &str = "eas";

/// Pause between two consecutive items.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// One unit of audio output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertItem {
    Clip(String),
    Utterance(String),
}

impl AlertItem {
    pub fn is_empty(&self) -> bool {
        match self {
            AlertItem::Clip(id) => id.is_empty(),
            AlertItem::Utterance(text) => text.trim().is_empty(),
        }
    }

    /// Items announcing `intent`, in playback order.
    pub fn for_intent(intent: &AlertIntent) -> Vec<AlertItem> {
        let mut items = Vec::with_capacity(2);
        if intent.uses_eas() {
            items.push(AlertItem::Clip(EAS_CLIP.to_string()));
        }
        items.push(AlertItem::Utterance(intent.render()));
        items
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    Playing,
    Cooldown,
}

/// What the driver must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueAction {
    Play(AlertItem),
    Wait(Duration),
    Nothing,
}

/// FIFO of pending audio items with at most one item active at a time.
///
/// The queue never touches a clock or an output device. A driver feeds it
/// `enqueue`, `complete`, and `settle_elapsed` and carries out the returned action.
#[derive(Debug)]
pub struct AudioAlertQueue {
    pending: VecDeque<AlertItem>,
    active: Option<AlertItem>,
    state: QueueState,
    enabled: bool,
    settle_delay: Duration,
}

impl AudioAlertQueue {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            active: None,
            state: QueueState::Idle,
            enabled: true,
            settle_delay,
        }
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn active(&self) -> Option<&AlertItem> {
        self.active.as_ref()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling only stops new items from being accepted; queued items still drain.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enqueue(&mut self, item: AlertItem) -> QueueAction {
        if !self.enabled || item.is_empty() {
            return QueueAction::Nothing;
        }
        self.pending.push_back(item);
        match self.state {
            QueueState::Idle => self.start_next(),
            QueueState::Playing | QueueState::Cooldown => QueueAction::Nothing,
        }
    }

    /// The active item finished, successfully or not.
    pub fn complete(&mut self) -> QueueAction {
        if self.state != QueueState::Playing {
            log::warn!("audio completion received while {:?}; ignoring", self.state);
            return QueueAction::Nothing;
        }
        self.active = None;
        if self.pending.is_empty() {
            self.state = QueueState::Idle;
            QueueAction::Nothing
        } else {
            self.state = QueueState::Cooldown;
            QueueAction::Wait(self.settle_delay)
        }
    }

    pub fn settle_elapsed(&mut self) -> QueueAction {
        if self.state != QueueState::Cooldown {
            return QueueAction::Nothing;
        }
        self.start_next()
    }

    fn start_next(&mut self) -> QueueAction {
        match self.pending.pop_front() {
            Some(item) => {
                self.state = QueueState::Playing;
                self.active = Some(item.clone());
                QueueAction::Play(item)
            }
            None => {
                self.state = QueueState::Idle;
                QueueAction::Nothing
            }
        }
    }
}

impl Default for AudioAlertQueue {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn say(text: &str) -> AlertItem {
        AlertItem::Utterance(text.to_string())
    }

    #[test]
    fn first_item_plays_immediately_then_queue_waits() {
        let mut queue = AudioAlertQueue::default();
        assert_eq!(queue.enqueue(say("one")), QueueAction::Play(say("one")));
        assert_eq!(queue.enqueue(say("two")), QueueAction::Nothing);
        assert_eq!(queue.state(), QueueState::Playing);
        assert_eq!(queue.pending_len(), 1);

        assert_eq!(queue.complete(), QueueAction::Wait(DEFAULT_SETTLE_DELAY));
        assert_eq!(queue.state(), QueueState::Cooldown);
        assert_eq!(queue.enqueue(say("three")), QueueAction::Nothing);

        assert_eq!(queue.settle_elapsed(), QueueAction::Play(say("two")));
        assert_eq!(queue.complete(), QueueAction::Wait(DEFAULT_SETTLE_DELAY));
        assert_eq!(queue.settle_elapsed(), QueueAction::Play(say("three")));
        assert_eq!(queue.complete(), QueueAction::Nothing);
        assert_eq!(queue.state(), QueueState::Idle);
        assert!(queue.active().is_none());
    }

    #[test]
    fn disabled_or_empty_items_are_dropped() {
        let mut queue = AudioAlertQueue::default();
        assert_eq!(queue.enqueue(say("   ")), QueueAction::Nothing);
        assert_eq!(
            queue.enqueue(AlertItem::Clip(String::new())),
            QueueAction::Nothing
        );
        queue.set_enabled(false);
        assert_eq!(queue.enqueue(say("hello")), QueueAction::Nothing);
        assert_eq!(queue.state(), QueueState::Idle);
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn stray_signals_do_not_advance_the_queue() {
        let mut queue = AudioAlertQueue::default();
        assert_eq!(queue.complete(), QueueAction::Nothing);
        assert_eq!(queue.settle_elapsed(), QueueAction::Nothing);

        queue.enqueue(say("one"));
        queue.enqueue(say("two"));
        assert_eq!(queue.settle_elapsed(), QueueAction::Nothing);
        assert_eq!(queue.active(), Some(&say("one")));
    }

    #[test]
    fn eas_clip_precedes_watch_utterance() {
        let intent = AlertIntent::PdsStatement;
        let items = AlertItem::for_intent(&intent);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], AlertItem::Clip(EAS_CLIP.to_string()));
        assert!(matches!(items[1], AlertItem::Utterance(_)));

        let plain = AlertIntent::MesoscaleDiscussion {
            id: 1,
            watch_probability: None,
        };
        assert_eq!(AlertItem::for_intent(&plain).len(), 1);
    }
}
