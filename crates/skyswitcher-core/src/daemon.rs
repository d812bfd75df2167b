// SkySwitcher Daemon State
// Routes each raw key event through the detector, tracker and emitter

use std::time::Instant;

use crate::config::Config;
use crate::correction::{CorrectionEmitter, CorrectionOutcome};
use crate::gesture::GestureDetector;
use crate::input::KeyEvent;
use crate::layout::{LayoutId, Transliterator};
use crate::output::KeySink;
use crate::tracker::WordTracker;
use crate::{Action, Key, Modifiers};

/// All mutable engine state, owned by the single event-loop thread.
pub struct Daemon<S: KeySink> {
    detector: GestureDetector,
    tracker: WordTracker,
    modifiers: Modifiers,
    active_layout: LayoutId,
    emitter: CorrectionEmitter<S>,
    wait_for_release: bool,
    pending: bool,
}

impl<S: KeySink> Daemon<S> {
    pub fn new(config: &Config, sink: S) -> Self {
        Self {
            detector: GestureDetector::new(config.trigger, config.double_press),
            tracker: WordTracker::new(config.buffer_cap, config.idle_reset),
            modifiers: Modifiers::new(),
            active_layout: config.initial_layout,
            emitter: CorrectionEmitter::new(
                sink,
                Transliterator::builtin(),
                config.switch_combo.clone(),
                config.switch_order,
            ),
            wait_for_release: config.wait_for_release,
            pending: false,
        }
    }

    /// Process one raw key action.
    ///
    /// Returns the outcome when a correction ran. Trigger taps reach the
    /// detector only, so the tracker never sees them as boundaries.
    pub fn dispatch(&mut self, key: Key, action: Action, now: Instant) -> Option<CorrectionOutcome> {
        self.modifiers.update(key, action);
        let event = KeyEvent::new(key, action, self.modifiers, now);

        if self.pending {
            if !self.modifiers.any_held() {
                return Some(self.correct());
            }
            if !action.is_press() || self.detector.is_trigger(&event) {
                return None;
            }
            // The key is already on screen; deleting the word now would eat it
            log::info!("typing resumed, pending correction dropped");
            self.pending = false;
        }

        let fired = self.detector.on_event(&event);
        if !self.detector.is_trigger(&event) {
            self.tracker.on_key_event(&event);
        }
        if !fired {
            return None;
        }

        log::debug!(
            "gesture fired, buffer '{}'",
            self.tracker.render(self.emitter.transliterator().table(self.active_layout))
        );

        if self.wait_for_release && self.modifiers.any_held() {
            self.pending = true;
            return None;
        }
        Some(self.correct())
    }

    fn correct(&mut self) -> CorrectionOutcome {
        self.pending = false;
        let outcome = self.emitter.try_correct(&mut self.tracker, &mut self.active_layout);
        match &outcome {
            CorrectionOutcome::Failed(_) => log::warn!("{}", outcome),
            _ => log::info!("{}", outcome),
        }
        outcome
    }

    /// Called on poll timeouts so an armed detector expires on time
    pub fn tick(&mut self, now: Instant) {
        if self.detector.expire(now) {
            log::trace!("gesture window elapsed");
        }
    }

    pub fn active_layout(&self) -> LayoutId {
        self.active_layout
    }

    pub fn tracker(&self) -> &WordTracker {
        &self.tracker
    }

    pub fn detector(&self) -> &GestureDetector {
        &self.detector
    }

    /// A gesture fired and waits for the modifiers to come up
    pub fn has_pending_correction(&self) -> bool {
        self.pending
    }

    pub fn sink(&self) -> &S {
        self.emitter.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.emitter.sink_mut()
    }

    /// Consume the daemon and return the sink for closing
    pub fn into_sink(self) -> S {
        self.emitter.into_sink()
    }
}
