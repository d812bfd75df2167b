// SkySwitcher End-to-End Test Scenarios
//
// These tests drive the daemon with raw key events the way the event loop
// does, and check what reaches the (recording) virtual keyboard.
//
// Run with: cargo test --test e2e_scenarios

use std::time::{Duration, Instant};

use skyswitcher_core::{
    Action, Config, CorrectionOutcome, Daemon, FailReason, Key, LayoutId, RecordingSink,
    SkipReason, SwitchOrder, TriggerStyle,
};

// =========================================================================
// Test Helpers
// =========================================================================

/// Simulated keyboard with its own clock
struct Keyboard {
    daemon: Daemon<RecordingSink>,
    now: Instant,
    outcomes: Vec<CorrectionOutcome>,
}

impl Keyboard {
    fn new(config: Config) -> Self {
        Self {
            daemon: Daemon::new(&config, RecordingSink::new()),
            now: Instant::now(),
            outcomes: Vec::new(),
        }
    }

    fn send(&mut self, key: Key, action: Action) {
        if let Some(outcome) = self.daemon.dispatch(key, action, self.now) {
            self.outcomes.push(outcome);
        }
    }

    fn wait(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
        self.daemon.tick(self.now);
    }

    fn tap(&mut self, key: Key) {
        self.send(key, Action::Press);
        self.wait(15);
        self.send(key, Action::Release);
        self.wait(40);
    }

    fn type_keys(&mut self, keys: &[Key]) {
        for key in keys {
            self.tap(*key);
        }
    }

    fn type_shifted(&mut self, key: Key) {
        self.send(Key::LEFT_SHIFT, Action::Press);
        self.tap(key);
        self.send(Key::LEFT_SHIFT, Action::Release);
    }

    fn double_tap_trigger(&mut self) {
        self.tap(Key::RIGHT_SHIFT);
        self.wait(100);
        self.tap(Key::RIGHT_SHIFT);
    }

    /// Keys pressed on the virtual keyboard, in order
    fn emitted(&self) -> Vec<Key> {
        self.daemon.sink().pressed_keys()
    }

    fn clear_output(&mut self) {
        self.daemon.sink_mut().clear();
        self.outcomes.clear();
    }
}

const GHBDSN: [Key; 6] = [Key::G, Key::H, Key::B, Key::D, Key::S, Key::N];

// =========================================================================
// Scenario: the classic "ghbdsn" -> "привіт"
// =========================================================================

#[test]
fn test_wrong_layout_word_is_retyped_in_ukrainian() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_keys(&GHBDSN);
    kb.double_tap_trigger();

    assert_eq!(
        kb.outcomes,
        vec![CorrectionOutcome::Applied {
            deleted: 6,
            original: "ghbdsn".to_string(),
            replacement: "привіт".to_string(),
        }]
    );

    let mut expected = vec![Key::BACKSPACE; 6];
    expected.extend([Key::LEFT_META, Key::SPACE]);
    expected.extend(GHBDSN);
    assert_eq!(kb.emitted(), expected);

    assert_eq!(kb.daemon.active_layout(), LayoutId::Ukrainian);
    assert!(kb.daemon.tracker().is_empty());
}

#[test]
fn test_literal_order_emits_switch_last() {
    let config = Config {
        switch_order: SwitchOrder::AfterRetype,
        ..Config::default()
    };
    let mut kb = Keyboard::new(config);
    kb.type_keys(&GHBDSN);
    kb.double_tap_trigger();

    let mut expected = vec![Key::BACKSPACE; 6];
    expected.extend(GHBDSN);
    expected.extend([Key::LEFT_META, Key::SPACE]);
    assert_eq!(kb.emitted(), expected);
    assert_eq!(kb.daemon.active_layout(), LayoutId::Ukrainian);
}

#[test]
fn test_second_gesture_switches_back_without_retyping() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_keys(&GHBDSN);
    kb.double_tap_trigger();
    kb.clear_output();

    // Buffer was cleared by the correction, so only the layout flips back
    kb.wait(500);
    kb.double_tap_trigger();
    assert_eq!(kb.outcomes, vec![CorrectionOutcome::Skipped(SkipReason::EmptyBuffer)]);
    assert_eq!(kb.emitted(), vec![Key::LEFT_META, Key::SPACE]);
    assert_eq!(kb.daemon.active_layout(), LayoutId::English);
}

#[test]
fn test_ukrainian_word_typed_in_ukrainian_goes_back_to_english() {
    let config = Config {
        initial_layout: LayoutId::Ukrainian,
        ..Config::default()
    };
    let mut kb = Keyboard::new(config);
    // "руддщ" on the Ukrainian layout is "hello" on US QWERTY
    kb.type_keys(&[Key::H, Key::E, Key::L, Key::L, Key::O]);
    kb.double_tap_trigger();

    assert!(matches!(
        &kb.outcomes[..],
        [CorrectionOutcome::Applied { original, replacement, deleted: 5 }]
            if original == "руддщ" && replacement == "hello"
    ));
    assert_eq!(kb.daemon.active_layout(), LayoutId::English);
}

#[test]
fn test_capital_letter_keeps_shift() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_shifted(Key::G);
    kb.type_keys(&[Key::H, Key::B, Key::D, Key::S, Key::N]);
    kb.double_tap_trigger();

    assert!(matches!(
        &kb.outcomes[..],
        [CorrectionOutcome::Applied { replacement, .. }] if replacement == "Привіт"
    ));
    let events = kb.daemon.sink().events();
    let shift_presses = events
        .iter()
        .filter(|e| e.key == Key::LEFT_SHIFT && e.action == Action::Press)
        .count();
    assert_eq!(shift_presses, 1);
}

// =========================================================================
// Scenario: empty buffer
// =========================================================================

#[test]
fn test_gesture_right_after_space_only_switches() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_keys(&[Key::A, Key::B, Key::SPACE]);
    kb.double_tap_trigger();

    assert_eq!(kb.outcomes, vec![CorrectionOutcome::Skipped(SkipReason::EmptyBuffer)]);
    assert_eq!(kb.emitted(), vec![Key::LEFT_META, Key::SPACE]);
    assert_eq!(kb.daemon.active_layout(), LayoutId::Ukrainian);
}

#[test]
fn test_gesture_after_shortcut_only_switches() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_keys(&[Key::A, Key::B]);
    kb.send(Key::LEFT_CTRL, Action::Press);
    kb.tap(Key::C);
    kb.send(Key::LEFT_CTRL, Action::Release);
    kb.double_tap_trigger();

    assert_eq!(kb.outcomes, vec![CorrectionOutcome::Skipped(SkipReason::EmptyBuffer)]);
}

// =========================================================================
// Scenario: unmappable key
// =========================================================================

#[test]
fn test_unmappable_key_switches_without_retyping() {
    // Every printable key maps on both built-in layouts, so drop one
    let english = LayoutId::English.table().clone();
    let ukrainian = LayoutId::Ukrainian.table().clone().without(Key::KEY_102ND);
    let transliterator = skyswitcher_core::Transliterator::with_tables(english, ukrainian);
    let mut emitter = skyswitcher_core::CorrectionEmitter::new(
        RecordingSink::new(),
        transliterator,
        Default::default(),
        SwitchOrder::BeforeRetype,
    );

    let mut tracker = skyswitcher_core::WordTracker::default();
    let now = Instant::now();
    for key in [Key::A, Key::KEY_102ND, Key::S] {
        tracker.on_key_event(&skyswitcher_core::KeyEvent::new(
            key,
            Action::Press,
            skyswitcher_core::Modifiers::new(),
            now,
        ));
    }
    let mut active = LayoutId::English;

    let outcome = emitter.try_correct(&mut tracker, &mut active);

    assert!(matches!(outcome, CorrectionOutcome::Skipped(SkipReason::Unmappable(_))));
    assert_eq!(emitter.sink().pressed_keys(), vec![Key::LEFT_META, Key::SPACE]);
    assert_eq!(active, LayoutId::Ukrainian);
    assert!(tracker.is_empty());
}

// =========================================================================
// Scenario: gesture timing
// =========================================================================

#[test]
fn test_slow_taps_do_nothing() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_keys(&GHBDSN);
    kb.tap(Key::RIGHT_SHIFT);
    kb.wait(700);
    kb.tap(Key::RIGHT_SHIFT);

    assert!(kb.outcomes.is_empty());
    assert!(kb.emitted().is_empty());
    assert_eq!(kb.daemon.tracker().len(), 6);
}

#[test]
fn test_triple_tap_corrects_once() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_keys(&GHBDSN);
    kb.tap(Key::RIGHT_SHIFT);
    kb.tap(Key::RIGHT_SHIFT);
    kb.tap(Key::RIGHT_SHIFT);

    assert_eq!(kb.outcomes.len(), 1);
    assert!(kb.daemon.detector().is_armed());
}

#[test]
fn test_typing_between_taps_cancels_gesture() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_keys(&GHBDSN);
    kb.tap(Key::RIGHT_SHIFT);
    kb.tap(Key::A);
    kb.tap(Key::RIGHT_SHIFT);

    assert!(kb.outcomes.is_empty());
    assert_eq!(kb.daemon.tracker().len(), 7);
}

#[test]
fn test_chord_trigger_style() {
    let config = Config {
        trigger: TriggerStyle::AltShift,
        ..Config::default()
    };
    let mut kb = Keyboard::new(config);
    kb.type_keys(&GHBDSN);
    kb.send(Key::LEFT_ALT, Action::Press);
    kb.tap(Key::LEFT_SHIFT);
    kb.tap(Key::LEFT_SHIFT);
    kb.send(Key::LEFT_ALT, Action::Release);

    assert!(matches!(&kb.outcomes[..], [CorrectionOutcome::Applied { deleted: 6, .. }]));
}

// =========================================================================
// Scenario: waiting for modifiers to come up
// =========================================================================

#[test]
fn test_typing_on_while_trigger_held_keeps_the_word() {
    let config = Config {
        wait_for_release: true,
        ..Config::default()
    };
    let mut kb = Keyboard::new(config);
    kb.type_keys(&GHBDSN);
    kb.tap(Key::RIGHT_SHIFT);
    kb.send(Key::RIGHT_SHIFT, Action::Press);
    assert!(kb.daemon.has_pending_correction());

    // The user keeps typing with the shift still down
    kb.tap(Key::A);
    kb.send(Key::RIGHT_SHIFT, Action::Release);

    assert!(kb.outcomes.is_empty());
    assert!(kb.emitted().is_empty());
    assert_eq!(kb.daemon.tracker().len(), 7);
    assert_eq!(kb.daemon.active_layout(), LayoutId::English);
}

// =========================================================================
// Scenario: write failures
// =========================================================================

#[test]
fn test_transient_write_failure_is_retried() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_keys(&GHBDSN);
    kb.daemon.sink_mut().fail_next(1);
    kb.double_tap_trigger();

    assert!(matches!(&kb.outcomes[..], [CorrectionOutcome::Applied { .. }]));
}

#[test]
fn test_persistent_write_failure_abandons_correction() {
    let mut kb = Keyboard::new(Config::default());
    kb.type_keys(&GHBDSN);
    kb.daemon.sink_mut().fail_next(2);
    kb.double_tap_trigger();

    assert!(matches!(
        &kb.outcomes[..],
        [CorrectionOutcome::Failed(FailReason::Write(_))]
    ));
    // The switch still went out, nothing was retyped
    assert_eq!(kb.emitted(), vec![Key::LEFT_META, Key::SPACE]);
    assert_eq!(kb.daemon.active_layout(), LayoutId::Ukrainian);
    assert!(kb.daemon.tracker().is_empty());

    // The daemon keeps working afterwards
    kb.clear_output();
    kb.type_keys(&[Key::F]);
    kb.wait(500);
    kb.double_tap_trigger();
    assert!(matches!(&kb.outcomes[..], [CorrectionOutcome::Applied { deleted: 1, .. }]));
}
