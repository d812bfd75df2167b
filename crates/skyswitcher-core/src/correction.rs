// SkySwitcher Correction Emitter
// Deletes the mistyped word, retypes it under the other layout, switches layout

use std::fmt;

use strum_macros::{Display, EnumString};

use crate::layout::{LayoutId, TranslateError, Transliterator};
use crate::output::{KeySink, SwitchCombo, UInputError};
use crate::tracker::{TypedKey, WordBuffer, WordTracker};
use crate::Key;

/// When the layout-switch combo is sent relative to the retyped keys.
///
/// The desktop renders synthetic keys with whatever layout is active when
/// they arrive, so only `BeforeRetype` makes the retyped keys come out in
/// the target layout. `AfterRetype` is for setups where the retyped text
/// is rendered independently of the active layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SwitchOrder {
    #[default]
    #[strum(serialize = "before-retype")]
    BeforeRetype,
    #[strum(serialize = "after-retype")]
    AfterRetype,
}

/// Why a gesture did not rewrite text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing typed since the last boundary: the gesture only switches layout
    EmptyBuffer,
    /// Some key has no glyph in the target layout
    Unmappable(TranslateError),
}

/// Why a correction was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// A backspace or retyped key could not be written, even after a retry
    Write(UInputError),
    /// The layout-switch combo could not be written
    LayoutSwitch(UInputError),
}

/// Result of one correction cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionOutcome {
    Applied {
        deleted: usize,
        original: String,
        replacement: String,
    },
    Skipped(SkipReason),
    Failed(FailReason),
}

impl fmt::Display for CorrectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionOutcome::Applied {
                original,
                replacement,
                ..
            } => write!(f, "corrected '{}' -> '{}'", original, replacement),
            CorrectionOutcome::Skipped(SkipReason::EmptyBuffer) => {
                write!(f, "nothing to correct, layout switched")
            }
            CorrectionOutcome::Skipped(SkipReason::Unmappable(e)) => {
                write!(f, "correction skipped ({}), layout switched", e)
            }
            CorrectionOutcome::Failed(FailReason::Write(e)) => {
                write!(f, "correction abandoned: {}", e)
            }
            CorrectionOutcome::Failed(FailReason::LayoutSwitch(e)) => {
                write!(f, "layout switch failed: {}", e)
            }
        }
    }
}

/// Owns the synthetic input sink for the lifetime of the process.
pub struct CorrectionEmitter<S: KeySink> {
    sink: S,
    transliterator: Transliterator,
    switch_combo: SwitchCombo,
    order: SwitchOrder,
}

impl<S: KeySink> CorrectionEmitter<S> {
    pub fn new(
        sink: S,
        transliterator: Transliterator,
        switch_combo: SwitchCombo,
        order: SwitchOrder,
    ) -> Self {
        Self {
            sink,
            transliterator,
            switch_combo,
            order,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Give the sink back (so it can be closed deterministically)
    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn transliterator(&self) -> &Transliterator {
        &self.transliterator
    }

    /// Run one correction cycle for a recognized gesture.
    ///
    /// The layout is switched in every case except a failed switch write;
    /// `active` is toggled only when the switch combo went out. The
    /// tracker's buffer is always cleared.
    pub fn try_correct(&mut self, tracker: &mut WordTracker, active: &mut LayoutId) -> CorrectionOutcome {
        let buffer = WordBuffer::from_slice(tracker.current_buffer());
        tracker.clear();

        let source = *active;
        let target = source.other();

        if buffer.is_empty() {
            return self.finish_switch(active, CorrectionOutcome::Skipped(SkipReason::EmptyBuffer));
        }

        let translation = match self.transliterator.translate(&buffer, source, target) {
            Ok(translation) => translation,
            Err(e) => {
                log::warn!("skipping correction: {}", e);
                return self.finish_switch(active, CorrectionOutcome::Skipped(SkipReason::Unmappable(e)));
            }
        };

        log::debug!(
            "correcting '{}' -> '{}' ({} keys, {} -> {})",
            translation.original,
            translation.replacement,
            buffer.len(),
            source,
            target
        );

        if let Err(e) = self.delete(buffer.len()) {
            return self.finish_switch(active, CorrectionOutcome::Failed(FailReason::Write(e)));
        }

        let applied = CorrectionOutcome::Applied {
            deleted: buffer.len(),
            original: translation.original,
            replacement: translation.replacement,
        };

        match self.order {
            SwitchOrder::BeforeRetype => {
                if let Err(e) = self.switch_layout(active) {
                    // Retyping under the old layout would reproduce the same mistake
                    return CorrectionOutcome::Failed(FailReason::LayoutSwitch(e));
                }
                match self.retype(&buffer) {
                    Ok(()) => applied,
                    Err(e) => CorrectionOutcome::Failed(FailReason::Write(e)),
                }
            }
            SwitchOrder::AfterRetype => {
                let outcome = match self.retype(&buffer) {
                    Ok(()) => applied,
                    Err(e) => CorrectionOutcome::Failed(FailReason::Write(e)),
                };
                self.finish_switch(active, outcome)
            }
        }
    }

    fn delete(&mut self, count: usize) -> Result<(), UInputError> {
        for _ in 0..count {
            self.sink.tap(Key::BACKSPACE)?;
        }
        Ok(())
    }

    fn retype(&mut self, buffer: &[TypedKey]) -> Result<(), UInputError> {
        for typed in buffer {
            self.sink.tap_shifted(typed.key, typed.shift)?;
        }
        Ok(())
    }

    fn switch_layout(&mut self, active: &mut LayoutId) -> Result<(), UInputError> {
        self.switch_combo.emit(&mut self.sink)?;
        *active = active.other();
        log::info!("layout switched to {}", active);
        Ok(())
    }

    /// Send the switch combo; a switch failure overrides `outcome`
    fn finish_switch(&mut self, active: &mut LayoutId, outcome: CorrectionOutcome) -> CorrectionOutcome {
        match self.switch_layout(active) {
            Ok(()) => outcome,
            Err(e) => CorrectionOutcome::Failed(FailReason::LayoutSwitch(e)),
        }
    }
}
