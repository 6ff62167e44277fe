//! Key-event binding between a form engine and the terminal
//!
//! `FormBinding` is the adapter layer the engine itself knows nothing
//! about: it owns an engine plus per-field edit buffers and translates raw
//! key events into engine operations. Leaving a field validates it (the
//! blur convention), Enter submits, Ctrl+R resets.

use crate::error::Result;
use crate::form::{FieldMap, FieldValue, FormEngine, FormState, SetValueOptions};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Declarative description of one rendered field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub multiline: bool,
    /// Store edits through numeric coercion (`as_number`)
    pub numeric: bool,
}

impl FieldSpec {
    /// Single-line text field
    pub fn text(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            multiline: false,
            numeric: false,
        }
    }

    /// Multiline text field (Enter inserts a newline instead of submitting)
    pub fn multiline(key: &str, label: &str) -> Self {
        Self {
            multiline: true,
            ..Self::text(key, label)
        }
    }

    /// Numeric field; edits are coerced before storing
    pub fn numeric(key: &str, label: &str) -> Self {
        Self {
            numeric: true,
            ..Self::text(key, label)
        }
    }
}

/// What a key event did, for the caller's status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingEvent {
    /// Key was not form-related
    Ignored,
    /// A buffer edit was stored into the engine
    Edited,
    /// Focus moved to another field (the left field was validated)
    FocusMoved,
    /// A submit pass ran; `accepted` mirrors the gate outcome
    Submitted { accepted: bool },
    /// Values and derived state went back to the defaults
    Reset,
}

/// Binds a [`FormEngine`] to a list of rendered fields.
pub struct FormBinding {
    engine: FormEngine,
    specs: Vec<FieldSpec>,
    buffers: Vec<String>,
    active: usize,
}

impl FormBinding {
    /// Wire an engine to its rendered fields.
    ///
    /// Every spec key must exist in the engine's field set; a stray key is
    /// an integration bug and fails here rather than on first keystroke.
    pub fn new(engine: FormEngine, specs: Vec<FieldSpec>) -> Result<Self> {
        let mut buffers = Vec::with_capacity(specs.len());
        for spec in &specs {
            buffers.push(engine.field(&spec.key)?.display_string());
        }
        Ok(Self {
            engine,
            specs,
            buffers,
            active: 0,
        })
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Edit buffer shown for the field at `index`
    pub fn buffer(&self, index: usize) -> &str {
        &self.buffers[index]
    }

    /// Snapshot of the underlying engine state
    pub fn state(&self) -> FormState {
        self.engine.state()
    }

    /// Translate one key event into engine operations.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<BindingEvent> {
        if self.specs.is_empty() {
            return Ok(BindingEvent::Ignored);
        }
        match key.code {
            KeyCode::Tab => {
                self.focus_next()?;
                Ok(BindingEvent::FocusMoved)
            }
            KeyCode::BackTab => {
                self.focus_prev()?;
                Ok(BindingEvent::FocusMoved)
            }
            KeyCode::Enter if self.specs[self.active].multiline => {
                self.edit(|buffer| buffer.push('\n'))?;
                Ok(BindingEvent::Edited)
            }
            KeyCode::Enter => {
                let accepted = self.submit()?.is_some();
                Ok(BindingEvent::Submitted { accepted })
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset();
                Ok(BindingEvent::Reset)
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit(|buffer| buffer.push(c))?;
                Ok(BindingEvent::Edited)
            }
            KeyCode::Backspace => {
                self.edit(|buffer| {
                    buffer.pop();
                })?;
                Ok(BindingEvent::Edited)
            }
            _ => Ok(BindingEvent::Ignored),
        }
    }

    /// Move focus forward, validating the field being left
    pub fn focus_next(&mut self) -> Result<()> {
        if self.specs.is_empty() {
            return Ok(());
        }
        self.blur_active()?;
        self.active = (self.active + 1) % self.specs.len();
        Ok(())
    }

    /// Move focus backward, validating the field being left
    pub fn focus_prev(&mut self) -> Result<()> {
        if self.specs.is_empty() {
            return Ok(());
        }
        self.blur_active()?;
        if self.active == 0 {
            self.active = self.specs.len() - 1;
        } else {
            self.active -= 1;
        }
        Ok(())
    }

    /// Run the submit pass; returns the accepted values when the gate opens
    pub fn submit(&mut self) -> Result<Option<FieldMap>> {
        let mut accepted = None;
        self.engine.submit(|fields| accepted = Some(fields.clone()))?;
        Ok(accepted)
    }

    /// Reset the engine and rebuild the edit buffers from the defaults
    pub fn reset(&mut self) {
        self.engine.reset();
        let state = self.engine.state();
        for (spec, buffer) in self.specs.iter().zip(self.buffers.iter_mut()) {
            *buffer = state.fields[&spec.key].display_string();
        }
        self.active = 0;
    }

    fn blur_active(&mut self) -> Result<()> {
        let key = self.specs[self.active].key.clone();
        self.engine.validate_field(&key)
    }

    fn edit(&mut self, apply: impl FnOnce(&mut String)) -> Result<()> {
        apply(&mut self.buffers[self.active]);
        let spec = &self.specs[self.active];
        self.engine.set_field_value(
            &spec.key,
            FieldValue::text(self.buffers[self.active].clone()),
            SetValueOptions {
                as_number: spec.numeric,
            },
        )
    }
}

impl std::fmt::Debug for FormBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormBinding")
            .field("engine", &self.engine)
            .field("active", &self.active)
            .field("fields", &self.specs.len())
            .finish_non_exhaustive()
    }
}
