use nuvacm_api::models::{Patch, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit,
}

/// Create/edit mode of one form. Owned by its controller and passed around explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormState {
    pub mode: FormMode,
    pub target_id: Option<RecordId>,
}

impl FormState {
    pub fn editing(id: RecordId) -> Self {
        Self {
            mode: FormMode::Edit,
            target_id: Some(id),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.mode == FormMode::Edit
    }

    /// The record being edited, if any.
    pub fn edit_target(&self) -> Option<RecordId> {
        match self.mode {
            FormMode::Edit => self.target_id,
            FormMode::Create => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Trimmed text, `None` when nothing is left.
pub(crate) fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Edit-form semantics for optional text: a blank input clears the stored value.
pub(crate) fn text_patch(value: &str) -> Patch<String> {
    match optional_text(value) {
        Some(text) => Patch::SetTo(text),
        None => Patch::Clear,
    }
}
