//! Draft editing and the keyboard commit rule.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerInput {
    Text(String),
    Backspace,
    /// `modified` is true when a modifier (Shift) is held.
    Enter { modified: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Edit,
    InsertLineBreak,
    Commit,
}

pub fn classify(input: &ComposerInput) -> KeyAction {
    match input {
        ComposerInput::Enter { modified: false } => KeyAction::Commit,
        ComposerInput::Enter { modified: true } => KeyAction::InsertLineBreak,
        ComposerInput::Text(_) | ComposerInput::Backspace => KeyAction::Edit,
    }
}

/// Applies a non-commit input to `draft`. Commit inputs leave it untouched.
pub fn apply(draft: &mut String, input: &ComposerInput) {
    match input {
        ComposerInput::Text(text) => draft.push_str(text),
        ComposerInput::Backspace => {
            draft.pop();
        }
        ComposerInput::Enter { modified: true } => draft.push('\n'),
        ComposerInput::Enter { modified: false } => {}
    }
}
