/// Host interaction the store needs for user-initiated preset and reset
/// operations.
pub trait Prompt {
    /// Ask for a preset name. `None` means the user cancelled.
    fn theme_name(&mut self) -> Option<String>;

    /// Ask whether every setting should go back to its default.
    fn confirm_reset(&mut self) -> bool;
}

/// Prompt with answers fixed up front, for scripted hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    name: Option<String>,
    confirm: bool,
    asked: usize,
}

impl ScriptedPrompt {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn cancelled() -> Self {
        Self::default()
    }

    pub fn confirming() -> Self {
        Self {
            confirm: true,
            ..Self::default()
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }

    /// Number of questions asked so far.
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn theme_name(&mut self) -> Option<String> {
        self.asked += 1;
        self.name.clone()
    }

    fn confirm_reset(&mut self) -> bool {
        self.asked += 1;
        self.confirm
    }
}
