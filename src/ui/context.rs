//! UI context for detecting interactive terminals

use std::io::IsTerminal;

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether stdout is an interactive terminal
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
        }
    }

    #[cfg(test)]
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Check if we should use colors and headers
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    fn detect_interactive() -> bool {
        // Completion scripts pipe our stdout; keep it plain for them
        if !std::io::stdout().is_terminal() {
            return false;
        }

        std::env::var("CI").is_err()
    }
}
