use crate::ui::theme::Theme;

/// Per-process session state handed to command handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub current_user: Option<String>,
    pub theme: Theme,
}

impl Session {
    pub fn new(theme: Theme) -> Self {
        Self {
            current_user: None,
            theme,
        }
    }

    pub fn sign_in(&mut self, username: impl Into<String>) {
        self.current_user = Some(username.into());
    }

    pub fn sign_out(&mut self) {
        self.current_user = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user.is_some()
    }
}
