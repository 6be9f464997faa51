use std::sync::Arc;

use tracing::warn;

use crate::core::ai_client::{AiClient, ChatCompletion};
use crate::core::config::Config;
use crate::core::credentials::CredentialStore;
use crate::core::papers::PaperLookup;
use crate::core::session::Session;
use crate::core::transcript::Transcript;
use crate::ui::theme::Theme;

/// Network collaborators shared by the AI-backed commands.
pub struct Services {
    pub ai: Arc<dyn ChatCompletion>,
    pub papers: PaperLookup,
}

/// Everything the dispatcher reads or mutates for one terminal.
pub struct App {
    pub session: Session,
    pub transcript: Transcript,
    pub credentials: CredentialStore,
    pub services: Services,
}

pub struct AppInitConfig {
    pub model: Option<String>,
    pub theme: Option<String>,
    pub api_key: Option<String>,
}

pub fn new_with_config(init: AppInitConfig, config: &Config, credentials: CredentialStore) -> App {
    let client = reqwest::Client::new();
    let model = init.model.unwrap_or_else(|| config.model().to_string());
    let theme = match init.theme.as_deref() {
        Some(id) => Theme::from_arg(Some(id)),
        None => config.theme(),
    };

    let ai = AiClient::new(client.clone(), config.base_url(), init.api_key, model);
    App {
        session: Session::new(theme),
        transcript: Transcript::new(),
        credentials,
        services: Services {
            ai: Arc::new(ai),
            papers: PaperLookup::new(client, config.papers_url()),
        },
    }
}

/// Open the persisted credential store, or fall back to an in-memory one
/// when the data directory is unavailable or the file cannot be read.
pub fn open_credentials() -> CredentialStore {
    let Some(path) = CredentialStore::default_path() else {
        warn!("No data directory available; accounts will not be saved");
        return CredentialStore::in_memory();
    };
    match CredentialStore::open(&path) {
        Ok(store) => store,
        Err(err) => {
            warn!(error = %err, "Credential store unavailable; accounts will not be saved");
            eprintln!("⚠️  {err}");
            CredentialStore::in_memory()
        }
    }
}
