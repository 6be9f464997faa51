//! Chat API token storage.
//!
//! The token is resolved at runtime from the environment or the system
//! keyring; it is never compiled into the binary.

use std::error::Error;
use std::io::{self, BufRead, Write};

use keyring::Entry;
use tracing::{debug, warn};

const KEYRING_SERVICE: &str = "quantoptik";
const KEYRING_USER: &str = "deepseek";
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

pub struct AuthManager {
    use_keyring: bool,
}

impl AuthManager {
    pub fn new() -> Self {
        Self { use_keyring: true }
    }

    /// Construct an AuthManager that only consults the environment.
    pub fn env_only() -> Self {
        Self { use_keyring: false }
    }

    /// Environment first, then the keyring. Keyring failures are logged and
    /// treated as "no token".
    pub fn resolve_api_key(&self) -> Option<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        resolve_with(from_env, || {
            if self.use_keyring {
                self.get_token()
            } else {
                Ok(None)
            }
        })
    }

    pub fn get_token(&self) -> Result<Option<String>, keyring::Error> {
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn store_token(&self, token: &str) -> Result<(), Box<dyn Error>> {
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        entry.set_password(token)?;
        Ok(())
    }

    /// Returns false when there was nothing to remove.
    pub fn remove_token(&self) -> Result<bool, Box<dyn Error>> {
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(Box::new(err)),
        }
    }

    pub fn interactive_auth(&self) -> Result<(), Box<dyn Error>> {
        println!("🔐 Quantoptik API setup");
        print!("Enter your DeepSeek API token: ");
        io::stdout().flush()?;

        let mut token = String::new();
        io::stdin().lock().read_line(&mut token)?;
        let token = token.trim();
        if token.is_empty() {
            return Err("No token entered".into());
        }

        self.store_token(token)?;
        println!("✅ Token saved to the system keyring");
        Ok(())
    }

    pub fn interactive_deauth(&self) -> Result<(), Box<dyn Error>> {
        if self.remove_token()? {
            println!("✅ Token removed from the system keyring");
        } else {
            println!("No stored token found");
        }
        Ok(())
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_with<F>(from_env: Option<String>, keyring_lookup: F) -> Option<String>
where
    F: FnOnce() -> Result<Option<String>, keyring::Error>,
{
    if let Some(token) = from_env.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        debug!("Using API token from {API_KEY_ENV}");
        return Some(token);
    }

    match keyring_lookup() {
        Ok(Some(token)) => {
            debug!("Using API token from keyring");
            Some(token)
        }
        Ok(None) => None,
        Err(err) => {
            warn!(error = %err, "Keyring lookup failed");
            None
        }
    }
}
