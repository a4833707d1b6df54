use gatehouse::{InstallOptions, StoreOptions};
use gatehouse_core::config::Config;
use serde::Deserialize;

/// Portal configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct PortalConfig {
    /// TCP port to listen on (default 3120). Env var: `PORTAL_PORT`.
    #[serde(default = "default_port")]
    pub portal_port: u16,
    /// Path to the identity client JSON config. Env var: `IDENTITY_CONFIG`.
    pub identity_config: String,
    /// Enable cookie sessions (default true). Env var: `SESSION_ENABLED`.
    #[serde(default = "default_session_enabled")]
    pub session_enabled: bool,
    pub session_secret: Option<String>,
    pub session_resave: Option<bool>,
    pub session_save_uninitialized: Option<bool>,
    pub session_secure: Option<bool>,
    pub session_inactivity_secs: Option<i64>,
}

fn default_port() -> u16 {
    3120
}

fn default_session_enabled() -> bool {
    true
}

impl Config for PortalConfig {}

impl PortalConfig {
    pub fn install_options(&self) -> InstallOptions {
        let options = InstallOptions::default();
        if !self.session_enabled {
            return options;
        }
        options.with_store(StoreOptions {
            secret: self.session_secret.clone(),
            resave: self.session_resave,
            save_uninitialized: self.session_save_uninitialized,
            secure: self.session_secure,
            inactivity_secs: self.session_inactivity_secs,
        })
    }
}
