//! Server configuration

use ::config::{Config, Environment};
use anyhow::Result;
use serde::Deserialize;

/// Username used for the bootstrap admin when none is configured
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL referral links point at
    pub app_url: String,
    pub admin_email: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

/// Account created at startup with admin rights
#[derive(Debug, Clone, PartialEq)]
pub struct AdminAccount {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl ServerConfig {
    /// Load the configuration from `LEADERBOARD_*` environment variables
    ///
    /// # Environment Variables
    /// - `LEADERBOARD_HOST`: Bind address (default: 0.0.0.0)
    /// - `LEADERBOARD_PORT`: Listen port (default: 3000)
    /// - `LEADERBOARD_APP_URL`: Referral link base (default: https://projectdivido.com)
    /// - `LEADERBOARD_ADMIN_EMAIL`, `LEADERBOARD_ADMIN_USERNAME`,
    ///   `LEADERBOARD_ADMIN_PASSWORD`: Bootstrap admin account
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000_i64)?
            .set_default("app_url", "https://projectdivido.com")?
            .add_source(Environment::with_prefix("LEADERBOARD").try_parsing(true))
            .build()?;

        let server: ServerConfig = config.try_deserialize()?;

        if server.app_url.trim().is_empty() {
            anyhow::bail!("LEADERBOARD_APP_URL must not be empty");
        }

        Ok(server)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The bootstrap admin, if both email and password are set
    pub fn admin_account(&self) -> Option<AdminAccount> {
        let email = self.admin_email.clone().filter(|e| !e.is_empty())?;
        let password = self.admin_password.clone().filter(|p| !p.is_empty())?;
        let username = self
            .admin_username
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());

        Some(AdminAccount {
            email,
            username,
            password,
        })
    }
}
