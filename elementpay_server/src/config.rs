//! Server configuration
//!
//! Everything is read from `EPG_*` environment variables (a `.env` file is loaded first, if present). Missing or
//! invalid values fall back to their defaults with a log message; only [`ServerConfig::validate`] can stop the server
//! from starting.
use std::{env, fmt::Display, str::FromStr, time::Duration};

use elementpay_engine::helpers::DEFAULT_SIGNATURE_TOLERANCE;
use epg_common::{helpers::parse_boolean_flag, Secret};
use log::*;

use crate::errors::ServerError;

const DEFAULT_EPG_HOST: &str = "127.0.0.1";
const DEFAULT_EPG_PORT: u16 = 8360;
/// The webhook secret used when none is configured. Fine for local demos, refused in production.
pub const DEFAULT_WEBHOOK_SECRET: &str = "shh_super_secret";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!("'{s}' is not a recognised environment")),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// The shared secret for verifying `X-Webhook-Signature` headers.
    pub webhook_secret: Secret<String>,
    /// True if `EPG_WEBHOOK_SECRET` was set explicitly.
    pub webhook_secret_configured: bool,
    pub environment: Environment,
    /// How far a webhook signature timestamp may be from the server clock, in seconds.
    pub signature_tolerance: u64,
    /// If set, a background task advances every open order on this interval.
    pub status_worker_interval: Option<Duration>,
    /// Serve the `/api/mock/orders/...` aliases of the order routes.
    pub mock_routes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_EPG_HOST.to_string(),
            port: DEFAULT_EPG_PORT,
            webhook_secret: Secret::from(DEFAULT_WEBHOOK_SECRET),
            webhook_secret_configured: false,
            environment: Environment::default(),
            signature_tolerance: DEFAULT_SIGNATURE_TOLERANCE,
            status_worker_interval: None,
            mock_routes: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from any variable source. `lookup` returns the value of the named variable, if set.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let host = lookup("EPG_HOST").unwrap_or_else(|| DEFAULT_EPG_HOST.into());
        let port = lookup("EPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for EPG_PORT. {e} Using the default, {DEFAULT_EPG_PORT}, instead."
                    );
                    DEFAULT_EPG_PORT
                })
            })
            .unwrap_or(DEFAULT_EPG_PORT);
        let (webhook_secret, webhook_secret_configured) = match lookup("EPG_WEBHOOK_SECRET") {
            Some(s) if !s.is_empty() => (Secret::new(s), true),
            _ => {
                warn!(
                    "🪛️ EPG_WEBHOOK_SECRET is not set. Using the default demo secret. Anyone who knows it can push \
                     order statuses to this server."
                );
                (Secret::from(DEFAULT_WEBHOOK_SECRET), false)
            },
        };
        let environment = lookup("EPG_ENVIRONMENT")
            .map(|s| {
                s.parse::<Environment>().unwrap_or_else(|e| {
                    warn!("🪛️ {e} for EPG_ENVIRONMENT. Using development instead.");
                    Environment::Development
                })
            })
            .unwrap_or_default();
        let signature_tolerance = lookup("EPG_SIGNATURE_TOLERANCE")
            .map(|s| {
                s.parse::<u64>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for EPG_SIGNATURE_TOLERANCE. {e} Using the default, \
                         {DEFAULT_SIGNATURE_TOLERANCE}s, instead."
                    );
                    DEFAULT_SIGNATURE_TOLERANCE
                })
            })
            .unwrap_or(DEFAULT_SIGNATURE_TOLERANCE);
        let status_worker_interval = lookup("EPG_STATUS_WORKER_INTERVAL").and_then(|s| match s.parse::<u64>() {
            Ok(0) => {
                info!("🪛️ EPG_STATUS_WORKER_INTERVAL is zero. The background status worker is disabled.");
                None
            },
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(e) => {
                error!(
                    "🪛️ {s} is not a valid value for EPG_STATUS_WORKER_INTERVAL. {e} The background status worker is \
                     disabled."
                );
                None
            },
        });
        let mock_routes = parse_boolean_flag(lookup("EPG_MOCK_ROUTES"), true);
        Self {
            host,
            port,
            webhook_secret,
            webhook_secret_configured,
            environment,
            signature_tolerance,
            status_worker_interval,
            mock_routes,
        }
    }

    /// Check that the configuration is safe to run with. In production, the webhook secret must be set to something
    /// other than the demo default.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.environment == Environment::Production
            && (!self.webhook_secret_configured || self.webhook_secret.reveal() == DEFAULT_WEBHOOK_SECRET)
        {
            return Err(ServerError::ConfigurationError(
                "EPG_WEBHOOK_SECRET must be set to a secure value in production".into(),
            ));
        }
        Ok(())
    }
}
