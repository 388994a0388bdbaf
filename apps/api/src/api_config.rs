use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use gestor_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// What the binary should do after loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    /// Apply migrations and serve HTTP.
    Serve,
    /// Apply migrations and exit.
    Migrate,
    /// Apply migrations, insert development memberships and exit.
    Seed,
}

impl ApiCommand {
    fn from_argument(argument: Option<&str>) -> Result<Self, AppError> {
        match argument {
            None | Some("serve") => Ok(Self::Serve),
            Some("migrate") => Ok(Self::Migrate),
            Some("seed") => Ok(Self::Seed),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'serve', 'migrate' or 'seed'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub session_idle_minutes: i64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    /// Builds the configuration from a command argument and a variable lookup.
    fn from_lookup(
        argument: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let command = ApiCommand::from_argument(argument)?;

        let database_url = required_non_empty(&lookup, "DATABASE_URL")?;
        let frontend_url = normalize_frontend_url(
            lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_owned())
                .as_str(),
        )?;
        let bootstrap_token = required_non_empty(&lookup, "AUTH_BOOTSTRAP_TOKEN")?;

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let session_idle_minutes = match lookup("SESSION_IDLE_MINUTES") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "SESSION_IDLE_MINUTES must be a positive integer, got '{value}'"
                    ))
                })?,
            None => 30,
        };

        Ok(Self {
            command,
            database_url,
            frontend_url,
            bootstrap_token,
            api_host,
            api_port,
            cookie_secure,
            session_idle_minutes,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Reduces a frontend URL to its origin, the form browsers send in `Origin`.
fn normalize_frontend_url(value: &str) -> Result<String, AppError> {
    let url = Url::parse(value)
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL '{value}': {error}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "FRONTEND_URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(url.origin().ascii_serialization())
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
