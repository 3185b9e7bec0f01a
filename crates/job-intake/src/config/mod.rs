use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

pub const DEFAULT_APP_TITLE: &str = "Job Application Portal";
pub const DEFAULT_HR_EMAIL: &str = "hr@example.com";
pub const DEFAULT_FROM_NAME: &str = "Recruiting Team";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_SAVE_DIR: &str = "submissions";

/// Top-level configuration for the application.
///
/// Loaded once at process start and passed by value into the intake service and
/// mailer; nothing reads the environment after `load` returns.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub portal: PortalConfig,
    pub smtp: SmtpConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment =
            AppEnvironment::from_str(&read_var("APP_ENV")?.unwrap_or_else(|| "development".into()));

        let host = read_var("APP_HOST")?.unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match read_var("APP_PORT")? {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            None => 3000,
        };

        let log_level = read_var("APP_LOG_LEVEL")?.unwrap_or_else(|| "info".to_string());

        let portal = PortalConfig {
            app_title: read_var("APP_TITLE")?.unwrap_or_else(|| DEFAULT_APP_TITLE.to_string()),
            hr_email: read_var("HR_EMAIL")?.unwrap_or_else(|| DEFAULT_HR_EMAIL.to_string()),
            from_name: read_var("FROM_NAME")?.unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
            save_dir: match env::var("SAVE_DIR") {
                Ok(raw) if raw.trim().is_empty() => None,
                Ok(raw) => Some(PathBuf::from(raw.trim())),
                Err(env::VarError::NotPresent) => Some(PathBuf::from(DEFAULT_SAVE_DIR)),
                Err(env::VarError::NotUnicode(_)) => {
                    return Err(ConfigError::NotUnicode { key: "SAVE_DIR" })
                }
            },
        };

        let smtp_user = read_var("SMTP_USER")?;
        let smtp = SmtpConfig {
            host: read_var("SMTP_HOST")?,
            port: match read_var("SMTP_PORT")? {
                Some(raw) => raw
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidSmtpPort { value: raw })?,
                None => DEFAULT_SMTP_PORT,
            },
            from_email: read_var("FROM_EMAIL")?.or_else(|| smtp_user.clone()),
            user: smtp_user,
            password: read_var("SMTP_PASS")?,
            from_name: portal.from_name.clone(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            portal,
            smtp,
        })
    }
}

/// Absent and blank values read as `None`; values that are present but not
/// unicode are reported instead of being treated as unset.
fn read_var(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { key }),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Recruiting-facing settings shared by the intake service and its templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub app_title: String,
    pub hr_email: String,
    pub from_name: String,
    /// Directory for the CSV ledger and archived resumes. `None` disables persistence.
    pub save_dir: Option<PathBuf>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            app_title: DEFAULT_APP_TITLE.to_string(),
            hr_email: DEFAULT_HR_EMAIL.to_string(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            save_dir: Some(PathBuf::from(DEFAULT_SAVE_DIR)),
        }
    }
}

/// Mail relay settings. Every field may be unset here; the mailer checks
/// completeness on each send.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from_name: String,
    pub from_email: Option<String>,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from_name", &self.from_name)
            .field("from_email", &self.from_email)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSmtpPort { value: String },
    NotUnicode { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSmtpPort { value } => {
                write!(f, "SMTP_PORT must be a valid u16 (found '{value}')")
            }
            ConfigError::NotUnicode { key } => write!(f, "{key} is not valid unicode"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSmtpPort { .. }
            | ConfigError::NotUnicode { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_TITLE",
            "HR_EMAIL",
            "SMTP_HOST",
            "SMTP_PORT",
            "SMTP_USER",
            "SMTP_PASS",
            "FROM_NAME",
            "FROM_EMAIL",
            "SAVE_DIR",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.portal, PortalConfig::default());
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.host.is_none());
        assert!(config.smtp.from_email.is_none());
    }

    #[test]
    fn from_email_falls_back_to_smtp_user() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SMTP_USER", "mailer@example.com");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.smtp.from_email.as_deref(), Some("mailer@example.com"));

        env::set_var("FROM_EMAIL", "jobs@example.com");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.smtp.from_email.as_deref(), Some("jobs@example.com"));
        reset_env();
    }

    #[test]
    fn malformed_smtp_port_is_reported() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SMTP_PORT", "ssl");
        match AppConfig::load() {
            Err(ConfigError::InvalidSmtpPort { value }) => assert_eq!(value, "ssl"),
            other => panic!("expected invalid smtp port, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn blank_save_dir_disables_persistence() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SAVE_DIR", "  ");
        let config = AppConfig::load().expect("config loads");
        assert!(config.portal.save_dir.is_none());
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn smtp_debug_redacts_password() {
        let smtp = SmtpConfig {
            password: Some("hunter2".to_string()),
            ..SmtpConfig::default()
        };
        let rendered = format!("{smtp:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
