//! Typed configuration sections and the environment keys each one reads.

use std::collections::HashMap;

use super::schema::{ConfigError, FieldSpec, ParsedDuration, Schema};

/// Deployment environment (`APP_ENV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Local,
    Develop,
    Staging,
    Uat,
    Production,
    Test,
}

impl AppEnv {
    const NAMES: &'static [&'static str] =
        &["local", "develop", "staging", "uat", "production", "test"];

    fn from_name(name: &str) -> Self {
        match name {
            "develop" => Self::Develop,
            "staging" => Self::Staging,
            "uat" => Self::Uat,
            "production" => Self::Production,
            "test" => Self::Test,
            _ => Self::Local,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Develop => "develop",
            Self::Staging => "staging",
            Self::Uat => "uat",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Process-level settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: AppEnv,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user_activation_expires_in: ParsedDuration,
}

impl AppConfig {
    pub fn schema() -> Schema {
        Schema::new("App Config")
            .field(FieldSpec::one_of("APP_ENV", AppEnv::NAMES).default("local"))
            .field(FieldSpec::string("APP_HOST").default("0.0.0.0"))
            .field(FieldSpec::integer("APP_PORT").default("3000").range(1, 65535))
            .field(FieldSpec::string("APP_NAME").required().non_empty())
            .field(FieldSpec::duration("USER_ACTIVATION_EXPIRES_IN").default("7d"))
    }

    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = Self::schema().validate(raw)?;
        Ok(Self {
            env: AppEnv::from_name(&env.string("APP_ENV")?),
            host: env.string("APP_HOST")?,
            port: env.integer("APP_PORT")?,
            name: env.string("APP_NAME")?,
            user_activation_expires_in: env.duration("USER_ACTIVATION_EXPIRES_IN")?,
        })
    }

    /// `host:port` the HTTP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Token signing secrets and lifetimes.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_access_secret: String,
    pub jwt_access_expires_in: ParsedDuration,
    pub jwt_refresh_secret: String,
    pub jwt_refresh_expires_in: ParsedDuration,
    pub password_reset_expires_in: ParsedDuration,
}

impl AuthConfig {
    pub fn schema() -> Schema {
        Schema::new("Auth Config")
            .field(FieldSpec::string("JWT_ACCESS_SECRET").required().non_empty())
            .field(FieldSpec::duration("JWT_ACCESS_EXPIRES_IN").default("3600s"))
            .field(FieldSpec::string("JWT_REFRESH_SECRET").required().non_empty())
            .field(FieldSpec::duration("JWT_REFRESH_EXPIRES_IN").default("30d"))
            .field(FieldSpec::duration("PASSWORD_RESET_EXPIRES_IN").default("24h"))
    }

    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = Self::schema().validate(raw)?;
        Ok(Self {
            jwt_access_secret: env.string("JWT_ACCESS_SECRET")?,
            jwt_access_expires_in: env.duration("JWT_ACCESS_EXPIRES_IN")?,
            jwt_refresh_secret: env.string("JWT_REFRESH_SECRET")?,
            jwt_refresh_expires_in: env.duration("JWT_REFRESH_EXPIRES_IN")?,
            password_reset_expires_in: env.duration("PASSWORD_RESET_EXPIRES_IN")?,
        })
    }
}

/// Remote cache connection. When `enabled` is false the in-process cache is used.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    pub enabled: bool,
    pub key_prefix: String,
}

impl RedisConfig {
    pub fn schema() -> Schema {
        Schema::new("Redis Config")
            .field(FieldSpec::string("REDIS_HOST").default("localhost"))
            .field(FieldSpec::integer("REDIS_PORT").default("6379").range(1, 65535))
            .field(FieldSpec::string("REDIS_PASSWORD"))
            .field(FieldSpec::integer("REDIS_DB").default("0").min(0))
            .field(FieldSpec::boolean("REDIS_ENABLED").default("true"))
            .field(FieldSpec::string("CACHE_KEY_PREFIX").default("cache:"))
    }

    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = Self::schema().validate(raw)?;
        Ok(Self {
            host: env.string("REDIS_HOST")?,
            port: env.integer("REDIS_PORT")?,
            password: env.optional_string("REDIS_PASSWORD"),
            db: env.integer("REDIS_DB")?,
            enabled: env.boolean("REDIS_ENABLED")?,
            key_prefix: env.string("CACHE_KEY_PREFIX")?,
        })
    }

    /// Connection URL built from the individual components.
    pub fn url(&self) -> String {
        match &self.password {
            Some(pwd) => format!("redis://:{}@{}:{}/{}", pwd, self.host, self.port, self.db),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Email job queue and retry policy.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub enabled: bool,
    pub capacity: usize,
    pub concurrency: usize,
    pub attempts: usize,
    pub backoff_delay: ParsedDuration,
    pub job_timeout_ms: u64,
    pub remove_on_fail: usize,
}

impl QueueConfig {
    pub fn schema() -> Schema {
        Schema::new("Queue Config")
            .field(FieldSpec::boolean("QUEUE_ENABLED").default("true"))
            .field(
                FieldSpec::integer("QUEUE_CAPACITY")
                    .default("1000")
                    .range(1, 1_000_000),
            )
            .field(FieldSpec::integer("QUEUE_CONCURRENCY").default("4").range(1, 256))
            .field(
                FieldSpec::integer("QUEUE_DEFAULT_JOB_ATTEMPTS")
                    .default("3")
                    .range(1, 100),
            )
            .field(FieldSpec::duration("QUEUE_BACKOFF_DELAY").default("1s"))
            .field(
                FieldSpec::integer("QUEUE_DEFAULT_JOB_TIMEOUT")
                    .default("30000")
                    .min(1),
            )
            .field(
                FieldSpec::integer("QUEUE_REMOVE_ON_FAIL")
                    .default("1000")
                    .min(0),
            )
    }

    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = Self::schema().validate(raw)?;
        Ok(Self {
            enabled: env.boolean("QUEUE_ENABLED")?,
            capacity: env.integer("QUEUE_CAPACITY")?,
            concurrency: env.integer("QUEUE_CONCURRENCY")?,
            attempts: env.integer("QUEUE_DEFAULT_JOB_ATTEMPTS")?,
            backoff_delay: env.duration("QUEUE_BACKOFF_DELAY")?,
            job_timeout_ms: env.integer("QUEUE_DEFAULT_JOB_TIMEOUT")?,
            remove_on_fail: env.integer("QUEUE_REMOVE_ON_FAIL")?,
        })
    }
}

/// SMTP transport and sender identity.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    pub from_name: String,
    pub frontend_url: String,
    pub template_dir: String,
}

impl MailerConfig {
    pub fn schema() -> Schema {
        Schema::new("Mailer Config")
            .field(
                FieldSpec::string("MAIL_HOST")
                    .default("smtp.mailtrap.io")
                    .non_empty(),
            )
            .field(FieldSpec::integer("MAIL_PORT").default("2525").range(1, 65535))
            .field(FieldSpec::string("MAIL_USER"))
            .field(FieldSpec::string("MAIL_PASSWORD"))
            .field(FieldSpec::email("MAIL_FROM_ADDRESS").default("noreply@example.com"))
            .field(FieldSpec::string("MAIL_FROM_NAME").default("App Starter"))
            .field(FieldSpec::url("FRONTEND_URL").default("http://localhost:3000"))
            .field(FieldSpec::string("MAIL_TEMPLATE_DIR").default("templates/emails"))
    }

    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = Self::schema().validate(raw)?;
        Ok(Self {
            host: env.string("MAIL_HOST")?,
            port: env.integer("MAIL_PORT")?,
            user: env.optional_string("MAIL_USER"),
            password: env.optional_string("MAIL_PASSWORD"),
            from_address: env.string("MAIL_FROM_ADDRESS")?,
            from_name: env.string("MAIL_FROM_NAME")?,
            frontend_url: env.string("FRONTEND_URL")?,
            template_dir: env.string("MAIL_TEMPLATE_DIR")?,
        })
    }

    /// `"Name" <address>` mailbox used as the sender.
    pub fn from_mailbox(&self) -> String {
        format!("\"{}\" <{}>", self.from_name, self.from_address)
    }
}

/// Log verbosity and output format.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: String,
    pub pretty: bool,
}

impl LoggerConfig {
    pub fn schema() -> Schema {
        Schema::new("Logger Config")
            .field(FieldSpec::string("LOG_LEVEL").default("debug"))
            .field(FieldSpec::boolean("LOG_PRETTY").default("true"))
    }

    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = Self::schema().validate(raw)?;
        Ok(Self {
            level: env.string("LOG_LEVEL")?,
            pretty: env.boolean("LOG_PRETTY")?,
        })
    }
}

/// Per-client request budget: `limit` requests per `ttl_ms` window.
#[derive(Debug, Clone)]
pub struct ThrottlerConfig {
    pub enabled: bool,
    pub ttl_ms: u64,
    pub limit: u32,
}

impl ThrottlerConfig {
    pub fn schema() -> Schema {
        Schema::new("Throttler Config")
            .field(FieldSpec::boolean("THROTTLE_ENABLED").default("true"))
            .field(FieldSpec::integer("THROTTLE_TTL").default("60000").min(1))
            .field(
                FieldSpec::integer("THROTTLE_LIMIT")
                    .default("10")
                    .range(1, 1_000_000),
            )
    }

    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = Self::schema().validate(raw)?;
        Ok(Self {
            enabled: env.boolean("THROTTLE_ENABLED")?,
            ttl_ms: env.integer("THROTTLE_TTL")?,
            limit: env.integer("THROTTLE_LIMIT")?,
        })
    }
}

/// Defaults and upper bound applied to `page` / `perPage` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_page: u32,
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_per_page: 30,
            max_per_page: 100,
        }
    }
}

impl PaginationConfig {
    pub fn schema() -> Schema {
        Schema::new("Pagination Config")
            .field(
                FieldSpec::integer("PAGINATION_DEFAULT_PAGE")
                    .default("1")
                    .min(1),
            )
            .field(
                FieldSpec::integer("PAGINATION_DEFAULT_PER_PAGE")
                    .default("30")
                    .range(1, 10_000),
            )
            .field(
                FieldSpec::integer("PAGINATION_MAX_PER_PAGE")
                    .default("100")
                    .range(1, 10_000),
            )
    }

    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = Self::schema().validate(raw)?;
        Ok(Self {
            default_page: env.integer("PAGINATION_DEFAULT_PAGE")?,
            default_per_page: env.integer("PAGINATION_DEFAULT_PER_PAGE")?,
            max_per_page: env.integer("PAGINATION_MAX_PER_PAGE")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_app_env_parsing() {
        let app = AppConfig::from_map(&raw(&[("APP_NAME", "svc"), ("APP_ENV", "Production")]))
            .unwrap();
        assert_eq!(app.env, AppEnv::Production);
        assert!(app.env.is_production());
        assert_eq!(app.listen_addr(), "0.0.0.0:3000");
        assert_eq!(app.user_activation_expires_in.ms, 604_800_000);

        let err = AppConfig::from_map(&raw(&[("APP_NAME", "svc"), ("APP_ENV", "prod")]));
        assert!(err.is_err());
    }

    #[test]
    fn test_auth_requires_both_secrets() {
        let err = AuthConfig::from_map(&raw(&[])).unwrap_err();
        let keys: Vec<_> = err.issues().iter().map(|i| i.key.clone()).collect();
        assert_eq!(keys, vec!["JWT_ACCESS_SECRET", "JWT_REFRESH_SECRET"]);

        let auth = AuthConfig::from_map(&raw(&[
            ("JWT_ACCESS_SECRET", "a"),
            ("JWT_REFRESH_SECRET", "r"),
        ]))
        .unwrap();
        assert_eq!(auth.jwt_access_expires_in.ms, 3_600_000);
        assert_eq!(auth.jwt_refresh_expires_in.ms, 2_592_000_000);
        assert_eq!(auth.password_reset_expires_in.ms, 86_400_000);
    }

    #[test]
    fn test_redis_url_from_components() {
        let redis = RedisConfig::from_map(&raw(&[
            ("REDIS_HOST", "redis-host"),
            ("REDIS_PORT", "6380"),
            ("REDIS_DB", "1"),
        ]))
        .unwrap();
        assert_eq!(redis.url(), "redis://redis-host:6380/1");
        assert!(redis.enabled);

        let redis = RedisConfig::from_map(&raw(&[("REDIS_PASSWORD", "secret")])).unwrap();
        assert_eq!(redis.url(), "redis://:secret@localhost:6379/0");

        // Empty password means no authentication
        let redis = RedisConfig::from_map(&raw(&[("REDIS_PASSWORD", "")])).unwrap();
        assert_eq!(redis.url(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_queue_defaults() {
        let queue = QueueConfig::from_map(&raw(&[])).unwrap();
        assert!(queue.enabled);
        assert_eq!(queue.attempts, 3);
        assert_eq!(queue.backoff_delay.ms, 1_000);
        assert_eq!(queue.job_timeout_ms, 30_000);
        assert_eq!(queue.concurrency, 4);
    }

    #[test]
    fn test_mailer_validates_address_and_url() {
        let err = MailerConfig::from_map(&raw(&[
            ("MAIL_FROM_ADDRESS", "nope"),
            ("FRONTEND_URL", "localhost"),
            ("MAIL_PORT", "0"),
        ]))
        .unwrap_err();
        assert_eq!(err.issues().len(), 3);

        let mailer = MailerConfig::from_map(&raw(&[("MAIL_FROM_NAME", "Acme")])).unwrap();
        assert_eq!(mailer.from_mailbox(), "\"Acme\" <noreply@example.com>");
    }

    #[test]
    fn test_pagination_defaults_match_default_impl() {
        let parsed = PaginationConfig::from_map(&raw(&[])).unwrap();
        assert_eq!(parsed, PaginationConfig::default());
    }
}
