use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_key: String,
    pub sender: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Public base URL used to build verification links sent by email.
    pub base_url: String,
    pub avatars_dir: String,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into());
        let avatars_dir =
            std::env::var("AVATARS_DIR").unwrap_or_else(|_| "public/avatars".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        let mail = MailConfig {
            api_key: std::env::var("SENDGRID_API_KEY")?,
            sender: std::env::var("SENDGRID_SENDER_EMAIL")?,
        };
        Ok(Self {
            database_url,
            base_url,
            avatars_dir,
            jwt,
            mail,
        })
    }
}
