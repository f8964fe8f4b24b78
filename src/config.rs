use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    pub api_key: String,
    pub sender_name: String,
    pub sender_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub mailer: MailerConfig,
    pub link_ttl_minutes: i64,
    pub public_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            token_ttl_minutes: std::env::var("TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let mailer = MailerConfig {
            api_key: std::env::var("UNISENDER_API_KEY").unwrap_or_default(),
            sender_name: std::env::var("SENDER_NAME").unwrap_or_else(|_| "Vacancy".into()),
            sender_email: std::env::var("SENDER_EMAIL")
                .unwrap_or_else(|_| "noreply@vacancy.local".into()),
        };
        let link_ttl_minutes = std::env::var("LINK_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(30);
        let public_base_url =
            std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://vacancy".into());
        Ok(Self {
            database_url,
            jwt,
            mailer,
            link_ttl_minutes,
            public_base_url,
        })
    }
}
