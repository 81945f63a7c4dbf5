use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub max_upload_bytes: usize,
    /// Prefix for image and download links handed to clients, e.g.
    /// `https://store.example.com`. Links stay relative when unset.
    pub public_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|b| b.parse::<usize>().ok())
            .unwrap_or(10 * 1024 * 1024);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl_hours,
            max_upload_bytes,
            public_base_url,
        })
    }

    /// Turns an absolute path like `/api/catalog/images/3` into the link
    /// clients should follow.
    pub fn link(&self, path: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}{path}"),
            None => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: Option<&str>) -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/test".into(),
            host: "127.0.0.1".into(),
            port: 3000,
            jwt_secret: "secret".into(),
            jwt_ttl_hours: 24,
            max_upload_bytes: 1024,
            public_base_url: base.map(str::to_string),
        }
    }

    #[test]
    fn link_is_relative_without_base_url() {
        assert_eq!(config(None).link("/api/catalog/images/1"), "/api/catalog/images/1");
    }

    #[test]
    fn link_prefixes_base_url() {
        assert_eq!(
            config(Some("https://store.example.com")).link("/api/catalog/images/1"),
            "https://store.example.com/api/catalog/images/1"
        );
    }
}
