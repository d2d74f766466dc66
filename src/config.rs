/// Service configuration.
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_URL | sqlite://staff_registry.db?mode=rwc | Sea-ORM connection URL |
/// | DB_MAX_CONNECTIONS | 10 | Pool size |
/// | HOST | 0.0.0.0 | Bind address |
/// | PORT | 9876 | HTTP port |
/// | UPLOAD_DIR | uploads | Where photos are written, served at `/uploads` |
///
/// Unparseable numbers fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://staff_registry.db?mode=rwc".into(),
            db_max_connections: 10,
            host: "0.0.0.0".into(),
            port: 9876,
            upload_dir: "uploads".into(),
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default)
        };
        Self {
            database_url: text("DATABASE_URL", defaults.database_url),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.db_max_connections),
            host: text("HOST", defaults.host),
            port: lookup("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            upload_dir: text("UPLOAD_DIR", defaults.upload_dir),
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
        assert_eq!(Config::default().bind_addr(), "0.0.0.0:9876");
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mysql://root@localhost/staff"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("PORT", "8080"),
            ("UPLOAD_DIR", "/var/photos"),
        ]));
        assert_eq!(config.database_url, "mysql://root@localhost/staff");
        assert_eq!(config.db_max_connections, 4);
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, "/var/photos");
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[("PORT", "eighty"), ("DB_MAX_CONNECTIONS", "0")]));
        assert_eq!(config.port, 9876);
        assert_eq!(config.db_max_connections, 10);
    }
}
