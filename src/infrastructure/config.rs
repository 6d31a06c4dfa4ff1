use std::env;
use std::path::PathBuf;

pub const DEFAULT_GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes";
pub const DEFAULT_OPEN_LIBRARY_URL: &str = "https://openlibrary.org";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Directory where cover images are stored
    pub covers_dir: PathBuf,
    /// Covers are never stored larger than this on either side
    pub cover_max_dimension: u32,
    pub max_upload_bytes: usize,
    pub google_books_url: String,
    pub google_books_api_key: Option<String>,
    pub open_library_url: String,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://library.db?mode=rwc".to_string(),
            port: 8000,
            cors_allowed_origins: Vec::new(),
            covers_dir: PathBuf::from("static/covers"),
            cover_max_dimension: 300,
            max_upload_bytes: 16 * 1024 * 1024,
            google_books_url: DEFAULT_GOOGLE_BOOKS_URL.to_string(),
            google_books_api_key: None,
            open_library_url: DEFAULT_OPEN_LIBRARY_URL.to_string(),
            http_timeout_secs: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            port: parse_var("PORT").unwrap_or(defaults.port),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            covers_dir: env::var("COVERS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.covers_dir),
            cover_max_dimension: parse_var("COVER_MAX_DIMENSION")
                .filter(|d| *d > 0)
                .unwrap_or(defaults.cover_max_dimension),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
            google_books_url: env::var("GOOGLE_BOOKS_URL").unwrap_or(defaults.google_books_url),
            google_books_api_key: env::var("GOOGLE_BOOKS_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            open_library_url: env::var("OPEN_LIBRARY_URL").unwrap_or(defaults.open_library_url),
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout_secs),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 5] = [
        "PORT",
        "COVERS_DIR",
        "COVER_MAX_DIMENSION",
        "CORS_ALLOWED_ORIGINS",
        "GOOGLE_BOOKS_API_KEY",
    ];

    fn clear() {
        for key in KEYS {
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn defaults_when_unset() {
        clear();
        let config = Config::from_env();
        assert_eq!(config.port, 8000);
        assert_eq!(config.cover_max_dimension, 300);
        assert_eq!(config.covers_dir, PathBuf::from("static/covers"));
        assert!(config.cors_allowed_origins.is_empty());
        assert!(config.google_books_api_key.is_none());
    }

    #[test]
    #[serial]
    fn reads_overrides_and_ignores_garbage() {
        clear();
        unsafe {
            env::set_var("PORT", "9100");
            env::set_var("COVER_MAX_DIMENSION", "not-a-number");
            env::set_var("CORS_ALLOWED_ORIGINS", "http://a.test, ,http://b.test");
            env::set_var("GOOGLE_BOOKS_API_KEY", "  ");
        }

        let config = Config::from_env();
        assert_eq!(config.port, 9100);
        assert_eq!(config.cover_max_dimension, 300);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(config.google_books_api_key.is_none());
        clear();
    }
}
