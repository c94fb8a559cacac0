//! Configuration module
//!
//! Environment-driven settings for the HTTP server, the SQLite store, the
//! media root and the image pipeline.

use std::env;
use std::path::PathBuf;

const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DATABASE_URL: &str = "sqlite://vitrine.db?mode=rwc";
const MEDIA_ROOT: &str = "./public/media";
const MAX_IMPORT_SIZE_MB: usize = 50;
const MAX_IMAGE_SIZE_MB: usize = 10;
const IMAGE_MAX_WIDTH: u32 = 1600;
const IMAGE_MAX_HEIGHT: u32 = 1600;
const IMAGE_QUALITY: f32 = 82.0;
const THUMB_SIZE: u32 = 400;
const THUMB_QUALITY: f32 = 70.0;

/// Knobs for the media pipeline (resize box, encoder quality, size ceiling).
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: f32,
    pub thumb_size: u32,
    /// Upper bound for thumbnail quality; the effective value is
    /// `min(quality, thumb_quality)`.
    pub thumb_quality: f32,
    pub max_image_bytes: usize,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            max_width: IMAGE_MAX_WIDTH,
            max_height: IMAGE_MAX_HEIGHT,
            quality: IMAGE_QUALITY,
            thumb_size: THUMB_SIZE,
            thumb_quality: THUMB_QUALITY,
            max_image_bytes: MAX_IMAGE_SIZE_MB * 1024 * 1024,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub media_root: PathBuf,
    pub max_import_bytes: usize,
    pub image: ImageSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_import_mb = env::var("MAX_IMPORT_SIZE_MB")
            .unwrap_or_else(|_| MAX_IMPORT_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_IMPORT_SIZE_MB);

        let max_image_mb = env::var("MAX_IMAGE_SIZE_MB")
            .unwrap_or_else(|_| MAX_IMAGE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_IMAGE_SIZE_MB);

        let image = ImageSettings {
            max_width: env::var("IMAGE_MAX_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(IMAGE_MAX_WIDTH),
            max_height: env::var("IMAGE_MAX_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(IMAGE_MAX_HEIGHT),
            quality: env::var("IMAGE_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(IMAGE_QUALITY),
            thumb_size: env::var("THUMB_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(THUMB_SIZE),
            thumb_quality: env::var("THUMB_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(THUMB_QUALITY),
            max_image_bytes: max_image_mb * 1024 * 1024,
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DATABASE_URL.to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            media_root: PathBuf::from(
                env::var("MEDIA_ROOT").unwrap_or_else(|_| MEDIA_ROOT.to_string()),
            ),
            max_import_bytes: max_import_mb * 1024 * 1024,
            image,
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration with every default applied, pointed at the given store
    /// and media root.
    pub fn local(database_url: impl Into<String>, media_root: impl Into<PathBuf>) -> Self {
        Config {
            server_port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            database_url: database_url.into(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            media_root: media_root.into(),
            max_import_bytes: MAX_IMPORT_SIZE_MB * 1024 * 1024,
            image: ImageSettings::default(),
        }
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !self.database_url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid SQLite connection string"
            ));
        }

        if self.max_import_bytes == 0 || self.image.max_image_bytes == 0 {
            return Err(anyhow::anyhow!("Size ceilings must be greater than zero"));
        }

        if self.image.max_width == 0 || self.image.max_height == 0 || self.image.thumb_size == 0 {
            return Err(anyhow::anyhow!("Image dimensions must be greater than zero"));
        }

        for (name, value) in [
            ("IMAGE_QUALITY", self.image.quality),
            ("THUMB_QUALITY", self.image.thumb_quality),
        ] {
            if !(1.0..=100.0).contains(&value) {
                return Err(anyhow::anyhow!("{} must be between 1 and 100", name));
            }
        }

        Ok(())
    }
}
