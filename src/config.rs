use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub log_level: String,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("PROJTRACK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PROJTRACK_HOST: {e}"))?;

        let port: u16 = env_or("PROJTRACK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PROJTRACK_PORT: {e}"))?;

        let upload_dir = PathBuf::from(env_or("PROJTRACK_UPLOAD_DIR", "uploads"));

        let max_upload_size: usize = env_or("PROJTRACK_MAX_UPLOAD_SIZE", "16777216")
            .parse()
            .map_err(|e| format!("Invalid PROJTRACK_MAX_UPLOAD_SIZE: {e}"))?;

        let log_level = env_or("PROJTRACK_LOG_LEVEL", "info");

        let seed_demo = matches!(
            env_or("PROJTRACK_SEED_DEMO", "false").to_lowercase().as_str(),
            "true" | "1" | "yes"
        );

        Ok(Config {
            database_url,
            host,
            port,
            upload_dir,
            max_upload_size,
            log_level,
            seed_demo,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
