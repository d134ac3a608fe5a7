use std::path::PathBuf;

use directories::ProjectDirs;

/// Environment variable overriding where the SQLite file lives
pub const ASSET_DIR_ENV: &str = "SLP_ASSET_DIR";

const DB_FILE_NAME: &str = "slp-dashboard.sqlite";

/// Directory holding persistent data for the dashboard backend
pub fn asset_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ASSET_DIR_ENV) {
        return PathBuf::from(dir);
    }

    ProjectDirs::from("ph", "slp", "slp-dashboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".slp-dashboard"))
}

/// Default `sqlite://` URL under [`asset_dir`]
pub fn default_database_url() -> String {
    format!("sqlite://{}", asset_dir().join(DB_FILE_NAME).display())
}
