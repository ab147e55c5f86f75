use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "Vigil";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Initialize tracing for embedding binaries.
/// Honors RUST_LOG when present, falls back to the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", APP_NAME, APP_VERSION);
}

/// Get the application data directory
/// ~/Vigil/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Vigil")
}

/// Get the directory holding the monitoring database
pub fn database_dir() -> PathBuf {
    app_data_dir().join("database")
}

/// Get the directory holding catalog definition files
pub fn catalogs_dir() -> PathBuf {
    app_data_dir().join("catalogs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Vigil"));
    }

    #[test]
    fn database_dir_under_app_data() {
        let db = database_dir();
        let app = app_data_dir();
        assert!(db.starts_with(app));
        assert!(db.ends_with("database"));
    }

    #[test]
    fn default_filter_names_crate() {
        assert!(default_log_filter().contains("vigil"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
