use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Vitalens";

/// Default chat-completion provider endpoint (OpenAI-compatible surface).
/// Overridable per run through `ProviderSettings::base_url`.
pub const DEFAULT_API_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Get the application data directory
/// ~/Vitalens/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Directory holding the single-slot report record and settings files.
pub fn storage_dir() -> PathBuf {
    app_data_dir().join("storage")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Vitalens"));
    }

    #[test]
    fn storage_dir_under_app_data() {
        let storage = storage_dir();
        let app = app_data_dir();
        assert!(storage.starts_with(app));
        assert!(storage.ends_with("storage"));
    }

    #[test]
    fn app_name_is_vitalens() {
        assert_eq!(APP_NAME, "Vitalens");
    }

    #[test]
    fn default_filter_scopes_to_crate() {
        assert_eq!(default_log_filter(), "vitalens=info");
    }
}
