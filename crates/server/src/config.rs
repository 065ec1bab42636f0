use std::{collections::HashMap, fs};

#[derive(Debug)]
pub struct Settings {
    pub server_bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
        }
    }
}

/// Defaults, overlaid by `server.toml` in the working directory, overlaid by
/// environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file_overlay(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    settings
}

fn apply_file_overlay(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("bind_addr") {
            settings.server_bind = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_is_loopback() {
        assert_eq!(Settings::default().server_bind, "127.0.0.1:8080");
    }

    #[test]
    fn file_overlay_replaces_bind_addr() {
        let mut settings = Settings::default();
        apply_file_overlay(&mut settings, r#"bind_addr = "0.0.0.0:9999""#);
        assert_eq!(settings.server_bind, "0.0.0.0:9999");
    }

    #[test]
    fn malformed_file_overlay_is_ignored() {
        let mut settings = Settings::default();
        apply_file_overlay(&mut settings, "not = [valid");
        assert_eq!(settings.server_bind, "127.0.0.1:8080");
    }
}
