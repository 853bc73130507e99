use std::path::Path;

use dlmate_core::models::settings::ClientConfig;

pub const CONFIG_ENV: &str = "DLMATE_CONFIG";

/// Reads a JSON config file. A missing or unreadable file yields the defaults;
/// fields absent from the file take their default values.
pub fn load_config(path: &Path) -> ClientConfig {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("[config] {} not found, using defaults", path.display());
            return ClientConfig::default();
        }
        Err(e) => {
            tracing::warn!("[config] failed to read {}: {}", path.display(), e);
            return ClientConfig::default();
        }
    };

    serde_json::from_str::<ClientConfig>(&raw).unwrap_or_else(|e| {
        tracing::warn!("[config] invalid config in {}: {}", path.display(), e);
        ClientConfig::default()
    })
}

/// Config from the file named by `DLMATE_CONFIG`, or the defaults.
pub fn load_from_env() -> ClientConfig {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_config(Path::new(&path)),
        None => ClientConfig::default(),
    }
}

pub fn save_config(path: &Path, config: &ClientConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("dlmate-config-{}-{}", std::process::id(), name))
            .join("config.json")
    }

    #[test]
    fn missing_file_gives_defaults() {
        assert_eq!(load_config(&temp_path("missing")), ClientConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"timeout_ms": 5000, "proxy": "socks5://127.0.0.1:9050"}"#).unwrap();

        let config = load_config(&path);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.proxy.as_deref(), Some("socks5://127.0.0.1:9050"));
        assert_eq!(config.retries, 3);
        assert_eq!(config.max_cache_entries, 100);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn invalid_json_gives_defaults() {
        let path = temp_path("invalid");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_config(&path), ClientConfig::default());

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("saved");
        let config = ClientConfig {
            cache_ttl_seconds: 60,
            max_cache_entries: 5,
            ..ClientConfig::default()
        };

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path), config);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
