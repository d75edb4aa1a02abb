//! Layered env-file loading
//!
//! One layer per directory: `.env`, `.env.local`, `.env.<mode>`,
//! `.env.<mode>.local`, then `VITE_*` process variables. Within a layer the
//! later source wins. Layers are merged in a second pass where the later
//! directory wins on key collision.

use std::collections::BTreeMap;
use std::path::Path;

use config::Source;

use crate::error::ConfigError;

/// Only keys carrying this prefix are exposed to the dev server
pub const ENV_PREFIX: &str = "VITE";

/// Resolved key/value pairs of one or more layers (keys lowercased)
pub type EnvMap = BTreeMap<String, String>;

/// Load one directory's env layer.
///
/// `process_env` replaces the real process environment when given, so tests
/// stay independent of the host.
pub fn load_env_layer(
    dir: &str,
    mode: &str,
    process_env: Option<&EnvMap>,
) -> Result<EnvMap, ConfigError> {
    let mut builder = config::Config::builder();
    for name in env_file_names(mode) {
        let path = Path::new(dir).join(name);
        builder = builder.add_source(
            config::File::new(&path.to_string_lossy(), config::FileFormat::Ini).required(false),
        );
    }
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .keep_prefix(true)
            .source(process_env.map(|vars| {
                vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            })),
    );

    let key_prefix = format!("{}_", ENV_PREFIX.to_ascii_lowercase());
    let layer = builder
        .build()?
        .collect()?
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.to_ascii_lowercase();
            if !key.starts_with(&key_prefix) {
                return None;
            }
            // Sectioned ini content is not dotenv and is skipped
            value.into_string().ok().map(|v| (key, v))
        })
        .collect();

    Ok(layer)
}

/// Merge layers in order, later layers overriding earlier ones
#[must_use]
pub fn merge_layers<I>(layers: I) -> EnvMap
where
    I: IntoIterator<Item = EnvMap>,
{
    layers.into_iter().fold(EnvMap::new(), |mut merged, layer| {
        merged.extend(layer);
        merged
    })
}

fn env_file_names(mode: &str) -> [String; 4] {
    [
        ".env".to_string(),
        ".env.local".to_string(),
        format!(".env.{mode}"),
        format!(".env.{mode}.local"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "devserver-env-{}-{name}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn layer(dir: &Path, mode: &str, process: &[(&str, &str)]) -> EnvMap {
        let process: EnvMap = process
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        load_env_layer(dir.to_str().unwrap(), mode, Some(&process)).unwrap()
    }

    #[test]
    fn test_missing_files_yield_empty_layer() {
        let dir = scratch_dir("empty");
        assert!(layer(&dir, "development", &[]).is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_mode_file_overrides_base_file() {
        let dir = scratch_dir("mode");
        std::fs::write(
            dir.join(".env"),
            "VITE_BACKEND_DEV_PORT=5001\nVITE_BACKEND_DEV_HOST=backend\nOTHER_KEY=ignored\n",
        )
        .unwrap();
        std::fs::write(dir.join(".env.development"), "VITE_BACKEND_DEV_PORT=5002\n").unwrap();

        let env = layer(&dir, "development", &[]);
        assert_eq!(env.get("vite_backend_dev_port").map(String::as_str), Some("5002"));
        assert_eq!(env.get("vite_backend_dev_host").map(String::as_str), Some("backend"));
        assert!(!env.contains_key("other_key"));

        // A different mode does not see the development file
        let env = layer(&dir, "production", &[]);
        assert_eq!(env.get("vite_backend_dev_port").map(String::as_str), Some("5001"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_process_env_wins_within_layer() {
        let dir = scratch_dir("process");
        std::fs::write(dir.join(".env.local"), "VITE_BACKEND_DEV_PORT=5003\n").unwrap();

        let env = layer(
            &dir,
            "development",
            &[("VITE_BACKEND_DEV_PORT", "6000"), ("PATH", "/usr/bin")],
        );
        assert_eq!(env.get("vite_backend_dev_port").map(String::as_str), Some("6000"));
        assert!(!env.contains_key("path"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_parent_then_current_directory_precedence() {
        let parent = scratch_dir("parent");
        let current = parent.join("frontend");
        std::fs::create_dir_all(&current).unwrap();
        std::fs::write(parent.join(".env"), "VITE_BACKEND_DEV_PORT=5010
VITE_BACKEND_DEV_HOST=api.local
").unwrap();
        std::fs::write(current.join(".env"), "VITE_BACKEND_DEV_PORT=5020
").unwrap();

        let merged = merge_layers([layer(&parent, "development", &[]), layer(&current, "development", &[])]);
        assert_eq!(merged["vite_backend_dev_port"], "5020");
        assert_eq!(merged["vite_backend_dev_host"], "api.local");
        std::fs::remove_dir_all(&parent).ok();
    }

    #[test]
    fn test_merge_later_layer_wins() {
        let base = EnvMap::from([
            ("vite_backend_dev_port".to_string(), "5001".to_string()),
            ("vite_backend_dev_host".to_string(), "base-host".to_string()),
        ]);
        let local = EnvMap::from([("vite_backend_dev_port".to_string(), "5002".to_string())]);

        let merged = merge_layers([base, local]);
        assert_eq!(merged["vite_backend_dev_port"], "5002");
        assert_eq!(merged["vite_backend_dev_host"], "base-host");
    }
}
