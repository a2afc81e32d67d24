//! Controller configuration loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use tracing::info;

use scorecast_ipc::ControllerConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SCORECAST_CONFIG";

/// Pick the config file from `--config <path>` / `--config=<path>`, falling
/// back to the environment value.
pub fn config_path<I>(args: I, env_value: Option<String>) -> Option<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }

    env_value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Load the controller configuration. No path means defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ControllerConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(ControllerConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: ControllerConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    validate(&config)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    info!(
        path = %path.display(),
        period_length_secs = config.period_length_secs,
        destinations = config.default_destinations.len(),
        "Loaded config"
    );

    Ok(config)
}

/// Reject values the controller would refuse at runtime.
fn validate(config: &ControllerConfig) -> anyhow::Result<()> {
    ensure!(config.period_length_secs > 0, "period_length_secs must be positive");
    ensure!(config.penalty_length_secs > 0, "penalty_length_secs must be positive");
    ensure!(config.fps > 0, "fps must be positive");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use scorecast_ipc::{BitrateQuality, VideoQuality};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_path_sources() {
        assert_eq!(
            config_path(args(&["--config", "a.toml"]), Some("b.toml".to_string())),
            Some(PathBuf::from("a.toml"))
        );
        assert_eq!(
            config_path(args(&["--config=c.toml"]), None),
            Some(PathBuf::from("c.toml"))
        );
        assert_eq!(
            config_path(args(&[]), Some("b.toml".to_string())),
            Some(PathBuf::from("b.toml"))
        );
        assert_eq!(config_path(args(&[]), Some(String::new())), None);
    }

    #[test]
    fn test_load_defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.period_length_secs, 1200);
        assert_eq!(config.default_destinations.len(), 2);
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
period_length_secs = 900
stream_quality = "1080p"
bitrate_quality = "high"
record_locally = true

[[default_destinations]]
name = "Twitch"
url = "rtmps://ingest.twitch.tv/app/"
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.period_length_secs, 900);
        assert_eq!(config.penalty_length_secs, 120);
        assert_eq!(config.stream_quality, VideoQuality::FullHd1080);
        assert_eq!(config.bitrate_quality, BitrateQuality::High);
        assert!(config.record_locally);
        assert!(config.muted);
        assert_eq!(config.default_destinations.len(), 1);
        assert!(config.default_destinations[0].key.is_empty());
    }

    #[test]
    fn test_load_rejects_zero_values() {
        for field in ["period_length_secs", "penalty_length_secs", "fps"] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "{field} = 0").unwrap();

            let err = load_config(Some(file.path())).unwrap_err();
            assert!(format!("{err:#}").contains(field), "{err:#}");
        }
    }

    #[test]
    fn test_load_reports_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fps = \"fast\"").unwrap();
        assert!(load_config(Some(file.path())).is_err());

        let missing = file.path().with_extension("missing");
        assert!(load_config(Some(&missing)).is_err());
    }
}
