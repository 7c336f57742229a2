// Policy configuration loader
// Loads routing policy from ~/.waypoint/policy.toml, falling back to the
// shipped defaults when no file exists

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::PolicyConfig;

/// Environment variable that overrides the config file location
const CONFIG_PATH_ENV: &str = "WAYPOINT_POLICY_PATH";

/// Load the routing policy.
///
/// Resolution order:
/// 1. `$WAYPOINT_POLICY_PATH` if set
/// 2. `~/.waypoint/policy.toml` if present
/// 3. Built-in defaults
pub fn load_policy() -> Result<PolicyConfig> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return load_policy_from(Path::new(&path));
        }
    }

    if let Some(path) = default_policy_path() {
        if path.exists() {
            return load_policy_from(&path);
        }
    }

    tracing::debug!("No policy file found, using built-in defaults");
    Ok(PolicyConfig::default())
}

/// Load and validate a policy file from an explicit path
pub fn load_policy_from(path: &Path) -> Result<PolicyConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file {}", path.display()))?;

    let config: PolicyConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse policy file {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid policy in {}", path.display()))?;

    tracing::info!("Loaded routing policy from {}", path.display());
    Ok(config)
}

fn default_policy_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".waypoint/policy.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_policy_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
            [tie_break]
            near_tie_margin = 0.05
            cost_epsilon = 0.001
            "#
        )?;

        let config = load_policy_from(file.path())?;
        assert_eq!(config.tie_break.near_tie_margin, 0.05);
        // Everything else falls back to defaults
        assert!((config.weights.sum() - 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_load_rejects_bad_weights() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
            [weights]
            capability = 0.9
            cost = 0.9
            latency = 0.9
            privacy = 0.9
            "#
        )?;

        let err = load_policy_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid policy"));
        Ok(())
    }

    // Serializes the tests that set the process-wide env var
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_env_var_overrides_default_location() -> Result<()> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
            [tie_break]
            near_tie_margin = 0.08
            cost_epsilon = 0.002
            "#
        )?;

        std::env::set_var(CONFIG_PATH_ENV, file.path());
        let result = load_policy();
        std::env::remove_var(CONFIG_PATH_ENV);

        let config = result?;
        assert_eq!(config.tie_break.near_tie_margin, 0.08);
        assert_eq!(config.tie_break.cost_epsilon, 0.002);
        Ok(())
    }

    #[test]
    fn test_env_var_pointing_nowhere_is_an_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        std::env::set_var(CONFIG_PATH_ENV, "/nonexistent/waypoint-policy.toml");
        let result = load_policy();
        std::env::remove_var(CONFIG_PATH_ENV);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to read policy file"));
    }

    #[test]
    fn test_load_rejects_malformed_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "weights = 'not a table'")?;
        assert!(load_policy_from(file.path()).is_err());
        Ok(())
    }
}
