use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Path to the hazard geometry JSON file
    pub source_path: PathBuf,

    #[serde(default = "default_listen")]
    pub listen: String,

    /// Inclusive danger-score threshold applied at load time
    #[serde(default = "default_min_score")]
    pub min_danger_score: i32,

    /// Radius used for queries that do not specify one
    #[serde(default = "default_radius")]
    pub default_radius_meters: f64,
}

fn default_listen() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_min_score() -> i32 {
    hazardwatch::hazard::DEFAULT_MIN_DANGER_SCORE
}

fn default_radius() -> f64 {
    hazardwatch::hazard::DEFAULT_RADIUS_METERS
}

impl ServerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: ServerConfig = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_applied() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "source_path = \"data/hazards.json\"").unwrap();

        let config = ServerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.listen, "0.0.0.0:5000");
        assert_eq!(config.min_danger_score, 3);
        assert_eq!(config.default_radius_meters, 50.0);
    }

    #[test]
    fn test_explicit_values_win() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "source_path = \"hazards.json\"\nlisten = \"127.0.0.1:8080\"\nmin_danger_score = 5\ndefault_radius_meters = 25.0"
        )
        .unwrap();

        let config = ServerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8080");
        assert_eq!(config.min_danger_score, 5);
        assert_eq!(config.default_radius_meters, 25.0);
    }
}
