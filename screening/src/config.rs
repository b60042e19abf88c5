use crate::auth::StaticCredentials;
use crate::pacing::Pacing;
use anyhow::{Context, Result};
use ml::ModelConfig;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

/// Top-level layout of `assets/screening.json`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelSpec,
    #[serde(default)]
    pub uploads: UploadSpec,
    #[serde(default)]
    pub pacing: PacingSpec,
    #[serde(default)]
    pub auth: AuthSpec,
}

/// Model directory and weights file.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSpec {
    #[serde(default = "default_model_dir")]
    pub dir: String,
    /// Burn record name; the recorder adds its own extension.
    #[serde(default = "default_weights_file")]
    pub weights: String,
}

/// Where uploaded images are written.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSpec {
    #[serde(default = "default_upload_dir")]
    pub dir: String,
}

/// Step delays in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingSpec {
    #[serde(default = "default_welcome_ms")]
    pub welcome_ms: u64,
    #[serde(default = "default_step_ms")]
    pub login_ms: u64,
    #[serde(default = "default_step_ms")]
    pub patient_details_ms: u64,
    #[serde(default = "default_step_ms")]
    pub upload_ms: u64,
    #[serde(default = "default_processing_ms")]
    pub processing_ms: u64,
}

/// The single demo credential pair.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSpec {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
}

impl ModelSpec {
    pub fn weight_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(&self.weights)
    }

    pub fn to_ml_config(&self) -> ModelConfig {
        ModelConfig::new(self.weight_path())
    }
}

impl PacingSpec {
    pub fn to_pacing(&self) -> Pacing {
        Pacing {
            welcome: Duration::from_millis(self.welcome_ms),
            login: Duration::from_millis(self.login_ms),
            patient_details: Duration::from_millis(self.patient_details_ms),
            upload: Duration::from_millis(self.upload_ms),
            processing: Duration::from_millis(self.processing_ms),
        }
    }
}

impl AuthSpec {
    pub fn to_authenticator(&self) -> StaticCredentials {
        StaticCredentials::new(&self.username, &self.password)
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
            weights: default_weights_file(),
        }
    }
}

impl Default for UploadSpec {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
        }
    }
}

impl Default for PacingSpec {
    fn default() -> Self {
        Self {
            welcome_ms: default_welcome_ms(),
            login_ms: default_step_ms(),
            patient_details_ms: default_step_ms(),
            upload_ms: default_step_ms(),
            processing_ms: default_processing_ms(),
        }
    }
}

impl Default for AuthSpec {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

fn default_model_dir() -> String {
    "models".to_string()
}

fn default_weights_file() -> String {
    "scan_net".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_welcome_ms() -> u64 {
    3000
}

fn default_step_ms() -> u64 {
    1000
}

fn default_processing_ms() -> u64 {
    3000
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "1234".to_string()
}

/// Reads the JSON configuration file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let cfg: AppConfig = serde_json::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Authenticator, Credentials};

    #[test]
    fn empty_object_uses_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.model.weight_path(), PathBuf::from("models").join("scan_net"));
        assert_eq!(cfg.uploads.dir, "uploads");
        assert_eq!(cfg.pacing.to_pacing(), Pacing::default());
        assert!(
            cfg.auth
                .to_authenticator()
                .validate(&Credentials::new("admin", "1234"))
        );
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{ "pacing": { "welcome_ms": 0 }, "model": { "dir": "/opt/scan" } }"#,
        )
        .unwrap();
        let pacing = cfg.pacing.to_pacing();
        assert_eq!(pacing.welcome, Duration::ZERO);
        assert_eq!(pacing.processing, Duration::from_millis(3000));
        assert_eq!(cfg.model.weights, "scan_net");
        assert_eq!(cfg.model.to_ml_config().weight_path, PathBuf::from("/opt/scan/scan_net"));
    }

    #[test]
    fn load_config_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screening.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("screening.json"));
        assert!(load_config(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets/screening.json");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.model.weights, "scan_net");
    }
}
