// Configuration Storage Service
// Handles config file read/write and version backup

use crate::models::{
    ClassifierStrategy, PatternPriority, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_CONTEXT_WEIGHT,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const BACKUPS_TO_KEEP: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub version: String,
    /// Pattern corpus asset used when the CLI is not given `--corpus`.
    #[serde(default)]
    pub corpus_path: Option<String>,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Classifier options. With `auto_strategy` off the values are pinned and
/// strategy selection is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f64,
    #[serde(default)]
    pub pattern_priority: PatternPriority,
    #[serde(default = "default_context_weight")]
    pub context_weight: f64,
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,
    #[serde(default = "default_true")]
    pub auto_strategy: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            pattern_priority: PatternPriority::Balanced,
            context_weight: DEFAULT_CONTEXT_WEIGHT,
            fallback_enabled: true,
            auto_strategy: true,
        }
    }
}

impl ClassifierConfig {
    pub fn strategy(&self) -> ClassifierStrategy {
        ClassifierStrategy {
            confidence_threshold: self.confidence_threshold,
            pattern_priority: self.pattern_priority,
            context_weight: self.context_weight,
            fallback_enabled: self.fallback_enabled,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidenceThreshold must be within [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.context_weight) {
            return Err(format!(
                "contextWeight must be within [0, 1], got {}",
                self.context_weight
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub file_log: bool,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default = "default_keep_logs")]
    pub keep_logs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_log: true,
            log_dir: None,
            keep_logs: default_keep_logs(),
        }
    }
}

fn default_threshold() -> f64 { DEFAULT_CONFIDENCE_THRESHOLD }
fn default_context_weight() -> f64 { DEFAULT_CONTEXT_WEIGHT }
fn default_true() -> bool { true }
fn default_level() -> String { "info".to_string() }
fn default_keep_logs() -> usize { 30 }

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("section-scan"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.classifier.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        config.classifier.validate()?;
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%.3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        self.cleanup_old_backups(&backup_dir, BACKUPS_TO_KEEP)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first; file names carry the timestamp
        entries.sort_by_key(|e| e.file_name());

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    /// Point the stored config at a corpus asset
    pub fn set_corpus_path(&self, path: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.corpus_path = Some(path.to_string());
        self.save(&config)
    }

    /// Replace the stored classifier options
    pub fn set_classifier(&self, classifier: ClassifierConfig) -> Result<(), String> {
        let mut config = self.load()?;
        config.classifier = classifier;
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.classifier.confidence_threshold, 0.3);
        assert_eq!(config.classifier.context_weight, 0.5);
        assert!(config.classifier.fallback_enabled);
        assert!(config.classifier.auto_strategy);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"classifier": {"patternPriority": "SECTION_FIRST"}}"#).unwrap();
        assert_eq!(parsed.classifier.pattern_priority, PatternPriority::SectionFirst);
        assert_eq!(parsed.classifier.confidence_threshold, 0.3);
        assert!(parsed.classifier.auto_strategy);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            version: "1.0.0".to_string(),
            corpus_path: Some("corpus.json".to_string()),
            classifier: ClassifierConfig::default(),
            logging: LoggingConfig::default(),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, "1.0.0");
        assert_eq!(parsed.corpus_path.as_deref(), Some("corpus.json"));
        assert_eq!(parsed.classifier, config.classifier);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = ClassifierConfig {
            context_weight: 1.5,
            ..ClassifierConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_load_missing_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("cfg"));
        let config = store.load().unwrap();
        assert!(config.corpus_path.is_none());
    }

    #[test]
    fn test_store_round_trip_and_backups() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());

        store.set_corpus_path("/data/corpus.json").unwrap();
        store
            .set_classifier(ClassifierConfig {
                auto_strategy: false,
                ..ClassifierConfig::default()
            })
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.corpus_path.as_deref(), Some("/data/corpus.json"));
        assert!(!loaded.classifier.auto_strategy);

        let backups = fs::read_dir(dir.path().join("backups")).unwrap().count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_save_rejects_invalid_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        let result = store.set_classifier(ClassifierConfig {
            confidence_threshold: -0.1,
            ..ClassifierConfig::default()
        });
        assert!(result.is_err());
        assert!(!store.config_file().exists());
    }
}
