//! User configuration, persisted as TOML in the data directory.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{CoreError, Result, ScheduleError, StorageError};
use crate::recurrence::{Recurrence, RepeatUnit};
use crate::scheduling::{affirmation_trigger, FireDescriptor, SilentHours};

/// Notification tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    System,
    Bell,
    Chime,
    Beep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_tone")]
    pub tone: Tone,
}

/// Schedule applied when `habit add` is called without explicit flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_unit")]
    pub unit: RepeatUnit,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default = "default_start_time")]
    pub start_time: String,
}

/// Recurring affirmation notification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffirmationsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval")]
    pub interval_hours: u32,
}

fn default_true() -> bool {
    true
}
fn default_tone() -> Tone {
    Tone::System
}
fn default_unit() -> RepeatUnit {
    RepeatUnit::Daily
}
fn default_interval() -> u32 {
    1
}
fn default_start_time() -> String {
    "08:00".into()
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tone: Tone::System,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            unit: RepeatUnit::Daily,
            interval: 1,
            start_time: default_start_time(),
        }
    }
}

impl Default for AffirmationsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_hours: 1,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub affirmations: AffirmationsConfig,
    #[serde(default)]
    pub silent_hours: SilentHours,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(CoreError::Custom("config key is empty".into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| CoreError::Custom(format!("unknown config key: {key}")))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| CoreError::Custom(format!("unknown config key: {key}")))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| CoreError::Custom(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(CoreError::Custom(format!(
                                "cannot parse '{value}' as number"
                            )));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value)?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| CoreError::Custom(format!("unknown config key: {key}")))?;
        }

        Err(CoreError::Custom(format!("unknown config key: {key}")))
    }

    fn path() -> Result<std::path::PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| {
                    CoreError::Storage(StorageError::ConfigLoad {
                        path,
                        message: e.to_string(),
                    })
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written
    /// to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| {
            CoreError::Storage(StorageError::ConfigSave {
                path: path.clone(),
                message: e.to_string(),
            })
        })?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be
    /// parsed into the field's type.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Same as [`Config::set_value`], plus save failures.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)?;
        self.save()?;
        Ok(())
    }

    /// The schedule used when `habit add` gives no explicit flags.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] when the configured defaults are
    /// themselves invalid.
    pub fn default_schedule(&self) -> Result<Recurrence, ScheduleError> {
        Recurrence::new(
            self.defaults.unit,
            self.defaults.interval,
            self.defaults.start_time.clone(),
        )
    }

    /// Descriptor for the recurring affirmation notification, if the
    /// feature is on and `now` is outside silent hours.
    pub fn affirmation_descriptor(&self, now: DateTime<Local>) -> Option<FireDescriptor> {
        if !self.affirmations.enabled {
            return None;
        }
        affirmation_trigger(self.affirmations.interval_hours, Some(&self.silent_hours), now)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
