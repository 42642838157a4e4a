//! Dark-theme preference with platform fallback.
//!
//! # Responsibility
//! - Persist the user's dark-theme override in a small JSON preference file.
//! - Publish the effective flag to subscribers.
//!
//! # Invariants
//! - Without a stored override the effective value is the platform signal,
//!   read fresh on every emission.
//! - A write always persists, even when it matches the platform value, and
//!   overrides the fallback from then on.

use crate::feed::{Publisher, Subscription};
use crate::io_atomic::write_atomic;
use log::{info, warn};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Preference key of the dark-theme override.
pub const DARK_MODE_KEY: &str = "dark_mode_enabled";

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug)]
pub enum SettingsError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    /// The preference file is valid JSON but not an object.
    InvalidData(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "settings file `{}` failed: {source}", path.display())
            }
            Self::Json(err) => write!(f, "settings json failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid settings data: {message}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Platform "is the system in dark mode" signal.
pub trait ThemeSignal: Send + Sync {
    fn system_dark_theme(&self) -> bool;
}

/// Theme signal the host flips when the system theme changes.
#[derive(Debug, Default)]
pub struct PlatformTheme {
    dark: AtomicBool,
}

impl PlatformTheme {
    pub fn new(dark: bool) -> Self {
        Self {
            dark: AtomicBool::new(dark),
        }
    }

    pub fn set_dark(&self, dark: bool) {
        self.dark.store(dark, Ordering::SeqCst);
    }
}

impl ThemeSignal for PlatformTheme {
    fn system_dark_theme(&self) -> bool {
        self.dark.load(Ordering::SeqCst)
    }
}

/// JSON-file backed preference store.
pub struct SettingsStore {
    path: PathBuf,
    theme: Arc<dyn ThemeSignal>,
    prefs: Mutex<Map<String, Value>>,
    feed: Publisher<bool>,
}

impl SettingsStore {
    /// Loads preferences from `path`; a missing file means "nothing stored".
    pub fn open(path: impl Into<PathBuf>, theme: Arc<dyn ThemeSignal>) -> SettingsResult<Self> {
        let path = path.into();
        let prefs = load_prefs(&path)?;
        let initial = effective(&prefs, theme.as_ref());
        Ok(Self {
            path,
            theme,
            prefs: Mutex::new(prefs),
            feed: Publisher::new(initial),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subscribes to the effective dark-theme flag.
    pub fn read(&self) -> Subscription<bool> {
        self.refresh();
        self.feed.subscribe()
    }

    /// Current effective value without subscribing.
    pub fn dark_theme_enabled(&self) -> bool {
        effective(&self.lock(), self.theme.as_ref())
    }

    /// Stored override, if any.
    pub fn stored_override(&self) -> Option<bool> {
        self.lock().get(DARK_MODE_KEY).and_then(Value::as_bool)
    }

    /// Persists the override and publishes it.
    pub fn write(&self, enabled: bool) -> SettingsResult<()> {
        {
            let mut prefs = self.lock();
            let mut next = prefs.clone();
            next.insert(DARK_MODE_KEY.to_string(), Value::Bool(enabled));
            self.persist(&next)?;
            *prefs = next;
        }
        info!("event=settings_write module=settings status=ok key={DARK_MODE_KEY} value={enabled}");
        self.feed.publish(enabled);
        Ok(())
    }

    /// Drops the override so the platform signal applies again.
    pub fn clear(&self) -> SettingsResult<()> {
        {
            let mut prefs = self.lock();
            if !prefs.contains_key(DARK_MODE_KEY) {
                drop(prefs);
                self.refresh();
                return Ok(());
            }
            let mut next = prefs.clone();
            next.remove(DARK_MODE_KEY);
            self.persist(&next)?;
            *prefs = next;
        }
        info!("event=settings_clear module=settings status=ok key={DARK_MODE_KEY}");
        self.refresh();
        Ok(())
    }

    /// Re-evaluates the effective value, e.g. after the system theme changed.
    pub fn refresh(&self) {
        let value = self.dark_theme_enabled();
        self.feed.publish(value);
    }

    fn persist(&self, prefs: &Map<String, Value>) -> SettingsResult<()> {
        let bytes = serde_json::to_vec_pretty(prefs)?;
        write_atomic(&self.path, &bytes).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.prefs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn effective(prefs: &Map<String, Value>, theme: &dyn ThemeSignal) -> bool {
    prefs
        .get(DARK_MODE_KEY)
        .and_then(Value::as_bool)
        .unwrap_or_else(|| theme.system_dark_theme())
}

fn load_prefs(path: &Path) -> SettingsResult<Map<String, Value>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(prefs) => {
            if prefs.get(DARK_MODE_KEY).is_some_and(|value| !value.is_boolean()) {
                warn!("event=settings_load module=settings status=degraded key={DARK_MODE_KEY} reason=not_boolean");
            }
            Ok(prefs)
        }
        other => Err(SettingsError::InvalidData(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
