//! Settings for calendar rules and display defaults
//!
//! ## Configuration Resolution
//!
//! Settings are loaded with a two-layer resolution:
//! 1. An explicit path, or the user config dir (~/.config/spent/settings.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Weekday};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::calendar::Calendar;
use crate::error::{Error, Result};

/// Embedded default settings (compiled into binary)
const DEFAULT_SETTINGS: &str = include_str!("../../../config/settings.toml");

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub calendar: Calendar,
    /// Default number of expenses in list views
    pub recent_limit: usize,
    /// Owner used when none is given on the command line
    pub default_owner: Option<String>,
    /// File the settings came from, if not the embedded defaults
    pub source: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calendar: Calendar::utc(),
            recent_limit: 20,
            default_owner: None,
            source: None,
        }
    }
}

impl Settings {
    /// Load settings (override first, then default location, then embedded)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => Some(path.to_path_buf()),
            None => default_settings_path().filter(|p| p.exists()),
        };

        match path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                let mut settings = Self::parse(&content)?;
                debug!(path = %path.display(), "Loaded settings");
                settings.source = Some(path);
                Ok(settings)
            }
            Some(path) => {
                warn!(path = %path.display(), "Settings file not found, using defaults");
                Self::parse(DEFAULT_SETTINGS)
            }
            None => Self::parse(DEFAULT_SETTINGS),
        }
    }

    /// Parse settings from TOML content; missing keys keep their defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawSettings = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid settings TOML: {}", e)))?;

        let mut settings = Self::default();

        if let Some(calendar) = raw.calendar {
            if let Some(week_start) = calendar.week_start {
                settings.calendar.week_start = week_start
                    .parse::<Weekday>()
                    .map_err(|_| Error::Config(format!("Invalid week_start: {}", week_start)))?;
            }
            if let Some(offset) = calendar.utc_offset {
                settings.calendar.offset = parse_utc_offset(&offset)?;
            }
        }

        if let Some(display) = raw.display {
            if let Some(limit) = display.recent_limit {
                settings.recent_limit = limit;
            }
        }

        if let Some(owner) = raw.owner {
            settings.default_owner = owner.default.filter(|o| !o.trim().is_empty());
        }

        Ok(settings)
    }
}

/// Default settings path
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spent").join("settings.toml"))
}

/// Parse `+HH:MM`, `-HH:MM`, `+HHMM`, `Z` or `UTC`
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset> {
    let invalid = || Error::Config(format!("Invalid utc_offset: {} (expected e.g. +02:00)", s));
    let trimmed = s.trim();

    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match trimmed.chars().next() {
        Some('+') => (1, &trimmed[1..]),
        Some('-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Raw settings structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawSettings {
    calendar: Option<RawCalendar>,
    display: Option<RawDisplay>,
    owner: Option<RawOwner>,
}

#[derive(Debug, Deserialize)]
struct RawCalendar {
    week_start: Option<String>,
    utc_offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    recent_limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    default: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults() {
        let settings = Settings::parse(DEFAULT_SETTINGS).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_overrides() {
        let settings = Settings::parse(
            r#"
            [calendar]
            week_start = "sunday"
            utc_offset = "-05:30"

            [display]
            recent_limit = 5

            [owner]
            default = "bob"
            "#,
        )
        .unwrap();

        assert_eq!(settings.calendar.week_start, Weekday::Sun);
        assert_eq!(settings.calendar.offset.local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert_eq!(settings.recent_limit, 5);
        assert_eq!(settings.default_owner.as_deref(), Some("bob"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::parse("[display]\nrecent_limit = 3\n").unwrap();
        assert_eq!(settings.recent_limit, 3);
        assert_eq!(settings.calendar, Calendar::utc());
        assert!(settings.default_owner.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Settings::parse("[calendar]\nweek_start = \"someday\"\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::parse("[calendar]\nutc_offset = \"02:00\"\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(Settings::parse("not = [toml"), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_utc_offset_forms() {
        assert_eq!(parse_utc_offset("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_utc_offset("+0930").unwrap().local_minus_utc(), 34200);
        assert_eq!(parse_utc_offset("-08:00").unwrap().local_minus_utc(), -28800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("utc").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("+2").is_err());
        assert!(parse_utc_offset("+02:75").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[owner]\ndefault = \"carol\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.default_owner.as_deref(), Some("carol"));
        assert_eq!(settings.source.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_load_missing_override_uses_defaults() {
        let settings = Settings::load(Some(Path::new("/nonexistent/spent/settings.toml"))).unwrap();
        assert_eq!(settings.recent_limit, 20);
        assert!(settings.source.is_none());
    }
}
