//! Optional INI settings file.
//!
//! ```ini
//! [localedata]
//! package = my-app
//! base_path = /usr/share/my-app/locale
//! roots = /etc/my-app/locale, /opt/overrides
//! locale = de-DE
//! sync = true
//! cache = true
//! ```
//!
//! Command-line flags take precedence over file values.

use std::path::Path;

use ini::Ini;

use crate::error::CliError;

const SECTION: &str = "localedata";

/// Settings read from the INI file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub package: Option<String>,
    pub base_path: Option<String>,
    /// Global roots in the order listed; later entries take priority.
    pub roots: Vec<String>,
    pub locale: Option<String>,
    pub sync: Option<bool>,
    pub cache: Option<bool>,
}

impl FileConfig {
    /// Load settings from `path`.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let ini = Ini::load_from_file(path)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, CliError> {
        let Some(section) = ini.section(Some(SECTION)) else {
            return Ok(Self::default());
        };

        let text = |key: &str| {
            section
                .get(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            package: text("package"),
            base_path: text("base_path"),
            roots: section
                .get("roots")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            locale: text("locale"),
            sync: text("sync").map(|v| parse_bool("sync", &v)).transpose()?,
            cache: text("cache").map(|v| parse_bool("cache", &v)).transpose()?,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, CliError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(CliError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
