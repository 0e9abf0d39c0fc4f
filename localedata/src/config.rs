//! Engine and request configuration.

use crate::error::{LocaleDataError, Result};
use crate::merge::{ArrayMode, MergePolicy};

/// Configuration of a [`LocaleData`](crate::LocaleData) engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleDataConfig {
    /// Package whose data this engine serves. Selects the shared cache.
    pub package: String,

    /// The package's own data root, searched after every global root.
    pub base_path: String,

    /// Resolve synchronously by default when the loader allows it.
    pub sync: bool,

    /// Read and write the package cache.
    pub cache_enabled: bool,

    /// Locale used when a request names none.
    ///
    /// `None` means the ambient process locale.
    pub locale: Option<String>,
}

impl LocaleDataConfig {
    /// Create a configuration for `package` with data under `base_path`.
    pub fn new(package: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            base_path: base_path.into(),
            sync: false,
            cache_enabled: true,
            locale: None,
        }
    }

    /// Resolve synchronously by default.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Enable or disable caching.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set the default locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Check that required fields are present.
    pub fn validate(&self) -> Result<()> {
        if self.package.trim().is_empty() {
            return Err(LocaleDataError::Config(
                "a package name is required".to_string(),
            ));
        }
        if self.base_path.trim().is_empty() {
            return Err(LocaleDataError::Config(format!(
                "a base path is required for package '{}'",
                self.package
            )));
        }
        Ok(())
    }
}

/// Options of a single `load_data` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Data category to load, e.g. `"sysres"`.
    pub basename: String,

    /// Locale to load. `None` uses the engine's default locale.
    pub locale: Option<String>,

    /// How fragment values are combined.
    pub merge_policy: MergePolicy,

    /// How arrays are combined under [`MergePolicy::MergeAll`].
    pub array_mode: ArrayMode,

    /// Override the engine's sync default for `load_data_async`.
    pub sync: Option<bool>,
}

impl LoadOptions {
    /// Create options for `basename` with defaults.
    pub fn new(basename: impl Into<String>) -> Self {
        Self {
            basename: basename.into(),
            locale: None,
            merge_policy: MergePolicy::default(),
            array_mode: ArrayMode::default(),
            sync: None,
        }
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the merge policy.
    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Set the array merge mode.
    pub fn with_array_mode(mut self, mode: ArrayMode) -> Self {
        self.array_mode = mode;
        self
    }

    /// Replace arrays instead of concatenating them.
    pub fn replace_arrays(self) -> Self {
        self.with_array_mode(ArrayMode::Replace)
    }

    /// Override the sync default.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = Some(sync);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.basename.trim().is_empty() {
            return Err(LocaleDataError::Config(
                "a basename is required".to_string(),
            ));
        }
        Ok(())
    }
}
