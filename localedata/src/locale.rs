//! Locale tags and sublocale expansion.
//!
//! A [`Locale`] is a BCP-47 language identifier
//! (`language-Script-REGION-variant`) parsed with `unic-langid`. The engine treats it as an opaque key;
//! only the [`SublocaleExpander`] cares about its parts.
//!
//! # Expansion Order
//!
//! For `zh-Hans-CN` the [`StandardExpander`] yields:
//!
//! ```text
//! root → zh → und-CN → zh-Hans → zh-CN → zh-Hans-CN
//! ```
//!
//! Generic first, most specific last. Merge order follows this sequence.

use std::fmt;

use tracing::debug;
use unic_langid::LanguageIdentifier;

/// Tag used for the root (locale-independent) fragment.
pub const ROOT_TAG: &str = "root";

/// Language placeholder for tags without a language.
pub const UNDETERMINED: &str = "und";

/// Fallback when the environment does not name a usable locale.
pub const DEFAULT_LOCALE: &str = "en-US";

/// A parsed locale tag.
///
/// Every part is optional and stored in canonical case (language and
/// variants lowercase, script title case, region uppercase). A locale with
/// no parts is the root locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Locale {
    language: Option<String>,
    script: Option<String>,
    region: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// Parse a locale tag.
    ///
    /// Parsing never fails. Separators may be `-` or `_`, POSIX suffixes such
    /// as `.UTF-8` or `@euro` are dropped and subtags are canonicalized.
    /// Extension and private-use sequences (`-u-...`, `-x-...`) are ignored,
    /// as are trailing subtags that are not well formed. `"root"` and the
    /// empty string both produce the root locale.
    ///
    /// # Example
    ///
    /// ```
    /// use localedata::Locale;
    ///
    /// let locale = Locale::parse("zh_hans_cn");
    /// assert_eq!(locale.to_string(), "zh-Hans-CN");
    /// assert_eq!(locale.script(), Some("Hans"));
    ///
    /// assert!(Locale::parse("root").is_root());
    /// ```
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        let tag = tag.split(['.', '@']).next().unwrap_or_default();
        let normalized = tag.replace('_', "-");

        // A singleton subtag starts an extension or private-use sequence.
        let subtags: Vec<&str> = normalized
            .split('-')
            .filter(|s| !s.is_empty())
            .take_while(|s| s.len() > 1)
            .collect();

        match subtags.first() {
            None => return Locale::root(),
            Some(first) if first.eq_ignore_ascii_case(ROOT_TAG) => return Locale::root(),
            Some(_) => {}
        }

        for len in (1..=subtags.len()).rev() {
            if let Ok(langid) = subtags[..len].join("-").parse::<LanguageIdentifier>() {
                if len < subtags.len() {
                    debug!(tag = %tag, kept = len, "Ignoring malformed locale subtags");
                }
                return Locale::from(&langid);
            }
        }

        debug!(tag = %tag, "Unparseable locale tag, using root");
        Locale::root()
    }

    fn from_parts(
        language: Option<&str>,
        script: Option<&str>,
        region: Option<&str>,
        variant: Option<&str>,
    ) -> Self {
        Self {
            language: language.map(str::to_string),
            script: script.map(str::to_string),
            region: region.map(str::to_string),
            variant: variant.map(str::to_string),
        }
    }

    /// The root locale.
    pub fn root() -> Self {
        Self::default()
    }

    /// Check if this is the root locale.
    pub fn is_root(&self) -> bool {
        self.language.is_none()
            && self.script.is_none()
            && self.region.is_none()
            && self.variant.is_none()
    }

    /// Language subtag (lowercase), if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Script subtag (title case), if any.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Region subtag (uppercase), if any.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Variant subtag, if any.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Directory segments for this locale's data files.
    ///
    /// The root locale has none. Tags without a language use `und`.
    pub fn path_segments(&self) -> Vec<&str> {
        if self.is_root() {
            return Vec::new();
        }
        let mut segments = vec![self.language().unwrap_or(UNDETERMINED)];
        segments.extend(self.script());
        segments.extend(self.region());
        segments.extend(self.variant());
        segments
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(ROOT_TAG);
        }
        f.write_str(&self.path_segments().join("-"))
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Locale::parse(tag)
    }
}

impl From<&LanguageIdentifier> for Locale {
    fn from(langid: &LanguageIdentifier) -> Self {
        let variants: Vec<&str> = langid.variants().map(|v| v.as_str()).collect();
        Self {
            language: (!langid.language.is_empty()).then(|| langid.language.as_str().to_string()),
            script: langid.script.as_ref().map(|s| s.as_str().to_string()),
            region: langid.region.as_ref().map(|r| r.as_str().to_string()),
            variant: (!variants.is_empty()).then(|| variants.join("-")),
        }
    }
}

/// Produces the generic-to-specific sequence of sublocales for a locale.
///
/// Implementations must be deterministic and start with the root locale.
pub trait SublocaleExpander: Send + Sync {
    /// Expand `locale` into its sublocales, most generic first.
    fn sublocales(&self, locale: &Locale) -> Vec<Locale>;
}

/// The standard expansion used for locale data trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardExpander;

impl SublocaleExpander for StandardExpander {
    fn sublocales(&self, locale: &Locale) -> Vec<Locale> {
        let lang = locale.language();
        let script = locale.script();
        let region = locale.region();
        let variant = locale.variant();

        let mut out = vec![Locale::root()];

        if lang.is_some() {
            out.push(Locale::from_parts(lang, None, None, None));
        }
        if region.is_some() {
            out.push(Locale::from_parts(None, None, region, None));
        }
        if lang.is_some() && script.is_some() {
            out.push(Locale::from_parts(lang, script, None, None));
        }
        if lang.is_some() && region.is_some() {
            out.push(Locale::from_parts(lang, None, region, None));
        }
        if lang.is_some() && variant.is_some() {
            out.push(Locale::from_parts(lang, None, None, variant));
        }
        if region.is_some() && variant.is_some() {
            out.push(Locale::from_parts(None, None, region, variant));
        }
        if lang.is_some() && script.is_some() && region.is_some() {
            out.push(Locale::from_parts(lang, script, region, None));
        }
        if lang.is_some() && script.is_some() && variant.is_some() {
            out.push(Locale::from_parts(lang, script, None, variant));
        }
        if lang.is_some() && region.is_some() && variant.is_some() {
            out.push(Locale::from_parts(lang, None, region, variant));
        }
        if lang.is_some() && script.is_some() && region.is_some() && variant.is_some() {
            out.push(locale.clone());
        }

        // Script-only or variant-only tags are not covered above.
        if !out.contains(locale) {
            out.push(locale.clone());
        }
        out
    }
}

/// Determine the ambient process locale.
///
/// Checks `LC_ALL`, `LC_MESSAGES` and `LANG` in that order, skipping the
/// POSIX `C` locale, and falls back to [`DEFAULT_LOCALE`].
pub fn current_locale() -> Locale {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter(|value| !is_posix_default(value))
        .map(|value| Locale::parse(&value))
        .find(|locale| !locale.is_root() && locale.language().is_some())
        .unwrap_or_else(|| Locale::parse(DEFAULT_LOCALE))
}

fn is_posix_default(value: &str) -> bool {
    let name = value.split(['.', '@']).next().unwrap_or_default().trim();
    name.eq_ignore_ascii_case("C") || name.eq_ignore_ascii_case("POSIX")
}
