//! localedata - Locale data fallback resolution and caching
//!
//! This library resolves locale-specific data for an internationalization
//! library. A request names a data category ("basename") and a locale; the
//! engine expands the locale into generic-to-specific sublocales, finds a
//! data file for each across a prioritized list of storage roots, merges what
//! it found and caches every outcome, including "no data here".
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       DataContext                        │
//! │  RootRegistry: [/override/b, /override/a]                │
//! │  CacheRegistry: "pkg" → PackageCache                     │
//! └──────────────────────────────┬───────────────────────────┘
//!                                │ shared
//!                                ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                       LocaleData                         │
//! │  FragmentSet ──► Cache probe ──► Loader per root ──►     │
//! │  ContentParser ──► merge (MergePolicy, ArrayMode)        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use localedata::{DataContext, LoadOptions, LocaleData, LocaleDataConfig, MergePolicy};
//!
//! # fn main() -> localedata::Result<()> {
//! DataContext::global().add_global_root("/etc/my-app/locale-overrides");
//!
//! let data = LocaleData::new(LocaleDataConfig::new("my-app", "/usr/share/my-app/locale"))?;
//! let sysres = data.load_data(
//!     &LoadOptions::new("sysres")
//!         .with_locale("de-DE")
//!         .with_policy(MergePolicy::MergeAll),
//! )?;
//! println!("{}", sysres);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod fragment;
pub mod loader;
pub mod locale;
pub mod merge;
pub mod parser;
pub mod roots;

pub use cache::{CacheEntry, CacheRegistry, CacheStats, PackageCache};
pub use config::{LoadOptions, LocaleDataConfig};
pub use context::DataContext;
pub use engine::{LocaleData, LocaleDataBuilder};
pub use error::{LocaleDataError, Result};
pub use fragment::{Fragment, FragmentSet};
pub use loader::{FsLoader, Loader, MemoryLoader};
pub use locale::{current_locale, Locale, StandardExpander, SublocaleExpander};
pub use merge::{ArrayMode, MergePolicy};
pub use parser::{ContentParser, JsonParser};
pub use roots::RootRegistry;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
