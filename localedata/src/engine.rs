//! The locale data resolution engine.
//!
//! # Resolution
//!
//! ```text
//! load_data("sysres", "de-DE")
//!   │
//!   ├─ expand:  root, de, und-DE, de-DE
//!   ├─ cache:   root ✓   de ✗   und-DE ✗   de-DE ✗
//!   │
//!   ├─ root /override   batch [de, und-DE, de-DE]  → de-DE found
//!   ├─ root /pkg/locale batch [de, und-DE]         → de found
//!   │
//!   ├─ und-DE never found → cached negative
//!   └─ merge root ⊕ de ⊕ de-DE
//! ```
//!
//! Both the blocking and the async driver run the same `Resolution` state
//! machine; only the loader call differs. The async driver awaits each root's
//! batch before building the next one, so a fragment found at one root is
//! never requested from a later one.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument, trace, warn};

use crate::cache::{CacheEntry, PackageCache};
use crate::config::{LoadOptions, LocaleDataConfig};
use crate::context::DataContext;
use crate::error::Result;
use crate::fragment::{join_path, Fragment, FragmentSet, DATA_EXTENSION};
use crate::loader::{check_batch, Batch, FsLoader, Loader};
use crate::locale::{current_locale, Locale, StandardExpander, SublocaleExpander};
use crate::merge::{deep_merge, merge_values, ArrayMode};
use crate::parser::{is_blank, ContentParser, JsonParser};

/// Resolution state of one fragment.
#[derive(Debug, Clone, PartialEq)]
enum SlotValue {
    /// Not looked up anywhere yet.
    Unset,
    /// Checked and absent (at the last root, or everywhere once resolved).
    Negative,
    Data(Value),
}

#[derive(Debug)]
struct Slot {
    fragment: Fragment,
    resolved: bool,
    value: SlotValue,
}

/// Paths still needed at one root, index-aligned with their slots.
#[derive(Debug)]
struct PendingBatch {
    slots: Vec<usize>,
    paths: Vec<String>,
}

/// Per-request resolution state.
struct Resolution<'a> {
    basename: &'a str,
    slots: Vec<Slot>,
    cache: Option<&'a PackageCache>,
}

impl<'a> Resolution<'a> {
    /// Create slots for `fragments`, resolving whatever the cache knows.
    fn start(basename: &'a str, fragments: FragmentSet, cache: Option<&'a PackageCache>) -> Self {
        let slots = fragments
            .into_fragments()
            .into_iter()
            .map(|fragment| {
                let cached = cache.and_then(|c| c.lookup(basename, &fragment.cache_key()));
                let (resolved, value) = match cached {
                    Some(CacheEntry::Data(value)) => (true, SlotValue::Data(value)),
                    Some(CacheEntry::Negative) => (true, SlotValue::Negative),
                    None => (false, SlotValue::Unset),
                };
                Slot {
                    fragment,
                    resolved,
                    value,
                }
            })
            .collect();

        Self {
            basename,
            slots,
            cache,
        }
    }

    /// Candidate paths at `root` for every unresolved slot.
    ///
    /// `None` once every slot is resolved.
    fn pending(&self, root: &str) -> Option<PendingBatch> {
        let (slots, paths): (Vec<usize>, Vec<String>) = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.resolved)
            .map(|(index, slot)| (index, slot.fragment.path_under(root)))
            .unzip();

        if slots.is_empty() {
            None
        } else {
            Some(PendingBatch { slots, paths })
        }
    }

    /// Record the contents a root returned for `batch`.
    ///
    /// Found data resolves its slot and is cached immediately. Missing or
    /// blank files leave the slot open for the next root.
    fn apply(
        &mut self,
        batch: PendingBatch,
        contents: Batch,
        parser: &dyn ContentParser,
    ) -> Result<()> {
        check_batch(&batch.paths, &contents)?;

        for ((index, path), content) in batch.slots.into_iter().zip(batch.paths).zip(contents) {
            let slot = &mut self.slots[index];
            match content {
                Some(bytes) if !is_blank(&bytes) => {
                    let value = parser.parse(&path, &bytes).map_err(|e| {
                        warn!(path = %path, error = %e, "Locale data parse failed");
                        e
                    })?;
                    trace!(path = %path, "Found locale data");
                    if let Some(cache) = self.cache {
                        cache.put(
                            self.basename,
                            &slot.fragment.cache_key(),
                            CacheEntry::Data(value.clone()),
                        );
                    }
                    slot.resolved = true;
                    slot.value = SlotValue::Data(value);
                }
                _ => slot.value = SlotValue::Negative,
            }
        }
        Ok(())
    }

    /// Finalize unresolved slots as negative and return the found values in
    /// merge order.
    fn finish(self) -> Vec<Value> {
        let mut values = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            if !slot.resolved {
                if let Some(cache) = self.cache {
                    cache.put(
                        self.basename,
                        &slot.fragment.cache_key(),
                        CacheEntry::Negative,
                    );
                }
            }
            if let SlotValue::Data(value) = slot.value {
                values.push(value);
            }
        }
        values
    }
}

/// Locale data engine for one package.
///
/// Resolves `(basename, locale)` requests against the global roots of its
/// [`DataContext`] followed by the package's own base path, and caches every
/// outcome in the package cache shared through that context.
///
/// # Example
///
/// ```ignore
/// use localedata::{LoadOptions, LocaleData, LocaleDataConfig};
///
/// let data = LocaleData::new(LocaleDataConfig::new("my-app", "/usr/share/my-app/locale"))?;
/// let sysres = data.load_data(&LoadOptions::new("sysres").with_locale("de-DE"))?;
/// ```
pub struct LocaleData {
    config: LocaleDataConfig,
    context: DataContext,
    cache: Arc<PackageCache>,
    loader: Arc<dyn Loader>,
    parser: Arc<dyn ContentParser>,
    expander: Arc<dyn SublocaleExpander>,
    sync: bool,
}

impl std::fmt::Debug for LocaleData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleData")
            .field("config", &self.config)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

impl LocaleData {
    /// Create an engine on the global context reading from the filesystem.
    pub fn new(config: LocaleDataConfig) -> Result<Self> {
        LocaleDataBuilder::new(config).build()
    }

    /// Start building an engine with custom collaborators.
    pub fn builder(config: LocaleDataConfig) -> LocaleDataBuilder {
        LocaleDataBuilder::new(config)
    }

    /// Package this engine serves.
    pub fn package(&self) -> &str {
        &self.config.package
    }

    /// The package's private root.
    pub fn base_path(&self) -> &str {
        &self.config.base_path
    }

    /// Engine configuration.
    pub fn config(&self) -> &LocaleDataConfig {
        &self.config
    }

    /// Context holding the global roots and caches.
    pub fn context(&self) -> &DataContext {
        &self.context
    }

    /// The package cache shared with every engine for this package.
    pub fn cache(&self) -> &Arc<PackageCache> {
        &self.cache
    }

    /// Whether `load_data_async` resolves synchronously by default.
    ///
    /// False when sync was requested but the loader cannot block.
    pub fn is_sync(&self) -> bool {
        self.sync
    }

    /// Global roots followed by this engine's base path.
    pub fn effective_roots(&self) -> Vec<String> {
        self.context.roots().effective(&self.config.base_path)
    }

    /// See [`DataContext::check_cache`].
    pub fn check_cache(&self, locale: &str, basename: &str) -> bool {
        self.context.check_cache_with(
            self.expander.as_ref(),
            &self.config.package,
            locale,
            basename,
        )
    }

    /// See [`DataContext::cache_data`].
    pub fn cache_data(&self, data: &Value) {
        self.context.cache_data(&self.config.package, data);
    }

    /// See [`DataContext::clear_cache`]. Clears every package.
    pub fn clear_cache(&self) {
        self.context.clear_cache();
    }

    fn request_locale(&self, options: &LoadOptions) -> Locale {
        options
            .locale
            .as_deref()
            .or(self.config.locale.as_deref())
            .map(Locale::parse)
            .unwrap_or_else(current_locale)
    }

    fn active_cache(&self) -> Option<&PackageCache> {
        self.config.cache_enabled.then_some(self.cache.as_ref())
    }

    fn begin<'a>(&'a self, options: &'a LoadOptions) -> Result<Resolution<'a>> {
        options.validate()?;
        let locale = self.request_locale(options);
        let fragments = FragmentSet::expand(self.expander.as_ref(), &locale, &options.basename);
        let resolution = Resolution::start(&options.basename, fragments, self.active_cache());

        let unresolved = resolution.slots.iter().filter(|s| !s.resolved).count();
        debug!(
            locale = %locale,
            fragments = resolution.slots.len(),
            unresolved,
            "Resolving locale data"
        );
        Ok(resolution)
    }

    fn complete(&self, resolution: Resolution<'_>, options: &LoadOptions) -> Value {
        let values = resolution.finish();
        merge_values(&values, options.merge_policy, options.array_mode)
    }

    /// Load and merge data, blocking until done.
    ///
    /// Fails with [`SyncUnsupported`](crate::LocaleDataError::SyncUnsupported)
    /// if storage must be read and the loader cannot block. Requests served
    /// entirely from the cache always succeed.
    #[instrument(level = "debug", skip_all, fields(package = %self.config.package, basename = %options.basename))]
    pub fn load_data(&self, options: &LoadOptions) -> Result<Value> {
        let mut resolution = self.begin(options)?;

        for root in self.effective_roots() {
            let Some(batch) = resolution.pending(&root) else {
                break;
            };
            trace!(root = %root, count = batch.paths.len(), "Loading batch");
            let contents = self.loader.load_many_sync(&batch.paths).map_err(|e| {
                warn!(root = %root, error = %e, "Locale data load failed");
                e
            })?;
            resolution.apply(batch, contents, self.parser.as_ref())?;
        }

        Ok(self.complete(resolution, options))
    }

    /// Load and merge data asynchronously.
    ///
    /// When the request (or, failing that, the engine) asks for sync loading
    /// and the loader supports it, this resolves without suspending.
    #[instrument(level = "debug", skip_all, fields(package = %self.config.package, basename = %options.basename))]
    pub async fn load_data_async(&self, options: &LoadOptions) -> Result<Value> {
        if options.sync.unwrap_or(self.sync) && self.loader.supports_sync() {
            return self.load_data(options);
        }

        let mut resolution = self.begin(options)?;

        for root in self.effective_roots() {
            let Some(batch) = resolution.pending(&root) else {
                break;
            };
            trace!(root = %root, count = batch.paths.len(), "Loading batch");
            let contents = self.loader.load_many(&batch.paths).await.map_err(|e| {
                warn!(root = %root, error = %e, "Locale data load failed");
                e
            })?;
            resolution.apply(batch, contents, self.parser.as_ref())?;
        }

        Ok(self.complete(resolution, options))
    }

    /// Preload the whole-locale file `<root>/<locale>.json` from every root.
    ///
    /// Each file maps basenames to data for the full locale. Files from
    /// higher priority roots win. Returns `true` when the loader can block
    /// (preloading is unnecessary) or when at least one file was cached.
    #[instrument(level = "debug", skip(self), fields(package = %self.config.package))]
    pub async fn ensure_locale(&self, locale: &str) -> Result<bool> {
        if self.loader.supports_sync() {
            return Ok(true);
        }
        let Some(cache) = self.active_cache() else {
            debug!("Caching disabled, nothing to preload");
            return Ok(false);
        };

        let locale = Locale::parse(locale);
        let file = format!("{}.{}", locale, DATA_EXTENSION);
        let mut found = Vec::new();

        for root in self.effective_roots() {
            let paths = vec![join_path(&root, &file)];
            let contents = self.loader.load_many(&paths).await?;
            check_batch(&paths, &contents)?;
            if let Some(Some(bytes)) = contents.into_iter().next() {
                if is_blank(&bytes) {
                    continue;
                }
                match self.parser.parse(&paths[0], &bytes)? {
                    Value::Object(map) => found.push(map),
                    _ => debug!(path = %paths[0], "Ignoring non-object locale file"),
                }
            }
        }

        if found.is_empty() {
            debug!(locale = %locale, "No whole-locale files found");
            return Ok(false);
        }

        // Lowest priority first so higher priority roots override.
        let mut merged = Map::new();
        for map in found.into_iter().rev() {
            for (basename, value) in map {
                match merged.get_mut(&basename) {
                    Some(existing) => deep_merge(existing, &value, ArrayMode::Replace),
                    None => {
                        merged.insert(basename, value);
                    }
                }
            }
        }

        let key = locale.to_string();
        for (basename, value) in merged {
            cache.put(&basename, &key, CacheEntry::Data(value));
        }
        debug!(locale = %key, "Preloaded locale data");
        Ok(true)
    }
}

/// Builder for [`LocaleData`] engines with custom collaborators.
///
/// Unset collaborators default to the global [`DataContext`], [`FsLoader`],
/// [`JsonParser`] and [`StandardExpander`].
pub struct LocaleDataBuilder {
    config: LocaleDataConfig,
    context: Option<DataContext>,
    loader: Option<Arc<dyn Loader>>,
    parser: Option<Arc<dyn ContentParser>>,
    expander: Option<Arc<dyn SublocaleExpander>>,
}

impl LocaleDataBuilder {
    /// Start a builder for `config`.
    pub fn new(config: LocaleDataConfig) -> Self {
        Self {
            config,
            context: None,
            loader: None,
            parser: None,
            expander: None,
        }
    }

    /// Use `context` instead of the global one.
    pub fn context(mut self, context: DataContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Use a custom loader.
    pub fn loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Use a custom content parser.
    pub fn parser(mut self, parser: Arc<dyn ContentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Use a custom sublocale expander.
    pub fn expander(mut self, expander: Arc<dyn SublocaleExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Validate the configuration and build the engine.
    pub fn build(self) -> Result<LocaleData> {
        self.config.validate()?;

        let context = self
            .context
            .unwrap_or_else(|| DataContext::global().clone());
        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(FsLoader::new()) as Arc<dyn Loader>);
        let parser = self
            .parser
            .unwrap_or_else(|| Arc::new(JsonParser) as Arc<dyn ContentParser>);
        let expander = self
            .expander
            .unwrap_or_else(|| Arc::new(StandardExpander) as Arc<dyn SublocaleExpander>);

        let sync = self.config.sync && loader.supports_sync();
        if self.config.sync && !sync {
            debug!(package = %self.config.package, "Loader cannot block, engine is async");
        }

        let cache = context.cache_for(&self.config.package);
        Ok(LocaleData {
            config: self.config,
            context,
            cache,
            loader,
            parser,
            expander,
            sync,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocaleDataError;
    use crate::loader::MemoryLoader;
    use crate::merge::MergePolicy;
    use serde_json::json;

    const PKG_ROOT: &str = "/pkg";

    struct Fixture {
        context: DataContext,
        loader: Arc<MemoryLoader>,
        data: LocaleData,
    }

    fn fixture_with(loader: MemoryLoader, config: LocaleDataConfig) -> Fixture {
        let context = DataContext::new();
        let loader = Arc::new(loader);
        let data = LocaleData::builder(config)
            .context(context.clone())
            .loader(loader.clone())
            .build()
            .unwrap();
        Fixture {
            context,
            loader,
            data,
        }
    }

    fn fixture() -> Fixture {
        let loader = MemoryLoader::new();
        loader.insert_json(
            "/pkg/tester.json",
            &json!({"a": "b", "c": "d", "x": {"m": "n", "o": "p"}}),
        );
        loader.insert_json("/pkg/en/tester.json", &json!({"a": "b en", "x": {"o": "p en"}}));
        loader.insert_json("/pkg/de/tester.json", &json!({"a": "b de"}));
        loader.insert_json("/pkg/de/DE/tester.json", &json!({"c": "d de-DE"}));
        fixture_with(
            loader,
            LocaleDataConfig::new("test-pkg", PKG_ROOT).with_locale("en-US"),
        )
    }

    #[test]
    fn test_build_rejects_missing_package() {
        let err = LocaleData::builder(LocaleDataConfig::new("", PKG_ROOT))
            .context(DataContext::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, LocaleDataError::Config(_)));
    }

    #[test]
    fn test_build_rejects_missing_base_path() {
        let err = LocaleData::builder(LocaleDataConfig::new("pkg", " "))
            .context(DataContext::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, LocaleDataError::Config(_)));
    }

    #[test]
    fn test_merge_all() {
        let f = fixture();
        let value = f
            .data
            .load_data(&LoadOptions::new("tester").with_locale("en"))
            .unwrap();
        assert_eq!(
            value,
            json!({"a": "b en", "c": "d", "x": {"m": "n", "o": "p en"}})
        );
    }

    #[test]
    fn test_default_locale_from_config() {
        let f = fixture();
        let value = f.data.load_data(&LoadOptions::new("tester")).unwrap();
        assert_eq!(value["a"], "b en");
    }

    #[test]
    fn test_merges_generic_to_specific() {
        let f = fixture();
        let value = f
            .data
            .load_data(&LoadOptions::new("tester").with_locale("de-DE"))
            .unwrap();
        assert_eq!(
            value,
            json!({"a": "b de", "c": "d de-DE", "x": {"m": "n", "o": "p"}})
        );
    }

    #[test]
    fn test_one_batch_per_root() {
        let f = fixture();
        f.context.add_global_root("/override");

        f.data
            .load_data(&LoadOptions::new("tester").with_locale("de-DE"))
            .unwrap();

        assert_eq!(f.loader.call_count(), 2);
        assert_eq!(
            f.loader.requested_paths(),
            vec![
                "/override/tester.json",
                "/override/de/tester.json",
                "/override/und/DE/tester.json",
                "/override/de/DE/tester.json",
                "/pkg/tester.json",
                "/pkg/de/tester.json",
                "/pkg/und/DE/tester.json",
                "/pkg/de/DE/tester.json",
            ]
        );
    }

    #[test]
    fn test_found_fragments_skip_later_roots() {
        let f = fixture();
        f.context.add_global_root("/override");
        f.loader
            .insert_json("/override/de/tester.json", &json!({"a": "override"}));

        let value = f
            .data
            .load_data(&LoadOptions::new("tester").with_locale("de"))
            .unwrap();

        assert_eq!(value["a"], "override");
        let requested = f.loader.requested_paths();
        assert!(!requested.contains(&"/pkg/de/tester.json".to_string()));
        assert!(requested.contains(&"/pkg/tester.json".to_string()));
    }

    #[test]
    fn test_newest_global_root_wins() {
        let f = fixture();
        f.context.add_global_root("/first");
        f.context.add_global_root("/second");
        f.loader.insert_json("/first/de/tester.json", &json!({"a": "first"}));
        f.loader.insert_json("/second/de/tester.json", &json!({"a": "second"}));

        let value = f
            .data
            .load_data(&LoadOptions::new("tester").with_locale("de"))
            .unwrap();
        assert_eq!(value["a"], "second");
    }

    #[test]
    fn test_blank_file_falls_through_to_next_root() {
        let f = fixture();
        f.context.add_global_root("/override");
        f.loader.insert("/override/de/tester.json", "  \n");

        let value = f
            .data
            .load_data(&LoadOptions::new("tester").with_locale("de"))
            .unwrap();
        assert_eq!(value["a"], "b de");
    }

    #[test]
    fn test_second_load_is_served_from_cache() {
        let f = fixture();
        let options = LoadOptions::new("tester").with_locale("de-DE");

        let first = f.data.load_data(&options).unwrap();
        let calls = f.loader.call_count();
        let second = f.data.load_data(&options).unwrap();

        assert_eq!(first, second);
        assert_eq!(f.loader.call_count(), calls);
    }

    #[test]
    fn test_negative_caching() {
        let f = fixture();
        assert!(!f.data.check_cache("fr-FR", "tester"));

        let value = f
            .data
            .load_data(&LoadOptions::new("tester").with_locale("fr-FR"))
            .unwrap();

        assert_eq!(value["a"], "b");
        assert!(f.data.check_cache("fr-FR", "tester"));
        assert_eq!(
            f.data.cache().get("tester", "fr-FR"),
            Some(CacheEntry::Negative)
        );
    }

    #[test]
    fn test_nothing_found_yields_empty_object() {
        let f = fixture();
        let value = f
            .data
            .load_data(&LoadOptions::new("missing").with_locale("de"))
            .unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_return_one_and_most_specific() {
        let f = fixture();
        let options = LoadOptions::new("tester").with_locale("de-DE");

        let one = f
            .data
            .load_data(&options.clone().with_policy(MergePolicy::ReturnOne))
            .unwrap();
        assert_eq!(one, json!({"a": "b", "c": "d", "x": {"m": "n", "o": "p"}}));

        let specific = f
            .data
            .load_data(&options.with_policy(MergePolicy::MostSpecific))
            .unwrap();
        assert_eq!(specific, json!({"c": "d de-DE"}));
    }

    #[test]
    fn test_array_modes() {
        let loader = MemoryLoader::new();
        loader.insert_json("/pkg/list.json", &json!({"days": ["a", "b"]}));
        loader.insert_json("/pkg/de/list.json", &json!({"days": ["c"]}));
        let f = fixture_with(loader, LocaleDataConfig::new("pkg", PKG_ROOT));

        let options = LoadOptions::new("list").with_locale("de");
        let concatenated = f.data.load_data(&options).unwrap();
        assert_eq!(concatenated, json!({"days": ["a", "b", "c"]}));

        let replaced = f.data.load_data(&options.replace_arrays()).unwrap();
        assert_eq!(replaced, json!({"days": ["c"]}));
    }

    #[test]
    fn test_injected_data_bypasses_loader() {
        let f = fixture();
        f.data.cache_data(&json!({
            "de": {"tester": {"a": "injected de"}},
            "und-DE": {"tester": null},
            "de-DE": {"tester": {"c": "injected de-DE"}}
        }));

        let value = f
            .data
            .load_data(&LoadOptions::new("tester").with_locale("de-DE"))
            .unwrap();

        assert_eq!(
            value,
            json!({"a": "injected de", "c": "injected de-DE", "x": {"m": "n", "o": "p"}})
        );
        assert_eq!(f.loader.requested_paths(), vec!["/pkg/tester.json"]);
    }

    #[test]
    fn test_partially_injected_data() {
        let f = fixture();
        f.data
            .cache_data(&json!({"de-DE": {"tester": {"c": "injected"}}}));

        let value = f
            .data
            .load_data(&LoadOptions::new("tester").with_locale("de-DE"))
            .unwrap();

        assert_eq!(value["c"], "injected");
        assert!(!f
            .loader
            .requested_paths()
            .contains(&"/pkg/de/DE/tester.json".to_string()));
    }

    #[test]
    fn test_clear_cache_forces_reload() {
        let f = fixture();
        let options = LoadOptions::new("tester").with_locale("de");
        f.data.load_data(&options).unwrap();
        assert!(f.data.check_cache("de", "tester"));

        f.data.clear_cache();
        assert!(!f.data.check_cache("de", "tester"));

        let calls = f.loader.call_count();
        f.data.load_data(&options).unwrap();
        assert!(f.loader.call_count() > calls);
    }

    #[test]
    fn test_private_root_stays_last() {
        let f = fixture();
        f.context.add_global_root("/a");
        f.context.remove_global_root(PKG_ROOT);
        assert_eq!(f.data.effective_roots(), vec!["/a", PKG_ROOT]);
    }

    #[test]
    fn test_engines_for_same_package_share_cache() {
        let f = fixture();
        let other = LocaleData::builder(LocaleDataConfig::new("test-pkg", "/elsewhere"))
            .context(f.context.clone())
            .loader(f.loader.clone())
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(f.data.cache(), other.cache()));
    }

    #[test]
    fn test_loader_failure_keeps_resolved_slots() {
        let f = fixture();
        f.context.add_global_root("/override");
        f.loader.insert_json("/override/tester.json", &json!({"a": "o"}));
        f.loader.fail_on("/pkg/de/tester.json");

        let err = f
            .data
            .load_data(&LoadOptions::new("tester").with_locale("de"))
            .unwrap_err();

        assert!(err.is_loader_error());
        assert!(f.data.cache().get("tester", "root").is_some());
        assert!(f.data.cache().get("tester", "de").is_none());
    }

    #[test]
    fn test_parse_error_is_not_cached() {
        let f = fixture();
        f.loader.insert("/pkg/de/tester.json", "{broken");
        let options = LoadOptions::new("tester").with_locale("de");

        let err = f.data.load_data(&options).unwrap_err();
        assert!(matches!(err, LocaleDataError::Parse { .. }));
        assert!(f.data.cache().get("tester", "de").is_none());

        f.loader.insert_json("/pkg/de/tester.json", &json!({"a": "fixed"}));
        let value = f.data.load_data(&options).unwrap();
        assert_eq!(value["a"], "fixed");
    }

    #[test]
    fn test_cache_disabled() {
        let loader = MemoryLoader::new();
        loader.insert_json("/pkg/tester.json", &json!({"a": 1}));
        let f = fixture_with(
            loader,
            LocaleDataConfig::new("pkg", PKG_ROOT).with_cache(false),
        );
        let options = LoadOptions::new("tester").with_locale("de");

        f.data.load_data(&options).unwrap();
        f.data.load_data(&options).unwrap();

        assert_eq!(f.loader.call_count(), 2);
        assert!(f.data.cache().is_empty());
    }

    #[test]
    fn test_blank_basename_is_rejected() {
        let f = fixture();
        let err = f.data.load_data(&LoadOptions::new(" ")).unwrap_err();
        assert!(matches!(err, LocaleDataError::Config(_)));
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let sync = fixture();
        let async_ = fixture();
        sync.context.add_global_root("/override");
        async_.context.add_global_root("/override");
        for f in [&sync, &async_] {
            f.loader
                .insert_json("/override/de/DE/tester.json", &json!({"x": {"m": "o"}}));
        }

        for locale in ["de-DE", "en-US", "fr", "root"] {
            let options = LoadOptions::new("tester").with_locale(locale).with_sync(false);
            let expected = sync.data.load_data(&options).unwrap();
            let actual = async_.data.load_data_async(&options).await.unwrap();
            assert_eq!(expected, actual, "locale {}", locale);
        }
        assert_eq!(sync.loader.requested_paths(), async_.loader.requested_paths());
    }

    #[tokio::test]
    async fn test_async_second_load_is_served_from_cache() {
        let f = fixture();
        let options = LoadOptions::new("tester").with_locale("de-DE");

        let first = f.data.load_data_async(&options).await.unwrap();
        let calls = f.loader.call_count();
        let second = f.data.load_data_async(&options).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(f.loader.call_count(), calls);
    }

    #[tokio::test]
    async fn test_async_only_loader() {
        let loader = MemoryLoader::async_only();
        loader.insert_json("/pkg/tester.json", &json!({"a": "root"}));
        let f = fixture_with(
            loader,
            LocaleDataConfig::new("pkg", PKG_ROOT).with_sync(true),
        );
        assert!(!f.data.is_sync());

        let options = LoadOptions::new("tester").with_locale("de");
        let err = f.data.load_data(&options).unwrap_err();
        assert!(matches!(err, LocaleDataError::SyncUnsupported));

        let value = f.data.load_data_async(&options).await.unwrap();
        assert_eq!(value, json!({"a": "root"}));

        // Fully cached now, so blocking works too.
        assert_eq!(f.data.load_data(&options).unwrap(), value);
    }

    #[tokio::test]
    async fn test_async_loader_failure_keeps_resolved_slots() {
        let f = fixture();
        f.context.add_global_root("/override");
        f.loader.insert_json("/override/tester.json", &json!({"a": "o"}));
        f.loader.fail_on("/pkg/de/tester.json");

        let err = f
            .data
            .load_data_async(&LoadOptions::new("tester").with_locale("de"))
            .await
            .unwrap_err();

        assert!(err.is_loader_error());
        assert_eq!(
            f.data.cache().get("tester", "root"),
            Some(CacheEntry::Data(json!({"a": "o"})))
        );
        assert!(f.data.cache().get("tester", "de").is_none());
        assert_eq!(f.loader.sync_call_count(), 0);
    }

    #[tokio::test]
    async fn test_async_parse_error_is_not_cached() {
        let f = fixture();
        f.loader.insert("/pkg/de/tester.json", "{broken");
        let options = LoadOptions::new("tester").with_locale("de");

        let err = f.data.load_data_async(&options).await.unwrap_err();
        assert!(matches!(err, LocaleDataError::Parse { .. }));
        assert!(f.data.cache().get("tester", "de").is_none());

        f.loader.insert_json("/pkg/de/tester.json", &json!({"a": "fixed"}));
        let value = f.data.load_data_async(&options).await.unwrap();
        assert_eq!(value["a"], "fixed");
        assert_eq!(
            f.data.cache().get("tester", "de"),
            Some(CacheEntry::Data(json!({"a": "fixed"})))
        );
    }

    #[tokio::test]
    async fn test_async_with_sync_option_reads_blocking() {
        let f = fixture();

        let blocking = f
            .data
            .load_data_async(&LoadOptions::new("tester").with_locale("de").with_sync(true))
            .await
            .unwrap();
        assert!(f.loader.sync_call_count() > 0);
        assert_eq!(f.loader.async_call_count(), 0);

        f.data.clear_cache();
        f.loader.reset_stats();

        let suspended = f
            .data
            .load_data_async(&LoadOptions::new("tester").with_locale("de").with_sync(false))
            .await
            .unwrap();
        assert_eq!(f.loader.sync_call_count(), 0);
        assert!(f.loader.async_call_count() > 0);
        assert_eq!(blocking, suspended);
    }

    #[tokio::test]
    async fn test_concurrent_async_loads_of_same_request() {
        let f = fixture();
        let options = LoadOptions::new("tester").with_locale("de-DE");

        let (first, second) = tokio::join!(
            f.data.load_data_async(&options),
            f.data.load_data_async(&options)
        );
        let first = first.unwrap();
        assert_eq!(first, second.unwrap());

        let cache = f.data.cache();
        assert_eq!(
            cache.get("tester", "de-DE"),
            Some(CacheEntry::Data(json!({"c": "d de-DE"})))
        );
        assert_eq!(cache.get("tester", "und-DE"), Some(CacheEntry::Negative));

        let calls = f.loader.call_count();
        assert_eq!(f.data.load_data_async(&options).await.unwrap(), first);
        assert_eq!(f.loader.call_count(), calls);
    }

    #[test]
    fn test_concurrent_blocking_loads_of_same_request() {
        let f = fixture();
        let options = LoadOptions::new("tester").with_locale("de-DE");

        let results: Vec<Value> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| f.data.load_data(&options).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(
            f.data.cache().get("tester", "de"),
            Some(CacheEntry::Data(json!({"a": "b de"})))
        );
    }

    #[tokio::test]
    async fn test_ensure_locale_with_sync_loader() {
        let f = fixture();
        assert!(f.data.ensure_locale("de-DE").await.unwrap());
        assert_eq!(f.loader.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_locale_preloads() {
        let loader = MemoryLoader::async_only();
        loader.insert_json(
            "/pkg/de-DE.json",
            &json!({"tester": {"a": "pkg", "b": "pkg"}, "dates": {"d": 1}}),
        );
        loader.insert_json("/override/de-DE.json", &json!({"tester": {"a": "override"}}));
        let f = fixture_with(loader, LocaleDataConfig::new("pkg", PKG_ROOT));
        f.context.add_global_root("/override");

        assert!(f.data.ensure_locale("de_DE").await.unwrap());

        let cache = f.data.cache();
        assert_eq!(
            cache.get("tester", "de-DE"),
            Some(CacheEntry::Data(json!({"a": "override", "b": "pkg"})))
        );
        assert_eq!(
            cache.get("dates", "de-DE"),
            Some(CacheEntry::Data(json!({"d": 1})))
        );
    }

    #[tokio::test]
    async fn test_ensure_locale_without_files() {
        let f = fixture_with(
            MemoryLoader::async_only(),
            LocaleDataConfig::new("pkg", PKG_ROOT),
        );
        assert!(!f.data.ensure_locale("ja-JP").await.unwrap());
        assert!(f.data.cache().is_empty());
    }
}
