//! Sublocale fragments and their storage paths.
//!
//! A request for `(basename, locale)` becomes a [`FragmentSet`]: one
//! [`Fragment`] per sublocale, each pointing at the file that holds that
//! sublocale's contribution.
//!
//! # Path Layout
//!
//! ```text
//! <root>/sysres.json               root fragment
//! <root>/de/sysres.json            de
//! <root>/und/DE/sysres.json        und-DE
//! <root>/de/DE/sysres.json         de-DE
//! ```

use std::collections::HashSet;

use crate::locale::{Locale, SublocaleExpander};

/// File extension of locale data files.
pub const DATA_EXTENSION: &str = "json";

/// One generic-to-specific unit of a locale expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Merge order, 0 for root.
    pub rank: usize,
    /// Path of the data file relative to a storage root.
    pub path_suffix: String,
    /// The sublocale this fragment stands for.
    pub locale: Locale,
}

impl Fragment {
    /// Cache key of this fragment's sublocale.
    pub fn cache_key(&self) -> String {
        self.locale.to_string()
    }

    /// Check if this is the root fragment.
    pub fn is_root(&self) -> bool {
        self.locale.is_root()
    }

    /// Full candidate path of this fragment under `root`.
    pub fn path_under(&self, root: &str) -> String {
        join_path(root, &self.path_suffix)
    }
}

/// Ordered fragments for one `(basename, locale)` request.
#[derive(Debug, Clone)]
pub struct FragmentSet {
    fragments: Vec<Fragment>,
}

impl FragmentSet {
    /// Expand `locale` into fragments for `basename`.
    ///
    /// The root fragment is always first. Sublocales mapping to an already
    /// seen path are skipped.
    pub fn expand(expander: &dyn SublocaleExpander, locale: &Locale, basename: &str) -> Self {
        let mut sublocales = expander.sublocales(locale);
        if sublocales.first().map_or(true, |l| !l.is_root()) {
            sublocales.retain(|l| !l.is_root());
            sublocales.insert(0, Locale::root());
        }

        let mut seen = HashSet::new();
        let mut fragments = Vec::with_capacity(sublocales.len());
        for sublocale in sublocales {
            let path_suffix = path_suffix(&sublocale, basename);
            if !seen.insert(path_suffix.clone()) {
                continue;
            }
            fragments.push(Fragment {
                rank: fragments.len(),
                path_suffix,
                locale: sublocale,
            });
        }

        Self { fragments }
    }

    /// Fragments in merge order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Number of fragments (never zero).
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Always false; the root fragment is always present.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Iterate fragments in merge order.
    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }

    pub(crate) fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }
}

impl<'a> IntoIterator for &'a FragmentSet {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}

/// Relative file path of `basename` for `locale`.
pub fn path_suffix(locale: &Locale, basename: &str) -> String {
    let file = format!("{}.{}", basename, DATA_EXTENSION);
    let segments = locale.path_segments();
    if segments.is_empty() {
        file
    } else {
        format!("{}/{}", segments.join("/"), file)
    }
}

/// Join a storage root and a relative path with a single `/`.
///
/// An empty root yields the relative path unchanged.
pub fn join_path(root: &str, suffix: &str) -> String {
    if root.is_empty() {
        return suffix.to_string();
    }
    format!(
        "{}/{}",
        root.trim_end_matches(['/', '\\']),
        suffix.trim_start_matches('/')
    )
}
