//! Per-language homophone tables.
//!
//! Tables are normalized and made symmetric once, at construction, and are
//! immutable afterwards. A [`HomophoneRegistry`] is built at startup and
//! shared read-only (behind an `Arc`) by every alignment call.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use crate::alignment::tokenization::normalize_single;
use crate::error::AlignmentError;

const BUILTIN_TABLES: [(&str, &str); 2] = [
    ("en", include_str!("../data/homophones/en.json")),
    ("id", include_str!("../data/homophones/id.json")),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomophoneTable {
    map: HashMap<String, HashSet<String>>,
}

impl HomophoneTable {
    /// Builds a table from `token -> [equivalents]`. Keys and values are
    /// normalized like transcript words; entries that do not normalize to a
    /// single word are skipped. Missing reverse entries are added.
    pub fn from_mapping<K, V, I>(raw: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, Vec<V>)>,
    {
        let mut map: HashMap<String, HashSet<String>> = HashMap::new();
        let mut pairs = Vec::new();
        let mut skipped = 0usize;

        for (key, values) in raw {
            let Some(key) = normalize_single(key.as_ref()) else {
                skipped += 1;
                continue;
            };
            for value in values {
                let Some(value) = normalize_single(value.as_ref()) else {
                    skipped += 1;
                    continue;
                };
                if value == key {
                    continue;
                }
                map.entry(key.clone()).or_default().insert(value.clone());
                pairs.push((key.clone(), value));
            }
        }

        let mut augmented = 0usize;
        for (key, value) in pairs {
            if map.entry(value).or_default().insert(key) {
                augmented += 1;
            }
        }
        if augmented > 0 || skipped > 0 {
            tracing::debug!(
                augmented,
                skipped,
                entries = map.len(),
                "homophones: normalized table on load"
            );
        }

        Self { map }
    }

    /// Every member of a family is equivalent to every other member.
    pub fn from_families<S: AsRef<str>>(families: &[Vec<S>]) -> Self {
        let mapping = families.iter().flat_map(|family| {
            family.iter().map(move |member| {
                let others: Vec<&str> = family
                    .iter()
                    .map(AsRef::as_ref)
                    .filter(|other| *other != member.as_ref())
                    .collect();
                (member.as_ref(), others)
            })
        });
        Self::from_mapping(mapping)
    }

    pub fn parse_json(data: &str) -> Result<Self, AlignmentError> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(data)
            .map_err(|e| AlignmentError::json("parse homophone table", e))?;
        Ok(Self::from_mapping(raw))
    }

    pub fn are_equivalent(&self, a: &str, b: &str) -> bool {
        a == b || self.map.get(a).is_some_and(|set| set.contains(b))
    }

    pub fn homophones_of(&self, token: &str) -> Option<&HashSet<String>> {
        self.map.get(token)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Token equivalence for one alignment call: identity plus, when a table
/// exists for the language, homophones.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equivalence<'a> {
    table: Option<&'a HomophoneTable>,
}

impl<'a> Equivalence<'a> {
    pub fn identity() -> Self {
        Self { table: None }
    }

    pub fn with_table(table: &'a HomophoneTable) -> Self {
        Self { table: Some(table) }
    }

    #[inline]
    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self.table {
            Some(table) => table.are_equivalent(a, b),
            None => a == b,
        }
    }

    pub fn is_identity_only(&self) -> bool {
        self.table.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HomophoneRegistry {
    tables: HashMap<String, Arc<HomophoneTable>>,
}

impl HomophoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the tables shipped with the crate (`en`, `id`).
    pub fn builtin() -> Result<Self, AlignmentError> {
        let mut registry = Self::new();
        for (language, data) in BUILTIN_TABLES {
            registry.insert(language, HomophoneTable::parse_json(data)?);
        }
        Ok(registry)
    }

    /// Loads `{ "<language>": { "<token>": ["<token>", ...] } }`.
    pub fn load_file(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read homophone file", e))?;
        let raw: HashMap<String, HashMap<String, Vec<String>>> = serde_json::from_str(&data)
            .map_err(|e| AlignmentError::json("parse homophone file", e))?;
        let mut registry = Self::new();
        for (language, mapping) in raw {
            registry.insert(&language, HomophoneTable::from_mapping(mapping));
        }
        Ok(registry)
    }

    /// Loads every `<language>.json` in `dir`, each a `{ "<token>": [...] }` map.
    pub fn load_dir(dir: &Path) -> Result<Self, AlignmentError> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| AlignmentError::io("list homophone dir", e))?;
        let mut registry = Self::new();
        for entry in entries {
            let path = entry
                .map_err(|e| AlignmentError::io("list homophone dir", e))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(language) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let data = std::fs::read_to_string(&path)
                .map_err(|e| AlignmentError::io("read homophone table", e))?;
            registry.insert(language, HomophoneTable::parse_json(&data)?);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, language: &str, table: HomophoneTable) {
        tracing::debug!(language, entries = table.len(), "homophones: table registered");
        self.tables
            .insert(canonical_language(language), Arc::new(table));
    }

    pub fn with_table(mut self, language: &str, table: HomophoneTable) -> Self {
        self.insert(language, table);
        self
    }

    /// Tables from `other` replace tables for the same language.
    pub fn merge(mut self, other: HomophoneRegistry) -> Self {
        self.tables.extend(other.tables);
        self
    }

    /// Exact language code first (`en-us`), then its primary subtag (`en`).
    pub fn table_for(&self, language: &str) -> Option<&HomophoneTable> {
        let code = canonical_language(language);
        if let Some(table) = self.tables.get(&code) {
            return Some(table.as_ref());
        }
        let primary = code.split('-').next().unwrap_or_default();
        self.tables.get(primary).map(Arc::as_ref)
    }

    pub fn equivalence(&self, language: &str) -> Equivalence<'_> {
        match self.table_for(language) {
            Some(table) => Equivalence::with_table(table),
            None => Equivalence::identity(),
        }
    }

    pub fn are_equivalent(&self, a: &str, b: &str, language: &str) -> bool {
        self.equivalence(language).matches(a, b)
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }
}

fn canonical_language(language: &str) -> String {
    language.trim().to_ascii_lowercase().replace('_', "-")
}
