//! Vocabulary Index
//!
//! Loads and normalizes the allowed-word list and answers the lookup
//! queries validation needs: membership, grammatical category, and recorded
//! gender. Lookups are case-insensitive and diacritic-preserving — "Árbol"
//! matches "árbol", but "arbol" does not.
//!
//! The index is built once per run and never mutated afterwards; it is
//! shared read-only across concurrent validation.

mod loader;

pub use loader::{load_hints, load_vocabulary};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{ForgeError, Result};

// =============================================================================
// Entry Types
// =============================================================================

/// Grammatical category of a vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Noun,
    Verb,
    #[serde(rename = "adj")]
    Adjective,
    #[default]
    Other,
}

/// Recorded gender for nouns and adjectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Masculine,
    #[serde(rename = "f")]
    Feminine,
}

/// Grammatical number, detected from the surface form during lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Number {
    Singular,
    Plural,
}

/// A normalized vocabulary entry: lowercase token plus the attributes the
/// agreement check needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub word: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl VocabularyEntry {
    pub fn new(word: impl Into<String>, category: Category) -> Self {
        Self {
            word: word.into(),
            category,
            gender: None,
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

/// A successful token lookup: the matched entry plus the number implied by
/// the surface form.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub entry: &'a VocabularyEntry,
    pub number: Number,
}

// =============================================================================
// Index
// =============================================================================

/// Immutable lookup structure over the allowed vocabulary.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    entries: HashMap<String, VocabularyEntry>,
    /// Insertion order, preserved for prompt rendering.
    order: Vec<String>,
}

impl VocabularyIndex {
    /// Build from entries, normalizing (trim, lowercase) and deduplicating
    /// (first occurrence wins). Fails with `EmptyVocabulary` when nothing
    /// survives normalization.
    pub fn build<I>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = VocabularyEntry>,
    {
        let mut entries = HashMap::new();
        let mut order = Vec::new();

        for mut entry in raw {
            let word = normalize(&entry.word);
            if word.is_empty() {
                continue;
            }
            entry.word = word.clone();
            if !entries.contains_key(&word) {
                entries.insert(word.clone(), entry);
                order.push(word);
            }
        }

        if entries.is_empty() {
            return Err(ForgeError::EmptyVocabulary);
        }

        Ok(Self { entries, order })
    }

    /// Build from bare words, all categorized `Other`.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(
            words
                .into_iter()
                .map(|w| VocabularyEntry::new(w.as_ref(), Category::Other)),
        )
    }

    /// Case-insensitive, diacritic-preserving membership test on the exact
    /// surface form.
    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(&normalize(word))
    }

    pub fn entry(&self, word: &str) -> Option<&VocabularyEntry> {
        self.entries.get(&normalize(word))
    }

    pub fn category_of(&self, word: &str) -> Option<Category> {
        self.entry(word).map(|e| e.category)
    }

    /// Resolve a surface token against the index, folding regular plural
    /// endings (-s, -es) onto the stored lemma. Gender folds (-a ↔ -o) are
    /// additionally tried for adjectives, so "roja" and "rojas" match a
    /// listed lemma "rojo". Irregular forms must be listed explicitly.
    pub fn resolve(&self, token: &str) -> Option<Resolved<'_>> {
        let norm = normalize(token);
        let folds = plural_folds(&norm);

        for (form, number) in &folds {
            if let Some(entry) = self.entries.get(form.as_str()) {
                return Some(Resolved {
                    entry,
                    number: *number,
                });
            }
        }

        // Gender folds are restricted to adjectives: swapping the final
        // vowel of a noun would match a different word entirely.
        for (form, number) in &folds {
            if let Some(swapped) = swap_final_gender_vowel(form)
                && let Some(entry) = self.entries.get(&swapped)
                && entry.category == Category::Adjective
            {
                return Some(Resolved {
                    entry,
                    number: *number,
                });
            }
        }

        None
    }

    /// Allowed words in insertion order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether any allowed word is itself a numeral token. Drives the
    /// constraint default for `numerals_allowed`.
    pub fn has_numerals(&self) -> bool {
        self.order
            .iter()
            .any(|w| crate::validate::tokens::is_numeral(w))
    }

    /// Overlay category/gender hints onto matching entries. Hints fill or
    /// override the recorded attributes; unknown hint words are ignored.
    pub fn apply_hints(&mut self, hints: &HashMap<String, (Category, Option<Gender>)>) {
        for (word, (category, gender)) in hints {
            if let Some(entry) = self.entries.get_mut(&normalize(word)) {
                entry.category = *category;
                if gender.is_some() {
                    entry.gender = *gender;
                }
            }
        }
    }
}

/// Normalization applied to every stored and queried word: trim plus
/// Unicode lowercase. Diacritics are preserved.
fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Candidate (form, number) pairs for a surface token: the token itself,
/// then regular plural endings stripped.
fn plural_folds(norm: &str) -> Vec<(String, Number)> {
    let mut folds = vec![(norm.to_string(), Number::Singular)];
    if let Some(stem) = norm.strip_suffix("es") {
        folds.push((stem.to_string(), Number::Plural));
    }
    if let Some(stem) = norm.strip_suffix('s') {
        folds.push((stem.to_string(), Number::Plural));
    }
    folds
}

/// Swap a trailing gender vowel (-a ↔ -o), or `None` when the form has no
/// such ending.
fn swap_final_gender_vowel(form: &str) -> Option<String> {
    if let Some(stem) = form.strip_suffix('a') {
        Some(format!("{stem}o"))
    } else {
        form.strip_suffix('o').map(|stem| format!("{stem}a"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> VocabularyIndex {
        VocabularyIndex::build(vec![
            VocabularyEntry::new("arcilla", Category::Noun).with_gender(Gender::Feminine),
            VocabularyEntry::new("doctora", Category::Noun).with_gender(Gender::Feminine),
            VocabularyEntry::new("rojo", Category::Adjective),
            VocabularyEntry::new("aquí", Category::Other),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let err = VocabularyIndex::from_words(vec!["  ", ""]).unwrap_err();
        assert!(matches!(err, ForgeError::EmptyVocabulary));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let index = sample_index();
        assert!(index.contains("Arcilla"));
        assert!(index.contains("ARCILLA"));
    }

    #[test]
    fn test_diacritics_preserved() {
        let index = sample_index();
        assert!(index.contains("aquí"));
        assert!(!index.contains("aqui"));
    }

    #[test]
    fn test_dedup_first_wins() {
        let index = VocabularyIndex::build(vec![
            VocabularyEntry::new("casa", Category::Noun).with_gender(Gender::Feminine),
            VocabularyEntry::new("Casa", Category::Other),
        ])
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.category_of("casa"), Some(Category::Noun));
    }

    #[test]
    fn test_resolve_folds_regular_plurals() {
        let index = sample_index();

        let singular = index.resolve("arcilla").unwrap();
        assert!(matches!(singular.number, Number::Singular));

        let plural = index.resolve("doctoras").unwrap();
        assert!(matches!(plural.number, Number::Plural));
        assert_eq!(plural.entry.word, "doctora");

        assert!(index.resolve("perro").is_none());
    }

    #[test]
    fn test_resolve_gender_folds_adjectives_only() {
        let index = VocabularyIndex::build(vec![
            VocabularyEntry::new("rojo", Category::Adjective),
            VocabularyEntry::new("doctora", Category::Noun).with_gender(Gender::Feminine),
        ])
        .unwrap();

        let inflected = index.resolve("roja").unwrap();
        assert_eq!(inflected.entry.word, "rojo");
        assert!(matches!(inflected.number, Number::Singular));

        let plural = index.resolve("rojas").unwrap();
        assert_eq!(plural.entry.word, "rojo");
        assert!(matches!(plural.number, Number::Plural));

        // A noun never matches through a gender swap.
        assert!(index.resolve("doctoro").is_none());
    }

    #[test]
    fn test_words_preserve_order() {
        let index = sample_index();
        let words: Vec<_> = index.words().collect();
        assert_eq!(words, vec!["arcilla", "doctora", "rojo", "aquí"]);
    }

    #[test]
    fn test_apply_hints_overrides_category() {
        let mut index = VocabularyIndex::from_words(vec!["limpiar", "azul"]).unwrap();
        let mut hints = HashMap::new();
        hints.insert("limpiar".to_string(), (Category::Verb, None));
        hints.insert(
            "azul".to_string(),
            (Category::Adjective, None),
        );
        hints.insert("desconocida".to_string(), (Category::Noun, None));

        index.apply_hints(&hints);

        assert_eq!(index.category_of("limpiar"), Some(Category::Verb));
        assert_eq!(index.category_of("azul"), Some(Category::Adjective));
        assert!(!index.contains("desconocida"));
    }

    #[test]
    fn test_has_numerals() {
        let with = VocabularyIndex::from_words(vec!["uno", "24"]).unwrap();
        assert!(with.has_numerals());

        let without = VocabularyIndex::from_words(vec!["uno", "dos"]).unwrap();
        assert!(!without.has_numerals());
    }
}
