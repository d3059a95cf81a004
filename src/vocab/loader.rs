//! Vocabulary Loaders
//!
//! Reads the allowed-word list from disk. Three JSON shapes are accepted,
//! matching the artifacts the surrounding toolchain produces:
//!
//! - a bare string array: `["arcilla", "doctora"]`
//! - a known-words export: `{"count": 2, "words": ["arcilla", "doctora"]}`
//! - a structured entry array: `[{"word": "arcilla", "pos": "noun", "gender": "f"}]`
//!   (the `spanish` key is accepted as an alias for `word`)
//!
//! A YAML hints file (`word: pos` or `word: pos,gender`) can overlay
//! categories onto entries loaded without them.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Category, Gender, VocabularyEntry, VocabularyIndex};
use crate::types::{ForgeError, Result};

/// Structured entry as it appears on disk.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(alias = "spanish")]
    word: String,
    #[serde(default, alias = "category")]
    pos: Option<Category>,
    #[serde(default)]
    gender: Option<Gender>,
}

/// Known-words export shape.
#[derive(Debug, Deserialize)]
struct KnownWordsFile {
    words: Vec<String>,
}

/// Load a vocabulary index from any of the supported JSON shapes.
pub fn load_vocabulary(path: &Path) -> Result<VocabularyIndex> {
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;

    let index = match &value {
        Value::Array(items) if items.iter().all(Value::is_string) => {
            debug!(path = %path.display(), "Loading vocabulary from bare word array");
            let words: Vec<String> = serde_json::from_value(value.clone())?;
            VocabularyIndex::from_words(words)?
        }
        Value::Array(_) => {
            debug!(path = %path.display(), "Loading vocabulary from structured entries");
            let entries: Vec<RawEntry> = serde_json::from_value(value.clone())?;
            VocabularyIndex::build(entries.into_iter().map(|e| VocabularyEntry {
                word: e.word,
                category: e.pos.unwrap_or_default(),
                gender: e.gender,
            }))?
        }
        Value::Object(map) if map.contains_key("words") => {
            debug!(path = %path.display(), "Loading vocabulary from known-words export");
            let file: KnownWordsFile = serde_json::from_value(value.clone())?;
            VocabularyIndex::from_words(file.words)?
        }
        _ => {
            return Err(ForgeError::Config(format!(
                "unrecognized vocabulary format in {}",
                path.display()
            )));
        }
    };

    debug!(words = index.len(), "Vocabulary loaded");
    Ok(index)
}

/// Load a YAML hints file mapping words to `pos` or `pos,gender`.
///
/// Unknown part-of-speech values are skipped with a warning rather than
/// failing the run — hints are an overlay, not a source of truth.
pub fn load_hints(path: &Path) -> Result<HashMap<String, (Category, Option<Gender>)>> {
    let raw = fs::read_to_string(path)?;
    let parsed: HashMap<String, String> = serde_yaml::from_str(&raw)?;

    let mut hints = HashMap::new();
    for (word, value) in parsed {
        let mut parts = value.split(',').map(str::trim);
        let pos = parts.next().unwrap_or_default();

        let Some(category) = parse_category(pos) else {
            warn!(word = %word, value = %value, "Skipping hint with unknown part of speech");
            continue;
        };

        let gender = parts.next().and_then(parse_gender);
        hints.insert(word.trim().to_lowercase(), (category, gender));
    }

    Ok(hints)
}

fn parse_category(s: &str) -> Option<Category> {
    match s {
        "noun" => Some(Category::Noun),
        "verb" => Some(Category::Verb),
        "adj" | "adjective" => Some(Category::Adjective),
        "other" => Some(Category::Other),
        _ => None,
    }
}

fn parse_gender(s: &str) -> Option<Gender> {
    match s {
        "m" => Some(Gender::Masculine),
        "f" => Some(Gender::Feminine),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_bare_array() {
        let file = write_temp(r#"["arcilla", "Doctora", "arcilla"]"#);
        let index = load_vocabulary(file.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains("doctora"));
    }

    #[test]
    fn test_load_known_words_export() {
        let file = write_temp(r#"{"count": 2, "words": ["ver", "estar"], "query": "deck:x"}"#);
        let index = load_vocabulary(file.path()).unwrap();
        assert!(index.contains("ver"));
        assert!(index.contains("estar"));
    }

    #[test]
    fn test_load_structured_entries() {
        let file = write_temp(
            r#"[
                {"word": "arcilla", "pos": "noun", "gender": "f"},
                {"spanish": "rojo", "pos": "adj"},
                {"word": "limpiar", "pos": "verb"}
            ]"#,
        );
        let index = load_vocabulary(file.path()).unwrap();
        assert_eq!(index.category_of("arcilla"), Some(Category::Noun));
        assert_eq!(
            index.entry("arcilla").unwrap().gender,
            Some(Gender::Feminine)
        );
        assert_eq!(index.category_of("rojo"), Some(Category::Adjective));
    }

    #[test]
    fn test_load_rejects_unknown_shape() {
        let file = write_temp(r#"{"vocab": []}"#);
        assert!(matches!(
            load_vocabulary(file.path()),
            Err(ForgeError::Config(_))
        ));
    }

    #[test]
    fn test_load_hints() {
        let file = write_temp("# comment\nd\u{f3}lar: noun\nrojo: adj\ndoctora: noun,f\nmisterio: gerund\n");
        let hints = load_hints(file.path()).unwrap();
        assert_eq!(hints["dólar"], (Category::Noun, None));
        assert_eq!(hints["rojo"], (Category::Adjective, None));
        assert_eq!(hints["doctora"], (Category::Noun, Some(Gender::Feminine)));
        assert!(!hints.contains_key("misterio"));
    }
}
