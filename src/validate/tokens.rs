//! Tokenization and the Closed Glue Sets
//!
//! Small pure text helpers shared by every check: whitespace tokenization
//! with punctuation stripping, numeral classification, whitespace-collapse
//! normalization for deduplication, and the fixed closed sets of words
//! permitted outside the restricted vocabulary (articles, basic pronouns,
//! and the seven glue verbs in present tense).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Definite and indefinite articles.
pub const ARTICLES: [&str; 8] = ["el", "la", "los", "las", "un", "una", "unos", "unas"];

/// Basic subject and object pronouns.
pub const PRONOUNS: [&str; 21] = [
    "yo", "tú", "usted", "él", "ella", "nosotros", "nosotras", "vosotros", "vosotras", "ustedes",
    "ellos", "ellas", "me", "te", "se", "le", "les", "lo", "nos", "os", "la",
];

/// Present-tense forms of the seven glue verbs
/// (ser, estar, tener, haber, ir, ver, querer), infinitives included.
pub const GLUE_VERB_FORMS: [&str; 50] = [
    // ser
    "ser", "soy", "eres", "es", "somos", "sois", "son",
    // estar
    "estar", "estoy", "estás", "está", "estamos", "estáis", "están",
    // tener
    "tener", "tengo", "tienes", "tiene", "tenemos", "tenéis", "tienen",
    // haber
    "haber", "he", "has", "ha", "hay", "hemos", "habéis", "han",
    // ir
    "ir", "voy", "vas", "va", "vamos", "vais", "van",
    // ver
    "ver", "veo", "ves", "ve", "vemos", "veis", "ven",
    // querer
    "querer", "quiero", "quieres", "quiere", "queremos", "queréis", "quieren",
];

static GLUE_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ARTICLES
        .iter()
        .chain(PRONOUNS.iter())
        .chain(GLUE_VERB_FORMS.iter())
        .copied()
        .collect()
});

static ARTICLE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ARTICLES.iter().copied().collect());

static NUMERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.,]\d+)?$").expect("static numeral pattern"));

/// Split on whitespace and strip leading/trailing punctuation from each
/// token. Case and diacritics are preserved; empty remnants (bare
/// punctuation) are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Word count as the length check defines it.
pub fn word_count(text: &str) -> usize {
    tokenize(text).len()
}

/// Collapse internal whitespace runs and trim. The deduplication key for
/// assembled sentences.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A free-standing numeral token, decimal separators allowed.
pub fn is_numeral(token: &str) -> bool {
    NUMERAL_RE.is_match(token)
}

/// Whether a token belongs to the closed glue sets: articles, basic
/// pronouns, or a present-tense glue-verb form.
pub fn is_glue(token: &str) -> bool {
    GLUE_SET.contains(token.to_lowercase().as_str())
}

/// Whether a token is an article (used by the agreement adjacency scan).
pub fn is_article(token: &str) -> bool {
    ARTICLE_SET.contains(token.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(tokenize("Veo la arcilla."), vec!["Veo", "la", "arcilla"]);
        assert_eq!(tokenize("¿Dónde está?"), vec!["Dónde", "está"]);
        assert_eq!(tokenize("¡Hola!  — ..."), vec!["Hola"]);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("La doctora."), 2);
        assert_eq!(word_count("El perro está aquí."), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Veo  la\tarcilla. "), "Veo la arcilla.");
    }

    #[test]
    fn test_is_numeral() {
        assert!(is_numeral("24"));
        assert!(is_numeral("3,5"));
        assert!(is_numeral("3.5"));
        assert!(!is_numeral("veinticuatro"));
        assert!(!is_numeral("24h"));
        assert!(!is_numeral(""));
    }

    #[test]
    fn test_glue_articles_and_pronouns() {
        assert!(is_glue("la"));
        assert!(is_glue("El"));
        assert!(is_glue("yo"));
        assert!(!is_glue("perro"));
    }

    #[test]
    fn test_glue_verb_forms() {
        assert!(is_glue("veo"));
        assert!(is_glue("está"));
        assert!(is_glue("quieren"));
        assert!(is_glue("ser"));
        // Past tense is not glue.
        assert!(!is_glue("vi"));
        assert!(!is_glue("estuvo"));
    }

    #[test]
    fn test_is_article() {
        assert!(is_article("La"));
        assert!(is_article("unos"));
        assert!(!is_article("yo"));
    }

    proptest! {
        // Tokenization never panics and never produces empty tokens.
        #[test]
        fn prop_tokenize_total(s in "\\PC*") {
            let tokens = tokenize(&s);
            prop_assert!(tokens.iter().all(|t| !t.is_empty()));
        }

        // Collapsing is idempotent.
        #[test]
        fn prop_collapse_idempotent(s in "\\PC*") {
            let once = collapse_whitespace(&s);
            prop_assert_eq!(collapse_whitespace(&once), once);
        }
    }
}
