//! JSON Repair Mechanism
//!
//! Mechanical extraction and repair of JSON from collaborator responses.
//! Generative models wrap payloads in markdown fences, leave trailing
//! commas, truncate mid-string, or bury the array in explanatory prose —
//! all of which parse after a bounded set of textual repairs.
//!
//! This is the single schema auto-repair pass the policy allots per
//! payload. Failure here is a schema violation, never a crash.

use serde_json::Value;
use tracing::{debug, warn};

/// Parse a raw payload, attempting repair when the direct parse fails.
///
/// Returns `(value, was_repaired)`, or an error detail string when no
/// repair stage produced valid JSON.
pub fn parse_or_repair(raw: &str) -> Result<(Value, bool), String> {
    let cleaned = strip_fences(raw.trim().trim_start_matches('\u{feff}'));

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok((value, false));
    }

    debug!("Direct JSON parse failed, attempting repair");

    for stage in [repair_commas, repair_structure] {
        let repaired = stage(&cleaned);
        if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
            warn!("Collaborator payload required JSON repair");
            return Ok((value, true));
        }
    }

    // Last resort: the payload may be prose with JSON embedded somewhere.
    if let Some(embedded) = extract_embedded(&cleaned) {
        let repaired = repair_structure(&repair_commas(&embedded));
        if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
            warn!("Extracted JSON payload from surrounding prose");
            return Ok((value, true));
        }
    }

    Err(format!(
        "payload is not valid JSON after repair (starts with: {})",
        cleaned.chars().take(80).collect::<String>()
    ))
}

/// Strip a markdown code fence (```json ... ``` or ``` ... ```).
fn strip_fences(s: &str) -> String {
    let mut out = s.to_string();
    if out.starts_with("```")
        && let Some(newline) = out.find('\n')
    {
        out = out[newline + 1..].to_string();
    }
    if let Some(stripped) = out.trim_end().strip_suffix("```") {
        out = stripped.trim_end().to_string();
    }
    out
}

/// Drop commas that directly precede a closing bracket or brace.
fn repair_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && matches!(chars[j], ']' | '}') {
                i += 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Close unterminated strings and append missing closing brackets/braces,
/// in nesting order.
fn repair_structure(s: &str) -> String {
    let mut out = s.trim_end().to_string();
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in out.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                if stack.last() == Some(&ch) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    if in_string {
        out.push('"');
    }
    // A repair-truncated payload often ends on a dangling comma.
    while out.ends_with(',') {
        out.pop();
    }
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}

/// Find the first balanced JSON array or object inside mixed content.
/// Arrays are preferred — the expected payload shape is array-like.
fn extract_embedded(s: &str) -> Option<String> {
    extract_balanced(s, '[', ']').or_else(|| extract_balanced(s, '{', '}'))
}

fn extract_balanced(s: &str, open: char, close: char) -> Option<String> {
    let start = s.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in s[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(s[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    // Unbalanced to the end: return the tail and let repair close it.
    Some(s[start..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_payload_not_marked_repaired() {
        let (value, repaired) = parse_or_repair(r#"[{"text": "hola"}]"#).unwrap();
        assert!(value.is_array());
        assert!(!repaired);
    }

    #[test]
    fn test_strips_code_fences() {
        let raw = "```json\n[{\"text\": \"hola\"}]\n```";
        let (value, _) = parse_or_repair(raw).unwrap();
        assert_eq!(value[0]["text"], "hola");
    }

    #[test]
    fn test_trailing_comma_repaired() {
        let (value, repaired) = parse_or_repair(r#"[{"text": "hola"},]"#).unwrap();
        assert!(repaired);
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_truncated_payload_closed() {
        let (value, repaired) = parse_or_repair(r#"[{"text": "hola", "clozes": ["hola"#).unwrap();
        assert!(repaired);
        assert!(value.is_array());
    }

    #[test]
    fn test_embedded_array_extracted() {
        let raw = "Claro, aquí tienes:\n[{\"text\": \"hola\"}]\n¡Espero que sirva!";
        let (value, repaired) = parse_or_repair(raw).unwrap();
        assert!(repaired);
        assert_eq!(value[0]["text"], "hola");
    }

    #[test]
    fn test_hopeless_payload_errors() {
        let err = parse_or_repair("no JSON here at all").unwrap_err();
        assert!(err.contains("not valid JSON"));
    }
}
