//! Extract a JSON value from raw LLM text: direct parse, then a fenced
//! ```json block, then a greedy brace-matched substring.

use serde_json::Value;

pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return Some(v);
    }

    if let Some(fenced) = extract_fenced_block(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(&fenced) {
            return Some(v);
        }
    }

    if let Some(braced) = extract_brace_matched(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(&braced) {
            return Some(v);
        }
    }

    None
}

/// Pull the contents of the first ` ```json ... ``` ` (or bare ` ``` `) block.
fn extract_fenced_block(text: &str) -> Option<String> {
    let start_marker_json = "```json";
    let start_marker_bare = "```";

    let (start, marker_len) = if let Some(pos) = text.find(start_marker_json) {
        (pos, start_marker_json.len())
    } else {
        let pos = text.find(start_marker_bare)?;
        (pos, start_marker_bare.len())
    };

    let body_start = start + marker_len;
    let end_offset = text[body_start..].find("```")?;
    Some(text[body_start..body_start + end_offset].trim().to_string())
}

/// Find the first `{` and its matching closing `}` (tracking nesting and
/// string literals so braces inside quoted strings don't confuse the
/// count), returning the substring between them inclusive.
fn extract_brace_matched(text: &str) -> Option<String> {
    let bytes: Vec<char> = text.chars().collect();
    let start = bytes.iter().position(|c| *c == '{')?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(bytes[start..=i].iter().collect());
                }
            }
            _ => {}
        }
    }

    None
}
