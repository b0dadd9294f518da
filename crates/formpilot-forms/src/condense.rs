//! Token-budget condensation of large form definitions: extract known
//! section headings; fall back to head/tail slicing. Deterministic, so
//! prompt tests can pin the exact output.

const LINE_BUDGET: usize = 150;

/// The sections kept when condensing a large form, in priority order.
const KNOWN_SECTIONS: &[&str] = &[
    "Tool Calls",
    "Form Overview",
    "Field Summary",
    "Conditional Logic",
    "Chat Agent Instructions",
];

const HEAD_LINES: usize = 50;
const TAIL_LINES: usize = 100;

/// Condense `form_context_md` for inclusion in a prompt.
///
/// Under `LINE_BUDGET` lines, the document is returned unchanged. Over
/// budget, the known sections are extracted and concatenated (heading
/// included) in a fixed order; if none of them are present, the first
/// [`HEAD_LINES`] and last [`TAIL_LINES`] lines are returned instead,
/// separated by a marker so the seam is visible.
pub fn condense(form_context_md: &str) -> String {
    let line_count = form_context_md.lines().count();
    if line_count <= LINE_BUDGET {
        return form_context_md.to_string();
    }

    let mut sections = Vec::new();
    for name in KNOWN_SECTIONS {
        if let Some(body) = find_section(form_context_md, name) {
            sections.push(body);
        }
    }

    if !sections.is_empty() {
        return sections.join("\n\n");
    }

    head_tail_slice(form_context_md)
}

fn head_tail_slice(md: &str) -> String {
    let lines: Vec<&str> = md.lines().collect();
    let head: Vec<&str> = lines.iter().take(HEAD_LINES).copied().collect();
    let tail_start = lines.len().saturating_sub(TAIL_LINES);
    let tail: Vec<&str> = lines[tail_start..].to_vec();
    format!(
        "{}\n\n... [condensed: {} lines omitted] ...\n\n{}",
        head.join("\n"),
        lines.len().saturating_sub(HEAD_LINES + tail.len()),
        tail.join("\n")
    )
}

/// Find a markdown heading matching `name` (case-insensitive, any `#` level)
/// and return the heading line plus everything up to (not including) the
/// next heading of the same or shallower level.
pub fn find_section(md: &str, name: &str) -> Option<String> {
    let lines: Vec<&str> = md.lines().collect();
    let wanted = name.trim().to_ascii_lowercase();

    let mut start = None;
    let mut start_level = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if let Some((level, text)) = heading(line) {
            if text.trim().to_ascii_lowercase() == wanted {
                start = Some(i);
                start_level = level;
                break;
            }
        }
    }

    let start = start?;
    let mut end = lines.len();
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        if let Some((level, _)) = heading(line) {
            if level <= start_level {
                end = start + 1 + offset;
                break;
            }
        }
    }

    Some(lines[start..end].join("\n"))
}

/// Parse a line as a markdown ATX heading, returning `(level, text)`.
fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.starts_with(' ') && !rest.is_empty() {
        return None;
    }
    Some((level, rest.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_document_passes_through() {
        let md = "# Title\n\nshort body";
        assert_eq!(condense(md), md);
    }

    #[test]
    fn finds_section_bounded_by_next_heading() {
        let md = "# Title\n\n## Form Overview\nbody line\n\n## Field Summary\nother";
        let section = find_section(md, "Form Overview").unwrap();
        assert!(section.contains("body line"));
        assert!(!section.contains("Field Summary"));
    }

    #[test]
    fn condenses_long_document_to_known_sections() {
        let mut md = String::from("# Title\n\n## Form Overview\nOverview text\n\n## Field Summary\n| Field ID |\n|---|\n");
        for i in 0..200 {
            md.push_str(&format!("filler line {i}\n"));
        }
        let out = condense(&md);
        assert!(out.contains("Form Overview"));
        assert!(out.contains("Field Summary"));
        assert!(out.lines().count() < md.lines().count());
    }

    #[test]
    fn falls_back_to_head_tail_when_no_known_sections() {
        let mut md = String::new();
        for i in 0..300 {
            md.push_str(&format!("plain line {i}\n"));
        }
        let out = condense(&md);
        assert!(out.contains("plain line 0"));
        assert!(out.contains("plain line 299"));
        assert!(out.contains("condensed"));
    }
}
