//! Post-processing: deterministic cleanup of the generated report.
//!
//! Even well-prompted models occasionally wrap the whole report in
//! ` ```markdown ` / ` ```html ` fences despite the prompt saying not to,
//! emit Windows-style `\r\n` line endings, or pad the output with runs of
//! blank lines. These are structural quirks, not content problems, so
//! they are fixed here with cheap string rules rather than in the prompt.
//! Each rule is a pure function (`&str → String`) and independently
//! testable.
//!
//! Rule order matters: fences are stripped before line-ending
//! normalisation so the fence regex sees the raw output, and the
//! final-newline pass runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw report text.
///
/// Rules (applied in order):
/// 1. Strip outer code fences (```, ```markdown, ```html)
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Ensure the text ends with exactly one newline
pub fn clean_report(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|html)?\n(.*)\n```\s*$").unwrap());

fn strip_outer_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse runs of blank lines ─────────────────────────────────────

static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_RUNS.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 5: Exactly one final newline ────────────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end_matches('\n');
    format!("{trimmed}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        let input = "```markdown\n# Report\n\nBody text.\n```";
        assert_eq!(clean_report(input), "# Report\n\nBody text.\n");
    }

    #[test]
    fn strips_html_fences() {
        let input = "```html\n<html><body><h1>Report</h1></body></html>\n```";
        assert_eq!(
            clean_report(input),
            "<html><body><h1>Report</h1></body></html>\n"
        );
    }

    #[test]
    fn strips_bare_fences() {
        let input = "```\n# Report\n```";
        assert_eq!(clean_report(input), "# Report\n");
    }

    #[test]
    fn leaves_inner_fences_alone() {
        let input = "# Report\n\n```\ncode sample\n```\n\nMore text.\n";
        let cleaned = clean_report(input);
        assert!(cleaned.contains("```\ncode sample\n```"));
    }

    #[test]
    fn normalises_crlf() {
        assert_eq!(clean_report("line one\r\nline two\r\n"), "line one\nline two\n");
    }

    #[test]
    fn trims_trailing_whitespace() {
        assert_eq!(clean_report("# Title   \n\nBody  "), "# Title\n\nBody\n");
    }

    #[test]
    fn collapses_blank_line_runs() {
        let cleaned = clean_report("a\n\n\n\n\n\nb");
        assert!(!cleaned.contains("\n\n\n\n"));
        assert!(cleaned.contains("a\n\n\nb"));
    }

    #[test]
    fn exactly_one_final_newline() {
        assert_eq!(clean_report("text\n\n\n"), "text\n");
        assert_eq!(clean_report("text"), "text\n");
    }
}
