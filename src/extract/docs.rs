//! Documentation detection and grading
//!
//! Python docstrings sit below the declaration; every other supported
//! language documents above it. Quality grading looks at stripped content
//! lines plus parameter/return sections, weighed against the declaration's
//! own parameter count.

use crate::extract::{facts, Language};
use serde::{Deserialize, Serialize};

/// Content lines required before a doc block counts as more than minimal.
pub const DOC_ADEQUATE_MIN_LINES: usize = 2;
/// Content lines required for a thorough grade, alongside section markers.
pub const DOC_THOROUGH_MIN_LINES: usize = 3;
/// Hard cap when scanning for the end of a docstring.
const DOC_SCAN_MAX_LINES: usize = 30;
/// How far below a declaration a docstring may start.
const DOCSTRING_LOOKAHEAD_LINES: usize = 3;

const PARAM_SECTION_MARKERS: &[&str] = &[
    "args:",
    "arguments:",
    "params:",
    "parameters:",
    "@param",
    ":param",
    "# arguments",
];

const RETURN_SECTION_MARKERS: &[&str] = &[
    "returns:",
    "return:",
    "@return",
    ":return",
    "# returns",
];

const DOC_VALUE_NONE: f64 = 0.0;
const DOC_VALUE_MINIMAL: f64 = 0.4;
const DOC_VALUE_ADEQUATE: f64 = 0.8;
const DOC_VALUE_THOROUGH: f64 = 1.0;

/// Graded documentation level for a single declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocQuality {
    #[default]
    None,
    Minimal,
    Adequate,
    Thorough,
}

impl DocQuality {
    /// Contribution to the documentation metric, in `0.0..=1.0`.
    pub fn value(self) -> f64 {
        match self {
            DocQuality::None => DOC_VALUE_NONE,
            DocQuality::Minimal => DOC_VALUE_MINIMAL,
            DocQuality::Adequate => DOC_VALUE_ADEQUATE,
            DocQuality::Thorough => DOC_VALUE_THOROUGH,
        }
    }
}

/// Collect the raw documentation lines attached to the declaration at
/// `decl_idx` (zero-based line index).
pub fn doc_lines_for_function(lines: &[&str], decl_idx: usize, language: Language) -> Vec<String> {
    match language {
        Language::Python => docstring_below(lines, decl_idx),
        _ => comments_above(lines, decl_idx),
    }
}

fn docstring_below(lines: &[&str], decl_idx: usize) -> Vec<String> {
    let mut idx = decl_idx + 1;
    let limit = (decl_idx + 1 + DOCSTRING_LOOKAHEAD_LINES).min(lines.len());

    while idx < limit {
        let trimmed = lines[idx].trim_start();
        if is_docstring_start(trimmed) {
            break;
        }
        if !trimmed.is_empty() {
            return Vec::new();
        }
        idx += 1;
    }
    if idx >= limit {
        return Vec::new();
    }

    let quote = if lines[idx].trim_start().contains("\"\"\"") {
        "\"\"\""
    } else {
        "'''"
    };
    let first = lines[idx].trim();
    let body = first.trim_start_matches('r');
    // Single-line docstring closes on the opening line.
    if body.len() > 2 * quote.len() && body.ends_with(quote) {
        return vec![first.to_string()];
    }

    let mut collected = vec![first.to_string()];
    for line in lines.iter().skip(idx + 1).take(DOC_SCAN_MAX_LINES) {
        collected.push(line.trim().to_string());
        if line.contains(quote) {
            break;
        }
    }
    collected
}

fn comments_above(lines: &[&str], decl_idx: usize) -> Vec<String> {
    let mut collected: Vec<String> = Vec::new();
    let mut idx = decl_idx;

    while idx > 0 && collected.len() < DOC_SCAN_MAX_LINES {
        idx -= 1;
        let trimmed = lines[idx].trim();
        // Attributes and annotations sit between the doc block and the
        // declaration.
        if trimmed.starts_with("#[") || trimmed.starts_with('@') {
            continue;
        }
        if is_comment_line(trimmed) {
            collected.push(trimmed.to_string());
        } else {
            break;
        }
    }

    collected.reverse();
    collected
}

fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("///")
        || trimmed.starts_with("//!")
        || trimmed.starts_with("//")
        || trimmed.starts_with("/**")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with('#')
}

fn is_docstring_start(trimmed: &str) -> bool {
    trimmed.starts_with("\"\"\"")
        || trimmed.starts_with("'''")
        || trimmed.starts_with("r\"\"\"")
        || trimmed.starts_with("r'''")
}

/// Strip comment and docstring markers, leaving the prose content.
fn strip_markers(line: &str) -> &str {
    line.trim()
        .trim_start_matches("///")
        .trim_start_matches("//!")
        .trim_start_matches("//")
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_start_matches("*/")
        .trim_start_matches('*')
        .trim_start_matches('#')
        .trim_start_matches("r\"\"\"")
        .trim_start_matches("\"\"\"")
        .trim_start_matches("r'''")
        .trim_start_matches("'''")
        .trim_end_matches("*/")
        .trim_end_matches("\"\"\"")
        .trim_end_matches("'''")
        .trim()
}

/// Grade a doc block against the declaration's parameter count.
pub fn assess_doc_quality(doc_lines: &[String], param_count: u32) -> DocQuality {
    let content: Vec<&str> = doc_lines
        .iter()
        .map(|line| strip_markers(line))
        .filter(|line| !line.is_empty())
        .collect();

    if content.is_empty() {
        return DocQuality::None;
    }

    let joined = content.join(" ").to_lowercase();
    let has_param_docs = PARAM_SECTION_MARKERS.iter().any(|m| joined.contains(m));
    let has_return_docs = RETURN_SECTION_MARKERS.iter().any(|m| joined.contains(m));

    if content.len() >= DOC_THOROUGH_MIN_LINES
        && has_return_docs
        && (param_count == 0 || has_param_docs)
    {
        return DocQuality::Thorough;
    }
    if content.len() >= DOC_ADEQUATE_MIN_LINES || has_param_docs || has_return_docs {
        return DocQuality::Adequate;
    }
    DocQuality::Minimal
}

/// True when the file opens with a module-level doc block.
pub fn has_module_doc(lines: &[&str], language: Language) -> bool {
    let hash_comments = matches!(language, Language::Python | Language::Unknown);
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if idx == 0 && trimmed.starts_with("#!") && hash_comments {
            continue;
        }
        // Inner attributes are not docs.
        if trimmed.starts_with("#[") || (trimmed.starts_with("#!") && !hash_comments) {
            continue;
        }
        if trimmed.starts_with('#') {
            return hash_comments;
        }
        if is_docstring_start(trimmed) {
            return hash_comments;
        }
        return is_comment_line(trimmed);
    }
    false
}

/// True when the file carries any recognizable documentation, either a
/// module-level block or at least one documented declaration.
pub fn has_documentation(text: &str, language: Language) -> bool {
    let lines: Vec<&str> = text.lines().collect();
    if has_module_doc(&lines, language) {
        return true;
    }
    facts::extract_functions(text, language)
        .iter()
        .any(|f| f.doc != DocQuality::None)
}
