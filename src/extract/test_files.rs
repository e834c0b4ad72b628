//! Test-file recognition and production-to-test correlation
//!
//! Correlation is a pure set lookup: candidate test paths are generated
//! from the production path by convention and checked against the set of
//! known files. No filesystem access happens here.

use crate::extract::Language;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static TEST_PATH_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn test_path_patterns() -> &'static [Regex] {
    TEST_PATH_PATTERNS.get_or_init(|| {
        [
            r"(?:^|/)test_[^/]*\.py$",
            r"_test\.py$",
            r"(?:^|/)tests?/.*\.py$",
            r"\.test\.[jt]sx?$",
            r"\.spec\.[jt]sx?$",
            r"(?:^|/)__tests__/.*\.[jt]sx?$",
            r"(?:^|/)tests?/.*\.rs$",
            r"_test\.go$",
            r"Test\.java$",
            r"(?:^|/)src/test/.*\.java$",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

const PYTHON_TEST_MARKERS: &[&str] = &["import pytest", "import unittest", "from unittest"];
const JS_TEST_MARKERS: &[&str] = &["jest.", "vitest"];
const GO_TEST_MARKERS: &[&str] = &["func Test", "\"testing\""];
const JAVA_TEST_MARKERS: &[&str] = &["@Test", "import org.junit"];
const RUST_INLINE_TEST_MARKERS: &[&str] = &["#[cfg(test)]", "#[test]"];

static JS_TEST_CALL: OnceLock<Regex> = OnceLock::new();

fn js_test_call() -> &'static Regex {
    JS_TEST_CALL.get_or_init(|| Regex::new(r"\b(?:describe|it)\s*\(").unwrap())
}

/// True when the path or content marks this file as a test file.
///
/// Rust is classified by path alone: a production file carrying a
/// `#[cfg(test)]` module stays a production file (see
/// [`has_inline_test_markers`]).
pub fn is_test_file(path: &str, text: &str, language: Language) -> bool {
    if test_path_patterns().iter().any(|p| p.is_match(path)) {
        return true;
    }

    match language {
        Language::Python => PYTHON_TEST_MARKERS.iter().any(|m| text.contains(m)),
        Language::JavaScript | Language::TypeScript => {
            JS_TEST_MARKERS.iter().any(|m| text.contains(m)) || js_test_call().is_match(text)
        }
        Language::Go => GO_TEST_MARKERS.iter().any(|m| text.contains(m)),
        Language::Java => JAVA_TEST_MARKERS.iter().any(|m| text.contains(m)),
        Language::Rust | Language::Unknown => false,
    }
}

/// True when a production file carries its own embedded tests.
pub fn has_inline_test_markers(text: &str, language: Language) -> bool {
    match language {
        Language::Rust => RUST_INLINE_TEST_MARKERS.iter().any(|m| text.contains(m)),
        Language::Python => PYTHON_TEST_MARKERS.iter().any(|m| text.contains(m)),
        Language::JavaScript | Language::TypeScript => {
            JS_TEST_MARKERS.iter().any(|m| text.contains(m)) || js_test_call().is_match(text)
        }
        Language::Go => GO_TEST_MARKERS.iter().any(|m| text.contains(m)),
        Language::Java => JAVA_TEST_MARKERS.iter().any(|m| text.contains(m)),
        Language::Unknown => false,
    }
}

/// Find the conventional test file for a production path, if one exists in
/// `known_files`. Candidates are checked in order and the first hit wins.
pub fn find_test_file_for(path: &str, known_files: &BTreeSet<String>) -> Option<String> {
    test_file_candidates(path)
        .into_iter()
        .find(|candidate| known_files.contains(candidate))
}

/// Conventional test-file locations for a production path.
pub fn test_file_candidates(path: &str) -> Vec<String> {
    let (dir, file) = match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    };
    let (stem, ext) = match file.rfind('.') {
        Some(idx) => (&file[..idx], &file[idx + 1..]),
        None => (file, ""),
    };

    let in_dir = |name: String| {
        if dir.is_empty() {
            name
        } else {
            format!("{dir}/{name}")
        }
    };

    let mut candidates = Vec::new();
    match ext {
        "py" => {
            candidates.push(in_dir(format!("test_{stem}.py")));
            candidates.push(in_dir(format!("tests/test_{stem}.py")));
            candidates.push(in_dir(format!("{stem}_test.py")));
            candidates.push(format!("tests/test_{stem}.py"));
            candidates.push(format!("test/test_{stem}.py"));
            candidates.push(format!("tests/{stem}_test.py"));
        }
        "js" | "jsx" | "ts" | "tsx" => {
            candidates.push(in_dir(format!("{stem}.test.{ext}")));
            candidates.push(in_dir(format!("{stem}.spec.{ext}")));
            candidates.push(in_dir(format!("__tests__/{stem}.{ext}")));
            candidates.push(format!("tests/{stem}.test.{ext}"));
        }
        "rs" => {
            candidates.push(format!("tests/{stem}.rs"));
            candidates.push(format!("tests/{stem}_test.rs"));
            candidates.push(in_dir(format!("{stem}_test.rs")));
        }
        "go" => {
            candidates.push(in_dir(format!("{stem}_test.go")));
        }
        "java" => {
            candidates.push(in_dir(format!("{stem}Test.java")));
            if path.contains("/main/") {
                let mirrored = path.replace("/main/", "/test/");
                if let Some(idx) = mirrored.rfind('/') {
                    candidates.push(format!("{}/{stem}Test.java", &mirrored[..idx]));
                }
            }
        }
        _ => {
            candidates.push(in_dir(format!("test_{file}")));
            candidates.push(format!("tests/{file}"));
        }
    }
    candidates
}
