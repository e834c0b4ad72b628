//! Source fact extraction
//!
//! Turns caller-supplied sources into [`SourceUnit`]s: per-file bundles of
//! declared functions, imports, type references, call counts, and test and
//! documentation flags. Extraction is regex-driven and per-file
//! independent, so units are produced in parallel. A file the patterns
//! cannot make sense of yields empty facts instead of an error.

pub mod docs;
pub mod facts;
pub mod test_files;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Instant;
use tracing::{debug, warn};

pub use docs::DocQuality;

/// Languages with dedicated extraction patterns. Anything else falls back
/// to a conservative generic table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    #[default]
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "rs" => Language::Rust,
            "py" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "go" => Language::Go,
            "java" => Language::Java,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: &str) -> Self {
        match file_extension(path) {
            Some(ext) => Language::from_extension(ext),
            None => Language::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Java => "java",
            Language::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn file_extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        // A leading dot is a hidden file, not an extension.
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Module identifier for a path: separators normalized, extension dropped.
pub fn module_id_for_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let name = file_name(&normalized);
    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let trim = name.len() - idx;
            normalized[..normalized.len() - trim].to_string()
        }
        _ => normalized,
    }
}

/// One input source: a path (used for identity and conventions) and its
/// full text. No filesystem access happens anywhere in the pipeline.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub language: Language,
    pub text: String,
}

impl SourceFile {
    /// Build a source file, deriving the language from the path.
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let path = path.into().replace('\\', "/");
        let language = Language::from_path(&path);
        Self {
            path,
            language,
            text: text.into(),
        }
    }

    /// Override the derived language, for callers that know better.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// A declared function: name, arity, location, visibility, and
/// documentation grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFact {
    pub name: String,
    pub param_count: u32,
    /// One-based line of the declaration.
    pub line: u32,
    pub is_public: bool,
    pub doc: DocQuality,
}

/// Everything extraction learned about one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileFacts {
    pub functions: Vec<FunctionFact>,
    pub imports: BTreeSet<String>,
    pub type_refs: BTreeSet<String>,
    /// Callee name to occurrence count.
    pub calls: BTreeMap<String, u32>,
    pub is_test: bool,
    pub has_docs: bool,
    pub has_inline_tests: bool,
}

impl FileFacts {
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.name.as_str())
    }

    pub fn declares_function(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f.name == name)
    }

    pub fn total_calls(&self) -> u64 {
        self.calls.values().map(|&count| u64::from(count)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.imports.is_empty()
            && self.type_refs.is_empty()
            && self.calls.is_empty()
    }
}

/// One analyzed file: identity plus extracted facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    pub path: String,
    pub module_id: String,
    pub language: Language,
    pub facts: FileFacts,
}

impl SourceUnit {
    pub fn is_production(&self) -> bool {
        !self.facts.is_test
    }
}

/// Extract facts from one file. Never fails: unparseable text produces a
/// unit with empty facts.
pub fn extract_unit(file: &SourceFile) -> SourceUnit {
    let functions = facts::extract_functions(&file.text, file.language);
    let imports = facts::extract_imports(&file.text, file.language);
    let type_refs = facts::extract_type_references(&file.text, file.language);
    let calls = facts::extract_function_calls(&file.text, file.language);
    let is_test = test_files::is_test_file(&file.path, &file.text, file.language);
    let has_inline_tests = test_files::has_inline_test_markers(&file.text, file.language);

    let lines: Vec<&str> = file.text.lines().collect();
    let has_docs = docs::has_module_doc(&lines, file.language)
        || functions.iter().any(|f| f.doc != DocQuality::None);

    SourceUnit {
        path: file.path.clone(),
        module_id: module_id_for_path(&file.path),
        language: file.language,
        facts: FileFacts {
            functions,
            imports,
            type_refs,
            calls,
            is_test,
            has_docs,
            has_inline_tests,
        },
    }
}

/// Extract facts from all files in parallel, preserving input order.
pub fn extract_units(files: &[SourceFile], workers: usize) -> Vec<SourceUnit> {
    let started = Instant::now();

    let units: Vec<SourceUnit> = match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
    {
        Ok(pool) => pool.install(|| files.par_iter().map(extract_unit).collect()),
        Err(err) => {
            warn!("Thread pool construction failed, extracting serially: {err}");
            files.iter().map(extract_unit).collect()
        }
    };

    debug!(
        "Extracted {} units from {} files in {:?}",
        units.len(),
        files.len(),
        started.elapsed()
    );
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path("src/main.rs"), Language::Rust);
        assert_eq!(Language::from_path("app/views.py"), Language::Python);
        assert_eq!(Language::from_path("web/index.jsx"), Language::JavaScript);
        assert_eq!(Language::from_path("web/form.test.tsx"), Language::TypeScript);
        assert_eq!(Language::from_path("pkg/server.go"), Language::Go);
        assert_eq!(Language::from_path("App.java"), Language::Java);
        assert_eq!(Language::from_path("README.md"), Language::Unknown);
        assert_eq!(Language::from_path("Makefile"), Language::Unknown);
        assert_eq!(Language::from_path(".gitignore"), Language::Unknown);
    }

    #[test]
    fn test_module_id_for_path() {
        assert_eq!(module_id_for_path("src/app/user.py"), "src/app/user");
        assert_eq!(module_id_for_path("src\\app\\user.py"), "src/app/user");
        assert_eq!(module_id_for_path("web/form.test.tsx"), "web/form.test");
        assert_eq!(module_id_for_path("Makefile"), "Makefile");
        assert_eq!(module_id_for_path(".gitignore"), ".gitignore");
    }

    #[test]
    fn test_extract_unit_python() {
        let file = SourceFile::new(
            "app/service.py",
            r#""""Order service."""
from app.models import Order

def place_order(user_id, items):
    """Create an order.

    Args:
        user_id: buyer
        items: line items

    Returns:
        The stored order.
    """
    order = Order(user_id, items)
    validate(order)
    return save(order)
"#,
        );
        let unit = extract_unit(&file);
        assert_eq!(unit.module_id, "app/service");
        assert_eq!(unit.language, Language::Python);
        assert!(unit.is_production());
        assert!(unit.facts.has_docs);
        assert!(unit.facts.imports.contains("app/models"));
        assert_eq!(unit.facts.functions.len(), 1);
        assert_eq!(unit.facts.functions[0].name, "place_order");
        assert_eq!(unit.facts.functions[0].param_count, 2);
        assert_eq!(unit.facts.functions[0].doc, DocQuality::Thorough);
        assert_eq!(unit.facts.calls.get("validate"), Some(&1));
        assert!(unit.facts.type_refs.contains("Order") || unit.facts.calls.contains_key("Order"));
    }

    #[test]
    fn test_extract_unit_empty_text() {
        let unit = extract_unit(&SourceFile::new("src/empty.rs", ""));
        assert!(unit.facts.is_empty());
        assert!(!unit.facts.has_docs);
        assert!(unit.is_production());
    }

    #[test]
    fn test_extract_units_preserves_input_order() {
        let files = vec![
            SourceFile::new("b.py", "def b(): pass\n"),
            SourceFile::new("a.py", "def a(): pass\n"),
            SourceFile::new("c.py", "def c(): pass\n"),
        ];
        let units = extract_units(&files, 4);
        let ids: Vec<&str> = units.iter().map(|u| u.module_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_test_file_is_flagged() {
        let unit = extract_unit(&SourceFile::new(
            "tests/test_service.py",
            "def test_place_order():\n    pass\n",
        ));
        assert!(unit.facts.is_test);
        assert!(!unit.is_production());
    }

    #[test]
    fn test_language_override() {
        let file = SourceFile::new("script", "def run(): pass\n").with_language(Language::Python);
        let unit = extract_unit(&file);
        assert_eq!(unit.language, Language::Python);
        assert_eq!(unit.facts.functions.len(), 1);
    }
}
