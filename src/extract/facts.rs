//! Regex-based fact extraction
//!
//! One pattern table per supported language. Extraction is heuristic by
//! contract: patterns match the common declaration forms, and anything they
//! miss is silently skipped rather than failing the file. Grouped Rust
//! imports are expanded one level; deeper nesting resolves to the group
//! root only.

use crate::extract::docs::{assess_doc_quality, doc_lines_for_function};
use crate::extract::{FunctionFact, Language};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

static PY_FUNCTION: OnceLock<Regex> = OnceLock::new();
static RS_FUNCTION: OnceLock<Regex> = OnceLock::new();
static JS_FUNCTION: OnceLock<Regex> = OnceLock::new();
static JS_ARROW: OnceLock<Regex> = OnceLock::new();
static GO_FUNCTION: OnceLock<Regex> = OnceLock::new();
static JAVA_METHOD: OnceLock<Regex> = OnceLock::new();
static GENERIC_FUNCTION: OnceLock<Regex> = OnceLock::new();

fn py_function() -> &'static Regex {
    PY_FUNCTION.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)").unwrap()
    })
}

fn rs_function() -> &'static Regex {
    RS_FUNCTION.get_or_init(|| {
        Regex::new(
            r#"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:<[^>]*>)?\s*\(([^)]*)\)"#,
        )
        .unwrap()
    })
}

fn js_function() -> &'static Regex {
    JS_FUNCTION.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\(([^)]*)\)",
        )
        .unwrap()
    })
}

fn js_arrow() -> &'static Regex {
    JS_ARROW.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)(?:\s*:[^=\n]+)?\s*=\s*(?:async\s+)?\(([^)]*)\)\s*(?::[^=\n]+)?=>",
        )
        .unwrap()
    })
}

fn go_function() -> &'static Regex {
    GO_FUNCTION.get_or_init(|| {
        Regex::new(r"(?m)^func\s+(?:\([^)]*\)\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)").unwrap()
    })
}

fn java_method() -> &'static Regex {
    JAVA_METHOD.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:(?:public|protected|private|static|final|abstract|synchronized|native)\s+)+[\w<>\[\],\s?]+?\s+([A-Za-z_$][\w$]*)\s*\(([^)]*)\)\s*(?:throws\s+[\w,.\s]+)?\{",
        )
        .unwrap()
    })
}

fn generic_function() -> &'static Regex {
    GENERIC_FUNCTION.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:function|def|fn|func|sub|proc)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)",
        )
        .unwrap()
    })
}

static PY_IMPORT: OnceLock<Regex> = OnceLock::new();
static PY_FROM_IMPORT: OnceLock<Regex> = OnceLock::new();
static RS_USE: OnceLock<Regex> = OnceLock::new();
static RS_USE_GROUP: OnceLock<Regex> = OnceLock::new();
static RS_MOD: OnceLock<Regex> = OnceLock::new();
static JS_IMPORT_FROM: OnceLock<Regex> = OnceLock::new();
static JS_IMPORT_BARE: OnceLock<Regex> = OnceLock::new();
static JS_REQUIRE: OnceLock<Regex> = OnceLock::new();
static GO_IMPORT_SINGLE: OnceLock<Regex> = OnceLock::new();
static GO_IMPORT_LINE: OnceLock<Regex> = OnceLock::new();
static JAVA_IMPORT: OnceLock<Regex> = OnceLock::new();

fn py_import() -> &'static Regex {
    PY_IMPORT.get_or_init(|| Regex::new(r"(?m)^\s*import\s+([\w.]+(?:\s*,\s*[\w.]+)*)").unwrap())
}

fn py_from_import() -> &'static Regex {
    PY_FROM_IMPORT.get_or_init(|| Regex::new(r"(?m)^\s*from\s+([\w.]+|\.+)\s+import\b").unwrap())
}

fn rs_use() -> &'static Regex {
    RS_USE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([\w:]+)(?:\s+as\s+\w+)?\s*;").unwrap()
    })
}

fn rs_use_group() -> &'static Regex {
    RS_USE_GROUP.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([\w:]+?)::\{([^}]*)\}").unwrap()
    })
}

fn rs_mod() -> &'static Regex {
    RS_MOD.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+([A-Za-z_][A-Za-z0-9_]*)\s*;").unwrap()
    })
}

fn js_import_from() -> &'static Regex {
    JS_IMPORT_FROM.get_or_init(|| {
        Regex::new(r#"(?m)^\s*(?:import|export)\s+[^'"\n]*?from\s+['"]([^'"]+)['"]"#).unwrap()
    })
}

fn js_import_bare() -> &'static Regex {
    JS_IMPORT_BARE.get_or_init(|| Regex::new(r#"(?m)^\s*import\s+['"]([^'"]+)['"]"#).unwrap())
}

fn js_require() -> &'static Regex {
    JS_REQUIRE.get_or_init(|| Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap())
}

fn go_import_single() -> &'static Regex {
    GO_IMPORT_SINGLE
        .get_or_init(|| Regex::new(r#"(?m)^\s*import\s+(?:\w+\s+)?"([^"]+)""#).unwrap())
}

fn go_import_line() -> &'static Regex {
    GO_IMPORT_LINE.get_or_init(|| Regex::new(r#"^\s*(?:\w+\s+)?"([^"]+)"\s*$"#).unwrap())
}

fn java_import() -> &'static Regex {
    JAVA_IMPORT
        .get_or_init(|| Regex::new(r"(?m)^\s*import\s+(?:static\s+)?([\w.]+)\s*;").unwrap())
}

static PY_TYPE_REF: OnceLock<Regex> = OnceLock::new();
static RS_TYPE_REF: OnceLock<Regex> = OnceLock::new();
static JS_TYPE_REF: OnceLock<Regex> = OnceLock::new();
static TS_TYPE_REF: OnceLock<Regex> = OnceLock::new();
static GO_TYPE_REF: OnceLock<Regex> = OnceLock::new();
static JAVA_TYPE_REF: OnceLock<Regex> = OnceLock::new();

fn py_type_ref() -> &'static Regex {
    PY_TYPE_REF.get_or_init(|| {
        Regex::new(r"(?:->|:)\s*([A-Z][A-Za-z0-9_]*)|isinstance\([^,]+,\s*([A-Z][A-Za-z0-9_]*)")
            .unwrap()
    })
}

fn rs_type_ref() -> &'static Regex {
    RS_TYPE_REF.get_or_init(|| {
        Regex::new(r"(?::|->|\bimpl|\bdyn|\bas)\s+&?(?:mut\s+)?([A-Z][A-Za-z0-9_]*)").unwrap()
    })
}

fn js_type_ref() -> &'static Regex {
    JS_TYPE_REF.get_or_init(|| {
        Regex::new(r"\b(?:new|extends|instanceof)\s+([A-Z][A-Za-z0-9_$]*)").unwrap()
    })
}

fn ts_type_ref() -> &'static Regex {
    TS_TYPE_REF.get_or_init(|| {
        Regex::new(r"\b(?:new|extends|implements|instanceof)\s+([A-Z][A-Za-z0-9_$]*)|:\s*([A-Z][A-Za-z0-9_$]*)")
            .unwrap()
    })
}

fn go_type_ref() -> &'static Regex {
    GO_TYPE_REF.get_or_init(|| {
        Regex::new(r"\b([A-Z][A-Za-z0-9_]*)\{|\)\s*\*?([A-Z][A-Za-z0-9_]*)\s*\{").unwrap()
    })
}

fn java_type_ref() -> &'static Regex {
    JAVA_TYPE_REF.get_or_init(|| {
        Regex::new(r"\b(?:new|extends|implements|throws)\s+([A-Z][\w$]*)|\b([A-Z][\w$]*)\s+\w+\s*[=;,)]")
            .unwrap()
    })
}

static CALL_SITE: OnceLock<Regex> = OnceLock::new();

fn call_site() -> &'static Regex {
    CALL_SITE.get_or_init(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap())
}

/// Control-flow and declaration keywords that look like calls when followed
/// by a parenthesis. Shared across languages; per-language extras below.
const CALL_KEYWORDS_COMMON: &[&str] = &[
    "if", "for", "while", "switch", "return", "catch", "match", "loop", "assert", "sizeof",
    "typeof", "yield", "with", "except", "lambda", "throw", "raise", "not", "and", "or", "in",
    "elif", "until", "unless", "when", "case", "defer", "select", "await",
];

/// Tokens that, when they immediately precede an identifier, mark a
/// declaration rather than a call.
const DECLARATION_PREFIXES: &[&str] = &["def", "fn", "func", "function", "class", "trait", "interface"];

/// Builtins that call extraction drops as graph noise. They can never
/// resolve to a module in the analyzed set.
const BUILTINS_PYTHON: &[&str] = &[
    "len", "range", "str", "int", "float", "bool", "list", "dict", "set", "tuple", "isinstance",
    "super", "type", "getattr", "setattr", "hasattr", "enumerate", "zip",
];
const BUILTINS_RUST: &[&str] = &["Some", "Ok", "Err", "Box", "Rc", "Arc", "Cell", "RefCell"];
const BUILTINS_JS: &[&str] = &["require"];
const BUILTINS_GO: &[&str] = &[
    "make", "len", "cap", "new", "append", "copy", "delete", "panic", "recover", "print",
    "println",
];

fn language_builtins(language: Language) -> &'static [&'static str] {
    match language {
        Language::Python => BUILTINS_PYTHON,
        Language::Rust => BUILTINS_RUST,
        Language::JavaScript | Language::TypeScript => BUILTINS_JS,
        Language::Go => BUILTINS_GO,
        Language::Java | Language::Unknown => &[],
    }
}

fn is_call_keyword(name: &str) -> bool {
    CALL_KEYWORDS_COMMON.contains(&name)
}

/// Count parameters in a raw parameter list, honoring bracket nesting so
/// generic arguments and tuple types do not inflate the count. Receiver
/// parameters (`self`, `this`) are not counted.
pub(crate) fn count_params(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let mut depth = 0i32;
    let mut count = 1u32;
    for c in trimmed.chars() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            ',' if depth == 0 => count += 1,
            _ => {}
        }
    }

    let first = trimmed.split(',').next().unwrap_or("").trim();
    if matches!(first, "self" | "&self" | "&mut self" | "this" | "cls") {
        count = count.saturating_sub(1);
    }
    count
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn line_of_offset(starts: &[usize], offset: usize) -> u32 {
    starts.partition_point(|&s| s <= offset) as u32
}

fn function_patterns(language: Language) -> Vec<&'static Regex> {
    match language {
        Language::Python => vec![py_function()],
        Language::Rust => vec![rs_function()],
        Language::JavaScript | Language::TypeScript => vec![js_function(), js_arrow()],
        Language::Go => vec![go_function()],
        Language::Java => vec![java_method()],
        Language::Unknown => vec![generic_function()],
    }
}

/// Visibility by language convention: `pub` in Rust, capitalization in Go,
/// `public` in Java, a leading underscore elsewhere.
fn is_public_declaration(declaration: &str, name: &str, language: Language) -> bool {
    match language {
        Language::Rust => declaration.trim_start().starts_with("pub"),
        Language::Go => name.chars().next().is_some_and(|c| c.is_ascii_uppercase()),
        Language::Java => declaration.contains("public"),
        _ => !name.starts_with('_'),
    }
}

/// Extract function declarations with parameter counts, line numbers, and
/// per-function documentation quality.
pub fn extract_functions(text: &str, language: Language) -> Vec<FunctionFact> {
    let starts = line_starts(text);
    let lines: Vec<&str> = text.lines().collect();
    let mut facts: Vec<(usize, FunctionFact)> = Vec::new();

    for pattern in function_patterns(language) {
        for caps in pattern.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let params = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let line = line_of_offset(&starts, name.start());
            let param_count = count_params(params);
            let doc_lines =
                doc_lines_for_function(&lines, line.saturating_sub(1) as usize, language);
            facts.push((
                whole.start(),
                FunctionFact {
                    name: name.as_str().to_string(),
                    param_count,
                    line,
                    is_public: is_public_declaration(whole.as_str(), name.as_str(), language),
                    doc: assess_doc_quality(&doc_lines, param_count),
                },
            ));
        }
    }

    // Source order regardless of which pattern matched.
    facts.sort_by_key(|(offset, _)| *offset);
    facts.into_iter().map(|(_, fact)| fact).collect()
}

/// Extract declared function names in source order, duplicates preserved.
pub fn extract_function_names(text: &str, language: Language) -> Vec<String> {
    extract_functions(text, language)
        .into_iter()
        .map(|f| f.name)
        .collect()
}

/// Extract the distinct set of modules this file references, normalized to
/// slash-separated paths. Relative references keep their `./`/`../` prefix.
pub fn extract_imports(text: &str, language: Language) -> BTreeSet<String> {
    let mut imports = BTreeSet::new();

    match language {
        Language::Python => {
            for caps in py_import().captures_iter(text) {
                if let Some(list) = caps.get(1) {
                    for item in list.as_str().split(',') {
                        insert_import(&mut imports, normalize_dotted_import(item.trim()));
                    }
                }
            }
            for caps in py_from_import().captures_iter(text) {
                if let Some(module) = caps.get(1) {
                    insert_import(&mut imports, normalize_dotted_import(module.as_str()));
                }
            }
        }
        Language::Rust => {
            for caps in rs_use().captures_iter(text) {
                if let Some(path) = caps.get(1) {
                    insert_import(&mut imports, normalize_rust_path(path.as_str()));
                }
            }
            for caps in rs_use_group().captures_iter(text) {
                let (Some(base), Some(group)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                for member in group.as_str().split(',') {
                    let member = member
                        .trim()
                        .split_whitespace()
                        .next()
                        .unwrap_or("")
                        .trim_end_matches("::*");
                    if member.is_empty() || member == "self" {
                        insert_import(&mut imports, normalize_rust_path(base.as_str()));
                    } else if !member.contains('{') {
                        let path = format!("{}::{}", base.as_str(), member);
                        insert_import(&mut imports, normalize_rust_path(&path));
                    }
                }
            }
            for caps in rs_mod().captures_iter(text) {
                if let Some(name) = caps.get(1) {
                    insert_import(&mut imports, format!("./{}", name.as_str()));
                }
            }
        }
        Language::JavaScript | Language::TypeScript => {
            for pattern in [js_import_from(), js_import_bare(), js_require()] {
                for caps in pattern.captures_iter(text) {
                    if let Some(path) = caps.get(1) {
                        insert_import(&mut imports, normalize_js_import(path.as_str()));
                    }
                }
            }
        }
        Language::Go => {
            for caps in go_import_single().captures_iter(text) {
                if let Some(path) = caps.get(1) {
                    insert_import(&mut imports, path.as_str().to_string());
                }
            }
            imports.extend(go_block_imports(text));
        }
        Language::Java => {
            for caps in java_import().captures_iter(text) {
                if let Some(path) = caps.get(1) {
                    insert_import(&mut imports, path.as_str().replace('.', "/"));
                }
            }
        }
        Language::Unknown => {
            for caps in py_from_import().captures_iter(text) {
                if let Some(module) = caps.get(1) {
                    insert_import(&mut imports, normalize_dotted_import(module.as_str()));
                }
            }
            for caps in js_import_from().captures_iter(text) {
                if let Some(path) = caps.get(1) {
                    insert_import(&mut imports, normalize_js_import(path.as_str()));
                }
            }
        }
    }

    imports
}

fn insert_import(imports: &mut BTreeSet<String>, import: String) {
    // Pure dot/slash references carry no target.
    let has_target = import.chars().any(|c| c != '.' && c != '/');
    if has_target {
        imports.insert(import);
    }
}

/// `pkg.sub.mod` -> `pkg/sub/mod`; leading dots become relative prefixes
/// (`.util` -> `./util`, `..pkg.mod` -> `../pkg/mod`).
fn normalize_dotted_import(import: &str) -> String {
    let leading_dots = import.chars().take_while(|&c| c == '.').count();
    let rest = &import[leading_dots..];
    let path = rest.replace('.', "/");
    match leading_dots {
        0 => path,
        1 => format!("./{path}"),
        n => {
            let ups = "../".repeat(n - 1);
            format!("{ups}{path}")
        }
    }
}

/// `crate::a::b` -> `a/b` (matched by suffix against module IDs),
/// `super::x` -> `../x`, `self::x` -> `./x`.
fn normalize_rust_path(path: &str) -> String {
    let mut segments: Vec<&str> = path.split("::").filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return String::new();
    }

    let mut prefix = String::new();
    match segments[0] {
        "crate" => {
            segments.remove(0);
        }
        "self" => {
            segments.remove(0);
            prefix.push_str("./");
        }
        "super" => {
            while segments.first() == Some(&"super") {
                segments.remove(0);
                prefix.push_str("../");
            }
        }
        _ => {}
    }

    if segments.is_empty() {
        return String::new();
    }
    format!("{prefix}{}", segments.join("/"))
}

fn normalize_js_import(import: &str) -> String {
    for suffix in [".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs"] {
        if let Some(stripped) = import.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    import.to_string()
}

/// Collect quoted paths inside `import ( ... )` blocks.
fn go_block_imports(text: &str) -> BTreeSet<String> {
    let mut imports = BTreeSet::new();
    let mut in_block = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if !in_block {
            if trimmed.starts_with("import") && trimmed.contains('(') {
                in_block = true;
            }
            continue;
        }
        if trimmed.starts_with(')') {
            in_block = false;
            continue;
        }
        if let Some(caps) = go_import_line().captures(line) {
            if let Some(path) = caps.get(1) {
                imports.insert(path.as_str().to_string());
            }
        }
    }
    imports
}

/// Extract the distinct set of type names this file references.
pub fn extract_type_references(text: &str, language: Language) -> BTreeSet<String> {
    let patterns: Vec<&'static Regex> = match language {
        Language::Python => vec![py_type_ref()],
        Language::Rust => vec![rs_type_ref()],
        Language::JavaScript => vec![js_type_ref()],
        Language::TypeScript => vec![ts_type_ref()],
        Language::Go => vec![go_type_ref()],
        Language::Java => vec![java_type_ref()],
        Language::Unknown => vec![js_type_ref()],
    };

    let mut refs = BTreeSet::new();
    for pattern in patterns {
        for caps in pattern.captures_iter(text) {
            for group in caps.iter().skip(1).flatten() {
                let name = group.as_str();
                if !name.is_empty() {
                    refs.insert(name.to_string());
                }
            }
        }
    }
    refs
}

/// Extract callee names with occurrence counts. Declaration sites and
/// control-flow keywords are excluded; method calls count under the bare
/// method name.
pub fn extract_function_calls(text: &str, language: Language) -> BTreeMap<String, u32> {
    let builtins = language_builtins(language);
    let mut calls: BTreeMap<String, u32> = BTreeMap::new();

    for caps in call_site().captures_iter(text) {
        let Some(name) = caps.get(1) else { continue };
        let callee = name.as_str();
        if is_call_keyword(callee) || builtins.contains(&callee) {
            continue;
        }

        let before = text[..name.start()].trim_end();
        if DECLARATION_PREFIXES
            .iter()
            .any(|kw| before.ends_with(kw) && ends_at_token_boundary(before, kw))
        {
            continue;
        }

        *calls.entry(callee.to_string()).or_insert(0) += 1;
    }

    calls
}

fn ends_at_token_boundary(text: &str, suffix: &str) -> bool {
    let head = &text[..text.len() - suffix.len()];
    head.chars()
        .next_back()
        .map(|c| !c.is_alphanumeric() && c != '_')
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_python_functions() {
        let source = r#"
def fetch_user(user_id):
    return db.get(user_id)

async def fetch_all(limit, offset):
    pass

class Thing:
    def method_one(self, value):
        pass
"#;
        let facts = extract_functions(source, Language::Python);
        let names: Vec<&str> = facts.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["fetch_user", "fetch_all", "method_one"]);
        assert_eq!(facts[0].param_count, 1);
        assert_eq!(facts[1].param_count, 2);
        // self is not counted
        assert_eq!(facts[2].param_count, 1);
        assert_eq!(facts[0].line, 2);
    }

    #[test]
    fn test_extract_rust_functions() {
        let source = r#"
pub fn build_graph(units: &[SourceUnit]) -> Graph {
    Graph::new()
}

pub(crate) async fn run_all(config: &Config, limit: usize) -> Result<()> {
    Ok(())
}

fn helper() {}
"#;
        let facts = extract_functions(source, Language::Rust);
        let names: Vec<&str> = facts.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["build_graph", "run_all", "helper"]);
        assert_eq!(facts[0].param_count, 1);
        assert_eq!(facts[1].param_count, 2);
        assert_eq!(facts[2].param_count, 0);
        assert!(facts[0].is_public);
        assert!(facts[1].is_public);
        assert!(!facts[2].is_public);
    }

    #[test]
    fn test_visibility_by_convention() {
        let py = "def shared(): pass\n\ndef _hidden(): pass\n";
        let facts = extract_functions(py, Language::Python);
        assert!(facts[0].is_public);
        assert!(!facts[1].is_public);

        let go = "func Exported() {}\n\nfunc internal() {}\n";
        let facts = extract_functions(go, Language::Go);
        assert!(facts[0].is_public);
        assert!(!facts[1].is_public);
    }

    #[test]
    fn test_extract_js_functions_and_arrows() {
        let source = r#"
export function renderPage(props) {
    return html(props);
}

const formatDate = (date, locale) => date.toString();

export default async function main() {}
"#;
        let names = extract_function_names(source, Language::JavaScript);
        assert_eq!(names, vec!["renderPage", "formatDate", "main"]);
    }

    #[test]
    fn test_extract_go_functions() {
        let source = r#"
func NewServer(addr string) *Server {
    return &Server{addr: addr}
}

func (s *Server) Listen(port int, tls bool) error {
    return nil
}
"#;
        let facts = extract_functions(source, Language::Go);
        let names: Vec<&str> = facts.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["NewServer", "Listen"]);
        assert_eq!(facts[1].param_count, 2);
    }

    #[test]
    fn test_duplicate_names_preserved() {
        let source = "def setup():\n    pass\n\ndef setup():\n    pass\n";
        let names = extract_function_names(source, Language::Python);
        assert_eq!(names, vec!["setup", "setup"]);
    }

    #[test]
    fn test_count_params_nested_generics() {
        assert_eq!(count_params(""), 0);
        assert_eq!(count_params("a"), 1);
        assert_eq!(count_params("a: Map<String, u32>, b: (i32, i32)"), 2);
        assert_eq!(count_params("&self, value: u32"), 1);
        assert_eq!(count_params("&mut self"), 0);
    }

    #[test]
    fn test_extract_python_imports() {
        let source = r#"
import os
import collections.abc
from app.models import User
from .util import helper
from ..shared.types import Kind
"#;
        let imports = extract_imports(source, Language::Python);
        assert!(imports.contains("os"));
        assert!(imports.contains("collections/abc"));
        assert!(imports.contains("app/models"));
        assert!(imports.contains("./util"));
        assert!(imports.contains("../shared/types"));
    }

    #[test]
    fn test_extract_rust_imports() {
        let source = r#"
use crate::graph::cycles;
use super::models;
use std::collections::{HashMap, HashSet};
pub mod scoring;
mod naming;
"#;
        let imports = extract_imports(source, Language::Rust);
        assert!(imports.contains("graph/cycles"));
        assert!(imports.contains("../models"));
        assert!(imports.contains("std/collections/HashMap"));
        assert!(imports.contains("./scoring"));
        assert!(imports.contains("./naming"));
    }

    #[test]
    fn test_extract_js_imports() {
        let source = r#"
import React from 'react';
import { router } from './router.js';
import '../styles/main.css';
export { helper } from "./util";
const fs = require('fs');
"#;
        let imports = extract_imports(source, Language::JavaScript);
        assert!(imports.contains("react"));
        assert!(imports.contains("./router"));
        assert!(imports.contains("./util"));
        assert!(imports.contains("fs"));
    }

    #[test]
    fn test_extract_go_imports() {
        let source = r#"
package server

import "fmt"

import (
    "net/http"
    log "github.com/sirupsen/logrus"
)
"#;
        let imports = extract_imports(source, Language::Go);
        assert!(imports.contains("fmt"));
        assert!(imports.contains("net/http"));
        assert!(imports.contains("github.com/sirupsen/logrus"));
    }

    #[test]
    fn test_extract_java_imports() {
        let source = "import java.util.List;\nimport static org.junit.Assert.assertEquals;\n";
        let imports = extract_imports(source, Language::Java);
        assert!(imports.contains("java/util/List"));
        assert!(imports.contains("org/junit/Assert/assertEquals"));
    }

    #[test]
    fn test_extract_type_references() {
        let rust = "fn load(config: &Config) -> Report { Report::default() }";
        let refs = extract_type_references(rust, Language::Rust);
        assert!(refs.contains("Config"));
        assert!(refs.contains("Report"));

        let ts = "const user: UserProfile = new UserProfile();";
        let refs = extract_type_references(ts, Language::TypeScript);
        assert!(refs.contains("UserProfile"));
    }

    #[test]
    fn test_extract_calls_counts_and_keywords() {
        let source = r#"
def process(items):
    validated = validate(items)
    for item in validated:
        if check(item):
            save(item)
    save(summary)
"#;
        let calls = extract_function_calls(source, Language::Python);
        assert_eq!(calls.get("validate"), Some(&1));
        assert_eq!(calls.get("check"), Some(&1));
        assert_eq!(calls.get("save"), Some(&2));
        // Declaration and keywords are not calls.
        assert!(!calls.contains_key("process"));
        assert!(!calls.contains_key("if"));
        assert!(!calls.contains_key("for"));
    }

    #[test]
    fn test_method_calls_count_under_bare_name() {
        let source = "const data = client.fetch(url);\n";
        let calls = extract_function_calls(source, Language::JavaScript);
        assert_eq!(calls.get("fetch"), Some(&1));
    }

    #[test]
    fn test_rust_macros_are_not_calls() {
        let source = "fn log_it() {\n    println!(\"x\");\n    compute();\n}\n";
        let calls = extract_function_calls(source, Language::Rust);
        assert!(!calls.contains_key("println"));
        assert_eq!(calls.get("compute"), Some(&1));
    }

    #[test]
    fn test_empty_input_yields_empty_facts() {
        assert!(extract_functions("", Language::Python).is_empty());
        assert!(extract_imports("", Language::Rust).is_empty());
        assert!(extract_type_references("", Language::Go).is_empty());
        assert!(extract_function_calls("", Language::Java).is_empty());
    }

    #[test]
    fn test_malformed_input_is_skipped_not_fatal() {
        let garbage = "def (((\nimport \nfn 123bad(\n%%%%";
        assert!(extract_functions(garbage, Language::Python).is_empty());
        let _ = extract_imports(garbage, Language::Python);
    }
}
