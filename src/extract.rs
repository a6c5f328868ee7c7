//! Script Fragment Extractor
//!
//! Pattern recognizers over raw script text. There is deliberately no
//! JavaScript parser here: each recognizer is a regex (plus a brace scan for
//! the method table) that handles the shapes learners actually type.
//!
//! Precedence is fixed:
//! 1. `setup() { ... }`                  reactive-setup body
//! 2. `data() { return { ... } }`        classic initializer, only if (1) missed
//! 3. `methods: { ... }`                 method table, independent of (1)/(2)
//!
//! Known limitations, kept on purpose:
//! - (1) and (2) stop at the first `}`; nested blocks are truncated.
//! - Braces inside strings are not special for (1) and (2).
//! - Only the first occurrence of each shape is used.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ExtractError;

lazy_static! {
    static ref SETUP_RE: Regex = Regex::new(r"(?s)\bsetup\s*\(\s*\)\s*\{(.*?)\}").unwrap();
    static ref DATA_RE: Regex =
        Regex::new(r"(?s)\bdata\s*\(\s*\)\s*\{.*?return\s*\{(.*?)\}\s*\}").unwrap();
    static ref METHOD_TABLE_RE: Regex = Regex::new(r"\bmethods\s*:\s*\{").unwrap();

    /// `name(params) {` or `name: function (params) {`
    static ref METHOD_ENTRY_RE: Regex =
        Regex::new(r"(?:\b(\w+)\s*:\s*function\s*|\b(\w+)\s*)\(([^(){}]*)\)\s*\{").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// FRAGMENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// The single initializer shape recognized in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitializerFragment {
    /// Body of `setup() { ... }`.
    Setup(String),
    /// Interior of the object returned by `data() { return { ... } }`.
    Data(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodFragment {
    pub name: String,
    pub params: Vec<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptFragments {
    pub initializer: Option<InitializerFragment>,
    /// `None` when no method table exists; `Some(vec![])` for an empty or
    /// entirely unrecognized one.
    pub methods: Option<Vec<MethodFragment>>,
}

impl ScriptFragments {
    pub fn is_empty(&self) -> bool {
        self.initializer.is_none() && self.methods.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXTRACTION
// ═══════════════════════════════════════════════════════════════════════════════

pub fn extract_fragments(script: &str) -> Result<ScriptFragments, ExtractError> {
    if script.trim().is_empty() {
        return Ok(ScriptFragments::default());
    }

    let initializer = match recognize_setup(script) {
        Some(body) => Some(InitializerFragment::Setup(body)),
        None => recognize_data(script).map(InitializerFragment::Data),
    };

    let methods = recognize_method_table(script)?.map(|table| recognize_method_entries(&table));

    let fragments = ScriptFragments {
        initializer,
        methods,
    };
    if fragments.is_empty() {
        return Err(ExtractError::NoRecognizedShape);
    }

    Ok(fragments)
}

/// Body of the first `setup() { ... }`, up to the first closing brace.
pub fn recognize_setup(script: &str) -> Option<String> {
    SETUP_RE
        .captures(script)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Interior of the object literal returned from the first `data() { ... }`.
pub fn recognize_data(script: &str) -> Option<String> {
    DATA_RE
        .captures(script)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Interior of the `methods: { ... }` object literal.
pub fn recognize_method_table(script: &str) -> Result<Option<String>, ExtractError> {
    let Some(head) = METHOD_TABLE_RE.find(script) else {
        return Ok(None);
    };

    let open = head.end() - 1;
    match find_balanced_brace_end(script, open) {
        Some(end) => Ok(Some(script[open + 1..end - 1].to_string())),
        None => Err(ExtractError::UnbalancedMethodTable {
            offset: head.start(),
        }),
    }
}

/// Individual entries of a method table interior, in source order.
/// Anything that does not look like an entry is skipped.
pub fn recognize_method_entries(table: &str) -> Vec<MethodFragment> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while let Some(caps) = METHOD_ENTRY_RE.captures_at(table, pos) {
        let Some(head) = caps.get(0) else {
            break;
        };
        let name = caps.get(1).or_else(|| caps.get(2));
        let open = head.end() - 1;

        match (name, find_balanced_brace_end(table, open)) {
            (Some(name), Some(end)) => {
                let params = caps
                    .get(3)
                    .map(|m| split_params(m.as_str()))
                    .unwrap_or_default();
                entries.push(MethodFragment {
                    name: name.as_str().to_string(),
                    params,
                    body: table[open + 1..end - 1].to_string(),
                });
                pos = end;
            }
            _ => {
                tracing::trace!("skipping unterminated method entry at {}", head.start());
                pos = head.end();
            }
        }
    }

    entries
}

fn split_params(params: &str) -> Vec<String> {
    params
        .split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect()
}

/// Find the end of a balanced brace block starting at `start_index` (which
/// must point at `{`), skipping string and template literals.
/// Returns the byte index after the closing brace, or None if unbalanced.
pub(crate) fn find_balanced_brace_end(text: &str, start_index: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start_index;
    let mut in_string: Option<u8> = None;
    let mut in_template_literal = false;
    let mut template_brace_depth = 0usize;

    while i < bytes.len() {
        let c = bytes[i];

        if c == b'\\' && i + 1 < bytes.len() {
            i += 2;
            continue;
        }

        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }

        if in_template_literal {
            if c == b'`' && template_brace_depth == 0 {
                in_template_literal = false;
            } else if c == b'$' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
                template_brace_depth += 1;
                i += 2;
                continue;
            } else if c == b'}' && template_brace_depth > 0 {
                template_brace_depth -= 1;
            }
            i += 1;
            continue;
        }

        match c {
            b'"' | b'\'' => in_string = Some(c),
            b'`' => in_template_literal = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }

        i += 1;
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_script() {
        assert_eq!(extract_fragments("").unwrap(), ScriptFragments::default());
        assert!(extract_fragments("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_top_level_script_is_not_recognized() {
        let script = "const title = ref('Hello Nuxt!')\nconst count = ref(0)";
        assert_eq!(
            extract_fragments(script).unwrap_err(),
            ExtractError::NoRecognizedShape
        );
        assert_eq!(
            extract_fragments("function foo() { return 1 }").unwrap_err(),
            ExtractError::NoRecognizedShape
        );
    }

    #[test]
    fn test_recognize_setup() {
        let script = "export default { setup() { const count = ref(0); } }";
        assert_eq!(
            recognize_setup(script).as_deref(),
            Some(" const count = ref(0); ")
        );
    }

    #[test]
    fn test_setup_requires_zero_args() {
        assert_eq!(recognize_setup("setup(props) { return {} }"), None);
        assert_eq!(recognize_setup("mysetup() { x }"), None);
    }

    #[test]
    fn test_setup_truncates_at_first_closing_brace() {
        let script = "setup() { function inc() { count.value++ } return { inc } }";
        assert_eq!(
            recognize_setup(script).as_deref(),
            Some(" function inc() { count.value++ ")
        );
    }

    #[test]
    fn test_recognize_data() {
        let script = "export default { data() { return { count: 0, name: 'x' } } }";
        assert_eq!(recognize_data(script).as_deref(), Some(" count: 0, name: 'x' "));
    }

    #[test]
    fn test_data_with_nested_object_is_truncated() {
        let script = "data() { return { user: { name: 'a' } } }";
        assert_eq!(recognize_data(script).as_deref(), Some(" user: { name: 'a' "));
    }

    #[test]
    fn test_setup_takes_precedence_over_data() {
        let script = r#"
            export default {
                data() { return { a: 1 } },
                setup() { const b = ref(2); }
            }
        "#;
        let fragments = extract_fragments(script).unwrap();
        assert_eq!(
            fragments.initializer,
            Some(InitializerFragment::Setup(" const b = ref(2); ".to_string()))
        );
    }

    #[test]
    fn test_data_used_when_no_setup() {
        let fragments = extract_fragments("data() { return { a: 1 } }").unwrap();
        assert_eq!(
            fragments.initializer,
            Some(InitializerFragment::Data(" a: 1 ".to_string()))
        );
        assert_eq!(fragments.methods, None);
    }

    #[test]
    fn test_method_table_balanced() {
        let script = "methods: { inc() { if (x) { y++ } }, dec() { y-- } }";
        let table = recognize_method_table(script).unwrap().unwrap();
        assert_eq!(table, " inc() { if (x) { y++ } }, dec() { y-- } ");
    }

    #[test]
    fn test_method_table_ignores_braces_in_strings() {
        let script = "methods: { say() { return '}' + `${a}}` } }";
        let table = recognize_method_table(script).unwrap().unwrap();
        assert_eq!(table, " say() { return '}' + `${a}}` } ");
    }

    #[test]
    fn test_method_table_unbalanced_is_error() {
        let err = extract_fragments("setup() { a }\nmethods: { inc() { x++ }").unwrap_err();
        assert_eq!(err, ExtractError::UnbalancedMethodTable { offset: 14 });
    }

    #[test]
    fn test_method_entries() {
        let entries = recognize_method_entries(
            r#"
            increment() { this.count++ },
            add(a, b) { return a + b },
            reset: function () { this.count = 0 },
            "#,
        );
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["increment", "add", "reset"]);
        assert_eq!(entries[1].params, vec!["a", "b"]);
        assert_eq!(entries[1].body, " return a + b ");
        assert!(entries[2].params.is_empty());
    }

    #[test]
    fn test_method_entries_keep_nested_blocks() {
        let entries = recognize_method_entries("toggle() { if (on) { on = false } else { on = true } }");
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].body,
            " if (on) { on = false } else { on = true } "
        );
    }

    #[test]
    fn test_malformed_method_entries_skipped() {
        let entries = recognize_method_entries(
            r#"
            increment() { this.count++ },
            label: 42,
            half(x) => x / 2,
            broken(a, b,
            reset() { this.count = 0 }
            "#,
        );
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["increment", "reset"]);
    }

    #[test]
    fn test_methods_coexist_with_initializer() {
        let fragments = extract_fragments(
            "export default { data() { return { n: 0 } }, methods: { bump() { this.n++ } } }",
        )
        .unwrap();
        assert!(matches!(
            fragments.initializer,
            Some(InitializerFragment::Data(_))
        ));
        assert_eq!(fragments.methods.as_ref().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_empty_method_table() {
        let fragments = extract_fragments("methods: {}").unwrap();
        assert_eq!(fragments.methods, Some(vec![]));
    }

    #[test]
    fn test_find_balanced_brace() {
        assert_eq!(find_balanced_brace_end("{hello}", 0), Some(7));
        assert_eq!(find_balanced_brace_end("{a + b}", 0), Some(7));
        assert_eq!(find_balanced_brace_end("{obj.map(x => x)}", 0), Some(17));
        assert_eq!(
            find_balanced_brace_end("{'string with { brace'}", 0),
            Some(23)
        );
        assert_eq!(find_balanced_brace_end("{ { }", 0), None);
    }

    #[test]
    fn test_find_balanced_brace_multibyte() {
        let text = "{ '✓' }";
        assert_eq!(find_balanced_brace_end(text, 0), Some(text.len()));
    }
}
