//! Template Validator
//!
//! Cheap structural checks over raw markup. These are counts and token
//! scans, not a parse: crossed tags such as `<a><b></a></b>` pass, and a
//! void element written without `/>` (`<input>`) fails.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};

use crate::error::panic_message;
use crate::options::CompilerOptions;

pub const ERR_EMPTY_TEMPLATE: &str = "Template cannot be empty";
pub const ERR_UNMATCHED_TAGS: &str = "Unmatched HTML tags detected";

lazy_static! {
    static ref OPEN_TAG_RE: Regex = Regex::new(r"<[^/][^>]*>").unwrap();
    static ref CLOSE_TAG_RE: Regex = Regex::new(r"</[^>]+>").unwrap();
    static ref SELF_CLOSING_TAG_RE: Regex = Regex::new(r"<[^>]*/>").unwrap();

    /// `v-name`, optionally with `:arg` / `:[dynamicArg]` and `.modifiers`.
    /// Must start an attribute, so `nav-v-item` is not a directive.
    static ref DIRECTIVE_RE: Regex = Regex::new(
        r"(?:^|\s)(v-[a-zA-Z][a-zA-Z0-9-]*(?::(?:\[[^\]\s]*\]|[\w-]+))?(?:\.[\w-]+)*)"
    )
    .unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALIDATION RESULT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Highest-priority message, if any.
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(|s| s.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHECKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate markup text. Never panics; an internal failure becomes a single
/// `Template validation error: ...` entry.
pub fn validate_template(template: &str, options: &CompilerOptions) -> ValidationResult {
    match panic::catch_unwind(AssertUnwindSafe(|| run_checks(template, options))) {
        Ok(result) => result,
        Err(payload) => {
            let message = format!("Template validation error: {}", panic_message(payload));
            tracing::warn!("{}", message);
            ValidationResult::from_errors(vec![message])
        }
    }
}

fn run_checks(template: &str, options: &CompilerOptions) -> ValidationResult {
    if template.trim().is_empty() {
        return ValidationResult::from_errors(vec![ERR_EMPTY_TEMPLATE.to_string()]);
    }

    let mut errors = Vec::new();

    if !tags_balanced(template) {
        errors.push(ERR_UNMATCHED_TAGS.to_string());
    }

    let invalid = invalid_directives(template, options);
    if !invalid.is_empty() {
        errors.push(format!("Invalid directive syntax: {}", invalid.join(", ")));
    }

    ValidationResult::from_errors(errors)
}

/// opening - self-closing == closing
pub fn tags_balanced(template: &str) -> bool {
    let open = OPEN_TAG_RE.find_iter(template).count();
    let close = CLOSE_TAG_RE.find_iter(template).count();
    let self_closing = SELF_CLOSING_TAG_RE.find_iter(template).count();

    open as isize - self_closing as isize == close as isize
}

/// Directive tokens not immediately followed by `=`, in source order.
pub fn invalid_directives(template: &str, options: &CompilerOptions) -> Vec<String> {
    let mut invalid = Vec::new();

    for caps in DIRECTIVE_RE.captures_iter(template) {
        let Some(token) = caps.get(1) else {
            continue;
        };
        if template[token.end()..].starts_with('=') {
            continue;
        }
        if options.is_valueless_directive(token.as_str()) {
            continue;
        }
        invalid.push(token.as_str().to_string());
    }

    invalid
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
