//! Compilation Orchestrator
//!
//! `validate -> extract -> synthesize -> style notice`, folded into a single
//! [`CompileResult`]. No error or panic from a lower stage escapes: every
//! path ends in a well-formed result.

#[cfg(feature = "napi")]
use napi_derive::napi;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};

use crate::error::{panic_message, CompileError};
use crate::extract::{extract_fragments, ScriptFragments};
use crate::options::CompilerOptions;
use crate::sfc::parse_sfc;
use crate::synthesize::{synthesize, ComponentDescriptor};
use crate::validate::{validate_template, ValidationResult};

pub const STYLE_WARNING: &str = "Custom styles are not fully supported in this demo";

lazy_static! {
    static ref SHARED_COMPILER: ComponentCompiler = ComponentCompiler::default();
}

/// Process-wide compiler with default options, created on first use.
///
/// Convenience for call sites that have nowhere to keep their own
/// [`ComponentCompiler`]; nothing inside the crate reaches for it.
pub fn shared_compiler() -> &'static ComponentCompiler {
    &SHARED_COMPILER
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// Exactly one of `component` / `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub component: Option<ComponentDescriptor>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

impl CompileResult {
    fn success(component: ComponentDescriptor, warnings: Vec<String>) -> Self {
        Self {
            component: Some(component),
            error: None,
            warnings,
        }
    }

    fn failure(error: String, warnings: Vec<String>) -> Self {
        Self {
            component: None,
            error: Some(error),
            warnings,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.component.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct ComponentCompiler {
    options: CompilerOptions,
}

impl ComponentCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn validate_template(&self, template: &str) -> ValidationResult {
        validate_template(template, &self.options)
    }

    /// Compile template + script, ignoring style.
    pub fn compile_from_template(&self, template: &str, script: &str) -> CompileResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut warnings = Vec::new();
            let compiled = self.compile_parts(template, script, &mut warnings);
            (compiled, warnings)
        }));

        match outcome {
            Ok((Ok(component), warnings)) => CompileResult::success(component, warnings),
            Ok((Err(CompileError::Template(message)), _)) => {
                CompileResult::failure(message, Vec::new())
            }
            Ok((Err(err), warnings)) => {
                tracing::warn!("synthesis failed: {}", err);
                CompileResult::failure(format!("Compilation error: {}", err), warnings)
            }
            Err(payload) => {
                let message = panic_message(payload);
                tracing::warn!("compilation panicked: {}", message);
                CompileResult::failure(format!("Compilation error: {}", message), Vec::new())
            }
        }
    }

    /// Compile the three editor buffers. Non-empty style only ever adds
    /// [`STYLE_WARNING`] to a successful result; style is never parsed.
    /// Failed results never carry the style warning, unlike the playground's
    /// JavaScript compiler, which appended it even after an error.
    pub fn compile_sfc(&self, template: &str, script: &str, style: &str) -> CompileResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut result = self.compile_from_template(template, script);
            if result.is_ok() && !style.trim().is_empty() {
                result.warnings.push(STYLE_WARNING.to_string());
            }
            result
        }));

        outcome.unwrap_or_else(|payload| {
            let message = panic_message(payload);
            tracing::warn!("SFC compilation panicked: {}", message);
            CompileResult::failure(format!("SFC compilation error: {}", message), Vec::new())
        })
    }

    /// Split a whole single-file component and compile its parts.
    pub fn compile_source(&self, source: &str) -> CompileResult {
        let parts = parse_sfc(source);
        self.compile_sfc(&parts.template, &parts.script, &parts.style)
    }

    fn compile_parts(
        &self,
        template: &str,
        script: &str,
        warnings: &mut Vec<String>,
    ) -> Result<ComponentDescriptor, CompileError> {
        tracing::debug!(
            template_len = template.len(),
            script_len = script.len(),
            "compiling component"
        );

        let validation = self.validate_template(template);
        if !validation.is_valid {
            let message = validation
                .first_error()
                .unwrap_or("Template validation failed")
                .to_string();
            tracing::debug!("template rejected: {}", message);
            return Err(CompileError::Template(message));
        }

        let fragments = match extract_fragments(script) {
            Ok(fragments) => fragments,
            Err(err) => {
                tracing::warn!("script extraction failed: {}", err);
                warnings.push(format!("Script parsing warning: {}", err));
                ScriptFragments::default()
            }
        };

        Ok(synthesize(template.trim(), fragments, &self.options)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn compile_sfc_native(
    template: String,
    script: String,
    style: String,
    options_json: Option<String>,
) -> napi::Result<serde_json::Value> {
    let result = match options_json {
        Some(json) => {
            let options = CompilerOptions::from_json(&json)
                .map_err(|e| napi::Error::from_reason(e.to_string()))?;
            ComponentCompiler::new(options).compile_sfc(&template, &script, &style)
        }
        None => shared_compiler().compile_sfc(&template, &script, &style),
    };
    serde_json::to_value(result).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn validate_template_native(template: String) -> napi::Result<serde_json::Value> {
    let result = shared_compiler().validate_template(&template);
    serde_json::to_value(result).map_err(|e| napi::Error::from_reason(e.to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
