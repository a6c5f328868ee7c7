//! # Playground Component Compiler
//!
//! Turns the three buffers of a learning playground (markup, behavior script,
//! style) into a component descriptor the host runtime can mount.
//!
//! ## Pipeline
//!
//! 1. **Validate** the template: non-empty, tag counts balance, every
//!    directive has a value. Any failure ends the call with `error` set.
//! 2. **Extract** fragments from the script with regex recognizers, not a
//!    parser. Recognition problems become warnings.
//! 3. **Synthesize** host-executed procedures from the fragments. Procedures
//!    are JavaScript source tagged with a trust level; this crate never runs
//!    them. Text that does not parse is a compile error.
//! 4. **Style** is never parsed. Non-empty style adds one fixed warning.
//!
//! ## Guarantees
//!
//! - Every public compile call returns a [`CompileResult`]; nothing panics
//!   or errors past [`ComponentCompiler`].
//! - `component` and `error` are mutually exclusive.
//! - A reactive-setup procedure always returns `{}`. The names its body
//!   declares are listed as `unexposedBindings` on the descriptor but are not
//!   forwarded to the template.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod compiler;
mod error;
mod extract;
mod options;
mod sfc;
mod synthesize;
mod validate;


pub use compiler::{shared_compiler, CompileResult, ComponentCompiler, STYLE_WARNING};
pub use error::{CompileError, ExtractError, SynthesisError};
pub use extract::{
    extract_fragments, recognize_data, recognize_method_entries, recognize_method_table,
    recognize_setup, InitializerFragment, MethodFragment, ScriptFragments,
};
pub use options::{CompilerOptions, TrustLevel};
pub use sfc::{parse_sfc, SfcParts};
pub use synthesize::{synthesize, ComponentDescriptor, Initializer, ScriptProcedure};
pub use validate::{
    invalid_directives, tags_balanced, validate_template, ValidationResult, ERR_EMPTY_TEMPLATE,
    ERR_UNMATCHED_TAGS,
};

#[cfg(feature = "napi")]
pub use compiler::{compile_sfc_native, validate_template_native};

#[cfg(feature = "napi")]
#[napi]
pub fn compile_bridge() -> String {
    "Playground Compiler Native Bridge Connected".to_string()
}
