use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// Trust label carried by every synthesized procedure.
///
/// The compiler never executes what it synthesizes; the host decides how
/// to isolate a procedure based on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrustLevel {
    /// Learner-typed text. The host must sandbox it.
    #[default]
    Untrusted,
    /// Text the host vouches for (e.g. a built-in example it shipped itself).
    Trusted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Host reactive primitives passed by name into a reactive-setup procedure.
    pub reactive_primitives: Vec<String>,
    /// Directives that are legal without an `=value`.
    pub valueless_directives: Vec<String>,
    pub trust: TrustLevel,
    /// Parse every synthesized procedure and reject the ones that do not parse.
    pub verify_syntax: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            reactive_primitives: ["ref", "computed", "watch", "onMounted"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            valueless_directives: ["v-else", "v-cloak", "v-pre", "v-once"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trust: TrustLevel::Untrusted,
            verify_syntax: true,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_valueless_directive(&self, token: &str) -> bool {
        self.valueless_directives.iter().any(|d| d == token)
    }
}
