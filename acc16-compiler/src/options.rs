use serde::{Deserialize, Serialize};

/// What to do when `var x = ...;` names a variable that already has a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedeclarationPolicy {
    /// Treat the declaration as an assignment to the existing slot.
    #[default]
    Reuse,
    /// Fail with a `VariableRedeclaration` semantic error.
    Reject,
}

/// Front-end knobs shared by the analyzer and the IR builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub redeclaration: RedeclarationPolicy,
}

impl CompileOptions {
    pub fn strict() -> Self {
        Self {
            redeclaration: RedeclarationPolicy::Reject,
        }
    }
}
