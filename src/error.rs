use thiserror::Error;

/// Which kind of block a structural fault refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Conditional,
    Fold,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockKind::Conditional => write!(f, "conditional"),
            BlockKind::Fold => write!(f, "fold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A block was opened but never closed before the builder was finished.
    #[error("compile error: unclosed {kind} block `{label}`")]
    UnclosedBlock { kind: BlockKind, label: String },

    #[error("compile error: close() called with no open block")]
    UnbalancedClose,

    #[error("compile error: {op} called outside of a conditional block")]
    BranchOutsideConditional { op: &'static str },

    #[error("compile error: {op} called after else")]
    BranchAfterElse { op: &'static str },

    #[error("compile error: no profile registered for language `{0}`")]
    UnknownLanguage(String),

    #[error("compile error: invalid payload: {0}")]
    Payload(String),
}

impl CompileError {
    /// Structural faults are compiler defects: the builder was driven into
    /// an unbalanced state.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CompileError::UnclosedBlock { .. }
                | CompileError::UnbalancedClose
                | CompileError::BranchOutsideConditional { .. }
                | CompileError::BranchAfterElse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
