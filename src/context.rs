use crate::ast::{Branch, Node};
use crate::error::{BlockKind, CompileError, Result};

/// One open block on the context stack.
#[derive(Debug)]
pub enum Frame {
    Root(Vec<Node>),
    Fold {
        label: String,
        body: Vec<Node>,
    },
    Conditional {
        done: Vec<Branch>,
        test: Option<String>,
        body: Vec<Node>,
    },
}

impl Frame {
    pub fn conditional(test: impl Into<String>) -> Self {
        Frame::Conditional {
            done: Vec::new(),
            test: Some(test.into()),
            body: Vec::new(),
        }
    }

    pub fn fold(label: impl Into<String>) -> Self {
        Frame::Fold {
            label: label.into(),
            body: Vec::new(),
        }
    }

    /// The node list builder calls currently append to.
    pub fn body_mut(&mut self) -> &mut Vec<Node> {
        match self {
            Frame::Root(body) => body,
            Frame::Fold { body, .. } => body,
            Frame::Conditional { body, .. } => body,
        }
    }

    pub fn kind(&self) -> Option<BlockKind> {
        match self {
            Frame::Root(_) => None,
            Frame::Fold { .. } => Some(BlockKind::Fold),
            Frame::Conditional { .. } => Some(BlockKind::Conditional),
        }
    }

    fn label(&self) -> String {
        match self {
            Frame::Root(_) => String::new(),
            Frame::Fold { label, .. } => label.clone(),
            Frame::Conditional { done, test, .. } => done
                .first()
                .and_then(|b| b.test.clone())
                .or_else(|| test.clone())
                .unwrap_or_default(),
        }
    }

    /// Converts a closed frame into the node it stands for.
    fn into_node(self) -> Option<Node> {
        match self {
            Frame::Root(_) => None,
            Frame::Fold { label, body } => Some(Node::Fold { label, body }),
            Frame::Conditional {
                mut done,
                test,
                body,
            } => {
                done.push(Branch { test, body });
                Some(Node::Conditional { branches: done })
            }
        }
    }
}

/// Stack of open blocks. The root frame is always present, so the stack is
/// never empty and the root can never be popped.
#[derive(Debug)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::Root(Vec::new())],
        }
    }

    /// Number of open blocks above the root.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn current(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut Frame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    /// Pops the innermost block and appends the node it produced to the
    /// block below it.
    pub fn pop(&mut self) -> Result<()> {
        if self.frames.len() == 1 {
            return Err(CompileError::UnbalancedClose);
        }
        let frame = self.frames.pop().ok_or(CompileError::UnbalancedClose)?;
        if let Some(node) = frame.into_node() {
            self.current_mut().body_mut().push(node);
        }
        Ok(())
    }

    /// Starts a new branch of the conditional on top of the stack.
    /// `test == None` starts the `else` branch.
    pub fn branch(&mut self, op: &'static str, next: Option<String>) -> Result<()> {
        match self.current_mut() {
            Frame::Conditional { done, test, body } => {
                let else_started = !done.is_empty() && test.is_none();
                if else_started {
                    return Err(CompileError::BranchAfterElse { op });
                }
                done.push(Branch {
                    test: test.take(),
                    body: std::mem::take(body),
                });
                *test = next;
                Ok(())
            }
            _ => Err(CompileError::BranchOutsideConditional { op }),
        }
    }

    /// Consumes the stack, failing on the innermost block still open.
    pub fn finish(mut self) -> Result<Vec<Node>> {
        if self.frames.len() > 1 {
            let top = self.current();
            return Err(CompileError::UnclosedBlock {
                kind: top.kind().unwrap_or(BlockKind::Fold),
                label: top.label(),
            });
        }
        match self.frames.pop() {
            Some(Frame::Root(body)) => Ok(body),
            _ => Err(CompileError::UnbalancedClose),
        }
    }
}
