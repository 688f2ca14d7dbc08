use crate::ast::{Ansi, CmdOpts, ExportOpts, Node};
use crate::codegen::sq;
use crate::context::{ContextStack, Frame};
use crate::error::Result;

/// Nesting-aware DSL for building a script AST.
///
/// Every call appends to the block on top of the context stack. Blocks are
/// opened with `open_conditional` / `open_fold` and closed with `close`;
/// `finish` rejects a builder that still has open blocks.
#[derive(Debug, Default)]
pub struct ShellBuilder {
    stack: ContextStack,
}

impl ShellBuilder {
    pub fn new() -> Self {
        Self {
            stack: ContextStack::new(),
        }
    }

    fn push_node(&mut self, node: Node) {
        self.stack.current_mut().body_mut().push(node);
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn cmd(&mut self, text: impl Into<String>, opts: CmdOpts) {
        self.push_node(Node::command(text, opts));
    }

    pub fn export(&mut self, key: impl Into<String>, value: impl Into<String>, opts: ExportOpts) {
        self.push_node(Node::export(key, value, opts));
    }

    pub fn raw(&mut self, text: impl Into<String>) {
        self.push_node(Node::Raw(text.into()));
    }

    /// Prints a message, optionally coloured.
    pub fn echo(&mut self, msg: &str, color: Option<Ansi>) {
        let text = match color {
            Some(c) => format!("echo -e \"\\033[{}m\"{}\"\\033[0m\"", c.code(), sq(msg)),
            None => format!("echo {}", sq(msg)),
        };
        self.cmd(text, CmdOpts::new());
    }

    pub fn newline(&mut self) {
        self.cmd("echo", CmdOpts::new());
    }

    pub fn open_conditional(&mut self, test: impl Into<String>) {
        self.stack.push(Frame::conditional(test));
    }

    pub fn elif(&mut self, test: impl Into<String>) -> Result<()> {
        self.stack.branch("elif", Some(test.into()))
    }

    pub fn else_(&mut self) -> Result<()> {
        self.stack.branch("else", None)
    }

    pub fn open_fold(&mut self, label: impl Into<String>) {
        self.stack.push(Frame::fold(label));
    }

    pub fn close(&mut self) -> Result<()> {
        self.stack.pop()
    }

    /// Runs `f` inside a fold that is always closed afterwards.
    pub fn fold<F>(&mut self, label: impl Into<String>, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.open_fold(label);
        f(self)?;
        self.close()
    }

    /// Single-branch conditional.
    pub fn if_<F>(&mut self, test: impl Into<String>, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.open_conditional(test);
        f(self)?;
        self.close()
    }

    /// Consumes the builder and returns the finished AST.
    pub fn finish(self) -> Result<Vec<Node>> {
        self.stack.finish()
    }
}
