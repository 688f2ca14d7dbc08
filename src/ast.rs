/// ANSI colours used for messages printed by the generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ansi {
    Red,
    Green,
    Yellow,
}

impl Ansi {
    pub fn code(self) -> &'static str {
        match self {
            Ansi::Red => "31;1",
            Ansi::Green => "32;1",
            Ansi::Yellow => "33;1",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CmdOpts {
    pub echo: bool,
    pub assert: bool,
    pub timing: bool,
    pub retry: bool,
    pub secure: bool,
    pub color: Option<Ansi>,
}

impl CmdOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echo(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn assert(mut self) -> Self {
        self.assert = true;
        self
    }

    pub fn timing(mut self) -> Self {
        self.timing = true;
        self
    }

    pub fn retry(mut self) -> Self {
        self.retry = true;
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub fn color(mut self, color: Ansi) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOpts {
    pub echo: bool,
    pub secure: bool,
}

impl ExportOpts {
    /// Exports are echoed unless told otherwise.
    pub fn echoed() -> Self {
        Self { echo: true, secure: false }
    }

    pub fn silent() -> Self {
        Self { echo: false, secure: false }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// `None` marks the trailing `else` branch.
    pub test: Option<String>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Command { text: String, opts: CmdOpts },
    Export { key: String, value: String, opts: ExportOpts },
    Conditional { branches: Vec<Branch> },
    Fold { label: String, body: Vec<Node> },
    Raw(String),
}

impl Node {
    pub fn command(text: impl Into<String>, opts: CmdOpts) -> Self {
        Node::Command { text: text.into(), opts }
    }

    pub fn export(key: impl Into<String>, value: impl Into<String>, opts: ExportOpts) -> Self {
        Node::Export {
            key: key.into(),
            value: value.into(),
            opts,
        }
    }

    /// Visits this node and every node nested below it, in render order.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        f(self);
        match self {
            Node::Conditional { branches } => {
                for branch in branches {
                    for child in &branch.body {
                        child.walk(f);
                    }
                }
            }
            Node::Fold { body, .. } => {
                for child in body {
                    child.walk(f);
                }
            }
            Node::Command { .. } | Node::Export { .. } | Node::Raw(_) => {}
        }
    }
}

/// Flattens a tree of nodes into render order.
pub fn flatten(nodes: &[Node]) -> Vec<&Node> {
    let mut out = Vec::new();
    for node in nodes {
        node.walk(&mut |n| out.push(n));
    }
    out
}
