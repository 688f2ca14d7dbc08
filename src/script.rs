//! Compile orchestration: resolve the payload, pick a profile, run the
//! stages, render, and wrap the body with the header and footer.

use tracing::{debug, warn};

use crate::ast::{Ansi, CmdOpts, Node};
use crate::builder::ShellBuilder;
use crate::codegen::{CodegenOptions, Emitter};
use crate::config::{ConfigResolver, ConfigStatus, Data, deep_merge};
use crate::error::Result;
use crate::langs::Registry;
use crate::shared::{Capabilities, git};
use crate::stages::{self, Session};
use crate::template::{DefaultTemplates, TemplateRenderer, TemplateVars};

pub const NOT_FOUND_MSG: &str = "Could not find .travis.yml, using standard configuration.";
pub const SERVER_ERROR_MSG: &str = "Could not fetch .travis.yml from GitHub.";

/// Compiler behaviour, as opposed to build behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub codegen: CodegenOptions,
    pub build_dir: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            codegen: CodegenOptions::default(),
            build_dir: "$HOME/build".to_string(),
        }
    }
}

/// Result of running the pipeline, before rendering.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub language: &'static str,
    pub data: Data,
    pub cache_slug: String,
    pub status: ConfigStatus,
    pub body: Vec<Node>,
    pub finish: Vec<Node>,
}

pub struct Compiler {
    registry: Registry,
    caps: Capabilities,
    templates: Box<dyn TemplateRenderer>,
    options: CompileOptions,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            registry: Registry::builtin(),
            caps: Capabilities::default(),
            templates: Box::new(DefaultTemplates),
            options: CompileOptions::default(),
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    pub fn with_templates(mut self, templates: Box<dyn TemplateRenderer>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Runs the pipeline and returns the finished ASTs.
    pub fn build(&self, resolver: &dyn ConfigResolver) -> Result<Compiled> {
        let resolved = resolver.resolve()?;
        let requested = resolved
            .payload
            .pointer("/config/language")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let entry = self.registry.select(requested.as_deref())?;
        debug!(language = entry.name, "selected profile");

        let mut defaults = git::defaults();
        deep_merge(&mut defaults, &(entry.defaults)());
        let data = Data::new(defaults, &resolved.payload);
        let profile = (entry.build)();
        let cache_slug = profile.cache_slug(&data);

        let mut sh = ShellBuilder::new();
        let mut finish = ShellBuilder::new();
        if check_config(resolved.status, &mut sh) {
            let mut cx = Session {
                sh: &mut sh,
                data: &data,
                caps: &self.caps,
                cache_slug: &cache_slug,
            };
            stages::run(profile.as_ref(), &mut cx)?;

            let mut cx = Session {
                sh: &mut finish,
                data: &data,
                caps: &self.caps,
                cache_slug: &cache_slug,
            };
            profile.finish(&mut cx)?;
        }

        Ok(Compiled {
            language: entry.name,
            data,
            cache_slug,
            status: resolved.status,
            body: sh.finish()?,
            finish: finish.finish()?,
        })
    }

    /// Renders a built script: header, body and footer joined by newlines.
    pub fn render(&self, compiled: &Compiled) -> String {
        let mut emitter = Emitter::new(self.options.codegen);
        let body = emitter.render(&compiled.body, 0);
        let vars = TemplateVars {
            build_dir: self.options.build_dir.clone(),
            finish: emitter.render(&compiled.finish, 2),
        };
        [
            self.templates.header(&vars),
            body,
            self.templates.footer(&vars),
        ]
        .join("\n")
    }

    pub fn compile(&self, resolver: &dyn ConfigResolver) -> Result<String> {
        let compiled = self.build(resolver)?;
        Ok(self.render(&compiled))
    }

    /// Cache slug the selected profile computes for this payload.
    pub fn cache_slug(&self, resolver: &dyn ConfigResolver) -> Result<String> {
        Ok(self.build(resolver)?.cache_slug)
    }
}

/// Reports the config fetch status inside the script. Returns whether the
/// build stages should run.
fn check_config(status: ConfigStatus, sh: &mut ShellBuilder) -> bool {
    match status {
        ConfigStatus::NotFound => {
            warn!("build config not found, using defaults");
            sh.echo(NOT_FOUND_MSG, Some(Ansi::Red));
            true
        }
        ConfigStatus::ServerError => {
            warn!("build config could not be fetched, terminating build");
            sh.echo(SERVER_ERROR_MSG, Some(Ansi::Red));
            sh.cmd("travis_terminate 2", CmdOpts::new());
            false
        }
        ConfigStatus::Ok => true,
    }
}

/// Compiles a payload with the default compiler.
pub fn compile(resolver: &dyn ConfigResolver) -> Result<String> {
    Compiler::new().compile(resolver)
}
