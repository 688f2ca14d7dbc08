pub mod ast;
pub mod base;
pub mod builder;
pub mod codegen;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod langs;
pub mod script;
pub mod shared;
pub mod stages;
pub mod template;

pub use builder::ShellBuilder;
pub use config::{ConfigResolver, ConfigStatus, Data, PayloadResolver};
pub use error::{CompileError, Result};
pub use langs::Registry;
pub use script::{CompileOptions, Compiler, compile};
pub use stages::{Session, Stage, StageHooks};
