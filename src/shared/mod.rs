//! Capabilities shared between profiles.
//!
//! The collaborators (git, services, directory cache, addons) are traits
//! so a host can swap their recipes; every compile gets them through
//! [`Capabilities`]. `Jdk` and `Jvm` are plain values that profiles hold
//! and call from their own hooks.

pub mod addons;
pub mod directory_cache;
pub mod git;
pub mod jdk;
pub mod jvm;
pub mod services;

use crate::builder::ShellBuilder;
use crate::config::Data;
use crate::error::Result;

pub use addons::Addons;
pub use directory_cache::DirectoryCache;
pub use git::Git;
pub use jdk::Jdk;
pub use jvm::Jvm;
pub use services::Services;

/// Runs the addons registered for a hook (`before_install`,
/// `after_pre_setup`, ...).
pub trait AddonRunner {
    fn run(&self, hook: &str, sh: &mut ShellBuilder, data: &Data) -> Result<()>;
}

pub trait ServiceManager {
    fn start(&self, services: &[String], sh: &mut ShellBuilder) -> Result<()>;
}

pub trait DirectoryCacheManager {
    /// Pulls cached directories before the build.
    fn fetch(&self, sh: &mut ShellBuilder, data: &Data, slug: &str) -> Result<()>;
    /// Pushes cached directories after the build.
    fn push(&self, sh: &mut ShellBuilder, data: &Data, slug: &str) -> Result<()>;
}

pub trait GitCheckout {
    fn checkout(&self, sh: &mut ShellBuilder, data: &Data) -> Result<()>;
}

pub struct Capabilities {
    pub git: Box<dyn GitCheckout>,
    pub services: Box<dyn ServiceManager>,
    pub cache: Box<dyn DirectoryCacheManager>,
    pub addons: Box<dyn AddonRunner>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            git: Box::new(Git),
            services: Box::new(Services),
            cache: Box::new(DirectoryCache),
            addons: Box::new(Addons),
        }
    }
}
