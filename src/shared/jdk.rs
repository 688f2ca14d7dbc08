use crate::ast::{CmdOpts, ExportOpts};
use crate::config::Data;
use crate::error::Result;
use crate::stages::Session;

/// JDK selection via `jdk_switcher`. Does nothing unless `jdk` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct Jdk;

impl Jdk {
    pub fn version(&self, data: &Data) -> Option<String> {
        data.get_str("jdk")
    }

    pub fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        if let Some(jdk) = self.version(cx.data) {
            cx.sh.export("TRAVIS_JDK_VERSION", jdk, ExportOpts::silent());
        }
        Ok(())
    }

    pub fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        if let Some(jdk) = self.version(cx.data) {
            cx.sh.cmd(format!("jdk_switcher use {}", jdk), CmdOpts::new().echo().assert());
        }
        Ok(())
    }

    pub fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.cmd("java -version", CmdOpts::new().echo());
        cx.sh.cmd("javac -version", CmdOpts::new().echo());
        Ok(())
    }

    /// Slug suffix, empty without a configured JDK.
    pub fn cache_slug(&self, data: &Data) -> String {
        match self.version(data) {
            Some(jdk) => format!("--jdk-{}", jdk),
            None => String::new(),
        }
    }
}
