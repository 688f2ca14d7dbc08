use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "php",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "php": "5.5" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Php)
}

fn version(data: &Data) -> String {
    data.get_str("php").unwrap_or_else(|| "5.5".to_string())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Php;

impl StageHooks for Php {
    fn name(&self) -> &'static str {
        "php"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        cx.sh.export("TRAVIS_PHP_VERSION", version(cx.data), ExportOpts::silent());
        Ok(())
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        cx.sh.cmd(format!("phpenv global {}", version(cx.data)), CmdOpts::new().assert());
        Ok(())
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        cx.sh.cmd("php --version", CmdOpts::new().echo());
        Ok(())
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.cmd("phpunit", CmdOpts::new().echo().timing());
        Ok(())
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}--php-{}", base::cache_slug(), version(data))
    }
}
