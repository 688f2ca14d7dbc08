use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::CmdOpts;
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::shared::Jdk;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "clojure",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "lein": "lein", "jdk": "default" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Clojure::default())
}

fn lein(data: &Data) -> String {
    data.get_str("lein").unwrap_or_else(|| "lein".to_string())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Clojure {
    jdk: Jdk,
}

impl StageHooks for Clojure {
    fn name(&self) -> &'static str {
        "clojure"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        self.jdk.export(cx)
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        self.jdk.setup(cx)
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        self.jdk.announce(cx)?;
        cx.sh.cmd(format!("{} version", lein(cx.data)), CmdOpts::new().echo());
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.cmd(
            format!("{} deps", lein(cx.data)),
            CmdOpts::new().echo().assert().retry().timing(),
        );
        Ok(())
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.cmd(format!("{} test", lein(cx.data)), CmdOpts::new().echo().timing());
        Ok(())
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}{}--lein-{}", base::cache_slug(), self.jdk.cache_slug(data), lein(data))
    }
}
