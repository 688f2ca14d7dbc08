use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::shared::Jvm;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "scala",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "scala": "2.10.4", "jdk": "default" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Scala::default())
}

fn version(data: &Data) -> String {
    data.get_str("scala").unwrap_or_else(|| "2.10.4".to_string())
}

const SBT_CONDITION: &str = "-d project || -f build.sbt";

/// sbt projects build with sbt; anything else falls back to the JVM tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct Scala {
    jvm: Jvm,
}

impl StageHooks for Scala {
    fn name(&self) -> &'static str {
        "scala"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        self.jvm.jdk.export(cx)?;
        cx.sh.export("TRAVIS_SCALA_VERSION", version(cx.data), ExportOpts::silent());
        Ok(())
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        self.jvm.jdk.setup(cx)
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        self.jvm.jdk.announce(cx)?;
        cx.sh.echo(&format!("Using Scala {}", version(cx.data)), None);
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.open_conditional(SBT_CONDITION);
        cx.sh.echo("sbt will fetch dependencies on demand", None);
        cx.sh.else_()?;
        self.jvm.install(cx)?;
        cx.sh.close()
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.open_conditional(SBT_CONDITION);
        cx.sh.cmd(
            format!("sbt ++{} test", version(cx.data)),
            CmdOpts::new().echo().timing(),
        );
        cx.sh.else_()?;
        self.jvm.script(cx)?;
        cx.sh.close()
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!(
            "{}{}--scala-{}",
            base::cache_slug(),
            self.jvm.jdk.cache_slug(data),
            version(data)
        )
    }
}
