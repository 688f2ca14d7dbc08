use serde_json::Value;

use super::ProfileEntry;
use crate::ast::CmdOpts;
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::shared::Jvm;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "groovy",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    super::jvm::defaults()
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Groovy::default())
}

/// Groovy builds like any JVM project but prefers gradle for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct Groovy {
    jvm: Jvm,
}

impl StageHooks for Groovy {
    fn name(&self) -> &'static str {
        "groovy"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        self.jvm.jdk.export(cx)
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        self.jvm.jdk.setup(cx)
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        self.jvm.jdk.announce(cx)?;
        cx.sh.cmd("groovy --version", CmdOpts::new().echo());
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        self.jvm.install(cx)
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().timing();
        cx.sh.open_conditional("-f gradlew");
        cx.sh.cmd("./gradlew check", opts);
        cx.sh.elif("-f build.gradle")?;
        cx.sh.cmd("gradle check", opts);
        cx.sh.elif("-f pom.xml")?;
        cx.sh.cmd("mvn test -B", opts);
        cx.sh.else_()?;
        cx.sh.cmd("gradle check", opts);
        cx.sh.close()
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}{}", base::cache_slug(), self.jvm.jdk.cache_slug(data))
    }
}
