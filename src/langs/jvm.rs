use serde_json::{Value, json};

use super::ProfileEntry;
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::shared::Jvm;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "java",
        defaults,
        build,
    }
}

pub(super) fn defaults() -> Value {
    json!({ "jdk": "default" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Java::default())
}

/// Plain JVM projects: gradle, maven or ant, picked from the build files.
#[derive(Debug, Default, Clone, Copy)]
pub struct Java {
    jvm: Jvm,
}

impl StageHooks for Java {
    fn name(&self) -> &'static str {
        "java"
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
        self.jvm.jdk.announce(cx)
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        self.jvm.install(cx)
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        self.jvm.script(cx)
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}{}", base::cache_slug(), self.jvm.jdk.cache_slug(data))
    }
}
