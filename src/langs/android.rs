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
        name: "android",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({
        "android": {
            "components": [],
            "licenses": []
        }
    })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Android::default())
}

/// Command installing one SDK component, accepting the configured licenses.
pub fn install_sdk_component(name: &str, licenses: &[String]) -> String {
    let mut code = format!("android-update-sdk --components={}", name);
    if !licenses.is_empty() {
        code.push_str(&format!(" --accept-licenses='{}'", licenses.join("|")));
    }
    code
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Android {
    jdk: Jdk,
}

impl Android {
    fn components(data: &Data) -> Vec<String> {
        data.get_list("android/components")
    }

    fn licenses(data: &Data) -> Vec<String> {
        data.get_list("android/licenses")
    }
}

impl StageHooks for Android {
    fn name(&self) -> &'static str {
        "android"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        self.jdk.export(cx)
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        self.jdk.setup(cx)?;

        let components = Self::components(cx.data);
        if components.is_empty() {
            return Ok(());
        }
        let licenses = Self::licenses(cx.data);
        cx.sh.fold("android.install", |sh| {
            sh.echo("Installing Android dependencies", None);
            for name in &components {
                sh.cmd(
                    install_sdk_component(name, &licenses),
                    CmdOpts::new().echo().assert(),
                );
            }
            Ok(())
        })
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        self.jdk.announce(cx)
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().timing();
        cx.sh.open_conditional("-f gradlew");
        cx.sh.cmd("./gradlew build connectedCheck", opts);
        cx.sh.elif("-f build.gradle")?;
        cx.sh.cmd("gradle build connectedCheck", opts);
        cx.sh.elif("-f pom.xml")?;
        cx.sh.cmd("mvn install -B", opts);
        cx.sh.else_()?;
        // `installt` is kept as-is; other tooling matches on this exact text.
        cx.sh.cmd("ant debug installt test", opts);
        cx.sh.close()
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}{}", base::cache_slug(), self.jdk.cache_slug(data))
    }
}
