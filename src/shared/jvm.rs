use crate::ast::CmdOpts;
use crate::error::Result;
use crate::stages::Session;

use super::Jdk;

/// Build-tool detection shared by the JVM languages: gradle wrapper,
/// gradle, maven, then ant.
#[derive(Debug, Default, Clone, Copy)]
pub struct Jvm {
    pub jdk: Jdk,
}

impl Jvm {
    pub fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().assert().retry().timing();
        cx.sh.open_conditional("-f gradlew");
        cx.sh.cmd("./gradlew assemble", opts);
        cx.sh.elif("-f build.gradle")?;
        cx.sh.cmd("gradle assemble", opts);
        cx.sh.elif("-f pom.xml")?;
        cx.sh.cmd("mvn install -DskipTests=true -B -V", opts);
        cx.sh.close()
    }

    pub fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().timing();
        cx.sh.open_conditional("-f gradlew");
        cx.sh.cmd("./gradlew check", opts);
        cx.sh.elif("-f build.gradle")?;
        cx.sh.cmd("gradle check", opts);
        cx.sh.elif("-f pom.xml")?;
        cx.sh.cmd("mvn test -B", opts);
        cx.sh.else_()?;
        cx.sh.cmd("ant test", opts);
        cx.sh.close()
    }
}
