/// Values the header and footer are rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub build_dir: String,
    /// Rendered finish phase, already indented for the body of
    /// `travis_finish`.
    pub finish: String,
}

/// Renders the fixed boilerplate around a compiled body.
pub trait TemplateRenderer {
    fn header(&self, vars: &TemplateVars) -> String;
    fn footer(&self, vars: &TemplateVars) -> String;
}

/// Bash header defining the runtime helpers the body calls
/// (`travis_terminate`, `travis_result`) and a matching footer. The finish
/// phase runs at most once, from `travis_terminate` or the EXIT trap.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTemplates;

impl TemplateRenderer for DefaultTemplates {
    fn header(&self, vars: &TemplateVars) -> String {
        let mut out = String::new();
        out.push_str("#!/bin/bash\n");
        out.push_str("source /etc/profile\n\n");

        out.push_str("travis_finish() {\n");
        out.push_str("  [ -n \"$travis_finished\" ] && return 0\n");
        out.push_str("  travis_finished=1\n");
        out.push_str(&vars.finish);
        out.push_str("}\n\n");
        out.push_str("trap travis_finish EXIT\n\n");

        out.push_str("travis_terminate() {\n");
        out.push_str("  travis_finish\n");
        out.push_str("  exit $1\n");
        out.push_str("}\n\n");

        out.push_str("travis_result() {\n");
        out.push_str("  local result=$1\n");
        out.push_str("  export TRAVIS_TEST_RESULT=$(( ${TRAVIS_TEST_RESULT:-0} | $(($result != 0)) ))\n");
        out.push_str("  if [ $result -eq 0 ]; then\n");
        out.push_str("    echo -e \"\\n\\033[32;1mThe script command exited with $result.\\033[0m\"\n");
        out.push_str("  else\n");
        out.push_str("    echo -e \"\\n\\033[31;1mThe script command exited with $result.\\033[0m\"\n");
        out.push_str("  fi\n");
        out.push_str("}\n\n");

        out.push_str(&format!("mkdir -p {}\n", vars.build_dir));
        out.push_str(&format!("cd {}\n", vars.build_dir));
        out
    }

    fn footer(&self, _vars: &TemplateVars) -> String {
        let mut out = String::new();
        out.push_str("echo -e \"\\nDone. Your build exited with ${TRAVIS_TEST_RESULT:-0}.\"\n");
        out.push_str("travis_terminate ${TRAVIS_TEST_RESULT:-0}\n");
        out
    }
}
