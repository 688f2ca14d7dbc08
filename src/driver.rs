use crate::codegen::CodegenOptions;
use crate::config::PayloadResolver;
use crate::script::{self, Compiler};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Default,
    Check,
    EmitAst,
}

#[derive(Debug)]
pub struct CompileOptions {
    pub codegen: CodegenOptions,
    pub build_dir: Option<String>,
    pub out_path: Option<PathBuf>,
    pub chmod_x: bool,
    pub mode: Mode,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            codegen: CodegenOptions::default(),
            build_dir: None,
            out_path: None,
            chmod_x: false,
            mode: Mode::Default,
        }
    }
}

#[derive(Debug)]
pub struct DriverError {
    pub code: i32,
    pub msg: String,
}

impl DriverError {
    fn compile(msg: String) -> Self {
        Self { code: 2, msg }
    }

    fn io(msg: String) -> Self {
        Self { code: 1, msg }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

/// Reads a payload file. `.yml`/`.yaml` files are parsed as YAML, anything
/// else as JSON.
pub fn load_payload(path: &Path) -> Result<Value, DriverError> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| DriverError::io(format!("Unable to read file: {} ({})", path.display(), e)))?;

    let parsed = if is_yaml(path) {
        serde_yaml::from_str::<Value>(&src).map_err(|e| e.to_string())
    } else {
        serde_json::from_str::<Value>(&src).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| DriverError::compile(format!("compile error: invalid payload {}: {}", path.display(), e)))
}

pub fn compile_file(path: &Path, options: CompileOptions) -> Result<String, DriverError> {
    if !path.exists() {
        return Err(DriverError::io(format!("File not found: {}", path.display())));
    }
    let payload = load_payload(path)?;
    debug!(path = %path.display(), mode = ?options.mode, "compiling payload");

    let mut compile_options = script::CompileOptions {
        codegen: options.codegen,
        ..Default::default()
    };
    if let Some(dir) = options.build_dir {
        compile_options.build_dir = dir;
    }
    let compiler = Compiler::new().with_options(compile_options);
    let resolver = PayloadResolver::new(payload);

    let compiled = compiler
        .build(&resolver)
        .map_err(|e| DriverError::compile(e.to_string()))?;

    match options.mode {
        Mode::EmitAst => return Ok(format!("{:#?}", compiled.body)),
        Mode::Check => return Ok("OK".to_string()),
        Mode::Default => {}
    }

    let out = compiler.render(&compiled);

    if let Some(out_path) = &options.out_path {
        std::fs::write(out_path, &out)
            .map_err(|e| DriverError::io(format!("Failed to write to {}: {}", out_path.display(), e)))?;

        #[cfg(unix)]
        {
            if options.chmod_x {
                if let Ok(metadata) = std::fs::metadata(out_path) {
                    let mut perms = metadata.permissions();
                    perms.set_mode(perms.mode() | 0o111);
                    let _ = std::fs::set_permissions(out_path, perms);
                }
            }
        }
    }

    Ok(out)
}
