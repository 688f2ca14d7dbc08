use clap::Parser;
use shbuild::codegen::CodegenOptions;
use shbuild::driver::{self, CompileOptions, Mode};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Compile a CI build payload into a bash build script
#[derive(Parser)]
#[command(name = "shbuild")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Payload file (JSON, or YAML for .yml/.yaml)
    payload: PathBuf,

    /// Write output to file instead of stdout (auto-chmod +x)
    #[arg(short, long = "out", value_name = "FILE")]
    out: Option<PathBuf>,

    /// Check the payload compiles without emitting a script
    #[arg(long, conflicts_with = "emit_ast")]
    check: bool,

    /// Emit the script AST (debug)
    #[arg(long)]
    emit_ast: bool,

    /// Render commands without timing markers
    #[arg(long)]
    no_timing: bool,

    /// Render fold contents inline, without fold markers
    #[arg(long)]
    no_folds: bool,

    /// Directory the build runs in
    #[arg(long, value_name = "DIR")]
    build_dir: Option<String>,

    /// Do not set executable bit on output file
    #[arg(long)]
    no_chmod_x: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();

    let mode = if cli.check {
        Mode::Check
    } else if cli.emit_ast {
        Mode::EmitAst
    } else {
        Mode::Default
    };

    let options = CompileOptions {
        codegen: CodegenOptions {
            timing: !cli.no_timing,
            folds: !cli.no_folds,
        },
        build_dir: cli.build_dir,
        out_path: cli.out.clone(),
        chmod_x: !cli.no_chmod_x,
        mode,
    };

    match driver::compile_file(&cli.payload, options) {
        Ok(out) => {
            // Only the script itself goes to a file; everything else prints.
            if cli.out.is_none() || mode != Mode::Default {
                print!("{}", out);
                if !out.ends_with('\n') {
                    println!();
                }
            }
        }
        Err(e) => {
            eprintln!("{}", e.msg);
            process::exit(e.code);
        }
    }
}
