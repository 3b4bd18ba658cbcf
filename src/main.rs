use std::{fs, path::PathBuf, process::ExitCode, rc::Rc, sync::Once};

use ckl::{
    Interpreter, SCRIPT_FILENAME,
    error::Error,
    interpreter::{module::FileSourceProvider, value::core::Value},
};
use clap::Parser;

/// ckl is a small dynamic scripting language with closures, structured
/// errors and modules.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells ckl to look at a file instead of a script.
    #[arg(short, long)]
    file: bool,

    /// Pipe mode is a feature that automatically prints out the value of the
    /// last statement of a script.
    #[arg(short, long)]
    pipe_mode: bool,

    /// Directory searched by `require`. May be given several times.
    #[arg(short, long, env = "CKL_MODULE_PATH", value_delimiter = ':')]
    module_path: Vec<PathBuf>,

    contents: String,
}

static TRACING_INIT: Once = Once::new();

/// Installs a log subscriber, but only when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
                    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

                    if std::env::var("RUST_LOG").is_ok() {
                        tracing_subscriber::registry().with(fmt::layer().with_target(true)
                                                                        .with_level(true)
                                                                        .with_writer(std::io::stderr))
                                                      .with(EnvFilter::from_default_env())
                                                      .init();
                    }
                });
}

fn report(error: &Error) {
    eprintln!("{error}");
    if let Error::Runtime(e) = error {
        eprint!("{}", e.render_stacktrace());
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let mut search_dirs = args.module_path;
    let (script, filename) = if args.file {
        let path = PathBuf::from(&args.contents);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            search_dirs.insert(0, dir.to_path_buf());
        }
        match fs::read_to_string(&path) {
            Ok(script) => (script, args.contents),
            Err(_) => {
                eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                          &args.contents);
                return ExitCode::FAILURE;
            },
        }
    } else {
        (args.contents, SCRIPT_FILENAME.to_string())
    };

    let interpreter = Interpreter::with_source_provider(Rc::new(FileSourceProvider::new(search_dirs)));
    match interpreter.eval(&script, &filename) {
        Ok(value) => {
            if args.pipe_mode && !matches!(value, Value::Null) {
                println!("{value}");
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        },
    }
}
