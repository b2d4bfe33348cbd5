mod ast;
mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod hash;
mod highlighter;
mod lexer;
mod module;
mod parser;
mod token;
mod value;

use clap::Parser as ClapParser;
use config::{HISTORY_FILE, REPL_BANNER, REPL_PROMPT, VERSION};
use env::Environment;
use error::ZoxError;
use eval::Evaluator;
use highlighter::ZoxHelper;
use lexer::Lexer;
use module::{ModuleResolver, ModuleSource};
use parser::Parser as ZoxParser;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use value::{Function, Value};

/// Interpreter for Zox, a small dynamically-typed scripting language.
#[derive(ClapParser, Debug)]
#[command(name = "zox")]
#[command(version = VERSION)]
#[command(about = "Zox interpreter: run a script, or start the REPL with no arguments")]
struct CliArgs {
    /// Script file to execute; omit to start the REPL.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

/// Resolves a dotted module name to a `<path>.zo` file by searching, in
/// order, the current directory, `./packages`, and a system packages
/// directory -- grounded on the reference interpreter's module search
/// order. The illustrative `math` module is resolved natively instead of
/// hitting the filesystem.
struct FilesystemResolver {
    search_paths: Vec<PathBuf>,
}

impl FilesystemResolver {
    fn new() -> Self {
        let search_paths = if cfg!(windows) {
            vec![
                PathBuf::from("."),
                PathBuf::from(r".\packages"),
                PathBuf::from(r"C:\Program Files\Zox\packages"),
            ]
        } else {
            vec![
                PathBuf::from("."),
                PathBuf::from("./packages"),
                PathBuf::from("/usr/local/lib/zox/packages"),
            ]
        };
        FilesystemResolver { search_paths }
    }

    fn module_path(&self, module_name: &str) -> Option<PathBuf> {
        let relative = format!("{}.zo", module_name.replace('.', std::path::MAIN_SEPARATOR_STR));
        self.search_paths.iter().map(|dir| dir.join(&relative)).find(|path| path.exists())
    }
}

impl ModuleResolver for FilesystemResolver {
    fn resolve(&self, module_name: &str) -> Option<ModuleSource> {
        if module_name == "math" {
            return Some(builtins::math_module());
        }
        let path = self.module_path(module_name)?;
        std::fs::read_to_string(path).ok().map(ModuleSource::Source)
    }
}

fn main() {
    let args = CliArgs::parse();
    match args.script {
        Some(path) => run_script(&path),
        None => run_repl(),
    }
}

fn run_source(source: &str, env: &Rc<Environment>, evaluator: &Evaluator) -> Result<Value, ZoxError> {
    let tokens = Lexer::tokenize(source)?;
    let program = ZoxParser::parse(tokens)?;
    evaluator.eval_program(&program, env)
}

/// Prints a non-nil REPL result through the registered `println` built-in
/// rather than Rust's own `println!`, so host-customized output routing is
/// honored the same way it would be for user-called `println(...)`.
fn print_via_builtin(env: &Rc<Environment>, value: Value) {
    if let Ok(Value::Function(func)) = env.lookup("println") {
        if let Function::Native { func, .. } = func.as_ref() {
            let _ = func(env, &[value]);
            return;
        }
    }
    println!("{value}");
}

fn run_script(path: &Path) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read script file {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    let env = Environment::global();
    if let Err(e) = builtins::register_globals(&env) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    let evaluator = Evaluator::with_resolver(Rc::new(FilesystemResolver::new()));

    if let Err(e) = run_source(&source, &env, &evaluator) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_repl() {
    let env = Environment::global();
    if let Err(e) = builtins::register_globals(&env) {
        eprintln!("Error: {e}");
        return;
    }
    let evaluator = Evaluator::with_resolver(Rc::new(FilesystemResolver::new()));

    let config = Config::builder().auto_add_history(true).build();
    let mut rl = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: failed to initialize REPL: {e}");
            return;
        }
    };
    rl.set_helper(Some(ZoxHelper::new()));
    let _ = rl.load_history(HISTORY_FILE);

    print!("{REPL_BANNER}");

    loop {
        match rl.readline(REPL_PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed == ";" {
                    continue;
                }
                if trimmed == "exit" {
                    break;
                }
                match run_source(&line, &env, &evaluator) {
                    Ok(value) => {
                        if value != Value::Nil {
                            print_via_builtin(&env, value);
                        }
                    }
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
}
