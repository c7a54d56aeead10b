use std::{fs::read_to_string, path::PathBuf, process::ExitCode};

use clap::{Parser as CliParser, ValueEnum};
use colored::Colorize;
use rustyline::{Editor, error::ReadlineError, history::DefaultHistory};

use sigil::{
    env::{EnvRef, Environment},
    eval, parse, preprocess,
    repl_complete::LispHelper,
    value::Value,
};

#[derive(Debug, Clone, ValueEnum)]
enum Mode {
    /// Runs an interactive REPL.
    Repl,
    /// Interprets the input file and prints each non-nil top-level result.
    Run,
}

#[derive(CliParser)]
struct Cli {
    /// Program mode.
    #[arg(value_enum)]
    mode: Mode,

    /// Input file path.
    #[arg(short, long, value_name = "FILE")]
    input_path: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let env = Environment::new();

    match cli.mode {
        Mode::Run => {
            let Some(path) = cli.input_path else {
                eprintln!("{}", "no input file to run".red());
                return ExitCode::FAILURE;
            };
            run_file(&path, &env)
        }
        Mode::Repl => repl(&env),
    }
}

fn run_file(path: &PathBuf, env: &EnvRef) -> ExitCode {
    let source = match read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{}", format!("cannot read {}: {err}", path.display()).red());
            return ExitCode::FAILURE;
        }
    };

    let (mut program, errors) = parse(&source);
    if !errors.is_empty() {
        for error in errors {
            eprintln!("{}", error.to_string().red());
        }
        return ExitCode::FAILURE;
    }

    preprocess::define_macros(&mut program, env);
    if let Err(err) = preprocess::expand_macros(&mut program, env) {
        eprintln!("{}", err.to_string().red());
        return ExitCode::FAILURE;
    }

    for expression in &program.expressions {
        let value = eval::eval(expression, env);
        if value.is_error() {
            eprintln!("{}", value.to_string().red());
            return ExitCode::FAILURE;
        }
        if value != Value::Nil {
            println!("{value}");
        }
    }
    ExitCode::SUCCESS
}

fn repl(env: &EnvRef) -> ExitCode {
    let mut editor: Editor<LispHelper, DefaultHistory> = match Editor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("{}", format!("cannot start line editor: {err}").red());
            return ExitCode::FAILURE;
        }
    };
    editor.set_helper(Some(LispHelper::new()));

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "> " } else { "... " };
        match editor.readline(prompt) {
            Ok(line) => {
                buffer.push_str(&line);
                buffer.push('\n');

                let (mut program, errors) = parse(&buffer);
                // An unterminated form just means more lines are coming.
                if errors.iter().any(|error| error.is_eof()) {
                    continue;
                }
                let _ = editor.add_history_entry(buffer.trim_end());
                let broken = !errors.is_empty();
                buffer.clear();
                if broken {
                    for error in errors {
                        eprintln!("{}", error.to_string().red());
                    }
                    continue;
                }

                preprocess::define_macros(&mut program, env);
                if let Err(err) = preprocess::expand_macros(&mut program, env) {
                    eprintln!("{}", err.to_string().red());
                    continue;
                }
                for expression in &program.expressions {
                    let value = eval::eval(expression, env);
                    if value.is_error() {
                        eprintln!("{}", value.to_string().red());
                        break;
                    }
                    if value != Value::Nil {
                        println!("{value}");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("read error: {err}").red());
                break;
            }
        }
    }
    ExitCode::SUCCESS
}
