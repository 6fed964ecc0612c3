use lisg::ast::Value;
use lisg::builtinops::{BuiltinOp, builtin_ops};
use lisg::environment::Environment;
use lisg::evaluator::{ArgumentPassing, EvalConfig};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::panic;
use std::process;

/// Enable with `RUST_LOG=lisg=debug` or `RUST_LOG=lisg=trace`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    init_tracing();

    let result = panic::catch_unwind(|| {
        run_repl();
    });

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(msg) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {msg}");
        } else if let Some(msg) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {msg}");
        } else {
            eprintln!("Error: Unknown panic occurred");
        }

        process::exit(1);
    }
}

fn run_repl() {
    println!("Lisg - a tiny Lisp interpreter");
    println!("Enter expressions like: (+ 1 2)");
    println!("Type :help for more commands, or Ctrl+D to exit.");
    println!();

    let mut rl = DefaultEditor::new().expect("Could not initialize REPL");
    let global = Environment::new_global();
    let mut config = EvalConfig::default();

    loop {
        match rl.readline("lisg> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&global);
                        continue;
                    }
                    ":eager" => {
                        config.argument_passing = ArgumentPassing::Evaluated;
                        println!("Arguments are evaluated before binding.");
                        continue;
                    }
                    ":lazy" => {
                        config.argument_passing = ArgumentPassing::Unevaluated;
                        println!("Arguments are bound unevaluated; use eval to force them.");
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                // The lexer only emits an atom once it sees its terminator
                let source = format!("{line}\n");
                match lisg::run_with_config(&global, &source, &config) {
                    Ok(result) => println!("{result}"),
                    Err(e) => println!("Error: {e}"),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :help   - Show this help message");
    println!("  :env    - Show global bindings");
    println!("  :eager  - Evaluate function arguments before binding them");
    println!("  :lazy   - Bind function arguments unevaluated (default)");
    println!("  :quit   - Exit the interpreter");
    println!("  :exit   - Exit the interpreter");
    println!();
    println!("Forms:");
    println!("  Numbers: 42, -2.5, inf    Strings: \"hi\"    Nil: ()");

    let (special_forms, operators): (Vec<_>, Vec<_>) =
        builtin_ops().iter().partition(|op| op.is_special_form());
    let names = |ops: &[&BuiltinOp]| ops.iter().map(|op| op.name).collect::<Vec<_>>().join(", ");
    println!("  Special forms: {}", names(&special_forms));
    println!("  Arithmetic: {}", names(&operators));
    println!("  (defvar name expr)             - Define a global");
    println!("  (lambda (params...) body...)   - Build a function");
    println!("  (funcall f args...)            - Call a function");
    println!("  (eval expr)                    - Evaluate the value of expr");
    println!();
    println!("Examples:");
    println!("  (defvar sq (lambda (n) (* (eval n) (eval n))))");
    println!("  (sq (+ 1 2))");
    println!();
}

fn print_environment(env: &Environment) {
    let bindings = env.bindings();

    if bindings.is_empty() {
        println!("Environment is empty.");
        return;
    }

    let (functions, values): (Vec<_>, Vec<_>) = bindings
        .into_iter()
        .partition(|(_, value)| matches!(value, Value::Function { .. }));

    if !functions.is_empty() {
        println!("Functions ({}):", functions.len());
        for (name, value) in functions {
            println!("  {name} = {value}");
        }
    }

    if !values.is_empty() {
        println!("Values ({}):", values.len());
        for (name, value) in values {
            println!("  {name} = {value}");
        }
    }
}
