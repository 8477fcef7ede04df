mod environment;
mod error;
mod expr;
mod interpreter;
mod lox;
mod native_functions;
mod parser;
mod resolver;
mod scanner;
mod stmt;
mod token;
mod value;

use lox::Lox;
use std::env;
use std::process::exit;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut lox = Lox::new();
    let result = match args.len() {
        1 => lox.run_prompt(),
        2 => lox.run_file(&args[1]),
        _ => {
            eprintln!("Usage: lox [script]");
            exit(64);
        }
    };

    if let Err(err) = result {
        eprintln!("{err:#}");
        exit(74);
    }

    if lox.had_error() {
        exit(65);
    }
    if lox.had_runtime_error() {
        exit(70);
    }
}
