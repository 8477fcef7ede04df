use crate::error::Diagnostics;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};

/// Drives the scan → parse → resolve → interpret pipeline (spec §2, §6).
/// Owns one `Interpreter` across an entire process so the REPL's variable
/// and function definitions persist from one line to the next.
pub struct Lox {
    interpreter: Interpreter,
    diagnostics: Diagnostics,
}

impl Lox {
    pub fn new() -> Self {
        Lox { interpreter: Interpreter::new(), diagnostics: Diagnostics::new() }
    }

    pub fn had_error(&self) -> bool {
        self.diagnostics.had_error()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.diagnostics.had_runtime_error()
    }

    pub fn run_file(&mut self, path: &str) -> Result<()> {
        let source = fs::read_to_string(path).with_context(|| format!("could not read file {path}"))?;
        self.run(&source);
        Ok(())
    }

    /// Reads one line at a time from standard input, echoing a `"> "`
    /// prompt. An empty line or EOF (Ctrl-D) ends the session cleanly
    /// instead of propagating a read error (spec §3's supplemented REPL
    /// UX). `had_error` resets between lines so one bad line doesn't poison
    /// the rest of the session; interpreter state is untouched.
    pub fn run_prompt(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut lock = stdin.lock();
        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut line = String::new();
            let bytes_read = lock.read_line(&mut line)?;
            if bytes_read == 0 {
                println!("exit");
                return Ok(());
            }
            if line.trim_end_matches(['\n', '\r']).is_empty() {
                return Ok(());
            }

            self.run(&line);
            self.diagnostics.reset_error();
            self.diagnostics.reset_runtime_error();
        }
    }

    pub fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan_tokens(&mut self.diagnostics);
        let statements = Parser::new(tokens, &mut self.diagnostics).parse();

        if self.diagnostics.had_error() {
            return;
        }

        let locals = Resolver::new(&mut self.diagnostics).resolve(&statements);
        if self.diagnostics.had_error() {
            return;
        }

        self.interpreter.add_locals(locals);
        self.interpreter.interpret(&statements, &mut self.diagnostics);
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}
