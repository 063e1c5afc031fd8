mod lib;
use anyhow::{bail, Result};
use clap::Parser as ClapParser;
use lib::environment::{Env, Environment};
use lib::interpreter::eval;
use lib::parser::parse_program;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
struct Args {
    /// Monkey source file to run; omit for an interactive session.
    file: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    if let Err(why) = match args.file {
        Some(pbuf) => run_file(pbuf),
        None => run_prompt(),
    } {
        eprintln!("ERROR: {}", why);
    }
}

fn run_file(path: PathBuf) -> Result<()> {
    if !path.exists() || !path.is_file() {
        bail!("Path does not exist or is not a valid file.");
    }
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => bail!("Failed to read file."),
    };
    let env = Environment::new();
    run(&content, &env)
}

fn print_prompt() -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if let Err(why) = handle.write(b">> ") {
        bail!("Failed to write prompt to console.\n\nCaused by:\n{:#?}", why);
    }
    if let Err(why) = handle.flush() {
        bail!("Failed to flush prompt to console.\n\nCaused by:\n{:#?}", why);
    }
    Ok(())
}

fn run_prompt() -> Result<()> {
    println!("Monkey interpreter. One expression or statement per line.");
    let stdin = std::io::stdin();
    // One environment for the whole session, so bindings persist across
    // successive inputs.
    let env = Environment::new();
    print_prompt()?;
    for line in stdin.lock().lines() {
        match line {
            Ok(l) => run(&l, &env)?,
            Err(_) => bail!("Failed to read line"),
        }
        print_prompt()?;
    }
    Ok(())
}

fn run(script: &str, env: &Env) -> Result<()> {
    let (program, errors) = parse_program(script);
    if !errors.is_empty() {
        // Show every parse error and skip evaluation entirely.
        for err in &errors {
            println!("parse error: {}", err);
        }
        return Ok(());
    }
    let result = eval(&program, env);
    println!("{}", result.inspect());
    Ok(())
}
