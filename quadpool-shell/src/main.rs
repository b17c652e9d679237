//! Runs record commands from a script file or stdin.

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

use quadpool::PageStore;
use quadpool_shell::{Interpreter, DEFAULT_POOL_BYTES};

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args().skip(1);
    let script = args.next();
    let pool_bytes = match args.next() {
        None => DEFAULT_POOL_BYTES,
        Some(arg) => match arg.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                eprintln!("usage: quadpool-shell [script] [pool-bytes]");
                return ExitCode::FAILURE;
            }
        },
    };

    let mut interpreter = Interpreter::in_memory(pool_bytes);
    match script {
        Some(path) => match File::open(&path) {
            Ok(file) => run(&mut interpreter, BufReader::new(file)),
            Err(e) => {
                eprintln!("cannot open '{path}': {e}");
                ExitCode::FAILURE
            }
        },
        None => run(&mut interpreter, io::stdin().lock()),
    }
}

fn run<S: PageStore>(interpreter: &mut Interpreter<S>, reader: impl BufRead) -> ExitCode {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if let Some(output) = interpreter.execute(&line) {
                    println!("{output}");
                }
            }
            Err(e) => {
                eprintln!("read error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
