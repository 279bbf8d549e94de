// stax: a tiny stack-language interpreter with a flat memory model

use std::fs;
use std::io;
use std::path::Path;

use stax::interpreter::engine::Interpreter;
use stax::parser::Parser;
use stax::FIB_DEMO;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // With no arguments, run the bundled Fibonacci demo; otherwise
    // interpret the given source file.
    let source = match std::env::args().nth(1) {
        Some(path) => {
            if !Path::new(&path).exists() {
                let args: Vec<String> = std::env::args().collect();
                let program_name = args.first().map(|s| s.as_str()).unwrap_or("stax");
                eprintln!("Error: File '{}' not found", path);
                eprintln!();
                eprintln!("Usage: {} [file.stx]", program_name);
                eprintln!();
                eprintln!("With no file, {} runs the bundled Fibonacci demo.", program_name);
                std::process::exit(1);
            }
            fs::read_to_string(&path)?
        }
        None => FIB_DEMO.to_string(),
    };

    let program = match Parser::new(&source) {
        Ok(mut parser) => match parser.parse_program() {
            Ok(program) => program,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut interpreter = Interpreter::new(program, stdout.lock());
    if let Err(e) = interpreter.run() {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
