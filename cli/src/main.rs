use consread::{ReadError, StreamSource, StringSource, Value, forms, read};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::env;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "read> ";
const CONTINUATION_PROMPT: &str = "....> ";

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("consread").join("history"))
}

/// Outcome of reading everything typed so far.
#[derive(Debug)]
enum BufferRead {
    /// Every form in the buffer was read.
    Complete(Vec<Value>),
    /// The buffer stops inside a form; ask for another line.
    Incomplete,
    /// Forms read before the error, then the error itself.
    Failed(Vec<Value>, ReadError),
}

fn read_buffer(buffer: &str) -> BufferRead {
    let mut src = StringSource::new(buffer);
    let mut values = Vec::new();
    loop {
        match read(&mut src, false) {
            Ok(Value::Eof) => return BufferRead::Complete(values),
            Ok(value) => values.push(value),
            Err(e) if e.is_incomplete() => return BufferRead::Incomplete,
            Err(e) => return BufferRead::Failed(values, e),
        }
    }
}

fn repl() -> Result<(), ReadlineError> {
    let mut rl = DefaultEditor::new()?;
    let hist_path = history_path();
    if let Some(ref path) = hist_path {
        if let Some(dir) = path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        let _ = rl.load_history(path);
    }

    println!("consread: type forms to see how they read, Ctrl-D to quit");

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        };
        let line = match rl.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        };

        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }
        buffer.push_str(&line);
        buffer.push('\n');

        match read_buffer(&buffer) {
            BufferRead::Complete(values) => {
                for value in values {
                    println!("{value}");
                }
                buffer.clear();
            }
            BufferRead::Incomplete => tracing::debug!("form incomplete, waiting for more input"),
            BufferRead::Failed(values, e) => {
                for value in values {
                    println!("{value}");
                }
                eprintln!("Read error: {e}");
                buffer.clear();
            }
        }
    }

    if let Some(ref path) = hist_path {
        let _ = rl.save_history(path);
    }
    Ok(())
}

/// Print every form in a file, or stdin for "-".
fn run_stream(target: &str) -> Result<(), String> {
    let result = if target == "-" {
        print_forms(StreamSource::from_reader(io::stdin().lock()))
    } else {
        let file = File::open(target).map_err(|e| format!("Failed to open '{target}': {e}"))?;
        print_forms(StreamSource::from_reader(BufReader::new(file)))
    };
    result.map_err(|e| format!("Read error in '{target}': {e}"))
}

fn print_forms<I>(mut src: StreamSource<I>) -> Result<(), ReadError>
where
    I: Iterator<Item = io::Result<char>>,
{
    for value in forms(&mut src) {
        println!("{}", value?);
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  consread          Start interactive read-print loop");
    eprintln!("  consread <file>   Print every form read from a file");
    eprintln!("  consread -        Print every form read from stdin");
    eprintln!("  consread --help   Show this help message");
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => {
            if let Err(e) = repl() {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        2 => {
            let arg = &args[1];
            if arg == "--help" || arg == "-h" {
                print_usage();
            } else if let Err(e) = run_stream(arg) {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        _ => {
            eprintln!("Error: Too many arguments");
            print_usage();
            process::exit(1);
        }
    }
}
