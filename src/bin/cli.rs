//! EmberKV CLI Client
//!
//! Runs a single command, or an interactive prompt when none is given.

use std::io::{self, BufRead, Write};

use clap::Parser;
use emberkv::config::DEFAULT_ADDR;
use emberkv::{Client, EmberError, Reply};

/// EmberKV CLI
#[derive(Parser, Debug)]
#[command(name = "emberkv-cli")]
#[command(about = "CLI for the EmberKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = DEFAULT_ADDR)]
    server: String,

    /// Command and arguments to run once, e.g. `SET foo bar`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error connecting to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    if !args.command.is_empty() {
        if !run(&mut client, &args.command) {
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = repl(&mut client) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn repl(client: &mut Client) -> io::Result<()> {
    println!("Connected to EmberKV. Type 'exit' or 'quit' to leave.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("emberkv> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                println!();
                break;
            }
        };

        let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        match words.first().map(|w| w.to_ascii_lowercase()).as_deref() {
            None => continue,
            Some("exit") | Some("quit") => break,
            Some(_) => {
                if !run(client, &words) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Run one command and print its reply
///
/// Returns false once the connection is no longer usable.
fn run(client: &mut Client, words: &[String]) -> bool {
    match client.execute(words) {
        Ok(reply) => {
            println!("{}", format_reply(&reply));
            true
        }
        Err(EmberError::Remote(message)) => {
            println!("(error) {}", message);
            true
        }
        Err(e) => {
            eprintln!("Connection error: {}", e);
            false
        }
    }
}

fn format_reply(reply: &Reply) -> String {
    match reply {
        Reply::Integer(n) => format!("(integer) {}", n),
        Reply::Bulk(value) => format!("\"{}\"", String::from_utf8_lossy(value)),
        Reply::Nil => "(nil)".to_string(),
        Reply::Array(items) if items.is_empty() => "(empty array)".to_string(),
        Reply::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Some(value) => format!("{}) \"{}\"", i + 1, String::from_utf8_lossy(value)),
                None => format!("{}) (nil)", i + 1),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Reply::Error(message) => format!("(error) {}", message),
    }
}
