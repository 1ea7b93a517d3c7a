/// Preview — interactive expansion shell for testing grammars.
///
/// Usage: preview --grammar <path> [--seed <n>] [--origin <key>]
///
/// Commands:
///   expand [key]          expand a symbol, reusing its cached value
///   force [key]           expand a symbol, drawing a fresh value
///   set <name> <text>     replace a symbol's rules with one template
///   value <name> <text>   assign a symbol's cached value directly
///   reset <name>          return a symbol's candidates to its deck
///   eval <template>       evaluate ad hoc template text
///   bulk <n> [key]        force-expand n times with variety stats
///   seed <n>              rebuild the grammar with a new seed
///   symbols               list symbols and their distributions
///   help                  list commands
///   quit                  exit
use narrative_grammar::{Grammar, GrammarBuilder};
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut grammar_path = None;
    let mut origin = "origin".to_string();
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--grammar" if i + 1 < args.len() => {
                i += 1;
                grammar_path = Some(args[i].clone());
            }
            "--origin" if i + 1 < args.len() => {
                i += 1;
                origin = args[i].clone();
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let files = match grammar_path {
        Some(ref path) => collect_grammar_files(Path::new(path)),
        None => {
            eprintln!("ERROR: --grammar is required");
            print_usage();
            std::process::exit(1);
        }
    };

    let mut current_seed = seed;
    let mut grammar = match build_grammar(&files, &origin, current_seed) {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded {} symbols from {} file(s)", grammar.symbol_names().len(), files.len());
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "expand" | "force" => {
                let key = if rest.is_empty() { origin.as_str() } else { rest };
                match grammar.expand_symbol(key, cmd == "force") {
                    Ok(text) => {
                        println!("\n--- {} ---", key);
                        println!("{}", text);
                        println!("--- End ---\n");
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "set" | "value" => {
                let Some((name, text)) = rest.split_once(char::is_whitespace) else {
                    println!("Usage: {} <name> <text>", cmd);
                    continue;
                };
                if cmd == "set" {
                    match grammar.set(name, text.trim()) {
                        Ok(()) => println!("Rules for '{}' replaced", name),
                        Err(e) => println!("ERROR: {}", e),
                    }
                } else {
                    grammar.set_value(name, text.trim());
                    println!("Value of '{}' set", name);
                }
            }
            "reset" => {
                if rest.is_empty() {
                    println!("Usage: reset <name>");
                } else if grammar.reset(rest) {
                    println!("Deck for '{}' reset", rest);
                } else {
                    println!("Unknown symbol: {}", rest);
                }
            }
            "eval" => match grammar.evaluate(rest) {
                Ok(text) => println!("{}", text),
                Err(e) => println!("ERROR: {}", e),
            },
            "seed" => {
                if rest.is_empty() {
                    println!("Current seed: {}", current_seed);
                    continue;
                }
                match rest.parse::<u64>() {
                    Ok(s) => match build_grammar(&files, &origin, s) {
                        Ok(rebuilt) => {
                            current_seed = s;
                            grammar = rebuilt;
                            println!("Seed set to {}", current_seed);
                        }
                        Err(e) => println!("ERROR: {}", e),
                    },
                    Err(_) => println!("Invalid seed: {}", rest),
                }
            }
            "bulk" => {
                let mut parts = rest.split_whitespace();
                let count: usize = match parts.next().map(str::parse) {
                    Some(Ok(n)) if n > 0 => n,
                    _ => {
                        println!("Usage: bulk <n> [key]");
                        continue;
                    }
                };
                let key = parts.next().unwrap_or(origin.as_str()).to_string();
                print_bulk_stats(&files, &origin, current_seed, count, &key);
            }
            "symbols" => {
                for name in grammar.symbol_names() {
                    if let Some(symbol) = grammar.symbol(name) {
                        let remaining = symbol
                            .remaining()
                            .map(|n| format!(", {} left", n))
                            .unwrap_or_default();
                        println!(
                            "  {:<20} {} candidate(s), {}{}",
                            name,
                            symbol.candidates().len(),
                            symbol.distribution(),
                            remaining
                        );
                    }
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn print_usage() {
    println!("Usage: preview --grammar <path> [--seed <n>] [--origin <key>]");
    println!();
    println!("Options:");
    println!("  --grammar <path>   RON grammar file or directory of .ron files");
    println!("  --seed <n>         Initial RNG seed (default: 42)");
    println!("  --origin <key>     Symbol expanded by default (default: origin)");
}

fn print_help() {
    println!("Commands:");
    println!("  expand [key]         Expand a symbol, reusing its cached value");
    println!("  force [key]          Expand a symbol, drawing a fresh value");
    println!("  set <name> <text>    Replace a symbol's rules with one template");
    println!("  value <name> <text>  Assign a symbol's cached value directly");
    println!("  reset <name>         Return a symbol's candidates to its deck");
    println!("  eval <template>      Evaluate ad hoc template text");
    println!("  bulk <n> [key]       Force-expand n times with variety statistics");
    println!("  seed <n>             Rebuild the grammar with a new seed");
    println!("  symbols              List symbols and their distributions");
    println!("  help                 Show this help");
    println!("  quit                 Exit");
}

/// Force-expand `key` on a fresh grammar and report how varied the output is.
fn print_bulk_stats(files: &[PathBuf], origin: &str, seed: u64, count: usize, key: &str) {
    let mut grammar = match build_grammar(files, origin, seed) {
        Ok(grammar) => grammar,
        Err(e) => {
            println!("ERROR: {}", e);
            return;
        }
    };

    let mut passages = Vec::new();
    let mut errors = 0;
    for _ in 0..count {
        match grammar.expand_symbol(key, true) {
            Ok(text) => passages.push(text),
            Err(_) => errors += 1,
        }
    }

    println!("\n=== Bulk Expansion: {} passages ({} errors) ===\n", passages.len(), errors);

    let unique: HashSet<&String> = passages.iter().collect();
    println!("Unique passages: {} / {}", unique.len(), passages.len());

    let empty = passages.iter().filter(|p| p.is_empty()).count();
    if empty > 0 {
        println!("Empty passages: {}", empty);
    }

    let avg_len = if passages.is_empty() {
        0.0
    } else {
        passages.iter().map(|p| p.len()).sum::<usize>() as f64 / passages.len() as f64
    };
    println!("Average length: {:.1} chars", avg_len);

    println!("\nSamples:");
    for passage in passages.iter().take(5) {
        println!("  {}", passage);
    }
    println!();
}

fn build_grammar(files: &[PathBuf], origin: &str, seed: u64) -> Result<Grammar, narrative_grammar::GrammarError> {
    let builder: GrammarBuilder = files
        .iter()
        .fold(Grammar::builder().seed(seed).origin(origin), |builder, file| {
            builder.grammar_file(file)
        });
    builder.build()
}

fn collect_grammar_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if path.is_file() {
        files.push(path.to_path_buf());
    } else if path.is_dir() {
        collect_grammar_files_recursive(path, &mut files);
        files.sort();
    } else {
        eprintln!("ERROR: Path '{}' does not exist", path.display());
        std::process::exit(1);
    }
    files
}

fn collect_grammar_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_grammar_files_recursive(&path, files);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                files.push(path);
            }
        }
    }
}
