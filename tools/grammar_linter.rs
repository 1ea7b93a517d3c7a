/// Grammar Linter — checks RON grammar files for broken templates and
/// dangling references.
///
/// Usage: grammar_linter <grammar_file_or_dir> [--origin <key>]

use narrative_grammar::core::rules::{self, RuleSet};
use narrative_grammar::{ModifierRegistry, Symbol};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::Path;
use std::process;

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
        println!("Usage: grammar_linter <grammar_file_or_dir> [--origin <key>]");
        process::exit(0);
    }

    let grammar_path = Path::new(&args[1]);
    let mut origin = "origin".to_string();

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--origin" && i + 1 < args.len() {
            i += 1;
            origin = args[i].clone();
        }
        i += 1;
    }

    let mut definitions = BTreeMap::new();
    let mut load_failures = 0;
    if grammar_path.is_file() {
        match rules::load_from_ron(grammar_path) {
            Ok(defs) => definitions.extend(defs),
            Err(e) => {
                eprintln!("ERROR: Failed to load grammar file: {}", e);
                process::exit(1);
            }
        }
    } else if grammar_path.is_dir() {
        load_grammars_recursive(grammar_path, &mut definitions, &mut load_failures);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", grammar_path.display());
        process::exit(1);
    }

    println!("Loaded {} symbols", definitions.len());

    let (mut errors, warnings) = lint_grammar(&definitions, &origin);
    if load_failures > 0 {
        errors.push(format!("{} grammar file(s) failed to load", load_failures));
    }

    println!("\n=== Grammar Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }
    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_grammars_recursive(dir: &Path, definitions: &mut BTreeMap<String, RuleSet>, failures: &mut usize) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_grammars_recursive(&path, definitions, failures);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                match rules::load_from_ron(&path) {
                    Ok(defs) => {
                        println!("  Loaded: {}", path.display());
                        definitions.extend(defs);
                    }
                    Err(e) => {
                        eprintln!("  ERROR loading {}: {}", path.display(), e);
                        *failures += 1;
                    }
                }
            }
        }
    }
}

fn lint_grammar(definitions: &BTreeMap<String, RuleSet>, origin: &str) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let modifiers = ModifierRegistry::english();

    // Symbol name -> names referenced by each of its candidates.
    let mut graph: BTreeMap<&str, Vec<HashSet<String>>> = BTreeMap::new();

    for (name, rule_set) in definitions {
        let symbol = match Symbol::new(rule_set.clone()) {
            Ok(symbol) => symbol,
            Err(e) => {
                errors.push(format!("Symbol '{}' failed to build: {}", name, e));
                continue;
            }
        };

        let mut per_candidate = Vec::new();
        for candidate in symbol.candidates() {
            let Some(template) = candidate.template() else {
                continue;
            };
            let mut referenced = HashSet::new();
            for reference in template.references() {
                if !definitions.contains_key(&reference.name) {
                    warnings.push(format!(
                        "Symbol '{}' references undefined symbol '{}' (expands to empty text)",
                        name, reference.name
                    ));
                }
                for call in &reference.modifiers {
                    if !modifiers.contains(&call.name) {
                        warnings.push(format!(
                            "Symbol '{}' uses unknown modifier '.{}'",
                            name, call.name
                        ));
                    }
                }
                referenced.insert(reference.name.clone());
            }
            per_candidate.push(referenced);
        }

        if !per_candidate.is_empty() && per_candidate.iter().all(|refs| refs.contains(name)) {
            errors.push(format!(
                "Symbol '{}' has no non-recursive candidate (infinite recursion)",
                name
            ));
        }

        if symbol.distribution().uses_weights() && symbol.candidates().iter().all(|c| c.weight() == 0) {
            warnings.push(format!("Symbol '{}' has only zero weights", name));
        }

        graph.insert(name.as_str(), per_candidate);
    }

    if !definitions.contains_key(origin) {
        warnings.push(format!("Origin symbol '{}' is not defined", origin));
        return (errors, warnings);
    }

    // Reachability from the origin.
    let mut reachable: HashSet<&str> = HashSet::new();
    let mut queue = VecDeque::from([origin]);
    while let Some(current) = queue.pop_front() {
        if !reachable.insert(current) {
            continue;
        }
        if let Some(candidates) = graph.get(current) {
            for referenced in candidates.iter().flatten() {
                if let Some((key, _)) = definitions.get_key_value(referenced) {
                    queue.push_back(key.as_str());
                }
            }
        }
    }
    for name in definitions.keys() {
        if !reachable.contains(name.as_str()) {
            warnings.push(format!(
                "Symbol '{}' is unreachable from '{}' (only usable via state or direct expansion)",
                name, origin
            ));
        }
    }

    (errors, warnings)
}
