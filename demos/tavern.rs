/// Tavern example: arrivals, gossip from a finite pool, and a bouncer
/// whose lines depend on the room's mood.
///
/// Run with: cargo run --example tavern

use narrative_grammar::{Grammar, Rule, RuleSet, TraceEvent, TraceLog};
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let log = Arc::new(TraceLog::new());
    let mut grammar = Grammar::builder()
        .seed(2026)
        .grammar_file("grammar_data/tavern.ron")
        .tracer(log.clone())
        .build()
        .expect("Failed to load tavern grammar");

    // --- Arrivals: each forced expansion draws a fresh scene ---
    println!("=== Arrivals ===\n");
    for _ in 0..4 {
        let scene = grammar
            .expand_symbol("origin", true)
            .expect("Failed to expand origin");
        println!("  {}", scene);
    }

    // --- Gossip runs dry until the pool is reset ---
    println!("\n=== Gossip ===\n");
    for _ in 0..5 {
        let gossip = grammar
            .expand_symbol("gossip", true)
            .expect("Failed to expand gossip");
        // gossip caches the rumour it read, so draw the rumour itself too.
        let rumour = grammar
            .expand_symbol("rumour", true)
            .expect("Failed to expand rumour");
        if rumour.is_empty() {
            println!("  (the room has nothing left to say)");
        } else {
            println!("  {}  /  also heard: {}", gossip, rumour);
        }
    }
    grammar.reset("rumour");
    println!("  [rumours reset]");
    println!(
        "  {}",
        grammar.evaluate("They say #rumour.capitalize#.").expect("Failed to evaluate")
    );

    // --- The bouncer reads the mood ---
    println!("\n=== The Door ===\n");
    for mood in ["calm", "tense", "rowdy"] {
        grammar.set_value("mood", mood);
        let line = grammar
            .expand_symbol("bouncer", true)
            .expect("Failed to expand bouncer");
        println!("  mood={:<6} bouncer: {}", mood, line);
    }

    // --- Reassigning a symbol changes later expansions ---
    println!("\n=== A Regular ===\n");
    grammar
        .set("traveler", RuleSet::new(vec![Rule::new("Bilbo")]))
        .expect("Failed to set traveler");
    grammar.register_modifier("shout", |value, _| format!("{}!!", value.to_uppercase()));
    println!(
        "  {}",
        grammar
            .evaluate("#greeting.capitalize#, #traveler.shout#")
            .expect("Failed to evaluate")
    );

    // --- What the tracer saw ---
    let events = log.events();
    let drawn = events
        .iter()
        .filter(|e| matches!(e, TraceEvent::SymbolResolved { cached: false, .. }))
        .count();
    let exhausted = events
        .iter()
        .filter(|e| matches!(e, TraceEvent::DistributionExhausted { .. }))
        .count();
    println!("\n=== Trace ===\n");
    println!("  {} events, {} fresh draws, {} exhausted draws", events.len(), drawn, exhausted);
}
