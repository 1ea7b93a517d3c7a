//! Distribution behaviour observed through forced symbol expansion.

use narrative_grammar::{Distribution, Grammar, Rule, RuleSet};
use std::collections::HashSet;

fn grammar_with(seed: u64, rules: RuleSet) -> Grammar {
    Grammar::builder().seed(seed).symbol("x", rules).build().unwrap()
}

fn draws(grammar: &mut Grammar, n: usize) -> Vec<String> {
    (0..n).map(|_| grammar.expand_symbol("x", true).unwrap()).collect()
}

#[test]
fn pop_draws_each_once_then_empty() {
    for seed in 0..10 {
        let mut grammar = grammar_with(seed, RuleSet::from(["A", "B"]).with_distribution(Distribution::Pop));
        let out = draws(&mut grammar, 3);
        let first_two: HashSet<&str> = out[..2].iter().map(String::as_str).collect();
        assert_eq!(first_two, HashSet::from(["A", "B"]));
        assert_eq!(out[2], "");

        assert!(grammar.reset("x"));
        let again = grammar.expand_symbol("x", true).unwrap();
        assert!(again == "A" || again == "B");
    }
}

#[test]
fn shuffle_cycles_without_reset() {
    for seed in 0..10 {
        let mut grammar = grammar_with(
            seed,
            RuleSet::from(["A", "B", "C"]).with_distribution(Distribution::Shuffle),
        );
        let out = draws(&mut grammar, 9);
        for cycle in out.chunks(3) {
            let seen: HashSet<&str> = cycle.iter().map(String::as_str).collect();
            assert_eq!(seen, HashSet::from(["A", "B", "C"]));
        }
        for pair in out.windows(2) {
            assert_ne!(pair[0], pair[1], "immediate repeat in {:?}", out);
        }
    }
}

#[test]
fn pop_weighted_counts() {
    for seed in 0..10 {
        let rules = vec![Rule::weighted("foo", 4), Rule::weighted("bar", 1)];
        let mut grammar = grammar_with(seed, RuleSet::new(rules).with_distribution(Distribution::PopWeighted));
        let out = draws(&mut grammar, 6);
        assert_eq!(out.iter().filter(|s| *s == "foo").count(), 4);
        assert_eq!(out.iter().filter(|s| *s == "bar").count(), 1);
        assert_eq!(out.iter().filter(|s| s.is_empty()).count(), 1);
        assert_eq!(out[5], "");
    }
}

#[test]
fn weighted_follows_weights() {
    let rules = vec![Rule::weighted("common", 9), Rule::weighted("rare", 1)];
    let mut grammar = grammar_with(4, RuleSet::new(rules).with_distribution(Distribution::Weighted));
    let out = draws(&mut grammar, 2000);
    let common = out.iter().filter(|s| *s == "common").count();
    assert!((1650..=1950).contains(&common), "common drawn {} times", common);
}

#[test]
fn weighted_accepts_weights_summing_past_u32() {
    let rules = vec![Rule::weighted("a", 3_000_000_000), Rule::weighted("b", 3_000_000_000)];
    let mut grammar = grammar_with(6, RuleSet::new(rules).with_distribution(Distribution::Weighted));
    let out: HashSet<String> = draws(&mut grammar, 100).into_iter().collect();
    assert_eq!(out, HashSet::from(["a".to_string(), "b".to_string()]));
}

#[test]
fn uniform_ignores_weights() {
    let rules = vec![Rule::weighted("left", 50), Rule::weighted("right", 1)];
    let mut grammar = grammar_with(8, RuleSet::new(rules));
    let out = draws(&mut grammar, 2000);
    let left = out.iter().filter(|s| *s == "left").count();
    assert!((850..=1150).contains(&left), "left drawn {} times", left);
}

#[test]
fn exhausted_pop_inside_a_template() {
    let mut grammar = Grammar::builder()
        .seed(1)
        .symbol("prize", RuleSet::from(["gold"]).with_distribution(Distribution::Pop))
        .symbol("origin", "You win: #prize#.")
        .build()
        .unwrap();
    assert_eq!(grammar.expand_symbol("origin", true).unwrap(), "You win: gold.");

    // The cached prize is reused until it is drawn again.
    assert_eq!(grammar.expand_symbol("origin", true).unwrap(), "You win: gold.");
    assert_eq!(grammar.expand_symbol("prize", true).unwrap(), "");
    assert_eq!(grammar.expand_symbol("origin", true).unwrap(), "You win: .");
}

#[test]
fn conditions_apply_to_decks() {
    let mut grammar = Grammar::builder()
        .seed(6)
        .state("armed", "")
        .symbol(
            "x",
            RuleSet::new(vec![Rule::new("sword").when("#armed#"), Rule::new("fists")])
                .with_distribution(Distribution::Pop),
        )
        .build()
        .unwrap();
    assert_eq!(grammar.expand_symbol("x", true).unwrap(), "fists");
    assert_eq!(grammar.expand_symbol("x", true).unwrap(), "");

    grammar.set_value("armed", "yes");
    assert_eq!(grammar.expand_symbol("x", true).unwrap(), "sword");
}
