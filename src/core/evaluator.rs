//! Tree-walking evaluator for parsed templates.
//!
//! A node sequence evaluates in two passes: every alternation in the
//! sequence picks its option first, left to right, then references and
//! conditionals resolve in order. Nested sequences (chosen options,
//! modifier arguments, conditional tests and branches) re-enter the same
//! evaluator.
//!
//! Random draws are therefore not consumed in text order: alternations in
//! an argument, a chosen option or a conditional part are picked only
//! when that inner sequence is evaluated, after the outer sequence's own
//! alternations.

use crate::core::expression::{Conditional, Expression, Node, SymbolRef};
use crate::core::grammar::{Grammar, GrammarError};
use crate::core::trace::TraceEvent;

/// Symbols currently being drawn within one top-level evaluation.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    active: Vec<String>,
}

impl Scope {
    pub(crate) fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|n| n == name)
    }

    pub(crate) fn depth(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn enter(&mut self, name: &str) {
        self.active.push(name.to_string());
    }

    pub(crate) fn leave(&mut self) {
        self.active.pop();
    }

    /// The active chain, closed by `name`.
    pub(crate) fn chain_to(&self, name: &str) -> Vec<String> {
        let mut chain = self.active.clone();
        chain.push(name.to_string());
        chain
    }
}

pub(crate) fn evaluate(
    nodes: &[Node],
    grammar: &mut Grammar,
    scope: &mut Scope,
) -> Result<String, GrammarError> {
    let mut picks = Vec::new();
    for node in nodes {
        if let Node::Alternation(options) = node {
            let chosen = grammar.pick_uniform(options.len());
            grammar.trace(|| TraceEvent::AlternationResolved {
                options: options.len(),
                chosen,
            });
            picks.push(chosen);
        }
    }
    let mut picks = picks.into_iter();

    let mut output = String::new();
    for node in nodes {
        match node {
            Node::Literal(text) => output.push_str(text),
            Node::Alternation(options) => {
                let chosen = picks.next().unwrap_or_default();
                if let Some(option) = options.get(chosen) {
                    output.push_str(&evaluate(option, grammar, scope)?);
                }
            }
            Node::SymbolRef(symbol_ref) => {
                output.push_str(&resolve_ref(symbol_ref, grammar, scope)?);
            }
            Node::Conditional(conditional) => {
                output.push_str(&resolve_conditional(conditional, grammar, scope)?);
            }
        }
    }
    Ok(output)
}

/// Look up the symbol, then run its modifier chain left to right.
fn resolve_ref(
    symbol_ref: &SymbolRef,
    grammar: &mut Grammar,
    scope: &mut Scope,
) -> Result<String, GrammarError> {
    let mut value = grammar.resolve(&symbol_ref.name, false, scope)?;
    for modifier in &symbol_ref.modifiers {
        let mut args = Vec::with_capacity(modifier.args.len());
        for arg in &modifier.args {
            args.push(evaluate(arg, grammar, scope)?);
        }
        value = grammar.apply_modifier(&modifier.name, value, &args);
    }
    Ok(value)
}

fn resolve_conditional(
    conditional: &Conditional,
    grammar: &mut Grammar,
    scope: &mut Scope,
) -> Result<String, GrammarError> {
    let subject = resolve_ref(&conditional.subject, grammar, scope)?;
    let test = evaluate(&conditional.test, grammar, scope)?;
    let holds = conditional.comparison.holds(&subject, &test);
    grammar.trace(|| TraceEvent::ConditionEvaluated {
        subject: subject.clone(),
        test: test.clone(),
        holds,
    });

    let branch = if holds {
        &conditional.when_true
    } else {
        &conditional.when_false
    };
    evaluate(branch, grammar, scope)
}

/// Whether every condition evaluates to a non-empty string.
pub(crate) fn conditions_hold(
    conditions: &[Expression],
    grammar: &mut Grammar,
    scope: &mut Scope,
) -> Result<bool, GrammarError> {
    for condition in conditions {
        if evaluate(condition.nodes(), grammar, scope)?.is_empty() {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::core::grammar::Grammar;
    use crate::core::rng::RandomSource;
    use std::sync::{Arc, Mutex};

    /// Always picks index 0 and remembers the size of every request.
    #[derive(Clone, Default)]
    struct Recorder {
        requests: Arc<Mutex<Vec<usize>>>,
    }

    impl RandomSource for Recorder {
        fn pick_uniform(&mut self, n: usize) -> usize {
            self.requests.lock().unwrap().push(n);
            0
        }

        fn pick_weighted(&mut self, weights: &[u32]) -> usize {
            self.pick_uniform(weights.len())
        }

        fn clone_box(&self) -> Box<dyn RandomSource> {
            Box::new(self.clone())
        }
    }

    fn recorded_grammar() -> (Grammar, Recorder) {
        let recorder = Recorder::default();
        let grammar = Grammar::builder()
            .rng(Box::new(recorder.clone()))
            .symbol("pair", ["x", "y"])
            .build()
            .unwrap();
        (grammar, recorder)
    }

    #[test]
    fn alternations_resolve_before_references() {
        let (mut grammar, recorder) = recorded_grammar();
        assert_eq!(grammar.evaluate("#pair# [a|b|c]").unwrap(), "x a");
        assert_eq!(*recorder.requests.lock().unwrap(), vec![3, 2]);
    }

    #[test]
    fn alternations_left_to_right() {
        let (mut grammar, recorder) = recorded_grammar();
        grammar.evaluate("[a|b] [c|d|e] [f|g|h|i]").unwrap();
        assert_eq!(*recorder.requests.lock().unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn argument_alternations_resolve_on_reentry() {
        let (mut grammar, recorder) = recorded_grammar();
        let out = grammar.evaluate("#pair.join([1|2|3|4|5])# [p|q]").unwrap();
        assert_eq!(out, "x1 p");
        assert_eq!(*recorder.requests.lock().unwrap(), vec![2, 2, 5]);
    }

    #[test]
    fn chosen_option_references_resolve() {
        let (mut grammar, _) = recorded_grammar();
        assert_eq!(grammar.evaluate("[Hi #pair#|Yo]").unwrap(), "Hi x");
    }

    #[test]
    fn conditional_branches_only_evaluate_the_taken_side() {
        let (mut grammar, recorder) = recorded_grammar();
        let out = grammar.evaluate("#?pair=x?yes:[a|b|c|d|e|f|g]#").unwrap();
        assert_eq!(out, "yes");
        assert_eq!(*recorder.requests.lock().unwrap(), vec![2]);
    }
}
