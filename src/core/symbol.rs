//! Symbols: named, stateful sources of text drawn from weighted candidates.

use std::fmt;
use std::sync::Arc;

use crate::core::distribution::{Distribution, Sampler};
use crate::core::expression::{Expression, ExpressionError};
use crate::core::grammar::GrammarError;
use crate::core::rng::RandomSource;
use crate::core::rules::{RuleSet, RuleSource, TextGenerator};

#[derive(Clone)]
enum Body {
    Template(Arc<Expression>),
    Generated(TextGenerator),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Template(expression) => f.debug_tuple("Template").field(&expression.source()).finish(),
            Body::Generated(_) => f.write_str("Generated"),
        }
    }
}

/// One rule of a symbol: a template and its weight. Immutable.
#[derive(Debug, Clone)]
pub struct Candidate {
    body: Body,
    weight: u32,
}

impl Candidate {
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Raw template text, or `None` for generated candidates.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Template(expression) => Some(expression.source()),
            Body::Generated(_) => None,
        }
    }

    /// The parsed template, or `None` for generated candidates.
    pub fn template(&self) -> Option<&Expression> {
        match &self.body {
            Body::Template(expression) => Some(expression),
            Body::Generated(_) => None,
        }
    }

    /// The expression to evaluate for this draw. Generated candidates run
    /// their function and parse the result.
    pub fn expression(&self) -> Result<Arc<Expression>, ExpressionError> {
        match &self.body {
            Body::Template(expression) => Ok(Arc::clone(expression)),
            Body::Generated(generator) => Ok(Arc::new(Expression::parse(&generator())?)),
        }
    }

    pub fn conditions(&self) -> &[Expression] {
        match &self.body {
            Body::Template(expression) => expression.conditions(),
            Body::Generated(_) => &[],
        }
    }
}

/// A named source of text: candidates, a distribution, and the value last
/// drawn.
///
/// Reading a symbol through its grammar returns the cached value once one
/// exists; a forced expansion draws again.
#[derive(Debug, Clone)]
pub struct Symbol {
    candidates: Vec<Candidate>,
    weights: Vec<u32>,
    sampler: Sampler,
    value: Option<String>,
}

impl Symbol {
    /// Build a symbol, parsing every rule's text and conditions.
    ///
    /// Weights are kept only for `weighted` and `popWeighted`; every other
    /// distribution treats candidates as weight 1.
    pub fn new(rules: impl Into<RuleSet>) -> Result<Symbol, GrammarError> {
        let rules = rules.into();
        let distribution = rules.distribution;

        let candidates = match rules.source {
            RuleSource::Rules(rules) => {
                if rules.is_empty() {
                    return Err(GrammarError::EmptyRules);
                }
                let mut candidates = Vec::with_capacity(rules.len());
                for rule in rules {
                    let conditions = rule
                        .conditions
                        .iter()
                        .map(|c| Expression::parse(c))
                        .collect::<Result<Vec<_>, _>>()?;
                    let expression = Expression::parse(&rule.text)?.with_conditions(conditions);
                    candidates.push(Candidate {
                        body: Body::Template(Arc::new(expression)),
                        weight: if distribution.uses_weights() { rule.weight } else { 1 },
                    });
                }
                candidates
            }
            RuleSource::Generator(generator) => vec![Candidate {
                body: Body::Generated(generator),
                weight: 1,
            }],
        };

        let weights = candidates.iter().map(Candidate::weight).collect();
        Ok(Symbol {
            candidates,
            weights,
            sampler: Sampler::new(distribution),
            value: None,
        })
    }

    /// A symbol holding a value supplied from outside. Its single candidate
    /// is the value itself, unparsed, so a forced redraw yields it again.
    pub fn fixed(value: impl Into<String>) -> Symbol {
        let value = value.into();
        Symbol {
            candidates: vec![Candidate {
                body: Body::Template(Arc::new(Expression::literal(value.clone()))),
                weight: 1,
            }],
            weights: vec![1],
            sampler: Sampler::new(Distribution::Uniform),
            value: Some(value),
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn distribution(&self) -> Distribution {
        self.sampler.policy()
    }

    /// The cached value, if the symbol has been expanded or assigned.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Replace the cached value directly, bypassing the distribution.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    /// Put every candidate back into the deck. The cached value is kept.
    pub fn reset(&mut self) {
        self.sampler.reset();
    }

    /// Cards left in the deck (see [`Sampler::remaining`]).
    pub fn remaining(&self) -> Option<usize> {
        self.sampler.remaining()
    }

    pub(crate) fn has_conditions(&self) -> bool {
        self.candidates.iter().any(|c| !c.conditions().is_empty())
    }

    /// Draw a candidate index through the distribution. `None` when the
    /// deck is exhausted or no eligible candidate remains.
    pub fn draw(&mut self, rng: &mut dyn RandomSource, eligible: Option<&[bool]>) -> Option<usize> {
        self.sampler.draw(&self.weights, eligible, rng)
    }
}
