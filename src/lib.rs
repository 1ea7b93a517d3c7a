//! Narrative Grammar: symbol grammars for procedural text.
//!
//! Named symbols expand into text drawn from weighted candidate rules.
//! Rule text embeds a small template language: `[a|b]` alternations,
//! `#symbol.modifier(args)#` references and `#?symbol=value?yes:no#`
//! conditionals. Symbols pick their rules through a distribution policy
//! (uniform, weighted, pop, shuffle, popWeighted) and cache what they draw.
//!
//! ```
//! use narrative_grammar::Grammar;
//!
//! let mut grammar = Grammar::builder()
//!     .seed(7)
//!     .symbol("traveler", ["Gandalf"])
//!     .symbol("greeting", ["Howdy"])
//!     .symbol("origin", "#greeting#, #traveler#! How goes it?")
//!     .build()
//!     .unwrap();
//! assert_eq!(grammar.expand().unwrap(), "Howdy, Gandalf! How goes it?");
//! ```

pub mod core;

pub use crate::core::distribution::Distribution;
pub use crate::core::expression::{Expression, ExpressionError};
pub use crate::core::grammar::{Grammar, GrammarBuilder, GrammarError};
pub use crate::core::modifiers::ModifierRegistry;
pub use crate::core::rng::{RandomSource, SeededRng};
pub use crate::core::rules::{Rule, RuleSet};
pub use crate::core::symbol::{Candidate, Symbol};
pub use crate::core::trace::{TraceEvent, TraceLog, Tracer};
