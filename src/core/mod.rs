pub mod distribution;
pub(crate) mod evaluator;
pub mod expression;
pub mod grammar;
pub(crate) mod lexer;
pub mod modifiers;
pub mod rng;
pub mod rules;
pub mod symbol;
pub mod trace;
