//! Rule text parsing: the template AST and its recursive-descent parser.
//!
//! Syntax:
//! - `[a|b|c]` → `Alternation`, one option picked uniformly
//! - `#name#`, `#name.mod.mod(arg,arg)#` → `SymbolRef`
//! - `#?name=test?yes:no#` / `#!name=test?yes:no#` → `Conditional`
//! - `\x` → literal `x`
//! - everything else → `Literal`

use thiserror::Error;

use crate::core::evaluator::{self, Scope};
use crate::core::grammar::{Grammar, GrammarError};
use crate::core::lexer::{tokenize, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("unclosed alternation starting at byte {offset}")]
    UnclosedAlternation { offset: usize },
    #[error("unclosed reference starting at byte {offset}")]
    UnclosedReference { offset: usize },
    #[error("expected a symbol or modifier name at byte {offset}")]
    MissingName { offset: usize },
    #[error("invalid name '{name}' at byte {offset}")]
    InvalidName { name: String, offset: usize },
    #[error("unclosed argument list starting at byte {offset}")]
    UnclosedArguments { offset: usize },
    #[error("conditional at byte {offset} is missing '='")]
    MissingComparison { offset: usize },
    #[error("conditional at byte {offset} is missing '?'")]
    MissingBranch { offset: usize },
    #[error("unexpected '{found}' at byte {offset}")]
    Unexpected { found: String, offset: usize },
}

/// One node of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text emitted as-is.
    Literal(String),
    /// `[a|b|c]`. Options may hold references but never another alternation.
    Alternation(Vec<Vec<Node>>),
    SymbolRef(SymbolRef),
    Conditional(Conditional),
}

/// `#name.modifier(args)...#`: a symbol lookup followed by a modifier chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub name: String,
    pub modifiers: Vec<ModifierCall>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierCall {
    pub name: String,
    /// Each argument is a template evaluated before the call.
    pub args: Vec<Vec<Node>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
}

impl Comparison {
    pub fn holds(self, left: &str, right: &str) -> bool {
        match self {
            Comparison::Equal => left == right,
            Comparison::NotEqual => left != right,
        }
    }
}

/// `#?subject=test?when_true:when_false#` (or `#!...#` for inequality).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub comparison: Comparison,
    pub subject: SymbolRef,
    pub test: Vec<Node>,
    pub when_true: Vec<Node>,
    pub when_false: Vec<Node>,
}

/// A parsed piece of rule text, evaluated against a [`Grammar`].
///
/// Stateless once built: the same expression can be evaluated any number of
/// times, against any grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    source: String,
    nodes: Vec<Node>,
    conditions: Vec<Expression>,
}

impl Expression {
    /// Parse rule text. Malformed `#...#` spans and unclosed alternations
    /// are rejected rather than emitted half-expanded.
    pub fn parse(source: &str) -> Result<Expression, ExpressionError> {
        let nodes = Parser::new(source).parse_template()?;
        Ok(Expression {
            source: source.to_string(),
            nodes,
            conditions: Vec::new(),
        })
    }

    /// Wrap text that is emitted verbatim, without parsing.
    pub fn literal(text: impl Into<String>) -> Expression {
        let source = text.into();
        let nodes = if source.is_empty() {
            Vec::new()
        } else {
            vec![Node::Literal(source.clone())]
        };
        Expression {
            source,
            nodes,
            conditions: Vec::new(),
        }
    }

    /// Attach validity conditions. Each must evaluate to a non-empty string
    /// for the expression to be eligible.
    pub fn with_conditions(mut self, conditions: Vec<Expression>) -> Expression {
        self.conditions = conditions;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn conditions(&self) -> &[Expression] {
        &self.conditions
    }

    /// Evaluate against a grammar. Referenced symbols are expanded (and
    /// cached) on demand.
    pub fn evaluate(&self, grammar: &mut Grammar) -> Result<String, GrammarError> {
        let mut scope = Scope::default();
        evaluator::evaluate(&self.nodes, grammar, &mut scope)
    }

    /// Whether every condition holds against `grammar`.
    pub fn is_valid(&self, grammar: &mut Grammar) -> Result<bool, GrammarError> {
        let mut scope = Scope::default();
        evaluator::conditions_hold(&self.conditions, grammar, &mut scope)
    }

    /// Every symbol reference in the expression, nested ones included,
    /// in source order. Conditional subjects count as references.
    pub fn references(&self) -> Vec<&SymbolRef> {
        let mut out = Vec::new();
        collect_references(&self.nodes, &mut out);
        for condition in &self.conditions {
            collect_references(&condition.nodes, &mut out);
        }
        out
    }
}

fn collect_references<'a>(nodes: &'a [Node], out: &mut Vec<&'a SymbolRef>) {
    for node in nodes {
        match node {
            Node::Literal(_) => {}
            Node::Alternation(options) => {
                for option in options {
                    collect_references(option, out);
                }
            }
            Node::SymbolRef(symbol_ref) => collect_symbol_ref(symbol_ref, out),
            Node::Conditional(conditional) => {
                collect_symbol_ref(&conditional.subject, out);
                collect_references(&conditional.test, out);
                collect_references(&conditional.when_true, out);
                collect_references(&conditional.when_false, out);
            }
        }
    }
}

fn collect_symbol_ref<'a>(symbol_ref: &'a SymbolRef, out: &mut Vec<&'a SymbolRef>) {
    out.push(symbol_ref);
    for modifier in &symbol_ref.modifiers {
        for arg in &modifier.args {
            collect_references(arg, out);
        }
    }
}

/// Where a node sequence is being parsed; decides which tokens end it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Template,
    Option,
    Argument,
    Test,
    WhenTrue,
    WhenFalse,
}

impl Context {
    fn ends_at(self, kind: &TokenKind) -> bool {
        match self {
            Context::Template => false,
            Context::Option => matches!(kind, TokenKind::Pipe | TokenKind::RBracket),
            Context::Argument => matches!(kind, TokenKind::Comma | TokenKind::RParen),
            Context::Test => matches!(kind, TokenKind::Question),
            Context::WhenTrue => matches!(kind, TokenKind::Colon),
            Context::WhenFalse => false,
        }
    }

    /// Branches end at the `#` closing their conditional.
    fn closes_on_hash(self) -> bool {
        matches!(self, Context::WhenTrue | Context::WhenFalse)
    }

    fn allows_alternation(self) -> bool {
        self != Context::Option
    }
}

fn is_name(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn new(source: &str) -> Parser {
        Parser {
            tokens: tokenize(source),
            pos: 0,
            end: source.len(),
        }
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn hash_ahead(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .any(|t| t.kind == TokenKind::Hash)
    }

    fn parse_template(&mut self) -> Result<Vec<Node>, ExpressionError> {
        let nodes = self.parse_sequence(Context::Template)?;
        // Template sequences only stop at the end of input.
        debug_assert!(self.peek().is_none());
        Ok(nodes)
    }

    fn parse_sequence(&mut self, context: Context) -> Result<Vec<Node>, ExpressionError> {
        let mut nodes = Vec::new();

        while let Some(kind) = self.peek() {
            if context.ends_at(kind) {
                break;
            }
            match kind {
                TokenKind::Hash if context.closes_on_hash() => {
                    // Either a nested reference or the end of this branch.
                    // Nested only if it parses and something can still close
                    // the enclosing conditional.
                    let saved = self.pos;
                    match self.parse_reference() {
                        Ok(node) if self.hash_ahead() => nodes.push(node),
                        _ => {
                            self.pos = saved;
                            break;
                        }
                    }
                }
                TokenKind::Hash => nodes.push(self.parse_reference()?),
                TokenKind::LBracket if context.allows_alternation() => {
                    nodes.push(self.parse_alternation()?);
                }
                _ => {
                    if let Some(token) = self.advance() {
                        push_literal(&mut nodes, token.kind.as_literal());
                    }
                }
            }
        }

        Ok(nodes)
    }

    fn parse_alternation(&mut self) -> Result<Node, ExpressionError> {
        let open = self.offset();
        self.advance();
        let mut options = Vec::new();
        loop {
            options.push(self.parse_sequence(Context::Option)?);
            match self.advance().map(|t| t.kind) {
                Some(TokenKind::Pipe) => continue,
                Some(TokenKind::RBracket) => break,
                _ => return Err(ExpressionError::UnclosedAlternation { offset: open }),
            }
        }
        Ok(Node::Alternation(options))
    }

    /// Parse a `#...#` span; the current token is the opening `#`.
    fn parse_reference(&mut self) -> Result<Node, ExpressionError> {
        let open = self.offset();
        self.advance();
        match self.peek() {
            Some(TokenKind::Question) => {
                self.advance();
                self.parse_conditional(Comparison::Equal, open)
            }
            Some(TokenKind::Bang) => {
                self.advance();
                self.parse_conditional(Comparison::NotEqual, open)
            }
            Some(_) => {
                let symbol_ref = self.parse_symbol_ref()?;
                self.expect_close(open)?;
                Ok(Node::SymbolRef(symbol_ref))
            }
            None => Err(ExpressionError::UnclosedReference { offset: open }),
        }
    }

    fn parse_symbol_ref(&mut self) -> Result<SymbolRef, ExpressionError> {
        let name = self.parse_name()?;
        let mut modifiers = Vec::new();
        while self.peek() == Some(&TokenKind::Dot) {
            self.advance();
            let name = self.parse_name()?;
            let args = if self.peek() == Some(&TokenKind::LParen) {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            modifiers.push(ModifierCall { name, args });
        }
        Ok(SymbolRef { name, modifiers })
    }

    fn parse_name(&mut self) -> Result<String, ExpressionError> {
        let offset = self.offset();
        match self.peek() {
            Some(TokenKind::Text(text)) if is_name(text) => {
                let name = text.clone();
                self.advance();
                Ok(name)
            }
            Some(TokenKind::Text(text)) => Err(ExpressionError::InvalidName {
                name: text.clone(),
                offset,
            }),
            _ => Err(ExpressionError::MissingName { offset }),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Vec<Node>>, ExpressionError> {
        let open = self.offset();
        self.advance();
        let mut args = Vec::new();
        if self.peek() == Some(&TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_sequence(Context::Argument)?);
            match self.advance().map(|t| t.kind) {
                Some(TokenKind::Comma) => continue,
                Some(TokenKind::RParen) => break,
                _ => return Err(ExpressionError::UnclosedArguments { offset: open }),
            }
        }
        Ok(args)
    }

    fn parse_conditional(
        &mut self,
        comparison: Comparison,
        open: usize,
    ) -> Result<Node, ExpressionError> {
        let subject = self.parse_symbol_ref()?;

        match self.peek() {
            Some(TokenKind::Equals) => {
                self.advance();
            }
            None => return Err(ExpressionError::UnclosedReference { offset: open }),
            Some(_) => return Err(ExpressionError::MissingComparison { offset: open }),
        }

        let test = self.parse_sequence(Context::Test)?;
        if self.advance().map(|t| t.kind) != Some(TokenKind::Question) {
            return Err(ExpressionError::MissingBranch { offset: open });
        }

        let when_true = self.parse_sequence(Context::WhenTrue)?;
        let when_false = if self.peek() == Some(&TokenKind::Colon) {
            self.advance();
            self.parse_sequence(Context::WhenFalse)?
        } else {
            Vec::new()
        };

        self.expect_close(open)?;
        Ok(Node::Conditional(Conditional {
            comparison,
            subject,
            test,
            when_true,
            when_false,
        }))
    }

    fn expect_close(&mut self, open: usize) -> Result<(), ExpressionError> {
        let offset = self.offset();
        match self.advance().map(|t| t.kind) {
            Some(TokenKind::Hash) => Ok(()),
            None => Err(ExpressionError::UnclosedReference { offset: open }),
            Some(kind) => Err(ExpressionError::Unexpected {
                found: kind.as_literal().to_string(),
                offset,
            }),
        }
    }
}

fn push_literal(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Literal(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Literal(text.to_string()));
    }
}
