//! Grammar runtime: the symbol table, its builder, and expansion.

use rustc_hash::FxHashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::core::evaluator::{self, Scope};
use crate::core::expression::{Expression, ExpressionError};
use crate::core::modifiers::ModifierRegistry;
use crate::core::rng::{RandomSource, SeededRng};
use crate::core::rules::{self, RuleSet};
use crate::core::symbol::Symbol;
use crate::core::trace::{TraceEvent, Tracer};

/// Default cap on nested symbol draws within one expansion.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("template parse error: {0}")]
    Expression(#[from] ExpressionError),
    #[error("rule set is empty")]
    EmptyRules,
    #[error("unknown distribution '{0}'")]
    UnknownDistribution(String),
    #[error("symbol '{name}': {source}")]
    Symbol {
        name: String,
        source: Box<GrammarError>,
    },
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),
    #[error("recursive reference to '{symbol}' ({})", .chain.join(" -> "))]
    Recursion { symbol: String, chain: Vec<String> },
    #[error("expansion depth limit of {limit} exceeded at '{symbol}'")]
    DepthExceeded { symbol: String, limit: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A set of named symbols plus the modifiers, random source and origin key
/// their templates are evaluated with. Built via [`Grammar::builder`].
///
/// Each grammar is self-contained: nothing is shared between grammars, so
/// separate grammars can run on separate threads. A single grammar mutates
/// symbol caches and decks as it expands and must not be shared without
/// synchronisation; clone it instead.
#[derive(Clone)]
pub struct Grammar {
    symbols: FxHashMap<String, Symbol>,
    modifiers: ModifierRegistry,
    rng: Box<dyn RandomSource>,
    origin: String,
    output: String,
    max_depth: usize,
    tracer: Option<Arc<dyn Tracer>>,
}

/// Builder for constructing a [`Grammar`].
pub struct GrammarBuilder {
    grammar_files: Vec<PathBuf>,
    ron_sources: Vec<String>,
    symbols: Vec<(String, RuleSet)>,
    state: Vec<(String, String)>,
    modifiers: Option<ModifierRegistry>,
    origin: String,
    seed: Option<u64>,
    rng: Option<Box<dyn RandomSource>>,
    max_depth: usize,
    tracer: Option<Arc<dyn Tracer>>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder {
            grammar_files: Vec::new(),
            ron_sources: Vec::new(),
            symbols: Vec::new(),
            state: Vec::new(),
            modifiers: None,
            origin: "origin".to_string(),
            seed: None,
            rng: None,
            max_depth: DEFAULT_MAX_DEPTH,
            tracer: None,
        }
    }

    /// Expand the origin symbol, using its cached value if it has one.
    pub fn expand(&mut self) -> Result<String, GrammarError> {
        let origin = self.origin.clone();
        self.expand_symbol(&origin, false)
    }

    /// Expand `name` and record the result as [`Grammar::output`].
    ///
    /// Without `force` a symbol that already has a value returns it; with
    /// `force` it draws again. Nested references always read cached values.
    pub fn expand_symbol(&mut self, name: &str, force: bool) -> Result<String, GrammarError> {
        let value = self.resolve_top_level(name, force)?;
        self.output.clone_from(&value);
        Ok(value)
    }

    /// Read a symbol's value, expanding it on first read. Does not touch
    /// [`Grammar::output`].
    pub fn get(&mut self, name: &str) -> Result<String, GrammarError> {
        self.resolve_top_level(name, false)
    }

    /// Replace a symbol's rules with a fresh symbol. Any cached value and
    /// deck state of the old symbol are discarded.
    pub fn set(&mut self, name: impl Into<String>, rules: impl Into<RuleSet>) -> Result<(), GrammarError> {
        let name = name.into();
        let symbol = Symbol::new(rules).map_err(|e| GrammarError::Symbol {
            name: name.clone(),
            source: Box::new(e),
        })?;
        self.symbols.insert(name, symbol);
        Ok(())
    }

    /// Assign a symbol's value directly, bypassing its rules. Undefined
    /// names become fixed symbols holding `value`.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
        match self.symbols.get_mut(name) {
            Some(symbol) => symbol.set_value(value),
            None => {
                self.symbols.insert(name.to_string(), Symbol::fixed(value));
            }
        }
    }

    /// Return a symbol's candidates to its deck. Returns false for unknown
    /// names.
    pub fn reset(&mut self, name: &str) -> bool {
        match self.symbols.get_mut(name) {
            Some(symbol) => {
                symbol.reset();
                true
            }
            None => false,
        }
    }

    /// Parse and evaluate ad hoc template text against this grammar.
    pub fn evaluate(&mut self, text: &str) -> Result<String, GrammarError> {
        Expression::parse(text)?.evaluate(self)
    }

    /// The last string produced by [`Grammar::expand`] or
    /// [`Grammar::expand_symbol`].
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn symbol_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Defined symbol names, sorted.
    pub fn symbol_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.symbols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn modifiers(&self) -> &ModifierRegistry {
        &self.modifiers
    }

    /// Add a modifier. Existing symbol values are not re-resolved.
    pub fn register_modifier<F>(&mut self, name: impl Into<String>, modifier: F)
    where
        F: Fn(&str, &[String]) -> String + Send + Sync + 'static,
    {
        self.modifiers.register(name, modifier);
    }

    fn resolve_top_level(&mut self, name: &str, force: bool) -> Result<String, GrammarError> {
        if !self.symbols.contains_key(name) {
            return Err(GrammarError::SymbolNotFound(name.to_string()));
        }
        let mut scope = Scope::default();
        self.resolve(name, force, &mut scope)
    }

    /// Resolve one symbol reference inside an evaluation.
    ///
    /// Undefined symbols resolve to an empty string. Drawing a symbol that
    /// is already being drawn further up the scope is a recursion error.
    pub(crate) fn resolve(&mut self, name: &str, force: bool, scope: &mut Scope) -> Result<String, GrammarError> {
        let Some(symbol) = self.symbols.get(name) else {
            tracing::warn!(symbol = name, "reference to undefined symbol");
            self.trace(|| TraceEvent::UndefinedSymbol {
                name: name.to_string(),
            });
            return Ok(String::new());
        };

        if !force {
            if let Some(value) = symbol.value() {
                let value = value.to_string();
                self.trace(|| TraceEvent::SymbolResolved {
                    name: name.to_string(),
                    value: value.clone(),
                    cached: true,
                });
                return Ok(value);
            }
        }

        if scope.is_active(name) {
            return Err(GrammarError::Recursion {
                symbol: name.to_string(),
                chain: scope.chain_to(name),
            });
        }
        if scope.depth() >= self.max_depth {
            return Err(GrammarError::DepthExceeded {
                symbol: name.to_string(),
                limit: self.max_depth,
            });
        }

        scope.enter(name);
        let drawn = self.draw(name, scope);
        scope.leave();
        let value = drawn?;

        if let Some(symbol) = self.symbols.get_mut(name) {
            symbol.set_value(value.clone());
        }
        tracing::debug!(symbol = name, value = %value, "symbol expanded");
        self.trace(|| TraceEvent::SymbolResolved {
            name: name.to_string(),
            value: value.clone(),
            cached: false,
        });
        Ok(value)
    }

    /// Draw a candidate for `name` and evaluate it.
    fn draw(&mut self, name: &str, scope: &mut Scope) -> Result<String, GrammarError> {
        let eligible = self.eligible_candidates(name, scope)?;

        let candidate = match self.symbols.get_mut(name) {
            Some(symbol) => symbol
                .draw(self.rng.as_mut(), eligible.as_deref())
                .map(|index| symbol.candidates()[index].clone()),
            None => None,
        };

        let Some(candidate) = candidate else {
            tracing::debug!(symbol = name, "nothing left to draw");
            self.trace(|| TraceEvent::DistributionExhausted {
                name: name.to_string(),
            });
            return Ok(String::new());
        };

        let expression = candidate.expression()?;
        evaluator::evaluate(expression.nodes(), self, scope)
    }

    /// Eligibility mask for a symbol's candidates, or `None` when no
    /// candidate carries conditions.
    fn eligible_candidates(&mut self, name: &str, scope: &mut Scope) -> Result<Option<Vec<bool>>, GrammarError> {
        let conditions: Vec<Vec<Expression>> = match self.symbols.get(name) {
            Some(symbol) if symbol.has_conditions() => symbol
                .candidates()
                .iter()
                .map(|c| c.conditions().to_vec())
                .collect(),
            _ => return Ok(None),
        };

        let mut mask = Vec::with_capacity(conditions.len());
        for candidate_conditions in &conditions {
            mask.push(evaluator::conditions_hold(candidate_conditions, self, scope)?);
        }
        Ok(Some(mask))
    }

    pub(crate) fn pick_uniform(&mut self, n: usize) -> usize {
        self.rng.pick_uniform(n)
    }

    /// Apply a modifier by name. Unknown modifiers pass `value` through.
    pub(crate) fn apply_modifier(&self, name: &str, value: String, args: &[String]) -> String {
        match self.modifiers.apply(name, &value, args) {
            Some(output) => {
                self.trace(|| TraceEvent::ModifierApplied {
                    name: name.to_string(),
                    input: value.clone(),
                    output: output.clone(),
                });
                output
            }
            None => {
                tracing::warn!(modifier = name, "reference to undefined modifier");
                self.trace(|| TraceEvent::UndefinedModifier {
                    name: name.to_string(),
                });
                value
            }
        }
    }

    pub(crate) fn trace(&self, event: impl FnOnce() -> TraceEvent) {
        if let Some(tracer) = &self.tracer {
            tracer.record(event());
        }
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("symbols", &self.symbol_names())
            .field("modifiers", &self.modifiers)
            .field("origin", &self.origin)
            .field("output", &self.output)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl GrammarBuilder {
    /// Define a symbol. Overrides definitions loaded from RON.
    pub fn symbol(mut self, name: impl Into<String>, rules: impl Into<RuleSet>) -> Self {
        self.symbols.push((name.into(), rules.into()));
        self
    }

    pub fn symbols<I, K, R>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RuleSet>,
    {
        self.symbols
            .extend(symbols.into_iter().map(|(k, r)| (k.into(), r.into())));
        self
    }

    /// Supply a value from outside. The symbol holds `value` as-is, without
    /// parsing, and overrides any definition of the same name.
    pub fn state(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.push((name.into(), value.into()));
        self
    }

    /// Use `modifiers` instead of [`ModifierRegistry::english`].
    pub fn modifiers(mut self, modifiers: ModifierRegistry) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    /// Key expanded by [`Grammar::expand`]. Defaults to `"origin"`.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a custom random source. Takes precedence over [`Self::seed`].
    pub fn rng(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Load symbol definitions from a RON file at build time.
    pub fn grammar_file(mut self, path: impl AsRef<Path>) -> Self {
        self.grammar_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load symbol definitions from RON text at build time.
    pub fn ron(mut self, source: impl Into<String>) -> Self {
        self.ron_sources.push(source.into());
        self
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut definitions = Vec::new();
        for path in &self.grammar_files {
            definitions.extend(rules::load_from_ron(path)?);
        }
        for source in &self.ron_sources {
            definitions.extend(rules::parse_ron(source)?);
        }
        definitions.extend(self.symbols);

        let mut symbols = FxHashMap::default();
        for (name, rule_set) in definitions {
            let symbol = Symbol::new(rule_set).map_err(|e| GrammarError::Symbol {
                name: name.clone(),
                source: Box::new(e),
            })?;
            symbols.insert(name, symbol);
        }
        for (name, value) in self.state {
            symbols.insert(name, Symbol::fixed(value));
        }

        let rng = match self.rng {
            Some(rng) => rng,
            None => Box::new(SeededRng::from_seed(self.seed)),
        };

        Ok(Grammar {
            symbols,
            modifiers: self.modifiers.unwrap_or_else(ModifierRegistry::english),
            rng,
            origin: self.origin,
            output: String::new(),
            max_depth: self.max_depth,
            tracer: self.tracer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distribution::Distribution;
    use crate::core::rules::Rule;
    use crate::core::trace::TraceLog;

    fn gandalf() -> Grammar {
        Grammar::builder()
            .seed(42)
            .symbol("traveler", ["Gandalf"])
            .symbol("greeting", ["Howdy"])
            .symbol("origin", "#greeting#, #traveler#! How goes it?")
            .build()
            .unwrap()
    }

    #[test]
    fn expand_origin_sets_output() {
        let mut grammar = gandalf();
        assert_eq!(grammar.output(), "");
        assert_eq!(grammar.expand().unwrap(), "Howdy, Gandalf! How goes it?");
        assert_eq!(grammar.output(), "Howdy, Gandalf! How goes it?");
        assert_eq!(grammar.expand_symbol("traveler", false).unwrap(), "Gandalf");
        assert_eq!(grammar.output(), "Gandalf");
    }

    #[test]
    fn get_does_not_touch_output() {
        let mut grammar = gandalf();
        assert_eq!(grammar.get("greeting").unwrap(), "Howdy");
        assert_eq!(grammar.output(), "");
    }

    #[test]
    fn unknown_top_level_symbol_is_an_error() {
        let mut grammar = gandalf();
        assert!(matches!(
            grammar.expand_symbol("nobody", false),
            Err(GrammarError::SymbolNotFound(name)) if name == "nobody"
        ));
    }

    #[test]
    fn state_overlay_and_set() {
        let mut grammar = Grammar::builder()
            .seed(1)
            .symbol("greeting", ["Howdy"])
            .symbol("origin", "#greeting#, #traveler#! How goes it?")
            .state("traveler", "Gandalf")
            .build()
            .unwrap();
        assert_eq!(grammar.expand().unwrap(), "Howdy, Gandalf! How goes it?");
        assert_eq!(grammar.expand_symbol("traveler", false).unwrap(), "Gandalf");

        grammar.set("traveler", "Bilbo").unwrap();
        assert_eq!(grammar.expand_symbol("origin", true).unwrap(), "Howdy, Bilbo! How goes it?");

        grammar.set("greeting", "Yo").unwrap();
        assert_eq!(grammar.expand_symbol("origin", true).unwrap(), "Yo, Bilbo! How goes it?");
    }

    #[test]
    fn state_overlay_is_not_parsed() {
        let mut grammar = Grammar::builder()
            .state("tag", "#hashtag#")
            .symbol("origin", "post #tag#")
            .build()
            .unwrap();
        assert_eq!(grammar.expand().unwrap(), "post #hashtag#");
        assert_eq!(grammar.expand_symbol("tag", true).unwrap(), "#hashtag#");
    }

    #[test]
    fn cached_until_forced() {
        let mut grammar = Grammar::builder()
            .seed(9)
            .symbol("n", RuleSet::from(["1", "2", "3"]).with_distribution(Distribution::Shuffle))
            .build()
            .unwrap();
        let first = grammar.get("n").unwrap();
        for _ in 0..5 {
            assert_eq!(grammar.get("n").unwrap(), first);
        }
        assert_ne!(grammar.expand_symbol("n", true).unwrap(), first);
    }

    #[test]
    fn set_value_overrides_cache_until_forced() {
        let mut grammar = Grammar::builder()
            .seed(3)
            .symbol("x", ["foo", "bar"])
            .build()
            .unwrap();
        grammar.expand_symbol("x", true).unwrap();
        grammar.set_value("x", "foobar");
        assert_eq!(grammar.get("x").unwrap(), "foobar");
        assert!(["foo", "bar"].contains(&grammar.expand_symbol("x", true).unwrap().as_str()));

        grammar.set_value("fresh", "value");
        assert_eq!(grammar.get("fresh").unwrap(), "value");
    }

    #[test]
    fn pop_exhaustion_and_reset() {
        let mut grammar = Grammar::builder()
            .seed(5)
            .symbol("x", RuleSet::from(["A", "B"]).with_distribution(Distribution::Pop))
            .build()
            .unwrap();
        let first = grammar.expand_symbol("x", true).unwrap();
        let second = grammar.expand_symbol("x", true).unwrap();
        assert_ne!(first, second);
        assert_eq!(grammar.expand_symbol("x", true).unwrap(), "");
        assert!(grammar.reset("x"));
        assert!(["A", "B"].contains(&grammar.expand_symbol("x", true).unwrap().as_str()));
        assert!(!grammar.reset("missing"));
    }

    #[test]
    fn undefined_symbol_reference_is_empty() {
        let mut grammar = gandalf();
        assert_eq!(grammar.evaluate("[#nobody#]").unwrap(), "");
        assert_eq!(grammar.evaluate("a#nobody.uppercase#b").unwrap(), "ab");
    }

    #[test]
    fn undefined_modifier_passes_through() {
        let mut grammar = gandalf();
        assert_eq!(grammar.evaluate("#traveler.shout.uppercase#").unwrap(), "GANDALF");
    }

    #[test]
    fn direct_cycle_is_a_recursion_error() {
        let mut grammar = Grammar::builder()
            .symbol("origin", "#a#")
            .symbol("a", "x #b#")
            .symbol("b", "y #a#")
            .build()
            .unwrap();
        match grammar.expand() {
            Err(GrammarError::Recursion { symbol, chain }) => {
                assert_eq!(symbol, "a");
                assert_eq!(chain, vec!["origin", "a", "b", "a"]);
            }
            other => panic!("expected recursion error, got {:?}", other),
        }
        // The grammar is still usable afterwards.
        grammar.set("b", "y").unwrap();
        assert_eq!(grammar.expand_symbol("origin", true).unwrap(), "x y");
    }

    #[test]
    fn self_reference_is_a_recursion_error() {
        let mut grammar = Grammar::builder().symbol("loop", "#loop#!").build().unwrap();
        assert!(matches!(
            grammar.expand_symbol("loop", false),
            Err(GrammarError::Recursion { .. })
        ));
    }

    #[test]
    fn depth_limit() {
        let mut grammar = Grammar::builder()
            .max_depth(2)
            .symbol("a", "#b#")
            .symbol("b", "#c#")
            .symbol("c", "deep")
            .build()
            .unwrap();
        assert!(matches!(
            grammar.expand_symbol("a", false),
            Err(GrammarError::DepthExceeded { symbol, limit: 2 }) if symbol == "c"
        ));
    }

    #[test]
    fn construction_error_names_the_symbol() {
        let result = Grammar::builder()
            .symbol("good", "fine")
            .symbol("bad", "#unclosed")
            .build();
        match result {
            Err(GrammarError::Symbol { name, source }) => {
                assert_eq!(name, "bad");
                assert!(matches!(*source, GrammarError::Expression(_)));
            }
            other => panic!("expected symbol error, got {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            Grammar::builder().symbol("empty", Vec::<Rule>::new()).build(),
            Err(GrammarError::Symbol { .. })
        ));
    }

    #[test]
    fn set_rejects_bad_rules_and_keeps_old_symbol() {
        let mut grammar = gandalf();
        assert!(grammar.set("traveler", "[oops").is_err());
        assert_eq!(grammar.get("traveler").unwrap(), "Gandalf");
    }

    #[test]
    fn conditions_filter_candidates() {
        let mut grammar = Grammar::builder()
            .seed(11)
            .symbol("armed", "yes")
            .symbol(
                "loot",
                vec![
                    Rule::new("sword").when("#armed#"),
                    Rule::new("shield").when("#unarmed#"),
                ],
            )
            .build()
            .unwrap();
        for _ in 0..20 {
            assert_eq!(grammar.expand_symbol("loot", true).unwrap(), "sword");
        }
    }

    #[test]
    fn no_eligible_candidate_yields_empty() {
        let mut grammar = Grammar::builder()
            .symbol("loot", vec![Rule::new("sword").when("#armed#")])
            .build()
            .unwrap();
        assert_eq!(grammar.expand_symbol("loot", true).unwrap(), "");
    }

    #[test]
    fn generator_rules() {
        let mut grammar = Grammar::builder()
            .symbol("name", "Ada")
            .symbol("origin", RuleSet::generator(|| "Hi #name#!".to_string()))
            .build()
            .unwrap();
        assert_eq!(grammar.expand().unwrap(), "Hi Ada!");
    }

    #[test]
    fn custom_modifiers_replace_defaults() {
        let mut modifiers = ModifierRegistry::new();
        modifiers.register("shout", |value, _| format!("{}!", value.to_uppercase()));
        let mut grammar = Grammar::builder()
            .modifiers(modifiers)
            .symbol("word", "hey")
            .build()
            .unwrap();
        assert_eq!(grammar.evaluate("#word.shout#").unwrap(), "HEY!");
        assert_eq!(grammar.evaluate("#word.uppercase#").unwrap(), "hey");

        grammar.register_modifier("twice", |value, _| value.repeat(2));
        assert_eq!(grammar.evaluate("#word.twice#").unwrap(), "heyhey");
    }

    #[test]
    fn custom_origin() {
        let mut grammar = Grammar::builder()
            .origin("start")
            .symbol("start", "begin")
            .build()
            .unwrap();
        assert_eq!(grammar.origin(), "start");
        assert_eq!(grammar.expand().unwrap(), "begin");
    }

    #[test]
    fn tracer_sees_resolutions() {
        let log = Arc::new(TraceLog::new());
        let mut grammar = Grammar::builder()
            .seed(2)
            .tracer(log.clone())
            .symbol("animal", "dog")
            .build()
            .unwrap();
        grammar.evaluate("#animal.s# #ghost# #animal.nope#").unwrap();
        let events = log.events();
        assert!(events.contains(&TraceEvent::SymbolResolved {
            name: "animal".to_string(),
            value: "dog".to_string(),
            cached: false,
        }));
        assert!(events.contains(&TraceEvent::ModifierApplied {
            name: "s".to_string(),
            input: "dog".to_string(),
            output: "dogs".to_string(),
        }));
        assert!(events.contains(&TraceEvent::UndefinedSymbol {
            name: "ghost".to_string()
        }));
        assert!(events.contains(&TraceEvent::UndefinedModifier {
            name: "nope".to_string()
        }));
        assert!(events.contains(&TraceEvent::SymbolResolved {
            name: "animal".to_string(),
            value: "dog".to_string(),
            cached: true,
        }));
    }

    #[test]
    fn load_from_ron_source() {
        let mut grammar = Grammar::builder()
            .seed(4)
            .ron(r##"{ "origin": Text("#who# waves"), "who": List(["Ann"]) }"##)
            .symbol("who", "Bo")
            .build()
            .unwrap();
        assert_eq!(grammar.expand().unwrap(), "Bo waves");
        assert_eq!(grammar.symbol_names(), vec!["origin", "who"]);
    }

    #[test]
    fn grammar_is_send_and_clone() {
        fn assert_send<T: Send>() {}
        assert_send::<Grammar>();

        let mut original = Grammar::builder()
            .seed(8)
            .symbol("n", ["1", "2", "3", "4", "5", "6", "7", "8"])
            .build()
            .unwrap();
        let mut copy = original.clone();
        for _ in 0..10 {
            assert_eq!(
                original.expand_symbol("n", true).unwrap(),
                copy.expand_symbol("n", true).unwrap()
            );
        }
    }
}
