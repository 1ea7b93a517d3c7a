//! WASM bindings for narrative-grammar — powers the interactive web demo.

use wasm_bindgen::prelude::*;

use narrative_grammar::core::rules;
use narrative_grammar::{Distribution, Grammar, Rule, RuleSet};

// ---------------------------------------------------------------------------
// Embedded grammar data — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const TAVERN_GRAMMAR: &str = include_str!("../../grammar_data/tavern.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------

/// `"text"` or `{ "text": "...", "weight": 2, "conditions": [...] }`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RuleInput {
    Text(String),
    Record(Rule),
}

impl From<RuleInput> for Rule {
    fn from(input: RuleInput) -> Self {
        match input {
            RuleInput::Text(text) => Rule::new(text),
            RuleInput::Record(rule) => rule,
        }
    }
}

/// One symbol definition: a template, a list of rules, or rules plus a
/// distribution name.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SymbolInput {
    Text(String),
    List(Vec<RuleInput>),
    Rules {
        rules: Vec<RuleInput>,
        #[serde(default)]
        distribution: Distribution,
    },
}

impl From<SymbolInput> for RuleSet {
    fn from(input: SymbolInput) -> Self {
        match input {
            SymbolInput::Text(text) => text.into(),
            SymbolInput::List(rules) => RuleSet::new(rules.into_iter().map(Rule::from).collect()),
            SymbolInput::Rules {
                rules,
                distribution,
            } => RuleSet::new(rules.into_iter().map(Rule::from).collect()).with_distribution(distribution),
        }
    }
}

#[derive(serde::Serialize)]
struct SymbolInfo {
    name: String,
    candidates: usize,
    distribution: String,
    value: Option<String>,
    remaining: Option<usize>,
}

// ---------------------------------------------------------------------------
// GrammarDemo — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct GrammarDemo {
    grammar: Grammar,
}

#[wasm_bindgen]
impl GrammarDemo {
    /// Build a grammar from a JSON object mapping symbol names to
    /// definitions.
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "origin": "#greeting#, #traveler#!",
    ///   "greeting": ["Howdy", { "text": "Hail", "weight": 2 }],
    ///   "traveler": { "rules": ["Gandalf", "Bilbo"], "distribution": "shuffle" }
    /// }
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(grammar_json: &str, seed: u64) -> Result<GrammarDemo, JsError> {
        let input: std::collections::BTreeMap<String, SymbolInput> = serde_json::from_str(grammar_json)
            .map_err(|e| JsError::new(&format!("Invalid grammar JSON: {e}")))?;

        let grammar = Grammar::builder()
            .seed(seed)
            .symbols(input.into_iter().map(|(name, symbol)| (name, RuleSet::from(symbol))))
            .build()
            .map_err(|e| JsError::new(&format!("Grammar build error: {e}")))?;

        Ok(GrammarDemo { grammar })
    }

    /// The bundled tavern grammar.
    pub fn tavern(seed: u64) -> Result<GrammarDemo, JsError> {
        let defs = rules::parse_ron(data::TAVERN_GRAMMAR)
            .map_err(|e| JsError::new(&format!("Grammar parse error: {e}")))?;
        let grammar = Grammar::builder()
            .seed(seed)
            .symbols(defs)
            .build()
            .map_err(|e| JsError::new(&format!("Grammar build error: {e}")))?;
        Ok(GrammarDemo { grammar })
    }

    /// Expand a symbol; `force` draws a fresh value instead of the cached one.
    pub fn expand(&mut self, key: &str, force: bool) -> Result<String, JsError> {
        self.grammar
            .expand_symbol(key, force)
            .map_err(|e| JsError::new(&format!("Expansion error: {e}")))
    }

    /// Force-expand a symbol `count` times. Returns a JSON array of strings.
    pub fn expand_many(&mut self, key: &str, count: usize) -> Result<String, JsError> {
        let mut variants = Vec::with_capacity(count);
        for _ in 0..count {
            variants.push(
                self.grammar
                    .expand_symbol(key, true)
                    .map_err(|e| JsError::new(&format!("Expansion error: {e}")))?,
            );
        }
        serde_json::to_string(&variants)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Evaluate ad hoc template text.
    pub fn evaluate(&mut self, template: &str) -> Result<String, JsError> {
        self.grammar
            .evaluate(template)
            .map_err(|e| JsError::new(&format!("Evaluation error: {e}")))
    }

    /// Replace a symbol's rules with one template.
    pub fn set(&mut self, name: &str, template: &str) -> Result<(), JsError> {
        self.grammar
            .set(name, template)
            .map_err(|e| JsError::new(&format!("Invalid rules: {e}")))
    }

    /// Assign a symbol's value directly.
    pub fn set_value(&mut self, name: &str, value: &str) {
        self.grammar.set_value(name, value);
    }

    pub fn reset(&mut self, name: &str) -> bool {
        self.grammar.reset(name)
    }

    /// The last top-level expansion.
    pub fn output(&self) -> String {
        self.grammar.output().to_string()
    }

    /// Return a JSON array describing every symbol.
    pub fn symbols(&self) -> Result<String, JsError> {
        let infos: Vec<SymbolInfo> = self
            .grammar
            .symbol_names()
            .into_iter()
            .filter_map(|name| {
                self.grammar.symbol(name).map(|symbol| SymbolInfo {
                    name: name.to_string(),
                    candidates: symbol.candidates().len(),
                    distribution: symbol.distribution().to_string(),
                    value: symbol.value().map(str::to_string),
                    remaining: symbol.remaining(),
                })
            })
            .collect();
        serde_json::to_string(&infos)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return JSON array of distribution names.
    pub fn distributions() -> String {
        serde_json::to_string(&["uniform", "weighted", "pop", "shuffle", "popWeighted"])
            .unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_definitions_map_to_rule_sets() {
        let input: std::collections::BTreeMap<String, SymbolInput> = serde_json::from_str(
            r##"{
                "origin": "#greeting#!",
                "greeting": ["Howdy", { "text": "Hail", "weight": 2 }],
                "loot": { "rules": ["coin", "gem"], "distribution": "pop" }
            }"##,
        )
        .unwrap();
        let sets: Vec<(String, RuleSet)> = input
            .into_iter()
            .map(|(name, symbol)| (name, RuleSet::from(symbol)))
            .collect();

        assert_eq!(sets[0].0, "greeting");
        assert_eq!(sets[0].1.rules().unwrap()[1].weight, 2);
        assert_eq!(sets[1].1.distribution(), Distribution::Pop);
        assert_eq!(sets[2].1.rules().unwrap()[0].text, "#greeting#!");
    }

    #[test]
    fn tavern_data_parses() {
        let defs = rules::parse_ron(data::TAVERN_GRAMMAR).unwrap();
        assert!(defs.iter().any(|(name, _)| name == "origin"));
        let mut grammar = Grammar::builder().seed(1).symbols(defs).build().unwrap();
        assert!(!grammar.expand().unwrap().is_empty());
    }
}
