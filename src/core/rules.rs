//! Rule definitions: what a symbol is built from, in code or in RON.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::core::distribution::Distribution;
use crate::core::grammar::GrammarError;

/// A function producing rule text on each draw.
pub type TextGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// One candidate's raw template text, weight and validity conditions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    pub text: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub conditions: Vec<String>,
}

fn default_weight() -> u32 {
    1
}

impl Rule {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: 1,
            conditions: Vec::new(),
        }
    }

    pub fn weighted(text: impl Into<String>, weight: u32) -> Self {
        Self {
            weight,
            ..Self::new(text)
        }
    }

    /// Only eligible when `condition` evaluates to a non-empty string.
    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }
}

#[derive(Clone)]
pub(crate) enum RuleSource {
    Rules(Vec<Rule>),
    Generator(TextGenerator),
}

/// Everything needed to build a symbol: its rules and distribution.
#[derive(Clone)]
pub struct RuleSet {
    pub(crate) source: RuleSource,
    pub(crate) distribution: Distribution,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            source: RuleSource::Rules(rules),
            distribution: Distribution::Uniform,
        }
    }

    /// Rules produced by a function; its text is parsed on every draw.
    pub fn generator<F>(generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            source: RuleSource::Generator(Arc::new(generator)),
            distribution: Distribution::Uniform,
        }
    }

    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// The literal rules, or `None` for a generator.
    pub fn rules(&self) -> Option<&[Rule]> {
        match &self.source {
            RuleSource::Rules(rules) => Some(rules),
            RuleSource::Generator(_) => None,
        }
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("RuleSet");
        match &self.source {
            RuleSource::Rules(rules) => s.field("rules", rules),
            RuleSource::Generator(_) => s.field("rules", &"<generator>"),
        };
        s.field("distribution", &self.distribution).finish()
    }
}

impl From<&str> for RuleSet {
    fn from(text: &str) -> Self {
        RuleSet::new(vec![Rule::new(text)])
    }
}

impl From<String> for RuleSet {
    fn from(text: String) -> Self {
        RuleSet::new(vec![Rule::new(text)])
    }
}

impl From<Vec<&str>> for RuleSet {
    fn from(texts: Vec<&str>) -> Self {
        RuleSet::new(texts.into_iter().map(Rule::new).collect())
    }
}

impl From<Vec<String>> for RuleSet {
    fn from(texts: Vec<String>) -> Self {
        RuleSet::new(texts.into_iter().map(Rule::new).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RuleSet {
    fn from(texts: [&str; N]) -> Self {
        RuleSet::new(texts.into_iter().map(Rule::new).collect())
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        RuleSet::new(rules)
    }
}

// RON deserialization helpers: symbol definitions in files take one of
// three shapes, mapped onto `RuleSet`.

#[derive(Debug, Deserialize)]
enum RonSymbol {
    Text(String),
    List(Vec<String>),
    Rules {
        rules: Vec<Rule>,
        #[serde(default)]
        distribution: Distribution,
    },
}

impl From<RonSymbol> for RuleSet {
    fn from(symbol: RonSymbol) -> Self {
        match symbol {
            RonSymbol::Text(text) => text.into(),
            RonSymbol::List(texts) => texts.into(),
            RonSymbol::Rules {
                rules,
                distribution,
            } => RuleSet::new(rules).with_distribution(distribution),
        }
    }
}

/// Parse symbol definitions from a RON string, sorted by symbol name.
pub fn parse_ron(input: &str) -> Result<Vec<(String, RuleSet)>, GrammarError> {
    let raw: BTreeMap<String, RonSymbol> = ron::from_str(input)?;
    Ok(raw
        .into_iter()
        .map(|(name, symbol)| (name, symbol.into()))
        .collect())
}

/// Load symbol definitions from a RON file.
pub fn load_from_ron(path: &Path) -> Result<Vec<(String, RuleSet)>, GrammarError> {
    let contents = std::fs::read_to_string(path)?;
    parse_ron(&contents)
}
