//! Modifier registry: named string transforms applied in `#sym.mod#` chains.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// A modifier: receives the current value and its evaluated arguments.
pub type ModifierFn = Arc<dyn Fn(&str, &[String]) -> String + Send + Sync>;

/// Name → modifier lookup, owned by a grammar and passed through evaluation.
#[derive(Clone, Default)]
pub struct ModifierRegistry {
    modifiers: FxHashMap<String, ModifierFn>,
}

impl ModifierRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the English text modifiers:
    /// `uppercase`, `lowercase`, `capitalize`, `capitalize_all`, `s`, `a`,
    /// `ed` and `join`.
    pub fn english() -> Self {
        let mut registry = Self::new();
        registry.register("uppercase", |value, _| value.to_uppercase());
        registry.register("lowercase", |value, _| value.to_lowercase());
        registry.register("capitalize", |value, _| capitalize(value));
        registry.register("capitalize_all", |value, _| {
            value
                .split(' ')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" ")
        });
        registry.register("s", |value, _| pluralize(value));
        registry.register("a", |value, _| with_article(value));
        registry.register("ed", |value, _| past_tense(value));
        registry.register("join", |value, args| {
            let mut joined = value.to_string();
            for arg in args {
                joined.push_str(arg);
            }
            joined
        });
        registry
    }

    /// Add or replace a modifier.
    pub fn register<F>(&mut self, name: impl Into<String>, modifier: F)
    where
        F: Fn(&str, &[String]) -> String + Send + Sync + 'static,
    {
        self.modifiers.insert(name.into(), Arc::new(modifier));
    }

    pub fn get(&self, name: &str) -> Option<&ModifierFn> {
        self.modifiers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modifiers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modifiers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Apply `name` to `value`, or `None` if no such modifier is registered.
    pub fn apply(&self, name: &str, value: &str, args: &[String]) -> Option<String> {
        self.modifiers.get(name).map(|modifier| modifier(value, args))
    }
}

impl fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierRegistry")
            .field("modifiers", &self.names())
            .finish()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Last char and the one before it, if any.
fn ending(word: &str) -> (Option<char>, Option<char>) {
    let mut rev = word.chars().rev();
    let last = rev.next();
    (last, rev.next())
}

fn pluralize(word: &str) -> String {
    match ending(word) {
        (Some('s' | 'h' | 'x'), _) => format!("{}es", word),
        (Some('y'), Some(before)) if !is_vowel(before) => {
            format!("{}ies", &word[..word.len() - 1])
        }
        (None, _) => String::new(),
        _ => format!("{}s", word),
    }
}

fn past_tense(word: &str) -> String {
    match ending(word) {
        (Some('e'), _) => format!("{}d", word),
        (Some('y'), Some(before)) if !is_vowel(before) => {
            format!("{}ied", &word[..word.len() - 1])
        }
        (None, _) => String::new(),
        _ => format!("{}ed", word),
    }
}

fn with_article(word: &str) -> String {
    match word.chars().next() {
        Some(first) if is_vowel(first) => format!("an {}", word),
        Some(_) => format!("a {}", word),
        None => String::new(),
    }
}
