//! Structured trace hook for evaluation.

use std::sync::{Mutex, PoisonError};

/// One resolved construct, reported to a [`Tracer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    AlternationResolved {
        options: usize,
        chosen: usize,
    },
    /// A symbol produced a value. `cached` is true when no draw happened.
    SymbolResolved {
        name: String,
        value: String,
        cached: bool,
    },
    UndefinedSymbol {
        name: String,
    },
    ModifierApplied {
        name: String,
        input: String,
        output: String,
    },
    UndefinedModifier {
        name: String,
    },
    ConditionEvaluated {
        subject: String,
        test: String,
        holds: bool,
    },
    /// A symbol had nothing left to draw and yielded an empty string.
    DistributionExhausted {
        name: String,
    },
}

/// Receives trace events from a grammar. Installed through
/// `GrammarBuilder::tracer`; events are only built when one is installed.
pub trait Tracer: Send + Sync {
    fn record(&self, event: TraceEvent);
}

/// A tracer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct TraceLog {
    events: Mutex<Vec<TraceEvent>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Tracer for TraceLog {
    fn record(&self, event: TraceEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
