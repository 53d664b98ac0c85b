//! Declarative status state machine

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Why a status change was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionRefusal {
    /// The current state is terminal
    Terminal { current: String },
    /// No declared edge from `from` to `to`
    Undeclared { from: String, to: String },
}

/// Forward-only transitions over a status field.
///
/// Writing the current value again is accepted unless that value is
/// terminal. A document in a terminal state keeps its status frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMachine {
    field: String,
    transitions: BTreeMap<String, BTreeSet<String>>,
    terminal: BTreeSet<String>,
    initial: BTreeSet<String>,
}

impl StatusMachine {
    /// Machine over the given status field with no states yet
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            transitions: BTreeMap::new(),
            terminal: BTreeSet::new(),
            initial: BTreeSet::new(),
        }
    }

    /// Declare edges `from -> to` for every `to`
    pub fn allow(mut self, from: &str, to: &[&str]) -> Self {
        let edges = self.transitions.entry(from.to_string()).or_default();
        edges.extend(to.iter().map(|s| s.to_string()));
        self
    }

    /// Remove a previously declared edge
    pub fn forbid(mut self, from: &str, to: &str) -> Self {
        if let Some(edges) = self.transitions.get_mut(from) {
            edges.remove(to);
        }
        self
    }

    /// Declare terminal states
    pub fn terminal(mut self, states: &[&str]) -> Self {
        self.terminal.extend(states.iter().map(|s| s.to_string()));
        self
    }

    /// Declare the states a new document may start in
    pub fn initial(mut self, states: &[&str]) -> Self {
        self.initial.extend(states.iter().map(|s| s.to_string()));
        self
    }

    /// Status field this machine governs
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_terminal(&self, state: &str) -> bool {
        self.terminal.contains(state)
    }

    /// Whether a new document may start in `state`.
    ///
    /// A machine with no declared initial states accepts any.
    pub fn is_initial(&self, state: &str) -> bool {
        self.initial.is_empty() || self.initial.contains(state)
    }

    /// Checks the change `from -> to`.
    pub fn check(&self, from: &str, to: &str) -> Result<(), TransitionRefusal> {
        if self.is_terminal(from) {
            return Err(TransitionRefusal::Terminal {
                current: from.to_string(),
            });
        }

        if from == to {
            return Ok(());
        }

        let declared = self
            .transitions
            .get(from)
            .map_or(false, |edges| edges.contains(to));

        if declared {
            Ok(())
        } else {
            Err(TransitionRefusal::Undeclared {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}
