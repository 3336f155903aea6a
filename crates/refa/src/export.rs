// the shape automata take when handed to collaborators outside the pipeline
// (renderers, persistence). NFA and DFA share it; only the NFA may list more
// than one target per symbol

use std::collections::BTreeMap;
use std::fmt;

use bit_set::BitSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dfa::{Dfa, DfaState, DfaStateId};
use crate::nfa::{Nfa, NfaState, NfaStateId};
use crate::token::Symbol;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown state `{0}`")]
    UnknownState(String),
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),
    #[error("expected exactly one accepting state, found {0}")]
    AcceptStateCount(usize),
    #[error("state `{0}` has an epsilon transition, a DFA cannot")]
    EpsilonTransition(String),
    #[error("state `{state}` has {targets} targets on `{symbol}`, a DFA needs exactly one")]
    Nondeterministic {
        state: String,
        symbol: String,
        targets: usize,
    },
    #[error("failed to (de)serialize automaton")]
    Serialization(#[from] bincode::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedState {
    pub accepting: bool,
    // symbol label -> target labels
    pub transitions: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedAutomaton {
    pub starting_state: String,
    pub states: IndexMap<String, ExportedState>,
}

impl ExportedAutomaton {
    pub fn is_deterministic(&self) -> bool {
        self.states.values().all(|state| {
            state
                .transitions
                .iter()
                .all(|(symbol, targets)| symbol != Symbol::EPSILON_LABEL && targets.len() == 1)
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ExportError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<ExportedAutomaton, ExportError> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn state_ids(&self) -> IndexMap<&str, usize> {
        self.states
            .keys()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i))
            .collect()
    }

    fn resolve(ids: &IndexMap<&str, usize>, label: &str) -> Result<usize, ExportError> {
        ids.get(label)
            .copied()
            .ok_or_else(|| ExportError::UnknownState(label.to_string()))
    }
}

impl fmt::Display for ExportedAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.starting_state)?;
        for (label, state) in &self.states {
            write!(f, "{}", label)?;
            if state.accepting {
                write!(f, " (accept)")?;
            }

            let edges: Vec<String> = state
                .transitions
                .iter()
                .map(|(symbol, targets)| format!("{} -> {}", symbol, targets.join(" ")))
                .collect();
            writeln!(f, ": {}", edges.join(", "))?;
        }

        Ok(())
    }
}

impl Nfa {
    pub fn export(&self) -> ExportedAutomaton {
        let states = self
            .states()
            .map(|(id, state)| {
                let mut transitions: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for (symbol, next) in &state.transitions {
                    transitions
                        .entry(Symbol::label(*symbol))
                        .or_default()
                        .push(next.to_string());
                }

                let exported = ExportedState {
                    accepting: id == self.accept,
                    transitions,
                };
                (id.to_string(), exported)
            })
            .collect();

        ExportedAutomaton {
            starting_state: self.start.to_string(),
            states,
        }
    }

    /// Rebuilds an NFA from its export. Ids follow the order of `states`.
    pub fn from_export(exported: &ExportedAutomaton) -> Result<Nfa, ExportError> {
        let ids = exported.state_ids();

        let accepting: Vec<usize> = exported
            .states
            .values()
            .enumerate()
            .filter(|(_, state)| state.accepting)
            .map(|(i, _)| i)
            .collect();
        let [accept] = accepting.as_slice() else {
            return Err(ExportError::AcceptStateCount(accepting.len()));
        };

        let mut states: Vec<NfaState> = Vec::with_capacity(exported.states.len());
        for state in exported.states.values() {
            let mut transitions = Vec::new();
            for (label, targets) in &state.transitions {
                let symbol = Symbol::from_label(label)
                    .ok_or_else(|| ExportError::UnknownSymbol(label.clone()))?;
                for target in targets {
                    let next = ExportedAutomaton::resolve(&ids, target)?;
                    transitions.push((symbol, NfaStateId::from_index(next)));
                }
            }
            states.push(NfaState { transitions });
        }

        let start = ExportedAutomaton::resolve(&ids, &exported.starting_state)?;
        Ok(Nfa {
            states,
            start: NfaStateId::from_index(start),
            accept: NfaStateId::from_index(*accept),
        })
    }
}

impl Dfa {
    pub fn export(&self) -> ExportedAutomaton {
        let states = self
            .states
            .iter()
            .map(|state| {
                let transitions = state
                    .transitions
                    .iter()
                    .map(|(symbol, next)| {
                        (symbol.to_string(), vec![self.states[*next].label.clone()])
                    })
                    .collect();

                let exported = ExportedState {
                    accepting: state.accepting,
                    transitions,
                };
                (state.label.clone(), exported)
            })
            .collect();

        ExportedAutomaton {
            starting_state: self.states[self.initial_state].label.clone(),
            states,
        }
    }

    /// Rebuilds a DFA from its export. Member sets are not part of the export and come back empty.
    pub fn from_export(exported: &ExportedAutomaton) -> Result<Dfa, ExportError> {
        let ids = exported.state_ids();

        let mut states: Vec<DfaState> = Vec::with_capacity(exported.states.len());
        for (label, state) in &exported.states {
            let mut transitions = BTreeMap::new();
            for (symbol_label, targets) in &state.transitions {
                let symbol = match Symbol::from_label(symbol_label) {
                    Some(Some(symbol)) => symbol,
                    Some(None) => return Err(ExportError::EpsilonTransition(label.clone())),
                    None => return Err(ExportError::UnknownSymbol(symbol_label.clone())),
                };

                let [target] = targets.as_slice() else {
                    return Err(ExportError::Nondeterministic {
                        state: label.clone(),
                        symbol: symbol_label.clone(),
                        targets: targets.len(),
                    });
                };
                let next = ExportedAutomaton::resolve(&ids, target)?;
                transitions.insert(symbol, DfaStateId::from_index(next));
            }

            states.push(DfaState {
                label: label.clone(),
                members: BitSet::new(),
                accepting: state.accepting,
                transitions,
            });
        }

        let initial_state = ExportedAutomaton::resolve(&ids, &exported.starting_state)?;
        Ok(Dfa {
            states,
            initial_state: DfaStateId::from_index(initial_state),
        })
    }
}
