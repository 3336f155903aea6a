use std::collections::{BTreeMap, BTreeSet, VecDeque};

use bit_set::BitSet;
use indexmap::IndexSet;
use refa_util::make_type_idx;

use crate::nfa::Nfa;
use crate::token::Symbol;

#[derive(Clone, Debug)]
pub struct DfaState {
    pub(crate) label: String,
    // NFA states for a subset-construction DFA, original DFA states for a minimized one
    pub(crate) members: BitSet,
    pub(crate) accepting: bool,
    pub(crate) transitions: BTreeMap<Symbol, DfaStateId>,
}

make_type_idx!(pub DfaStateId, DfaState);

impl DfaState {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn members(&self) -> &BitSet {
        &self.members
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn transitions(&self) -> &BTreeMap<Symbol, DfaStateId> {
        &self.transitions
    }
}

/// A deterministic automaton. A missing transition rejects; there is no explicit dead state.
#[derive(Clone, Debug)]
pub struct Dfa {
    pub(crate) states: Vec<DfaState>,
    pub(crate) initial_state: DfaStateId,
}

fn subset_label(members: &BitSet) -> String {
    members
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join("_")
}

impl Dfa {
    // creates a DFA from an NFA using subset construction
    pub fn from_nfa(nfa: &Nfa) -> Dfa {
        let alphabet = nfa.alphabet();

        let mut initial_configuration = BitSet::with_capacity(nfa.len());
        initial_configuration.insert(nfa.start().index());
        let initial_configuration = nfa.epsilon_closure(&initial_configuration);

        // position in the set is the DFA state id, so equal subsets collapse
        // to one state no matter which path discovered them
        let mut subsets: IndexSet<BitSet> = IndexSet::new();
        subsets.insert(initial_configuration);

        let mut rows: Vec<BTreeMap<Symbol, DfaStateId>> = Vec::new();
        let mut work_queue: VecDeque<usize> = VecDeque::from([0]);

        // ids are handed out in discovery order and the queue is FIFO, so
        // states are expanded in id order and `rows` lines up with `subsets`
        while let Some(current) = work_queue.pop_front() {
            debug_assert_eq!(current, rows.len());

            let mut row: BTreeMap<Symbol, DfaStateId> = BTreeMap::new();
            for symbol in alphabet.iter().copied() {
                let moved = nfa.delta(&subsets[current], symbol);
                if moved.is_empty() {
                    continue;
                }

                let target = nfa.epsilon_closure(&moved);
                let (id, inserted) = subsets.insert_full(target);
                if inserted {
                    work_queue.push_back(id);
                }
                row.insert(symbol, DfaStateId::from_index(id));
            }

            rows.push(row);
        }

        let accept = nfa.accept().index();
        let states: Vec<DfaState> = subsets
            .into_iter()
            .zip(rows)
            .map(|(members, transitions)| DfaState {
                label: subset_label(&members),
                accepting: members.contains(accept),
                members,
                transitions,
            })
            .collect();

        log::debug!(
            "subset construction produced {} dfa states over {} symbols",
            states.len(),
            alphabet.len()
        );

        Dfa {
            states,
            initial_state: DfaStateId::from_index(0),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn initial_state(&self) -> DfaStateId {
        self.initial_state
    }

    pub fn state(&self, id: DfaStateId) -> &DfaState {
        &self.states[id]
    }

    pub fn states(&self) -> impl Iterator<Item = (DfaStateId, &DfaState)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| (DfaStateId::from_index(i), state))
    }

    pub fn accepting_states(&self) -> impl Iterator<Item = DfaStateId> + '_ {
        self.states()
            .filter(|(_, state)| state.accepting)
            .map(|(id, _)| id)
    }

    pub fn alphabet(&self) -> BTreeSet<Symbol> {
        self.states
            .iter()
            .flat_map(|state| state.transitions.keys().copied())
            .collect()
    }

    pub fn transition(&self, from: DfaStateId, symbol: Symbol) -> Option<DfaStateId> {
        self.states[from].transitions.get(&symbol).copied()
    }

    pub fn simulate(&self, input: &str) -> bool {
        let mut state = self.initial_state;

        for c in input.chars() {
            let next = Symbol::from_char(c).and_then(|symbol| self.transition(state, symbol));
            match next {
                Some(next) => state = next,
                None => return false,
            }
        }

        self.states[state].accepting
    }
}
