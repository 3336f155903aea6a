use std::collections::BTreeMap;

use bit_set::BitSet;
use indexmap::IndexMap;

use crate::dfa::{Dfa, DfaState, DfaStateId};
use crate::token::Symbol;

// for every state: index of the block containing it
fn block_index(partitions: &[BitSet], n_states: usize) -> Vec<usize> {
    let mut block_of = vec![0; n_states];
    for (i, block) in partitions.iter().enumerate() {
        for state in block.iter() {
            block_of[state] = i;
        }
    }

    block_of
}

impl Dfa {
    // the outgoing symbols of a state, each paired with the block its successor lives in
    fn signature(&self, state: usize, block_of: &[usize]) -> Vec<(Symbol, usize)> {
        self.states[state]
            .transitions
            .iter()
            .map(|(symbol, next)| (*symbol, block_of[next.index()]))
            .collect()
    }

    // one refinement pass, every block is split by signature
    fn refine(&self, partitions: &[BitSet]) -> Vec<BitSet> {
        let block_of = block_index(partitions, self.states.len());
        let mut refined: Vec<BitSet> = Vec::with_capacity(partitions.len());

        for block in partitions {
            let mut groups: IndexMap<Vec<(Symbol, usize)>, BitSet> = IndexMap::new();
            for state in block.iter() {
                groups
                    .entry(self.signature(state, &block_of))
                    .or_default()
                    .insert(state);
            }
            refined.extend(groups.into_values());
        }

        refined
    }

    /// Moore-style partition refinement. Starts from {accepting, non-accepting}
    /// and splits blocks until a full pass splits nothing.
    pub fn minimize(&self) -> Dfa {
        let n_states = self.states.len();
        let accept: BitSet = (0..n_states).filter(|x| self.states[*x].accepting).collect();
        let mut nonaccept: BitSet = (0..n_states).collect();
        nonaccept.difference_with(&accept);

        let mut partitions: Vec<BitSet> = [accept, nonaccept]
            .into_iter()
            .filter(|x| !x.is_empty())
            .collect();

        let mut passes = 0;
        loop {
            let refined = self.refine(&partitions);
            passes += 1;
            log::trace!("refinement pass {}: {} blocks", passes, refined.len());

            // refinement only ever splits, so an unchanged count means a fixed point
            if refined.len() == partitions.len() {
                break;
            }
            partitions = refined;
        }

        let block_of = block_index(&partitions, n_states);
        let states: Vec<DfaState> = partitions
            .into_iter()
            .enumerate()
            .map(|(i, block)| {
                // all members behave the same, any of them can stand in for the block
                let first = block.iter().next().expect("partition should be nonempty");
                let representative = &self.states[first];
                let transitions: BTreeMap<Symbol, DfaStateId> = representative
                    .transitions
                    .iter()
                    .map(|(symbol, next)| (*symbol, DfaStateId::from_index(block_of[next.index()])))
                    .collect();

                DfaState {
                    label: format!("M{}", i),
                    accepting: representative.accepting,
                    members: block,
                    transitions,
                }
            })
            .collect();

        log::debug!(
            "minimized {} dfa states into {} after {} passes",
            n_states,
            states.len(),
            passes
        );

        Dfa {
            states,
            initial_state: DfaStateId::from_index(block_of[self.initial_state.index()]),
        }
    }
}
