use std::collections::BTreeSet;

use bit_set::BitSet;
use refa_util::make_type_idx;
use thiserror::Error;

use crate::regex::Regex;
use crate::token::{Symbol, Token};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NfaError {
    #[error("insufficient operands for '{operator}': needs {required}, found {found}")]
    InsufficientOperands {
        operator: Token,
        required: usize,
        found: usize,
    },
    #[error("malformed expression: {remaining} fragments left on the stack instead of 1")]
    Malformed { remaining: usize },
    #[error("token '{0}' cannot appear in a postfix expression")]
    UnexpectedToken(Token),
}

// edges are (symbol, target), None is an epsilon edge
#[derive(Clone, Debug, Default)]
pub struct NfaState {
    pub(crate) transitions: Vec<(Option<Symbol>, NfaStateId)>,
}

make_type_idx!(pub NfaStateId, NfaState);

impl NfaState {
    pub fn transitions(&self) -> &[(Option<Symbol>, NfaStateId)] {
        &self.transitions
    }
}

/// Thompson NFA: exactly one start and one accept state.
#[derive(Clone, Debug)]
pub struct Nfa {
    pub(crate) states: Vec<NfaState>,
    pub(crate) start: NfaStateId,
    pub(crate) accept: NfaStateId,
}

// single entry, single exit piece of an NFA under construction
#[derive(Clone, Copy, Debug)]
struct Fragment {
    start: NfaStateId,
    accept: NfaStateId,
}

/// Construction context for one NFA. State ids are arena indices handed out in
/// push order, so they are unique and increasing across every fragment built
/// by the same builder.
#[derive(Default)]
pub struct NfaBuilder {
    states: Vec<NfaState>,
}

impl NfaBuilder {
    pub fn new() -> NfaBuilder {
        NfaBuilder::default()
    }

    fn new_state(&mut self) -> NfaStateId {
        NfaStateId::from_push(&mut self.states, NfaState::default())
    }

    fn add_edge(&mut self, from: NfaStateId, symbol: Option<Symbol>, to: NfaStateId) {
        self.states[from].transitions.push((symbol, to));
    }

    fn literal(&mut self, symbol: Option<Symbol>) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.add_edge(start, symbol, accept);

        Fragment { start, accept }
    }

    fn concatenate(&mut self, a: Fragment, b: Fragment) -> Fragment {
        self.add_edge(a.accept, None, b.start);

        Fragment {
            start: a.start,
            accept: b.accept,
        }
    }

    fn alternate(&mut self, a: Fragment, b: Fragment) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.add_edge(start, None, a.start);
        self.add_edge(start, None, b.start);
        self.add_edge(a.accept, None, accept);
        self.add_edge(b.accept, None, accept);

        Fragment { start, accept }
    }

    fn star(&mut self, a: Fragment) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.add_edge(start, None, a.start);
        self.add_edge(start, None, accept);
        self.add_edge(a.accept, None, a.start);
        self.add_edge(a.accept, None, accept);

        Fragment { start, accept }
    }

    // like star, minus the skip edge
    fn plus(&mut self, a: Fragment) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.add_edge(start, None, a.start);
        self.add_edge(a.accept, None, a.start);
        self.add_edge(a.accept, None, accept);

        Fragment { start, accept }
    }

    fn optional(&mut self, a: Fragment) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.add_edge(start, None, a.start);
        self.add_edge(start, None, accept);
        self.add_edge(a.accept, None, accept);

        Fragment { start, accept }
    }

    fn pop_operands<const N: usize>(
        stack: &mut Vec<Fragment>,
        operator: Token,
    ) -> Result<[Fragment; N], NfaError> {
        let insufficient = |found: usize| NfaError::InsufficientOperands {
            operator,
            required: N,
            found,
        };

        if stack.len() < N {
            return Err(insufficient(stack.len()));
        }

        let found = stack.len();
        let operands = stack.split_off(stack.len() - N);
        operands.try_into().map_err(|_| insufficient(found))
    }

    /// Consumes a postfix token stream, see `Regex::postfix`.
    pub fn build(mut self, postfix: &[Token]) -> Result<Nfa, NfaError> {
        let mut stack: Vec<Fragment> = Vec::new();

        for token in postfix.iter().copied() {
            let fragment = match token {
                Token::Literal(c) => self.literal(Some(Symbol::Char(c))),
                Token::Wildcard => self.literal(Some(Symbol::Wildcard)),
                Token::Epsilon => self.literal(None),
                Token::Concatenation => {
                    let [a, b] = Self::pop_operands::<2>(&mut stack, token)?;
                    self.concatenate(a, b)
                }
                Token::Alternation => {
                    let [a, b] = Self::pop_operands::<2>(&mut stack, token)?;
                    self.alternate(a, b)
                }
                Token::Star => {
                    let [a] = Self::pop_operands::<1>(&mut stack, token)?;
                    self.star(a)
                }
                Token::Plus => {
                    let [a] = Self::pop_operands::<1>(&mut stack, token)?;
                    self.plus(a)
                }
                Token::Question => {
                    let [a] = Self::pop_operands::<1>(&mut stack, token)?;
                    self.optional(a)
                }
                Token::LeftParen | Token::RightParen => {
                    return Err(NfaError::UnexpectedToken(token))
                }
            };

            stack.push(fragment);
        }

        match stack.as_slice() {
            [fragment] => Ok(Nfa {
                start: fragment.start,
                accept: fragment.accept,
                states: self.states,
            }),
            _ => Err(NfaError::Malformed {
                remaining: stack.len(),
            }),
        }
    }
}

impl Nfa {
    // creates a NFA from a regex using Thompson's Construction
    pub fn from_regex(re: &Regex) -> Result<Nfa, NfaError> {
        let nfa = Self::from_postfix(re.postfix())?;
        log::debug!("thompson construction produced {} nfa states", nfa.len());
        Ok(nfa)
    }

    pub fn from_postfix(postfix: &[Token]) -> Result<Nfa, NfaError> {
        NfaBuilder::new().build(postfix)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn start(&self) -> NfaStateId {
        self.start
    }

    pub fn accept(&self) -> NfaStateId {
        self.accept
    }

    pub fn state(&self, id: NfaStateId) -> &NfaState {
        &self.states[id]
    }

    pub fn states(&self) -> impl Iterator<Item = (NfaStateId, &NfaState)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| (NfaStateId::from_index(i), state))
    }

    /// Every non-epsilon symbol on any edge.
    pub fn alphabet(&self) -> BTreeSet<Symbol> {
        self.states
            .iter()
            .flat_map(|state| state.transitions.iter())
            .filter_map(|(symbol, _)| *symbol)
            .collect()
    }

    /// States reachable from `seed` over epsilon edges only, `seed` included.
    pub fn epsilon_closure(&self, seed: &BitSet) -> BitSet {
        let mut closure = seed.clone();
        let mut stack: Vec<usize> = seed.iter().collect();

        while let Some(i) = stack.pop() {
            for (symbol, next) in &self.states[i].transitions {
                if symbol.is_none() && closure.insert(next.index()) {
                    stack.push(next.index());
                }
            }
        }

        closure
    }

    /// Targets of `symbol` edges out of any state in `set`, without closing over epsilons.
    pub fn delta(&self, set: &BitSet, symbol: Symbol) -> BitSet {
        let mut result = BitSet::with_capacity(self.states.len());

        for i in set.iter() {
            for (label, next) in &self.states[i].transitions {
                if *label == Some(symbol) {
                    result.insert(next.index());
                }
            }
        }

        result
    }

    pub fn simulate(&self, input: &str) -> bool {
        let mut initial = BitSet::with_capacity(self.states.len());
        initial.insert(self.start.index());
        let mut current = self.epsilon_closure(&initial);

        for c in input.chars() {
            let Some(symbol) = Symbol::from_char(c) else {
                return false;
            };

            current = self.epsilon_closure(&self.delta(&current, symbol));
            if current.is_empty() {
                return false;
            }
        }

        current.contains(self.accept.index())
    }
}
