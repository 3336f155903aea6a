mod dfa;
mod export;
mod minimize;
mod nfa;
pub mod pattern_def;
pub mod regex;
mod token;

#[cfg(test)]
mod fa_tests;

use thiserror::Error;

pub type AsciiChar = u8;

pub use dfa::{Dfa, DfaState, DfaStateId};
pub use export::{ExportError, ExportedAutomaton, ExportedState};
pub use nfa::{Nfa, NfaBuilder, NfaError, NfaState, NfaStateId};
pub use regex::{Regex, RegexError};
pub use token::{Symbol, Token};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Regex(#[from] RegexError),
    #[error(transparent)]
    Nfa(#[from] NfaError),
}

/// Every stage of the pipeline for one regex.
#[derive(Clone, Debug)]
pub struct Compiled {
    pub regex: Regex,
    pub nfa: Nfa,
    pub dfa: Dfa,
    pub minimized: Dfa,
}

// regex -> postfix -> NFA -> DFA -> minimal DFA
pub fn compile(re_str: &str) -> Result<Compiled, Error> {
    let regex: Regex = re_str.parse()?;
    let nfa = Nfa::from_regex(&regex)?;
    let dfa = Dfa::from_nfa(&nfa);
    let minimized = dfa.minimize();
    log::debug!(
        "compiled '{}': {} nfa, {} dfa, {} minimized states",
        re_str,
        nfa.len(),
        dfa.len(),
        minimized.len()
    );

    Ok(Compiled {
        regex,
        nfa,
        dfa,
        minimized,
    })
}
