use std::collections::BTreeSet;

use crate::nfa::{Nfa, NfaError};
use crate::token::{Symbol, Token};
use crate::{compile, Compiled, Error, RegexError};

fn compile_regex(re_str: &str, quiet: bool) -> Compiled {
    let compiled = compile(re_str).expect("failed to compile regex");
    if !quiet {
        println!("postfix = {:?}", compiled.regex.postfix());
        println!("nfa = {}", compiled.nfa.export());
        println!("dfa = {}", compiled.dfa.export());
        println!("minimized = {}", compiled.minimized.export());
    }

    compiled
}

// every automaton of the pipeline has to agree with the expected verdict
fn run_vectors(tests: &[(&str, bool)], compiled: &Compiled, re_str: &str) {
    for (test, expected_result) in tests {
        let verdicts = [
            ("nfa", compiled.nfa.simulate(test)),
            ("dfa", compiled.dfa.simulate(test)),
            ("minimized", compiled.minimized.simulate(test)),
        ];
        for (stage, result) in verdicts {
            assert_eq!(
                result, *expected_result,
                "'{}' failed on input '{}' ({}), expect match: {}, actual match: {}",
                re_str, test, stage, expected_result, result
            );
        }
    }
}

// all strings over `chars` of length <= max_len
fn enumerate_strings(chars: &[char], max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut next = Vec::with_capacity(frontier.len() * chars.len());
        for prefix in &frontier {
            for c in chars {
                let mut s = prefix.clone();
                s.push(*c);
                next.push(s);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }

    all
}

// the automaton's alphabet plus one alphanumeric it never mentions
fn test_chars(alphabet: &BTreeSet<Symbol>) -> Vec<char> {
    let mut chars: Vec<char> = alphabet.iter().map(|x| x.to_string().chars().next().unwrap()).collect();
    let foreign = ('a'..='z')
        .chain('0'..='9')
        .find(|c| !chars.contains(c))
        .unwrap();
    chars.push(foreign);
    chars
}

fn max_len_for(n_chars: usize) -> usize {
    let mut len = 0;
    while len < 6 && n_chars.pow(len as u32 + 1) <= 20_000 {
        len += 1;
    }
    len
}

fn assert_language_equivalent(re_str: &str) {
    let compiled = compile_regex(re_str, true);
    let chars = test_chars(&compiled.nfa.alphabet());
    for input in enumerate_strings(&chars, max_len_for(chars.len())) {
        let expected = compiled.nfa.simulate(&input);
        assert_eq!(compiled.dfa.simulate(&input), expected, "'{}' dfa disagrees on '{}'", re_str, input);
        assert_eq!(
            compiled.minimized.simulate(&input),
            expected,
            "'{}' minimized dfa disagrees on '{}'",
            re_str,
            input
        );
    }
}

const REGEXES: &[&str] = &[
    "(a|b)*abb",
    "ab*c+",
    "(a|b)(c|d)*e",
    "a(b|c)*d",
    "a*b*",
    "ab(c|d)*ef",
    "(a|b|c|d|e)*abc",
    "((ab|cd)*)*",
    "[a-cA-C0-3]+",
    "a?b?c?",
    "(a|ab)(c|bcd)",
    "a.b*",
    "((a?)+)*b",
];

#[test]
fn basic() {
    let re_str = r"a(b|c)*";
    let compiled = compile_regex(re_str, false);

    let test_vectors = vec![
        ("a", true),
        ("b", false),
        ("x", false),
        ("ab", true),
        ("ac", true),
        ("abcbc", true),
        ("acbcb", true),
        ("bcbc", false),
        ("abbbbbbbbbb", true),
    ];

    run_vectors(&test_vectors, &compiled, re_str)
}

#[test]
fn star_plus_end_to_end() {
    let re_str = r"ab*c+";
    let compiled = compile_regex(re_str, false);

    let test_vectors = vec![
        ("ac", true),
        ("abc", true),
        ("abbbcc", true),
        ("a", false),
        ("b", false),
        ("abb", false),
        ("cab", false),
        ("", false),
    ];

    run_vectors(&test_vectors, &compiled, re_str);
    assert_eq!(compiled.minimized.len(), 3);
}

#[test]
fn character_class() {
    let re_str = r"[a-fA-Z]+";
    let compiled = compile_regex(re_str, true);

    let test_vectors = vec![
        ("a", true),
        ("b", true),
        ("x", false),
        ("ABCDEF", true),
        ("", false),
        ("g", false),
        ("GG", true),
        ("1234", false),
        ("qqqqq", false),
    ];

    run_vectors(&test_vectors, &compiled, re_str)
}

#[test]
fn optional() {
    let re_str = r"(a*b)?c";
    let compiled = compile_regex(re_str, false);

    let test_vectors = vec![
        ("c", true),
        ("bc", true),
        ("aaabc", true),
        ("ac", false),
        ("b", false),
        ("abcc", false),
    ];

    run_vectors(&test_vectors, &compiled, re_str)
}

#[test]
fn single_literal() {
    let compiled = compile_regex("a", false);

    assert_eq!(compiled.nfa.len(), 2);
    assert_eq!(compiled.dfa.len(), 2);
    assert_eq!(compiled.minimized.len(), 2);
    run_vectors(&[("a", true), ("", false), ("aa", false)], &compiled, "a");
}

#[test]
fn classic_dragon_book_example() {
    let re_str = "(a|b)*abb";
    let compiled = compile_regex(re_str, false);

    assert_eq!(compiled.nfa.len(), 14);
    assert_eq!(compiled.dfa.len(), 5);
    assert_eq!(compiled.minimized.len(), 4);

    let test_vectors = vec![
        ("abb", true),
        ("aabb", true),
        ("babb", true),
        ("abababb", true),
        ("ab", false),
        ("abba", false),
        ("", false),
    ];
    run_vectors(&test_vectors, &compiled, re_str);
}

#[test]
fn thompson_star_fragment() {
    let nfa = Nfa::from_postfix(&[Token::Literal(b'a'), Token::Star]).expect("failed to build nfa");

    assert_eq!(nfa.len(), 4);
    assert_eq!(nfa.start().index(), 2);
    assert_eq!(nfa.accept().index(), 3);

    let targets = |i: usize| -> Vec<(Option<Symbol>, usize)> {
        let (_, state) = nfa.states().nth(i).expect("state should exist");
        state.transitions().iter().map(|(s, next)| (*s, next.index())).collect()
    };
    assert_eq!(targets(0), vec![(Some(Symbol::Char(b'a')), 1)]);
    assert_eq!(targets(1), vec![(None, 0), (None, 3)]);
    assert_eq!(targets(2), vec![(None, 0), (None, 3)]);
    assert!(targets(3).is_empty());
}

#[test]
fn plus_requires_one_pass() {
    let nfa = Nfa::from_postfix(&[Token::Literal(b'a'), Token::Plus]).expect("failed to build nfa");

    assert!(!nfa.simulate(""));
    assert!(nfa.simulate("a"));
    assert!(nfa.simulate("aaa"));
}

#[test]
fn state_ids_are_dense() {
    for re_str in REGEXES {
        let compiled = compile_regex(re_str, true);
        for (_, state) in compiled.nfa.states() {
            for (_, next) in state.transitions() {
                assert!(next.index() < compiled.nfa.len(), "'{}' has a dangling edge", re_str);
            }
        }
    }
}

#[test]
fn language_equivalence() {
    for re_str in REGEXES {
        assert_language_equivalent(re_str);
    }
}

#[test]
fn dfa_is_deterministic() {
    for re_str in REGEXES {
        let compiled = compile_regex(re_str, true);
        assert!(compiled.dfa.export().is_deterministic(), "'{}' dfa", re_str);
        assert!(compiled.minimized.export().is_deterministic(), "'{}' minimized", re_str);
    }

    let compiled = compile_regex("(a|b)*abb", true);
    assert!(!compiled.nfa.export().is_deterministic());
}

#[test]
fn subset_states_are_unique() {
    for re_str in REGEXES {
        let compiled = compile_regex(re_str, true);
        let members: BTreeSet<Vec<usize>> = compiled
            .dfa
            .states()
            .map(|(_, state)| state.members().iter().collect())
            .collect();
        assert_eq!(members.len(), compiled.dfa.len(), "'{}' has duplicate subsets", re_str);
    }
}

#[test]
fn minimization_is_idempotent() {
    for re_str in REGEXES {
        let compiled = compile_regex(re_str, true);
        let again = compiled.minimized.minimize();
        assert_eq!(again.len(), compiled.minimized.len(), "'{}'", re_str);

        // labels may be handed out in another order, behavior may not change
        let chars = test_chars(&compiled.nfa.alphabet());
        for input in enumerate_strings(&chars, 4) {
            assert_eq!(again.simulate(&input), compiled.minimized.simulate(&input), "'{}' on '{}'", re_str, input);
        }
    }
}

#[test]
fn minimized_start_contains_original_start() {
    for re_str in REGEXES {
        let compiled = compile_regex(re_str, true);
        let start = compiled.minimized.state(compiled.minimized.initial_state());
        assert!(start.members().contains(compiled.dfa.initial_state().index()));
        assert_eq!(start.label(), "M".to_string() + &compiled.minimized.initial_state().to_string());
    }
}

#[test]
fn everything_equivalent_collapses() {
    let compiled = compile_regex("(a|b)*", true);
    assert_eq!(compiled.minimized.len(), 1);
    assert!(compiled.minimized.simulate(""));
    assert!(compiled.minimized.simulate("abba"));
}

#[test]
fn class_equals_alternation() {
    let class = compile_regex("[a-c]", true);
    let alternation = compile_regex("a|b|c", true);
    assert_eq!(class.minimized.len(), alternation.minimized.len());
    assert_eq!(class.regex.postfix(), compile_regex("(a|b|c)", true).regex.postfix());

    let chars = test_chars(&class.nfa.alphabet());
    for input in enumerate_strings(&chars, 3) {
        assert_eq!(class.minimized.simulate(&input), alternation.minimized.simulate(&input));
    }

    let sorted = compile_regex("[abc]", true);
    let unsorted = compile_regex("[cba]", true);
    assert_eq!(sorted.nfa.export(), unsorted.nfa.export());
    assert_eq!(sorted.minimized.export(), unsorted.minimized.export());
}

#[test]
fn stacked_postfix_operators() {
    let star = compile_regex("a*", true);
    for re_str in ["a?*", "a*?", "a+*", "a*+", "a?+", "a+?"] {
        let compiled = compile_regex(re_str, true);
        for input in ["", "a", "aa", "aaa", "b", "ab"] {
            assert_eq!(
                compiled.minimized.simulate(input),
                star.minimized.simulate(input),
                "'{}' on '{}'",
                re_str,
                input
            );
        }
    }
}

#[test]
fn wildcard_is_a_symbol() {
    let re_str = "a.b";
    let compiled = compile_regex(re_str, true);
    assert!(compiled.nfa.alphabet().contains(&Symbol::Wildcard));
    run_vectors(&[("a.b", true), ("axb", false), ("ab", false)], &compiled, re_str);
}

#[test]
fn epsilon_token() {
    let nfa = Nfa::from_postfix(&[Token::Epsilon]).expect("failed to build nfa");
    assert!(nfa.simulate(""));
    assert!(!nfa.simulate("a"));
    assert!(nfa.alphabet().is_empty());

    // a | ε behaves like a?
    let postfix = [Token::Literal(b'a'), Token::Epsilon, Token::Alternation];
    let nfa = Nfa::from_postfix(&postfix).expect("failed to build nfa");
    assert!(nfa.simulate(""));
    assert!(nfa.simulate("a"));
    assert!(!nfa.simulate("aa"));
}

#[test]
fn construction_errors() {
    assert_eq!(
        Nfa::from_postfix(&[Token::Concatenation]).map(|_| ()),
        Err(NfaError::InsufficientOperands {
            operator: Token::Concatenation,
            required: 2,
            found: 0
        })
    );
    assert_eq!(
        Nfa::from_postfix(&[Token::Star]).map(|_| ()),
        Err(NfaError::InsufficientOperands {
            operator: Token::Star,
            required: 1,
            found: 0
        })
    );
    assert_eq!(
        Nfa::from_postfix(&[Token::Literal(b'a'), Token::Literal(b'b')]).map(|_| ()),
        Err(NfaError::Malformed { remaining: 2 })
    );
    assert_eq!(
        Nfa::from_postfix(&[]).map(|_| ()),
        Err(NfaError::Malformed { remaining: 0 })
    );
    assert_eq!(
        Nfa::from_postfix(&[Token::LeftParen]).map(|_| ()),
        Err(NfaError::UnexpectedToken(Token::LeftParen))
    );
}

#[test]
fn pipeline_errors() {
    assert_eq!(
        compile("(a|b").map(|_| ()),
        Err(Error::Regex(RegexError::MismatchedParentheses('(')))
    );
    assert_eq!(
        compile("a#b").map(|_| ()),
        Err(Error::Regex(RegexError::UnexpectedCharacter {
            character: '#',
            position: 1
        }))
    );
    assert_eq!(
        compile("a()").map(|_| ()),
        Err(Error::Nfa(NfaError::InsufficientOperands {
            operator: Token::Concatenation,
            required: 2,
            found: 1
        }))
    );
    assert_eq!(compile("").map(|_| ()), Err(Error::Nfa(NfaError::Malformed { remaining: 0 })));
    assert_eq!(compile("()").map(|_| ()), Err(Error::Nfa(NfaError::Malformed { remaining: 0 })));
}
