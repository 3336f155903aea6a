use std::fmt;

use crate::AsciiChar;

/// A symbol an automaton edge can consume. Epsilon edges carry no symbol at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Char(AsciiChar),
    Wildcard,
}

impl Symbol {
    pub const WILDCARD_LABEL: &'static str = ".";
    pub const EPSILON_LABEL: &'static str = "ε";

    // only alphanumerics and the wildcard are part of the input alphabet
    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            '.' => Some(Symbol::Wildcard),
            c if c.is_ascii_alphanumeric() => Some(Symbol::Char(c as AsciiChar)),
            _ => None,
        }
    }

    pub(crate) fn label(symbol: Option<Symbol>) -> String {
        match symbol {
            Some(symbol) => symbol.to_string(),
            None => Self::EPSILON_LABEL.to_string(),
        }
    }

    // inverse of `label`, outer None = not a symbol label at all
    pub(crate) fn from_label(label: &str) -> Option<Option<Symbol>> {
        if label == Self::EPSILON_LABEL {
            return Some(None);
        }

        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Symbol::from_char(c).map(Some),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Char(c) => write!(f, "{}", char::from(*c)),
            Symbol::Wildcard => f.write_str(Self::WILDCARD_LABEL),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Literal(AsciiChar),
    Wildcard,
    Epsilon,
    LeftParen,
    RightParen,
    Star,
    Plus,
    Question,
    Alternation,
    Concatenation,
}

impl Token {
    // binding strength of operators, higher binds tighter. 0 for everything else
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Token::Star => 5,
            Token::Plus => 4,
            Token::Question => 3,
            Token::Concatenation => 2,
            Token::Alternation => 1,
            Token::Literal(_)
            | Token::Wildcard
            | Token::Epsilon
            | Token::LeftParen
            | Token::RightParen => 0,
        }
    }

    // can end an operand, i.e. a following operand is juxtaposed onto it
    pub(crate) fn ends_operand(self) -> bool {
        match self {
            Token::Literal(_)
            | Token::Wildcard
            | Token::Epsilon
            | Token::RightParen
            | Token::Star
            | Token::Plus
            | Token::Question => true,
            Token::LeftParen | Token::Alternation | Token::Concatenation => false,
        }
    }

    pub(crate) fn starts_operand(self) -> bool {
        match self {
            Token::Literal(_) | Token::Wildcard | Token::Epsilon | Token::LeftParen => true,
            Token::RightParen
            | Token::Star
            | Token::Plus
            | Token::Question
            | Token::Alternation
            | Token::Concatenation => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(c) => write!(f, "{}", char::from(*c)),
            Token::Wildcard => f.write_str("."),
            Token::Epsilon => f.write_str("ε"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Star => f.write_str("*"),
            Token::Plus => f.write_str("+"),
            Token::Question => f.write_str("?"),
            Token::Alternation => f.write_str("|"),
            Token::Concatenation => f.write_str("·"),
        }
    }
}
