// regex front end: raw string -> infix tokens -> postfix tokens
// supported syntax
// <regex>  ::= <regex> '|' <regex> | <regex> <regex> | <factor>
// <factor> ::= <base> { '*' | '+' | '?' }
// <base>   ::= <alnum> | '.' | '(' <regex> ')' | '[' <class> ']'
// <class>  ::= ( <alnum> | <alnum> '-' <alnum> )+
//
// classes are rewritten into a parenthesized alternation before tokenizing,
// there is no escape syntax and no negation

use std::collections::BTreeSet;
use std::str::FromStr;

use thiserror::Error;

use crate::token::Token;
use crate::AsciiChar;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegexError {
    #[error("unterminated character class starting at position {position}")]
    UnterminatedClass { position: usize },
    #[error("empty character class at position {position}")]
    EmptyClass { position: usize },
    #[error("invalid range '{start}-{end}' in character class at position {position}")]
    InvalidRange {
        start: char,
        end: char,
        position: usize,
    },
    #[error("invalid character '{character}' in character class at position {position}")]
    InvalidClassCharacter { character: char, position: usize },
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("mismatched parentheses: unmatched '{0}'")]
    MismatchedParentheses(char),
}

/// A parsed regex, kept in both infix (after concatenation insertion) and postfix order.
#[derive(Clone, Debug)]
pub struct Regex {
    pub(crate) infix: Vec<Token>,
    pub(crate) postfix: Vec<Token>,
}

impl Regex {
    pub fn infix(&self) -> &[Token] {
        &self.infix
    }

    pub fn postfix(&self) -> &[Token] {
        &self.postfix
    }
}

impl FromStr for Regex {
    type Err = RegexError;

    fn from_str(re_str: &str) -> Result<Regex, RegexError> {
        let tokens = tokenize(re_str)?;
        let infix = insert_concatenation(&tokens);
        let postfix = to_postfix(&infix)?;
        log::trace!("'{}': infix = {}", re_str, render(&infix));
        log::trace!("'{}': postfix = {}", re_str, render(&postfix));

        Ok(Regex { infix, postfix })
    }
}

/// Renders tokens separated by spaces, e.g. `a b | * a · b ·`.
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tokenize(re_str: &str) -> Result<Vec<Token>, RegexError> {
    let chars: Vec<char> = re_str.chars().collect();
    let mut tokens: Vec<Token> = Vec::with_capacity(chars.len());

    let mut i = 0;
    while i < chars.len() {
        let token = match chars[i] {
            '[' => {
                // classes do not nest, the first ']' closes
                let close = chars[i + 1..]
                    .iter()
                    .position(|x| *x == ']')
                    .map(|offset| i + 1 + offset)
                    .ok_or(RegexError::UnterminatedClass { position: i })?;

                let body: String = chars[i + 1..close].iter().collect();
                let expanded = expand_class(&body, i + 1)?;
                tokens.extend(tokenize(&expanded)?);

                i = close + 1;
                continue;
            }
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '*' => Token::Star,
            '+' => Token::Plus,
            '?' => Token::Question,
            '|' => Token::Alternation,
            '.' => Token::Wildcard,
            c if c.is_ascii_alphanumeric() => Token::Literal(c as AsciiChar),
            c => {
                return Err(RegexError::UnexpectedCharacter {
                    character: c,
                    position: i,
                })
            }
        };

        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

// digits, upper case and lower case are separate runs, a range may not cross them
fn same_run(start: char, end: char) -> bool {
    (start.is_ascii_digit() && end.is_ascii_digit())
        || (start.is_ascii_uppercase() && end.is_ascii_uppercase())
        || (start.is_ascii_lowercase() && end.is_ascii_lowercase())
}

/// Expands the body of a character class (without brackets) into an alternation,
/// e.g. `ca-b` -> `(a|b|c)`. Members come out sorted and deduplicated.
/// `offset` is the position of the body's first character in the whole regex.
pub fn expand_class(body: &str, offset: usize) -> Result<String, RegexError> {
    let content: Vec<char> = body.chars().collect();
    let mut members: BTreeSet<char> = BTreeSet::new();

    let mut i = 0;
    while i < content.len() {
        if i + 2 < content.len() && content[i + 1] == '-' {
            let (start, end) = (content[i], content[i + 2]);
            if !same_run(start, end) || start > end {
                return Err(RegexError::InvalidRange {
                    start,
                    end,
                    position: offset + i,
                });
            }

            members.extend(start..=end);
            i += 3;
        } else {
            let c = content[i];
            if !c.is_ascii_alphanumeric() {
                return Err(RegexError::InvalidClassCharacter {
                    character: c,
                    position: offset + i,
                });
            }

            members.insert(c);
            i += 1;
        }
    }

    if members.is_empty() {
        // point at the '['
        return Err(RegexError::EmptyClass {
            position: offset.saturating_sub(1),
        });
    }

    let alternates: Vec<String> = members.iter().map(|x| x.to_string()).collect();
    Ok(format!("({})", alternates.join("|")))
}

/// Makes juxtaposition explicit by inserting `Token::Concatenation`.
pub fn insert_concatenation(tokens: &[Token]) -> Vec<Token> {
    let mut result: Vec<Token> = Vec::with_capacity(tokens.len() * 2);

    for (i, token) in tokens.iter().copied().enumerate() {
        result.push(token);
        if let Some(next) = tokens.get(i + 1) {
            if token.ends_operand() && next.starts_operand() {
                result.push(Token::Concatenation);
            }
        }
    }

    result
}

/// Shunting-yard conversion of an explicit-concatenation infix stream to postfix.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, RegexError> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens.iter().copied() {
        match token {
            Token::Literal(_) | Token::Wildcard | Token::Epsilon => output.push(token),
            Token::LeftParen => operators.push(token),
            Token::RightParen => loop {
                match operators.pop() {
                    Some(Token::LeftParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(RegexError::MismatchedParentheses(')')),
                }
            },
            Token::Star
            | Token::Plus
            | Token::Question
            | Token::Concatenation
            | Token::Alternation => {
                // equal precedence pops first, so everything is left associative
                while let Some(top) = operators.last().copied() {
                    if top == Token::LeftParen || top.precedence() < token.precedence() {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push(token);
            }
        }
    }

    while let Some(op) = operators.pop() {
        if op == Token::LeftParen {
            return Err(RegexError::MismatchedParentheses('('));
        }
        output.push(op);
    }

    Ok(output)
}
