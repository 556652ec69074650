//! Boolean guards over specie levels.
//!
//! The grammar covers atoms `specie OP value` with `OP` one of `<`, `=`,
//! `>`, the constants `tt` and `ff`, negation `!`, conjunction `&`,
//! disjunction `|` and parentheses. A guard is parsed once into a tree and
//! then evaluated against level vectors by truth substitution.

use std::fmt;

use serde::{Deserialize, Serialize};

use grn_core::{ActLevel, ErrorInfo, SpecieId, SynthError};

use crate::network::Network;

/// Comparison operator of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cmp {
    /// Strictly below the value.
    Lt,
    /// Exactly the value.
    Eq,
    /// Strictly above the value.
    Gt,
}

/// Parsed boolean guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formula {
    /// Always true (`tt`).
    True,
    /// Always false (`ff`).
    False,
    /// Comparison of one specie's level against a constant.
    Atom {
        /// Specie whose level is compared.
        specie: SpecieId,
        /// Comparison operator.
        cmp: Cmp,
        /// Constant to compare against.
        value: ActLevel,
    },
    /// Negation.
    Not(Box<Formula>),
    /// Conjunction.
    And(Box<Formula>, Box<Formula>),
    /// Disjunction.
    Or(Box<Formula>, Box<Formula>),
}

impl Formula {
    /// Parses a guard, resolving specie references against the network.
    pub fn parse(input: &str, network: &Network) -> Result<Self, SynthError> {
        let tokens = tokenize(input, network)?;
        let mut parser = Parser {
            input,
            tokens,
            at: 0,
        };
        let formula = parser.or_expr()?;
        if parser.at != parser.tokens.len() {
            return Err(parser.error("trailing symbols after the formula"));
        }
        Ok(formula)
    }

    /// Evaluates the guard at a vector of specie levels.
    pub fn eval(&self, levels: &[ActLevel]) -> bool {
        match self {
            Formula::True => true,
            Formula::False => false,
            Formula::Atom { specie, cmp, value } => match cmp {
                Cmp::Lt => levels[*specie] < *value,
                Cmp::Eq => levels[*specie] == *value,
                Cmp::Gt => levels[*specie] > *value,
            },
            Formula::Not(inner) => !inner.eval(levels),
            Formula::And(lhs, rhs) => lhs.eval(levels) && rhs.eval(levels),
            Formula::Or(lhs, rhs) => lhs.eval(levels) || rhs.eval(levels),
        }
    }

    /// Wraps the guard in a negation.
    pub fn negated(self) -> Self {
        Formula::Not(Box::new(self))
    }

    /// Renders the guard with specie ids in place of names; parseable back
    /// because species may be referenced by decimal index.
    fn render(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => write!(out, "tt"),
            Formula::False => write!(out, "ff"),
            Formula::Atom { specie, cmp, value } => {
                let op = match cmp {
                    Cmp::Lt => '<',
                    Cmp::Eq => '=',
                    Cmp::Gt => '>',
                };
                write!(out, "{specie}{op}{value}")
            }
            Formula::Not(inner) => {
                write!(out, "!(")?;
                inner.render(out)?;
                write!(out, ")")
            }
            Formula::And(lhs, rhs) => {
                write!(out, "(")?;
                lhs.render(out)?;
                write!(out, " & ")?;
                rhs.render(out)?;
                write!(out, ")")
            }
            Formula::Or(lhs, rhs) => {
                write!(out, "(")?;
                lhs.render(out)?;
                write!(out, " | ")?;
                rhs.render(out)?;
                write!(out, ")")
            }
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Not,
    And,
    Or,
    Open,
    Close,
    True,
    False,
    Atom(SpecieId, Cmp, ActLevel),
}

fn tokenize(input: &str, network: &Network) -> Result<Vec<Token>, SynthError> {
    let syntax = |message: &str, near: &str| {
        SynthError::Parse(
            ErrorInfo::new("guard-syntax", message)
                .with_context("formula", input)
                .with_context("near", near),
        )
    };
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut at = 0;
    while at < chars.len() {
        let c = chars[at];
        match c {
            ' ' | '\t' => at += 1,
            '!' => {
                tokens.push(Token::Not);
                at += 1;
            }
            '&' => {
                tokens.push(Token::And);
                at += 1;
            }
            '|' => {
                tokens.push(Token::Or);
                at += 1;
            }
            '(' => {
                tokens.push(Token::Open);
                at += 1;
            }
            ')' => {
                tokens.push(Token::Close);
                at += 1;
            }
            _ if c.is_ascii_alphanumeric() || c == '_' => {
                let start = at;
                while at < chars.len() && (chars[at].is_ascii_alphanumeric() || chars[at] == '_') {
                    at += 1;
                }
                let word: String = chars[start..at].iter().collect();
                if word == "tt" {
                    tokens.push(Token::True);
                    continue;
                }
                if word == "ff" {
                    tokens.push(Token::False);
                    continue;
                }
                while at < chars.len() && chars[at] == ' ' {
                    at += 1;
                }
                let cmp = match chars.get(at) {
                    Some('<') => Cmp::Lt,
                    Some('=') => Cmp::Eq,
                    Some('>') => Cmp::Gt,
                    _ => return Err(syntax("expected a comparison after the specie", &word)),
                };
                at += 1;
                while at < chars.len() && chars[at] == ' ' {
                    at += 1;
                }
                let digits_start = at;
                while at < chars.len() && chars[at].is_ascii_digit() {
                    at += 1;
                }
                if digits_start == at {
                    return Err(syntax("expected a level after the comparison", &word));
                }
                let value: ActLevel = chars[digits_start..at]
                    .iter()
                    .collect::<String>()
                    .parse()
                    .map_err(|_| syntax("level does not fit the value range", &word))?;
                let specie = network.find_specie(&word).ok_or_else(|| {
                    SynthError::Parse(
                        ErrorInfo::new("guard-specie", "formula names an unknown specie")
                            .with_context("formula", input)
                            .with_context("specie", word.clone()),
                    )
                })?;
                tokens.push(Token::Atom(specie, cmp, value));
            }
            _ => return Err(syntax("invalid symbol", &c.to_string())),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    at: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> SynthError {
        SynthError::Parse(
            ErrorInfo::new("guard-syntax", message).with_context("formula", self.input),
        )
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.at)
    }

    fn or_expr(&mut self) -> Result<Formula, SynthError> {
        let mut lhs = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.at += 1;
            let rhs = self.and_expr()?;
            lhs = Formula::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Formula, SynthError> {
        let mut lhs = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.at += 1;
            let rhs = self.unary()?;
            lhs = Formula::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Formula, SynthError> {
        match self.peek() {
            Some(Token::Not) => {
                self.at += 1;
                Ok(self.unary()?.negated())
            }
            Some(Token::Open) => {
                self.at += 1;
                let inner = self.or_expr()?;
                if self.peek() != Some(&Token::Close) {
                    return Err(self.error("missing closing parenthesis"));
                }
                self.at += 1;
                Ok(inner)
            }
            Some(Token::True) => {
                self.at += 1;
                Ok(Formula::True)
            }
            Some(Token::False) => {
                self.at += 1;
                Ok(Formula::False)
            }
            Some(Token::Atom(specie, cmp, value)) => {
                let atom = Formula::Atom {
                    specie: *specie,
                    cmp: *cmp,
                    value: *value,
                };
                self.at += 1;
                Ok(atom)
            }
            _ => Err(self.error("expected an atom, a constant or a parenthesised formula")),
        }
    }
}
