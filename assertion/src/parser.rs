//! Assertion expressions: parse, render, combine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::component::AssertionComponent;
use crate::error::ParseError;

const OR: char = ',';
const AND: char = '+';

/// A conjunction of terms; every term must denote the same user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conjunction {
    pub terms: Vec<AssertionComponent>,
}

/// A disjunction of conjunctions, evaluated left to right.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assertion {
    pub any_of: Vec<Conjunction>,
}

/// Parse an assertion string. Pure: performs no lookups.
pub fn parse(input: &str) -> Result<Assertion, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut any_of = Vec::new();
    let mut position = 0usize;
    for alternative in input.split(OR) {
        let mut terms = Vec::new();
        for term in alternative.split(AND) {
            if term.trim().is_empty() {
                return Err(ParseError::EmptyTerm { position });
            }
            terms.push(AssertionComponent::parse(term)?);
            position += 1;
        }
        any_of.push(Conjunction { terms });
    }
    Ok(Assertion { any_of })
}

impl Conjunction {
    /// Canonical text of this conjunction.
    pub fn render(&self) -> String {
        self.terms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl Assertion {
    /// An assertion naming a single user on the default service.
    pub fn username(name: &str) -> Result<Self, ParseError> {
        let term = AssertionComponent::parse(name)?;
        if term.service != crate::component::DEFAULT_SERVICE {
            return Err(ParseError::InvalidValue { term: name.to_string() });
        }
        Ok(Self {
            any_of: vec![Conjunction { terms: vec![term] }],
        })
    }

    /// Canonical text: `a+b,c`. Reparsing the result yields an equal tree.
    pub fn render(&self) -> String {
        self.any_of
            .iter()
            .map(Conjunction::render)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `self AND other`, distributed back into disjunctive form.
    pub fn and(&self, other: &Assertion) -> Assertion {
        let mut any_of = Vec::with_capacity(self.any_of.len() * other.any_of.len());
        for left in &self.any_of {
            for right in &other.any_of {
                let mut terms = left.terms.clone();
                for term in &right.terms {
                    if !terms.contains(term) {
                        terms.push(term.clone());
                    }
                }
                any_of.push(Conjunction { terms });
            }
        }
        Assertion { any_of }
    }

    /// Every term in the expression, in order.
    pub fn components(&self) -> impl Iterator<Item = &AssertionComponent> {
        self.any_of.iter().flat_map(|c| c.terms.iter())
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for Assertion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
