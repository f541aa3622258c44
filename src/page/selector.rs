use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::page::simulated::Element;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected '{ch}' at {position}")]
    Unexpected { ch: char, position: usize },

    #[error("missing name after '{marker}' at {position}")]
    MissingName { marker: char, position: usize },

    #[error("unterminated attribute selector at {position}")]
    Unterminated { position: usize },
}

/// One `tag#id.class[attr=value]` term of a selector list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Attribute name and, when given, the required value
    pub attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.classes.contains(c)) {
            return false;
        }
        self.attributes.iter().all(|(attr, expected)| {
            match (element.attribute(attr), expected) {
                (Some(actual), Some(expected)) => actual == expected.as_str(),
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

/// Comma-separated list of compound selectors. Combinators are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let alternatives = source
            .split(',')
            .map(parse_compound)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { alternatives })
    }

    pub fn alternatives(&self) -> &[Compound] {
        &self.alternatives
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }
}

fn parse_compound(term: &str) -> Result<Compound, SelectorError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(SelectorError::Empty);
    }

    let mut compound = Compound::default();
    if term == "*" {
        return Ok(compound);
    }

    let mut chars = term.char_indices().peekable();
    let tag = take_ident(&mut chars);
    if !tag.is_empty() {
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    while let Some((position, ch)) = chars.next() {
        match ch {
            '#' => compound.id = Some(expect_ident(&mut chars, ch, position)?),
            '.' => compound.classes.push(expect_ident(&mut chars, ch, position)?),
            '[' => compound.attributes.push(parse_attribute(&mut chars, position)?),
            _ => return Err(SelectorError::Unexpected { ch, position }),
        }
    }

    Ok(compound)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

fn take_ident(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&(_, ch)) = chars.peek() {
        if !is_ident_char(ch) {
            break;
        }
        ident.push(ch);
        chars.next();
    }
    ident
}

fn expect_ident(
    chars: &mut Peekable<CharIndices<'_>>,
    marker: char,
    position: usize,
) -> Result<String, SelectorError> {
    let ident = take_ident(chars);
    if ident.is_empty() {
        return Err(SelectorError::MissingName { marker, position });
    }
    Ok(ident)
}

fn parse_attribute(
    chars: &mut Peekable<CharIndices<'_>>,
    position: usize,
) -> Result<(String, Option<String>), SelectorError> {
    let mut body = String::new();
    loop {
        match chars.next() {
            Some((_, ']')) => break,
            Some((_, ch)) => body.push(ch),
            None => return Err(SelectorError::Unterminated { position }),
        }
    }

    let (name, value) = match body.split_once('=') {
        Some((name, value)) => {
            let value = value.trim().trim_matches(|c: char| c == '"' || c == '\'');
            (name.trim(), Some(value.to_string()))
        }
        None => (body.trim(), None),
    };

    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(SelectorError::MissingName {
            marker: '[',
            position,
        });
    }
    Ok((name.to_string(), value))
}
