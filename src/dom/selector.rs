//! CSS-like selector parsing for scoped queries.
//!
//! Supports the subset the binding contract needs: tag names, `.class`,
//! `#id`, compounds (`tag.class`) and the descendant combinator
//! (whitespace). Tokenized with `logos`.

use std::fmt;
use std::str::FromStr;

use logos::Logos;
use thiserror::Error;

use super::node::ElementData;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
enum Token {
    #[regex(r"[a-zA-Z][a-zA-Z0-9_-]*", |lex| lex.slice().to_owned())]
    Ident(String),

    #[token(".")]
    Dot,

    #[token("#")]
    Hash,

    // Whitespace is the descendant combinator, so it is a real token.
    #[regex(r"[ \t]+")]
    Space,
}

/// Selector parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character at byte {0}")]
    UnexpectedChar(usize),
    #[error("expected identifier after {0:?}")]
    ExpectedIdent(char),
    #[error("duplicate tag name in compound selector")]
    DuplicateTag,
}

/// One compound selector part: `tag.class1.class2#id` in any order, all
/// pieces optional but at least one present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    /// Whether this compound matches the given element data.
    pub fn matches(&self, data: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if data.tag != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if data.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| data.has_class(c))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty()
    }
}

/// A parsed selector: one or more compounds joined by descendant
/// combinators. The last compound is the subject; earlier compounds must
/// match ancestors, nearest-last, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub(crate) compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector from text.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let mut compounds = Vec::new();
        let mut current = Compound::default();
        let mut lexer = Token::lexer(text.trim());

        while let Some(token) = lexer.next() {
            match token {
                Ok(Token::Ident(name)) => {
                    if current.tag.is_some() {
                        return Err(SelectorError::DuplicateTag);
                    }
                    current.tag = Some(name);
                }
                Ok(Token::Dot) => match lexer.next() {
                    Some(Ok(Token::Ident(name))) => current.classes.push(name),
                    _ => return Err(SelectorError::ExpectedIdent('.')),
                },
                Ok(Token::Hash) => match lexer.next() {
                    Some(Ok(Token::Ident(name))) => current.id = Some(name),
                    _ => return Err(SelectorError::ExpectedIdent('#')),
                },
                Ok(Token::Space) => {
                    if !current.is_empty() {
                        compounds.push(std::mem::take(&mut current));
                    }
                }
                Err(()) => return Err(SelectorError::UnexpectedChar(lexer.span().start)),
            }
        }
        if !current.is_empty() {
            compounds.push(current);
        }
        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { compounds })
    }

    /// A single-class selector, built without parsing.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            compounds: vec![Compound {
                classes: vec![name.into()],
                ..Compound::default()
            }],
        }
    }

    /// The subject compound (the last one).
    pub(crate) fn subject(&self) -> &Compound {
        self.compounds.last().expect("selector has at least one compound")
    }

    /// The ancestor compounds, outermost first.
    pub(crate) fn ancestors(&self) -> &[Compound] {
        &self.compounds[..self.compounds.len() - 1]
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, compound) in self.compounds.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if let Some(tag) = &compound.tag {
                f.write_str(tag)?;
            }
            if let Some(id) = &compound.id {
                write!(f, "#{id}")?;
            }
            for class in &compound.classes {
                write!(f, ".{class}")?;
            }
        }
        Ok(())
    }
}
