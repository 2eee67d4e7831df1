//! Parser for the brace-delimited key-value text format used by Steam (`.acf`, `.vdf`,
//! `gameinfo.txt`), e.g.
//!
//! ```text
//! "AppState"
//! {
//!     "appid"     "440"
//!     "UserConfig"
//!     {
//!         "language"  "english"
//!     }
//! }
//! ```

use std::{fs::read_to_string, path::Path};

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, take_till, take_till1},
    character::complete::{char, multispace1, not_line_ending, space0},
    combinator::{opt, value},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, preceded},
};

use crate::error::ParseError;

/// A named node holding either a scalar value or an ordered list of child nodes. Child names may
/// repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValue {
    pub name: String,
    pub value: Option<String>,
    pub children: Vec<KeyValue>,
}

impl KeyValue {
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<KeyValue>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children,
        }
    }

    /// Parse a key-value file from disk
    pub fn read_file(path: &Path) -> Result<Self, ParseError> {
        let content = read_to_string(path)?;
        parse_key_value(&content)
    }

    /// This node as a [`KvNode`], to start a chain of lookups
    pub fn node(&self) -> KvNode<'_> {
        KvNode::Present(self)
    }

    /// Case-insensitive lookup of the first child named `key`
    pub fn get(&self, key: &str) -> KvNode<'_> {
        self.node().get(key)
    }
}

/// Result of a lookup into a [`KeyValue`] tree. Lookups on a [`KvNode::Missing`] node yield
/// [`KvNode::Missing`] again, so chains like `kv.get("a").get("b").get("c")` never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvNode<'a> {
    Present(&'a KeyValue),
    Missing,
}

impl<'a> KvNode<'a> {
    pub fn get(self, key: &str) -> KvNode<'a> {
        match self {
            KvNode::Present(kv) => kv
                .children
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(key))
                .map_or(KvNode::Missing, KvNode::Present),
            KvNode::Missing => KvNode::Missing,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, KvNode::Missing)
    }

    pub fn value(self) -> Option<&'a str> {
        match self {
            KvNode::Present(kv) => kv.value.as_deref(),
            KvNode::Missing => None,
        }
    }

    /// Child nodes in file order, empty for scalar and missing nodes
    pub fn children(self) -> &'a [KeyValue] {
        match self {
            KvNode::Present(kv) => &kv.children,
            KvNode::Missing => &[],
        }
    }

    /// The scalar value, or an empty string
    pub fn as_str(self) -> &'a str {
        self.value().unwrap_or_default()
    }

    /// The scalar value as an unsigned integer, or `0`
    pub fn as_u64(self) -> u64 {
        self.value()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default()
    }

    /// The scalar value as a signed integer, or `0`
    pub fn as_i64(self) -> i64 {
        self.value()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default()
    }

    /// `true` for non-zero integers and `"true"`, `false` for anything else
    pub fn as_bool(self) -> bool {
        let Some(value) = self.value().map(str::trim) else {
            return false;
        };

        match value.parse::<i64>() {
            Ok(n) => n != 0,
            Err(_) => value.eq_ignore_ascii_case("true"),
        }
    }
}

// PARSERS ------------------------------------------------------------------------------
/// Whitespace and `//` line comments
fn parse_ignored(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((multispace1, preceded(tag("//"), not_line_ending)))),
    )
    .parse(input)
}

fn parse_until_quote_or_escape(input: &str) -> IResult<&str, &str> {
    take_till(|c: char| c == '"' || c == '\\').parse(input)
}

/// Double quoted string, with `\\`, `\"`, `\n` and `\t` escapes
fn parse_quoted(input: &str) -> IResult<&str, String> {
    let (mut input, _) = char('"').parse(input)?;
    let mut parsed = String::new();

    loop {
        let (rest, chunk) = parse_until_quote_or_escape(input)?;
        parsed.push_str(chunk);

        if let Some(rest) = rest.strip_prefix('"') {
            return Ok((rest, parsed));
        }

        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some('\\'), Some(escaped)) => {
                match escaped {
                    'n' => parsed.push('\n'),
                    't' => parsed.push('\t'),
                    '\\' | '"' => parsed.push(escaped),
                    other => {
                        parsed.push('\\');
                        parsed.push(other);
                    }
                }
                input = chars.as_str();
            }
            // Unterminated string
            _ => return Err(nom::Err::Error(Error::new(rest, ErrorKind::Char))),
        }
    }
}

fn parse_unquoted(input: &str) -> IResult<&str, String> {
    take_till1(|c: char| c.is_whitespace() || matches!(c, '{' | '}' | '"'))
        .map(String::from)
        .parse(input)
}

fn parse_token(input: &str) -> IResult<&str, String> {
    alt((parse_quoted, parse_unquoted)).parse(input)
}

/// Platform conditionals such as `[$WIN32]`, which are ignored
fn parse_conditional(input: &str) -> IResult<&str, &str> {
    preceded(space0, delimited(char('['), is_not("]"), char(']'))).parse(input)
}

fn parse_node(input: &str) -> IResult<&str, KeyValue> {
    let (input, _) = parse_ignored(input)?;
    let (input, name) = parse_token(input)?;
    let (input, _) = opt(parse_conditional).parse(input)?;
    let (input, _) = parse_ignored(input)?;

    if input.starts_with('{') {
        let (input, children) =
            delimited(char('{'), many0(parse_node), preceded(parse_ignored, char('}')))
                .parse(input)?;

        return Ok((input, KeyValue::with_children(name, children)));
    }

    let (input, value) = parse_token(input)?;
    let (input, _) = opt(parse_conditional).parse(input)?;

    Ok((input, KeyValue::with_value(name, value)))
}

/// Parses the root node of a key-value document. Anything after the root node is ignored.
pub fn parse_key_value(content: &str) -> Result<KeyValue, ParseError> {
    let content = content.trim_start_matches('\u{feff}');
    let (_, root) = parse_node(content)?;

    Ok(root)
}
