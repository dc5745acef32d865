//! A reader for the name/value configuration trees that describe device skins.
//!
//! The format is line oriented. Every entry is either a `name value` pair, where
//! the value runs to the end of the line, or a `name { ... }` block holding more
//! entries:
//!
//! ```text
//! parts {
//!     device {
//!         display {
//!             width   320
//!             height  480
//!         }
//!     }
//! }
//! ```
//!
//! Parsing produces an anonymous root [`ConfigNode`] whose children are the
//! top-level entries. Every node records the byte [`Span`] it was parsed from.
//!
//! Numeric lookups ([`ConfigNode::int`], [`ConfigNode::unsigned`]) follow C
//! `strtol` rules with base auto-detection, so `0x808080`, `0755` and `-12`
//! are all accepted, and trailing garbage after the digits is ignored.

pub mod formatter;

use std::fmt;

/// Byte span in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create an empty/synthetic span (for constructed nodes)
    pub fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Check if this is a synthetic (non-parsed) span
    pub fn is_synthetic(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// One entry of a configuration tree.
///
/// Leaf entries carry a `value`; block entries carry `children`. The root
/// returned by [`parse`] has an empty name.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigNode {
    pub name: String,
    pub value: Option<String>,
    pub children: Vec<ConfigNode>,
    /// Source span (byte offsets)
    pub span: Span,
}

impl PartialEq for ConfigNode {
    fn eq(&self, other: &Self) -> bool {
        // Compare only the content, not the span
        self.name == other.name && self.value == other.value && self.children == other.children
    }
}

impl ConfigNode {
    /// Create a node with a span
    pub fn with_span(
        name: impl Into<String>,
        value: Option<String>,
        children: Vec<ConfigNode>,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            children,
            span,
        }
    }

    /// Create a `name value` leaf with synthetic span
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_span(name, Some(value.into()), Vec::new(), Span::synthetic())
    }

    /// Create a `name { ... }` block with synthetic span
    pub fn block(name: impl Into<String>, children: Vec<ConfigNode>) -> Self {
        Self::with_span(name, None, children, Span::synthetic())
    }

    /// Create an anonymous root holding `children`
    pub fn root(children: Vec<ConfigNode>) -> Self {
        Self::block("", children)
    }

    /// The value of this node, if it is a leaf
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Direct children in source order
    pub fn children(&self) -> &[ConfigNode] {
        &self.children
    }

    /// Check if this node is a block (has children or was written with braces)
    pub fn is_block(&self) -> bool {
        self.value.is_none()
    }

    /// Find the first direct child with the given name
    pub fn find(&self, name: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Find all direct children with the given name
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follow a dot-separated path of child names, e.g. `parts.device.display`
    pub fn find_path(&self, path: &str) -> Option<&ConfigNode> {
        path.split('.')
            .try_fold(self, |node, segment| node.find(segment))
    }

    /// The value of the child `name`, if present
    pub fn str(&self, name: &str) -> Option<&str> {
        self.find(name)?.value()
    }

    /// The value of the child `name`, or `default`
    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.str(name).unwrap_or(default)
    }

    /// The child `name` as a signed integer.
    ///
    /// Missing entries (and blocks) yield `default`. A present value without
    /// leading digits yields 0, like `strtol`.
    pub fn int(&self, name: &str, default: i32) -> i32 {
        match self.str(name) {
            Some(value) => parse_c_long(value).unwrap_or(0) as i32,
            None => default,
        }
    }

    /// The child `name` as an unsigned integer, wrapping negative input like `strtoul`.
    pub fn unsigned(&self, name: &str, default: u32) -> u32 {
        match self.str(name) {
            Some(value) => parse_c_long(value).unwrap_or(0) as u32,
            None => default,
        }
    }

    /// The child `name` as a boolean (`yes`/`true`/`1` or `no`/`false`/`0`)
    pub fn bool(&self, name: &str, default: bool) -> bool {
        match self.str(name).map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v.eq_ignore_ascii_case("no") || v.eq_ignore_ascii_case("false") => false,
            Some(v) => parse_c_long(v).map(|n| n != 0).unwrap_or(default),
            None => default,
        }
    }
}

/// Parse an integer the way C's `strtol(s, NULL, 0)` does.
///
/// Leading whitespace and an optional sign are accepted; `0x`/`0X` selects
/// hexadecimal and a leading `0` selects octal. Parsing stops at the first
/// character that is not a digit of the detected base. Returns `None` when no
/// digits were consumed.
pub fn parse_c_long(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        if rest.chars().next().is_some_and(|c| c.is_ascii_hexdigit()) {
            (16, rest)
        } else {
            // "0x" with no hex digits parses as the single digit 0
            (8, &s[..1])
        }
    } else if s.starts_with('0') {
        (8, s)
    } else {
        (10, s)
    };

    let mut value: i64 = 0;
    let mut consumed = false;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(radix) else {
            break;
        };
        value = value
            .saturating_mul(i64::from(radix))
            .saturating_add(i64::from(digit));
        consumed = true;
    }

    if !consumed {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// A builder for constructing configuration trees incrementally
#[derive(Debug)]
pub struct NodeBuilder {
    name: String,
    children: Vec<ConfigNode>,
}

impl NodeBuilder {
    /// Start a block with the given name
    pub fn node(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Start an anonymous root
    pub fn root() -> Self {
        Self::node("")
    }

    /// Append a `name value` entry
    pub fn entry(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.children
            .push(ConfigNode::leaf(name, value.to_string()));
        self
    }

    /// Conditionally append a `name value` entry
    pub fn entry_if(self, cond: bool, name: impl Into<String>, value: impl ToString) -> Self {
        if cond { self.entry(name, value) } else { self }
    }

    /// Append a nested block
    pub fn block(mut self, child: NodeBuilder) -> Self {
        self.children.push(child.build());
        self
    }

    /// Build the final node
    pub fn build(self) -> ConfigNode {
        ConfigNode::block(self.name, self.children)
    }
}

/// Parser for configuration trees
pub struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            chars: input.char_indices().peekable(),
            current_pos: 0,
        }
    }

    /// Parse the whole input into an anonymous root node
    pub fn parse(&mut self) -> Result<ConfigNode, ParseError> {
        let children = self.parse_entries(0)?;
        Ok(ConfigNode::with_span(
            "",
            None,
            children,
            Span::new(0, self.input.len()),
        ))
    }

    fn parse_entries(&mut self, depth: usize) -> Result<Vec<ConfigNode>, ParseError> {
        let mut entries = Vec::new();

        loop {
            self.skip_whitespace();

            match self.peek_char() {
                None if depth > 0 => return Err(ParseError::UnclosedBlock),
                None => break,
                Some('}') if depth == 0 => return Err(ParseError::UnbalancedBrace),
                Some('}') => {
                    self.advance();
                    break;
                }
                Some('{') => return Err(ParseError::EmptyName),
                Some(_) => entries.push(self.parse_entry(depth)?),
            }
        }

        Ok(entries)
    }

    fn parse_entry(&mut self, depth: usize) -> Result<ConfigNode, ParseError> {
        let start = self.current_pos;
        let name = self.parse_name()?;
        self.skip_inline_whitespace();

        // A block may open on the following line.
        if matches!(self.peek_char(), Some('\n') | Some('\r'))
            && self.input[self.current_pos..].trim_start().starts_with('{')
        {
            self.skip_whitespace();
        }

        match self.peek_char() {
            Some('{') => {
                self.advance();
                let children = self.parse_entries(depth + 1)?;
                log::trace!(
                    "Parsed block '{name}' with {} entries at position {start}",
                    children.len()
                );
                Ok(ConfigNode::with_span(
                    name,
                    None,
                    children,
                    Span::new(start, self.current_pos),
                ))
            }
            Some('"') => {
                let value = self.parse_string()?;
                Ok(ConfigNode::with_span(
                    name,
                    Some(value),
                    Vec::new(),
                    Span::new(start, self.current_pos),
                ))
            }
            None | Some('\n') | Some('\r') | Some('}') => Ok(ConfigNode::with_span(
                name,
                None,
                Vec::new(),
                Span::new(start, self.current_pos),
            )),
            Some(_) => {
                let value = self.parse_value();
                Ok(ConfigNode::with_span(
                    name,
                    Some(value),
                    Vec::new(),
                    Span::new(start, self.current_pos),
                ))
            }
        }
    }

    fn parse_name(&mut self) -> Result<String, ParseError> {
        let start = self.current_pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || ch == '{' || ch == '}' || ch == '"' {
                break;
            }
            self.advance();
        }

        if self.current_pos == start {
            return match self.peek_char() {
                Some(ch) => Err(ParseError::UnexpectedChar(ch, start)),
                None => Err(ParseError::UnexpectedEof),
            };
        }

        Ok(self.input[start..self.current_pos].to_string())
    }

    /// Unquoted values run to the end of the line or a closing brace.
    fn parse_value(&mut self) -> String {
        let start = self.current_pos;
        while let Some(ch) = self.peek_char() {
            if ch == '\n' || ch == '}' {
                break;
            }
            self.advance();
        }
        self.input[start..self.current_pos].trim_end().to_string()
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut result = String::new();

        loop {
            match self.peek_char() {
                None => return Err(ParseError::UnterminatedString),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('n') => result.push('\n'),
                        Some('r') => result.push('\r'),
                        Some('t') => result.push('\t'),
                        Some(ch) => result.push(ch),
                        None => return Err(ParseError::UnterminatedString),
                    }
                    self.advance();
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Ok(result)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' {
                // Skip comment until end of line
                while let Some(ch) = self.peek_char() {
                    self.advance();
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == ' ' || ch == '\t' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos + ch.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError::UnexpectedChar(ch, self.current_pos)),
            None => Err(ParseError::UnexpectedEof),
        }
    }
}

/// Parse configuration text into an anonymous root node
pub fn parse(input: &str) -> Result<ConfigNode, ParseError> {
    log::trace!("Parsing config tree from {} bytes of input", input.len());
    let result = Parser::new(input).parse();
    match &result {
        Ok(root) => log::trace!(
            "Successfully parsed config tree with {} top-level entries",
            root.children.len()
        ),
        Err(e) => log::trace!("Failed to parse config tree: {e:?}"),
    }
    result
}

/// Errors that can occur during parsing
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnexpectedEof,
    /// An unexpected character and its byte offset
    UnexpectedChar(char, usize),
    UnclosedBlock,
    UnterminatedString,
    EmptyName,
    UnbalancedBrace,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof => write!(f, "Unexpected end of input"),
            ParseError::UnexpectedChar(found, pos) => {
                write!(f, "Unexpected '{found}' at byte {pos}")
            }
            ParseError::UnclosedBlock => write!(f, "Unclosed block"),
            ParseError::UnterminatedString => write!(f, "Unterminated string"),
            ParseError::EmptyName => write!(f, "Block without a name"),
            ParseError::UnbalancedBrace => write!(f, "Closing brace without matching block"),
        }
    }
}

impl std::error::Error for ParseError {}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = formatter::format_tree(self);
        write!(f, "{}", formatted.trim_end_matches('\n'))
    }
}
