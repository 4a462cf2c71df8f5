//! CSS parser - turns stylesheet source into a tree of comments, rules and at-rules
//!
//! Tokenization is delegated to `cssparser`; this module only builds the
//! shallow tree the collector walks and reports syntax errors with their
//! 1-based source position.

use cssparser::{
    ParseError as CssParseError, ParseErrorKind as CssParseErrorKind, Parser, ParserInput,
    SourceLocation, SourcePosition, Token,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/").expect("comment pattern is valid")
});

/// What went wrong while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxIssue {
    /// `/*` without a matching `*/`
    UnterminatedComment,
    /// Rule prelude never reached `{`
    MissingOpenBrace,
    /// Rule block never reached `}`
    MissingCloseBrace,
    /// `}` outside of any block
    UnexpectedCloseBrace,
    /// Rule with an empty selector list
    MissingSelector,
    /// Declaration without `:`
    MissingColon,
    /// Something other than an identifier where a property name belongs
    MissingPropertyName,
}

impl SyntaxIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxIssue::UnterminatedComment => "end of comment missing",
            SyntaxIssue::MissingOpenBrace => "missing '{'",
            SyntaxIssue::MissingCloseBrace => "missing '}'",
            SyntaxIssue::UnexpectedCloseBrace => "unexpected '}'",
            SyntaxIssue::MissingSelector => "selector missing",
            SyntaxIssue::MissingColon => "property missing ':'",
            SyntaxIssue::MissingPropertyName => "property name expected",
        }
    }
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Failed to parse CSS: {issue} at line {line}, column {column}")]
    Syntax {
        issue: SyntaxIssue,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    fn at(issue: SyntaxIssue, location: SourceLocation) -> Self {
        let position = Position::from(location);
        ParseError::Syntax {
            issue,
            line: position.line,
            column: position.column,
        }
    }

    fn from_css(error: CssParseError<'_, SyntaxIssue>) -> Self {
        let issue = match error.kind {
            CssParseErrorKind::Custom(issue) => issue,
            CssParseErrorKind::Basic(_) => SyntaxIssue::MissingPropertyName,
        };
        Self::at(issue, error.location)
    }

    /// The kind of syntax problem
    pub fn issue(&self) -> SyntaxIssue {
        match self {
            ParseError::Syntax { issue, .. } => *issue,
        }
    }
}

/// Start of a node in the source (1-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl From<SourceLocation> for Position {
    fn from(location: SourceLocation) -> Self {
        // cssparser lines are 0-based, columns already 1-based
        Self {
            line: location.line as usize + 1,
            column: location.column as usize,
        }
    }
}

/// Discriminator for top-level stylesheet nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Comment,
    Rule,
    AtRule,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Comment => "comment",
            NodeKind::Rule => "rule",
            NodeKind::AtRule => "at-rule",
        }
    }
}

/// A CSS comment; `text` is everything between `/*` and `*/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub position: Position,
}

/// A `property: value` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub position: Position,
}

/// An entry inside a rule's `{ ... }` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockItem {
    Declaration(Declaration),
    Comment(Comment),
}

/// A qualified rule: selector list plus declaration block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Comma-separated selectors, each trimmed and with comments removed
    pub selectors: Vec<String>,
    /// Block contents in source order
    pub declarations: Vec<BlockItem>,
    pub position: Position,
}

impl Rule {
    /// Declarations of this rule, skipping comments inside the block
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter_map(|item| match item {
            BlockItem::Declaration(declaration) => Some(declaration),
            BlockItem::Comment(_) => None,
        })
    }
}

/// An at-rule such as `@import` or `@media`; its block is not descended into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    pub name: String,
    pub prelude: String,
    pub has_block: bool,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleNode {
    Comment(Comment),
    Rule(Rule),
    AtRule(AtRule),
}

impl StyleNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            StyleNode::Comment(_) => NodeKind::Comment,
            StyleNode::Rule(_) => NodeKind::Rule,
            StyleNode::AtRule(_) => NodeKind::AtRule,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            StyleNode::Comment(comment) => comment.position,
            StyleNode::Rule(rule) => rule.position,
            StyleNode::AtRule(at_rule) => at_rule.position,
        }
    }
}

/// A parsed stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Top-level nodes in document order
    pub rules: Vec<StyleNode>,
}

impl Stylesheet {
    /// Parse CSS from a string
    pub fn parse_str(source: &str) -> Result<Self, ParseError> {
        parse(source)
    }
}

/// Parse CSS source into a [`Stylesheet`]
pub fn parse(source: &str) -> Result<Stylesheet, ParseError> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut rules = Vec::new();

    loop {
        let location = parser.current_source_location();
        let start = parser.position();
        let token = match next_token(&mut parser) {
            Some(token) => token,
            None => break,
        };

        match token {
            Token::WhiteSpace(_) | Token::CDO | Token::CDC | Token::Semicolon => {}
            Token::Comment(text) => {
                if !is_closed_comment(parser.slice_from(start)) {
                    return Err(ParseError::at(SyntaxIssue::UnterminatedComment, location));
                }
                rules.push(StyleNode::Comment(Comment {
                    text: text.to_string(),
                    position: location.into(),
                }));
            }
            Token::AtKeyword(name) => {
                let name = name.to_string();
                rules.push(StyleNode::AtRule(parse_at_rule(&mut parser, name, location)?));
            }
            Token::CloseCurlyBracket => {
                return Err(ParseError::at(SyntaxIssue::UnexpectedCloseBrace, location));
            }
            first => {
                let rule = parse_rule(&mut parser, first, start, location)?;
                rules.push(StyleNode::Rule(rule));
            }
        }
    }

    Ok(Stylesheet { rules })
}

/// Read the next token, consuming the contents of any `(`/`[` block it opens
/// so that positions taken afterwards point past the block.
fn next_token<'i>(parser: &mut Parser<'i, '_>) -> Option<Token<'i>> {
    let token = parser.next_including_whitespace_and_comments().cloned().ok()?;
    if matches!(
        token,
        Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock
    ) {
        let _ = parser.parse_nested_block(|block| skip_block(block));
    }
    Some(token)
}

/// Drain a nested block, returning the position where its contents end
fn skip_block<'i>(
    block: &mut Parser<'i, '_>,
) -> Result<SourcePosition, CssParseError<'i, SyntaxIssue>> {
    while block.next_including_whitespace_and_comments().is_ok() {}
    Ok(block.position())
}

/// Whether the `}` consumed after a nested `{` block belongs to that block.
/// An unclosed block runs to the end of input, so nothing follows its contents.
fn closes_block(parser: &Parser<'_, '_>, contents_end: SourcePosition) -> bool {
    parser.slice(contents_end..parser.position()) == "}"
}

fn is_closed_comment(raw: &str) -> bool {
    raw.len() >= 4 && raw.ends_with("*/")
}

fn strip_comments(text: &str) -> String {
    COMMENT_RE.replace_all(text, "").into_owned()
}

fn parse_at_rule(
    parser: &mut Parser<'_, '_>,
    name: String,
    location: SourceLocation,
) -> Result<AtRule, ParseError> {
    let prelude_start = parser.position();

    let (prelude_end, has_block) = loop {
        let before = parser.position();
        match next_token(parser) {
            Some(Token::Semicolon) => break (before, false),
            Some(Token::CurlyBracketBlock) => {
                let contents_end = parser
                    .parse_nested_block(|block| skip_block(block))
                    .map_err(ParseError::from_css)?;
                if !closes_block(parser, contents_end) {
                    return Err(ParseError::at(SyntaxIssue::MissingCloseBrace, location));
                }
                break (before, true);
            }
            Some(_) => {}
            None => break (parser.position(), false),
        }
    };

    Ok(AtRule {
        name,
        prelude: strip_comments(parser.slice(prelude_start..prelude_end))
            .trim()
            .to_string(),
        has_block,
        position: location.into(),
    })
}

fn parse_rule<'i>(
    parser: &mut Parser<'i, '_>,
    first: Token<'i>,
    start: SourcePosition,
    location: SourceLocation,
) -> Result<Rule, ParseError> {
    let mut selectors = Vec::new();
    let mut segment_start = start;
    let mut token_start = start;
    let mut token = first;

    loop {
        match token {
            Token::CurlyBracketBlock => {
                push_selector(&mut selectors, parser.slice(segment_start..token_start));
                break;
            }
            Token::Comma => {
                push_selector(&mut selectors, parser.slice(segment_start..token_start));
                segment_start = parser.position();
            }
            Token::CloseCurlyBracket => {
                return Err(ParseError::at(
                    SyntaxIssue::UnexpectedCloseBrace,
                    parser.current_source_location(),
                ));
            }
            _ => {}
        }

        token_start = parser.position();
        token = match next_token(parser) {
            Some(token) => token,
            None => return Err(ParseError::at(SyntaxIssue::MissingOpenBrace, location)),
        };
    }

    if selectors.is_empty() {
        return Err(ParseError::at(SyntaxIssue::MissingSelector, location));
    }

    let (declarations, contents_end) = parser
        .parse_nested_block(|block| parse_block(block))
        .map_err(ParseError::from_css)?;

    if !closes_block(parser, contents_end) {
        return Err(ParseError::at(SyntaxIssue::MissingCloseBrace, location));
    }

    Ok(Rule {
        selectors,
        declarations,
        position: location.into(),
    })
}

fn push_selector(selectors: &mut Vec<String>, raw: &str) {
    let selector = strip_comments(raw);
    let selector = selector.trim();
    if !selector.is_empty() {
        selectors.push(selector.to_string());
    }
}

fn syntax_error<'i>(issue: SyntaxIssue, location: SourceLocation) -> CssParseError<'i, SyntaxIssue> {
    CssParseError {
        kind: CssParseErrorKind::Custom(issue),
        location,
    }
}

/// Parse a rule block, returning its items and the position where they end
fn parse_block<'i>(
    block: &mut Parser<'i, '_>,
) -> Result<(Vec<BlockItem>, SourcePosition), CssParseError<'i, SyntaxIssue>> {
    let mut items = Vec::new();

    loop {
        let location = block.current_source_location();
        let start = block.position();
        let token = match next_token(block) {
            Some(token) => token,
            None => break,
        };

        match token {
            Token::WhiteSpace(_) | Token::Semicolon => {}
            Token::Comment(text) => {
                if !is_closed_comment(block.slice_from(start)) {
                    return Err(syntax_error(SyntaxIssue::UnterminatedComment, location));
                }
                items.push(BlockItem::Comment(Comment {
                    text: text.to_string(),
                    position: location.into(),
                }));
            }
            Token::Ident(name) => {
                let declaration = parse_declaration(block, name.to_string(), location)?;
                items.push(BlockItem::Declaration(declaration));
            }
            // Legacy IE star hack: `*zoom: 1`
            Token::Delim('*') => {
                let name = match block.next_including_whitespace_and_comments() {
                    Ok(Token::Ident(name)) => format!("*{}", name),
                    _ => return Err(syntax_error(SyntaxIssue::MissingPropertyName, location)),
                };
                let declaration = parse_declaration(block, name, location)?;
                items.push(BlockItem::Declaration(declaration));
            }
            _ => return Err(syntax_error(SyntaxIssue::MissingPropertyName, location)),
        }
    }

    Ok((items, block.position()))
}

fn parse_declaration<'i>(
    block: &mut Parser<'i, '_>,
    property: String,
    location: SourceLocation,
) -> Result<Declaration, CssParseError<'i, SyntaxIssue>> {
    if block.expect_colon().is_err() {
        return Err(syntax_error(SyntaxIssue::MissingColon, location));
    }
    Ok(Declaration {
        property,
        value: parse_value(block),
        position: location.into(),
    })
}

/// Consume a declaration value up to `;` or the end of the block
fn parse_value(block: &mut Parser<'_, '_>) -> String {
    let value_start = block.position();
    let value_end = loop {
        let before = block.position();
        match next_token(block) {
            Some(Token::Semicolon) => break before,
            Some(Token::CurlyBracketBlock) => {
                let _ = block.parse_nested_block(|nested| skip_block(nested));
            }
            Some(_) => {}
            None => break block.position(),
        }
    };

    strip_comments(block.slice(value_start..value_end))
        .trim()
        .to_string()
}
