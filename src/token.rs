//! Token kinds and classification for WBS.
//!
//! Classification is a two-layer function. Layer A ([`classify_literal`])
//! looks only at the lexeme text and the `in_link` flag and produces a
//! provisional [`TokenKind`]. Layer B ([`Token::classify`]) takes the small
//! context tuple the tree builder derives from its insertion anchor and
//! resolves operator symbols, strips literal sigils, and reclassifies names
//! inside `create` into HTML parts.
//!
//! This module also owns the static shape tables the builder consults:
//! every kind declares how many children its phrase takes
//! ([`Token::phrase_length`]) and which child kinds it accepts at which
//! position ([`Token::accepts_in_position`]).
//!
//! # Example
//!
//! ```rust
//! use wbs::token::{classify_literal, Dialect, TokenKind};
//!
//! let dialect = Dialect::default();
//! assert_eq!(classify_literal("create", false, &dialect), TokenKind::Keyword);
//! assert_eq!(classify_literal("#ff0000", false, &dialect), TokenKind::ColorLiteral);
//! assert_eq!(classify_literal("3.14", false, &dialect), TokenKind::NumericLiteral);
//! assert_eq!(classify_literal("index", true, &dialect), TokenKind::FileLiteral);
//! ```

use crate::lexer::Lexeme;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The category of a classified token.
///
/// The set is closed: the builder's dispatch and the shape tables below
/// match exhaustively on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    /// A phrase-opening keyword (`create`, `open`, `file`, `colorset`,
    /// `foreach`, `using`, `export`, and `output` behind the dialect gate).
    Keyword,
    /// Construction glue (`as`, `in`, `do`, `,` and closed-over brackets);
    /// kept in the tree to hold syntax together, ignored in execution.
    Filler,
    /// A constant or variable name.
    Name,
    /// A bare identifier in the child slot of `create`.
    HtmlPart,
    /// A string literal; the leading quote is removed upon classification.
    StringLiteral,
    /// `true` or `false`.
    BoolLiteral,
    /// A literal of digits and periods.
    NumericLiteral,
    /// `this`; the value is unused.
    ThisLiteral,
    /// A file path, accumulated across path segments.
    FileLiteral,
    /// A hex color; the leading `#` is removed upon classification.
    ColorLiteral,
    /// `[`, a variable-length list of value expressions.
    ListLiteral,
    /// A call's `(`, a variable-length list of assignments.
    ArgumentList,
    /// A one-operand operator.
    UnaryOperator,
    /// A two-operand operator.
    BinaryOperator,
    /// `=` inside `const`, `colorset`, or an argument list.
    Assignment,
    /// The `const` keyword.
    Const,
    /// Anything the classifier could not place.
    Unknown,
    /// The empty sentinel before any token has been consumed.
    Unset,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Filler => "FILLER",
            TokenKind::Name => "NAME",
            TokenKind::HtmlPart => "HTMLPART",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::BoolLiteral => "BOOL_LITERAL",
            TokenKind::NumericLiteral => "NUMERIC_LITERAL",
            TokenKind::ThisLiteral => "THIS_LITERAL",
            TokenKind::FileLiteral => "FILE_LITERAL",
            TokenKind::ColorLiteral => "COLOR_LITERAL",
            TokenKind::ListLiteral => "LIST_LITERAL",
            TokenKind::ArgumentList => "ARGUMENT_LIST",
            TokenKind::UnaryOperator => "UNARY_OPERATOR",
            TokenKind::BinaryOperator => "BINARY_OPERATOR",
            TokenKind::Assignment => "ASSIGNMENT",
            TokenKind::Const => "CONST",
            TokenKind::Unknown => "UNKNOWN",
            TokenKind::Unset => "UNSET",
        };
        f.write_str(name)
    }
}

/// How many children a phrase expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many children.
    Fixed(u32),
    /// Any number of children (lists and argument lists).
    Variable,
}

impl Arity {
    /// Whether a phrase with `children` children still has room.
    pub fn wants_more(self, children: u32) -> bool {
        match self {
            Arity::Fixed(n) => children < n,
            Arity::Variable => true,
        }
    }

    /// Whether this is the variable-length sentinel.
    pub fn is_variable(self) -> bool {
        matches!(self, Arity::Variable)
    }
}

/// Vocabulary configuration for the classifier.
///
/// The pre-release `output` keyword is gated here rather than compiled in;
/// the default matches the development toggle the original editor ships
/// with (gate enabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Recognize the pre-release `output` keyword.
    pub output_keyword: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            output_keyword: true,
        }
    }
}

impl Dialect {
    /// Whether `word` opens a keyword phrase under this dialect.
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(
            word,
            "create" | "open" | "file" | "colorset" | "foreach" | "using" | "export"
        ) || (self.output_keyword && word == "output")
    }
}

/// The context tuple the builder derives from its insertion anchor before
/// classifying each lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifyContext {
    /// The incoming token sits at the start of a fresh expression slot;
    /// disambiguates prefix from infix for `+`, `-`, and `/`.
    pub first: bool,
    /// Parsing inside a file-path argument to `open`/`file`.
    pub in_link: bool,
    /// Parsing the immediate child slot of `create`.
    pub in_html: bool,
}

/// Layer A of classification: a pure function of the lexeme text and the
/// `in_link` flag.
///
/// Operator symbols and operator words come back as [`TokenKind::Unknown`];
/// layer B resolves them with the full context.
pub fn classify_literal(value: &str, in_link: bool, dialect: &Dialect) -> TokenKind {
    if value.starts_with('"') {
        return TokenKind::StringLiteral;
    }
    // Inside a link every word is a path segment, keywords included, or
    // `open /path/to/file` could not end in the word `file`.
    if in_link
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return TokenKind::FileLiteral;
    }
    match value {
        "true" | "false" => return TokenKind::BoolLiteral,
        "this" => return TokenKind::ThisLiteral,
        "const" => return TokenKind::Const,
        "as" | "in" | "do" | "," => return TokenKind::Filler,
        "xor" | "and" | "or" | "not" => return TokenKind::Unknown,
        _ => {}
    }
    if dialect.is_keyword(value) {
        return TokenKind::Keyword;
    }
    if let Some(rest) = value.strip_prefix('#') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return TokenKind::ColorLiteral;
        }
        return TokenKind::Unknown;
    }
    if value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return TokenKind::NumericLiteral;
    }
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return TokenKind::Name;
    }
    TokenKind::Unknown
}

/// A classified token.
///
/// Tokens are plain values; the phrase tree owns its tokens by value and
/// rewrites them in place during operator fusion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    /// The category of this token.
    pub kind: TokenKind,
    /// The token payload. Literals are stored stripped: string literals
    /// lose their leading (not trailing) quote, color literals their `#`.
    pub value: String,
    /// 0-based source line.
    pub line: u32,
    /// Column on that line.
    pub column: u32,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            kind: TokenKind::Unset,
            value: String::new(),
            line: 0,
            column: 0,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, value: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            column,
        }
    }

    /// Classifies a lexeme into a token: layer A plus the context-sensitive
    /// layer B promotion.
    pub fn classify(lexeme: &Lexeme, ctx: ClassifyContext, dialect: &Dialect) -> Token {
        let kind = classify_literal(&lexeme.value, ctx.in_link, dialect);
        let mut token = Token::new(kind, lexeme.value.clone(), lexeme.line, lexeme.column);

        match kind {
            TokenKind::Name if ctx.in_html => token.kind = TokenKind::HtmlPart,
            // Only the opening sigil is stripped; a surviving trailing quote
            // is how downstream stages tell a terminated string apart.
            TokenKind::StringLiteral | TokenKind::ColorLiteral => {
                token.value.remove(0);
            }
            TokenKind::Unknown => token.promote_operator(ctx),
            _ => {}
        }

        token
    }

    /// Layer B operator resolution for values layer A left [`TokenKind::Unknown`].
    fn promote_operator(&mut self, ctx: ClassifyContext) {
        match self.value.as_str() {
            "+" | "-" => {
                self.kind = if ctx.first {
                    TokenKind::UnaryOperator
                } else {
                    TokenKind::BinaryOperator
                };
            }
            "/" => {
                self.kind = if ctx.first && ctx.in_link {
                    TokenKind::UnaryOperator
                } else {
                    TokenKind::BinaryOperator
                };
            }
            "*" | "%" | "&" | "|" | "^" | "<" | ">" | "≥" | "≤" | "≠" | "≈" => {
                self.kind = TokenKind::BinaryOperator;
            }
            "!" => {
                self.kind = TokenKind::UnaryOperator;
                self.value = "not".to_string();
            }
            "~" => self.kind = TokenKind::UnaryOperator,
            "=" => self.kind = TokenKind::Assignment,
            "[" => self.kind = TokenKind::ListLiteral,
            "(" => self.kind = TokenKind::UnaryOperator,
            ")" | "]" => self.kind = TokenKind::Filler,
            "xor" | "and" | "or" => self.kind = TokenKind::BinaryOperator,
            "not" => self.kind = TokenKind::UnaryOperator,
            _ => {}
        }
    }

    /// How many children this token's phrase expects.
    pub fn phrase_length(&self) -> Arity {
        match self.kind {
            TokenKind::Keyword => match self.value.as_str() {
                // Create takes an htmlpart, or the call node wrapping one.
                "create" => Arity::Fixed(1),
                // Open and file take a file literal.
                "open" | "file" => Arity::Fixed(1),
                // Colorset takes three assignments.
                "colorset" => Arity::Fixed(3),
                // Foreach takes a variable name, a filler in, a value
                // expression, a filler do, and a full phrase.
                "foreach" => Arity::Fixed(5),
                // Using takes a value expression, a filler as, a variable
                // name, a filler do, and a full phrase.
                "using" => Arity::Fixed(5),
                // Export and output take a value expression.
                "export" | "output" => Arity::Fixed(1),
                _ => Arity::Fixed(0),
            },
            // Const takes an assignment.
            TokenKind::Const => Arity::Fixed(1),
            TokenKind::Assignment => Arity::Fixed(2),
            TokenKind::BinaryOperator => Arity::Fixed(2),
            TokenKind::UnaryOperator => Arity::Fixed(1),
            TokenKind::ArgumentList => Arity::Variable,
            TokenKind::ListLiteral => Arity::Variable,
            _ => Arity::Fixed(0),
        }
    }

    /// Whether a candidate child may attach at child index `position` of a
    /// phrase headed by this token.
    ///
    /// Some slots are looser during construction than at final validation:
    /// assignments are built up name-first, so a bare [`TokenKind::Name`]
    /// may transiently occupy an assignment slot while `is_final` is false.
    pub fn accepts_in_position(&self, child: &Token, position: u32, is_final: bool) -> bool {
        match self.kind {
            TokenKind::Keyword => match self.value.as_str() {
                "create" => {
                    position == 0
                        && (child.kind == TokenKind::HtmlPart
                            || (child.kind == TokenKind::BinaryOperator
                                && matches!(child.value.as_str(), "(" | "()")))
                }
                "open" | "file" => position == 0 && child.kind == TokenKind::FileLiteral,
                "colorset" => {
                    position <= 2
                        && (child.kind == TokenKind::Assignment
                            || (child.kind == TokenKind::Name && !is_final))
                }
                "foreach" => match position {
                    0 => child.kind == TokenKind::Name,
                    1 => child.kind == TokenKind::Filler && child.value == "in",
                    2 => child.is_value_expression(),
                    3 => child.kind == TokenKind::Filler && child.value == "do",
                    4 => child.is_full_phrase(),
                    _ => false,
                },
                "using" => match position {
                    0 => child.is_value_expression(),
                    1 => child.kind == TokenKind::Filler && child.value == "as",
                    2 => child.kind == TokenKind::Name,
                    3 => child.kind == TokenKind::Filler && child.value == "do",
                    4 => child.is_full_phrase(),
                    _ => false,
                },
                "export" | "output" => position == 0 && child.is_value_expression(),
                _ => false,
            },
            TokenKind::Const => {
                position == 0
                    && (child.kind == TokenKind::Assignment
                        || (child.kind == TokenKind::Name && !is_final))
            }
            TokenKind::Assignment => match position {
                0 => child.kind == TokenKind::Name,
                1 => child.is_value_expression(),
                _ => false,
            },
            TokenKind::BinaryOperator => {
                (position <= 1 && child.is_value_expression())
                    || (position == 1 && child.kind == TokenKind::ArgumentList)
            }
            TokenKind::UnaryOperator => position == 0 && child.is_value_expression(),
            TokenKind::ArgumentList => {
                child.kind == TokenKind::Assignment
                    || (child.kind == TokenKind::Name && !is_final)
                    || (child.kind == TokenKind::Filler && child.value == ",")
            }
            TokenKind::ListLiteral => {
                child.is_value_expression()
                    || (child.kind == TokenKind::Filler && child.value == ",")
            }
            _ => false,
        }
    }

    /// Whether this token can stand in any slot that accepts a value.
    pub fn is_value_expression(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Keyword
                | TokenKind::Name
                | TokenKind::StringLiteral
                | TokenKind::BoolLiteral
                | TokenKind::NumericLiteral
                | TokenKind::ThisLiteral
                | TokenKind::ColorLiteral
                | TokenKind::ListLiteral
                | TokenKind::UnaryOperator
                | TokenKind::BinaryOperator
        )
    }

    /// Whether this token can head a top-level phrase.
    pub fn is_full_phrase(&self) -> bool {
        self.is_value_expression() || self.kind == TokenKind::Const
    }

    /// Whether this token heads a phrase, i.e. may carry children.
    pub fn is_phrase(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Keyword
                | TokenKind::Const
                | TokenKind::Assignment
                | TokenKind::ArgumentList
                | TokenKind::ListLiteral
                | TokenKind::UnaryOperator
                | TokenKind::BinaryOperator
        )
    }
}
