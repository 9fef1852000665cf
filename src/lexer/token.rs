//! Token definitions for the scanner

use crate::error::SourceLocation;
use bitflags::bitflags;
use num_bigint::BigInt;

/// A token produced by the scanner
#[derive(Debug, Clone)]
pub struct Token<'src> {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of the token
    pub raw: &'src str,
    /// Processed value (numbers, cooked strings, regex literals)
    pub value: TokenValue,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// Line number of the first character (1-indexed)
    pub line_number: u32,
    /// Byte offset where that line starts
    pub line_start: usize,
    /// Column of the first character (1-indexed, in characters)
    pub column: u32,
    /// Template segment that starts with a backtick
    pub is_head: bool,
    /// Template segment that ends with a backtick
    pub is_tail: bool,
    /// String literal that contains a legacy octal escape
    pub is_octal: bool,
}

impl Token<'_> {
    /// Location of the first character of the token
    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line_number,
            column: self.column,
            offset: self.start,
        }
    }

    /// Check for a specific punctuator or keyword kind
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Processed token value
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// Punctuators, keywords and EOF carry no value
    None,
    /// `true` / `false`
    Boolean(bool),
    /// Numeric literal
    Number(f64),
    /// BigInt literal (`42n`)
    BigInt(BigInt),
    /// Identifier name or cooked string literal
    String(String),
    /// Template segment, cooked and raw
    Template { cooked: String, raw: String },
    /// Regular expression literal
    Regex(RegexLiteral),
}

impl TokenValue {
    /// Borrow a string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::String(s) => Some(s),
            _ => None,
        }
    }
}

bitflags! {
    /// Regular expression flags (`/pattern/dgimsuvy`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RegexFlags: u8 {
        const HAS_INDICES = 1 << 0;
        const GLOBAL = 1 << 1;
        const IGNORE_CASE = 1 << 2;
        const MULTILINE = 1 << 3;
        const DOT_ALL = 1 << 4;
        const UNICODE = 1 << 5;
        const UNICODE_SETS = 1 << 6;
        const STICKY = 1 << 7;
    }
}

impl RegexFlags {
    /// Parse a flag string, rejecting unknown and repeated flags
    pub fn parse(flags: &str) -> Option<Self> {
        let mut result = RegexFlags::empty();
        for c in flags.chars() {
            let flag = match c {
                'd' => RegexFlags::HAS_INDICES,
                'g' => RegexFlags::GLOBAL,
                'i' => RegexFlags::IGNORE_CASE,
                'm' => RegexFlags::MULTILINE,
                's' => RegexFlags::DOT_ALL,
                'u' => RegexFlags::UNICODE,
                'v' => RegexFlags::UNICODE_SETS,
                'y' => RegexFlags::STICKY,
                _ => return None,
            };
            if result.contains(flag) {
                return None;
            }
            result |= flag;
        }
        if result.contains(RegexFlags::UNICODE | RegexFlags::UNICODE_SETS) {
            return None;
        }
        Some(result)
    }
}

impl std::fmt::Display for RegexFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const ORDER: [(RegexFlags, char); 8] = [
            (RegexFlags::HAS_INDICES, 'd'),
            (RegexFlags::GLOBAL, 'g'),
            (RegexFlags::IGNORE_CASE, 'i'),
            (RegexFlags::MULTILINE, 'm'),
            (RegexFlags::DOT_ALL, 's'),
            (RegexFlags::UNICODE, 'u'),
            (RegexFlags::UNICODE_SETS, 'v'),
            (RegexFlags::STICKY, 'y'),
        ];
        for (flag, c) in ORDER {
            if self.contains(flag) {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// A compiled regular expression literal
#[derive(Debug, Clone)]
pub struct RegexLiteral {
    /// Pattern source between the slashes
    pub pattern: String,
    /// Flags after the closing slash
    pub flags: RegexFlags,
    /// Compiled matcher
    pub regex: regex::Regex,
}

impl PartialEq for RegexLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

impl RegexLiteral {
    /// Compile a pattern with JS flags applied to the matcher
    pub fn compile(pattern: &str, flags: RegexFlags) -> std::result::Result<Self, regex::Error> {
        let regex = regex::RegexBuilder::new(pattern)
            .case_insensitive(flags.contains(RegexFlags::IGNORE_CASE))
            .multi_line(flags.contains(RegexFlags::MULTILINE))
            .dot_matches_new_line(flags.contains(RegexFlags::DOT_ALL))
            .build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            flags,
            regex,
        })
    }
}

/// The kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// `true` or `false`
    BooleanLiteral,
    /// `null`
    NullLiteral,
    /// Numeric literal (42, 3.14, 0xFF, 42n)
    NumericLiteral,
    /// String literal ("hello", 'world')
    StringLiteral,
    /// Template segment (`head${, }middle${, }tail`)
    Template,
    /// Regular expression literal (/pattern/flags)
    RegularExpression,

    // Identifiers and keywords
    /// Identifier (foo, bar, $baz, undefined)
    Identifier,
    /// Reserved word
    Keyword(Keyword),

    // Punctuators
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `...`
    DotDotDot,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `?.`
    QuestionDot,
    /// `??`
    QuestionQuestion,
    /// `??=`
    QuestionQuestionEquals,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,

    // Comparison operators
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEquals,
    /// `>=`
    GreaterEquals,
    /// `==`
    EqualsEquals,
    /// `===`
    EqualsEqualsEquals,
    /// `!=`
    BangEquals,
    /// `!==`
    BangEqualsEquals,

    // Bitwise operators
    /// `&`
    Ampersand,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `>>>`
    GreaterGreaterGreater,

    // Logical operators
    /// `!`
    Bang,
    /// `&&`
    AmpersandAmpersand,
    /// `||`
    PipePipe,

    // Assignment operators
    /// `=`
    Equals,
    /// `+=`
    PlusEquals,
    /// `-=`
    MinusEquals,
    /// `*=`
    StarEquals,
    /// `**=`
    StarStarEquals,
    /// `/=`
    SlashEquals,
    /// `%=`
    PercentEquals,
    /// `<<=`
    LessLessEquals,
    /// `>>=`
    GreaterGreaterEquals,
    /// `>>>=`
    GreaterGreaterGreaterEquals,
    /// `&=`
    AmpersandEquals,
    /// `|=`
    PipeEquals,
    /// `^=`
    CaretEquals,
    /// `&&=`
    AmpersandAmpersandEquals,
    /// `||=`
    PipePipeEquals,

    // Arrow
    /// `=>`
    Arrow,

    // End of file
    /// End of input
    Eof,
}

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Await,
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Enum,
    Export,
    Extends,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    New,
    Return,
    Super,
    Switch,
    This,
    Throw,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,
    Yield,
}

impl Keyword {
    /// Look up a reserved word, bucketed by length
    pub fn from_str(word: &str) -> Option<Keyword> {
        let keyword = match word.len() {
            2 => match word {
                "do" => Keyword::Do,
                "if" => Keyword::If,
                "in" => Keyword::In,
                _ => return None,
            },
            3 => match word {
                "for" => Keyword::For,
                "new" => Keyword::New,
                "try" => Keyword::Try,
                "var" => Keyword::Var,
                _ => return None,
            },
            4 => match word {
                "case" => Keyword::Case,
                "else" => Keyword::Else,
                "enum" => Keyword::Enum,
                "this" => Keyword::This,
                "void" => Keyword::Void,
                "with" => Keyword::With,
                _ => return None,
            },
            5 => match word {
                "await" => Keyword::Await,
                "break" => Keyword::Break,
                "catch" => Keyword::Catch,
                "class" => Keyword::Class,
                "const" => Keyword::Const,
                "super" => Keyword::Super,
                "throw" => Keyword::Throw,
                "while" => Keyword::While,
                "yield" => Keyword::Yield,
                _ => return None,
            },
            6 => match word {
                "delete" => Keyword::Delete,
                "export" => Keyword::Export,
                "import" => Keyword::Import,
                "return" => Keyword::Return,
                "switch" => Keyword::Switch,
                "typeof" => Keyword::Typeof,
                _ => return None,
            },
            7 => match word {
                "default" => Keyword::Default,
                "extends" => Keyword::Extends,
                "finally" => Keyword::Finally,
                _ => return None,
            },
            8 => match word {
                "continue" => Keyword::Continue,
                "debugger" => Keyword::Debugger,
                "function" => Keyword::Function,
                _ => return None,
            },
            10 => match word {
                "instanceof" => Keyword::Instanceof,
                _ => return None,
            },
            _ => return None,
        };
        Some(keyword)
    }

    /// Get the string representation of the keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Await => "await",
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Catch => "catch",
            Keyword::Class => "class",
            Keyword::Const => "const",
            Keyword::Continue => "continue",
            Keyword::Debugger => "debugger",
            Keyword::Default => "default",
            Keyword::Delete => "delete",
            Keyword::Do => "do",
            Keyword::Else => "else",
            Keyword::Enum => "enum",
            Keyword::Export => "export",
            Keyword::Extends => "extends",
            Keyword::Finally => "finally",
            Keyword::For => "for",
            Keyword::Function => "function",
            Keyword::If => "if",
            Keyword::Import => "import",
            Keyword::In => "in",
            Keyword::Instanceof => "instanceof",
            Keyword::New => "new",
            Keyword::Return => "return",
            Keyword::Super => "super",
            Keyword::Switch => "switch",
            Keyword::This => "this",
            Keyword::Throw => "throw",
            Keyword::Try => "try",
            Keyword::Typeof => "typeof",
            Keyword::Var => "var",
            Keyword::Void => "void",
            Keyword::While => "while",
            Keyword::With => "with",
            Keyword::Yield => "yield",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TokenKind {
    /// Check if this token is an assignment operator
    pub fn is_assignment_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Equals
                | TokenKind::PlusEquals
                | TokenKind::MinusEquals
                | TokenKind::StarEquals
                | TokenKind::StarStarEquals
                | TokenKind::SlashEquals
                | TokenKind::PercentEquals
                | TokenKind::LessLessEquals
                | TokenKind::GreaterGreaterEquals
                | TokenKind::GreaterGreaterGreaterEquals
                | TokenKind::AmpersandEquals
                | TokenKind::PipeEquals
                | TokenKind::CaretEquals
                | TokenKind::AmpersandAmpersandEquals
                | TokenKind::PipePipeEquals
                | TokenKind::QuestionQuestionEquals
        )
    }

    /// Check if this token is a punctuator
    pub fn is_punctuator(&self) -> bool {
        !matches!(
            self,
            TokenKind::BooleanLiteral
                | TokenKind::NullLiteral
                | TokenKind::NumericLiteral
                | TokenKind::StringLiteral
                | TokenKind::Template
                | TokenKind::RegularExpression
                | TokenKind::Identifier
                | TokenKind::Keyword(_)
                | TokenKind::Eof
        )
    }
}
