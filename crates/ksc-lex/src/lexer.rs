//! The streaming lexer (§4.1).
//!
//! `Lexer` holds a suffix of the input; `next` advances that suffix and
//! updates `current`. A single byte of lookahead at the cursor's head is
//! all any rule needs.

use ksc_util::{Interner, Span};

use crate::cursor::{Cursor, EOF};
use crate::token::Token;

const RESERVED: &[(&str, Token)] = &[
    ("def", Token::Def),
    ("extern", Token::Extern),
    ("if", Token::If),
    ("then", Token::Then),
    ("else", Token::Else),
    ("for", Token::For),
    ("in", Token::In),
    ("let", Token::Let),
];

fn is_ascii_letter(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

fn is_ascii_alnum(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

fn is_ascii_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

fn is_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == 0x0b || b == 0x0c
}

/// A byte a symbolic (non-alphanumeric) operator spelling may include, e.g.
/// the `*` in `**` or the `~`/`>` in `~>`. Digits and `(` are excluded even
/// though they're not whitespace: a declaration's precedence number and
/// parameter list follow the spelling with no required separating space
/// (`operator:1(l,r)`, `operator&100(l,r)`), so the spelling itself must stop
/// before them rather than swallowing them.
fn is_operator_symbol_byte(b: u8) -> bool {
    !matches!(b, EOF) && !is_whitespace(b) && !is_ascii_alnum(b) && b != b'('
}

/// Consumes a read-only source string and produces [`Token`]s on demand.
///
/// Identifiers and operator spellings are interned into the caller-supplied
/// [`Interner`] as they are scanned, so a `Lexer` never allocates an owned
/// `String` except for the message of an `Invalid` token.
pub struct Lexer<'src, 'intern> {
    cursor: Cursor<'src>,
    interner: &'intern mut Interner,
    current: Token,
    current_span: Span,
}

impl<'src, 'intern> Lexer<'src, 'intern> {
    pub fn new(source: &'src str, interner: &'intern mut Interner) -> Self {
        let mut lexer = Self {
            cursor: Cursor::new(source),
            interner,
            current: Token::Empty,
            current_span: Span::DUMMY,
        };
        lexer.next();
        lexer
    }

    /// The most recently produced token.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// The span of the most recently produced token.
    pub fn span(&self) -> Span {
        self.current_span
    }

    /// The interner backing this lexer's `Identifier`/`Operator` tokens.
    /// Exposed so a caller (the parser) can intern a spelling - e.g. a
    /// single-byte `Punct` as a one-character string - on the same table.
    pub fn interner_mut(&mut self) -> &mut Interner {
        self.interner
    }

    /// Scan and return the next token, replacing `current`.
    pub fn next(&mut self) -> Token {
        let token = self.scan();
        self.current = token.clone();
        token
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while is_whitespace(self.cursor.peek()) {
                self.cursor.bump();
            }
            if self.cursor.peek() == b'#' {
                while !matches!(self.cursor.peek(), b'\n' | b'\r' | EOF) {
                    self.cursor.bump();
                }
                continue;
            }
            break;
        }
    }

    fn scan(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let start = self.cursor.pos();

        if self.cursor.is_eof() {
            self.current_span = Span::new(start as u32, start as u32);
            return Token::Empty;
        }

        let head = self.cursor.peek();

        let token = if is_ascii_letter(head) {
            self.scan_identifier_or_keyword(start)
        } else if is_ascii_digit(head) {
            self.scan_number(start)
        } else {
            self.cursor.bump();
            Token::Punct(head)
        };

        self.current_span = Span::new(start as u32, self.cursor.pos() as u32);
        token
    }

    fn scan_identifier_or_keyword(&mut self, start: usize) -> Token {
        while is_ascii_alnum(self.cursor.peek()) {
            self.cursor.bump();
        }
        let run = self.cursor.slice_from(start);

        if run == "operator" {
            return self.scan_operator_spelling();
        }
        if let Some((_, keyword)) = RESERVED.iter().find(|(spelling, _)| *spelling == run) {
            return keyword.clone();
        }
        Token::Identifier(self.interner.intern(run))
    }

    fn scan_operator_spelling(&mut self) -> Token {
        while is_whitespace(self.cursor.peek()) {
            self.cursor.bump();
        }
        let start = self.cursor.pos();
        if is_ascii_letter(self.cursor.peek()) {
            while is_ascii_alnum(self.cursor.peek()) {
                self.cursor.bump();
            }
        } else {
            while is_operator_symbol_byte(self.cursor.peek()) {
                self.cursor.bump();
            }
        }
        let spelling = self.cursor.slice_from(start);
        if spelling.is_empty() {
            return Token::Invalid("expected operator spelling after `operator`".to_string());
        }
        Token::Operator(self.interner.intern(spelling))
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while is_ascii_digit(self.cursor.peek()) {
            self.cursor.bump();
        }
        if self.cursor.peek() == b'.' {
            self.cursor.bump();
            while is_ascii_digit(self.cursor.peek()) {
                self.cursor.bump();
            }
            if self.cursor.peek() == b'.' {
                while is_ascii_digit(self.cursor.peek()) || self.cursor.peek() == b'.' {
                    self.cursor.bump();
                }
                return Token::Invalid("bad number".to_string());
            }
        }
        let run = self.cursor.slice_from(start);
        match run.parse::<f64>() {
            Ok(value) => Token::Number(value),
            Err(_) => Token::Invalid("bad number".to_string()),
        }
    }
}
