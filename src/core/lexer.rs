//! Tokenizer for rule text.
//!
//! Splits raw text into literal runs and the punctuation the template
//! language gives meaning to. Whether a punctuation token is structural or
//! plain text is decided by the parser, based on where it appears.

/// Kind of a lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// A run of ordinary characters, with escapes already resolved.
    Text(String),
    LBracket,
    Pipe,
    RBracket,
    Hash,
    Dot,
    LParen,
    RParen,
    Comma,
    Question,
    Bang,
    Equals,
    Colon,
}

impl TokenKind {
    /// The source text this token stands for when used as a literal.
    pub(crate) fn as_literal(&self) -> &str {
        match self {
            TokenKind::Text(text) => text,
            TokenKind::LBracket => "[",
            TokenKind::Pipe => "|",
            TokenKind::RBracket => "]",
            TokenKind::Hash => "#",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Question => "?",
            TokenKind::Bang => "!",
            TokenKind::Equals => "=",
            TokenKind::Colon => ":",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the source text.
    pub offset: usize,
}

fn punctuation(c: char) -> Option<TokenKind> {
    let kind = match c {
        '[' => TokenKind::LBracket,
        '|' => TokenKind::Pipe,
        ']' => TokenKind::RBracket,
        '#' => TokenKind::Hash,
        '.' => TokenKind::Dot,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        ',' => TokenKind::Comma,
        '?' => TokenKind::Question,
        '!' => TokenKind::Bang,
        '=' => TokenKind::Equals,
        ':' => TokenKind::Colon,
        _ => return None,
    };
    Some(kind)
}

/// Tokenize rule text. Never fails: every character belongs to some token.
///
/// A backslash makes the following character part of a text run, so `\#`
/// yields a literal `#`. A trailing backslash is kept as-is.
pub(crate) fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut text_start = 0;
    let mut chars = input.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            if text.is_empty() {
                text_start = offset;
            }
            match chars.next() {
                Some((_, escaped)) => text.push(escaped),
                None => text.push('\\'),
            }
            continue;
        }

        match punctuation(c) {
            Some(kind) => {
                if !text.is_empty() {
                    tokens.push(Token {
                        kind: TokenKind::Text(std::mem::take(&mut text)),
                        offset: text_start,
                    });
                }
                tokens.push(Token { kind, offset });
            }
            None => {
                if text.is_empty() {
                    text_start = offset;
                }
                text.push(c);
            }
        }
    }

    if !text.is_empty() {
        tokens.push(Token {
            kind: TokenKind::Text(text),
            offset: text_start,
        });
    }

    tokens
}
