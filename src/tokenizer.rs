use crate::CompileError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Punct {
    EqEq,
    Gt,
    Gte,
    LeftParen,
    Lt,
    Lte,
    Minus,
    Ne,
    Plus,
    RightParen,
    Semicolon,
    Slash,
    Star,
    /// Punctuation the grammar has no use for. Kept so the parser can
    /// reject it with a precise position.
    Other(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Punct(Punct),
    Number(i32),
    Eof,
}

/// A token never copies its text: `loc` and `length` span the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tokenizer<'a> {
    pub source: &'a [u8],
    pub index: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            index: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = vec![];
        while let Some(c) = self.peek() {
            match c {
                c if c.is_ascii_whitespace() => self.advance(),
                b'0'..=b'9' => tokens.push(self.number()),
                c if is_punct(c) => tokens.push(self.punct()),
                _ => return Err(CompileError::InvalidToken { offset: self.index }),
            }
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            loc: self.index,
            length: 0,
        });

        Ok(tokens)
    }

    fn punct(&mut self) -> Token {
        let start = self.index;
        let c = self.source[start];
        let next_c = self.peek_next();
        self.advance();
        let punct = match (c, next_c) {
            (b'=', Some(b'=')) => Punct::EqEq,
            (b'!', Some(b'=')) => Punct::Ne,
            (b'<', Some(b'=')) => Punct::Lte,
            (b'>', Some(b'=')) => Punct::Gte,
            (b';', _) => Punct::Semicolon,
            (b'(', _) => Punct::LeftParen,
            (b')', _) => Punct::RightParen,
            (b'+', _) => Punct::Plus,
            (b'-', _) => Punct::Minus,
            (b'*', _) => Punct::Star,
            (b'/', _) => Punct::Slash,
            (b'<', _) => Punct::Lt,
            (b'>', _) => Punct::Gt,
            (c, _) => Punct::Other(c),
        };
        if matches!(punct, Punct::EqEq | Punct::Ne | Punct::Lte | Punct::Gte) {
            self.advance();
        }

        Token {
            kind: TokenKind::Punct(punct),
            loc: start,
            length: self.index - start,
        }
    }

    // Wraps modulo 2^32 on overflow.
    fn number(&mut self) -> Token {
        let start = self.index;
        let mut num: u32 = 0;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                num = num.wrapping_mul(10).wrapping_add((c - b'0') as u32);
                self.advance();
            } else {
                break;
            }
        }

        Token {
            kind: TokenKind::Number(num as i32),
            loc: start,
            length: self.index - start,
        }
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.source.get(self.index + 1).copied()
    }
}

/// ASCII punctuation that can appear in a C statement. Quotes, `#`, `$`,
/// `@`, `_`, backslash and backtick never do.
fn is_punct(c: u8) -> bool {
    c.is_ascii_punctuation()
        && !matches!(
            c,
            b'"' | b'#' | b'$' | b'\'' | b'@' | b'\\' | b'_' | b'`'
        )
}
