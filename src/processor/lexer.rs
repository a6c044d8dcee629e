//! Hand-written lexer for DVM-BASIC.
//!
//! Keywords are not recognised here: `DIM`, `Function`, `GOTO`, etc. all
//! come out as `Ident`. The parser decides what they mean, including the
//! case-insensitive ones.
//
//  Lexical items:
//
//      Ident    ::= [A-Za-z][A-Za-z0-9_]*
//      Number   ::= [0-9]+          (fits in u64)
//      Str      ::= '"' [^"]* '"'   (may span lines, no escapes)
//      Comment  ::= '//' .* EOL  |  '/*' .*? '*/'
//      Symbols  ::= ( ) , = == != < > <= >= << >> + - * / % & && | || ^ !
//
//  Whitespace is discarded. Comments are kept as tokens so the builder can
//  attach them to lines; the parser steps over them.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Number(u64),
    Str(String),
    /// Raw comment text, delimiters included.
    Comment(String),
    LParen,
    RParen,
    Comma,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Bang,
    Eof,
}

impl Token {
    /// Canonical operator spelling for operator tokens.
    pub fn operator_symbol(&self) -> Option<&'static str> {
        Some(match self {
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Le => "<=",
            Token::Ge => ">=",
            Token::Shl => "<<",
            Token::Shr => ">>",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Amp => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::Bang => "!",
            _ => return None,
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "identifier `{s}`"),
            Token::Number(n) => write!(f, "number `{n}`"),
            Token::Str(s) => write!(f, "string \"{s}\""),
            Token::Comment(_) => f.write_str("comment"),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
            Token::Comma => f.write_str("`,`"),
            Token::Assign => f.write_str("`=`"),
            Token::Eof => f.write_str("end of input"),
            other => write!(f, "`{}`", other.operator_symbol().unwrap_or("?")),
        }
    }
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            finished: false,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Byte offset of the next unread character.
    fn position(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.src.len())
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                buf.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, first: char) -> String {
        let mut id = String::new();
        id.push(first);
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_', &mut id);
        id
    }

    fn read_number(&mut self, start: usize, first: char) -> Result<u64> {
        let mut num = String::new();
        num.push(first);
        self.consume_while(|c| c.is_ascii_digit(), &mut num);
        num.parse::<u64>()
            .map_err(|_| Error::grammar(self.src, start, format!("value too large for Uint64: {num}")))
    }

    fn read_string(&mut self, start: usize) -> Result<String> {
        let mut txt = String::new();
        while let Some(c) = self.next_char() {
            if c == '"' {
                return Ok(txt);
            }
            txt.push(c);
        }
        Err(Error::grammar(self.src, start, "unterminated string literal"))
    }

    fn read_line_comment(&mut self) -> String {
        let mut txt = String::from("//");
        self.consume_while(|c| c != '\n', &mut txt);
        txt
    }

    fn read_block_comment(&mut self, start: usize) -> Result<String> {
        let mut txt = String::from("/*");
        while let Some(c) = self.next_char() {
            txt.push(c);
            if c == '*' && self.peek_char() == Some('/') {
                self.next_char();
                txt.push('/');
                return Ok(txt);
            }
        }
        Err(Error::grammar(self.src, start, "unterminated block comment"))
    }

    fn lex_token(&mut self, start: usize, ch: char) -> Result<Token> {
        let token = match ch {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '=' if self.eat('=') => Token::EqEq,
            '=' => Token::Assign,
            '!' if self.eat('=') => Token::NotEq,
            '!' => Token::Bang,
            '<' if self.eat('=') => Token::Le,
            '<' if self.eat('<') => Token::Shl,
            '<' => Token::Lt,
            '>' if self.eat('=') => Token::Ge,
            '>' if self.eat('>') => Token::Shr,
            '>' => Token::Gt,
            '&' => {
                self.eat('&');
                Token::Amp
            }
            '|' => {
                self.eat('|');
                Token::Pipe
            }
            '/' if self.eat('/') => Token::Comment(self.read_line_comment()),
            '/' if self.eat('*') => Token::Comment(self.read_block_comment(start)?),
            '/' => Token::Slash,
            '"' => Token::Str(self.read_string(start)?),
            c if c.is_ascii_digit() => Token::Number(self.read_number(start, c)?),
            c if c.is_ascii_alphabetic() => Token::Ident(self.read_identifier(c)),
            e => {
                return Err(Error::grammar(
                    self.src,
                    start,
                    format!("unexpected character `{e}`"),
                ));
            }
        };
        Ok(token)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Spanned>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }

        let offset = self.position();
        let ch = match self.next_char() {
            Some(c) => c,
            None => {
                self.finished = true;
                return Some(Ok(Spanned {
                    token: Token::Eof,
                    offset,
                }));
            }
        };

        let res = self.lex_token(offset, ch).map(|token| Spanned { token, offset });
        if res.is_err() {
            self.finished = true;
        }
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token};

    fn tokens(src: &str) -> Vec<Token> {
        let spanned: Result<Vec<_>, _> = Lexer::new(src).collect();
        spanned.unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_tokenisation() {
        let test_cases = vec![
            (
                "10 RETURN 0",
                vec![
                    Token::Number(10),
                    Token::Ident("RETURN".into()),
                    Token::Number(0),
                    Token::Eof,
                ],
            ),
            (
                "IF a <= 64 THEN GOTO 50",
                vec![
                    Token::Ident("IF".into()),
                    Token::Ident("a".into()),
                    Token::Le,
                    Token::Number(64),
                    Token::Ident("THEN".into()),
                    Token::Ident("GOTO".into()),
                    Token::Number(50),
                    Token::Eof,
                ],
            ),
            (
                "STORE(\"own1\",x_1)",
                vec![
                    Token::Ident("STORE".into()),
                    Token::LParen,
                    Token::Str("own1".into()),
                    Token::Comma,
                    Token::Ident("x_1".into()),
                    Token::RParen,
                    Token::Eof,
                ],
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(tokens(src), expected, "{src}");
        }
    }

    #[test]
    fn test_operators() {
        let test_cases = vec![
            ("a == b", Token::EqEq),
            ("a != b", Token::NotEq),
            ("a << b", Token::Shl),
            ("a >> b", Token::Shr),
            ("a >= b", Token::Ge),
            ("a && b", Token::Amp),
            ("a & b", Token::Amp),
            ("a || b", Token::Pipe),
            ("a / b", Token::Slash),
            ("a % b", Token::Percent),
        ];
        for (src, expected) in test_cases {
            let toks = tokens(src);
            assert_eq!(toks[1], expected, "{src}");
            assert_eq!(toks.len(), 4, "{src}");
        }
    }

    #[test]
    fn test_comments_are_tokens() {
        let toks = tokens("10 /*Whatever // */EXISTS()  // tail\n/* multi\nline */");
        assert_eq!(
            toks,
            vec![
                Token::Number(10),
                Token::Comment("/*Whatever // */".into()),
                Token::Ident("EXISTS".into()),
                Token::LParen,
                Token::RParen,
                Token::Comment("// tail".into()),
                Token::Comment("/* multi\nline */".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let spanned: Vec<_> = Lexer::new("10  RETURN").map(|r| r.unwrap()).collect();
        let offsets: Vec<usize> = spanned.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 4, 10]);
    }

    #[test]
    fn test_errors() {
        let test_cases = vec![
            ("\"open", "unterminated string literal"),
            ("/* open", "unterminated block comment"),
            ("a ? b", "unexpected character `?`"),
            ("99999999999999999999", "value too large for Uint64"),
        ];
        for (src, expected) in test_cases {
            let res: Result<Vec<_>, _> = Lexer::new(src).collect();
            let err = res.unwrap_err();
            assert!(err.to_string().contains(expected), "{src}: {err}");
        }
    }
}
