//! Grammar matcher: consumes the lexer and builds a `SourceTree`.
//!
//! The whole input must match; the first mismatch is reported as a grammar
//! error with its position and what was expected there.
//
//  program     ::= function*
//  function    ::= "Function" ident "(" list<ident type> ")" type line* "End" "Function"
//  line        ::= number [statement]            (statement may not start with "End")
//  statement   ::= DIM list<ident> AS type
//                | LET ident "=" expr
//                | GOTO number
//                | IF expr THEN GOTO number [ELSE GOTO number]
//                | RETURN expr
//                | expr
//
//  expr, loosest first:  |  ^  &  (== !=)  (< > <= >=)  (<< >>)  (+ - %)  (* /)  !  primary
//  primary     ::= "(" expr ")" | ident "(" list<expr> ")" | number | string | ident
//
//  Comments may appear between any two tokens.

use tracing::trace;

use super::lexer::{Lexer, Spanned, Token};
use super::syntax::*;
use crate::error::{Error, Result};
use crate::model::{BitwiseOperator, CalcOperator, DvmType, LogicalOperator, Operator};

/// Binary precedence layers, loosest first. All are left-associative.
/// `%` sits with `+`/`-`, below `*`/`/`.
const BINARY_LAYERS: &[&[(Token, Operator)]] = &[
    &[(Token::Pipe, Operator::Bitwise(BitwiseOperator::Or))],
    &[(Token::Caret, Operator::Bitwise(BitwiseOperator::Xor))],
    &[(Token::Amp, Operator::Bitwise(BitwiseOperator::And))],
    &[
        (Token::EqEq, Operator::Logical(LogicalOperator::Eq)),
        (Token::NotEq, Operator::Logical(LogicalOperator::Ne)),
    ],
    &[
        (Token::Le, Operator::Logical(LogicalOperator::Le)),
        (Token::Lt, Operator::Logical(LogicalOperator::Lt)),
        (Token::Ge, Operator::Logical(LogicalOperator::Ge)),
        (Token::Gt, Operator::Logical(LogicalOperator::Gt)),
    ],
    &[
        (Token::Shl, Operator::Bitwise(BitwiseOperator::Shl)),
        (Token::Shr, Operator::Bitwise(BitwiseOperator::Shr)),
    ],
    &[
        (Token::Plus, Operator::Calc(CalcOperator::Add)),
        (Token::Minus, Operator::Calc(CalcOperator::Sub)),
        (Token::Percent, Operator::Calc(CalcOperator::Mod)),
    ],
    &[
        (Token::Star, Operator::Calc(CalcOperator::Mul)),
        (Token::Slash, Operator::Calc(CalcOperator::Div)),
    ],
];

/// Matches `src` against the grammar.
pub fn parse_source(src: &str) -> Result<SourceTree> {
    let tokens = Lexer::new(src).collect::<Result<Vec<_>>>()?;
    trace!(tokens = tokens.len(), "lexed source");
    let mut parser = Parser::new(src, tokens);
    parser.parse_program()
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    /// Comments stepped over since the last `take_comments`.
    pending: Vec<CommentNode>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, tokens: Vec<Spanned>) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
            pending: Vec::new(),
        }
    }

    // ── token plumbing ──────────────────────────────────────────────

    fn skip_comments(&mut self) {
        while let Some(Spanned {
            token: Token::Comment(raw),
            offset,
        }) = self.tokens.get(self.pos)
        {
            self.pending.push(CommentNode {
                raw: raw.clone(),
                offset: *offset,
            });
            self.pos += 1;
        }
    }

    fn current(&mut self) -> &Spanned {
        self.skip_comments();
        // The lexer always terminates the stream with `Eof`.
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&mut self) -> &Token {
        &self.current().token
    }

    fn offset(&mut self) -> usize {
        self.current().offset
    }

    fn bump(&mut self) -> Spanned {
        let spanned = self.current().clone();
        if spanned.token != Token::Eof {
            self.pos += 1;
        }
        spanned
    }

    fn take_comments(&mut self) -> Vec<CommentNode> {
        std::mem::take(&mut self.pending)
    }

    fn unexpected(&mut self, expected: &str) -> Error {
        let found = self.peek().to_string();
        let offset = self.offset();
        Error::grammar(self.src, offset, format!("expected {expected}, found {found}"))
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<()> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Exact, case-sensitive word (`Function`, `End`).
    fn at_word(&mut self, word: &str) -> bool {
        matches!(self.peek(), Token::Ident(id) if id == word)
    }

    /// Case-insensitive keyword (`DIM`, `THEN`, ...).
    fn at_keyword(&mut self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Ident(id) if id.eq_ignore_ascii_case(keyword))
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.at_word(word) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{word}`")))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.at_keyword(keyword) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{keyword}`")))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        if let Token::Ident(id) = self.peek() {
            let id = id.clone();
            self.bump();
            return Ok(id);
        }
        Err(self.unexpected("identifier"))
    }

    fn expect_number(&mut self) -> Result<u64> {
        let number = match self.peek() {
            Token::Number(n) => Some(*n),
            _ => None,
        };
        match number {
            Some(n) => {
                self.bump();
                Ok(n)
            }
            None => Err(self.unexpected("line number")),
        }
    }

    fn expect_type(&mut self) -> Result<DvmType> {
        let ty = match self.peek() {
            Token::Ident(id) => DvmType::from_keyword(id),
            _ => None,
        };
        match ty {
            Some(ty) => {
                self.bump();
                Ok(ty)
            }
            None => Err(self.unexpected("type `Uint64` or `String`")),
        }
    }

    /// `item ("," item)*`, possibly empty when `close` follows immediately.
    fn list_of<T>(
        &mut self,
        close: &Token,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        if self.peek() == close {
            return Ok(items);
        }
        loop {
            items.push(item(self)?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(items)
    }

    // ── program structure ───────────────────────────────────────────

    fn parse_program(&mut self) -> Result<SourceTree> {
        let mut functions = Vec::new();
        while *self.peek() != Token::Eof {
            let leading = self.take_comments();
            functions.push(self.parse_function(leading)?);
        }
        Ok(SourceTree {
            functions,
            trailing_comments: self.take_comments(),
        })
    }

    fn parse_function(&mut self, mut comments: Vec<CommentNode>) -> Result<FunctionNode> {
        self.expect_word("Function")?;
        let offset = self.offset();
        let name = self.expect_ident()?;
        self.expect(Token::LParen, "`(`")?;
        comments.extend(self.take_comments());
        let args = self.list_of(&Token::RParen, |p| {
            let name = p.expect_ident()?;
            let ty = p.expect_type()?;
            p.skip_comments();
            Ok(ArgNode {
                name,
                ty,
                comments: p.take_comments(),
            })
        })?;
        self.expect(Token::RParen, "`,` or `)`")?;
        let return_type = self.expect_type()?;

        self.skip_comments();
        comments.extend(self.take_comments());

        let mut lines = Vec::new();
        while let Token::Number(_) = self.peek() {
            lines.push(self.parse_line()?);
        }
        if !self.at_word("End") {
            return Err(self.unexpected("line number or `End Function`"));
        }
        self.bump();
        self.expect_word("Function")?;
        trace!(function = %name, lines = lines.len(), "matched function");

        Ok(FunctionNode {
            name,
            offset,
            args,
            return_type,
            comments,
            lines,
        })
    }

    fn parse_line(&mut self) -> Result<LineNode> {
        let offset = self.offset();
        let number = self.expect_number()?;
        let empty = matches!(self.peek(), Token::Number(_) | Token::Eof) || self.at_word("End");
        let statement = if empty {
            None
        } else {
            Some(self.parse_statement()?)
        };
        self.skip_comments();
        Ok(LineNode {
            number,
            offset,
            statement,
            comments: self.take_comments(),
        })
    }

    fn parse_statement(&mut self) -> Result<StatementNode> {
        if self.at_keyword("DIM") {
            self.bump();
            let names = self.list_of(&Token::Eof, |p| p.expect_ident())?;
            self.expect_keyword("AS")?;
            let ty = self.expect_type()?;
            return Ok(StatementNode::Dim { names, ty });
        }
        if self.at_keyword("LET") {
            self.bump();
            let name = self.expect_ident()?;
            self.expect(Token::Assign, "`=`")?;
            let value = self.parse_expression()?;
            return Ok(StatementNode::Let { name, value });
        }
        if self.at_keyword("GOTO") {
            return Ok(StatementNode::Goto(self.parse_goto()?));
        }
        if self.at_keyword("IF") {
            self.bump();
            let condition = self.parse_expression()?;
            self.expect_keyword("THEN")?;
            let then = self.parse_goto()?;
            let otherwise = if self.at_keyword("ELSE") {
                self.bump();
                Some(self.parse_goto()?)
            } else {
                None
            };
            return Ok(StatementNode::Branch {
                condition,
                then,
                otherwise,
            });
        }
        if self.at_keyword("RETURN") {
            self.bump();
            return Ok(StatementNode::Return(self.parse_expression()?));
        }
        Ok(StatementNode::Expression(self.parse_expression()?))
    }

    fn parse_goto(&mut self) -> Result<u64> {
        self.expect_keyword("GOTO")?;
        self.expect_number()
    }

    // ── expressions ─────────────────────────────────────────────────

    fn parse_expression(&mut self) -> Result<ExprNode> {
        self.parse_layer(0)
    }

    fn parse_layer(&mut self, layer: usize) -> Result<ExprNode> {
        let Some(operators) = BINARY_LAYERS.get(layer) else {
            return self.parse_unary();
        };
        let mut lhs = self.parse_layer(layer + 1)?;
        loop {
            let next = self.peek();
            let Some(&(_, operator)) = operators.iter().find(|(token, _)| token == next) else {
                break;
            };
            self.bump();
            let rhs = self.parse_layer(layer + 1)?;
            lhs = ExprNode::Binary {
                operator,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ExprNode> {
        if self.eat(&Token::Bang) {
            return Ok(ExprNode::Not(Box::new(self.parse_primary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ExprNode> {
        match self.peek().clone() {
            Token::LParen => {
                self.bump();
                let inner = self.parse_expression()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(ExprNode::Paren(Box::new(inner)))
            }
            Token::Number(n) => {
                self.bump();
                Ok(ExprNode::Number(n))
            }
            Token::Str(s) => {
                self.bump();
                Ok(ExprNode::Str(s))
            }
            Token::Ident(name) => {
                self.bump();
                if self.eat(&Token::LParen) {
                    let args = self.list_of(&Token::RParen, |p| p.parse_expression())?;
                    self.expect(Token::RParen, "`,` or `)`")?;
                    Ok(ExprNode::Call { name, args })
                } else {
                    Ok(ExprNode::Name(name))
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}
