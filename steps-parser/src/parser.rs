//! A precedence-climbing parser from token streams to expression trees.
//!
//! The operator ranks mirror the rendering priorities: equality binds loosest, then the additive
//! operators, the multiplicative operators, and exponentiation. `+ - * /` associate to the left
//! and `^` to the right. Unary minus binds tighter than every binary operator but looser than
//! exponentiation, so `-x^2` negates the whole power.
//!
//! Implicit multiplication is recognized when a number or a closing parenthesis is directly
//! followed by an identifier or an opening parenthesis: `4x`, `3(x + 1)`, `(a + b)(c + d)`. It
//! binds like `*`, except that the implicit factor also absorbs a trailing exponent: `4x^2`
//! multiplies `4` by `x^2`.

use crate::error::{EmptyInput, UnbalancedParentheses, UnexpectedToken, UnknownFunction};
use crate::tokenizer::{tokenize_complete, Token, TokenKind};
use std::ops::Range;
use steps_ast::{ExprNode, ExprTree, FunctionKind, NodeId};
use steps_error::{Error, ErrorKind};

const PREC_EQ: u8 = 1;
const PREC_ADDSUB: u8 = 2;
const PREC_MULDIV: u8 = 3;
const PREC_EXP: u8 = 4;

/// The rank, node kind, and right-associativity of a binary operator token.
fn binary_op(kind: TokenKind) -> Option<(u8, ExprNode, bool)> {
    match kind {
        TokenKind::Eq => Some((PREC_EQ, ExprNode::Equal, false)),
        TokenKind::Add => Some((PREC_ADDSUB, ExprNode::Add, false)),
        TokenKind::Sub => Some((PREC_ADDSUB, ExprNode::Subtract, false)),
        TokenKind::Mul => Some((PREC_MULDIV, ExprNode::Multiply, false)),
        TokenKind::Div => Some((PREC_MULDIV, ExprNode::Divide, false)),
        TokenKind::Exp => Some((PREC_EXP, ExprNode::Power, true)),
        _ => None,
    }
}

/// Parses the given source text into an expression tree, returning the tree and its root.
pub fn parse(source: &str) -> Result<(ExprTree, NodeId), Error> {
    Parser::new(source).parse_complete()
}

/// A cursor over the complete token stream of one source string.
#[derive(Debug)]
pub struct Parser<'source> {
    /// The tokens that this parser is currently parsing.
    tokens: Box<[Token<'source>]>,

    /// The index of the **next** token to be parsed.
    cursor: usize,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            tokens: tokenize_complete(source),
            cursor: 0,
        }
    }

    /// Creates an error pointing at the given span.
    fn error(&self, span: Range<usize>, kind: impl ErrorKind + 'static) -> Error {
        Error::new(vec![span], kind)
    }

    /// Returns a span pointing at the end of the source code.
    fn eof_span(&self) -> Range<usize> {
        self.tokens.last().map_or(0..0, |token| token.span.end..token.span.end)
    }

    /// The next significant token, without advancing the cursor.
    fn peek(&self) -> Option<&Token<'source>> {
        self.tokens[self.cursor..].iter().find(|token| !token.is_whitespace())
    }

    /// The kind of the most recently consumed significant token.
    fn prev_kind(&self) -> Option<TokenKind> {
        self.tokens[..self.cursor]
            .iter()
            .rev()
            .find(|token| !token.is_whitespace())
            .map(|token| token.kind)
    }

    /// Consumes and returns the next significant token.
    fn advance(&mut self) -> Option<Token<'source>> {
        while self.cursor < self.tokens.len() {
            let token = self.tokens[self.cursor].clone();
            self.cursor += 1;
            if !token.is_whitespace() {
                return Some(token);
            }
        }
        None
    }

    /// Parses the whole token stream as one expression, requiring every token to be consumed.
    pub fn parse_complete(mut self) -> Result<(ExprTree, NodeId), Error> {
        if self.peek().is_none() {
            return Err(self.error(0..0, EmptyInput));
        }

        let mut tree = ExprTree::new();
        let root = self.parse_binary(&mut tree, PREC_EQ)?;

        if let Some(token) = self.peek() {
            let span = token.span.clone();
            return Err(match token.kind {
                TokenKind::CloseParen => {
                    self.error(span, UnbalancedParentheses { opening: false })
                }
                kind => self.error(span, UnexpectedToken { found: Some(kind) }),
            });
        }
        Ok((tree, root))
    }

    fn parse_binary(&mut self, tree: &mut ExprTree, min_prec: u8) -> Result<NodeId, Error> {
        let mut lhs = self.parse_unary(tree)?;
        loop {
            let Some(token) = self.peek() else {
                break;
            };
            let kind = token.kind;

            if let Some((prec, op, right_assoc)) = binary_op(kind) {
                if prec < min_prec {
                    break;
                }
                self.advance();
                let next_min = if right_assoc { prec } else { prec + 1 };
                let rhs = self.parse_binary(tree, next_min)?;
                lhs = tree.binary(op, lhs, rhs);
            } else if matches!(kind, TokenKind::Name | TokenKind::OpenParen)
                && matches!(
                    self.prev_kind(),
                    Some(TokenKind::Int | TokenKind::Float | TokenKind::CloseParen)
                )
                && PREC_MULDIV >= min_prec
            {
                // Implicit multiplication. The right side parses above `*`'s rank so that a
                // trailing exponent stays attached to the implicit factor.
                let rhs = self.parse_binary(tree, PREC_MULDIV + 1)?;
                lhs = tree.binary(ExprNode::Multiply, lhs, rhs);
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self, tree: &mut ExprTree) -> Result<NodeId, Error> {
        if self.peek().map(|token| token.kind) == Some(TokenKind::Sub) {
            self.advance();
            let operand = self.parse_binary(tree, PREC_EXP)?;
            return Ok(tree.negate(operand));
        }
        self.parse_primary(tree)
    }

    fn parse_primary(&mut self, tree: &mut ExprTree) -> Result<NodeId, Error> {
        let Some(token) = self.advance() else {
            return Err(self.error(self.eof_span(), UnexpectedToken { found: None }));
        };
        match token.kind {
            TokenKind::Int | TokenKind::Float => {
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    self.error(token.span.clone(), UnexpectedToken { found: Some(token.kind) })
                })?;
                Ok(tree.constant(value))
            }
            TokenKind::Name => {
                let called = self.peek().map(|next| next.kind) == Some(TokenKind::OpenParen);
                if !called {
                    return Ok(tree.variable(token.lexeme));
                }

                let Some(function) = FunctionKind::from_name(token.lexeme) else {
                    return Err(self.error(
                        token.span.clone(),
                        UnknownFunction { name: token.lexeme.to_string() },
                    ));
                };
                let open_span =
                    self.peek().map(|next| next.span.clone()).unwrap_or_else(|| self.eof_span());
                self.advance();
                if self.peek().is_none() {
                    return Err(self.error(open_span, UnbalancedParentheses { opening: true }));
                }
                let argument = self.parse_binary(tree, PREC_EQ)?;
                self.expect_close(open_span)?;
                Ok(tree.function(function, argument))
            }
            TokenKind::OpenParen => {
                if self.peek().is_none() {
                    return Err(
                        self.error(token.span.clone(), UnbalancedParentheses { opening: true })
                    );
                }
                let inner = self.parse_binary(tree, PREC_EQ)?;
                self.expect_close(token.span.clone())?;
                Ok(inner)
            }
            TokenKind::CloseParen => {
                Err(self.error(token.span.clone(), UnbalancedParentheses { opening: false }))
            }
            kind => Err(self.error(token.span.clone(), UnexpectedToken { found: Some(kind) })),
        }
    }

    /// Consumes the closing parenthesis of a group opened at `open_span`.
    fn expect_close(&mut self, open_span: Range<usize>) -> Result<(), Error> {
        match self.advance() {
            Some(token) if token.kind == TokenKind::CloseParen => Ok(()),
            _ => Err(self.error(open_span, UnbalancedParentheses { opening: true })),
        }
    }
}
