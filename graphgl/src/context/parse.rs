//! Text syntax for math expressions
//!
//! The grammar, from lowest to highest precedence:
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%')? unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := NUMBER | IDENT | IDENT '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! `^` is right-associative and binds tighter than a leading minus, so
//! `-x^2` is `-(x^2)` and `2^3^2` is `2^9`.  A factor written directly after
//! another one multiplies it, so `2x^2` is `2 * x^2` and `3sin(x)` is
//! `3 * sin(x)`.
use super::{BinaryOpcode, Context, Node, UnaryOpcode};
use crate::{Error, var::{Arity, Var}};
use std::str::FromStr;

/// Maximum nesting depth of parentheses / unary operators
const MAX_DEPTH: usize = 256;

#[derive(Clone, Debug, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
    End,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Number(v) => write!(f, "number {v}"),
            TokenKind::Ident(s) => write!(f, "identifier '{s}'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::End => write!(f, "end of expression"),
        }
    }
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(text: &str) -> Result<Vec<Token>, Error> {
    let mut out = vec![];
    let mut iter = text.char_indices().peekable();
    while let Some(&(pos, c)) = iter.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                iter.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut end = pos;
                let mut prev = None;
                while let Some(&(i, c)) = iter.peek() {
                    // Exponent signs are only part of a number directly after
                    // the `e`, and `e` itself only when a digit follows it
                    let accept = c.is_ascii_digit()
                        || c == '.'
                        || ((c == 'e' || c == 'E')
                            && text[i + 1..]
                                .trim_start_matches(['+', '-'])
                                .starts_with(|d: char| d.is_ascii_digit()))
                        || ((c == '+' || c == '-')
                            && matches!(prev, Some('e' | 'E')));
                    if !accept {
                        break;
                    }
                    end = i + c.len_utf8();
                    prev = Some(c);
                    iter.next();
                }
                let s = &text[pos..end];
                let v = s.parse().map_err(|_| Error::BadNumber(s.to_owned()))?;
                TokenKind::Number(v)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = pos;
                while let Some(&(i, c)) = iter.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    iter.next();
                }
                TokenKind::Ident(text[pos..end].to_owned())
            }
            c => {
                iter.next();
                match c {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Star,
                    '/' => TokenKind::Slash,
                    '%' => TokenKind::Percent,
                    '^' => TokenKind::Caret,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    ',' => TokenKind::Comma,
                    ch => return Err(Error::UnknownCharacter { pos, ch }),
                }
            }
        };
        out.push(Token { kind, pos });
    }
    out.push(Token {
        kind: TokenKind::End,
        pos: text.len(),
    });
    Ok(out)
}

struct Parser<'a> {
    ctx: &'a mut Context,
    tokens: Vec<Token>,
    index: usize,
    arity: Arity,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.index].kind
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.index].clone();
        if t.kind != TokenKind::End {
            self.index += 1;
        }
        t
    }

    fn unexpected(&self) -> Error {
        let t = &self.tokens[self.index];
        match t.kind {
            TokenKind::End => Error::UnexpectedEnd,
            TokenKind::RParen => Error::UnbalancedParens,
            _ => Error::UnexpectedToken {
                pos: t.pos,
                found: t.kind.to_string(),
            },
        }
    }

    fn descend(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let t = &self.tokens[self.index];
            return Err(Error::UnexpectedToken {
                pos: t.pos,
                found: format!("nesting deeper than {MAX_DEPTH}"),
            });
        }
        Ok(())
    }

    fn parse(mut self) -> Result<Node, Error> {
        if *self.peek() == TokenKind::End {
            return Err(Error::EmptyExpression);
        }
        let root = self.expr()?;
        match self.peek() {
            TokenKind::End => Ok(root),
            _ => Err(self.unexpected()),
        }
    }

    fn expr(&mut self) -> Result<Node, Error> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOpcode::Add,
                TokenKind::Minus => BinaryOpcode::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.term()?;
            lhs = self.ctx.binary(op, lhs, rhs)?;
        }
    }

    fn term(&mut self) -> Result<Node, Error> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOpcode::Mul,
                TokenKind::Slash => BinaryOpcode::Div,
                TokenKind::Percent => BinaryOpcode::Mod,
                // Juxtaposition, e.g. `2x` or `(x + 1)(x - 1)`
                TokenKind::Number(..)
                | TokenKind::Ident(..)
                | TokenKind::LParen => {
                    let rhs = self.unary()?;
                    lhs = self.ctx.binary(BinaryOpcode::Mul, lhs, rhs)?;
                    continue;
                }
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = self.ctx.binary(op, lhs, rhs)?;
        }
    }

    fn unary(&mut self) -> Result<Node, Error> {
        self.descend()?;
        let out = match self.peek() {
            TokenKind::Minus => {
                self.advance();
                let a = self.unary()?;
                self.ctx.unary(UnaryOpcode::Neg, a)
            }
            TokenKind::Plus => {
                self.advance();
                self.unary()
            }
            _ => self.power(),
        };
        self.depth -= 1;
        out
    }

    fn power(&mut self) -> Result<Node, Error> {
        let base = self.primary()?;
        if *self.peek() == TokenKind::Caret {
            self.advance();
            let exp = self.unary()?;
            self.ctx.binary(BinaryOpcode::Pow, base, exp)
        } else {
            Ok(base)
        }
    }

    fn primary(&mut self) -> Result<Node, Error> {
        let t = self.advance();
        match t.kind {
            TokenKind::Number(v) => Ok(self.ctx.constant(v)),
            TokenKind::LParen => {
                self.descend()?;
                let out = self.expr()?;
                self.depth -= 1;
                match self.peek() {
                    TokenKind::RParen => {
                        self.advance();
                        Ok(out)
                    }
                    TokenKind::End => Err(Error::UnbalancedParens),
                    _ => Err(self.unexpected()),
                }
            }
            TokenKind::Ident(name) if *self.peek() == TokenKind::LParen => {
                self.advance();
                self.call(name)
            }
            TokenKind::Ident(name) => self.ident(name),
            TokenKind::End => Err(Error::UnexpectedEnd),
            TokenKind::RParen => Err(Error::UnbalancedParens),
            kind => Err(Error::UnexpectedToken {
                pos: t.pos,
                found: kind.to_string(),
            }),
        }
    }

    fn ident(&mut self, name: String) -> Result<Node, Error> {
        match name.as_str() {
            "x" => Ok(self.ctx.input(Var::X)),
            // `y` is always a known name; curves bind it to zero
            "y" if self.arity.binds(Var::Y) => Ok(self.ctx.input(Var::Y)),
            "y" => Ok(self.ctx.constant(0.0)),
            // `z` is a known name, but is never bound
            "z" => Ok(self.ctx.constant(0.0)),
            "pi" => Ok(self.ctx.constant(std::f64::consts::PI)),
            "e" => Ok(self.ctx.constant(std::f64::consts::E)),
            _ => Err(Error::UnknownIdentifier(name)),
        }
    }

    fn call(&mut self, name: String) -> Result<Node, Error> {
        let mut args = vec![];
        if *self.peek() != TokenKind::RParen {
            loop {
                args.push(self.expr()?);
                match self.peek() {
                    TokenKind::Comma => {
                        self.advance();
                    }
                    TokenKind::RParen => break,
                    TokenKind::End => return Err(Error::UnbalancedParens),
                    _ => return Err(self.unexpected()),
                }
            }
        }
        self.advance(); // closing parenthesis

        let lookup = if name == "log" { "ln" } else { name.as_str() };
        let wrong_count = |expected| Error::WrongArgCount {
            name: name.clone(),
            expected,
            got: args.len(),
        };
        if let Ok(op) = UnaryOpcode::from_str(lookup) {
            match args.as_slice() {
                [a] => self.ctx.unary(op, *a),
                _ => Err(wrong_count(1)),
            }
        } else if let Ok(op) = BinaryOpcode::from_str(lookup) {
            match args.as_slice() {
                [a, b] => self.ctx.binary(op, *a, *b),
                _ => Err(wrong_count(2)),
            }
        } else {
            Err(Error::UnknownFunction(name))
        }
    }
}

impl Context {
    /// Parses a math expression, adding its nodes to this context
    ///
    /// `x` is always available; `y` is an input when `arity` is
    /// [`Arity::Two`] and the constant `0` otherwise.  `pi` and `e` are
    /// built-in constants.
    ///
    /// ```
    /// # use graphgl::{context::Context, var::Arity};
    /// let mut ctx = Context::new();
    /// let root = ctx.parse("2 * x + sin(pi * y)", Arity::Two)?;
    /// assert_eq!(ctx.eval_xy(root, 3.0, 0.0)?, 6.0);
    /// # Ok::<(), graphgl::Error>(())
    /// ```
    pub fn parse(&mut self, text: &str, arity: Arity) -> Result<Node, Error> {
        let tokens = tokenize(text)?;
        Parser {
            ctx: self,
            tokens,
            index: 0,
            arity,
            depth: 0,
        }
        .parse()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn eval(text: &str, x: f64, y: f64) -> f64 {
        let mut ctx = Context::new();
        let root = ctx.parse(text, Arity::Two).unwrap();
        ctx.eval_xy(root, x, y).unwrap()
    }

    #[test]
    fn tokens() {
        let t = tokenize("2.5e-3*x").unwrap();
        let kinds: Vec<_> = t.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number(2.5e-3),
                TokenKind::Star,
                TokenKind::Ident("x".to_owned()),
                TokenKind::End
            ]
        );

        // `e` is a constant when no exponent digits follow
        let t = tokenize("2e").unwrap();
        assert_eq!(t[0].kind, TokenKind::Number(2.0));
        assert_eq!(t[1].kind, TokenKind::Ident("e".to_owned()));
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("1 + 2 * 3", 0.0, 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0, 0.0), 9.0);
        assert_eq!(eval("-x^2", 3.0, 0.0), -9.0);
        assert_eq!(eval("2^3^2", 0.0, 0.0), 512.0);
        assert_eq!(eval("2^-1", 0.0, 0.0), 0.5);
        assert_eq!(eval("10 - 4 - 3", 0.0, 0.0), 3.0);
        assert_eq!(eval("8 / 4 / 2", 0.0, 0.0), 1.0);
        assert_eq!(eval("7 % 4", 0.0, 0.0), 3.0);
        assert_eq!(eval("--x", 2.0, 0.0), 2.0);
        assert_eq!(eval("+x", 2.0, 0.0), 2.0);
    }

    #[test]
    fn functions() {
        let half_pi = std::f64::consts::FRAC_PI_2;
        assert_relative_eq!(eval("sin(x)", half_pi, 0.0), 1.0);
        assert_relative_eq!(eval("log(e)", 0.0, 0.0), 1.0);
        assert_relative_eq!(eval("log10(1000)", 0.0, 0.0), 3.0);
        assert_eq!(eval("max(x, y)", 1.0, 2.0), 2.0);
        assert_eq!(eval("min(x, y)", 1.0, 2.0), 1.0);
        assert_eq!(eval("pow(x, 3)", 2.0, 0.0), 8.0);
        assert_eq!(eval("abs(x - y)", 1.0, 4.0), 3.0);
        assert_relative_eq!(
            eval("atan2(y, x)", 1.0, 1.0),
            std::f64::consts::FRAC_PI_4
        );
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(eval("2x", 3.0, 0.0), 6.0);
        assert_eq!(eval("2(x+1)", 3.0, 0.0), 8.0);
        assert_eq!(eval("(x+1)(x-1)", 3.0, 0.0), 8.0);
        assert_relative_eq!(
            eval("3sin(x)", std::f64::consts::FRAC_PI_2, 0.0),
            3.0
        );
        assert_eq!(eval("2x^2", 3.0, 0.0), 18.0);
        assert_eq!(eval("x y", 3.0, 4.0), 12.0);
        assert_eq!(eval("2x - 1", 3.0, 0.0), 5.0);
        assert_eq!(eval("6 / 2x", 3.0, 0.0), 9.0);
    }

    #[test]
    fn curve_binds_y_to_zero() {
        let mut ctx = Context::new();
        let root = ctx.parse("x + y", Arity::One).unwrap();
        assert_eq!(ctx.eval_xy(root, 2.0, 100.0).unwrap(), 2.0);
    }

    #[test]
    fn z_is_zero() {
        assert_eq!(eval("x + y + z", 1.0, 2.0), 3.0);
        assert_eq!(eval("cos(z)", 1.0, 2.0), 1.0);
    }

    #[test]
    fn errors() {
        let mut ctx = Context::new();
        let mut parse = |s| ctx.parse(s, Arity::Two);
        assert!(matches!(parse(""), Err(Error::EmptyExpression)));
        assert!(matches!(parse("   "), Err(Error::EmptyExpression)));
        assert!(matches!(parse("+++"), Err(Error::UnexpectedEnd)));
        assert!(matches!(parse("x +"), Err(Error::UnexpectedEnd)));
        assert!(matches!(parse("(x + 1"), Err(Error::UnbalancedParens)));
        assert!(matches!(parse("x + 1)"), Err(Error::UnbalancedParens)));
        assert!(matches!(parse("sin(x"), Err(Error::UnbalancedParens)));
        assert!(matches!(parse("w"), Err(Error::UnknownIdentifier(_))));
        assert!(matches!(parse("X"), Err(Error::UnknownIdentifier(_))));
        assert!(matches!(parse("sin"), Err(Error::UnknownIdentifier(_))));
        assert!(matches!(parse("foo(x)"), Err(Error::UnknownFunction(_))));
        assert!(matches!(
            parse("sin(x, y)"),
            Err(Error::WrongArgCount {
                expected: 1,
                got: 2,
                ..
            })
        ));
        assert!(matches!(
            parse("max(x)"),
            Err(Error::WrongArgCount { expected: 2, .. })
        ));
        assert!(matches!(parse("x $ 2"), Err(Error::UnknownCharacter { .. })));
        assert!(matches!(parse("1.2.3"), Err(Error::BadNumber(_))));
        assert!(matches!(parse("2 ,"), Err(Error::UnexpectedToken { .. })));
        assert!(matches!(parse("x(2)"), Err(Error::UnknownFunction(_))));
        assert!(matches!(parse("."), Err(Error::BadNumber(_))));
    }

    #[test]
    fn deep_nesting() {
        let mut ctx = Context::new();
        let s = "(".repeat(1000) + "x" + &")".repeat(1000);
        assert!(ctx.parse(&s, Arity::One).is_err());

        let s = "(".repeat(100) + "x" + &")".repeat(100);
        let root = ctx.parse(&s, Arity::One).unwrap();
        assert_eq!(ctx.eval_xy(root, 4.0, 0.0).unwrap(), 4.0);
    }
}
