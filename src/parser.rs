use crate::{CompileError, Punct, Token, TokenKind, P};

#[derive(Debug, Clone, PartialEq)]
pub struct Node<Kind> {
    pub kind: Kind,
    pub loc: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(i32),
    Add(P<ExprNode>, P<ExprNode>),
    Sub(P<ExprNode>, P<ExprNode>),
    Mul(P<ExprNode>, P<ExprNode>),
    Div(P<ExprNode>, P<ExprNode>),

    Neg(P<ExprNode>),

    // `>` and `>=` are rewritten into these with swapped operands.
    Lt(P<ExprNode>, P<ExprNode>),
    Lte(P<ExprNode>, P<ExprNode>),
    Eq(P<ExprNode>, P<ExprNode>),
    Ne(P<ExprNode>, P<ExprNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(ExprNode),
}

pub type ExprNode = Node<ExprKind>;
pub type StmtNode = Node<StmtKind>;

/// Deepest expression tree the parser builds. Both parsing and code
/// generation recurse once per level.
pub const MAX_DEPTH: usize = 256;

pub struct Parser<'a> {
    pub source: &'a [u8],
    pub tokens: Vec<Token>,
    pub index: usize,
    pub depth: usize,
}

impl<'a> Parser<'a> {
    /// `tokens` normally comes straight from the tokenizer. An `Eof` is
    /// appended if the list does not already end with one.
    pub fn new(source: &'a str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            tokens.push(Token {
                kind: TokenKind::Eof,
                loc: source.len(),
                length: 0,
            });
        }
        Self {
            source: source.as_bytes(),
            tokens,
            index: 0,
            depth: 0,
        }
    }

    // program = stmt*
    pub fn parse(&mut self) -> Result<Vec<StmtNode>, CompileError> {
        let mut stmts = vec![];
        while !self.is_done() {
            stmts.push(self.stmt()?);
        }
        self.ensure_done()?;
        Ok(stmts)
    }

    // stmt = expr-stmt
    fn stmt(&mut self) -> Result<StmtNode, CompileError> {
        self.expr_stmt()
    }

    // expr-stmt = expr ";"
    fn expr_stmt(&mut self) -> Result<StmtNode, CompileError> {
        let loc = self.loc();
        let node = self.expr()?;
        self.skip(";")?;
        Ok(StmtNode {
            kind: StmtKind::Expr(node),
            loc,
        })
    }

    // expr = equality
    fn expr(&mut self) -> Result<ExprNode, CompileError> {
        self.equality()
    }

    // equality = relational ("==" relational | "!=" relational)*
    fn equality(&mut self) -> Result<ExprNode, CompileError> {
        let mut levels = 0;
        let mut node = self.relational()?;

        while let TokenKind::Punct(punct @ (Punct::EqEq | Punct::Ne)) = self.peek().kind {
            let loc = self.loc();
            self.nest()?;
            levels += 1;
            self.advance();
            let lhs = P::new(node);
            let rhs = P::new(self.relational()?);
            node = ExprNode {
                kind: if punct == Punct::EqEq {
                    ExprKind::Eq(lhs, rhs)
                } else {
                    ExprKind::Ne(lhs, rhs)
                },
                loc,
            }
        }

        self.depth -= levels;
        Ok(node)
    }

    // relational = add ("<" add | "<=" add | ">" add | ">=" add)*
    fn relational(&mut self) -> Result<ExprNode, CompileError> {
        let mut levels = 0;
        let mut node = self.add()?;

        while let TokenKind::Punct(punct @ (Punct::Gt | Punct::Gte | Punct::Lt | Punct::Lte)) =
            self.peek().kind
        {
            let loc = self.loc();
            self.nest()?;
            levels += 1;
            self.advance();
            let lhs = P::new(node);
            let rhs = P::new(self.add()?);
            node = ExprNode {
                kind: match punct {
                    Punct::Gt => ExprKind::Lt(rhs, lhs),
                    Punct::Gte => ExprKind::Lte(rhs, lhs),
                    Punct::Lt => ExprKind::Lt(lhs, rhs),
                    _ => ExprKind::Lte(lhs, rhs),
                },
                loc,
            }
        }

        self.depth -= levels;
        Ok(node)
    }

    // add = mul ("+" mul | "-" mul)*
    fn add(&mut self) -> Result<ExprNode, CompileError> {
        let mut levels = 0;
        let mut node = self.mul()?;

        while let TokenKind::Punct(punct @ (Punct::Plus | Punct::Minus)) = self.peek().kind {
            let loc = self.loc();
            self.nest()?;
            levels += 1;
            self.advance();
            let lhs = P::new(node);
            let rhs = P::new(self.mul()?);
            node = ExprNode {
                kind: if punct == Punct::Plus {
                    ExprKind::Add(lhs, rhs)
                } else {
                    ExprKind::Sub(lhs, rhs)
                },
                loc,
            }
        }

        self.depth -= levels;
        Ok(node)
    }

    // mul = unary ("*" unary | "/" unary)*
    fn mul(&mut self) -> Result<ExprNode, CompileError> {
        let mut levels = 0;
        let mut node = self.unary()?;

        while let TokenKind::Punct(punct @ (Punct::Star | Punct::Slash)) = self.peek().kind {
            let loc = self.loc();
            self.nest()?;
            levels += 1;
            self.advance();
            let lhs = P::new(node);
            let rhs = P::new(self.unary()?);
            node = ExprNode {
                kind: if punct == Punct::Star {
                    ExprKind::Mul(lhs, rhs)
                } else {
                    ExprKind::Div(lhs, rhs)
                },
                loc,
            }
        }

        self.depth -= levels;
        Ok(node)
    }

    // unary = ("+" | "-") unary
    //       | primary
    fn unary(&mut self) -> Result<ExprNode, CompileError> {
        let loc = self.loc();

        if let TokenKind::Punct(punct @ (Punct::Minus | Punct::Plus)) = self.peek().kind {
            self.nest()?;
            self.advance();
            let node = self.unary()?;
            self.depth -= 1;

            if punct == Punct::Plus {
                return Ok(node);
            }
            return Ok(ExprNode {
                kind: ExprKind::Neg(P::new(node)),
                loc,
            });
        }

        self.primary()
    }

    // primary = "(" expr ")" | num
    fn primary(&mut self) -> Result<ExprNode, CompileError> {
        let loc = self.loc();
        match self.peek().kind {
            TokenKind::Number(val) => {
                self.advance();
                Ok(ExprNode {
                    kind: ExprKind::Number(val),
                    loc,
                })
            }
            TokenKind::Punct(Punct::LeftParen) => {
                self.nest()?;
                self.advance();
                let expr = self.expr()?;
                self.skip(")")?;
                self.depth -= 1;
                Ok(expr)
            }
            _ => Err(CompileError::ExpectedExpression { offset: loc }),
        }
    }

    fn nest(&mut self) -> Result<(), CompileError> {
        if self.depth >= MAX_DEPTH {
            return Err(CompileError::TooDeep { offset: self.loc() });
        }
        self.depth += 1;
        Ok(())
    }

    fn peek(&self) -> &Token {
        // `advance` never steps past the trailing Eof.
        &self.tokens[self.index]
    }

    fn advance(&mut self) {
        if self.peek().kind != TokenKind::Eof {
            self.index += 1;
        }
    }

    /// Compares the current token's exact text with `s`.
    fn r#match(&self, s: &str) -> bool {
        let tok = self.peek();
        self.source
            .get(tok.loc..tok.loc + tok.length)
            .is_some_and(|text| text == s.as_bytes())
    }

    fn skip(&mut self, s: &'static str) -> Result<(), CompileError> {
        if !self.r#match(s) {
            return Err(CompileError::ExpectedToken {
                offset: self.loc(),
                expected: s,
            });
        }
        self.advance();
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn ensure_done(&self) -> Result<(), CompileError> {
        match self.peek().kind {
            TokenKind::Eof => Ok(()),
            _ => Err(CompileError::TrailingToken { offset: self.loc() }),
        }
    }

    fn loc(&self) -> usize {
        self.peek().loc
    }
}
