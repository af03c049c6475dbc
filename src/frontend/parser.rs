//! Parser for classc
//!
//! Recursive descent over the token stream. Operator precedence is encoded
//! by the layering relExpr -> arithExpr -> term -> factor; the additive and
//! multiplicative tails are folded into left-leaning trees. The first
//! unexpected token aborts the parse.

use log::debug;

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Result of parsing an access chain: the `(` lookahead decides which
enum Chain {
    Variable(Variable),
    Call(FunctionCall),
}

impl Parser {
    /// Create a new parser from a lexer. Lexical errors stay on the lexer.
    pub fn new(lexer: &mut Lexer) -> Self {
        Self::from_tokens(lexer.tokenize())
    }

    /// Create a parser from pre-tokenized input
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token::eof(Span::new(end.end, end.end, end.line, end.column)));
        }
        Self { tokens, pos: 0 }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Error for the current token, or for end of input
    fn unexpected(&self, expected: impl Into<String>) -> Error {
        let token = self.current();
        if token.kind == TokenKind::Eof {
            Error::UnexpectedEof {
                expected: expected.into(),
            }
        } else {
            Error::UnexpectedToken {
                expected: expected.into(),
                found: token.value(),
                span: token.span,
            }
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected.to_string()))
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ==================== Program and Classes ====================

    /// Parse a complete program: one class declaration or one function
    /// definition, followed by end of input
    pub fn parse_program(&mut self) -> Result<Program> {
        let program = match self.current_kind() {
            TokenKind::Class => Program::Class(self.parse_class()?),
            TokenKind::Function => Program::Function(self.parse_func_def()?),
            _ => return Err(self.unexpected("'class' or 'function'")),
        };

        if !self.is_at_end() {
            return Err(self.unexpected("end of input"));
        }

        debug!("parsed program '{}'", program.name().name);
        Ok(program)
    }

    fn parse_class(&mut self) -> Result<ClassDecl> {
        let start = self.current().span;
        self.expect(TokenKind::Class)?;

        let name = self.parse_ident()?;
        self.expect(TokenKind::LBrace)?;

        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            members.push(self.parse_visibility_member()?);
        }

        self.expect(TokenKind::RBrace)?;

        Ok(ClassDecl {
            name,
            members,
            span: start.merge(&self.prev_span()),
            resolved: Resolved::new(),
            declared_names: DeclaredNames::new(),
        })
    }

    fn parse_visibility_member(&mut self) -> Result<VisibilityMember> {
        let start = self.current().span;

        let visibility = if self.consume(&TokenKind::Public) {
            Visibility::Public
        } else if self.consume(&TokenKind::Private) {
            Visibility::Private
        } else {
            Visibility::Inherited
        };

        let member = match self.current_kind() {
            TokenKind::Function => Member::Function(self.parse_member_func()?),
            TokenKind::Constructor => Member::Constructor(self.parse_constructor_decl()?),
            TokenKind::Attribute => Member::Variable(self.parse_member_var()?),
            _ => return Err(self.unexpected("'function', 'constructor' or 'attribute'")),
        };

        Ok(VisibilityMember {
            visibility,
            member,
            span: start.merge(&self.prev_span()),
        })
    }

    /// function name: (params) -> returnType;
    fn parse_member_func(&mut self) -> Result<MemberFuncDecl> {
        let start = self.current().span;
        self.expect(TokenKind::Function)?;

        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Arrow)?;
        let return_type = self.parse_return_type()?;
        self.expect(TokenKind::Semicolon)?;

        Ok(MemberFuncDecl {
            name,
            params,
            return_type,
            span: start.merge(&self.prev_span()),
            resolved: Resolved::new(),
        })
    }

    /// constructor: (params);
    fn parse_constructor_decl(&mut self) -> Result<ConstructorDecl> {
        let start = self.current().span;
        self.expect(TokenKind::Constructor)?;
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;

        Ok(ConstructorDecl {
            params,
            span: start.merge(&self.prev_span()),
            resolved: Resolved::new(),
        })
    }

    /// attribute name: type dims;
    fn parse_member_var(&mut self) -> Result<MemberVarDecl> {
        let start = self.current().span;
        self.expect(TokenKind::Attribute)?;

        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let dims = self.parse_dims()?;
        self.expect(TokenKind::Semicolon)?;

        Ok(MemberVarDecl {
            name,
            ty,
            dims,
            span: start.merge(&self.prev_span()),
            resolved: Resolved::new(),
        })
    }

    // ==================== Shared Pieces ====================

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.current().clone();
        match &token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident {
                    name: name.clone(),
                    span: token.span,
                })
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn parse_type(&mut self) -> Result<Type> {
        let ty = match self.current_kind() {
            TokenKind::Integer => Type::Integer,
            TokenKind::Float => Type::Float,
            TokenKind::Ident(name) => Type::Class(name.clone()),
            _ => return Err(self.unexpected("type")),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_return_type(&mut self) -> Result<Type> {
        if self.consume(&TokenKind::Void) {
            return Ok(Type::Void);
        }
        match self.current_kind() {
            TokenKind::Integer | TokenKind::Float | TokenKind::Ident(_) => self.parse_type(),
            _ => Err(self.unexpected("return type")),
        }
    }

    /// `{5}` or `{}`, repeated
    fn parse_dims(&mut self) -> Result<Vec<ArrayDim>> {
        let mut dims = Vec::new();
        while self.consume(&TokenKind::LBrace) {
            let dim = match self.current_kind() {
                TokenKind::IntLit(n) => {
                    let n = *n;
                    self.advance();
                    ArrayDim::Fixed(n)
                }
                _ => ArrayDim::Unbound,
            };
            self.expect(TokenKind::RBrace)?;
            dims.push(dim);
        }
        Ok(dims)
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            params.push(self.parse_param()?);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    fn parse_param(&mut self) -> Result<Param> {
        let start = self.current().span;
        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let dims = self.parse_dims()?;

        Ok(Param {
            name,
            ty,
            dims,
            span: start.merge(&self.prev_span()),
        })
    }

    /// Call arguments, up to but not including the closing `)`
    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr()?);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }

        Ok(args)
    }

    // ==================== Function Definitions ====================

    fn parse_func_def(&mut self) -> Result<FuncDef> {
        let start = self.current().span;
        let head = self.parse_func_head()?;

        self.expect(TokenKind::LBracket)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            body.push(self.parse_body_item()?);
        }
        self.expect(TokenKind::RBracket)?;

        Ok(FuncDef {
            head,
            body,
            span: start.merge(&self.prev_span()),
            resolved: Resolved::new(),
            declared_names: DeclaredNames::new(),
        })
    }

    /// function (id ::)* id (params) -> returnType
    /// function id :: constructor (params)
    fn parse_func_head(&mut self) -> Result<FuncHead> {
        let start = self.current().span;
        self.expect(TokenKind::Function)?;

        let mut qualifiers = Vec::new();
        let mut name = self.parse_ident()?;

        while self.consume(&TokenKind::Sr) {
            qualifiers.push(name);

            if self.check(&TokenKind::Constructor) {
                // Only a single class qualifier may precede `constructor`
                if qualifiers.len() != 1 {
                    return Err(self.unexpected("identifier"));
                }
                let token = self.advance();
                let name = Ident {
                    name: token.lexeme,
                    span: token.span,
                };

                self.expect(TokenKind::LParen)?;
                let params = self.parse_params()?;
                self.expect(TokenKind::RParen)?;

                return Ok(FuncHead {
                    qualifiers,
                    name,
                    params,
                    return_type: None,
                    span: start.merge(&self.prev_span()),
                });
            }

            name = self.parse_ident()?;
        }

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Arrow)?;
        let return_type = self.parse_return_type()?;

        Ok(FuncHead {
            qualifiers,
            name,
            params,
            return_type: Some(return_type),
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_body_item(&mut self) -> Result<BodyItem> {
        if self.check(&TokenKind::LocalVar) {
            Ok(BodyItem::LocalVar(self.parse_local_var()?))
        } else {
            Ok(BodyItem::Stmt(self.parse_stmt()?))
        }
    }

    /// localVar name: type dims;  |  localVar name: type(args);
    fn parse_local_var(&mut self) -> Result<LocalVarDecl> {
        let start = self.current().span;
        self.expect(TokenKind::LocalVar)?;

        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;

        let (dims, init) = if self.consume(&TokenKind::LParen) {
            let args = self.parse_args()?;
            self.expect(TokenKind::RParen)?;
            (Vec::new(), Some(args))
        } else {
            (self.parse_dims()?, None)
        };

        self.expect(TokenKind::Semicolon)?;

        Ok(LocalVarDecl {
            name,
            ty,
            dims,
            init,
            span: start.merge(&self.prev_span()),
            resolved: Resolved::new(),
        })
    }

    // ==================== Statements ====================

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let start = self.current().span;

        match self.current_kind() {
            TokenKind::If => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_rel_expr()?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Then)?;
                let then_block = self.parse_stat_block()?;
                self.expect(TokenKind::Else)?;
                let else_block = self.parse_stat_block()?;
                self.expect(TokenKind::Semicolon)?;

                Ok(Stmt::If {
                    cond,
                    then_block,
                    else_block,
                    span: start.merge(&self.prev_span()),
                })
            }
            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_rel_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_stat_block()?;
                self.expect(TokenKind::Semicolon)?;

                Ok(Stmt::While {
                    cond,
                    body,
                    span: start.merge(&self.prev_span()),
                })
            }
            TokenKind::Read => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let target = self.parse_variable()?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Semicolon)?;

                Ok(Stmt::Read {
                    target,
                    span: start.merge(&self.prev_span()),
                })
            }
            TokenKind::Write | TokenKind::Return => {
                let keyword = self.advance();
                self.expect(TokenKind::LParen)?;
                let value = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Semicolon)?;

                let span = start.merge(&self.prev_span());
                if keyword.kind == TokenKind::Write {
                    Ok(Stmt::Write { value, span })
                } else {
                    Ok(Stmt::Return { value, span })
                }
            }
            TokenKind::Ident(_) => match self.parse_chain()? {
                Chain::Call(call) => {
                    self.expect(TokenKind::Semicolon)?;
                    Ok(Stmt::Call(call))
                }
                Chain::Variable(target) => {
                    self.expect(TokenKind::Assign)?;
                    let value = self.parse_expr()?;
                    self.expect(TokenKind::Semicolon)?;

                    Ok(Stmt::Assign {
                        target,
                        value,
                        span: start.merge(&self.prev_span()),
                    })
                }
            },
            _ => Err(self.unexpected("statement")),
        }
    }

    /// `{ statement* }` or a single statement
    fn parse_stat_block(&mut self) -> Result<Vec<Stmt>> {
        if !self.consume(&TokenKind::LBrace) {
            return Ok(vec![self.parse_stmt()?]);
        }

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;

        Ok(stmts)
    }

    // ==================== Expressions ====================

    /// arithExpr, optionally followed by exactly one relational operator
    fn parse_expr(&mut self) -> Result<Expr> {
        let left = self.parse_arith_expr()?;

        match relational_op(self.current_kind()) {
            Some(op) => {
                self.advance();
                let right = self.parse_arith_expr()?;
                Ok(Expr::binary(op, left, right))
            }
            None => Ok(left),
        }
    }

    /// arithExpr relOp arithExpr, the operator being mandatory
    fn parse_rel_expr(&mut self) -> Result<Expr> {
        let left = self.parse_arith_expr()?;

        let Some(op) = relational_op(self.current_kind()) else {
            return Err(self.unexpected("relational operator"));
        };
        self.advance();
        let right = self.parse_arith_expr()?;

        Ok(Expr::binary(op, left, right))
    }

    fn parse_arith_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_term()?;

        while let Some(op) = additive_op(self.current_kind()) {
            self.advance();
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_factor()?;

        while let Some(op) = multiplicative_op(self.current_kind()) {
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        let token = self.current().clone();

        match &token.kind {
            TokenKind::IntLit(n) => {
                self.advance();
                Ok(Expr::literal(LiteralValue::Int(*n), token.span))
            }
            TokenKind::FloatLit(f) => {
                self.advance();
                Ok(Expr::literal(LiteralValue::Float(*f), token.span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_arith_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_factor()?;
                Ok(Expr::unary(UnOp::Not, operand, token.span))
            }
            TokenKind::Plus | TokenKind::Minus => {
                self.advance();
                let operand = self.parse_factor()?;
                let op = if token.kind == TokenKind::Minus {
                    UnOp::Neg
                } else {
                    UnOp::Plus
                };
                Ok(Expr::unary(op, operand, token.span))
            }
            TokenKind::Ident(_) => match self.parse_chain()? {
                Chain::Variable(var) => Ok(Expr::Variable(var)),
                Chain::Call(call) => Ok(Expr::Call(call)),
            },
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_variable(&mut self) -> Result<Variable> {
        let start = self.pos;
        match self.parse_chain()? {
            Chain::Variable(var) => Ok(var),
            Chain::Call(_) => {
                // Point at the call's opening parenthesis
                let paren = self.tokens[start..self.pos]
                    .iter()
                    .rev()
                    .find(|t| t.kind == TokenKind::LParen)
                    .map(|t| t.span)
                    .unwrap_or_else(|| self.prev_span());
                Err(Error::UnexpectedToken {
                    expected: "variable".to_string(),
                    found: "(".to_string(),
                    span: paren,
                })
            }
        }
    }

    /// (id qualifierTail)* id, then either `(args)` for a call or
    /// `{index}*` for a variable
    fn parse_chain(&mut self) -> Result<Chain> {
        let start = self.current().span;
        let mut qualifiers = Vec::new();

        loop {
            let name = self.parse_ident()?;

            if self.consume(&TokenKind::LParen) {
                let args = self.parse_args()?;
                self.expect(TokenKind::RParen)?;

                if self.consume(&TokenKind::Dot) {
                    qualifiers.push(Qualifier {
                        name,
                        access: Access::Call(args),
                    });
                    continue;
                }

                return Ok(Chain::Call(FunctionCall {
                    qualifiers,
                    name,
                    args,
                    span: start.merge(&self.prev_span()),
                    resolved: Resolved::new(),
                }));
            }

            let indices = self.parse_indices()?;

            if self.consume(&TokenKind::Dot) {
                qualifiers.push(Qualifier {
                    name,
                    access: Access::Indexed(indices),
                });
                continue;
            }

            return Ok(Chain::Variable(Variable {
                qualifiers,
                name,
                indices,
                span: start.merge(&self.prev_span()),
                resolved: Resolved::new(),
            }));
        }
    }

    /// `{arithExpr}*`
    fn parse_indices(&mut self) -> Result<Vec<Expr>> {
        let mut indices = Vec::new();
        while self.consume(&TokenKind::LBrace) {
            indices.push(self.parse_arith_expr()?);
            self.expect(TokenKind::RBrace)?;
        }
        Ok(indices)
    }
}

fn relational_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::EqEq => Some(BinOp::Eq),
        TokenKind::Ne => Some(BinOp::Ne),
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::Le => Some(BinOp::Le),
        TokenKind::Ge => Some(BinOp::Ge),
        _ => None,
    }
}

fn additive_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Plus => Some(BinOp::Add),
        TokenKind::Minus => Some(BinOp::Sub),
        TokenKind::Or => Some(BinOp::Or),
        _ => None,
    }
}

fn multiplicative_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Star => Some(BinOp::Mul),
        TokenKind::Slash => Some(BinOp::Div),
        TokenKind::And => Some(BinOp::And),
        _ => None,
    }
}
