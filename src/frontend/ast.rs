//! Abstract Syntax Tree definitions for classc
//!
//! Nodes are built once by the parser and never restructured afterwards.
//! The semantic pass fills the write-once `resolved` and `declared_names`
//! slots through a shared reference.

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::fmt;

use crate::utils::Span;

/// Write-once slot for the type tag the semantic pass assigns to a node
pub type Resolved = OnceCell<Type>;

/// Write-once slot for the names a scope-introducing node declares
pub type DeclaredNames = OnceCell<BTreeSet<String>>;

/// A compilation unit: exactly one class declaration or function definition
#[derive(Debug, Clone, PartialEq)]
pub enum Program {
    Class(ClassDecl),
    Function(FuncDef),
}

impl Program {
    /// Name of the top-level declaration
    pub fn name(&self) -> &Ident {
        match self {
            Program::Class(class) => &class.name,
            Program::Function(func) => &func.head.name,
        }
    }
}

/// Identifier with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// Declared types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Float,
    /// Only valid as a return type
    Void,
    /// A class name
    Class(String),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => f.write_str("integer"),
            Type::Float => f.write_str("float"),
            Type::Void => f.write_str("void"),
            Type::Class(name) => f.write_str(name),
        }
    }
}

/// One array dimension: `{5}` or the open `{}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayDim {
    Fixed(u64),
    Unbound,
}

// ==================== Declarations ====================

/// class Name { members }
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub members: Vec<VisibilityMember>,
    pub span: Span,
    pub resolved: Resolved,
    pub declared_names: DeclaredNames,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    /// No modifier written
    Inherited,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityMember {
    pub visibility: Visibility,
    pub member: Member,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Function(MemberFuncDecl),
    Constructor(ConstructorDecl),
    Variable(MemberVarDecl),
}

/// function name: (params) -> returnType;
#[derive(Debug, Clone, PartialEq)]
pub struct MemberFuncDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub span: Span,
    pub resolved: Resolved,
}

/// constructor: (params);
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub params: Vec<Param>,
    pub span: Span,
    pub resolved: Resolved,
}

/// attribute name: type dims;
#[derive(Debug, Clone, PartialEq)]
pub struct MemberVarDecl {
    pub name: Ident,
    pub ty: Type,
    pub dims: Vec<ArrayDim>,
    pub span: Span,
    pub resolved: Resolved,
}

/// Formal parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: Type,
    pub dims: Vec<ArrayDim>,
    pub span: Span,
}

/// Function definition: head followed by a `[ ... ]` body
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub head: FuncHead,
    pub body: Vec<BodyItem>,
    pub span: Span,
    pub resolved: Resolved,
    pub declared_names: DeclaredNames,
}

/// `function A::B::name(params) -> type` or `function A::constructor(params)`.
///
/// For the constructor form `name` is the `constructor` keyword itself and
/// `return_type` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncHead {
    pub qualifiers: Vec<Ident>,
    pub name: Ident,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub span: Span,
}

impl FuncHead {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    /// Qualified name as written, e.g. `Shape::area`
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = self.qualifiers.iter().map(|q| q.name.as_str()).collect();
        parts.push(&self.name.name);
        parts.join("::")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyItem {
    LocalVar(LocalVarDecl),
    Stmt(Stmt),
}

/// localVar name: type dims;  or  localVar name: type(args);
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVarDecl {
    pub name: Ident,
    pub ty: Type,
    pub dims: Vec<ArrayDim>,
    /// Constructor arguments for the `type(args)` form
    pub init: Option<Vec<Expr>>,
    pub span: Span,
    pub resolved: Resolved,
}

// ==================== Statements ====================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// variable = expr;
    Assign {
        target: Variable,
        value: Expr,
        span: Span,
    },
    /// if (cond) then block else block;
    If {
        cond: Expr,
        then_block: Vec<Stmt>,
        else_block: Vec<Stmt>,
        span: Span,
    },
    /// while (cond) block;
    While {
        cond: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    Read {
        target: Variable,
        span: Span,
    },
    Write {
        value: Expr,
        span: Span,
    },
    Return {
        value: Expr,
        span: Span,
    },
    /// functionCall;
    Call(FunctionCall),
}

// ==================== Expressions ====================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary(BinaryOp),
    Unary(UnaryOp),
    Literal(Literal),
    Variable(Variable),
    Call(FunctionCall),
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        let span = left.span().merge(&right.span());
        Expr::Binary(BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
            resolved: Resolved::new(),
        })
    }

    pub fn unary(op: UnOp, operand: Expr, span: Span) -> Expr {
        Expr::Unary(UnaryOp {
            op,
            span: span.merge(&operand.span()),
            operand: Box::new(operand),
            resolved: Resolved::new(),
        })
    }

    pub fn literal(value: LiteralValue, span: Span) -> Expr {
        Expr::Literal(Literal {
            value,
            span,
            resolved: Resolved::new(),
        })
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Binary(b) => b.span,
            Expr::Unary(u) => u.span,
            Expr::Literal(l) => l.span,
            Expr::Variable(v) => v.span,
            Expr::Call(c) => c.span,
        }
    }

    /// The type assigned by the semantic pass, if any
    pub fn resolved(&self) -> Option<&Type> {
        match self {
            Expr::Binary(b) => b.resolved.get(),
            Expr::Unary(u) => u.resolved.get(),
            Expr::Literal(l) => l.resolved.get(),
            Expr::Variable(v) => v.resolved.get(),
            Expr::Call(c) => c.resolved.get(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
    pub resolved: Resolved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
    pub resolved: Resolved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
    pub resolved: Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue {
    Int(u64),
    Float(f64),
}

/// `a.b{1}.c{i}`: qualifier links, then the accessed name and its indices
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub qualifiers: Vec<Qualifier>,
    pub name: Ident,
    pub indices: Vec<Expr>,
    pub span: Span,
    pub resolved: Resolved,
}

impl Variable {
    /// The name looked up in scope: the first link of the chain, or the
    /// variable itself when unqualified
    pub fn head(&self) -> &Ident {
        self.qualifiers.first().map(|q| &q.name).unwrap_or(&self.name)
    }
}

/// `a.f(x, y)`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub qualifiers: Vec<Qualifier>,
    pub name: Ident,
    pub args: Vec<Expr>,
    pub span: Span,
    pub resolved: Resolved,
}

/// One `name{..}.` or `name(..).` link of a qualifier chain
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    pub name: Ident,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    /// Plain or indexed member access; the list may be empty
    Indexed(Vec<Expr>),
    /// Call result
    Call(Vec<Expr>),
}

impl Access {
    pub fn exprs(&self) -> &[Expr] {
        match self {
            Access::Indexed(exprs) | Access::Call(exprs) => exprs,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Relational
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Additive
    Add,
    Sub,
    Or,
    // Multiplicative
    Mul,
    Div,
    And,
}

impl BinOp {
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Or => "or",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::And => "and",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Plus,
    Neg,
}

impl UnOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnOp::Not => "not",
            UnOp::Plus => "+",
            UnOp::Neg => "-",
        }
    }
}
