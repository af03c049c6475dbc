//! Semantic Analysis for classc
//!
//! Performs:
//! - Declaration checks for local variables
//! - Use-before-declaration checks for variables
//! - Name resolution for classes and their members
//! - Declared-type propagation through expressions
//!
//! The walk is depth-first, children before the node's own check. Each call
//! receives its own scope snapshot, so nothing a child declares is visible to
//! its siblings or its parent. The one exception is a function body, where
//! each accepted parameter and `localVar` extends the scope of what follows.
//!
//! Declarations and references are checked with opposite polarity: a
//! declaration fails when its name is already visible, a reference fails when
//! it is not. Class and member names are references; only parameters and
//! local variables ever add names to a scope.

use std::collections::BTreeSet;

use log::{debug, trace};

use crate::frontend::ast::*;
use crate::frontend::scope::Scope;
use crate::utils::Error;

/// Semantic analyzer
pub struct SemanticAnalyzer {
    pub errors: Vec<Error>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Analyze a program, annotating its nodes and collecting diagnostics.
    /// Never stops early: every node is visited.
    pub fn analyze(&mut self, program: &Program) {
        let before = self.errors.len();

        let root = Scope::new();
        match program {
            Program::Class(class) => self.visit_class(class, &root),
            Program::Function(func) => self.visit_func_def(func, &root),
        }

        debug!(
            "semantic analysis of '{}': {} error(s)",
            program.name().name,
            self.errors.len() - before
        );
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    // ==================== Declarations ====================

    /// Members are recorded in `declared_names` but never bound: each member
    /// is resolved against the scope the class itself received.
    fn visit_class(&mut self, class: &ClassDecl, scope: &Scope) {
        let names: BTreeSet<String> = class
            .members
            .iter()
            .filter_map(|m| match &m.member {
                Member::Function(f) => Some(f.name.name.clone()),
                Member::Variable(v) => Some(v.name.name.clone()),
                Member::Constructor(_) => None,
            })
            .collect();
        let _ = class.declared_names.set(names);

        for member in &class.members {
            match &member.member {
                Member::Function(f) => self.resolve_function(f, scope),
                Member::Variable(v) => self.resolve_attribute(v, scope),
                Member::Constructor(c) => {
                    let _ = c.resolved.set(Type::Class(class.name.name.clone()));
                }
            }
        }

        self.resolve_class(class, scope);
    }

    /// Reference check for a class name: the class must already be visible
    pub fn resolve_class(&mut self, class: &ClassDecl, scope: &Scope) {
        let name = &class.name;
        if !scope.contains(&name.name) {
            trace!("class '{}' not in scope", name.name);
            self.errors.push(Error::UnresolvedClass {
                name: name.name.clone(),
                span: name.span,
            });
            return;
        }
        let _ = class.resolved.set(Type::Class(name.name.clone()));
    }

    /// Reference check for a member function declaration
    pub fn resolve_function(&mut self, func: &MemberFuncDecl, scope: &Scope) {
        let name = &func.name;
        if !scope.contains(&name.name) {
            trace!("function '{}' not in scope", name.name);
            self.errors.push(Error::UnresolvedFunction {
                name: name.name.clone(),
                span: name.span,
            });
            return;
        }
        let _ = func.resolved.set(Type::Class(name.name.clone()));
    }

    /// Reference check for an attribute declaration
    pub fn resolve_attribute(&mut self, var: &MemberVarDecl, scope: &Scope) {
        let name = &var.name;
        if !scope.contains(&name.name) {
            trace!("attribute '{}' not in scope", name.name);
            self.errors.push(Error::UnresolvedAttribute {
                name: name.name.clone(),
                span: name.span,
            });
            return;
        }
        let _ = var.resolved.set(Type::Class(name.name.clone()));
    }

    fn visit_func_def(&mut self, func: &FuncDef, scope: &Scope) {
        let mut declared = BTreeSet::new();
        let mut body_scope = scope.clone();

        for param in &func.head.params {
            if let Some(extended) = self.declare(&param.name, &param.ty, &body_scope) {
                declared.insert(param.name.name.clone());
                body_scope = extended;
            }
        }

        for item in &func.body {
            match item {
                BodyItem::LocalVar(decl) => {
                    if let Some(extended) = self.declare_local(decl, &body_scope) {
                        declared.insert(decl.name.name.clone());
                        body_scope = extended;
                    }
                }
                BodyItem::Stmt(stmt) => self.visit_stmt(stmt, &body_scope),
            }
        }

        let _ = func.declared_names.set(declared);
        let _ = func.resolved.set(function_type(&func.head));
    }

    /// Declaration check for a local variable. Returns the scope extended
    /// with the new name, or `None` when the name is already visible.
    pub fn declare_local(&mut self, decl: &LocalVarDecl, scope: &Scope) -> Option<Scope> {
        if let Some(args) = &decl.init {
            for arg in args {
                self.visit_expr(arg, scope);
            }
        }

        let extended = self.declare(&decl.name, &decl.ty, scope)?;
        let _ = decl.resolved.set(decl.ty.clone());
        Some(extended)
    }

    fn declare(&mut self, name: &Ident, ty: &Type, scope: &Scope) -> Option<Scope> {
        if scope.contains(&name.name) {
            trace!("'{}' already declared", name.name);
            self.errors.push(Error::AlreadyDeclared {
                name: name.name.clone(),
                span: name.span,
            });
            return None;
        }

        trace!("declare '{}': {}", name.name, ty);
        Some(scope.bind(&name.name, ty.clone()))
    }

    // ==================== Statements ====================

    fn visit_stmt(&mut self, stmt: &Stmt, scope: &Scope) {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                self.resolve_variable(target, scope);
                self.visit_expr(value, scope);
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                self.visit_expr(cond, scope);
                for stmt in then_block.iter().chain(else_block) {
                    self.visit_stmt(stmt, scope);
                }
            }
            Stmt::While { cond, body, .. } => {
                self.visit_expr(cond, scope);
                for stmt in body {
                    self.visit_stmt(stmt, scope);
                }
            }
            Stmt::Read { target, .. } => {
                self.resolve_variable(target, scope);
            }
            Stmt::Write { value, .. } | Stmt::Return { value, .. } => {
                self.visit_expr(value, scope);
            }
            Stmt::Call(call) => self.visit_call(call, scope),
        }
    }

    // ==================== Expressions ====================

    /// Visit an expression and return the type it resolved to, if any
    fn visit_expr(&mut self, expr: &Expr, scope: &Scope) -> Option<Type> {
        match expr {
            Expr::Literal(lit) => {
                let ty = match lit.value {
                    LiteralValue::Int(_) => Type::Integer,
                    LiteralValue::Float(_) => Type::Float,
                };
                let _ = lit.resolved.set(ty.clone());
                Some(ty)
            }
            Expr::Unary(un) => {
                let ty = self.visit_expr(&un.operand, scope)?;
                let _ = un.resolved.set(ty.clone());
                Some(ty)
            }
            Expr::Binary(bin) => {
                let left = self.visit_expr(&bin.left, scope);
                let right = self.visit_expr(&bin.right, scope);

                let ty = if bin.op.is_relational() {
                    Type::Integer
                } else {
                    match (left, right) {
                        (Some(l), Some(r)) if l == r => l,
                        _ => return None,
                    }
                };
                let _ = bin.resolved.set(ty.clone());
                Some(ty)
            }
            Expr::Variable(var) => self.resolve_variable(var, scope),
            Expr::Call(call) => {
                self.visit_call(call, scope);
                None
            }
        }
    }

    /// Reference check for a variable use. Only the head of a qualified
    /// chain is looked up, so only unqualified variables get a type.
    pub fn resolve_variable(&mut self, var: &Variable, scope: &Scope) -> Option<Type> {
        for qualifier in &var.qualifiers {
            for expr in qualifier.access.exprs() {
                self.visit_expr(expr, scope);
            }
        }
        for index in &var.indices {
            self.visit_expr(index, scope);
        }

        let head = var.head();
        let Some(ty) = scope.lookup(&head.name) else {
            trace!("'{}' used before declaration", head.name);
            self.errors.push(Error::UsedBeforeDeclaration {
                name: head.name.clone(),
                span: head.span,
            });
            return None;
        };

        if !var.qualifiers.is_empty() {
            return None;
        }

        let _ = var.resolved.set(ty.clone());
        Some(ty.clone())
    }

    /// Calls are not resolved; only their arguments are checked
    fn visit_call(&mut self, call: &FunctionCall, scope: &Scope) {
        for qualifier in &call.qualifiers {
            for expr in qualifier.access.exprs() {
                self.visit_expr(expr, scope);
            }
        }
        for arg in &call.args {
            self.visit_expr(arg, scope);
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// The type a function definition resolves to
fn function_type(head: &FuncHead) -> Type {
    match (&head.return_type, head.qualifiers.first()) {
        (Some(ty), _) => ty.clone(),
        (None, Some(class)) => Type::Class(class.name.clone()),
        (None, None) => Type::Void,
    }
}

/// Analyze a program with a fresh analyzer and return its diagnostics
pub fn analyze(program: &Program) -> Vec<Error> {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.analyze(program);
    analyzer.into_errors()
}
