//! Display - human-readable listings of tokens and syntax trees
//!
//! Both printers are pure: they return a `String` and never touch stdout.

use std::fmt::{self, Write};

use crate::frontend::ast::*;
use crate::frontend::token::{Token, TokenKind};

/// Tabulate tokens as type, value, line and position. `Eof` is omitted.
pub fn token_table(tokens: &[Token]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{:<18} {:<20} {:>5} {:>8}", "TYPE", "VALUE", "LINE", "POSITION");
    for token in tokens.iter().filter(|t| t.kind != TokenKind::Eof) {
        let _ = writeln!(
            output,
            "{:<18} {:<20} {:>5} {:>8}",
            token.kind.name(),
            token.value(),
            token.span.line,
            token.span.start
        );
    }
    output
}

/// Print an AST as an indented tree of node names
pub fn print_ast(program: &Program) -> String {
    let mut printer = AstPrinter::new();
    printer.print_program(program)
}

/// Pretty printer for syntax trees
pub struct AstPrinter {
    output: String,
    indent: usize,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    pub fn print_program(&mut self, program: &Program) -> String {
        self.output.clear();
        self.indent = 0;

        match program {
            Program::Class(class) => self.print_class(class),
            Program::Function(func) => self.print_func_def(func),
        }

        self.output.clone()
    }

    /// Emit one line at the current depth, with the resolved type if set
    fn line(&mut self, text: impl fmt::Display, resolved: Option<&Type>) {
        let _ = write!(self.output, "{:width$}{}", "", text, width = self.indent * 2);
        if let Some(ty) = resolved {
            let _ = write!(self.output, " : {}", ty);
        }
        let _ = writeln!(self.output);
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn print_class(&mut self, class: &ClassDecl) {
        self.line(format!("ClassDecl {}", class.name.name), class.resolved.get());
        self.nested(|p| {
            for member in &class.members {
                let visibility = match member.visibility {
                    Visibility::Public => "public",
                    Visibility::Private => "private",
                    Visibility::Inherited => "inherited",
                };
                p.line(format!("VisibilityMember {}", visibility), None);
                p.nested(|p| p.print_member(&member.member));
            }
        });
    }

    fn print_member(&mut self, member: &Member) {
        match member {
            Member::Function(f) => {
                self.line(
                    format!("MemberFuncDecl {} -> {}", f.name.name, f.return_type),
                    f.resolved.get(),
                );
                self.nested(|p| p.print_params(&f.params));
            }
            Member::Constructor(c) => {
                self.line("ConstructorDecl", c.resolved.get());
                self.nested(|p| p.print_params(&c.params));
            }
            Member::Variable(v) => {
                self.line(
                    format!("MemberVarDecl {}: {}{}", v.name.name, v.ty, dims(&v.dims)),
                    v.resolved.get(),
                );
            }
        }
    }

    fn print_params(&mut self, params: &[Param]) {
        for param in params {
            self.line(
                format!("Param {}: {}{}", param.name.name, param.ty, dims(&param.dims)),
                None,
            );
        }
    }

    fn print_func_def(&mut self, func: &FuncDef) {
        self.line("FuncDef", func.resolved.get());
        self.nested(|p| {
            let head = &func.head;
            match &head.return_type {
                Some(ty) => p.line(format!("FuncHead {} -> {}", head.qualified_name(), ty), None),
                None => p.line(format!("FuncHead {}", head.qualified_name()), None),
            }
            p.nested(|p| p.print_params(&head.params));

            for item in &func.body {
                match item {
                    BodyItem::LocalVar(decl) => p.print_local_var(decl),
                    BodyItem::Stmt(stmt) => p.print_stmt(stmt),
                }
            }
        });
    }

    fn print_local_var(&mut self, decl: &LocalVarDecl) {
        self.line(
            format!("LocalVarDecl {}: {}{}", decl.name.name, decl.ty, dims(&decl.dims)),
            decl.resolved.get(),
        );
        if let Some(args) = &decl.init {
            self.nested(|p| {
                for arg in args {
                    p.print_expr(arg);
                }
            });
        }
    }

    fn print_block(&mut self, label: &str, stmts: &[Stmt]) {
        self.line(label, None);
        self.nested(|p| {
            for stmt in stmts {
                p.print_stmt(stmt);
            }
        });
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                self.line("Assign", None);
                self.nested(|p| {
                    p.print_variable(target);
                    p.print_expr(value);
                });
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                self.line("If", None);
                self.nested(|p| {
                    p.print_expr(cond);
                    p.print_block("Then", then_block);
                    p.print_block("Else", else_block);
                });
            }
            Stmt::While { cond, body, .. } => {
                self.line("While", None);
                self.nested(|p| {
                    p.print_expr(cond);
                    p.print_block("Do", body);
                });
            }
            Stmt::Read { target, .. } => {
                self.line("Read", None);
                self.nested(|p| p.print_variable(target));
            }
            Stmt::Write { value, .. } => {
                self.line("Write", None);
                self.nested(|p| p.print_expr(value));
            }
            Stmt::Return { value, .. } => {
                self.line("Return", None);
                self.nested(|p| p.print_expr(value));
            }
            Stmt::Call(call) => {
                self.line("CallStmt", None);
                self.nested(|p| p.print_call(call));
            }
        }
    }

    fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Binary(b) => {
                self.line(format!("BinaryOp {}", b.op.symbol()), b.resolved.get());
                self.nested(|p| {
                    p.print_expr(&b.left);
                    p.print_expr(&b.right);
                });
            }
            Expr::Unary(u) => {
                self.line(format!("UnaryOp {}", u.op.symbol()), u.resolved.get());
                self.nested(|p| p.print_expr(&u.operand));
            }
            Expr::Literal(l) => {
                let value = match l.value {
                    LiteralValue::Int(n) => n.to_string(),
                    LiteralValue::Float(f) => format!("{:?}", f),
                };
                self.line(format!("Literal {}", value), l.resolved.get());
            }
            Expr::Variable(v) => self.print_variable(v),
            Expr::Call(c) => self.print_call(c),
        }
    }

    fn print_variable(&mut self, var: &Variable) {
        self.line(
            format!("Variable {}", chain(&var.qualifiers, &var.name)),
            var.resolved.get(),
        );
        self.nested(|p| {
            p.print_qualifier_exprs(&var.qualifiers);
            for index in &var.indices {
                p.print_expr(index);
            }
        });
    }

    fn print_call(&mut self, call: &FunctionCall) {
        self.line(
            format!("FunctionCall {}", chain(&call.qualifiers, &call.name)),
            call.resolved.get(),
        );
        self.nested(|p| {
            p.print_qualifier_exprs(&call.qualifiers);
            for arg in &call.args {
                p.print_expr(arg);
            }
        });
    }

    fn print_qualifier_exprs(&mut self, qualifiers: &[Qualifier]) {
        for expr in qualifiers.iter().flat_map(|q| q.access.exprs()) {
            self.print_expr(expr);
        }
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

fn dims(dims: &[ArrayDim]) -> String {
    dims.iter()
        .map(|d| match d {
            ArrayDim::Fixed(n) => format!("{{{}}}", n),
            ArrayDim::Unbound => "{}".to_string(),
        })
        .collect()
}

fn chain(qualifiers: &[Qualifier], name: &Ident) -> String {
    let mut parts: Vec<&str> = qualifiers.iter().map(|q| q.name.name.as_str()).collect();
    parts.push(&name.name);
    parts.join(".")
}
