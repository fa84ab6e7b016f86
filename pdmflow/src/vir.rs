//! Verilog IR.

use std::fmt;

use itertools::Itertools;

use crate::utils::indent;

const INDENT: usize = 4;

/// Module.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Module {
    /// Module name.
    pub name: String,

    /// Port declarations.
    pub port_decls: Vec<PortDeclaration>,

    /// Module items.
    pub module_items: Vec<ModuleItem>,
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`timescale 1ns / 1ps\n\nmodule {}\n(\n{}\n);\n\n{}\n\nendmodule",
            self.name,
            indent(self.port_decls.iter().join(",\n"), INDENT),
            gen_verilog_module(&self.module_items)
        )
    }
}

/// Module item.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ModuleItem {
    /// Declarations.
    Declarations(Vec<Declaration>),

    /// Continuous assignments.
    ContinuousAssigns(Vec<ContinuousAssign>),

    /// Always construct.
    AlwaysConstruct(String, Vec<Statement>),

    /// Comment, followed by the commented items.
    Commented(String, Vec<ModuleItem>),
}

impl fmt::Display for ModuleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleItem::Declarations(decls) => write!(f, "{}", decls.iter().join("\n")),
            ModuleItem::ContinuousAssigns(conts) => write!(f, "{}", conts.iter().join("\n")),
            ModuleItem::AlwaysConstruct(event, stmts) => {
                write!(f, "{} begin\n{}\nend", event, indent(stmts.iter().join("\n"), INDENT))
            }
            ModuleItem::Commented(comment, items) => {
                write!(f, "// {}\n{}", comment, items.iter().join("\n\n"))
            }
        }
    }
}

impl ModuleItem {
    /// Always construct triggered by the rising edge of `clk`.
    pub fn always_posedge(clk: &str, stmts: Vec<Statement>) -> Self {
        ModuleItem::AlwaysConstruct(format!("always @(posedge {})", clk), stmts)
    }
}

/// Generates Verilog code for module items.
pub fn gen_verilog_module(module: &[ModuleItem]) -> String { module.iter().join("\n\n") }

/// Port declaration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PortDeclaration {
    /// Input declaration.
    Input(usize, String),

    /// Output declaration.
    Output(usize, String),
}

impl fmt::Display for PortDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (dir, width, ident) = match self {
            Self::Input(width, ident) => ("input", width, ident),
            Self::Output(width, ident) => ("output", width, ident),
        };
        if *width > 1 {
            write!(f, "{} wire [{}-1:0] {}", dir, width, ident)
        } else {
            write!(f, "{} wire {}", dir, ident)
        }
    }
}

impl PortDeclaration {
    /// Creates new input port declaration.
    pub fn input<S: Into<String>>(width: usize, ident: S) -> Self { Self::Input(width, ident.into()) }

    /// Creates new output port declaration.
    pub fn output<S: Into<String>>(width: usize, ident: S) -> Self { Self::Output(width, ident.into()) }
}

/// Declaration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Declaration {
    /// Reg declaration, with an optional init value.
    Reg(usize, String, Option<Expression>),
}

impl Declaration {
    /// Reg declaration with no init value.
    #[inline]
    pub fn reg<S: Into<String>>(width: usize, ident: S) -> Self { Declaration::Reg(width, ident.into(), None) }

    /// Adds an init value to a reg declaration.
    ///
    /// # Panics
    ///
    /// Panics if `self` is not a reg declaration without init value.
    #[inline]
    #[must_use]
    pub fn with_init(self, init: Expression) -> Self {
        match self {
            Declaration::Reg(width, ident, None) => Declaration::Reg(width, ident, Some(init)),
            Declaration::Reg(..) => panic!("with_init: reg already has an init value"),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self::Reg(width, ident, init) = self;
        write!(f, "reg")?;
        if *width > 1 {
            write!(f, " [{}-1:0]", width)?;
        }
        write!(f, " {}", ident)?;
        if let Some(init) = init {
            write!(f, " = {}", init)?;
        }
        write!(f, ";")
    }
}

/// Continuous assign.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ContinuousAssign(pub Expression, pub Expression);

impl fmt::Display for ContinuousAssign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "assign {} = {};", self.0, self.1) }
}

impl ContinuousAssign {
    /// Creates new continuous assign.
    pub fn new(lvalue: Expression, expr: Expression) -> Self { Self(lvalue, expr) }
}

/// Statement.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Statement {
    /// Nonblocking assignment.
    NonblockingAssignment(Expression, Expression),

    /// Conditional statement.
    Conditional(Expression, Vec<Statement>, Vec<Statement>),
}

impl Statement {
    /// Nonblocking assignment.
    ///
    /// # Panics
    ///
    /// Panics if `lvalue` is not an identifier.
    #[inline]
    pub fn nonblocking_assignment(lvalue: Expression, expr: Expression) -> Self {
        assert!(lvalue.is_identifier(), "lvalue should be hierarchical identifier");
        Statement::NonblockingAssignment(lvalue, expr)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonblockingAssignment(lvalue, expr) => write!(f, "{} <= {};", lvalue, expr),
            Self::Conditional(cond, then_stmt, else_stmt) if else_stmt.is_empty() => {
                write!(f, "if ({}) begin\n{}\nend", cond, indent(then_stmt.iter().join("\n"), INDENT))
            }
            Self::Conditional(cond, then_stmt, else_stmt) => write!(
                f,
                "if ({}) begin\n{}\nend else begin\n{}\nend",
                cond,
                indent(then_stmt.iter().join("\n"), INDENT),
                indent(else_stmt.iter().join("\n"), INDENT),
            ),
        }
    }
}

/// Binary operator.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum BinaryOp {
    /// Addition
    Add,

    /// Less than
    Less,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Less => "<",
        })
    }
}

/// Expression.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Expression {
    /// Primary.
    Primary(Primary),

    /// Binary expression.
    Binary(Box<Expression>, BinaryOp, Box<Expression>),
}

/// Range.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Range {
    /// Index: `[index]`
    Index(usize),
}

/// Primary.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Primary {
    /// Number.
    Number(String),

    /// Hierarchical identifier.
    HierarchicalIdentifier(String, Option<Range>),

    /// Concatenation.
    Concatenation(Vec<Expression>),

    /// Mintypmax expression.
    MintypmaxExpression(Box<Expression>),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary(prim) => write!(f, "{}", prim),
            Self::Binary(lhs, op, rhs) => write!(f, "{} {} {}", lhs, op, rhs),
        }
    }
}

impl From<String> for Expression {
    fn from(ident: String) -> Self { Expression::ident(ident) }
}

impl From<&str> for Expression {
    fn from(ident: &str) -> Self { Expression::ident(ident) }
}

impl Expression {
    /// Sized decimal number, `{width}'d{value}`.
    pub fn number(width: usize, value: u64) -> Self { Self::Primary(Primary::Number(format!("{}'d{}", width, value))) }

    /// Identifier.
    pub fn ident<S: Into<String>>(ident: S) -> Self { Self::Primary(Primary::HierarchicalIdentifier(ident.into(), None)) }

    /// Bit select of an identifier.
    pub fn index<S: Into<String>>(ident: S, index: usize) -> Self {
        Self::ident(ident).with_range(Range::Index(index))
    }

    /// Adds a range to an identifier.
    ///
    /// # Panics
    ///
    /// Panics if `self` is not an identifier without range.
    #[must_use]
    pub fn with_range(self, range: Range) -> Self {
        if let Expression::Primary(Primary::HierarchicalIdentifier(ident, None)) = self {
            Expression::Primary(Primary::HierarchicalIdentifier(ident, Some(range)))
        } else {
            panic!("with_range: self is not an identifier")
        }
    }

    /// Concatenation, most significant expression first.
    pub fn concat<I: IntoIterator<Item = Expression>>(exprs: I) -> Self {
        Self::Primary(Primary::Concatenation(exprs.into_iter().collect()))
    }

    /// Mintypmax expression.
    pub fn mintypmax_expr(expr: Expression) -> Self { Self::Primary(Primary::MintypmaxExpression(Box::new(expr))) }

    /// Binary operation.
    pub fn binary(op: BinaryOp, mut lhs: Expression, mut rhs: Expression) -> Self {
        // Operands of binary operation should be primary.
        if !lhs.is_primary() {
            lhs = Expression::mintypmax_expr(lhs);
        }

        if !rhs.is_primary() {
            rhs = Expression::mintypmax_expr(rhs);
        }

        Self::Binary(Box::new(lhs), op, Box::new(rhs))
    }

    /// Returns `true` if the expression is primary.
    pub fn is_primary(&self) -> bool { matches!(self, Self::Primary(_)) }

    /// Returns `true` if the expression is identifier, optionally with a range.
    pub fn is_identifier(&self) -> bool { matches!(self, Self::Primary(Primary::HierarchicalIdentifier(..))) }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self::Index(index) = self;
        write!(f, "{}", index)
    }
}

impl fmt::Display for Primary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(num) => f.write_str(num),
            Self::HierarchicalIdentifier(ident, Some(range)) => write!(f, "{}[{}]", ident, range),
            Self::HierarchicalIdentifier(ident, None) => f.write_str(ident),
            Self::Concatenation(exprs) => {
                assert!(!exprs.is_empty());
                write!(f, "{{{}}}", exprs.iter().join(", "))
            }
            Self::MintypmaxExpression(expr) => write!(f, "({})", expr),
        }
    }
}
