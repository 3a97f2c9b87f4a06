//! Expression trees consumed by the compiler.
//!
//! Nodes arrive from an external parser already shaped; the compiler only
//! walks them. The convenience constructors keep hand-built trees (tests,
//! embedded DSLs) readable without a parser.

use super::value::Value;

/// Unary operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Numeric negation.
    Neg,
    /// Boolean complement.
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Binary operator kinds.
///
/// `Add` doubles as string concatenation when either operand is a string;
/// `And`/`Or` short-circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// One node of a binding expression.
///
/// # Examples
///
/// ```rust
/// use bindery::{BinaryOp, ExprNode};
///
/// // source[0].name + "!"
/// let ast = ExprNode::binary(
///     BinaryOp::Add,
///     ExprNode::member(ExprNode::source(0), "name"),
///     ExprNode::constant("!"),
/// );
/// assert_eq!(ast.kind(), "binary");
/// ```
#[derive(Debug, Clone)]
pub enum ExprNode {
    /// Literal embedded in the tree.
    Constant(Value),
    /// Positional source value supplied at invocation.
    Source(usize),
    /// Reference to an enclosing lambda parameter.
    Ident(String),
    /// Property access on a target.
    Member {
        target: Box<ExprNode>,
        name: String,
    },
    /// Method call on a target, or a free-function call when `target` is
    /// `None`.
    MethodCall {
        target: Option<Box<ExprNode>>,
        name: String,
        args: Vec<ExprNode>,
    },
    /// Indexed access on a target.
    Index {
        target: Box<ExprNode>,
        args: Vec<ExprNode>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExprNode>,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
    /// Ternary conditional.
    Conditional {
        condition: Box<ExprNode>,
        when_true: Box<ExprNode>,
        when_false: Box<ExprNode>,
    },
    /// Lambda literal; evaluates to a callable value closing over the current
    /// source values and locals.
    Lambda {
        params: Vec<String>,
        body: Box<ExprNode>,
    },
}

impl ExprNode {
    pub fn constant(value: impl Into<Value>) -> Self {
        ExprNode::Constant(value.into())
    }

    pub fn null() -> Self {
        ExprNode::Constant(Value::Null)
    }

    pub fn source(index: usize) -> Self {
        ExprNode::Source(index)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        ExprNode::Ident(name.into())
    }

    pub fn member(target: ExprNode, name: impl Into<String>) -> Self {
        ExprNode::Member {
            target: Box::new(target),
            name: name.into(),
        }
    }

    pub fn call(target: ExprNode, name: impl Into<String>, args: Vec<ExprNode>) -> Self {
        ExprNode::MethodCall {
            target: Some(Box::new(target)),
            name: name.into(),
            args,
        }
    }

    pub fn call_function(name: impl Into<String>, args: Vec<ExprNode>) -> Self {
        ExprNode::MethodCall {
            target: None,
            name: name.into(),
            args,
        }
    }

    pub fn index(target: ExprNode, args: Vec<ExprNode>) -> Self {
        ExprNode::Index {
            target: Box::new(target),
            args,
        }
    }

    pub fn unary(op: UnaryOp, operand: ExprNode) -> Self {
        ExprNode::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: ExprNode, right: ExprNode) -> Self {
        ExprNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn conditional(condition: ExprNode, when_true: ExprNode, when_false: ExprNode) -> Self {
        ExprNode::Conditional {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        }
    }

    pub fn lambda(params: &[&str], body: ExprNode) -> Self {
        ExprNode::Lambda {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Box::new(body),
        }
    }

    /// Node kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExprNode::Constant(_) => "constant",
            ExprNode::Source(_) => "source",
            ExprNode::Ident(_) => "ident",
            ExprNode::Member { .. } => "member",
            ExprNode::MethodCall { .. } => "method-call",
            ExprNode::Index { .. } => "index",
            ExprNode::Unary { .. } => "unary",
            ExprNode::Binary { .. } => "binary",
            ExprNode::Conditional { .. } => "conditional",
            ExprNode::Lambda { .. } => "lambda",
        }
    }
}
