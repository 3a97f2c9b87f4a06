#![no_main]

use bindery::{BinaryOp, CompiledExpression, EvalEnv, ExprNode, UnaryOp, Value};
use libfuzzer_sys::fuzz_target;

const BINARY_OPS: [BinaryOp; 13] = [
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::Rem,
    BinaryOp::Eq,
    BinaryOp::Ne,
    BinaryOp::Lt,
    BinaryOp::Le,
    BinaryOp::Gt,
    BinaryOp::Ge,
    BinaryOp::And,
    BinaryOp::Or,
];

fn next(data: &[u8], pos: &mut usize) -> u8 {
    let byte = data.get(*pos).copied().unwrap_or(0);
    *pos += 1;
    byte
}

fn leaf(tag: u8, seed: u8) -> ExprNode {
    match tag % 6 {
        0 => ExprNode::source(seed as usize % 2),
        1 => ExprNode::constant(i64::from(seed) - 128),
        2 => ExprNode::constant(f64::from(seed) / 4.0),
        3 => ExprNode::constant(seed % 2 == 0),
        4 => ExprNode::constant(format!("s{}", seed)),
        _ => ExprNode::null(),
    }
}

fn build_node(data: &[u8], pos: &mut usize, depth: u8) -> ExprNode {
    let tag = next(data, pos);
    if depth == 0 {
        return leaf(tag, next(data, pos));
    }
    match tag % 8 {
        0 | 1 => leaf(tag, next(data, pos)),
        2 => ExprNode::unary(
            if tag & 8 == 0 { UnaryOp::Neg } else { UnaryOp::Not },
            build_node(data, pos, depth - 1),
        ),
        3 | 4 => {
            let op = BINARY_OPS[next(data, pos) as usize % BINARY_OPS.len()];
            ExprNode::binary(
                op,
                build_node(data, pos, depth - 1),
                build_node(data, pos, depth - 1),
            )
        }
        5 => ExprNode::conditional(
            build_node(data, pos, depth - 1),
            build_node(data, pos, depth - 1),
            build_node(data, pos, depth - 1),
        ),
        6 => ExprNode::member(
            build_node(data, pos, depth - 1),
            format!("m{}", next(data, pos)),
        ),
        _ => ExprNode::index(
            build_node(data, pos, depth - 1),
            vec![build_node(data, pos, depth - 1)],
        ),
    }
}

fn arg_value(tag: u8, seed: u8) -> Value {
    match tag % 5 {
        0 => Value::Int(i64::from(seed) - 64),
        1 => Value::Float(f64::from(seed) / 8.0),
        2 => Value::str(format!("a{}", seed)),
        3 => Value::Bool(seed & 1 == 0),
        _ => Value::Null,
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }

    let mut pos = 0;
    let ast = build_node(data, &mut pos, 4);
    let args = [
        arg_value(next(data, &mut pos), next(data, &mut pos)),
        arg_value(next(data, &mut pos), next(data, &mut pos)),
    ];

    // Compile and evaluation failures must come back as errors, never as
    // panics, and the cached delegate must agree with the first run.
    let expr = CompiledExpression::new(ast, EvalEnv::default());
    let first = format!("{:?}", expr.invoke(&args));
    let second = format!("{:?}", expr.invoke(&args));
    assert_eq!(first, second);
});
