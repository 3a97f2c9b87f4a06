//! Per-signature lowering of expression trees into composed closures.
//!
//! Compilation walks the tree once per argument signature and emits a
//! [`Fragment`] per node: a closure plus the static type it produces.
//! Fragments compose bottom-up, so a cached delegate evaluates with no tree
//! walking, no operator dispatch tables, and type checks only where a static
//! type was genuinely unknown at compile time.

use std::fmt;
use std::sync::Arc;

use crate::error::{BindError, BindResult};
use crate::reflect::{MethodDescriptor, PropertyDescriptor, StaticType};

use super::members::EvalEnv;
use super::node::{BinaryOp, ExprNode, UnaryOp};
use super::overload::{self, Selection};
use super::value::{LambdaValue, Value};

type FragFn = Arc<dyn Fn(&Activation<'_>) -> BindResult<Value> + Send + Sync>;

/// Compiled node: the closure and its statically known result type.
#[derive(Clone)]
pub(crate) struct Fragment {
    pub(crate) ty: StaticType,
    eval: FragFn,
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment").field("ty", &self.ty).finish_non_exhaustive()
    }
}

impl Fragment {
    fn new<F>(ty: StaticType, eval: F) -> Self
    where
        F: Fn(&Activation<'_>) -> BindResult<Value> + Send + Sync + 'static,
    {
        Self {
            ty,
            eval: Arc::new(eval),
        }
    }

    fn constant(value: Value) -> Self {
        let ty = value.static_type();
        Fragment::new(ty, move |_| Ok(value.clone()))
    }

    pub(crate) fn eval(&self, activation: &Activation<'_>) -> BindResult<Value> {
        (self.eval)(activation)
    }
}

/// Invocation state threaded through fragment evaluation.
#[derive(Clone)]
pub(crate) struct Activation<'a> {
    source: &'a [Value],
    locals: Option<Arc<ScopeFrame>>,
}

impl<'a> Activation<'a> {
    pub(crate) fn root(source: &'a [Value]) -> Self {
        Self {
            source,
            locals: None,
        }
    }
}

/// One lambda call frame; frames chain outward to enclosing lambdas.
pub(crate) struct ScopeFrame {
    values: Vec<Value>,
    parent: Option<Arc<ScopeFrame>>,
}

fn read_local(activation: &Activation<'_>, depth: usize, index: usize) -> Option<Value> {
    let mut frame = activation.locals.as_ref();
    for _ in 0..depth {
        frame = frame?.parent.as_ref();
    }
    frame?.values.get(index).cloned()
}

/// Tree walker specializing one expression to one argument signature.
pub(crate) struct Compiler<'e> {
    env: &'e EvalEnv,
    source: &'e [StaticType],
    scopes: Vec<Vec<String>>,
}

impl<'e> Compiler<'e> {
    pub(crate) fn compile(
        env: &'e EvalEnv,
        source: &'e [StaticType],
        root: &ExprNode,
    ) -> BindResult<Fragment> {
        Compiler {
            env,
            source,
            scopes: Vec::new(),
        }
        .node(root)
    }

    fn node(&mut self, node: &ExprNode) -> BindResult<Fragment> {
        match node {
            ExprNode::Constant(value) => Ok(Fragment::constant(value.clone())),
            ExprNode::Source(index) => self.source_slot(*index),
            ExprNode::Ident(name) => self.ident(name),
            ExprNode::Member { target, name } => self.member(target, name),
            ExprNode::MethodCall { target, name, args } => {
                self.call(target.as_deref(), name, args)
            }
            ExprNode::Index { target, args } => self.index(target, args),
            ExprNode::Unary { op, operand } => self.unary(*op, operand),
            ExprNode::Binary { op, left, right } => self.binary(*op, left, right),
            ExprNode::Conditional {
                condition,
                when_true,
                when_false,
            } => self.conditional(condition, when_true, when_false),
            ExprNode::Lambda { params, body } => self.lambda(params, body),
        }
    }

    fn source_slot(&self, index: usize) -> BindResult<Fragment> {
        if index >= self.source.len() {
            return Err(BindError::MissingSourceValue(index));
        }
        let ty = self.source[index];
        Ok(Fragment::new(ty, move |activation| {
            activation
                .source
                .get(index)
                .cloned()
                .ok_or(BindError::MissingSourceValue(index))
        }))
    }

    fn ident(&self, name: &str) -> BindResult<Fragment> {
        let (depth, index) = self
            .lookup_local(name)
            .ok_or_else(|| BindError::UnknownIdentifier(name.to_string()))?;
        let name = name.to_string();
        Ok(Fragment::new(StaticType::Unknown, move |activation| {
            read_local(activation, depth, index)
                .ok_or_else(|| BindError::UnknownIdentifier(name.clone()))
        }))
    }

    fn lookup_local(&self, name: &str) -> Option<(usize, usize)> {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if let Some(index) = scope.iter().position(|param| param == name) {
                return Some((depth, index));
            }
        }
        None
    }

    // Member access resolves in tiers: provider chain, then registry, then
    // (for dynamic targets) the value's own accessor at runtime.
    fn member(&mut self, target: &ExprNode, name: &str) -> BindResult<Fragment> {
        let target = self.node(target)?;
        match target.ty {
            StaticType::Unknown => Ok(self.dynamic_member(target, name)),
            StaticType::Dyn(id) => match self.env.find_property(id, name) {
                Some(property) => Ok(property_fragment(target, property)),
                None => Ok(self.dynamic_member(target, name)),
            },
            ty => match ty.type_id().and_then(|id| self.env.find_property(id, name)) {
                Some(property) => Ok(property_fragment(target, property)),
                None => Err(BindError::UnknownMember(format!(
                    "{} on {}",
                    name,
                    self.ty_label(ty)
                ))),
            },
        }
    }

    fn dynamic_member(&self, target: Fragment, name: &str) -> Fragment {
        let env = self.env.clone();
        let name = name.to_string();
        Fragment::new(StaticType::Unknown, move |activation| {
            let value = target.eval(activation)?;
            if let Some(property) = env.find_property(value.runtime_type(), &name) {
                return property.read(&value);
            }
            if let Value::Dyn(dynamic) = &value {
                if let Some(member) = dynamic.get_member(&name) {
                    return Ok(member);
                }
            }
            Err(BindError::UnknownMember(format!(
                "{} on {}",
                name,
                value.type_label()
            )))
        })
    }

    fn call(
        &mut self,
        target: Option<&ExprNode>,
        name: &str,
        args: &[ExprNode],
    ) -> BindResult<Fragment> {
        let target = match target {
            Some(node) => Some(self.node(node)?),
            None => None,
        };
        let mut compiled = Vec::with_capacity(args.len());
        for arg in args {
            compiled.push(self.node(arg)?);
        }

        let Some(target) = target else {
            // A bare name is a lambda parameter when one is in scope,
            // otherwise a registered free function.
            if let Some((depth, index)) = self.lookup_local(name) {
                return Ok(local_call_fragment(name, depth, index, compiled));
            }
            let candidates = self.env.find_functions(name);
            if candidates.is_empty() {
                return Err(BindError::NoApplicableMethod(name.to_string()));
            }
            let selection = overload::select(name, &candidates, &Self::arg_types(&compiled))?;
            let method = candidates[selection.index].clone();
            return Ok(invoke_fragment(None, method, selection, compiled));
        };

        match target.ty {
            StaticType::Lambda => Ok(lambda_call_fragment(target, compiled)),
            StaticType::Unknown => Ok(self.dynamic_call(target, name, compiled)),
            StaticType::Dyn(id) => {
                let candidates = self.env.find_methods(id, name);
                if candidates.is_empty() {
                    Ok(self.dynamic_call(target, name, compiled))
                } else {
                    let selection =
                        overload::select(name, &candidates, &Self::arg_types(&compiled))?;
                    let method = candidates[selection.index].clone();
                    Ok(invoke_fragment(Some(target), method, selection, compiled))
                }
            }
            ty => match ty.type_id() {
                Some(id) => {
                    let candidates = self.env.find_methods(id, name);
                    if candidates.is_empty() {
                        return Err(BindError::UnknownMember(format!(
                            "{} on {}",
                            name,
                            self.ty_label(ty)
                        )));
                    }
                    let selection =
                        overload::select(name, &candidates, &Self::arg_types(&compiled))?;
                    let method = candidates[selection.index].clone();
                    Ok(invoke_fragment(Some(target), method, selection, compiled))
                }
                None => Ok(self.dynamic_call(target, name, compiled)),
            },
        }
    }

    fn arg_types(args: &[Fragment]) -> Vec<StaticType> {
        args.iter().map(|fragment| fragment.ty).collect()
    }

    fn dynamic_call(&self, target: Fragment, name: &str, args: Vec<Fragment>) -> Fragment {
        let env = self.env.clone();
        let name = name.to_string();
        Fragment::new(StaticType::Unknown, move |activation| {
            let target_value = target.eval(activation)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in &args {
                values.push(arg.eval(activation)?);
            }
            if let Value::Lambda(lambda) = &target_value {
                return lambda.invoke(&values);
            }
            let candidates = env.find_methods(target_value.runtime_type(), &name);
            if !candidates.is_empty() {
                let types: Vec<StaticType> = values.iter().map(Value::static_type).collect();
                let selection = overload::select(&name, &candidates, &types)?;
                let method = &candidates[selection.index];
                return invoke_selected(method, &selection, &target_value, values);
            }
            if let Value::Dyn(dynamic) = &target_value {
                if let Some(Value::Lambda(lambda)) = dynamic.get_member(&name) {
                    return lambda.invoke(&values);
                }
            }
            Err(BindError::UnknownMember(format!(
                "{} on {}",
                name,
                target_value.type_label()
            )))
        })
    }

    fn index(&mut self, target: &ExprNode, args: &[ExprNode]) -> BindResult<Fragment> {
        if args.is_empty() {
            return Err(BindError::UnexpectedNode("index without arguments"));
        }
        let target = self.node(target)?;
        let mut compiled = Vec::with_capacity(args.len());
        for arg in args {
            compiled.push(self.node(arg)?);
        }

        match target.ty {
            StaticType::List if compiled.len() == 1 => {
                let index = compiled.remove(0);
                if !matches!(index.ty, StaticType::Int | StaticType::Unknown) {
                    return Err(BindError::IncompatibleOperands("[]"));
                }
                Ok(Fragment::new(StaticType::Unknown, move |activation| {
                    let list = target.eval(activation)?;
                    let key = index.eval(activation)?;
                    match list.as_list() {
                        Some(items) => list_get(items, &key),
                        None => Err(BindError::IncompatibleOperands("[]")),
                    }
                }))
            }
            StaticType::Unknown => Ok(self.dynamic_index(target, compiled)),
            StaticType::Dyn(id) => {
                let candidates = self.env.find_indexers(id);
                if candidates.is_empty() {
                    Ok(self.dynamic_index(target, compiled))
                } else {
                    self.indexer_fragment(target, candidates, compiled)
                }
            }
            ty => match ty.type_id() {
                Some(id) => {
                    let candidates = self.env.find_indexers(id);
                    if candidates.is_empty() {
                        return Err(BindError::UnknownMember(format!(
                            "indexer on {}",
                            self.ty_label(ty)
                        )));
                    }
                    self.indexer_fragment(target, candidates, compiled)
                }
                None => Ok(self.dynamic_index(target, compiled)),
            },
        }
    }

    fn indexer_fragment(
        &self,
        target: Fragment,
        candidates: Vec<MethodDescriptor>,
        args: Vec<Fragment>,
    ) -> BindResult<Fragment> {
        let label = format!("{}[]", self.ty_label(target.ty));
        let selection = overload::select(&label, &candidates, &Self::arg_types(&args))?;
        let method = candidates[selection.index].clone();
        Ok(invoke_fragment(Some(target), method, selection, args))
    }

    fn dynamic_index(&self, target: Fragment, args: Vec<Fragment>) -> Fragment {
        let env = self.env.clone();
        Fragment::new(StaticType::Unknown, move |activation| {
            let target_value = target.eval(activation)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in &args {
                values.push(arg.eval(activation)?);
            }
            if let (Some(items), [key]) = (target_value.as_list(), values.as_slice()) {
                return list_get(items, key);
            }
            let candidates = env.find_indexers(target_value.runtime_type());
            if !candidates.is_empty() {
                let types: Vec<StaticType> = values.iter().map(Value::static_type).collect();
                let selection = overload::select("[]", &candidates, &types)?;
                let method = &candidates[selection.index];
                return invoke_selected(method, &selection, &target_value, values);
            }
            if let (Value::Dyn(dynamic), [key]) = (&target_value, values.as_slice()) {
                if let Some(item) = dynamic.get_index(key) {
                    return Ok(item);
                }
            }
            Err(BindError::UnknownMember(format!(
                "indexer on {}",
                target_value.type_label()
            )))
        })
    }

    fn unary(&mut self, op: UnaryOp, operand: &ExprNode) -> BindResult<Fragment> {
        let operand = self.node(operand)?;
        match op {
            UnaryOp::Neg => {
                let ty = match operand.ty {
                    StaticType::Int => StaticType::Int,
                    StaticType::Float => StaticType::Float,
                    StaticType::Unknown => StaticType::Unknown,
                    _ => return Err(BindError::IncompatibleOperands("-")),
                };
                Ok(Fragment::new(ty, move |activation| {
                    match operand.eval(activation)? {
                        Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
                        Value::Float(f) => Ok(Value::Float(-f)),
                        _ => Err(BindError::IncompatibleOperands("-")),
                    }
                }))
            }
            UnaryOp::Not => {
                if !matches!(operand.ty, StaticType::Bool | StaticType::Unknown) {
                    return Err(BindError::IncompatibleOperands("!"));
                }
                Ok(Fragment::new(StaticType::Bool, move |activation| {
                    match operand.eval(activation)? {
                        Value::Bool(b) => Ok(Value::Bool(!b)),
                        _ => Err(BindError::IncompatibleOperands("!")),
                    }
                }))
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, left: &ExprNode, right: &ExprNode) -> BindResult<Fragment> {
        let left = self.node(left)?;
        let right = self.node(right)?;
        match op {
            BinaryOp::Add => self.add(left, right),
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                self.arithmetic(op, left, right)
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                self.comparison(op, left, right)
            }
            BinaryOp::Eq | BinaryOp::Ne => Ok(equality_fragment(op, left, right)),
            BinaryOp::And | BinaryOp::Or => self.logical(op, left, right),
        }
    }

    // `+` lowers to concatenation when either side is statically a string;
    // otherwise to numeric addition. Dynamic operands defer the same policy
    // to runtime.
    fn add(&self, left: Fragment, right: Fragment) -> BindResult<Fragment> {
        if left.ty == StaticType::Str || right.ty == StaticType::Str {
            return Ok(Fragment::new(StaticType::Str, move |activation| {
                let a = left.eval(activation)?;
                let b = right.eval(activation)?;
                Ok(concat(&a, &b))
            }));
        }
        if left.ty.is_numeric() && right.ty.is_numeric() {
            let ty = if left.ty == StaticType::Int && right.ty == StaticType::Int {
                StaticType::Int
            } else {
                StaticType::Float
            };
            return Ok(Fragment::new(ty, move |activation| {
                let a = left.eval(activation)?;
                let b = right.eval(activation)?;
                apply_arithmetic(BinaryOp::Add, &a, &b)
            }));
        }
        let dynamic_side = left.ty == StaticType::Unknown || right.ty == StaticType::Unknown;
        let both_plausible = add_plausible(left.ty) && add_plausible(right.ty);
        if dynamic_side && both_plausible {
            return Ok(Fragment::new(StaticType::Unknown, move |activation| {
                let a = left.eval(activation)?;
                let b = right.eval(activation)?;
                if matches!(a, Value::Str(_)) || matches!(b, Value::Str(_)) {
                    return Ok(concat(&a, &b));
                }
                apply_arithmetic(BinaryOp::Add, &a, &b)
            }));
        }
        Err(BindError::IncompatibleOperands("+"))
    }

    fn arithmetic(&self, op: BinaryOp, left: Fragment, right: Fragment) -> BindResult<Fragment> {
        let ty = match (left.ty, right.ty) {
            (StaticType::Int, StaticType::Int) => StaticType::Int,
            (a, b) if a.is_numeric() && b.is_numeric() => StaticType::Float,
            (a, b)
                if (a == StaticType::Unknown || b == StaticType::Unknown)
                    && numeric_plausible(a)
                    && numeric_plausible(b) =>
            {
                StaticType::Unknown
            }
            _ => return Err(BindError::IncompatibleOperands(op.symbol())),
        };
        Ok(Fragment::new(ty, move |activation| {
            let a = left.eval(activation)?;
            let b = right.eval(activation)?;
            apply_arithmetic(op, &a, &b)
        }))
    }

    fn comparison(&self, op: BinaryOp, left: Fragment, right: Fragment) -> BindResult<Fragment> {
        let statically_fine = (left.ty.is_numeric() && right.ty.is_numeric())
            || (left.ty == StaticType::Str && right.ty == StaticType::Str);
        let dynamic_side = left.ty == StaticType::Unknown || right.ty == StaticType::Unknown;
        let plausible = compare_plausible(left.ty) && compare_plausible(right.ty);
        if !statically_fine && !(dynamic_side && plausible) {
            return Err(BindError::IncompatibleOperands(op.symbol()));
        }
        Ok(Fragment::new(StaticType::Bool, move |activation| {
            let a = left.eval(activation)?;
            let b = right.eval(activation)?;
            apply_comparison(op, &a, &b)
        }))
    }

    fn logical(&self, op: BinaryOp, left: Fragment, right: Fragment) -> BindResult<Fragment> {
        for side in [&left, &right] {
            if !matches!(side.ty, StaticType::Bool | StaticType::Unknown) {
                return Err(BindError::IncompatibleOperands(op.symbol()));
            }
        }
        let symbol = op.symbol();
        let is_and = matches!(op, BinaryOp::And);
        Ok(Fragment::new(StaticType::Bool, move |activation| {
            let first = require_bool(left.eval(activation)?, symbol)?;
            // Short-circuit before touching the right side.
            if is_and != first {
                return Ok(Value::Bool(first));
            }
            let second = require_bool(right.eval(activation)?, symbol)?;
            Ok(Value::Bool(second))
        }))
    }

    fn conditional(
        &mut self,
        condition: &ExprNode,
        when_true: &ExprNode,
        when_false: &ExprNode,
    ) -> BindResult<Fragment> {
        let condition = self.node(condition)?;
        if !matches!(condition.ty, StaticType::Bool | StaticType::Unknown) {
            return Err(BindError::IncompatibleOperands("?:"));
        }
        let when_true = self.node(when_true)?;
        let when_false = self.node(when_false)?;
        let ty = if when_true.ty == when_false.ty {
            when_true.ty
        } else {
            StaticType::Unknown
        };
        Ok(Fragment::new(ty, move |activation| {
            if require_bool(condition.eval(activation)?, "?:")? {
                when_true.eval(activation)
            } else {
                when_false.eval(activation)
            }
        }))
    }

    fn lambda(&mut self, params: &[String], body: &ExprNode) -> BindResult<Fragment> {
        for (i, param) in params.iter().enumerate() {
            if params[..i].contains(param) {
                return Err(BindError::UnexpectedNode("duplicate lambda parameter"));
            }
        }
        self.scopes.push(params.to_vec());
        let body = self.node(body);
        self.scopes.pop();
        let body = body?;
        let arity = params.len();
        Ok(Fragment::new(StaticType::Lambda, move |activation| {
            // The produced value may outlive this invocation, so it owns a
            // snapshot of the source slots and shares the local chain.
            let source: Arc<[Value]> = activation.source.to_vec().into();
            let parent = activation.locals.clone();
            let body = body.clone();
            Ok(Value::Lambda(Arc::new(LambdaValue::new(
                arity,
                move |call_args: &[Value]| {
                    let frame = Arc::new(ScopeFrame {
                        values: call_args.to_vec(),
                        parent: parent.clone(),
                    });
                    body.eval(&Activation {
                        source: &source,
                        locals: Some(frame),
                    })
                },
            ))))
        }))
    }

    fn ty_label(&self, ty: StaticType) -> String {
        match ty {
            StaticType::Obj(id) | StaticType::Dyn(id) => self.env.type_label(id, ty.label()),
            other => other.label().to_string(),
        }
    }
}

fn property_fragment(target: Fragment, property: PropertyDescriptor) -> Fragment {
    Fragment::new(property.static_type(), move |activation| {
        let value = target.eval(activation)?;
        property.read(&value)
    })
}

fn invoke_fragment(
    target: Option<Fragment>,
    method: MethodDescriptor,
    selection: Selection,
    args: Vec<Fragment>,
) -> Fragment {
    Fragment::new(method.returns(), move |activation| {
        let target_value = match &target {
            Some(fragment) => fragment.eval(activation)?,
            None => Value::Null,
        };
        let mut values = Vec::with_capacity(args.len());
        for (fragment, cast) in args.iter().zip(selection.casts.iter()) {
            values.push(cast.apply(fragment.eval(activation)?, method.name())?);
        }
        let values = overload::finalize_args(values, selection.pack_from);
        method.invoke(&target_value, &values)
    })
}

// Shared by the runtime-dispatch paths, where selection happens per call.
fn invoke_selected(
    method: &MethodDescriptor,
    selection: &Selection,
    target: &Value,
    args: Vec<Value>,
) -> BindResult<Value> {
    let mut values = Vec::with_capacity(args.len());
    for (value, cast) in args.into_iter().zip(selection.casts.iter()) {
        values.push(cast.apply(value, method.name())?);
    }
    let values = overload::finalize_args(values, selection.pack_from);
    method.invoke(target, &values)
}

fn local_call_fragment(name: &str, depth: usize, index: usize, args: Vec<Fragment>) -> Fragment {
    let name = name.to_string();
    Fragment::new(StaticType::Unknown, move |activation| {
        let callee = read_local(activation, depth, index)
            .ok_or_else(|| BindError::UnknownIdentifier(name.clone()))?;
        let mut values = Vec::with_capacity(args.len());
        for arg in &args {
            values.push(arg.eval(activation)?);
        }
        match &callee {
            Value::Lambda(lambda) => lambda.invoke(&values),
            other => Err(BindError::InvalidCast(format!(
                "{} is not callable",
                other.type_label()
            ))),
        }
    })
}

fn lambda_call_fragment(target: Fragment, args: Vec<Fragment>) -> Fragment {
    Fragment::new(StaticType::Unknown, move |activation| {
        let callee = target.eval(activation)?;
        let mut values = Vec::with_capacity(args.len());
        for arg in &args {
            values.push(arg.eval(activation)?);
        }
        match &callee {
            Value::Lambda(lambda) => lambda.invoke(&values),
            other => Err(BindError::InvalidCast(format!(
                "{} is not callable",
                other.type_label()
            ))),
        }
    })
}

fn list_get(items: &[Value], index: &Value) -> BindResult<Value> {
    let i = index.as_i64().ok_or(BindError::IncompatibleOperands("[]"))?;
    usize::try_from(i)
        .ok()
        .and_then(|at| items.get(at))
        .cloned()
        .ok_or(BindError::IndexOutOfBounds(i, items.len()))
}

fn concat(a: &Value, b: &Value) -> Value {
    let mut out = String::new();
    a.concat_into(&mut out);
    b.concat_into(&mut out);
    Value::Str(out.into())
}

fn add_plausible(ty: StaticType) -> bool {
    matches!(
        ty,
        StaticType::Unknown | StaticType::Int | StaticType::Float | StaticType::Str | StaticType::Null
    )
}

fn numeric_plausible(ty: StaticType) -> bool {
    matches!(ty, StaticType::Unknown | StaticType::Int | StaticType::Float)
}

fn compare_plausible(ty: StaticType) -> bool {
    matches!(
        ty,
        StaticType::Unknown | StaticType::Int | StaticType::Float | StaticType::Str
    )
}

fn require_bool(value: Value, symbol: &'static str) -> BindResult<bool> {
    value
        .as_bool()
        .ok_or(BindError::IncompatibleOperands(symbol))
}

fn apply_arithmetic(op: BinaryOp, a: &Value, b: &Value) -> BindResult<Value> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return match op {
            BinaryOp::Add => Ok(Value::Int(x.wrapping_add(y))),
            BinaryOp::Sub => Ok(Value::Int(x.wrapping_sub(y))),
            BinaryOp::Mul => Ok(Value::Int(x.wrapping_mul(y))),
            BinaryOp::Div if y == 0 => Err(BindError::DivisionByZero),
            BinaryOp::Div => Ok(Value::Int(x.wrapping_div(y))),
            BinaryOp::Rem if y == 0 => Err(BindError::DivisionByZero),
            BinaryOp::Rem => Ok(Value::Int(x.wrapping_rem(y))),
            _ => Err(BindError::IncompatibleOperands(op.symbol())),
        };
    }
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return match op {
            BinaryOp::Add => Ok(Value::Float(x + y)),
            BinaryOp::Sub => Ok(Value::Float(x - y)),
            BinaryOp::Mul => Ok(Value::Float(x * y)),
            BinaryOp::Div => Ok(Value::Float(x / y)),
            BinaryOp::Rem => Ok(Value::Float(x % y)),
            _ => Err(BindError::IncompatibleOperands(op.symbol())),
        };
    }
    Err(BindError::IncompatibleOperands(op.symbol()))
}

fn apply_comparison(op: BinaryOp, a: &Value, b: &Value) -> BindResult<Value> {
    if let (Value::Str(x), Value::Str(y)) = (a, b) {
        let outcome = match op {
            BinaryOp::Lt => x < y,
            BinaryOp::Le => x <= y,
            BinaryOp::Gt => x > y,
            BinaryOp::Ge => x >= y,
            _ => return Err(BindError::IncompatibleOperands(op.symbol())),
        };
        return Ok(Value::Bool(outcome));
    }
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        let outcome = match op {
            BinaryOp::Lt => x < y,
            BinaryOp::Le => x <= y,
            BinaryOp::Gt => x > y,
            BinaryOp::Ge => x >= y,
            _ => return Err(BindError::IncompatibleOperands(op.symbol())),
        };
        return Ok(Value::Bool(outcome));
    }
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        let outcome = match op {
            BinaryOp::Lt => x < y,
            BinaryOp::Le => x <= y,
            BinaryOp::Gt => x > y,
            BinaryOp::Ge => x >= y,
            _ => return Err(BindError::IncompatibleOperands(op.symbol())),
        };
        return Ok(Value::Bool(outcome));
    }
    Err(BindError::IncompatibleOperands(op.symbol()))
}

fn equality_fragment(op: BinaryOp, left: Fragment, right: Fragment) -> Fragment {
    let negate = matches!(op, BinaryOp::Ne);
    Fragment::new(StaticType::Bool, move |activation| {
        let a = left.eval(activation)?;
        let b = right.eval(activation)?;
        Ok(Value::Bool(a.loose_eq(&b) != negate))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_err(source: &[StaticType], node: ExprNode) -> BindError {
        let env = EvalEnv::default();
        Compiler::compile(&env, source, &node).unwrap_err()
    }

    #[test]
    fn test_source_index_out_of_range_fails_compilation() {
        let err = compile_err(&[StaticType::Int], ExprNode::source(3));
        assert!(matches!(err, BindError::MissingSourceValue(3)));
    }

    #[test]
    fn test_member_on_unregistered_static_type_fails_compilation() {
        let err = compile_err(
            &[StaticType::Int],
            ExprNode::member(ExprNode::source(0), "length"),
        );
        assert!(matches!(err, BindError::UnknownMember(_)));
    }

    #[test]
    fn test_duplicate_lambda_parameters_rejected() {
        let err = compile_err(
            &[],
            ExprNode::lambda(&["x", "x"], ExprNode::ident("x")),
        );
        assert!(matches!(
            err,
            BindError::UnexpectedNode("duplicate lambda parameter")
        ));
    }

    #[test]
    fn test_empty_index_rejected() {
        let err = compile_err(
            &[StaticType::List],
            ExprNode::index(ExprNode::source(0), vec![]),
        );
        assert!(matches!(
            err,
            BindError::UnexpectedNode("index without arguments")
        ));
    }

    #[test]
    fn test_free_identifier_rejected() {
        let err = compile_err(&[], ExprNode::ident("ghost"));
        assert!(matches!(err, BindError::UnknownIdentifier(_)));
    }

    #[test]
    fn test_static_operand_mismatch_rejected() {
        let err = compile_err(
            &[StaticType::Bool, StaticType::Int],
            ExprNode::binary(BinaryOp::Add, ExprNode::source(0), ExprNode::source(1)),
        );
        assert!(matches!(err, BindError::IncompatibleOperands("+")));
    }
}
