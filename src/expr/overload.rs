//! Overload selection for reflective calls.
//!
//! Every call site with more than one registered overload ranks the
//! candidates against the argument static types and compiles the cheapest
//! applicable one into the delegate. Penalties: exact match 0, numeric
//! widening 1, boxing into `Any` 2, unsafe runtime-checked cast 1000. A
//! value-kind argument that cannot convert at all disqualifies the candidate;
//! object and dynamic arguments instead degrade to the unsafe tier and fail
//! at invocation if the runtime check misses.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{BindError, BindResult};
use crate::reflect::{MethodDescriptor, ParamType, StaticType};

use super::value::Value;

const PENALTY_WIDEN: u32 = 1;
const PENALTY_BOX: u32 = 2;
const PENALTY_UNSAFE: u32 = 1000;

/// Per-argument conversion baked into the compiled call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgCast {
    /// Pass through unchanged.
    Keep,
    /// Statically known `Int` widening to a `Float` parameter.
    IntToFloat,
    /// Runtime check against the declared parameter, failing with
    /// `InvalidCast`.
    Checked(ParamType),
}

impl ArgCast {
    pub(crate) fn apply(self, value: Value, method: &str) -> BindResult<Value> {
        match self {
            ArgCast::Keep => Ok(value),
            ArgCast::IntToFloat => Ok(match value {
                Value::Int(i) => Value::Float(i as f64),
                other => other,
            }),
            ArgCast::Checked(param) => coerce_checked(value, param, method),
        }
    }
}

/// Winning overload plus the argument plan to call it with.
#[derive(Debug, Clone)]
pub(crate) struct Selection {
    /// Index into the candidate slice.
    pub(crate) index: usize,
    /// One cast per supplied argument.
    pub(crate) casts: Vec<ArgCast>,
    /// When packing a variadic tail, the argument index the tail starts at.
    pub(crate) pack_from: Option<usize>,
}

struct Rank {
    total: u32,
    exact: usize,
    variadic: bool,
    order: usize,
}

impl Rank {
    fn beats(&self, other: &Rank) -> bool {
        if self.total != other.total {
            return self.total < other.total;
        }
        if self.exact != other.exact {
            return self.exact > other.exact;
        }
        if self.variadic != other.variadic {
            return !self.variadic;
        }
        self.order < other.order
    }
}

/// Picks the best applicable overload for `args`, or `NoApplicableMethod`.
pub(crate) fn select(
    name: &str,
    candidates: &[MethodDescriptor],
    args: &[StaticType],
) -> BindResult<Selection> {
    let mut best: Option<(Rank, Selection)> = None;
    for (order, method) in candidates.iter().enumerate() {
        if method.is_variadic() {
            let fixed = method.params().len().saturating_sub(1);
            if args.len() == method.params().len() {
                consider(&mut best, rank_direct(method, args, order));
            }
            if args.len() >= fixed {
                consider(&mut best, rank_packed(method, args, order));
            }
        } else if args.len() == method.params().len() {
            consider(&mut best, rank_fixed(method, args, order));
        }
    }
    best.map(|(_, selection)| selection)
        .ok_or_else(|| BindError::NoApplicableMethod(name.to_string()))
}

fn consider(best: &mut Option<(Rank, Selection)>, candidate: Option<(Rank, Selection)>) {
    if let Some((rank, selection)) = candidate {
        match best {
            Some((current, _)) if !rank.beats(current) => {}
            _ => *best = Some((rank, selection)),
        }
    }
}

fn rank_fixed(
    method: &MethodDescriptor,
    args: &[StaticType],
    order: usize,
) -> Option<(Rank, Selection)> {
    let mut casts: SmallVec<[ArgCast; 8]> = SmallVec::new();
    let mut total = 0u32;
    let mut exact = 0usize;
    for (arg, param) in args.iter().zip(method.params()) {
        let (penalty, cast, is_exact) = score_param(*arg, *param)?;
        total += penalty;
        exact += is_exact as usize;
        casts.push(cast);
    }
    Some((
        Rank {
            total,
            exact,
            variadic: false,
            order,
        },
        Selection {
            index: order,
            casts: casts.into_vec(),
            pack_from: None,
        },
    ))
}

// Variadic overload taking the collection argument directly, without packing.
fn rank_direct(
    method: &MethodDescriptor,
    args: &[StaticType],
    order: usize,
) -> Option<(Rank, Selection)> {
    let n = method.params().len();
    let mut casts: SmallVec<[ArgCast; 8]> = SmallVec::new();
    let mut total = 0u32;
    let mut exact = 0usize;
    for (i, arg) in args.iter().enumerate() {
        let param = if i + 1 == n {
            ParamType::List
        } else {
            method.params()[i]
        };
        let (penalty, cast, is_exact) = score_param(*arg, param)?;
        total += penalty;
        exact += is_exact as usize;
        casts.push(cast);
    }
    Some((
        Rank {
            total,
            exact,
            variadic: true,
            order,
        },
        Selection {
            index: order,
            casts: casts.into_vec(),
            pack_from: None,
        },
    ))
}

// Variadic overload with trailing arguments packed into a list.
fn rank_packed(
    method: &MethodDescriptor,
    args: &[StaticType],
    order: usize,
) -> Option<(Rank, Selection)> {
    let fixed = method.params().len().checked_sub(1)?;
    let elem = *method.params().last()?;
    let mut casts: SmallVec<[ArgCast; 8]> = SmallVec::new();
    let mut total = 0u32;
    let mut exact = 0usize;
    for (i, arg) in args.iter().enumerate() {
        let param = if i < fixed { method.params()[i] } else { elem };
        let (penalty, cast, is_exact) = score_param(*arg, param)?;
        total += penalty;
        exact += is_exact as usize;
        casts.push(cast);
    }
    Some((
        Rank {
            total,
            exact,
            variadic: true,
            order,
        },
        Selection {
            index: order,
            casts: casts.into_vec(),
            pack_from: Some(fixed),
        },
    ))
}

fn score_param(arg: StaticType, param: ParamType) -> Option<(u32, ArgCast, bool)> {
    use ParamType as P;
    use StaticType as S;
    match (arg, param) {
        (S::Bool, P::Bool)
        | (S::Int, P::Int)
        | (S::Float, P::Float)
        | (S::Str, P::Str)
        | (S::List, P::List)
        | (S::Lambda, P::Lambda) => Some((0, ArgCast::Keep, true)),
        (S::Obj(a), P::Obj(b)) | (S::Dyn(a), P::Obj(b)) if a == b => {
            Some((0, ArgCast::Keep, true))
        }
        (S::Int, P::Float) => Some((PENALTY_WIDEN, ArgCast::IntToFloat, false)),
        // A null argument prefers the more specific reference parameter.
        (S::Null, P::Str | P::List | P::Lambda | P::Obj(_)) => {
            Some((PENALTY_WIDEN, ArgCast::Keep, false))
        }
        (_, P::Any) => Some((PENALTY_BOX, ArgCast::Keep, false)),
        (S::Unknown, p) => Some((PENALTY_UNSAFE, ArgCast::Checked(p), false)),
        (S::Obj(_) | S::Dyn(_) | S::Str | S::List | S::Lambda, p) => {
            Some((PENALTY_UNSAFE, ArgCast::Checked(p), false))
        }
        _ => None,
    }
}

/// Runtime half of the unsafe tier: the value must satisfy the declared
/// parameter now or the invocation fails.
pub(crate) fn coerce_checked(value: Value, param: ParamType, method: &str) -> BindResult<Value> {
    use ParamType as P;
    let ok = match (&value, param) {
        (_, P::Any) => true,
        (Value::Bool(_), P::Bool) => true,
        (Value::Int(_), P::Int) => true,
        (Value::Float(_), P::Float) => true,
        (Value::Int(i), P::Float) => return Ok(Value::Float(*i as f64)),
        (Value::Str(_), P::Str) => true,
        (Value::List(_), P::List) => true,
        (Value::Lambda(_), P::Lambda) => true,
        (Value::Null, P::Str | P::List | P::Lambda | P::Obj(_)) => true,
        (v, P::Obj(t)) => v.runtime_type() == t,
        _ => false,
    };
    if ok {
        Ok(value)
    } else {
        Err(BindError::InvalidCast(format!(
            "{} argument for {}({})",
            value.type_label(),
            method,
            param.label()
        )))
    }
}

/// Applies the packing plan after per-argument casts.
pub(crate) fn finalize_args(mut args: Vec<Value>, pack_from: Option<usize>) -> Vec<Value> {
    if let Some(at) = pack_from {
        let tail = args.split_off(at);
        args.push(Value::List(Arc::new(tail)));
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(params: &[ParamType]) -> MethodDescriptor {
        MethodDescriptor::new("probe", params, StaticType::Unknown, |_, _| Ok(Value::Null))
    }

    fn variadic(params: &[ParamType]) -> MethodDescriptor {
        method(params).variadic()
    }

    #[test]
    fn test_exact_beats_boxing() {
        let candidates = [method(&[ParamType::Any]), method(&[ParamType::Str])];
        let sel = select("probe", &candidates, &[StaticType::Str]).unwrap();
        assert_eq!(sel.index, 1);
        assert_eq!(sel.casts, vec![ArgCast::Keep]);
    }

    #[test]
    fn test_widening_beats_boxing() {
        let candidates = [method(&[ParamType::Any]), method(&[ParamType::Float])];
        let sel = select("probe", &candidates, &[StaticType::Int]).unwrap();
        assert_eq!(sel.index, 1);
        assert_eq!(sel.casts, vec![ArgCast::IntToFloat]);
    }

    #[test]
    fn test_value_kind_mismatch_disqualifies() {
        let candidates = [method(&[ParamType::Bool])];
        let err = select("probe", &candidates, &[StaticType::Int]).unwrap_err();
        assert!(matches!(err, BindError::NoApplicableMethod(_)));
    }

    #[test]
    fn test_object_mismatch_degrades_to_checked() {
        struct A;
        let candidates = [method(&[ParamType::Int])];
        let sel = select("probe", &candidates, &[StaticType::of::<A>()]).unwrap();
        assert_eq!(sel.casts, vec![ArgCast::Checked(ParamType::Int)]);
        // The runtime check then rejects the payload.
        let err = coerce_checked(Value::obj(A), ParamType::Int, "probe").unwrap_err();
        assert!(matches!(err, BindError::InvalidCast(_)));
    }

    #[test]
    fn test_variadic_tail_packs_scalars() {
        let candidates = [variadic(&[ParamType::Str, ParamType::Int])];
        let sel = select(
            "probe",
            &candidates,
            &[StaticType::Str, StaticType::Int, StaticType::Int],
        )
        .unwrap();
        assert_eq!(sel.pack_from, Some(1));
        assert_eq!(sel.casts.len(), 3);

        let packed = finalize_args(
            vec![Value::str("fmt"), Value::Int(1), Value::Int(2)],
            sel.pack_from,
        );
        assert_eq!(packed.len(), 2);
        assert_eq!(packed[1].as_list().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_variadic_accepts_empty_tail() {
        let candidates = [variadic(&[ParamType::Str, ParamType::Int])];
        let sel = select("probe", &candidates, &[StaticType::Str]).unwrap();
        assert_eq!(sel.pack_from, Some(1));
        let packed = finalize_args(vec![Value::str("fmt")], sel.pack_from);
        assert_eq!(packed[1].as_list().map(<[Value]>::len), Some(0));
    }

    #[test]
    fn test_variadic_direct_list_pass_preferred() {
        let candidates = [variadic(&[ParamType::Int])];
        let sel = select("probe", &candidates, &[StaticType::List]).unwrap();
        assert_eq!(sel.pack_from, None);
        assert_eq!(sel.casts, vec![ArgCast::Keep]);
    }

    #[test]
    fn test_incompatible_scalar_in_tail_disqualifies() {
        let candidates = [variadic(&[ParamType::Int])];
        let err = select("probe", &candidates, &[StaticType::Int, StaticType::Bool]).unwrap_err();
        assert!(matches!(err, BindError::NoApplicableMethod(_)));
    }

    #[test]
    fn test_non_variadic_wins_tie() {
        let candidates = [
            variadic(&[ParamType::Int, ParamType::Int]),
            method(&[ParamType::Int, ParamType::Int]),
        ];
        let sel = select("probe", &candidates, &[StaticType::Int, StaticType::Int]).unwrap();
        assert_eq!(sel.index, 1);
    }

    #[test]
    fn test_registration_order_breaks_remaining_ties() {
        let candidates = [method(&[ParamType::Any]), method(&[ParamType::Any])];
        let sel = select("probe", &candidates, &[StaticType::Int]).unwrap();
        assert_eq!(sel.index, 0);
    }

    #[test]
    fn test_null_prefers_specific_reference_parameter() {
        let candidates = [method(&[ParamType::Any]), method(&[ParamType::Str])];
        let sel = select("probe", &candidates, &[StaticType::Null]).unwrap();
        assert_eq!(sel.index, 1);
    }

    #[test]
    fn test_arity_mismatch_without_variadic() {
        let candidates = [method(&[ParamType::Int])];
        let err = select("probe", &candidates, &[]).unwrap_err();
        assert!(matches!(err, BindError::NoApplicableMethod(_)));
    }

    #[test]
    fn test_checked_coercions_pass_compatible_values() {
        assert!(coerce_checked(Value::Int(1), ParamType::Int, "m").is_ok());
        let widened = coerce_checked(Value::Int(1), ParamType::Float, "m").unwrap();
        assert_eq!(widened.as_f64(), Some(1.0));
        assert!(coerce_checked(Value::Null, ParamType::Str, "m").is_ok());
        assert!(coerce_checked(Value::Null, ParamType::Int, "m").is_err());
    }
}
