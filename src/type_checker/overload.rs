//! Overload resolution.
//!
//! Every candidate is scored by the number of implicit casts its parameters
//! need. The cheapest candidates win; a tie between two built-in operators is
//! broken by operand generality, and a wider operator tie over a still
//! ambiguous argument is deferred until the argument's type is known.

use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::{
        expressions::Call,
        module::{FnForm, FnSig},
        types::{Prim, PrimSet, Type},
    },
    errors::errors::ErrorImpl,
};

use super::std::{can_cast, Std};

#[derive(Debug, Clone)]
pub enum Resolution {
    /// One overload won; `casts[i]` converts argument `i` when it needs it.
    Resolved {
        target: Rc<FnSig>,
        casts: Vec<Option<Rc<FnSig>>>,
    },
    /// Several operator overloads remain; the arguments were merged to `merged`.
    Deferred {
        merged: Type,
        candidates: Vec<Rc<FnSig>>,
    },
}

/// Cost of passing `arg` where `param` is expected, `None` when it cannot be passed.
fn argument_cost(arg: &Type, param: &Type) -> Option<usize> {
    if arg.contains(param) {
        return Some(0);
    }

    match (arg.prim(), param.prim()) {
        (Some(from), Some(to)) if can_cast(from, to) => Some(1),
        _ => None,
    }
}

fn describe_arguments(args: &[Type]) -> String {
    args.iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The operand type an operator overload is specialised on.
fn operand_prim(sig: &FnSig) -> Option<Prim> {
    sig.params.first().and_then(|param| param.ty.prim())
}

/// Picks the overload of `call` matching the argument types `args`.
pub fn resolve_overload(
    std: &Std,
    call: &Call,
    candidates: &[Rc<FnSig>],
    args: &[Type],
) -> Result<Resolution, ErrorImpl> {
    let mut viable: Vec<(usize, Rc<FnSig>, Vec<Type>)> = vec![];

    for candidate in candidates {
        let Some(params) = candidate.param_types_for(&call.named) else {
            continue;
        };
        if params.len() != args.len() {
            continue;
        }

        let cost = args
            .iter()
            .zip(params.iter())
            .map(|(arg, param)| argument_cost(arg, param))
            .sum::<Option<usize>>();

        if let Some(cost) = cost {
            viable.push((cost, Rc::clone(candidate), params));
        }
    }

    let Some(min_cost) = viable.iter().map(|(cost, _, _)| *cost).min() else {
        return Err(ErrorImpl::NoMatchingOverload {
            function: call.name.clone(),
            arguments: describe_arguments(args),
        });
    };

    let mut best: Vec<(Rc<FnSig>, Vec<Type>)> = viable
        .into_iter()
        .filter(|(cost, _, _)| *cost == min_cost)
        .map(|(_, sig, params)| (sig, params))
        .collect();

    let all_operators = best.iter().all(|(sig, _)| sig.form == FnForm::Operator);

    if best.len() == 2 && all_operators {
        let (a, b) = (&best[0].0, &best[1].0);
        let a_key = operand_prim(a).map(|prim| (prim.generality(), std::cmp::Reverse(prim)));
        let b_key = operand_prim(b).map(|prim| (prim.generality(), std::cmp::Reverse(prim)));

        let loser = if a_key >= b_key { 1 } else { 0 };
        let winner = best.remove(1 - loser);
        debug!(
            operator = call.name.as_str(),
            picked = winner.0.mangled.as_str(),
            "operator tie broken by generality"
        );
        best = vec![winner];
    }

    if best.len() == 1 {
        let (target, params) = best.remove(0);
        let casts = args
            .iter()
            .zip(params.iter())
            .map(|(arg, param)| {
                if arg.contains(param) {
                    return None;
                }
                match (arg.prim(), param.prim()) {
                    (Some(from), Some(to)) => std.cast(from, to).cloned(),
                    _ => None,
                }
            })
            .collect();

        return Ok(Resolution::Resolved { target, casts });
    }

    let any_incomplete = args.iter().any(|arg| !arg.is_complete());
    if all_operators && any_incomplete {
        let accepted = best
            .iter()
            .flat_map(|(_, params)| params.iter())
            .try_fold(Type::Prim(PrimSet::empty()), |accepted, param| accepted.union(param));

        let merged = accepted.and_then(|accepted| {
            args.iter()
                .try_fold(accepted, |merged, arg| merged.merge(arg))
        });

        if let Some(merged) = merged {
            return Ok(Resolution::Deferred {
                merged,
                candidates: best.into_iter().map(|(sig, _)| sig).collect(),
            });
        }
    }

    Err(ErrorImpl::AmbiguousCall {
        function: call.name.clone(),
    })
}
