use std::fmt;
use std::str::FromStr;

use crate::error::SolverError;
use crate::model::VarId;
use crate::store::{Conflict, DomainStore};

/// Comparison operator for arithmetic constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl Cmp {
    pub fn as_str(self) -> &'static str {
        match self {
            Cmp::Lt => "<",
            Cmp::Le => "<=",
            Cmp::Eq => "=",
            Cmp::Ne => "!=",
            Cmp::Ge => ">=",
            Cmp::Gt => ">",
        }
    }

    pub fn holds(self, left: i128, right: i128) -> bool {
        match self {
            Cmp::Lt => left < right,
            Cmp::Le => left <= right,
            Cmp::Eq => left == right,
            Cmp::Ne => left != right,
            Cmp::Ge => left >= right,
            Cmp::Gt => left > right,
        }
    }
}

impl FromStr for Cmp {
    type Err = SolverError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "<" => Ok(Cmp::Lt),
            "<=" => Ok(Cmp::Le),
            "=" | "==" => Ok(Cmp::Eq),
            "!=" => Ok(Cmp::Ne),
            ">=" => Ok(Cmp::Ge),
            ">" => Ok(Cmp::Gt),
            other => Err(SolverError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of an arithmetic constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Var(VarId),
    Const(i64),
}

impl From<VarId> for Term {
    fn from(value: VarId) -> Self {
        Term::Var(value)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Const(value)
    }
}

/// Constraints supported by the propagation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `left op right`.
    Arithm { left: VarId, op: Cmp, right: Term },
    /// Pairwise distinct values.
    AllDifferent(Vec<VarId>),
    /// `sum(vars) op target`.
    Sum {
        vars: Vec<VarId>,
        op: Cmp,
        target: i64,
    },
}

impl Constraint {
    pub fn arithm(left: VarId, op: Cmp, right: impl Into<Term>) -> Self {
        Constraint::Arithm {
            left,
            op,
            right: right.into(),
        }
    }

    pub fn all_different(vars: impl Into<Vec<VarId>>) -> Self {
        Constraint::AllDifferent(vars.into())
    }

    pub fn sum(vars: impl Into<Vec<VarId>>, op: Cmp, target: i64) -> Self {
        Constraint::Sum {
            vars: vars.into(),
            op,
            target,
        }
    }

    pub fn vars(&self) -> Vec<VarId> {
        match self {
            Constraint::Arithm { left, right, .. } => match right {
                Term::Var(right) => vec![*left, *right],
                Term::Const(_) => vec![*left],
            },
            Constraint::AllDifferent(vars) | Constraint::Sum { vars, .. } => vars.clone(),
        }
    }

    /// Evaluates the constraint on a complete assignment.
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        let value = |var: &VarId| values.get(var.0).copied().map(i128::from);
        match self {
            Constraint::Arithm { left, op, right } => {
                let right = match right {
                    Term::Var(var) => value(var),
                    Term::Const(constant) => Some(i128::from(*constant)),
                };
                matches!((value(left), right), (Some(l), Some(r)) if op.holds(l, r))
            }
            Constraint::AllDifferent(vars) => {
                let mut seen: Vec<i64> = Vec::with_capacity(vars.len());
                for var in vars {
                    let Some(current) = values.get(var.0) else {
                        return false;
                    };
                    if seen.contains(current) {
                        return false;
                    }
                    seen.push(*current);
                }
                true
            }
            Constraint::Sum { vars, op, target } => {
                let mut total: i128 = 0;
                for var in vars {
                    let Some(current) = value(var) else {
                        return false;
                    };
                    total += current;
                }
                op.holds(total, i128::from(*target))
            }
        }
    }

    pub(crate) fn propagate(&self, store: &mut DomainStore) -> Result<(), Conflict> {
        match self {
            Constraint::Arithm {
                left,
                op,
                right: Term::Const(constant),
            } => propagate_var_const(store, *left, *op, *constant),
            Constraint::Arithm {
                left,
                op,
                right: Term::Var(right),
            } => propagate_var_var(store, *left, *op, *right),
            Constraint::AllDifferent(vars) => propagate_all_different(store, vars),
            Constraint::Sum { vars, op, target } => propagate_sum(store, vars, *op, *target),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Arithm { left, op, right } => match right {
                Term::Var(var) => write!(f, "{left} {op} {var}"),
                Term::Const(constant) => write!(f, "{left} {op} {constant}"),
            },
            Constraint::AllDifferent(vars) => write!(f, "all_different({} vars)", vars.len()),
            Constraint::Sum { vars, op, target } => {
                write!(f, "sum({} vars) {op} {target}", vars.len())
            }
        }
    }
}

fn propagate_var_const(
    store: &mut DomainStore,
    var: VarId,
    op: Cmp,
    constant: i64,
) -> Result<(), Conflict> {
    match op {
        Cmp::Lt => {
            let bound = constant.checked_sub(1).ok_or(Conflict)?;
            store.set_max(var, bound)?;
        }
        Cmp::Le => {
            store.set_max(var, constant)?;
        }
        Cmp::Eq => store.restrict(var, constant, constant)?,
        Cmp::Ne => store.remove_value(var, constant)?,
        Cmp::Ge => {
            store.set_min(var, constant)?;
        }
        Cmp::Gt => {
            let bound = constant.checked_add(1).ok_or(Conflict)?;
            store.set_min(var, bound)?;
        }
    }
    Ok(())
}

fn propagate_var_var(
    store: &mut DomainStore,
    left: VarId,
    op: Cmp,
    right: VarId,
) -> Result<(), Conflict> {
    if left == right {
        return match op {
            Cmp::Le | Cmp::Eq | Cmp::Ge => Ok(()),
            Cmp::Lt | Cmp::Ne | Cmp::Gt => Err(Conflict),
        };
    }

    let l = store.domain(left);
    let r = store.domain(right);
    match op {
        Cmp::Le => {
            store.set_max(left, r.hi)?;
            store.set_min(right, l.lo)?;
        }
        Cmp::Lt => {
            store.set_max(left, r.hi.saturating_sub(1))?;
            store.set_min(right, l.lo.saturating_add(1))?;
        }
        Cmp::Ge => {
            store.set_min(left, r.lo)?;
            store.set_max(right, l.hi)?;
        }
        Cmp::Gt => {
            store.set_min(left, r.lo.saturating_add(1))?;
            store.set_max(right, l.hi.saturating_sub(1))?;
        }
        Cmp::Eq => {
            store.restrict(left, r.lo, r.hi)?;
            store.restrict(right, l.lo, l.hi)?;
        }
        Cmp::Ne => {
            if l.is_fixed() {
                store.remove_value(right, l.lo)?;
            }
            if r.is_fixed() {
                store.remove_value(left, r.lo)?;
            }
        }
    }
    Ok(())
}

fn propagate_all_different(store: &mut DomainStore, vars: &[VarId]) -> Result<(), Conflict> {
    for (idx, var) in vars.iter().enumerate() {
        let domain = store.domain(*var);
        if !domain.is_fixed() {
            continue;
        }
        for (other_idx, other) in vars.iter().enumerate() {
            if other_idx != idx {
                store.remove_value(*other, domain.lo)?;
            }
        }
    }
    Ok(())
}

fn propagate_sum(
    store: &mut DomainStore,
    vars: &[VarId],
    op: Cmp,
    target: i64,
) -> Result<(), Conflict> {
    let target = i128::from(target);
    let (upper, lower) = match op {
        Cmp::Le => (Some(target), None),
        Cmp::Lt => (Some(target - 1), None),
        Cmp::Ge => (None, Some(target)),
        Cmp::Gt => (None, Some(target + 1)),
        Cmp::Eq => (Some(target), Some(target)),
        Cmp::Ne => {
            let all_fixed = vars.iter().all(|var| store.domain(*var).is_fixed());
            if all_fixed {
                let total: i128 = vars.iter().map(|var| i128::from(store.domain(*var).lo)).sum();
                if total == target {
                    return Err(Conflict);
                }
            }
            return Ok(());
        }
    };

    let min_sum: i128 = vars.iter().map(|var| i128::from(store.domain(*var).lo)).sum();
    let max_sum: i128 = vars.iter().map(|var| i128::from(store.domain(*var).hi)).sum();

    if let Some(upper) = upper {
        if min_sum > upper {
            return Err(Conflict);
        }
        for var in vars {
            let lo = i128::from(store.domain(*var).lo);
            store.set_max(*var, clamp_i64(upper - (min_sum - lo)))?;
        }
    }

    if let Some(lower) = lower {
        if max_sum < lower {
            return Err(Conflict);
        }
        for var in vars {
            let hi = i128::from(store.domain(*var).hi);
            store.set_min(*var, clamp_i64(lower - (max_sum - hi)))?;
        }
    }

    Ok(())
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Domain;

    fn store(domains: &[(i64, i64)]) -> DomainStore {
        let domains: Vec<Domain> = domains.iter().map(|(lo, hi)| Domain::new(*lo, *hi)).collect();
        DomainStore::new(&domains)
    }

    #[test]
    fn var_const_bounds() {
        let mut s = store(&[(1, 100)]);
        Constraint::arithm(VarId(0), Cmp::Lt, 20)
            .propagate(&mut s)
            .expect("propagate");
        assert_eq!(s.domain(VarId(0)), Domain::new(1, 19));

        Constraint::arithm(VarId(0), Cmp::Ge, 5)
            .propagate(&mut s)
            .expect("propagate");
        assert_eq!(s.domain(VarId(0)), Domain::new(5, 19));

        let result = Constraint::arithm(VarId(0), Cmp::Gt, 19).propagate(&mut s);
        assert_eq!(result, Err(Conflict));
    }

    #[test]
    fn var_var_less_than_narrows_both_sides() {
        let mut s = store(&[(5, 10), (1, 7)]);
        Constraint::arithm(VarId(0), Cmp::Lt, VarId(1))
            .propagate(&mut s)
            .expect("propagate");
        assert_eq!(s.domain(VarId(0)), Domain::new(5, 6));
        assert_eq!(s.domain(VarId(1)), Domain::new(6, 7));
    }

    #[test]
    fn self_comparison_is_decided_immediately() {
        let mut s = store(&[(0, 1_000_000_000)]);
        assert_eq!(
            Constraint::arithm(VarId(0), Cmp::Lt, VarId(0)).propagate(&mut s),
            Err(Conflict)
        );
        assert!(
            Constraint::arithm(VarId(0), Cmp::Le, VarId(0))
                .propagate(&mut s)
                .is_ok()
        );
    }

    #[test]
    fn sum_tightens_upper_bounds() {
        let mut s = store(&[(0, 10), (3, 10)]);
        Constraint::sum(vec![VarId(0), VarId(1)], Cmp::Le, 5)
            .propagate(&mut s)
            .expect("propagate");
        assert_eq!(s.domain(VarId(0)), Domain::new(0, 2));
        assert_eq!(s.domain(VarId(1)), Domain::new(3, 5));
    }

    #[test]
    fn sum_detects_infeasible_lower_bound() {
        let mut s = store(&[(0, 2), (0, 2)]);
        let result = Constraint::sum(vec![VarId(0), VarId(1)], Cmp::Ge, 5).propagate(&mut s);
        assert_eq!(result, Err(Conflict));
    }

    #[test]
    fn all_different_trims_fixed_values() {
        let mut s = store(&[(3, 3), (3, 5), (1, 3)]);
        Constraint::all_different(vec![VarId(0), VarId(1), VarId(2)])
            .propagate(&mut s)
            .expect("propagate");
        assert_eq!(s.domain(VarId(1)), Domain::new(4, 5));
        assert_eq!(s.domain(VarId(2)), Domain::new(1, 2));
    }

    #[test]
    fn satisfaction_check_on_assignment() {
        let constraint = Constraint::sum(vec![VarId(0), VarId(1)], Cmp::Eq, 7);
        assert!(constraint.is_satisfied(&[3, 4]));
        assert!(!constraint.is_satisfied(&[3, 5]));
        assert!(!Constraint::all_different(vec![VarId(0), VarId(1)]).is_satisfied(&[2, 2]));
    }
}
