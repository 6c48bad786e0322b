use std::time::Duration;

use cohort_solver::{
    Cmp, Constraint, Model, SolveStatus, Solver, TerminationReason, ValueOrder, VarId,
};

fn age_model(counts: &[(usize, i64, i64)]) -> (Model, Vec<Vec<VarId>>) {
    let mut model = Model::new("ages");
    let mut buckets = Vec::new();
    for (count, min, max) in counts {
        let vars = model.int_var_array(*count, 0, 120);
        for var in &vars {
            model.arithm(*var, ">=", *min).expect("post lower bound");
            model.arithm(*var, "<=", *max).expect("post upper bound");
        }
        buckets.push(vars);
    }
    (model, buckets)
}

#[test]
fn arithm_bounds_narrow_each_bucket() {
    let ranges = [(4, 1, 19), (5, 20, 39), (7, 40, 59), (4, 60, 100)];
    let (model, buckets) = age_model(&ranges);

    let outcome = Solver::new().solve(&model);
    let solution = outcome.solution().expect("satisfiable");
    assert!(model.check(solution));
    for (vars, (count, min, max)) in buckets.iter().zip(ranges) {
        let values = solution.values(vars);
        assert_eq!(values.len(), count);
        assert!(values.iter().all(|value| (min..=max).contains(value)));
    }
    // No constraint links two variables, so no branch can fail.
    assert_eq!(outcome.statistics.fails, 0);
}

#[test]
fn random_order_is_reproducible() {
    let ranges = [(10, 1, 19), (10, 60, 100)];
    let (model, buckets) = age_model(&ranges);

    let solve = |seed| {
        Solver::new()
            .with_value_order(ValueOrder::Random { seed })
            .solve(&model)
            .into_solution()
            .expect("satisfiable")
    };

    let first = solve(42);
    let second = solve(42);
    assert_eq!(first, second);
    assert!(model.check(&first));

    let old = first.values(&buckets[1]);
    assert!(old.iter().all(|value| (60..=100).contains(value)));
    let distinct = {
        let mut values = old.clone();
        values.sort_unstable();
        values.dedup();
        values.len()
    };
    assert!(distinct > 1, "random order should spread values: {old:?}");
}

#[test]
fn var_to_var_ordering_chain() {
    let mut model = Model::new("chain");
    let vars = model.int_var_array(4, 1, 4);
    for pair in vars.windows(2) {
        model
            .post(Constraint::arithm(pair[0], Cmp::Lt, pair[1]))
            .expect("post lt");
    }

    let outcome = Solver::new().with_value_order(ValueOrder::Max).solve(&model);
    let solution = outcome.solution().expect("satisfiable");
    assert_eq!(solution.values(&vars), vec![1, 2, 3, 4]);
    assert_eq!(outcome.statistics.nodes, 0);
}

#[test]
fn sum_equality_is_met() {
    let mut model = Model::new("budget");
    let vars = model.int_var_array(5, 0, 10);
    model
        .post(Constraint::sum(vars.clone(), Cmp::Eq, 37))
        .expect("post sum");

    let solution = Solver::new()
        .solve(&model)
        .into_solution()
        .expect("satisfiable");
    assert_eq!(solution.values(&vars).iter().sum::<i64>(), 37);
    assert!(model.check(&solution));
}

#[test]
fn time_limit_terminates_hard_search() {
    let mut model = Model::new("pigeonhole");
    let vars = model.int_var_array(12, 1, 11);
    model
        .post(Constraint::all_different(vars))
        .expect("post all_different");

    let limit = Duration::from_millis(5);
    let outcome = Solver::new()
        .with_time_limit(limit)
        .with_check_interval(1)
        .solve(&model);
    assert_eq!(
        outcome.status,
        SolveStatus::Terminated(TerminationReason::TimeLimit(limit))
    );
    assert!(outcome.statistics.nodes > 0);
}
