use std::collections::BTreeSet;

use proptest::prelude::*;
use tapbatch::dag::{eligible_set, schedule, DagGraph, Scope};
use tapbatch::formula::Universe;
use tapbatch::plan::plan_updates;
use tapbatch::types::{QualifiedName, Target};
use tapbatch_test_utils::builders::{FormulaBuilder, UniverseBuilder};

// Formula N may only depend on formulae 0..N-1, which keeps the graph acyclic.
// Formulae alternate between two taps so the cross-tap rule gets exercised.
fn formula_name(i: usize) -> String {
    format!("t/{}/f{:02}", if i % 3 == 0 { "b" } else { "a" }, i)
}

fn universe_strategy(max_formulae: usize) -> impl Strategy<Value = (Universe, Vec<(usize, Vec<usize>, bool)>)> {
    (1..=max_formulae).prop_flat_map(|count| {
        proptest::collection::vec(
            (
                proptest::collection::vec(any::<usize>(), 0..count),
                any::<bool>(),
            ),
            count,
        )
        .prop_map(move |raw| {
            let mut layout = Vec::new();
            let mut builder = UniverseBuilder::new();
            for (i, (potential_deps, outdated)) in raw.into_iter().enumerate() {
                let deps: BTreeSet<usize> = if i == 0 {
                    BTreeSet::new()
                } else {
                    potential_deps.into_iter().map(|d| d % i).collect()
                };
                let name = formula_name(i);
                let mut formula = if outdated {
                    FormulaBuilder::outdated(&name)
                } else {
                    FormulaBuilder::current(&name)
                };
                for dep in &deps {
                    formula = formula.dep(&formula_name(*dep));
                }
                builder = builder.with(formula);
                layout.push((i, deps.into_iter().collect(), outdated));
            }
            (builder.build(), layout)
        })
    })
}

fn both_taps() -> Vec<Target> {
    vec!["t/a".parse().unwrap(), "t/b".parse().unwrap()]
}

proptest! {
    #[test]
    fn batches_partition_the_eligible_set((universe, _layout) in universe_strategy(14), all in any::<bool>()) {
        let scope = Scope::new(both_taps()).include_all_taps(all);
        let eligible = eligible_set(&universe, &scope);
        let graph = DagGraph::build(&universe, &eligible.formulae, &scope);
        let schedule = schedule(&graph).expect("acyclic by construction");

        let mut seen = BTreeSet::new();
        for batch in schedule.batches() {
            prop_assert!(!batch.members.is_empty());
            for member in &batch.members {
                prop_assert!(seen.insert(member.clone()), "{} scheduled twice", member);
            }
        }
        prop_assert_eq!(seen, eligible.formulae);
    }

    #[test]
    fn dependencies_land_in_strictly_earlier_batches((universe, _layout) in universe_strategy(14), all in any::<bool>()) {
        let scope = Scope::new(both_taps()).include_all_taps(all);
        let eligible = eligible_set(&universe, &scope);
        let graph = DagGraph::build(&universe, &eligible.formulae, &scope);
        let schedule = schedule(&graph).expect("acyclic by construction");

        for (dependent, dependency) in graph.edges() {
            let d = schedule.batch_index_of(dependent).unwrap();
            let p = schedule.batch_index_of(dependency).unwrap();
            prop_assert!(p < d, "{} (batch {}) must precede {} (batch {})", dependency, p, dependent, d);
        }

        // Every batch after the first waits on something in the batch before it.
        for pair in schedule.batches().windows(2) {
            for member in &pair[1].members {
                let waits = graph
                    .dependencies_of(member)
                    .iter()
                    .any(|dep| pair[0].members.contains(dep));
                prop_assert!(waits, "{} could have run earlier", member);
            }
        }
    }

    #[test]
    fn batches_are_sorted_and_scheduling_is_deterministic((universe, _layout) in universe_strategy(14)) {
        let scope = Scope::new(both_taps()).include_all_taps(true);

        let first = plan_updates(&universe, &scope).unwrap();
        let mut records: Vec<_> = universe.iter().cloned().collect();
        records.reverse();
        let reversed = Universe::from_formulae(records).unwrap();
        let second = plan_updates(&reversed, &scope).unwrap();
        prop_assert_eq!(&first, &second);

        for batch in &first.batches {
            let names: Vec<&QualifiedName> = batch.formulae.iter().map(|p| &p.formula.name).collect();
            let mut sorted = names.clone();
            sorted.sort();
            prop_assert_eq!(names, sorted);
        }
    }

    #[test]
    fn only_outdated_formulae_are_planned((universe, layout) in universe_strategy(14)) {
        let scope = Scope::new(both_taps()).include_all_taps(true);
        let plan = plan_updates(&universe, &scope).unwrap();

        let planned: BTreeSet<String> = plan.formulae().map(|p| p.formula.name.to_string()).collect();
        let expected: BTreeSet<String> = layout
            .iter()
            .filter(|(_, _, outdated)| *outdated)
            .map(|(i, _, _)| formula_name(*i))
            .collect();
        prop_assert_eq!(planned, expected);
    }

    #[test]
    fn a_back_edge_makes_scheduling_fail((universe, layout) in universe_strategy(10)) {
        // Close a loop between the first outdated formula with an outdated
        // dependency in its own tap.
        let candidate = layout.iter().find_map(|(i, deps, outdated)| {
            if !*outdated {
                return None;
            }
            deps.iter()
                .find(|d| layout[**d].2 && formula_name(**d)[..3] == formula_name(*i)[..3])
                .map(|d| (*i, *d))
        });
        prop_assume!(candidate.is_some());
        let (from, to) = candidate.unwrap();

        let looped = Universe::from_formulae(universe.iter().cloned().map(|mut f| {
            if f.name.as_str() == formula_name(to) {
                f.dependencies.push(formula_name(from));
            }
            f
        }).collect::<Vec<_>>()).unwrap();

        let scope = Scope::new(both_taps());
        let eligible = eligible_set(&looped, &scope);
        let graph = DagGraph::build(&looped, &eligible.formulae, &scope);
        let err = schedule(&graph).unwrap_err();

        let from_name: QualifiedName = formula_name(from).parse().unwrap();
        let to_name: QualifiedName = formula_name(to).parse().unwrap();
        prop_assert!(err.formulae.contains(&from_name));
        prop_assert!(err.formulae.contains(&to_name));
        prop_assert!(err.unaffected.formulae().all(|n| !err.formulae.contains(n)));
    }
}
