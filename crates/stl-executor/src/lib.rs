//! Walks the planned circuit, firing each transition's events and
//! recovering from failures by rerouting through declared error states
//! (§4.H). Single-threaded, cooperative: externals run to completion
//! before control returns (§5).

mod environment;
mod error;
mod eval;
mod visualizer;

pub use environment::Environment;
pub use error::ExecutorError;
pub use visualizer::{NoopVisualizer, Visualizer};

use eval::{eval, eval_expected, role_name_of, Frame, QualifierLookup};
use stl_externals::EventContext;
use stl_graph::StlGraph;
use stl_model::{ResolvedModule, TestSide, TransitionResolved};
use stl_planner::{reroute, PlannedEdge};

/// Runs `plan` to completion. Returns `Ok(true)` iff every transition
/// ultimately succeeded (directly or after rerouting); `Ok(false)` if a
/// failure could not be recovered from. `Err` covers malformed input the
/// resolver should have already caught (unregistered events/qualifiers).
pub fn run(
    module: &ResolvedModule,
    graph: &StlGraph,
    plan: Vec<PlannedEdge>,
    env: &mut Environment,
    visualizer: &mut dyn Visualizer,
) -> Result<bool, ExecutorError> {
    let mut working = graph.graph.clone();

    let mut circuit_stack: Vec<PlannedEdge> = plan.into_iter().rev().collect();

    while let Some(step) = circuit_stack.pop() {
        let transition = &module.transitions[step.transition];
        visualizer.on_start(&transition.name);

        let passed = fire_transition(module, transition, env)?;

        if passed {
            tracing::info!(transition = %transition.name, "PASSED");
            visualizer.on_pass(&transition.name);
            continue;
        }

        tracing::warn!(transition = %transition.name, "FAILED");
        visualizer.on_fail(&transition.name);
        working[step.index].weight = f64::INFINITY;

        let Some(detour) = reroute(&working, step.error_vertex, step.to) else {
            tracing::warn!(transition = %transition.name, "no recovery path back to the original target; run fails");
            return Ok(false);
        };

        for edge_idx in detour.into_iter().rev() {
            let data = &working[edge_idx];
            if data.weight.is_infinite() {
                tracing::warn!("recovery path crosses an already-failed edge; run fails");
                return Ok(false);
            }
            let (from, to) = working.edge_endpoints(edge_idx).expect("edge index came from this graph");
            circuit_stack.push(PlannedEdge { index: edge_idx, from, to, transition: data.transition, error_vertex: data.error_vertex });
        }
    }

    Ok(true)
}

/// Runs one transition's events in declaration order; the first `false`
/// short-circuits the rest (§5 ordering guarantees).
fn fire_transition(module: &ResolvedModule, transition: &TransitionResolved, env: &mut Environment) -> Result<bool, ExecutorError> {
    let qualifiers = QualifierLookup { defs: &module.qualifiers, registry: &env.qualifiers };
    let mut frame = Frame::new(&mut env.roles, transition.locals.len());

    for call in &transition.events {
        let source_role = role_name_of(&call.source).map(|n| n.as_ref()).unwrap_or_default();
        let target_role = role_name_of(&call.target).map(|n| n.as_ref()).unwrap_or_default();
        let ctx = EventContext { source: source_role, target: target_role, test_side: call.test_side };

        let external = env.events.get(&call.class).ok_or_else(|| ExecutorError::UnknownEvent(call.class.clone()))?;
        // On the Wait side there's no value yet to generate a qualifier-typed
        // argument from — the external matches the real received value
        // against a validator instead (§8 property 1's `Validate` half).
        let outcome = match call.test_side {
            Some(TestSide::Source) => {
                let expected = call.args.iter().map(|a| eval_expected(a, &mut frame, &qualifiers)).collect::<Result<Vec<_>, _>>()?;
                external.wait(&ctx, &expected)
            }
            Some(TestSide::Target) | None => {
                let args = call.args.iter().map(|a| eval(a, &mut frame, &qualifiers)).collect::<Result<Vec<_>, _>>()?;
                external.fire(&ctx, &args)
            }
        };
        let passed = outcome.map_err(|err| ExecutorError::EventRaised { event: call.event.clone(), source: err })?;

        if !passed {
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_ast::{RoleDef, StateDef};
    use stl_externals::{ExpectedValue, ExternalError, Noop};
    use stl_graph::build_graph;
    use stl_model::{EventCallResolved, ResolvedExpr, RuntimeValue, Slot, StateResolved, StateValue};

    fn sv(name: &str, symbol: &str) -> StateValue {
        StateValue::new(StateResolved::new(name.into(), vec![]), symbol.into())
    }

    struct AlwaysFails;
    impl stl_externals::EventExternal for AlwaysFails {
        fn fire(&self, _ctx: &EventContext, _args: &[RuntimeValue]) -> Result<bool, ExternalError> {
            Ok(false)
        }
        fn wait(&self, _ctx: &EventContext, _args: &[ExpectedValue]) -> Result<bool, ExternalError> {
            Ok(false)
        }
    }

    fn two_state_module(noop_only: bool) -> ResolvedModule {
        let mut module = ResolvedModule::default();
        module.roles.push(RoleDef { name: "rDriver".into(), fields: vec![] });
        module.states.push(StateDef { name: "sConn".into(), params: vec![], values: vec!["kA".into(), "kB".into()] });
        module.transitions.push(TransitionResolved {
            name: "tGo".into(),
            locals: vec![],
            pre_states: vec![vec![sv("sConn", "kA")]],
            events: vec![EventCallResolved {
                event: "eGo".into(),
                class: if noop_only { "Noop".into() } else { "Flaky".into() },
                source: ResolvedExpr::Get(Slot::Role { role: "rDriver".into() }),
                target: ResolvedExpr::Get(Slot::Role { role: "rDriver".into() }),
                test_side: None,
                args: vec![],
            }],
            post_states: vec![sv("sConn", "kB")],
            error_states: vec![],
        });
        module.transitions.push(TransitionResolved {
            name: "tBack".into(),
            locals: vec![],
            pre_states: vec![vec![sv("sConn", "kB")]],
            events: vec![],
            post_states: vec![sv("sConn", "kA")],
            error_states: vec![],
        });
        module
    }

    #[test]
    fn successful_circuit_runs_to_completion() {
        let module = two_state_module(true);
        let graph = build_graph(&module).unwrap();
        let plan = stl_planner::plan_traversal(&graph).unwrap();
        let mut env = Environment::new(&module.roles);
        env.register_event("Noop", Box::new(Noop));
        let mut visualizer = NoopVisualizer;
        assert!(run(&module, &graph, plan, &mut env, &mut visualizer).unwrap());
    }

    #[test]
    fn failing_event_without_error_states_fails_the_run() {
        let module = two_state_module(false);
        let graph = build_graph(&module).unwrap();
        let plan = stl_planner::plan_traversal(&graph).unwrap();
        let mut env = Environment::new(&module.roles);
        env.register_event("Flaky", Box::new(AlwaysFails));
        let mut visualizer = NoopVisualizer;
        assert!(!run(&module, &graph, plan, &mut env, &mut visualizer).unwrap());
    }
}
