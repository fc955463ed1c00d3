//! End-to-end tests of the transition lifecycle.

use serde_json::{json, Value};
use statewise::{
    BuildError, Diagnostic, Event, Family, Machine, MachineBuilder, MachineError, Phase,
};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(log: &Log) -> impl Fn(&mut Machine, &Event) + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |_: &mut Machine, event: &Event| log.lock().unwrap().push(event.path())
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

const LIFECYCLE: [&str; 7] = [
    "transition.start",
    "state.leave",
    "action.start",
    "state.enter",
    "action.end",
    "system.change",
    "system.complete",
];

fn traced(builder: MachineBuilder, log: &Log) -> MachineBuilder {
    LIFECYCLE
        .iter()
        .fold(builder, |builder, id| builder.handler(*id, record(log)))
}

#[test]
fn transition_dispatches_events_in_order() {
    let log = log();
    let mut machine = traced(
        MachineBuilder::new().event("next: a > b").final_state("b"),
        &log,
    )
    .build()
    .unwrap();

    assert!(machine.do_action("next", vec![]).unwrap());

    assert_eq!(
        entries(&log),
        vec![
            "transition.start",
            "state.a.leave",
            "action.next.start",
            "state.b.enter",
            "action.next.end",
            "system.change",
            "system.complete",
        ]
    );
    assert_eq!(machine.state(), "b");
    assert!(machine.is_complete());
    assert!(!machine.is_transitioning());
}

#[test]
fn completion_only_fires_for_final_state() {
    let log = log();
    let mut machine = traced(
        MachineBuilder::new()
            .event("next: a > b > c")
            .final_state("c"),
        &log,
    )
    .build()
    .unwrap();

    machine.do_action("next", vec![]).unwrap();
    assert!(!entries(&log).contains(&"system.complete".to_string()));

    machine.do_action("next", vec![]).unwrap();
    assert_eq!(entries(&log).last().map(String::as_str), Some("system.complete"));
}

#[test]
fn literal_handlers_run_before_wildcards() {
    let log = log();
    let wildcard = Arc::clone(&log);
    let literal = Arc::clone(&log);

    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .handler("state.leave", move |_, _| {
            wildcard.lock().unwrap().push("wildcard".into())
        })
        .handler("state.a.leave", move |_, _| {
            literal.lock().unwrap().push("literal".into())
        })
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();

    assert_eq!(entries(&log), vec!["literal", "wildcard"]);
}

#[test]
fn shorthand_ids_match_explicit_forms() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .handler("a", record(&log))
        .handler("@next", record(&log))
        .handler("#b", record(&log))
        .handler("next", record(&log))
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "state.a.leave",
            "action.next.start",
            "state.b.enter",
            "action.next.end",
        ]
    );
}

#[test]
fn handlers_observe_committed_state() {
    let seen = log();
    let leave = Arc::clone(&seen);
    let enter = Arc::clone(&seen);

    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .handler("leave", move |machine, _| {
            leave.lock().unwrap().push(machine.state().to_string())
        })
        .handler("enter", move |machine, _| {
            enter.lock().unwrap().push(machine.state().to_string())
        })
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();

    assert_eq!(entries(&seen), vec!["a", "b"]);
}

#[test]
fn events_carry_transition_arguments() {
    let args: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&args);

    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .handler("@next", move |_, event| {
            let info = event.transition.as_ref().unwrap();
            assert_eq!(info.from, "a");
            assert_eq!(info.to, "b");
            sink.lock().unwrap().extend(info.args.iter().cloned());
        })
        .build()
        .unwrap();

    machine
        .do_action("next", vec![json!("hello"), json!(7)])
        .unwrap();

    assert_eq!(*args.lock().unwrap(), vec![json!("hello"), json!(7)]);
}

#[test]
fn pause_and_resume_between_handlers() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .handler("leave", |machine, _| {
            machine.pause();
        })
        .handler("pause", record(&log))
        .handler("resume", record(&log))
        .handler("enter", record(&log))
        .build()
        .unwrap();

    assert!(machine.do_action("next", vec![]).unwrap());
    assert!(machine.is_paused());
    assert!(machine.is_transitioning());
    assert_eq!(machine.state(), "a");
    assert_eq!(machine.transition().unwrap().phase(), Phase::Leaving);
    assert_eq!(entries(&log), vec!["transition.pause"]);

    assert!(machine.resume());
    assert!(!machine.is_transitioning());
    assert_eq!(machine.state(), "b");
    assert_eq!(
        entries(&log),
        vec!["transition.pause", "transition.resume", "state.b.enter"]
    );
}

#[test]
fn pause_stops_before_next_handler_of_same_event() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .handler("enter:b", |machine, _| {
            machine.pause();
        })
        .handler("enter:b", record(&log))
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();

    assert!(entries(&log).is_empty());
    assert_eq!(machine.state(), "b");
    assert_eq!(machine.transition().unwrap().pending_handlers(), 1);

    machine.resume();
    assert_eq!(entries(&log), vec!["state.b.enter"]);
    assert!(!machine.is_transitioning());
}

#[test]
fn cancel_before_commit_keeps_source_state() {
    let log = log();
    let mut machine = traced(MachineBuilder::new().event("next: a > b"), &log)
        .handler("@next", |machine, _| {
            machine.cancel();
        })
        .handler("cancel", record(&log))
        .build()
        .unwrap();

    assert!(machine.do_action("next", vec![]).unwrap());

    assert_eq!(machine.state(), "a");
    assert!(!machine.is_transitioning());
    assert!(machine.history().is_empty());
    assert_eq!(
        entries(&log),
        vec!["transition.start", "state.a.leave", "transition.cancel"]
    );
}

#[test]
fn cancel_after_commit_restores_source_state() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .handler("#b", |machine, _| {
            machine.cancel();
        })
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();

    assert_eq!(machine.state(), "a");
    assert!(machine.history().is_empty());
}

#[test]
fn end_skips_remaining_handlers() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .final_state("b")
        .handler("leave", |machine, _| {
            machine.end();
        })
        .handler("enter", record(&log))
        .handler("transition.end", record(&log))
        .handler("change", record(&log))
        .handler("complete", record(&log))
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();

    assert_eq!(machine.state(), "b");
    assert!(machine.is_complete());
    assert!(machine.history().transitions()[0].forced);
    assert_eq!(
        entries(&log),
        vec!["transition.end", "system.change", "system.complete"]
    );
}

#[test]
fn end_commits_a_paused_transition() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b > c")
        .handler("leave", |machine, _| {
            machine.pause();
        })
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();
    assert!(machine.is_paused());

    assert!(machine.end());
    assert_eq!(machine.state(), "b");
    assert!(!machine.is_complete());
    assert!(!machine.resume());
}

#[test]
fn controls_without_transition_return_false() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .build()
        .unwrap();

    assert!(!machine.pause());
    assert!(!machine.resume());
    assert!(!machine.cancel());
    assert!(!machine.end());
}

#[test]
fn actions_are_rejected_while_in_flight() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b > c")
        .handler("leave", |machine, _| {
            machine.pause();
        })
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();
    assert!(!machine.do_action("next", vec![]).unwrap());

    machine.resume();
    assert_eq!(machine.state(), "b");
}

#[test]
fn change_handlers_can_chain_actions() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b > c")
        .handler("change", |machine, _| {
            if machine.is("b") {
                machine.do_action("next", vec![]).unwrap();
            }
        })
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();

    assert_eq!(machine.state(), "c");
    assert_eq!(machine.history().get_path(), vec!["a", "b", "c"]);
}

#[test]
fn go_follows_first_matching_action() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b > c")
        .event("skip: a > c")
        .build()
        .unwrap();

    assert!(!machine.go("zzz").unwrap());
    assert!(machine.go("c").unwrap());
    assert_eq!(machine.history().transitions()[0].action, "skip");
    assert!(!machine.go("b").unwrap());
}

#[test]
fn reset_restores_initial_state() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b > c")
        .final_state("c")
        .handler("reset", record(&log))
        .build()
        .unwrap();

    machine.go("b").unwrap();
    machine.go("c").unwrap();
    assert!(machine.is_complete());

    assert!(machine.reset(None));
    assert_eq!(machine.state(), "a");
    assert!(machine.is_started());
    assert!(!machine.is_complete());

    assert!(machine.reset(Some("b")));
    assert_eq!(machine.state(), "b");

    assert!(!machine.reset(Some("nowhere")));
    assert_eq!(machine.state(), "b");
    assert_eq!(entries(&log), vec!["system.reset", "system.reset"]);
}

#[test]
fn reset_discards_paused_transition() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .handler("leave", |machine, _| {
            machine.pause();
        })
        .handler("enter", record(&log))
        .handler("change", record(&log))
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();
    assert!(machine.reset(None));

    assert!(!machine.is_transitioning());
    assert!(!machine.resume());
    assert_eq!(machine.state(), "a");
    assert!(entries(&log).is_empty());
}

#[test]
fn deferred_machine_starts_on_demand() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .defer(true)
        .handler("system.initialize", record(&log))
        .build()
        .unwrap();

    assert!(!machine.is_started());
    assert!(!machine.do_action("next", vec![]).unwrap());
    assert!(entries(&log).is_empty());

    assert!(machine.start());
    assert_eq!(machine.state(), "a");
    assert!(!machine.start());
    assert_eq!(entries(&log), vec!["system.initialize"]);
}

#[test]
fn go_enters_a_deferred_machine() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b > c")
        .defer(true)
        .handler("system.initialize", record(&log))
        .handler("system.reset", record(&log))
        .build()
        .unwrap();

    assert!(machine.go("b").unwrap());
    assert!(machine.is_started());
    assert_eq!(machine.state(), "b");
    assert!(machine.history().is_empty());
    assert_eq!(entries(&log), vec!["system.initialize"]);

    assert!(!machine.start());
    assert_eq!(entries(&log), vec!["system.initialize"]);
}

#[test]
fn reset_starts_history_over() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .build()
        .unwrap();

    machine.do_action("next", vec![]).unwrap();
    assert!(machine.reset(None));
    assert!(machine.history().is_empty());

    machine.do_action("next", vec![]).unwrap();
    assert_eq!(machine.history().len(), 1);
    assert_eq!(machine.history().get_path(), vec!["a", "b"]);
}

#[test]
fn resolver_chooses_target() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b > c")
        .resolved("route", "a", |_, args| {
            args.first()
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| "missing destination".to_string())
        })
        .build()
        .unwrap();

    assert!(machine.can("route"));
    assert!(machine.states_for(None).iter().all(|s| s == "b"));

    assert!(machine.do_action("route", vec![json!("c")]).unwrap());
    assert_eq!(machine.state(), "c");
}

#[test]
fn resolver_failures_leave_state_untouched() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .resolved("route", "a", |_, args| {
            args.first()
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| "missing destination".to_string())
        })
        .build()
        .unwrap();

    let failed = machine.do_action("route", vec![]);
    assert!(matches!(failed, Err(MachineError::ResolverFailed { .. })));

    let unknown = machine.do_action("route", vec![json!("nowhere")]);
    match unknown {
        Err(MachineError::UnresolvedState { action, state }) => {
            assert_eq!(action, "route");
            assert_eq!(state, "nowhere");
        }
        other => panic!("Expected UnresolvedState, got {other:?}"),
    }

    assert_eq!(machine.state(), "a");
    assert!(!machine.is_transitioning());
}

#[test]
fn add_extends_a_running_machine() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .handler("state.add", record(&log))
        .handler("update", record(&log))
        .build()
        .unwrap();

    machine.add("skip: b > c > d").unwrap();

    assert_eq!(
        entries(&log),
        vec!["state.c.add", "state.d.add", "system.update"]
    );
    assert!(machine.has("d"));

    machine.do_action("next", vec![]).unwrap();
    machine.do_action("skip", vec![]).unwrap();
    assert_eq!(machine.state(), "c");
}

#[test]
fn add_rejects_malformed_rules() {
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .build()
        .unwrap();

    let result = machine.add("next: b >");
    assert!(matches!(
        result,
        Err(MachineError::Build(BuildError::MalformedRule { .. }))
    ));
    assert_eq!(machine.states().len(), 2);
}

#[test]
fn queries_describe_the_graph() {
    let machine = MachineBuilder::new()
        .event("next: a > b > c")
        .event("back: a < b")
        .event("skip: a > c")
        .build()
        .unwrap();

    assert_eq!(machine.actions_for(None), vec!["next", "skip"]);
    assert_eq!(machine.actions_for(Some("b")), vec!["next", "back"]);
    assert!(machine.actions_for(Some("nowhere")).is_empty());
    assert_eq!(machine.states_for(None), vec!["b", "c"]);
    assert_eq!(machine.action_for_state("c"), Some("skip".to_string()));
    assert_eq!(machine.action_for_state("a"), None);
    assert!(machine.can("next"));
    assert!(machine.cannot("back"));
    assert!(machine.is("a"));
}

#[test]
fn on_subscribes_after_construction() {
    let log = log();
    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .build()
        .unwrap();

    machine.on("leave: a", record(&log)).unwrap();
    let invalid = machine.on("nonsense", record(&log));
    assert!(matches!(invalid, Err(MachineError::InvalidEventId { .. })));

    machine.do_action("next", vec![]).unwrap();
    assert_eq!(entries(&log), vec!["state.a.leave"]);
}

#[test]
fn diagnostics_reach_sink_in_debug_mode() {
    let seen: Arc<Mutex<Vec<Diagnostic>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .event("back: a < b")
        .debug(true)
        .diagnostics(move |d| sink.lock().unwrap().push(d.clone()))
        .build()
        .unwrap();

    assert!(!machine.can("fly"));
    assert!(!machine.do_action("back", vec![]).unwrap());
    assert!(!machine.pause());
    machine.on("leave: nowhere", |_, _| {}).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Diagnostic::UnknownTarget {
                family: Family::Action,
                name: "fly".to_string(),
            },
            Diagnostic::TransitionRejected {
                action: "back".to_string(),
                state: "a".to_string(),
            },
            Diagnostic::NotTransitioning {
                operation: "pause".to_string(),
            },
            Diagnostic::UnknownTarget {
                family: Family::State,
                name: "nowhere".to_string(),
            },
        ]
    );
}

#[test]
fn diagnostics_are_silent_without_debug() {
    let seen: Arc<Mutex<Vec<Diagnostic>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut machine = MachineBuilder::new()
        .event("next: a > b")
        .diagnostics(move |d| sink.lock().unwrap().push(d.clone()))
        .build()
        .unwrap();

    machine.can("fly");
    machine.go("nowhere").unwrap();

    assert!(seen.lock().unwrap().is_empty());
}
