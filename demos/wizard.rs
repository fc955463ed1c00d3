//! Signup Wizard
//!
//! This example drives a multi-page signup form with a branching route.
//!
//! Key concepts:
//! - Shorthand rules for linear and bidirectional steps
//! - A resolver choosing the next page from action arguments
//! - Pausing a transition while "validating" and resuming it later
//! - Final state (`done` completes the workflow)
//!
//! Run with: RUST_LOG=statewise=debug cargo run --example wizard

use serde_json::{json, Value};
use statewise::{Diagnostic, Event, Machine, MachineBuilder, MachineError};
use tracing_subscriber::EnvFilter;

fn choose_plan(_machine: &Machine, args: &[Value]) -> Result<String, String> {
    match args.first().and_then(Value::as_str) {
        Some("business") => Ok("company".to_string()),
        Some("personal") => Ok("profile".to_string()),
        Some(other) => Err(format!("unsupported plan '{other}'")),
        None => Err("no plan selected".to_string()),
    }
}

fn announce(machine: &mut Machine, event: &Event) {
    if let Some(info) = &event.transition {
        println!("  {} -> {} via '{}'", info.from, info.to, info.action);
    }
    println!("  now on page '{}'", machine.state());
}

fn main() -> Result<(), MachineError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut wizard = MachineBuilder::new()
        .event("next: intro > plan")
        .event("back: intro < plan")
        .resolved("choose", "plan", choose_plan)
        .event("next: company > review")
        .event("next: profile > review")
        .transition("submit", "review", "done")
        .event("edit: review - profile")
        .final_state("done")
        .debug(true)
        .diagnostics(|diagnostic: &Diagnostic| println!("  ! {diagnostic}"))
        .handler("change", announce)
        .handler("#review", |_, _| println!("  please check your details"))
        .handler("@submit", |machine, _| {
            println!("  validating...");
            machine.pause();
        })
        .handler("complete", |_, _| println!("  signup complete"))
        .build()?;

    println!("Starting on '{}'", wizard.state());
    println!("Available actions: {:?}", wizard.actions_for(None));

    wizard.do_action("next", vec![])?;

    println!("Choosing an unknown plan:");
    if let Err(error) = wizard.do_action("choose", vec![json!("enterprise")]) {
        println!("  {error}");
    }

    println!("Choosing the personal plan:");
    wizard.do_action("choose", vec![json!("personal")])?;
    wizard.do_action("next", vec![])?;

    println!("Trying to go back from review:");
    wizard.do_action("back", vec![])?;

    println!("Submitting:");
    wizard.do_action("submit", vec![])?;
    println!("  paused: {}", wizard.is_paused());
    wizard.resume();

    println!(
        "Visited: {}",
        wizard.history().get_path().join(" -> ")
    );
    println!("Complete: {}", wizard.is_complete());

    Ok(())
}
