#![allow(non_snake_case)]

use super::*;

// Success path

#[test]
fn BuildState___init_to_unpacking___transition_allowed() {
    let state = BuildState::Init;

    let can_transition = state.can_transition_to(BuildState::Unpacking);

    assert!(can_transition);
}

#[test]
fn BuildState___placing_to_done___transition_allowed() {
    let state = BuildState::Placing;

    let can_transition = state.can_transition_to(BuildState::Done);

    assert!(can_transition);
}

#[test]
fn BuildState___next___walks_the_success_path_in_order() {
    let mut visited = vec![BuildState::Init];
    let mut current = BuildState::Init;

    while let Some(next) = current.next() {
        assert!(current.can_transition_to(next));
        visited.push(next);
        current = next;
    }

    assert_eq!(
        visited,
        vec![
            BuildState::Init,
            BuildState::Unpacking,
            BuildState::ConfigEmitted,
            BuildState::Generating,
            BuildState::Placing,
            BuildState::Done,
        ]
    );
}

// Skipping stages

#[test]
fn BuildState___init_to_generating___skip_not_allowed() {
    let state = BuildState::Init;

    let can_transition = state.can_transition_to(BuildState::Generating);

    assert!(!can_transition);
}

#[test]
fn BuildState___done_to_failed___not_allowed() {
    let state = BuildState::Done;

    let can_transition = state.can_transition_to(BuildState::Failed);

    assert!(!can_transition);
}

// Terminal states

#[test]
fn BuildState___done___is_terminal() {
    assert!(BuildState::Done.is_terminal());
    assert!(BuildState::Done.next().is_none());
}

#[test]
fn BuildState___failed___is_terminal() {
    assert!(BuildState::Failed.is_terminal());
    assert!(BuildState::Failed.next().is_none());
}

#[test]
fn BuildState___generating___is_not_terminal() {
    assert!(!BuildState::Generating.is_terminal());
}

// Display and serde

#[test]
fn BuildState___default___is_init() {
    assert_eq!(BuildState::default(), BuildState::Init);
}

#[test]
fn BuildState___display___matches_variant_name() {
    assert_eq!(BuildState::ConfigEmitted.to_string(), "ConfigEmitted");
}

#[test]
fn BuildState___description___is_not_empty() {
    assert!(!BuildState::Placing.description().is_empty());
}
