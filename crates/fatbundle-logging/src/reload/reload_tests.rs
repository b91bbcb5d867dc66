#![allow(non_snake_case)]

use super::*;
use test_case::test_case;
use tracing_subscriber::prelude::*;

#[test_case(LogLevel::Trace, LevelFilter::TRACE)]
#[test_case(LogLevel::Debug, LevelFilter::DEBUG)]
#[test_case(LogLevel::Info, LevelFilter::INFO)]
#[test_case(LogLevel::Warn, LevelFilter::WARN)]
#[test_case(LogLevel::Error, LevelFilter::ERROR)]
#[test_case(LogLevel::Off, LevelFilter::OFF)]
fn convert_level_to_filter___maps_each_level(level: LogLevel, expected: LevelFilter) {
    assert_eq!(convert_level_to_filter(level), expected);
}

#[test]
fn ReloadHandle___not_installed___apply_is_a_no_op() {
    let handle = ReloadHandle::new();

    let changed = handle.apply(LogLevel::Debug).unwrap();

    assert!(!changed);
    assert!(handle.current_level().is_none());
}

#[test]
fn ReloadHandle___installed___apply_changes_level() {
    let (filter, inner) = reload::Layer::new(LevelFilter::INFO);
    let subscriber = tracing_subscriber::registry().with(filter);
    let handle = ReloadHandle::new();
    handle.install(inner, LogLevel::Info);

    let changed = tracing::subscriber::with_default(subscriber, || {
        handle.apply(LogLevel::Warn).unwrap()
    });

    assert!(changed);
    assert_eq!(handle.current_level(), Some(LogLevel::Warn));
}

#[test]
fn ReloadHandle___same_level___is_not_reapplied() {
    let (_filter, inner) = reload::Layer::<LevelFilter, Registry>::new(LevelFilter::WARN);
    let handle = ReloadHandle::new();
    handle.install(inner, LogLevel::Warn);

    let changed = handle.apply(LogLevel::Warn).unwrap();

    assert!(!changed);
    assert_eq!(handle.current_level(), Some(LogLevel::Warn));
}

#[test]
fn ReloadHandle___dropped_subscriber___apply_fails_and_keeps_level() {
    let (filter, inner) = reload::Layer::<LevelFilter, Registry>::new(LevelFilter::INFO);
    drop(filter);
    let handle = ReloadHandle::new();
    handle.install(inner, LogLevel::Info);

    let result = handle.apply(LogLevel::Trace);

    assert!(result.is_err());
    assert_eq!(handle.current_level(), Some(LogLevel::Info));
}

#[test]
fn ReloadHandle___global___returns_same_instance() {
    let first = ReloadHandle::global() as *const ReloadHandle;
    let second = ReloadHandle::global() as *const ReloadHandle;

    assert_eq!(first, second);
}
