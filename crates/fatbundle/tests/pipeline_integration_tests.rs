//! Integration tests for the full build pipeline.
//!
//! Each test builds a source directory by hand, runs the pipeline with the
//! embedded generator and inspects the placed JAR.

#![allow(non_snake_case)]

use fatbundle::prelude::*;
use fatbundle::{JarReader, UnpackReport, UnpackStatus};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use test_case::test_case;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Helper to write a zip/jar with the given entries.
fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, contents) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap();
}

/// Layer keeping the message of every WARN event.
#[derive(Clone, Default)]
struct WarningRecorder {
    messages: Arc<Mutex<Vec<String>>>,
}

impl WarningRecorder {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for WarningRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.messages.lock().unwrap().push(visitor.0);
        }
    }
}

struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        Self { temp }
    }

    fn source(&self) -> PathBuf {
        self.temp.path().join("src")
    }

    fn target(&self) -> PathBuf {
        self.temp.path().join("out")
    }

    fn builder(&self) -> fatbundle::BuildRequestBuilder {
        BuildRequest::builder("com.example.fat", "1.0.0")
            .source_directory(self.source())
            .target_directory(self.target())
            .extensions_to_unarchive(["zip"])
    }
}

#[test]
fn round_trip___valid_jar_and_corrupt_zip___produces_bundle() {
    let ws = Workspace::new();
    write_archive(&ws.source().join("lib-1.2.jar"), &[("lib.properties", b"name=lib")]);
    fs::write(ws.source().join("broken.zip"), b"corrupt archive bytes").unwrap();
    let request = ws.builder().build().unwrap();

    let recorder = WarningRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());

    let mut pipeline = Pipeline::new(request).keep_source_directory(true);
    let report = tracing::subscriber::with_default(subscriber, || pipeline.run()).unwrap();

    assert_eq!(report.artifact, ws.target().join("com.example.fat-1.0.0.jar"));
    assert!(report.artifact.is_file());
    let mut reader = JarReader::open(&report.artifact).unwrap();
    assert_eq!(reader.manifest().symbolic_name(), Some("com.example.fat"));
    assert_eq!(reader.manifest().get("Export-Package"), Some("*;version=1.0.0"));
    assert_eq!(reader.read_file_string("lib.properties").unwrap(), "name=lib");

    let unpack: &UnpackReport = &report.unpack;
    assert_eq!(unpack.extracted_count(), 0);
    assert_eq!(unpack.skipped_count(), 1);
    let skipped = &unpack.outcomes[0];
    assert_eq!(skipped.path, ws.source().join("broken.zip"));
    assert!(matches!(&skipped.status, UnpackStatus::Skipped { reason } if !reason.is_empty()));
    let warnings = recorder.messages();
    assert!(
        warnings.iter().any(|message| message.contains("broken.zip")),
        "no warning for broken.zip in {warnings:?}"
    );
    assert_eq!(
        fs::read(ws.source().join("broken.zip")).unwrap(),
        b"corrupt archive bytes"
    );
}

#[test]
fn round_trip___nested_archive___contributes_its_libraries() {
    let ws = Workspace::new();
    let inner = ws.temp.path().join("inner.jar");
    write_archive(&inner, &[("com/example/util/Util.class", b"util")]);
    let inner_bytes = fs::read(&inner).unwrap();
    write_archive(
        &ws.source().join("distribution.zip"),
        &[("lib/inner.jar", inner_bytes.as_slice()), ("README", b"readme")],
    );
    let request = ws.builder().build().unwrap();

    let report = Pipeline::new(request).run().unwrap();

    assert_eq!(report.unpack.extracted_count(), 1);
    assert_eq!(report.classpath.len(), 1);
    assert!(report.classpath[0].ends_with("lib/inner.jar"));
    let reader = JarReader::open(&report.artifact).unwrap();
    assert!(reader.has_file("com/example/util/Util.class"));
    assert_eq!(
        reader.manifest().get("Export-Package"),
        Some("com.example.util;version=1.0.0")
    );
    assert!(!ws.source().exists());
}

#[test_case("", "/tmp/out" ; "blank symbolic name")]
#[test_case("   ", "/tmp/out" ; "whitespace symbolic name")]
#[test_case("com.example.fat", "" ; "blank target directory")]
#[test_case("com.example.fat", "  " ; "whitespace target directory")]
fn build_request___blank_required_value___fails_before_filesystem_access(name: &str, target: &str) {
    let result = BuildRequest::builder(name, "1.0.0")
        .source_directory("/definitely/not/a/real/source")
        .target_directory(target)
        .build();

    match result {
        Err(err) => assert!(err.is_precondition()),
        Ok(_) => panic!("blank value accepted"),
    }
}

#[test]
fn build_request___target_inside_source___is_rejected_and_source_kept() {
    let ws = Workspace::new();
    write_archive(&ws.source().join("lib-1.2.jar"), &[("lib.properties", b"name=lib")]);

    let result = ws.builder().target_directory(ws.source().join("out")).build();

    match result {
        Err(err) => assert!(err.is_precondition()),
        Ok(_) => panic!("nested target accepted"),
    }
    assert!(ws.source().join("lib-1.2.jar").is_file());
    assert!(!ws.source().join("out").exists());
}

#[test]
fn pipeline___explicit_file_name___is_used_verbatim() {
    let ws = Workspace::new();
    let request = ws.builder().target_file_name("custom-bundle.jar").build().unwrap();

    let report = Pipeline::new(request).run().unwrap();

    assert_eq!(report.file_name, "custom-bundle.jar");
    assert!(ws.target().join("custom-bundle.jar").is_file());
    assert!(!ws.target().join("com.example.fat-1.0.0.jar").exists());
}

#[test]
fn pipeline___missing_target_directory___is_created() {
    let ws = Workspace::new();
    let target = ws.temp.path().join("deep/nested/out");
    let request = ws.builder().target_directory(&target).build().unwrap();

    let report = Pipeline::new(request).run().unwrap();

    assert_eq!(report.artifact, target.join("com.example.fat-1.0.0.jar"));
    assert!(report.artifact.is_file());
}

#[test]
fn pipeline___empty_source___still_produces_bundle() {
    let ws = Workspace::new();
    let request = ws.builder().build().unwrap();

    let report = Pipeline::new(request).run().unwrap();

    assert!(report.classpath.is_empty());
    let reader = JarReader::open(&report.artifact).unwrap();
    assert_eq!(reader.manifest().get("Bundle-Version"), Some("1.0.0"));
}

#[test]
fn pipeline___identical_inputs___produce_identical_artifacts() {
    let build = || {
        let ws = Workspace::new();
        write_archive(&ws.source().join("b.jar"), &[("b/B.class", b"b")]);
        write_archive(&ws.source().join("a.jar"), &[("a/A.class", b"a")]);
        let request = ws.builder().build().unwrap();
        let report = Pipeline::new(request).run().unwrap();
        report.sha256
    };

    assert_eq!(build(), build());
}

#[cfg(unix)]
#[test]
fn pipeline___external_generator_without_output___fails_and_preserves_source() {
    let ws = Workspace::new();
    write_archive(&ws.source().join("lib.jar"), &[("x.txt", b"x")]);
    let request = ws.builder().build().unwrap();
    let config = GeneratorConfig::External(fatbundle::ExternalConfig {
        args: vec!["-c".to_string(), "true".to_string()],
        ..fatbundle::ExternalConfig::new("sh")
    });

    let mut pipeline = Pipeline::new(request).with_generator(config.build());
    let result = pipeline.run();

    assert!(matches!(result, Err(BundleError::GeneratorOutputMissing(_))));
    assert_eq!(pipeline.state(), BuildState::Failed);
    assert!(ws.source().join("lib.jar").is_file());
    assert!(ws.source().join("temp.bnd").is_file());
    assert!(!ws.target().join("com.example.fat-1.0.0.jar").exists());
}
