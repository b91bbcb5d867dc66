#![allow(non_snake_case)]

use super::*;
use tempfile::TempDir;
use test_case::test_case;

fn classpath(entries: &[&str]) -> Classpath {
    Classpath::from_entries(entries.iter().map(PathBuf::from))
}

#[test]
fn BuildDescriptor___render___matches_fixed_layout() {
    let descriptor = BuildDescriptor::new(
        "com.example.fat",
        &classpath(&["/src/lib-1.2.jar", "/src/util/u.jar"]),
    );

    assert_eq!(
        descriptor.render(),
        "Bundle-SymbolicName: com.example.fat\n\nver: 1.0.0\n\n-classpath: /src/lib-1.2.jar, /src/util/u.jar\n\nExport-Package: *;version=${ver}"
    );
}

#[test]
fn BuildDescriptor___empty_classpath___keeps_empty_field() {
    let descriptor = BuildDescriptor::new("a", &Classpath::default());

    assert!(descriptor.render().contains("\n\n-classpath: \n\n"));
}

#[test]
fn emit___overwrites_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(DESCRIPTOR_FILE);
    fs::write(&path, "stale content that is longer than the new descriptor text ....................................").unwrap();
    let descriptor = BuildDescriptor::new("a", &Classpath::default());

    let written = emit(&descriptor, &path).unwrap();

    assert_eq!(written, path);
    assert_eq!(fs::read_to_string(&path).unwrap(), descriptor.render());
}

#[test]
fn emit___missing_directory___is_error() {
    let temp = TempDir::new().unwrap();
    let descriptor = BuildDescriptor::new("a", &Classpath::default());

    let result = emit(&descriptor, &temp.path().join("absent").join(DESCRIPTOR_FILE));

    assert!(matches!(result, Err(BundleError::Io(_))));
}

#[test]
fn DescriptorProperties___parse___reads_emitted_descriptor() {
    let descriptor = BuildDescriptor::new("com.example.fat", &classpath(&["/a.jar", "/b.jar"]));

    let props = DescriptorProperties::parse(&descriptor.render()).unwrap();

    assert_eq!(props.get("Bundle-SymbolicName"), Some("com.example.fat"));
    assert_eq!(props.get("ver"), Some("1.0.0"));
    assert_eq!(props.get("-classpath"), Some("/a.jar, /b.jar"));
    assert_eq!(props.get("Export-Package"), Some("*;version=${ver}"));
}

#[test_case("key: value" ; "colon")]
#[test_case("key=value" ; "equals")]
#[test_case("key = value" ; "spaced equals")]
#[test_case("key value" ; "whitespace")]
#[test_case("  key:value  " ; "surrounding whitespace")]
fn DescriptorProperties___parse___separator_variants(line: &str) {
    let props = DescriptorProperties::parse(line).unwrap();

    assert_eq!(props.get("key"), Some("value"));
}

#[test]
fn DescriptorProperties___parse___skips_comments_and_joins_continuations() {
    let text = "# comment\n! also a comment\nExport-Package: a.b,\\\n    c.d\n";

    let props = DescriptorProperties::parse(text).unwrap();

    assert_eq!(props.iter().count(), 1);
    assert_eq!(props.get("Export-Package"), Some("a.b,c.d"));
}

#[test]
fn DescriptorProperties___parse___missing_key___is_error() {
    let result = DescriptorProperties::parse(": value");

    assert!(matches!(result, Err(BundleError::InvalidDescriptor(_))));
}

#[test]
fn DescriptorProperties___expand___resolves_version_macro() {
    let descriptor = BuildDescriptor::new("a", &Classpath::default());
    let props = DescriptorProperties::parse(&descriptor.render()).unwrap();

    let export = props.expanded("Export-Package").unwrap();

    assert_eq!(export.as_deref(), Some("*;version=1.0.0"));
}

#[test]
fn DescriptorProperties___expand___unknown_macro___is_error() {
    let props = DescriptorProperties::parse("Bundle-Version: ${missing}").unwrap();

    let result = props.expanded("Bundle-Version");

    match result {
        Err(BundleError::InvalidDescriptor(message)) => assert!(message.contains("${missing}")),
        other => panic!("expected InvalidDescriptor, got {other:?}"),
    }
}

#[test]
fn DescriptorProperties___set_if_absent___keeps_existing_value() {
    let mut props = DescriptorProperties::parse("Bundle-Name: custom").unwrap();

    assert!(!props.set_if_absent("Bundle-Name", "default"));
    assert!(props.set_if_absent("Bundle-Version", "2.0.0"));
    assert_eq!(props.get("Bundle-Name"), Some("custom"));
    assert_eq!(props.get("Bundle-Version"), Some("2.0.0"));
}

#[test]
fn DescriptorProperties___headers___excludes_variables_and_instructions() {
    let descriptor = BuildDescriptor::new("a", &classpath(&["/x.jar"]));
    let props = DescriptorProperties::parse(&descriptor.render()).unwrap();

    let names: Vec<&str> = props.headers().map(|(k, _)| k).collect();

    assert_eq!(names, vec!["Bundle-SymbolicName", "Export-Package"]);
}

#[test]
fn DescriptorProperties___classpath_entries___anchors_relative_paths() {
    let props = DescriptorProperties::parse("-classpath: lib/a.jar, /abs/b.jar").unwrap();

    let entries = props.classpath_entries(Path::new("/base")).unwrap();

    assert_eq!(
        entries,
        vec![PathBuf::from("/base/lib/a.jar"), PathBuf::from("/abs/b.jar")]
    );
}

#[test]
fn DescriptorProperties___absolutize_classpath___rewrites_value() {
    let mut props = DescriptorProperties::parse("-classpath: lib/a.jar").unwrap();

    props.absolutize_classpath(Path::new("/base")).unwrap();

    assert_eq!(props.get("-classpath"), Some("/base/lib/a.jar"));
}

#[test]
fn DescriptorProperties___render___round_trips_through_parse() {
    let mut props = DescriptorProperties::new();
    props.set("Bundle-SymbolicName", "x");
    props.set("-classpath", "/a.jar, /b.jar");

    let reparsed = DescriptorProperties::parse(&props.render()).unwrap();

    assert_eq!(reparsed, props);
}
