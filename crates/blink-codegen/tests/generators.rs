use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn write_inputs(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let elements = dir.path().join("baseline_elements.json");
    let attributes = dir.path().join("baseline_attributes.json");
    let defaults = dir.path().join("default_configuration.json");
    fs::write(&elements, r#"["a"]"#).unwrap();
    fs::write(&attributes, r#"["b"]"#).unwrap();
    fs::write(&defaults, r#"{"allowElements": ["c"], "allowAttributes": {"d": []}}"#).unwrap();
    (elements, attributes, defaults)
}

#[test]
fn test_sanitizer_builtins_generated() {
    let dir = TempDir::new().unwrap();
    let (elements, attributes, defaults) = write_inputs(&dir);
    let out = dir.path().join("sanitizer_builtins.cc");

    Command::cargo_bin("generate-sanitizer-builtins")
        .unwrap()
        .arg("--out")
        .arg(&out)
        .arg("--baseline-elements")
        .arg(&elements)
        .arg("--baseline-attributes")
        .arg(&attributes)
        .arg("--default-configuration")
        .arg(&defaults)
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    for (name, item) in [
        ("kBaselineElements", "a"),
        ("kBaselineAttributes", "b"),
        ("kDefaultElements", "c"),
        ("kDefaultAttributes", "d"),
    ] {
        assert!(text.contains(&format!(
            "const char* const {}[] = {{\n  \"{}\",\n  nullptr,\n}};",
            name, item
        )));
    }
}

#[test]
fn test_sanitizer_builtins_missing_input_exits_1() {
    let dir = TempDir::new().unwrap();
    let (_, attributes, defaults) = write_inputs(&dir);
    let missing = dir.path().join("nope.json");

    Command::cargo_bin("generate-sanitizer-builtins")
        .unwrap()
        .arg("--out")
        .arg(dir.path().join("out.cc"))
        .arg("--baseline-elements")
        .arg(&missing)
        .arg("--baseline-attributes")
        .arg(&attributes)
        .arg("--default-configuration")
        .arg(&defaults)
        .assert()
        .code(1)
        .stderr(contains("An error occurred when reading baseline elements:"))
        .stderr(contains("nope.json"));
}

#[test]
fn test_sanitizer_builtins_bad_json_exits_1() {
    let dir = TempDir::new().unwrap();
    let (elements, attributes, defaults) = write_inputs(&dir);
    fs::write(&defaults, r#"{"allowElements": ["c"]}"#).unwrap();

    Command::cargo_bin("generate-sanitizer-builtins")
        .unwrap()
        .arg("--out")
        .arg(dir.path().join("out.cc"))
        .arg("--baseline-elements")
        .arg(&elements)
        .arg("--baseline-attributes")
        .arg(&attributes)
        .arg("--default-configuration")
        .arg(&defaults)
        .assert()
        .code(1)
        .stderr(contains("reading default configuration"));
}

#[test]
fn test_sanitizer_builtins_unwritable_output_exits_1() {
    let dir = TempDir::new().unwrap();
    let (elements, attributes, defaults) = write_inputs(&dir);
    let out = dir.path().join("missing_dir").join("out.cc");

    Command::cargo_bin("generate-sanitizer-builtins")
        .unwrap()
        .arg("--out")
        .arg(&out)
        .arg("--baseline-elements")
        .arg(&elements)
        .arg("--baseline-attributes")
        .arg(&attributes)
        .arg("--default-configuration")
        .arg(&defaults)
        .assert()
        .code(1)
        .stderr(contains("An error occurred when writing output file:"))
        .stderr(contains("missing_dir"));
    assert!(!out.exists());
}

#[test]
fn test_sanitizer_builtins_requires_all_flags() {
    let dir = TempDir::new().unwrap();
    let (elements, _, _) = write_inputs(&dir);

    Command::cargo_bin("generate-sanitizer-builtins")
        .unwrap()
        .arg("--out")
        .arg(dir.path().join("out.cc"))
        .arg("--baseline-elements")
        .arg(&elements)
        .assert()
        .failure()
        .stderr(contains("--baseline-attributes"));
}

#[test]
fn test_css_property_names_from_json5() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("css_properties.json5");
    fs::write(
        &input,
        r#"{
  // Comments and trailing commas are fine in JSON5.
  parameters: {},
  data: [
    { name: "color", priority: "High" },
    { name: "opacity" },
    { name: "-webkit-opacity", alias_for: "opacity" },
  ],
}"#,
    )
    .unwrap();
    let out_dir = dir.path().join("gen");

    Command::cargo_bin("make-css-property-names")
        .unwrap()
        .arg(&input)
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .success();

    let header = fs::read_to_string(out_dir.join("css_property_names.h")).unwrap();
    assert!(header.contains("    kColor = 2,"));
    assert!(header.contains("    kOpacity = 3,"));
    assert!(header.contains("    kAliasWebkitOpacity = 7,"));
    let cc = fs::read_to_string(out_dir.join("css_property_names.cc")).unwrap();
    assert!(cc.contains("\"color\\0\""));
}

#[test]
fn test_css_property_names_bad_alias_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("css_properties.json5");
    fs::write(&input, r#"{ data: [ { name: "-webkit-x", alias_for: "x" } ] }"#).unwrap();

    Command::cargo_bin("make-css-property-names")
        .unwrap()
        .arg(&input)
        .assert()
        .code(1)
        .stderr(contains("refers to unknown property 'x'"));
}
