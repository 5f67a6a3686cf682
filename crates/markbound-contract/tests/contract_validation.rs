use markbound_contract::{ContractDocument, DataBinding, SpecVersion};
use semver::Version;

fn load_fixture(name: &str) -> ContractDocument {
    let path = format!("tests/fixtures/{name}.yaml");
    let text = std::fs::read_to_string(path).expect("failed to read fixture");
    ContractDocument::from_yaml_str(&text).expect("fixture should deserialize")
}

#[test]
fn monthly_report_fixture_validates() {
    let document = load_fixture("monthly_report");
    document.validate().expect("fixture should validate");
    assert_eq!(document.contract.bindings.len(), 6);
    assert_eq!(document.contract.data_sources.len(), 2);
}

#[test]
fn yaml_round_trip_preserves_the_document() {
    let document = load_fixture("monthly_report");
    let yaml = document.to_yaml().expect("serialize to yaml");
    let reparsed = ContractDocument::from_yaml_str(&yaml).expect("reparse yaml");
    assert_eq!(document, reparsed);
}

#[test]
fn json_round_trip_preserves_the_document() {
    let document = load_fixture("monthly_report");
    let json = document.to_json_pretty().expect("serialize to json");
    let reparsed = ContractDocument::from_json_str(&json).expect("reparse json");
    assert_eq!(document, reparsed);
}

#[test]
fn wrong_spec_identifier_rejected() {
    let mut document = load_fixture("monthly_report");
    document.spec = "other".to_string();

    let err = document.validate().expect_err("validation should fail");
    assert!(
        err.issues.iter().any(|i| i.path == "spec"),
        "unexpected issues: {:?}",
        err.issues
    );
}

#[test]
fn incompatible_spec_version_rejected() {
    let mut document = load_fixture("monthly_report");
    document.spec_version = SpecVersion::new(Version::new(2, 0, 0));

    let err = document.validate().expect_err("validation should fail");
    assert!(
        err.issues.iter().any(|i| i.path == "spec_version"),
        "unexpected issues: {:?}",
        err.issues
    );
}

#[test]
fn duplicate_marks_reported() {
    let mut document = load_fixture("monthly_report");
    let duplicate = document.contract.bindings[0].clone();
    document.contract.bindings.push(duplicate);

    let err = document.validate().expect_err("validation should fail");
    assert!(
        err.issues
            .iter()
            .any(|i| i.message.contains("duplicate mark")),
        "unexpected issues: {:?}",
        err.issues
    );
}

#[test]
fn unknown_data_source_reported() {
    let mut document = load_fixture("monthly_report");
    let DataBinding::Single(binding) = &mut document.contract.bindings[0] else {
        panic!("fixture should start with a single binding");
    };
    binding.data_source = "nope".to_string();

    let err = document.validate().expect_err("validation should fail");
    assert!(
        err.issues
            .iter()
            .any(|i| i.path == "contract.bindings[0].dataSource"
                && i.message.contains("unknown data source")),
        "unexpected issues: {:?}",
        err.issues
    );
}

#[test]
fn parameter_mark_must_use_the_v_namespace() {
    let mut document = load_fixture("monthly_report");
    let DataBinding::Parameter(binding) = &mut document.contract.bindings[4] else {
        panic!("fixture binding 4 should be a parameter");
    };
    binding.mark = "d.issuedBy".to_string();

    let err = document.validate().expect_err("validation should fail");
    assert!(
        err.issues
            .iter()
            .any(|i| i.path == "contract.bindings[4].mark"),
        "unexpected issues: {:?}",
        err.issues
    );
}

#[test]
fn malformed_cell_coordinate_reported() {
    let mut document = load_fixture("monthly_report");
    let DataBinding::Single(binding) = &mut document.contract.bindings[0] else {
        panic!("fixture should start with a single binding");
    };
    binding.cell_coordinate = "12B".to_string();

    let err = document.validate().expect_err("validation should fail");
    assert!(
        err.issues
            .iter()
            .any(|i| i.path == "contract.bindings[0].cellCoordinate"),
        "unexpected issues: {:?}",
        err.issues
    );
}

#[test]
fn fixed_method_requires_a_range() {
    let mut document = load_fixture("monthly_report");
    let DataBinding::List(binding) = &mut document.contract.bindings[3] else {
        panic!("fixture binding 3 should be a list");
    };
    binding.fixed_range = None;

    let err = document.validate().expect_err("validation should fail");
    assert!(
        err.issues
            .iter()
            .any(|i| i.path == "contract.bindings[3].fixedRange"),
        "unexpected issues: {:?}",
        err.issues
    );
}

#[test]
fn unknown_wire_fields_rejected() {
    let yaml = r#"
spec: mbc
spec_version: "0.1.0"
contract:
  id: x
  name: X
  templatePath: t.xlsx
  templateFileName: t.xlsx
  surprise: true
"#;
    assert!(ContractDocument::from_yaml_str(yaml).is_err());
}

#[test]
fn draft_validates_like_a_contract() {
    let document = load_fixture("monthly_report");
    let draft = markbound_contract::ContractDraft {
        template_path: document.contract.template_path.clone(),
        template_file_name: document.contract.template_file_name.clone(),
        template_checksum: None,
        data_sources: document.contract.data_sources.clone(),
        bindings: document.contract.bindings.clone(),
    };
    draft.validate().expect("draft should validate");

    let mut bad = draft;
    bad.data_sources.clear();
    let err = bad.validate().expect_err("missing sources should fail");
    assert!(
        err.issues
            .iter()
            .any(|i| i.message.contains("unknown data source")),
        "unexpected issues: {:?}",
        err.issues
    );
}
