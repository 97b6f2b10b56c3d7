use super::*;

const STORE: &str = r#"{
  "type": "composite-image-stack",
  "version": "0.2",
  "metadata": { "type": "composite-image-stack", "author": "pv" },
  "name_pattern": "{phi}/{theta}/{vis}/{colorvis}.png",
  "arguments": {
    "phi": { "type": "range", "values": [0, 45], "default": 0, "label": "phi" },
    "theta": { "type": "range", "values": [0, 90, 180], "default": 90, "label": "theta" },
    "vis": { "type": "option", "values": ["contour", "slice"], "islayer": "yes" },
    "colorvis": {
      "type": "option",
      "isfield": "yes",
      "values": ["depth", "pressure", "lum", "temperature"],
      "types": ["depth", "value", "luminance", "value"],
      "valueRanges": { "pressure": [0, 100] }
    }
  },
  "associations": {
    "colorvis": { "vis": ["contour", "slice"] }
  }
}"#;

fn load() -> CinemaManifest {
    CinemaManifest::from_reader(STORE.as_bytes()).unwrap()
}

#[test]
fn parses_and_validates() {
    let m = load();
    m.validate().unwrap();
    assert_eq!(m.store_type.as_deref(), Some("composite-image-stack"));
    assert_eq!(m.arguments.len(), 4);
    assert_eq!(
        m.arguments.keys().collect::<Vec<_>>(),
        ["phi", "theta", "vis", "colorvis"]
    );
}

#[test]
fn roles_follow_flags() {
    let m = load();
    let axes: Vec<&str> = m
        .arguments_with_role(ArgumentRole::Axis)
        .map(|(n, _)| n)
        .collect();
    assert_eq!(axes, ["phi", "theta"]);
    assert_eq!(m.arguments["vis"].role(), ArgumentRole::Layer);
    assert_eq!(m.arguments["colorvis"].role(), ArgumentRole::Field);
}

#[test]
fn flag_strings_no_and_false_are_unset() {
    let arg: CinemaArgument =
        serde_json::from_str(r#"{ "values": [1, 2], "isfield": "no", "islayer": false }"#)
            .unwrap();
    assert_eq!(arg.role(), ArgumentRole::Axis);
}

#[test]
fn field_entries_come_last_declared_first() {
    let m = load();
    let entries = m.arguments["colorvis"].field_entries();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["temperature", "lum", "pressure", "depth"]);
    assert_eq!(entries[1].channel, ChannelType::Luminance);
    assert_eq!(entries[2].range, Some([0.0, 100.0]));
    assert_eq!(entries[0].range, None);
}

#[test]
fn association_forms_deserialize() {
    let m = load();
    assert_eq!(
        m.associations["colorvis"]["vis"],
        Association::Many(vec![
            Value::String("contour".into()),
            Value::String("slice".into())
        ])
    );
    let one: Association = serde_json::from_str(r#""ON""#).unwrap();
    assert_eq!(one, Association::One(Value::String("ON".into())));
}

#[test]
fn field_types_must_match_values() {
    let mut m = load();
    m.arguments
        .get_mut("colorvis")
        .unwrap()
        .types
        .truncate(2);
    assert!(matches!(
        m.validate(),
        Err(ConvertError::MalformedManifest(_))
    ));
}

#[test]
fn nested_association_is_rejected() {
    let mut m = load();
    m.associations
        .get_mut("colorvis")
        .unwrap()
        .insert("vis".into(), Association::One(serde_json::json!({ "a": 1 })));
    assert!(matches!(
        m.validate(),
        Err(ConvertError::MalformedManifest(_))
    ));
}

#[test]
fn missing_name_pattern_is_malformed() {
    let err = CinemaManifest::from_reader(r#"{ "arguments": {} }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, ConvertError::MalformedManifest(_)));
}

#[test]
fn from_store_reads_info_json() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join(CINEMA_MANIFEST_FILE), STORE).unwrap();
    let m = CinemaManifest::from_store(dir.path()).unwrap();
    assert_eq!(m.name_pattern, "{phi}/{theta}/{vis}/{colorvis}.png");

    let missing = CinemaManifest::from_store(dir.path().join("nope")).unwrap_err();
    assert!(matches!(missing, ConvertError::Io { .. }));
}
