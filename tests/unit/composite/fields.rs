use super::*;
use crate::foundation::error::ConvertError;

fn entry(name: &str, ty: &str) -> FieldEntry {
    FieldEntry {
        name: name.to_string(),
        channel: ChannelType::parse(ty),
        range: None,
    }
}

#[test]
fn codes_follow_first_seen_order() {
    let mut reg = FieldRegistry::new();
    let codes = reg
        .register(&[entry("temperature", "value"), entry("pressure", "value")])
        .unwrap();
    assert_eq!(codes, ['A', 'B']);
    assert_eq!(reg.name_of('B'), Some("pressure"));
    assert_eq!(reg.code_of("temperature"), Some('A'));
}

#[test]
fn structural_channels_get_no_code() {
    let mut reg = FieldRegistry::new();
    let codes = reg
        .register(&[
            entry("depth", "depth"),
            entry("lum", "luminance"),
            entry("rgb", "rgb"),
            entry("pressure", "value"),
        ])
        .unwrap();
    assert_eq!(codes, ['A']);
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.code_of("depth"), None);
}

#[test]
fn registration_is_idempotent() {
    let mut reg = FieldRegistry::new();
    let first = reg.register(&[entry("pressure", "value")]).unwrap();
    let second = reg
        .register(&[entry("velocity", "value"), entry("pressure", "value")])
        .unwrap();
    assert_eq!(first, ['A']);
    assert_eq!(second, ['B', 'A']);
    assert_eq!(reg.len(), 2);
}

#[test]
fn ranges_default_to_unit_interval() {
    let mut reg = FieldRegistry::new();
    let mut p = entry("pressure", "value");
    p.range = Some([0.0, 100.0]);
    reg.register(&[p, entry("temperature", "value")]).unwrap();
    assert_eq!(reg.ranges()["pressure"], [0.0, 100.0]);
    assert_eq!(reg.ranges()["temperature"], DEFAULT_RANGE);
}

#[test]
fn first_range_wins_on_reregistration() {
    let mut reg = FieldRegistry::new();
    let mut p = entry("pressure", "value");
    p.range = Some([0.0, 100.0]);
    reg.register(std::slice::from_ref(&p)).unwrap();
    p.range = Some([-1.0, 1.0]);
    reg.register(&[p]).unwrap();
    assert_eq!(reg.ranges()["pressure"], [0.0, 100.0]);
}

#[test]
fn twenty_seventh_field_exhausts_code_space() {
    let mut reg = FieldRegistry::new();
    let entries: Vec<FieldEntry> = (0..26)
        .map(|i| FieldEntry::colorable(format!("f{i}")))
        .collect();
    let codes = reg.register(&entries).unwrap();
    assert_eq!(codes.last(), Some(&'Z'));

    let err = reg.register(&[FieldEntry::colorable("f26")]).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::ExhaustedCodeSpace { limit: 26, .. }
    ));
    // Known fields still resolve after exhaustion.
    assert_eq!(reg.register(&[FieldEntry::colorable("f3")]).unwrap(), ['D']);
}
