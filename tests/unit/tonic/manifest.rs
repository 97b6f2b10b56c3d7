use super::*;
use crate::composite::CompositeBuilder;
use crate::composite::layers::MergePolicy;
use crate::sweep::value_label;
use serde_json::json;

fn cinema() -> CinemaManifest {
    serde_json::from_value(json!({
        "name_pattern": "{theta}/{phi}/{vis}/{colorvis}.png",
        "metadata": { "type": "composite-image-stack", "camera": "spherical" },
        "arguments": {
            "theta": { "type": "range", "values": [0, 90, 180], "label": "theta" },
            "phi": { "type": "range", "values": [0, 45] },
            "time": { "values": [3] },
            "colorvis": {
                "isfield": "yes",
                "values": ["depth", "pressure"],
                "types": ["depth", "value"],
                "valueRanges": { "pressure": [0, 100] }
            }
        },
        "associations": { "colorvis": { "vis": ["contour"] } }
    }))
    .unwrap()
}

fn parts(m: &CinemaManifest) -> (Sweep, CompositeModel) {
    let mut sweep = Sweep::new();
    for (name, arg) in m.arguments_with_role(ArgumentRole::Axis) {
        sweep.push_axis(name, arg.values.iter().map(value_label).collect());
    }
    let mut b = CompositeBuilder::new(MergePolicy::FirstWins);
    for (name, arg) in m.arguments_with_role(ArgumentRole::Field) {
        b.add_colorable(&arg.field_entries(), m.associations.get(name))
            .unwrap();
    }
    (sweep, b.build())
}

#[test]
fn skeleton_shape() {
    let m = cinema();
    let (sweep, composite) = parts(&m);
    let t = TonicManifest::assemble(&m, &sweep, &composite, DEFAULT_DIMENSIONS);

    assert_eq!(t.arguments_order, ["theta", "phi"]);
    assert_eq!(
        t.arguments.keys().collect::<Vec<_>>(),
        ["theta", "phi", "time"]
    );
    assert_eq!(t.types, SORTED_COMPOSITE_TYPES);
    assert_eq!(t.sorted_composite.layers, 1);
    assert_eq!(t.sorted_composite.ranges["pressure"], [0.0, 100.0]);
    assert_eq!(t.sorted_composite.pipeline[0].color_by[0].name, "pressure");
    assert_eq!(t.composite_pipeline.layers, ["A"]);
    assert_eq!(t.composite_pipeline.fields["A"], "pressure");
    assert_eq!(t.composite_pipeline.layer_fields["A"], ["A"]);
    assert_eq!(
        t.composite_pipeline.pipeline[0].parent.as_deref(),
        Some("vis")
    );
    assert_eq!(t.data.len(), 2);
    assert_eq!(t.data[0].pattern, "{theta}/{phi}/intensity.uint8");
    assert_eq!(t.data[1].pattern, "{theta}/{phi}/order.uint8");
    assert_eq!(t.metadata.keys().collect::<Vec<_>>(), ["camera"]);
}

#[test]
fn serialized_keys_match_tonic_reader() {
    let m = cinema();
    let (sweep, composite) = parts(&m);
    let t = TonicManifest::assemble(&m, &sweep, &composite, [640, 480]);
    let v = serde_json::to_value(&t).unwrap();

    let top: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        top,
        [
            "CompositePipeline",
            "type",
            "arguments",
            "SortedComposite",
            "data",
            "arguments_order",
            "metadata"
        ]
    );
    assert_eq!(v["SortedComposite"]["reverseCompositePass"], json!(false));
    assert_eq!(v["SortedComposite"]["dimensions"], json!([640, 480]));
    assert_eq!(
        v["SortedComposite"]["pipeline"][0]["colorBy"][0],
        json!({ "type": "field", "name": "pressure" })
    );
    assert!(v["data"][1].get("categories").is_none());
}

#[test]
fn scalar_association_has_no_parent_key() {
    let mut m = cinema();
    m.associations = serde_json::from_value(json!({ "colorvis": { "clip": "ON" } })).unwrap();
    let (sweep, composite) = parts(&m);
    let t = TonicManifest::assemble(&m, &sweep, &composite, DEFAULT_DIMENSIONS);
    let v = serde_json::to_value(&t.composite_pipeline.pipeline[0]).unwrap();
    assert_eq!(v, json!({ "name": "clip=ON", "ids": ["A"] }));
}

#[test]
fn push_data_is_idempotent_by_name() {
    let m = cinema();
    let (sweep, composite) = parts(&m);
    let mut t = TonicManifest::assemble(&m, &sweep, &composite, DEFAULT_DIMENSIONS);
    assert!(t.push_data(DataEntry::field("{theta}/{phi}/", 0, "pressure")));
    assert!(!t.push_data(DataEntry::field("{theta}/{phi}/", 0, "pressure")));
    let last = t.data.last().unwrap();
    assert_eq!(last.name, "0_pressure");
    assert_eq!(last.pattern, "{theta}/{phi}/0_pressure.float32");
    assert_eq!(last.categories.as_deref(), Some(&["0_pressure".to_string()][..]));
}

#[test]
fn handoff_carries_layers_and_ranges() {
    let m = cinema();
    let (sweep, composite) = parts(&m);
    let t = TonicManifest::assemble(&m, &sweep, &composite, DEFAULT_DIMENSIONS);
    let h = t.handoff(vec![PathBuf::from("out/0/0")]);
    assert_eq!(h.layers, 1);
    assert_eq!(h.scalars["pressure"], [0.0, 100.0]);
    assert_eq!(h.directories, [PathBuf::from("out/0/0")]);
}
