use super::*;
use crate::foundation::error::ConvertError;
use serde_json::json;

fn many(values: &[&str]) -> Association {
    Association::Many(values.iter().map(|v| json!(v)).collect())
}

#[test]
fn list_form_uses_bare_values_with_parent() {
    let ids = derive_identities("vis", &many(&["contour", "slice"]));
    assert_eq!(
        ids,
        vec![
            LayerIdentity {
                name: "contour".into(),
                parent: Some("vis".into())
            },
            LayerIdentity {
                name: "slice".into(),
                parent: Some("vis".into())
            },
        ]
    );
}

// The scalar form carries no parent annotation, unlike the list form.
#[test]
fn scalar_form_composes_key_and_value_without_parent() {
    let ids = derive_identities("layer0Clip1", &Association::One(json!("ON")));
    assert_eq!(
        ids,
        vec![LayerIdentity {
            name: "layer0Clip1=ON".into(),
            parent: None
        }]
    );
}

#[test]
fn layers_are_indexed_in_allocation_order() {
    let mut g = LayerGraph::new(MergePolicy::FirstWins);
    for id in derive_identities("vis", &many(&["contour", "slice"])) {
        g.attach(id, &['A']).unwrap();
    }
    let layers = g.layers();
    assert_eq!(layers.len(), 2);
    assert_eq!((layers[0].index, layers[0].code), (0, 'A'));
    assert_eq!((layers[1].index, layers[1].code), (1, 'B'));
    assert_eq!(layers[1].name, "slice");
}

#[test]
fn reattaching_identity_does_not_duplicate() {
    let mut g = LayerGraph::new(MergePolicy::FirstWins);
    let id = LayerIdentity {
        name: "contour".into(),
        parent: Some("vis".into()),
    };
    let a = g.attach(id.clone(), &['A']).unwrap();
    let b = g.attach(id, &['B']).unwrap();
    assert_eq!(a, b);
    assert_eq!(g.layers().len(), 1);
}

#[test]
fn first_wins_keeps_original_color_codes() {
    let mut g = LayerGraph::new(MergePolicy::FirstWins);
    let id = derive_identities("clip", &Association::One(json!("ON"))).remove(0);
    g.attach(id.clone(), &['A']).unwrap();
    g.attach(id, &['B', 'A']).unwrap();
    assert_eq!(g.get("clip=ON").unwrap().color_by, ['A']);
}

#[test]
fn merge_appends_new_color_codes() {
    let mut g = LayerGraph::new(MergePolicy::Merge);
    let id = derive_identities("clip", &Association::One(json!("ON"))).remove(0);
    g.attach(id.clone(), &['A']).unwrap();
    g.attach(id, &['B', 'A']).unwrap();
    assert_eq!(g.get("clip=ON").unwrap().color_by, ['A', 'B']);
    assert_eq!(g.policy(), MergePolicy::Merge);
}

#[test]
fn twenty_seventh_layer_exhausts_code_space() {
    let mut g = LayerGraph::default();
    for i in 0..26 {
        g.attach(
            LayerIdentity {
                name: format!("l{i}"),
                parent: None,
            },
            &[],
        )
        .unwrap();
    }
    let err = g
        .attach(
            LayerIdentity {
                name: "l26".into(),
                parent: None,
            },
            &[],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::ExhaustedCodeSpace { what: "layers", .. }
    ));
}
