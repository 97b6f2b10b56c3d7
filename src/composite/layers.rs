use std::collections::HashMap;

use super::code_at;
use crate::cinema::manifest::Association;
use crate::foundation::error::ConvertResult;
use crate::sweep::value_label;

/// What happens to the colorBy list when a layer identity is reached a second time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep the codes from the first association that created the layer.
    #[default]
    FirstWins,
    /// Append codes not already present on the layer.
    Merge,
}

/// Layer name derived from one association entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerIdentity {
    /// Unique layer name.
    pub name: String,
    /// Grouping key; only set for the list form.
    pub parent: Option<String>,
}

/// Derive layer identities from `key: association`.
///
/// The list form names each layer by its bare value with `key` as parent; the scalar form names
/// a single layer `key=value` with no parent.
pub fn derive_identities(key: &str, association: &Association) -> Vec<LayerIdentity> {
    match association {
        Association::Many(values) => values
            .iter()
            .map(|v| LayerIdentity {
                name: value_label(v),
                parent: Some(key.to_string()),
            })
            .collect(),
        Association::One(value) => vec![LayerIdentity {
            name: format!("{key}={}", value_label(value)),
            parent: None,
        }],
    }
}

/// A composite layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    /// Unique name; also the substring searched for in artifact paths.
    pub name: String,
    /// 0-based allocation index.
    pub index: usize,
    /// Single-letter layer code.
    pub code: char,
    /// Grouping key for list-form associations.
    pub parent: Option<String>,
    /// Field codes this layer can be colored by, in order.
    pub color_by: Vec<char>,
}

/// Ordered set of layers keyed by identity.
#[derive(Clone, Debug, Default)]
pub struct LayerGraph {
    policy: MergePolicy,
    layers: Vec<Layer>,
    by_name: HashMap<String, usize>,
}

impl LayerGraph {
    /// Create an empty graph with the given merge policy.
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Attach `codes` to the layer named by `identity`, creating it on first sight.
    ///
    /// Returns the layer index. A known identity is looked up, never duplicated.
    pub fn attach(&mut self, identity: LayerIdentity, codes: &[char]) -> ConvertResult<usize> {
        if let Some(&idx) = self.by_name.get(&identity.name) {
            if self.policy == MergePolicy::Merge {
                let layer = &mut self.layers[idx];
                for &code in codes {
                    if !layer.color_by.contains(&code) {
                        layer.color_by.push(code);
                    }
                }
            }
            return Ok(idx);
        }

        let index = self.layers.len();
        let code = code_at(index, "layers")?;
        tracing::debug!(layer = %identity.name, index, %code, "allocated layer");
        self.by_name.insert(identity.name.clone(), index);
        self.layers.push(Layer {
            name: identity.name,
            index,
            code,
            parent: identity.parent,
            color_by: codes.to_vec(),
        });
        Ok(index)
    }

    /// Layer named `name`.
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.by_name.get(name).map(|&idx| &self.layers[idx])
    }

    /// Layers in allocation order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Merge policy in effect.
    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub(crate) fn into_layers(self) -> Vec<Layer> {
        self.layers
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/layers.rs"]
mod tests;
