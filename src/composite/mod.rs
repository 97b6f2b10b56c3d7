//! Composite structure: field codes, layers and their colorBy dependencies.
//!
//! [`CompositeBuilder`] owns both code counters. It is fed one colorable argument at a time and
//! frozen into a read-only [`CompositeModel`].

/// Field code assignment.
pub mod fields;
/// Layer derivation from associations.
pub mod layers;

use indexmap::IndexMap;

use crate::cinema::manifest::Association;
use crate::foundation::error::{ConvertError, ConvertResult};
use fields::{FieldEntry, FieldRegistry};
use layers::{Layer, LayerGraph, MergePolicy, derive_identities};

/// Code alphabet shared by fields and layers.
pub const CODE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub(crate) fn code_at(index: usize, what: &'static str) -> ConvertResult<char> {
    CODE_ALPHABET
        .chars()
        .nth(index)
        .ok_or(ConvertError::ExhaustedCodeSpace {
            what,
            limit: CODE_ALPHABET.len(),
        })
}

/// Incremental builder for a [`CompositeModel`].
#[derive(Clone, Debug, Default)]
pub struct CompositeBuilder {
    fields: FieldRegistry,
    layers: LayerGraph,
}

impl CompositeBuilder {
    /// Create a builder using `policy` for repeated layer identities.
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            fields: FieldRegistry::new(),
            layers: LayerGraph::new(policy),
        }
    }

    /// Register one colorable argument: code its fields, then attach the resulting colorBy list
    /// to every layer its association table names.
    ///
    /// Returns the colorBy codes computed for this argument.
    pub fn add_colorable(
        &mut self,
        entries: &[FieldEntry],
        associations: Option<&IndexMap<String, Association>>,
    ) -> ConvertResult<Vec<char>> {
        let codes = self.fields.register(entries)?;
        for (key, association) in associations.into_iter().flatten() {
            for identity in derive_identities(key, association) {
                self.layers.attach(identity, &codes)?;
            }
        }
        Ok(codes)
    }

    /// Freeze the structure.
    pub fn build(self) -> CompositeModel {
        CompositeModel {
            fields: self.fields,
            layers: self.layers.into_layers(),
        }
    }
}

/// Read-only composite structure.
#[derive(Clone, Debug, Default)]
pub struct CompositeModel {
    fields: FieldRegistry,
    layers: Vec<Layer>,
}

impl CompositeModel {
    /// Layers in index order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Field code table.
    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Field names `layer` can be colored by, in colorBy order.
    pub fn color_fields<'a>(&'a self, layer: &'a Layer) -> impl Iterator<Item = &'a str> + 'a {
        layer
            .color_by
            .iter()
            .filter_map(|&code| self.fields.name_of(code))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/builder.rs"]
mod tests;
