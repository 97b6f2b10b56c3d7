use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cinema::manifest::{ArgumentRole, CinemaManifest};
use crate::composite::CompositeModel;
use crate::sweep::Sweep;
use crate::tonic::argument::TonicArgument;

/// File name of the Tonic dataset manifest.
pub const TONIC_MANIFEST_FILE: &str = "index.json";
/// File name of the handoff manifest for the numeric conversion step.
pub const HANDOFF_MANIFEST_FILE: &str = "convert.json";
/// Dataset type tags of a sorted-composite dataset.
pub const SORTED_COMPOSITE_TYPES: [&str; 3] =
    ["tonic-query-data-model", "sorted-composite", "multi-color-by"];
/// Render size recorded when none is configured.
pub const DEFAULT_DIMENSIONS: [u32; 2] = [500, 500];

/// Tonic dataset manifest (`index.json`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TonicManifest {
    /// Layer/field dependency structure.
    #[serde(rename = "CompositePipeline")]
    pub composite_pipeline: CompositePipeline,
    /// Dataset type tags.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Argument declarations.
    pub arguments: IndexMap<String, TonicArgument>,
    /// Depth-sorted compositing description.
    #[serde(rename = "SortedComposite")]
    pub sorted_composite: SortedComposite,
    /// Artifact categories.
    pub data: Vec<DataEntry>,
    /// Enumerable arguments, outermost directory first.
    pub arguments_order: Vec<String>,
    /// Metadata carried over from the Cinema store.
    pub metadata: IndexMap<String, Value>,
}

/// `CompositePipeline` fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositePipeline {
    /// Layer codes in index order.
    pub layers: Vec<String>,
    /// One entry per layer.
    pub pipeline: Vec<PipelineLayer>,
    /// Layer code → field codes.
    pub layer_fields: IndexMap<String, Vec<String>>,
    /// Field code → field name.
    pub fields: IndexMap<String, String>,
}

/// Layer entry of the composite pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineLayer {
    /// Layer name.
    pub name: String,
    /// Layer codes (always a single code).
    pub ids: Vec<String>,
    /// Grouping key, for list-form associations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// `SortedComposite` fragment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortedComposite {
    /// Always `false` for converted stores.
    #[serde(rename = "reverseCompositePass")]
    pub reverse_composite_pass: bool,
    /// Field name → value range.
    pub ranges: IndexMap<String, [f64; 2]>,
    /// Number of layers.
    pub layers: usize,
    /// Per-layer colorBy entries, in layer index order.
    pub pipeline: Vec<SortedLayer>,
    /// Render width and height.
    pub dimensions: [u32; 2],
    /// Lighting buffers.
    pub light: Vec<String>,
}

/// Per-layer entry of the sorted composite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedLayer {
    /// Layer name.
    pub name: String,
    /// Fields the layer can be colored by.
    #[serde(rename = "colorBy")]
    pub color_by: Vec<ColorBy>,
}

/// One colorBy option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBy {
    /// Always `field`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Field name.
    pub name: String,
}

/// One artifact category of the dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntry {
    /// Path pattern relative to the dataset root.
    pub pattern: String,
    /// Logical type (`array`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Entry name.
    pub name: String,
    /// Query categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl DataEntry {
    /// Fixed lighting buffer entry.
    pub fn intensity(dir_pattern: &str) -> Self {
        Self {
            pattern: format!("{dir_pattern}intensity.uint8"),
            kind: "array".to_string(),
            name: "intensity".to_string(),
            categories: Some(vec!["intensity".to_string()]),
        }
    }

    /// Fixed per-pixel layer order entry.
    pub fn order(dir_pattern: &str) -> Self {
        Self {
            pattern: format!("{dir_pattern}order.uint8"),
            kind: "array".to_string(),
            name: "order".to_string(),
            categories: None,
        }
    }

    /// Entry for the field buffer of `field` on layer `layer`.
    pub fn field(dir_pattern: &str, layer: usize, field: &str) -> Self {
        let name = field_entry_name(layer, field);
        Self {
            pattern: format!("{dir_pattern}{name}.float32"),
            kind: "array".to_string(),
            categories: Some(vec![name.clone()]),
            name,
        }
    }
}

/// Name of the data entry (and artifact stem) for `field` on `layer`: `<layer>_<field>`.
pub fn field_entry_name(layer: usize, field: &str) -> String {
    format!("{layer}_{field}")
}

/// Handoff manifest (`convert.json`) for the numeric conversion step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandoffManifest {
    /// Number of layers.
    pub layers: usize,
    /// Field name → value range.
    pub scalars: IndexMap<String, [f64; 2]>,
    /// Every destination directory, in enumeration order.
    pub directories: Vec<PathBuf>,
}

impl TonicManifest {
    /// Assemble the manifest skeleton: everything except the discovered field entries.
    pub fn assemble(
        cinema: &CinemaManifest,
        sweep: &Sweep,
        composite: &CompositeModel,
        dimensions: [u32; 2],
    ) -> Self {
        let arguments = cinema
            .arguments_with_role(ArgumentRole::Axis)
            .map(|(name, arg)| (name.to_string(), TonicArgument::from_cinema(name, arg)))
            .collect();
        let dir_pattern = sweep.dest_pattern();
        let metadata = cinema
            .metadata
            .iter()
            .filter(|(k, _)| k.as_str() != "type")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            composite_pipeline: composite_pipeline(composite),
            types: SORTED_COMPOSITE_TYPES.iter().map(|s| s.to_string()).collect(),
            arguments,
            sorted_composite: sorted_composite(composite, dimensions),
            data: vec![
                DataEntry::intensity(dir_pattern.as_str()),
                DataEntry::order(dir_pattern.as_str()),
            ],
            arguments_order: sweep.axis_names().map(str::to_string).collect(),
            metadata,
        }
    }

    /// Append a data entry unless one with the same name exists.
    pub fn push_data(&mut self, entry: DataEntry) -> bool {
        if self.data.iter().any(|d| d.name == entry.name) {
            return false;
        }
        self.data.push(entry);
        true
    }

    /// Handoff manifest for `directories`.
    pub fn handoff(&self, directories: Vec<PathBuf>) -> HandoffManifest {
        HandoffManifest {
            layers: self.sorted_composite.layers,
            scalars: self.sorted_composite.ranges.clone(),
            directories,
        }
    }
}

fn composite_pipeline(composite: &CompositeModel) -> CompositePipeline {
    let mut out = CompositePipeline::default();
    for layer in composite.layers() {
        let code = layer.code.to_string();
        out.layers.push(code.clone());
        out.pipeline.push(PipelineLayer {
            name: layer.name.clone(),
            ids: vec![code.clone()],
            parent: layer.parent.clone(),
        });
        out.layer_fields
            .insert(code, layer.color_by.iter().map(char::to_string).collect());
    }
    out.fields = composite
        .fields()
        .codes()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect();
    out
}

fn sorted_composite(composite: &CompositeModel, dimensions: [u32; 2]) -> SortedComposite {
    let pipeline = composite
        .layers()
        .iter()
        .map(|layer| SortedLayer {
            name: layer.name.clone(),
            color_by: composite
                .color_fields(layer)
                .map(|name| ColorBy {
                    kind: "field".to_string(),
                    name: name.to_string(),
                })
                .collect(),
        })
        .collect();
    SortedComposite {
        reverse_composite_pass: false,
        ranges: composite.fields().ranges().clone(),
        layers: composite.layer_count(),
        pipeline,
        dimensions,
        light: vec!["intensity".to_string()],
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tonic/manifest.rs"]
mod tests;
