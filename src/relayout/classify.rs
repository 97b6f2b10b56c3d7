use crate::composite::CompositeModel;
use crate::tonic::manifest::field_entry_name;

/// Extension of depth buffers in Cinema stores and in the converted dataset.
pub const DEPTH_EXTENSION: &str = "im";

/// Where one source artifact goes in the destination directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Depth buffer of `layer`: `<layer>.im`.
    Depth {
        /// Layer index.
        layer: usize,
    },
    /// Field buffer: `<layer>_<field><ext>`.
    Color {
        /// Layer index.
        layer: usize,
        /// Field name.
        field: String,
    },
    /// Luminance buffer of `layer`: `<layer>.luminance`.
    Luminance {
        /// Layer index.
        layer: usize,
    },
}

impl Placement {
    /// Layer index this artifact belongs to.
    pub fn layer(&self) -> usize {
        match self {
            Self::Depth { layer } | Self::Color { layer, .. } | Self::Luminance { layer } => {
                *layer
            }
        }
    }

    /// Destination file name. `color_ext` includes its leading dot (or is empty).
    pub fn file_name(&self, color_ext: &str) -> String {
        match self {
            Self::Depth { layer } => format!("{layer}.{DEPTH_EXTENSION}"),
            Self::Color { layer, field } => {
                format!("{}{color_ext}", field_entry_name(*layer, field))
            }
            Self::Luminance { layer } => format!("{layer}.luminance"),
        }
    }
}

/// Decides where an artifact of a source directory is copied.
///
/// `rel_path` is relative to the enumerated source directory, with `/` separators. An empty
/// result means the file is skipped.
pub trait Classifier: Send + Sync {
    /// Placements for one file, in copy order.
    fn classify(&self, rel_path: &str) -> Vec<Placement>;
}

#[derive(Clone, Debug)]
struct LayerRule {
    index: usize,
    name: String,
    depth_name: String,
    fields: Vec<String>,
}

/// Substring-based classifier compatible with Cinema Spec-B stores.
///
/// Layers and fields are recognized by their names appearing anywhere in the relative path.
#[derive(Clone, Debug)]
pub struct SubstringClassifier {
    layers: Vec<LayerRule>,
    depth_suffix: String,
}

impl SubstringClassifier {
    /// Build matching rules for every layer of `composite`.
    pub fn new(composite: &CompositeModel) -> Self {
        let count = composite.layer_count();
        let layers = composite
            .layers()
            .iter()
            .map(|layer| LayerRule {
                index: layer.index,
                name: layer.name.clone(),
                depth_name: reference_depth_name(&layer.name, count),
                fields: composite.color_fields(layer).map(str::to_string).collect(),
            })
            .collect();
        Self {
            layers,
            depth_suffix: format!(".{DEPTH_EXTENSION}"),
        }
    }
}

/// Rewrite `layer<i>` to `layer0` (first occurrence, `i` from `count - 1` down to `0`).
///
/// Only layer 0 carries a valid depth map, so every layer's depth is looked up under the layer 0
/// name.
pub fn reference_depth_name(name: &str, count: usize) -> String {
    let mut out = name.to_string();
    for i in (0..count).rev() {
        out = out.replacen(&format!("layer{i}"), "layer0", 1);
    }
    out
}

impl Classifier for SubstringClassifier {
    fn classify(&self, rel_path: &str) -> Vec<Placement> {
        let mut out = Vec::new();

        if rel_path.ends_with(&self.depth_suffix) {
            for rule in &self.layers {
                if rel_path.contains(&rule.depth_name) {
                    out.push(Placement::Depth { layer: rule.index });
                }
            }
            return out;
        }

        for rule in self.layers.iter().filter(|p| rel_path.contains(&p.name)) {
            let before = out.len();
            for field in rule.fields.iter().filter(|f| rel_path.contains(f.as_str())) {
                out.push(Placement::Color {
                    layer: rule.index,
                    field: field.clone(),
                });
            }
            if out.len() == before && (rel_path.contains("luminance") || rel_path.contains("lum"))
            {
                out.push(Placement::Luminance { layer: rule.index });
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/relayout/classify.rs"]
mod tests;
