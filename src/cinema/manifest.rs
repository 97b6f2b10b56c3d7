use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::composite::fields::{ChannelType, FieldEntry};
use crate::foundation::error::{ConvertError, ConvertResult};

/// File name of the manifest inside a Cinema store.
pub const CINEMA_MANIFEST_FILE: &str = "info.json";

/// Cinema store manifest (`info.json`).
///
/// Map fields keep their document order: code assignment and layer numbering depend on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CinemaManifest {
    /// Artifact path pattern, e.g. `{phi}/{theta}/{vis}/{field}.png`.
    pub name_pattern: String,
    /// Parameter axes, fields and layers by argument name.
    pub arguments: IndexMap<String, CinemaArgument>,
    /// Per colorable argument: association key → layer qualifier(s).
    #[serde(default)]
    pub associations: IndexMap<String, IndexMap<String, Association>>,
    /// Free-form metadata (`type` names the store layout).
    #[serde(default)]
    pub metadata: IndexMap<String, Value>,
    /// Store type tag.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub store_type: Option<String>,
    /// Store format version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One Cinema argument: a parameter axis, a colorable field selector, or a layer selector.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CinemaArgument {
    /// Discrete values.
    #[serde(default)]
    pub values: Vec<Value>,
    /// UI hint (`range` or `list`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ui_type: Option<String>,
    /// Default value (one of `values`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Channel type per value (field arguments only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    /// Marks a field argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isfield: Option<Value>,
    /// Marks a layer argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub islayer: Option<Value>,
    /// Per-field value range.
    #[serde(
        default,
        rename = "valueRanges",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub value_ranges: IndexMap<String, [f64; 2]>,
}

/// What an argument contributes to the conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgumentRole {
    /// A parameter axis enumerated into directories.
    Axis,
    /// A colorable field selector.
    Field,
    /// A layer selector; resolved through associations rather than enumerated.
    Layer,
}

/// Right-hand side of an association entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Association {
    /// List form: every value names a layer and the key becomes its parent.
    Many(Vec<Value>),
    /// Scalar form: the layer is named `key=value`.
    One(Value),
}

impl CinemaArgument {
    /// Classify the argument. `isfield` takes precedence over `islayer`.
    pub fn role(&self) -> ArgumentRole {
        if flag_set(self.isfield.as_ref()) {
            ArgumentRole::Field
        } else if flag_set(self.islayer.as_ref()) {
            ArgumentRole::Layer
        } else {
            ArgumentRole::Axis
        }
    }

    /// Field entries in declining priority (last declared first).
    ///
    /// Only meaningful for [`ArgumentRole::Field`] arguments that passed validation.
    pub fn field_entries(&self) -> Vec<FieldEntry> {
        self.values
            .iter()
            .zip(&self.types)
            .rev()
            .map(|(value, ty)| {
                let name = value.as_str().map(str::to_string).unwrap_or_default();
                let range = self.value_ranges.get(&name).copied();
                FieldEntry {
                    name,
                    channel: ChannelType::parse(ty),
                    range,
                }
            })
            .collect()
    }
}

// Flags are written as booleans or "yes"-style strings depending on the producer.
fn flag_set(flag: Option<&Value>) -> bool {
    match flag {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => {
            !matches!(s.to_ascii_lowercase().as_str(), "" | "no" | "false" | "0")
        }
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

impl CinemaManifest {
    /// Parse a manifest from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ConvertResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ConvertError::malformed(format!("parse Cinema manifest JSON: {e}")))
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| ConvertError::io(path, e))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse `info.json` from a Cinema store directory.
    pub fn from_store(dir: impl AsRef<Path>) -> ConvertResult<Self> {
        Self::from_path(dir.as_ref().join(CINEMA_MANIFEST_FILE))
    }

    /// Arguments of the given role, in document order.
    pub fn arguments_with_role(
        &self,
        role: ArgumentRole,
    ) -> impl Iterator<Item = (&str, &CinemaArgument)> {
        self.arguments
            .iter()
            .filter(move |(_, arg)| arg.role() == role)
            .map(|(name, arg)| (name.as_str(), arg))
    }

    /// Check the structural invariants the conversion relies on.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.name_pattern.trim().is_empty() {
            return Err(ConvertError::malformed("name_pattern is empty"));
        }
        if self.arguments.is_empty() {
            return Err(ConvertError::malformed("arguments table is empty"));
        }

        for (name, arg) in &self.arguments {
            match arg.role() {
                ArgumentRole::Field => validate_field(name, arg)?,
                ArgumentRole::Axis | ArgumentRole::Layer => {
                    if let Some(bad) = arg.values.iter().find(|v| !is_scalar(v)) {
                        return Err(ConvertError::malformed(format!(
                            "argument '{name}' has non-scalar value {bad}"
                        )));
                    }
                }
            }
        }

        for (colorable, table) in &self.associations {
            for (key, assoc) in table {
                let ok = match assoc {
                    Association::One(v) => is_scalar(v),
                    Association::Many(vs) => vs.iter().all(is_scalar),
                };
                if !ok {
                    return Err(ConvertError::malformed(format!(
                        "association '{colorable}.{key}' must be a scalar or a list of scalars"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn validate_field(name: &str, arg: &CinemaArgument) -> ConvertResult<()> {
    if arg.types.len() != arg.values.len() {
        return Err(ConvertError::malformed(format!(
            "field argument '{name}' declares {} values but {} types",
            arg.values.len(),
            arg.types.len()
        )));
    }
    if let Some(bad) = arg.values.iter().find(|v| !v.is_string()) {
        return Err(ConvertError::malformed(format!(
            "field argument '{name}' has non-string field name {bad}"
        )));
    }
    for (field, range) in &arg.value_ranges {
        if !(range[0].is_finite() && range[1].is_finite()) {
            return Err(ConvertError::malformed(format!(
                "field '{field}' of '{name}' has a non-finite value range"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/cinema/manifest.rs"]
mod tests;
