use indexmap::IndexMap;

use super::code_at;
use crate::foundation::error::ConvertResult;

/// Range recorded for a colorable field that does not declare one.
pub const DEFAULT_RANGE: [f64; 2] = [0.0, 1.0];

/// Channel type tag of a field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelType {
    /// Depth buffer.
    Depth,
    /// Lighting/luminance buffer.
    Luminance,
    /// Pre-shaded RGB image.
    Rgb,
    /// Scalar or vector data that can be mapped to color.
    Colorable,
}

impl ChannelType {
    /// Parse a Cinema `types` entry; anything unrecognized is colorable.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "depth" => Self::Depth,
            "luminance" => Self::Luminance,
            "rgb" => Self::Rgb,
            _ => Self::Colorable,
        }
    }

    /// Structural channels never receive a color code.
    pub fn is_structural(self) -> bool {
        !matches!(self, Self::Colorable)
    }
}

/// One field referenced by a colorable argument.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldEntry {
    /// Field name.
    pub name: String,
    /// Channel type.
    pub channel: ChannelType,
    /// Declared value range, if any.
    pub range: Option<[f64; 2]>,
}

impl FieldEntry {
    /// A colorable field without a declared range.
    pub fn colorable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channel: ChannelType::Colorable,
            range: None,
        }
    }
}

/// Code table for colorable fields. Codes are handed out in first-seen order and never change.
#[derive(Clone, Debug, Default)]
pub struct FieldRegistry {
    by_name: IndexMap<String, char>,
    ranges: IndexMap<String, [f64; 2]>,
}

impl FieldRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entries` (already in priority order) and return their color codes.
    ///
    /// Structural channels are skipped. A field seen before contributes its existing code; a new
    /// one takes the next code and records its range.
    pub fn register(&mut self, entries: &[FieldEntry]) -> ConvertResult<Vec<char>> {
        let mut codes = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(&code) = self.by_name.get(&entry.name) {
                codes.push(code);
                continue;
            }
            if entry.channel.is_structural() {
                continue;
            }
            let code = code_at(self.by_name.len(), "colorable fields")?;
            tracing::debug!(field = %entry.name, %code, "assigned field code");
            self.by_name.insert(entry.name.clone(), code);
            self.ranges
                .insert(entry.name.clone(), entry.range.unwrap_or(DEFAULT_RANGE));
            codes.push(code);
        }
        Ok(codes)
    }

    /// Code assigned to `name`.
    pub fn code_of(&self, name: &str) -> Option<char> {
        self.by_name.get(name).copied()
    }

    /// Field name behind `code`.
    pub fn name_of(&self, code: char) -> Option<&str> {
        self.by_name
            .iter()
            .find(|(_, c)| **c == code)
            .map(|(name, _)| name.as_str())
    }

    /// `(code, name)` pairs in assignment order.
    pub fn codes(&self) -> impl Iterator<Item = (char, &str)> {
        self.by_name.iter().map(|(name, code)| (*code, name.as_str()))
    }

    /// Value range per field, in assignment order.
    pub fn ranges(&self) -> &IndexMap<String, [f64; 2]> {
        &self.ranges
    }

    /// Number of coded fields.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Return `true` when no field has a code yet.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/fields.rs"]
mod tests;
