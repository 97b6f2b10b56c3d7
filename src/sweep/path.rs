use std::collections::BTreeMap;

use crate::foundation::error::{ConvertError, ConvertResult};

/// Placeholder name → substituted text.
pub type Bindings = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A path pattern with `{name}` placeholders, e.g. `{phi}/{theta}/{layer}_{field}.png`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse `raw`. Unterminated or empty placeholders are [`ConvertError::MalformedManifest`].
    pub fn parse(raw: &str) -> ConvertResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '{' {
                literal.push(c);
                continue;
            }
            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                match c {
                    '}' => {
                        closed = true;
                        break;
                    }
                    '{' => {
                        return Err(ConvertError::malformed(format!(
                            "nested '{{' in pattern '{raw}'"
                        )));
                    }
                    _ => name.push(c),
                }
            }
            if !closed {
                return Err(ConvertError::malformed(format!(
                    "unterminated placeholder in pattern '{raw}'"
                )));
            }
            if name.is_empty() {
                return Err(ConvertError::malformed(format!(
                    "empty placeholder in pattern '{raw}'"
                )));
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(name));
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Pattern for a directory tree keyed by `names`: `{a}/{b}/`.
    pub fn directories<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut raw = String::new();
        let mut segments = Vec::new();
        for name in names {
            raw.push_str(&format!("{{{name}}}/"));
            segments.push(Segment::Placeholder(name.to_string()));
            segments.push(Segment::Literal("/".to_string()));
        }
        Self { raw, segments }
    }

    /// Original pattern text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in order of appearance (repeats included).
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Text after the last `.` of the file-name part of the pattern, if any.
    pub fn extension(&self) -> Option<&str> {
        let file = self.raw.rsplit('/').next().unwrap_or(&self.raw);
        file.rsplit_once('.').map(|(_, ext)| ext)
    }

    /// Substitute every placeholder. Any unbound placeholder is [`ConvertError::MissingBinding`].
    pub fn resolve(&self, bindings: &Bindings) -> ConvertResult<String> {
        let mut out = String::with_capacity(self.raw.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder(name) => {
                    let value = bindings
                        .get(name)
                        .ok_or_else(|| ConvertError::missing_binding(name, &self.raw))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// Directory part of the pattern that `bindings` can resolve.
    ///
    /// Substitution stops at the first unbound placeholder; the result is cut back to its last
    /// `/` so it never ends inside a file-name template. Returns `""` when no full directory
    /// component resolves.
    pub fn resolve_dir_prefix(&self, bindings: &Bindings) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder(name) => match bindings.get(name) {
                    Some(value) => out.push_str(value),
                    None => break,
                },
            }
        }
        match out.rfind('/') {
            Some(pos) => {
                out.truncate(pos + 1);
                out
            }
            None => String::new(),
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sweep/path.rs"]
mod tests;
