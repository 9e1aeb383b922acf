//! File type filters and their per-backend encodings.
//!
//! A [`FilterSpec`] describes which files an open dialog should offer. Every
//! shape is first normalized into an ordered list of [`FilterGroup`]s, and each
//! backend then renders that same logical structure with its own delimiters:
//!
//! | Backend     | Encoding                                        |
//! |-------------|-------------------------------------------------|
//! | `kdialog`   | `"PDF-Files (*.pdf) \| Scripts (*.py *.md)"`    |
//! | `zenity`    | one `--file-filter=Scripts \| *.py *.md` each   |
//! | `win32`     | `"Scripts\0*.py;*.md\0...\0\0"`                  |
//! | `osascript` | `{"pdf", "py", "md"}` (extensions only)         |
//!
//! The AppleScript bridge only understands bare extensions. Patterns that are
//! not of the form `*.<ext>` are dropped there, along with labels and grouping.
//!
//! # Example
//!
//! ```
//! use horizon_filedialog::filter::{FilterSpec, LabeledFilters};
//!
//! let filter: FilterSpec = LabeledFilters::new()
//!     .entry("PDF-Files", "*.pdf")
//!     .entry("Scripts", ["*.py", "*.md"])
//!     .into();
//!
//! assert_eq!(
//!     filter.to_kdialog().unwrap(),
//!     "PDF-Files (*.pdf) | Scripts (*.py *.md)"
//! );
//! ```

use serde_json::Value;

use crate::backend::BackendKind;
use crate::error::{DialogError, Result};

/// Caller-supplied description of the file types to offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    /// A single wildcard pattern, e.g. `"*.txt"`.
    Pattern(String),
    /// Patterns OR'd together into one filter choice.
    Patterns(Vec<String>),
    /// One filter choice per inner list.
    Groups(Vec<Vec<String>>),
    /// One labeled filter choice per entry, in order.
    Labeled(Vec<(String, Vec<String>)>),
}

/// One selectable entry of a dialog's filter dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroup {
    /// Label shown to the user, if any.
    pub label: Option<String>,
    /// Wildcard patterns matched by this entry.
    pub patterns: Vec<String>,
}

impl FilterGroup {
    fn unlabeled(patterns: Vec<String>) -> Self {
        Self {
            label: None,
            patterns,
        }
    }
}

/// A filter rendered for one particular backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedFilter {
    /// A single `" | "`-delimited argument (kdialog).
    Delimited(String),
    /// One command-line argument per group (zenity).
    Arguments(Vec<String>),
    /// Null-separated label/pattern pairs, double-null terminated (Win32).
    NullSeparated(String),
    /// Bare file extensions (AppleScript).
    Extensions(Vec<String>),
}

/// Conversion into a pattern list, so labeled entries accept either a single
/// pattern or several.
pub trait IntoPatterns {
    /// Convert into an ordered list of patterns.
    fn into_patterns(self) -> Vec<String>;
}

impl IntoPatterns for &str {
    fn into_patterns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoPatterns for String {
    fn into_patterns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoPatterns for Vec<String> {
    fn into_patterns(self) -> Vec<String> {
        self
    }
}

impl IntoPatterns for Vec<&str> {
    fn into_patterns(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoPatterns for &[&str] {
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_string()).collect()
    }
}

impl<const N: usize> IntoPatterns for [&str; N] {
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_string()).collect()
    }
}

/// Builder for [`FilterSpec::Labeled`].
#[derive(Debug, Clone, Default)]
pub struct LabeledFilters {
    entries: Vec<(String, Vec<String>)>,
}

impl LabeledFilters {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a labeled entry.
    pub fn entry(mut self, label: impl Into<String>, patterns: impl IntoPatterns) -> Self {
        self.entries.push((label.into(), patterns.into_patterns()));
        self
    }

    /// Finish building.
    pub fn build(self) -> FilterSpec {
        FilterSpec::Labeled(self.entries)
    }
}

impl From<LabeledFilters> for FilterSpec {
    fn from(builder: LabeledFilters) -> Self {
        builder.build()
    }
}

impl From<&str> for FilterSpec {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_string())
    }
}

impl From<String> for FilterSpec {
    fn from(pattern: String) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<Vec<String>> for FilterSpec {
    fn from(patterns: Vec<String>) -> Self {
        Self::Patterns(patterns)
    }
}

impl From<Vec<&str>> for FilterSpec {
    fn from(patterns: Vec<&str>) -> Self {
        Self::Patterns(patterns.into_patterns())
    }
}

impl FilterSpec {
    /// A single wildcard pattern.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern(pattern.into())
    }

    /// Several patterns shown as one filter choice.
    pub fn patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Patterns(patterns.into_iter().map(Into::into).collect())
    }

    /// Several filter choices, each a list of patterns.
    pub fn groups<I, G, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Groups(
            groups
                .into_iter()
                .map(|g| g.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Parse a loosely-typed filter description.
    ///
    /// Accepts a string, an array of strings, an array of string arrays, or an
    /// object mapping labels to a string or an array of strings. `null`, an
    /// empty string, an empty array and an empty object all mean "no filter".
    pub fn from_json(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::Array(items) if items.is_empty() => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            _ => Self::try_from(value).map(Some),
        }
    }

    /// Normalize into filter groups, validating the contents.
    pub fn to_groups(&self) -> Result<Vec<FilterGroup>> {
        let groups = match self {
            Self::Pattern(pattern) => vec![FilterGroup::unlabeled(vec![pattern.clone()])],
            Self::Patterns(patterns) => vec![FilterGroup::unlabeled(patterns.clone())],
            Self::Groups(groups) => {
                if groups.is_empty() {
                    return Err(DialogError::invalid_filter("empty list of filter groups"));
                }
                groups
                    .iter()
                    .map(|g| FilterGroup::unlabeled(g.clone()))
                    .collect()
            }
            Self::Labeled(entries) => {
                if entries.is_empty() {
                    return Err(DialogError::invalid_filter("empty labeled filter"));
                }
                let mut groups = Vec::with_capacity(entries.len());
                for (label, patterns) in entries {
                    if label.trim().is_empty() {
                        return Err(DialogError::invalid_filter("empty filter label"));
                    }
                    groups.push(FilterGroup {
                        label: Some(label.clone()),
                        patterns: patterns.clone(),
                    });
                }
                groups
            }
        };

        for group in &groups {
            if group.patterns.is_empty() {
                return Err(DialogError::invalid_filter("filter group without patterns"));
            }
            if group.patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(DialogError::invalid_filter("empty wildcard pattern"));
            }
        }

        Ok(groups)
    }

    /// Encode for the given backend.
    pub fn encode(&self, backend: BackendKind) -> Result<EncodedFilter> {
        let groups = self.to_groups()?;
        Ok(match backend {
            BackendKind::KDialog => EncodedFilter::Delimited(encode_kdialog(&groups)),
            BackendKind::Zenity => EncodedFilter::Arguments(encode_zenity(&groups)),
            BackendKind::Win32 => EncodedFilter::NullSeparated(encode_win32(&groups)),
            BackendKind::Osascript => EncodedFilter::Extensions(encode_extensions(&groups)),
        })
    }

    /// Render as a kdialog filter argument.
    pub fn to_kdialog(&self) -> Result<String> {
        Ok(encode_kdialog(&self.to_groups()?))
    }

    /// Render as zenity `--file-filter=` arguments.
    pub fn to_zenity(&self) -> Result<Vec<String>> {
        Ok(encode_zenity(&self.to_groups()?))
    }

    /// Render as a Win32 `lpstrFilter` buffer.
    pub fn to_win32(&self) -> Result<String> {
        Ok(encode_win32(&self.to_groups()?))
    }

    /// Render as the extension list understood by AppleScript's `of type`.
    pub fn to_extensions(&self) -> Result<Vec<String>> {
        Ok(encode_extensions(&self.to_groups()?))
    }
}

impl TryFrom<&Value> for FilterSpec {
    type Error = DialogError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(pattern) => Ok(Self::Pattern(pattern.clone())),
            Value::Array(items) => match items.first() {
                None => Err(DialogError::invalid_filter("empty filter list")),
                Some(Value::String(_)) => Ok(Self::Patterns(string_list(items)?)),
                Some(Value::Array(_)) => {
                    let mut groups = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::Array(inner) => groups.push(string_list(inner)?),
                            _ => {
                                return Err(DialogError::invalid_filter(
                                    "list mixes patterns and nested lists",
                                ));
                            }
                        }
                    }
                    Ok(Self::Groups(groups))
                }
                Some(other) => Err(DialogError::invalid_filter(format!(
                    "first list element must be a pattern or a list, got {}",
                    json_type(other)
                ))),
            },
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (label, value) in map {
                    let patterns = match value {
                        Value::String(pattern) => vec![pattern.clone()],
                        Value::Array(items) => string_list(items)?,
                        other => {
                            return Err(DialogError::invalid_filter(format!(
                                "patterns for '{label}' must be a string or a list, got {}",
                                json_type(other)
                            )));
                        }
                    };
                    entries.push((label.clone(), patterns));
                }
                Ok(Self::Labeled(entries))
            }
            other => Err(DialogError::invalid_filter(format!(
                "unsupported filter type {}",
                json_type(other)
            ))),
        }
    }
}

impl TryFrom<Value> for FilterSpec {
    type Error = DialogError;

    fn try_from(value: Value) -> Result<Self> {
        Self::try_from(&value)
    }
}

fn string_list(items: &[Value]) -> Result<Vec<String>> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Array(_) => Err(DialogError::invalid_filter(
                "list mixes patterns and nested lists",
            )),
            other => Err(DialogError::invalid_filter(format!(
                "expected a pattern, got {}",
                json_type(other)
            ))),
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// `"Label (p1 p2) | p3 p4"`
pub fn encode_kdialog(groups: &[FilterGroup]) -> String {
    groups
        .iter()
        .map(|group| {
            let patterns = group.patterns.join(" ");
            match &group.label {
                Some(label) => format!("{label} ({patterns})"),
                None => patterns,
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// One `--file-filter=` argument per group.
pub fn encode_zenity(groups: &[FilterGroup]) -> Vec<String> {
    groups
        .iter()
        .map(|group| {
            let patterns = group.patterns.join(" ");
            match &group.label {
                Some(label) => format!("--file-filter={label} | {patterns}"),
                None => format!("--file-filter={patterns}"),
            }
        })
        .collect()
}

/// `label\0p1;p2\0` for each group followed by a terminating `\0`.
///
/// Unlabeled groups show their pattern list as the label.
pub fn encode_win32(groups: &[FilterGroup]) -> String {
    let mut buffer = String::new();
    for group in groups {
        let patterns = group.patterns.join(";");
        buffer.push_str(group.label.as_deref().unwrap_or(&patterns));
        buffer.push('\0');
        buffer.push_str(&patterns);
        buffer.push('\0');
    }
    buffer.push('\0');
    buffer
}

/// Extensions of every `*.<ext>` pattern, in order, without duplicates.
pub fn encode_extensions(groups: &[FilterGroup]) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::new();
    for pattern in groups.iter().flat_map(|g| g.patterns.iter()) {
        if let Some(ext) = bare_extension(pattern)
            && !extensions.iter().any(|e| e == ext)
        {
            extensions.push(ext.to_string());
        }
    }
    extensions
}

fn bare_extension(pattern: &str) -> Option<&str> {
    let ext = pattern.strip_prefix("*.")?;
    if ext.is_empty() || ext.contains(['*', '?', '[', ']']) {
        None
    } else {
        Some(ext)
    }
}
