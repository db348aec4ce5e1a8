//! Ordered field streams used to persist a scene.
//!
//! A scene is written as a sequence of named entries: a count, then an array
//! holding the flat field list of every record of one kind. Readers consume
//! entries in the order they were written.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SceneError;

/// One scalar in a field list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    I32(i32),
    I64(i64),
    F32(f32),
    Bool(bool),
    Str(String),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::I32(_) => "i32",
            FieldValue::I64(_) => "i64",
            FieldValue::F32(_) => "f32",
            FieldValue::Bool(_) => "bool",
            FieldValue::Str(_) => "string",
        }
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::I32(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::I64(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::F32(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

/// Sink for scene data.
pub trait SceneWriter {
    fn write_count(&mut self, name: &str, count: i32);
    fn begin_array(&mut self, name: &str);
    /// Appends to the array opened by the last [`begin_array`](Self::begin_array).
    fn write_item(&mut self, value: FieldValue);
    fn end_array(&mut self);
}

/// Source of scene data. Entries must be consumed in write order.
pub trait SceneReader {
    fn read_count(&mut self, name: &str) -> Result<i32, SceneError>;
    fn begin_array(&mut self, name: &str) -> Result<(), SceneError>;
    fn read_item(&mut self) -> Result<FieldValue, SceneError>;
    /// Items left in the open array, 0 when none is open.
    fn items_remaining(&self) -> usize;
    /// Closes the current array. Fails if items are left unread.
    fn end_array(&mut self) -> Result<(), SceneError>;

    fn read_i32(&mut self) -> Result<i32, SceneError> {
        match self.read_item()? {
            FieldValue::I32(v) => Ok(v),
            other => Err(mismatch("i32", &other)),
        }
    }

    fn read_i64(&mut self) -> Result<i64, SceneError> {
        match self.read_item()? {
            FieldValue::I64(v) => Ok(v),
            other => Err(mismatch("i64", &other)),
        }
    }

    fn read_f32(&mut self) -> Result<f32, SceneError> {
        match self.read_item()? {
            FieldValue::F32(v) => Ok(v),
            other => Err(mismatch("f32", &other)),
        }
    }

    fn read_bool(&mut self) -> Result<bool, SceneError> {
        match self.read_item()? {
            FieldValue::Bool(v) => Ok(v),
            other => Err(mismatch("bool", &other)),
        }
    }

    fn read_string(&mut self) -> Result<String, SceneError> {
        match self.read_item()? {
            FieldValue::Str(v) => Ok(v),
            other => Err(mismatch("string", &other)),
        }
    }
}

fn mismatch(expected: &'static str, found: &FieldValue) -> SceneError {
    SceneError::FieldType {
        expected,
        found: found.type_name(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum Entry {
    Count { name: String, value: i32 },
    Array { name: String, items: Vec<FieldValue> },
}

/// In-memory field stream, persisted as RON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStream {
    entries: Vec<Entry>,
}

impl FieldStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the first count entry called `name`.
    pub fn count(&self, name: &str) -> Option<i32> {
        self.entries.iter().find_map(|e| match e {
            Entry::Count { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    /// Items of the first array entry called `name`.
    pub fn array(&self, name: &str) -> Option<&[FieldValue]> {
        self.entries.iter().find_map(|e| match e {
            Entry::Array { name: n, items } if n == name => Some(items.as_slice()),
            _ => None,
        })
    }

    /// Mutable items of the first array entry called `name`.
    pub fn array_mut(&mut self, name: &str) -> Option<&mut Vec<FieldValue>> {
        self.entries.iter_mut().find_map(|e| match e {
            Entry::Array { name: n, items } if n == name => Some(items),
            _ => None,
        })
    }

    /// Starts reading from the first entry.
    pub fn cursor(&self) -> FieldCursor<'_> {
        FieldCursor {
            entries: &self.entries,
            next: 0,
            array: None,
        }
    }

    pub fn to_ron(&self) -> Result<String, SceneError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, pretty).map_err(SceneError::SerializeError)
    }

    pub fn from_ron(contents: &str) -> Result<Self, SceneError> {
        ron::from_str(contents).map_err(SceneError::ParseError)
    }

    /// Writes the stream to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SceneError::WriteError)?;
        }
        std::fs::write(path, self.to_ron()?).map_err(SceneError::WriteError)?;
        tracing::info!("Saved scene to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let contents = std::fs::read_to_string(path).map_err(SceneError::ReadError)?;
        let stream = Self::from_ron(&contents)?;
        tracing::info!("Loaded scene from {}", path.display());
        Ok(stream)
    }
}

impl SceneWriter for FieldStream {
    fn write_count(&mut self, name: &str, count: i32) {
        self.entries.push(Entry::Count {
            name: name.to_string(),
            value: count,
        });
    }

    fn begin_array(&mut self, name: &str) {
        self.entries.push(Entry::Array {
            name: name.to_string(),
            items: Vec::new(),
        });
    }

    fn write_item(&mut self, value: FieldValue) {
        match self.entries.last_mut() {
            Some(Entry::Array { items, .. }) => items.push(value),
            _ => tracing::warn!("Scene item written outside of an array, dropped"),
        }
    }

    fn end_array(&mut self) {}
}

/// Sequential reader over a [`FieldStream`].
#[derive(Debug)]
pub struct FieldCursor<'a> {
    entries: &'a [Entry],
    next: usize,
    array: Option<(&'a str, std::slice::Iter<'a, FieldValue>)>,
}

impl FieldCursor<'_> {
    /// Entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.next
    }
}

impl SceneReader for FieldCursor<'_> {
    fn read_count(&mut self, name: &str) -> Result<i32, SceneError> {
        match self.entries.get(self.next) {
            Some(Entry::Count { name: n, value }) if n == name => {
                self.next += 1;
                Ok(*value)
            }
            _ => Err(SceneError::MissingEntry(name.to_string())),
        }
    }

    fn begin_array(&mut self, name: &str) -> Result<(), SceneError> {
        match self.entries.get(self.next) {
            Some(Entry::Array { name: n, items }) if n == name => {
                self.next += 1;
                self.array = Some((n.as_str(), items.iter()));
                Ok(())
            }
            _ => Err(SceneError::MissingEntry(name.to_string())),
        }
    }

    fn read_item(&mut self) -> Result<FieldValue, SceneError> {
        let Some((name, items)) = self.array.as_mut() else {
            return Err(SceneError::UnexpectedEnd(String::new()));
        };
        items
            .next()
            .cloned()
            .ok_or_else(|| SceneError::UnexpectedEnd(name.to_string()))
    }

    fn items_remaining(&self) -> usize {
        self.array.as_ref().map_or(0, |(_, items)| items.len())
    }

    fn end_array(&mut self) -> Result<(), SceneError> {
        match self.array.take() {
            Some((name, items)) if items.len() > 0 => Err(SceneError::TrailingItems {
                name: name.to_string(),
                remaining: items.len(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FieldStream {
        let mut stream = FieldStream::new();
        stream.write_count("light_count", 1);
        stream.begin_array("lights");
        stream.write_item(3.into());
        stream.write_item(0.into());
        stream.end_array();
        stream
    }

    #[test]
    fn test_read_in_order() {
        let stream = sample();
        let mut cursor = stream.cursor();
        assert_eq!(cursor.read_count("light_count").unwrap(), 1);
        cursor.begin_array("lights").unwrap();
        assert_eq!(cursor.read_i32().unwrap(), 3);
        assert_eq!(cursor.read_i32().unwrap(), 0);
        cursor.end_array().unwrap();
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_missing_entry() {
        let stream = sample();
        let mut cursor = stream.cursor();
        assert!(matches!(
            cursor.read_count("camera_count"),
            Err(SceneError::MissingEntry(name)) if name == "camera_count"
        ));
    }

    #[test]
    fn test_wrong_field_type() {
        let stream = sample();
        let mut cursor = stream.cursor();
        cursor.read_count("light_count").unwrap();
        cursor.begin_array("lights").unwrap();
        assert!(matches!(
            cursor.read_f32(),
            Err(SceneError::FieldType {
                expected: "f32",
                found: "i32"
            })
        ));
    }

    #[test]
    fn test_short_and_long_arrays() {
        let stream = sample();
        let mut cursor = stream.cursor();
        cursor.read_count("light_count").unwrap();
        cursor.begin_array("lights").unwrap();
        cursor.read_item().unwrap();
        assert!(matches!(
            cursor.end_array(),
            Err(SceneError::TrailingItems { remaining: 1, .. })
        ));

        let mut cursor = stream.cursor();
        cursor.read_count("light_count").unwrap();
        cursor.begin_array("lights").unwrap();
        assert_eq!(cursor.items_remaining(), 2);
        cursor.read_item().unwrap();
        cursor.read_item().unwrap();
        assert_eq!(cursor.items_remaining(), 0);
        assert!(matches!(cursor.read_item(), Err(SceneError::UnexpectedEnd(_))));
    }

    #[test]
    fn test_ron_round_trip() {
        let mut stream = sample();
        stream.write_count("names", 1);
        stream.begin_array("strings");
        stream.write_item("main".into());
        stream.write_item(true.into());
        stream.write_item(1.5f32.into());
        stream.write_item(7i64.into());
        stream.end_array();

        let ron = stream.to_ron().unwrap();
        assert_eq!(FieldStream::from_ron(&ron).unwrap(), stream);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenes").join("level.ron");
        let stream = sample();
        stream.save(&path).unwrap();
        assert_eq!(FieldStream::load(&path).unwrap(), stream);
    }

    #[test]
    fn test_load_garbage_fails() {
        assert!(matches!(
            FieldStream::from_ron("{{not ron"),
            Err(SceneError::ParseError(_))
        ));
    }
}
