//! The operation model.
//!
//! An operation is an edit against one linear text buffer, expressed as a
//! position plus a kind-specific payload. Operations are plain values:
//! every transform builds new operations and never touches its inputs.
//!
//! Positions and lengths count `char`s, not bytes, so an operation means
//! the same thing regardless of how the buffer encodes its text.
//!
//! On the wire an operation is the record
//!
//! ```text
//! { "kind": "insert" | "delete" | "retain",
//!   "position": 3, "version": 7,
//!   "content": "xy",          // insert only
//!   "length": 2,              // delete only
//!   "attributes": { ... } }   // optional
//! ```
//!
//! Records are validated as they are decoded, so a malformed record never
//! reaches a transform.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::OtError;
use crate::error::Result;

/// Largest position or range end an operation may reach.
/// Keeps every operation representable in the signed wire record.
pub const MAX_POSITION: u64 = i64::MAX as u64;

/// Largest version an operation may carry, for the same reason.
pub const MAX_VERSION: u64 = i64::MAX as u64;

/// Opaque key-value annotations carried by an operation.
///
/// The engine never inspects these. Most operations carry none or one or
/// two formatting marks, so entries live inline, sorted by key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct Attributes {
    entries: SmallVec<[(String, Value); 2]>,
}

impl Attributes {
    /// Create an empty attribute set.
    pub fn new() -> Attributes {
        return Attributes { entries: SmallVec::new() };
    }

    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Look up an attribute by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        return match self.search(key) {
            Ok(index) => Some(&self.entries[index].1),
            Err(_) => None,
        };
    }

    /// Set an attribute, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        return match self.search(&key) {
            Ok(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            Err(index) => {
                self.entries.insert(index, (key, value));
                None
            }
        };
    }

    /// Iterate over attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        return self.entries.iter().map(|(k, v)| (k.as_str(), v));
    }

    fn search(&self, key: &str) -> std::result::Result<usize, usize> {
        return self.entries.binary_search_by(|(k, _)| k.as_str().cmp(key));
    }
}

impl From<BTreeMap<String, Value>> for Attributes {
    fn from(map: BTreeMap<String, Value>) -> Attributes {
        return Attributes { entries: map.into_iter().collect() };
    }
}

impl From<Attributes> for BTreeMap<String, Value> {
    fn from(attributes: Attributes) -> BTreeMap<String, Value> {
        return attributes.entries.into_iter().collect();
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Attributes {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        return attributes;
    }
}

/// What an operation does, with the payload that kind needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpKind {
    /// Insert `content` at the operation's position.
    Insert { content: String },
    /// Remove `length` chars starting at the operation's position.
    Delete { length: u64 },
    /// Advance past text without changing it.
    Retain,
}

impl OpKind {
    /// The wire name of this kind.
    pub fn name(&self) -> &'static str {
        return match self {
            OpKind::Insert { .. } => "insert",
            OpKind::Delete { .. } => "delete",
            OpKind::Retain => "retain",
        };
    }
}

/// A single edit against a text buffer.
///
/// Build one with [`Operation::insert`], [`Operation::delete`] or
/// [`Operation::retain`]; all three validate their arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OperationRecord", into = "OperationRecord")]
pub struct Operation {
    pub(crate) kind: OpKind,
    pub(crate) position: u64,
    pub(crate) version: u64,
    pub(crate) attributes: Attributes,
}

impl Operation {
    /// Create an insert of `content` at `position`.
    ///
    /// Fails if `content` is empty, the inserted range would pass
    /// [`MAX_POSITION`] or `version` is above [`MAX_VERSION`].
    pub fn insert(position: u64, content: impl Into<String>, version: u64) -> Result<Operation> {
        let content = content.into();
        if content.is_empty() {
            return Err(OtError::invalid("insert content is empty"));
        }
        check_range(position, content.chars().count() as u64)?;
        check_version(version)?;
        return Ok(Operation {
            kind: OpKind::Insert { content },
            position,
            version,
            attributes: Attributes::new(),
        });
    }

    /// Create a delete of `length` chars starting at `position`.
    pub fn delete(position: u64, length: u64, version: u64) -> Result<Operation> {
        check_range(position, length)?;
        check_version(version)?;
        return Ok(Operation {
            kind: OpKind::Delete { length },
            position,
            version,
            attributes: Attributes::new(),
        });
    }

    /// Create a retain at `position`.
    pub fn retain(position: u64, version: u64) -> Result<Operation> {
        check_range(position, 0)?;
        check_version(version)?;
        return Ok(Operation {
            kind: OpKind::Retain,
            position,
            version,
            attributes: Attributes::new(),
        });
    }

    /// Replace this operation's attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Operation {
        self.attributes = attributes;
        return self;
    }

    /// Decode and validate one operation from its JSON wire record.
    pub fn from_json(json: &str) -> Result<Operation> {
        let record: OperationRecord = serde_json::from_str(json).map_err(OtError::Decode)?;
        return Operation::try_from(record);
    }

    /// Decode and validate a JSON array of operation records.
    pub fn batch_from_json(json: &str) -> Result<Vec<Operation>> {
        let records: Vec<OperationRecord> = serde_json::from_str(json).map_err(OtError::Decode)?;
        return records.into_iter().map(Operation::try_from).collect();
    }

    pub fn kind(&self) -> &OpKind {
        return &self.kind;
    }

    pub fn position(&self) -> u64 {
        return self.position;
    }

    pub fn version(&self) -> u64 {
        return self.version;
    }

    pub fn attributes(&self) -> &Attributes {
        return &self.attributes;
    }

    /// The inserted text, for inserts.
    pub fn content(&self) -> Option<&str> {
        return match &self.kind {
            OpKind::Insert { content } => Some(content),
            _ => None,
        };
    }

    /// The number of deleted chars, for deletes.
    pub fn length(&self) -> Option<u64> {
        return match &self.kind {
            OpKind::Delete { length } => Some(*length),
            _ => None,
        };
    }

    /// How many chars this operation adds or removes.
    /// Zero for a retain.
    pub fn extent(&self) -> u64 {
        return match &self.kind {
            OpKind::Insert { content } => content.chars().count() as u64,
            OpKind::Delete { length } => *length,
            OpKind::Retain => 0,
        };
    }

    pub fn is_insert(&self) -> bool {
        return matches!(self.kind, OpKind::Insert { .. });
    }

    pub fn is_delete(&self) -> bool {
        return matches!(self.kind, OpKind::Delete { .. });
    }

    pub fn is_retain(&self) -> bool {
        return matches!(self.kind, OpKind::Retain);
    }

    /// A copy of this operation moved to `position`.
    pub(crate) fn moved_to(&self, position: u64) -> Operation {
        return Operation {
            kind: self.kind.clone(),
            position,
            version: self.version,
            attributes: self.attributes.clone(),
        };
    }

    /// A copy of this delete moved to `position` with a new `length`.
    /// Non-deletes are only moved.
    pub(crate) fn resized(&self, position: u64, length: u64) -> Operation {
        let kind = match self.kind {
            OpKind::Delete { .. } => OpKind::Delete { length },
            _ => self.kind.clone(),
        };
        return Operation {
            kind,
            position,
            version: self.version,
            attributes: self.attributes.clone(),
        };
    }

    /// A retain at `position` standing in for this operation.
    pub(crate) fn absorbed_at(&self, position: u64) -> Operation {
        return Operation {
            kind: OpKind::Retain,
            position,
            version: self.version,
            attributes: self.attributes.clone(),
        };
    }
}

fn check_range(position: u64, length: u64) -> Result<()> {
    if position.checked_add(length).is_some_and(|end| end <= MAX_POSITION) {
        return Ok(());
    }
    return Err(OtError::invalid(format!(
        "range {position}+{length} exceeds the maximum position {MAX_POSITION}"
    )));
}

fn check_version(version: u64) -> Result<()> {
    if version <= MAX_VERSION {
        return Ok(());
    }
    return Err(OtError::invalid(format!("version {version} exceeds {MAX_VERSION}")));
}

/// The unvalidated wire form of an operation.
///
/// Integers are signed here so that negative values sent by a client are
/// reported as invalid operations instead of being rejected as bad JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub kind: String,
    pub position: i64,
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<i64>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl TryFrom<OperationRecord> for Operation {
    type Error = OtError;

    fn try_from(record: OperationRecord) -> Result<Operation> {
        if record.position < 0 {
            return Err(OtError::invalid(format!("position {} is negative", record.position)));
        }
        let position = record.position as u64;
        if record.version < 0 {
            return Err(OtError::invalid(format!("version {} is negative", record.version)));
        }
        let version = record.version as u64;

        let op = match record.kind.as_str() {
            "insert" => {
                if record.length.is_some() {
                    return Err(OtError::invalid("insert must not carry a length"));
                }
                let Some(content) = record.content else {
                    return Err(OtError::invalid("insert is missing its content"));
                };
                Operation::insert(position, content, version)?
            }
            "delete" => {
                if record.content.is_some() {
                    return Err(OtError::invalid("delete must not carry content"));
                }
                let Some(length) = record.length else {
                    return Err(OtError::invalid("delete is missing its length"));
                };
                if length < 0 {
                    return Err(OtError::invalid(format!("delete length {length} is negative")));
                }
                Operation::delete(position, length as u64, version)?
            }
            "retain" => {
                if record.content.is_some() || record.length.is_some() {
                    return Err(OtError::invalid("retain must not carry content or a length"));
                }
                Operation::retain(position, version)?
            }
            other => {
                return Err(OtError::invalid(format!("unknown operation kind {other:?}")));
            }
        };

        return Ok(op.with_attributes(record.attributes));
    }
}

impl From<Operation> for OperationRecord {
    fn from(op: Operation) -> OperationRecord {
        let name = op.kind.name().to_string();
        let (content, length) = match op.kind {
            OpKind::Insert { content } => (Some(content), None),
            OpKind::Delete { length } => (None, Some(length as i64)),
            OpKind::Retain => (None, None),
        };
        return OperationRecord {
            kind: name,
            position: op.position as i64,
            version: op.version as i64,
            content,
            length,
            attributes: op.attributes,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_counts_chars_not_bytes() {
        let op = Operation::insert(3, "héllo", 1).unwrap();
        assert_eq!(op.extent(), 5);
        assert_eq!(op.content(), Some("héllo"));
        assert_eq!(op.length(), None);
        assert!(op.is_insert());
    }

    #[test]
    fn empty_insert_is_rejected() {
        let err = Operation::insert(0, "", 1).unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn delete_past_max_position_is_rejected() {
        assert!(Operation::delete(MAX_POSITION, 1, 0).is_err());
        assert!(Operation::delete(u64::MAX, u64::MAX, 0).is_err());
        assert!(Operation::delete(MAX_POSITION - 1, 1, 0).is_ok());
    }

    #[test]
    fn version_past_max_is_rejected() {
        assert!(Operation::insert(0, "x", MAX_VERSION + 1).unwrap_err().is_invalid_operation());
        assert!(Operation::delete(0, 1, u64::MAX).is_err());
        assert!(Operation::retain(0, u64::MAX).is_err());

        let newest = Operation::retain(0, MAX_VERSION).unwrap();
        let wire = serde_json::to_string(&newest).unwrap();
        assert_eq!(Operation::from_json(&wire).unwrap(), newest);
    }

    #[test]
    fn attributes_stay_sorted() {
        let mut attributes = Attributes::new();
        attributes.insert("italic", json!(true));
        attributes.insert("bold", json!(true));
        assert_eq!(attributes.insert("italic", json!(false)), Some(json!(true)));

        let keys: Vec<&str> = attributes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["bold", "italic"]);
        assert_eq!(attributes.get("italic"), Some(&json!(false)));
        assert_eq!(attributes.get("underline"), None);
    }

    #[test]
    fn moved_copy_keeps_payload() {
        let attributes: Attributes = [("bold", json!(true))].into_iter().collect();
        let op = Operation::insert(2, "ab", 9).unwrap().with_attributes(attributes.clone());
        let moved = op.moved_to(7);

        assert_eq!(moved.position(), 7);
        assert_eq!(moved.content(), Some("ab"));
        assert_eq!(moved.version(), 9);
        assert_eq!(moved.attributes(), &attributes);
        assert_eq!(op.position(), 2);
    }

    #[test]
    fn rebuilt_copies_keep_attributes() {
        let attributes: Attributes = [("author", json!("ada")), ("bold", json!(true))].into_iter().collect();
        let insert = Operation::insert(4, "xy", 3).unwrap().with_attributes(attributes.clone());
        let delete = Operation::delete(4, 2, 5).unwrap().with_attributes(attributes.clone());

        let absorbed = insert.absorbed_at(1);
        assert!(absorbed.is_retain());
        assert_eq!(absorbed.position(), 1);
        assert_eq!(absorbed.version(), 3);
        assert_eq!(absorbed.attributes(), &attributes);

        let resized = delete.resized(1, 6);
        assert_eq!(resized.length(), Some(6));
        assert_eq!(resized.version(), 5);
        assert_eq!(resized.attributes(), &attributes);
    }

    #[test]
    fn decode_insert_record() {
        let op = Operation::from_json(
            r#"{"kind":"insert","position":4,"version":2,"content":"hi","attributes":{"bold":true}}"#,
        )
        .unwrap();
        assert_eq!(op.position(), 4);
        assert_eq!(op.content(), Some("hi"));
        assert_eq!(op.attributes().get("bold"), Some(&json!(true)));
    }

    #[test]
    fn decode_rejects_malformed_records() {
        let cases = [
            r#"{"kind":"insert","position":-1,"version":0,"content":"x"}"#,
            r#"{"kind":"delete","position":0,"version":0,"length":-3}"#,
            r#"{"kind":"delete","position":0,"version":0}"#,
            r#"{"kind":"delete","position":0,"version":0,"length":1,"content":"x"}"#,
            r#"{"kind":"insert","position":0,"version":0,"content":""}"#,
            r#"{"kind":"insert","position":0,"version":0,"content":"x","length":1}"#,
            r#"{"kind":"retain","position":0,"version":0,"length":1}"#,
            r#"{"kind":"format","position":0,"version":0}"#,
            r#"{"kind":"delete","position":0,"version":-1,"length":1}"#,
        ];
        for case in cases {
            let err = Operation::from_json(case).unwrap_err();
            assert!(err.is_invalid_operation(), "{case} gave {err}");
        }
    }

    #[test]
    fn decode_rejects_bad_json() {
        let err = Operation::from_json("{not json").unwrap_err();
        assert!(matches!(err, OtError::Decode(_)));
    }

    #[test]
    fn encode_omits_absent_payload() {
        let op = Operation::delete(1, 4, 3).unwrap();
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value, json!({"kind": "delete", "position": 1, "version": 3, "length": 4}));
    }

    #[test]
    fn serde_validates_through_try_from() {
        let result: std::result::Result<Operation, _> =
            serde_json::from_value(json!({"kind": "delete", "position": -2, "version": 0, "length": 1}));
        assert!(result.is_err());
    }
}
