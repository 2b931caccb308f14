use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{error::FieldError, events::FieldPath};

pub type Assignment = (FieldPath, Value);

/// A structured pipeline event: a JSON object addressed by [`FieldPath`]s.
///
/// The id only correlates log lines; it is not part of the serialized form.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    id: Uuid,
    fields: Map<String, Value>,
}

impl Event {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
        }
    }

    pub fn from_value(value: Value) -> anyhow::Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(anyhow::anyhow!(
                "expected a JSON object, got={}",
                value_kind(&other)
            )),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let mut segments = path.segments().iter();
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.get(path).is_some()
    }

    /// Writes `value` at `path`, creating missing intermediate objects.
    ///
    /// Fails without modifying the event when an existing intermediate
    /// field is not an object.
    pub fn set(&mut self, path: &FieldPath, value: Value) -> Result<(), FieldError> {
        self.check_writable(path)?;

        let mut current = &mut self.fields;
        for (depth, segment) in path.parents().iter().enumerate() {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match slot {
                Value::Object(map) => map,
                _ => return Err(FieldError::not_an_object(path, depth + 1)),
            };
        }
        current.insert(path.leaf().to_string(), value);
        Ok(())
    }

    /// Writes every assignment, or none of them if any path is unwritable.
    pub fn apply(&mut self, assignments: Vec<Assignment>) -> Result<(), FieldError> {
        for (path, _) in &assignments {
            self.check_writable(path)?;
        }
        for (path, value) in assignments {
            self.set(&path, value)?;
        }
        Ok(())
    }

    fn check_writable(&self, path: &FieldPath) -> Result<(), FieldError> {
        let mut current = &self.fields;
        for (depth, segment) in path.parents().iter().enumerate() {
            match current.get(segment) {
                None => return Ok(()),
                Some(Value::Object(map)) => current = map,
                Some(_) => return Err(FieldError::not_an_object(path, depth + 1)),
            }
        }
        Ok(())
    }
}

impl From<Map<String, Value>> for Event {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::new)
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
