use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::tag::{NbtTag, TagType};

/// A structural mismatch between a schema and a native value, carrying the
/// path within the tree where it occurred.
///
/// Never recovered internally; the conversion aborts at the first mismatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schema mismatch at {path}: {message}")]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl SchemaError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_owned(),
            message: message.into(),
        }
    }
}

/// Closed structural description of a tag tree.
///
/// Replaces runtime type probing: a native value alone cannot distinguish a
/// Byte from a Long, so [`from_value`] takes one of these to pin exact
/// variants, and [`schema_of`] produces the one that reconstructs a tag
/// identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NbtSchema {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List(Box<NbtSchema>),
    Compound(Vec<(String, NbtSchema)>),
    IntArray,
    LongArray,
}

/// Capability for custom types that know their own tag representation.
///
/// Takes precedence over the structural rules: a typed value converts
/// through this trait directly instead of routing through a native
/// container and a schema.
pub trait NbtConvertible: Sized {
    /// Build the tag tree for this value.
    fn to_nbt(&self) -> NbtTag;

    /// Reconstruct the value from a tag tree.
    fn from_nbt(tag: &NbtTag) -> Result<Self, SchemaError>;
}

/// Build a tag tree from a plain nested value: mappings become Compounds,
/// arrays become Lists, primitives become the matching leaves.
///
/// With a schema, numeric width/signedness and array-versus-list choices
/// follow it exactly; without one, generic structural rules apply
/// (bool ⇒ Byte, integer ⇒ Int when it fits else Long, float ⇒ Double).
pub fn from_value(schema: Option<&NbtSchema>, value: &Value) -> Result<NbtTag, SchemaError> {
    convert_value(schema, value, "root")
}

/// Reconstruct the nested native container for a tag tree.
pub fn to_value(tag: &NbtTag) -> Value {
    match tag {
        NbtTag::End => Value::Null,
        NbtTag::Byte(v) => Value::from(*v),
        NbtTag::Short(v) => Value::from(*v),
        NbtTag::Int(v) => Value::from(*v),
        NbtTag::Long(v) => Value::from(*v),
        NbtTag::Float(v) => float_value(f64::from(*v)),
        NbtTag::Double(v) => float_value(*v),
        NbtTag::ByteArray(values) => Value::Array(values.iter().map(|v| Value::from(*v)).collect()),
        NbtTag::String(s) => Value::String(s.clone()),
        NbtTag::List { items, .. } => Value::Array(items.iter().map(to_value).collect()),
        NbtTag::Compound(entries) => {
            let mut object = Map::new();
            for (name, entry) in entries {
                object.insert(name.clone(), to_value(entry));
            }
            Value::Object(object)
        }
        NbtTag::IntArray(values) => Value::Array(values.iter().map(|v| Value::from(*v)).collect()),
        NbtTag::LongArray(values) => Value::Array(values.iter().map(|v| Value::from(*v)).collect()),
    }
}

/// Like [`to_value`], but wraps the result as a single-entry mapping keyed
/// by the tag's name.
pub fn to_named_value(name: &str, tag: &NbtTag) -> Value {
    let mut object = Map::new();
    object.insert(name.to_owned(), to_value(tag));
    Value::Object(object)
}

/// Derive the schema that lets [`from_value`] rebuild `tag` with the exact
/// original variants rather than merely equivalent values.
///
/// End carries no schema; a list's element schema is taken from its first
/// item. An empty list loses its declared element type through the value
/// round trip: a native empty sequence carries no element information, so
/// [`from_value`] always rebuilds it with an End element. The wire forms
/// differ by one byte but decode to the same (empty) contents.
pub fn schema_of(tag: &NbtTag) -> Result<NbtSchema, SchemaError> {
    schema_at(tag, "root")
}

fn schema_at(tag: &NbtTag, path: &str) -> Result<NbtSchema, SchemaError> {
    Ok(match tag {
        NbtTag::End => return Err(SchemaError::new(path, "End tags carry no schema")),
        NbtTag::Byte(_) => NbtSchema::Byte,
        NbtTag::Short(_) => NbtSchema::Short,
        NbtTag::Int(_) => NbtSchema::Int,
        NbtTag::Long(_) => NbtSchema::Long,
        NbtTag::Float(_) => NbtSchema::Float,
        NbtTag::Double(_) => NbtSchema::Double,
        NbtTag::ByteArray(_) => NbtSchema::ByteArray,
        NbtTag::String(_) => NbtSchema::String,
        NbtTag::List { items, .. } => {
            let inner = match items.first() {
                Some(first) => schema_at(first, &format!("{path}[0]"))?,
                None => NbtSchema::Byte,
            };
            NbtSchema::List(Box::new(inner))
        }
        NbtTag::Compound(entries) => {
            let mut fields = Vec::with_capacity(entries.len());
            for (name, entry) in entries {
                fields.push((name.clone(), schema_at(entry, &format!("{path}.{name}"))?));
            }
            NbtSchema::Compound(fields)
        }
        NbtTag::IntArray(_) => NbtSchema::IntArray,
        NbtTag::LongArray(_) => NbtSchema::LongArray,
    })
}

fn convert_value(
    schema: Option<&NbtSchema>,
    value: &Value,
    path: &str,
) -> Result<NbtTag, SchemaError> {
    match schema {
        Some(schema) => convert_with_schema(schema, value, path),
        None => infer_value(value, path),
    }
}

fn convert_with_schema(
    schema: &NbtSchema,
    value: &Value,
    path: &str,
) -> Result<NbtTag, SchemaError> {
    Ok(match schema {
        NbtSchema::Byte => NbtTag::Byte(integer_in_range(value, path, "byte", i64::from(i8::MIN), i64::from(i8::MAX))? as i8),
        NbtSchema::Short => NbtTag::Short(integer_in_range(value, path, "short", i64::from(i16::MIN), i64::from(i16::MAX))? as i16),
        NbtSchema::Int => NbtTag::Int(integer_in_range(value, path, "int", i64::from(i32::MIN), i64::from(i32::MAX))? as i32),
        NbtSchema::Long => NbtTag::Long(integer_in_range(value, path, "long", i64::MIN, i64::MAX)?),
        NbtSchema::Float => NbtTag::Float(float_of(value, path, "float")? as f32),
        NbtSchema::Double => NbtTag::Double(float_of(value, path, "double")?),
        NbtSchema::String => match value.as_str() {
            Some(s) => NbtTag::String(s.to_owned()),
            None => return Err(mismatch(path, "string", value)),
        },
        NbtSchema::ByteArray => {
            let items = array_of(value, path, "byte array")?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let element_path = format!("{path}[{i}]");
                out.push(integer_in_range(item, &element_path, "byte", i64::from(i8::MIN), i64::from(i8::MAX))? as i8);
            }
            NbtTag::ByteArray(out)
        }
        NbtSchema::IntArray => {
            let items = array_of(value, path, "int array")?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let element_path = format!("{path}[{i}]");
                out.push(integer_in_range(item, &element_path, "int", i64::from(i32::MIN), i64::from(i32::MAX))? as i32);
            }
            NbtTag::IntArray(out)
        }
        NbtSchema::LongArray => {
            let items = array_of(value, path, "long array")?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let element_path = format!("{path}[{i}]");
                out.push(integer_in_range(item, &element_path, "long", i64::MIN, i64::MAX)?);
            }
            NbtTag::LongArray(out)
        }
        NbtSchema::List(inner) => {
            let items = array_of(value, path, "list")?;
            let mut tags = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                tags.push(convert_with_schema(inner, item, &format!("{path}[{i}]"))?);
            }
            let element = tags.first().map_or(TagType::End, NbtTag::tag_type);
            NbtTag::List {
                element,
                items: tags,
            }
        }
        NbtSchema::Compound(fields) => {
            let object = match value.as_object() {
                Some(object) => object,
                None => return Err(mismatch(path, "compound", value)),
            };
            let mut entries = Vec::with_capacity(fields.len());
            for (name, field_schema) in fields {
                let field_path = format!("{path}.{name}");
                let field_value = object
                    .get(name)
                    .ok_or_else(|| SchemaError::new(&field_path, "missing key"))?;
                entries.push((
                    name.clone(),
                    convert_with_schema(field_schema, field_value, &field_path)?,
                ));
            }
            if let Some(extra) = object.keys().find(|key| {
                !fields.iter().any(|(name, _)| name == *key)
            }) {
                return Err(SchemaError::new(
                    path,
                    format!("key `{extra}` has no schema entry"),
                ));
            }
            NbtTag::Compound(entries)
        }
    })
}

fn infer_value(value: &Value, path: &str) -> Result<NbtTag, SchemaError> {
    Ok(match value {
        Value::Null => return Err(SchemaError::new(path, "null has no tag representation")),
        Value::Bool(b) => NbtTag::Byte(i8::from(*b)),
        Value::Number(n) => infer_number(n, path)?,
        Value::String(s) => NbtTag::String(s.clone()),
        Value::Array(items) => {
            let mut tags = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                tags.push(infer_value(item, &format!("{path}[{i}]"))?);
            }
            let element = tags.first().map_or(TagType::End, NbtTag::tag_type);
            if let Some(odd) = tags.iter().position(|t| t.tag_type() != element) {
                return Err(SchemaError::new(
                    &format!("{path}[{odd}]"),
                    format!(
                        "list elements must share one type, expected {element:?} found {:?}",
                        tags[odd].tag_type()
                    ),
                ));
            }
            NbtTag::List {
                element,
                items: tags,
            }
        }
        Value::Object(object) => {
            let mut entries = Vec::with_capacity(object.len());
            for (name, item) in object {
                entries.push((name.clone(), infer_value(item, &format!("{path}.{name}"))?));
            }
            NbtTag::Compound(entries)
        }
    })
}

fn infer_number(n: &Number, path: &str) -> Result<NbtTag, SchemaError> {
    if let Some(v) = n.as_i64() {
        return Ok(if i32::try_from(v).is_ok() {
            NbtTag::Int(v as i32)
        } else {
            NbtTag::Long(v)
        });
    }
    match n.as_f64() {
        Some(v) => Ok(NbtTag::Double(v)),
        None => Err(SchemaError::new(path, "number out of representable range")),
    }
}

fn integer_in_range(
    value: &Value,
    path: &str,
    expected: &str,
    min: i64,
    max: i64,
) -> Result<i64, SchemaError> {
    // Booleans are admissible wherever a byte-width integer is expected.
    if let Value::Bool(b) = value {
        return Ok(i64::from(*b));
    }
    let v = value
        .as_i64()
        .ok_or_else(|| mismatch(path, expected, value))?;
    if v < min || v > max {
        return Err(SchemaError::new(
            path,
            format!("value {v} does not fit in a {expected}"),
        ));
    }
    Ok(v)
}

fn float_of(value: &Value, path: &str, expected: &str) -> Result<f64, SchemaError> {
    value
        .as_f64()
        .ok_or_else(|| mismatch(path, expected, value))
}

fn array_of<'v>(
    value: &'v Value,
    path: &str,
    expected: &str,
) -> Result<&'v Vec<Value>, SchemaError> {
    value
        .as_array()
        .ok_or_else(|| mismatch(path, expected, value))
}

fn mismatch(path: &str, expected: &str, found: &Value) -> SchemaError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    SchemaError::new(path, format!("expected {expected}, found {found}"))
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tag() -> NbtTag {
        NbtTag::compound([
            ("name".to_owned(), NbtTag::String("Hermes".to_owned())),
            ("level".to_owned(), NbtTag::Byte(3)),
            ("experience".to_owned(), NbtTag::Long(1)),
            (
                "stats".to_owned(),
                NbtTag::compound([
                    ("health".to_owned(), NbtTag::Float(19.5)),
                    ("ids".to_owned(), NbtTag::IntArray(vec![4, 5, 6])),
                    (
                        "history".to_owned(),
                        NbtTag::list(vec![
                            NbtTag::compound([("tick".to_owned(), NbtTag::Short(7))]),
                            NbtTag::compound([("tick".to_owned(), NbtTag::Short(9))]),
                        ]),
                    ),
                ]),
            ),
        ])
    }

    #[test]
    fn schema_roundtrip_reproduces_exact_variants() {
        let tag = sample_tag();
        let schema = schema_of(&tag).unwrap();
        let rebuilt = from_value(Some(&schema), &to_value(&tag)).unwrap();
        assert_eq!(rebuilt, tag);
    }

    #[test]
    fn without_schema_integers_widen_to_int_or_long() {
        let value = json!({"small": 12, "large": 5_000_000_000i64});
        let tag = from_value(None, &value).unwrap();
        assert_eq!(tag.get("small"), Some(&NbtTag::Int(12)));
        assert_eq!(tag.get("large"), Some(&NbtTag::Long(5_000_000_000)));
    }

    #[test]
    fn schema_disambiguates_numeric_width() {
        let value = json!(12);
        assert_eq!(
            from_value(Some(&NbtSchema::Byte), &value).unwrap(),
            NbtTag::Byte(12)
        );
        assert_eq!(
            from_value(Some(&NbtSchema::Long), &value).unwrap(),
            NbtTag::Long(12)
        );
    }

    #[test]
    fn mismatch_error_carries_the_path() {
        let schema = NbtSchema::Compound(vec![(
            "stats".to_owned(),
            NbtSchema::Compound(vec![(
                "ids".to_owned(),
                NbtSchema::IntArray,
            )]),
        )]);
        let value = json!({"stats": {"ids": [1, "two", 3]}});

        let err = from_value(Some(&schema), &value).unwrap_err();
        assert_eq!(err.path, "root.stats.ids[1]");
    }

    #[test]
    fn list_of_mixed_types_is_rejected_without_schema() {
        let err = from_value(None, &json!([1, "two"])).unwrap_err();
        assert_eq!(err.path, "root[1]");
    }

    #[test]
    fn empty_list_element_type_normalizes_to_end() {
        // A wire-decoded empty list may declare any element type; the value
        // round trip cannot preserve it and settles on End.
        let tag = NbtTag::List {
            element: TagType::Int,
            items: vec![],
        };
        let schema = schema_of(&tag).unwrap();
        let rebuilt = from_value(Some(&schema), &to_value(&tag)).unwrap();
        assert_eq!(
            rebuilt,
            NbtTag::List {
                element: TagType::End,
                items: vec![],
            }
        );
    }

    #[test]
    fn named_value_wraps_in_single_entry_mapping() {
        let tag = NbtTag::Int(30);
        assert_eq!(to_named_value("age", &tag), json!({"age": 30}));
    }

    #[test]
    fn missing_and_extra_compound_keys_are_mismatches() {
        let schema = NbtSchema::Compound(vec![("a".to_owned(), NbtSchema::Int)]);
        assert_eq!(
            from_value(Some(&schema), &json!({})).unwrap_err().path,
            "root.a"
        );
        let err = from_value(Some(&schema), &json!({"a": 1, "b": 2})).unwrap_err();
        assert!(err.message.contains('b'));
    }

    #[test]
    fn value_order_survives_the_roundtrip() {
        let tag = NbtTag::compound([
            ("zeta".to_owned(), NbtTag::Int(1)),
            ("alpha".to_owned(), NbtTag::Int(2)),
        ]);
        let schema = schema_of(&tag).unwrap();
        let rebuilt = from_value(Some(&schema), &to_value(&tag)).unwrap();
        assert_eq!(rebuilt, tag);
    }

    struct Waypoint {
        x: i32,
        z: i32,
    }

    impl NbtConvertible for Waypoint {
        fn to_nbt(&self) -> NbtTag {
            NbtTag::compound([
                ("x".to_owned(), NbtTag::Int(self.x)),
                ("z".to_owned(), NbtTag::Int(self.z)),
            ])
        }

        fn from_nbt(tag: &NbtTag) -> Result<Self, SchemaError> {
            let read = |name: &str| match tag.get(name) {
                Some(NbtTag::Int(v)) => Ok(*v),
                _ => Err(SchemaError::new(&format!("root.{name}"), "expected int")),
            };
            Ok(Self {
                x: read("x")?,
                z: read("z")?,
            })
        }
    }

    #[test]
    fn convertible_types_bypass_structural_rules() {
        let waypoint = Waypoint { x: -3, z: 11 };
        let tag = waypoint.to_nbt();
        let back = Waypoint::from_nbt(&tag).unwrap();
        assert_eq!((back.x, back.z), (-3, 11));
    }
}
