//! The `Encoding` external capability (§6): `SerializeToString` /
//! `ParseFromString` over a message's populated field map. `field.encoding_props`
//! lets a custom encoding consult per-field metadata (e.g. a wire key or
//! protobuf field number) without the core knowing about it.

use crate::error::ExternalError;
use base64::{engine::general_purpose::STANDARD, Engine};
use stl_ast::Name;
use stl_model::{MessageResolved, MessageValue, RuntimeValue};
use std::collections::HashMap;

pub trait Encoding: Send + Sync {
    fn serialize(&self, value: &MessageValue, message: &MessageResolved) -> Result<Vec<u8>, ExternalError>;
    fn parse(&self, bytes: &[u8], message: &MessageResolved) -> Result<MessageValue, ExternalError>;
}

/// `Json` — the field map as a JSON object (or array of objects for
/// `is_array` messages), fields keyed by their declared name.
pub struct Json;

impl Encoding for Json {
    fn serialize(&self, value: &MessageValue, message: &MessageResolved) -> Result<Vec<u8>, ExternalError> {
        let json = message_value_to_json(value);
        serde_json::to_vec(&json)
            .map_err(|e| ExternalError::Encode { encoding: "Json".into(), message: message.name.clone(), reason: e.to_string() })
    }

    fn parse(&self, bytes: &[u8], message: &MessageResolved) -> Result<MessageValue, ExternalError> {
        let json: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| ExternalError::Decode { encoding: "Json".into(), message: message.name.clone(), reason: e.to_string() })?;
        json_to_message_value(&json, message.is_array)
            .ok_or_else(|| ExternalError::Decode {
                encoding: "Json".into(),
                message: message.name.clone(),
                reason: "shape did not match message is_array".into(),
            })
    }
}

/// `ri=10,da=dummy_data,br=True` style key/value string, one pair per
/// field separated by commas, using each field's `key` encoding prop
/// (S1: key/value encoding scenario).
pub struct KeyValue;

impl Encoding for KeyValue {
    fn serialize(&self, value: &MessageValue, message: &MessageResolved) -> Result<Vec<u8>, ExternalError> {
        let fields = match (value, &message.body) {
            (MessageValue::Single(map), stl_model::MessageBodyResolved::Declared { fields, .. }) => (map, fields),
            _ => {
                return Err(ExternalError::Encode {
                    encoding: "KeyValue".into(),
                    message: message.name.clone(),
                    reason: "KeyValue only supports single declared messages".into(),
                })
            }
        };
        let (map, decls) = fields;
        let mut parts = Vec::new();
        for decl in decls {
            let key = decl
                .encoding_props
                .iter()
                .find(|(k, _)| &**k == "key")
                .map(|(_, v)| runtime_value_to_plain_string(v))
                .unwrap_or_else(|| decl.name.to_string());
            let Some(v) = map.get(&decl.name) else { continue };
            parts.push(format!("{key}={}", runtime_value_to_kv_string(v)));
        }
        Ok(parts.join(",").into_bytes())
    }

    fn parse(&self, bytes: &[u8], message: &MessageResolved) -> Result<MessageValue, ExternalError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ExternalError::Decode {
            encoding: "KeyValue".into(),
            message: message.name.clone(),
            reason: e.to_string(),
        })?;
        let stl_model::MessageBodyResolved::Declared { fields, .. } = &message.body else {
            return Err(ExternalError::Decode {
                encoding: "KeyValue".into(),
                message: message.name.clone(),
                reason: "external messages have no declared fields to parse into".into(),
            });
        };
        let mut map = HashMap::new();
        for pair in text.split(',').filter(|p| !p.is_empty()) {
            let Some((key, raw)) = pair.split_once('=') else { continue };
            let Some(decl) = fields.iter().find(|f| {
                f.encoding_props.iter().any(|(k, v)| &**k == "key" && runtime_value_to_plain_string(v) == key)
                    || &*f.name == key
            }) else {
                continue;
            };
            map.insert(decl.name.clone(), kv_string_to_runtime_value(raw, &decl.ty));
        }
        Ok(MessageValue::Single(map))
    }
}

/// Raw protobuf wire format, driven entirely by each field's `field_number`
/// encoding prop. Supports the three primitive wire types STL fields carry
/// (varint for `bool`/`int`, length-delimited for `string`).
pub struct Protobuf;

impl Encoding for Protobuf {
    fn serialize(&self, value: &MessageValue, message: &MessageResolved) -> Result<Vec<u8>, ExternalError> {
        let stl_model::MessageBodyResolved::Declared { fields, .. } = &message.body else {
            return Err(ExternalError::Encode {
                encoding: "Protobuf".into(),
                message: message.name.clone(),
                reason: "external descriptors are not supported by the built-in protobuf encoder".into(),
            });
        };
        let MessageValue::Single(map) = value else {
            return Err(ExternalError::Encode {
                encoding: "Protobuf".into(),
                message: message.name.clone(),
                reason: "arrays are not supported by the built-in protobuf encoder".into(),
            });
        };
        let mut out = Vec::new();
        for decl in fields {
            let Some(field_number) = field_number(decl) else { continue };
            let Some(v) = map.get(&decl.name) else { continue };
            encode_field(&mut out, field_number, v);
        }
        Ok(out)
    }

    fn parse(&self, bytes: &[u8], message: &MessageResolved) -> Result<MessageValue, ExternalError> {
        let stl_model::MessageBodyResolved::Declared { fields, .. } = &message.body else {
            return Err(ExternalError::Decode {
                encoding: "Protobuf".into(),
                message: message.name.clone(),
                reason: "external descriptors are not supported by the built-in protobuf decoder".into(),
            });
        };
        let mut map = HashMap::new();
        let mut cursor = bytes;
        while !cursor.is_empty() {
            let (number, wire_type, rest) = decode_tag(cursor).map_err(|reason| ExternalError::Decode {
                encoding: "Protobuf".into(),
                message: message.name.clone(),
                reason,
            })?;
            let Some(decl) = fields.iter().find(|f| field_number(f) == Some(number)) else {
                cursor = skip_field(wire_type, rest).map_err(|reason| ExternalError::Decode {
                    encoding: "Protobuf".into(),
                    message: message.name.clone(),
                    reason,
                })?;
                continue;
            };
            let (value, rest) = decode_field(wire_type, rest, &decl.ty).map_err(|reason| ExternalError::Decode {
                encoding: "Protobuf".into(),
                message: message.name.clone(),
                reason,
            })?;
            map.insert(decl.name.clone(), value);
            cursor = rest;
        }
        Ok(MessageValue::Single(map))
    }
}

/// `Protobuf` wrapped in base64 — the wire bytes are themselves a UTF-8
/// base64 string, for transports that can't carry raw binary.
pub struct ProtobufBase64;

impl Encoding for ProtobufBase64 {
    fn serialize(&self, value: &MessageValue, message: &MessageResolved) -> Result<Vec<u8>, ExternalError> {
        let raw = Protobuf.serialize(value, message)?;
        Ok(STANDARD.encode(raw).into_bytes())
    }

    fn parse(&self, bytes: &[u8], message: &MessageResolved) -> Result<MessageValue, ExternalError> {
        let raw = STANDARD.decode(bytes).map_err(|e| ExternalError::Decode {
            encoding: "ProtobufBase64".into(),
            message: message.name.clone(),
            reason: e.to_string(),
        })?;
        Protobuf.parse(&raw, message)
    }
}

fn field_number(decl: &stl_model::FieldResolved) -> Option<u32> {
    decl.encoding_props.iter().find_map(|(k, v)| {
        if &**k != "field_number" {
            return None;
        }
        match v {
            RuntimeValue::Int(n) => Some(*n as u32),
            _ => None,
        }
    })
}

fn encode_field(out: &mut Vec<u8>, number: u32, value: &RuntimeValue) {
    match value {
        RuntimeValue::Bool(b) => {
            prost::encoding::encode_key(number, prost::encoding::WireType::Varint, out);
            prost::encoding::encode_varint(*b as u64, out);
        }
        RuntimeValue::Int(n) => {
            prost::encoding::encode_key(number, prost::encoding::WireType::Varint, out);
            prost::encoding::encode_varint(zigzag_encode(*n), out);
        }
        RuntimeValue::Str(s) => {
            prost::encoding::encode_key(number, prost::encoding::WireType::LengthDelimited, out);
            prost::encoding::encode_varint(s.len() as u64, out);
            out.extend_from_slice(s.as_bytes());
        }
        _ => {}
    }
}

fn decode_tag(bytes: &[u8]) -> Result<(u32, prost::encoding::WireType, &[u8]), String> {
    let mut cursor = bytes;
    let key = prost::encoding::decode_varint(&mut cursor).map_err(|e| e.to_string())?;
    let number = (key >> 3) as u32;
    let wire_type = prost::encoding::WireType::try_from(key & 0x7).map_err(|e| e.to_string())?;
    Ok((number, wire_type, cursor))
}

fn decode_field<'a>(
    wire_type: prost::encoding::WireType,
    bytes: &'a [u8],
    ty: &stl_ast::FieldType,
) -> Result<(RuntimeValue, &'a [u8]), String> {
    let mut cursor = bytes;
    match wire_type {
        prost::encoding::WireType::Varint => {
            let n = prost::encoding::decode_varint(&mut cursor).map_err(|e| e.to_string())?;
            let value = match ty {
                stl_ast::FieldType::Bool => RuntimeValue::Bool(n != 0),
                _ => RuntimeValue::Int(zigzag_decode(n)),
            };
            Ok((value, cursor))
        }
        prost::encoding::WireType::LengthDelimited => {
            let len = prost::encoding::decode_varint(&mut cursor).map_err(|e| e.to_string())? as usize;
            if cursor.len() < len {
                return Err("truncated length-delimited field".into());
            }
            let s = std::str::from_utf8(&cursor[..len]).map_err(|e| e.to_string())?.to_string();
            Ok((RuntimeValue::Str(s), &cursor[len..]))
        }
        other => Err(format!("unsupported wire type {other:?}")),
    }
}

fn skip_field(wire_type: prost::encoding::WireType, bytes: &[u8]) -> Result<&[u8], String> {
    let mut cursor = bytes;
    match wire_type {
        prost::encoding::WireType::Varint => {
            prost::encoding::decode_varint(&mut cursor).map_err(|e| e.to_string())?;
            Ok(cursor)
        }
        prost::encoding::WireType::LengthDelimited => {
            let len = prost::encoding::decode_varint(&mut cursor).map_err(|e| e.to_string())? as usize;
            if cursor.len() < len {
                return Err("truncated length-delimited field".into());
            }
            Ok(&cursor[len..])
        }
        other => Err(format!("unsupported wire type {other:?}")),
    }
}

fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

fn runtime_value_to_plain_string(v: &RuntimeValue) -> String {
    match v {
        RuntimeValue::Str(s) => s.clone(),
        RuntimeValue::Int(n) => n.to_string(),
        RuntimeValue::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn runtime_value_to_kv_string(v: &RuntimeValue) -> String {
    match v {
        RuntimeValue::Bool(b) => if *b { "True".to_string() } else { "False".to_string() },
        other => runtime_value_to_plain_string(other),
    }
}

fn kv_string_to_runtime_value(raw: &str, ty: &stl_ast::FieldType) -> RuntimeValue {
    match ty {
        stl_ast::FieldType::Bool => RuntimeValue::Bool(raw.eq_ignore_ascii_case("true")),
        stl_ast::FieldType::Int => RuntimeValue::Int(raw.parse().unwrap_or(0)),
        _ => RuntimeValue::Str(raw.to_string()),
    }
}

fn message_value_to_json(value: &MessageValue) -> serde_json::Value {
    match value {
        MessageValue::Single(map) => fields_to_json(map),
        MessageValue::Array(items) => serde_json::Value::Array(items.iter().map(fields_to_json).collect()),
    }
}

fn fields_to_json(map: &HashMap<Name, RuntimeValue>) -> serde_json::Value {
    let obj = map.iter().map(|(k, v)| (k.to_string(), runtime_value_to_json(v))).collect();
    serde_json::Value::Object(obj)
}

fn runtime_value_to_json(v: &RuntimeValue) -> serde_json::Value {
    match v {
        RuntimeValue::Bool(b) => serde_json::Value::Bool(*b),
        RuntimeValue::Int(n) => serde_json::Value::Number((*n).into()),
        RuntimeValue::Str(s) => serde_json::Value::String(s.clone()),
        RuntimeValue::Null => serde_json::Value::Null,
        RuntimeValue::List(items) => serde_json::Value::Array(items.iter().map(runtime_value_to_json).collect()),
        RuntimeValue::Map(map) => fields_to_json(map),
    }
}

fn json_to_message_value(json: &serde_json::Value, is_array: bool) -> Option<MessageValue> {
    match (json, is_array) {
        (serde_json::Value::Object(obj), false) => Some(MessageValue::Single(json_object_to_fields(obj))),
        (serde_json::Value::Array(items), true) => {
            let mut out = Vec::new();
            for item in items {
                let serde_json::Value::Object(obj) = item else { return None };
                out.push(json_object_to_fields(obj));
            }
            Some(MessageValue::Array(out))
        }
        _ => None,
    }
}

fn json_object_to_fields(obj: &serde_json::Map<String, serde_json::Value>) -> HashMap<Name, RuntimeValue> {
    obj.iter().map(|(k, v)| (Name::from(k.as_str()), json_to_runtime_value(v))).collect()
}

fn json_to_runtime_value(v: &serde_json::Value) -> RuntimeValue {
    match v {
        serde_json::Value::Bool(b) => RuntimeValue::Bool(*b),
        serde_json::Value::Number(n) => RuntimeValue::Int(n.as_i64().unwrap_or(0)),
        serde_json::Value::String(s) => RuntimeValue::Str(s.clone()),
        serde_json::Value::Null => RuntimeValue::Null,
        serde_json::Value::Array(items) => RuntimeValue::List(items.iter().map(json_to_runtime_value).collect()),
        serde_json::Value::Object(obj) => RuntimeValue::Map(json_object_to_fields(obj)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_ast::{FieldRule, FieldType};
    use stl_model::MessageBodyResolved;

    fn kv_message() -> MessageResolved {
        MessageResolved {
            name: "Req".into(),
            encode: None,
            is_array: false,
            body: MessageBodyResolved::Declared {
                fields: vec![
                    FieldResolved {
                        name: "request_id".into(),
                        ty: FieldType::Int,
                        rule: FieldRule::required(),
                        encoding_props: vec![("key".into(), RuntimeValue::Str("ri".into()))],
                    },
                    FieldResolved {
                        name: "data".into(),
                        ty: FieldType::String,
                        rule: FieldRule::required(),
                        encoding_props: vec![("key".into(), RuntimeValue::Str("da".into()))],
                    },
                    FieldResolved {
                        name: "broadcast".into(),
                        ty: FieldType::Bool,
                        rule: FieldRule::required(),
                        encoding_props: vec![("key".into(), RuntimeValue::Str("br".into()))],
                    },
                ],
                nested: vec![],
            },
        }
    }

    #[test]
    fn key_value_round_trip_matches_s1() {
        let message = kv_message();
        let mut map = HashMap::new();
        map.insert(Name::from("request_id"), RuntimeValue::Int(10));
        map.insert(Name::from("data"), RuntimeValue::Str("dummy_data".into()));
        map.insert(Name::from("broadcast"), RuntimeValue::Bool(true));
        let value = MessageValue::Single(map);

        let bytes = KeyValue.serialize(&value, &message).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), "ri=10,da=dummy_data,br=True");

        let parsed = KeyValue.parse(&bytes, &message).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn protobuf_round_trips_primitive_fields() {
        let message = MessageResolved {
            name: "Req".into(),
            encode: None,
            is_array: false,
            body: MessageBodyResolved::Declared {
                fields: vec![
                    FieldResolved { name: "a".into(), ty: FieldType::Int, rule: FieldRule::required(), encoding_props: vec![("field_number".into(), RuntimeValue::Int(1))] },
                    FieldResolved { name: "b".into(), ty: FieldType::String, rule: FieldRule::required(), encoding_props: vec![("field_number".into(), RuntimeValue::Int(2))] },
                ],
                nested: vec![],
            },
        };
        let mut map = HashMap::new();
        map.insert(Name::from("a"), RuntimeValue::Int(-5));
        map.insert(Name::from("b"), RuntimeValue::Str("x".into()));
        let value = MessageValue::Single(map);

        let bytes = Protobuf.serialize(&value, &message).unwrap();
        let parsed = Protobuf.parse(&bytes, &message).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn json_round_trips() {
        let message = kv_message();
        let mut map = HashMap::new();
        map.insert(Name::from("request_id"), RuntimeValue::Int(1));
        let value = MessageValue::Single(map);
        let bytes = Json.serialize(&value, &message).unwrap();
        let parsed = Json.parse(&bytes, &message).unwrap();
        assert_eq!(parsed, value);
    }
}
