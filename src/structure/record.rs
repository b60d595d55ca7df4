// Wed Jan 21 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout facts for one member or function.
///
/// Each variant carries exactly the keys downstream tooling expects for its
/// kind, so `numbits`/`bitposition` only ever appear on bitfields and
/// `length` never appears on functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutRecord {
    Field {
        offset: i64,
        length: u64,
    },
    Bitfield {
        offset: i64,
        length: u64,
        bitposition: u32,
        numbits: u64,
    },
    Method {
        offset: u32,
    },
    GlobalFunction {
        offset: u32,
    },
}

impl LayoutRecord {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Field { .. } => "field",
            Self::Bitfield { .. } => "bitfield",
            Self::Method { .. } => "method",
            Self::GlobalFunction { .. } => "globalfunction",
        }
    }

    pub fn offset(&self) -> i64 {
        match *self {
            Self::Field { offset, .. } | Self::Bitfield { offset, .. } => offset,
            Self::Method { offset } | Self::GlobalFunction { offset } => i64::from(offset),
        }
    }

    pub fn length(&self) -> Option<u64> {
        match *self {
            Self::Field { length, .. } | Self::Bitfield { length, .. } => Some(length),
            Self::Method { .. } | Self::GlobalFunction { .. } => None,
        }
    }
}

impl fmt::Display for LayoutRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { offset, length } => write!(f, "field @ 0x{:x} ({} bytes)", offset, length),
            Self::Bitfield { offset, length, bitposition, numbits } => write!(
                f,
                "bitfield @ 0x{:x} ({} bytes) bits {}..{}",
                offset,
                length,
                bitposition,
                u64::from(*bitposition) + numbits
            ),
            Self::Method { offset } => write!(f, "method @ 0x{:x}", offset),
            Self::GlobalFunction { offset } => write!(f, "globalfunction @ 0x{:x}", offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_serializes_without_bit_keys() {
        let value = serde_json::to_value(LayoutRecord::Field { offset: 0, length: 4 }).unwrap();
        assert_eq!(value, json!({ "kind": "field", "offset": 0, "length": 4 }));
    }

    #[test]
    fn test_bitfield_serializes_bit_keys() {
        let record = LayoutRecord::Bitfield { offset: 4, length: 4, bitposition: 4, numbits: 3 };
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(
            value,
            json!({ "kind": "bitfield", "offset": 4, "length": 4, "bitposition": 4, "numbits": 3 })
        );
    }

    #[test]
    fn test_function_kinds_have_no_length() {
        let method = serde_json::to_value(LayoutRecord::Method { offset: 16 }).unwrap();
        assert_eq!(method, json!({ "kind": "method", "offset": 16 }));

        let global = serde_json::to_value(LayoutRecord::GlobalFunction { offset: 0x1000 }).unwrap();
        assert_eq!(global, json!({ "kind": "globalfunction", "offset": 4096 }));
        assert!(LayoutRecord::GlobalFunction { offset: 0 }.length().is_none());
    }

    #[test]
    fn test_display_for_trace_output() {
        let record = LayoutRecord::Bitfield { offset: 4, length: 4, bitposition: 4, numbits: 3 };
        assert_eq!(record.to_string(), "bitfield @ 0x4 (4 bytes) bits 4..7");
        assert_eq!(LayoutRecord::Method { offset: 0x2000 }.to_string(), "method @ 0x2000");
    }

    #[test]
    fn test_deserialize_round_trips_kind_tag() {
        let record: LayoutRecord =
            serde_json::from_str(r#"{"kind":"bitfield","offset":8,"length":2,"bitposition":1,"numbits":5}"#).unwrap();
        assert_eq!(record.kind_name(), "bitfield");
        assert_eq!(record.offset(), 8);
    }
}
