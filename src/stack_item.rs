//! Stack item value type.
//!
//! The debugger only needs to classify and display values, not implement
//! the full arithmetic/compound semantics of the production VM, so this is
//! a deliberately small sum type matching the emulator's data model rather
//! than the production interpreter's `StackItem` hierarchy.

use num_bigint::BigInt;

/// A value living on the VM's evaluation stack, alt stack, or surfaced to
/// the debugger as a variable's current value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum StackItem {
    /// A UTF-8 string.
    String(String),
    /// A boolean.
    Boolean(bool),
    /// An arbitrary-precision signed integer.
    Integer(BigInt),
    /// An ordered, possibly heterogeneous array.
    Array(Vec<StackItem>),
    /// Raw bytes.
    ByteArray(Vec<u8>),
    /// A value whose shape could not be classified into one of the above;
    /// genuinely distinct from absence of a value.
    Unknown,
}

impl StackItem {
    /// Convenience constructor for an integer from any type convertible to `BigInt`.
    pub fn from_int<T: Into<BigInt>>(value: T) -> Self {
        StackItem::Integer(value.into())
    }

    /// Returns the integer value, if this item holds one.
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            StackItem::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the byte representation used when this item needs to be
    /// treated as raw bytes (e.g. hashing, storage values).
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            StackItem::ByteArray(b) => b.clone(),
            StackItem::String(s) => s.as_bytes().to_vec(),
            StackItem::Boolean(b) => vec![if *b { 1 } else { 0 }],
            StackItem::Integer(i) => i.to_signed_bytes_le(),
            StackItem::Array(_) | StackItem::Unknown => Vec::new(),
        }
    }

    /// A short human-readable type name, used for variable-type display.
    pub fn type_name(&self) -> &'static str {
        match self {
            StackItem::String(_) => "String",
            StackItem::Boolean(_) => "Boolean",
            StackItem::Integer(_) => "Integer",
            StackItem::Array(_) => "Array",
            StackItem::ByteArray(_) => "ByteArray",
            StackItem::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trips_through_bytes() {
        let item = StackItem::from_int(42i64);
        assert_eq!(item.as_int(), Some(&BigInt::from(42)));
    }

    #[test]
    fn type_name_matches_variant() {
        assert_eq!(StackItem::Boolean(true).type_name(), "Boolean");
        assert_eq!(StackItem::Unknown.type_name(), "Unknown");
    }

    #[cfg(feature = "serde-types")]
    #[test]
    fn serializes_to_json_and_back_for_a_debugger_ui() {
        let item = StackItem::Array(vec![StackItem::from_int(10), StackItem::ByteArray(vec![1, 2])]);
        let json = serde_json::to_string(&item).unwrap();
        let round_tripped: StackItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, round_tripped);
    }
}
