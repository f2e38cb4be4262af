//! Language-agnostic parameter tree fed into the argument marshaller.

/// One node of a parameter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamTree {
    /// A numeric leaf, carried as its source text (conversion happens in
    /// the marshaller so that "unparseable" can fall back to zero per the
    /// documented rule rather than failing construction).
    Numeric(String),
    /// A boolean leaf, carried as its source text; matched case-insensitively.
    Boolean(String),
    /// An explicit null leaf.
    Null,
    /// A string leaf.
    String(String),
    /// An ordered composite of child nodes.
    Composite(Vec<ParamTree>),
}

/// The converted form of a [`ParamTree`] node, per the `ConvertArgument`
/// rules. An intermediate representation between the raw tree and the
/// bytes the script builder emits.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedArgument {
    /// A composite whose children were all numeric bytes (0-255).
    ByteArray(Vec<u8>),
    /// Any other composite, recursively converted.
    List(Vec<ConvertedArgument>),
    BigInteger(num_bigint::BigInt),
    Boolean(bool),
    Null,
    String(String),
}

/// Applies the `ConvertArgument` rules to a single tree node.
pub fn convert_argument(node: &ParamTree) -> ConvertedArgument {
    match node {
        ParamTree::Composite(children) => {
            if !children.is_empty() && children.iter().all(is_numeric_byte) {
                let bytes = children
                    .iter()
                    .map(|c| match c {
                        ParamTree::Numeric(text) => parse_numeric_text(text) as u8,
                        _ => unreachable!("checked by is_numeric_byte"),
                    })
                    .collect();
                ConvertedArgument::ByteArray(bytes)
            } else {
                ConvertedArgument::List(children.iter().map(convert_argument).collect())
            }
        }
        ParamTree::Numeric(text) => ConvertedArgument::BigInteger(num_bigint::BigInt::from(parse_numeric_text(text))),
        ParamTree::Boolean(text) => ConvertedArgument::Boolean(text.eq_ignore_ascii_case("true")),
        ParamTree::Null => ConvertedArgument::Null,
        ParamTree::String(text) => {
            if let Some(hex) = text.strip_prefix("0x") {
                match decode_hex(hex) {
                    Some(bytes) => ConvertedArgument::ByteArray(bytes),
                    // Odd-length hex after "0x" is explicitly unspecified
                    // upstream; this core treats it as an empty byte array
                    // rather than failing the whole conversion.
                    None => ConvertedArgument::ByteArray(Vec::new()),
                }
            } else {
                ConvertedArgument::String(text.clone())
            }
        }
    }
}

fn is_numeric_byte(node: &ParamTree) -> bool {
    match node {
        ParamTree::Numeric(text) => (0..=255).contains(&parse_numeric_text(text)),
        _ => false,
    }
}

fn parse_numeric_text(text: &str) -> i64 {
    text.trim().parse::<i64>().unwrap_or(0)
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    hex::decode(hex).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_byte_composite_becomes_byte_array() {
        let tree = ParamTree::Composite(vec![
            ParamTree::Numeric("10".into()),
            ParamTree::Numeric("20".into()),
            ParamTree::Numeric("30".into()),
        ]);
        assert_eq!(
            convert_argument(&tree),
            ConvertedArgument::ByteArray(vec![10, 20, 30])
        );
    }

    #[test]
    fn unparseable_numeric_falls_back_to_zero() {
        let tree = ParamTree::Numeric("not-a-number".into());
        assert_eq!(
            convert_argument(&tree),
            ConvertedArgument::BigInteger(num_bigint::BigInt::from(0))
        );
    }

    #[test]
    fn hex_string_decodes_to_bytes() {
        let tree = ParamTree::String("0x0a1420".into());
        assert_eq!(
            convert_argument(&tree),
            ConvertedArgument::ByteArray(vec![0x0a, 0x14, 0x20])
        );
    }

    #[test]
    fn mixed_composite_becomes_list() {
        let tree = ParamTree::Composite(vec![
            ParamTree::Numeric("5".into()),
            ParamTree::String("hi".into()),
        ]);
        match convert_argument(&tree) {
            ConvertedArgument::List(items) => assert_eq!(items.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }
}
