use crate::engine::types::ColumnType;

/// How a backend-native value lands in a universal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueEncoding {
    /// Value maps directly onto the column tag.
    Scalar,
    /// Exact numeric decoded as a double (decimal).
    Decimal,
    /// Scalar rendered as text (uuid, inet, varint).
    Stringified,
    /// Collection rendered in the canonical nested encoding.
    Nested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeMapping {
    pub column_type: ColumnType,
    pub encoding: ValueEncoding,
}

impl NativeMapping {
    const fn new(column_type: ColumnType, encoding: ValueEncoding) -> Self {
        Self {
            column_type,
            encoding,
        }
    }
}

/// Translates a native type name into its universal tag.
///
/// Accepts both query-engine spellings (`varchar(25)`, `array(integer)`,
/// `map(varchar, integer)`) and wide-store spellings (`ascii`, `list<int>`,
/// `frozen<set<int>>`). Returns `None` for names it does not know.
pub fn map_native_type(name: &str) -> Option<NativeMapping> {
    use ColumnType::*;
    use ValueEncoding::*;

    let lowered = name.trim().to_ascii_lowercase();
    let base = lowered
        .split(|c: char| c == '(' || c == '<')
        .next()
        .unwrap_or_default()
        .trim();

    let mapping = match base {
        "boolean" | "bool" => NativeMapping::new(Boolean, Scalar),
        "int" | "integer" | "smallint" | "tinyint" => NativeMapping::new(Integer, Scalar),
        "bigint" | "counter" | "long" => NativeMapping::new(Bigint, Scalar),
        "double" => NativeMapping::new(Double, Scalar),
        "decimal" => NativeMapping::new(Double, Decimal),
        "float" | "real" => NativeMapping::new(Real, Scalar),
        "text" | "varchar" | "ascii" | "char" | "string" => NativeMapping::new(Varchar, Scalar),
        "uuid" | "timeuuid" | "inet" | "varint" => NativeMapping::new(Varchar, Stringified),
        "blob" | "varbinary" => NativeMapping::new(Varbinary, Scalar),
        "timestamp" => NativeMapping::new(Timestamp, Scalar),
        "list" | "set" | "map" | "tuple" | "frozen" | "array" | "row" => {
            NativeMapping::new(Varchar, Nested)
        }
        "unknown" => NativeMapping::new(Unknown, Scalar),
        _ => return None,
    };
    Some(mapping)
}
