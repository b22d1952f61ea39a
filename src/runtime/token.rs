use std::fmt;
use std::hash::{Hash, Hasher};

/// A token identifying a class or a method inside a [`crate::runtime::TypeRegistry`].
///
/// Tokens consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table ([`Token::CLASS_TABLE`] or [`Token::METHOD_TABLE`])
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Table byte used for class and interface definitions
    pub const CLASS_TABLE: u8 = 0x02;
    /// Table byte used for method definitions
    pub const METHOD_TABLE: u8 = 0x06;
    /// Largest row index a token can address
    pub const MAX_ROW: u32 = 0x00FF_FFFF;

    /// Creates a token from a table byte and a row index, `row` must not exceed [`Token::MAX_ROW`]
    #[must_use]
    pub(crate) fn from_parts(table: u8, row: u32) -> Self {
        debug_assert!(row <= Self::MAX_ROW);
        Token((u32::from(table) << 24) | row)
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & Self::MAX_ROW
    }

    /// Returns true if the token points into the class table
    #[must_use]
    pub fn is_class(&self) -> bool {
        self.table() == Self::CLASS_TABLE
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_from_parts() {
        let token = Token::from_parts(Token::CLASS_TABLE, 5);
        assert_eq!(token.0, 0x02000005);
        assert!(token.is_class());

        let method = Token::from_parts(Token::METHOD_TABLE, Token::MAX_ROW);
        assert_eq!(method.table(), 0x06);
        assert_eq!(method.row(), 0x00FF_FFFF);
        assert!(!method.is_class());
    }

    #[test]
    fn test_token_table_and_row() {
        let token = Token(0x06000001);
        assert_eq!(token.table(), 0x06);
        assert_eq!(token.row(), 1);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(format!("{}", Token(0x02000003)), "0x02000003");
        let debug_str = format!("{:?}", Token(0x06000001));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_hash() {
        let mut map = HashMap::new();
        map.insert(Token(0x02000001), "Object");
        map.insert(Token(0x02000002), "String");

        assert_eq!(map.get(&Token(0x02000001)), Some(&"Object"));
        assert_eq!(map.get(&Token(0x02000002)), Some(&"String"));
    }
}
