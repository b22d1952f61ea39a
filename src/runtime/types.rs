//! Type references used by method signatures and conversion rules.
//!
//! A [`TypeRef`] is a plain value identifying a type: a primitive kind, an array of some element
//! type, a reference to a class or `void`. Type references are compared structurally, with
//! classes compared by their defining registry and token, which is what signature lookups and
//! reference casts rely on.

use std::{fmt, hash::Hash, sync::Arc};

use strum::{Display, EnumIter};

use crate::runtime::token::Token;

/// Registry origin of the builtin classes, shared by every registry
pub const BUILTIN_ORIGIN: u64 = 0;
/// Token of the universal root class `core.Object`
pub const OBJECT_TOKEN: Token = Token(0x0200_0001);
/// Token of the builtin `core.String` class
pub const STRING_TOKEN: Token = Token(0x0200_0002);

/// The eight primitive kinds a method parameter or return value can have.
///
/// Primitive values are boxed into [`crate::runtime::Value`] when crossing the `invoke`
/// boundary and unboxed into [`crate::runtime::Slot`]s when handed to a method implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveKind {
    /// `true` / `false`
    Boolean,
    /// signed 8-bit integer
    Byte,
    /// UTF-16 code unit
    Char,
    /// signed 16-bit integer
    Short,
    /// signed 32-bit integer
    Int,
    /// signed 64-bit integer
    Long,
    /// 32-bit IEEE float
    Float,
    /// 64-bit IEEE float
    Double,
}

/// Identity of a class or interface: the id of its defining registry and its token, plus the
/// full name for diagnostics.
///
/// Tokens are only unique inside one registry. Equality and hashing consider the origin and the
/// token, never the name.
#[derive(Clone, Debug)]
pub struct ClassRef {
    origin: u64,
    token: Token,
    name: Arc<str>,
}

impl ClassRef {
    /// Create a new class reference
    #[must_use]
    pub fn new(origin: u64, token: Token, name: impl Into<Arc<str>>) -> Self {
        ClassRef {
            origin,
            token,
            name: name.into(),
        }
    }

    /// Id of the registry defining the class, [`BUILTIN_ORIGIN`] for builtins
    #[must_use]
    pub fn origin(&self) -> u64 {
        self.origin
    }

    /// Returns true if this refers to the universal root class
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.origin == BUILTIN_ORIGIN && self.token == OBJECT_TOKEN
    }

    /// The token of the referenced class
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The full name (`namespace.Name`) of the referenced class
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin && self.token == other.token
    }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.origin.hash(state);
        self.token.hash(state);
    }
}

/// A value identifying a type, used for both signature matching and choosing conversion code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// No value, only valid as a return type
    Void,
    /// One of the eight primitive kinds
    Primitive(PrimitiveKind),
    /// Array of the boxed element type
    Array(Box<TypeRef>),
    /// Reference to a class or interface
    Class(ClassRef),
}

impl TypeRef {
    /// `boolean`
    pub const BOOLEAN: TypeRef = TypeRef::Primitive(PrimitiveKind::Boolean);
    /// `byte`
    pub const BYTE: TypeRef = TypeRef::Primitive(PrimitiveKind::Byte);
    /// `char`
    pub const CHAR: TypeRef = TypeRef::Primitive(PrimitiveKind::Char);
    /// `short`
    pub const SHORT: TypeRef = TypeRef::Primitive(PrimitiveKind::Short);
    /// `int`
    pub const INT: TypeRef = TypeRef::Primitive(PrimitiveKind::Int);
    /// `long`
    pub const LONG: TypeRef = TypeRef::Primitive(PrimitiveKind::Long);
    /// `float`
    pub const FLOAT: TypeRef = TypeRef::Primitive(PrimitiveKind::Float);
    /// `double`
    pub const DOUBLE: TypeRef = TypeRef::Primitive(PrimitiveKind::Double);

    /// Reference to the universal root class `core.Object`
    #[must_use]
    pub fn object() -> TypeRef {
        TypeRef::Class(ClassRef::new(BUILTIN_ORIGIN, OBJECT_TOKEN, "core.Object"))
    }

    /// Reference to the builtin `core.String` class
    #[must_use]
    pub fn string() -> TypeRef {
        TypeRef::Class(ClassRef::new(BUILTIN_ORIGIN, STRING_TOKEN, "core.String"))
    }

    /// Array type with the given element type
    #[must_use]
    pub fn array_of(element: TypeRef) -> TypeRef {
        TypeRef::Array(Box::new(element))
    }

    /// Returns the primitive kind, if this is a primitive type
    #[must_use]
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Returns the class reference, if this is a class type
    #[must_use]
    pub fn class(&self) -> Option<&ClassRef> {
        match self {
            TypeRef::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Check if this is `void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Check if this is a primitive kind
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    /// Check if this is an array type
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    /// Check if values of this type are references (class or array)
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeRef::Class(_) | TypeRef::Array(_))
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        TypeRef::Primitive(kind)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "void"),
            TypeRef::Primitive(kind) => write!(f, "{kind}"),
            TypeRef::Array(element) => write!(f, "{element}[]"),
            TypeRef::Class(class) => write!(f, "{}", class.name()),
        }
    }
}
