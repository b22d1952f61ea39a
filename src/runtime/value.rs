//! Runtime value representation.
//!
//! Two representations exist side by side:
//!
//! | Representation | Used for | Primitive encoding |
//! |----------------|----------|--------------------|
//! | [`Value`] | the `invoke` boundary (arguments, results, receivers) | boxed, tagged with its exact kind |
//! | [`Slot`] | the calling convention of method implementations | unboxed, widened to its computational type |
//!
//! `boolean`, `byte`, `char`, `short` and `int` all travel as [`Slot::I32`], the same way an
//! evaluation stack widens small integers. The conversion rules chosen when a dispatcher is
//! built are what move a value from one representation to the other.

use std::{
    any::Any,
    fmt,
    sync::{Arc, RwLock},
};

use crate::runtime::{
    builtins,
    class::ClassRc,
    types::{ClassRef, TypeRef},
};

/// Reference to a heap object
pub type ObjectRef = Arc<Object>;
/// Reference to a heap array
pub type ArrayRef = Arc<Array>;

/// An instance of a class: the class it belongs to plus an opaque Rust payload.
///
/// The payload is what native method implementations operate on; objects with mutable state
/// use interior mutability inside their payload.
pub struct Object {
    class: ClassRc,
    payload: Box<dyn Any + Send + Sync>,
}

impl Object {
    /// Allocate a new instance of `class` carrying `payload`
    pub fn new<T: Any + Send + Sync>(class: &ClassRc, payload: T) -> ObjectRef {
        Arc::new(Object {
            class: class.clone(),
            payload: Box::new(payload),
        })
    }

    /// The runtime class of this object
    #[must_use]
    pub fn class(&self) -> &ClassRc {
        &self.class
    }

    /// Access the payload as `T`, if it has that type
    #[must_use]
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Returns the string payload if this is a `core.String` instance
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.downcast::<String>().map(String::as_str)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => write!(f, "{:?}", text),
            None => write!(f, "{}@{:p}", self.class.fullname(), self),
        }
    }
}

/// A fixed-length array with a declared element type.
pub struct Array {
    element: TypeRef,
    items: RwLock<Vec<Value>>,
}

impl Array {
    /// Allocate a new array holding `items`
    #[must_use]
    pub fn new(element: TypeRef, items: Vec<Value>) -> ArrayRef {
        Arc::new(Array {
            element,
            items: RwLock::new(items),
        })
    }

    /// The declared element type
    #[must_use]
    pub fn element(&self) -> &TypeRef {
        &self.element
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        read_lock!(self.items).len()
    }

    /// Returns true if the array has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        read_lock!(self.items).is_empty()
    }

    /// Element at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        read_lock!(self.items).get(index).cloned()
    }

    /// Replace the element at `index`, returns false if out of bounds
    pub fn set(&self, index: usize, value: Value) -> bool {
        match write_lock!(self.items).get_mut(index) {
            Some(item) => {
                *item = value;
                true
            }
            None => false,
        }
    }

    /// Copy of all elements
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        read_lock!(self.items).clone()
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[]", self.element)?;
        f.debug_list().entries(read_lock!(self.items).iter()).finish()
    }
}

/// A boxed value as seen by callers of a dispatcher.
///
/// Floating point values compare bitwise, so a `NaN` that went through a call compares equal to
/// itself. Strings compare by content, every other object by identity.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The null reference, also the result of `void` methods
    #[default]
    Null,
    /// Boxed `boolean`
    Boolean(bool),
    /// Boxed `byte`
    Byte(i8),
    /// Boxed `char` (UTF-16 code unit)
    Char(u16),
    /// Boxed `short`
    Short(i16),
    /// Boxed `int`
    Int(i32),
    /// Boxed `long`
    Long(i64),
    /// Boxed `float`
    Float(f32),
    /// Boxed `double`
    Double(f64),
    /// Reference to a class instance
    Object(ObjectRef),
    /// Reference to an array
    Array(ArrayRef),
}

impl Value {
    /// Returns true for [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string content if this value is a `core.String` instance
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Object(object) => object.as_str(),
            _ => None,
        }
    }

    /// Returns the object reference, if this is an object
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the array reference, if this is an array
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Checks whether this value may be passed where a reference of type `ty` is expected.
    ///
    /// `null` is accepted by every reference type. Objects must be instances of the class or
    /// one of its subtypes. Arrays are accepted by `core.Object`, by an array type with an
    /// identical element type, and by `core.Object[]` when their elements are references.
    /// Boxed primitives are never references.
    #[must_use]
    pub fn is_instance_of(&self, ty: &TypeRef) -> bool {
        match (self, ty) {
            (Value::Null, TypeRef::Class(_) | TypeRef::Array(_)) => true,
            (Value::Object(object), TypeRef::Class(class)) => {
                object.class().is_subtype_of(class)
            }
            (Value::Array(_), TypeRef::Class(class)) => class.is_root(),
            (Value::Array(array), TypeRef::Array(element)) => {
                array.element() == element.as_ref()
                    || (array.element().is_reference()
                        && element
                            .class()
                            .is_some_and(ClassRef::is_root))
            }
            _ => false,
        }
    }

    /// Human readable runtime type of the value, used in diagnostics
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(_) => "boolean".to_string(),
            Value::Byte(_) => "byte".to_string(),
            Value::Char(_) => "char".to_string(),
            Value::Short(_) => "short".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Long(_) => "long".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Double(_) => "double".to_string(),
            Value::Object(object) => object.class().fullname(),
            Value::Array(array) => format!("{}[]", array.element()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Object(a), Value::Object(b)) => {
                Arc::ptr_eq(a, b) || matches!((a.as_str(), b.as_str()), (Some(x), Some(y)) if x == y)
            }
            (Value::Array(a), Value::Array(b)) => {
                Arc::ptr_eq(a, b) || (a.element() == b.element() && a.to_vec() == b.to_vec())
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Byte(value)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Char(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Short(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::from(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Object(Object::new(builtins::string_class(), value))
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl From<ArrayRef> for Value {
    fn from(value: ArrayRef) -> Self {
        Value::Array(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// An unboxed value in the calling convention of method implementations.
#[derive(Clone, Debug)]
pub enum Slot {
    /// Result of a `void` method
    Void,
    /// `boolean`, `byte`, `char`, `short` and `int`
    I32(i32),
    /// `long`
    I64(i64),
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
    /// The null reference
    Null,
    /// Reference to a class instance
    Object(ObjectRef),
    /// Reference to an array
    Array(ArrayRef),
}

impl Slot {
    /// Short name of the computational type held by this slot
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Slot::Void => "void",
            Slot::I32(_) => "i32",
            Slot::I64(_) => "i64",
            Slot::F32(_) => "f32",
            Slot::F64(_) => "f64",
            Slot::Null => "null",
            Slot::Object(_) => "object",
            Slot::Array(_) => "array",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::types::PrimitiveKind;

    #[test]
    fn test_string_values_compare_by_content() {
        let a = Value::from("hello");
        let b = Value::from(String::from("hello"));

        assert_eq!(a, b);
        assert_ne!(a, Value::from("world"));
        assert_eq!(a.as_str(), Some("hello"));
        assert_eq!(a.type_name(), "core.String");
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Int(1), Value::Long(1));
    }

    #[test]
    fn test_option_into_value() {
        assert!(Value::from(None::<String>).is_null());
        assert_eq!(Value::from(Some(5i32)), Value::Int(5));
    }

    #[test]
    fn test_string_instance_checks() {
        let text = Value::from("x");
        assert!(text.is_instance_of(&TypeRef::string()));
        assert!(text.is_instance_of(&TypeRef::object()));
        assert!(!text.is_instance_of(&TypeRef::array_of(TypeRef::string())));
        assert!(!Value::Int(1).is_instance_of(&TypeRef::object()));
        assert!(Value::Null.is_instance_of(&TypeRef::string()));
        assert!(!Value::Null.is_instance_of(&TypeRef::INT));
    }

    #[test]
    fn test_array_instance_checks() {
        let ints = Value::Array(Array::new(TypeRef::INT, vec![Value::Int(1)]));
        assert!(ints.is_instance_of(&TypeRef::array_of(TypeRef::INT)));
        assert!(ints.is_instance_of(&TypeRef::object()));
        assert!(!ints.is_instance_of(&TypeRef::array_of(TypeRef::LONG)));
        assert!(!ints.is_instance_of(&TypeRef::array_of(TypeRef::object())));

        let strings = Value::Array(Array::new(TypeRef::string(), vec![]));
        assert!(strings.is_instance_of(&TypeRef::array_of(TypeRef::object())));
        assert!(!strings.is_instance_of(&TypeRef::string()));
    }

    #[test]
    fn test_array_access() {
        let array = Array::new(
            TypeRef::Primitive(PrimitiveKind::Short),
            vec![Value::Short(1), Value::Short(2)],
        );
        assert_eq!(array.len(), 2);
        assert!(array.set(1, Value::Short(7)));
        assert!(!array.set(2, Value::Short(9)));
        assert_eq!(array.get(1), Some(Value::Short(7)));
        assert_eq!(array.get(2), None);
    }
}
