//! The builtin classes shared by every [`crate::runtime::TypeRegistry`].
//!
//! `core.Object` is the universal root every class ultimately extends, `core.String` is the
//! class string values are instances of. Both are created lazily once per process and carry a
//! registry origin of `0`, so dispatchers built for them are shared across registries.

use std::sync::{Arc, OnceLock};

use crate::{
    runtime::{
        class::{ClassDef, ClassFlags, ClassRc, MethodDef, MethodFlags},
        native::{InstanceFn, NativeFn},
        token::Token,
        types::{TypeRef, BUILTIN_ORIGIN, OBJECT_TOKEN, STRING_TOKEN},
        value::{ObjectRef, Slot},
    },
    Error,
};

/// Number of method rows claimed by the builtin classes
pub(crate) const METHOD_ROWS: u32 = 4;

/// Number of class rows claimed by the builtin classes
pub(crate) const CLASS_ROWS: u32 = 2;

/// Namespace and scope of the builtin classes
pub const CORE_NAMESPACE: &str = "core";

static OBJECT: OnceLock<ClassRc> = OnceLock::new();
static STRING: OnceLock<ClassRc> = OnceLock::new();

fn method_token(row: u32) -> Token {
    Token::from_parts(Token::METHOD_TABLE, row)
}

fn identity_hash(this: &ObjectRef) -> i32 {
    #[allow(clippy::cast_possible_truncation)]
    let hash = (Arc::as_ptr(this) as usize >> 3) as i32;
    hash
}

fn object_receiver(this: Option<&ObjectRef>) -> Result<&ObjectRef, Error> {
    this.ok_or_else(|| Error::Invocation("instance method called without a receiver".to_string()))
}

/// The universal root class `core.Object`
pub fn object_class() -> &'static ClassRc {
    OBJECT.get_or_init(|| {
        let to_string: NativeFn = Arc::new(|this: Option<&ObjectRef>, _: &[Slot]| {
            let this = object_receiver(this)?;
            let text = match this.as_str() {
                Some(text) => text.to_string(),
                None => format!("{}@{:x}", this.class().fullname(), identity_hash(this)),
            };
            Ok(Slot::Object(crate::runtime::Object::new(string_class(), text)))
        });
        let hash_code: NativeFn = Arc::new(|this: Option<&ObjectRef>, _: &[Slot]| {
            Ok(Slot::I32(identity_hash(object_receiver(this)?)))
        });

        let methods = vec![
            Arc::new(MethodDef::new(
                method_token(1),
                "toString".to_string(),
                vec![],
                TypeRef::string(),
                MethodFlags::PUBLIC,
                Some(to_string),
            )),
            Arc::new(MethodDef::new(
                method_token(2),
                "hashCode".to_string(),
                vec![],
                TypeRef::INT,
                MethodFlags::PUBLIC,
                Some(hash_code),
            )),
        ];

        Arc::new(ClassDef::new(
            OBJECT_TOKEN,
            CORE_NAMESPACE.to_string(),
            "Object".to_string(),
            CORE_NAMESPACE.to_string(),
            ClassFlags::PUBLIC,
            BUILTIN_ORIGIN,
            None,
            Vec::new(),
            methods,
        ))
    })
}

/// The builtin `core.String` class, its instances carry a `String` payload
pub fn string_class() -> &'static ClassRc {
    STRING.get_or_init(|| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let length = InstanceFn::<String, fn() -> i32>::into_native(|text: &String| {
            text.encode_utf16().count() as i32
        });
        let is_empty =
            InstanceFn::<String, fn() -> bool>::into_native(|text: &String| text.is_empty());

        let methods = vec![
            Arc::new(MethodDef::new(
                method_token(3),
                "length".to_string(),
                vec![],
                TypeRef::INT,
                MethodFlags::PUBLIC | MethodFlags::FINAL,
                Some(length),
            )),
            Arc::new(MethodDef::new(
                method_token(4),
                "isEmpty".to_string(),
                vec![],
                TypeRef::BOOLEAN,
                MethodFlags::PUBLIC | MethodFlags::FINAL,
                Some(is_empty),
            )),
        ];

        Arc::new(ClassDef::new(
            STRING_TOKEN,
            CORE_NAMESPACE.to_string(),
            "String".to_string(),
            CORE_NAMESPACE.to_string(),
            ClassFlags::PUBLIC | ClassFlags::FINAL,
            BUILTIN_ORIGIN,
            Some(object_class().clone()),
            Vec::new(),
            methods,
        ))
    })
}
