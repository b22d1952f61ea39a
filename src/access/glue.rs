//! Pre-compiled conversion glue.
//!
//! Every [`ConversionRule`] maps to one monomorphic function. Selecting the function happens
//! once per slot when a dispatcher is built; calls afterwards only go through the stored
//! function pointers.

use crate::{
    access::plan::ConversionRule,
    runtime::{PrimitiveKind, Slot, TypeRef, Value},
};

/// Converts a boxed argument into its slot, `None` if the value does not fit the expected type
pub type ArgumentFn = fn(&Value, &TypeRef) -> Option<Slot>;

/// Converts a returned slot into a boxed value, `None` if the slot does not fit the declared type
pub type ReturnFn = fn(Slot) -> Option<Value>;

/// Glue for one argument position.
#[derive(Clone, Debug)]
pub struct ArgumentGlue {
    convert: ArgumentFn,
    expected: TypeRef,
}

impl ArgumentGlue {
    /// Select the glue implementing `rule` for a parameter of type `expected`.
    ///
    /// Returns `None` for rules that do not apply to arguments.
    #[must_use]
    pub fn select(rule: &ConversionRule) -> Option<Self> {
        let (convert, expected): (ArgumentFn, TypeRef) = match rule {
            ConversionRule::Identity(ty) => (cast_reference, ty.clone()),
            ConversionRule::Unbox(kind) => (unbox_fn(*kind), TypeRef::from(*kind)),
            ConversionRule::Box(_) | ConversionRule::VoidToNull => return None,
        };
        Some(ArgumentGlue { convert, expected })
    }

    /// The declared parameter type
    #[must_use]
    pub fn expected(&self) -> &TypeRef {
        &self.expected
    }

    /// Run the glue
    #[must_use]
    pub fn apply(&self, value: &Value) -> Option<Slot> {
        (self.convert)(value, &self.expected)
    }
}

/// Glue for the return value.
#[derive(Clone, Debug)]
pub struct ReturnGlue {
    convert: ReturnFn,
    declared: TypeRef,
}

impl ReturnGlue {
    /// Select the glue implementing `rule` for a method returning `declared`.
    ///
    /// Returns `None` for rules that do not apply to return values.
    #[must_use]
    pub fn select(rule: &ConversionRule, declared: &TypeRef) -> Option<Self> {
        let convert: ReturnFn = match rule {
            ConversionRule::Identity(_) => pass_reference,
            ConversionRule::Box(kind) => box_fn(*kind),
            ConversionRule::VoidToNull => discard,
            ConversionRule::Unbox(_) => return None,
        };
        Some(ReturnGlue {
            convert,
            declared: declared.clone(),
        })
    }

    /// The declared return type
    #[must_use]
    pub fn declared(&self) -> &TypeRef {
        &self.declared
    }

    /// Run the glue
    #[must_use]
    pub fn apply(&self, slot: Slot) -> Option<Value> {
        (self.convert)(slot)
    }
}

fn unbox_fn(kind: PrimitiveKind) -> ArgumentFn {
    match kind {
        PrimitiveKind::Boolean => unbox_boolean,
        PrimitiveKind::Byte => unbox_byte,
        PrimitiveKind::Char => unbox_char,
        PrimitiveKind::Short => unbox_short,
        PrimitiveKind::Int => unbox_int,
        PrimitiveKind::Long => unbox_long,
        PrimitiveKind::Float => unbox_float,
        PrimitiveKind::Double => unbox_double,
    }
}

fn box_fn(kind: PrimitiveKind) -> ReturnFn {
    match kind {
        PrimitiveKind::Boolean => box_boolean,
        PrimitiveKind::Byte => box_byte,
        PrimitiveKind::Char => box_char,
        PrimitiveKind::Short => box_short,
        PrimitiveKind::Int => box_int,
        PrimitiveKind::Long => box_long,
        PrimitiveKind::Float => box_float,
        PrimitiveKind::Double => box_double,
    }
}

fn cast_reference(value: &Value, expected: &TypeRef) -> Option<Slot> {
    if !value.is_instance_of(expected) {
        return None;
    }
    match value {
        Value::Null => Some(Slot::Null),
        Value::Object(object) => Some(Slot::Object(object.clone())),
        Value::Array(array) => Some(Slot::Array(array.clone())),
        _ => None,
    }
}

fn unbox_boolean(value: &Value, _: &TypeRef) -> Option<Slot> {
    match value {
        Value::Boolean(v) => Some(Slot::I32(i32::from(*v))),
        _ => None,
    }
}

fn unbox_byte(value: &Value, _: &TypeRef) -> Option<Slot> {
    match value {
        Value::Byte(v) => Some(Slot::I32(i32::from(*v))),
        _ => None,
    }
}

fn unbox_char(value: &Value, _: &TypeRef) -> Option<Slot> {
    match value {
        Value::Char(v) => Some(Slot::I32(i32::from(*v))),
        _ => None,
    }
}

fn unbox_short(value: &Value, _: &TypeRef) -> Option<Slot> {
    match value {
        Value::Short(v) => Some(Slot::I32(i32::from(*v))),
        _ => None,
    }
}

fn unbox_int(value: &Value, _: &TypeRef) -> Option<Slot> {
    match value {
        Value::Int(v) => Some(Slot::I32(*v)),
        _ => None,
    }
}

fn unbox_long(value: &Value, _: &TypeRef) -> Option<Slot> {
    match value {
        Value::Long(v) => Some(Slot::I64(*v)),
        _ => None,
    }
}

fn unbox_float(value: &Value, _: &TypeRef) -> Option<Slot> {
    match value {
        Value::Float(v) => Some(Slot::F32(*v)),
        _ => None,
    }
}

fn unbox_double(value: &Value, _: &TypeRef) -> Option<Slot> {
    match value {
        Value::Double(v) => Some(Slot::F64(*v)),
        _ => None,
    }
}

fn pass_reference(slot: Slot) -> Option<Value> {
    match slot {
        Slot::Null => Some(Value::Null),
        Slot::Object(object) => Some(Value::Object(object)),
        Slot::Array(array) => Some(Value::Array(array)),
        _ => None,
    }
}

fn discard(_: Slot) -> Option<Value> {
    Some(Value::Null)
}

fn box_boolean(slot: Slot) -> Option<Value> {
    match slot {
        Slot::I32(v) => Some(Value::Boolean(v != 0)),
        _ => None,
    }
}

// Narrowing keeps the low bits, the same way a store into a narrower local does.
#[allow(clippy::cast_possible_truncation)]
fn box_byte(slot: Slot) -> Option<Value> {
    match slot {
        Slot::I32(v) => Some(Value::Byte(v as i8)),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn box_char(slot: Slot) -> Option<Value> {
    match slot {
        Slot::I32(v) => Some(Value::Char(v as u16)),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn box_short(slot: Slot) -> Option<Value> {
    match slot {
        Slot::I32(v) => Some(Value::Short(v as i16)),
        _ => None,
    }
}

fn box_int(slot: Slot) -> Option<Value> {
    match slot {
        Slot::I32(v) => Some(Value::Int(v)),
        _ => None,
    }
}

fn box_long(slot: Slot) -> Option<Value> {
    match slot {
        Slot::I64(v) => Some(Value::Long(v)),
        _ => None,
    }
}

fn box_float(slot: Slot) -> Option<Value> {
    match slot {
        Slot::F32(v) => Some(Value::Float(v)),
        _ => None,
    }
}

fn box_double(slot: Slot) -> Option<Value> {
    match slot {
        Slot::F64(v) => Some(Value::Double(v)),
        _ => None,
    }
}
