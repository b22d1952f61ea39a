//! The in-process host object model.
//!
//! Method accessors are built from what this module exposes: a [`TypeRegistry`] of
//! [`ClassDef`]s with their [`MethodDef`]s, the [`TypeRef`]s used in signatures, and the two
//! value representations ([`Value`] at the call boundary, [`Slot`] inside method
//! implementations).
//!
//! # Key Components
//!
//! - [`TypeRegistry`] - Token allocation and class lookup
//! - [`ClassBuilder`] / [`MethodBuilder`] - Defining classes from typed Rust closures
//! - [`ClassDef`] / [`MethodDef`] - Immutable definitions with a precomputed virtual table
//! - [`Value`] / [`Slot`] - Boxed and unboxed values
//! - [`NativeFn`] - Calling convention of method implementations

mod builder;
pub mod builtins;
mod class;
mod native;
mod registry;
mod token;
mod types;
mod value;

pub use builder::{ClassBuilder, MethodBuilder, DEFAULT_SCOPE};
pub use class::{ClassDef, ClassFlags, ClassRc, MethodDef, MethodFlags, MethodKey, MethodRc};
pub use native::{InstanceFn, NativeFn, NativeType, StaticFn};
pub use registry::TypeRegistry;
pub use token::Token;
pub use types::{ClassRef, PrimitiveKind, TypeRef, BUILTIN_ORIGIN, OBJECT_TOKEN, STRING_TOKEN};
pub use value::{Array, ArrayRef, Object, ObjectRef, Slot, Value};
