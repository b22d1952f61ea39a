//! # methodaccess Prelude
//!
//! The most commonly used types, for glob imports.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all methodaccess operations
pub use crate::Error;

/// The result type used throughout methodaccess
pub use crate::Result;

// ================================================================================================
// Accessors
// ================================================================================================

/// Accessor facade and its factory
pub use crate::access::{AccessConfig, AccessFactory, MethodAccess};

/// Dispatcher building blocks
pub use crate::access::{Dispatcher, DispatcherCache, Emitter, GlueEmitter};

// ================================================================================================
// Host Object Model
// ================================================================================================

/// Registry and class definitions
pub use crate::runtime::{
    ClassBuilder, ClassDef, ClassFlags, ClassRc, MethodBuilder, MethodDef, MethodFlags,
    TypeRegistry,
};

/// Types and values
pub use crate::runtime::{
    Array, ArrayRef, Object, ObjectRef, PrimitiveKind, Slot, Token, TypeRef, Value,
};
