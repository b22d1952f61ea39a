// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![warn(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # methodaccess
//!
//! Fast, index based method invocation for objects whose target method is only known at
//! runtime, by name or by signature.
//!
//! Instead of inspecting a class on every call, `methodaccess` builds once per class a
//! dispatcher specialized to it: the class's invocable methods are enumerated in a stable order,
//! each slot gets its argument unboxing, receiver cast and return boxing decided up front, and
//! `invoke(instance, index, args)` afterwards runs slot `index` directly. Dispatchers are cached
//! per class, so every accessor for a class shares the same one.
//!
//! The intended consumers are frameworks calling many methods on many types without writing a
//! call site for each: serializers matching fields to getters and setters, RPC layers mapping
//! wire names to methods.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Mutex;
//! use methodaccess::prelude::*;
//!
//! let registry = TypeRegistry::new();
//! let point = registry
//!     .define_class("geo", "Point")
//!     .instance_method("getX", |p: &Mutex<(i32, i32)>| p.lock().unwrap().0)
//!     .instance_method("setX", |p: &Mutex<(i32, i32)>, x: i32| p.lock().unwrap().0 = x)
//!     .build()?;
//!
//! let access = MethodAccess::get(&registry, &point.type_ref())?;
//! let instance = Value::Object(Object::new(&point, Mutex::new((0, 0))));
//!
//! let set_x = access.get_index_arity("setX", 1)?;
//! access.invoke(&instance, set_x, &[Value::Int(12)])?;
//! assert_eq!(access.invoke_named(&instance, "getX", &[])?, Value::Int(12));
//! # Ok::<(), methodaccess::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`runtime`] - The host object model: [`runtime::TypeRegistry`], classes, methods and values
//! - [`access`] - Enumeration, call plans, dispatcher synthesis, the dispatcher cache and the
//!   [`MethodAccess`] facade
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Lookups
//!
//! [`MethodAccess::get_index`], [`MethodAccess::get_index_signature`] and
//! [`MethodAccess::get_index_arity`] all return the first slot matching their predicate in
//! enumeration order. Overloads are never ranked against each other.
//!
//! ## Logging
//!
//! The crate reports through the [`log`](https://docs.rs/log) facade: dispatcher builds at
//! `debug`, cache hits at `trace`, emitter failures at `warn`. No logger is installed.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use methodaccess::prelude::*;
///
/// let registry = TypeRegistry::new();
/// let access = MethodAccess::get(&registry, &TypeRef::string())?;
/// assert_eq!(access.method_names(), ["length", "isEmpty"]);
/// # Ok::<(), methodaccess::Error>(())
/// ```
pub mod prelude;

/// Host object model: registry, classes, methods, values
pub mod runtime;

/// Method accessor synthesis and lookup
pub mod access;

/// `methodaccess` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `methodaccess` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use methodaccess::{Error, MethodAccess, runtime::{TypeRegistry, TypeRef}};
///
/// let registry = TypeRegistry::new();
/// let access = MethodAccess::get(&registry, &TypeRef::string())?;
/// match access.get_index("substring") {
///     Ok(index) => println!("found at {}", index),
///     Err(Error::NotFound(message)) => println!("missing: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// # Ok::<(), methodaccess::Error>(())
/// ```
pub use error::Error;

/// Index based method accessor, see [`access::MethodAccess`]
pub use access::MethodAccess;
