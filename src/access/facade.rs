//! The public accessor type.
//!
//! A [`MethodAccess`] wraps the shared [`Dispatcher`] of a class together with index aligned
//! metadata (names, parameter types, return types) and resolves names to slot indices. Every
//! lookup returns the *first* slot satisfying its predicate in enumeration order; there is no
//! best-match overload resolution.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Mutex;
//! use methodaccess::{runtime::{Object, TypeRegistry, Value}, MethodAccess};
//!
//! let registry = TypeRegistry::new();
//! let class = registry
//!     .define_class("app", "Greeter")
//!     .instance_method("greet", |prefix: &Mutex<String>, name: String| {
//!         format!("{} {}", prefix.lock().unwrap(), name)
//!     })
//!     .build()?;
//!
//! let access = MethodAccess::get(&registry, &class.type_ref())?;
//! let greeter = Value::Object(Object::new(&class, Mutex::new(String::from("Hello"))));
//!
//! let index = access.get_index("greet")?;
//! let result = access.invoke(&greeter, index, &[Value::from("World")])?;
//! assert_eq!(result.as_str(), Some("Hello World"));
//! # Ok::<(), methodaccess::Error>(())
//! ```

use std::{fmt, sync::Arc};

use crate::{
    access::{
        cache::DispatcherCache,
        config::AccessConfig,
        dispatcher::Dispatcher,
        emit::{Emitter, GlueEmitter},
    },
    runtime::{ClassRc, TypeRef, TypeRegistry, Value},
    Error, Result,
};

/// Builds [`MethodAccess`]es with a specific configuration, cache and emitter.
///
/// [`AccessFactory::default`] uses the process-wide [`DispatcherCache::global`], the
/// [`GlueEmitter`] and [`AccessConfig::default`], which is what [`MethodAccess::get`] does.
#[derive(Clone)]
pub struct AccessFactory {
    config: AccessConfig,
    cache: Arc<DispatcherCache>,
    emitter: Arc<dyn Emitter>,
}

impl Default for AccessFactory {
    fn default() -> Self {
        AccessFactory {
            config: AccessConfig::default(),
            cache: DispatcherCache::global().clone(),
            emitter: Arc::new(GlueEmitter),
        }
    }
}

impl AccessFactory {
    /// Create a factory with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the naming configuration.
    #[must_use]
    pub fn with_config(mut self, config: AccessConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the dispatcher cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<DispatcherCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the emitter used on cache misses.
    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<dyn Emitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// The naming configuration
    #[must_use]
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// The dispatcher cache
    #[must_use]
    pub fn cache(&self) -> &Arc<DispatcherCache> {
        &self.cache
    }

    /// Accessor for the class `ty` refers to in `registry`.
    ///
    /// # Errors
    /// - [`Error::InvalidType`] for primitive kinds, `void`, arrays and unknown classes
    /// - [`Error::Build`] / [`Error::Malformed`] if the dispatcher can not be built
    pub fn get(&self, registry: &TypeRegistry, ty: &TypeRef) -> Result<MethodAccess> {
        self.get_class(&registry.resolve(ty)?)
    }

    /// Accessor for `class`, see [`AccessFactory::get`]
    ///
    /// # Errors
    /// Same as [`AccessFactory::get`], minus the type resolution.
    pub fn get_class(&self, class: &ClassRc) -> Result<MethodAccess> {
        let dispatcher = self
            .cache
            .get_or_build(class, &self.config, self.emitter.as_ref())?;
        Ok(MethodAccess::new(dispatcher))
    }
}

impl fmt::Debug for AccessFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Index based method invocation for one class.
#[derive(Clone)]
pub struct MethodAccess {
    dispatcher: Arc<Dispatcher>,
    method_names: Vec<String>,
    parameter_types: Vec<Vec<TypeRef>>,
    return_types: Vec<TypeRef>,
}

impl MethodAccess {
    /// Accessor for the class `ty` refers to, built through [`AccessFactory::default`].
    ///
    /// Interfaces are accepted; their slots dispatch through the receiver's implementation.
    ///
    /// # Errors
    /// See [`AccessFactory::get`].
    pub fn get(registry: &TypeRegistry, ty: &TypeRef) -> Result<MethodAccess> {
        AccessFactory::default().get(registry, ty)
    }

    /// Accessor for `class`, built through [`AccessFactory::default`]
    ///
    /// # Errors
    /// See [`AccessFactory::get_class`].
    pub fn of(class: &ClassRc) -> Result<MethodAccess> {
        AccessFactory::default().get_class(class)
    }

    fn new(dispatcher: Arc<Dispatcher>) -> Self {
        let descriptors = dispatcher.descriptors();
        MethodAccess {
            method_names: descriptors.iter().map(|d| d.name.clone()).collect(),
            parameter_types: descriptors
                .iter()
                .map(|d| d.parameter_types.clone())
                .collect(),
            return_types: descriptors.iter().map(|d| d.return_type.clone()).collect(),
            dispatcher,
        }
    }

    /// Invoke the method at `index`.
    ///
    /// `instance` is ignored for static methods. Primitive results come back boxed, `void`
    /// methods return [`Value::Null`].
    ///
    /// # Errors
    /// - [`Error::Index`] if `index` is not a valid slot
    /// - [`Error::ArgumentType`] if the receiver or an argument does not fit
    /// - [`Error::Invocation`] if the method can not be executed
    pub fn invoke(&self, instance: &Value, index: usize, args: &[Value]) -> Result<Value> {
        self.dispatcher.invoke(instance, index, args)
    }

    /// Invoke the first method named `name` with exactly `param_types`
    ///
    /// # Errors
    /// [`Error::NotFound`] if no such method exists, otherwise as [`MethodAccess::invoke`].
    pub fn invoke_signature(
        &self,
        instance: &Value,
        name: &str,
        param_types: &[TypeRef],
        args: &[Value],
    ) -> Result<Value> {
        let index = self.get_index_signature(name, param_types)?;
        self.invoke(instance, index, args)
    }

    /// Invoke the first method named `name` taking `args.len()` parameters
    ///
    /// # Errors
    /// [`Error::NotFound`] if no such method exists, otherwise as [`MethodAccess::invoke`].
    pub fn invoke_named(&self, instance: &Value, name: &str, args: &[Value]) -> Result<Value> {
        let index = self.get_index_arity(name, args.len())?;
        self.invoke(instance, index, args)
    }

    /// Index of the first method named `name`
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is none.
    pub fn get_index(&self, name: &str) -> Result<usize> {
        self.position(|index| self.method_names[index] == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Index of the first method named `name` whose parameter types equal `param_types`
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is none.
    pub fn get_index_signature(&self, name: &str, param_types: &[TypeRef]) -> Result<usize> {
        self.position(|index| {
            self.method_names[index] == name && self.parameter_types[index] == param_types
        })
        .ok_or_else(|| {
            let params = param_types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            Error::NotFound(format!("{name}({params})"))
        })
    }

    /// Index of the first method named `name` taking `count` parameters
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is none.
    pub fn get_index_arity(&self, name: &str, count: usize) -> Result<usize> {
        self.position(|index| {
            self.method_names[index] == name && self.parameter_types[index].len() == count
        })
        .ok_or_else(|| Error::NotFound(format!("{name} with {count} params")))
    }

    fn position(&self, matches: impl Fn(usize) -> bool) -> Option<usize> {
        (0..self.method_names.len()).find(|&index| matches(index))
    }

    /// Method names, index aligned with the slots
    #[must_use]
    pub fn method_names(&self) -> &[String] {
        &self.method_names
    }

    /// Parameter types, index aligned with the slots
    #[must_use]
    pub fn parameter_types(&self) -> &[Vec<TypeRef>] {
        &self.parameter_types
    }

    /// Return types, index aligned with the slots
    #[must_use]
    pub fn return_types(&self) -> &[TypeRef] {
        &self.return_types
    }

    /// The shared dispatcher
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// The accessor class
    #[must_use]
    pub fn class(&self) -> &ClassRc {
        self.dispatcher.class()
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.method_names.len()
    }

    /// Returns true if the class has no invocable methods
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.method_names.is_empty()
    }
}

impl fmt::Debug for MethodAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodAccess")
            .field("unit", &self.dispatcher.name())
            .field("methods", &self.method_names)
            .finish()
    }
}
