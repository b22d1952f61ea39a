//! Builders for defining classes, interfaces and their methods in a [`TypeRegistry`].
//!
//! ```rust
//! use std::sync::Mutex;
//! use methodaccess::runtime::{TypeRegistry, TypeRef};
//!
//! let registry = TypeRegistry::new();
//! let counter = registry
//!     .define_class("app", "Counter")
//!     .instance_method("get", |count: &Mutex<i64>| *count.lock().unwrap())
//!     .instance_method("add", |count: &Mutex<i64>, delta: i64| {
//!         *count.lock().unwrap() += delta;
//!     })
//!     .static_method("zero", || 0i64)
//!     .build()?;
//!
//! assert_eq!(counter.methods().len(), 3);
//! assert_eq!(counter.methods()[1].params, vec![TypeRef::LONG]);
//! # Ok::<(), methodaccess::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    runtime::{
        builtins,
        class::{ClassDef, ClassFlags, ClassRc, MethodDef, MethodFlags},
        native::{InstanceFn, NativeFn, StaticFn},
        registry::TypeRegistry,
        token::Token,
        types::{ClassRef, TypeRef, BUILTIN_ORIGIN},
    },
    Result,
};

/// Scope assigned to classes that do not name one
pub const DEFAULT_SCOPE: &str = "default";

/// Describes one method before it is attached to a class.
pub struct MethodBuilder {
    name: String,
    params: Vec<TypeRef>,
    returns: TypeRef,
    flags: MethodFlags,
    native: Option<NativeFn>,
    arity: Option<usize>,
}

impl MethodBuilder {
    /// A method with an explicit signature and no implementation yet.
    ///
    /// Attach one with [`MethodBuilder::native`], or mark it [`MethodBuilder::abstract_`].
    pub fn new(name: impl Into<String>, params: Vec<TypeRef>, returns: TypeRef) -> Self {
        MethodBuilder {
            name: name.into(),
            params,
            returns,
            flags: MethodFlags::PUBLIC,
            native: None,
            arity: None,
        }
    }

    /// An instance method implemented by a typed closure; the signature is derived from it
    pub fn instance<T, M, F: InstanceFn<T, M>>(name: impl Into<String>, method: F) -> Self {
        let (params, returns) = F::signature();
        MethodBuilder {
            name: name.into(),
            arity: Some(params.len()),
            params,
            returns,
            flags: MethodFlags::PUBLIC,
            native: Some(method.into_native()),
        }
    }

    /// A static method implemented by a typed closure; the signature is derived from it
    pub fn static_fn<M, F: StaticFn<M>>(name: impl Into<String>, method: F) -> Self {
        let (params, returns) = F::signature();
        MethodBuilder {
            name: name.into(),
            arity: Some(params.len()),
            params,
            returns,
            flags: MethodFlags::PUBLIC | MethodFlags::STATIC,
            native: Some(method.into_native()),
        }
    }

    /// Override the declared parameter types.
    ///
    /// Used to narrow reference types a closure signature can't express, e.g. `app.Point`
    /// instead of `core.Object`, or `int[]` instead of `core.Object[]`.
    #[must_use]
    pub fn params(mut self, params: Vec<TypeRef>) -> Self {
        self.params = params;
        self
    }

    /// Override the declared return type
    #[must_use]
    pub fn returns(mut self, returns: TypeRef) -> Self {
        self.returns = returns;
        self
    }

    /// Attach a raw implementation
    #[must_use]
    pub fn native(mut self, native: NativeFn) -> Self {
        self.native = Some(native);
        self
    }

    /// Mark the method static
    #[must_use]
    pub fn static_(mut self) -> Self {
        self.flags |= MethodFlags::STATIC;
        self
    }

    /// Mark the method private
    #[must_use]
    pub fn private(mut self) -> Self {
        self.flags.remove(MethodFlags::PUBLIC | MethodFlags::PROTECTED);
        self.flags |= MethodFlags::PRIVATE;
        self
    }

    /// Mark the method protected
    #[must_use]
    pub fn protected(mut self) -> Self {
        self.flags.remove(MethodFlags::PUBLIC | MethodFlags::PRIVATE);
        self.flags |= MethodFlags::PROTECTED;
        self
    }

    /// Mark the method final
    #[must_use]
    pub fn final_(mut self) -> Self {
        self.flags |= MethodFlags::FINAL;
        self
    }

    /// Mark the method abstract
    #[must_use]
    pub fn abstract_(mut self) -> Self {
        self.flags |= MethodFlags::ABSTRACT;
        self
    }

    pub(crate) fn build(self, token: Token) -> Result<MethodDef> {
        if let Some(position) = self.params.iter().position(TypeRef::is_void) {
            return Err(malformed_error!(
                "Method {} declares void parameter {}",
                self.name,
                position
            ));
        }

        if let Some(arity) = self.arity {
            if arity != self.params.len() {
                return Err(malformed_error!(
                    "Method {} declares {} parameters, its implementation takes {}",
                    self.name,
                    self.params.len(),
                    arity
                ));
            }
        }

        let mut flags = self.flags;
        if flags.contains(MethodFlags::ABSTRACT) {
            if flags.contains(MethodFlags::STATIC) {
                return Err(malformed_error!(
                    "Method {} can not be both static and abstract",
                    self.name
                ));
            }
            if self.native.is_some() {
                return Err(malformed_error!(
                    "Abstract method {} can not carry an implementation",
                    self.name
                ));
            }
        } else if self.native.is_none() {
            flags |= MethodFlags::ABSTRACT;
        }

        Ok(MethodDef::new(
            token,
            self.name,
            self.params,
            self.returns,
            flags,
            self.native,
        ))
    }
}

/// Collects the definition of a class or interface, obtained from
/// [`TypeRegistry::define_class`] or [`TypeRegistry::define_interface`].
///
/// The class token is allocated up front, so methods may refer to the class being defined
/// through [`ClassBuilder::type_ref`]. It is `None` once the registry's class table is full,
/// [`ClassBuilder::build`] then fails.
pub struct ClassBuilder<'r> {
    registry: &'r TypeRegistry,
    token: Option<Token>,
    namespace: String,
    name: String,
    scope: String,
    flags: ClassFlags,
    base: Option<ClassRc>,
    interfaces: Vec<ClassRc>,
    methods: Vec<MethodBuilder>,
}

impl<'r> ClassBuilder<'r> {
    pub(crate) fn new(
        registry: &'r TypeRegistry,
        token: Option<Token>,
        namespace: &str,
        name: &str,
        flags: ClassFlags,
    ) -> Self {
        ClassBuilder {
            registry,
            token,
            namespace: namespace.to_string(),
            name: name.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            flags,
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The token the class will be registered under, `None` if the class table is full
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.token
    }

    /// The class being defined as a [`TypeRef`], `None` if the class table is full
    #[must_use]
    pub fn type_ref(&self) -> Option<TypeRef> {
        let token = self.token?;
        Some(TypeRef::Class(ClassRef::new(
            self.registry.id(),
            token,
            self.fullname(),
        )))
    }

    fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Origin scope of the class; dispatchers are cached per scope
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the immediate superclass (defaults to `core.Object`)
    #[must_use]
    pub fn extends(mut self, base: &ClassRc) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Add an implemented (or, for interfaces, extended) interface
    #[must_use]
    pub fn implements(mut self, interface: &ClassRc) -> Self {
        self.interfaces.push(interface.clone());
        self
    }

    /// Add class attribute flags
    #[must_use]
    pub fn flags(mut self, flags: ClassFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Declare a method
    #[must_use]
    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Declare a public instance method implemented by `method`
    #[must_use]
    pub fn instance_method<T, M, F: InstanceFn<T, M>>(
        self,
        name: impl Into<String>,
        method: F,
    ) -> Self {
        self.method(MethodBuilder::instance(name, method))
    }

    /// Declare a public static method implemented by `method`
    #[must_use]
    pub fn static_method<M, F: StaticFn<M>>(self, name: impl Into<String>, method: F) -> Self {
        self.method(MethodBuilder::static_fn(name, method))
    }

    /// Declare a public abstract method
    #[must_use]
    pub fn abstract_method(
        self,
        name: impl Into<String>,
        params: Vec<TypeRef>,
        returns: TypeRef,
    ) -> Self {
        self.method(MethodBuilder::new(name, params, returns).abstract_())
    }

    /// Validate the definition, allocate method tokens and register the class
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for structurally invalid hierarchies or methods and
    /// [`crate::Error::TypeInsert`] if the full name is already taken.
    pub fn build(self) -> Result<ClassRc> {
        let fullname = self.fullname();
        let Some(token) = self.token else {
            return Err(malformed_error!(
                "Class table of registry {} is full, can not define {}",
                self.registry.id(),
                fullname
            ));
        };
        let is_interface = self.flags.contains(ClassFlags::INTERFACE);

        let base = match (is_interface, self.base) {
            (true, Some(_)) => {
                return Err(malformed_error!(
                    "Interface {} can not extend a class",
                    fullname
                ))
            }
            (true, None) => None,
            (false, Some(base)) => {
                if base.is_interface() {
                    return Err(malformed_error!(
                        "Class {} can not extend interface {}",
                        fullname,
                        base.fullname()
                    ));
                }
                if base.flags.contains(ClassFlags::FINAL) {
                    return Err(malformed_error!(
                        "Class {} can not extend final class {}",
                        fullname,
                        base.fullname()
                    ));
                }
                Some(base)
            }
            (false, None) => Some(builtins::object_class().clone()),
        };

        for parent in base.iter().chain(self.interfaces.iter()) {
            if parent.origin != BUILTIN_ORIGIN && parent.origin != self.registry.id() {
                return Err(malformed_error!(
                    "Class {} refers to {} from another registry",
                    fullname,
                    parent.fullname()
                ));
            }
        }

        if let Some(other) = self.interfaces.iter().find(|iface| !iface.is_interface()) {
            return Err(malformed_error!(
                "{} can only implement interfaces, {} is a class",
                fullname,
                other.fullname()
            ));
        }

        let may_be_abstract = is_interface || self.flags.contains(ClassFlags::ABSTRACT);
        let mut methods = Vec::with_capacity(self.methods.len());
        for method in self.methods {
            let method = method.build(self.registry.next_method_token()?)?;
            if method.is_abstract() && !may_be_abstract {
                return Err(malformed_error!(
                    "Concrete class {} declares abstract method {}",
                    fullname,
                    method.name
                ));
            }
            methods.push(Arc::new(method));
        }

        let class = Arc::new(ClassDef::new(
            token,
            self.namespace,
            self.name,
            self.scope,
            self.flags,
            self.registry.id(),
            base,
            self.interfaces,
            methods,
        ));

        self.registry.insert(&class)?;
        Ok(class)
    }
}
