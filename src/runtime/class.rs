//! Class and method definitions of the host object model.
//!
//! A [`ClassDef`] is immutable once built. It knows its base class, the interfaces it
//! implements (or extends, for interfaces), its declared methods in declaration order, and a
//! virtual table used to resolve overrides for instance calls.

use std::{collections::HashMap, fmt, sync::Arc};

use bitflags::bitflags;

use crate::runtime::{
    native::NativeFn,
    token::Token,
    types::{ClassRef, TypeRef, BUILTIN_ORIGIN, OBJECT_TOKEN},
};

/// Reference to a `ClassDef`
pub type ClassRc = Arc<ClassDef>;
/// Reference to a `MethodDef`
pub type MethodRc = Arc<MethodDef>;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Class attribute flags
    pub struct ClassFlags: u32 {
        /// Visible outside of its scope
        const PUBLIC = 0x0001;
        /// Can not be extended
        const FINAL = 0x0010;
        /// Is an interface
        const INTERFACE = 0x0200;
        /// Can not be instantiated
        const ABSTRACT = 0x0400;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Method attribute flags
    pub struct MethodFlags: u32 {
        /// Accessible from everywhere
        const PUBLIC = 0x0001;
        /// Accessible only by the declaring class
        const PRIVATE = 0x0002;
        /// Accessible by subclasses
        const PROTECTED = 0x0004;
        /// Does not take a receiver
        const STATIC = 0x0008;
        /// Can not be overridden
        const FINAL = 0x0010;
        /// Has no implementation
        const ABSTRACT = 0x0400;
    }
}

/// Override identity of a method: its name and parameter types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodKey {
    /// Method name
    pub name: String,
    /// Parameter types in order
    pub params: Vec<TypeRef>,
}

/// A declared method.
pub struct MethodDef {
    /// Token of this method
    pub token: Token,
    /// Method name
    pub name: String,
    /// Parameter types in declaration order
    pub params: Vec<TypeRef>,
    /// Return type, [`TypeRef::Void`] for methods without result
    pub returns: TypeRef,
    /// Access and dispatch flags
    pub flags: MethodFlags,
    native: Option<NativeFn>,
}

impl MethodDef {
    /// Create a new method definition
    pub fn new(
        token: Token,
        name: String,
        params: Vec<TypeRef>,
        returns: TypeRef,
        flags: MethodFlags,
        native: Option<NativeFn>,
    ) -> Self {
        MethodDef {
            token,
            name,
            params,
            returns,
            flags,
            native,
        }
    }

    /// Returns true for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    /// Returns true for private methods
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.flags.contains(MethodFlags::PRIVATE)
    }

    /// Returns true for methods without implementation
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(MethodFlags::ABSTRACT) || self.native.is_none()
    }

    /// The implementation of this method, if it has one
    #[must_use]
    pub fn native(&self) -> Option<&NativeFn> {
        self.native.as_ref()
    }

    /// The override identity of this method
    #[must_use]
    pub fn key(&self) -> MethodKey {
        MethodKey {
            name: self.name.clone(),
            params: self.params.clone(),
        }
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("flags", &self.flags)
            .field("native", &self.native.is_some())
            .finish()
    }
}

/// A class or interface definition.
pub struct ClassDef {
    /// Token of this class
    pub token: Token,
    /// Namespace (can be empty)
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// Origin scope the class was defined in
    pub scope: String,
    /// Class attribute flags
    pub flags: ClassFlags,
    /// Id of the registry that defined this class, 0 for builtins
    pub(crate) origin: u64,
    base: Option<ClassRc>,
    interfaces: Vec<ClassRc>,
    methods: Vec<MethodRc>,
    vtable: HashMap<MethodKey, MethodRc>,
}

impl ClassDef {
    /// Assemble a class and compute its virtual table.
    ///
    /// The table starts from the base class's table, adds default implementations reachable
    /// through the interfaces that are not already present, and finally lets the class's own
    /// non-static, non-private methods override by [`MethodKey`].
    pub(crate) fn new(
        token: Token,
        namespace: String,
        name: String,
        scope: String,
        flags: ClassFlags,
        origin: u64,
        base: Option<ClassRc>,
        interfaces: Vec<ClassRc>,
        methods: Vec<MethodRc>,
    ) -> Self {
        let mut vtable = base
            .as_ref()
            .map(|base| base.vtable.clone())
            .unwrap_or_default();

        for interface in &interfaces {
            for (key, method) in &interface.vtable {
                let replace = vtable
                    .get(key)
                    .map_or(true, |existing| existing.is_abstract() && !method.is_abstract());
                if replace {
                    vtable.insert(key.clone(), method.clone());
                }
            }
        }

        for method in &methods {
            if !method.is_static() && !method.is_private() {
                vtable.insert(method.key(), method.clone());
            }
        }

        ClassDef {
            token,
            namespace,
            name,
            scope,
            flags,
            origin,
            base,
            interfaces,
            methods,
            vtable,
        }
    }

    /// Returns the full name (Namespace.Name) of the class
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Identity of this class
    #[must_use]
    pub fn class_ref(&self) -> ClassRef {
        ClassRef::new(self.origin, self.token, self.fullname())
    }

    /// This class as a [`TypeRef`]
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::Class(self.class_ref())
    }

    /// Returns true for interfaces
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(ClassFlags::INTERFACE)
    }

    /// Returns true for the universal root class
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.origin == BUILTIN_ORIGIN && self.token == OBJECT_TOKEN
    }

    /// The immediate superclass, `None` for the root and for interfaces
    #[must_use]
    pub fn base(&self) -> Option<&ClassRc> {
        self.base.as_ref()
    }

    /// Directly implemented (or, for interfaces, extended) interfaces in declaration order
    #[must_use]
    pub fn interfaces(&self) -> &[ClassRc] {
        &self.interfaces
    }

    /// Declared methods in declaration order, including private and static ones
    #[must_use]
    pub fn methods(&self) -> &[MethodRc] {
        &self.methods
    }

    /// Returns true if `class` refers to this very class
    #[must_use]
    pub fn is_class(&self, class: &ClassRef) -> bool {
        self.origin == class.origin() && self.token == class.token()
    }

    /// Checks whether instances of this class are instances of `class`.
    ///
    /// Classes are matched by registry and token, so a class of another registry that happens
    /// to share a token is never a supertype.
    #[must_use]
    pub fn is_subtype_of(&self, class: &ClassRef) -> bool {
        if class.is_root() || self.is_class(class) {
            return true;
        }

        if self
            .interfaces
            .iter()
            .any(|interface| interface.is_subtype_of(class))
        {
            return true;
        }

        self.base
            .as_ref()
            .is_some_and(|base| base.is_subtype_of(class))
    }

    /// Resolve the implementation an instance call to `key` reaches on this class
    #[must_use]
    pub fn resolve_virtual(&self, key: &MethodKey) -> Option<&MethodRc> {
        self.vtable.get(key)
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("token", &self.token)
            .field("name", &self.fullname())
            .field("scope", &self.scope)
            .field("flags", &self.flags)
            .field("base", &self.base.as_ref().map(|base| base.fullname()))
            .field("methods", &self.methods.len())
            .finish()
    }
}
