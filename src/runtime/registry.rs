//! Registry of the classes and interfaces known to a host.
//!
//! The [`TypeRegistry`] is the enumeration oracle dispatchers are built from. It allocates
//! tokens, indexes classes by token and by full name, and resolves [`TypeRef`]s back to their
//! [`ClassDef`](crate::runtime::ClassDef).
//!
//! # Thread Safety
//!
//! Indices are `DashMap`s and token allocation is atomic, so classes may be defined and looked
//! up concurrently from any number of threads.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use dashmap::DashMap;

use crate::{
    runtime::{
        builder::ClassBuilder,
        builtins,
        class::{ClassFlags, ClassRc},
        token::Token,
        types::{TypeRef, BUILTIN_ORIGIN},
    },
    Error, Result,
};

/// Registry ids start at 1, 0 marks the builtin classes shared by all registries
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Central registry of class definitions.
pub struct TypeRegistry {
    id: u64,
    types: DashMap<Token, ClassRc>,
    fullnames: DashMap<String, Token>,
    next_class_row: AtomicU32,
    next_method_row: AtomicU32,
}

impl TypeRegistry {
    /// Create a new registry, pre-populated with `core.Object` and `core.String`
    #[must_use]
    pub fn new() -> Self {
        let registry = TypeRegistry {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            types: DashMap::new(),
            fullnames: DashMap::new(),
            next_class_row: AtomicU32::new(builtins::CLASS_ROWS + 1),
            next_method_row: AtomicU32::new(builtins::METHOD_ROWS + 1),
        };

        for builtin in [builtins::object_class(), builtins::string_class()] {
            registry.types.insert(builtin.token, builtin.clone());
            registry.fullnames.insert(builtin.fullname(), builtin.token);
        }

        registry
    }

    /// Process-unique id of this registry
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Start the definition of a new class
    pub fn define_class(&self, namespace: &str, name: &str) -> ClassBuilder<'_> {
        ClassBuilder::new(
            self,
            self.next_class_token(),
            namespace,
            name,
            ClassFlags::PUBLIC,
        )
    }

    /// Start the definition of a new interface
    pub fn define_interface(&self, namespace: &str, name: &str) -> ClassBuilder<'_> {
        ClassBuilder::new(
            self,
            self.next_class_token(),
            namespace,
            name,
            ClassFlags::PUBLIC | ClassFlags::INTERFACE | ClassFlags::ABSTRACT,
        )
    }

    fn next_class_token(&self) -> Option<Token> {
        allocate(&self.next_class_row, Token::CLASS_TABLE)
    }

    /// Allocate the token of a new method
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] once every method row of the registry is taken.
    pub(crate) fn next_method_token(&self) -> Result<Token> {
        allocate(&self.next_method_row, Token::METHOD_TABLE).ok_or_else(|| {
            malformed_error!("Method table of registry {} is full", self.id)
        })
    }

    /// Register a fully built class
    ///
    /// # Errors
    /// Returns [`Error::TypeInsert`] if the token or the full name is already taken.
    pub(crate) fn insert(&self, class: &ClassRc) -> Result<()> {
        let fullname = class.fullname();
        match self.fullnames.entry(fullname) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Err(Error::TypeInsert(format!(
                "{} is already defined as {}",
                entry.key(),
                entry.get()
            ))),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                if self.types.contains_key(&class.token) {
                    return Err(Error::TypeInsert(format!(
                        "token {} is already in use",
                        class.token
                    )));
                }
                self.types.insert(class.token, class.clone());
                entry.insert(class.token);
                Ok(())
            }
        }
    }

    /// Look up a class by token
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<ClassRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a class by its full name (`namespace.Name`)
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<ClassRc> {
        let token = *self.fullnames.get(fullname)?;
        self.get(&token)
    }

    /// Resolve a type reference to the class it names.
    ///
    /// # Errors
    /// Returns [`Error::InvalidType`] for primitive kinds, `void`, array types and class tokens
    /// this registry does not know.
    pub fn resolve(&self, ty: &TypeRef) -> Result<ClassRc> {
        match ty {
            TypeRef::Class(class) => {
                let local = class.origin() == self.id || class.origin() == BUILTIN_ORIGIN;
                local
                    .then(|| self.get(&class.token()))
                    .flatten()
                    .ok_or_else(|| {
                        Error::InvalidType(format!(
                            "{} ({}) is not defined in this registry",
                            class.name(),
                            class.token()
                        ))
                    })
            }
            TypeRef::Primitive(kind) => Err(Error::InvalidType(format!(
                "primitive type {kind} has no methods"
            ))),
            TypeRef::Array(_) => Err(Error::InvalidType(format!(
                "array type {ty} has no methods"
            ))),
            TypeRef::Void => Err(Error::InvalidType("void has no methods".to_string())),
        }
    }

    /// The universal root class
    #[must_use]
    pub fn object(&self) -> &ClassRc {
        builtins::object_class()
    }

    /// The builtin string class
    #[must_use]
    pub fn string(&self) -> &ClassRc {
        builtins::string_class()
    }

    /// Number of registered classes, builtins included
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the registry holds no classes (never the case, builtins are always there)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Take the next row of `table`, rows never wrap past [`Token::MAX_ROW`]
fn allocate(counter: &AtomicU32, table: u8) -> Option<Token> {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |row| {
            (row <= Token::MAX_ROW).then_some(row + 1)
        })
        .ok()
        .map(|row| Token::from_parts(table, row))
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
