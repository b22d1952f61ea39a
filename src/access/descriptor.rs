//! Enumeration of the invocable methods of a class or interface.
//!
//! The order produced here is the slot index space of every dispatcher built for the type, so
//! it has to be stable: the same class always yields the same sequence.
//!
//! # Classes
//!
//! Declared non-private methods of the class itself come first, in declaration order, followed
//! by those of its superclass, and so on until the universal root `core.Object` is reached. The
//! root's own methods are never part of the sequence. A method overridden in a subclass shows up
//! once per declaring class.
//!
//! # Interfaces
//!
//! The interface's own non-private methods come first, then each extended interface is walked
//! depth-first in declaration order. An interface reachable through several paths is visited on
//! every path, so its methods may repeat.

use crate::{
    runtime::{ClassRc, MethodRc, TypeRef, TypeRegistry},
    Result,
};

/// One invocable method, positioned at its slot in a dispatcher.
#[derive(Clone, Debug)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Declared parameter types
    pub parameter_types: Vec<TypeRef>,
    /// Declared return type
    pub return_type: TypeRef,
    /// Static methods ignore the receiver
    pub is_static: bool,
    /// The class or interface declaring the method
    pub declared_on: TypeRef,
    /// Discovered by an interface walk, calls dispatch through the receiver's interface table
    pub via_interface: bool,
    /// The method definition the descriptor was produced from
    pub method: MethodRc,
}

impl MethodDescriptor {
    fn new(owner: &ClassRc, method: &MethodRc, via_interface: bool) -> Self {
        MethodDescriptor {
            name: method.name.clone(),
            parameter_types: method.params.clone(),
            return_type: method.returns.clone(),
            is_static: method.is_static(),
            declared_on: owner.type_ref(),
            via_interface,
            method: method.clone(),
        }
    }
}

/// Enumerate the invocable methods of `class` in slot order.
///
/// # Errors
/// Currently infallible for classes obtained from a [`TypeRegistry`]; the `Result` keeps the
/// signature aligned with [`enumerate_type`].
pub fn enumerate(class: &ClassRc) -> Result<Vec<MethodDescriptor>> {
    let mut descriptors = Vec::new();

    if class.is_interface() {
        collect_interface(class, &mut descriptors);
        return Ok(descriptors);
    }

    let mut current = Some(class);
    while let Some(next) = current {
        if next.is_root() {
            break;
        }
        collect_declared(next, false, &mut descriptors);
        current = next.base();
    }

    Ok(descriptors)
}

/// Resolve `ty` in `registry` and enumerate its invocable methods.
///
/// # Errors
/// Returns [`crate::Error::InvalidType`] for primitive kinds, `void`, arrays and unknown classes.
pub fn enumerate_type(registry: &TypeRegistry, ty: &TypeRef) -> Result<Vec<MethodDescriptor>> {
    enumerate(&registry.resolve(ty)?)
}

fn collect_declared(owner: &ClassRc, via_interface: bool, out: &mut Vec<MethodDescriptor>) {
    out.extend(
        owner
            .methods()
            .iter()
            .filter(|method| !method.is_private())
            .map(|method| MethodDescriptor::new(owner, method, via_interface)),
    );
}

fn collect_interface(interface: &ClassRc, out: &mut Vec<MethodDescriptor>) {
    collect_declared(interface, true, out);
    for parent in interface.interfaces() {
        collect_interface(parent, out);
    }
}
