//! Per-slot call plans.
//!
//! A [`CallPlan`] records, for one enumerated method, how it is invoked and which conversion
//! each argument and the return value needs. Plans are decided once, when a dispatcher is
//! built, and select the glue that runs on every call.

use strum::Display;

use crate::{
    access::descriptor::MethodDescriptor,
    runtime::{MethodKey, MethodRc, PrimitiveKind, TypeRef},
    Result,
};

/// How the target of a slot is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum InvocationKind {
    /// Direct call, no receiver
    Static,
    /// Resolved through the receiver's class
    Virtual,
    /// Resolved through the receiver's interface implementation
    Interface,
}

/// Conversion applied to one argument or to the return value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConversionRule {
    /// Reference passes through unchanged after a checked cast to the type
    Identity(TypeRef),
    /// Boxed primitive argument to its unboxed slot
    Unbox(PrimitiveKind),
    /// Unboxed primitive result to its boxed value
    Box(PrimitiveKind),
    /// `void` result becomes `null`
    VoidToNull,
}

impl ConversionRule {
    fn for_argument(ty: &TypeRef) -> Option<Self> {
        match ty {
            TypeRef::Primitive(kind) => Some(ConversionRule::Unbox(*kind)),
            TypeRef::Array(_) | TypeRef::Class(_) => Some(ConversionRule::Identity(ty.clone())),
            TypeRef::Void => None,
        }
    }

    fn for_return(ty: &TypeRef) -> Self {
        match ty {
            TypeRef::Primitive(kind) => ConversionRule::Box(*kind),
            TypeRef::Void => ConversionRule::VoidToNull,
            TypeRef::Array(_) | TypeRef::Class(_) => ConversionRule::Identity(ty.clone()),
        }
    }
}

/// Invocation recipe of a single dispatcher slot.
#[derive(Clone, Debug)]
pub struct CallPlan {
    /// Slot index, equal to the position of the descriptor it was built from
    pub slot: usize,
    /// How the target is reached
    pub invocation: InvocationKind,
    /// One rule per declared parameter
    pub arguments: Vec<ConversionRule>,
    /// Rule for the return value
    pub returns: ConversionRule,
    /// The declared method
    pub method: MethodRc,
}

impl CallPlan {
    /// Override identity of the target, used to resolve virtual and interface calls
    #[must_use]
    pub fn key(&self) -> MethodKey {
        self.method.key()
    }
}

/// Build one plan per descriptor, in the same order.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a descriptor declares a `void` parameter.
pub fn build_plans(descriptors: &[MethodDescriptor]) -> Result<Vec<CallPlan>> {
    descriptors
        .iter()
        .enumerate()
        .map(|(slot, descriptor)| {
            let invocation = if descriptor.is_static {
                InvocationKind::Static
            } else if descriptor.via_interface {
                InvocationKind::Interface
            } else {
                InvocationKind::Virtual
            };

            let arguments = descriptor
                .parameter_types
                .iter()
                .enumerate()
                .map(|(position, ty)| {
                    ConversionRule::for_argument(ty).ok_or_else(|| {
                        malformed_error!(
                            "Slot {} ({}) declares void parameter {}",
                            slot,
                            descriptor.name,
                            position
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(CallPlan {
                slot,
                invocation,
                arguments,
                returns: ConversionRule::for_return(&descriptor.return_type),
                method: descriptor.method.clone(),
            })
        })
        .collect()
}
