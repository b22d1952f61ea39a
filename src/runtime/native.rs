//! Native method implementations and the glue turning typed Rust closures into them.
//!
//! Every method implementation speaks the same unboxed calling convention, [`NativeFn`]: an
//! optional receiver plus a slice of [`Slot`]s in, one [`Slot`] out. Typed closures such as
//! `|point: &Point, x: i32| point.set_x(x)` are adapted through [`InstanceFn`] and [`StaticFn`],
//! which also derive the method's parameter and return [`TypeRef`]s from the closure signature
//! via [`NativeType`].

use std::{any::Any, sync::Arc};

use crate::{
    runtime::{
        builtins,
        types::TypeRef,
        value::{ArrayRef, Object, ObjectRef, Slot},
    },
    Error, Result,
};

/// The calling convention of method implementations.
///
/// The receiver is `None` for static methods.
pub type NativeFn = Arc<dyn Fn(Option<&ObjectRef>, &[Slot]) -> Result<Slot> + Send + Sync>;

/// A Rust type that can cross the native calling convention.
pub trait NativeType: Sized + 'static {
    /// The declared type of a parameter or return value of this Rust type
    fn type_ref() -> TypeRef;

    /// Read a value of this type out of a slot
    fn from_slot(slot: &Slot) -> Option<Self>;

    /// Store this value into a slot
    fn into_slot(self) -> Slot;
}

impl NativeType for () {
    fn type_ref() -> TypeRef {
        TypeRef::Void
    }

    fn from_slot(slot: &Slot) -> Option<Self> {
        matches!(slot, Slot::Void).then_some(())
    }

    fn into_slot(self) -> Slot {
        Slot::Void
    }
}

impl NativeType for bool {
    fn type_ref() -> TypeRef {
        TypeRef::BOOLEAN
    }

    fn from_slot(slot: &Slot) -> Option<Self> {
        match slot {
            Slot::I32(value) => Some(*value != 0),
            _ => None,
        }
    }

    fn into_slot(self) -> Slot {
        Slot::I32(i32::from(self))
    }
}

macro_rules! narrow_native_type {
    ($ty:ty, $type_ref:expr) => {
        impl NativeType for $ty {
            fn type_ref() -> TypeRef {
                $type_ref
            }

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn from_slot(slot: &Slot) -> Option<Self> {
                match slot {
                    Slot::I32(value) => Some(*value as $ty),
                    _ => None,
                }
            }

            fn into_slot(self) -> Slot {
                Slot::I32(i32::from(self))
            }
        }
    };
}

narrow_native_type!(i8, TypeRef::BYTE);
narrow_native_type!(u16, TypeRef::CHAR);
narrow_native_type!(i16, TypeRef::SHORT);
narrow_native_type!(i32, TypeRef::INT);

impl NativeType for i64 {
    fn type_ref() -> TypeRef {
        TypeRef::LONG
    }

    fn from_slot(slot: &Slot) -> Option<Self> {
        match slot {
            Slot::I64(value) => Some(*value),
            _ => None,
        }
    }

    fn into_slot(self) -> Slot {
        Slot::I64(self)
    }
}

impl NativeType for f32 {
    fn type_ref() -> TypeRef {
        TypeRef::FLOAT
    }

    fn from_slot(slot: &Slot) -> Option<Self> {
        match slot {
            Slot::F32(value) => Some(*value),
            _ => None,
        }
    }

    fn into_slot(self) -> Slot {
        Slot::F32(self)
    }
}

impl NativeType for f64 {
    fn type_ref() -> TypeRef {
        TypeRef::DOUBLE
    }

    fn from_slot(slot: &Slot) -> Option<Self> {
        match slot {
            Slot::F64(value) => Some(*value),
            _ => None,
        }
    }

    fn into_slot(self) -> Slot {
        Slot::F64(self)
    }
}

impl NativeType for String {
    fn type_ref() -> TypeRef {
        TypeRef::string()
    }

    fn from_slot(slot: &Slot) -> Option<Self> {
        match slot {
            Slot::Object(object) => object.as_str().map(str::to_string),
            _ => None,
        }
    }

    fn into_slot(self) -> Slot {
        Slot::Object(Object::new(builtins::string_class(), self))
    }
}

impl NativeType for ObjectRef {
    fn type_ref() -> TypeRef {
        TypeRef::object()
    }

    fn from_slot(slot: &Slot) -> Option<Self> {
        match slot {
            Slot::Object(object) => Some(object.clone()),
            _ => None,
        }
    }

    fn into_slot(self) -> Slot {
        Slot::Object(self)
    }
}

/// Arrays declare `core.Object[]`; use [`crate::runtime::MethodBuilder::params`] or
/// [`crate::runtime::MethodBuilder::returns`] to narrow the element type.
impl NativeType for ArrayRef {
    fn type_ref() -> TypeRef {
        TypeRef::array_of(TypeRef::object())
    }

    fn from_slot(slot: &Slot) -> Option<Self> {
        match slot {
            Slot::Array(array) => Some(array.clone()),
            _ => None,
        }
    }

    fn into_slot(self) -> Slot {
        Slot::Array(self)
    }
}

macro_rules! nullable_native_type {
    ($ty:ty) => {
        impl NativeType for Option<$ty> {
            fn type_ref() -> TypeRef {
                <$ty as NativeType>::type_ref()
            }

            fn from_slot(slot: &Slot) -> Option<Self> {
                match slot {
                    Slot::Null => Some(None),
                    other => <$ty as NativeType>::from_slot(other).map(Some),
                }
            }

            fn into_slot(self) -> Slot {
                self.map_or(Slot::Null, NativeType::into_slot)
            }
        }
    };
}

nullable_native_type!(String);
nullable_native_type!(ObjectRef);
nullable_native_type!(ArrayRef);

/// A closure usable as an instance method on objects carrying a `T` payload.
///
/// Implemented for `Fn(&T, A, B, ..) -> R` with up to four arguments. `Marker` is the
/// function pointer type `fn(A, B, ..) -> R` and only serves to tell the impls apart.
pub trait InstanceFn<T, Marker>: Send + Sync + 'static {
    /// Parameter types and return type derived from the closure signature
    fn signature() -> (Vec<TypeRef>, TypeRef);

    /// Adapt the closure to the native calling convention
    fn into_native(self) -> NativeFn;
}

/// A closure usable as a static method.
///
/// Implemented for `Fn(A, B, ..) -> R` with up to four arguments, with the same `Marker`
/// convention as [`InstanceFn`].
pub trait StaticFn<Marker>: Send + Sync + 'static {
    /// Parameter types and return type derived from the closure signature
    fn signature() -> (Vec<TypeRef>, TypeRef);

    /// Adapt the closure to the native calling convention
    fn into_native(self) -> NativeFn;
}

fn receiver<T: Any>(this: Option<&ObjectRef>) -> Result<&T> {
    let this = this.ok_or_else(|| {
        Error::Invocation("instance method called without a receiver".to_string())
    })?;

    this.downcast::<T>().ok_or_else(|| {
        Error::ArgumentType(format!(
            "receiver of class {} does not carry a {} payload",
            this.class().fullname(),
            std::any::type_name::<T>()
        ))
    })
}

fn argument<A: NativeType>(slots: &[Slot], index: usize) -> Result<A> {
    slots.get(index).and_then(A::from_slot).ok_or_else(|| {
        Error::ArgumentType(format!(
            "parameter {} expects {}, got {}",
            index,
            A::type_ref(),
            slots.get(index).map_or("nothing", Slot::describe)
        ))
    })
}

fn check_arity(slots: &[Slot], arity: usize) -> Result<()> {
    if slots.len() == arity {
        Ok(())
    } else {
        Err(Error::ArgumentType(format!(
            "expected {} arguments, got {}",
            arity,
            slots.len()
        )))
    }
}

macro_rules! impl_native_fn {
    ($arity:expr; $($arg:ident => $idx:tt),*) => {
        impl<T, F, R, $($arg,)*> InstanceFn<T, fn($($arg),*) -> R> for F
        where
            T: Any + Send + Sync,
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            R: NativeType,
            $($arg: NativeType,)*
        {
            fn signature() -> (Vec<TypeRef>, TypeRef) {
                (vec![$($arg::type_ref()),*], R::type_ref())
            }

            #[allow(non_snake_case, unused_variables)]
            fn into_native(self) -> NativeFn {
                Arc::new(move |this: Option<&ObjectRef>, slots: &[Slot]| {
                    check_arity(slots, $arity)?;
                    let receiver = receiver::<T>(this)?;
                    $(let $arg = argument::<$arg>(slots, $idx)?;)*
                    Ok(self(receiver, $($arg),*).into_slot())
                })
            }
        }

        impl<F, R, $($arg,)*> StaticFn<fn($($arg),*) -> R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: NativeType,
            $($arg: NativeType,)*
        {
            fn signature() -> (Vec<TypeRef>, TypeRef) {
                (vec![$($arg::type_ref()),*], R::type_ref())
            }

            #[allow(non_snake_case, unused_variables)]
            fn into_native(self) -> NativeFn {
                Arc::new(move |_this: Option<&ObjectRef>, slots: &[Slot]| {
                    check_arity(slots, $arity)?;
                    $(let $arg = argument::<$arg>(slots, $idx)?;)*
                    Ok(self($($arg),*).into_slot())
                })
            }
        }
    };
}

impl_native_fn!(0;);
impl_native_fn!(1; A => 0);
impl_native_fn!(2; A => 0, B => 1);
impl_native_fn!(3; A => 0, B => 1, C => 2);
impl_native_fn!(4; A => 0, B => 1, C => 2, D => 3);
