//! The executable dispatcher unit and its per-slot fragments.
//!
//! A [`Fragment`] is the compiled form of one [`CallPlan`]: the receiver check, the argument
//! glue, the resolved target and the return glue. A [`Dispatcher`] is the multiplexer over the
//! fragments; `invoke(instance, i, args)` is a bounds check followed by a call to fragment `i`.

use std::{fmt, sync::Arc};

use crate::{
    access::{
        descriptor::MethodDescriptor,
        emit::{fragment_symbol, UnitDescriptor},
        glue::{ArgumentGlue, ReturnGlue},
        plan::{CallPlan, InvocationKind},
    },
    runtime::{ClassRc, ClassRef, MethodKey, MethodRc, ObjectRef, Value},
    Error, Result,
};

/// Compiled form of a single slot.
pub struct Fragment {
    symbol: String,
    invocation: InvocationKind,
    owner: ClassRc,
    owner_ref: ClassRef,
    key: MethodKey,
    declared: MethodRc,
    resolved: MethodRc,
    arguments: Vec<ArgumentGlue>,
    returns: ReturnGlue,
}

impl Fragment {
    /// Compile `plan` for the accessor class `owner`.
    ///
    /// The target reached when the receiver's class is exactly `owner` is resolved here, so
    /// calls on such receivers skip the virtual table lookup.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the plan's rules do not fit their positions.
    pub fn compile(owner: &ClassRc, symbol: String, plan: &CallPlan) -> Result<Self> {
        let arguments = plan
            .arguments
            .iter()
            .enumerate()
            .map(|(position, rule)| {
                ArgumentGlue::select(rule).ok_or_else(|| {
                    malformed_error!(
                        "{}: rule {:?} can not convert argument {}",
                        symbol,
                        rule,
                        position
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let returns = ReturnGlue::select(&plan.returns, &plan.method.returns).ok_or_else(|| {
            malformed_error!(
                "{}: rule {:?} can not convert a return value",
                symbol,
                plan.returns
            )
        })?;

        let key = plan.key();
        let resolved = match plan.invocation {
            InvocationKind::Static => plan.method.clone(),
            InvocationKind::Virtual | InvocationKind::Interface => owner
                .resolve_virtual(&key)
                .cloned()
                .unwrap_or_else(|| plan.method.clone()),
        };

        Ok(Fragment {
            symbol,
            invocation: plan.invocation,
            owner: owner.clone(),
            owner_ref: owner.class_ref(),
            key,
            declared: plan.method.clone(),
            resolved,
            arguments,
            returns,
        })
    }

    /// Textual identity of the fragment (`fragment$<slot>`)
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Run the fragment: cast the receiver, convert the arguments, call, convert the result.
    ///
    /// # Errors
    /// - [`Error::ArgumentType`] if the receiver or an argument fails its conversion, or if
    ///   the argument count differs from the parameter count
    /// - [`Error::Invocation`] if the target is abstract or returns a mismatching value
    /// - any error produced by the method implementation itself
    pub fn call(&self, instance: &Value, args: &[Value]) -> Result<Value> {
        let receiver = match self.invocation {
            InvocationKind::Static => None,
            InvocationKind::Virtual | InvocationKind::Interface => Some(self.receiver(instance)?),
        };

        if args.len() != self.arguments.len() {
            return Err(Error::ArgumentType(format!(
                "{} expects {} arguments, got {}",
                self.declared.name,
                self.arguments.len(),
                args.len()
            )));
        }

        let mut slots = Vec::with_capacity(args.len());
        for (position, (glue, value)) in self.arguments.iter().zip(args).enumerate() {
            let slot = glue.apply(value).ok_or_else(|| {
                Error::ArgumentType(format!(
                    "argument {} of {} expects {}, got {}",
                    position,
                    self.declared.name,
                    glue.expected(),
                    value.type_name()
                ))
            })?;
            slots.push(slot);
        }

        let target = self.target(receiver);
        let native = target.native().ok_or_else(|| {
            Error::Invocation(format!(
                "{}.{} is abstract",
                self.owner.fullname(),
                target.name
            ))
        })?;

        let result = native(receiver, &slots)?;
        let described = result.describe();
        self.returns.apply(result).ok_or_else(|| {
            Error::Invocation(format!(
                "{} returned {}, declared {}",
                self.declared.name,
                described,
                self.returns.declared()
            ))
        })
    }

    fn receiver<'a>(&self, instance: &'a Value) -> Result<&'a ObjectRef> {
        match instance {
            Value::Object(object) if object.class().is_subtype_of(&self.owner_ref) => Ok(object),
            other => Err(Error::ArgumentType(format!(
                "receiver of {} must be an instance of {}, got {}",
                self.declared.name,
                self.owner.fullname(),
                other.type_name()
            ))),
        }
    }

    fn target<'a>(&'a self, receiver: Option<&'a ObjectRef>) -> &'a MethodRc {
        let Some(receiver) = receiver else {
            return &self.resolved;
        };

        let class = receiver.class();
        if Arc::ptr_eq(class, &self.owner) {
            return &self.resolved;
        }

        class.resolve_virtual(&self.key).unwrap_or(&self.resolved)
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("symbol", &self.symbol)
            .field("invocation", &self.invocation)
            .field("method", &self.declared.name)
            .field("arguments", &self.arguments.len())
            .finish()
    }
}

/// A built method accessor unit for one class.
///
/// Immutable after linking and shared through `Arc` by every accessor of the class.
pub struct Dispatcher {
    name: String,
    class: ClassRc,
    descriptors: Vec<MethodDescriptor>,
    fragments: Vec<Fragment>,
}

impl Dispatcher {
    /// Link compiled fragments into a dispatcher for `unit`.
    ///
    /// # Errors
    /// Returns [`Error::Build`] if the fragment table does not cover the unit's slots one to
    /// one, in order.
    pub fn link(unit: &UnitDescriptor, fragments: Vec<Fragment>) -> Result<Self> {
        if fragments.len() != unit.fragments.len() {
            return Err(Error::Build {
                unit: unit.name.clone(),
                message: format!(
                    "{} fragments for {} slots",
                    fragments.len(),
                    unit.fragments.len()
                ),
            });
        }

        for (slot, fragment) in fragments.iter().enumerate() {
            if fragment.symbol != fragment_symbol(slot) {
                return Err(Error::Build {
                    unit: unit.name.clone(),
                    message: format!("slot {} is linked to {}", slot, fragment.symbol),
                });
            }
        }

        Ok(Dispatcher {
            name: unit.name.clone(),
            class: unit.class.clone(),
            descriptors: unit.descriptors.clone(),
            fragments,
        })
    }

    /// Invoke the method at `index` on `instance`.
    ///
    /// `instance` is ignored by static methods, pass [`Value::Null`].
    ///
    /// # Errors
    /// Returns [`Error::Index`] if `index` is not below [`Dispatcher::len`], otherwise whatever
    /// [`Fragment::call`] reports.
    pub fn invoke(&self, instance: &Value, index: usize, args: &[Value]) -> Result<Value> {
        let fragment = self.fragments.get(index).ok_or(Error::Index {
            index,
            count: self.fragments.len(),
        })?;
        fragment.call(instance, args)
    }

    /// Unit name the dispatcher was registered under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The accessor class
    #[must_use]
    pub fn class(&self) -> &ClassRc {
        &self.class
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if the class has no invocable methods
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Descriptors of the slots, index aligned
    #[must_use]
    pub fn descriptors(&self) -> &[MethodDescriptor] {
        &self.descriptors
    }

    /// Compiled fragments, index aligned
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("class", &self.class.fullname())
            .field("slots", &self.fragments.len())
            .finish()
    }
}
