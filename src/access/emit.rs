//! Dispatcher synthesis.
//!
//! Synthesis turns the call plans of a class into one executable [`Dispatcher`]. The work is
//! split between a description of what to build ([`UnitDescriptor`], one
//! [`FragmentDescriptor`] per slot) and an [`Emitter`] that builds it. [`GlueEmitter`] is the
//! default emitter: it compiles each fragment from the pre-compiled conversion glue and links
//! the fragment table.

use crate::{
    access::{
        descriptor::MethodDescriptor,
        dispatcher::{Dispatcher, Fragment},
        plan::CallPlan,
    },
    runtime::ClassRc,
    Error, Result,
};

/// Textual identity of the fragment serving `slot`
#[must_use]
pub fn fragment_symbol(slot: usize) -> String {
    format!("fragment${slot}")
}

/// One slot of a unit to emit.
#[derive(Clone, Debug)]
pub struct FragmentDescriptor {
    /// Slot index
    pub slot: usize,
    /// Symbol the emitted fragment must carry, see [`fragment_symbol`]
    pub symbol: String,
    /// The plan the fragment implements
    pub plan: CallPlan,
}

/// Everything an [`Emitter`] needs to build the dispatcher of one class.
#[derive(Clone, Debug)]
pub struct UnitDescriptor {
    /// Unit name, as registered in the dispatcher cache
    pub name: String,
    /// The accessor class
    pub class: ClassRc,
    /// Method descriptors in slot order
    pub descriptors: Vec<MethodDescriptor>,
    /// Fragments in slot order
    pub fragments: Vec<FragmentDescriptor>,
}

impl UnitDescriptor {
    /// Describe a unit.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if `descriptors` and `plans` are not slot aligned.
    pub fn new(
        name: String,
        class: &ClassRc,
        descriptors: Vec<MethodDescriptor>,
        plans: Vec<CallPlan>,
    ) -> Result<Self> {
        if descriptors.len() != plans.len() {
            return Err(malformed_error!(
                "{}: {} descriptors but {} call plans",
                name,
                descriptors.len(),
                plans.len()
            ));
        }

        let fragments = plans
            .into_iter()
            .enumerate()
            .map(|(slot, plan)| {
                if plan.slot == slot {
                    Ok(FragmentDescriptor {
                        slot,
                        symbol: fragment_symbol(slot),
                        plan,
                    })
                } else {
                    Err(malformed_error!(
                        "{}: call plan for slot {} found at position {}",
                        name,
                        plan.slot,
                        slot
                    ))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(UnitDescriptor {
            name,
            class: class.clone(),
            descriptors,
            fragments,
        })
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if the unit has no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Backend producing executable dispatchers.
///
/// Implementations must return a dispatcher whose slot `i` runs the plan of fragment `i`;
/// anything else is reported as [`Error::Build`] by [`synthesize`].
pub trait Emitter: Send + Sync {
    /// Build the dispatcher described by `unit`
    ///
    /// # Errors
    /// Returns an error if the unit can not be built; it is never registered.
    fn emit(&self, unit: &UnitDescriptor) -> Result<Dispatcher>;
}

/// Default emitter, assembling dispatchers from pre-compiled glue functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlueEmitter;

impl Emitter for GlueEmitter {
    fn emit(&self, unit: &UnitDescriptor) -> Result<Dispatcher> {
        let fragments = unit
            .fragments
            .iter()
            .map(|fragment| Fragment::compile(&unit.class, fragment.symbol.clone(), &fragment.plan))
            .collect::<Result<Vec<_>>>()?;

        Dispatcher::link(unit, fragments)
    }
}

/// Synthesize the dispatcher `name` for `class` through `emitter`.
///
/// # Errors
/// - [`Error::Malformed`] if descriptors and plans are not slot aligned
/// - [`Error::Build`] if the emitter fails or returns a dispatcher with the wrong slot count;
///   other emitter errors are wrapped into it
pub fn synthesize(
    name: &str,
    class: &ClassRc,
    descriptors: Vec<MethodDescriptor>,
    plans: Vec<CallPlan>,
    emitter: &dyn Emitter,
) -> Result<Dispatcher> {
    let unit = UnitDescriptor::new(name.to_string(), class, descriptors, plans)?;

    let dispatcher = emitter.emit(&unit).map_err(|error| match error {
        Error::Build { .. } => error,
        other => Error::Build {
            unit: unit.name.clone(),
            message: other.to_string(),
        },
    })?;

    if dispatcher.len() != unit.len() {
        return Err(Error::Build {
            unit: unit.name.clone(),
            message: format!(
                "emitted {} slots, expected {}",
                dispatcher.len(),
                unit.len()
            ),
        });
    }

    Ok(dispatcher)
}
