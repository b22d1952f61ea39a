//! Method accessor synthesis.
//!
//! This module turns a class into an index addressed dispatcher, in four steps:
//!
//! 1. [`descriptor`] - enumerate the invocable methods in a stable order (the slot order)
//! 2. [`plan`] - decide per slot how the target is reached and how values are converted
//! 3. [`emit`] - have an [`Emitter`] build the [`Dispatcher`] from the plans
//! 4. [`cache`] - register the dispatcher so each class is built at most once per scope
//!
//! [`MethodAccess`] wraps the result and adds name based lookups.
//!
//! # Slot order
//!
//! For classes, own declared methods come first, then those of each superclass up to (but not
//! including) `core.Object`. For interfaces, own methods come first, then each extended
//! interface depth-first. Private methods are skipped; static methods are included. Overridden
//! and diamond-inherited methods may occupy more than one slot.

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod dispatcher;
pub mod emit;
pub mod glue;
pub mod plan;

mod facade;

pub use cache::{DispatcherCache, OriginScope};
pub use config::AccessConfig;
pub use descriptor::{enumerate, enumerate_type, MethodDescriptor};
pub use dispatcher::{Dispatcher, Fragment};
pub use emit::{fragment_symbol, synthesize, Emitter, FragmentDescriptor, GlueEmitter, UnitDescriptor};
pub use facade::{AccessFactory, MethodAccess};
pub use plan::{build_plans, CallPlan, ConversionRule, InvocationKind};
