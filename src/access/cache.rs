//! Process-wide registry of built dispatchers.
//!
//! Dispatchers are registered under the class token and unit name inside an [`OriginScope`]:
//! the registry a class was defined in plus the scope it declared. Unit names alone are not
//! unique, a reserved name remapped into the private namespace can equal a user class name.
//!
//! Each scope is guarded by one coarse lock held across lookup, build and registration, so two
//! threads asking for the same class never both build it, and once a dispatcher is registered
//! every later request observes the very same `Arc`.
//!
//! A failed build registers nothing; the next request for the class builds again. The same holds
//! for an emitter that panics: the scope lock is recovered, since the units map is only written
//! once a build has completed.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
};

use dashmap::DashMap;

use crate::{
    access::{
        config::AccessConfig,
        descriptor::enumerate,
        dispatcher::Dispatcher,
        emit::{synthesize, Emitter},
        plan::build_plans,
    },
    runtime::{ClassDef, ClassRc, Token},
    Result,
};

/// Units registered in one scope, by class token and unit name
type ScopeUnits = Arc<Mutex<HashMap<(Token, String), Arc<Dispatcher>>>>;

/// Identity of the place a class was defined in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OriginScope {
    /// Id of the defining registry, 0 for the builtin classes
    pub registry: u64,
    /// Scope declared by the class
    pub scope: String,
}

impl OriginScope {
    /// The origin scope of `class`
    #[must_use]
    pub fn of(class: &ClassDef) -> Self {
        OriginScope {
            registry: class.origin,
            scope: class.scope.clone(),
        }
    }
}

/// Cache of built dispatchers, see the module documentation.
#[derive(Default)]
pub struct DispatcherCache {
    scopes: DashMap<OriginScope, ScopeUnits>,
}

static GLOBAL: OnceLock<Arc<DispatcherCache>> = OnceLock::new();

impl DispatcherCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by [`crate::MethodAccess::get`]
    pub fn global() -> &'static Arc<DispatcherCache> {
        GLOBAL.get_or_init(|| Arc::new(DispatcherCache::new()))
    }

    fn scope(&self, class: &ClassDef) -> ScopeUnits {
        // Clone the scope out so the map shard is released before the scope lock is taken
        self.scopes
            .entry(OriginScope::of(class))
            .or_default()
            .value()
            .clone()
    }

    /// Return the dispatcher of `class`, building and registering it on first use.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] / [`crate::Error::Build`] if the dispatcher can not be
    /// built, in which case nothing is registered.
    pub fn get_or_build(
        &self,
        class: &ClassRc,
        config: &AccessConfig,
        emitter: &dyn Emitter,
    ) -> Result<Arc<Dispatcher>> {
        let name = config.unit_name(class);
        let scope = self.scope(class);
        let mut units = lock!(scope);

        let key = (class.token, name);
        let name = &key.1;
        if let Some(dispatcher) = units.get(&key) {
            log::trace!("method access cache hit for {}", name);
            return Ok(dispatcher.clone());
        }

        let descriptors = enumerate(class)?;
        let plans = build_plans(&descriptors)?;
        let dispatcher = match synthesize(name, class, descriptors, plans, emitter) {
            Ok(dispatcher) => Arc::new(dispatcher),
            Err(error) => {
                log::warn!("failed to build {}: {}", name, error);
                return Err(error);
            }
        };

        log::debug!(
            "built {} for {} with {} methods",
            name,
            class.fullname(),
            dispatcher.len()
        );
        units.insert(key, dispatcher.clone());
        Ok(dispatcher)
    }

    /// Return the dispatcher of `class` if it was already built
    #[must_use]
    pub fn get(&self, class: &ClassDef, config: &AccessConfig) -> Option<Arc<Dispatcher>> {
        let scope = self
            .scopes
            .get(&OriginScope::of(class))
            .map(|entry| entry.value().clone())?;

        let units = lock!(scope);
        units.get(&(class.token, config.unit_name(class))).cloned()
    }

    /// Number of registered dispatchers across all scopes
    #[must_use]
    pub fn len(&self) -> usize {
        let scopes: Vec<ScopeUnits> = self
            .scopes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        scopes.iter().map(|scope| lock!(scope).len()).sum()
    }

    /// Returns true if no dispatcher is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registered dispatcher.
    ///
    /// Accessors obtained earlier keep their dispatcher alive; later requests build anew.
    pub fn clear(&self) {
        self.scopes.clear();
    }
}
