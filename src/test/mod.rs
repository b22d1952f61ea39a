//! Fixtures shared by the unit tests.
//!
//! Each builder defines its classes in the given registry and returns them; none of them
//! touch the global dispatcher cache.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use crate::{
    access::{Dispatcher, Emitter, GlueEmitter, UnitDescriptor},
    runtime::{
        Array, ArrayRef, ClassRc, MethodBuilder, Object, TypeRef, TypeRegistry, Value,
    },
    Error, Result,
};

/// Payload of `app.TestDomain`
#[derive(Default)]
pub(crate) struct TestDomain {
    field1: Mutex<Option<String>>,
    field2: Mutex<Option<String>>,
}

impl TestDomain {
    pub(crate) fn instance(class: &ClassRc) -> Value {
        Value::Object(Object::new(class, TestDomain::default()))
    }
}

/// `app.TestDomain` with `getField1`, `setField1`, `getField2`, `setField2` in that order
pub(crate) fn test_domain(registry: &TypeRegistry) -> ClassRc {
    registry
        .define_class("app", "TestDomain")
        .instance_method("getField1", |domain: &TestDomain| {
            domain.field1.lock().unwrap().clone()
        })
        .instance_method("setField1", |domain: &TestDomain, value: Option<String>| {
            *domain.field1.lock().unwrap() = value;
        })
        .instance_method("getField2", |domain: &TestDomain| {
            domain.field2.lock().unwrap().clone()
        })
        .instance_method("setField2", |domain: &TestDomain, value: Option<String>| {
            *domain.field2.lock().unwrap() = value;
        })
        .build()
        .unwrap()
}

/// `app.Overloads`: `m(int)` at slot 2, `m(int, int)` at 4, `m(String)` at 5
pub(crate) fn overloads(registry: &TypeRegistry) -> ClassRc {
    registry
        .define_class("app", "Overloads")
        .instance_method("first", |_: &u8| 1i32)
        .instance_method("second", |_: &u8, v: i64| v * 2)
        .instance_method("m", |_: &u8, v: i32| v.wrapping_add(1))
        .instance_method("other", |_: &u8| {})
        .instance_method("m", |_: &u8, a: i32, b: i32| a.wrapping_add(b))
        .instance_method("m", |_: &u8, _: Option<String>| {})
        .method(
            MethodBuilder::instance("names", |_: &u8| -> ArrayRef {
                Array::new(TypeRef::string(), vec![Value::from("a"), Value::from("b")])
            })
            .returns(TypeRef::array_of(TypeRef::string())),
        )
        .build()
        .unwrap()
}

pub(crate) struct Hierarchy {
    pub base: ClassRc,
    pub derived: ClassRc,
}

/// `app.Base { describe, baseOnly, static create }` and `app.Derived { describe, extra }`
pub(crate) fn hierarchy(registry: &TypeRegistry) -> Hierarchy {
    let base = registry
        .define_class("app", "Base")
        .instance_method("describe", |_: &u8| String::from("base"))
        .instance_method("baseOnly", |_: &u8| 7i32)
        .static_method("create", || 42i32)
        .build()
        .unwrap();
    let derived = registry
        .define_class("app", "Derived")
        .extends(&base)
        .instance_method("describe", |_: &u8| String::from("derived"))
        .instance_method("extra", |_: &u8| true)
        .build()
        .unwrap();

    Hierarchy { base, derived }
}

pub(crate) struct Diamond {
    pub top: ClassRc,
    pub bottom: ClassRc,
}

/// `Bottom extends Left, Right`, both of which extend `Top`
pub(crate) fn diamond_interfaces(registry: &TypeRegistry) -> Diamond {
    let top = registry
        .define_interface("app", "Top")
        .abstract_method("top", vec![], TypeRef::INT)
        .build()
        .unwrap();
    let left = registry
        .define_interface("app", "Left")
        .implements(&top)
        .abstract_method("left", vec![], TypeRef::INT)
        .build()
        .unwrap();
    let right = registry
        .define_interface("app", "Right")
        .implements(&top)
        .abstract_method("right", vec![], TypeRef::INT)
        .build()
        .unwrap();
    let bottom = registry
        .define_interface("app", "Bottom")
        .implements(&left)
        .implements(&right)
        .abstract_method("bottom", vec![], TypeRef::INT)
        .build()
        .unwrap();

    Diamond { top, bottom }
}

/// Emitter delegating to [`GlueEmitter`] while counting builds
#[derive(Default)]
pub(crate) struct CountingEmitter {
    builds: AtomicUsize,
}

impl CountingEmitter {
    pub(crate) fn count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl Emitter for CountingEmitter {
    fn emit(&self, unit: &UnitDescriptor) -> Result<Dispatcher> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        GlueEmitter.emit(unit)
    }
}

/// Emitter refusing every unit
pub(crate) struct FailingEmitter;

impl Emitter for FailingEmitter {
    fn emit(&self, unit: &UnitDescriptor) -> Result<Dispatcher> {
        Err(Error::Build {
            unit: unit.name.clone(),
            message: "emitter refused the unit".to_string(),
        })
    }
}
