//! Integration tests for method accessors built from realistic class definitions.
//!
//! Every test builds its classes in a fresh registry and uses a private dispatcher cache, so
//! the tests are independent of each other and of the process-wide cache.

use std::sync::{Arc, Mutex};

use methodaccess::{prelude::*, runtime::NativeFn};

fn factory() -> AccessFactory {
    AccessFactory::new().with_cache(Arc::new(DispatcherCache::new()))
}

#[derive(Default)]
struct Domain {
    field1: Mutex<Option<String>>,
    field2: Mutex<Option<String>>,
}

fn domain_class(registry: &TypeRegistry) -> Result<ClassRc> {
    registry
        .define_class("app", "TestDomain")
        .instance_method("getField1", |d: &Domain| d.field1.lock().unwrap().clone())
        .instance_method("setField1", |d: &Domain, v: Option<String>| {
            *d.field1.lock().unwrap() = v;
        })
        .instance_method("getField2", |d: &Domain| d.field2.lock().unwrap().clone())
        .instance_method("setField2", |d: &Domain, v: Option<String>| {
            *d.field2.lock().unwrap() = v;
        })
        .build()
}

/// Getter / setter scenario: declaration order is slot order.
#[test]
fn test_field_accessor_scenario() -> Result<()> {
    let registry = TypeRegistry::new();
    let class = domain_class(&registry)?;
    let access = factory().get(&registry, &class.type_ref())?;

    assert_eq!(
        access.method_names(),
        ["getField1", "setField1", "getField2", "setField2"]
    );
    assert_eq!(access.get_index_arity("setField1", 1)?, 1);

    let object = Value::Object(Object::new(&class, Domain::default()));
    assert_eq!(access.invoke(&object, 1, &[Value::from("x")])?, Value::Null);
    assert_eq!(access.invoke(&object, 0, &[])?, Value::from("x"));
    assert_eq!(access.invoke(&object, 2, &[])?, Value::Null);

    access.invoke(&object, 1, &[Value::Null])?;
    assert!(access.invoke(&object, 0, &[])?.is_null());

    Ok(())
}

/// Overloads: lookups are first match in slot order, never best match.
#[test]
fn test_overload_scenario() -> Result<()> {
    let registry = TypeRegistry::new();
    let class = registry
        .define_class("app", "Overloaded")
        .instance_method("a", |_: &u8| 0i32)
        .instance_method("b", |_: &u8| 0i32)
        .instance_method("m", |_: &u8, v: i32| v * 10)
        .instance_method("c", |_: &u8| 0i32)
        .instance_method("d", |_: &u8| 0i32)
        .instance_method("m", |_: &u8, s: String| s.len() as i32)
        .build()?;
    let access = factory().get(&registry, &class.type_ref())?;
    let object = Value::Object(Object::new(&class, 0u8));

    assert_eq!(access.get_index_signature("m", &[TypeRef::INT])?, 2);
    assert_eq!(access.get_index_signature("m", &[TypeRef::string()])?, 5);
    assert_eq!(access.get_index_arity("m", 1)?, 2);
    assert_eq!(access.get_index("m")?, 2);

    assert_eq!(
        access.invoke_signature(&object, "m", &[TypeRef::string()], &[Value::from("four")])?,
        Value::Int(4)
    );
    // arity lookup picks m(int), so a string argument is rejected rather than re-resolved
    assert!(matches!(
        access.invoke_named(&object, "m", &[Value::from("four")]),
        Err(Error::ArgumentType(_))
    ));
    assert_eq!(access.invoke_named(&object, "m", &[Value::Int(3)])?, Value::Int(30));

    Ok(())
}

#[test]
fn test_smallest_index_with_exact_duplicates() -> Result<()> {
    let registry = TypeRegistry::new();
    let base = registry
        .define_class("app", "Parent")
        .instance_method("value", |_: &u8| 1i32)
        .build()?;
    let child = registry
        .define_class("app", "Child")
        .extends(&base)
        .instance_method("value", |_: &u8| 2i32)
        .build()?;
    let access = factory().get(&registry, &child.type_ref())?;

    assert_eq!(access.method_names(), ["value", "value"]);
    assert_eq!(access.get_index("value")?, 0);
    assert_eq!(access.get_index_signature("value", &[])?, 0);
    assert_eq!(access.get_index_arity("value", 0)?, 0);

    let object = Value::Object(Object::new(&child, 0u8));
    assert_eq!(access.invoke(&object, 0, &[])?, Value::Int(2));
    assert_eq!(access.invoke(&object, 1, &[])?, Value::Int(2));

    Ok(())
}

#[derive(Default)]
struct Primitives {
    boolean: Mutex<bool>,
    byte: Mutex<i8>,
    character: Mutex<u16>,
    short: Mutex<i16>,
    int: Mutex<i32>,
    long: Mutex<i64>,
    float: Mutex<f32>,
    double: Mutex<f64>,
}

fn primitives_class(registry: &TypeRegistry) -> Result<ClassRc> {
    registry
        .define_class("app", "Primitives")
        .instance_method("setBoolean", |p: &Primitives, v: bool| *p.boolean.lock().unwrap() = v)
        .instance_method("getBoolean", |p: &Primitives| *p.boolean.lock().unwrap())
        .instance_method("setByte", |p: &Primitives, v: i8| *p.byte.lock().unwrap() = v)
        .instance_method("getByte", |p: &Primitives| *p.byte.lock().unwrap())
        .instance_method("setChar", |p: &Primitives, v: u16| *p.character.lock().unwrap() = v)
        .instance_method("getChar", |p: &Primitives| *p.character.lock().unwrap())
        .instance_method("setShort", |p: &Primitives, v: i16| *p.short.lock().unwrap() = v)
        .instance_method("getShort", |p: &Primitives| *p.short.lock().unwrap())
        .instance_method("setInt", |p: &Primitives, v: i32| *p.int.lock().unwrap() = v)
        .instance_method("getInt", |p: &Primitives| *p.int.lock().unwrap())
        .instance_method("setLong", |p: &Primitives, v: i64| *p.long.lock().unwrap() = v)
        .instance_method("getLong", |p: &Primitives| *p.long.lock().unwrap())
        .instance_method("setFloat", |p: &Primitives, v: f32| *p.float.lock().unwrap() = v)
        .instance_method("getFloat", |p: &Primitives| *p.float.lock().unwrap())
        .instance_method("setDouble", |p: &Primitives, v: f64| *p.double.lock().unwrap() = v)
        .instance_method("getDouble", |p: &Primitives| *p.double.lock().unwrap())
        .build()
}

fn round_trip(access: &MethodAccess, object: &Value, kind: &str, values: &[Value]) -> Result<()> {
    let setter = access.get_index(&format!("set{kind}"))?;
    let getter = access.get_index(&format!("get{kind}"))?;

    for value in values {
        assert_eq!(access.invoke(object, setter, std::slice::from_ref(value))?, Value::Null);
        assert_eq!(&access.invoke(object, getter, &[])?, value, "{kind}");
    }
    Ok(())
}

/// Every primitive kind survives unboxing into the call and boxing of the result, bit for bit.
#[test]
fn test_primitive_round_trips() -> Result<()> {
    let registry = TypeRegistry::new();
    let class = primitives_class(&registry)?;
    let access = factory().get(&registry, &class.type_ref())?;
    let object = Value::Object(Object::new(&class, Primitives::default()));

    round_trip(
        &access,
        &object,
        "Boolean",
        &[Value::Boolean(true), Value::Boolean(false)],
    )?;
    round_trip(
        &access,
        &object,
        "Byte",
        &[Value::Byte(0), Value::Byte(-1), Value::Byte(i8::MIN), Value::Byte(i8::MAX)],
    )?;
    round_trip(
        &access,
        &object,
        "Char",
        &[Value::Char(0), Value::Char(0x20AC), Value::Char(u16::MAX)],
    )?;
    round_trip(
        &access,
        &object,
        "Short",
        &[Value::Short(0), Value::Short(-1), Value::Short(i16::MIN), Value::Short(i16::MAX)],
    )?;
    round_trip(
        &access,
        &object,
        "Int",
        &[Value::Int(0), Value::Int(-1), Value::Int(i32::MIN), Value::Int(i32::MAX)],
    )?;
    round_trip(
        &access,
        &object,
        "Long",
        &[Value::Long(0), Value::Long(-1), Value::Long(i64::MIN), Value::Long(i64::MAX)],
    )?;
    round_trip(
        &access,
        &object,
        "Float",
        &[
            Value::Float(0.0),
            Value::Float(-1.0),
            Value::Float(f32::MIN),
            Value::Float(f32::MAX),
            Value::Float(-0.0),
            Value::Float(f32::NAN),
            Value::Float(f32::INFINITY),
        ],
    )?;
    round_trip(
        &access,
        &object,
        "Double",
        &[
            Value::Double(0.0),
            Value::Double(-1.0),
            Value::Double(f64::MIN),
            Value::Double(f64::MAX),
            Value::Double(f64::MIN_POSITIVE),
            Value::Double(f64::NAN),
            Value::Double(f64::NEG_INFINITY),
        ],
    )?;

    Ok(())
}

#[test]
fn test_primitive_kinds_are_not_coerced() -> Result<()> {
    let registry = TypeRegistry::new();
    let class = primitives_class(&registry)?;
    let access = factory().get(&registry, &class.type_ref())?;
    let object = Value::Object(Object::new(&class, Primitives::default()));

    let set_long = access.get_index("setLong")?;
    for wrong in [Value::Int(1), Value::Null, Value::from("1"), Value::Double(1.0)] {
        assert!(matches!(
            access.invoke(&object, set_long, &[wrong]),
            Err(Error::ArgumentType(_))
        ));
    }
    assert_eq!(access.invoke_named(&object, "getLong", &[])?, Value::Long(0));

    Ok(())
}

type Holder = Mutex<(Option<String>, Option<ArrayRef>)>;

#[test]
fn test_string_and_array_round_trips() -> Result<()> {
    let registry = TypeRegistry::new();
    let class = registry
        .define_class("app", "Holder")
        .instance_method("setText", |h: &Holder, v: Option<String>| {
            h.lock().unwrap().0 = v;
        })
        .instance_method("getText", |h: &Holder| {
            h.lock().unwrap().0.clone()
        })
        .method(
            MethodBuilder::instance(
                "setNumbers",
                |h: &Holder, v: Option<ArrayRef>| {
                    h.lock().unwrap().1 = v;
                },
            )
            .params(vec![TypeRef::array_of(TypeRef::INT)]),
        )
        .method(
            MethodBuilder::instance("getNumbers", |h: &Holder| {
                h.lock().unwrap().1.clone()
            })
            .returns(TypeRef::array_of(TypeRef::INT)),
        )
        .build()?;
    let access = factory().get(&registry, &class.type_ref())?;
    let object = Value::Object(Object::new(&class, Holder::new((None, None))));

    for text in [Value::from(""), Value::from("h\u{e9}llo"), Value::Null] {
        access.invoke_named(&object, "setText", std::slice::from_ref(&text))?;
        assert_eq!(access.invoke_named(&object, "getText", &[])?, text);
    }

    let empty = Value::Array(Array::new(TypeRef::INT, vec![]));
    let filled = Value::Array(Array::new(
        TypeRef::INT,
        vec![Value::Int(1), Value::Int(i32::MIN), Value::Int(i32::MAX)],
    ));
    for numbers in [empty, filled.clone(), Value::Null] {
        access.invoke_named(&object, "setNumbers", std::slice::from_ref(&numbers))?;
        assert_eq!(access.invoke_named(&object, "getNumbers", &[])?, numbers);
    }

    // identity is preserved, not just content
    access.invoke_named(&object, "setNumbers", std::slice::from_ref(&filled))?;
    let returned = access.invoke_named(&object, "getNumbers", &[])?;
    assert!(Arc::ptr_eq(
        returned.as_array().unwrap(),
        filled.as_array().unwrap()
    ));

    let longs = Value::Array(Array::new(TypeRef::LONG, vec![Value::Long(1)]));
    assert!(matches!(
        access.invoke_named(&object, "setNumbers", &[longs]),
        Err(Error::ArgumentType(_))
    ));

    Ok(())
}

#[test]
fn test_index_out_of_range() -> Result<()> {
    let registry = TypeRegistry::new();
    let class = domain_class(&registry)?;
    let access = factory().get(&registry, &class.type_ref())?;
    let object = Value::Object(Object::new(&class, Domain::default()));

    for index in [access.len(), access.len() + 1, usize::MAX] {
        match access.invoke(&object, index, &[]) {
            Err(Error::Index { index: got, count }) => {
                assert_eq!(got, index);
                assert_eq!(count, 4);
            }
            other => panic!("expected index error, got {:?}", other),
        }
    }

    Ok(())
}

#[test]
fn test_lookup_misses() -> Result<()> {
    let registry = TypeRegistry::new();
    let class = domain_class(&registry)?;
    let access = factory().get(&registry, &class.type_ref())?;

    assert!(matches!(access.get_index("getField3"), Err(Error::NotFound(_))));
    assert!(matches!(
        access.get_index_signature("setField1", &[TypeRef::object()]),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        access.get_index_arity("getField1", 1),
        Err(Error::NotFound(_))
    ));

    Ok(())
}

#[test]
fn test_invalid_types() {
    let registry = TypeRegistry::new();
    for ty in [
        TypeRef::INT,
        TypeRef::DOUBLE,
        TypeRef::Void,
        TypeRef::array_of(TypeRef::string()),
    ] {
        assert!(matches!(
            factory().get(&registry, &ty),
            Err(Error::InvalidType(_))
        ));
    }
}

#[test]
fn test_static_methods_ignore_instance() -> Result<()> {
    let registry = TypeRegistry::new();
    let class = registry
        .define_class("app", "MathUtil")
        .static_method("max", |a: i64, b: i64| a.max(b))
        .static_method("name", || String::from("math"))
        .build()?;
    let access = factory().get(&registry, &class.type_ref())?;

    assert_eq!(
        access.invoke(&Value::Null, 0, &[Value::Long(-3), Value::Long(9)])?,
        Value::Long(9)
    );
    assert_eq!(access.invoke(&Value::Int(5), 1, &[])?, Value::from("math"));

    Ok(())
}

#[test]
fn test_interface_accessor_dispatches_to_implementation() -> Result<()> {
    let registry = TypeRegistry::new();
    let shape = registry
        .define_interface("geo", "Shape")
        .abstract_method("area", vec![], TypeRef::DOUBLE)
        .instance_method("kind", |_: &f64| String::from("shape"))
        .build()?;
    let square = registry
        .define_class("geo", "Square")
        .implements(&shape)
        .instance_method("area", |side: &f64| side * side)
        .build()?;
    let circle = registry
        .define_class("geo", "Circle")
        .implements(&shape)
        .instance_method("area", |r: &f64| std::f64::consts::PI * r * r)
        .instance_method("kind", |_: &f64| String::from("circle"))
        .build()?;

    let access = factory().get(&registry, &shape.type_ref())?;
    assert_eq!(access.method_names(), ["area", "kind"]);

    let sq = Value::Object(Object::new(&square, 3.0f64));
    let ci = Value::Object(Object::new(&circle, 1.0f64));
    assert_eq!(access.invoke(&sq, 0, &[])?, Value::Double(9.0));
    assert_eq!(access.invoke(&ci, 0, &[])?, Value::Double(std::f64::consts::PI));
    assert_eq!(access.invoke(&sq, 1, &[])?, Value::from("shape"));
    assert_eq!(access.invoke(&ci, 1, &[])?, Value::from("circle"));

    let unrelated = Value::Object(Object::new(registry.object(), 1.0f64));
    assert!(matches!(
        access.invoke(&unrelated, 0, &[]),
        Err(Error::ArgumentType(_))
    ));

    Ok(())
}

#[test]
fn test_unimplemented_interface_method_fails_on_call() -> Result<()> {
    let registry = TypeRegistry::new();
    let named = registry
        .define_interface("app", "Named")
        .abstract_method("name", vec![], TypeRef::string())
        .build()?;
    let lazy = registry
        .define_class("app", "Lazy")
        .implements(&named)
        .build()?;

    let access = factory().get(&registry, &named.type_ref())?;
    let object = Value::Object(Object::new(&lazy, 0u8));
    assert!(matches!(
        access.invoke(&object, 0, &[]),
        Err(Error::Invocation(_))
    ));

    Ok(())
}

#[test]
fn test_builtin_string_accessor() -> Result<()> {
    let registry = TypeRegistry::new();
    let access = factory().get(&registry, &TypeRef::string())?;

    assert_eq!(access.dispatcher().name(), "methodaccess.core.StringMethodAccess");
    assert_eq!(access.invoke_named(&Value::from("abc"), "length", &[])?, Value::Int(3));
    assert_eq!(
        access.invoke_named(&Value::from(""), "isEmpty", &[])?,
        Value::Boolean(true)
    );

    let root = factory().get(&registry, &TypeRef::object())?;
    assert!(root.is_empty());

    Ok(())
}

#[test]
fn test_native_errors_propagate() -> Result<()> {
    let registry = TypeRegistry::new();
    let failing: NativeFn = Arc::new(|_: Option<&ObjectRef>, _: &[Slot]| {
        Err(Error::Invocation("disk on fire".to_string()))
    });
    let class = registry
        .define_class("app", "Fragile")
        .method(MethodBuilder::new("explode", vec![], TypeRef::Void).native(failing))
        .build()?;
    let access = factory().get(&registry, &class.type_ref())?;
    let object = Value::Object(Object::new(&class, 0u8));

    match access.invoke(&object, 0, &[]) {
        Err(Error::Invocation(message)) => assert_eq!(message, "disk on fire"),
        other => panic!("unexpected {:?}", other),
    }

    Ok(())
}

#[test]
fn test_mismatching_native_result_is_reported() -> Result<()> {
    let registry = TypeRegistry::new();
    let lying: NativeFn = Arc::new(|_: Option<&ObjectRef>, _: &[Slot]| Ok(Slot::F64(1.0)));
    let class = registry
        .define_class("app", "Liar")
        .method(MethodBuilder::new("count", vec![], TypeRef::INT).native(lying))
        .build()?;
    let access = factory().get(&registry, &class.type_ref())?;
    let object = Value::Object(Object::new(&class, 0u8));

    assert!(matches!(
        access.invoke(&object, 0, &[]),
        Err(Error::Invocation(_))
    ));

    Ok(())
}

#[test]
fn test_custom_config_names_units() -> Result<()> {
    let registry = TypeRegistry::new();
    let class = registry.define_class("sys", "Clock").build()?;
    let factory = factory().with_config(
        AccessConfig::default()
            .with_reserved_prefix("sys.")
            .with_private_namespace("accessors.")
            .with_suffix("Access"),
    );

    let access = factory.get_class(&class)?;
    assert_eq!(access.dispatcher().name(), "accessors.sys.ClockAccess");

    Ok(())
}

/// Tokens repeat across registries, class identity must not.
#[test]
fn test_foreign_registry_objects_are_rejected() -> Result<()> {
    let zoo = TypeRegistry::new();
    let farm = TypeRegistry::new();

    let cat_builder = zoo.define_class("zoo", "Cat");
    let cat_type = cat_builder.type_ref().expect("class table has room");
    let cat = cat_builder
        .instance_method("speak", |_: &u8| String::from("meow"))
        .method(
            MethodBuilder::instance("greet", |_: &u8, _: ObjectRef| String::from("purr"))
                .params(vec![cat_type]),
        )
        .build()?;
    let dog = farm
        .define_class("farm", "Dog")
        .instance_method("speak", |_: &u8| String::from("woof"))
        .build()?;
    assert_eq!(cat.token, dog.token);

    let access = factory().get_class(&cat)?;
    let cat_object = Value::Object(Object::new(&cat, 0u8));
    let dog_object = Value::Object(Object::new(&dog, 0u8));

    assert_eq!(access.invoke(&cat_object, 0, &[])?, Value::from("meow"));
    assert!(matches!(
        access.invoke(&dog_object, 0, &[]),
        Err(Error::ArgumentType(_))
    ));

    let greet = access.get_index("greet")?;
    assert_eq!(
        access.invoke(&cat_object, greet, &[cat_object.clone()])?,
        Value::from("purr")
    );
    assert!(matches!(
        access.invoke(&cat_object, greet, &[dog_object]),
        Err(Error::ArgumentType(_))
    ));

    assert!(matches!(
        factory().get(&zoo, &dog.type_ref()),
        Err(Error::InvalidType(_))
    ));

    Ok(())
}
