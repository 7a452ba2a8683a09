//! Shared fixtures.

#![allow(dead_code)]

use std::rc::Rc;

use theatre_studio::{
    InitializeOptions, ObjectTemplate, PropType, Sequence, SheetObject, SheetObjectAddress,
    StudioConfig, StudioStore,
};

pub const PROJECT: &str = "p1";

pub fn address(object_key: &str) -> SheetObjectAddress {
    SheetObjectAddress::new(
        PROJECT.parse().expect("project id"),
        "Scene".parse().expect("sheet id"),
        "default".parse().expect("instance id"),
        object_key.parse().expect("object key"),
    )
}

/// `obj1` with a `size` (default 1), a `label`, and a compound `position`.
pub fn obj1(sequence: &Rc<Sequence>) -> Rc<SheetObject> {
    let template = ObjectTemplate::new([
        ("size", PropType::number_in_range(1.0, 0.0, 1000.0)),
        ("label", PropType::string("box")),
        (
            "position",
            PropType::compound([("x", PropType::number(0.0)), ("y", PropType::number(0.0))]),
        ),
    ]);
    Rc::new(SheetObject::new(address("obj1"), template, Rc::clone(sequence)))
}

pub fn sequence() -> Rc<Sequence> {
    Rc::new(Sequence::new(10.0, 30))
}

pub fn store() -> StudioStore {
    let mut store = StudioStore::new(StudioConfig::default());
    store
        .initialize(&InitializeOptions::in_memory())
        .expect("initialize");
    store
}
