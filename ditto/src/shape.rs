//! Classification of facet shapes for copying.
//!
//! A shape is one of four kinds. `Option<T>` and `Box<T>` are reference
//! layers, `Def::List` shapes (`Vec<T>`) are sequences, facet structs are
//! composite records, and everything else is an opaque scalar.
//!
//! Shared pointers (`Rc`, `Arc`) are scalars: their payload cannot be written
//! without unique ownership, so they are only ever assigned whole.

use std::alloc::Layout;

use facet_core::{Def, Field, KnownPointer, ListDef, OptionDef, PointerDef, Shape, Type, UserType};

/// Coarse classification used for dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Reference,
    Composite,
    Sequence,
    Scalar,
}

/// One layer of indirection.
#[derive(Clone, Copy)]
pub(crate) enum Layer {
    /// `Option<T>`: may hold no value.
    Option(OptionDef),
    /// `Box<T>` of a sized `T`: always holds a value.
    Box {
        def: PointerDef,
        pointee: &'static Shape,
    },
}

impl Layer {
    pub(crate) fn pointee(&self) -> &'static Shape {
        match self {
            Layer::Option(def) => def.t,
            Layer::Box { pointee, .. } => pointee,
        }
    }
}

/// The reference layer `shape` describes, if any.
pub(crate) fn layer(shape: &'static Shape) -> Option<Layer> {
    match shape.def {
        Def::Option(def) => Some(Layer::Option(def)),
        Def::Pointer(def) if matches!(def.known, Some(KnownPointer::Box)) => {
            let pointee = def.pointee()?;
            // `Box<str>` and friends are opaque.
            sized_layout(pointee)?;
            Some(Layer::Box { def, pointee })
        }
        _ => None,
    }
}

/// Classify `shape`.
pub fn kind_of(shape: &'static Shape) -> ShapeKind {
    if layer(shape).is_some() {
        return ShapeKind::Reference;
    }
    // Check Def first: containers are user types too.
    if let Def::List(_) = shape.def {
        return ShapeKind::Sequence;
    }
    match shape.ty {
        Type::User(UserType::Struct(_)) => ShapeKind::Composite,
        _ => ShapeKind::Scalar,
    }
}

pub(crate) fn list_def(shape: &'static Shape) -> Option<ListDef> {
    match shape.def {
        Def::List(def) => Some(def),
        _ => None,
    }
}

/// Element shape of a sequence.
pub(crate) fn element_of(shape: &'static Shape) -> Option<&'static Shape> {
    list_def(shape).map(|def| def.t())
}

/// Fields of a composite, in declaration order.
pub(crate) fn struct_fields(shape: &'static Shape) -> Option<&'static [Field]> {
    if kind_of(shape) != ShapeKind::Composite {
        return None;
    }
    match &shape.ty {
        Type::User(UserType::Struct(st)) => Some(st.fields),
        _ => None,
    }
}

/// Whether `field` is one of the fields of `shape`.
pub(crate) fn owns_field(shape: &'static Shape, field: &'static Field) -> bool {
    struct_fields(shape).is_some_and(|fields| fields.iter().any(|f| core::ptr::eq(f, field)))
}

pub(crate) fn sized_layout(shape: &'static Shape) -> Option<Layout> {
    shape.layout.sized_layout().ok()
}

/// Whether both shapes describe the same type.
#[inline]
pub(crate) fn same_type(a: &'static Shape, b: &'static Shape) -> bool {
    a.is_shape(b)
}

/// Name used in diagnostics.
#[inline]
pub(crate) fn name(shape: &'static Shape) -> &'static str {
    shape.type_identifier
}
