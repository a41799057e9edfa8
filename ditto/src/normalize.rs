//! Indirection normalization.
//!
//! None of these functions mutate or allocate. A null layer anywhere on the
//! chain yields `None`, which callers treat as "no value".

use facet_core::Shape;

use crate::shape::{self, ShapeKind};
use crate::value::{ValueMut, ValueRef};

/// Number of consecutive reference layers before a non-reference shape.
pub fn depth(shape: &'static Shape) -> usize {
    let mut layers = 0;
    let mut current = shape;
    while let Some(layer) = shape::layer(current) {
        layers += 1;
        current = layer.pointee();
    }
    layers
}

/// The shape left after stripping every reference layer.
pub fn base_type(shape: &'static Shape) -> &'static Shape {
    let mut current = shape;
    while let Some(layer) = shape::layer(current) {
        current = layer.pointee();
    }
    current
}

/// Strip layers until `value` is either not a reference or exactly one
/// reference away from its payload.
pub fn reduce_to_single_reference(value: ValueRef<'_>) -> Option<ValueRef<'_>> {
    let mut current = value;
    loop {
        let Some(layer) = shape::layer(current.shape()) else {
            return Some(current);
        };
        if shape::kind_of(layer.pointee()) != ShapeKind::Reference {
            return Some(current);
        }
        current = current.pointee()?;
    }
}

/// The payload behind every reference layer.
pub fn exact_value(value: ValueRef<'_>) -> Option<ValueRef<'_>> {
    let mut current = value;
    while current.kind() == ShapeKind::Reference {
        current = current.pointee()?;
    }
    Some(current)
}

/// Mutable payload behind every reference layer, without allocating.
pub fn exact_value_mut(value: ValueMut<'_>) -> Option<ValueMut<'_>> {
    let mut current = value;
    while current.kind() == ShapeKind::Reference {
        current = current.into_pointee()?;
    }
    Some(current)
}
