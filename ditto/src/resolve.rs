//! Member lookup by name.
//!
//! Lookup happens in two steps. [`find_field`] and [`find_method`] work on
//! shapes and produce routes that can be cached; [`read_route`] and
//! [`route_mut`] follow a route through a live value. Absence is never an
//! error here: a missing member and a null reference layer both come back as
//! `None`.

use facet_core::{Field, Shape};

use crate::members::exported_fields;
use crate::normalize::{base_type, exact_value, exact_value_mut, reduce_to_single_reference};
use crate::registry::{MethodDef, MethodKind, Produced, Receiver, members_of};
use crate::shape::{self, ShapeKind};
use crate::value::{ValueMut, ValueRef};

/// Where a named field lives inside a composite.
#[derive(Clone, Copy)]
pub(crate) struct FieldRoute {
    /// The flattened field the member is promoted from, if any.
    pub(crate) embedded: Option<&'static Field>,
    pub(crate) field: &'static Field,
}

impl FieldRoute {
    pub(crate) fn shape(&self) -> &'static Shape {
        self.field.shape()
    }
}

impl core::fmt::Debug for FieldRoute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let ty = shape::name(self.shape());
        match self.embedded {
            Some(outer) => write!(f, "{}.{}: {}", outer.name, self.field.name, ty),
            None => write!(f, "{}: {}", self.field.name, ty),
        }
    }
}

// ============================================================================
// Shape-level lookup
// ============================================================================

/// Exported field `name` of the composite behind `shape`.
///
/// Direct fields win. Otherwise the fields of flattened composites are
/// searched, one level deep, in declaration order. A direct internal field
/// with the name shadows promoted ones and yields `None`.
pub(crate) fn find_field(shape: &'static Shape, name: &str) -> Option<FieldRoute> {
    let composite = base_type(shape);
    let fields = shape::struct_fields(composite)?;

    if let Some(field) = fields.iter().find(|f| f.name == name && !f.is_flattened()) {
        return (!members_of(composite).is_internal(field.name)).then_some(FieldRoute {
            embedded: None,
            field,
        });
    }

    exported_fields(composite)
        .filter(|outer| outer.is_flattened())
        .find_map(|outer| {
            let field = exported_fields(base_type(outer.shape()))
                .find(|f| f.name == name && !f.is_flattened())?;
            Some(FieldRoute {
                embedded: Some(outer),
                field,
            })
        })
}

/// Method `name` of the composite behind `shape`, if visible.
///
/// Reference-receiver methods are visible when `shape` is itself a reference
/// or when the caller holds the composite through a mutable borrow
/// (`addressed`).
pub(crate) fn find_method(shape: &'static Shape, name: &str, addressed: bool) -> Option<&'static MethodDef> {
    let through_reference = addressed || shape::kind_of(shape) == ShapeKind::Reference;
    let composite = base_type(shape);
    if shape::kind_of(composite) != ShapeKind::Composite {
        return None;
    }
    let method = members_of(composite).method(name)?;
    match method.receiver {
        Receiver::Value => Some(method),
        Receiver::Reference if through_reference => Some(method),
        Receiver::Reference => None,
    }
}

// ============================================================================
// Value-level lookup
// ============================================================================

/// Follow `route` through `value` and every reference layer on the way.
pub(crate) fn read_route<'a>(value: ValueRef<'a>, route: &FieldRoute) -> Option<ValueRef<'a>> {
    let composite = exact_value(value)?;
    match route.embedded {
        None => composite.field(route.field),
        Some(outer) => exact_value(composite.field(outer)?)?.field(route.field),
    }
}

/// Mutable counterpart of [`read_route`]. Null layers are not allocated.
pub(crate) fn route_mut<'a>(value: ValueMut<'a>, route: &FieldRoute) -> Option<ValueMut<'a>> {
    let composite = exact_value_mut(value)?;
    match route.embedded {
        None => composite.into_field(route.field),
        Some(outer) => exact_value_mut(composite.into_field(outer)?)?.into_field(route.field),
    }
}

/// Exported field `name` of `base`, looking through reference layers and one
/// level of flattening.
pub fn resolve_field<'a>(base: ValueRef<'a>, name: &str) -> Option<ValueRef<'a>> {
    let route = find_field(base.shape(), name)?;
    read_route(base, &route)
}

pub(crate) fn resolve_field_mut<'a>(base: ValueMut<'a>, name: &str) -> Option<ValueMut<'a>> {
    let route = find_field(base.shape(), name)?;
    route_mut(base, &route)
}

/// Method `name` visible on `base`.
///
/// Layers are stripped down to a single reference first. A method bound at
/// that reference level sees the full method set; a bare composite only
/// offers its value-receiver methods.
pub fn resolve_method(base: ValueRef<'_>, name: &str) -> Option<&'static MethodDef> {
    let reduced = reduce_to_single_reference(base)?;
    find_method(reduced.shape(), name, false)
}

/// Whether `method` was registered for `shape`.
fn is_method_of(shape: &'static Shape, method: &MethodDef) -> bool {
    members_of(shape).methods.iter().any(|m| core::ptr::eq(m, method))
}

/// Call accessor `method` on the composite behind `base`.
pub(crate) fn call_accessor(base: ValueRef<'_>, method: &MethodDef) -> Option<Produced> {
    let MethodKind::Accessor { call, .. } = method.kind else {
        return None;
    };
    let receiver = exact_value(base)?;
    if !is_method_of(receiver.shape(), method) {
        return None;
    }
    // SAFETY: the method was registered for the receiver's type
    Some(unsafe { call(receiver.as_ptr()) })
}

/// Call setter `method` on the composite behind `base`.
///
/// Returns `false` if `base` is null, is not the method's composite, or
/// `value` is not of the setter's parameter type.
pub(crate) fn call_setter(base: ValueMut<'_>, method: &MethodDef, value: ValueRef<'_>) -> bool {
    let MethodKind::Setter { input, call } = method.kind else {
        return false;
    };
    if !shape::same_type(input, value.shape()) {
        return false;
    }
    let Some(mut receiver) = exact_value_mut(base) else {
        return false;
    };
    if !is_method_of(receiver.shape(), method) {
        return false;
    }
    // SAFETY: the receiver and the value have the registered types
    unsafe { call(receiver.as_mut_ptr(), value.as_ptr()) };
    true
}
