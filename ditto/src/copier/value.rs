//! Single values: scalar assignment and copies through reference layers.

use super::Copier;
use crate::errors::{CopyErrorKind, CopyErrors};
use crate::normalize::{depth, exact_value};
use crate::shape::{self, ShapeKind};
use crate::value::{AssignError, ValueMut, ValueRef};

impl Copier {
    /// Copy one member value. Returns whether anything was written.
    ///
    /// Scalars are assigned only from the identical type. References are
    /// followed on both sides, composites and sequences go back through
    /// dispatch. Any other pairing at the same depth is a shape mismatch.
    pub(super) fn copy_value(&mut self, mut destination: ValueMut<'_>, source: ValueRef<'_>) -> Result<bool, CopyErrors> {
        let dest_shape = destination.shape();
        let src_shape = source.shape();

        if depth(dest_shape) != depth(src_shape) {
            tracing::trace!(
                path = %self.path,
                destination = shape::name(dest_shape),
                source = shape::name(src_shape),
                "indirection depth differs, nothing to copy"
            );
            return Ok(false);
        }

        match (destination.kind(), source.kind()) {
            (ShapeKind::Scalar, ShapeKind::Scalar) => match destination.assign(source) {
                Ok(()) => Ok(true),
                Err(AssignError::Unregistered) => {
                    Err(self.fail(CopyErrorKind::UnregisteredScalar { shape: dest_shape }))
                }
                Err(AssignError::Mismatch) => Err(self.fail(CopyErrorKind::ShapeMismatch {
                    expected: dest_shape,
                    actual: src_shape,
                })),
            },
            (ShapeKind::Reference, ShapeKind::Reference) => self.copy_reference(destination, source),
            (ShapeKind::Composite, ShapeKind::Composite) | (ShapeKind::Sequence, ShapeKind::Sequence) => {
                self.dispatch(destination, source).map(|()| true)
            }
            _ => Err(self.fail(CopyErrorKind::ShapeMismatch {
                expected: dest_shape,
                actual: src_shape,
            })),
        }
    }

    /// Copy the payload behind `source` into the payload behind `destination`.
    ///
    /// Null layers on the destination side get a default payload. The source
    /// is never aliased: its payload is copied member by member.
    pub(super) fn copy_reference(
        &mut self,
        destination: ValueMut<'_>,
        source: ValueRef<'_>,
    ) -> Result<bool, CopyErrors> {
        let dest_shape = destination.shape();
        let src_shape = source.shape();

        let Some(payload) = exact_value(source) else {
            if self.at_root() {
                return Err(self.fail(CopyErrorKind::UnreadableSource { shape: src_shape }));
            }
            tracing::trace!(
                path = %self.path,
                source = shape::name(src_shape),
                "source holds no value, skipping"
            );
            return Ok(false);
        };

        let layers = depth(dest_shape);
        let Some(slot) = grow_chain(destination) else {
            if self.at_root() {
                return Err(self.fail(CopyErrorKind::UnsettableDestination { shape: dest_shape }));
            }
            tracing::trace!(
                path = %self.path,
                destination = shape::name(dest_shape),
                "destination cannot be written, skipping"
            );
            return Ok(false);
        };

        self.indirection += layers;
        let result = self.dispatch(slot, payload);
        self.indirection -= layers;
        result.map(|()| true)
    }
}

/// Walk every reference layer of `value`, allocating default payloads for
/// null ones. `None` if a payload type has no default.
fn grow_chain(value: ValueMut<'_>) -> Option<ValueMut<'_>> {
    let mut current = value;
    while current.kind() == ShapeKind::Reference {
        current = current.into_pointee_or_insert()?;
    }
    Some(current)
}
