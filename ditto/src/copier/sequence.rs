//! Sequences: appending deep copies of source elements.

use super::Copier;
use crate::errors::{CopyErrorKind, CopyErrors};
use crate::normalize::exact_value;
use crate::path::PathSegment;
use crate::shape::{self, ShapeKind};
use crate::value::{ValueMut, ValueRef};

/// What gets appended to the destination.
#[derive(Clone, Copy)]
enum Elements<'a> {
    /// Every element of a source sequence.
    Sequence(ValueRef<'a>),
    /// A single composite, broadcast as a one-element sequence.
    Single(ValueRef<'a>),
}

impl<'a> Elements<'a> {
    fn len(&self) -> usize {
        match self {
            Elements::Sequence(seq) => seq.len().unwrap_or(0),
            Elements::Single(_) => 1,
        }
    }

    fn get(&self, index: usize) -> Option<ValueRef<'a>> {
        match *self {
            Elements::Sequence(seq) => seq.element(index),
            Elements::Single(value) => (index == 0).then_some(value),
        }
    }
}

impl Copier {
    /// Append copies of `source` to the sequence `destination`.
    ///
    /// A source sequence contributes all of its elements and a composite
    /// contributes itself. Scalars cannot be appended.
    pub(super) fn copy_into_sequence(
        &mut self,
        destination: ValueMut<'_>,
        source: ValueRef<'_>,
    ) -> Result<(), CopyErrors> {
        let dest_shape = destination.shape();
        let Some(payload) = exact_value(source) else {
            tracing::trace!(path = %self.path, "source sequence holds no value, skipping");
            return Ok(());
        };

        let elements = match payload.kind() {
            ShapeKind::Sequence => Elements::Sequence(payload),
            ShapeKind::Composite => Elements::Single(payload),
            ShapeKind::Scalar | ShapeKind::Reference => {
                return Err(self.fail(CopyErrorKind::UnsupportedSourceShape {
                    destination: dest_shape,
                    source: payload.shape(),
                }));
            }
        };

        if destination.kind() != ShapeKind::Sequence {
            return Err(self.fail(CopyErrorKind::ShapeMismatch {
                expected: dest_shape,
                actual: payload.shape(),
            }));
        }
        self.copy_sequence(destination, elements)
    }

    /// Append one default element per source element and deep-copy each
    /// source element into it.
    ///
    /// Existing elements are kept. A failed element still appends whatever
    /// part of it was copied.
    fn copy_sequence(&mut self, mut destination: ValueMut<'_>, elements: Elements<'_>) -> Result<(), CopyErrors> {
        let count = elements.len();
        destination.reserve(count);
        let start = destination.len().unwrap_or(0);

        let mut errors = CopyErrors::new();
        self.indirection += 1;
        for offset in 0..count {
            let Some(item) = elements.get(offset) else {
                continue;
            };
            self.path.push(PathSegment::Index(start + offset));

            let appended = destination.push_with(|element| self.dispatch(element, item));
            match appended {
                Some(Ok(())) => {}
                Some(Err(element_errors)) => errors.extend(element_errors),
                None => {
                    let expected = shape::element_of(destination.shape()).unwrap_or(destination.shape());
                    errors.extend(self.fail(CopyErrorKind::UnsettableDestination { shape: expected }));
                }
            }

            self.path.pop();
        }
        self.indirection -= 1;

        tracing::trace!(path = %self.path, appended = count, "sequence copied");
        errors.into_result()
    }
}
