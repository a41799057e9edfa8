//! Name-based copying between facet values.
//!
//! `Copier` walks a destination and a source together. Composites are copied
//! member by member through a cached [`Plan`](crate::plan::Plan), sequences
//! element by element, references by growing the destination chain and
//! copying payloads. Member and element failures are collected and returned
//! together once every sibling has been attempted.

mod sequence;
mod value;

#[cfg(test)]
mod tests;

use facet_core::{ConstTypeId, Facet, Shape};

use crate::errors::{CopyError, CopyErrorKind, CopyErrors};
use crate::normalize::{depth, exact_value};
use crate::path::{Path, PathSegment};
use crate::plan::{Entry, SourceSlot, TargetSlot, plan_for};
use crate::registry::Produced;
use crate::resolve::{call_accessor, call_setter, read_route, route_mut};
use crate::shape::{self, ShapeKind};
use crate::value::{ValueMut, ValueRef};

/// Limits applied to one copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Maximum number of nested composite and sequence levels. `None`, the
    /// default, copies finite values of any depth.
    pub max_depth: Option<usize>,
}

impl CopyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// A composite or sequence copy in progress.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Frame {
    destination: ConstTypeId,
    source: ConstTypeId,
    indirection: usize,
}

/// Copies values by member name.
///
/// A `Copier` can be reused; every call to [`copy`](Copier::copy) starts from
/// a clean state.
pub struct Copier {
    options: CopyOptions,
    /// Member and index path of the value being copied.
    path: Path,
    /// Open composite and sequence frames, outermost first.
    stack: Vec<Frame>,
    /// Reference layers and sequence elements crossed so far.
    indirection: usize,
}

impl Default for Copier {
    fn default() -> Self {
        Self::new()
    }
}

impl Copier {
    pub fn new() -> Self {
        Self::with_options(CopyOptions::default())
    }

    pub fn with_options(options: CopyOptions) -> Self {
        Self {
            options,
            path: Path::root(),
            stack: Vec::new(),
            indirection: 0,
        }
    }

    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Copy every member of `source` that `destination` can take.
    ///
    /// If the two values sit behind a different number of reference layers
    /// nothing is copied and `Ok(())` is returned. This also holds for
    /// members: `Option<String>` is never copied into `String`.
    pub fn copy<D, S>(&mut self, destination: &mut D, source: &S) -> Result<(), CopyErrors>
    where
        D: Facet<'static>,
        S: Facet<'static>,
    {
        self.copy_erased(ValueMut::new(destination), ValueRef::new(source))
    }

    /// [`copy`](Copier::copy) over type-erased views.
    pub fn copy_erased(&mut self, destination: ValueMut<'_>, source: ValueRef<'_>) -> Result<(), CopyErrors> {
        self.path.clear();
        self.stack.clear();
        self.indirection = 0;

        let span = tracing::debug_span!(
            "copy",
            destination = shape::name(destination.shape()),
            source = shape::name(source.shape()),
        );
        let _enter = span.enter();

        let result = self.dispatch(destination, source);
        if let Err(errors) = &result {
            tracing::debug!(failures = errors.len(), "copy finished with failures");
        }
        result
    }

    /// Classify the pair and copy it.
    fn dispatch(&mut self, destination: ValueMut<'_>, source: ValueRef<'_>) -> Result<(), CopyErrors> {
        let dest_shape = destination.shape();
        let src_shape = source.shape();

        if depth(dest_shape) != depth(src_shape) {
            tracing::trace!(
                path = %self.path,
                destination = shape::name(dest_shape),
                source = shape::name(src_shape),
                "indirection depth differs, nothing to copy"
            );
            return Ok(());
        }

        match destination.kind() {
            ShapeKind::Reference => self.copy_reference(destination, source).map(drop),
            ShapeKind::Sequence => {
                self.enter(dest_shape, src_shape)?;
                let result = self.copy_into_sequence(destination, source);
                self.leave();
                result
            }
            ShapeKind::Composite => {
                self.enter(dest_shape, src_shape)?;
                let result = self.copy_composite(destination, source);
                self.leave();
                result
            }
            ShapeKind::Scalar => self.copy_value(destination, source).map(drop),
        }
    }

    // ========================================================================
    // Composites
    // ========================================================================

    fn copy_composite(&mut self, mut destination: ValueMut<'_>, source: ValueRef<'_>) -> Result<(), CopyErrors> {
        let dest_shape = destination.shape();
        let src_shape = source.shape();
        if source.kind() != ShapeKind::Composite {
            return Err(self.fail(CopyErrorKind::ShapeMismatch {
                expected: dest_shape,
                actual: src_shape,
            }));
        }

        let plan = plan_for(dest_shape, src_shape);
        tracing::trace!(
            path = %self.path,
            destination = shape::name(plan.destination),
            source = shape::name(plan.source),
            members = plan.len(),
            "copying composite"
        );
        let mut errors = CopyErrors::new();
        for entry in plan.entries() {
            self.path.push(PathSegment::Member(entry.name));
            if let Err(member_errors) = self.copy_member(destination.reborrow(), source, entry) {
                errors.extend(member_errors);
            }
            self.path.pop();
        }
        errors.into_result()
    }

    fn copy_member(
        &mut self,
        mut destination: ValueMut<'_>,
        source: ValueRef<'_>,
        entry: &Entry,
    ) -> Result<(), CopyErrors> {
        let produced: Produced;
        let value = match entry.source {
            SourceSlot::Field(route) => match read_route(source, &route) {
                Some(value) => value,
                None => {
                    tracing::trace!(path = %self.path, "source member unreachable, skipping");
                    return Ok(());
                }
            },
            SourceSlot::Accessor { method, .. } => match call_accessor(source, method) {
                Some(value) => {
                    produced = value;
                    produced.as_value()
                }
                None => {
                    tracing::trace!(path = %self.path, "accessor not callable, skipping");
                    return Ok(());
                }
            },
        };

        match entry.target {
            TargetSlot::Setter {
                method,
                sequence_field,
            } => {
                if let Some(route) = sequence_field {
                    if let Some(slot) = route_mut(destination.reborrow(), &route) {
                        if is_unset_sequence(slot.as_ref()) {
                            return self.dispatch(slot, value);
                        }
                    }
                }
                if call_setter(destination, method, value) {
                    Ok(())
                } else {
                    Err(self.fail(CopyErrorKind::ShapeMismatch {
                        expected: method.input().unwrap_or(value.shape()),
                        actual: value.shape(),
                    }))
                }
            }
            TargetSlot::Field(route) => {
                let Some(slot) = route_mut(destination, &route) else {
                    tracing::trace!(path = %self.path, "destination member unreachable, skipping");
                    return Ok(());
                };
                if slot.kind() == ShapeKind::Sequence {
                    self.dispatch(slot, value)
                } else {
                    self.copy_value(slot, value).map(drop)
                }
            }
        }
    }

    // ========================================================================
    // Bookkeeping
    // ========================================================================

    fn enter(&mut self, destination: &'static Shape, source: &'static Shape) -> Result<(), CopyErrors> {
        if let Some(limit) = self.options.max_depth {
            if self.stack.len() >= limit {
                return Err(self.fail(CopyErrorKind::DepthLimitExceeded { limit }));
            }
        }
        let frame = Frame {
            destination: destination.id,
            source: source.id,
            indirection: self.indirection,
        };
        if self.stack.contains(&frame) {
            return Err(self.fail(CopyErrorKind::CyclicShape { shape: destination }));
        }
        self.stack.push(frame);
        Ok(())
    }

    fn leave(&mut self) {
        self.stack.pop();
    }

    /// Record a failure at the current path.
    fn fail(&self, kind: CopyErrorKind) -> CopyErrors {
        let error = CopyError::new(self.path.clone(), kind);
        tracing::debug!(%error, "copy failed");
        CopyErrors::single(error)
    }

    /// Whether the copy is still at its top-level arguments.
    fn at_root(&self) -> bool {
        self.path.is_empty()
    }
}

/// An empty sequence, or a null reference to one.
fn is_unset_sequence(slot: ValueRef<'_>) -> bool {
    match exact_value(slot) {
        None => true,
        Some(value) => value.len() == Some(0),
    }
}

/// Copy `source` into `destination` with default options.
///
/// Members are matched by name: exported fields and accessors of the source
/// feed exported fields and setters of the destination. Every member is
/// attempted; the returned [`CopyErrors`] lists all that failed while the
/// destination keeps whatever did copy.
///
/// Values behind a different number of reference layers are skipped silently,
/// both at the top level and for members.
pub fn copy<D, S>(destination: &mut D, source: &S) -> Result<(), CopyErrors>
where
    D: Facet<'static>,
    S: Facet<'static>,
{
    Copier::new().copy(destination, source)
}
