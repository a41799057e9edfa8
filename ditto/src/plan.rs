//! Copy plans: the member mapping between one destination composite and one
//! source composite, resolved by name once and then cached for the process.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use facet_core::{ConstTypeId, Shape};

use crate::members::addressed_member_names;
use crate::registry::{MethodDef, MethodKind};
use crate::resolve::{FieldRoute, find_field, find_method};
use crate::shape::{self, ShapeKind};

/// Where a member's value is read from.
#[derive(Clone, Copy, Debug)]
pub(crate) enum SourceSlot {
    Field(FieldRoute),
    /// Zero-argument accessor, called once per copy.
    Accessor {
        method: &'static MethodDef,
        output: &'static Shape,
    },
}

/// Where a member's value is written to.
#[derive(Clone, Copy, Debug)]
pub(crate) enum TargetSlot {
    /// A setter that accepts the source value's type.
    ///
    /// `sequence_field` is a same-named sequence field. While it is still
    /// empty the value is copied into it directly and the setter is skipped.
    Setter {
        method: &'static MethodDef,
        sequence_field: Option<FieldRoute>,
    },
    Field(FieldRoute),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Entry {
    pub(crate) name: &'static str,
    pub(crate) source: SourceSlot,
    pub(crate) target: TargetSlot,
}

impl Entry {
    /// Shape of the value read from the source.
    pub(crate) fn source_shape(&self) -> &'static Shape {
        match self.source {
            SourceSlot::Field(route) => route.shape(),
            SourceSlot::Accessor { output, .. } => output,
        }
    }
}

/// Ordered member mapping from one composite shape to another.
pub(crate) struct Plan {
    pub(crate) destination: &'static Shape,
    pub(crate) source: &'static Shape,
    entries: Vec<Entry>,
}

impl Plan {
    /// Resolve every candidate destination name against `source`.
    ///
    /// Names without a readable source or a writable target are left out.
    pub(crate) fn compile(destination: &'static Shape, source: &'static Shape) -> Plan {
        let mut entries = Vec::new();
        for name in addressed_member_names(destination) {
            let Some(source_slot) = source_slot(source, name) else {
                tracing::trace!(member = name, source = shape::name(source), "no readable source member");
                continue;
            };
            let source_shape = match source_slot {
                SourceSlot::Field(route) => route.shape(),
                SourceSlot::Accessor { output, .. } => output,
            };
            let Some(target) = target_slot(destination, name, source_shape) else {
                tracing::trace!(
                    member = name,
                    destination = shape::name(destination),
                    "no writable destination member"
                );
                continue;
            };
            entries.push(Entry {
                name,
                source: source_slot,
                target,
            });
        }
        Plan {
            destination,
            source,
            entries,
        }
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

fn source_slot(source: &'static Shape, name: &str) -> Option<SourceSlot> {
    if let Some(route) = find_field(source, name) {
        return Some(SourceSlot::Field(route));
    }
    let method = find_method(source, name, true)?;
    match method.kind {
        MethodKind::Accessor { output, .. } => Some(SourceSlot::Accessor { method, output }),
        MethodKind::Setter { .. } => None,
    }
}

fn target_slot(destination: &'static Shape, name: &str, value: &'static Shape) -> Option<TargetSlot> {
    let field = find_field(destination, name);
    let setter = find_method(destination, name, true)
        .filter(|m| m.input().is_some_and(|input| shape::same_type(input, value)));

    match (setter, field) {
        (Some(method), field) => Some(TargetSlot::Setter {
            method,
            sequence_field: field.filter(|f| shape::kind_of(f.shape()) == ShapeKind::Sequence),
        }),
        (None, Some(field)) => Some(TargetSlot::Field(field)),
        (None, None) => None,
    }
}

// ============================================================================
// Cache
// ============================================================================

static PLANS: LazyLock<Mutex<HashMap<(ConstTypeId, ConstTypeId), &'static Plan>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// The cached plan for copying `source` into `destination`.
///
/// Plans are compiled on first use and leaked, so the returned reference lives
/// for the rest of the process. The number of plans is bounded by the number
/// of composite type pairs the program copies between, plus one per
/// re-registration of a member table.
pub(crate) fn plan_for(destination: &'static Shape, source: &'static Shape) -> &'static Plan {
    let key = (destination.id, source.id);
    let mut plans = PLANS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(plan) = plans.get(&key) {
        return plan;
    }
    let plan: &'static Plan = Box::leak(Box::new(Plan::compile(destination, source)));
    tracing::debug!(
        destination = shape::name(destination),
        source = shape::name(source),
        entries = plan.len(),
        "compiled copy plan"
    );
    plans.insert(key, plan);
    plan
}

/// Forget every cached plan that copies to or from `shape`.
pub(crate) fn invalidate(shape: &'static Shape) {
    let mut plans = PLANS.lock().unwrap_or_else(PoisonError::into_inner);
    plans.retain(|(destination, source), _| *destination != shape.id && *source != shape.id);
}
