//! Registrations that facet shapes do not carry.
//!
//! Facet describes fields and containers but not methods, field visibility or
//! how to clone an opaque value. Those come from two process-wide tables keyed
//! by the facet type id: member tables (accessors, setters and internal
//! fields) registered with [`register`], and scalar clone functions
//! registered with [`register_scalar`]. The built-in scalar types are present
//! from the start.

use core::any::Any;
use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use facet_core::{ConstTypeId, Facet, Shape};

use crate::value::ValueRef;

/// Clone the value at the second pointer into the value at the first.
pub(crate) type AssignFn = unsafe fn(*mut u8, *const u8);

/// Method members and internal fields of one composite type.
#[derive(Debug)]
pub struct MemberTable {
    pub methods: &'static [MethodDef],
    /// Fields that are never read or written by name.
    pub internal: &'static [&'static str],
}

impl MemberTable {
    pub const EMPTY: MemberTable = MemberTable {
        methods: &[],
        internal: &[],
    };

    pub fn method(&self, name: &str) -> Option<&'static MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn is_internal(&self, field: &str) -> bool {
        self.internal.contains(&field)
    }
}

/// A registered method.
pub struct MethodDef {
    pub name: &'static str,
    pub receiver: Receiver,
    pub kind: MethodKind,
}

impl MethodDef {
    /// Parameter shape of a setter.
    pub fn input(&self) -> Option<&'static Shape> {
        match self.kind {
            MethodKind::Setter { input, .. } => Some(input),
            MethodKind::Accessor { .. } => None,
        }
    }

    /// Result shape of an accessor.
    pub fn output(&self) -> Option<&'static Shape> {
        match self.kind {
            MethodKind::Accessor { output, .. } => Some(output),
            MethodKind::Setter { .. } => None,
        }
    }
}

impl core::fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            MethodKind::Accessor { output, .. } => {
                write!(f, "{}() -> {}", self.name, output.type_identifier)
            }
            MethodKind::Setter { input, .. } => write!(f, "{}({})", self.name, input.type_identifier),
        }
    }
}

#[derive(Clone, Copy)]
pub enum MethodKind {
    /// `fn name(&self) -> T`.
    Accessor {
        output: &'static Shape,
        /// Calls the method on the composite at the pointer.
        call: unsafe fn(*const u8) -> Produced,
    },
    /// `fn name(&mut self, value: T)`, fed a clone of the source value.
    Setter {
        input: &'static Shape,
        call: unsafe fn(*mut u8, *const u8),
    },
}

/// Which views of a composite expose a method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// Visible on the composite itself and through any reference to it.
    Value,
    /// Visible only through a reference or a mutable borrow.
    Reference,
}

/// A value returned by an accessor.
pub struct Produced {
    value: Box<dyn Any>,
    shape: &'static Shape,
}

impl Produced {
    pub fn new<T: Facet<'static> + 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            shape: T::SHAPE,
        }
    }

    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    pub fn as_value(&self) -> ValueRef<'_> {
        let ptr = (&*self.value as *const dyn Any).cast::<u8>();
        // SAFETY: the box holds a value of `self.shape` for as long as `self`
        unsafe { ValueRef::from_raw(ptr, self.shape) }
    }
}

/// Composite types with registered methods or internal fields.
///
/// Implemented by [`members!`](crate::members!).
pub trait Members: Facet<'static> {
    const MEMBERS: &'static MemberTable;
}

// ============================================================================
// Tables
// ============================================================================

static TABLES: LazyLock<RwLock<HashMap<ConstTypeId, &'static MemberTable>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

static SCALARS: LazyLock<RwLock<HashMap<ConstTypeId, AssignFn>>> = LazyLock::new(|| {
    let mut scalars = HashMap::new();
    macro_rules! builtin {
        ($($ty:ty),*) => {
            $(scalars.insert(<$ty as Facet<'static>>::SHAPE.id, assign::<$ty> as AssignFn);)*
        };
    }
    builtin!(
        bool, char, (), String, &'static str, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64,
        i128, isize, f32, f64
    );
    RwLock::new(scalars)
});

/// Make the methods and internal fields of `T` known to the copier.
///
/// Registering the same table twice is a no-op. Otherwise every cached copy
/// plan that involves `T` is dropped.
pub fn register<T: Members>() {
    let mut tables = TABLES.write().unwrap_or_else(PoisonError::into_inner);
    let previous = tables.insert(T::SHAPE.id, T::MEMBERS);
    drop(tables);

    if previous.is_some_and(|p| core::ptr::eq(p, T::MEMBERS)) {
        return;
    }
    tracing::debug!(
        shape = T::SHAPE.type_identifier,
        methods = T::MEMBERS.methods.len(),
        internal = T::MEMBERS.internal.len(),
        "registered members"
    );
    crate::plan::invalidate(T::SHAPE);
}

/// Let values of `T` be copied by cloning the whole value.
pub fn register_scalar<T: Facet<'static> + Clone>() {
    SCALARS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(T::SHAPE.id, assign::<T>);
}

pub(crate) fn members_of(shape: &'static Shape) -> &'static MemberTable {
    TABLES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&shape.id)
        .copied()
        .unwrap_or(&MemberTable::EMPTY)
}

pub(crate) fn assign_fn(shape: &'static Shape) -> Option<AssignFn> {
    SCALARS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&shape.id)
        .copied()
}

unsafe fn assign<T: Clone>(dst: *mut u8, src: *const u8) {
    // SAFETY: callers pass initialized values of T
    unsafe { (*dst.cast::<T>()).clone_from(&*src.cast::<T>()) }
}
