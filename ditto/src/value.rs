//! Type-erased views of values described by facet shapes.
//!
//! A [`ValueRef`] or [`ValueMut`] pairs a pointer with the `&'static Shape` of
//! the value behind it. Fields are reached by offset; options, lists and
//! defaults through the shape's vtables. A view carries the lifetime of the
//! borrow it was created from.

use core::marker::PhantomData;
use std::alloc::{self, Layout};

use facet_core::{Facet, Field, PtrConst, PtrMut, PtrUninit, Shape};

use crate::registry;
use crate::shape::{self, Layer, ShapeKind};

/// Shared view of a value.
#[derive(Clone, Copy)]
pub struct ValueRef<'a> {
    ptr: *const u8,
    shape: &'static Shape,
    _borrow: PhantomData<&'a ()>,
}

/// Mutable view of a value.
pub struct ValueMut<'a> {
    ptr: *mut u8,
    shape: &'static Shape,
    _borrow: PhantomData<&'a mut ()>,
}

impl<'a> ValueRef<'a> {
    pub fn new<T: Facet<'static>>(value: &'a T) -> Self {
        Self {
            ptr: (value as *const T).cast(),
            shape: T::SHAPE,
            _borrow: PhantomData,
        }
    }

    /// # Safety
    /// `ptr` must point to an initialized value of `shape` that stays
    /// borrowed for `'a`.
    pub unsafe fn from_raw(ptr: *const u8, shape: &'static Shape) -> Self {
        Self {
            ptr,
            shape,
            _borrow: PhantomData,
        }
    }

    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        shape::kind_of(self.shape)
    }

    /// The value as a `T`, if that is its type.
    pub fn get<T: Facet<'static>>(&self) -> Option<&'a T> {
        // SAFETY: same shape means same type
        shape::same_type(self.shape, T::SHAPE).then(|| unsafe { &*self.ptr.cast::<T>() })
    }

    /// The value one reference layer down. `None` for a null layer or when
    /// this is not a reference.
    pub fn pointee(&self) -> Option<ValueRef<'a>> {
        let layer = shape::layer(self.shape)?;
        // SAFETY: self.ptr is an initialized value of a layer shape
        let ptr = unsafe { read_layer(layer, self.ptr)? };
        Some(unsafe { ValueRef::from_raw(ptr, layer.pointee()) })
    }

    /// Field `field` of this composite.
    pub fn field(&self, field: &'static Field) -> Option<ValueRef<'a>> {
        if !shape::owns_field(self.shape, field) {
            return None;
        }
        // SAFETY: the field belongs to this struct, so its offset is in bounds
        Some(unsafe { ValueRef::from_raw(self.ptr.add(field.offset), field.shape()) })
    }

    /// Number of elements of a sequence.
    pub fn len(&self) -> Option<usize> {
        let def = shape::list_def(self.shape)?;
        // SAFETY: self.ptr is an initialized list of this def
        Some(unsafe { (def.vtable.len)(PtrConst::new(self.ptr)) })
    }

    pub fn element(&self, index: usize) -> Option<ValueRef<'a>> {
        let def = shape::list_def(self.shape)?;
        // SAFETY: as above; `get` bounds-checks `index`
        let item = unsafe { (def.vtable.get)(PtrConst::new(self.ptr), index, self.shape)? };
        Some(unsafe { ValueRef::from_raw(item.as_byte_ptr(), def.t()) })
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.ptr
    }
}

impl<'a> ValueMut<'a> {
    pub fn new<T: Facet<'static>>(value: &'a mut T) -> Self {
        Self {
            ptr: (value as *mut T).cast(),
            shape: T::SHAPE,
            _borrow: PhantomData,
        }
    }

    /// # Safety
    /// `ptr` must point to an initialized value of `shape`, uniquely borrowed
    /// for `'a`.
    pub unsafe fn from_raw(ptr: *mut u8, shape: &'static Shape) -> Self {
        Self {
            ptr,
            shape,
            _borrow: PhantomData,
        }
    }

    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        shape::kind_of(self.shape)
    }

    pub fn reborrow(&mut self) -> ValueMut<'_> {
        ValueMut {
            ptr: self.ptr,
            shape: self.shape,
            _borrow: PhantomData,
        }
    }

    pub fn as_ref(&self) -> ValueRef<'_> {
        // SAFETY: shared reborrow of a live unique borrow
        unsafe { ValueRef::from_raw(self.ptr, self.shape) }
    }

    pub fn get_mut<T: Facet<'static>>(self) -> Option<&'a mut T> {
        shape::same_type(self.shape, T::SHAPE).then(|| unsafe { &mut *self.ptr.cast::<T>() })
    }

    /// The value one reference layer down, without allocating.
    pub fn into_pointee(self) -> Option<ValueMut<'a>> {
        let layer = shape::layer(self.shape)?;
        // SAFETY: self.ptr is an initialized value of a layer shape
        let ptr = unsafe { read_layer_mut(layer, self.ptr)? };
        Some(unsafe { ValueMut::from_raw(ptr, layer.pointee()) })
    }

    /// The value one reference layer down, filling a null layer with a
    /// default payload first.
    ///
    /// `None` when the payload type has no default.
    pub fn into_pointee_or_insert(self) -> Option<ValueMut<'a>> {
        let layer = shape::layer(self.shape)?;
        // SAFETY: self.ptr is an initialized value of a layer shape
        unsafe {
            if let Some(ptr) = read_layer_mut(layer, self.ptr) {
                return Some(ValueMut::from_raw(ptr, layer.pointee()));
            }
            let Layer::Option(def) = layer else {
                return None;
            };
            let payload = Scratch::new(def.t)?;
            if !default_in_place(def.t, payload.ptr) {
                return None;
            }
            // The old value is `None`, so nothing is dropped by overwriting it.
            (def.vtable.init_some)(PtrUninit::new(self.ptr), PtrConst::new(payload.ptr));
            let ptr = read_layer_mut(layer, self.ptr)?;
            Some(ValueMut::from_raw(ptr, def.t))
        }
    }

    /// Field `field` of this composite.
    pub fn into_field(self, field: &'static Field) -> Option<ValueMut<'a>> {
        if !shape::owns_field(self.shape, field) {
            return None;
        }
        // SAFETY: the field belongs to this struct, so its offset is in bounds
        Some(unsafe { ValueMut::from_raw(self.ptr.add(field.offset), field.shape()) })
    }

    pub fn field(&mut self, field: &'static Field) -> Option<ValueMut<'_>> {
        self.reborrow().into_field(field)
    }

    /// Overwrite this scalar with a clone of `source`.
    pub(crate) fn assign(&mut self, source: ValueRef<'_>) -> Result<(), AssignError> {
        if !shape::same_type(self.shape, source.shape) {
            return Err(AssignError::Mismatch);
        }
        let assign = registry::assign_fn(self.shape).ok_or(AssignError::Unregistered)?;
        // SAFETY: both sides hold initialized values of the registered type
        unsafe { assign(self.ptr, source.ptr) };
        Ok(())
    }

    pub fn len(&self) -> Option<usize> {
        self.as_ref().len()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr
    }

    /// Make room for `additional` more elements, if the sequence supports it.
    pub(crate) fn reserve(&mut self, additional: usize) {
        let Some(reserve) = shape::list_def(self.shape).and_then(|def| def.reserve()) else {
            return;
        };
        // SAFETY: self.ptr is an initialized list
        unsafe { reserve(PtrMut::new(self.ptr), additional) };
    }

    /// Build a default element, let `fill` write into it, then append it.
    ///
    /// `None` when this is not a sequence or the element type has no default.
    pub(crate) fn push_with<R>(&mut self, fill: impl FnOnce(ValueMut<'_>) -> R) -> Option<R> {
        let def = shape::list_def(self.shape)?;
        let push = def.push()?;
        let element = def.t();
        let slot = Scratch::new(element)?;
        // SAFETY: slot is sized and aligned for `element`; push moves the
        // initialized element out, so the slot is released without a drop
        unsafe {
            if !default_in_place(element, slot.ptr) {
                return None;
            }
            let result = fill(ValueMut::from_raw(slot.ptr, element));
            push(PtrMut::new(self.ptr), PtrMut::new(slot.ptr));
            Some(result)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AssignError {
    Mismatch,
    /// Same type, but no clone function was registered for it.
    Unregistered,
}

// ============================================================================
// Raw layer access
// ============================================================================

/// Pointer to the payload of one layer, or `None` if it holds no value.
unsafe fn read_layer(layer: Layer, ptr: *const u8) -> Option<*const u8> {
    match layer {
        Layer::Option(def) => {
            let inner = unsafe { (def.vtable.get_value)(PtrConst::new(ptr))? };
            Some(inner.as_byte_ptr())
        }
        // Box<T> of a sized T is one pointer.
        Layer::Box { .. } => Some(unsafe { ptr.cast::<*const u8>().read() }),
    }
}

/// Mutable counterpart of [`read_layer`], keeping `ptr`'s provenance.
unsafe fn read_layer_mut(layer: Layer, ptr: *mut u8) -> Option<*mut u8> {
    match layer {
        Layer::Option(_) => {
            let inner = unsafe { read_layer(layer, ptr)? };
            let offset = unsafe { inner.offset_from(ptr) };
            Some(unsafe { ptr.offset(offset) })
        }
        Layer::Box { .. } => Some(unsafe { ptr.cast::<*mut u8>().read() }),
    }
}

/// Write a default `shape` into uninitialized `dst`.
///
/// A `Box<T>` without its own default is built from a default `T`.
unsafe fn default_in_place(shape: &'static Shape, dst: *mut u8) -> bool {
    if unsafe { shape.call_default_in_place(PtrMut::new(dst)) }.is_some() {
        return true;
    }
    let Some(Layer::Box { def, pointee }) = shape::layer(shape) else {
        return false;
    };
    let Some(new_into) = def.vtable.new_into_fn else {
        return false;
    };
    let Some(payload) = Scratch::new(pointee) else {
        return false;
    };
    unsafe {
        if !default_in_place(pointee, payload.ptr) {
            return false;
        }
        new_into(PtrUninit::new(dst), PtrMut::new(payload.ptr));
    }
    true
}

/// Uninitialized heap memory for one value of a shape.
///
/// Dropping it frees the memory but never drops a value inside: whatever was
/// built there must be moved out first.
struct Scratch {
    ptr: *mut u8,
    layout: Layout,
}

impl Scratch {
    fn new(shape: &'static Shape) -> Option<Self> {
        let layout = shape::sized_layout(shape)?;
        if layout.size() == 0 {
            return Some(Self {
                ptr: layout.align() as *mut u8,
                layout,
            });
        }
        // SAFETY: layout has a non-zero size
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            alloc::handle_alloc_error(layout);
        }
        Some(Self { ptr, layout })
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: allocated in `new` with this layout
            unsafe { alloc::dealloc(self.ptr, self.layout) };
        }
    }
}
