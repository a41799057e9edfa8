//! Method registration.
//!
//! Fields come from `#[derive(Facet)]`. `members!` adds what facet does not
//! record: accessor and setter methods, and fields that must never be copied.

#[doc(hidden)]
pub mod __private {
    pub use facet_core::{Facet, Shape};
}

/// Implement [`Members`](crate::Members) for a composite.
///
/// `accessors` lists `fn name(&self) -> T` methods readable as members,
/// `setters` lists `fn name(&mut self, value: T)` methods writable as members
/// (they are handed a clone of the source value), and `internal` lists fields
/// that are never read or written by name. Call
/// [`register`](crate::register) once before copying.
///
/// ```
/// use facet::Facet;
///
/// #[derive(Facet, Default)]
/// pub struct User {
///     pub name: String,
///     pub age: i32,
///     secret: String,
/// }
///
/// impl User {
///     pub fn double_age(&self) -> i32 {
///         self.age * 2
///     }
///
///     pub fn set_secret(&mut self, secret: String) {
///         self.secret = secret;
///     }
/// }
///
/// ditto::members! {
///     User {
///         accessors { double_age -> i32 }
///         setters { set_secret(String) }
///         internal { secret }
///     }
/// }
///
/// ditto::register::<User>();
/// ```
#[macro_export]
macro_rules! members {
    (
        $ty:ty {
            $(accessors { $($getter:ident -> $gty:ty),* $(,)? })?
            $(setters { $($setter:ident ( $sty:ty )),* $(,)? })?
            $(internal { $($internal:ident),* $(,)? })?
        }
    ) => {
        impl $crate::Members for $ty {
            const MEMBERS: &'static $crate::MemberTable = &$crate::MemberTable {
                methods: &[
                    $($(
                        $crate::MethodDef {
                            name: stringify!($getter),
                            receiver: $crate::Receiver::Value,
                            kind: $crate::MethodKind::Accessor {
                                output: <$gty as $crate::__private::Facet<'static>>::SHAPE,
                                call: {
                                    unsafe fn call(this: *const u8) -> $crate::Produced {
                                        let this = unsafe { &*this.cast::<$ty>() };
                                        let value: $gty = this.$getter();
                                        $crate::Produced::new(value)
                                    }
                                    call
                                },
                            },
                        },
                    )*)?
                    $($(
                        $crate::MethodDef {
                            name: stringify!($setter),
                            receiver: $crate::Receiver::Reference,
                            kind: $crate::MethodKind::Setter {
                                input: <$sty as $crate::__private::Facet<'static>>::SHAPE,
                                call: {
                                    unsafe fn call(this: *mut u8, value: *const u8) {
                                        let this = unsafe { &mut *this.cast::<$ty>() };
                                        let value = unsafe { &*value.cast::<$sty>() };
                                        this.$setter(::core::clone::Clone::clone(value));
                                    }
                                    call
                                },
                            },
                        },
                    )*)?
                ],
                internal: &[$($(stringify!($internal)),*)?],
            };
        }
    };
}
