//! # ditto
//!
//! Deep copies between unrelated types, matched by member name.
//!
//! Types take part by deriving [`facet::Facet`]. Their facet shape tells
//! [`copy`] what each value is: a reference layer (`Option<T>`, `Box<T>`), a
//! composite record (a struct), a sequence (`Vec<T>`) or an opaque scalar.
//! `copy` walks the destination and source shapes together:
//!
//! - composites are copied member by member. Exported fields and accessor
//!   methods of the source feed exported fields and setter methods of the
//!   destination with the same name;
//! - sequences get one freshly copied element appended per source element;
//! - references are followed on both sides, allocating default payloads for
//!   null destination layers;
//! - scalars are assigned only from the identical type.
//!
//! Facet does not record methods or field visibility. Accessors, setters and
//! internal fields are declared with [`members!`] and made known with
//! [`register`]. Fields marked `#[facet(flatten)]` are embedded: their own
//! fields are promoted one level up.
//!
//! Failures are collected per member and returned together; the destination
//! keeps everything that did copy.
//!
//! **Values behind a different number of reference layers are skipped without
//! an error.** `Option<String>` is never copied into `String` and
//! `Box<User>` is never copied into `User`, and `copy` still returns `Ok`.
//!
//! ```
//! use facet::Facet;
//!
//! #[derive(Facet, Debug, Default)]
//! pub struct User {
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! #[derive(Facet, Debug, Default)]
//! pub struct Employee {
//!     pub name: String,
//!     pub age: i32,
//!     pub salary: u32,
//! }
//!
//! let user = User { name: "Ada".into(), age: 36 };
//! let mut employee = Employee::default();
//! ditto::copy(&mut employee, &user).unwrap();
//! assert_eq!(employee.name, "Ada");
//! assert_eq!(employee.age, 36);
//! ```

// Modules stay private; the public surface is re-exported below.
mod copier;
mod errors;
mod macros;
mod members;
mod normalize;
mod path;
mod plan;
mod registry;
mod resolve;
mod shape;
mod value;

pub use copier::{CopyOptions, Copier, copy};
pub use errors::{CopyError, CopyErrorKind, CopyErrors};
pub use members::{addressed_member_names, member_names};
pub use normalize::{base_type, depth, exact_value, exact_value_mut, reduce_to_single_reference};
pub use path::{Path, PathSegment};
pub use registry::{
    MemberTable, Members, MethodDef, MethodKind, Produced, Receiver, register, register_scalar,
};
pub use resolve::{resolve_field, resolve_method};
pub use shape::{ShapeKind, kind_of};
pub use value::{ValueMut, ValueRef};

#[doc(hidden)]
pub use macros::__private;
