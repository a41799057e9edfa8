//! Candidate member names for a destination shape.
//!
//! Order: names visible on the referenced shape first, then the methods bound
//! at the current level, then exported fields in declaration order, then the
//! exported fields promoted from flattened composites. A name appears once,
//! at its first position.

use facet_core::{Field, Shape};

use crate::normalize::base_type;
use crate::registry::{Receiver, members_of};
use crate::shape::{self, ShapeKind};

/// Candidate names for `shape`, which may be a reference or a composite.
pub fn member_names(shape: &'static Shape) -> Vec<&'static str> {
    let mut names = Vec::new();
    collect(shape, &mut names);
    names
}

/// Candidate names for a composite reached through a mutable borrow.
///
/// Equivalent to [`member_names`] on a reference to `shape`, so
/// reference-receiver setters are included.
pub fn addressed_member_names(shape: &'static Shape) -> Vec<&'static str> {
    let mut names = Vec::new();
    collect_through_reference(shape, &mut names);
    names
}

/// Exported fields of `shape` in declaration order, flattened ones included.
pub(crate) fn exported_fields(shape: &'static Shape) -> impl Iterator<Item = &'static Field> {
    let table = members_of(shape);
    shape::struct_fields(shape)
        .unwrap_or(&[])
        .iter()
        .filter(move |field| !table.is_internal(field.name))
}

fn collect(shape: &'static Shape, names: &mut Vec<&'static str>) {
    match shape::layer(shape) {
        Some(layer) => collect_through_reference(layer.pointee(), names),
        None => collect_direct(shape, names),
    }
}

fn collect_through_reference(pointee: &'static Shape, names: &mut Vec<&'static str>) {
    if shape::kind_of(pointee) == ShapeKind::Sequence {
        return;
    }
    collect(pointee, names);

    // A reference's own method set: every method of the composite it points at.
    if shape::kind_of(pointee) == ShapeKind::Composite {
        for method in members_of(pointee).methods {
            push_unique(names, method.name);
        }
    }
}

fn collect_direct(shape: &'static Shape, names: &mut Vec<&'static str>) {
    if shape::kind_of(shape) != ShapeKind::Composite {
        return;
    }
    for method in members_of(shape).methods {
        if method.receiver == Receiver::Value {
            push_unique(names, method.name);
        }
    }
    for field in exported_fields(shape).filter(|f| !f.is_flattened()) {
        push_unique(names, field.name);
    }
    for outer in exported_fields(shape).filter(|f| f.is_flattened()) {
        for field in exported_fields(base_type(outer.shape())).filter(|f| !f.is_flattened()) {
            push_unique(names, field.name);
        }
    }
}

fn push_unique(names: &mut Vec<&'static str>, name: &'static str) {
    if !names.contains(&name) {
        names.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet::Facet;

    #[derive(Facet, Default)]
    struct Account {
        id: u64,
        hidden: bool,
        owner: String,
    }

    impl Account {
        fn label(&self) -> String {
            format!("{}#{}", self.owner, self.id)
        }

        fn rename(&mut self, owner: String) {
            self.owner = owner;
            self.hidden = false;
        }
    }

    crate::members! {
        Account {
            accessors { label -> String }
            setters { rename(String) }
            internal { hidden }
        }
    }

    #[derive(Facet, Default)]
    struct Ledger {
        id: u64,
        #[facet(flatten)]
        account: Account,
    }

    fn setup() {
        crate::register::<Account>();
    }

    #[test]
    fn composite_by_value_hides_reference_methods() {
        setup();
        assert_eq!(member_names(Account::SHAPE), vec!["label", "id", "owner"]);
    }

    #[test]
    fn reference_adds_its_method_set_after_the_pointee() {
        setup();
        assert_eq!(
            member_names(<Box<Account>>::SHAPE),
            vec!["label", "id", "owner", "rename"]
        );
        assert_eq!(
            addressed_member_names(Account::SHAPE),
            member_names(<Box<Account>>::SHAPE)
        );
    }

    #[test]
    fn internal_fields_are_skipped() {
        setup();
        assert!(!member_names(<Box<Account>>::SHAPE).contains(&"hidden"));
    }

    #[test]
    fn double_reference_lists_each_name_once() {
        setup();
        assert_eq!(
            member_names(<Option<Box<Account>>>::SHAPE),
            vec!["label", "id", "owner", "rename"]
        );
    }

    #[test]
    fn flattened_fields_follow_direct_fields() {
        setup();
        // `id` is both direct and promoted; it is listed once. The flattened
        // field itself is not a member.
        assert_eq!(member_names(Ledger::SHAPE), vec!["id", "owner"]);
    }

    #[test]
    fn sequences_and_scalars_have_no_members() {
        assert!(member_names(<Vec<Account>>::SHAPE).is_empty());
        assert!(member_names(<Box<Vec<Account>>>::SHAPE).is_empty());
        assert!(member_names(i32::SHAPE).is_empty());
    }
}
