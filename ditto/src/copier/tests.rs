use super::*;
use facet::Facet;

#[derive(Facet, Debug, Default, Clone, PartialEq)]
struct Leaf {
    value: i32,
}

#[derive(Facet, Debug, Default, Clone, PartialEq)]
struct Branch {
    leaf: Leaf,
    leaves: Vec<Leaf>,
}

#[derive(Facet, Debug, Default, Clone, PartialEq)]
struct Trunk {
    branch: Branch,
}

#[derive(Facet, Debug, Default, PartialEq)]
struct Link {
    value: u32,
    next: Option<Box<Link>>,
}

fn chain(len: u32) -> Link {
    let mut head = Link {
        value: len,
        next: None,
    };
    for value in (0..len).rev() {
        head = Link {
            value,
            next: Some(Box::new(head)),
        };
    }
    head
}

#[test]
fn default_options_have_no_depth_limit() {
    let copier = Copier::new();
    assert_eq!(copier.options().max_depth, None);
    assert_eq!(CopyOptions::new().with_max_depth(3).max_depth, Some(3));
}

#[test]
fn long_recursive_values_copy_without_a_limit() {
    // Copying recurses once per node; give debug builds room.
    std::thread::Builder::new()
        .stack_size(32 << 20)
        .spawn(|| {
            let source = chain(300);
            let mut destination = Link::default();
            let mut copier = Copier::new();
            copier.copy(&mut destination, &source).unwrap();

            assert_eq!(destination, source);
            assert!(copier.stack.is_empty());
            assert_eq!(copier.indirection, 0);
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn bookkeeping_is_balanced_after_success() {
    let source = Branch {
        leaf: Leaf { value: 1 },
        leaves: vec![Leaf { value: 2 }, Leaf { value: 3 }],
    };
    let mut destination = Branch::default();
    let mut copier = Copier::new();
    copier.copy(&mut destination, &source).unwrap();

    assert_eq!(destination, source);
    assert!(copier.stack.is_empty());
    assert!(copier.path.is_empty());
    assert_eq!(copier.indirection, 0);
}

#[test]
fn bookkeeping_is_balanced_after_failure() {
    let source = Trunk::default();
    let mut destination = Trunk::default();
    let mut copier = Copier::with_options(CopyOptions::new().with_max_depth(2));

    // Trunk and Branch fill both frames, so both members of Branch overflow.
    let errors = copier.copy(&mut destination, &source).unwrap_err();
    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["branch.leaf", "branch.leaves"]);
    assert!(copier.stack.is_empty());
    assert!(copier.path.is_empty());
    assert_eq!(copier.indirection, 0);
}

#[test]
fn copier_is_reusable() {
    let mut copier = Copier::with_options(CopyOptions::new().with_max_depth(2));
    let mut trunk = Trunk::default();
    assert!(copier.copy(&mut trunk, &Trunk::default()).is_err());

    // Nothing from the failed call leaks into the next one.
    let mut leaf = Leaf::default();
    copier.copy(&mut leaf, &Leaf { value: 9 }).unwrap();
    assert_eq!(leaf.value, 9);
}

#[test]
fn frames_separate_sequence_elements() {
    let mut copier = Copier::new();
    copier.enter(Leaf::SHAPE, Leaf::SHAPE).unwrap();

    // The same pair one element deeper is a different frame.
    copier.indirection += 1;
    copier.enter(Leaf::SHAPE, Leaf::SHAPE).unwrap();
    copier.indirection -= 1;

    let errors = copier.enter(Leaf::SHAPE, Leaf::SHAPE).unwrap_err();
    assert!(matches!(
        errors.as_slice()[0].kind,
        CopyErrorKind::CyclicShape { .. }
    ));
}

#[test]
fn unset_sequence_detection() {
    assert!(is_unset_sequence(ValueRef::new(&Vec::<i32>::new())));
    assert!(!is_unset_sequence(ValueRef::new(&vec![1])));
    assert!(is_unset_sequence(ValueRef::new(&None::<Vec<i32>>)));
    assert!(!is_unset_sequence(ValueRef::new(&5i32)));
}
