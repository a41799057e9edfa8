//! Paths from the root of a copy to the member being copied.

use core::fmt;

use smallvec::SmallVec;

type PathVec = SmallVec<[PathSegment; 4]>;

/// A segment in a path through a nested structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// Named member of a composite.
    Member(&'static str),
    /// Element of a sequence.
    Index(usize),
}

/// A path into a nested structure. The empty path is the copy's root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path(PathVec);

impl Path {
    /// Create an empty path.
    pub fn root() -> Self {
        Self(PathVec::new())
    }

    /// Create a path from a slice of segments.
    pub fn from_segments(segments: &[PathSegment]) -> Self {
        Self(segments.iter().copied().collect())
    }

    /// Add a member segment to the path.
    pub fn then_member(mut self, name: &'static str) -> Self {
        self.0.push(PathSegment::Member(name));
        self
    }

    /// Add an index segment to the path.
    pub fn then_index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns the path segments as a slice.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns true if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of segments in the path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Innermost member name on the path, skipping trailing indices.
    pub fn last_member(&self) -> Option<&'static str> {
        self.0.iter().rev().find_map(|seg| match seg {
            PathSegment::Member(name) => Some(*name),
            PathSegment::Index(_) => None,
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Member(name) if i == 0 => f.write_str(name)?,
                PathSegment::Member(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Path::root().to_string(), "<root>");
        let path = Path::root()
            .then_member("reports")
            .then_index(1)
            .then_member("age");
        assert_eq!(path.to_string(), "reports[1].age");
        assert_eq!(Path::root().then_index(0).to_string(), "[0]");
    }

    #[test]
    fn last_member_skips_indices() {
        let path = Path::root().then_member("notes").then_index(3);
        assert_eq!(path.last_member(), Some("notes"));
        assert_eq!(Path::root().then_index(3).last_member(), None);
    }

    #[test]
    fn push_and_pop() {
        let mut path = Path::root();
        path.push(PathSegment::Member("a"));
        path.push(PathSegment::Index(2));
        assert_eq!(
            path.segments(),
            &[PathSegment::Member("a"), PathSegment::Index(2)]
        );
        path.pop();
        assert_eq!(path, Path::from_segments(&[PathSegment::Member("a")]));
        path.clear();
        assert!(path.is_empty());
    }
}
