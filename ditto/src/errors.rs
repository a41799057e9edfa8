//! Error types for copying.

use std::fmt;

use facet_core::Shape;

use crate::path::Path;
use crate::shape::name;

/// One failed member, element or top-level copy.
///
/// A non-empty path means the failure belongs to the named member or sequence
/// index and was collected without stopping its siblings. An empty path means
/// the copy as a whole could not start.
pub struct CopyError {
    pub path: Path,
    pub kind: CopyErrorKind,
}

impl CopyError {
    pub fn new(path: Path, kind: CopyErrorKind) -> Self {
        Self { path, kind }
    }

    /// Create a new error at the root (empty path).
    pub fn at_root(kind: CopyErrorKind) -> Self {
        Self::new(Path::root(), kind)
    }

    /// Innermost member the failure belongs to.
    pub fn member(&self) -> Option<&'static str> {
        self.path.last_member()
    }

    /// Whether this failure was collected for a member or element rather than
    /// raised for the whole copy.
    pub fn is_member_failure(&self) -> bool {
        !self.path.is_empty()
    }
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.path)
    }
}

impl fmt::Debug for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for CopyError {}

/// The kind of copy error.
pub enum CopyErrorKind {
    /// Source and destination have the same indirection depth but
    /// incompatible shapes (including different scalar types).
    ShapeMismatch {
        expected: &'static Shape,
        actual: &'static Shape,
    },
    /// Both sides are the same opaque type, but no clone function was
    /// registered for it.
    UnregisteredScalar { shape: &'static Shape },
    /// A scalar was forced into a sequence destination.
    UnsupportedSourceShape {
        destination: &'static Shape,
        source: &'static Shape,
    },
    /// A null destination layer whose payload type has no default.
    UnsettableDestination { shape: &'static Shape },
    /// The source reference holds no value.
    UnreadableSource { shape: &'static Shape },
    /// The same pair of shapes was re-entered without crossing any indirection.
    CyclicShape { shape: &'static Shape },
    /// Nesting exceeded the configured maximum.
    DepthLimitExceeded { limit: usize },
}

impl fmt::Display for CopyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyErrorKind::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {}, got {}", name(expected), name(actual))
            }
            CopyErrorKind::UnregisteredScalar { shape } => {
                write!(f, "No clone function registered for {}", name(shape))
            }
            CopyErrorKind::UnsupportedSourceShape {
                destination,
                source,
            } => {
                write!(
                    f,
                    "Cannot copy {} into sequence {}: source is not a sequence or composite",
                    name(source),
                    name(destination)
                )
            }
            CopyErrorKind::UnsettableDestination { shape } => {
                write!(f, "Destination {} cannot be written", name(shape))
            }
            CopyErrorKind::UnreadableSource { shape } => {
                write!(f, "Source {} holds no value", name(shape))
            }
            CopyErrorKind::CyclicShape { shape } => {
                write!(f, "Cyclic shape {} re-entered at the same depth", name(shape))
            }
            CopyErrorKind::DepthLimitExceeded { limit } => {
                write!(f, "Nesting exceeds the limit of {} levels", limit)
            }
        }
    }
}

impl fmt::Debug for CopyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ============================================================================
// Accumulation
// ============================================================================

/// Every failure collected by one copy, in the order they occurred.
#[derive(Default)]
pub struct CopyErrors(Vec<CopyError>);

impl CopyErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(error: CopyError) -> Self {
        Self(vec![error])
    }

    pub fn push(&mut self, error: CopyError) {
        self.0.push(error);
    }

    /// Append every failure of `other`.
    pub fn extend(&mut self, other: CopyErrors) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CopyError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[CopyError] {
        &self.0
    }

    /// The first failure whose innermost member is `name`.
    pub fn for_member(&self, name: &str) -> Option<&CopyError> {
        self.0.iter().find(|e| e.member() == Some(name))
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), CopyErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl IntoIterator for CopyErrors {
    type Item = CopyError;
    type IntoIter = std::vec::IntoIter<CopyError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CopyErrors {
    type Item = &'a CopyError;
    type IntoIter = std::slice::Iter<'a, CopyError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<CopyError> for CopyErrors {
    fn from(error: CopyError) -> Self {
        Self::single(error)
    }
}

impl fmt::Display for CopyErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "no errors"),
            [only] => write!(f, "{}", only),
            all => {
                write!(f, "{} members failed to copy:", all.len())?;
                for error in all {
                    write!(f, "\n  {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for CopyErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for CopyErrors {}
