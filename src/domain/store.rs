//! Storage contract for the three nested-set scalars.

use std::fmt;

use crate::domain::error::{NestError, NestResult};

/// One of the three values a node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    Left,
    Level,
    Right,
}

impl Boundary {
    /// All boundaries in the order they are usually written.
    pub const ALL: [Boundary; 3] = [Boundary::Left, Boundary::Level, Boundary::Right];

    /// Name of the boundary, also used as the markup attribute name.
    pub fn as_str(self) -> &'static str {
        match self {
            Boundary::Left => "left",
            Boundary::Level => "level",
            Boundary::Right => "right",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a node keeps its `left`, `level` and `right` values.
///
/// Implementations only store and load. Range checks and cascades live in
/// [`Forest`](crate::domain::Forest), so every backend gets the same
/// semantics.
pub trait BoundaryStore {
    /// Reads a boundary.
    ///
    /// # Errors
    ///
    /// [`NestError::UnsetProperty`] if the value was never written.
    fn read(&self, boundary: Boundary) -> NestResult<i64>;

    /// Writes a boundary.
    fn write(&mut self, boundary: Boundary, value: i64) -> NestResult<()>;

    /// Reads a boundary, mapping "never written" to `None`.
    ///
    /// Other failures (for example an unbound markup store) still surface.
    fn try_read(&self, boundary: Boundary) -> NestResult<Option<i64>> {
        match self.read(boundary) {
            Ok(v) => Ok(Some(v)),
            Err(NestError::UnsetProperty(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
