//! Field-backed boundary storage.

use crate::domain::error::{NestError, NestResult};
use crate::domain::store::{Boundary, BoundaryStore};

/// Boundaries held in private integer slots.
///
/// `Default` is boundary-valid straight away (`left = 0`, `level = 0`,
/// `right = 1`). Use [`FieldBounds::unset`] for a node whose values are
/// established later by a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBounds {
    left: Option<i64>,
    level: Option<i64>,
    right: Option<i64>,
}

impl FieldBounds {
    pub fn new(left: i64, level: i64, right: i64) -> Self {
        Self {
            left: Some(left),
            level: Some(level),
            right: Some(right),
        }
    }

    /// Storage with no value set; every read fails until written.
    pub fn unset() -> Self {
        Self {
            left: None,
            level: None,
            right: None,
        }
    }

    fn slot(&self, boundary: Boundary) -> Option<i64> {
        match boundary {
            Boundary::Left => self.left,
            Boundary::Level => self.level,
            Boundary::Right => self.right,
        }
    }
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self::new(0, 0, 1)
    }
}

impl BoundaryStore for FieldBounds {
    fn read(&self, boundary: Boundary) -> NestResult<i64> {
        self.slot(boundary)
            .ok_or(NestError::UnsetProperty(boundary))
    }

    fn write(&mut self, boundary: Boundary, value: i64) -> NestResult<()> {
        let slot = match boundary {
            Boundary::Left => &mut self.left,
            Boundary::Level => &mut self.level,
            Boundary::Right => &mut self.right,
        };
        *slot = Some(value);
        Ok(())
    }
}
