//! Nesting policy: whether mutations repair descendants immediately.

/// Decides whether boundary and structural mutations cascade.
///
/// A [`Forest`](crate::domain::Forest) owns its policy, so forests never
/// observe each other's setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NestingPolicy {
    /// Mutations touch only the addressed node. The tree may be transiently
    /// inconsistent until `updated_nesting` is called.
    #[default]
    Manual,
    /// Every mutation renumbers the affected subtree.
    AutoNest,
}

impl NestingPolicy {
    pub fn is_auto(self) -> bool {
        matches!(self, NestingPolicy::AutoNest)
    }
}

impl From<bool> for NestingPolicy {
    fn from(auto_nest: bool) -> Self {
        if auto_nest {
            NestingPolicy::AutoNest
        } else {
            NestingPolicy::Manual
        }
    }
}
