//! Declarative group membership reconciliation.
//!
//! The desired membership comes from configuration and the observed one from
//! Okta. [`diff`] computes the minimal change between them and
//! [`MembershipReconciler`] carries it out through a [`GroupsApi`](crate::client::GroupsApi).
//!
//! ```text
//! desired, observed
//!   -> skip_users? ---------------------------> done
//!   -> diff --- empty ------------------------> done
//!        \-> add phase (sorted, fail-fast)
//!              \-> remove phase (sorted, fail-fast) -> done
//! ```

mod reconciler;

pub use reconciler::{ApplyReport, MembershipReconciler, ReconcileOutcome};

use crate::value_objects::MemberSet;
use serde::{Deserialize, Serialize};

/// The membership changes needed to turn an observed set into a desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipDiff {
    /// Members to add (desired but not observed)
    pub to_add: MemberSet,
    /// Members to remove (observed but not desired)
    pub to_remove: MemberSet,
}

impl MembershipDiff {
    /// True when no remote call is needed.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Total number of membership calls this diff will issue.
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }
}

/// Compute the changes that make `observed` equal to `desired`.
///
/// # Examples
///
/// ```rust
/// use okta_provider::membership::diff;
/// use okta_provider::value_objects::MemberSet;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let desired = MemberSet::try_from_strs(["alice", "bob"])?;
/// let observed = MemberSet::try_from_strs(["bob", "carol"])?;
///
/// let changes = diff(&desired, &observed);
/// assert_eq!(changes.to_add.to_strings(), vec!["alice"]);
/// assert_eq!(changes.to_remove.to_strings(), vec!["carol"]);
/// # Ok(())
/// # }
/// ```
pub fn diff(desired: &MemberSet, observed: &MemberSet) -> MembershipDiff {
    MembershipDiff {
        to_add: desired.difference(observed),
        to_remove: observed.difference(desired),
    }
}
