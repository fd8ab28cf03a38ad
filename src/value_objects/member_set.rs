//! Membership set value object.
//!
//! Both the desired membership (from configuration) and the observed
//! membership (from Okta) are represented as a [`MemberSet`]. The set is
//! ordered, so iteration and serialization follow the lexical order of the
//! user IDs regardless of the order members were inserted or returned by the
//! remote listing.

use crate::value_objects::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::collections::btree_set;

/// An ordered set of member (user) identifiers.
///
/// # Examples
///
/// ```rust
/// use okta_provider::value_objects::{MemberSet, ResourceId};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let desired = MemberSet::try_from_strs(["bob", "alice"])?;
///     let observed = MemberSet::try_from_strs(["carol", "bob"])?;
///
///     let missing = desired.difference(&observed);
///     assert_eq!(missing.to_strings(), vec!["alice"]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberSet(BTreeSet<ResourceId>);

impl MemberSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Builds a set from raw strings, validating each one as a [`ResourceId`].
    pub fn try_from_strs<I, S>(values: I) -> crate::error::ValidationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .map(|value| ResourceId::new(value.as_ref().to_string()))
            .collect()
    }

    /// Adds a member. Returns `false` if it was already present.
    pub fn insert(&mut self, member: ResourceId) -> bool {
        self.0.insert(member)
    }

    /// Removes a member. Returns `false` if it was not present.
    pub fn remove(&mut self, member: &ResourceId) -> bool {
        self.0.remove(member)
    }

    /// Whether `member` belongs to the set.
    pub fn contains(&self, member: &ResourceId) -> bool {
        self.0.contains(member)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates members in ascending ID order.
    pub fn iter(&self) -> btree_set::Iter<'_, ResourceId> {
        self.0.iter()
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &MemberSet) -> MemberSet {
        self.0.difference(&other.0).cloned().collect()
    }

    /// Members present in either set.
    pub fn union(&self, other: &MemberSet) -> MemberSet {
        self.0.union(&other.0).cloned().collect()
    }

    /// Members present in both sets.
    pub fn intersection(&self, other: &MemberSet) -> MemberSet {
        self.0.intersection(&other.0).cloned().collect()
    }

    /// Members as plain strings, in ascending order.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|id| id.as_str().to_string()).collect()
    }
}

impl FromIterator<ResourceId> for MemberSet {
    fn from_iter<T: IntoIterator<Item = ResourceId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ResourceId> for MemberSet {
    fn extend<T: IntoIterator<Item = ResourceId>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl IntoIterator for MemberSet {
    type Item = ResourceId;
    type IntoIter = btree_set::IntoIter<ResourceId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MemberSet {
    type Item = &'a ResourceId;
    type IntoIter = btree_set::Iter<'a, ResourceId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
