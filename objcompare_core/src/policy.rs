//! Member selection: which members of an object take part in a comparison
//! and which of them use a dedicated value comparer.

use crate::inspect::TypeDescriptor;
use crate::value_comparers::ValueComparer;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A member about to be compared
#[derive(Debug, Clone, Copy)]
pub struct MemberInfo<'a> {
    /// Type declaring the member
    pub owner: TypeDescriptor,
    pub name: &'a str,
    /// Declared type of the member
    pub declared: TypeDescriptor,
}

pub trait MemberPolicy: Send + Sync {
    fn include(&self, member: &MemberInfo<'_>) -> bool {
        let _ = member;
        true
    }

    fn comparer_override(&self, member: &MemberInfo<'_>) -> Option<Arc<dyn ValueComparer>> {
        let _ = member;
        None
    }
}

/// Includes every member and overrides none
#[derive(Debug, Default, Clone, Copy)]
pub struct IncludeAllMembers;

impl MemberPolicy for IncludeAllMembers {}

pub type MemberFilter = Box<dyn Fn(&MemberInfo<'_>) -> bool + Send + Sync>;

/// Rules registered on a [`ComparerBuilder`](crate::ComparerBuilder).
///
/// Overrides resolve by exact `(owner, name)`, then by name alone, then by
/// the first matching filter.
#[derive(Default)]
pub struct MemberRules {
    ignored: HashSet<(TypeId, String)>,
    ignored_names: HashSet<String>,
    ignore_filters: Vec<MemberFilter>,
    overrides: HashMap<(TypeId, String), Arc<dyn ValueComparer>>,
    name_overrides: HashMap<String, Arc<dyn ValueComparer>>,
    filter_overrides: Vec<(MemberFilter, Arc<dyn ValueComparer>)>,
}

impl MemberRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore(&mut self, owner: TypeId, name: impl Into<String>) {
        self.ignored.insert((owner, name.into()));
    }

    pub fn ignore_name(&mut self, name: impl Into<String>) {
        self.ignored_names.insert(name.into());
    }

    pub fn ignore_where<F>(&mut self, filter: F)
    where
        F: Fn(&MemberInfo<'_>) -> bool + Send + Sync + 'static,
    {
        self.ignore_filters.push(Box::new(filter));
    }

    pub fn add_override(
        &mut self,
        owner: TypeId,
        name: impl Into<String>,
        comparer: Arc<dyn ValueComparer>,
    ) {
        self.overrides.insert((owner, name.into()), comparer);
    }

    pub fn add_name_override(&mut self, name: impl Into<String>, comparer: Arc<dyn ValueComparer>) {
        self.name_overrides.insert(name.into(), comparer);
    }

    pub fn add_override_where<F>(&mut self, filter: F, comparer: Arc<dyn ValueComparer>)
    where
        F: Fn(&MemberInfo<'_>) -> bool + Send + Sync + 'static,
    {
        self.filter_overrides.push((Box::new(filter), comparer));
    }

    pub fn is_empty(&self) -> bool {
        self.ignored.is_empty()
            && self.ignored_names.is_empty()
            && self.ignore_filters.is_empty()
            && self.overrides.is_empty()
            && self.name_overrides.is_empty()
            && self.filter_overrides.is_empty()
    }
}

impl MemberPolicy for MemberRules {
    fn include(&self, member: &MemberInfo<'_>) -> bool {
        if self.ignored_names.contains(member.name) {
            return false;
        }
        if self
            .ignored
            .contains(&(member.owner.id, member.name.to_string()))
        {
            return false;
        }
        !self.ignore_filters.iter().any(|filter| filter(member))
    }

    fn comparer_override(&self, member: &MemberInfo<'_>) -> Option<Arc<dyn ValueComparer>> {
        self.overrides
            .get(&(member.owner.id, member.name.to_string()))
            .or_else(|| self.name_overrides.get(member.name))
            .or_else(|| {
                self.filter_overrides
                    .iter()
                    .find(|(filter, _)| filter(member))
                    .map(|(_, comparer)| comparer)
            })
            .cloned()
    }
}

/// Consults `first`, then `second`; a member is included only if both agree.
pub(crate) struct LayeredPolicy {
    pub(crate) first: Arc<dyn MemberPolicy>,
    pub(crate) second: Arc<dyn MemberPolicy>,
}

impl MemberPolicy for LayeredPolicy {
    fn include(&self, member: &MemberInfo<'_>) -> bool {
        self.first.include(member) && self.second.include(member)
    }

    fn comparer_override(&self, member: &MemberInfo<'_>) -> Option<Arc<dyn ValueComparer>> {
        self.first
            .comparer_override(member)
            .or_else(|| self.second.comparer_override(member))
    }
}
