use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Classification of a single discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifferenceType {
    /// Values exist on both sides but differ
    ValueMismatch,
    /// Values have different runtime types
    TypeMismatch,
    /// Sequences hold a different number of elements
    NumberOfElementsMismatch,
    /// Member exists only in the second object
    MissedMemberInFirstObject,
    /// Member exists only in the first object
    MissedMemberInSecondObject,
}

impl fmt::Display for DifferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifferenceType::ValueMismatch => "ValueMismatch",
            DifferenceType::TypeMismatch => "TypeMismatch",
            DifferenceType::NumberOfElementsMismatch => "NumberOfElementsMismatch",
            DifferenceType::MissedMemberInFirstObject => "MissedMemberInFirstObject",
            DifferenceType::MissedMemberInSecondObject => "MissedMemberInSecondObject",
        };
        f.write_str(name)
    }
}

/// One located discrepancy between two compared values.
///
/// `value1`/`value2` hold the textual rendering of each side; an absent
/// value renders as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Difference {
    member_path: String,
    value1: String,
    value2: String,
    difference_type: DifferenceType,
}

impl Difference {
    pub fn new(
        member_path: impl Into<String>,
        value1: impl Into<String>,
        value2: impl Into<String>,
        difference_type: DifferenceType,
    ) -> Self {
        Self {
            member_path: member_path.into(),
            value1: value1.into(),
            value2: value2.into(),
            difference_type,
        }
    }

    /// Shorthand for a `ValueMismatch`
    pub fn value_mismatch(
        member_path: impl Into<String>,
        value1: impl Into<String>,
        value2: impl Into<String>,
    ) -> Self {
        Self::new(member_path, value1, value2, DifferenceType::ValueMismatch)
    }

    pub fn member_path(&self) -> &str {
        &self.member_path
    }

    pub fn value1(&self) -> &str {
        &self.value1
    }

    pub fn value2(&self) -> &str {
        &self.value2
    }

    pub fn difference_type(&self) -> DifferenceType {
        self.difference_type
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Difference: DifferenceType={}, MemberPath='{}', Value1='{}', Value2='{}'.",
            self.difference_type, self.member_path, self.value1, self.value2
        )
    }
}

fn default_true() -> bool {
    true
}

/// Settings read by every comparer during one comparison.
///
/// Built once by the caller and shared read-only with every nested call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSettings {
    /// Recurse into nested objects; when off a differing nested object is
    /// reported once at its own path
    #[serde(default = "default_true")]
    pub recursive_comparison: bool,

    /// Treat an absent sequence and an empty one as equal
    #[serde(default)]
    pub empty_and_null_enumerables_equal: bool,

    /// Free-form values for caller-supplied comparers
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            recursive_comparison: true,
            empty_and_null_enumerables_equal: false,
            custom: BTreeMap::new(),
        }
    }
}

impl ComparisonSettings {
    pub fn with_empty_and_null_enumerables_equal(mut self, enabled: bool) -> Self {
        self.empty_and_null_enumerables_equal = enabled;
        self
    }

    pub fn with_recursive_comparison(mut self, enabled: bool) -> Self {
        self.recursive_comparison = enabled;
        self
    }

    pub fn set_custom_setting(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.insert(key.into(), value.into());
    }

    pub fn custom_setting(&self, key: &str) -> Option<&str> {
        self.custom.get(key).map(String::as_str)
    }
}
