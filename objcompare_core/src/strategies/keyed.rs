use super::object::compare_member;
use super::unexpected_shape;
use crate::base::{ComparisonContext, Operand};
use crate::inspect::{render_value, Inspect, Member, Shape};
use crate::path::{key_path, member_path};
use crate::policy::MemberInfo;
use crate::registry::ObjectComparer;
use objcompare_common::{Difference, DifferenceType, ObjCompareError, Result};
use std::collections::BTreeMap;

/// Compares maps and expando objects by key.
///
/// Entries are visited in the order of their rendered keys. Map entries are
/// paired by key equality, so keys that render alike are still told apart.
/// A key present on one side only is reported as a missed member with `""`
/// for the missing side. Map entries are addressed as `path[key]`, expando
/// members as `path.name`; only the latter go through the member policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyedStrategy;

impl ObjectComparer for KeyedStrategy {
    fn calculate_differences(
        &self,
        ctx: &ComparisonContext<'_>,
        path: &str,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<Vec<Difference>> {
        match (a.shape, b.shape) {
            (Shape::Map(x), Shape::Map(y)) => compare_entries(ctx, path, x, y),
            (Shape::Expando(x), Shape::Expando(y)) => compare_members(ctx, path, a.value, x, y),
            (x, y) => Err(unexpected_shape(path, "a map", &x, &y)),
        }
    }
}

fn compare_entries(
    ctx: &ComparisonContext<'_>,
    path: &str,
    left: Vec<Member<'_>>,
    right: Vec<Member<'_>>,
) -> Result<Vec<Difference>> {
    let mut right = by_name(right);
    let mut differences = Vec::new();

    for (name, bucket) in by_name(left) {
        let child = key_path(path, &name);
        for x in bucket {
            match take_partner(ctx, &child, &x, right.get_mut(&name))? {
                Some(y) => {
                    differences.extend(ctx.compare(&child, x.declared, &*x.value, &*y.value)?)
                }
                None => differences.push(Difference::new(
                    child.clone(),
                    render_value(&*x.value),
                    "",
                    DifferenceType::MissedMemberInSecondObject,
                )),
            }
        }
    }

    for (name, bucket) in right {
        for y in bucket {
            differences.push(Difference::new(
                key_path(path, &name),
                "",
                render_value(&*y.value),
                DifferenceType::MissedMemberInFirstObject,
            ));
        }
    }

    Ok(differences)
}

/// Removes and returns the first candidate whose key equals the key of `x`.
fn take_partner<'a>(
    ctx: &ComparisonContext<'_>,
    path: &str,
    x: &Member<'_>,
    candidates: Option<&mut Vec<Member<'a>>>,
) -> Result<Option<Member<'a>>> {
    let Some(candidates) = candidates else {
        return Ok(None);
    };
    let mut found = None;
    for (index, y) in candidates.iter().enumerate() {
        if same_key(ctx, path, x, y)? {
            found = Some(index);
            break;
        }
    }
    Ok(found.map(|index| candidates.remove(index)))
}

fn same_key(
    ctx: &ComparisonContext<'_>,
    path: &str,
    x: &Member<'_>,
    y: &Member<'_>,
) -> Result<bool> {
    match (&x.key, &y.key) {
        (Some(a), Some(b)) => Ok(ctx.compare(path, a.descriptor(), &**a, &**b)?.is_empty()),
        // entries without a key value are identified by name alone
        _ => Ok(true),
    }
}

fn compare_members(
    ctx: &ComparisonContext<'_>,
    path: &str,
    owner: &dyn Inspect,
    left: Vec<Member<'_>>,
    right: Vec<Member<'_>>,
) -> Result<Vec<Difference>> {
    let owner = owner.descriptor();
    let mut right = unique_by_name(path, right)?;
    let mut differences = Vec::new();

    for (name, x) in unique_by_name(path, left)? {
        let child = member_path(path, &name);
        let included = ctx.member_policy().include(&MemberInfo {
            owner,
            name: &name,
            declared: x.declared,
        });

        match right.remove(&name) {
            Some(y) => differences.extend(compare_member(ctx, owner, &child, &x, &y)?),
            None if included => differences.push(Difference::new(
                child,
                render_value(&*x.value),
                "",
                DifferenceType::MissedMemberInSecondObject,
            )),
            None => {}
        }
    }

    for (name, y) in right {
        let included = ctx.member_policy().include(&MemberInfo {
            owner,
            name: &name,
            declared: y.declared,
        });
        if included {
            differences.push(Difference::new(
                member_path(path, &name),
                "",
                render_value(&*y.value),
                DifferenceType::MissedMemberInFirstObject,
            ));
        }
    }

    Ok(differences)
}

fn by_name(members: Vec<Member<'_>>) -> BTreeMap<String, Vec<Member<'_>>> {
    let mut buckets: BTreeMap<String, Vec<Member<'_>>> = BTreeMap::new();
    for member in members {
        buckets
            .entry(member.name.to_string())
            .or_default()
            .push(member);
    }
    buckets
}

fn unique_by_name<'a>(
    path: &str,
    members: Vec<Member<'a>>,
) -> Result<BTreeMap<String, Member<'a>>> {
    let mut unique = BTreeMap::new();
    for member in members {
        let name = member.name.to_string();
        if unique.contains_key(&name) {
            return Err(ObjCompareError::UnexpectedShape {
                path: member_path(path, &name),
                expected: String::from("unique member names"),
            });
        }
        unique.insert(name, member);
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::{ShapeKind, TypeDescriptor};
    use crate::registry::ComparerRegistry;
    use objcompare_common::ComparisonSettings;
    use std::collections::HashMap;

    fn diff<T: Inspect>(a: &T, b: &T) -> Vec<Difference> {
        let settings = ComparisonSettings::default();
        let registry = ComparerRegistry::default();
        let ctx = ComparisonContext::new(&settings, &registry);
        KeyedStrategy
            .calculate_differences(&ctx, "Lookup", Operand::new(a), Operand::new(b))
            .unwrap()
    }

    #[test]
    fn test_map_entries_in_key_order() {
        let a: HashMap<String, i32> = [("b", 2), ("a", 1), ("c", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let b: HashMap<String, i32> = [("b", 5), ("a", 4), ("c", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let d = diff(&a, &b);
        let paths: Vec<&str> = d.iter().map(|d| d.member_path()).collect();
        assert_eq!(paths, vec!["Lookup[a]", "Lookup[b]"]);
    }

    #[test]
    fn test_missing_keys() {
        let a: HashMap<String, i32> = [("only_left".to_string(), 1)].into_iter().collect();
        let b: HashMap<String, i32> = [("only_right".to_string(), 2)].into_iter().collect();

        let d = diff(&a, &b);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].member_path(), "Lookup[only_left]");
        assert_eq!(d[0].difference_type(), DifferenceType::MissedMemberInSecondObject);
        assert_eq!(d[0].value1(), "1");
        assert_eq!(d[0].value2(), "");
        assert_eq!(d[1].member_path(), "Lookup[only_right]");
        assert_eq!(d[1].difference_type(), DifferenceType::MissedMemberInFirstObject);
        assert_eq!(d[1].value1(), "");
    }

    #[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
    struct Key {
        id: i32,
    }

    crate::inspect_struct!(Key { id as "Id" });

    #[test]
    fn test_struct_keys_are_paired_by_value() {
        let a: BTreeMap<Key, i32> = [(Key { id: 1 }, 5), (Key { id: 2 }, 1)].into_iter().collect();
        let b: BTreeMap<Key, i32> = [(Key { id: 1 }, 9), (Key { id: 2 }, 1)].into_iter().collect();

        let d = diff(&a, &b);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].member_path(), "Lookup[Key]");
        assert_eq!(d[0].value1(), "5");
        assert_eq!(d[0].value2(), "9");

        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn test_struct_key_missing_on_one_side() {
        let a: BTreeMap<Key, i32> = [(Key { id: 1 }, 5), (Key { id: 2 }, 1)].into_iter().collect();
        let b: BTreeMap<Key, i32> = [(Key { id: 1 }, 5), (Key { id: 3 }, 1)].into_iter().collect();

        let d = diff(&a, &b);
        let kinds: Vec<DifferenceType> = d.iter().map(|d| d.difference_type()).collect();
        assert_eq!(
            kinds,
            vec![
                DifferenceType::MissedMemberInSecondObject,
                DifferenceType::MissedMemberInFirstObject,
            ]
        );
    }

    #[test]
    fn test_absent_and_empty_keys_stay_distinct() {
        let a: BTreeMap<Option<String>, i32> =
            [(None, 5), (Some(String::new()), 1)].into_iter().collect();
        let b: BTreeMap<Option<String>, i32> =
            [(None, 9), (Some(String::new()), 1)].into_iter().collect();

        let d = diff(&a, &b);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].member_path(), "Lookup[]");
        assert_eq!(d[0].value1(), "5");
        assert_eq!(d[0].value2(), "9");
    }

    struct Duplicated;

    impl Inspect for Duplicated {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::of::<Duplicated>(ShapeKind::Expando)
        }

        fn descriptor(&self) -> TypeDescriptor {
            Self::type_descriptor()
        }

        fn shape(&self) -> Shape<'_> {
            Shape::Expando(vec![Member::of("Name", &1), Member::of("Name", &2)])
        }
    }

    #[test]
    fn test_duplicate_expando_members_are_rejected() {
        let settings = ComparisonSettings::default();
        let registry = ComparerRegistry::default();
        let ctx = ComparisonContext::new(&settings, &registry);
        let err = KeyedStrategy
            .calculate_differences(
                &ctx,
                "Bag",
                Operand::new(&Duplicated),
                Operand::new(&Duplicated),
            )
            .unwrap_err();
        assert!(matches!(err, ObjCompareError::UnexpectedShape { path, .. } if path == "Bag.Name"));
    }
}
