//! Orchestration shared by every nested comparison.
//!
//! [`ComparisonContext::compare`] settles overrides, identity, absent
//! values and runtime type mismatches, then hands the pair to the comparer
//! the registry resolves for the runtime type.

use crate::inspect::{render_shape, Inspect, Shape, ShapeKind, TypeDescriptor};
use crate::policy::MemberPolicy;
use crate::registry::ComparerRegistry;
use crate::value_comparers::ValueComparer;
use objcompare_common::{ComparisonSettings, Difference, DifferenceType, Result};
use tracing::trace;

/// A value together with its already computed shape
pub struct Operand<'a> {
    pub value: &'a dyn Inspect,
    pub shape: Shape<'a>,
}

impl<'a> Operand<'a> {
    pub fn new(value: &'a dyn Inspect) -> Self {
        Self {
            value,
            shape: value.shape(),
        }
    }

    pub fn render(&self) -> String {
        render_shape(self.value, &self.shape)
    }
}

/// Read-only state of one comparison, passed down every recursive call
pub struct ComparisonContext<'c> {
    settings: &'c ComparisonSettings,
    registry: &'c ComparerRegistry,
}

impl<'c> ComparisonContext<'c> {
    pub fn new(settings: &'c ComparisonSettings, registry: &'c ComparerRegistry) -> Self {
        Self { settings, registry }
    }

    pub fn settings(&self) -> &ComparisonSettings {
        self.settings
    }

    pub fn registry(&self) -> &ComparerRegistry {
        self.registry
    }

    pub fn member_policy(&self) -> &dyn MemberPolicy {
        self.registry.member_policy()
    }

    /// Compare two values found at `path` whose declared type is `declared`.
    ///
    /// Returned paths are fully qualified.
    pub fn compare(
        &self,
        path: &str,
        declared: TypeDescriptor,
        a: &dyn Inspect,
        b: &dyn Inspect,
    ) -> Result<Vec<Difference>> {
        if let Some(comparer) = self.registry.type_override(declared.id) {
            trace!("Type override for {} at '{}'", declared.name, path);
            return compare_with(comparer, self.settings, path, a, b);
        }

        if same_instance(a, b) {
            return Ok(Vec::new());
        }

        let a = Operand::new(a);
        let b = Operand::new(b);
        match (a.shape.is_null(), b.shape.is_null()) {
            (true, true) => return Ok(Vec::new()),
            (false, false) => {}
            _ => return Ok(self.compare_with_absent(path, a, b)),
        }

        let runtime = a.value.descriptor();
        let type_a = a.value.type_name();
        let type_b = b.value.type_name();
        if runtime.id != b.value.descriptor().id || type_a != type_b {
            return Ok(vec![Difference::new(
                path,
                type_a,
                type_b,
                DifferenceType::TypeMismatch,
            )]);
        }

        if runtime.id != declared.id {
            if let Some(comparer) = self.registry.type_override(runtime.id) {
                return compare_with(comparer, self.settings, path, a.value, b.value);
            }
        }

        self.registry
            .resolve(runtime)
            .calculate_differences(self, path, a, b)
    }

    fn compare_with_absent<'v>(
        &self,
        path: &str,
        a: Operand<'v>,
        b: Operand<'v>,
    ) -> Vec<Difference> {
        let value1 = a.render();
        let value2 = b.render();
        let present = if a.shape.is_null() { b.shape } else { a.shape };

        if self.settings.empty_and_null_enumerables_equal
            && present.kind().map_or(false, ShapeKind::is_enumerable)
            && present.is_empty_enumerable()
        {
            return Vec::new();
        }

        vec![Difference::value_mismatch(path, value1, value2)]
    }
}

/// Run a value comparer and report one `ValueMismatch` at `path` if it fails
pub fn compare_with(
    comparer: &dyn ValueComparer,
    settings: &ComparisonSettings,
    path: &str,
    a: &dyn Inspect,
    b: &dyn Inspect,
) -> Result<Vec<Difference>> {
    if comparer.compare(a, b, settings)? {
        return Ok(Vec::new());
    }
    Ok(vec![Difference::value_mismatch(
        path,
        comparer.render(a),
        comparer.render(b),
    )])
}

fn same_instance(a: &dyn Inspect, b: &dyn Inspect) -> bool {
    std::ptr::eq(a as *const _ as *const u8, b as *const _ as *const u8)
        && a.descriptor().id == b.descriptor().id
}
