//! Per-compilation-unit import registries.

use javelin_core::{ClassId, Name, PackageId};

/// One `import static T.m;` entry: the imported type and the member name.
/// Members resolve lazily at each use, after the type's members exist.
#[derive(Debug, Clone)]
pub struct StaticImport {
    pub imported_type: ClassId,
    pub member: Name,
}

#[derive(Debug, Default)]
pub struct Imports {
    /// `import a.b.C;` — simple name to type.
    pub single_types: Vec<(Name, ClassId)>,
    /// `import a.b.*;` — packages searched on demand.
    pub on_demand_packages: Vec<PackageId>,
    /// `import a.b.C.*;` — types whose nested types are on demand.
    pub on_demand_types: Vec<ClassId>,
    pub single_static: Vec<StaticImport>,
    /// `import static T.*;` — every accessible static member in scope.
    pub static_on_demand: Vec<ClassId>,
}

impl Imports {
    pub fn single_type(&self, name: &Name) -> Option<ClassId> {
        self.single_types
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }
}
