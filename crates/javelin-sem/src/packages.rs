//! The package tree, rooted at the unnamed package.
//!
//! Nodes are discovered lazily: a package's classes are enumerated from the
//! classpath the first time something looks inside it, and source types
//! register themselves as headers are processed.

use std::collections::HashMap;

use javelin_core::{ClassId, Name, PackageId};
use javelin_types::{ClasspathProvider, ProviderView, TypeStore};

struct PackageData {
    /// Dotted name; empty for the unnamed package.
    name: String,
    subpackages: HashMap<Name, PackageId>,
    types: HashMap<Name, ClassId>,
    scanned: bool,
}

pub struct PackageTree {
    packages: Vec<PackageData>,
}

impl PackageTree {
    pub fn new() -> Self {
        Self {
            packages: vec![PackageData {
                name: String::new(),
                subpackages: HashMap::new(),
                types: HashMap::new(),
                scanned: false,
            }],
        }
    }

    pub fn root(&self) -> PackageId {
        PackageId::from_raw(0)
    }

    pub fn name(&self, id: PackageId) -> &str {
        &self.packages[id.index()].name
    }

    /// Find-or-create the node for a dotted package name.
    pub fn intern(&mut self, dotted: &str) -> PackageId {
        let mut current = self.root();
        if dotted.is_empty() {
            return current;
        }
        for segment in dotted.split('.') {
            current = self.intern_child(current, &Name::new(segment));
        }
        current
    }

    fn intern_child(&mut self, parent: PackageId, segment: &Name) -> PackageId {
        if let Some(&child) = self.packages[parent.index()].subpackages.get(segment) {
            return child;
        }
        let name = if self.packages[parent.index()].name.is_empty() {
            segment.as_str().to_string()
        } else {
            format!("{}.{}", self.packages[parent.index()].name, segment)
        };
        let child = PackageId::from_raw(self.packages.len() as u32);
        self.packages.push(PackageData {
            name,
            subpackages: HashMap::new(),
            types: HashMap::new(),
            scanned: false,
        });
        self.packages[parent.index()]
            .subpackages
            .insert(segment.clone(), child);
        child
    }

    /// Register a source type into its package.
    pub fn add_type(&mut self, package: PackageId, name: Name, class: ClassId) {
        self.packages[package.index()].types.insert(name, class);
    }

    /// Look up `name` inside `package` as a type, consulting the classpath
    /// lazily and memoising what it finds.
    pub fn find_type(
        &mut self,
        package: PackageId,
        name: &Name,
        store: &mut TypeStore,
        classpath: Option<&dyn ClasspathProvider>,
    ) -> Option<ClassId> {
        if let Some(&found) = self.packages[package.index()].types.get(name) {
            return Some(found);
        }
        let classpath = classpath?;
        let binary = if self.packages[package.index()].name.is_empty() {
            name.as_str().to_string()
        } else {
            format!("{}.{}", self.packages[package.index()].name, name)
        };
        if !classpath.type_exists(&binary) {
            return None;
        }
        let id = store.load_external(&binary, &ProviderView(classpath))?;
        self.packages[package.index()].types.insert(name.clone(), id);
        Some(id)
    }

    /// Look up `name` inside `package` as a subpackage.
    pub fn find_subpackage(
        &mut self,
        package: PackageId,
        name: &Name,
        classpath: Option<&dyn ClasspathProvider>,
    ) -> Option<PackageId> {
        if let Some(&child) = self.packages[package.index()].subpackages.get(name) {
            return Some(child);
        }
        let classpath = classpath?;
        let dotted = if self.packages[package.index()].name.is_empty() {
            name.as_str().to_string()
        } else {
            format!("{}.{}", self.packages[package.index()].name, name)
        };
        classpath
            .package_exists(&dotted)
            .then(|| self.intern_child(package, name))
    }

    /// Every type name known in `package` — for the misspelling search.
    /// Names only: nothing is loaded.
    pub fn type_names(
        &mut self,
        package: PackageId,
        classpath: Option<&dyn ClasspathProvider>,
    ) -> Vec<String> {
        self.packages[package.index()].scanned = true;
        let mut names: Vec<String> = self.packages[package.index()]
            .types
            .keys()
            .map(|n| n.as_str().to_string())
            .collect();
        if let Some(classpath) = classpath {
            let dotted = &self.packages[package.index()].name;
            names.extend(classpath.types_in_package(dotted));
        }
        names.sort();
        names.dedup();
        names
    }
}

impl Default for PackageTree {
    fn default() -> Self {
        Self::new()
    }
}
