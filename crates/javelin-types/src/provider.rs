use javelin_classfile::ClassStub;

/// Source of class stubs by binary name — in production the classpath
/// index, in tests a hash map.
pub trait TypeProvider {
    fn lookup_type(&self, binary_name: &str) -> Option<ClassStub>;
}

impl<T: TypeProvider + ?Sized> TypeProvider for &T {
    fn lookup_type(&self, binary_name: &str) -> Option<ClassStub> {
        (**self).lookup_type(binary_name)
    }
}

/// Package-level view of the classpath, for the name resolver's
/// package/type disambiguation and its package fallback.
pub trait PackageProvider {
    fn package_exists(&self, package: &str) -> bool;
    fn type_exists(&self, binary_name: &str) -> bool;
    /// Simple names of the classes directly inside `package`.
    fn types_in_package(&self, package: &str) -> Vec<String>;
}

/// What the semantic driver needs from a classpath: stubs plus the package
/// tree. Blanket-implemented for anything providing both halves.
pub trait ClasspathProvider {
    fn lookup_type(&self, binary_name: &str) -> Option<ClassStub>;
    fn package_exists(&self, package: &str) -> bool;
    fn type_exists(&self, binary_name: &str) -> bool;
    fn types_in_package(&self, package: &str) -> Vec<String>;
}

impl<T: TypeProvider + PackageProvider> ClasspathProvider for T {
    fn lookup_type(&self, binary_name: &str) -> Option<ClassStub> {
        TypeProvider::lookup_type(self, binary_name)
    }

    fn package_exists(&self, package: &str) -> bool {
        PackageProvider::package_exists(self, package)
    }

    fn type_exists(&self, binary_name: &str) -> bool {
        PackageProvider::type_exists(self, binary_name)
    }

    fn types_in_package(&self, package: &str) -> Vec<String> {
        PackageProvider::types_in_package(self, package)
    }
}

/// View a [`ClasspathProvider`] trait object as a plain [`TypeProvider`].
pub struct ProviderView<'a>(pub &'a dyn ClasspathProvider);

impl TypeProvider for ProviderView<'_> {
    fn lookup_type(&self, binary_name: &str) -> Option<ClassStub> {
        self.0.lookup_type(binary_name)
    }
}
