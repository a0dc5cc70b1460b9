//! The compilation classpath: an ordered list of class directories and
//! jar archives.
//!
//! Enumeration and byte access are lazy and memoised. The first query
//! walks each entry once to learn which classes and packages exist; the
//! bytes of an individual `.class` resource are only read (and its stub
//! only parsed) when the semantic core dereferences that type. Earlier
//! entries shadow later ones, like `javac -classpath`.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use javelin_classfile::ClassStub;
use javelin_types::TypeProvider;

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("classfile error: {0}")]
    ClassFile(#[from] javelin_classfile::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
}

impl ClasspathEntry {
    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) => p,
        }
    }

    /// Classify a path the way the CLI would: `.jar`/`.zip` files are
    /// archives, everything else a class directory.
    pub fn from_path(path: PathBuf) -> Self {
        let ext = path.extension().and_then(OsStr::to_str).unwrap_or("");
        if ext.eq_ignore_ascii_case("jar") || ext.eq_ignore_ascii_case("zip") {
            ClasspathEntry::Jar(path)
        } else {
            ClasspathEntry::ClassDir(path)
        }
    }
}

#[derive(Default)]
struct Index {
    /// binary name -> (entry index, path inside the entry)
    classes: HashMap<String, (usize, String)>,
    packages: BTreeSet<String>,
    /// package -> simple class names directly in it
    by_package: HashMap<String, Vec<String>>,
    /// package -> immediate subpackage names
    subpackages: HashMap<String, BTreeSet<String>>,
}

pub struct Classpath {
    entries: Vec<ClasspathEntry>,
    index: RefCell<Option<Index>>,
    stub_cache: RefCell<HashMap<String, Option<ClassStub>>>,
}

impl Classpath {
    pub fn new(entries: Vec<ClasspathEntry>) -> Self {
        Self {
            entries,
            index: RefCell::new(None),
            stub_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    /// Whether a dotted name denotes a package present on the classpath.
    pub fn package_exists(&self, package: &str) -> bool {
        self.with_index(|index| index.packages.contains(package))
    }

    /// Simple names of the classes directly inside `package`, sorted.
    pub fn classes_in_package(&self, package: &str) -> Vec<String> {
        self.with_index(|index| {
            let mut names = index.by_package.get(package).cloned().unwrap_or_default();
            names.sort();
            names.dedup();
            names
        })
    }

    /// Immediate subpackages of `package` (`""` for the root), sorted.
    pub fn subpackages_of(&self, package: &str) -> Vec<String> {
        self.with_index(|index| {
            index
                .subpackages
                .get(package)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default()
        })
    }

    pub fn has_class(&self, binary_name: &str) -> bool {
        self.with_index(|index| index.classes.contains_key(binary_name))
    }

    /// The raw bytes of a class resource, if the classpath has it.
    pub fn read_class_bytes(&self, binary_name: &str) -> Result<Option<Vec<u8>>, ClasspathError> {
        let location = self.with_index(|index| index.classes.get(binary_name).cloned());
        let Some((entry_index, inner_path)) = location else {
            return Ok(None);
        };
        match &self.entries[entry_index] {
            ClasspathEntry::ClassDir(dir) => {
                let path = dir.join(&inner_path);
                Ok(Some(std::fs::read(path)?))
            }
            ClasspathEntry::Jar(path) => {
                let file = File::open(path)?;
                let mut archive = zip::ZipArchive::new(file)?;
                let mut entry = archive.by_name(&inner_path)?;
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
        }
    }

    /// Find-and-parse, memoised per binary name. Unreadable classes cache
    /// as absent so one broken resource produces one diagnostic upstream.
    pub fn find_class(&self, binary_name: &str) -> Option<ClassStub> {
        if let Some(cached) = self.stub_cache.borrow().get(binary_name) {
            return cached.clone();
        }
        let stub = match self.read_class_bytes(binary_name) {
            Ok(Some(bytes)) => match ClassStub::parse(&bytes) {
                Ok(stub) => Some(stub),
                Err(err) => {
                    tracing::warn!(class = binary_name, %err, "broken class file");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(class = binary_name, %err, "classpath read failed");
                None
            }
        };
        self.stub_cache
            .borrow_mut()
            .insert(binary_name.to_string(), stub.clone());
        stub
    }

    fn with_index<R>(&self, f: impl FnOnce(&Index) -> R) -> R {
        let mut slot = self.index.borrow_mut();
        if slot.is_none() {
            *slot = Some(self.build_index());
        }
        f(slot.as_ref().unwrap_or(&Index::default()))
    }

    fn build_index(&self) -> Index {
        let mut index = Index::default();
        for (entry_index, entry) in self.entries.iter().enumerate() {
            let result = match entry {
                ClasspathEntry::ClassDir(dir) => index_dir(dir, entry_index, &mut index),
                ClasspathEntry::Jar(path) => index_jar(path, entry_index, &mut index),
            };
            if let Err(err) = result {
                tracing::warn!(entry = %entry.path().display(), %err, "skipping classpath entry");
            }
        }
        index
    }
}

impl TypeProvider for Classpath {
    fn lookup_type(&self, binary_name: &str) -> Option<ClassStub> {
        self.find_class(binary_name)
    }
}

impl javelin_types::PackageProvider for Classpath {
    fn package_exists(&self, package: &str) -> bool {
        Classpath::package_exists(self, package)
    }

    fn type_exists(&self, binary_name: &str) -> bool {
        self.has_class(binary_name)
    }

    fn types_in_package(&self, package: &str) -> Vec<String> {
        self.classes_in_package(package)
    }
}

fn record(index: &mut Index, entry_index: usize, inner_path: &str) {
    let Some(stripped) = inner_path.strip_suffix(".class") else {
        return;
    };
    if stripped.ends_with("package-info") || stripped.ends_with("module-info") {
        return;
    }
    let binary = stripped.replace(['/', '\\'], ".");

    let (package, simple) = match binary.rfind('.') {
        Some(idx) => (binary[..idx].to_string(), binary[idx + 1..].to_string()),
        None => (String::new(), binary.clone()),
    };

    // First entry on the path wins.
    index
        .classes
        .entry(binary.clone())
        .or_insert_with(|| (entry_index, inner_path.to_string()));
    index
        .by_package
        .entry(package.clone())
        .or_default()
        .push(simple);

    // Register the package chain and the subpackage edges.
    let mut current = package.as_str();
    loop {
        if !current.is_empty() {
            index.packages.insert(current.to_string());
        }
        match current.rfind('.') {
            Some(idx) => {
                let parent = &current[..idx];
                index
                    .subpackages
                    .entry(parent.to_string())
                    .or_default()
                    .insert(current[idx + 1..].to_string());
                current = parent;
            }
            None => {
                if !current.is_empty() {
                    index
                        .subpackages
                        .entry(String::new())
                        .or_default()
                        .insert(current.to_string());
                }
                break;
            }
        }
    }
}

fn index_dir(dir: &Path, entry_index: usize, index: &mut Index) -> Result<(), ClasspathError> {
    // Deterministic order: WalkDir does not guarantee one.
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension() != Some(OsStr::new("class")) {
            continue;
        }
        paths.push(entry.into_path());
    }
    paths.sort();

    for path in paths {
        let rel = path.strip_prefix(dir).unwrap_or(&path);
        let inner = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        record(index, entry_index, &inner);
    }
    Ok(())
}

fn index_jar(path: &Path, entry_index: usize, index: &mut Index) -> Result<(), ClasspathError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };
    let mut archive = zip::ZipArchive::new(file)?;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if !entry.is_file() {
            continue;
        }
        let name = entry.name();
        if !name.ends_with(".class") || name.starts_with("META-INF/") {
            continue;
        }
        record(index, entry_index, name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // A tiny valid class file: `package p; public class A {}` compiled by
    // hand — magic, constant pool with just the needed entries, no members.
    fn minimal_class(internal_name: &str, super_name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor
        out.extend_from_slice(&49u16.to_be_bytes()); // major (1.5)
        out.extend_from_slice(&5u16.to_be_bytes()); // cp count = 5 (4 entries)
        // 1: Utf8 this
        out.push(1);
        out.extend_from_slice(&(internal_name.len() as u16).to_be_bytes());
        out.extend_from_slice(internal_name.as_bytes());
        // 2: Class #1
        out.push(7);
        out.extend_from_slice(&1u16.to_be_bytes());
        // 3: Utf8 super
        out.push(1);
        out.extend_from_slice(&(super_name.len() as u16).to_be_bytes());
        out.extend_from_slice(super_name.as_bytes());
        // 4: Class #3
        out.push(7);
        out.extend_from_slice(&3u16.to_be_bytes());
        out.extend_from_slice(&0x0021u16.to_be_bytes()); // ACC_PUBLIC | ACC_SUPER
        out.extend_from_slice(&2u16.to_be_bytes()); // this_class
        out.extend_from_slice(&4u16.to_be_bytes()); // super_class
        out.extend_from_slice(&0u16.to_be_bytes()); // interfaces
        out.extend_from_slice(&0u16.to_be_bytes()); // fields
        out.extend_from_slice(&0u16.to_be_bytes()); // methods
        out.extend_from_slice(&0u16.to_be_bytes()); // attributes
        out
    }

    #[test]
    fn indexes_class_dirs_and_answers_package_queries() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("com/example");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(
            pkg.join("A.class"),
            minimal_class("com/example/A", "java/lang/Object"),
        )
        .unwrap();

        let cp = Classpath::new(vec![ClasspathEntry::ClassDir(dir.path().to_path_buf())]);
        assert!(cp.package_exists("com.example"));
        assert!(cp.package_exists("com"));
        assert!(!cp.package_exists("com.missing"));
        assert_eq!(cp.classes_in_package("com.example"), vec!["A".to_string()]);
        assert_eq!(cp.subpackages_of("com"), vec!["example".to_string()]);

        let stub = cp.find_class("com.example.A").expect("stub");
        assert_eq!(stub.binary_name, "com.example.A");
        assert_eq!(stub.super_class.as_deref(), Some("java/lang/Object"));
    }

    #[test]
    fn earlier_entries_shadow_later_ones() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for (dir, super_name) in [(&first, "java/lang/Object"), (&second, "java/lang/Number")] {
            let pkg = dir.path().join("p");
            std::fs::create_dir_all(&pkg).unwrap();
            std::fs::write(pkg.join("A.class"), minimal_class("p/A", super_name)).unwrap();
        }

        let cp = Classpath::new(vec![
            ClasspathEntry::ClassDir(first.path().to_path_buf()),
            ClasspathEntry::ClassDir(second.path().to_path_buf()),
        ]);
        let stub = cp.find_class("p.A").expect("stub");
        assert_eq!(stub.super_class.as_deref(), Some("java/lang/Object"));
    }

    #[test]
    fn reads_classes_out_of_jars() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("dep.jar");
        let file = std::fs::File::create(&jar_path).unwrap();
        let mut jar = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        jar.start_file("q/B.class", options).unwrap();
        jar.write_all(&minimal_class("q/B", "java/lang/Object")).unwrap();
        jar.finish().unwrap();

        let cp = Classpath::new(vec![ClasspathEntry::Jar(jar_path)]);
        assert!(cp.package_exists("q"));
        assert!(cp.has_class("q.B"));
        let stub = cp.find_class("q.B").expect("stub");
        assert_eq!(stub.internal_name, "q/B");
    }
}
