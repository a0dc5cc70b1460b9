mod harness;

use std::io::Write as _;

use harness::Fixture;
use javelin_classpath::{Classpath, ClasspathEntry};
use javelin_sem::Semantic;
use javelin_types::{Flags, Symbol, Type, TypeStore};

// A minimal class file: constant pool with just this/super class entries.
fn minimal_class(internal_name: &str, super_name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&49u16.to_be_bytes());
    out.extend_from_slice(&5u16.to_be_bytes());
    out.push(1);
    out.extend_from_slice(&(internal_name.len() as u16).to_be_bytes());
    out.extend_from_slice(internal_name.as_bytes());
    out.push(7);
    out.extend_from_slice(&1u16.to_be_bytes());
    out.push(1);
    out.extend_from_slice(&(super_name.len() as u16).to_be_bytes());
    out.extend_from_slice(super_name.as_bytes());
    out.push(7);
    out.extend_from_slice(&3u16.to_be_bytes());
    out.extend_from_slice(&0x0021u16.to_be_bytes());
    out.extend_from_slice(&2u16.to_be_bytes());
    out.extend_from_slice(&4u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out
}

/// A field typed by a classpath-only class loads that class lazily, and
/// the package fallback classifies `libs` as a package.
#[test]
fn classpath_types_load_lazily_during_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let pkg = dir.path().join("libs/util");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(
        pkg.join("Helper.class"),
        minimal_class("libs/util/Helper", "java/lang/Object"),
    )
    .unwrap();

    let classpath = Classpath::new(vec![ClasspathEntry::ClassDir(dir.path().to_path_buf())]);

    let mut fx = Fixture::new();
    let helper_ref = fx.named_ref("libs.util.Helper");
    let field = fx.field("helper", helper_ref, Flags::empty(), None);
    let use_expr = fx.name("helper");
    let use_stmt = fx.expr_stmt(use_expr);
    let body = fx.block(vec![use_stmt]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));
    let mut class = fx.class("C", Flags::PUBLIC);
    class.fields.push(field);
    class.methods.push(method);
    fx.add_type(class);

    let (ast, lex) = fx.into_parts();
    let mut sem = Semantic::new(TypeStore::with_minimal_jdk(), ast, lex, Some(&classpath));
    sem.analyze();

    assert!(
        !sem.diagnostics.has_errors(),
        "{:?}",
        sem.diagnostics.iter().collect::<Vec<_>>()
    );
    let helper = sem.store.class_id("libs.util.Helper").expect("interned");
    assert!(sem.store.is_defined(helper), "loaded on first dereference");
    assert!(matches!(sem.ast.expr(use_expr).symbol, Some(Symbol::Field(_))));
    assert_eq!(sem.ast.expr(use_expr).ty, Some(Type::class(helper, vec![])));

    // The jar/dir never parsed classes the program did not touch, and the
    // package tree answers existence queries.
    assert!(classpath.package_exists("libs.util"));
}

/// Classes inside jars resolve the same way.
#[test]
fn jar_entries_resolve_like_directories() {
    let dir = tempfile::tempdir().unwrap();
    let jar_path = dir.path().join("dep.jar");
    let file = std::fs::File::create(&jar_path).unwrap();
    let mut jar = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    jar.start_file("acme/Widget.class", options).unwrap();
    jar.write_all(&minimal_class("acme/Widget", "java/lang/Object")).unwrap();
    jar.finish().unwrap();

    let classpath = Classpath::new(vec![ClasspathEntry::Jar(jar_path)]);

    let mut fx = Fixture::new();
    let widget_ref = fx.named_ref("acme.Widget");
    let field = fx.field("w", widget_ref, Flags::empty(), None);
    let mut class = fx.class("C", Flags::PUBLIC);
    class.fields.push(field);
    fx.add_type(class);

    let (ast, lex) = fx.into_parts();
    let mut sem = Semantic::new(TypeStore::with_minimal_jdk(), ast, lex, Some(&classpath));
    sem.analyze();

    assert!(!sem.diagnostics.has_errors());
    let widget = sem.store.class_id("acme.Widget").unwrap();
    assert!(sem.store.is_defined(widget));
}
