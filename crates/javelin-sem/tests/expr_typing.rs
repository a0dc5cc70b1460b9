mod harness;

use harness::{codes, Fixture};
use javelin_syntax::{BinaryOpKind, ExprKind};
use javelin_types::{ConstValue, Flags, PrimitiveType, Symbol, Type};
use pretty_assertions::assert_eq;

/// `class A { void f(int i) {} void f(long l) {} { f(1); } }` — the exact
/// phase-1 match beats widening.
#[test]
fn call_prefers_exact_primitive_match() {
    let mut fx = Fixture::new();

    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let long_ref = fx.prim_ref(PrimitiveType::Long);
    let pi = fx.param("i", int_ref);
    let pl = fx.param("l", long_ref);
    let f_int = fx.method("f", Flags::empty(), vec![pi], None, None);
    let f_long = fx.method("f", Flags::empty(), vec![pl], None, None);

    let one = fx.int_lit(1);
    let callsite = fx.call(None, "f", vec![one]);
    let stmt = fx.expr_stmt(callsite);
    let body = fx.block(vec![stmt]);
    let caller = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut class = fx.class("A", Flags::PUBLIC);
    class.methods.extend([f_int, f_long, caller]);
    let decl = fx.add_type(class);

    let sem = fx.analyze();
    assert!(!sem.diagnostics.has_errors());

    let chosen = sem.ast.expr(callsite).symbol.and_then(Symbol::as_method).expect("bound");
    let expected = sem.ast.type_decl(decl).methods[0].symbol.unwrap();
    assert_eq!(chosen, expected);
}

/// `class A { void f(Integer i) {} void f(long l) {} { f(1); } }` —
/// phase-1 widening beats phase-2 boxing.
#[test]
fn widening_beats_boxing_across_phases() {
    let mut fx = Fixture::new();

    let integer_ref = fx.named_ref("Integer");
    let long_ref = fx.prim_ref(PrimitiveType::Long);
    let pi = fx.param("i", integer_ref);
    let pl = fx.param("l", long_ref);
    let f_integer = fx.method("f", Flags::empty(), vec![pi], None, None);
    let f_long = fx.method("f", Flags::empty(), vec![pl], None, None);

    let one = fx.int_lit(1);
    let callsite = fx.call(None, "f", vec![one]);
    let stmt = fx.expr_stmt(callsite);
    let body = fx.block(vec![stmt]);
    let caller = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut class = fx.class("A", Flags::PUBLIC);
    class.methods.extend([f_integer, f_long, caller]);
    let decl = fx.add_type(class);

    let sem = fx.analyze();
    assert!(!sem.diagnostics.has_errors());

    let chosen = sem.ast.expr(callsite).symbol.and_then(Symbol::as_method).expect("bound");
    let f_long_id = sem.ast.type_decl(decl).methods[1].symbol.unwrap();
    assert_eq!(chosen, f_long_id);
}

/// `int i = 1/0;` — reported as a warning, but the expression stays int
/// and compilation continues.
#[test]
fn zero_divide_warns_and_keeps_the_type() {
    let mut fx = Fixture::new();

    let one = fx.int_lit(1);
    let zero = fx.int_lit(0);
    let division = fx.binary(BinaryOpKind::Div, one, zero);
    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let field = fx.field("i", int_ref, Flags::empty(), Some(division));

    let mut class = fx.class("E", Flags::PUBLIC);
    class.fields.push(field);
    fx.add_type(class);

    let sem = fx.analyze();
    assert_eq!(codes(&sem, "SemanticError::ZERO_DIVIDE").len(), 1);
    assert!(!sem.diagnostics.has_errors());
    assert_eq!(sem.ast.expr(division).ty, Some(Type::Primitive(PrimitiveType::Int)));
    // Not folded: the division still happens at run time.
    assert_eq!(sem.ast.expr(division).value, None);
}

#[test]
fn constant_arithmetic_folds_with_overflow_warning() {
    let mut fx = Fixture::new();

    let big = fx.int_lit(1 << 30);
    let four = fx.int_lit(4);
    let product = fx.binary(BinaryOpKind::Mul, big, four);
    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let field = fx.field("i", int_ref, Flags::FINAL, Some(product));

    let mut class = fx.class("E", Flags::PUBLIC);
    class.fields.push(field);
    fx.add_type(class);

    let sem = fx.analyze();
    assert_eq!(codes(&sem, "SemanticError::CONSTANT_OVERFLOW").len(), 1);
    assert_eq!(sem.ast.expr(product).value, Some(ConstValue::Int(0)));
}

#[test]
fn string_concatenation_converts_and_folds_constants() {
    let mut fx = Fixture::new();

    let hello = fx.str_lit("v=");
    let one = fx.int_lit(1);
    let concat = fx.binary(BinaryOpKind::Add, hello, one);
    let string_ref = fx.named_ref("String");
    let field = fx.field("s", string_ref, Flags::empty(), Some(concat));

    let mut class = fx.class("E", Flags::PUBLIC);
    class.fields.push(field);
    fx.add_type(class);

    let sem = fx.analyze();
    assert!(!sem.diagnostics.has_errors());
    let node = sem.ast.expr(concat);
    assert_eq!(node.value, Some(ConstValue::Str("v=1".to_string())));
    let string = Type::class(sem.store.well_known().string, vec![]);
    assert_eq!(node.ty, Some(string));
}

/// `g(); g("a"); g("a","b"); g(new String[]{"a"});` — the first three wrap
/// their arguments into a synthesised array, the fourth passes through.
#[test]
fn varargs_calls_wrap_or_pass_through() {
    let mut fx = Fixture::new();

    let string_elem = fx.named_ref("String");
    let xs = fx.varargs_param("xs", string_elem);
    let g = fx.method("g", Flags::empty(), vec![xs], None, None);

    let call0 = fx.call(None, "g", vec![]);
    let a1 = fx.str_lit("a");
    let call1 = fx.call(None, "g", vec![a1]);
    let a2 = fx.str_lit("a");
    let b2 = fx.str_lit("b");
    let call2 = fx.call(None, "g", vec![a2, b2]);
    let elem_ref = fx.named_ref("String");
    let a3 = fx.str_lit("a");
    let array = fx.new_array_with_init(elem_ref, vec![a3]);
    let call3 = fx.call(None, "g", vec![array]);

    let stmts = [call0, call1, call2, call3].map(|c| fx.expr_stmt(c)).to_vec();
    let body = fx.block(stmts);
    let caller = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut class = fx.class("V", Flags::PUBLIC);
    class.methods.extend([g, caller]);
    fx.add_type(class);

    let sem = fx.analyze();
    assert!(
        !sem.diagnostics.has_errors(),
        "{:?}",
        sem.diagnostics.iter().collect::<Vec<_>>()
    );

    let string = Type::class(sem.store.well_known().string, vec![]);
    for (call, wrapped_len) in [(call0, 0usize), (call1, 1), (call2, 2)] {
        let ExprKind::MethodCall { args, .. } = &sem.ast.expr(call).kind else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1, "arguments collapse into the array");
        let ExprKind::ArrayInit { elements } = &sem.ast.expr(args[0]).kind else {
            panic!("expected synthesised array literal");
        };
        assert_eq!(elements.len(), wrapped_len);
        assert_eq!(sem.ast.expr(args[0]).ty, Some(Type::array(string.clone())));
    }

    // Pass-through: the argument list still holds the original array.
    let ExprKind::MethodCall { args, .. } = &sem.ast.expr(call3).kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
    assert_eq!(args[0], array);
}

#[test]
fn constant_shift_counts_are_masked_with_a_warning() {
    let mut fx = Fixture::new();

    let one = fx.int_lit(1);
    let count = fx.int_lit(33);
    let shift = fx.binary(BinaryOpKind::Shl, one, count);
    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let field = fx.field("i", int_ref, Flags::empty(), Some(shift));

    let mut class = fx.class("E", Flags::PUBLIC);
    class.fields.push(field);
    fx.add_type(class);

    let sem = fx.analyze();
    assert_eq!(codes(&sem, "SemanticError::SHIFT_COUNT_OUT_OF_RANGE").len(), 1);
    assert_eq!(sem.ast.expr(shift).value, Some(ConstValue::Int(2)));
}

#[test]
fn conditional_arms_join_on_the_common_superclass() {
    let mut fx = Fixture::new();

    // flag ? new Integer(1) : "text" — Integer and String join at Object.
    let flag_ref = fx.prim_ref(PrimitiveType::Boolean);
    let flag_field = fx.field("flag", flag_ref, Flags::empty(), None);

    let cond = fx.name("flag");
    let integer_ref = fx.named_ref("Integer");
    let one = fx.int_lit(1);
    let boxed = {
        let token = fx.tok("new");
        fx.ast.alloc_expr(
            ExprKind::New { ty: integer_ref, args: vec![one], body: None, enclosing: None },
            token,
        )
    };
    let text = fx.str_lit("text");
    let conditional = {
        let token = fx.tok("?");
        fx.ast.alloc_expr(
            ExprKind::Conditional { cond, then_expr: boxed, else_expr: text },
            token,
        )
    };
    let object_ref = fx.named_ref("Object");
    let field = fx.field("o", object_ref, Flags::empty(), Some(conditional));

    let mut class = fx.class("E", Flags::PUBLIC);
    class.fields.push(flag_field);
    class.fields.push(field);
    fx.add_type(class);

    let sem = fx.analyze();
    assert!(!sem.diagnostics.has_errors());
    let object = Type::class(sem.store.well_known().object, vec![]);
    assert_eq!(sem.ast.expr(conditional).ty, Some(object));
}

#[test]
fn incompatible_assignment_recovers_without_cascading() {
    let mut fx = Fixture::new();

    let text = fx.str_lit("oops");
    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let field = fx.field("i", int_ref, Flags::empty(), Some(text));

    // A second use of the broken field must not produce more errors.
    let use_i = fx.name("i");
    let one = fx.int_lit(1);
    let sum = fx.binary(BinaryOpKind::Add, use_i, one);
    let stmt = fx.expr_stmt(sum);
    let body = fx.block(vec![stmt]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut class = fx.class("E", Flags::PUBLIC);
    class.fields.push(field);
    class.methods.push(method);
    fx.add_type(class);

    let sem = fx.analyze();
    assert_eq!(sem.diagnostics.error_count(), 1);
    assert_eq!(codes(&sem, "SemanticError::INCOMPATIBLE_TYPES").len(), 1);
    // The field's declared type keeps downstream expressions typed.
    assert_eq!(sem.ast.expr(sum).ty, Some(Type::Primitive(PrimitiveType::Int)));
}
