mod util;

use indoc::indoc;
use util::{run_source, RUNTIME_ERROR, STATIC_ERROR, SUCCESS};

/// Spec §8, "For-loop Fibonacci."
#[test]
fn for_loop_fibonacci() {
    let run = run_source(indoc! {r#"
        var a = 0;
        var temp;
        for (var b = 1; a < 10; b = temp + b) {
            print a;
            temp = a;
            a = b;
        }
    "#});
    assert_eq!(run.stdout, "0\n1\n1\n2\n3\n5\n8\n");
    assert_eq!(run.code, SUCCESS);
}

/// Spec §8, "Recursive Fibonacci."
#[test]
fn recursive_fibonacci() {
    let run = run_source(indoc! {r#"
        fun fib(n) {
            if (n <= 1) return n;
            return fib(n - 2) + fib(n - 1);
        }
        for (var i = 0; i < 10; i = i + 1) print fib(i);
    "#});
    assert_eq!(run.stdout, "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
    assert_eq!(run.code, SUCCESS);
}

/// Spec §8, "Closure counter."
#[test]
fn closure_counter() {
    let run = run_source(indoc! {r#"
        fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                print i;
            }
            return count;
        }
        var c = makeCounter();
        c();
        c();
    "#});
    assert_eq!(run.stdout, "1\n2\n");
    assert_eq!(run.code, SUCCESS);
}

/// Spec §8, "Lexical scope": a function closed over an outer `a` must not
/// observe a later shadowing `var a` declared in the same block.
#[test]
fn lexical_scope_survives_shadowing() {
    let run = run_source(indoc! {r#"
        var a = "global";
        {
            fun showA() {
                print a;
            }
            showA();
            var a = "block";
            showA();
        }
    "#});
    assert_eq!(run.stdout, "global\nglobal\n");
    assert_eq!(run.code, SUCCESS);
}

/// Spec §8, "`this` rebinding": a bound method carries its own receiver
/// regardless of what it's later assigned to.
#[test]
fn bound_method_keeps_its_receiver() {
    let run = run_source(indoc! {r#"
        class Person {
            sayName() {
                print this.name;
            }
        }
        var jane = Person();
        jane.name = "Jane";
        var bill = Person();
        bill.name = "Bill";
        bill.sayName = jane.sayName;
        bill.sayName();
    "#});
    assert_eq!(run.stdout, "Jane\n");
    assert_eq!(run.code, SUCCESS);
}

/// Spec §8, "Init return": an explicit `return <value>` inside `init` is a
/// static error, not a runtime one.
#[test]
fn returning_a_value_from_init_is_a_static_error() {
    let run = run_source("class Foo { init() { return \"x\"; } }");
    assert!(run.stderr.contains("Can't return a value from an initializer."));
    assert_eq!(run.code, STATIC_ERROR);
}

/// Spec §8, "Super without superclass."
#[test]
fn super_without_superclass_is_a_static_error() {
    let run = run_source("class E { cook() { super.cook(); } }");
    assert!(run.stderr.contains("Can't use 'super' in a class with no superclass."));
    assert_eq!(run.code, STATIC_ERROR);
}

/// Spec §8, "Super resolution": `super.n()` dispatches to the parent's
/// method with `this` bound to the subclass instance.
#[test]
fn super_dispatches_with_receiver_bound_to_subclass_instance() {
    let run = run_source(indoc! {r#"
        class A {
            n() {
                print "A.n " + this.tag;
            }
        }
        class B < A {
            m() {
                super.n();
            }
        }
        var b = B();
        b.tag = "on B";
        b.m();
    "#});
    assert_eq!(run.stdout, "A.n on B\n");
    assert_eq!(run.code, SUCCESS);
}

/// Spec §8, "Initializer return": `init()` always yields the instance, even
/// when called again directly, not the value it returns internally.
#[test]
fn init_call_returns_the_instance_not_nil() {
    let run = run_source(indoc! {r#"
        class Thing {
            init(label) {
                this.label = label;
            }
        }
        var t = Thing("first");
        print t.init("second").label;
        print t.label;
    "#});
    assert_eq!(run.stdout, "second\nsecond\n");
    assert_eq!(run.code, SUCCESS);
}

/// Arity mismatch is a runtime error pointing at the call's closing paren.
#[test]
fn wrong_arity_is_a_runtime_error() {
    let run = run_source("fun f(a, b) { return a + b; } f(1);");
    assert!(run.stderr.contains("Expected 2 arguments but got 1."));
    assert_eq!(run.code, RUNTIME_ERROR);
}

/// Number stringification drops the trailing `.0` for integer-valued floats.
#[test]
fn integer_valued_numbers_print_without_a_decimal_point() {
    let run = run_source("print 6 / 2; print 6 / 4;");
    assert_eq!(run.stdout, "3\n1.5\n");
    assert_eq!(run.code, SUCCESS);
}

/// Spec §4.5, "Stringification for `print`": a native function prints as
/// `<native fn>` with no name interpolated.
#[test]
fn native_function_prints_without_its_name() {
    let run = run_source("print clock;");
    assert_eq!(run.stdout, "<native fn>\n");
    assert_eq!(run.code, SUCCESS);
}
