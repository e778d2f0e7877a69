//! Source hygiene tests: package stripping, import hoisting, type demotion and
//! call qualification.

use harness_core::hygiene::{
    block_namespace, call_name, demote_public_types, dedupe, hoist_imports, is_unqualified_call,
    owning_type, primary_type, qualify_call, qualify_call_as, strip_package, ImportStyle,
    Receiver,
};

// ============================================================================
// Packages and namespaces
// ============================================================================

#[test]
fn strips_java_package() {
    let (source, package) = strip_package("package com.example;\n\npublic class A {}\n", "package");
    assert_eq!(package.as_deref(), Some("com.example"));
    assert_eq!(source, "\npublic class A {}\n");
}

#[test]
fn strips_go_package() {
    let (source, package) = strip_package("package solution\n\nfunc F() {}\n", "package");
    assert_eq!(package.as_deref(), Some("solution"));
    assert!(!source.contains("package"));
}

#[test]
fn keeps_package_word_inside_strings_and_blocks() {
    let text = "class A {\n    String s = \"package x;\";\n}\n";
    let (source, package) = strip_package(text, "package");
    assert_eq!(package, None);
    assert_eq!(source, text);
}

#[test]
fn strips_file_scoped_namespace_only() {
    let (source, name) = strip_package("namespace Demo;\n\nclass A {}\n", "namespace");
    assert_eq!(name.as_deref(), Some("Demo"));
    assert!(!source.contains("namespace"));

    let block = "namespace Demo\n{\n    class A {}\n}\n";
    let (source, name) = strip_package(block, "namespace");
    assert_eq!(name, None);
    assert_eq!(source, block);
}

#[test]
fn finds_block_namespace() {
    assert_eq!(
        block_namespace("namespace Demo.Inner {\n}\n").as_deref(),
        Some("Demo.Inner")
    );
    assert_eq!(block_namespace("namespace Demo;\n"), None);
    assert_eq!(block_namespace("class A {}\n"), None);
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn hoists_java_imports() {
    let text = "import java.util.*;\nimport static java.lang.Math.max;\n\nclass A {}\n";
    let (imports, body) = hoist_imports(text, ImportStyle::Java);
    assert_eq!(
        imports,
        vec![
            "import java.util.*;".to_string(),
            "import static java.lang.Math.max;".to_string()
        ]
    );
    assert_eq!(body, "\nclass A {}\n");
}

#[test]
fn hoists_go_import_block_and_single_imports() {
    let text = "package main\n\nimport (\n\t\"fmt\"\n\tstr \"strings\"\n)\nimport \"sort\"\n\nfunc F() {}\n";
    let (imports, body) = hoist_imports(text, ImportStyle::Go);
    assert_eq!(
        imports,
        vec![
            "import \"fmt\"".to_string(),
            "import str \"strings\"".to_string(),
            "import \"sort\"".to_string(),
        ]
    );
    assert!(!body.contains("import"));
    assert!(body.contains("func F() {}"));
}

#[test]
fn hoists_csharp_usings_but_not_using_statements() {
    let text = "using System;\nusing static System.Math;\nclass A {\n    void F() {\n        using (var r = Open()) {}\n    }\n}\n";
    let (imports, body) = hoist_imports(text, ImportStyle::CSharp);
    assert_eq!(
        imports,
        vec![
            "using System;".to_string(),
            "using static System.Math;".to_string()
        ]
    );
    assert!(body.contains("using (var r = Open())"));
}

#[test]
fn nested_import_lookalikes_stay_put() {
    let text = "class A {\n    import x;\n}\n";
    let (imports, body) = hoist_imports(text, ImportStyle::Java);
    assert!(imports.is_empty());
    assert_eq!(body, text);
}

#[test]
fn dedupe_keeps_first_occurrence_order() {
    let items = ["b", "a", "b", "c", "a"].map(String::from);
    assert_eq!(dedupe(items), vec!["b", "a", "c"]);
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn demotes_top_level_public_types_only() {
    let text = "public class Solution {\n    public static class Node {}\n    public int f() { return 1; }\n}\npublic interface Shape {}\n";
    let demoted = demote_public_types(text);
    assert!(demoted.starts_with("class Solution {"));
    assert!(demoted.contains("    public static class Node {}"));
    assert!(demoted.contains("    public int f()"));
    assert!(demoted.contains("\ninterface Shape {}"));
}

#[test]
fn primary_type_prefers_public() {
    assert_eq!(
        primary_type("class Helper {}\npublic class Solution {}\n").as_deref(),
        Some("Solution")
    );
    assert_eq!(primary_type("class Helper {}\n").as_deref(), Some("Helper"));
    assert_eq!(primary_type("int x = 1;\n"), None);
}

#[test]
fn primary_type_ignores_nested_types() {
    let text = "public class Outer {\n    public class Inner {}\n}\n";
    assert_eq!(primary_type(text).as_deref(), Some("Outer"));
}

#[test]
fn primary_type_looks_inside_block_namespaces() {
    let text = "namespace Demo\n{\n    public class Solution {}\n}\n";
    assert_eq!(primary_type(text).as_deref(), Some("Solution"));
}

#[test]
fn generic_and_record_types() {
    assert_eq!(
        primary_type("public record Point(int x, int y) {}\n").as_deref(),
        Some("Point")
    );
    assert_eq!(
        primary_type("public class Box<T> {}\n").as_deref(),
        Some("Box")
    );
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn unqualified_call_detection() {
    assert!(is_unqualified_call("add(1, 2)"));
    assert!(is_unqualified_call("  add (1)"));
    assert!(!is_unqualified_call("Solution.add(1)"));
    assert!(!is_unqualified_call("new Solution().add(1)"));
    assert!(!is_unqualified_call("42"));
}

#[test]
fn qualify_instance_method() {
    let source = "class Solution {\n    public int add(int a, int b) { return a + b; }\n}\n";
    assert_eq!(
        qualify_call("add(1, 2)", "Solution", source),
        "new Solution().add(1, 2)"
    );
}

#[test]
fn qualify_static_method() {
    let source = "class Solution {\n    public static int add(int a, int b) { return a + b; }\n}\n";
    assert_eq!(qualify_call("add(1, 2)", "Solution", source), "Solution.add(1, 2)");
}

#[test]
fn qualified_calls_pass_through() {
    let source = "class Solution {}\n";
    assert_eq!(
        qualify_call(" Other.add(1) ", "Solution", source),
        "Other.add(1)"
    );
}

#[test]
fn static_detection_needs_a_call_site_not_a_prefix() {
    let source = "class S {\n    static int addAll(int[] xs) { return 0; }\n    int add(int a) { return a; }\n}\n";
    assert_eq!(qualify_call("add(1)", "S", source), "new S().add(1)");
}

#[test]
fn call_name_is_the_bare_callee() {
    assert_eq!(call_name("add(1, 2)").as_deref(), Some("add"));
    assert_eq!(call_name(" twice (4)").as_deref(), Some("twice"));
    assert_eq!(call_name("Solution::add(1)"), None);
    assert_eq!(call_name("new Solution()"), None);
    assert_eq!(call_name("9(1)"), None);
}

#[test]
fn scoped_receivers() {
    let source = "class Solution {\npublic:\n    int add(int a, int b) { return a + b; }\n    static int twice(int a) { return 2 * a; }\n};\n";
    assert_eq!(
        qualify_call_as("add(1, 2)", "Solution", source, Receiver::Scoped),
        "Solution().add(1, 2)"
    );
    assert_eq!(
        qualify_call_as("twice(4)", "Solution", source, Receiver::Scoped),
        "Solution::twice(4)"
    );
}

// ============================================================================
// Owning types
// ============================================================================

#[test]
fn owning_type_finds_the_enclosing_class() {
    let source = "#include <vector>\n\nclass Solution {\npublic:\n    int add(int a, int b) { return a + b; }\n};\n";
    assert_eq!(owning_type(source, "add").as_deref(), Some("Solution"));
}

#[test]
fn free_functions_have_no_owner() {
    let source = "struct Point { int x; int y; };\n\nint add(int a, int b) { return a + b; }\n";
    assert_eq!(owning_type(source, "add"), None);
    assert_eq!(owning_type(source, "missing"), None);
}

#[test]
fn out_of_class_definitions_name_their_owner() {
    let source = "class Solution {\npublic:\n    int add(int a, int b);\n};\n\nint Solution::add(int a, int b) { return a + b; }\n";
    assert_eq!(owning_type(source, "add").as_deref(), Some("Solution"));
    let later = "int helper() { return 1; }\nint Solution::add(int a, int b) { return a + b; }\n";
    assert_eq!(owning_type(later, "add").as_deref(), Some("Solution"));
}
