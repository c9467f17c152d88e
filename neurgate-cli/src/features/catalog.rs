//! Built-in language feature catalog

use neurgate_core::TestCase;

/// Category labels, in the order their cases appear
pub const CATEGORIES: [&str; 4] = ["basic", "advanced", "compilation-only", "phase-1"];

/// Heading printed before a category's cases
pub fn category_title(category: &str) -> &str {
    match category {
        "basic" => "Basic Language Features",
        "advanced" => "Advanced Language Features",
        "compilation-only" => "Compilation-Only Features",
        "phase-1" => "Phase 1 Implemented Features",
        other => other,
    }
}

/// Label used in the per-category totals
pub fn category_summary_label(category: &str) -> &str {
    match category {
        "basic" => "Basic features",
        "advanced" => "Advanced features",
        "compilation-only" => "Compilation tests",
        "phase-1" => "Phase 1 features",
        other => other,
    }
}

const BASIC: &[(&str, &str, i32)] = &[
    ("Simple main function", "fn main() -> int { return 42; }", 42),
    ("Variable declaration", "fn main() -> int { let x = 10; return x; }", 10),
    (
        "Arithmetic operations",
        "fn main() -> int { let result = 5 + 3 * 2; return result; }",
        11,
    ),
    (
        "Boolean operations",
        "fn main() -> int { let flag = true; if flag { return 1; } return 0; }",
        1,
    ),
    (
        "If-else statement",
        "fn main() -> int { if 5 > 3 { return 1; } else { return 0; } }",
        1,
    ),
    (
        "While loop",
        "fn main() -> int { let i = 0; while i < 3 { i = i + 1; } return i; }",
        3,
    ),
    (
        "Function calls",
        "fn add(a: int, b: int) -> int { return a + b; } fn main() -> int { return add(5, 7); }",
        12,
    ),
    (
        "Nested function calls",
        "fn double(x: int) -> int { return x * 2; } fn main() -> int { return double(double(3)); }",
        12,
    ),
];

const ADVANCED: &[(&str, &str, i32)] = &[
    ("Complex expressions", "fn main() -> int { return (5 + 3) * (2 - 1); }", 8),
    (
        "Logical operators",
        "fn main() -> int { if true && false { return 0; } return 1; }",
        1,
    ),
    (
        "Comparison operators",
        "fn main() -> int { if 10 >= 10 && 5 < 7 { return 1; } return 0; }",
        1,
    ),
    (
        "Variable reassignment",
        "fn main() -> int { let x = 5; x = x + 3; return x; }",
        8,
    ),
    (
        "Multiple variables",
        "fn main() -> int { let a = 3; let b = 4; return a * b; }",
        12,
    ),
    (
        "Recursive functions",
        "fn factorial(n: int) -> int { if n <= 1 { return 1; } return n * factorial(n - 1); } \
         fn main() -> int { return factorial(5); }",
        120,
    ),
    (
        "Break and continue in loops",
        "fn main() -> int { let sum = 0; let i = 0; while i < 10 { i = i + 1; \
         if i == 5 { continue; } if i == 8 { break; } sum = sum + i; } return sum; }",
        21,
    ),
    (
        "Nested function scopes",
        "fn outer() -> int { let x = 10; fn inner() -> int { return x + 5; } return inner(); } \
         fn main() -> int { return outer(); }",
        15,
    ),
];

const COMPILATION_ONLY: &[(&str, &str)] = &[
    ("Empty main function", "fn main() -> int { return 0; }"),
    (
        "Multiple functions",
        "fn helper() -> int { return 5; } fn main() -> int { return helper(); }",
    ),
    (
        "Nested if statements",
        "fn main() -> int { if true { if false { return 1; } return 2; } return 3; }",
    ),
    (
        "Complex control flow",
        "fn main() -> int { let x = 0; while x < 5 { if x == 2 { x = x + 2; } \
         else { x = x + 1; } } return x; }",
    ),
    (
        "Type annotations",
        "fn typed_function(x: int, y: int) -> int { let result: int = x + y; return result; } \
         fn main() -> int { return typed_function(3, 4); }",
    ),
    (
        "Module import (basic)",
        "use std::print; fn main() -> int { return 0; }",
    ),
    (
        "Pattern matching (basic)",
        "fn main() -> int { let x = 5; return match x { 5 => 1, _ => 0 }; }",
    ),
    (
        "Boolean expressions",
        "fn main() -> int { let flag = true; let result = flag && (5 > 3) || false; \
         if result { return 1; } return 0; }",
    ),
];

const PHASE_1: &[(&str, &str, i32)] = &[
    (
        "Memory management basics",
        "fn main() -> int { let x = 42; let y = x; return y; }",
        42,
    ),
    (
        "Type inference",
        "fn test() -> int { let x = 5; let y = x + 3; return y; } \
         fn main() -> int { return test(); }",
        8,
    ),
    (
        "Function overloading check",
        "fn test(x: int) -> int { return x * 2; } fn main() -> int { return test(5); }",
        10,
    ),
    (
        "Advanced control flow",
        "fn test() -> int { let mut i = 0; let mut sum = 0; while i < 5 { \
         if i % 2 == 0 { sum = sum + i; } i = i + 1; } return sum; } \
         fn main() -> int { return test(); }",
        6,
    ),
];

/// The built-in cases in definition order
pub fn builtin_cases() -> Vec<TestCase> {
    let compile_only = COMPILATION_ONLY
        .iter()
        .map(|(name, code)| TestCase::inline(*name, *code).in_category("compilation-only"));

    running("basic", BASIC)
        .chain(running("advanced", ADVANCED))
        .chain(compile_only)
        .chain(running("phase-1", PHASE_1))
        .collect()
}

fn running(
    category: &'static str,
    cases: &'static [(&'static str, &'static str, i32)],
) -> impl Iterator<Item = TestCase> {
    cases.iter().map(move |(name, code, expected)| {
        TestCase::inline(*name, *code)
            .expecting(*expected)
            .in_category(category)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_shape() {
        let cases = builtin_cases();
        assert_eq!(cases.len(), 28);

        let names: HashSet<_> = cases.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), cases.len(), "case names must be unique");

        for category in CATEGORIES {
            let count = cases
                .iter()
                .filter(|c| c.category() == Some(category))
                .count();
            let expected = if category == "phase-1" { 4 } else { 8 };
            assert_eq!(count, expected, "{category}");
        }
    }

    #[test]
    fn test_compilation_only_cases_do_not_run() {
        assert!(
            builtin_cases()
                .iter()
                .filter(|c| c.category() == Some("compilation-only"))
                .all(|c| c.expected_exit_code().is_none())
        );
    }

    #[test]
    fn test_first_case() {
        let cases = builtin_cases();
        assert_eq!(cases[0].name(), "Simple main function");
        assert_eq!(cases[0].expected_exit_code(), Some(42));
    }
}
