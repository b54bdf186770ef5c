//! A collection of methods for printing compiled expressions.

use super::rpn::{Expression, Unit};

fn describe_unit(unit: &Unit) -> &'static str {
    match unit {
        Unit::Number(_) => "NUMBER",
        Unit::Variable => "VARIABLE",
        Unit::Function(_) => "FUNCTION",
        Unit::Operator(_) => "OPERATOR",
    }
}

/// Render the program of \p expr, one unit per line, with the depth of the
/// evaluation stack after each unit.
pub fn format_rpn(expr: &Expression) -> String {
    let mut result = format!("Expression: {}\n", expr.source());
    let mut depth: isize = 0;
    for (i, unit) in expr.units().iter().enumerate() {
        depth += unit.stack_effect().0;
        result.push_str(&format!(
            "{:>3}) {:<9} {:<8} depth {}\n",
            i,
            describe_unit(unit),
            unit.to_string(),
            depth
        ));
    }
    result
}

pub fn dump_rpn(expr: &Expression) {
    print!("{}", format_rpn(expr));
}

#[test]
fn test_format_rpn() {
    let expr = Expression::compile("2 * sin(x)").unwrap();
    let text = format_rpn(&expr);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Expression: 2 * sin(x)");
    assert!(lines[1].contains("NUMBER"));
    assert!(lines[2].contains("VARIABLE"));
    assert!(lines[3].contains("FUNCTION") && lines[3].contains("sin"));
    assert!(lines[4].contains("OPERATOR") && lines[4].ends_with("depth 1"));
}
