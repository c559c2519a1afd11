//! JSON values as PHP literal expressions.

use php_ast::{ArrayItem, Expr, Literal};
use serde_json::Value;

/// Convert a JSON value to a PHP literal.
///
/// Arrays become short list arrays and objects become keyed short arrays,
/// keys in document order. Strings are single-quoted.
///
/// ```rust
/// use php_edit::builder::literal_from_json;
/// use serde_json::json;
///
/// let expr = literal_from_json(&json!({"debug": false, "it's": [1, 2.5]}));
/// assert_eq!(php_ast::print_expr(&expr), "['debug' => false, 'it\\'s' => [1, 2.5]]");
/// ```
pub fn literal_from_json(value: &Value) -> Expr {
    match value {
        Value::Null => Expr::Literal(Literal::Null),
        Value::Bool(b) => Expr::Literal(Literal::Bool(*b)),
        Value::Number(n) if n.is_f64() => Expr::Literal(Literal::Float(n.to_string())),
        Value::Number(n) => Expr::Literal(Literal::Int(n.to_string())),
        Value::String(s) => Expr::Literal(Literal::string(s)),
        Value::Array(items) => Expr::Array {
            items: items.iter().map(|v| ArrayItem::value(literal_from_json(v))).collect(),
            short: true,
        },
        Value::Object(map) => Expr::Array {
            items: map
                .iter()
                .map(|(k, v)| ArrayItem::keyed(Expr::Literal(Literal::string(k)), literal_from_json(v)))
                .collect(),
            short: true,
        },
    }
}
