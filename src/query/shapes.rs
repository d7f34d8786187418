use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;

/// Statement shapes the interpreter understands, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShapeKind {
    /// `Model::create([...])`
    Create,
    /// `Model::all()`
    All,
    /// `Model::with([... => function ($q) {...}, ...])->get()`
    ClosureWith,
    /// Two or more `where(...)`, optional `with(...)`, then `get()`
    MultiWhere,
    /// `Model::where(...)->with(...)->get()`
    WhereWith,
    /// `Model::where(...)->get()`
    WhereGet,
    /// `Model::where(...)->first()`
    WhereFirst,
    /// `Model::find(n)`
    Find,
    /// `Model::with(...)->get()`
    With,
    /// `...->update(...)`
    Update,
    /// `...->delete()`
    Delete,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Capture groups: 1 is always the model. For `Create` 2 is the pair list;
/// `ClosureWith`/`With` 2 is the relation list; `WhereWith` 2 is the where
/// arguments and 3 the relation list; `WhereGet`/`WhereFirst` 2 is the where
/// arguments; `Find` 2 is the id.
const STATEMENT_SHAPES: &[(ShapeKind, &str)] = &[
    (ShapeKind::Create, r"(?s)(\w+)::create\(\s*\[(.*?)\]\s*\)"),
    (ShapeKind::All, r"(\w+)::all\(\s*\)"),
    (
        ShapeKind::ClosureWith,
        r"(?s)(\w+)::with\(\s*\[(.*)\]\s*\)\s*->\s*get\(\s*\)",
    ),
    (
        ShapeKind::MultiWhere,
        r"(?s)(\w+)::where\([^)]*\)(?:\s*->\s*where\([^)]*\))+(?:\s*->\s*with\([^)]*\))?\s*->\s*get\(\s*\)",
    ),
    (
        ShapeKind::WhereWith,
        r"(?s)(\w+)::where\(([^)]*)\)\s*->\s*with\(([^)]*)\)\s*->\s*get\(\s*\)",
    ),
    (ShapeKind::WhereGet, r"(?s)(\w+)::where\(([^)]*)\)\s*->\s*get\(\s*\)"),
    (ShapeKind::WhereFirst, r"(?s)(\w+)::where\(([^)]*)\)\s*->\s*first\(\s*\)"),
    (ShapeKind::Find, r#"(\w+)::find\(\s*['"]?(\d+)['"]?\s*\)"#),
    (ShapeKind::With, r"(?s)(\w+)::with\(([^)]+)\)\s*->\s*get\(\s*\)"),
    (ShapeKind::Update, r"(?s)(\w+)::.*->\s*update\("),
    (ShapeKind::Delete, r"(?s)(\w+)::.*->\s*delete\(\s*\)"),
];

/// One recognizer: a pure predicate over the pre-processed query text.
pub struct StatementShape {
    pub kind: ShapeKind,
    pattern: Regex,
}

impl StatementShape {
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.pattern.captures(text)
    }
}

/// The ordered recognizer list; the first shape that matches wins.
pub struct ShapeTable {
    shapes: Vec<StatementShape>,
}

impl ShapeTable {
    pub fn new() -> Self {
        let shapes = STATEMENT_SHAPES
            .iter()
            .map(|(kind, pattern)| StatementShape {
                kind: *kind,
                pattern: Regex::new(pattern).expect("statement shape patterns are valid"),
            })
            .collect();
        Self { shapes }
    }

    /// First shape matching `text`, with its captures.
    pub fn recognize<'t>(&self, text: &'t str) -> Option<(ShapeKind, Captures<'t>)> {
        self.shapes
            .iter()
            .find_map(|shape| shape.captures(text).map(|caps| (shape.kind, caps)))
    }

    pub fn kind_of(&self, text: &str) -> Option<ShapeKind> {
        self.shapes
            .iter()
            .find(|shape| shape.matches(text))
            .map(|shape| shape.kind)
    }
}

impl Default for ShapeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(text: &str) -> Option<ShapeKind> {
        ShapeTable::new().kind_of(text)
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(kind("Product::create(['name' => 'X'])"), Some(ShapeKind::Create));
        assert_eq!(kind("Product::all()"), Some(ShapeKind::All));
        assert_eq!(
            kind("Brand::with(['products' => function($q) { $q->where('price', '>', 5); }])->get()"),
            Some(ShapeKind::ClosureWith)
        );
        assert_eq!(
            kind("Product::where('a', 1)->where('b', '>', 2)->get()"),
            Some(ShapeKind::MultiWhere)
        );
        assert_eq!(
            kind("Product::where('a', 1)->where('b', 2)->with('brand')->get()"),
            Some(ShapeKind::MultiWhere)
        );
        assert_eq!(
            kind("Product::where('price', '>', 10)->with('brand')->get()"),
            Some(ShapeKind::WhereWith)
        );
        assert_eq!(kind("Product::where('a', 1)->get()"), Some(ShapeKind::WhereGet));
        assert_eq!(kind("Product::where('a', 1)->first()"), Some(ShapeKind::WhereFirst));
        assert_eq!(kind("Product::find(3)"), Some(ShapeKind::Find));
        assert_eq!(kind("Product::with('brand', 'supplier')->get()"), Some(ShapeKind::With));
        assert_eq!(
            kind("Product::where('id', 1)->update(['name' => 'Y'])"),
            Some(ShapeKind::Update)
        );
        assert_eq!(kind("Product::find(1)->delete()"), Some(ShapeKind::Find));
        assert_eq!(kind("Product::where('id', 1)->delete()"), Some(ShapeKind::Delete));
        assert_eq!(kind("SELECT * FROM products"), None);
    }

    #[test]
    fn test_bracket_with_goes_to_closure_form() {
        assert_eq!(kind("Product::with(['brand'])->get()"), Some(ShapeKind::ClosureWith));
    }

    #[test]
    fn test_whitespace_between_calls() {
        assert_eq!(
            kind("Product::where('a', 1)\n    ->with('brand')\n    ->get();"),
            Some(ShapeKind::WhereWith)
        );
    }
}
