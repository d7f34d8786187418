// tests/relations_test.rs
//
// Relation inference: has-many, belongs-to, nesting, closure constraints

use serde_json::{json, Value as Json};
use tablesim::{
    Dataset, Interpreter, RelationClassifier, RelationConfig, RelationKind, RelationResolver,
};

fn shop() -> Dataset {
    serde_json::from_value(json!({
        "brands": [
            {"id": 1, "name": "Acme"},
            {"id": 2, "name": "Globex"},
            {"id": 3, "name": "Initech"}
        ],
        "suppliers": [
            {"id": 10, "name": "North"}
        ],
        "categories": [
            {"id": 7, "name": "Tools"}
        ],
        "products": [
            {"id": 1, "name": "Hammer", "price": 12, "brand_id": 1, "supplier_id": 10, "category_id": 7},
            {"id": 2, "name": "Nail", "price": 1, "brand_id": 1, "supplier_id": 10, "category_id": 7},
            {"id": 3, "name": "Saw", "price": 30, "brand_id": 2, "supplier_id": null, "category_id": 7}
        ]
    }))
    .expect("valid dataset")
}

fn run(query: &str, data: &Dataset) -> Json {
    serde_json::to_value(Interpreter::default().interpret(query, data)).unwrap()
}

#[test]
fn test_belongs_to_attaches_record() {
    let out = run("Product::with('brand')->get()", &shop());
    assert_eq!(out[0]["brand"], json!({"id": 1, "name": "Acme"}));
    assert_eq!(out[2]["brand"], json!({"id": 2, "name": "Globex"}));
}

#[test]
fn test_missing_belongs_to_is_null() {
    let out = run("Product::with('supplier')->get()", &shop());
    assert_eq!(out[0]["supplier"]["name"], json!("North"));
    assert_eq!(out[2]["supplier"], Json::Null);
}

#[test]
fn test_has_many_attaches_list() {
    let out = run("Brand::with('products')->get()", &shop());
    let names = |i: usize| -> Vec<Json> {
        out[i]["products"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].clone())
            .collect()
    };
    assert_eq!(names(0), vec![json!("Hammer"), json!("Nail")]);
    assert_eq!(names(1), vec![json!("Saw")]);
    assert!(names(2).is_empty());
}

#[test]
fn test_irregular_foreign_key() {
    let out = run("Category::with('products')->get()", &shop());
    assert_eq!(out[0]["products"].as_array().unwrap().len(), 3);
}

#[test]
fn test_nested_relations_share_parent_fetch() {
    let out = run(
        "Brand::with(['products.supplier', 'products.category'])->get()",
        &shop(),
    );
    let hammer = &out[0]["products"][0];
    assert_eq!(hammer["supplier"]["name"], json!("North"));
    assert_eq!(hammer["category"]["name"], json!("Tools"));
    assert_eq!(out[1]["products"][0]["supplier"], Json::Null);
}

#[test]
fn test_closure_constrains_and_filters_parents() {
    let query = r#"Brand::with(['products' => function ($query) {
        $query->where('price', '>', 10);
    }])->get()"#;
    let out = run(query, &shop());

    let brands: Vec<Json> = out
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].clone())
        .collect();
    assert_eq!(brands, vec![json!("Acme"), json!("Globex")]);
    assert_eq!(out[0]["products"], json!([
        {"id": 1, "name": "Hammer", "price": 12, "brand_id": 1, "supplier_id": 10, "category_id": 7}
    ]));
}

#[test]
fn test_closure_mixed_with_plain_relation() {
    let query = "Brand::with(['products' => function ($q) { $q->where('name', 'like', '%aw%'); }, 'products.supplier'])->get()";
    let out = run(query, &shop());
    assert_eq!(out.as_array().unwrap().len(), 1);
    assert_eq!(out[0]["name"], json!("Globex"));
    assert_eq!(out[0]["products"][0]["supplier"], Json::Null);
}

#[test]
fn test_where_then_with() {
    let out = run(
        "Product::where('price', '>', 10)->with('brand')->get()",
        &shop(),
    );
    let pairs: Vec<(Json, Json)> = out
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["name"].clone(), p["brand"]["name"].clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (json!("Hammer"), json!("Acme")),
            (json!("Saw"), json!("Globex"))
        ]
    );
}

#[test]
fn test_chained_wheres_then_with() {
    let out = run(
        "Product::where('category_id', 7)->where('price', '>', 10)->where('brand_id', 1)->with(['brand', 'supplier'])->get()",
        &shop(),
    );
    let rows = out.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("Hammer"));
    assert_eq!(rows[0]["brand"], json!({"id": 1, "name": "Acme"}));
    assert_eq!(rows[0]["supplier"], json!({"id": 10, "name": "North"}));
}

#[test]
fn test_fuzzy_table_fallback() {
    let data: Dataset = serde_json::from_value(json!({
        "shops": [{"id": 1, "owner_id": 4}],
        "shop_owners": [{"id": 4, "name": "Dana"}]
    }))
    .unwrap();
    let out = run("Shop::with('owner')->get()", &data);
    assert_eq!(out[0]["owner"]["name"], json!("Dana"));
}

#[test]
fn test_naming_heuristic_limitation_is_kept() {
    let resolver = RelationResolver::default();
    assert_eq!(resolver.relation_kind("products", "brand"), RelationKind::BelongsTo);
    assert_eq!(resolver.relation_kind("brands", "products"), RelationKind::HasMany);
    // a singular relation ending in `s` reads as has-many
    assert_eq!(resolver.relation_kind("orders", "status"), RelationKind::HasMany);
}

struct EverythingHasMany;

impl RelationClassifier for EverythingHasMany {
    fn classify(&self, _table_name: &str, _relation_name: &str) -> RelationKind {
        RelationKind::HasMany
    }
}

#[test]
fn test_classifier_is_pluggable() {
    let data: Dataset = serde_json::from_value(json!({
        "teams": [{"id": 1}],
        "staff": [{"id": 5, "team_id": 1}, {"id": 6, "team_id": 1}]
    }))
    .unwrap();

    // `staff` does not end in `s`, so the naming convention reads belongs-to
    let out = run("Team::with('staff')->get()", &data);
    assert_eq!(out[0]["staff"], Json::Null);

    let resolver = RelationResolver::new(&RelationConfig::default()).with_classifier(EverythingHasMany);
    let result = Interpreter::new(resolver).interpret("Team::with('staff')->get()", &data);
    let out = serde_json::to_value(result).unwrap();
    assert_eq!(out[0]["staff"].as_array().unwrap().len(), 2);
}
