// tests/dsl_scenarios.rs
//
// Script runner: declarations, saves and queries sharing one session

use tablesim::dsl::{execute_line, execute_script, DslError, DslOutput, Session};
use tablesim::{QueryResult, Sandbox, Value};

const SCRIPT: &str = r#"
# schema
Schema::create('brands', function (Blueprint $table) {
    $table->id();
    $table->string('name', 50)->unique();
    $table->timestamps();
});

CREATE TABLE audit_logs (id INT, message TEXT);

Schema::create('products', function (Blueprint $table) {
    $table->id();
    $table->foreignId('brand_id');
    $table->string('name');
    $table->decimal('price', 8, 2)->default(0);
});

// data
SAVE brands [{"name": "Acme"}, {"name": "Globex"}]
SAVE products [
    {"brand_id": 1, "name": "Hammer", "price": 12},
    {"brand_id": 2, "name": "Saw", "price": 30}
]

Product::create([
    'brand_id' => 1,
    'name' => 'Nail',
    'price' => 0,5
])

Brand::with('products')->get()
"#;

fn run_script() -> (Session, Vec<DslOutput>) {
    let mut session = Session::new(Sandbox::default());
    let outputs = execute_script(&mut session, SCRIPT).expect("script should run");
    (session, outputs)
}

#[test]
fn test_schema_statements_declare_tables() {
    let (session, outputs) = run_script();

    let names: Vec<&str> = session.tables().table_names().collect();
    assert_eq!(names, vec!["brands", "audit_logs", "products"]);
    assert!(matches!(&outputs[0], DslOutput::Tables(t) if t.columns("brands").is_some()));
}

#[test]
fn test_save_autofills_and_replaces_rows() {
    let (session, _) = run_script();
    let brands = session.dataset().rows("brands");
    assert_eq!(brands.len(), 2);
    assert_eq!(brands[1]["id"], Value::Int(2));
    assert!(!brands[0]["created_at"].is_blank());
}

#[test]
fn test_created_rows_are_appended() {
    let (session, outputs) = run_script();
    let products = session.dataset().rows("products");
    assert_eq!(products.len(), 3);
    assert_eq!(products[2]["id"], Value::Int(3));
    assert_eq!(products[2]["price"], Value::Float(0.5));

    let last = outputs.last().unwrap();
    let DslOutput::Result(QueryResult::Rows(rows)) = last else {
        panic!("expected rows, got {:?}", last);
    };
    let acme_products = match &rows[0]["products"] {
        Value::List(items) => items.len(),
        other => panic!("expected a list, got {:?}", other),
    };
    assert_eq!(acme_products, 2);
}

#[test]
fn test_show_commands() {
    let (mut session, _) = run_script();

    let out = execute_line(&mut session, "SHOW TABLES", 1).unwrap();
    let text = out.to_string();
    assert!(text.contains("brands"));
    assert!(text.contains("products"));

    match execute_line(&mut session, "SHOW products", 1).unwrap() {
        DslOutput::Rows { table, rows } => {
            assert_eq!(table, "products");
            assert_eq!(rows.len(), 3);
        }
        other => panic!("expected rows, got {:?}", other),
    }

    let err = execute_line(&mut session, "SHOW nothing", 4).unwrap_err();
    assert_eq!(err.line(), 4);
}

#[test]
fn test_failed_save_keeps_previous_rows() {
    let (mut session, _) = run_script();
    let err = execute_line(
        &mut session,
        r#"SAVE brands [{"name": "Same"}, {"name": "Same"}]"#,
        9,
    )
    .unwrap_err();

    match err {
        DslError::Validation { line, source } => {
            assert_eq!(line, 9);
            assert_eq!(
                source.messages_for(1),
                ["Value 'Same' in field 'name' must be unique"]
            );
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
    assert_eq!(session.dataset().rows("brands")[0]["name"], Value::from("Acme"));
}

#[test]
fn test_save_requires_declared_table() {
    let mut session = Session::new(Sandbox::default());
    let err = execute_line(&mut session, r#"SAVE ghosts [{"id": 1}]"#, 2).unwrap_err();
    assert!(err.to_string().starts_with("[line 2] Parse error"));
}

#[test]
fn test_unbalanced_statement_is_an_error() {
    let mut session = Session::new(Sandbox::default());
    let err = execute_script(&mut session, "Product::all()\nProduct::create([\n'name' => 'x'\n").unwrap_err();
    assert_eq!(err.line(), 2);
}
