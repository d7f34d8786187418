// Query interpreter benchmarks over a generated shop dataset

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tablesim::{parse_schema, process, Dataset, Interpreter, Row, Value};

fn row(pairs: Vec<(&str, Value)>) -> Row {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn shop(products: usize) -> Dataset {
    let brands: Vec<Row> = (1..=20)
        .map(|i| row(vec![("id", Value::Int(i)), ("name", Value::from(format!("Brand{}", i)))]))
        .collect();
    let items: Vec<Row> = (1..=products as i64)
        .map(|i| {
            row(vec![
                ("id", Value::Int(i)),
                ("name", Value::from(format!("Product{}", i))),
                ("price", Value::Float((i % 100) as f64 + 0.5)),
                ("brand_id", Value::Int(i % 20 + 1)),
            ])
        })
        .collect();
    [("brands".to_string(), brands), ("products".to_string(), items)]
        .into_iter()
        .collect()
}

fn where_benchmark(c: &mut Criterion) {
    let interpreter = Interpreter::default();
    let mut group = c.benchmark_group("where_get");

    for size in [100, 1000, 10000].iter() {
        let data = shop(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |bench, data| {
            bench.iter(|| interpreter.interpret(black_box("Product::where('price', '>', 50)->get()"), data));
        });
    }
    group.finish();
}

fn like_benchmark(c: &mut Criterion) {
    let interpreter = Interpreter::default();
    let data = shop(1000);
    c.bench_function("where_like_1000", |bench| {
        bench.iter(|| interpreter.interpret(black_box("Product::where('name', 'like', '%uct9%')->get()"), &data));
    });
}

fn relation_benchmark(c: &mut Criterion) {
    let interpreter = Interpreter::default();
    let mut group = c.benchmark_group("with_relations");

    for size in [100, 1000].iter() {
        let data = shop(*size);
        group.bench_with_input(BenchmarkId::new("belongs_to", size), &data, |bench, data| {
            bench.iter(|| interpreter.interpret(black_box("Product::with('brand')->get()"), data));
        });
        group.bench_with_input(BenchmarkId::new("has_many_closure", size), &data, |bench, data| {
            bench.iter(|| {
                interpreter.interpret(
                    black_box("Brand::with(['products' => function ($q) { $q->where('price', '>', 90); }])->get()"),
                    data,
                )
            });
        });
    }
    group.finish();
}

fn autofill_benchmark(c: &mut Criterion) {
    let tables = parse_schema(
        "Schema::create('products', function (Blueprint $table) {\n$table->id();\n$table->string('name', 50)->unique();\n$table->decimal('price', 8, 2)->default(0);\n$table->timestamps();\n});",
    );
    let columns = tables.columns("products").unwrap_or_default().to_vec();
    let rows: Vec<Row> = (0..1000)
        .map(|i| row(vec![("name", Value::from(format!("Item{}", i)))]))
        .collect();

    c.bench_function("autofill_1000_rows", |bench| {
        bench.iter(|| process(black_box(&rows), &columns));
    });
}

criterion_group!(
    benches,
    where_benchmark,
    like_benchmark,
    relation_benchmark,
    autofill_benchmark
);
criterion_main!(benches);
