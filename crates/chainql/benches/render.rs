use chainql::{
    ColumnInfo, DbSchema, Predicate, QueryState, RelationKind, TableInfo, Value, ValueStyle,
    render,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// State with `n` selected columns and `n` predicates:
/// SELECT col0, col1, ... FROM t WHERE col0 = $1 AND col1 = $2 ... ORDER BY col0 LIMIT 10
fn build_state(n: usize) -> QueryState {
    QueryState {
        table: "t".to_string(),
        selected_columns: (0..n).map(|i| format!("col{i}")).collect(),
        predicates: (0..n)
            .map(|i| Predicate {
                column: format!("col{i}"),
                value: Value::Int(i as i64),
            })
            .collect(),
        order_by: Some("col0".to_string()),
        limit: Some(10),
        ..Default::default()
    }
}

fn wide_schema(n: usize) -> DbSchema {
    DbSchema {
        schemas: vec!["public".to_string()],
        tables: vec![TableInfo {
            schema: "public".to_string(),
            name: "t".to_string(),
            kind: RelationKind::Table,
            columns: (0..n)
                .map(|i| ColumnInfo::new(format!("col{i}"), "bigint", i as i32 + 1))
                .collect(),
        }],
    }
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/placeholder");

    for n in [1, 5, 10, 50, 100] {
        let state = build_state(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &state, |b, state| {
            b.iter(|| black_box(render(state, ValueStyle::Placeholder)));
        });
    }

    group.finish();
}

fn bench_render_preview(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/literal");

    for n in [1, 5, 10, 50, 100] {
        let state = build_state(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &state, |b, state| {
            b.iter(|| black_box(render(state, ValueStyle::Literal)));
        });
    }

    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/chain");

    for n in [1, 5, 10, 50] {
        let schema = wide_schema(n);
        let columns = (0..n).map(|i| format!("col{i}")).collect::<Vec<_>>().join(", ");

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut q = chainql::query(&schema).from("t").select(&columns);
                for i in 0..n {
                    q = q.eq(&format!("col{i}"), i as i64);
                }
                black_box(q.limit(10).statement().len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_render_preview, bench_chain);
criterion_main!(benches);
