use biblio_core::{compile, SearchRequest};
use criterion::{criterion_group, criterion_main, Criterion};
use std::collections::HashMap;

fn bench_compile(c: &mut Criterion) {
    let params: HashMap<String, String> = [
        ("query", "\"cien años\""),
        ("optionalQuery", "garcía márquez"),
        ("searchTypeValue", "and"),
        ("publisher", "Sudamericana"),
        ("startDate", "1960"),
        ("endDate", "31/12/1975"),
        ("sortBy", "title"),
        ("page", "3"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    c.bench_function("compile_full_request", |b| {
        b.iter(|| compile(&SearchRequest::from_params(&params).unwrap()))
    });
    let compiled = compile(&SearchRequest::from_params(&params).unwrap());
    c.bench_function("render_result_pipeline", |b| b.iter(|| compiled.results.to_documents()));
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
