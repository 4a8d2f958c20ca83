use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use recallscope_records::FlatComplaint;
use recallscope_symptom_search::SymptomRanker;
use serde_json::Value;

const NARRATIVES: [&str; 4] = [
    "While driving at highway speed the engine stalled and the brake pedal went hard.",
    "Check engine light on, dealer replaced the fuel pump under warrant.",
    "Air bag warning light illuminated; passenger air bag did not deploy in crash.",
    "Transmission slipped between 2nd and 3rd gear, vehicle lost power.",
];

fn create_rows(count: usize) -> Vec<FlatComplaint> {
    (0..count)
        .map(|i| FlatComplaint {
            record_id: format!("{}", 11_000_000 + i),
            year: 2018,
            make: "FORD".to_string(),
            model: "F-150".to_string(),
            date_filed: None,
            state: None,
            crash: i % 7 == 0,
            fire: i % 11 == 0,
            injuries: (i % 3) as u32,
            deaths: u32::from(i % 97 == 0),
            components: "ENGINE".to_string(),
            summary: NARRATIVES[i % NARRATIVES.len()].to_string(),
            raw: Value::Null,
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let ranker = SymptomRanker::default();
    let mut group = c.benchmark_group("rank");

    for row_count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(row_count as u64));
        let rows = create_rows(row_count);

        group.bench_with_input(BenchmarkId::from_parameter(row_count), &rows, |b, rows| {
            b.iter(|| {
                let results = ranker.rank(black_box(rows), black_box("stall brake engine"), 50);
                black_box(results);
            });
        });
    }

    group.finish();
}

fn bench_query_shapes(c: &mut Criterion) {
    let ranker = SymptomRanker::default();
    let rows = create_rows(5_000);
    let mut group = c.benchmark_group("query_shapes");

    group.bench_function("single_term", |b| {
        b.iter(|| black_box(ranker.rank(&rows, black_box("stalled"), 50)));
    });

    group.bench_function("many_terms", |b| {
        b.iter(|| {
            black_box(ranker.rank(
                &rows,
                black_box("air bag warning light crash deploy passenger"),
                50,
            ))
        });
    });

    group.bench_function("termless_fallback", |b| {
        b.iter(|| black_box(ranker.rank(&rows, black_box("?!"), 50)));
    });

    group.finish();
}

criterion_group!(benches, bench_rank, bench_query_shapes);
criterion_main!(benches);
