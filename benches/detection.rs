use criterion::{Criterion, black_box, criterion_group, criterion_main};

use csv_anomaly::detect::detect;
use csv_anomaly::extract::{ExtractedColumn, extract_column};
use csv_anomaly::reader::{BatchReader, ReadOptions};
use csv_anomaly::types::{DataType, Field, Schema};

// Deterministic LCG so runs are comparable.
fn next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

fn synthetic_column(rows: usize) -> ExtractedColumn {
    let mut state = 0x853c49e6748fea9bu64;
    let values = (0..rows).map(|i| {
        let r = next(&mut state);
        if r % 97 == 0 {
            return None;
        }
        let noise = (r >> 40) as f64 / (1u64 << 24) as f64;
        let spike = if i % 1000 == 500 { 500.0 } else { 0.0 };
        Some(100.0 + noise + spike)
    });
    ExtractedColumn::from_values("bench", values)
}

fn synthetic_csv(rows: usize) -> String {
    let mut state = 0x9e3779b97f4a7c15u64;
    let mut out = String::with_capacity(rows * 8);
    out.push_str("reading\n");
    for i in 0..rows {
        let r = next(&mut state);
        if r % 97 == 0 {
            out.push_str("NULL\n");
        } else {
            let spike = if i % 1000 == 500 { 500.0 } else { 0.0 };
            out.push_str(&format!("{:.3}\n", 100.0 + (r % 1000) as f64 / 100.0 + spike));
        }
    }
    out
}

fn bench_detect(c: &mut Criterion) {
    for rows in [1_000usize, 100_000] {
        let col = synthetic_column(rows);
        c.bench_function(&format!("detect/{rows}_rows"), |b| {
            b.iter(|| detect(black_box(&col), black_box(3.0)).unwrap());
        });
    }
}

fn bench_extract(c: &mut Criterion) {
    let csv = synthetic_csv(100_000);
    let schema = Schema::new(vec![Field::new("reading", DataType::Float64)]);
    c.bench_function("extract/100000_rows", |b| {
        b.iter(|| {
            let mut rdr = BatchReader::new(
                black_box(csv.as_bytes()),
                schema.clone(),
                ReadOptions::default(),
            );
            extract_column(&mut rdr, "reading").unwrap()
        });
    });
}

criterion_group!(benches, bench_detect, bench_extract);
criterion_main!(benches);
