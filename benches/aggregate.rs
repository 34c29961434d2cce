use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use municlima::{ClimateSample, DailyClimateFrame};

fn samples(days: usize) -> Vec<ClimateSample> {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .iter_days()
        .take(days)
        .enumerate()
        .map(|(i, date)| ClimateSample {
            date,
            precipitation: Some((i % 17) as f64 * 1.3),
            temperature: Some(22.0 + (i % 11) as f64 * 0.5),
        })
        .collect()
}

fn bench_monthly_aggregates(c: &mut Criterion) {
    let six_years = samples(6 * 365);
    c.bench_function("monthly_aggregates", |b| {
        b.iter(|| {
            DailyClimateFrame::from_samples(black_box(&six_years))
                .and_then(|frame| frame.monthly_aggregates())
        })
    });
}

criterion_group!(benches, bench_monthly_aggregates);
criterion_main!(benches);
