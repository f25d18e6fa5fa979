use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::path::PathBuf;
use wisp_processor::constants::WAVELENGTH_COUNT;
use wisp_processor::models::{Dataset, RecordFamily, Sample, Variable};
use wisp_processor::parser::{decode_spectrum, wavelength_axis};
use wisp_processor::quality::assess;
use wisp_processor::schema::{Bounds, FamilySchema};

fn spectrum_cell() -> String {
    let values: Vec<String> = (0..WAVELENGTH_COUNT)
        .map(|i| format!("{:.6}", 0.0125 + i as f64 * 1e-4))
        .collect();
    format!("[{}]", values.join(", "))
}

fn bench_decode_spectrum(c: &mut Criterion) {
    let cell = spectrum_cell();
    c.bench_function("decode_spectrum_551", |b| {
        b.iter(|| decode_spectrum(black_box(&cell), WAVELENGTH_COUNT))
    });
}

fn spectral_dataset(rows: usize) -> Dataset {
    let spectrum = |name: &str| {
        let samples = (0..WAVELENGTH_COUNT * rows)
            .map(|i| Sample::Number((i % 97) as f64 * 0.01 - 0.1))
            .collect();
        Variable::new(name, vec![WAVELENGTH_COUNT, rows], samples)
    };
    let selector = |name: &str| Variable::new(name, vec![rows], vec![Sample::Number(0.0); rows]);

    Dataset {
        family: RecordFamily::Spectral,
        source: PathBuf::from("bench.txt"),
        time: (0..rows as i64).map(|i| 1_622_541_600 + i * 900).collect(),
        wavelength: Some(wavelength_axis()),
        variables: vec![
            spectrum("downirr"),
            spectrum("downrad"),
            spectrum("uprad"),
            spectrum("rsr"),
            selector("ld"),
            selector("lu"),
            selector("ed"),
        ],
    }
}

fn bench_assess(c: &mut Criterion) {
    let mut group = c.benchmark_group("qa_assess");
    let schema = FamilySchema::spectral()
        .with_bounds("rsr", Bounds::new(Some(0.0), Some(0.2)))
        .expect("rsr is a measured variable");

    for rows in [1usize, 96, 384] {
        let dataset = spectral_dataset(rows);
        group.bench_with_input(BenchmarkId::new("spectral", rows), &dataset, |b, ds| {
            b.iter(|| black_box(assess(ds, &schema)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode_spectrum, bench_assess);
criterion_main!(benches);
