use criterion::{Criterion, criterion_group, criterion_main};
use screen_emu::{
    DecoderVariant, DisplayConfig, SourceSignalInfo, VideoStandardConstants, build_phase_table,
    build_timing, recompute,
};
use std::hint::black_box;
use std::time::Duration;

fn bench_decoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen_emu");
    let significance_level = 0.05;
    let duration = 5;
    let sample_size = 200;
    group
        .significance_level(significance_level)
        .confidence_level(1.0 - significance_level)
        .measurement_time(Duration::new(duration, 0))
        .sample_size(sample_size);

    let signal = SourceSignalInfo::ntsc();
    let config = DisplayConfig {
        decoder: DecoderVariant::Cxa2025as,
        ..Default::default()
    };
    group.bench_function("recompute_cxa2025as", |b| {
        b.iter(|| recompute(black_box(&config), black_box(&signal)))
    });

    let geometry = build_timing(&VideoStandardConstants::pal());
    let pal = SourceSignalInfo::pal();
    group.bench_function("phase_table_pal", |b| {
        b.iter(|| build_phase_table(black_box(&geometry), black_box(&pal)))
    });
}

criterion_group!(benches, bench_decoder);

criterion_main!(benches);
