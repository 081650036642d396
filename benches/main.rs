use criterion::{black_box, criterion_group, criterion_main, Criterion};
use micro_a2m::a2m::{Converter, ConverterOptions};
use micro_a2m::stream::StreamRingBuffer;

fn generate_chord(sample_rate: f32, sample_count: usize) -> Vec<f32> {
    // C major triad
    let frequencies = [261.63_f32, 329.63, 392.0];
    (0..sample_count)
        .map(|i| {
            frequencies
                .iter()
                .map(|f| (2.0 * core::f32::consts::PI * f * (i as f32) / sample_rate).sin() / 3.0)
                .sum()
        })
        .collect()
}

fn run_convert_benchmark(id: &str, c: &mut Criterion, block_size: usize, pitch_set: &[u8]) {
    let options = ConverterOptions {
        pitch_set: pitch_set.to_vec(),
        ..ConverterOptions::new(44100, block_size)
    };
    let converter = Converter::from_options(options).unwrap();
    let samples = generate_chord(44100., block_size);
    c.bench_function(id, |b| {
        b.iter(|| converter.convert(black_box(&samples[..])).unwrap())
    });
}

fn convert_benchmarks(c: &mut Criterion) {
    run_convert_benchmark("Convert 256", c, 256, &[]);
    run_convert_benchmark("Convert 512", c, 512, &[]);
    run_convert_benchmark("Convert 1024", c, 1024, &[]);
    run_convert_benchmark("Convert 2048", c, 2048, &[]);
    run_convert_benchmark("Convert 4096", c, 4096, &[]);
    run_convert_benchmark("Convert 441", c, 441, &[]);
    run_convert_benchmark("Convert 8192", c, 8192, &[]);
    run_convert_benchmark("Convert 2048, C major", c, 2048, &[0, 2, 4, 5, 7, 9, 11]);
}

fn run_ring_buffer_benchmark(id: &str, c: &mut Criterion, block_size: usize, chunk_size: usize) {
    let mut buffer = StreamRingBuffer::new(
        |_, block, _| {
            black_box(block);
        },
        2,
        block_size,
    );
    let left = vec![0_i16; chunk_size];
    let right = vec![0_i16; chunk_size];
    c.bench_function(id, |b| {
        b.iter(|| {
            buffer
                .push(black_box(&[&left[..], &right[..]]), chunk_size)
                .unwrap()
        })
    });
}

fn ring_buffer_benchmarks(c: &mut Criterion) {
    run_ring_buffer_benchmark("Push 128 into 512, stereo", c, 512, 128);
    run_ring_buffer_benchmark("Push 441 into 1024, stereo", c, 1024, 441);
}

criterion_group!(benches, convert_benchmarks, ring_buffer_benchmarks);
criterion_main!(benches);
