use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{prelude::StdRng, RngCore, SeedableRng};
use wavelzw_lzw::{decoder::Decoder, encoder::Encoder, Options};

const FIXED: Options = Options {
    dynamic_code_size: false,
    flush_full_dictionary: true,
};

fn encoded(data: &[u8], code_size: u8, options: Options) -> Vec<u8> {
    Encoder::new(code_size, options)
        .and_then(|mut encoder| encoder.encode_to_vec(data))
        .expect("Couldn't compress")
}

fn bench_text(c: &mut Criterion) {
    let data = prepare_text_data();

    bench(c, "ASCII data", data.as_slice());
}

fn bench_image(c: &mut Criterion) {
    let data = prepare_image_data();

    bench(c, "Image data", data.as_slice());
}

fn bench_random(c: &mut Criterion) {
    let data = prepare_random_data();

    bench(c, "Random data", data.as_slice());
}

fn bench(c: &mut Criterion, name: &str, data: &[u8]) {
    for code_size in [12, 16] {
        encoding(c, name, data, code_size, Options::default(), "dynamic");
        decoding(c, name, data, code_size, Options::default(), "dynamic");
    }
    encoding(c, name, data, 12, FIXED, "fixed");
    decoding(c, name, data, 12, FIXED, "fixed");
}

fn encoding(
    c: &mut Criterion,
    name: &str,
    data: &[u8],
    code_size: u8,
    options: Options,
    label: &str,
) {
    let mut group = c.benchmark_group("Throughput");

    let mut encoder = Encoder::new(code_size, options).expect("Error");
    let mut output = Vec::with_capacity(data.len());

    let id = BenchmarkId::new(name, format!("Encode {label} {code_size} bits"));
    group.throughput(criterion::Throughput::Bytes(data.len() as u64));
    group.bench_with_input(id, data, |b, data| {
        b.iter(|| {
            output.clear();
            encoder.encode(black_box(data), &mut output)
        })
    });
    group.finish();
}

fn decoding(
    c: &mut Criterion,
    name: &str,
    data: &[u8],
    code_size: u8,
    options: Options,
    label: &str,
) {
    let mut group = c.benchmark_group("Throughput");

    let encoded = encoded(data, code_size, options);
    let mut decoder = Decoder::new(code_size, options).expect("Error");
    let mut output = Vec::with_capacity(data.len());

    let id = BenchmarkId::new(name, format!("Decode {label} {code_size} bits"));
    group.throughput(criterion::Throughput::Bytes(data.len() as u64));
    group.bench_with_input(id, &encoded[..], |b, encoded| {
        b.iter(|| {
            output.clear();
            decoder.decode(black_box(encoded), &mut output)
        })
    });
    group.finish();
}

fn prepare_text_data() -> Vec<u8> {
    const SENTENCE: &[u8] = b"The quick brown fox jumps over the lazy dog. ";

    SENTENCE.iter().copied().cycle().take(1 << 18).collect()
}

fn prepare_image_data() -> Vec<u8> {
    (0..512u32 * 512)
        .map(|i| {
            let (x, y) = (i % 512, i / 512);
            ((x ^ y) / 4 + (x + y) / 8) as u8
        })
        .collect()
}

fn prepare_random_data() -> Vec<u8> {
    let mut rand = StdRng::seed_from_u64(42);
    let mut data: Vec<u8> = vec![0; 1 << 20];
    rand.fill_bytes(&mut data[..]);

    data
}

criterion_group!(benches, bench_text, bench_image, bench_random);

criterion_main!(benches);
