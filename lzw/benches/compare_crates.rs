use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{prelude::StdRng, RngCore, SeedableRng};
use std::io::Write;
use wavelzw_lzw::{decoder::Decoder, encoder::Encoder, Options};

// The other crates are GIF flavored: 8 bit minimum code size, 12 bit maximum.
const CODE_SIZE: u8 = 12;

pub fn encoding_text(c: &mut Criterion) {
    let data = prepare_text_data();

    encoding_bench(c, "encoding text", &data);
}

pub fn encoding_random_data(c: &mut Criterion) {
    let data = prepare_random_data();

    encoding_bench(c, "encoding random data", &data);
}

pub fn encoding_image_data(c: &mut Criterion) {
    let data = prepare_image_data();

    encoding_bench(c, "encoding image data", &data);
}

fn encoding_bench(c: &mut Criterion, name: &str, data: &[u8]) {
    let mut group = c.benchmark_group(name);
    group.bench_function("lzw", |b| {
        b.iter(|| {
            let mut encoder =
                lzw::Encoder::new(lzw::LsbWriter::new(std::io::sink()), black_box(8)).unwrap();
            encoder.encode_bytes(data).unwrap();
        })
    });
    group.bench_function("weezl", |b| {
        b.iter(|| {
            let mut encoder = weezl::encode::Encoder::new(weezl::BitOrder::Lsb, black_box(8));
            let mut stream_encoder = encoder.into_stream(std::io::sink());
            stream_encoder.encode(data).status.unwrap();
        })
    });
    group.bench_function("wavelzw", |b| {
        let mut encoder = Encoder::new(CODE_SIZE, Options::default()).unwrap();
        b.iter(|| {
            encoder.encode(data, std::io::sink()).unwrap();
        })
    });
}

pub fn decoding_text(c: &mut Criterion) {
    let data = prepare_text_data();

    decoding_bench(c, "decoding text", &data, || std::io::sink());
}

pub fn decoding_random_data(c: &mut Criterion) {
    let data = prepare_random_data();

    decoding_bench(c, "decoding random data", &data, || std::io::sink());
}

pub fn decoding_image_data(c: &mut Criterion) {
    let data = prepare_image_data();

    decoding_bench(c, "decoding image data", &data, || std::io::sink());
}

pub fn decoding_image_to_vec(c: &mut Criterion) {
    let data = prepare_image_data();

    decoding_bench(c, "decoding image to vec", &data, || vec![]);
}

/// Each crate decodes its own encoding of `data`.
fn decoding_bench<F, W>(c: &mut Criterion, name: &str, data: &[u8], into: F)
where
    F: 'static + FnOnce() -> W + Copy,
    W: Write,
{
    let weezl_encoded = weezl::encode::Encoder::new(weezl::BitOrder::Lsb, 8)
        .encode(data)
        .unwrap();
    let wavelzw_encoded = Encoder::new(CODE_SIZE, Options::default())
        .unwrap()
        .encode_to_vec(data)
        .unwrap();

    let mut group = c.benchmark_group(name);
    group.bench_function("weezl", |b| {
        b.iter(|| {
            let mut decoder = weezl::decode::Decoder::new(weezl::BitOrder::Lsb, black_box(8));
            decoder
                .into_stream(into())
                .decode(&weezl_encoded[..])
                .status
                .unwrap();
        })
    });
    group.bench_function("wavelzw", |b| {
        let mut decoder = Decoder::new(CODE_SIZE, Options::default()).unwrap();
        b.iter(|| {
            decoder.decode(&wavelzw_encoded[..], into()).unwrap();
        })
    });
}

fn prepare_text_data() -> Vec<u8> {
    const SENTENCE: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";

    SENTENCE.iter().copied().cycle().take(1 << 18).collect()
}

fn prepare_random_data() -> Vec<u8> {
    let mut rand = StdRng::seed_from_u64(42);
    let mut data: Vec<u8> = vec![0; 1 << 20];
    rand.fill_bytes(&mut data[..]);

    data
}

/// A smooth 1024x1024 grayscale pattern with some noise, close to what quantized
/// image tiles look like.
fn prepare_image_data() -> Vec<u8> {
    let mut rand = StdRng::seed_from_u64(7);
    (0..1024u32 * 1024)
        .map(|i| {
            let (x, y) = (i % 1024, i / 1024);
            let noise = rand.next_u32() % 4;
            ((x / 8 + y / 16 + noise) % 256) as u8
        })
        .collect()
}

criterion_group!(
    benches,
    encoding_text,
    encoding_random_data,
    encoding_image_data,
    decoding_text,
    decoding_random_data,
    decoding_image_data,
    decoding_image_to_vec,
);
criterion_main!(benches);
