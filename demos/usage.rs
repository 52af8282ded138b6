use wavelzw::{compress, decompress, options::CompressionOptions, Result};

const WIDTH: u32 = 96;
const HEIGHT: u32 = 64;

fn main() -> Result<()> {
    let pixels: Vec<u8> = (0..WIDTH * HEIGHT)
        .map(|i| {
            let (x, y) = (i % WIDTH, i / WIDTH);
            (x * 2 + y + (x ^ y) % 7) as u8
        })
        .collect();

    for level in [0, 4, 16, 64] {
        let options = CompressionOptions::from_loss_level(level);
        let compressed = compress(&pixels, WIDTH, HEIGHT, options)?;
        let restored = decompress(&compressed)?;

        let max_error = pixels
            .iter()
            .zip(&restored)
            .map(|(&a, &b)| a.abs_diff(b))
            .max()
            .unwrap_or(0);
        println!(
            "loss level {level:>2}: {} bytes -> {} bytes, max error {max_error}",
            pixels.len(),
            compressed.file_size()
        );
    }

    Ok(())
}
