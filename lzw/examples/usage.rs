use anyhow::Result;
use wavelzw_lzw::{decoder::Decoder, encoder::Encoder, Options, DEFAULT_CODE_SIZE};

const TEXT: &[u8] = b"TOBEORNOTTOBEORTOBEORNOT#TOBEORNOTTOBEORTOBEORNOT";

fn main() -> Result<()> {
    for code_size in [9, DEFAULT_CODE_SIZE, 16] {
        let mut compressed = vec![];
        Encoder::new(code_size, Options::default())?.encode(TEXT, &mut compressed)?;

        let mut decompressed = vec![];
        Decoder::new(code_size, Options::default())?.decode(&compressed[..], &mut decompressed)?;

        assert_eq!(decompressed, TEXT);
        println!(
            "code size {code_size}: {} bytes -> {} bytes",
            TEXT.len(),
            compressed.len()
        );
    }

    Ok(())
}
