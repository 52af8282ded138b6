use std::path::Path;
use std::process::Command;

use image::GrayImage;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_wavelzw").to_string()
}

fn write_gradient(path: &Path, width: u32, height: u32) -> Vec<u8> {
    let image = GrayImage::from_fn(width, height, |x, y| image::Luma([(x * 3 + y * 5) as u8]));
    image.save(path).unwrap();
    image.into_raw()
}

fn read_gray(path: &Path) -> Vec<u8> {
    image::open(path).unwrap().into_luma8().into_raw()
}

#[test]
fn cli_lossless_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.bmp");
    let compressed = dir.path().join("image.wlz");
    let output = dir.path().join("output.bmp");
    let pixels = write_gradient(&input, 50, 30);

    let st = Command::new(bin())
        .args(["compress", "--loss-level", "0"])
        .arg(&input)
        .arg(&compressed)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&compressed).unwrap()[..8], *b"WVLZIMG1");

    let st = Command::new(bin())
        .arg("decompress")
        .arg(&compressed)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(read_gray(&output), pixels);
}

#[test]
fn cli_lossy_roundtrip_keeps_dimensions() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.png");
    let compressed = dir.path().join("image.wlz");
    let output = dir.path().join("output.bmp");
    write_gradient(&input, 70, 45);

    let st = Command::new(bin())
        .arg("compress")
        .arg(&input)
        .arg(&compressed)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .arg("decompress")
        .arg(&compressed)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());

    let decoded = image::open(&output).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (70, 45));
}

#[test]
fn cli_stats() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.bmp");
    let compressed = dir.path().join("image.wlz");
    write_gradient(&input, 32, 32);

    let out = Command::new(bin())
        .args(["compress", "-l", "4", "--stats"])
        .arg(&input)
        .arg(&compressed)
        .output()
        .unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("original size:   1024 bytes"), "{stdout}");
    assert!(stdout.contains("header size:     43 bytes"), "{stdout}");
    assert!(stdout.contains("ratio:"), "{stdout}");
}

#[test]
fn cli_missing_input() {
    let dir = tempdir().unwrap();

    let out = Command::new(bin())
        .arg("compress")
        .arg(dir.path().join("missing.bmp"))
        .arg(dir.path().join("out.wlz"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("error:"));
}

#[test]
fn cli_bad_magic() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("garbage.wlz");
    std::fs::write(&input, b"definitely not a compressed image").unwrap();

    let out = Command::new(bin())
        .arg("decompress")
        .arg(&input)
        .arg(dir.path().join("out.bmp"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid compressed image header"), "{stderr}");
    assert!(!dir.path().join("out.bmp").exists());
}
