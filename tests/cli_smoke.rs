use std::{
    path::{Path, PathBuf},
    process::Command,
};

use image::{Rgba, RgbaImage};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_mediakit")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "mediakit.exe"
            } else {
                "mediakit"
            });
            p
        })
}

fn write_frames(dir: &Path, n: u32) {
    std::fs::create_dir_all(dir).unwrap();
    for i in 0..n {
        let img = RgbaImage::from_pixel(8, 6, Rgba([(i * 40) as u8, 10, 200, 255]));
        img.save(dir.join(format!("frame_{i:03}.png"))).unwrap();
    }
}

#[test]
fn make_gif_missing_args_fails_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    write_frames(&frames, 2);

    let status = Command::new(exe())
        .arg("make-gif")
        .arg(&frames)
        .arg(dir.path().join("out.gif"))
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(!dir.path().join("out.gif").exists());
    assert_eq!(std::fs::read_dir(&frames).unwrap().count(), 2);
}

#[test]
fn make_gif_bad_background_fails() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    write_frames(&frames, 1);

    let status = Command::new(exe())
        .args(["make-gif"])
        .arg(&frames)
        .arg(dir.path().join("out.gif"))
        .args(["100", "255,255"])
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(frames.join("frame_000.png").exists());
}

#[test]
fn make_gif_writes_gif_and_cleans_frames() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    let out = dir.path().join("out").join("anim.gif");
    write_frames(&frames, 3);

    let status = Command::new(exe())
        .args(["--log-level", "warn", "make-gif"])
        .arg(&frames)
        .arg(&out)
        .args(["120", "255,255,255"])
        .status()
        .unwrap();

    assert!(status.success());
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"GIF89a"));
    assert!(!frames.exists());
}

#[test]
fn png_to_gif_empty_dir_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let status = Command::new(exe())
        .arg("png-to-gif")
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn webp_to_gif_broken_input_exits_one_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.webp");
    std::fs::write(&input, b"RIFF\x10\x00\x00\x00WEBPVP8 garbage").unwrap();
    let out = dir.path().join("out.gif");

    let status = Command::new(exe())
        .arg("webp-to-gif")
        .arg(&input)
        .arg(&out)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(!out.exists());
    assert!(!dir.path().join("out.gif.part").exists());
}

#[test]
fn webp_to_gif_missing_input_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.gif");

    let status = Command::new(exe())
        .arg("webp-to-gif")
        .arg(dir.path().join("nope.webp"))
        .arg(&out)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(!out.exists());
}

#[test]
fn capture_frames_missing_args_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    std::fs::write(&page, "<html></html>").unwrap();
    let frames = dir.path().join("frames");

    let status = Command::new(exe())
        .arg("capture-frames")
        .arg(&page)
        .arg(&frames)
        .args(["800", "600"])
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(!frames.exists());
}

#[test]
fn capture_static_missing_args_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    std::fs::write(&page, "<html></html>").unwrap();
    let out = dir.path().join("stills").join("page.png");

    let status = Command::new(exe())
        .arg("capture-static")
        .arg(&page)
        .arg(&out)
        .arg("800")
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(!dir.path().join("stills").exists());
}
