mod support;

use mediakit::{BgColor, MakeGifOpts, MediaError, assemble_gif};

#[test]
fn assembles_looping_gif_at_half_size_and_removes_frames() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    std::fs::create_dir_all(&frames).unwrap();
    for i in 0..5 {
        support::write_capture_frame(&frames.join(format!("frame_{i:03}.png")), 40, 22, i);
    }
    let out = dir.path().join("diagram.gif");

    let report = assemble_gif(&MakeGifOpts {
        duration_ms: 80,
        bg: BgColor::rgb(253, 253, 253),
        ..MakeGifOpts::new(&frames, &out)
    })
    .unwrap();

    assert_eq!(report.frames, 5);
    assert_eq!((report.width, report.height), (20, 11));
    assert!(report.size_kb > 0.0);
    assert!(report.frames_removed);

    let gif = support::decode_gif(&out);
    assert_eq!((gif.width, gif.height), (20, 11));
    assert_eq!(gif.delays_cs, vec![8; 5]);
    assert!(gif.frame_sizes.iter().all(|&s| s == (20, 11)));
    assert!(gif.transparent.iter().all(Option::is_none));
    assert!(support::loops_forever(&out));

    assert!(!frames.exists());
}

#[test]
fn transparent_capture_is_flattened_onto_background() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    std::fs::create_dir_all(&frames).unwrap();
    image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 0]))
        .save(frames.join("frame_000.png"))
        .unwrap();
    let out = dir.path().join("bg.gif");

    assemble_gif(&MakeGifOpts {
        bg: BgColor::rgb(10, 200, 30),
        ..MakeGifOpts::new(&frames, &out)
    })
    .unwrap();

    let gif = support::decode_gif(&out);
    assert_eq!(gif.first_pixel, [10, 200, 30]);
    assert_eq!(gif.transparent, vec![None]);
    assert_eq!(gif.delays_cs, vec![14]);
}

#[test]
fn only_frame_files_are_used_and_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    std::fs::create_dir_all(&frames).unwrap();
    support::write_capture_frame(&frames.join("frame_001.png"), 8, 8, 1);
    support::write_capture_frame(&frames.join("frame_000.png"), 8, 8, 0);
    support::write_capture_frame(&frames.join("poster.png"), 8, 8, 0);
    let out = dir.path().join("out.gif");

    let report = assemble_gif(&MakeGifOpts::new(&frames, &out)).unwrap();
    assert_eq!(report.frames, 2);

    // The directory still holds poster.png, so it is left in place.
    assert!(frames.join("poster.png").exists());
    assert!(!frames.join("frame_000.png").exists());
    assert!(!frames.join("frame_001.png").exists());
}

#[test]
fn keep_frames_leaves_sources() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    std::fs::create_dir_all(&frames).unwrap();
    support::write_capture_frame(&frames.join("frame_000.png"), 8, 8, 0);

    let report = assemble_gif(&MakeGifOpts {
        keep_frames: true,
        ..MakeGifOpts::new(&frames, dir.path().join("out.gif"))
    })
    .unwrap();
    assert!(!report.frames_removed);
    assert!(frames.join("frame_000.png").exists());
}

#[test]
fn no_frames_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.gif");
    let err = assemble_gif(&MakeGifOpts::new(dir.path(), &out)).unwrap_err();
    assert!(matches!(err, MediaError::Validation(_)));
    assert!(!out.exists());
}

#[test]
fn mismatched_frame_sizes_fail_and_keep_frames() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    std::fs::create_dir_all(&frames).unwrap();
    support::write_capture_frame(&frames.join("frame_000.png"), 8, 8, 0);
    support::write_capture_frame(&frames.join("frame_001.png"), 10, 8, 1);
    let out = dir.path().join("out.gif");

    assert!(assemble_gif(&MakeGifOpts::new(&frames, &out)).is_err());
    assert!(!out.exists());
    assert!(frames.join("frame_000.png").exists());
    assert!(frames.join("frame_001.png").exists());
}
