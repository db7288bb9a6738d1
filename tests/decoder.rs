//! Decoding and probing integration tests.

mod common;

use gifsplit::{ErrorKind, FrameDecoder, GifProbe, GifSplitError};
use tempfile::tempdir;

use common::{gif_in, garbage_in, square_color};

#[test]
fn frames_decode_in_order_as_rgba() {
    let dir = tempdir().unwrap();
    let path = gif_in(dir.path(), "dance.gif", 3, 5);

    let (metadata, frames) = FrameDecoder::open(&path).unwrap();
    assert_eq!(metadata.frame_count, 3);
    assert!(metadata.frame_count_exact);
    assert_eq!(metadata.frame_delay_ms, 50);
    assert_eq!((metadata.width, metadata.height), (8, 8));

    let frames: Vec<_> = frames.collect::<Result<_, _>>().unwrap();
    assert_eq!(frames.len(), 3);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.index(), i);
        assert_eq!(frame.total(), 3);
        assert_eq!((frame.width(), frame.height()), (8, 8));

        let [r, g, b] = square_color(i);
        assert_eq!(frame.image().get_pixel(3, 3).0, [r, g, b, 255]);
        assert_eq!(frame.image().get_pixel(0, 0).0, [255, 255, 255, 255]);
    }
}

#[test]
fn missing_delay_falls_back_to_100ms() {
    let dir = tempdir().unwrap();
    let path = gif_in(dir.path(), "still.gif", 5, 0);

    let metadata = GifProbe::probe(&path).unwrap();
    assert_eq!(metadata.frame_count, 5);
    assert_eq!(metadata.frame_delay_ms, 100);
}

#[test]
fn single_frame_gif_is_a_sequence_of_one() {
    let dir = tempdir().unwrap();
    let path = gif_in(dir.path(), "one.gif", 1, 10);

    let (metadata, frames) = FrameDecoder::open(&path).unwrap();
    assert_eq!(metadata.frame_count, 1);
    assert_eq!(frames.count(), 1);
}

#[test]
fn frame_cap_limits_reported_count_only() {
    let dir = tempdir().unwrap();
    let path = gif_in(dir.path(), "long.gif", 5, 4);

    let metadata = GifProbe::probe_with_cap(&path, 2).unwrap();
    assert_eq!(metadata.frame_count, 2);
    assert!(!metadata.frame_count_exact);

    let (metadata, frames) = FrameDecoder::open_with_cap(&path, 2).unwrap();
    assert_eq!(metadata.frame_count, 2);
    assert_eq!(frames.declared_total(), 2);
    assert_eq!(frames.filter(Result::is_ok).count(), 5);
}

#[test]
fn cap_equal_to_length_is_exact() {
    let dir = tempdir().unwrap();
    let path = gif_in(dir.path(), "three.gif", 3, 4);

    let metadata = GifProbe::probe_with_cap(&path, 3).unwrap();
    assert_eq!(metadata.frame_count, 3);
    assert!(metadata.frame_count_exact);
}

#[test]
fn non_gif_content_is_a_decode_error() {
    let dir = tempdir().unwrap();
    let path = garbage_in(dir.path(), "fake.gif");

    let err = FrameDecoder::open(&path).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(matches!(err, GifSplitError::Decode { ref path, .. } if path.ends_with("fake.gif")));
}

#[test]
fn png_is_rejected_as_unsupported_container() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("picture.gif");
    image::RgbaImage::new(2, 2)
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();

    let err = GifProbe::probe(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("unsupported container"));
}

#[test]
fn missing_file_is_a_decode_error() {
    let dir = tempdir().unwrap();
    let err = GifProbe::probe(dir.path().join("absent.gif")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn probe_many_keeps_going_past_failures() {
    let dir = tempdir().unwrap();
    let good = gif_in(dir.path(), "good.gif", 2, 4);
    let bad = garbage_in(dir.path(), "bad.gif");

    let results = GifProbe::probe_many(&[good, bad]);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().frame_count, 2);
    assert!(results[1].is_err());
}
