// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use celadon_jpeg::{nv21_frame_size, Nv21JpegCompressor, BAD_VALUE, OK};
use serial_test::serial;
use std::error::Error;

/// Horizontal luma ramp with neutral chroma.
fn gradient(width: i32, height: i32) -> Vec<u8> {
    let mut nv21 = vec![0x80; nv21_frame_size(width, height).unwrap()];
    for (i, y) in nv21[..(width * height) as usize].iter_mut().enumerate() {
        *y = (i % width as usize * 255 / width as usize) as u8;
    }
    nv21
}

#[test]
#[serial]
fn test_encode() -> Result<(), Box<dyn Error>> {
    let mut jpeg = Nv21JpegCompressor::software();
    assert!(jpeg.is_loaded());
    assert_eq!(jpeg.compress(&gradient(640, 480), 640, 480, 90, None), OK);

    let size = jpeg.compressed_size();
    let image = jpeg.compressed_image().expect("no compressed image");
    assert_eq!(image.len(), size);
    assert_eq!(&image[..2], [0xff, 0xd8]);
    assert_eq!(&image[size - 2..], [0xff, 0xd9]);

    let header = turbojpeg::read_header(&image)?;
    assert_eq!(header.width, 640);
    assert_eq!(header.height, 480);
    Ok(())
}

#[test]
#[serial]
fn test_quality_changes_size() {
    let frame = gradient(320, 240);
    let mut jpeg = Nv21JpegCompressor::software();

    assert_eq!(jpeg.compress(&frame, 320, 240, 100, None), OK);
    let high = jpeg.compressed_size();
    assert_eq!(jpeg.compress(&frame, 320, 240, 10, None), OK);
    let low = jpeg.compressed_size();
    assert!(low < high, "quality 10 ({low}) not smaller than quality 100 ({high})");
}

#[test]
#[serial]
fn test_get_compressed_image() {
    let mut jpeg = Nv21JpegCompressor::software();
    assert_eq!(jpeg.compress(&gradient(64, 48), 64, 48, 75, None), OK);

    let mut buf = vec![0u8; jpeg.compressed_size()];
    unsafe { jpeg.get_compressed_image(buf.as_mut_ptr()) };
    assert_eq!(Some(buf), jpeg.compressed_image());
}

#[test]
#[serial]
fn test_odd_dimensions() {
    let mut jpeg = Nv21JpegCompressor::software();
    assert_eq!(jpeg.compress(&gradient(63, 47), 63, 47, 90, None), BAD_VALUE);
    assert_eq!(jpeg.compressed_size(), 0);
    assert_eq!(jpeg.compressed_image(), None);
}

#[test]
#[serial]
fn test_failure_clears_previous_image() {
    let mut jpeg = Nv21JpegCompressor::software();
    assert_eq!(jpeg.compress(&gradient(64, 48), 64, 48, 90, None), OK);
    assert!(jpeg.compressed_size() > 0);
    assert_eq!(jpeg.compress(&gradient(63, 48), 63, 48, 90, None), BAD_VALUE);
    assert_eq!(jpeg.compressed_size(), 0);
}

/// Independent compressors keep independent results.
#[test]
#[serial]
fn test_instances_are_independent() {
    let mut small = Nv21JpegCompressor::software();
    let mut large = Nv21JpegCompressor::software();
    assert_eq!(small.compress(&gradient(64, 48), 64, 48, 90, None), OK);
    assert_eq!(large.compress(&gradient(1280, 720), 1280, 720, 90, None), OK);
    assert!(small.compressed_size() < large.compressed_size());
    drop(large);
    assert!(small.compressed_image().is_some());
}
