// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! JPEG stub implemented in-process with libjpeg-turbo.
//!
//! Exposes the same five entry points as `camera.celadon.jpeg.so` so a
//! [`Nv21JpegCompressor`](crate::Nv21JpegCompressor) can run on hosts where
//! the vendor library is not installed. EXIF data is accepted but not
//! embedded.

use crate::{
    compressor::{BAD_VALUE, OK},
    loader::SymbolResolver,
};
use jpeg_stub_sys::{
    ExifData, JpegStub, JpegStub_cleanup_fn, JpegStub_compress_fn,
    JpegStub_getCompressedImage_fn, JpegStub_getCompressedSize_fn, JpegStub_init_fn,
    JPEG_STUB_CLEANUP, JPEG_STUB_COMPRESS, JPEG_STUB_GET_COMPRESSED_IMAGE,
    JPEG_STUB_GET_COMPRESSED_SIZE, JPEG_STUB_INIT,
};
use libc::{c_int, c_void, size_t};
use std::{
    io,
    ptr::{copy_nonoverlapping, null_mut, NonNull},
    slice::from_raw_parts,
};
use tracing::{debug, error};
use turbojpeg::{OwnedBuf, Subsamp, YuvImage};

/// Resolver for the built-in libjpeg-turbo encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareJpegStub;

unsafe impl SymbolResolver for SoftwareJpegStub {
    fn resolve(&self, name: &str) -> io::Result<NonNull<c_void>> {
        let addr = match name {
            JPEG_STUB_INIT => init as JpegStub_init_fn as *mut c_void,
            JPEG_STUB_CLEANUP => cleanup as JpegStub_cleanup_fn as *mut c_void,
            JPEG_STUB_COMPRESS => compress as JpegStub_compress_fn as *mut c_void,
            JPEG_STUB_GET_COMPRESSED_SIZE => {
                get_compressed_size as JpegStub_getCompressedSize_fn as *mut c_void
            }
            JPEG_STUB_GET_COMPRESSED_IMAGE => {
                get_compressed_image as JpegStub_getCompressedImage_fn as *mut c_void
            }
            _ => null_mut(),
        };
        NonNull::new(addr).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("undefined symbol: {name}"))
        })
    }
}

#[derive(Default)]
struct Encoder {
    planar: Vec<u8>,
    jpeg: Option<OwnedBuf>,
}

unsafe fn encoder<'a>(stub: *mut JpegStub) -> Option<&'a mut Encoder> {
    stub.as_mut()?.mInternalEncoder.cast::<Encoder>().as_mut()
}

unsafe extern "C" fn init(stub: *mut JpegStub) {
    let Some(stub) = stub.as_mut() else {
        return;
    };
    stub.mInternalEncoder = Box::into_raw(Box::<Encoder>::default()).cast::<c_void>();
    debug!("software JPEG encoder created");
}

unsafe extern "C" fn cleanup(stub: *mut JpegStub) {
    let Some(stub) = stub.as_mut() else {
        return;
    };
    if !stub.mInternalEncoder.is_null() {
        drop(Box::from_raw(stub.mInternalEncoder.cast::<Encoder>()));
        stub.mInternalEncoder = null_mut();
        debug!("software JPEG encoder released");
    }
}

unsafe extern "C" fn compress(
    stub: *mut JpegStub,
    image: *const c_void,
    width: c_int,
    height: c_int,
    quality: c_int,
    _exif: *mut ExifData,
) -> c_int {
    let Some(encoder) = encoder(stub) else {
        error!("software compress called on an uninitialised stub");
        return BAD_VALUE;
    };
    encoder.jpeg = None;

    if image.is_null() || width <= 0 || height <= 0 || width % 2 != 0 || height % 2 != 0 {
        error!("software compress: unsupported {}x{} frame", width, height);
        return BAD_VALUE;
    }
    let (width, height) = (width as usize, height as usize);
    let nv21 = from_raw_parts(image.cast::<u8>(), width * height * 3 / 2);
    nv21_to_i420(nv21, width, height, &mut encoder.planar);

    let yuv = YuvImage {
        pixels: encoder.planar.as_slice(),
        width,
        align: 1,
        height,
        subsamp: Subsamp::Sub2x2,
    };
    match turbojpeg::compress_yuv(yuv, quality) {
        Ok(jpeg) => {
            encoder.jpeg = Some(jpeg);
            OK
        }
        Err(e) => {
            error!("software compress: {e}");
            BAD_VALUE
        }
    }
}

unsafe extern "C" fn get_compressed_size(stub: *mut JpegStub) -> size_t {
    encoder(stub)
        .and_then(|encoder| encoder.jpeg.as_ref())
        .map_or(0, |jpeg| jpeg.len())
}

unsafe extern "C" fn get_compressed_image(stub: *mut JpegStub, buff: *mut c_void) {
    if buff.is_null() {
        return;
    }
    if let Some(jpeg) = encoder(stub).and_then(|encoder| encoder.jpeg.as_ref()) {
        copy_nonoverlapping(jpeg.as_ptr(), buff.cast::<u8>(), jpeg.len());
    }
}

/// Splits the interleaved VU plane of an even sized NV21 frame into the
/// separate U and V planes libjpeg-turbo expects.
fn nv21_to_i420(nv21: &[u8], width: usize, height: usize, planar: &mut Vec<u8>) {
    let luma = width * height;
    let chroma = luma / 4;

    planar.clear();
    planar.resize(luma + 2 * chroma, 0);
    planar[..luma].copy_from_slice(&nv21[..luma]);

    let (u, v) = planar[luma..].split_at_mut(chroma);
    for (i, vu) in nv21[luma..luma + 2 * chroma].chunks_exact(2).enumerate() {
        v[i] = vu[0];
        u[i] = vu[1];
    }
}
