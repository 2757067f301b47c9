// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    loader::{shared_library, SymbolResolver},
    software::SoftwareJpegStub,
};
use jpeg_stub_sys::{
    ExifData, JpegStub, JpegStub_cleanup_fn, JpegStub_compress_fn,
    JpegStub_getCompressedImage_fn, JpegStub_getCompressedSize_fn, JpegStub_init_fn,
    JPEG_STUB_CLEANUP, JPEG_STUB_COMPRESS, JPEG_STUB_GET_COMPRESSED_IMAGE,
    JPEG_STUB_GET_COMPRESSED_SIZE, JPEG_STUB_INIT, JPEG_STUB_LIBRARY_PATH,
};
use std::{
    ffi::c_void,
    mem::transmute_copy,
    path::Path,
    ptr::{null_mut, NonNull},
    sync::Arc,
};
use tracing::{debug, error};

/// Android `status_t`.
pub type Status = i32;

/// Success.
pub const OK: Status = 0;

/// Returned when the compressor could not run at all.
pub const BAD_VALUE: Status = -libc::EINVAL;

/// Size in bytes of one NV21 frame: a full resolution luma plane followed by
/// an interleaved VU plane subsampled 2x2.
///
/// Returns `None` for non-positive dimensions or if the size overflows.
pub fn nv21_frame_size(width: i32, height: i32) -> Option<usize> {
    if width <= 0 || height <= 0 {
        return None;
    }
    let (w, h) = (width as usize, height as usize);
    let chroma = w.div_ceil(2).checked_mul(h.div_ceil(2))?.checked_mul(2)?;
    w.checked_mul(h)?.checked_add(chroma)
}

/// Bytes the library may read for a `width` x `height` NV21 frame. Nothing
/// is read for non-positive dimensions.
fn fits_frame(image: &[u8], width: i32, height: i32) -> bool {
    if width <= 0 || height <= 0 {
        return true;
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|luma| luma.checked_mul(3))
        .is_some_and(|len| image.len() >= len / 2)
}

/// NV21 to JPEG compressor backed by a JPEG stub library.
///
/// Each instance owns one [`JpegStub`] which the library initialises on
/// construction and releases on drop. The library itself is shared by every
/// instance in the process (see [`shared_library`]).
///
/// When the library cannot be opened, or a symbol is missing, the affected
/// operations log an error and return a default instead of failing: `compress`
/// returns [`BAD_VALUE`], `compressed_size` returns 0 and
/// `get_compressed_image` does nothing. Use [`is_loaded`] to tell an inert
/// compressor apart from a working one.
///
/// Calls are serialised through `&mut self`; the vendor library makes no
/// thread-safety promises for a single stub.
///
/// # Example
///
/// ```no_run
/// use celadon_jpeg::{Nv21JpegCompressor, OK};
///
/// let (width, height) = (640, 480);
/// let frame = vec![0u8; width * height * 3 / 2];
/// let mut jpeg = Nv21JpegCompressor::new();
/// if jpeg.compress(&frame, width as i32, height as i32, 90, None) == OK {
///     let bytes = jpeg.compressed_image().unwrap_or_default();
///     println!("compressed to {} bytes", bytes.len());
/// }
/// ```
///
/// [`is_loaded`]: Nv21JpegCompressor::is_loaded
pub struct Nv21JpegCompressor {
    resolver: Option<Arc<dyn SymbolResolver>>,
    // Boxed so the address handed to the library never moves.
    stub: Box<JpegStub>,
}

impl Nv21JpegCompressor {
    /// Creates a compressor using the vendor library at its default location.
    pub fn new() -> Self {
        Self::open(JPEG_STUB_LIBRARY_PATH)
    }

    /// Creates a compressor using the library at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::with_resolver(shared_library(path.as_ref()))
    }

    /// Creates a compressor using the built-in libjpeg-turbo encoder.
    pub fn software() -> Self {
        Self::with_resolver(Some(Arc::new(SoftwareJpegStub)))
    }

    /// Creates a compressor over an already resolved symbol source. `None`
    /// produces an inert compressor.
    pub fn with_resolver(resolver: Option<Arc<dyn SymbolResolver>>) -> Self {
        let mut compressor = Self {
            resolver,
            stub: Box::default(),
        };
        if compressor.resolver.is_some() {
            if let Some(init) = compressor.symbol::<JpegStub_init_fn>(JPEG_STUB_INIT, "init") {
                unsafe { init(compressor.stub_ptr()) };
                debug!("JPEG stub initialised");
            }
        } else {
            error!("init: Fatal error: no JPEG stub library available");
        }
        compressor
    }

    /// Whether a library is bound. Individual symbols may still be missing.
    pub fn is_loaded(&self) -> bool {
        self.resolver.is_some()
    }

    /// Compresses one NV21 frame. The result is kept inside the stub until
    /// fetched with [`compressed_image`](Self::compressed_image) or
    /// [`get_compressed_image`](Self::get_compressed_image).
    ///
    /// All arguments reach the library unchanged and its return code is
    /// passed back as is, including for dimensions or qualities the library
    /// will reject. The only check made here is that `image` holds
    /// `width * height * 3 / 2` bytes, the most a library may read for the
    /// given size; a shorter slice returns [`BAD_VALUE`] without calling out.
    pub fn compress(
        &mut self,
        image: &[u8],
        width: i32,
        height: i32,
        quality: i32,
        exif: Option<&mut ExifData>,
    ) -> Status {
        let Some(compress) = self.symbol::<JpegStub_compress_fn>(JPEG_STUB_COMPRESS, "compress")
        else {
            return BAD_VALUE;
        };
        if !fits_frame(image, width, height) {
            error!(
                "compress: {}x{} NV21 frame does not fit in {} bytes",
                width,
                height,
                image.len()
            );
            return BAD_VALUE;
        }
        let exif = exif.map_or(null_mut(), |e| e as *mut ExifData);
        unsafe {
            compress(
                self.stub_ptr(),
                image.as_ptr().cast::<c_void>(),
                width,
                height,
                quality,
                exif,
            ) as Status
        }
    }

    /// Size in bytes of the last compressed image, 0 if unavailable.
    pub fn compressed_size(&mut self) -> usize {
        match self.symbol::<JpegStub_getCompressedSize_fn>(
            JPEG_STUB_GET_COMPRESSED_SIZE,
            "compressed_size",
        ) {
            Some(size) => unsafe { size(self.stub_ptr()) },
            None => 0,
        }
    }

    /// Copies the last compressed image into `buffer`.
    ///
    /// The library does the write; the compressor never reads or writes
    /// `buffer` itself. Does nothing if the symbol cannot be resolved.
    ///
    /// # Safety
    ///
    /// `buffer` must be valid for writes of at least
    /// [`compressed_size`](Self::compressed_size) bytes.
    pub unsafe fn get_compressed_image(&mut self, buffer: *mut u8) {
        if let Some(get) = self.symbol::<JpegStub_getCompressedImage_fn>(
            JPEG_STUB_GET_COMPRESSED_IMAGE,
            "get_compressed_image",
        ) {
            get(self.stub_ptr(), buffer.cast::<c_void>());
        }
    }

    /// Returns a copy of the last compressed image, or `None` when there is
    /// nothing to fetch.
    pub fn compressed_image(&mut self) -> Option<Vec<u8>> {
        let size = self.compressed_size();
        if size == 0 {
            return None;
        }
        let get = self.symbol::<JpegStub_getCompressedImage_fn>(
            JPEG_STUB_GET_COMPRESSED_IMAGE,
            "compressed_image",
        )?;
        let mut jpeg = vec![0u8; size];
        unsafe { get(self.stub_ptr(), jpeg.as_mut_ptr().cast::<c_void>()) };
        Some(jpeg)
    }

    fn stub_ptr(&mut self) -> *mut JpegStub {
        &mut *self.stub
    }

    /// Resolves `name` and casts it to the function type `F`.
    fn symbol<F: Copy>(&self, name: &str, caller: &str) -> Option<F> {
        let Some(resolver) = &self.resolver else {
            error!("{caller}: Fatal error: getSymbol({name}) failed: no library loaded");
            return None;
        };
        match resolver.resolve(name) {
            Ok(addr) => Some(unsafe { cast::<F>(addr) }),
            Err(e) => {
                error!("{caller}: Fatal error: getSymbol({name}) failed: {e}");
                None
            }
        }
    }
}

impl Default for Nv21JpegCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Nv21JpegCompressor {
    fn drop(&mut self) {
        if let Some(cleanup) = self.symbol::<JpegStub_cleanup_fn>(JPEG_STUB_CLEANUP, "drop") {
            unsafe { cleanup(self.stub_ptr()) };
            debug!("JPEG stub cleaned up");
        }
    }
}

/// # Safety
///
/// `F` must be a function pointer type matching the ABI of the code at
/// `addr`.
unsafe fn cast<F: Copy>(addr: NonNull<c_void>) -> F {
    debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<*mut c_void>());
    transmute_copy(&addr.as_ptr())
}
