// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Raw bindings for `camera.celadon.jpeg.so`, the vendor NV21 to JPEG
//! encoder used by the Celadon virtual camera.
//!
//! The library is never linked at build time. [`JpegStubLibrary`] opens it
//! with `libloading` and hands out raw symbol addresses which callers cast to
//! the function typedefs below.

#![allow(non_camel_case_types, non_snake_case)]

use libc::{c_int, c_void, size_t};
use libloading::{Library, Symbol};
use std::{ffi::OsStr, ptr::null_mut};

/// Default install location of the vendor encoder on Celadon images.
pub const JPEG_STUB_LIBRARY_PATH: &str = "/system/vendor/lib64/hw/camera.celadon.jpeg.so";

pub const JPEG_STUB_INIT: &str = "JpegStub_init";
pub const JPEG_STUB_CLEANUP: &str = "JpegStub_cleanup";
pub const JPEG_STUB_COMPRESS: &str = "JpegStub_compress";
pub const JPEG_STUB_GET_COMPRESSED_SIZE: &str = "JpegStub_getCompressedSize";
pub const JPEG_STUB_GET_COMPRESSED_IMAGE: &str = "JpegStub_getCompressedImage";

/// Per-encoder state block. Both pointers belong to the library which sets
/// them in `JpegStub_init` and releases them in `JpegStub_cleanup`.
#[repr(C)]
#[derive(Debug)]
pub struct JpegStub {
    pub mInternalEncoder: *mut c_void,
    pub mInternalStream: *mut c_void,
}

impl Default for JpegStub {
    fn default() -> Self {
        Self {
            mInternalEncoder: null_mut(),
            mInternalStream: null_mut(),
        }
    }
}

/// libexif `ExifData`, only ever handled by pointer.
#[repr(C)]
pub struct ExifData {
    _unused: [u8; 0],
}

pub type JpegStub_init_fn = unsafe extern "C" fn(stub: *mut JpegStub);
pub type JpegStub_cleanup_fn = unsafe extern "C" fn(stub: *mut JpegStub);
pub type JpegStub_compress_fn = unsafe extern "C" fn(
    stub: *mut JpegStub,
    image: *const c_void,
    width: c_int,
    height: c_int,
    quality: c_int,
    exifData: *mut ExifData,
) -> c_int;
pub type JpegStub_getCompressedSize_fn = unsafe extern "C" fn(stub: *mut JpegStub) -> size_t;
pub type JpegStub_getCompressedImage_fn =
    unsafe extern "C" fn(stub: *mut JpegStub, buff: *mut c_void);

/// Handle to a loaded JPEG stub library.
pub struct JpegStubLibrary {
    library: Library,
}

impl JpegStubLibrary {
    /// Opens the shared object at `path`.
    ///
    /// # Safety
    ///
    /// Loading a library runs its initialisers. The caller must trust the
    /// library at `path` and any library it pulls in.
    pub unsafe fn new<P: AsRef<OsStr>>(path: P) -> Result<Self, libloading::Error> {
        let library = Library::new(path)?;
        Ok(Self { library })
    }

    /// Looks up the address of an exported symbol.
    ///
    /// # Safety
    ///
    /// The returned address is only valid while this library stays loaded and
    /// must be cast to the matching `*_fn` typedef before it is called.
    pub unsafe fn get(&self, symbol: &str) -> Result<*mut c_void, libloading::Error> {
        let sym: Symbol<*mut c_void> = self.library.get(symbol.as_bytes())?;
        Ok(*sym)
    }
}
