// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # Celadon Camera JPEG Library
//!
//! NV21 to JPEG compression for the Celadon virtual camera. Encoding is done
//! by the vendor library `camera.celadon.jpeg.so`, which is opened at runtime
//! rather than linked, so the camera still starts on images that ship
//! without it.
//!
//! ## Features
//!
//! - **Runtime binding**: The vendor library is opened once per process and
//!   shared by every compressor. Its entry points are looked up by name on
//!   each call.
//! - **Graceful degradation**: A missing library or symbol disables only the
//!   operations that need it. Failures are logged through `tracing`.
//! - **Software fallback**: A built-in encoder using libjpeg-turbo exposes the
//!   same entry points for hosts without the vendor library.
//!
//! ## Example
//!
//! ```no_run
//! use celadon_jpeg::{Nv21JpegCompressor, OK};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = std::fs::read("frame.nv21")?;
//! let mut jpeg = Nv21JpegCompressor::new();
//! if jpeg.compress(&frame, 1920, 1080, 90, None) == OK {
//!     if let Some(bytes) = jpeg.compressed_image() {
//!         std::fs::write("frame.jpeg", bytes)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety
//!
//! Calling into the vendor library is inherently `unsafe`. The raw bindings
//! live in `jpeg-stub-sys`; this crate wraps them so only
//! [`Nv21JpegCompressor::get_compressed_image`] and implementing
//! [`SymbolResolver`] need `unsafe` from the caller.

pub mod compressor;
pub mod loader;
pub mod software;

pub use compressor::{nv21_frame_size, Nv21JpegCompressor, Status, BAD_VALUE, OK};
pub use jpeg_stub_sys::{ExifData, JpegStub, JPEG_STUB_LIBRARY_PATH};
pub use loader::{open_attempts, shared_library, SymbolResolver};
pub use software::SoftwareJpegStub;
