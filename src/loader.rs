// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use jpeg_stub_sys::JpegStubLibrary;
use std::{
    collections::HashMap,
    ffi::c_void,
    io,
    path::{Path, PathBuf},
    ptr::NonNull,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};
use tracing::{debug, error};

/// Source of JPEG stub entry points.
///
/// Implemented by the dynamically loaded vendor library and by the built-in
/// software encoder, so the compressor does not care which one it talks to.
///
/// # Safety
///
/// Every address returned for one of the `JpegStub_*` names must point to a
/// function with the matching `jpeg_stub_sys` typedef, and must stay valid for
/// as long as the resolver is alive.
pub unsafe trait SymbolResolver: Send + Sync {
    /// Returns the address of the exported function `name`.
    fn resolve(&self, name: &str) -> io::Result<NonNull<c_void>>;
}

unsafe impl SymbolResolver for JpegStubLibrary {
    fn resolve(&self, name: &str) -> io::Result<NonNull<c_void>> {
        let addr = unsafe { self.get(name) }.map_err(io::Error::other)?;
        NonNull::new(addr).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{name} resolved to null"))
        })
    }
}

struct CachedLibrary {
    library: Option<Arc<dyn SymbolResolver>>,
    // Counts calls into dlopen for this path. Stays at 1 unless the lock
    // around the open is broken.
    opens: usize,
}

fn cache() -> &'static Mutex<HashMap<PathBuf, CachedLibrary>> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, CachedLibrary>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Returns the process-wide handle for the library at `path`, opening it on
/// first use.
///
/// Only one open is ever attempted per path. A failed open is remembered and
/// every later call returns `None` without touching the filesystem again.
/// Opened libraries stay loaded until the process exits. The cache lock is
/// held across the open so concurrent first callers cannot race it.
pub fn shared_library(path: &Path) -> Option<Arc<dyn SymbolResolver>> {
    let mut cache = cache().lock().unwrap_or_else(PoisonError::into_inner);
    let entry = cache
        .entry(path.to_path_buf())
        .or_insert_with(|| CachedLibrary {
            library: open(path),
            opens: 1,
        });
    entry.library.clone()
}

fn open(path: &Path) -> Option<Arc<dyn SymbolResolver>> {
    match unsafe { JpegStubLibrary::new(path) } {
        Ok(lib) => {
            debug!("opened JPEG stub library {}", path.display());
            Some(Arc::new(lib))
        }
        Err(e) => {
            error!("Fatal error: dlopen({}) failed: {e}", path.display());
            None
        }
    }
}

/// Number of times `path` has been passed to dlopen in this process: 0 before
/// first use, 1 afterwards.
pub fn open_attempts(path: &Path) -> usize {
    let cache = cache().lock().unwrap_or_else(PoisonError::into_inner);
    cache.get(path).map_or(0, |entry| entry.opens)
}
