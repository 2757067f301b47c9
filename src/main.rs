// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use args::Args;
use celadon_jpeg::{nv21_frame_size, Nv21JpegCompressor, OK};
use clap::Parser;
use std::{error::Error, fs, time::Instant};
use tracing::{debug, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

mod args;

fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let default = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    let stdout = tracing_subscriber::fmt::layer().with_target(false);
    let journald = if args.journald {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer),
            Err(e) => {
                eprintln!("journald unavailable: {e}");
                None
            }
        }
    } else {
        None
    };

    tracing_log::LogTracer::init()?;
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(journald);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let (width, height) = args.frame_size()?;
    let frame = fs::read(&args.input)?;
    match nv21_frame_size(width, height) {
        Some(expected) if frame.len() >= expected => {
            if frame.len() > expected {
                warn!(
                    "{} holds {} bytes, using the first {} for a {}x{} frame",
                    args.input.display(),
                    frame.len(),
                    expected,
                    width,
                    height
                );
            }
        }
        _ => {
            return Err(Box::from(format!(
                "{} holds {} bytes, too small for a {}x{} NV21 frame",
                args.input.display(),
                frame.len(),
                width,
                height
            )));
        }
    }

    let mut compressor = if args.software {
        Nv21JpegCompressor::software()
    } else {
        Nv21JpegCompressor::open(&args.library)
    };
    if !compressor.is_loaded() {
        return Err(Box::from(format!(
            "cannot load {} (use --software for the built-in encoder)",
            args.library.display()
        )));
    }

    let now = Instant::now();
    let status = compressor.compress(&frame, width, height, args.quality, None);
    if status != OK {
        return Err(Box::from(format!("compression failed with status {status}")));
    }
    let jpeg = compressor
        .compressed_image()
        .ok_or("compressor produced no image")?;
    let encode_time = now.elapsed();
    debug!("encode: {:?}", encode_time);

    fs::write(&args.output, &jpeg)?;
    info!(
        "saved {} resolution: {}x{} size: {}KB jpeg: {}KB elapsed: {:.2?}",
        args.output.display(),
        width,
        height,
        frame.len() / 1024,
        jpeg.len() / 1024,
        encode_time
    );

    Ok(())
}
