// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use jpeg_stub_sys::JPEG_STUB_LIBRARY_PATH;
use std::path::PathBuf;

/// Command-line arguments for the Celadon JPEG compressor.
///
/// Compresses a single raw NV21 frame read from disk. Every option can also
/// be given through the environment.
///
/// # Example
///
/// ```bash
/// # Via command line
/// celadon-jpeg --input frame.nv21 --size 1920 1080 --output frame.jpeg
///
/// # Via environment variables, using the built-in encoder
/// export SOFTWARE_JPEG=true
/// export JPEG_QUALITY=75
/// celadon-jpeg -i frame.nv21 -o frame.jpeg
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Raw NV21 input frame
    #[arg(short, long, env = "INPUT")]
    pub input: PathBuf,

    /// JPEG output file
    #[arg(short, long, env = "OUTPUT")]
    pub output: PathBuf,

    /// Frame resolution in pixels (width height)
    #[arg(
        short,
        long,
        env = "IMAGE_SIZE",
        default_value = "1920 1080",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub size: Vec<i32>,

    /// JPEG quality factor
    #[arg(
        short,
        long,
        env = "JPEG_QUALITY",
        default_value = "90",
        value_parser = clap::value_parser!(i32).range(0..=100)
    )]
    pub quality: i32,

    /// Path to the vendor JPEG stub library
    #[arg(long, env = "JPEG_LIBRARY", default_value = JPEG_STUB_LIBRARY_PATH)]
    pub library: PathBuf,

    /// Use the built-in libjpeg-turbo encoder instead of the vendor library
    #[arg(long, env = "SOFTWARE_JPEG")]
    pub software: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also send logs to the systemd journal
    #[arg(long, env = "JOURNALD")]
    pub journald: bool,
}

impl Args {
    /// Frame width and height from `--size`.
    pub fn frame_size(&self) -> Result<(i32, i32), String> {
        match self.size[..] {
            [width, height] => Ok((width, height)),
            _ => Err(format!("expected width and height, got {:?}", self.size)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults() {
        let args = Args::try_parse_from(["celadon-jpeg", "-i", "in.nv21", "-o", "out.jpeg"])
            .expect("minimal arguments should parse");
        assert_eq!(args.frame_size(), Ok((1920, 1080)));
        assert_eq!(args.quality, 90);
        assert_eq!(args.library, PathBuf::from(JPEG_STUB_LIBRARY_PATH));
        assert!(!args.software);
    }

    #[test]
    #[serial]
    fn size_and_quality() {
        let args = Args::try_parse_from([
            "celadon-jpeg", "-i", "a", "-o", "b", "--size", "640", "480", "-q", "50",
        ])
        .expect("arguments should parse");
        assert_eq!(args.size, vec![640, 480]);
        assert_eq!(args.quality, 50);
    }

    #[test]
    #[serial]
    fn quality_out_of_range() {
        let res = Args::try_parse_from(["celadon-jpeg", "-i", "a", "-o", "b", "-q", "101"]);
        assert!(res.is_err());
    }

    #[test]
    #[serial]
    fn size_from_env() {
        std::env::set_var("IMAGE_SIZE", "640 480");
        let args = Args::try_parse_from(["celadon-jpeg", "-i", "a", "-o", "b"]);
        std::env::remove_var("IMAGE_SIZE");
        assert_eq!(args.expect("IMAGE_SIZE should parse").frame_size(), Ok((640, 480)));
    }

    #[test]
    #[serial]
    fn size_from_env_single_value() {
        std::env::set_var("IMAGE_SIZE", "640");
        let args = Args::try_parse_from(["celadon-jpeg", "-i", "a", "-o", "b"]);
        std::env::remove_var("IMAGE_SIZE");
        if let Ok(args) = args {
            assert!(args.frame_size().is_err());
        }
    }

    #[test]
    #[serial]
    fn frame_size_wrong_count() {
        let mut args = Args::try_parse_from(["celadon-jpeg", "-i", "a", "-o", "b"])
            .expect("minimal arguments should parse");
        args.size = vec![640];
        assert!(args.frame_size().is_err());
        args.size = vec![640, 480, 3];
        assert!(args.frame_size().is_err());
    }
}
