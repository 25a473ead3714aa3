//! Projection conversion command.
//!
//! Per frame: read the packed input, unpack it into the source faces, resample
//! into the output faces and pack them into the output frame.

use crate::session::Session;
use crate::ConvertArgs;
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::time::Instant;
use sv360_core::io::{read_frame, skip_frames, write_frame};
use tracing::{debug, info};

/// Runs the convert command.
pub fn run(args: ConvertArgs, verbose: bool) -> Result<()> {
    let cfg = super::load_session(&args.config, &args.overrides)?;
    let mut session = cfg.build()?;
    let frames = args.frames.or(cfg.frames);
    let skip = args.skip.unwrap_or(cfg.skip);

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        from = %cfg.input.projection,
        to = %cfg.output.projection,
        "converting"
    );

    let mut reader = super::open_input(&args.input)?;
    let mut writer = super::create_output(&args.output)?;
    skip_frames(&mut reader, &session.input, cfg.input.bit_depth, skip)
        .with_context(|| format!("Failed to skip {skip} frames"))?;

    let start = Instant::now();
    let opts = FrameOptions {
        frames,
        inverse: args.inverse,
        input_bit_depth: cfg.input.bit_depth,
        output_bit_depth: cfg.output.bit_depth,
    };
    let done = convert_sequence(&mut session, &mut reader, &mut writer, &opts)?;
    writer.flush().context("Failed to flush output")?;

    let secs = start.elapsed().as_secs_f64();
    info!(frames = done, seconds = secs, "done");
    if verbose {
        let (w, h) = (session.output.width(), session.output.height());
        println!("Converted {done} frames to {w}x{h} in {secs:.2}s");
    }
    Ok(())
}

/// Loop settings of [`convert_sequence`].
#[derive(Debug, Clone, Copy)]
pub struct FrameOptions {
    /// Frames to convert, until the input ends when `None`.
    pub frames: Option<usize>,
    /// Undo the input's rotation instead of applying the output's.
    pub inverse: bool,
    /// Bit depth of the input file.
    pub input_bit_depth: u8,
    /// Bit depth of the output file.
    pub output_bit_depth: u8,
}

/// Converts frames from `reader` to `writer`, returning the frame count.
pub fn convert_sequence<R: Read, W: Write>(
    session: &mut Session,
    reader: &mut R,
    writer: &mut W,
    opts: &FrameOptions,
) -> Result<usize> {
    let mut done = 0;
    while opts.frames.is_none_or(|n| done < n) {
        if !read_frame(reader, &mut session.input, opts.input_bit_depth)
            .with_context(|| format!("Failed to read frame {done}"))?
        {
            break;
        }
        session.src.convert_yuv(&session.input)?;
        if opts.inverse {
            session.src.geo_convert_inverse(&mut session.dst)?;
        } else {
            session.src.geo_convert(&mut session.dst)?;
        }
        session.dst.frame_pack(&mut session.output)?;
        write_frame(writer, &session.output, opts.output_bit_depth)
            .with_context(|| format!("Failed to write frame {done}"))?;
        debug!(frame = done, "converted");
        done += 1;
    }
    Ok(done)
}
