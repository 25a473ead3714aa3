//! Session info command.
//!
//! Prints the resolved input and output geometries: faces, face and packed
//! sizes, layout and frame sizes.

use crate::InfoArgs;
use anyhow::{Context, Result};
use sv360_core::io::frame_size;
use sv360_core::Picture;
use sv360_geometry::Geometry;

use crate::session::Session;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    let cfg = super::load_session(&args.config, &args.overrides)?;
    let session = cfg.build()?;

    if args.yaml {
        let text = serde_yaml::to_string(&[session.src.descriptor(), session.dst.descriptor()])
            .context("Failed to serialize descriptors")?;
        print!("{text}");
        return Ok(());
    }

    print_geometry("Input", &session.src, &session.input, verbose);
    println!();
    print_geometry("Output", &session.dst, &session.output, verbose);
    println!();
    print_internal(&session);
    Ok(())
}

fn print_geometry(title: &str, geo: &Geometry, frame: &Picture, verbose: bool) {
    let desc = geo.descriptor();
    let (pw, ph) = desc.packed_size();
    println!("{title}: {}", desc.kind);
    println!("  Faces:       {}", geo.num_faces());
    println!("  Face size:   {}x{}", desc.face_width, desc.face_height);
    println!("  Packed size: {pw}x{ph}");
    println!("  Layout:      {}", geo.packing());
    println!("  Format:      {} {}-bit", desc.packed_chroma_format, frame.bit_depth());
    if let Some(face) = geo.virtual_face() {
        println!("  Virtual:     face {face}");
    }
    if !desc.rotation.is_identity() {
        let (yaw, pitch, roll) = desc.rotation.degrees();
        println!("  Rotation:    yaw {yaw} pitch {pitch} roll {roll}");
    }
    if desc.guard_band > 0 {
        let border = if desc.guard_band_exterior { "" } else { ", interior only" };
        println!("  Guard band:  {} ({}{border})", desc.guard_band, desc.guard_band_fill);
    }
    if desc.compact {
        println!("  Compact:     yes");
    }
    if verbose {
        println!("  Frame bytes: {}", frame_size(frame, frame.bit_depth()));
        println!("  Padding:     {}", if geo.output_padding_needed() { "yes" } else { "no" });
    }
}

fn print_internal(session: &Session) {
    let interp = session.dst.interp();
    println!("Internal: {} {}-bit", interp.internal_chroma_format, interp.bit_depth);
    println!("  Luma filter:   {}", interp.luma);
    println!("  Chroma filter: {}", interp.chroma);
    println!("  Chroma loc:    {:?}", interp.chroma_location);
    if session.src.is_geo_convert_skipped(&session.dst) {
        println!("  Conversion:    copy");
    }
}
