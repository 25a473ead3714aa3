//! Sphere point dump command.
//!
//! Writes one `face x y yaw pitch` line per in-face sample of a geometry.

use crate::{Side, SpherePointsArgs};
use anyhow::{bail, Context, Result};
use std::io::Write;
use sv360_geometry::{Geometry, SpherePoint};

/// Runs the sphere-points command.
pub fn run(args: SpherePointsArgs, verbose: bool) -> Result<()> {
    let cfg = super::load_session(&args.config, &Default::default())?;
    let session = cfg.build()?;
    let geo = match args.side {
        Side::Input => &session.src,
        Side::Output => &session.dst,
    };
    let points = collect(geo, args.comp)?;
    let mut out = super::create_output(&args.output)?;
    write_points(&mut out, &points).with_context(|| format!("Failed to write: {}", args.output.display()))?;
    out.flush()?;
    if verbose {
        println!("Wrote {} points to {}", points.len(), args.output.display());
    }
    Ok(())
}

fn collect(geo: &Geometry, comp: usize) -> Result<Vec<SpherePoint>> {
    if comp >= geo.num_components() {
        bail!("component {comp} out of range for {}", geo.internal_format());
    }
    Ok(geo.sphere_points(comp))
}

/// Writes points as text.
pub fn write_points<W: Write>(out: &mut W, points: &[SpherePoint]) -> std::io::Result<()> {
    for p in points {
        writeln!(out, "{} {} {} {:.6} {:.6}", p.face, p.x, p.y, p.yaw, p.pitch)?;
    }
    Ok(())
}
