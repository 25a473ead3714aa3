//! CLI command implementations

pub mod convert;
pub mod info;
pub mod metric;
pub mod sphere_points;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use sv360_math::SphereRotation;

use crate::session::SessionConfig;
use crate::OutputOverrides;

/// Loads a session file and applies command-line overrides.
pub fn load_session(path: &Path, overrides: &OutputOverrides) -> Result<SessionConfig> {
    let mut cfg = SessionConfig::load(path)?;
    apply_overrides(&mut cfg, overrides);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut SessionConfig, o: &OutputOverrides) {
    let out = &mut cfg.output;
    if let Some(kind) = o.projection {
        out.projection = kind;
        // a new projection does not inherit the old layout
        out.packing = None;
    }
    if let Some(size) = o.face_size {
        out.face_width = Some(size);
        out.face_height = Some(size);
    }
    if let Some(packing) = &o.packing {
        out.packing = Some(packing.clone());
    }
    if o.yaw.is_some() || o.pitch.is_some() || o.roll.is_some() {
        let (yaw, pitch, roll) = out.rotation.degrees();
        out.rotation = SphereRotation::from_degrees(
            o.yaw.unwrap_or(yaw),
            o.pitch.unwrap_or(pitch),
            o.roll.unwrap_or(roll),
        );
    }
    if let Some(band) = o.guard_band {
        out.guard_band = band;
    }
    if let Some(fill) = o.guard_band_fill {
        out.guard_band_fill = fill;
    }
}

/// Opens a file for buffered reading.
pub fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Creates a file for buffered writing.
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create: {}", path.display()))?;
    Ok(BufWriter::new(file))
}
