//! Quality metric command.
//!
//! The reference sequence is read with the session's input geometry and the
//! test sequence with its output geometry. PSNR and WS-PSNR compare packed
//! frames directly and need matching frame sizes; S-PSNR compares on the
//! sphere and works across projections.

use crate::session::Session;
use crate::{MetricArgs, MetricKind};
use anyhow::{bail, Context, Result};
use std::io::Read;
use sv360_core::io::read_frame;
use sv360_geometry::metrics::{psnr, ws_psnr, SpherePsnr};
use sv360_geometry::ProjectionKind;
use tracing::{debug, info};

/// Runs the metric command.
pub fn run(args: MetricArgs, verbose: bool) -> Result<()> {
    let cfg = super::load_session(&args.config, &Default::default())?;
    if args.metric == MetricKind::WsPsnr && cfg.input.projection != ProjectionKind::Equirectangular {
        bail!("ws-psnr needs equirectangular input, got {}", cfg.input.projection);
    }
    let mut session = cfg.build()?;
    let mut reference = super::open_input(&args.reference)?;
    let mut test = super::open_input(&args.test)?;

    let sphere = (args.metric == MetricKind::SPsnr).then(|| SpherePsnr::new(args.points));
    let mut evaluator = Evaluator {
        metric: args.metric,
        sphere,
        ref_bit_depth: cfg.input.bit_depth,
        test_bit_depth: cfg.output.bit_depth,
    };

    let mut totals: Vec<f64> = Vec::new();
    let mut n = 0usize;
    while args.frames.is_none_or(|f| n < f) {
        let Some(values) = evaluator.next_frame(&mut session, &mut reference, &mut test)? else {
            break;
        };
        if verbose {
            println!("Frame {n}: {}", format_values(&values));
        }
        totals.resize(values.len(), 0.0);
        for (t, v) in totals.iter_mut().zip(&values) {
            *t += v;
        }
        n += 1;
    }
    if n == 0 {
        bail!("No frames compared");
    }

    let averages: Vec<f64> = totals.iter().map(|t| t / n as f64).collect();
    info!(frames = n, metric = ?args.metric, "compared");
    println!("{:?} over {n} frames: {}", args.metric, format_values(&averages));
    Ok(())
}

fn format_values(values: &[f64]) -> String {
    const NAMES: [&str; 3] = ["Y", "U", "V"];
    values
        .iter()
        .zip(NAMES)
        .map(|(v, name)| format!("{name} {v:.4}"))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Per-frame metric evaluation.
pub struct Evaluator {
    /// Metric.
    pub metric: MetricKind,
    /// S-PSNR point set.
    pub sphere: Option<SpherePsnr>,
    /// Bit depth of the reference file.
    pub ref_bit_depth: u8,
    /// Bit depth of the test file.
    pub test_bit_depth: u8,
}

impl Evaluator {
    /// Reads one frame of each sequence and returns the metric per component,
    /// or `None` at the end of either input.
    pub fn next_frame<R: Read, T: Read>(
        &self,
        session: &mut Session,
        reference: &mut R,
        test: &mut T,
    ) -> Result<Option<Vec<f64>>> {
        if !read_frame(reference, &mut session.input, self.ref_bit_depth).context("Failed to read reference")? {
            return Ok(None);
        }
        if !read_frame(test, &mut session.output, self.test_bit_depth).context("Failed to read test")? {
            return Ok(None);
        }

        let values = match (self.metric, &self.sphere) {
            (MetricKind::SPsnr, Some(sphere)) => {
                session.src.convert_yuv(&session.input)?;
                session.dst.convert_yuv(&session.output)?;
                (0..session.src.num_components())
                    .map(|c| sphere.compute(&session.src, &session.dst, c))
                    .collect::<Result<Vec<_>, _>>()?
            }
            (MetricKind::WsPsnr, _) => (0..session.input.num_components())
                .map(|c| ws_psnr(&session.input, &session.output, c))
                .collect::<Result<Vec<_>, _>>()?,
            _ => (0..session.input.num_components())
                .map(|c| psnr(&session.input, &session.output, c))
                .collect::<Result<Vec<_>, _>>()?,
        };
        debug!(?values, "frame metric");
        Ok(Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use std::io::Cursor;
    use sv360_core::io::frame_size;
    use sv360_geometry::metrics::PSNR_IDENTICAL;

    fn session(output: &str) -> Session {
        let text = format!(
            "input:\n  projection: erp\n  width: 64\n  height: 32\noutput:\n{output}"
        );
        SessionConfig::parse(&text).unwrap().build().unwrap()
    }

    fn evaluator(metric: MetricKind) -> Evaluator {
        Evaluator {
            metric,
            sphere: (metric == MetricKind::SPsnr).then(|| SpherePsnr::new(2000)),
            ref_bit_depth: 8,
            test_bit_depth: 8,
        }
    }

    #[test]
    fn test_psnr_frames() {
        let mut s = session("  projection: erp\n  width: 64\n  height: 32\n");
        let size = frame_size(&s.input, 8);
        let mut a = Cursor::new(vec![100u8; size]);
        let mut b = Cursor::new(vec![100u8; size]);
        let values = evaluator(MetricKind::Psnr).next_frame(&mut s, &mut a, &mut b).unwrap().unwrap();
        assert_eq!(values, vec![PSNR_IDENTICAL; 3]);
        assert!(evaluator(MetricKind::Psnr).next_frame(&mut s, &mut a, &mut b).unwrap().is_none());
    }

    #[test]
    fn test_psnr_size_mismatch() {
        let mut s = session("  projection: cmp\n  face_width: 16\n  face_height: 16\n");
        let mut a = Cursor::new(vec![0u8; frame_size(&s.input, 8)]);
        let mut b = Cursor::new(vec![0u8; frame_size(&s.output, 8)]);
        assert!(evaluator(MetricKind::Psnr).next_frame(&mut s, &mut a, &mut b).is_err());
    }

    #[test]
    fn test_sphere_psnr_across_projections() {
        let mut s = session("  projection: cmp\n  face_width: 16\n  face_height: 16\n");
        let mut a = Cursor::new(vec![60u8; frame_size(&s.input, 8)]);
        let mut b = Cursor::new(vec![60u8; frame_size(&s.output, 8)]);
        let values = evaluator(MetricKind::SPsnr).next_frame(&mut s, &mut a, &mut b).unwrap().unwrap();
        assert_eq!(values, vec![PSNR_IDENTICAL; 3]);
    }
}
