//! Raw planar YUV frame I/O.
//!
//! Frames are stored plane after plane (Y, then Cb, then Cr) without headers.
//! Files with a bit depth of 8 or less use one byte per sample, deeper files two
//! little-endian bytes. The file bit depth may differ from the picture's: samples
//! are shifted on the way in and out, with rounding and clipping when the depth
//! shrinks.
//!
//! # Example
//!
//! ```rust
//! use sv360_core::{io, ChromaFormat, Picture};
//!
//! let mut pic = Picture::new(4, 2, ChromaFormat::Yuv420, 8).unwrap();
//! pic.fill_mid_gray();
//! let mut bytes = Vec::new();
//! io::write_frame(&mut bytes, &pic, 8).unwrap();
//! assert_eq!(bytes.len(), io::frame_size(&pic, 8));
//!
//! let mut back = Picture::new(4, 2, ChromaFormat::Yuv420, 8).unwrap();
//! assert!(io::read_frame(&mut bytes.as_slice(), &mut back, 8).unwrap());
//! assert_eq!(back, pic);
//! ```

use crate::{clip_bd, Error, Picture, Result, Sample, MAX_BIT_DEPTH};
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::{debug, trace};

/// Bytes per sample in a file of the given bit depth.
#[inline]
pub fn bytes_per_sample(file_bit_depth: u8) -> usize {
    if file_bit_depth > 8 { 2 } else { 1 }
}

/// Size in bytes of one frame of `pic` stored at `file_bit_depth`.
pub fn frame_size(pic: &Picture, file_bit_depth: u8) -> usize {
    let samples: usize = pic.planes().iter().map(|p| p.width() * p.height()).sum();
    samples * bytes_per_sample(file_bit_depth)
}

fn check_depth(bit_depth: u8) -> Result<()> {
    if bit_depth == 0 || bit_depth > MAX_BIT_DEPTH {
        return Err(Error::InvalidBitDepth(bit_depth));
    }
    Ok(())
}

/// Rescales a sample between bit depths.
#[inline]
fn rescale(value: i64, from: u8, to: u8) -> Sample {
    if to >= from {
        clip_bd(value << (to - from), to)
    } else {
        let shift = from - to;
        clip_bd((value + (1 << (shift - 1))) >> shift, to)
    }
}

/// Reads the next frame into `pic`.
///
/// Returns `Ok(false)` when the reader is exhausted before the first byte of the
/// frame, and [`Error::TruncatedFrame`] when it ends part-way through.
pub fn read_frame<R: Read>(reader: &mut R, pic: &mut Picture, file_bit_depth: u8) -> Result<bool> {
    check_depth(file_bit_depth)?;
    let expected = frame_size(pic, file_bit_depth);
    let mut buf = vec![0u8; expected];
    let mut filled = 0;
    while filled < expected {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled == 0 {
        return Ok(false);
    }
    if filled < expected {
        return Err(Error::TruncatedFrame {
            expected,
            got: filled,
        });
    }

    let bps = bytes_per_sample(file_bit_depth);
    let pic_depth = pic.bit_depth();
    let mut pos = 0;
    for comp in 0..pic.num_components() {
        let plane = pic.plane_mut(comp);
        for y in 0..plane.height() {
            for v in plane.row_mut(y) {
                let raw = if bps == 2 {
                    u16::from_le_bytes([buf[pos], buf[pos + 1]]) as i64
                } else {
                    buf[pos] as i64
                };
                pos += bps;
                *v = rescale(raw, file_bit_depth, pic_depth);
            }
        }
    }
    trace!(bytes = expected, "read frame");
    Ok(true)
}

/// Writes `pic` as one raw frame.
pub fn write_frame<W: Write>(writer: &mut W, pic: &Picture, file_bit_depth: u8) -> Result<()> {
    check_depth(file_bit_depth)?;
    let bps = bytes_per_sample(file_bit_depth);
    let mut buf = Vec::with_capacity(frame_size(pic, file_bit_depth));
    for plane in pic.planes() {
        for y in 0..plane.height() {
            for &v in plane.row(y) {
                let out = rescale(v as i64, pic.bit_depth(), file_bit_depth);
                if bps == 2 {
                    buf.extend_from_slice(&out.to_le_bytes());
                } else {
                    buf.push(out as u8);
                }
            }
        }
    }
    writer.write_all(&buf)?;
    Ok(())
}

/// Skips `frames` frames of the geometry of `pic`.
pub fn skip_frames<S: Seek>(stream: &mut S, pic: &Picture, file_bit_depth: u8, frames: usize) -> Result<()> {
    if frames > 0 {
        let bytes = (frame_size(pic, file_bit_depth) * frames) as i64;
        stream.seek(SeekFrom::Current(bytes))?;
        debug!(frames, bytes, "skipped frames");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChromaFormat;
    use std::io::Cursor;

    fn ramp(width: usize, height: usize, format: ChromaFormat, bit_depth: u8) -> Picture {
        let mut pic = Picture::new(width, height, format, bit_depth).unwrap();
        let max = (1u32 << bit_depth) - 1;
        for comp in 0..pic.num_components() {
            let plane = pic.plane_mut(comp);
            for y in 0..plane.height() {
                for (x, v) in plane.row_mut(y).iter_mut().enumerate() {
                    *v = ((x * 7 + y * 13 + comp * 29) as u32 % (max + 1)) as u16;
                }
            }
        }
        pic
    }

    #[test]
    fn test_frame_size() {
        let pic = Picture::new(8, 4, ChromaFormat::Yuv420, 8).unwrap();
        assert_eq!(frame_size(&pic, 8), 8 * 4 * 3 / 2);
        assert_eq!(frame_size(&pic, 10), 8 * 4 * 3);
    }

    #[test]
    fn test_roundtrip_8bit() {
        let pic = ramp(8, 4, ChromaFormat::Yuv420, 8);
        let mut bytes = Vec::new();
        write_frame(&mut bytes, &pic, 8).unwrap();
        let mut back = Picture::new(8, 4, ChromaFormat::Yuv420, 8).unwrap();
        assert!(read_frame(&mut Cursor::new(bytes), &mut back, 8).unwrap());
        assert_eq!(back, pic);
    }

    #[test]
    fn test_roundtrip_10bit_le() {
        let pic = ramp(6, 2, ChromaFormat::Yuv444, 10);
        let mut bytes = Vec::new();
        write_frame(&mut bytes, &pic, 10).unwrap();
        assert_eq!(bytes[0], 0);
        let mut back = Picture::new(6, 2, ChromaFormat::Yuv444, 10).unwrap();
        assert!(read_frame(&mut Cursor::new(bytes), &mut back, 10).unwrap());
        assert_eq!(back, pic);
    }

    #[test]
    fn test_depth_conversion_on_read() {
        let bytes = vec![255u8, 0, 128, 1];
        let mut pic = Picture::new(2, 2, ChromaFormat::Yuv400, 10).unwrap();
        assert!(read_frame(&mut Cursor::new(bytes), &mut pic, 8).unwrap());
        assert_eq!(pic.plane(0).row(0), &[1020, 0]);
        assert_eq!(pic.plane(0).row(1), &[512, 4]);
    }

    #[test]
    fn test_depth_conversion_on_write_rounds() {
        let mut pic = Picture::new(2, 1, ChromaFormat::Yuv400, 10).unwrap();
        pic.plane_mut(0).row_mut(0).copy_from_slice(&[1023, 6]);
        let mut bytes = Vec::new();
        write_frame(&mut bytes, &pic, 8).unwrap();
        assert_eq!(bytes, vec![255, 2]);
    }

    #[test]
    fn test_eof_and_truncation() {
        let mut pic = Picture::new(4, 2, ChromaFormat::Yuv400, 8).unwrap();
        assert!(!read_frame(&mut Cursor::new(Vec::new()), &mut pic, 8).unwrap());
        let err = read_frame(&mut Cursor::new(vec![1u8, 2, 3]), &mut pic, 8).unwrap_err();
        assert!(matches!(err, Error::TruncatedFrame { expected: 8, got: 3 }));
    }

    #[test]
    fn test_skip_frames() {
        let pic = ramp(2, 2, ChromaFormat::Yuv400, 8);
        let mut bytes = Vec::new();
        write_frame(&mut bytes, &pic, 8).unwrap();
        bytes.extend_from_slice(&[9, 9, 9, 9]);
        let mut cursor = Cursor::new(bytes);
        skip_frames(&mut cursor, &pic, 8, 1).unwrap();
        let mut back = Picture::new(2, 2, ChromaFormat::Yuv400, 8).unwrap();
        assert!(read_frame(&mut cursor, &mut back, 8).unwrap());
        assert_eq!(back.plane(0).row(0), &[9, 9]);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.yuv");
        let pic = ramp(8, 8, ChromaFormat::Yuv420, 8);
        {
            let mut f = std::fs::File::create(&path).unwrap();
            write_frame(&mut f, &pic, 8).unwrap();
            write_frame(&mut f, &pic, 8).unwrap();
        }
        let mut f = std::fs::File::open(&path).unwrap();
        let mut back = Picture::new(8, 8, ChromaFormat::Yuv420, 8).unwrap();
        assert!(read_frame(&mut f, &mut back, 8).unwrap());
        assert!(read_frame(&mut f, &mut back, 8).unwrap());
        assert!(!read_frame(&mut f, &mut back, 8).unwrap());
        assert_eq!(back, pic);
    }
}
