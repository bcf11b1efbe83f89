// THEORY:
// The decoder is the entry point of the pipeline. It turns a PNG file into a
// `PixelGrid` whose pixels are always RGBA with 8 bits per channel, whatever
// the file actually stores.
//
// Key steps:
// 1.  **Signature first**: the first 8 bytes are compared to the PNG signature
//     before the codec sees the stream. A mismatch is a format error, not a
//     decode error.
// 2.  **Bounded parse**: the codec runs under an allocation limit. Running into
//     it, or failing to reserve the grid, is reported as an allocation error.
// 3.  **Normalization**: palette and `tRNS` expansion are done by the codec.
//     Grayscale is spread over R, G and B, missing alpha becomes opaque, and
//     16-bit samples keep only their high byte (truncation, not rounding).

use crate::core_modules::error::MarkError;
use crate::core_modules::pixel::{Byte, Pixel};
use crate::core_modules::pixel_grid::{PixelGrid, pixel_count, reserve_pixels};
use image::codecs::png::PngDecoder;
use image::{DynamicImage, ImageError, Limits};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, warn};

/// The eight bytes every PNG file starts with.
pub const PNG_SIGNATURE: [Byte; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Default ceiling on what the codec may allocate while decoding.
pub const DEFAULT_MAX_DECODE_ALLOC: u64 = 512 * 1024 * 1024;

/// Tunables for a single decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Upper bound, in bytes, on codec allocations. `None` removes the bound.
    pub max_alloc: Option<u64>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_alloc: Some(DEFAULT_MAX_DECODE_ALLOC),
        }
    }
}

impl DecodeOptions {
    fn limits(&self) -> Limits {
        let mut limits = Limits::no_limits();
        limits.max_alloc = self.max_alloc;
        limits
    }
}

/// Reads the PNG at `path` into a normalized RGBA grid.
pub fn decode(path: &Path, options: &DecodeOptions) -> Result<PixelGrid, MarkError> {
    let file = File::open(path).map_err(|e| MarkError::io(path, e))?;
    decode_reader(BufReader::new(file), path, options)
}

/// Decodes a PNG stream. `source` is only used to label errors and log lines.
pub fn decode_reader<R: BufRead + Seek>(
    mut reader: R,
    source: &Path,
    options: &DecodeOptions,
) -> Result<PixelGrid, MarkError> {
    check_signature(&mut reader, source)?;
    reader.rewind().map_err(|e| MarkError::io(source, e))?;

    let decoder =
        PngDecoder::with_limits(reader, options.limits()).map_err(|e| classify(source, e))?;
    let image = DynamicImage::from_decoder(decoder).map_err(|e| classify(source, e))?;
    debug!(
        path = %source.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "decoded png"
    );

    normalize(image, source)
}

fn check_signature<R: Read>(reader: &mut R, source: &Path) -> Result<(), MarkError> {
    let mut header = [0u8; PNG_SIGNATURE.len()];
    match reader.read_exact(&mut header) {
        Ok(()) if header == PNG_SIGNATURE => Ok(()),
        Ok(()) => Err(MarkError::Format {
            path: source.to_path_buf(),
        }),
        // Too short to even hold a signature.
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(MarkError::Format {
            path: source.to_path_buf(),
        }),
        Err(e) => Err(MarkError::io(source, e)),
    }
}

/// Sorts a codec failure into the error taxonomy. A stream that ends early or
/// holds garbage is malformed data, not an I/O problem.
fn classify(source: &Path, err: ImageError) -> MarkError {
    match err {
        ImageError::IoError(e)
            if !matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
            ) =>
        {
            MarkError::io(source, e)
        }
        ImageError::Limits(limit) => {
            MarkError::Allocation(format!("decoding {}: {limit}", source.display()))
        }
        err => MarkError::Decode {
            path: source.to_path_buf(),
            source: err,
        },
    }
}

fn normalize(image: DynamicImage, source: &Path) -> Result<PixelGrid, MarkError> {
    let (width, height) = (image.width(), image.height());
    let count = pixel_count(width, height).ok_or_else(|| {
        MarkError::Allocation(format!("{width}x{height} image exceeds addressable memory"))
    })?;
    let mut pixels = reserve_pixels(count)?;

    match image {
        DynamicImage::ImageRgba8(buffer) => {
            pixels.extend(buffer.pixels().map(|p| Pixel::from(p.0)));
        }
        DynamicImage::ImageRgb8(buffer) => {
            pixels.extend(buffer.pixels().map(|p| {
                let [red, green, blue] = p.0;
                Pixel::rgb(red, green, blue)
            }));
        }
        DynamicImage::ImageLuma8(buffer) => {
            pixels.extend(buffer.pixels().map(|p| Pixel::gray(p.0[0])));
        }
        DynamicImage::ImageLumaA8(buffer) => {
            pixels.extend(buffer.pixels().map(|p| {
                let [value, alpha] = p.0;
                Pixel::new(value, value, value, alpha)
            }));
        }
        DynamicImage::ImageRgba16(buffer) => {
            warn_truncation(source);
            pixels.extend(buffer.pixels().map(|p| {
                let [red, green, blue, alpha] = p.0.map(high_byte);
                Pixel::new(red, green, blue, alpha)
            }));
        }
        DynamicImage::ImageRgb16(buffer) => {
            warn_truncation(source);
            pixels.extend(buffer.pixels().map(|p| {
                let [red, green, blue] = p.0.map(high_byte);
                Pixel::rgb(red, green, blue)
            }));
        }
        DynamicImage::ImageLuma16(buffer) => {
            warn_truncation(source);
            pixels.extend(buffer.pixels().map(|p| Pixel::gray(high_byte(p.0[0]))));
        }
        DynamicImage::ImageLumaA16(buffer) => {
            warn_truncation(source);
            pixels.extend(buffer.pixels().map(|p| {
                let [value, alpha] = p.0.map(high_byte);
                Pixel::new(value, value, value, alpha)
            }));
        }
        other => {
            warn!(
                path = %source.display(),
                color = ?other.color(),
                "unexpected sample layout, converting generically"
            );
            pixels.extend(other.to_rgba8().pixels().map(|p| Pixel::from(p.0)));
        }
    }

    PixelGrid::new(width, height, pixels)
}

#[inline]
fn high_byte(sample: u16) -> Byte {
    (sample >> 8) as Byte
}

fn warn_truncation(source: &Path) {
    warn!(path = %source.display(), "16-bit samples truncated to 8 bits");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::error::ErrorKind;
    use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
    use std::io::Cursor;

    fn png_bytes(data: &[u8], width: u32, height: u32, color: ExtendedColorType) -> Vec<u8> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(data, width, height, color)
            .unwrap();
        out
    }

    /// Builds a PNG directly with the `png` crate, for layouts `PngEncoder` cannot emit.
    fn raw_png(
        (width, height): (u32, u32),
        color: png::ColorType,
        depth: png::BitDepth,
        palette: Option<&[u8]>,
        trns: Option<&[u8]>,
        data: &[u8],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            if let Some(palette) = palette {
                encoder.set_palette(palette.to_vec());
            }
            if let Some(trns) = trns {
                encoder.set_trns(trns.to_vec());
            }
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
            writer.finish().unwrap();
        }
        out
    }

    fn decode_bytes(bytes: &[u8]) -> Result<PixelGrid, MarkError> {
        decode_reader(Cursor::new(bytes), Path::new("memory.png"), &DecodeOptions::default())
    }

    #[test]
    fn rgba8_passes_through() {
        let data = [10, 20, 30, 40, 250, 251, 252, 253];
        let grid = decode_bytes(&png_bytes(&data, 2, 1, ExtendedColorType::Rgba8)).unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.row(0), &[Pixel::new(10, 20, 30, 40), Pixel::new(250, 251, 252, 253)]);
    }

    #[test]
    fn rgb8_becomes_opaque() {
        let data = [1, 2, 3];
        let grid = decode_bytes(&png_bytes(&data, 1, 1, ExtendedColorType::Rgb8)).unwrap();
        assert_eq!(grid.get(0, 0), Some(&Pixel::new(1, 2, 3, 255)));
    }

    #[test]
    fn grayscale_expands_to_rgb() {
        let grid = decode_bytes(&png_bytes(&[77, 200], 1, 2, ExtendedColorType::L8)).unwrap();
        assert_eq!(grid.get(0, 0), Some(&Pixel::gray(77)));
        assert_eq!(grid.get(1, 0), Some(&Pixel::gray(200)));

        let grid = decode_bytes(&png_bytes(&[90, 12], 1, 1, ExtendedColorType::La8)).unwrap();
        assert_eq!(grid.get(0, 0), Some(&Pixel::new(90, 90, 90, 12)));
    }

    #[test]
    fn palette_expands_with_transparency_folded_into_alpha() {
        let bytes = raw_png(
            (2, 1),
            png::ColorType::Indexed,
            png::BitDepth::Eight,
            Some(&[255, 0, 0, 0, 0, 255]),
            Some(&[7]),
            &[0, 1],
        );
        let grid = decode_bytes(&bytes).unwrap();
        // Entries past the end of tRNS stay opaque.
        assert_eq!(grid.row(0), &[Pixel::new(255, 0, 0, 7), Pixel::new(0, 0, 255, 255)]);
    }

    #[test]
    fn low_bit_palette_is_unpacked() {
        let bytes = raw_png(
            (3, 1),
            png::ColorType::Indexed,
            png::BitDepth::Two,
            Some(&[0, 0, 0, 10, 20, 30, 200, 100, 50]),
            None,
            &[0b10_01_00_00],
        );
        let grid = decode_bytes(&bytes).unwrap();
        assert_eq!(
            grid.row(0),
            &[Pixel::rgb(200, 100, 50), Pixel::rgb(10, 20, 30), Pixel::rgb(0, 0, 0)]
        );
    }

    #[test]
    fn one_bit_gray_scales_to_full_range() {
        let bytes = raw_png(
            (3, 1),
            png::ColorType::Grayscale,
            png::BitDepth::One,
            None,
            None,
            &[0b1010_0000],
        );
        let grid = decode_bytes(&bytes).unwrap();
        assert_eq!(grid.row(0), &[Pixel::gray(255), Pixel::gray(0), Pixel::gray(255)]);
        assert!(!grid.row(0)[0].is_dark());
        assert!(grid.row(0)[1].is_dark());
    }

    #[test]
    fn rgb_color_key_becomes_transparent() {
        let bytes = raw_png(
            (2, 1),
            png::ColorType::Rgb,
            png::BitDepth::Eight,
            None,
            Some(&[0, 1, 0, 2, 0, 3]),
            &[1, 2, 3, 4, 5, 6],
        );
        let grid = decode_bytes(&bytes).unwrap();
        assert_eq!(grid.row(0), &[Pixel::new(1, 2, 3, 0), Pixel::new(4, 5, 6, 255)]);
    }

    #[test]
    fn gray_color_key_becomes_transparent() {
        let bytes = raw_png(
            (2, 1),
            png::ColorType::Grayscale,
            png::BitDepth::Eight,
            None,
            Some(&[0, 50]),
            &[50, 51],
        );
        let grid = decode_bytes(&bytes).unwrap();
        assert_eq!(grid.row(0), &[Pixel::new(50, 50, 50, 0), Pixel::gray(51)]);
    }

    #[test]
    fn sixteen_bit_samples_are_truncated() {
        // 0x12FF would round to 0x13; truncation keeps 0x12.
        let samples: [u16; 4] = [0x12FF, 0x00FF, 0xFFFF, 0x8001];
        let data: Vec<u8> = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        let grid = decode_bytes(&png_bytes(&data, 1, 1, ExtendedColorType::Rgba16)).unwrap();
        assert_eq!(grid.get(0, 0), Some(&Pixel::new(0x12, 0x00, 0xFF, 0x80)));
    }

    #[test]
    fn wrong_signature_is_a_format_error() {
        let err = decode_bytes(b"GIF89a not a png at all").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn short_file_is_a_format_error() {
        let err = decode_bytes(&PNG_SIGNATURE[..5]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn truncated_stream_is_a_decode_error() {
        let bytes = png_bytes(&[0; 16], 2, 2, ExtendedColorType::Rgba8);
        let err = decode_bytes(&bytes[..PNG_SIGNATURE.len() + 10]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn garbage_after_signature_is_a_decode_error() {
        // A zero-sized IHDR with a zeroed CRC.
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&[0; 13 + 4]);
        let err = decode_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn allocation_limit_is_an_allocation_error() {
        let bytes = png_bytes(&[0; 64 * 64 * 4], 64, 64, ExtendedColorType::Rgba8);
        let options = DecodeOptions { max_alloc: Some(16) };
        let err = decode_reader(Cursor::new(bytes), Path::new("big.png"), &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Allocation);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = decode(Path::new("definitely/not/here.png"), &DecodeOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
