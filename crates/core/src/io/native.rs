//! Native TIFF reading/writing
//!
//! Uses the `tiff` crate for single-band greyscale images. Pixel spacing is
//! carried in ModelPixelScaleTag so it survives a write/read cycle.

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement, Spacing};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{ColorType, Gray16, Gray32Float, Gray8};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;

/// Sample type written to the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    U8,
    U16,
    #[default]
    F32,
}

/// Options for writing TIFF files
#[derive(Debug, Clone, Default)]
pub struct TiffOptions {
    /// Output sample type; values are clamped into its range
    pub sample_format: SampleFormat,
}

/// Read a single-band TIFF file into a 2-D Raster
pub fn read_tiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_tiff(file)
}

/// Read a TIFF from an in-memory buffer into a 2-D Raster
pub fn read_tiff_from_buffer<T>(data: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_tiff(Cursor::new(data))
}

fn cast_all<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: RasterElement,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| T::saturating_from_f64(v.to_f64().unwrap_or(f64::NAN)))
        .collect()
}

/// Internal: decode a TIFF from any `Read + Seek` source
fn decode_tiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(buf),
        DecodingResult::F64(buf) => cast_all(buf),
        DecodingResult::U8(buf) => cast_all(buf),
        DecodingResult::U16(buf) => cast_all(buf),
        DecodingResult::U32(buf) => cast_all(buf),
        DecodingResult::U64(buf) => cast_all(buf),
        DecodingResult::I8(buf) => cast_all(buf),
        DecodingResult::I16(buf) => cast_all(buf),
        DecodingResult::I32(buf) => cast_all(buf),
        DecodingResult::I64(buf) => cast_all(buf),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    // Multi-sample images decode to rows * cols * samples values
    if data.len() != rows * cols {
        return Err(Error::UnsupportedDataType(format!(
            "expected a single-band image, got {} samples for {}x{} pixels",
            data.len(),
            cols,
            rows
        )));
    }

    let mut raster = Raster::from_vec(data, &[rows, cols])?;

    if let Some(spacing) = read_spacing(&mut decoder) {
        raster.set_spacing(spacing)?;
    }

    Ok(raster)
}

/// Pixel spacing from ModelPixelScaleTag ([ScaleX, ScaleY, ScaleZ]), in
/// (row, col) axis order
fn read_spacing<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<Spacing> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    if scale.len() < 2 {
        return None;
    }
    Spacing::new(vec![scale[1].abs(), scale[0].abs()]).ok()
}

/// Write a 2-D Raster to a TIFF file
pub fn write_tiff<T, P>(raster: &Raster<T>, path: P, options: Option<TiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_tiff(raster, file, &options.unwrap_or_default())
}

/// Write a 2-D Raster to an in-memory TIFF buffer
pub fn write_tiff_to_buffer<T>(raster: &Raster<T>, options: Option<TiffOptions>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_tiff(raster, Cursor::new(&mut buf), &options.unwrap_or_default())?;
    Ok(buf)
}

fn converted<T: RasterElement, U: RasterElement>(raster: &Raster<T>) -> Vec<U> {
    raster
        .data()
        .iter()
        .map(|&v| U::saturating_from_f64(v.to_f64().unwrap_or(f64::NAN)))
        .collect()
}

/// Internal: encode a Raster as TIFF into any `Write + Seek` sink
fn encode_tiff<T, W>(raster: &Raster<T>, writer: W, options: &TiffOptions) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    if raster.ndim() != 2 {
        return Err(Error::InvalidDimensions {
            shape: raster.shape().to_vec(),
        });
    }

    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    match options.sample_format {
        SampleFormat::U8 => {
            write_image::<_, Gray8, _>(&mut encoder, raster, &converted::<T, u8>(raster))
        }
        SampleFormat::U16 => {
            write_image::<_, Gray16, _>(&mut encoder, raster, &converted::<T, u16>(raster))
        }
        SampleFormat::F32 => {
            write_image::<_, Gray32Float, _>(&mut encoder, raster, &converted::<T, f32>(raster))
        }
    }
}

fn write_image<W, C, E>(
    encoder: &mut TiffEncoder<W>,
    raster: &Raster<E>,
    data: &[C::Inner],
) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
    C: ColorType,
    E: RasterElement,
    [C::Inner]: TiffValue,
{
    let rows = raster.shape()[0];
    let cols = raster.shape()[1];

    let mut image = encoder
        .new_image::<C>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let spacing = raster.spacing().as_slice();
    let scale = vec![spacing[1], spacing[0], 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    image
        .write_data(data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
