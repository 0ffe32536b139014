//! Image decoding for shape/figure classification.
//!
//! An image whose pixels all share one color is reported as a filled
//! shape; anything else (including images we cannot decode) is a figure.

use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use pdfparser_core::{ImageFilter, ImageMetadata, PdfColor, exclusive_color};

use crate::color_space::ColorSpace;
use crate::lexer::Operand;
use crate::lopdf_backend::resolve_object;

/// What an image looks like once decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageAppearance {
    /// Every pixel has this color.
    Uniform(PdfColor),
    /// At least two distinct colors.
    Varied,
    /// Samples could not be decoded; carries the reason.
    Undecodable(String),
}

/// Read the geometry and format entries of an image dictionary.
pub fn image_metadata(doc: &Document, dict: &Dictionary) -> ImageMetadata {
    let int = |key: &[u8]| {
        dict.get(key)
            .ok()
            .and_then(|o| resolve_object(doc, o).as_i64().ok())
    };
    ImageMetadata {
        width: int(b"Width").map_or(0, |v| v.clamp(0, i64::from(u32::MAX)) as u32),
        height: int(b"Height").map_or(0, |v| v.clamp(0, i64::from(u32::MAX)) as u32),
        bits_per_component: int(b"BitsPerComponent").map(|v| v.clamp(0, 32) as u32),
        color_space: dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned()),
        image_mask: dict
            .get(b"ImageMask")
            .ok()
            .and_then(|o| o.as_bool().ok())
            .unwrap_or(false),
        filter: filter_names(doc, dict)
            .last()
            .and_then(|name| ImageFilter::from_pdf_name(name)),
    }
}

fn filter_names(doc: &Document, dict: &Dictionary) -> Vec<String> {
    let name = |o: &Object| {
        resolve_object(doc, o)
            .as_name()
            .ok()
            .map(|n| String::from_utf8_lossy(n).into_owned())
    };
    match dict.get(b"Filter").ok().map(|o| resolve_object(doc, o)) {
        Some(Object::Array(items)) => items.iter().filter_map(name).collect(),
        Some(other) => name(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Decode an image XObject (or a rebuilt inline image) and classify it.
///
/// `resources` resolves named color spaces; `fill` is the non-stroking
/// color an image mask paints with.
pub fn classify_image(
    doc: &Document,
    stream: &Stream,
    resources: &Dictionary,
    fill: PdfColor,
) -> ImageAppearance {
    let meta = image_metadata(doc, &stream.dict);
    if meta.width == 0 || meta.height == 0 {
        return ImageAppearance::Undecodable("image has no pixels".to_string());
    }

    match meta.filter {
        Some(ImageFilter::DCTDecode) => {
            return classify_jpeg(stream, filter_names(doc, &stream.dict).len());
        }
        Some(codec) if codec.is_image_codec() => {
            return ImageAppearance::Undecodable(format!("{} is not supported", codec.pdf_name()));
        }
        _ => {}
    }

    let data = if stream.dict.get(b"Filter").is_ok() {
        match stream.decompressed_content() {
            Ok(data) => data,
            Err(e) => return ImageAppearance::Undecodable(format!("failed to decompress: {e}")),
        }
    } else {
        stream.content.clone()
    };

    if meta.image_mask {
        return classify_mask(doc, &stream.dict, &meta, &data, fill);
    }

    let color_space = match stream.dict.get(b"ColorSpace").ok() {
        Some(Object::Name(name)) => {
            ColorSpace::resolve_name(&String::from_utf8_lossy(name), doc, resources)
        }
        Some(obj) => ColorSpace::from_object(obj, doc),
        None => Some(ColorSpace::DeviceGray),
    };
    let Some(color_space) = color_space else {
        return ImageAppearance::Undecodable("unresolved color space".to_string());
    };
    if matches!(color_space, ColorSpace::Pattern { .. }) {
        return ImageAppearance::Undecodable("pattern color space".to_string());
    }

    let bpc = meta.bits_per_component.unwrap_or(8);
    let decode = decode_array(doc, &stream.dict);
    let Some(reader) = SampleReader::new(&data, &meta, bpc, color_space.num_components()) else {
        return ImageAppearance::Undecodable(format!("unsupported sample layout ({bpc} bpc)"));
    };

    let indexed = matches!(color_space, ColorSpace::Indexed { .. });
    let max = ((1u64 << bpc) - 1) as f32;
    let pixels = reader.pixels().map(|samples| {
        let components: Vec<f32> = samples
            .iter()
            .enumerate()
            .map(|(i, &raw)| {
                let (dmin, dmax) = decode
                    .as_ref()
                    .and_then(|d| Some((*d.get(2 * i)?, *d.get(2 * i + 1)?)))
                    .unwrap_or(if indexed { (0.0, max) } else { (0.0, 1.0) });
                dmin + raw as f32 * (dmax - dmin) / max
            })
            .collect();
        color_space.to_rgb(&components)
    });
    uniformity(exclusive_color(pixels))
}

fn uniformity(color: Option<PdfColor>) -> ImageAppearance {
    match color {
        Some(color) => ImageAppearance::Uniform(color),
        None => ImageAppearance::Varied,
    }
}

fn classify_jpeg(stream: &Stream, filter_count: usize) -> ImageAppearance {
    let bytes = if filter_count > 1 {
        match stream.decompressed_content() {
            Ok(bytes) => bytes,
            Err(e) => return ImageAppearance::Undecodable(format!("failed to decompress: {e}")),
        }
    } else {
        stream.content.clone()
    };
    match image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg) {
        Ok(img) => {
            let rgb = img.to_rgb8();
            uniformity(exclusive_color(
                rgb.pixels().map(|p| PdfColor::new(p[0], p[1], p[2])),
            ))
        }
        Err(e) => ImageAppearance::Undecodable(format!("JPEG decode failed: {e}")),
    }
}

/// Stencil masks paint samples equal to 0 (1 with `/Decode [1 0]`).
fn classify_mask(
    doc: &Document,
    dict: &Dictionary,
    meta: &ImageMetadata,
    data: &[u8],
    fill: PdfColor,
) -> ImageAppearance {
    let Some(reader) = SampleReader::new(data, meta, 1, 1) else {
        return ImageAppearance::Undecodable("truncated image mask".to_string());
    };
    let painted = match decode_array(doc, dict) {
        Some(d) if d.first().copied() == Some(1.0) => 1,
        _ => 0,
    };
    if reader.pixels().all(|s| s[0] == painted) {
        ImageAppearance::Uniform(fill)
    } else {
        ImageAppearance::Varied
    }
}

fn decode_array(doc: &Document, dict: &Dictionary) -> Option<Vec<f32>> {
    let arr = resolve_object(doc, dict.get(b"Decode").ok()?).as_array().ok()?;
    arr.iter()
        .map(|o| match resolve_object(doc, o) {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r as f32),
            _ => None,
        })
        .collect()
}

/// Unpacks rows of `bpc`-bit samples.
struct SampleReader<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    components: usize,
    bpc: u32,
    stride: usize,
}

impl<'a> SampleReader<'a> {
    /// `None` for unsupported depths or data shorter than the image.
    fn new(data: &'a [u8], meta: &ImageMetadata, bpc: u32, components: u32) -> Option<Self> {
        if !matches!(bpc, 1 | 2 | 4 | 8 | 16) || components == 0 {
            return None;
        }
        let width = meta.width as usize;
        let height = meta.height as usize;
        let components = components as usize;
        let stride = (width * components * bpc as usize).div_ceil(8);
        if data.len() < stride.checked_mul(height)? {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
            components,
            bpc,
            stride,
        })
    }

    fn sample(&self, row: &[u8], index: usize) -> u32 {
        match self.bpc {
            8 => u32::from(row[index]),
            16 => u32::from(u16::from_be_bytes([row[2 * index], row[2 * index + 1]])),
            bpc => {
                let bit = index * bpc as usize;
                let shift = 8 - bpc as usize - bit % 8;
                u32::from(row[bit / 8] >> shift) & ((1 << bpc) - 1)
            }
        }
    }

    /// Samples of each pixel, row by row.
    fn pixels(&self) -> impl Iterator<Item = Vec<u32>> + '_ {
        (0..self.height).flat_map(move |y| {
            let row = &self.data[y * self.stride..(y + 1) * self.stride];
            (0..self.width).map(move |x| {
                (0..self.components)
                    .map(|c| self.sample(row, x * self.components + c))
                    .collect()
            })
        })
    }
}

/// Rebuild an inline image (`BI ... ID ... EI`) as a stream with
/// unabbreviated keys and names.
pub fn inline_image_stream(entries: &[(String, Operand)], data: &[u8]) -> Stream {
    let mut dict = Dictionary::new();
    for (key, value) in entries {
        dict.set(expand_key(key), operand_to_object(value));
    }
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    Stream::new(dict, data.to_vec())
}

fn expand_key(key: &str) -> &str {
    match key {
        "BPC" => "BitsPerComponent",
        "CS" => "ColorSpace",
        "D" => "Decode",
        "DP" => "DecodeParms",
        "F" => "Filter",
        "H" => "Height",
        "IM" => "ImageMask",
        "I" => "Interpolate",
        "W" => "Width",
        other => other,
    }
}

fn expand_name(name: &str) -> &str {
    if let Some(filter) = ImageFilter::from_pdf_name(name) {
        return filter.pdf_name();
    }
    match name {
        "G" => "DeviceGray",
        "RGB" => "DeviceRGB",
        "CMYK" => "DeviceCMYK",
        "I" => "Indexed",
        other => other,
    }
}

fn operand_to_object(op: &Operand) -> Object {
    match op {
        Operand::Integer(i) => Object::Integer(*i),
        Operand::Real(r) => Object::from(*r),
        Operand::Name(n) => Object::Name(expand_name(n).as_bytes().to_vec()),
        Operand::LiteralString(b) => Object::String(b.clone(), StringFormat::Literal),
        Operand::HexString(b) => Object::String(b.clone(), StringFormat::Hexadecimal),
        Operand::Array(items) => Object::Array(items.iter().map(operand_to_object).collect()),
        Operand::Boolean(b) => Object::Boolean(*b),
        Operand::Null => Object::Null,
        Operand::Dictionary(entries) => {
            let mut dict = Dictionary::new();
            for (k, v) in entries {
                dict.set(k.as_bytes().to_vec(), operand_to_object(v));
            }
            Object::Dictionary(dict)
        }
    }
}
