//! Color space resolution.
//!
//! Resolves color space names and objects from resource dictionaries and
//! converts color components into 8-bit RGB.

use lopdf::{Document, Object};
use pdfparser_core::PdfColor;

use crate::lopdf_backend::resolve_object;

/// A color space the engine can evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    /// ICC profile, evaluated through its alternate space.
    ICCBased {
        num_components: u32,
        alternate: Box<ColorSpace>,
    },
    Indexed {
        base: Box<ColorSpace>,
        hival: u32,
        lookup_table: Vec<u8>,
    },
    /// Spot color. The tint transform is not evaluated; see [`ColorSpace::to_rgb`].
    Separation { alternate: Box<ColorSpace> },
    DeviceN {
        num_components: u32,
        alternate: Box<ColorSpace>,
    },
    /// Pattern space, optionally with an underlying space for uncolored patterns.
    Pattern { underlying: Option<Box<ColorSpace>> },
}

impl Default for ColorSpace {
    fn default() -> Self {
        ColorSpace::DeviceGray
    }
}

impl ColorSpace {
    pub fn num_components(&self) -> u32 {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceCMYK => 4,
            ColorSpace::ICCBased { num_components, .. } => *num_components,
            ColorSpace::Indexed { .. } | ColorSpace::Separation { .. } => 1,
            ColorSpace::DeviceN { num_components, .. } => *num_components,
            ColorSpace::Pattern { underlying } => {
                underlying.as_ref().map_or(0, |cs| cs.num_components())
            }
        }
    }

    /// Components a color takes right after `CS`/`cs` selects this space.
    pub fn initial_components(&self) -> Vec<f32> {
        match self {
            ColorSpace::DeviceCMYK => vec![0.0, 0.0, 0.0, 1.0],
            ColorSpace::Separation { .. } => vec![1.0],
            ColorSpace::DeviceN { num_components, .. } => vec![1.0; *num_components as usize],
            ColorSpace::Pattern { .. } => Vec::new(),
            other => vec![0.0; other.num_components() as usize],
        }
    }

    pub fn initial_color(&self) -> PdfColor {
        self.to_rgb(&self.initial_components())
    }

    /// Convert components in this space to RGB. Missing components read as 0.
    pub fn to_rgb(&self, components: &[f32]) -> PdfColor {
        let c = |i: usize| components.get(i).copied().unwrap_or(0.0);
        match self {
            ColorSpace::DeviceGray => PdfColor::from_unit_rgb(c(0), c(0), c(0)),
            ColorSpace::DeviceRGB => PdfColor::from_unit_rgb(c(0), c(1), c(2)),
            ColorSpace::DeviceCMYK => cmyk_to_rgb(c(0), c(1), c(2), c(3)),
            ColorSpace::ICCBased { alternate, .. } => alternate.to_rgb(components),
            ColorSpace::Indexed {
                base,
                hival,
                lookup_table,
            } => {
                let index = (c(0).round().max(0.0) as u32).min(*hival) as usize;
                let n = base.num_components() as usize;
                let offset = index * n;
                match lookup_table.get(offset..offset + n) {
                    Some(entry) => {
                        let base_components: Vec<f32> =
                            entry.iter().map(|&b| f32::from(b) / 255.0).collect();
                        base.to_rgb(&base_components)
                    }
                    None => PdfColor::BLACK,
                }
            }
            ColorSpace::Separation { alternate } => tint_to_rgb(c(0), alternate),
            ColorSpace::DeviceN {
                num_components,
                alternate,
            } => {
                if alternate.num_components() == *num_components {
                    alternate.to_rgb(components)
                } else {
                    let darkest = components.iter().copied().fold(0.0f32, f32::max);
                    tint_to_rgb(darkest, alternate)
                }
            }
            ColorSpace::Pattern { underlying } => match underlying {
                Some(cs) if !components.is_empty() => cs.to_rgb(components),
                _ => PdfColor::BLACK,
            },
        }
    }

    /// Resolve a name used with `CS`/`cs` or as an image `/ColorSpace`.
    ///
    /// Device names (and their inline-image abbreviations) resolve directly;
    /// anything else is looked up in the `/ColorSpace` resource dictionary.
    pub fn resolve_name(
        name: &str,
        doc: &Document,
        resources: &lopdf::Dictionary,
    ) -> Option<ColorSpace> {
        if let Some(cs) = device_space(name) {
            return Some(cs);
        }
        if name == "Pattern" {
            return Some(ColorSpace::Pattern { underlying: None });
        }
        let spaces = resources
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_dict().ok())?;
        let obj = spaces.get(name.as_bytes()).ok()?;
        ColorSpace::from_object(obj, doc)
    }

    /// Resolve a color space given as a direct or indirect object.
    pub fn from_object(obj: &Object, doc: &Document) -> Option<ColorSpace> {
        match resolve_object(doc, obj) {
            Object::Name(name) => {
                let name = String::from_utf8_lossy(name);
                if name == "Pattern" {
                    return Some(ColorSpace::Pattern { underlying: None });
                }
                device_space(&name)
            }
            Object::Array(arr) => from_array(arr, doc),
            _ => None,
        }
    }

    /// Default space for a given component count, used for bare `sc` operands.
    pub fn from_component_count(n: usize) -> ColorSpace {
        match n {
            3 => ColorSpace::DeviceRGB,
            4 => ColorSpace::DeviceCMYK,
            _ => ColorSpace::DeviceGray,
        }
    }
}

fn device_space(name: &str) -> Option<ColorSpace> {
    match name {
        "DeviceGray" | "G" | "CalGray" => Some(ColorSpace::DeviceGray),
        "DeviceRGB" | "RGB" | "CalRGB" | "Lab" => Some(ColorSpace::DeviceRGB),
        "DeviceCMYK" | "CMYK" => Some(ColorSpace::DeviceCMYK),
        _ => None,
    }
}

fn cmyk_to_rgb(c: f32, m: f32, y: f32, k: f32) -> PdfColor {
    let k = k.clamp(0.0, 1.0);
    PdfColor::from_unit_rgb(
        (1.0 - c.clamp(0.0, 1.0)) * (1.0 - k),
        (1.0 - m.clamp(0.0, 1.0)) * (1.0 - k),
        (1.0 - y.clamp(0.0, 1.0)) * (1.0 - k),
    )
}

/// Approximate a tint (0 = no colorant, 1 = full colorant) without
/// evaluating the tint transform function.
fn tint_to_rgb(tint: f32, alternate: &ColorSpace) -> PdfColor {
    match alternate {
        ColorSpace::DeviceCMYK => cmyk_to_rgb(0.0, 0.0, 0.0, tint),
        _ => {
            let v = 1.0 - tint;
            PdfColor::from_unit_rgb(v, v, v)
        }
    }
}

fn from_array(arr: &[Object], doc: &Document) -> Option<ColorSpace> {
    let family = arr.first()?.as_name().ok()?;
    match family {
        b"ICCBased" => icc_based(arr, doc),
        b"Indexed" | b"I" => indexed(arr, doc),
        b"Separation" => {
            let alternate = arr
                .get(2)
                .and_then(|o| ColorSpace::from_object(o, doc))
                .unwrap_or(ColorSpace::DeviceCMYK);
            Some(ColorSpace::Separation {
                alternate: Box::new(alternate),
            })
        }
        b"DeviceN" => {
            let names = resolve_object(doc, arr.get(1)?).as_array().ok()?;
            let alternate = arr
                .get(2)
                .and_then(|o| ColorSpace::from_object(o, doc))
                .unwrap_or(ColorSpace::DeviceCMYK);
            Some(ColorSpace::DeviceN {
                num_components: names.len() as u32,
                alternate: Box::new(alternate),
            })
        }
        b"Pattern" => Some(ColorSpace::Pattern {
            underlying: arr
                .get(1)
                .and_then(|o| ColorSpace::from_object(o, doc))
                .map(Box::new),
        }),
        other => device_space(&String::from_utf8_lossy(other)),
    }
}

fn icc_based(arr: &[Object], doc: &Document) -> Option<ColorSpace> {
    let stream = resolve_object(doc, arr.get(1)?).as_stream().ok()?;
    let num_components = stream
        .dict
        .get(b"N")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .map_or(3, |n| n.clamp(1, 4) as u32);
    let alternate = stream
        .dict
        .get(b"Alternate")
        .ok()
        .and_then(|o| ColorSpace::from_object(o, doc))
        .unwrap_or_else(|| ColorSpace::from_component_count(num_components as usize));
    Some(ColorSpace::ICCBased {
        num_components,
        alternate: Box::new(alternate),
    })
}

fn indexed(arr: &[Object], doc: &Document) -> Option<ColorSpace> {
    if arr.len() < 4 {
        return None;
    }
    let base = ColorSpace::from_object(&arr[1], doc).unwrap_or(ColorSpace::DeviceRGB);
    let hival = resolve_object(doc, &arr[2]).as_i64().ok()?.clamp(0, 255) as u32;
    let lookup_table = match resolve_object(doc, &arr[3]) {
        Object::String(bytes, _) => bytes.clone(),
        Object::Stream(s) => s
            .decompressed_content()
            .unwrap_or_else(|_| s.content.clone()),
        _ => return None,
    };
    Some(ColorSpace::Indexed {
        base: Box::new(base),
        hival,
        lookup_table,
    })
}
