//! Images placed with `Do` or inline `BI`/`ID`/`EI`.
//!
//! An image whose pixels all share a single color is reported as a
//! [`PdfShape`](crate::shapes::PdfShape); any other image is a [`PdfFigure`].

use crate::document::PdfPosition;
use crate::geometry::{Ctm, Rectangle};
use crate::painting::PdfColor;

/// A raster image on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfFigure {
    pub position: PdfPosition,
}

impl PdfFigure {
    pub fn new(position: PdfPosition) -> Self {
        Self { position }
    }
}

/// Dimensions and sample layout of an image, read from its dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    pub bits_per_component: Option<u32>,
    /// Color space name (e.g. "DeviceRGB"), if given by name.
    pub color_space: Option<String>,
    pub image_mask: bool,
    pub filter: Option<ImageFilter>,
}

/// Placement of an image with the current transformation.
///
/// The box spans from the CTM translation to translation plus pixel size
/// times the CTM scale, per axis.
pub fn figure_bounds(ctm: &Ctm, metadata: &ImageMetadata) -> Rectangle {
    let width = f64::from(metadata.width);
    let height = f64::from(metadata.height);
    Rectangle::new(ctm.e, ctm.f, ctm.e + width * ctm.a, ctm.f + height * ctm.d)
}

/// The single color shared by every pixel, or `None` when pixels differ
/// or there are none.
pub fn exclusive_color<I>(pixels: I) -> Option<PdfColor>
where
    I: IntoIterator<Item = PdfColor>,
{
    let mut pixels = pixels.into_iter();
    let first = pixels.next()?;
    pixels.all(|p| p == first).then_some(first)
}

/// PDF stream filter used to encode image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    DCTDecode,
    FlateDecode,
    LZWDecode,
    ASCIIHexDecode,
    ASCII85Decode,
    RunLengthDecode,
    CCITTFaxDecode,
    JBIG2Decode,
    JPXDecode,
}

impl ImageFilter {
    /// Parse a filter name, accepting the abbreviations allowed in inline images.
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        Some(match name {
            "DCTDecode" | "DCT" => Self::DCTDecode,
            "FlateDecode" | "Fl" => Self::FlateDecode,
            "LZWDecode" | "LZW" => Self::LZWDecode,
            "ASCIIHexDecode" | "AHx" => Self::ASCIIHexDecode,
            "ASCII85Decode" | "A85" => Self::ASCII85Decode,
            "RunLengthDecode" | "RL" => Self::RunLengthDecode,
            "CCITTFaxDecode" | "CCF" => Self::CCITTFaxDecode,
            "JBIG2Decode" => Self::JBIG2Decode,
            "JPXDecode" => Self::JPXDecode,
            _ => return None,
        })
    }

    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::DCTDecode => "DCTDecode",
            Self::FlateDecode => "FlateDecode",
            Self::LZWDecode => "LZWDecode",
            Self::ASCIIHexDecode => "ASCIIHexDecode",
            Self::ASCII85Decode => "ASCII85Decode",
            Self::RunLengthDecode => "RunLengthDecode",
            Self::CCITTFaxDecode => "CCITTFaxDecode",
            Self::JBIG2Decode => "JBIG2Decode",
            Self::JPXDecode => "JPXDecode",
        }
    }

    /// Whether the filter yields an encoded image rather than raw samples.
    pub fn is_image_codec(&self) -> bool {
        matches!(
            self,
            Self::DCTDecode | Self::CCITTFaxDecode | Self::JBIG2Decode | Self::JPXDecode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(width: u32, height: u32) -> ImageMetadata {
        ImageMetadata {
            width,
            height,
            ..ImageMetadata::default()
        }
    }

    #[test]
    fn bounds_use_translation_and_scale() {
        let ctm = Ctm::new(0.5, 0.0, 0.0, 2.0, 100.0, 200.0);
        let rect = figure_bounds(&ctm, &meta(10, 4));
        assert_eq!(rect, Rectangle::new(100.0, 200.0, 105.0, 208.0));
    }

    #[test]
    fn bounds_normalize_flipped_images() {
        let ctm = Ctm::new(1.0, 0.0, 0.0, -1.0, 0.0, 50.0);
        let rect = figure_bounds(&ctm, &meta(2, 10));
        assert_eq!(rect, Rectangle::new(0.0, 40.0, 2.0, 50.0));
    }

    #[test]
    fn exclusive_color_of_uniform_pixels() {
        let red = PdfColor::new(255, 0, 0);
        assert_eq!(exclusive_color([red, red, red]), Some(red));
    }

    #[test]
    fn exclusive_color_of_mixed_pixels_is_none() {
        let pixels = [PdfColor::BLACK, PdfColor::WHITE];
        assert_eq!(exclusive_color(pixels), None);
        assert_eq!(exclusive_color(std::iter::empty()), None);
    }

    #[test]
    fn filter_names_and_abbreviations() {
        assert_eq!(ImageFilter::from_pdf_name("Fl"), Some(ImageFilter::FlateDecode));
        assert_eq!(ImageFilter::from_pdf_name("DCTDecode"), Some(ImageFilter::DCTDecode));
        assert_eq!(ImageFilter::from_pdf_name("Bogus"), None);
        assert_eq!(ImageFilter::ASCIIHexDecode.pdf_name(), "ASCIIHexDecode");
        assert!(ImageFilter::JPXDecode.is_image_codec());
        assert!(!ImageFilter::FlateDecode.is_image_codec());
    }
}
