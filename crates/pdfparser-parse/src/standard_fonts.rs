//! Built-in metrics for the standard base fonts.
//!
//! Simple fonts that name a standard font but carry no `/Widths` array
//! get their advance widths from these tables. Widths are in 1/1000 text
//! space units and cover the printable ASCII range 32..=126, which is
//! laid out identically by the Standard, WinAnsi and MacRoman encodings.

/// Metrics of one standard font family member.
#[derive(Debug)]
pub struct StandardFont {
    pub name: &'static str,
    widths: Option<&'static [u16; 95]>,
    uniform_width: u16,
}

impl StandardFont {
    /// Advance width of a single-byte code, in 1/1000 units.
    pub fn width(&self, code: u8) -> Option<u16> {
        match self.widths {
            None => Some(self.uniform_width),
            Some(table) => (32..=126)
                .contains(&code)
                .then(|| table[usize::from(code - 32)]),
        }
    }

    pub fn is_fixed_pitch(&self) -> bool {
        self.widths.is_none()
    }
}

/// Find the standard font a `/BaseFont` name refers to.
///
/// Accepts subset-tagged names and the common TrueType aliases
/// (`Arial,Bold`, `TimesNewRomanPSMT`, `CourierNew`).
pub fn lookup(base_font: &str) -> Option<&'static StandardFont> {
    let name = strip_subset_tag(base_font);
    let (family, style) = match name.split_once([',', '-']) {
        Some((family, style)) => (family, style.to_ascii_lowercase()),
        None => (name, String::new()),
    };
    let bold = style.contains("bold");
    let family = family.to_ascii_lowercase();

    let font = match family.as_str() {
        "helvetica" | "arial" | "arialmt" => {
            if bold {
                &HELVETICA_BOLD
            } else {
                &HELVETICA
            }
        }
        "times" | "timesnewroman" | "timesnewromanpsmt" | "timesnewromanps" => {
            if bold {
                &TIMES_BOLD
            } else {
                &TIMES_ROMAN
            }
        }
        "courier" | "couriernew" | "couriernewpsmt" => &COURIER,
        _ => return None,
    };
    Some(font)
}

fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

static COURIER: StandardFont = StandardFont {
    name: "Courier",
    widths: None,
    uniform_width: 600,
};

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9 : ; < = > ?
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    // @ A-O
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    // P-Z [ \ ] ^ _
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    // ` a-o
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    // p-z { | } ~
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

static HELVETICA: StandardFont = StandardFont {
    name: "Helvetica",
    widths: Some(&HELVETICA_WIDTHS),
    uniform_width: 0,
};

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

static HELVETICA_BOLD: StandardFont = StandardFont {
    name: "Helvetica-Bold",
    widths: Some(&HELVETICA_BOLD_WIDTHS),
    uniform_width: 0,
};

#[rustfmt::skip]
static TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

static TIMES_ROMAN: StandardFont = StandardFont {
    name: "Times-Roman",
    widths: Some(&TIMES_ROMAN_WIDTHS),
    uniform_width: 0,
};

#[rustfmt::skip]
static TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

static TIMES_BOLD: StandardFont = StandardFont {
    name: "Times-Bold",
    widths: Some(&TIMES_BOLD_WIDTHS),
    uniform_width: 0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_known_widths() {
        let font = lookup("Helvetica").unwrap();
        assert_eq!(font.width(b' '), Some(278));
        assert_eq!(font.width(b'A'), Some(667));
        assert_eq!(font.width(b'i'), Some(222));
        assert_eq!(font.width(b'~'), Some(584));
    }

    #[test]
    fn codes_outside_ascii_have_no_width() {
        let font = lookup("Helvetica").unwrap();
        assert_eq!(font.width(10), None);
        assert_eq!(font.width(200), None);
    }

    #[test]
    fn courier_is_fixed_pitch() {
        let font = lookup("Courier-BoldOblique").unwrap();
        assert!(font.is_fixed_pitch());
        assert_eq!(font.width(b'W'), Some(600));
        assert_eq!(font.width(200), Some(600));
    }

    #[test]
    fn bold_variants_resolve() {
        assert_eq!(lookup("Helvetica-Bold").unwrap().name, "Helvetica-Bold");
        assert_eq!(lookup("Helvetica-BoldOblique").unwrap().name, "Helvetica-Bold");
        assert_eq!(lookup("Times-Bold").unwrap().width(b'W'), Some(1000));
        assert_eq!(lookup("Times-Italic").unwrap().name, "Times-Roman");
    }

    #[test]
    fn truetype_aliases_and_subset_tags() {
        assert_eq!(lookup("Arial,Bold").unwrap().name, "Helvetica-Bold");
        assert_eq!(lookup("ABCDEF+ArialMT").unwrap().name, "Helvetica");
        assert_eq!(lookup("TimesNewRomanPSMT").unwrap().name, "Times-Roman");
        assert_eq!(lookup("CourierNew").unwrap().name, "Courier");
    }

    #[test]
    fn unknown_fonts_return_none() {
        assert!(lookup("Garamond").is_none());
        assert!(lookup("").is_none());
    }
}
