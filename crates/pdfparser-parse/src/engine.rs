//! Content stream engine.
//!
//! Runs the dispatch loop over a content stream, threading one mutable
//! [`EngineState`] through the operator handlers in [`crate::operators`]
//! and reporting extracted elements to a [`ContentHandler`]. Form XObjects
//! and Type3 glyph procedures run as nested scopes of the same engine.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfparser_core::{
    Ctm, ExtractOptions, ExtractWarning, ExtractWarningCode, ImageMetadata, PaintedPath,
    PathBuilder, PdfCharacter, PdfColor, PdfFigure, PdfFontFace, PdfPosition, PdfShape, Point,
    Rectangle, figure_bounds, round_to,
};
use tracing::{debug, trace, warn};

use crate::error::BackendError;
use crate::fonts::{LoadedFont, Type3Glyphs};
use crate::handler::ContentHandler;
use crate::images::{ImageAppearance, classify_image, image_metadata};
use crate::lexer::{ContentLexer, Operand, Token};
use crate::lopdf_backend::{decode_stream, object_to_f64, resolve_object};
use crate::operators;
use crate::state::{GraphicsStack, GraphicsState};
use crate::text_state::TextMatrices;

/// Resources used when neither a stream nor its page declares any.
pub(crate) static EMPTY_RESOURCES: LazyLock<Dictionary> = LazyLock::new(Dictionary::new);

/// Mutable interpreter state of the scope being executed.
#[derive(Debug)]
pub(crate) struct EngineState<'d> {
    pub graphics: GraphicsStack,
    pub path: PathBuilder,
    /// Text and line matrices; `Some` only between `BT` and `ET`.
    pub text: Option<TextMatrices>,
    /// CTM at the start of the current scope.
    pub initial_matrix: Ctm,
    pub resources: &'d Dictionary,
    pub page_resources: &'d Dictionary,
    pub in_type3: bool,
    /// Device-space box declared by `d1` in the running glyph procedure.
    pub type3_glyph_bbox: Option<Rectangle>,
    pub page_number: u32,
    /// Number of enclosing Form XObject and glyph procedure scopes.
    pub depth: usize,
}

impl<'d> EngineState<'d> {
    fn new(page_number: u32, crop_box: Rectangle, resources: &'d Dictionary) -> Self {
        Self {
            graphics: GraphicsStack::new(GraphicsState::new(crop_box)),
            path: PathBuilder::default(),
            text: None,
            initial_matrix: Ctm::identity(),
            resources,
            page_resources: resources,
            in_type3: false,
            type3_glyph_bbox: None,
            page_number,
            depth: 0,
        }
    }

    pub fn current(&self) -> &GraphicsState {
        self.graphics.current()
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        self.graphics.current_mut()
    }

    /// The path builder, synced to the current CTM.
    pub fn path_mut(&mut self) -> &mut PathBuilder {
        let ctm = self.graphics.current().ctm;
        self.path.set_ctm(ctm);
        &mut self.path
    }
}

/// State set aside while a nested scope runs.
struct Snapshot<'d> {
    graphics: GraphicsStack,
    path: PathBuilder,
    text: Option<TextMatrices>,
    initial_matrix: Ctm,
    resources: &'d Dictionary,
    in_type3: bool,
    type3_glyph_bbox: Option<Rectangle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FontKey {
    Ref(ObjectId),
    /// Direct font dictionary, keyed by its address inside the document.
    Inline(usize),
}

#[derive(Debug, Default)]
struct PageCounters {
    operators: usize,
    characters: usize,
    figures: usize,
    shapes: usize,
    warnings: usize,
}

/// The content stream interpreter.
///
/// One engine processes every page of a document in order. Fonts are
/// cached across pages and the extraction rank keeps counting.
pub struct Engine<'d, 's> {
    pub(crate) doc: &'d Document,
    options: &'s ExtractOptions,
    sink: &'s mut dyn ContentHandler,
    pub(crate) state: EngineState<'d>,
    fonts: HashMap<FontKey, Arc<LoadedFont>>,
    next_rank: u64,
    counters: PageCounters,
    /// Operator being executed and its index in the current stream.
    operator: (&'static str, usize),
}

impl<'d, 's> Engine<'d, 's> {
    pub fn new(
        doc: &'d Document,
        options: &'s ExtractOptions,
        sink: &'s mut dyn ContentHandler,
    ) -> Self {
        Self {
            doc,
            options,
            sink,
            state: EngineState::new(0, Rectangle::EMPTY, &*EMPTY_RESOURCES),
            fonts: HashMap::new(),
            next_rank: 0,
            counters: PageCounters::default(),
            operator: ("", 0),
        }
    }

    /// Interpret one page.
    ///
    /// `media_box` sizes the page; `crop_box` seeds the clip box.
    pub fn process_page(
        &mut self,
        number: u32,
        media_box: Rectangle,
        crop_box: Rectangle,
        resources: &'d Dictionary,
        content: &[u8],
    ) {
        self.state = EngineState::new(number, crop_box, resources);
        self.counters = PageCounters::default();
        self.sink
            .on_page_start(number, media_box.width(), media_box.height());

        self.run(content);

        debug!(
            page = number,
            operators = self.counters.operators,
            characters = self.counters.characters,
            figures = self.counters.figures,
            shapes = self.counters.shapes,
            warnings = self.counters.warnings,
            "page interpreted"
        );
        self.sink.on_page_end(number);
    }

    /// Dispatch loop. A lexer error ends the stream; whatever was
    /// extracted before it stays.
    fn run(&mut self, content: &[u8]) {
        let saved_operator = self.operator;
        let mut operands: Vec<Operand> = Vec::new();
        let mut index = 0;

        for token in ContentLexer::new(content) {
            match token {
                Ok(Token::Operand(operand)) => operands.push(operand),
                Ok(Token::Operator(name)) => {
                    self.dispatch(&name, &operands, index);
                    operands.clear();
                    index += 1;
                }
                Ok(Token::InlineImage(image)) => {
                    let args = [
                        Operand::Dictionary(image.dict),
                        Operand::LiteralString(image.data),
                    ];
                    self.dispatch("BI", &args, index);
                    operands.clear();
                    index += 1;
                }
                Err(e) => {
                    self.operator = ("", index);
                    warn!(page = self.state.page_number, error = %e, "content stream truncated");
                    self.warn(ExtractWarning::with_code(
                        ExtractWarningCode::MalformedObject,
                        format!("content stream ends early: {e}"),
                    ));
                    break;
                }
            }
        }
        self.operator = saved_operator;
    }

    fn dispatch(&mut self, name: &str, operands: &[Operand], index: usize) {
        let Some((mnemonic, handler)) = operators::lookup(name) else {
            trace!(operator = name, "unknown operator skipped");
            return;
        };
        self.operator = (mnemonic, index);
        self.counters.operators += 1;
        if let Err(e) = handler(self, operands) {
            self.report(e);
        }
    }

    /// Log an operator failure and record it as a warning.
    pub(crate) fn report(&mut self, error: BackendError) {
        let (operator, index) = self.operator;
        warn!(
            page = self.state.page_number,
            operator,
            index,
            error = %error,
            "operator failed"
        );
        let code = match &error {
            BackendError::Interpreter(_) => ExtractWarningCode::ResourceLimitReached,
            _ => ExtractWarningCode::MalformedOperator,
        };
        self.warn(ExtractWarning::with_code(code, error.to_string()));
    }

    /// Forward a warning to the handler with page and operator context.
    pub(crate) fn warn(&mut self, mut warning: ExtractWarning) {
        self.counters.warnings += 1;
        if !self.options.collect_warnings {
            return;
        }
        if warning.page.is_none() && self.state.page_number > 0 {
            warning = warning.on_page(self.state.page_number);
        }
        let (operator, index) = self.operator;
        if warning.operator.is_none() && !operator.is_empty() {
            warning = warning.with_operator_context(operator, index);
        }
        self.sink.on_warning(warning);
    }

    // --- Nested scopes ---

    fn enter_scope(&mut self, resources: &'d Dictionary) -> Snapshot<'d> {
        let top = self.state.graphics.current().clone();
        let snapshot = Snapshot {
            graphics: std::mem::replace(&mut self.state.graphics, GraphicsStack::new(top)),
            path: std::mem::take(&mut self.state.path),
            text: self.state.text,
            initial_matrix: self.state.initial_matrix,
            resources: std::mem::replace(&mut self.state.resources, resources),
            in_type3: self.state.in_type3,
            type3_glyph_bbox: self.state.type3_glyph_bbox.take(),
        };
        self.state.depth += 1;
        snapshot
    }

    fn leave_scope(&mut self, snapshot: Snapshot<'d>) {
        self.state.graphics = snapshot.graphics;
        self.state.path = snapshot.path;
        self.state.text = snapshot.text;
        self.state.initial_matrix = snapshot.initial_matrix;
        self.state.resources = snapshot.resources;
        self.state.in_type3 = snapshot.in_type3;
        self.state.type3_glyph_bbox = snapshot.type3_glyph_bbox;
        self.state.depth -= 1;
    }

    fn check_depth(&self, what: &str) -> Result<(), BackendError> {
        if self.state.depth >= self.options.max_recursion_depth {
            return Err(BackendError::Interpreter(format!(
                "{what} nested deeper than {} levels",
                self.options.max_recursion_depth
            )));
        }
        Ok(())
    }

    /// Run a Form XObject in its own scope.
    pub(crate) fn process_form(&mut self, stream: &'d Stream) -> Result<(), BackendError> {
        self.check_depth("Form XObject")?;
        let doc = self.doc;
        let content = decode_stream(stream)?;
        let resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_dict().ok())
            .unwrap_or(self.state.page_resources);
        let matrix = stream_matrix(doc, &stream.dict);

        let snapshot = self.enter_scope(resources);
        self.state.current_mut().concat_matrix(&matrix);
        self.state.initial_matrix = self.state.current().ctm;
        self.run(&content);
        self.leave_scope(snapshot);
        Ok(())
    }

    /// Run the glyph procedure for `code` with rendering matrix `trm`.
    ///
    /// Returns the device-space box declared by `d1`, if any.
    fn process_type3_glyph(
        &mut self,
        glyphs: &Type3Glyphs,
        code: u32,
        trm: Ctm,
    ) -> Result<Option<Rectangle>, BackendError> {
        let Some(proc_id) = glyphs.glyph_proc(code) else {
            return Ok(None);
        };
        self.check_depth("Type3 glyph procedure")?;
        let doc = self.doc;
        let stream = doc.get_object(proc_id)?.as_stream()?;
        let content = decode_stream(stream)?;
        let resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_dict().ok())
            .or_else(|| glyphs.resources.and_then(|loc| loc.resolve(doc)))
            .unwrap_or(self.state.resources);

        let snapshot = self.enter_scope(resources);
        let ctm = glyphs.font_matrix.concat(&trm);
        self.state.current_mut().ctm = ctm;
        self.state.initial_matrix = ctm;
        self.state.text = Some(TextMatrices::identity());
        self.state.in_type3 = true;
        self.run(&content);
        let declared = self.state.type3_glyph_bbox.take();
        self.leave_scope(snapshot);
        Ok(declared)
    }

    // --- Fonts ---

    /// `Tf`: select the font named `name` in the current resources.
    ///
    /// A font that is missing or fails to load leaves the size set and the
    /// font unset, with a warning.
    pub(crate) fn select_font(&mut self, name: &str, size: f64) {
        let doc = self.doc;
        let entry = self
            .state
            .resources
            .get(b"Font")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_dict().ok())
            .and_then(|fonts| fonts.get(name.as_bytes()).ok());
        let font = match entry {
            Some(entry) => self.font_or_warn(entry, name),
            None => {
                self.missing_font(name, format!("font /{name} not found in resources"));
                None
            }
        };
        self.set_font(font, name, size);
    }

    /// Select a font given by reference, as in an ExtGState `/Font` entry.
    pub(crate) fn select_font_object(&mut self, entry: &'d Object, size: f64) {
        let name = match entry {
            Object::Reference((num, generation)) => format!("{num} {generation} R"),
            _ => "ExtGState font".to_string(),
        };
        let font = self.font_or_warn(entry, &name);
        self.set_font(font, &name, size);
    }

    fn set_font(&mut self, font: Option<Arc<LoadedFont>>, name: &str, size: f64) {
        let text = &mut self.state.current_mut().text;
        text.font = font;
        text.font_resource = Some(name.to_string());
        text.font_size = size;
    }

    fn font_or_warn(&mut self, entry: &'d Object, name: &str) -> Option<Arc<LoadedFont>> {
        match self.load_font(entry, name) {
            Ok(font) => Some(font),
            Err(e) => {
                self.missing_font(name, format!("failed to load font /{name}: {e}"));
                None
            }
        }
    }

    fn missing_font(&mut self, name: &str, description: String) {
        warn!(page = self.state.page_number, font = name, "{description}");
        self.warn(
            ExtractWarning::with_code(ExtractWarningCode::MissingFont, description).with_font(name),
        );
    }

    fn load_font(
        &mut self,
        entry: &'d Object,
        resource_name: &str,
    ) -> Result<Arc<LoadedFont>, BackendError> {
        let doc = self.doc;
        let (key, id, dict) = match entry {
            Object::Reference(id) => (FontKey::Ref(*id), Some(*id), doc.get_dictionary(*id)?),
            Object::Dictionary(dict) => (
                FontKey::Inline(std::ptr::from_ref(dict) as usize),
                None,
                dict,
            ),
            other => {
                return Err(BackendError::Font(format!(
                    "expected a font dictionary, got {other:?}"
                )));
            }
        };
        if let Some(font) = self.fonts.get(&key) {
            return Ok(Arc::clone(font));
        }
        let font = Arc::new(LoadedFont::load(doc, dict, id, resource_name)?);
        self.fonts.insert(key, Arc::clone(&font));
        Ok(font)
    }

    // --- Text ---

    /// Show a string with the current font, emitting one character per glyph.
    pub(crate) fn show_text(&mut self, op: &str, bytes: &[u8]) -> Result<(), BackendError> {
        if self.state.text.is_none() {
            return Err(BackendError::operator(op, "text shown outside BT/ET"));
        }
        let params = self.state.current().text.clone();
        let Some(font) = params.font.clone() else {
            let reason = match &params.font_resource {
                Some(name) => format!("selected font {name} is not usable"),
                None => "no font selected".to_string(),
            };
            return Err(BackendError::operator(op, reason));
        };
        let size = params.font_size;
        let h_scale = params.h_scaling_normalized();
        let font_space = Ctm::new(size * h_scale, 0.0, 0.0, size, 0.0, params.rise);

        for glyph in font.decode(bytes) {
            let Some(matrices) = self.state.text else {
                break;
            };
            let trm = font_space
                .concat(&matrices.text_matrix)
                .concat(&self.state.current().ctm);

            let declared = match font.type3_glyphs() {
                Some(glyphs) => match self.process_type3_glyph(glyphs, glyph.code, trm) {
                    Ok(bbox) => bbox,
                    Err(e) => {
                        self.report(e);
                        None
                    }
                },
                None => None,
            };
            let bbox = declared
                .unwrap_or_else(|| glyph_box(&trm, glyph.width, font.descent, font.ascent));
            let mut advance = glyph.width * size + params.char_spacing;
            if glyph.is_word_space() {
                advance += params.word_spacing;
            }
            let effective_size = size * matrices.text_matrix.scaling_factor_x().abs();
            self.emit_character(glyph.text, bbox, &font, effective_size);
            if let Some(matrices) = self.state.text.as_mut() {
                matrices.advance(advance * h_scale);
            }
        }
        Ok(())
    }

    /// A number inside a `TJ` array, in thousandths of text space.
    pub(crate) fn adjust_text(&mut self, op: &str, amount: f64) -> Result<(), BackendError> {
        let params = &self.state.current().text;
        let tx = -amount / 1000.0 * params.font_size * params.h_scaling_normalized();
        let matrices = self
            .state
            .text
            .as_mut()
            .ok_or_else(|| BackendError::operator(op, "text shown outside BT/ET"))?;
        matrices.advance(tx);
        Ok(())
    }

    // --- Painting ---

    /// Emit a painted path as a shape and consume the pending clip.
    pub(crate) fn paint_path(&mut self, painted: PaintedPath) {
        let bounds = painted.bounds();
        let state = self.state.current_mut();
        state.apply_pending_clip(bounds);
        let Some(rect) = bounds else {
            return;
        };
        let color = if painted.operation.uses_stroking_color() {
            state.stroking_color
        } else {
            state.non_stroking_color
        };
        self.emit_shape(rect, color);
    }

    /// Classify an image XObject or inline image and emit it.
    pub(crate) fn paint_image(&mut self, stream: &Stream) {
        let doc = self.doc;
        let state = self.state.current();
        let metadata: ImageMetadata = image_metadata(doc, &stream.dict);
        let bounds = figure_bounds(&state.ctm, &metadata);
        match classify_image(doc, stream, self.state.resources, state.non_stroking_color) {
            ImageAppearance::Uniform(color) => self.emit_shape(bounds, color),
            ImageAppearance::Varied => self.emit_figure(bounds),
            ImageAppearance::Undecodable(reason) => {
                debug!(page = self.state.page_number, %reason, "image kept as figure");
                self.emit_figure(bounds);
            }
        }
    }

    // --- Emission ---

    fn position(&self, rect: Rectangle) -> PdfPosition {
        PdfPosition::new(
            self.state.page_number,
            rect.rounded(self.options.floating_point_precision),
        )
    }

    fn emit_character(&mut self, text: String, bbox: Rectangle, font: &LoadedFont, size: f64) {
        let character = PdfCharacter {
            text,
            position: self.position(bbox),
            font_face: PdfFontFace::new(
                Arc::clone(&font.font),
                round_to(size, self.options.floating_point_precision),
            ),
            color: self.state.current().non_stroking_color,
            extraction_rank: self.next_rank,
        };
        self.next_rank += 1;
        self.counters.characters += 1;
        self.sink.on_character(character);
    }

    fn emit_shape(&mut self, rect: Rectangle, color: PdfColor) {
        let shape = PdfShape::new(self.position(rect), color);
        self.counters.shapes += 1;
        self.sink.on_shape(shape);
    }

    fn emit_figure(&mut self, rect: Rectangle) {
        let figure = PdfFigure::new(self.position(rect));
        self.counters.figures += 1;
        self.sink.on_figure(figure);
    }
}

/// Image of `[0, width] × [descent, ascent]` under the rendering matrix.
fn glyph_box(trm: &Ctm, width: f64, descent: f64, ascent: f64) -> Rectangle {
    Rectangle::from_points(
        [
            Point::new(0.0, descent),
            Point::new(width, descent),
            Point::new(0.0, ascent),
            Point::new(width, ascent),
        ]
        .map(|p| trm.transform_point(p)),
    )
}

/// A stream's `/Matrix`, identity when absent or malformed.
fn stream_matrix(doc: &Document, dict: &Dictionary) -> Ctm {
    dict.get(b"Matrix")
        .ok()
        .and_then(|o| resolve_object(doc, o).as_array().ok())
        .and_then(|arr| {
            let values = arr
                .iter()
                .map(|o| object_to_f64(resolve_object(doc, o)))
                .collect::<Result<Vec<f64>, _>>()
                .ok()?;
            <[f64; 6]>::try_from(values).ok()
        })
        .map_or_else(Ctm::identity, Ctm::from_array)
}
