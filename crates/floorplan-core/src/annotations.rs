//! Free-floating images and text notes placed on top of the plan.
//!
//! Annotations have no relationship with the wall graph.

use kurbo::{Affine, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;
use uuid::Uuid;

/// Unique identifier for an annotation image.
pub type ImageId = Uuid;
/// Unique identifier for an annotation text.
pub type TextId = Uuid;

/// Smallest width or height an image can be resized to.
pub const MIN_IMAGE_SIZE: f64 = 20.0;

pub const DEFAULT_FONT_SIZE: f64 = 18.0;
pub const DEFAULT_FONT_FAMILY: &str = "Inter, sans-serif";
pub const DEFAULT_TEXT_WIDTH: f64 = 200.0;
pub const DEFAULT_TEXT: &str = "Double-click to edit";
/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.2;
/// Titles longer than this are truncated in source labels.
const MAX_TITLE_CHARS: usize = 40;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Default text color (#1F2937).
    pub fn text_default() -> Self {
        Self::new(0x1F, 0x29, 0x37, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::text_default()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Where an image came from, when it was unfurled from a web page.
///
/// Purely informational; nothing in the engine depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ImageSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            description: None,
        }
    }

    /// Host of the source URL without a leading `www.`.
    pub fn domain(&self) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    /// Short label: truncated title and domain.
    pub fn label(&self) -> String {
        let domain = self.domain().unwrap_or_default();
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => {
                let title = if title.chars().count() > MAX_TITLE_CHARS {
                    let head: String = title.chars().take(MAX_TITLE_CHARS).collect();
                    format!("{}...", head)
                } else {
                    title.to_string()
                };
                if domain.is_empty() {
                    title
                } else {
                    format!("{} · {}", title, domain)
                }
            }
            None => domain,
        }
    }
}

/// A raster image placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationImage {
    pub id: ImageId,
    /// Image URL or data URL.
    pub src: String,
    /// Top-left corner, also the rotation origin.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees about `position`.
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ImageSource>,
}

impl AnnotationImage {
    /// Unrotated bounds.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hit_rotated_rect(self.rect(), self.position, self.rotation, point, tolerance)
    }
}

/// A text note placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationText {
    pub id: TextId,
    pub text: String,
    pub position: Point,
    pub font_size: f64,
    pub font_family: String,
    pub fill: SerializableColor,
    /// Wrapping width.
    pub width: f64,
    /// Rotation in degrees about `position`.
    pub rotation: f64,
}

impl AnnotationText {
    /// Approximate unrotated bounds, one line per `\n`.
    pub fn rect(&self) -> Rect {
        let lines = self.text.lines().count().max(1) as f64;
        let height = lines * self.font_size * LINE_HEIGHT;
        Rect::from_origin_size(self.position, (self.width, height))
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hit_rotated_rect(self.rect(), self.position, self.rotation, point, tolerance)
    }
}

fn hit_rotated_rect(rect: Rect, origin: Point, rotation_deg: f64, point: Point, tolerance: f64) -> bool {
    let local = if rotation_deg.abs() < 1e-9 {
        point
    } else {
        Affine::rotate_about(-rotation_deg.to_radians(), origin) * point
    };
    rect.inflate(tolerance, tolerance).contains(local)
}

/// Partial update for an image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageUpdate {
    pub src: Option<String>,
    pub position: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub source: Option<ImageSource>,
}

/// Partial update for a text note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextUpdate {
    pub text: Option<String>,
    pub position: Option<Point>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub fill: Option<SerializableColor>,
    pub width: Option<f64>,
    pub rotation: Option<f64>,
}

/// Plain serializable form of the annotation store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationState {
    pub images: Vec<AnnotationImage>,
    pub texts: Vec<AnnotationText>,
}

/// Owns all annotation images and texts.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    images: HashMap<ImageId, AnnotationImage>,
    image_order: Vec<ImageId>,
    texts: HashMap<TextId, AnnotationText>,
    text_order: Vec<TextId>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, src: impl Into<String>, position: Point, width: f64, height: f64) -> ImageId {
        let id = Uuid::new_v4();
        self.images.insert(
            id,
            AnnotationImage {
                id,
                src: src.into(),
                position,
                width: width.max(MIN_IMAGE_SIZE),
                height: height.max(MIN_IMAGE_SIZE),
                rotation: 0.0,
                source: None,
            },
        );
        self.image_order.push(id);
        id
    }

    pub fn remove_image(&mut self, id: ImageId) {
        if self.images.remove(&id).is_some() {
            self.image_order.retain(|&i| i != id);
        }
    }

    pub fn update_image(&mut self, id: ImageId, update: ImageUpdate) {
        let Some(image) = self.images.get_mut(&id) else {
            return;
        };
        if let Some(src) = update.src {
            image.src = src;
        }
        if let Some(position) = update.position {
            image.position = position;
        }
        if let Some(width) = update.width {
            image.width = width;
        }
        if let Some(height) = update.height {
            image.height = height;
        }
        if let Some(rotation) = update.rotation {
            image.rotation = rotation;
        }
        if let Some(source) = update.source {
            image.source = Some(source);
        }
    }

    /// Apply a resize/rotate gesture, keeping the image at least
    /// [`MIN_IMAGE_SIZE`] on each side.
    pub fn transform_image(&mut self, id: ImageId, rect: Rect, rotation: f64) {
        if let Some(image) = self.images.get_mut(&id) {
            image.position = rect.origin();
            image.width = rect.width().max(MIN_IMAGE_SIZE);
            image.height = rect.height().max(MIN_IMAGE_SIZE);
            image.rotation = rotation;
        }
    }

    /// Add a text note with the default content and style.
    pub fn add_text(&mut self, position: Point) -> TextId {
        let id = Uuid::new_v4();
        self.texts.insert(
            id,
            AnnotationText {
                id,
                text: DEFAULT_TEXT.to_string(),
                position,
                font_size: DEFAULT_FONT_SIZE,
                font_family: DEFAULT_FONT_FAMILY.to_string(),
                fill: SerializableColor::text_default(),
                width: DEFAULT_TEXT_WIDTH,
                rotation: 0.0,
            },
        );
        self.text_order.push(id);
        id
    }

    /// Apply a resize/rotate gesture to a text box. Width keeps the same
    /// minimum as images; the height follows the content.
    pub fn transform_text(&mut self, id: TextId, position: Point, width: f64, rotation: f64) {
        if let Some(text) = self.texts.get_mut(&id) {
            text.position = position;
            text.width = width.max(MIN_IMAGE_SIZE);
            text.rotation = rotation;
        }
    }

    pub fn remove_text(&mut self, id: TextId) {
        if self.texts.remove(&id).is_some() {
            self.text_order.retain(|&t| t != id);
        }
    }

    pub fn update_text(&mut self, id: TextId, update: TextUpdate) {
        let Some(text) = self.texts.get_mut(&id) else {
            return;
        };
        if let Some(content) = update.text {
            text.text = content;
        }
        if let Some(position) = update.position {
            text.position = position;
        }
        if let Some(font_size) = update.font_size {
            text.font_size = font_size;
        }
        if let Some(font_family) = update.font_family {
            text.font_family = font_family;
        }
        if let Some(fill) = update.fill {
            text.fill = fill;
        }
        if let Some(width) = update.width {
            text.width = width;
        }
        if let Some(rotation) = update.rotation {
            text.rotation = rotation;
        }
    }

    pub fn image(&self, id: ImageId) -> Option<&AnnotationImage> {
        self.images.get(&id)
    }

    pub fn text(&self, id: TextId) -> Option<&AnnotationText> {
        self.texts.get(&id)
    }

    pub fn images(&self) -> impl Iterator<Item = &AnnotationImage> {
        self.image_order.iter().filter_map(|id| self.images.get(id))
    }

    pub fn texts(&self) -> impl Iterator<Item = &AnnotationText> {
        self.text_order.iter().filter_map(|id| self.texts.get(id))
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.texts.is_empty()
    }

    pub fn to_state(&self) -> AnnotationState {
        AnnotationState {
            images: self.images().cloned().collect(),
            texts: self.texts().cloned().collect(),
        }
    }

    pub fn from_state(state: &AnnotationState) -> Self {
        let mut store = Self::new();
        for image in &state.images {
            if store.images.insert(image.id, image.clone()).is_none() {
                store.image_order.push(image.id);
            }
        }
        for text in &state.texts {
            if store.texts.insert(text.id, text.clone()).is_none() {
                store.text_order.push(text.id);
            }
        }
        store
    }
}

/// Whether `text` is an http(s) URL.
pub fn is_url(text: &str) -> bool {
    Url::parse(text.trim())
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Whether `text` is a URL whose path looks like an image file.
pub fn is_image_url(text: &str) -> bool {
    const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];
    match Url::parse(text.trim()) {
        Ok(url) => {
            let path = url.path().to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        }
        Err(_) => false,
    }
}
