// bobabble/src/qr/render.rs

//! Rasterizes a QR symbol into PNG, JPEG or WebP bytes.
//!
//! Output is a pure function of the payload and the options. Sizing: with
//! `width` at least the symbol's module count plus both margins, the image is
//! `width` pixels square and each module spans `width / (modules + 2*margin)`
//! pixels. Otherwise each module is 4 pixels. `width` above [`MAX_WIDTH`] or
//! `margin` above [`MAX_MARGIN`] is rejected before any pixel is allocated.

use crate::error::QrError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const DEFAULT_SCALE: f64 = 4.0;

/// Largest accepted `width`, in pixels.
pub const MAX_WIDTH: u32 = 4096;
/// Largest accepted quiet zone, in modules.
pub const MAX_MARGIN: u32 = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
  L,
  #[default]
  M,
  Q,
  H,
}

impl ErrorCorrection {
  fn level(self) -> EcLevel {
    match self {
      ErrorCorrection::L => EcLevel::L,
      ErrorCorrection::M => EcLevel::M,
      ErrorCorrection::Q => EcLevel::Q,
      ErrorCorrection::H => EcLevel::H,
    }
  }

  fn letter(self) -> char {
    match self {
      ErrorCorrection::L => 'L',
      ErrorCorrection::M => 'M',
      ErrorCorrection::Q => 'Q',
      ErrorCorrection::H => 'H',
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
  #[default]
  Png,
  Jpeg,
  Webp,
}

impl ImageFormat {
  pub fn mime(self) -> &'static str {
    match self {
      ImageFormat::Png => "image/png",
      ImageFormat::Jpeg => "image/jpeg",
      ImageFormat::Webp => "image/webp",
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      ImageFormat::Png => "png",
      ImageFormat::Jpeg => "jpg",
      ImageFormat::Webp => "webp",
    }
  }
}

impl fmt::Display for ImageFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.extension())
  }
}

impl FromStr for ImageFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "png" | "image/png" => Ok(ImageFormat::Png),
      "jpg" | "jpeg" | "image/jpeg" => Ok(ImageFormat::Jpeg),
      "webp" | "image/webp" => Ok(ImageFormat::Webp),
      other => Err(format!("Unsupported image format '{}'", other)),
    }
  }
}

/// `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrColors {
  pub dark: String,
  pub light: String,
}

impl Default for QrColors {
  fn default() -> Self {
    Self {
      dark: "#000000".to_string(),
      light: "#FFFFFF".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
  pub error_correction: ErrorCorrection,
  pub format: ImageFormat,
  /// JPEG quality in `0.0..=1.0`. Ignored by the other formats.
  pub quality: f32,
  /// Quiet zone, in modules.
  pub margin: u32,
  pub colors: QrColors,
  /// Target image width in pixels.
  pub width: Option<u32>,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      error_correction: ErrorCorrection::M,
      format: ImageFormat::Png,
      quality: 0.92,
      margin: 4,
      colors: QrColors::default(),
      width: None,
    }
  }
}

impl RenderOptions {
  /// Full order payload: high error correction so a scuffed screen still scans.
  pub fn order_confirmation() -> Self {
    Self {
      error_correction: ErrorCorrection::H,
      margin: 2,
      colors: QrColors {
        dark: "#1A202C".to_string(),
        light: "#FFFFFF".to_string(),
      },
      width: Some(256),
      ..Self::default()
    }
  }

  /// Order-id-only fallback.
  pub fn simple_order() -> Self {
    Self {
      error_correction: ErrorCorrection::M,
      margin: 2,
      colors: QrColors {
        dark: "#7C3AED".to_string(),
        light: "#FFFFFF".to_string(),
      },
      width: Some(250),
      ..Self::default()
    }
  }

  pub fn with_format(mut self, format: ImageFormat) -> Self {
    self.format = format;
    self
  }
}

/// An encoded QR image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
  pub format: ImageFormat,
  /// Side length in pixels; images are square.
  pub width: u32,
  pub bytes: Vec<u8>,
}

impl RasterImage {
  pub fn mime(&self) -> &'static str {
    self.format.mime()
  }

  pub fn extension(&self) -> &'static str {
    self.format.extension()
  }

  /// `data:<mime>;base64,<bytes>`, suitable for an `<img src>`.
  pub fn to_data_url(&self) -> String {
    format!("data:{};base64,{}", self.mime(), STANDARD.encode(&self.bytes))
  }

  pub fn download_file_name(&self, order_id: &str) -> String {
    format!("bobabble-order-{}.{}", order_id, self.extension())
  }
}

pub(crate) fn parse_color(value: &str) -> Result<Rgba<u8>, QrError> {
  let invalid = || QrError::InvalidColor(value.to_string());
  let hex = value.strip_prefix('#').ok_or_else(invalid)?;
  if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
    return Err(invalid());
  }
  let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
  let alpha = if hex.len() == 8 { channel(6)? } else { u8::MAX };
  Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Encodes `payload` as a QR symbol and rasterizes it.
pub fn render(payload: &str, options: &RenderOptions) -> Result<RasterImage, QrError> {
  if !(0.0..=1.0).contains(&options.quality) {
    return Err(QrError::InvalidQuality(options.quality));
  }
  if options.margin > MAX_MARGIN {
    return Err(QrError::InvalidSize {
      field: "margin",
      value: options.margin,
      max: MAX_MARGIN,
    });
  }
  if let Some(width) = options.width.filter(|w| *w > MAX_WIDTH) {
    return Err(QrError::InvalidSize {
      field: "width",
      value: width,
      max: MAX_WIDTH,
    });
  }
  let dark = parse_color(&options.colors.dark)?;
  let light = parse_color(&options.colors.light)?;

  let level = options.error_correction;
  let code = QrCode::with_error_correction_level(payload.as_bytes(), level.level())
    .map_err(|source| QrError::Encode {
      level: level.letter(),
      source,
    })?;

  let canvas = rasterize(&code, options.margin, options.width, dark, light);
  let width = canvas.width();
  let bytes = encode_image(canvas, options)?;
  debug!(
    modules = code.width(),
    width,
    format = %options.format,
    bytes = bytes.len(),
    "Rendered QR image."
  );

  Ok(RasterImage {
    format: options.format,
    width,
    bytes,
  })
}

fn rasterize(code: &QrCode, margin: u32, width: Option<u32>, dark: Rgba<u8>, light: Rgba<u8>) -> RgbaImage {
  let modules = code.width();
  let colors = code.to_colors();
  // Bounded by MAX_MARGIN and the 177 module symbol limit.
  let span = (modules as u32).saturating_add(margin.saturating_mul(2));

  let (size, scale) = match width {
    Some(w) if w >= span => (w, f64::from(w) / f64::from(span)),
    _ => ((f64::from(span) * DEFAULT_SCALE) as u32, DEFAULT_SCALE),
  };
  let inset = f64::from(margin) * scale;
  let limit = f64::from(size) - inset;

  RgbaImage::from_fn(size, size, |x, y| {
    let (px, py) = (f64::from(x), f64::from(y));
    if px < inset || py < inset || px >= limit || py >= limit {
      return light;
    }
    let column = ((px - inset) / scale).floor() as usize;
    let row = ((py - inset) / scale).floor() as usize;
    let is_dark = column < modules
      && colors
        .get(row * modules + column)
        .is_some_and(|c| *c == Color::Dark);
    if is_dark {
      dark
    } else {
      light
    }
  })
}

fn encode_image(canvas: RgbaImage, options: &RenderOptions) -> Result<Vec<u8>, QrError> {
  let (width, height) = canvas.dimensions();
  let mut bytes = Vec::new();
  match options.format {
    ImageFormat::Png => {
      PngEncoder::new(&mut bytes).write_image(canvas.as_raw(), width, height, ExtendedColorType::Rgba8)?;
    }
    ImageFormat::Webp => {
      WebPEncoder::new_lossless(&mut bytes).write_image(canvas.as_raw(), width, height, ExtendedColorType::Rgba8)?;
    }
    ImageFormat::Jpeg => {
      // JPEG has no alpha channel.
      let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
      let quality = (options.quality * 100.0).round().clamp(1.0, 100.0) as u8;
      JpegEncoder::new_with_quality(&mut bytes, quality).write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
    }
  }
  Ok(bytes)
}
