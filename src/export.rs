//! Export of the result view to a downloadable document.
//!
//! The view is rasterized into a bitmap (map, feature-importance pie and the
//! selected year's price chart) and embedded in a single-page PDF below the
//! text of the result page. The image is laid out at a fixed width; the page
//! grows when text and image do not fit on A4.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::f64::consts::TAU;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::app::ResultPage;
use crate::error::ExportError;
use crate::model::LatLng;
use crate::output::render_result;
use crate::view::{self, CITY_CENTER_MARKER, HOUSE_MARKER, MarkerStyle, RECOMMENDED_MARKER};

pub const REPORT_FILE_NAME: &str = "report.pdf";
pub const SNAPSHOT_FILE_NAME: &str = "report.png";

/// Snapshot size in pixels.
pub const DEFAULT_VIEW_SIZE: (u32, u32) = (1200, 900);

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const IMAGE_WIDTH_MM: f32 = 190.0;
const PT_PER_MM: f32 = 72.0 / 25.4;
const FONT_SIZE_PT: f32 = 9.0;
const LEADING_PT: f32 = 11.0;
const TEXT_GAP_MM: f32 = 5.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const PANEL: Rgb<u8> = Rgb([242, 244, 247]);
const FRAME: Rgb<u8> = Rgb([200, 204, 210]);
const ROUTE_LINE: Rgb<u8> = Rgb([40, 80, 220]);
const PREDICTED_LINE: Rgb<u8> = Rgb([220, 40, 40]);
const PIE_PALETTE: [[u8; 3]; 8] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [127, 127, 127],
];

/// Image placement on the page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub image_width: f32,
    pub image_height: f32,
    /// Height of the text block above the image, gap included.
    pub text_height: f32,
}

impl PageLayout {
    /// Scales an image of `width` x `height` pixels to the fixed print width.
    pub fn for_image(width: u32, height: u32) -> Self {
        Self::for_report(width, height, 0)
    }

    /// Layout for `text_lines` lines of text followed by the image.
    pub fn for_report(width: u32, height: u32, text_lines: usize) -> Self {
        let image_height = height as f32 * IMAGE_WIDTH_MM / width as f32;
        let text_height = if text_lines == 0 {
            0.0
        } else {
            text_lines as f32 * LEADING_PT / PT_PER_MM + TEXT_GAP_MM
        };
        Self {
            page_width: PAGE_WIDTH_MM,
            page_height: PAGE_HEIGHT_MM.max(text_height + image_height + 2.0 * MARGIN_MM),
            image_width: IMAGE_WIDTH_MM,
            image_height,
            text_height,
        }
    }
}

/// Writes exports into one directory, one at a time.
pub struct Exporter {
    dir: PathBuf,
    view_size: (u32, u32),
    lock: Mutex<()>,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            view_size: DEFAULT_VIEW_SIZE,
            lock: Mutex::new(()),
        }
    }

    pub fn with_view_size(mut self, width: u32, height: u32) -> Self {
        self.view_size = (width, height);
        self
    }

    /// Rasterizes the page and saves it, with its text, as `report.pdf`.
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display()))]
    pub async fn export_current_view(&self, page: &ResultPage) -> Result<PathBuf, ExportError> {
        let _guard = self.lock.lock().await;
        let path = self.dir.join(REPORT_FILE_NAME);
        let (width, height) = self.view_size;
        let page = page.clone();

        let path = tokio::task::spawn_blocking(move || -> Result<PathBuf, ExportError> {
            let img = rasterize(&page, width, height)?;
            write_pdf(&img, &report_lines(&page), &path)?;
            Ok(path)
        })
        .await??;

        info!(path = %path.display(), "Report exported");
        Ok(path)
    }

    /// Saves the same snapshot as a PNG image.
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display()))]
    pub async fn export_snapshot(&self, page: &ResultPage) -> Result<PathBuf, ExportError> {
        let _guard = self.lock.lock().await;
        let path = self.dir.join(SNAPSHOT_FILE_NAME);
        let (width, height) = self.view_size;
        let page = page.clone();

        let path = tokio::task::spawn_blocking(move || -> Result<PathBuf, ExportError> {
            rasterize(&page, width, height)?.save(&path)?;
            Ok(path)
        })
        .await??;

        info!(path = %path.display(), "Snapshot exported");
        Ok(path)
    }
}

/// Draws the result view into a bitmap.
pub fn rasterize(page: &ResultPage, width: u32, height: u32) -> Result<RgbImage, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyView { width, height });
    }

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let half_w = width / 2;
    let half_h = height / 2;

    draw_map(&mut img, page, Panel::new(0, 0, half_w, half_h));
    draw_pie(&mut img, page, Panel::new(half_w, 0, width - half_w, half_h));
    draw_chart(&mut img, page, Panel::new(0, half_h, width, height - half_h));

    debug!(width, height, "View rasterized");
    Ok(img)
}

#[derive(Debug, Clone, Copy)]
struct Panel {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl Panel {
    const PAD: u32 = 16;

    fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Drawing area inside the padding, if any is left.
    fn inner(&self) -> Option<Panel> {
        (self.w > 2 * Self::PAD && self.h > 2 * Self::PAD).then(|| Panel {
            x: self.x + Self::PAD,
            y: self.y + Self::PAD,
            w: self.w - 2 * Self::PAD,
            h: self.h - 2 * Self::PAD,
        })
    }

    fn rect(&self) -> Rect {
        Rect::at(self.x as i32, self.y as i32).of_size(self.w, self.h)
    }
}

fn rgb(style: &MarkerStyle) -> Rgb<u8> {
    Rgb(style.rgb)
}

fn draw_map(img: &mut RgbImage, page: &ResultPage, panel: Panel) {
    let Some(area) = panel.inner() else {
        return;
    };
    draw_filled_rect_mut(img, area.rect(), PANEL);
    draw_hollow_rect_mut(img, area.rect(), FRAME);

    let result = page.result();
    let comparables: Vec<LatLng> = page
        .markers()
        .iter()
        .map(|m| LatLng {
            lat: m.latitude,
            lng: m.longitude,
        })
        .collect();
    let all = [result.house_location, result.city_center_location];
    let Some((sw, ne)) = view::bounds(all.iter().chain(&comparables)) else {
        return;
    };

    let lat_span = (ne.lat - sw.lat).max(1e-3) * 1.2;
    let lng_span = (ne.lng - sw.lng).max(1e-3) * 1.2;
    let mid_lat = (ne.lat + sw.lat) / 2.0;
    let mid_lng = (ne.lng + sw.lng) / 2.0;
    let project = |p: &LatLng| -> (f32, f32) {
        let fx = (p.lng - mid_lng) / lng_span + 0.5;
        let fy = 0.5 - (p.lat - mid_lat) / lat_span;
        (
            area.x as f32 + (fx * area.w as f64) as f32,
            area.y as f32 + (fy * area.h as f64) as f32,
        )
    };

    let house = project(&result.house_location);
    let center = project(&result.city_center_location);
    draw_line_segment_mut(img, house, center, ROUTE_LINE);

    for p in &comparables {
        draw_marker(img, project(p), rgb(&RECOMMENDED_MARKER));
    }
    draw_marker(img, center, rgb(&CITY_CENTER_MARKER));
    draw_marker(img, house, rgb(&HOUSE_MARKER));
}

fn draw_marker(img: &mut RgbImage, (x, y): (f32, f32), color: Rgb<u8>) {
    draw_filled_circle_mut(img, (x as i32, y as i32), 7, Rgb([255, 255, 255]));
    draw_filled_circle_mut(img, (x as i32, y as i32), 5, color);
}

fn draw_pie(img: &mut RgbImage, page: &ResultPage, panel: Panel) {
    let Some(area) = panel.inner() else {
        return;
    };
    let shares = view::feature_shares(&page.result().feature_importance);
    let total: f64 = shares.iter().map(|(_, pct)| pct).sum();
    if shares.is_empty() || total == 0.0 {
        return;
    }

    // Cumulative share boundaries, clockwise from twelve o'clock.
    let mut bounds = Vec::with_capacity(shares.len());
    let mut acc = 0.0;
    for (_, pct) in &shares {
        acc += pct / total;
        bounds.push(acc);
    }

    let radius = (area.w.min(area.h) / 2) as f64;
    let hole = radius * 0.3;
    let cx = area.x as f64 + area.w as f64 / 2.0;
    let cy = area.y as f64 + area.h as f64 / 2.0;

    for py in area.y..area.y + area.h {
        for px in area.x..area.x + area.w {
            let dx = px as f64 + 0.5 - cx;
            let dy = py as f64 + 0.5 - cy;
            let dist = dx.hypot(dy);
            if dist > radius || dist < hole {
                continue;
            }
            let turn = (dx.atan2(-dy) + TAU) % TAU / TAU;
            let slice = bounds.iter().position(|b| turn <= *b).unwrap_or(bounds.len() - 1);
            img.put_pixel(px, py, Rgb(PIE_PALETTE[slice % PIE_PALETTE.len()]));
        }
    }
}

fn draw_chart(img: &mut RgbImage, page: &ResultPage, panel: Panel) {
    // Nothing is drawn, not even a frame, without data for the selected year.
    let Some(series) = page.chart() else {
        return;
    };
    let Some(area) = panel.inner() else {
        return;
    };
    draw_hollow_rect_mut(img, area.rect(), FRAME);

    let predicted = page.result().predicted_price;
    let lo = series.prices.iter().copied().fold(predicted, f64::min);
    let hi = series.prices.iter().copied().fold(predicted, f64::max);
    let span = if hi > lo { hi - lo } else { hi.abs().max(1.0) };
    let lo = lo - span * 0.1;
    let span = span * 1.2;

    let n = series.prices.len();
    let x_at = |i: usize| -> f32 {
        let step = area.w as f32 / n as f32;
        area.x as f32 + step * (i as f32 + 0.5)
    };
    let y_at = |v: f64| -> f32 { area.y as f32 + ((1.0 - (v - lo) / span) * area.h as f64) as f32 };

    // Predicted price as a dotted reference line.
    let y = y_at(predicted);
    let mut x = area.x as f32;
    let right = (area.x + area.w) as f32;
    while x < right {
        draw_line_segment_mut(img, (x, y), ((x + 6.0).min(right), y), PREDICTED_LINE);
        x += 12.0;
    }

    let points: Vec<(f32, f32)> = series
        .prices
        .iter()
        .enumerate()
        .map(|(i, v)| (x_at(i), y_at(*v)))
        .collect();
    for pair in points.windows(2) {
        draw_line_segment_mut(img, pair[0], pair[1], ROUTE_LINE);
    }
    for (x, y) in points {
        draw_filled_circle_mut(img, (x as i32, y as i32), 4, ROUTE_LINE);
    }
}

/// Text printed above the snapshot: the result page as rendered for the
/// terminal.
pub fn report_lines(page: &ResultPage) -> Vec<String> {
    render_result(page).lines().map(str::to_string).collect()
}

/// Writes `lines` and the bitmap below them into a one-page PDF at `path`.
pub fn write_pdf(img: &RgbImage, lines: &[String], path: &Path) -> Result<(), ExportError> {
    let bytes = pdf_bytes(img, lines)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Encodes text for a WinAnsi font. Characters outside Latin-1 become `?`.
fn win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| {
            u8::try_from(c)
                .ok()
                .filter(|b| !(0x80..0xa0).contains(b))
                .unwrap_or(b'?')
        })
        .collect()
}

fn pdf_bytes(img: &RgbImage, lines: &[String]) -> Result<Vec<u8>, ExportError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyView { width, height });
    }
    let layout = PageLayout::for_report(width, height, lines.len());

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(img.as_raw())?;
    let pixels = encoder.finish()?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        pixels,
    ));

    let page_w = layout.page_width * PT_PER_MM;
    let page_h = layout.page_height * PT_PER_MM;
    let img_w = layout.image_width * PT_PER_MM;
    let img_h = layout.image_height * PT_PER_MM;
    let x = MARGIN_MM * PT_PER_MM;
    let top = page_h - MARGIN_MM * PT_PER_MM;
    let y = top - layout.text_height * PT_PER_MM - img_h;

    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![img_w.into(), 0.into(), 0.into(), img_h.into(), x.into(), y.into()],
        ),
        Operation::new("Do", vec!["Im0".into()]),
        Operation::new("Q", vec![]),
    ];
    if !lines.is_empty() {
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE_PT.into()]),
            Operation::new("TL", vec![LEADING_PT.into()]),
            Operation::new("Td", vec![x.into(), (top - FONT_SIZE_PT).into()]),
        ]);
        for line in lines {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(win_ansi(line))],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
            "Font" => dictionary! {
                "F1" => font_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal("vanga_predict"),
        "CreationDate" => Object::string_literal(
            chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
        ),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
