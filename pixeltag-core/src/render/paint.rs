//! Paint callbacks
//!
//! A `Scene` is composed once per refresh and drawn on every page the
//! driver asks for.

use super::plan::PaintJob;
use crate::compose::{layout_qr, layout_text, qr_fallback, QrLayout, TextLayout, NO_INFO};
use crate::traits::{Color, FontRole, Glyphs, PaperDisplay, QrEncoder, Rect};

/// Composed content of one refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scene<'a> {
    Blank,
    Text(TextLayout<'a>),
    Qr(QrLayout),
}

impl Scene<'_> {
    /// Draw into the current page
    ///
    /// QR modules whose square would leave the panel are skipped.
    pub fn draw<D: PaperDisplay + ?Sized>(&self, display: &mut D) {
        match self {
            Scene::Blank => {}
            Scene::Text(layout) => {
                for line in layout.iter() {
                    display.draw_text(layout.role, line.x, line.baseline, line.text);
                }
            }
            Scene::Qr(layout) => {
                let panel = display.bounds();
                for module in layout.dark_modules() {
                    if panel.contains_rect(&module) {
                        display.fill_rect(module, Color::Black);
                    }
                }
            }
        }
    }

    pub fn is_fallback_text(&self, text: &str) -> bool {
        match self {
            Scene::Text(layout) => layout.iter().any(|l| l.text == text),
            _ => false,
        }
    }
}

/// Compose the scene for `job` inside `target`
///
/// QR failures fall back to a fixed message laid out in the same
/// rectangle. Info text without any visible line shows a placeholder.
pub fn compose_scene<'a, G, Q>(
    job: PaintJob,
    target: Rect,
    glyphs: &G,
    encoder: &mut Q,
    info: &'a str,
    qr: &'a str,
) -> Scene<'a>
where
    G: Glyphs + ?Sized,
    Q: QrEncoder + ?Sized,
{
    match job {
        PaintJob::Blank => Scene::Blank,
        PaintJob::Info => {
            let layout = layout_text(glyphs, FontRole::Body, info, target);
            if layout.is_empty() {
                Scene::Text(layout_text(glyphs, FontRole::Body, NO_INFO, target))
            } else {
                Scene::Text(layout)
            }
        }
        PaintJob::Qr => match layout_qr(encoder, qr, target) {
            Ok(layout) => Scene::Qr(layout),
            Err(e) => {
                warn!("QR layout failed: {}", e);
                Scene::Text(layout_text(glyphs, FontRole::Message, qr_fallback(e), target))
            }
        },
        PaintJob::Status(message) => {
            Scene::Text(layout_text(glyphs, FontRole::Message, message.text(), target))
        }
    }
}
