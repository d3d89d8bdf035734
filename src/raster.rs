use std::path::Path;
use std::sync::Arc;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::fonts::preferred_sans_family;

/// Turns a finished [`Canvas`] into PNG bytes.
///
/// The font database is loaded once and shared read-only between calls.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Rasterizer {
    pub fn new(fonts_dir: Option<&Path>, system_fonts: bool) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        if system_fonts {
            fontdb.load_system_fonts();
        }
        if let Some(dir) = fonts_dir.filter(|dir| dir.is_dir()) {
            fontdb.load_fonts_dir(dir);
        }

        configure_font_fallbacks(&mut fontdb);

        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// A rasterizer with no fonts at all; text elements render as nothing.
    pub fn without_fonts() -> Self {
        Self {
            fontdb: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    pub fn font_count(&self) -> usize {
        self.fontdb.len()
    }

    pub fn rasterize(&self, canvas: &Canvas) -> Result<Vec<u8>, RenderError> {
        let svg = canvas.to_svg();

        let mut opts = usvg::Options::default();
        opts.fontdb = Arc::clone(&self.fontdb);

        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| RenderError::failure("Failed to parse canvas SVG", e))?;

        let mut pixmap = Pixmap::new(canvas.width(), canvas.height()).ok_or_else(|| {
            RenderError::RenderFailure(format!(
                "Failed to create {}x{} pixmap",
                canvas.width(),
                canvas.height()
            ))
        })?;

        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| RenderError::failure("Failed to encode PNG", e))
    }
}

fn configure_font_fallbacks(fontdb: &mut usvg::fontdb::Database) {
    let sans = preferred_sans_family(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    )
    .map(str::to_owned);

    if let Some(family) = sans {
        fontdb.set_sans_serif_family(family);
    }
}

#[cfg(test)]
mod tests {
    use super::Rasterizer;
    use crate::canvas::{Canvas, PixelBox};

    #[test]
    fn rasterizes_to_png_of_canvas_size() {
        let mut canvas = Canvas::new(40, 30, "#0000ff");
        canvas.stroke_box(PixelBox::new(2, 2, 37, 27), "white", 2.0);

        let png = Rasterizer::without_fonts()
            .rasterize(&canvas)
            .expect("rasterize");

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let size = imagesize::blob_size(&png).expect("png header");
        assert_eq!((size.width, size.height), (40, 30));
    }

    #[test]
    fn rasterization_is_deterministic() {
        let mut canvas = Canvas::new(20, 20, "white");
        canvas.line((0.0, 10.0), (20.0, 10.0), "black", 2.0);

        let rasterizer = Rasterizer::without_fonts();
        let first = rasterizer.rasterize(&canvas).expect("first");
        let second = rasterizer.rasterize(&canvas).expect("second");
        assert_eq!(first, second);
    }
}
