use std::num::NonZeroUsize;
use std::path::Path;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight, fontdb};
use lru::LruCache;
use parking_lot::Mutex;

/// Titles come from request input, so measurements are kept in a bounded LRU.
const MAX_CACHED_MEASUREMENTS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(511);

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    is_bold: bool,
}

/// Measures the extent of a single line of sans-serif text.
///
/// Takes `&self` so one measurer can back concurrent render calls.
pub trait TextMeasure {
    fn measure_text(&self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32);
}

struct MeasureState {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, (f32, f32)>,
}

pub struct CosmicTextMeasure {
    state: Mutex<MeasureState>,
}

impl CosmicTextMeasure {
    pub fn with_fonts(fonts_dir: Option<&Path>, system_fonts: bool) -> Self {
        let mut db = fontdb::Database::new();
        if system_fonts {
            db.load_system_fonts();
        }
        if let Some(dir) = fonts_dir.filter(|dir| dir.is_dir()) {
            db.load_fonts_dir(dir);
        }

        let sans = preferred_sans_family(
            db.faces()
                .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
        )
        .map(str::to_owned);
        if let Some(family) = sans {
            db.set_sans_serif_family(family);
        }

        Self {
            state: Mutex::new(MeasureState {
                font_system: FontSystem::new_with_locale_and_db("en-US".to_string(), db),
                cache: LruCache::new(MAX_CACHED_MEASUREMENTS),
            }),
        }
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            is_bold,
        };

        let mut state = self.state.lock();
        if let Some(cached) = state.cache.get(&key) {
            return *cached;
        }

        let MeasureState { font_system, cache } = &mut *state;

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            font_system,
            Metrics {
                font_size,
                line_height,
            },
        );
        buffer.set_size(font_system, None, None);

        let attrs = Attrs::new().family(Family::SansSerif).weight(if is_bold {
            Weight::BOLD
        } else {
            Weight::NORMAL
        });
        buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);

        let mut total_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;
        for run in buffer.layout_runs() {
            total_width = total_width.max(run.line_w);
            total_height += run.line_height;
        }

        let measured = (total_width, total_height);
        cache.put(key, measured);
        measured
    }
}

/// The family `sans-serif` resolves to: the first non-monospace family with
/// "sans" in its name, else the first family loaded. Both the measurer and the
/// rasterizer use it so labels are measured in the face they are drawn with.
pub(crate) fn preferred_sans_family<'a>(
    families: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let mut first = None;
    for family in families {
        let lower = family.to_ascii_lowercase();
        if lower.contains("sans") && !lower.contains("mono") {
            return Some(family);
        }
        if first.is_none() {
            first = Some(family);
        }
    }
    first
}

/// Font-independent estimate: every character advances by a fixed share of
/// the font size. Layout stays reproducible on machines without fonts.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasure {
    pub advance_ratio: f32,
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn measure_text(&self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        let ratio = if is_bold {
            self.advance_ratio * 1.1
        } else {
            self.advance_ratio
        };
        let width = text.chars().count() as f32 * font_size * ratio;
        (width, font_size * 1.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sans_family_prefers_proportional_sans() {
        assert_eq!(
            preferred_sans_family(["Noto Serif", "DejaVu Sans Mono", "DejaVu Sans"]),
            Some("DejaVu Sans")
        );
        assert_eq!(preferred_sans_family(["Noto Serif", "Inter"]), Some("Noto Serif"));
        assert_eq!(preferred_sans_family([]), None);
    }

    #[test]
    fn measurement_cache_stays_bounded() {
        let measure = CosmicTextMeasure::with_fonts(None, false);
        let cap = MAX_CACHED_MEASUREMENTS.get();
        for i in 0..(cap * 2 + 7) {
            measure.measure_text(&format!("Asset {} Investment Projection", i), 16.0, true);
        }
        assert_eq!(measure.state.lock().cache.len(), cap);

        let first = measure.measure_text("Ethereum Investment Projection", 16.0, true);
        assert_eq!(
            measure.measure_text("Ethereum Investment Projection", 16.0, true),
            first
        );
    }

    #[test]
    fn fixed_advance_scales_with_length_and_size() {
        let measure = FixedAdvanceMeasure::default();
        let (w, h) = measure.measure_text("₹10L", 10.0, false);
        assert!((w - 24.0).abs() < 1e-4);
        assert!((h - 12.0).abs() < 1e-4);

        let (bold_w, _) = measure.measure_text("₹10L", 10.0, true);
        assert!(bold_w > w);
    }
}
