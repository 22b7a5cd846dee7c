use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

// Average sans-serif advance per unit of font size when no font resolves.
const FALLBACK_ADVANCE: f32 = 0.56;
const ELLIPSIS: char = '…';

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

fn text_width(text: &str, font_size: f32, font_family: &str) -> f32 {
    measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| text.chars().count() as f32 * font_size * FALLBACK_ADVANCE)
}

pub fn fit_to_width(text: &str, max_width: f32, font_size: f32, font_family: &str) -> String {
    if text_width(text, font_size, font_family) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut keep = chars.len();
    while keep > 0 {
        keep -= 1;
        let mut candidate: String = chars[..keep].iter().collect::<String>().trim_end().to_string();
        candidate.push(ELLIPSIS);
        if text_width(&candidate, font_size, font_family) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontMetrics>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let metrics = self.load(font_family);
            self.faces.insert(key.clone(), metrics);
        }
        self.faces.get(&key)?.as_ref()?.width(text, font_size)
    }

    fn load(&mut self, font_family: &str) -> Option<FontMetrics> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let id = self.db.query(&Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        })?;
        self.db
            .with_face_data(id, |data, index| FontMetrics::parse(data.to_vec(), index))
            .flatten()
    }
}

struct FontMetrics {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascii_advances: [u16; 128],
}

impl FontMetrics {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        let units_per_em = f32::from(face.units_per_em().max(1));
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
        })
    }

    fn width(&self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * FALLBACK_ADVANCE;
        let face = if text.is_ascii() {
            None
        } else {
            Some(Face::parse(&self.data, self.index).ok()?)
        };

        let mut width = 0.0f32;
        for ch in text.chars() {
            let advance = if ch.is_ascii() {
                self.ascii_advances[ch as usize]
            } else {
                face.as_ref()
                    .and_then(|face| face.glyph_index(ch))
                    .and_then(|glyph| face.as_ref()?.glyph_hor_advance(glyph))
                    .unwrap_or(0)
            };
            width += if advance == 0 {
                fallback
            } else {
                f32::from(advance) * scale
            };
        }
        Some(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_width() {
        assert_eq!(measure_text_width("", 16.0, "sans-serif"), Some(0.0));
    }

    #[test]
    fn short_text_is_kept() {
        assert_eq!(fit_to_width("Intro", 1000.0, 14.0, "sans-serif"), "Intro");
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let text = "A very long section heading that cannot possibly fit";
        let fitted = fit_to_width(text, 80.0, 14.0, "sans-serif");
        assert!(fitted.ends_with(ELLIPSIS));
        assert!(fitted.chars().count() < text.chars().count());
    }
}
