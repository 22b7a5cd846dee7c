use serde::{Deserialize, Serialize};

/// Deepest level with its own visual treatment; deeper nodes reuse it.
pub const MAX_DISPLAY_LEVEL: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub line_color: String,
    pub border_color: String,
    pub background: String,
    /// Fill per display level, index 0 through `MAX_DISPLAY_LEVEL`.
    pub level_colors: Vec<String>,
    pub visual_color: String,
    pub placeholder_color: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 16.0,
            text_color: "#333333".to_string(),
            line_color: "#333333".to_string(),
            border_color: "#9370DB".to_string(),
            background: "#FFFFFF".to_string(),
            level_colors: vec![
                "#D6C8FF".to_string(),
                "#ECECFF".to_string(),
                "#FFFFDE".to_string(),
                "#E8F5E9".to_string(),
                "#FDEBD0".to_string(),
                "#F4F4F4".to_string(),
            ],
            visual_color: "#E3F2FD".to_string(),
            placeholder_color: "#F5F5F5".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            border_color: "#C7D2E5".to_string(),
            background: "#FFFFFF".to_string(),
            level_colors: vec![
                "#DCE6FF".to_string(),
                "#EEF2F8".to_string(),
                "#F8FAFF".to_string(),
                "#F3F7EE".to_string(),
                "#FFF7EC".to_string(),
                "#FFFFFF".to_string(),
            ],
            visual_color: "#EAF6FB".to_string(),
            placeholder_color: "#F7F7F7".to_string(),
        }
    }

    pub fn level_fill(&self, level: u32) -> &str {
        if self.level_colors.is_empty() {
            return self.background.as_str();
        }
        let idx = (level.min(MAX_DISPLAY_LEVEL) as usize).min(self.level_colors.len() - 1);
        self.level_colors[idx].as_str()
    }

    /// Font size shrinks a little per level so the title reads as a title.
    pub fn level_font_size(&self, level: u32) -> f32 {
        let level = level.min(MAX_DISPLAY_LEVEL) as f32;
        (self.font_size * (1.3 - level * 0.08)).max(self.font_size * 0.85)
    }
}
