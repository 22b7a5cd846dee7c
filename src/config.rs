use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Configuration may lower the pass count, never raise it.
pub const MAX_OPTIMIZER_PASSES: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    pub horizontal_spacing: f32,
    pub row_height: f32,
    pub visual_spacing: f32,
    pub depth_shrink: f32,
    pub depth_spacing_step: f32,
    pub visual_offset_divisor: f32,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 200.0,
            row_height: 150.0,
            visual_spacing: 80.0,
            depth_shrink: 0.7,
            depth_spacing_step: 0.1,
            visual_offset_divisor: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub enabled: bool,
    pub max_passes: usize,
    pub margin: f32,
    pub spacing_unit: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_passes: MAX_OPTIMIZER_PASSES,
            margin: 10.0,
            spacing_unit: 50.0,
        }
    }
}

impl OptimizerConfig {
    pub fn effective_passes(&self) -> usize {
        if !self.enabled {
            return 0;
        }
        self.max_passes.min(MAX_OPTIMIZER_PASSES)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    pub char_width: f32,
    pub heading_char_width: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub line_height: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub max_height: f32,
    pub visual_width: f32,
    pub visual_height: f32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            heading_char_width: 9.5,
            padding_x: 24.0,
            padding_y: 16.0,
            line_height: 20.0,
            min_width: 100.0,
            max_width: 250.0,
            max_height: 120.0,
            visual_width: 120.0,
            visual_height: 48.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub structure: StructureConfig,
    pub optimizer: OptimizerConfig,
    pub label: LabelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 40.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::modern();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutOverrides>,
    render: Option<RenderOverrides>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    line_color: Option<String>,
    text_color: Option<String>,
    border_color: Option<String>,
    background: Option<String>,
    level_colors: Option<Vec<String>>,
    visual_color: Option<String>,
    placeholder_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutOverrides {
    structure: Option<StructureOverrides>,
    optimizer: Option<OptimizerOverrides>,
    label: Option<LabelOverrides>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StructureOverrides {
    horizontal_spacing: Option<f32>,
    row_height: Option<f32>,
    visual_spacing: Option<f32>,
    depth_shrink: Option<f32>,
    depth_spacing_step: Option<f32>,
    visual_offset_divisor: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct OptimizerOverrides {
    enabled: Option<bool>,
    max_passes: Option<usize>,
    margin: Option<f32>,
    spacing_unit: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LabelOverrides {
    char_width: Option<f32>,
    heading_char_width: Option<f32>,
    padding_x: Option<f32>,
    padding_y: Option<f32>,
    line_height: Option<f32>,
    min_width: Option<f32>,
    max_width: Option<f32>,
    max_height: Option<f32>,
    visual_width: Option<f32>,
    visual_height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RenderOverrides {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
    background: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => anyhow::bail!("unknown theme `{other}`"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config, vars);
    }

    if let Some(layout) = parsed.layout {
        if let Some(s) = layout.structure {
            apply_structure(&mut config.layout.structure, s);
        }
        if let Some(o) = layout.optimizer {
            apply_optimizer(&mut config.layout.optimizer, o);
        }
        if let Some(l) = layout.label {
            apply_label(&mut config.layout.label, l);
        }
    }

    if let Some(r) = parsed.render {
        if let Some(v) = r.width {
            config.render.width = v;
        }
        if let Some(v) = r.height {
            config.render.height = v;
        }
        if let Some(v) = r.padding {
            config.render.padding = v;
        }
        if let Some(v) = r.background {
            config.render.background = v;
        }
    }

    Ok(config)
}

fn apply_theme_variables(config: &mut Config, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        config.theme.font_family = v;
    }
    if let Some(v) = vars.font_size {
        config.theme.font_size = v;
    }
    if let Some(v) = vars.line_color {
        config.theme.line_color = v;
    }
    if let Some(v) = vars.text_color {
        config.theme.text_color = v;
    }
    if let Some(v) = vars.border_color {
        config.theme.border_color = v;
    }
    if let Some(v) = vars.background {
        config.render.background = v.clone();
        config.theme.background = v;
    }
    if let Some(v) = vars.level_colors
        && !v.is_empty()
    {
        config.theme.level_colors = v;
    }
    if let Some(v) = vars.visual_color {
        config.theme.visual_color = v;
    }
    if let Some(v) = vars.placeholder_color {
        config.theme.placeholder_color = v;
    }
}

fn apply_structure(target: &mut StructureConfig, s: StructureOverrides) {
    if let Some(v) = s.horizontal_spacing {
        target.horizontal_spacing = v;
    }
    if let Some(v) = s.row_height {
        target.row_height = v;
    }
    if let Some(v) = s.visual_spacing {
        target.visual_spacing = v;
    }
    if let Some(v) = s.depth_shrink {
        target.depth_shrink = v;
    }
    if let Some(v) = s.depth_spacing_step {
        target.depth_spacing_step = v;
    }
    if let Some(v) = s.visual_offset_divisor {
        target.visual_offset_divisor = v;
    }
}

fn apply_optimizer(target: &mut OptimizerConfig, o: OptimizerOverrides) {
    if let Some(v) = o.enabled {
        target.enabled = v;
    }
    if let Some(v) = o.max_passes {
        target.max_passes = v.min(MAX_OPTIMIZER_PASSES);
    }
    if let Some(v) = o.margin {
        target.margin = v;
    }
    if let Some(v) = o.spacing_unit {
        target.spacing_unit = v;
    }
}

fn apply_label(target: &mut LabelConfig, l: LabelOverrides) {
    if let Some(v) = l.char_width {
        target.char_width = v;
    }
    if let Some(v) = l.heading_char_width {
        target.heading_char_width = v;
    }
    if let Some(v) = l.padding_x {
        target.padding_x = v;
    }
    if let Some(v) = l.padding_y {
        target.padding_y = v;
    }
    if let Some(v) = l.line_height {
        target.line_height = v;
    }
    if let Some(v) = l.min_width {
        target.min_width = v;
    }
    if let Some(v) = l.max_width {
        target.max_width = v;
    }
    if let Some(v) = l.max_height {
        target.max_height = v;
    }
    if let Some(v) = l.visual_width {
        target.visual_width = v;
    }
    if let Some(v) = l.visual_height {
        target.visual_height = v;
    }
}
