use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Response of the document-extraction service, as received on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStructureResponse {
    #[serde(default, alias = "documentStructure")]
    pub document_structure: Option<Vec<DocumentStructure>>,
    #[serde(default, alias = "documentName")]
    pub document_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub enhanced: Option<bool>,
}

/// One top-level heading and its subheading tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStructure {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default, alias = "pageReference")]
    pub page_reference: Option<i64>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub subheadings: Vec<Subheading>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subheading {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, alias = "pageReference")]
    pub page_reference: Option<i64>,
    #[serde(default, alias = "visualReferences", deserialize_with = "nullable_vec")]
    pub visual_references: Vec<VisualReference>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub subheadings: Vec<Subheading>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualReference {
    #[serde(default, alias = "imageCaption")]
    pub image_caption: Option<String>,
    #[serde(default, alias = "pageReference")]
    pub page_reference: Option<i64>,
}

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("invalid document structure JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read document structure: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentStructureResponse {
    pub fn new(sections: Vec<DocumentStructure>) -> Self {
        Self {
            document_structure: Some(sections),
            ..Default::default()
        }
    }

    /// Top-level sections, treating an absent list as empty.
    pub fn sections(&self) -> &[DocumentStructure] {
        self.document_structure.as_deref().unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.sections().is_empty()
    }

    /// Human-readable name for the document, if the extractor supplied one.
    pub fn display_name(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.document_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

impl DocumentStructure {
    pub fn new(heading: &str) -> Self {
        Self {
            heading: Some(heading.to_string()),
            page_reference: None,
            subheadings: Vec::new(),
        }
    }

    pub fn label(&self) -> Option<String> {
        self.heading.as_deref().and_then(normalize_label)
    }

    pub fn page(&self) -> u32 {
        page_or(self.page_reference, 1)
    }
}

impl Subheading {
    pub fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn label(&self) -> Option<String> {
        self.title.as_deref().and_then(normalize_label)
    }

    pub fn page(&self) -> u32 {
        page_or(self.page_reference, 1)
    }

    pub fn context_text(&self) -> Option<String> {
        self.context.as_deref().and_then(normalize_label)
    }
}

impl VisualReference {
    pub fn new(caption: &str) -> Self {
        Self {
            image_caption: Some(caption.to_string()),
            page_reference: None,
        }
    }

    pub fn caption(&self) -> String {
        self.image_caption
            .as_deref()
            .and_then(normalize_label)
            .unwrap_or_else(|| "Image".to_string())
    }

    /// Visuals without their own page inherit the owning subheading's page.
    pub fn page(&self, owner_page: u32) -> u32 {
        page_or(self.page_reference, owner_page)
    }
}

/// Trims and collapses whitespace runs. Returns `None` when nothing is left.
pub fn normalize_label(raw: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn page_or(value: Option<i64>, fallback: u32) -> u32 {
    match value {
        Some(page) if page >= 1 => u32::try_from(page).unwrap_or(u32::MAX),
        _ => fallback.max(1),
    }
}

pub fn parse_structure(input: &str) -> Result<DocumentStructureResponse, StructureError> {
    Ok(serde_json::from_str(input)?)
}

pub fn read_structure(path: &Path) -> Result<DocumentStructureResponse, StructureError> {
    let contents = std::fs::read_to_string(path)?;
    parse_structure(&contents)
}
