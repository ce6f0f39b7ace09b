//! Parsing and validation of reference-data files.

use std::path::Path;

use recipebook_server::seed::{IngredientSeed, TagSeed};
use serde::de::DeserializeOwned;
use thiserror::Error;

const MAX_FIELD_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {message}")]
    Csv { line: usize, message: String },
    #[error("record {index}: {message}")]
    Invalid { index: usize, message: String },
    #[error("unsupported file type '{0}', expected .csv or .json")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

pub fn load_ingredients(path: &Path) -> Result<Vec<IngredientSeed>, ImportError> {
    let format = Format::from_path(path)?;
    parse_ingredients(&std::fs::read_to_string(path)?, format)
}

pub fn load_tags(path: &Path) -> Result<Vec<TagSeed>, ImportError> {
    let format = Format::from_path(path)?;
    parse_tags(&std::fs::read_to_string(path)?, format)
}

pub fn parse_ingredients(text: &str, format: Format) -> Result<Vec<IngredientSeed>, ImportError> {
    let rows: Vec<IngredientSeed> = match format {
        Format::Json => parse_json(text)?,
        Format::Csv => parse_csv(text, &["name", "measurement_unit"])?
            .into_iter()
            .map(|mut f| IngredientSeed {
                measurement_unit: f.pop().unwrap_or_default(),
                name: f.pop().unwrap_or_default(),
            })
            .collect(),
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let row = IngredientSeed {
                name: row.name.trim().to_string(),
                measurement_unit: row.measurement_unit.trim().to_string(),
            };
            check_field(index, "name", &row.name)?;
            check_field(index, "measurement_unit", &row.measurement_unit)?;
            Ok(row)
        })
        .collect()
}

pub fn parse_tags(text: &str, format: Format) -> Result<Vec<TagSeed>, ImportError> {
    let rows: Vec<TagSeed> = match format {
        Format::Json => parse_json(text)?,
        Format::Csv => parse_csv(text, &["name", "color", "slug"])?
            .into_iter()
            .map(|mut f| TagSeed {
                slug: f.pop().unwrap_or_default(),
                color: f.pop().unwrap_or_default(),
                name: f.pop().unwrap_or_default(),
            })
            .collect(),
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let row = TagSeed {
                name: row.name.trim().to_string(),
                color: row.color.trim().to_uppercase(),
                slug: row.slug.trim().to_string(),
            };
            check_field(index, "name", &row.name)?;
            check_field(index, "slug", &row.slug)?;
            if !row
                .slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(ImportError::Invalid {
                    index,
                    message: format!("slug '{}' may only contain letters, digits, - and _", row.slug),
                });
            }
            if !is_hex_color(&row.color) {
                return Err(ImportError::Invalid {
                    index,
                    message: format!("color '{}' is not of the form #RRGGBB", row.color),
                });
            }
            Ok(row)
        })
        .collect()
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ImportError> {
    Ok(serde_json::from_str(text)?)
}

fn check_field(index: usize, field: &str, value: &str) -> Result<(), ImportError> {
    if value.is_empty() || value.chars().count() > MAX_FIELD_LEN {
        return Err(ImportError::Invalid {
            index,
            message: format!("{field} must be 1-{MAX_FIELD_LEN} characters"),
        });
    }
    Ok(())
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Read CSV text into records of exactly `header.len()` fields. Blank lines
/// are skipped, and so is a first record equal to `header`.
fn parse_csv(text: &str, header: &[&str]) -> Result<Vec<Vec<String>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

    let mut records = Vec::new();
    let mut first = true;
    for result in reader.records() {
        let record = result.map_err(|e| ImportError::Csv {
            line: e.position().map_or(0, |p| p.line() as usize),
            message: e.to_string(),
        })?;
        if record.iter().all(|f| f.trim().is_empty()) && record.len() <= 1 {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line() as usize);
        if std::mem::take(&mut first)
            && record
                .iter()
                .map(|f| f.trim().to_ascii_lowercase())
                .eq(header.iter().map(|h| h.to_string()))
        {
            continue;
        }
        if record.len() != header.len() {
            return Err(ImportError::Csv {
                line,
                message: format!("expected {} fields, found {}", header.len(), record.len()),
            });
        }
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}
