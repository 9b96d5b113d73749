//! Catalog import from CSV files.
//!
//! Ingredient files hold `name,measurement_unit` rows, optionally preceded by
//! an `id` column. Tag files hold `name,color,slug` rows; a blank slug is
//! derived from the name. A leading header row is detected and skipped.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use diesel::PgConnection;
use thiserror::Error;

use crate::db::{import_ingredients, import_tags};
use crate::error::AppError;
use crate::models::ingredient::NewIngredient;
use crate::models::tag::NewTag;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {message}")]
    Row { line: u64, message: String },

    #[error(transparent)]
    Storage(#[from] AppError),
}

pub type LoadResult<T> = Result<T, LoadError>;

pub fn parse_ingredients<R: Read>(reader: R) -> LoadResult<Vec<NewIngredient>> {
    read_records(reader, &["id", "name"])?
        .into_iter()
        .map(|(line, record)| {
            let field = |idx: usize| record.get(idx).unwrap_or_default().trim().to_owned();

            let (id, name, measurement_unit) = match record.len() {
                2 => (None, field(0), field(1)),
                3 => {
                    let id = field(0).parse::<i32>().map_err(|_| LoadError::Row {
                        line,
                        message: format!("invalid ingredient id {:?}", field(0)),
                    })?;
                    (Some(id), field(1), field(2))
                }
                n => {
                    return Err(LoadError::Row {
                        line,
                        message: format!("expected 2 or 3 columns, found {n}"),
                    })
                }
            };

            if name.is_empty() || measurement_unit.is_empty() {
                return Err(LoadError::Row {
                    line,
                    message: "name and measurement unit are required".into(),
                });
            }

            Ok(NewIngredient {
                id,
                name,
                measurement_unit,
            })
        })
        .collect()
}

pub fn parse_tags<R: Read>(reader: R) -> LoadResult<Vec<NewTag>> {
    read_records(reader, &["name"])?
        .into_iter()
        .map(|(line, record)| {
            let field = |idx: usize| record.get(idx).unwrap_or_default().trim().to_owned();

            if !(2..=3).contains(&record.len()) {
                return Err(LoadError::Row {
                    line,
                    message: format!("expected 2 or 3 columns, found {}", record.len()),
                });
            }

            let name = field(0);
            if name.is_empty() {
                return Err(LoadError::Row {
                    line,
                    message: "tag name is required".into(),
                });
            }

            let color = field(1);
            if !is_hex_color(&color) {
                return Err(LoadError::Row {
                    line,
                    message: format!("{color:?} is not a #RRGGBB colour"),
                });
            }

            let slug = match field(2) {
                slug if slug.is_empty() => slug::slugify(&name),
                slug => slug,
            };

            Ok(NewTag { name, color, slug })
        })
        .collect()
}

pub fn load_ingredients<R: Read>(conn: &mut PgConnection, reader: R) -> LoadResult<usize> {
    let rows = parse_ingredients(reader)?;
    let inserted = import_ingredients(conn, &rows)?;

    info!(read = rows.len(), inserted, "ingredients loaded");
    Ok(inserted)
}

pub fn load_tags<R: Read>(conn: &mut PgConnection, reader: R) -> LoadResult<usize> {
    let rows = parse_tags(reader)?;
    let inserted = import_tags(conn, &rows)?;

    info!(read = rows.len(), inserted, "tags loaded");
    Ok(inserted)
}

pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Non-empty records with their line numbers. The first record is dropped
/// when its first field is one of `header_names`.
fn read_records<R: Read>(reader: R, header_names: &[&str]) -> LoadResult<Vec<(u64, StringRecord)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = record.position().map_or(idx as u64 + 1, |pos| pos.line());

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let first = record.get(0).unwrap_or_default().trim();
        if idx == 0 && header_names.iter().any(|name| first.eq_ignore_ascii_case(name)) {
            continue;
        }

        records.push((line, record));
    }

    Ok(records)
}
