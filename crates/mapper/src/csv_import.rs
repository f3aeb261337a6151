use infomap_core::{title_from_filename, Asset, Category, MappingError, MappingSet, Theme};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to read CSV: {0}")]
    Read(#[from] csv::Error),
    #[error("line {line}: `{filename}` has no slide_number")]
    MissingSlide { line: u64, filename: String },
    #[error("line {line}: slide_number `{value}` for `{filename}` is not an integer")]
    InvalidSlide {
        line: u64,
        filename: String,
        value: String,
    },
    #[error("line {line}: empty filename")]
    MissingFilename { line: u64 },
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// One row of the asset spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CsvRecord {
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slide_number: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(skip)]
    pub line: u64,
}

pub fn read_csv(path: &Path) -> Result<Vec<CsvRecord>, CsvError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    read_records(file)
}

pub fn read_records<R: Read>(reader: R) -> Result<Vec<CsvRecord>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let mut record: CsvRecord = row.deserialize(Some(&headers))?;
        record.line = line;
        records.push(record);
    }

    Ok(records)
}

impl CsvRecord {
    fn slide(&self) -> Result<u32, CsvError> {
        let value = self
            .slide_number
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CsvError::MissingSlide {
                line: self.line,
                filename: self.filename.clone(),
            })?;

        value.parse().map_err(|_| CsvError::InvalidSlide {
            line: self.line,
            filename: self.filename.clone(),
            value: value.to_string(),
        })
    }

    pub fn theme(&self) -> Option<Theme> {
        non_empty(self.theme.clone()).map(Theme::from)
    }

    pub fn into_asset(self) -> Result<Asset, CsvError> {
        if self.filename.is_empty() {
            return Err(CsvError::MissingFilename { line: self.line });
        }
        let slide_number = self.slide()?;
        let theme = self.theme();

        Ok(Asset {
            title: non_empty(self.title).unwrap_or_else(|| title_from_filename(&self.filename)),
            category: non_empty(self.category)
                .map(Category::from)
                .unwrap_or_else(|| infomap_core::classify(&self.filename)),
            theme,
            filename: self.filename,
            slide_number,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builds a mapping from spreadsheet rows, optionally keeping one theme.
pub fn convert(records: Vec<CsvRecord>, theme: Option<&Theme>) -> Result<MappingSet, CsvError> {
    let assets = records
        .into_iter()
        .filter(|record| theme.map_or(true, |t| record.theme().as_ref() == Some(t)))
        .map(CsvRecord::into_asset)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MappingSet::new(assets)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
filename,title,slide_number,category,theme
growth_timeline.png,Growth Timeline,4,Timeline,bcore
growth_timeline.png,Growth Timeline,4,Timeline,light
sales_circle.png,Sales Circle,2,Business,bcore
sales_circle.png,Sales Circle,2,Business,light
";

    #[test]
    fn reads_rows_with_line_numbers() {
        let records = read_records(SHEET.as_bytes()).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].filename, "growth_timeline.png");
        assert_eq!(records[0].slide_number.as_deref(), Some("4"));
        assert_eq!(records[0].line, 2);
    }

    #[test]
    fn both_themes_share_slide_numbers() {
        let set = convert(read_records(SHEET.as_bytes()).unwrap(), None).unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.assets()[0].filename, "sales_circle.png");
        assert_eq!(set.assets()[0].slide_number, 2);
    }

    #[test]
    fn theme_filter_keeps_one_variant() {
        let theme = Theme::new("light");
        let set = convert(read_records(SHEET.as_bytes()).unwrap(), Some(&theme)).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|a| a.theme.as_ref() == Some(&theme)));
        let slides: Vec<u32> = set.iter().map(|a| a.slide_number).collect();
        assert_eq!(slides, vec![2, 4]);
    }

    #[test]
    fn missing_columns_are_derived() {
        let sheet = "filename,slide_number\nfive_steps.png,3\n";
        let set = convert(read_records(sheet.as_bytes()).unwrap(), None).unwrap();

        let asset = &set.assets()[0];
        assert_eq!(asset.title, "five steps");
        assert_eq!(asset.category, Category::Process);
        assert_eq!(asset.theme, None);
    }

    #[test]
    fn bad_slide_number_names_the_line() {
        let sheet = "filename,slide_number\na.png,1\nb.png,two\n";
        let err = convert(read_records(sheet.as_bytes()).unwrap(), None).unwrap_err();

        assert_eq!(
            err.to_string(),
            "line 3: slide_number `two` for `b.png` is not an integer"
        );
    }

    #[test]
    fn rows_of_other_themes_are_not_validated() {
        let sheet = "filename,slide_number,theme\na.png,1,bcore\na.png,,light\nb.png,x,light\n";
        let records = read_records(sheet.as_bytes()).unwrap();

        let set = convert(records.clone(), Some(&Theme::new("bcore"))).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.assets()[0].slide_number, 1);

        assert!(convert(records, None).is_err());
    }

    #[test]
    fn empty_slide_number_is_missing() {
        let sheet = "filename,slide_number\na.png,\n";
        let err = convert(read_records(sheet.as_bytes()).unwrap(), None).unwrap_err();

        assert!(matches!(err, CsvError::MissingSlide { line: 2, .. }));
    }

    #[test]
    fn duplicate_slide_within_theme_fails() {
        let sheet = "filename,slide_number,theme\na.png,1,light\nb.png,1,light\n";
        let err = convert(read_records(sheet.as_bytes()).unwrap(), None).unwrap_err();

        assert!(matches!(
            err,
            CsvError::Mapping(MappingError::DuplicateSlide { slide: 1, .. })
        ));
    }
}
