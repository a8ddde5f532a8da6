use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::products::{ProductField, SHEET_FIELDS};
use crate::ConfigError;

/// Built-in spreadsheet header aliases, applied after trimming the header cell.
pub const DEFAULT_COLUMN_ALIASES: [(&str, ProductField); 7] = [
    ("Category", ProductField::Category),
    ("Sub-Category", ProductField::Subcategory),
    ("Item Name", ProductField::ItemName),
    ("ItemName", ProductField::ItemName),
    ("Description", ProductField::Fragrance),
    ("SKU Code", ProductField::SkuCode),
    ("New Product ( Indication )", ProductField::IsNew),
];

/// One spreadsheet-backed product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CataloguesFile {
    pub catalogues: Vec<CatalogueConfig>,
    /// Extra header aliases, header text to canonical column name.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

impl CataloguesFile {
    /// Built-in aliases followed by the file's own, as `(header, field)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if an alias targets an unknown column
    /// or one that is never read from a sheet.
    pub fn column_aliases(&self) -> Result<Vec<(String, ProductField)>, ConfigError> {
        let mut aliases: Vec<(String, ProductField)> = DEFAULT_COLUMN_ALIASES
            .iter()
            .map(|(header, field)| ((*header).to_string(), *field))
            .collect();

        for (header, target) in &self.columns {
            let field = ProductField::from_name(target.trim()).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "column alias '{header}' targets unknown field '{target}'"
                ))
            })?;
            if !SHEET_FIELDS.contains(&field) {
                return Err(ConfigError::Validation(format!(
                    "column alias '{header}' targets '{target}', which is not read from sheets"
                )));
            }
            aliases.push((header.trim().to_string(), field));
        }

        Ok(aliases)
    }
}

/// Load and validate the catalogue source list from a YAML file.
///
/// Relative spreadsheet paths are resolved against the YAML file's directory.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalogues(path: &Path) -> Result<CataloguesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CataloguesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut file: CataloguesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CataloguesFileParse)?;

    validate_catalogues(&file)?;

    if let Some(base) = path.parent() {
        for catalogue in &mut file.catalogues {
            if catalogue.path.is_relative() {
                catalogue.path = base.join(&catalogue.path);
            }
        }
    }

    Ok(file)
}

fn validate_catalogues(file: &CataloguesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for catalogue in &file.catalogues {
        if catalogue.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "catalogue name must be non-empty".to_string(),
            ));
        }

        if catalogue.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!(
                "catalogue '{}' has an empty path",
                catalogue.name
            )));
        }

        if !seen_names.insert(catalogue.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate catalogue name: '{}'",
                catalogue.name
            )));
        }
    }

    file.column_aliases()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn catalogue(name: &str, path: &str) -> CatalogueConfig {
        CatalogueConfig {
            name: name.to_string(),
            path: PathBuf::from(path),
        }
    }

    fn file_with(catalogues: Vec<CatalogueConfig>) -> CataloguesFile {
        CataloguesFile {
            catalogues,
            columns: BTreeMap::new(),
        }
    }

    #[test]
    fn validate_accepts_distinct_catalogues() {
        let file = file_with(vec![
            catalogue("HEM Product Catalogue", "Hem catalogue.xlsx"),
            catalogue("Candle Catalogue", "Candle Catalogue.xlsx"),
        ]);
        assert!(validate_catalogues(&file).is_ok());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let file = file_with(vec![catalogue("  ", "a.xlsx")]);
        let err = validate_catalogues(&file).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_empty_path() {
        let file = file_with(vec![catalogue("Candle Catalogue", "")]);
        let err = validate_catalogues(&file).unwrap_err();
        assert!(err.to_string().contains("empty path"));
    }

    #[test]
    fn validate_rejects_case_insensitive_duplicates() {
        let file = file_with(vec![
            catalogue("Candle Catalogue", "a.xlsx"),
            catalogue("candle catalogue", "b.xlsx"),
        ]);
        let err = validate_catalogues(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate catalogue name"));
    }

    #[test]
    fn column_aliases_include_defaults_then_extras() {
        let mut file = file_with(vec![]);
        file.columns
            .insert(" Product Title ".to_string(), "ItemName".to_string());
        let aliases = file.column_aliases().unwrap();
        assert_eq!(aliases.len(), DEFAULT_COLUMN_ALIASES.len() + 1);
        assert_eq!(aliases[0], ("Category".to_string(), ProductField::Category));
        assert_eq!(
            aliases.last().unwrap(),
            &("Product Title".to_string(), ProductField::ItemName)
        );
    }

    #[test]
    fn column_alias_to_unknown_field_is_rejected() {
        let mut file = file_with(vec![catalogue("A", "a.xlsx")]);
        file.columns
            .insert("Price".to_string(), "UnitPrice".to_string());
        let err = validate_catalogues(&file).unwrap_err();
        assert!(err.to_string().contains("UnitPrice"));
    }

    #[test]
    fn column_alias_to_stamped_field_is_rejected() {
        for target in ["Catalogue", "Packaging", "ImageB64"] {
            let mut file = file_with(vec![catalogue("A", "a.xlsx")]);
            file.columns.insert("Line".to_string(), target.to_string());
            let err = validate_catalogues(&file).unwrap_err();
            assert!(err.to_string().contains("not read from sheets"), "{target}: {err}");
        }
    }

    #[test]
    fn shipped_sample_lists_every_catalogue() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/catalogues.yaml");
        let file = load_catalogues(&path).unwrap();
        let names: Vec<&str> = file.catalogues.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "HEM Product Catalogue",
                "Sacred Elements Catalogue",
                "Pooja Oil Catalogue",
                "Candle Catalogue",
            ]
        );
        assert!(file.catalogues[2].path.ends_with("Pooja Oil Catalogue.xlsx"));
    }

    #[test]
    fn load_catalogues_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("catalogues.yaml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        writeln!(
            f,
            "catalogues:\n  - name: Pooja Oil Catalogue\n    path: Pooja Oil Catalogue.xlsx\n  - name: Candle Catalogue\n    path: /abs/Candle.xlsx"
        )
        .unwrap();

        let file = load_catalogues(&yaml_path).unwrap();
        assert_eq!(file.catalogues.len(), 2);
        assert_eq!(
            file.catalogues[0].path,
            dir.path().join("Pooja Oil Catalogue.xlsx")
        );
        assert_eq!(file.catalogues[1].path, PathBuf::from("/abs/Candle.xlsx"));
        assert!(file.columns.is_empty());
    }

    #[test]
    fn load_catalogues_reports_missing_file() {
        let err = load_catalogues(Path::new("/nonexistent/catalogues.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CataloguesFileIo { .. }));
    }

    #[test]
    fn load_catalogues_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("catalogues.yaml");
        std::fs::write(&yaml_path, "catalogues: [oops").unwrap();
        let err = load_catalogues(&yaml_path).unwrap_err();
        assert!(matches!(err, ConfigError::CataloguesFileParse(_)));
    }
}
