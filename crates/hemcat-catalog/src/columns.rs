use std::collections::HashMap;

use hemcat_core::catalogues::DEFAULT_COLUMN_ALIASES;
use hemcat_core::products::SHEET_FIELDS;
use hemcat_core::ProductField;

/// Maps spreadsheet header text onto canonical product fields.
///
/// Headers are trimmed, then looked up as an alias, then as a canonical field
/// name. Unrecognized headers are ignored.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    aliases: HashMap<String, ProductField>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::new(
            DEFAULT_COLUMN_ALIASES
                .iter()
                .map(|(header, field)| ((*header).to_string(), *field)),
        )
    }
}

impl ColumnMap {
    /// Later pairs replace earlier ones with the same header.
    pub fn new(aliases: impl IntoIterator<Item = (String, ProductField)>) -> Self {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(header, field)| (header.trim().to_string(), field))
                .collect(),
        }
    }

    #[must_use]
    pub fn field_for(&self, header: &str) -> Option<ProductField> {
        let header = header.trim();
        self.aliases
            .get(header)
            .copied()
            .or_else(|| ProductField::from_name(header))
            .filter(|field| SHEET_FIELDS.contains(field))
    }

    /// Column position of each sheet field; the first matching header wins.
    #[must_use]
    pub fn layout(&self, headers: &[String]) -> SheetLayout {
        let mut positions = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            if let Some(field) = self.field_for(header) {
                positions.entry(field).or_insert(i);
            }
        }
        SheetLayout { positions }
    }
}

/// Resolved header positions for one sheet.
#[derive(Debug, Clone, Default)]
pub struct SheetLayout {
    positions: HashMap<ProductField, usize>,
}

impl SheetLayout {
    /// The row's cell for `field`; missing columns and short rows yield `""`.
    #[must_use]
    pub fn cell<'r>(&self, row: &'r [String], field: ProductField) -> &'r str {
        self.positions
            .get(&field)
            .and_then(|&i| row.get(i))
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn has(&self, field: ProductField) -> bool {
        self.positions.contains_key(&field)
    }
}
