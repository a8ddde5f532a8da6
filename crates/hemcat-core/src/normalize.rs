//! Key normalization for name-based matching.
//!
//! Spreadsheet cells and media-store asset names are typed by humans, so the
//! same product shows up as `"Rose Agarbatti"`, `"rose_agarbatti.JPG"` or
//! `"Incense/Rose-Agarbatti"`. [`normalize_key`] folds all of these into one
//! comparable key; it is the only equality notion used by the image resolver.

/// Image extensions stripped from the end of a name. At most one is removed.
const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".webp", ".bmp", ".tiff"];

/// Separator characters removed in addition to whitespace.
const SEPARATORS: [char; 5] = ['_', '-', '/', '\\', '.'];

/// Normalizes free text into a comparable key.
///
/// Lower-cases, trims, strips one trailing image extension, then removes all
/// whitespace (including U+00A0) and the separators `_ - / \ .`.
///
/// Total and idempotent: `normalize_key(&normalize_key(s)) == normalize_key(s)`.
#[must_use]
pub fn normalize_key(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut trimmed = lowered.trim();

    if let Some(stem) = IMAGE_EXTENSIONS
        .iter()
        .find_map(|ext| trimmed.strip_suffix(ext))
    {
        trimmed = stem;
    }

    trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && !SEPARATORS.contains(c))
        .collect()
}

/// Normalizes an optional value; absent input yields an empty key.
#[must_use]
pub fn normalize_optional_key(text: Option<&str>) -> String {
    text.map(normalize_key).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_spaces() {
        assert_eq!(normalize_key("Rose Agarbatti"), "roseagarbatti");
    }

    #[test]
    fn strips_one_image_extension() {
        assert_eq!(normalize_key("Rose_Agarbatti.JPG"), "roseagarbatti");
        assert_eq!(normalize_key("hexa.jpeg"), "hexa");
        assert_eq!(normalize_key("photo.tiff"), "photo");
    }

    #[test]
    fn strips_only_the_last_extension() {
        // ".png" is stripped, the remaining ".jpg" is just a separator plus letters.
        assert_eq!(normalize_key("a.jpg.png"), "ajpg");
    }

    #[test]
    fn removes_all_separators() {
        assert_eq!(normalize_key("Line A/Incense\\Rose-Agar_batti.v2"), "lineaincenseroseagarbattiv2");
    }

    #[test]
    fn removes_non_breaking_space() {
        assert_eq!(normalize_key("Rose\u{a0}Agarbatti"), "roseagarbatti");
    }

    #[test]
    fn trims_before_stripping_extension() {
        assert_eq!(normalize_key("  lavender.png  "), "lavender");
    }

    #[test]
    fn empty_and_whitespace_inputs_yield_empty_key() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("   "), "");
        assert_eq!(normalize_key(".png"), "");
    }

    #[test]
    fn absent_input_yields_empty_key() {
        assert_eq!(normalize_optional_key(None), "");
        assert_eq!(normalize_optional_key(Some("Bay Leaf")), "bayleaf");
    }

    #[test]
    fn names_differing_only_by_case_and_separators_agree() {
        let a = normalize_key("Soham Dhoop - Sandal");
        let b = normalize_key("soham_dhoop_sandal.webp");
        assert_eq!(a, b);
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "Rose Agarbatti",
            "a.jpg.png",
            "  MiXeD_Case-Name.PNG ",
            "LineA/Incense/RoseAgarbatti",
            "x .png",
            "\u{a0}\u{a0}",
            "Ünïcode Näme.webp",
            "",
        ];
        for s in samples {
            let once = normalize_key(s);
            assert_eq!(normalize_key(&once), once, "not idempotent for {s:?}");
        }
    }
}
