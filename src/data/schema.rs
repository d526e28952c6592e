//! Header vocabulary: the synonym table and metal symbols.
//! Adding a synonym is a one-line change to [`SYNONYMS`].
use super::model::Role;

/// Bumped whenever [`SYNONYMS`] changes meaning (not for pure additions).
pub const SYNONYM_TABLE_VERSION: u32 = 1;

// ── Synonyms (normalised header → role) ─────────────────────────────────────
pub const SYNONYMS: &[(&str, Role)] = &[
    // Identifier / station
    ("id", Role::Id),
    ("station", Role::Id),
    ("station name", Role::Id),
    ("station id", Role::Id),
    ("station code", Role::Id),
    ("sample", Role::Id),
    ("sample id", Role::Id),
    ("sampleid", Role::Id),
    ("sample no", Role::Id),
    ("site", Role::Id),
    ("site name", Role::Id),
    ("site id", Role::Id),
    ("location", Role::Id),
    ("location name", Role::Id),
    // Latitude
    ("lat", Role::Latitude),
    ("lat.", Role::Latitude),
    ("latitude", Role::Latitude),
    ("latitude deg", Role::Latitude),
    ("lat deg", Role::Latitude),
    // Longitude
    ("lon", Role::Longitude),
    ("lon.", Role::Longitude),
    ("lng", Role::Longitude),
    ("long", Role::Longitude),
    ("longitude", Role::Longitude),
    ("longitude deg", Role::Longitude),
    ("lon deg", Role::Longitude),
    // Pollution index
    ("hmpi", Role::PollutionIndex),
    ("hpi", Role::PollutionIndex),
    ("pollution index", Role::PollutionIndex),
    ("pollutionindex", Role::PollutionIndex),
    ("heavy metal pollution index", Role::PollutionIndex),
    // Pollution level
    ("pollution level", Role::PollutionLevel),
    ("pollutionlevel", Role::PollutionLevel),
    ("poll level", Role::PollutionLevel),
    ("level", Role::PollutionLevel),
    ("category", Role::PollutionLevel),
    ("classification", Role::PollutionLevel),
    ("water quality", Role::PollutionLevel),
];

// ── Metal symbols (lower-case) ──────────────────────────────────────────────
pub const METALS: [&str; 10] = ["as", "cd", "cr", "pb", "hg", "ni", "cu", "zn", "mn", "fe"];

/// Normalise a header for lookup: trim, lower-case, and collapse runs of
/// whitespace, `_` and `-` into one space.
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Role for a header, if any synonym matches.
pub fn lookup_role(header: &str) -> Option<Role> {
    let key = normalize_header(header);
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, role)| *role)
}

/// Whether a header names one of the tracked metals.
pub fn is_metal(header: &str) -> bool {
    let key = normalize_header(header);
    METALS.contains(&key.as_str())
}

/// Human-readable header for report tables: underscores become spaces,
/// words are title-cased and `HMPI` stays an acronym.
pub fn display_name(name: &str) -> String {
    match normalize_header(name).as_str() {
        "hmpi" | "pollution index" => return "HMPI".to_string(),
        "id" => return "Station".to_string(),
        _ => {}
    }
    name.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonym_keys_are_normalised() {
        for (synonym, _) in SYNONYMS {
            assert_eq!(normalize_header(synonym), *synonym, "{synonym} is not normalised");
        }
    }

    #[test]
    fn synonym_keys_are_unique() {
        let mut keys: Vec<&str> = SYNONYMS.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        assert_eq!(before, keys.len());
    }

    #[test]
    fn every_role_has_its_canonical_name_as_synonym() {
        for role in Role::ALL {
            assert_eq!(lookup_role(role.canonical_name()), Some(role));
        }
    }

    #[test]
    fn latitude_variants_share_a_role() {
        for header in ["lat", "Latitude", "LATITUDE", "  latitude ", "Lat"] {
            assert_eq!(lookup_role(header), Some(Role::Latitude), "{header}");
        }
    }

    #[test]
    fn separators_collapse() {
        assert_eq!(normalize_header(" Station_Name "), "station name");
        assert_eq!(normalize_header("Pollution  -  Level"), "pollution level");
        assert_eq!(lookup_role("Station Name"), Some(Role::Id));
        assert_eq!(lookup_role("poll_level"), Some(Role::PollutionLevel));
        assert_eq!(lookup_role("sample_id"), Some(Role::Id));
    }

    #[test]
    fn unknown_headers_have_no_role() {
        assert_eq!(lookup_role("pH"), None);
        assert_eq!(lookup_role("latitudelongitude"), None);
    }

    #[test]
    fn metals_match_case_insensitively() {
        assert!(is_metal("Pb"));
        assert!(is_metal(" CD "));
        assert!(is_metal("fe"));
        assert!(!is_metal("Pb (mg/L)"));
        assert!(!is_metal("Al"));
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("pollution_level"), "Pollution Level");
        assert_eq!(display_name("hmpi"), "HMPI");
        assert_eq!(display_name("pollution_index"), "HMPI");
        assert_eq!(display_name("station name"), "Station Name");
        assert_eq!(display_name("id"), "Station");
    }
}
