//! Crop Name Normalization
//!
//! The six historical sources spell crop columns differently
//! ("Food grains (cereals) - Rice", "Foodgrains(cereals) - Rice",
//! "Food Grains (Cereals) - Rice (000 tonnes)", ...). Every spelling is mapped
//! to one canonical name so the area, yield and production tables can be
//! joined on it.

use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Known source spellings and their canonical crop name
pub static CROP_ALIASES: &[(&str, &str)] = &[
    // Area table
    ("Food grains (cereals) - Rice", "Rice"),
    ("Food grains (cereals) - Wheat", "Wheat"),
    ("Food grains (cereals) - Jowar", "Jowar"),
    ("Food grains (cereals) - Bajra", "Bajra"),
    ("Food grains (cereals) - Maize", "Maize"),
    ("Food grains (cereals) - Ragi", "Ragi"),
    ("Food grains(pulses) - Tur", "Tur"),
    ("Food grains(pulses) - Gram", "Gram"),
    ("Food grains(pulses) - Other Pulses", "Other Pulses"),
    // Yield table
    ("Foodgrains(cereals) - Rice", "Rice"),
    ("Foodgrains(cereals) - Wheat", "Wheat"),
    ("Foodgrains(cereals) - Jowar", "Jowar"),
    ("Foodgrains(cereals) - Bajra", "Bajra"),
    ("Foodgrains(cereals) - Maize", "Maize"),
    ("Foodgrains(cereals) - Ragi", "Ragi"),
    ("Foodgrains(pulses) - Tur", "Tur"),
    ("Foodgrains(pulses) - Gram", "Gram"),
    ("Foodgrains(pulses) - Other pulses", "Other Pulses"),
    // Production table
    ("Food Grains (Cereals) - Rice (000 tonnes)", "Rice"),
    ("Food Grains (Cereals) - Wheat (000 tonnes)", "Wheat"),
    ("Food Grains (Cereals) - Jowar (000 tonnes)", "Jowar"),
    ("Food Grains (Cereals) - Bajra (000 tonnes)", "Bajra"),
    ("Food Grains (Cereals) - Maize (000 tonnes)", "Maize"),
    ("Food Grains (Cereals) - Ragi (000 tonnes)", "Ragi"),
    ("Food Grains (Pulses) - Tur (000 tonnes)", "Tur"),
    ("Food Grains (Pulses) - Gram (000 tonnes)", "Gram"),
    ("Food Grains (Pulses) - Other Pulses (000 tonnes)", "Other Pulses"),
];

static ALIAS_INDEX: LazyLock<FxHashMap<&'static str, &'static str>> =
    LazyLock::new(|| CROP_ALIASES.iter().copied().collect());

/// Map a raw crop column name to its canonical name
///
/// Surrounding whitespace is trimmed before the alias lookup. Names without an
/// alias become a token: spaces and hyphens turn into underscores, parentheses
/// and commas are dropped. An empty name stays empty.
pub fn standardize_crop_name(raw: &str) -> String {
    let name = raw.trim();

    if let Some(canonical) = ALIAS_INDEX.get(name) {
        return (*canonical).to_string();
    }

    name.chars()
        .filter(|c| !matches!(c, '(' | ')' | ','))
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Key fragment used in flat feature names (`avg_area_Other_Pulses`)
pub fn feature_key_fragment(name: &str) -> String {
    name.replace([' ', '-'], "_")
}
