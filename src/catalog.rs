//! Selection lists offered for category-based generation.

pub const CATEGORIES: &[&str] = &[
    "Landscapes",
    "Cityscapes",
    "Space & Cosmos",
    "Abstract",
    "Animals",
    "Fantasy Worlds",
    "Sci-Fi Futures",
    "Nature's Details",
    "Underwater Realms",
    "Architecture",
    "Vehicles",
    "Minimalist",
    "Dreamlike & Surreal",
    "Gothic & Dark",
    "Mythology",
    "Vaporwave & Retro",
    "Food & Drink",
    "Steampunk",
    "Crystalline & Gemstones",
    "Biomechanical",
];

pub const VISUAL_STYLES: &[&str] = &[
    "Anime",
    "Photorealistic",
    "3D Render",
    "Impressionistic",
    "Minimalist",
    "Cyberpunk",
    "Vintage",
    "Surreal",
];

pub fn default_category() -> &'static str {
    CATEGORIES[0]
}

pub fn default_visual_style() -> &'static str {
    VISUAL_STYLES[0]
}

/// Canonical spelling of a known entry, matched case-insensitively. Unknown
/// labels are passed through untouched; providers accept free text.
pub fn canonical<'a>(options: &[&'static str], label: &'a str) -> &'a str {
    let trimmed = label.trim();
    options
        .iter()
        .copied()
        .find(|o| o.eq_ignore_ascii_case(trimmed))
        .unwrap_or(trimmed)
}
