//! Marker colors and category labels.
//!
//! Pure mappings from public node fields; nothing here feeds back into
//! clustering.

use cluster::RenderableNode;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// `#RRGGBB`, alpha dropped.
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.0;
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Normalized components, for GPU-side styles.
    pub fn to_f32(self) -> [f32; 4] {
        self.0.map(|c| c as f32 / 255.0)
    }
}

pub const TOP_RATED: Rgba = Rgba::rgb(0x66, 0xB7, 0xFF);
pub const WELL_RATED: Rgba = Rgba::rgb(0xFF, 0xC4, 0x4D);
pub const UNRATED: Rgba = Rgba::rgb(0xFF, 0x6B, 0x6B);
pub const CLUSTER_BORDER: Rgba = Rgba::rgb(0x74, 0xE1, 0xA0);

pub fn rating_color(rating: Option<f64>) -> Rgba {
    match rating {
        Some(r) if r >= 4.7 => TOP_RATED,
        Some(r) if r >= 4.0 => WELL_RATED,
        _ => UNRATED,
    }
}

pub fn cluster_color() -> Rgba {
    CLUSTER_BORDER
}

pub fn node_color(node: &RenderableNode) -> Rgba {
    match node {
        RenderableNode::Cluster { .. } => cluster_color(),
        RenderableNode::Singleton { rating, .. } => rating_color(*rating),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    pub key: String,
    pub display_name: String,
    pub emoji: &'static str,
}

const DEFAULT_EMOJI: &str = "\u{1F4CD}";

fn known_category(key: &str) -> Option<(&'static str, &'static str)> {
    let entry = match key {
        "synagogue" | "shul" => ("Shuls", "\u{1F54D}"),
        "mikvah" => ("Mikvahs", "\u{1F4A7}"),
        "restaurant" | "eatery" => ("Eateries", "\u{1F37D}\u{FE0F}"),
        "store" | "stores" => ("Stores", "\u{1F3EA}"),
        "jobs" => ("Jobs", "\u{1F4BC}"),
        "events" => ("Events", "\u{1F389}"),
        "specials" => ("Specials", "\u{1F381}"),
        "eatery-plus" => ("Eatery+ Coming Soon", "\u{1F37D}\u{FE0F}+"),
        _ => return None,
    };
    Some(entry)
}

/// Display name and emoji for a listing category. Lookup ignores case;
/// unknown categories get their own name capitalized and a pin.
pub fn category_info(category: &str) -> CategoryInfo {
    let key = category.to_lowercase();
    let (display_name, emoji) = match known_category(&key) {
        Some((name, emoji)) => (name.to_string(), emoji),
        None => (capitalize(category), DEFAULT_EMOJI),
    };
    CategoryInfo {
        key,
        display_name,
        emoji,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster::{ClusterId, LatLon};
    use pretty_assertions::assert_eq;

    #[test]
    fn rating_thresholds() {
        assert_eq!(rating_color(Some(4.9)), TOP_RATED);
        assert_eq!(rating_color(Some(4.7)), TOP_RATED);
        assert_eq!(rating_color(Some(4.69)), WELL_RATED);
        assert_eq!(rating_color(Some(4.0)), WELL_RATED);
        assert_eq!(rating_color(Some(3.99)), UNRATED);
        assert_eq!(rating_color(None), UNRATED);
        assert_eq!(rating_color(Some(f64::NAN)), UNRATED);
    }

    #[test]
    fn hex_and_float_forms() {
        assert_eq!(TOP_RATED.to_hex(), "#66B7FF");
        assert_eq!(cluster_color().to_hex(), "#74E1A0");
        assert_eq!(Rgba::rgb(255, 0, 0).to_f32(), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn clusters_and_pins_are_colored_differently() {
        let cluster = RenderableNode::Cluster {
            id: ClusterId::new(3, 0),
            centroid: LatLon::new(0.0, 0.0),
            point_count: 4,
            expansion_zoom: 5,
        };
        let pin = RenderableNode::Singleton {
            id: 1,
            coordinate: LatLon::new(0.0, 0.0),
            source_point_id: "p".to_string(),
            rating: Some(4.8),
            category: "restaurant".to_string(),
        };
        assert_eq!(node_color(&cluster), CLUSTER_BORDER);
        assert_eq!(node_color(&pin), TOP_RATED);
    }

    #[test]
    fn known_categories_share_display_names() {
        assert_eq!(category_info("synagogue").display_name, "Shuls");
        assert_eq!(category_info("Shul").display_name, "Shuls");
        assert_eq!(category_info("shul").key, "shul");
        assert_eq!(category_info("eatery").display_name, "Eateries");
        assert_eq!(category_info("stores").display_name, "Stores");
        assert_eq!(category_info("eatery-plus").display_name, "Eatery+ Coming Soon");
        assert_eq!(category_info("mikvah").emoji, "\u{1F4A7}");
    }

    #[test]
    fn unknown_categories_are_capitalized_with_a_pin() {
        assert_eq!(
            category_info("bakery"),
            CategoryInfo {
                key: "bakery".to_string(),
                display_name: "Bakery".to_string(),
                emoji: DEFAULT_EMOJI,
            }
        );
        assert_eq!(category_info("").display_name, "");
    }
}
