//! Injectable configuration for the content similarity engine.
//!
//! The brand/category tier tables, the product-type keyword table and
//! the accessory rules are catalog-specific data, not algorithm
//! constants. The defaults below describe a consumer-electronics
//! catalog; deployments with a different assortment supply their own
//! tables via [`ContentConfig::from_json_str`] or
//! [`ContentConfig::from_json_file`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Brand tier lists. Brands absent from every list get no brand bonus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandTiers {
    /// Tier 1 brands.
    pub premium: Vec<String>,
    /// Tier 2 brands.
    pub high_end: Vec<String>,
    /// Tier 3 brands.
    pub mid: Vec<String>,
}

/// Category tier lists. Everything else is a standard category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTiers {
    /// Flagship categories.
    pub premium: Vec<String>,
    /// Upper-mid categories.
    pub high_end: Vec<String>,
}

/// Brand tier of a catalog brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandTier {
    /// Tier 1.
    Premium,
    /// Tier 2.
    HighEnd,
    /// Tier 3.
    Mid,
    /// Not listed.
    Unranked,
}

/// Maps name keywords to a product type. First matching rule wins, so
/// more specific types belong earlier in the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRule {
    /// Type name (e.g. "laptop").
    pub name: String,
    /// Lowercase keywords matched as substrings of the item name.
    pub keywords: Vec<String>,
}

/// Accessory relationship for one product type: which candidate
/// keywords mark an accessory worth boosting alongside similar items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryRule {
    /// Product type this rule applies to.
    pub product_type: String,
    /// Strong accessory keywords.
    pub primary: Vec<String>,
    /// Weaker accessory keywords.
    pub secondary: Vec<String>,
    /// Score bonus for a primary keyword match.
    pub primary_boost: f32,
    /// Score bonus for a secondary keyword match.
    pub secondary_boost: f32,
    /// Damping applied when the query item sits in a premium
    /// category: premium shoppers see proportionally more similar
    /// items and fewer accessories.
    pub premium_damping: f32,
}

/// Full injectable configuration for the content engine.
///
/// # Examples
///
/// ```
/// use recomendar::content::ContentConfig;
///
/// let config = ContentConfig::default();
/// assert_eq!(config.detect_type("geforce rtx super"), "vga");
/// assert_eq!(config.detect_type("garden hose"), "other");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Brand tier lists.
    pub brand_tiers: BrandTiers,
    /// Category tier lists.
    pub category_tiers: CategoryTiers,
    /// Ordered keyword → type table.
    pub type_rules: Vec<TypeRule>,
    /// Component types that get the stricter same-category-and-type
    /// selection quota.
    pub core_types: Vec<String>,
    /// Accessory relationships per product type.
    pub accessory_rules: Vec<AccessoryRule>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            brand_tiers: BrandTiers {
                premium: strings(&["Apple", "Samsung", "Sony"]),
                high_end: strings(&["LG", "MSI", "Asus", "JBL", "Logitech"]),
                mid: strings(&["OPPO", "Vivo", "Xiaomi", "Lenovo", "HP"]),
            },
            category_tiers: CategoryTiers {
                premium: strings(&["Phones", "Gaming Laptops", "PC & Components"]),
                high_end: strings(&["Tablets", "Cameras", "Consoles & Games"]),
            },
            type_rules: vec![
                TypeRule {
                    name: "vga".to_string(),
                    keywords: strings(&["vga", "geforce", "radeon", "rtx", "gtx"]),
                },
                TypeRule {
                    name: "cpu".to_string(),
                    keywords: strings(&["cpu", "ryzen", "core i", "processor"]),
                },
                TypeRule {
                    name: "ram".to_string(),
                    keywords: strings(&["ram", "ddr"]),
                },
                TypeRule {
                    name: "mainboard".to_string(),
                    keywords: strings(&["mainboard", "motherboard"]),
                },
                TypeRule {
                    name: "headphone".to_string(),
                    keywords: strings(&["headphone", "earbud", "headset"]),
                },
                TypeRule {
                    name: "smartwatch".to_string(),
                    keywords: strings(&["watch", "band"]),
                },
                TypeRule {
                    name: "tablet".to_string(),
                    keywords: strings(&["ipad", "tablet"]),
                },
                TypeRule {
                    name: "phone".to_string(),
                    keywords: strings(&["iphone", "smartphone", "galaxy"]),
                },
                TypeRule {
                    name: "laptop".to_string(),
                    keywords: strings(&["laptop", "notebook", "macbook"]),
                },
                TypeRule {
                    name: "pc".to_string(),
                    keywords: strings(&["desktop", "pc"]),
                },
                TypeRule {
                    name: "speaker".to_string(),
                    keywords: strings(&["speaker", "soundbar"]),
                },
                TypeRule {
                    name: "network".to_string(),
                    keywords: strings(&["router", "wifi", "mesh"]),
                },
                TypeRule {
                    name: "case".to_string(),
                    keywords: strings(&["case", "cover", "sleeve"]),
                },
                TypeRule {
                    name: "smartdevice".to_string(),
                    keywords: strings(&["smart home", "smart tag", "smart plug"]),
                },
            ],
            core_types: strings(&["vga", "cpu", "ram", "mainboard"]),
            accessory_rules: vec![
                AccessoryRule {
                    product_type: "phone".to_string(),
                    primary: strings(&["case", "cover", "screen protector"]),
                    secondary: strings(&["charger", "cable", "power bank"]),
                    primary_boost: 0.06,
                    secondary_boost: 0.03,
                    premium_damping: 0.5,
                },
                AccessoryRule {
                    product_type: "laptop".to_string(),
                    primary: strings(&["sleeve", "docking", "stand"]),
                    secondary: strings(&["mouse", "charger", "hub"]),
                    primary_boost: 0.06,
                    secondary_boost: 0.03,
                    premium_damping: 0.5,
                },
                AccessoryRule {
                    product_type: "pc".to_string(),
                    primary: strings(&["monitor", "keyboard"]),
                    secondary: strings(&["mouse", "speaker"]),
                    primary_boost: 0.05,
                    secondary_boost: 0.03,
                    premium_damping: 0.5,
                },
            ],
        }
    }
}

impl ContentConfig {
    /// Loads a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a serialization error on malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file is unreadable or a
    /// serialization error on malformed JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Product type of an item name; `"other"` when no keyword
    /// matches. Matching is case-insensitive and positional (first
    /// rule in table order wins).
    #[must_use]
    pub fn detect_type(&self, name: &str) -> &str {
        let lowered = name.to_lowercase();
        for rule in &self.type_rules {
            if rule.keywords.iter().any(|kw| lowered.contains(kw.as_str())) {
                return &rule.name;
            }
        }
        "other"
    }

    /// Tier of a brand.
    #[must_use]
    pub fn brand_tier(&self, brand: &str) -> BrandTier {
        if self.brand_tiers.premium.iter().any(|b| b == brand) {
            BrandTier::Premium
        } else if self.brand_tiers.high_end.iter().any(|b| b == brand) {
            BrandTier::HighEnd
        } else if self.brand_tiers.mid.iter().any(|b| b == brand) {
            BrandTier::Mid
        } else {
            BrandTier::Unranked
        }
    }

    /// True for a premium-tier category.
    #[must_use]
    pub fn is_premium_category(&self, category: &str) -> bool {
        self.category_tiers.premium.iter().any(|c| c == category)
    }

    /// True for a core component type (stricter selection quotas).
    #[must_use]
    pub fn is_core_type(&self, product_type: &str) -> bool {
        self.core_types.iter().any(|t| t == product_type)
    }

    /// Accessory rule for a product type, if configured.
    #[must_use]
    pub fn accessory_rule(&self, product_type: &str) -> Option<&AccessoryRule> {
        self.accessory_rules
            .iter()
            .find(|r| r.product_type == product_type)
    }
}
