//! Liquid catalog
//!
//! Built-in liquids plus any custom ones from the config file, seeded into
//! the session store so lookups go through one place.

use rusqlite::Connection;
use tracing::debug;

use crate::db;
use crate::error::{Error, Result};
use crate::models::LiquidProfile;

/// Highest target temperature a liquid profile may declare.
pub const MAX_TARGET_TEMPERATURE_C: f64 = 150.0;

/// The five liquids the calculator ships with
pub fn default_liquids() -> Vec<LiquidProfile> {
    vec![
        LiquidProfile::new("Water", 100.0).with_aliases(&["Agua"]),
        LiquidProfile::new("Milk", 90.0).with_aliases(&["Leche"]),
        LiquidProfile::new("Soup", 95.0).with_aliases(&["Broth", "Caldo", "Sopa", "Caldo / Sopa"]),
        LiquidProfile::new("Coffee", 75.0).with_aliases(&["Café", "Café frío para recalentar"]),
        LiquidProfile::new("Chocolate", 85.0)
            .with_aliases(&["Hot chocolate", "Chocolate caliente"]),
    ]
}

/// Check a profile before it enters the catalog
pub fn validate_liquid(liquid: &LiquidProfile) -> Result<()> {
    if liquid.name.trim().is_empty() {
        return Err(Error::InvalidLiquid {
            name: liquid.name.clone(),
            reason: "name must not be empty".to_string(),
        });
    }
    let target = liquid.target_temperature_c;
    if !(target.is_finite() && target > 0.0 && target <= MAX_TARGET_TEMPERATURE_C) {
        return Err(Error::InvalidLiquid {
            name: liquid.name.clone(),
            reason: format!(
                "target temperature {} °C is outside (0, {}]",
                target, MAX_TARGET_TEMPERATURE_C
            ),
        });
    }
    Ok(())
}

/// Write the built-in liquids and `extra` into the store
///
/// Extra liquids with the same name as a built-in replace it.
pub fn seed_catalog(conn: &Connection, extra: &[LiquidProfile]) -> Result<usize> {
    let mut count = 0;
    for liquid in default_liquids().iter().chain(extra) {
        validate_liquid(liquid)?;
        db::upsert_liquid(conn, liquid)?;
        count += 1;
    }
    debug!(count, "seeded liquid catalog");
    Ok(count)
}

pub fn list_liquids(conn: &Connection) -> Result<Vec<LiquidProfile>> {
    db::list_liquids(conn)
}

/// Find a liquid by name or alias, ignoring case and accents
pub fn find_liquid(conn: &Connection, name: &str) -> Result<LiquidProfile> {
    let query = name.trim();
    if let Some(liquid) = db::get_liquid(conn, query)? {
        return Ok(liquid);
    }

    let folded = fold(query);
    let liquids = db::list_liquids(conn)?;
    let by_name = liquids.iter().find(|l| fold(&l.name) == folded);
    let by_alias = || {
        liquids
            .iter()
            .find(|l| l.aliases.iter().any(|alias| fold(alias) == folded))
    };
    if let Some(liquid) = by_name.or_else(by_alias) {
        return Ok(liquid.clone());
    }

    let suggestions = liquids
        .iter()
        .filter(|l| {
            !folded.is_empty()
                && labels(l).any(|label| {
                    let label = fold(label);
                    label.contains(&folded)
                        || folded.contains(&label)
                        || shares_prefix(&label, &folded, 3)
                })
        })
        .map(|l| l.name.clone())
        .collect();

    Err(Error::UnknownLiquid {
        name: query.to_string(),
        suggestions,
    })
}

fn labels(liquid: &LiquidProfile) -> impl Iterator<Item = &str> {
    std::iter::once(liquid.name.as_str()).chain(liquid.aliases.iter().map(String::as_str))
}

fn shares_prefix(a: &str, b: &str, len: usize) -> bool {
    a.chars().count() >= len
        && b.chars().count() >= len
        && a.chars().take(len).eq(b.chars().take(len))
}

/// Lowercase and strip the Spanish accents the aliases use
fn fold(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}
