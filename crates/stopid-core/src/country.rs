//! Country codes and their flag emoji.

use crate::site::split_tags;

/// Regions offered in the country filter even when no site mentions them.
pub const EXTRA_REGIONS: &[&str] = &["International", "UE", "EU"];

/// Render flag emoji for a comma-separated country field.
///
/// `UK`, `EU`/`UE` and `International` have dedicated symbols; any other
/// two-letter alphabetic code is turned into its regional-indicator pair.
/// Unrecognised codes are skipped.
pub fn flags(country: &str) -> String {
  split_tags(country)
    .filter_map(flag)
    .collect::<Vec<_>>()
    .join(" ")
}

fn flag(code: &str) -> Option<String> {
  match code.to_ascii_uppercase().as_str() {
    "UK" => return Some("🇬🇧".to_string()),
    "EU" | "UE" => return Some("🇪🇺".to_string()),
    "INTERNATIONAL" => return Some("🌍".to_string()),
    _ => {}
  }

  if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
    return None;
  }

  code
    .chars()
    .map(|c| char::from_u32(0x1F1E6 + (c.to_ascii_uppercase() as u32 - 'A' as u32)))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn special_codes() {
    assert_eq!(flags("UK"), "🇬🇧");
    assert_eq!(flags("UE"), "🇪🇺");
    assert_eq!(flags("International"), "🌍");
  }

  #[test]
  fn iso_codes_become_regional_indicators() {
    assert_eq!(flags("FR"), "🇫🇷");
    assert_eq!(flags("us"), "🇺🇸");
  }

  #[test]
  fn lists_are_joined_and_unknown_codes_skipped() {
    assert_eq!(flags("UK, FR"), "🇬🇧 🇫🇷");
    assert_eq!(flags("FR, Quebec, AU"), "🇫🇷 🇦🇺");
    assert_eq!(flags(""), "");
  }
}
