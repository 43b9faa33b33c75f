//! Value Objects for the catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// URL-safe identifier derived from a human-readable name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Lowercases, collapses every run of non-alphanumeric characters into a
    /// single hyphen and strips hyphens from both ends.
    pub fn from_name(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        let mut pending_hyphen = false;
        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(ch.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_string(self) -> String { self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// The fixed, hand-maintained set of category identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategorySlug {
    Rice,
    Seeds,
    Oil,
    Minerals,
    BromineSalt,
    Sugar,
    SpecialCategory,
}

impl CategorySlug {
    pub const ALL: [CategorySlug; 7] = [
        Self::Rice,
        Self::Seeds,
        Self::Oil,
        Self::Minerals,
        Self::BromineSalt,
        Self::Sugar,
        Self::SpecialCategory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rice => "rice",
            Self::Seeds => "seeds",
            Self::Oil => "oil",
            Self::Minerals => "minerals",
            Self::BromineSalt => "bromine-salt",
            Self::Sugar => "sugar",
            Self::SpecialCategory => "special-category",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slug| slug.as_str() == value)
    }
}

impl fmt::Display for CategorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Identity stamped on writes as `updatedBy`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    pub const SYSTEM: &'static str = "system";

    /// Falls back to the system identity when no authenticated actor is known.
    pub fn from_optional(actor: Option<&str>) -> Self {
        match actor.map(str::trim) {
            Some(name) if !name.is_empty() => Self(name.to_string()),
            _ => Self::system(),
        }
    }

    pub fn system() -> Self { Self(Self::SYSTEM.to_string()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for Actor {
    fn default() -> Self { Self::system() }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Query parameter used to defeat CDN and browser caches.
pub const CACHE_BUST_PARAM: &str = "v";

/// Appends `v=<millis>` unless the URL already carries a cache-busting parameter.
pub fn cache_busted(url: &str, at: DateTime<Utc>) -> String {
    if url.is_empty() || has_cache_bust(url) {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{CACHE_BUST_PARAM}={}", at.timestamp_millis())
}

/// The URL with any cache-busting parameter removed, as it should be stored.
pub fn without_cache_bust(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else { return url.to_string() };
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && pair.split('=').next() != Some(CACHE_BUST_PARAM))
        .collect();
    if kept.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", kept.join("&"))
    }
}

fn has_cache_bust(url: &str) -> bool {
    let Some((_, query)) = url.split_once('?') else { return false };
    query
        .split('&')
        .any(|pair| pair.split('=').next() == Some(CACHE_BUST_PARAM))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slug_collapses_separators() {
        assert_eq!(Slug::from_name("Basmati Rice (1121) -- Premium").as_str(), "basmati-rice-1121-premium");
        assert_eq!(Slug::from_name("  --Sona Masoori!! ").as_str(), "sona-masoori");
        assert_eq!(Slug::from_name("***").as_str(), "");
    }

    #[test]
    fn test_category_slug_parse() {
        assert_eq!(CategorySlug::parse("bromine-salt"), Some(CategorySlug::BromineSalt));
        assert_eq!(CategorySlug::parse("spices"), None);
        let json = serde_json::to_string(&CategorySlug::SpecialCategory).unwrap();
        assert_eq!(json, "\"special-category\"");
    }

    #[test]
    fn test_actor_defaults_to_system() {
        assert_eq!(Actor::from_optional(None).as_str(), "system");
        assert_eq!(Actor::from_optional(Some("  ")).as_str(), "system");
        assert_eq!(Actor::from_optional(Some("admin@farm.example")).as_str(), "admin@farm.example");
    }

    #[test]
    fn test_cache_busted() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(cache_busted("https://cdn.example/a.jpg", at), "https://cdn.example/a.jpg?v=1700000000000");
        assert_eq!(cache_busted("https://cdn.example/a.jpg?w=300", at), "https://cdn.example/a.jpg?w=300&v=1700000000000");
        assert_eq!(cache_busted("https://cdn.example/a.jpg?v=1", at), "https://cdn.example/a.jpg?v=1");
        assert_eq!(cache_busted("", at), "");
    }

    #[test]
    fn test_without_cache_bust() {
        assert_eq!(without_cache_bust("https://cdn.example/a.jpg?v=17"), "https://cdn.example/a.jpg");
        assert_eq!(without_cache_bust("https://cdn.example/a.jpg?w=300&v=17"), "https://cdn.example/a.jpg?w=300");
        assert_eq!(without_cache_bust("https://cdn.example/a.jpg?w=300"), "https://cdn.example/a.jpg?w=300");
        assert_eq!(without_cache_bust("/images/rice.jpg"), "/images/rice.jpg");
    }
}
