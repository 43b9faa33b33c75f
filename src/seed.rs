//! Built-in catalog content: the baseline category set and the achievements
//! shown when the store has none.

use chrono::{TimeZone, Utc};

use crate::domain::aggregates::Achievement;
use crate::domain::value_objects::CategorySlug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaselineCategory {
    pub slug: CategorySlug,
    pub title: &'static str,
    pub description: &'static str,
    pub image: &'static str,
}

pub fn baseline_category(slug: CategorySlug) -> BaselineCategory {
    let (title, description, image) = match slug {
        CategorySlug::Rice => (
            "Rice",
            "Basmati and non-basmati varieties, parboiled and raw, packed to export grade.",
            "/images/categories/rice.jpg",
        ),
        CategorySlug::Seeds => (
            "Seeds",
            "Oilseeds, pulses and sowing seeds sourced from certified growers.",
            "/images/categories/seeds.jpg",
        ),
        CategorySlug::Oil => (
            "Edible Oil",
            "Refined and crude edible oils supplied in flexitanks, drums and retail packs.",
            "/images/categories/oil.jpg",
        ),
        CategorySlug::Minerals => (
            "Minerals",
            "Industrial minerals including bentonite, gypsum and silica sand.",
            "/images/categories/minerals.jpg",
        ),
        CategorySlug::BromineSalt => (
            "Bromine & Salt",
            "Bromine derivatives and industrial, edible and de-icing salt.",
            "/images/categories/bromine-salt.jpg",
        ),
        CategorySlug::Sugar => (
            "Sugar",
            "ICUMSA graded white and raw cane sugar in bulk and bagged lots.",
            "/images/categories/sugar.jpg",
        ),
        CategorySlug::SpecialCategory => (
            "Special Category",
            "Spices, dehydrated produce and custom sourcing on request.",
            "/images/categories/special-category.jpg",
        ),
    };
    BaselineCategory { slug, title, description, image }
}

pub fn baseline_categories() -> Vec<BaselineCategory> {
    CategorySlug::ALL.into_iter().map(baseline_category).collect()
}

/// Fallback list; these ids do not exist in the store.
pub fn seed_achievements() -> Vec<Achievement> {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
    [
        ("2018", "Company Founded", "Started trading rice and pulses from a single warehouse."),
        ("2020", "Export License Granted", "Registered exporter with the national export promotion council."),
        ("2023", "ISO 9001 Certified", "Quality management system certified for sourcing and packing."),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (year, title, description))| Achievement {
        id: format!("seed-{}", i + 1),
        year: year.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        image_url: None,
        certificate_url: None,
        created_at: at,
        updated_at: at,
    })
    .collect()
}
