//! Aggregates module
pub mod achievement;
pub mod category;
pub mod product;

pub use achievement::{Achievement, NewAchievement};
pub use category::{Category, NewCategory};
pub use product::{NewProduct, Product};

use validator::ValidationError;

/// A record held by a provider, addressed by its store id.
pub trait Record: Clone + Send + Sync + 'static {
    /// Human-readable entity name used in errors and logs.
    const KIND: &'static str;
    fn id(&self) -> &str;
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("is required".into());
        return Err(err);
    }
    Ok(())
}
