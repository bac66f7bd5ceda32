//! Variants command implementation

use crate::variant::Variant;
use anyhow::Result;

/// Print each variant with its primary field and required configuration keys
pub fn run_variants() -> Result<()> {
    for variant in Variant::ALL {
        println!("{}", variant);
        println!("   primary field: {}", variant.primary_field());
        println!(
            "   required keys: PRIMARY_SERVER, AUTH_COOKIE, {}",
            variant.required_keys().join(", ")
        );
        println!("   status column: {}", variant.status_column());
    }
    Ok(())
}
