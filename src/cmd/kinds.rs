//! Kinds command CLI handler.

use fixture_gen::TableKind;

pub fn run() -> anyhow::Result<()> {
    println!("{:<16} {:<12} {:<8} ALIASES", "KIND", "CADENCE", "COLUMNS");
    for kind in TableKind::ALL {
        println!(
            "{:<16} {:<12} {:<8} {}",
            kind.id(),
            kind.cadence().to_string(),
            kind.schema().columns.len(),
            kind.aliases().join(", ")
        );
    }
    Ok(())
}
