//! Expansion of RAM × storage options into sellable variants.

use phonespec_shared::{PriceBlock, Variant};

/// Attributes shared by every variant of one device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedAttributes {
    pub processor: String,
    pub connectivity: String,
    pub year: String,
}

/// A pre-resolved (RAM, storage) pair read directly from a source's
/// version table, in GB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRow {
    pub ram_gb: String,
    pub storage_gb: String,
}

fn variant(id: u32, ram_gb: &str, storage_gb: &str, shared: &SharedAttributes) -> Variant {
    Variant {
        id,
        version: String::new(),
        processor: shared.processor.clone(),
        ram_gb: ram_gb.to_string(),
        storage_gb: storage_gb.to_string(),
        connectivity: shared.connectivity.clone(),
        year: shared.year.clone(),
        price: PriceBlock::default(),
    }
}

/// Cartesian product of `ram_options` × `storage_options`, RAM-major, with
/// ids `1..=m*n`.
pub fn expand_variants(
    ram_options: &[String],
    storage_options: &[String],
    shared: &SharedAttributes,
) -> Vec<Variant> {
    ram_options
        .iter()
        .flat_map(|ram| storage_options.iter().map(move |storage| (ram, storage)))
        .zip(1u32..)
        .map(|((ram, storage), id)| variant(id, ram, storage, shared))
        .collect()
}

/// One variant per version row, numbered sequentially from 1.
pub fn variants_from_rows(rows: &[VersionRow], shared: &SharedAttributes) -> Vec<Variant> {
    rows.iter()
        .zip(1u32..)
        .map(|(row, id)| variant(id, &row.ram_gb, &row.storage_gb, shared))
        .collect()
}
