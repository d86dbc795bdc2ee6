use std::path::PathBuf;

use recharge_client::domain::ChargedReading;

/// Outcome of one recharge run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub readings: usize,
    pub charged_rows: usize,
    pub unresolved_identifiers: usize,
    pub unrated_readings: usize,
    pub total_gross: f64,
    /// Content hash of the charge table; equal inputs give equal digests.
    pub digest: String,
}

impl RunSummary {
    /// `unrated_readings` comes from the rate stage; a zero rate alone does
    /// not say whether an invoice was found.
    pub fn from_charges(
        output_dir: PathBuf,
        readings: usize,
        unrated_readings: usize,
        charges: &[ChargedReading],
    ) -> Self {
        Self {
            output_dir,
            readings,
            charged_rows: charges.len(),
            unresolved_identifiers: charges.iter().filter(|c| c.identifier.is_none()).count(),
            unrated_readings,
            total_gross: charges.iter().map(|c| c.gross_charge).sum(),
            digest: charges_digest(charges),
        }
    }
}

fn hash_str(hasher: &mut blake3::Hasher, s: &str) {
    let len = s.len() as u32;
    hasher.update(&len.to_le_bytes());
    hasher.update(s.as_bytes());
}

pub fn charges_digest(charges: &[ChargedReading]) -> String {
    let mut h = blake3::Hasher::new();
    h.update(&(charges.len() as u64).to_le_bytes());
    for c in charges {
        for field in c.to_row() {
            hash_str(&mut h, &field);
        }
    }
    h.finalize().to_hex().to_string()
}
