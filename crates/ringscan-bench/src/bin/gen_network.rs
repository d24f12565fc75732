//! Writes the XLarge-tier transfer network to disk as a `ringscan` input
//! document, for end-to-end timing of the CLI.
//!
//! Usage: `cargo run -p ringscan-bench --bin gen-network --release`

use std::error::Error;
use std::fs;
use std::io::BufWriter;

use ringscan_bench::{SizeTier, generate_network, network_fixture_path};

fn main() -> Result<(), Box<dyn Error>> {
    let path = network_fixture_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    eprintln!("Generating XLarge tier...");
    let network = generate_network(&SizeTier::XLarge.config(42));
    eprintln!(
        "Generated {} transfers, {} scored accounts, {} planted rings",
        network.transfers.len(),
        network.accounts.len(),
        network.rings.len()
    );

    eprintln!("Writing JSON to {}...", path.display());
    let out = fs::File::create(&path)?;
    serde_json::to_writer(BufWriter::new(out), &network.to_document())?;

    let meta = fs::metadata(&path)?;
    eprintln!("JSON: {:.1} MB", meta.len() as f64 / (1024.0 * 1024.0));
    Ok(())
}
