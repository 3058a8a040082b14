//! Build script for Plugtify.
//!
//! Copies the `.env.example` template from the crate root into the local data
//! directory (`<data_local_dir>/plugtify/.env.example`) so a user can turn it into
//! the `.env` file `config::load_env` reads. A missing template only produces a
//! cargo warning.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("plugtify");

    if env_example_path.is_file() {
        // copying is best effort, the build never fails on it
        if let Err(e) = fs::create_dir_all(&out_dir)
            .and_then(|_| fs::copy(&env_example_path, out_dir.join(".env.example")).map(|_| ()))
        {
            println!("cargo:warning=could not copy .env.example to {}: {}", out_dir.display(), e);
        }
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
    }

    Ok(())
}
