//! API token generator
//!
//! Mints a random API token and prints the SQL insert for `api_tokens`.
//! Run with: cargo run --bin gen_token -- --name "reporting service"

use rand::RngCore;
use sha2::{Digest, Sha256};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let name = args
        .iter()
        .position(|a| a == "--name")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "unnamed".to_string());

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let token_hash = hex::encode(Sha256::digest(token.as_bytes()));

    println!("Token (give to the caller, shown once): {token}");
    println!();
    println!("INSERT INTO api_tokens (id, name, token_hash, is_active)");
    println!("VALUES (gen_random_uuid(), '{name}', '{token_hash}', true);");
}
