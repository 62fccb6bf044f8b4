//! Walkthrough of the Filament identity lifecycle.
//!
//! Generates a node identity, shows both canonical string forms, proves
//! ownership with a signature, and exports a root specification.
//!
//! Run with:
//!   cargo run --example demo

use std::sync::Arc;

use chrono::Utc;

use filament_protocol::engine::software::SoftwareEngine;
use filament_protocol::{CipherSuite, CryptoEngine, Identity, InetAddress};

fn main() {
    let engine: Arc<dyn CryptoEngine> = Arc::new(SoftwareEngine::new());

    // A fresh node identity. The address is derived from the public key,
    // so the name certifies itself.
    let identity = Identity::generate(&engine, CipherSuite::Curve25519)
        .expect("software engine generates curve25519 identities");
    println!("address        : {}", identity.address());
    println!("identity.public: {}", identity.public_string());
    println!("identity.secret: {}", identity.secret_string());

    // What a peer does: parse the public form and verify a signature.
    let peer_view: Identity = identity
        .public_string()
        .parse()
        .expect("canonical form reparses");
    let message = b"hello from the overlay";
    let signature = identity.sign(&engine, message).expect("we hold the secret");
    println!("signature ok   : {}", peer_view.verify(&engine, message, &signature));
    println!("self-validates : {}", identity.locally_validate(&engine));

    // Root nodes additionally publish where they can be reached.
    let endpoints: Vec<InetAddress> = vec![
        "198.51.100.7/9993".parse().unwrap(),
        "2001:db8::7/9993".parse().unwrap(),
    ];
    let spec = identity
        .make_root(&engine, &endpoints, Utc::now())
        .expect("root spec needs a private key and endpoints");
    println!("root spec      : {} bytes", spec.len());
}
