// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for flood simulation.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// Messages that carry a denylisted phrase, in assorted casing.
pub fn spam_messages() -> Vec<&'static str> {
    vec![
        "Congratulations, click here to claim your prize",
        "YOU ARE A WINNER!!!",
        "Cheap Viagra shipped overnight",
        "Best online CASINO bonuses",
        "Lottery results inside",
        "Get FREE money today",
    ]
}

/// Ordinary enquiries with no denylisted phrase.
pub fn ham_messages() -> Vec<&'static str> {
    vec![
        "Let's schedule a call tomorrow",
        "I enjoyed your talk on async Rust.",
        "Are you open to a contract role next quarter?",
        "Your portfolio site has a broken link on the projects page.",
    ]
}

/// A contact form body that passes validation.
pub fn valid_contact(message: &str) -> Value {
    json!({
        "name": "Samuel Okoro",
        "email": "samuel@example.com",
        "subject": "Hello from the test suite",
        "message": message,
    })
}

/// Contact form bodies that each fail validation on at least one field.
pub fn invalid_contacts() -> Vec<Value> {
    vec![
        json!({"name": "Sam", "email": "sam@example.com", "subject": "Hi", "message": "Hello"}),
        json!({"name": "Samuel 2nd", "email": "sam@example.com", "subject": "Hi", "message": "Hello"}),
        json!({"name": "Samuel Okoro", "email": "not-an-email", "subject": "Hi", "message": "Hello"}),
        json!({"name": "Samuel Okoro", "email": "sam@example.com", "subject": "   ", "message": "Hello"}),
        json!({"name": "Samuel Okoro", "email": "sam@example.com", "subject": "Hi", "message": ""}),
    ]
}
