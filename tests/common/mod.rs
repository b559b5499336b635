//! Synthetic vehicle listings shared by the integration tests

#![allow(dead_code)]

use autosense::ingestion::documents_to_frame;
use autosense::store::{Document, InMemoryStore};
use polars::prelude::DataFrame;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;

pub const DATABASE: &str = "AutoSense";
pub const COLLECTION: &str = "data";

const MAKES: &[(&str, f64)] = &[
    ("audi", 6000.0),
    ("ford", 0.0),
    ("honda", 1500.0),
    ("kia", -1000.0),
    ("toyota", 2000.0),
];
const TRANSMISSIONS: &[&str] = &["automatic", "manual"];
const FUELS: &[&str] = &["diesel", "electric", "gasoline"];
const DRIVETRAINS: &[&str] = &["awd", "fwd", "rwd"];
const BODIES: &[&str] = &["hatchback", "sedan", "suv", "truck"];

/// `n` listings with a price that is mostly linear in the features
pub fn vehicle_documents(n: usize, seed: u64) -> Vec<Document> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let (make, premium) = *MAKES.choose(&mut rng).unwrap();
            let vehicle_age: i64 = rng.gen_range(0..15);
            let mileage: f64 = (rng.gen_range(0.0..15_000.0) * (vehicle_age as f64 + 1.0)).round();
            let engine_hp: f64 = rng.gen_range(90.0..400.0_f64).round();
            let noise: f64 = rng.gen_range(-500.0..500.0);
            let price = 12_000.0 + premium + 60.0 * engine_hp - 0.04 * mileage - 700.0 * vehicle_age as f64 + noise;

            let doc = json!({
                "_id": format!("listing-{}", i),
                "make": make,
                "mileage": mileage,
                "year": 2024 - vehicle_age,
                "engine_hp": engine_hp,
                "vehicle_age": vehicle_age,
                "transmission": *TRANSMISSIONS.choose(&mut rng).unwrap(),
                "fuel_type": *FUELS.choose(&mut rng).unwrap(),
                "drivetrain": *DRIVETRAINS.choose(&mut rng).unwrap(),
                "body_type": *BODIES.choose(&mut rng).unwrap(),
                "listing_url": format!("https://example.com/{}", i),
                "price": (price * 100.0).round() / 100.0,
            });
            doc.as_object().cloned().unwrap()
        })
        .collect()
}

pub fn vehicle_store(n: usize, seed: u64) -> InMemoryStore {
    InMemoryStore::new().with_documents(DATABASE, COLLECTION, vehicle_documents(n, seed))
}

pub fn vehicle_frame(n: usize, seed: u64) -> DataFrame {
    let mut frame = documents_to_frame(&vehicle_documents(n, seed)).unwrap();
    frame = frame.drop("listing_url").unwrap();
    frame
}

/// Standard normal samples via Box-Muller
pub fn normal_sample(n: usize, mean: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
            let u2: f64 = rng.gen::<f64>();
            mean + (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
        })
        .collect()
}
