//! Synthetic Transaction Generator
//!
//! Generates realistic transactions and submits them to the prediction
//! API for load and smoke testing. Amounts follow log-normal
//! distributions (fraudulent traffic skews larger), categorical fields
//! follow the weights observed in real traffic.

use fraud_detection_api::types::TransactionInput;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_distr::LogNormal;
use std::time::Duration;
use tracing::{info, warn};

const MERCHANT_CATEGORIES: [&str; 6] = [
    "Retail",
    "Food",
    "Transport",
    "Entertainment",
    "Other",
    "Online",
];
const MERCHANT_WEIGHTS: [f64; 6] = [0.3, 0.2, 0.15, 0.15, 0.1, 0.1];

const LOCATIONS: [&str; 5] = ["US", "UK", "EU", "ASIA", "LATAM"];
const LOCATION_WEIGHTS: [f64; 5] = [0.4, 0.2, 0.2, 0.15, 0.05];

/// Transaction generator with separate amount profiles for legitimate
/// and fraudulent traffic.
struct TransactionGenerator {
    rng: ThreadRng,
    legitimate_amount: LogNormal<f64>,
    fraudulent_amount: LogNormal<f64>,
    merchant_dist: WeightedIndex<f64>,
    location_dist: WeightedIndex<f64>,
    counter: u64,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            legitimate_amount: LogNormal::new(6.0, 0.5).expect("valid distribution"),
            fraudulent_amount: LogNormal::new(8.0, 1.0).expect("valid distribution"),
            merchant_dist: WeightedIndex::new(MERCHANT_WEIGHTS).expect("valid weights"),
            location_dist: WeightedIndex::new(LOCATION_WEIGHTS).expect("valid weights"),
            counter: 0,
        }
    }

    fn generate(&mut self, fraudulent: bool) -> TransactionInput {
        self.counter += 1;

        let amount = if fraudulent {
            self.fraudulent_amount.sample(&mut self.rng)
        } else {
            self.legitimate_amount.sample(&mut self.rng)
        };

        // Fraudulent traffic clusters at night
        let time = if fraudulent {
            self.rng.gen_range(0.0..6.0)
        } else {
            self.rng.gen_range(0.0..24.0)
        };

        TransactionInput {
            amount,
            time,
            merchant_category: MERCHANT_CATEGORIES[self.merchant_dist.sample(&mut self.rng)]
                .to_string(),
            customer_id: format!("CUST_{:04}", self.counter % 1000),
            location: LOCATIONS[self.location_dist.sample(&mut self.rng)].to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_transactions=info".parse()?),
        )
        .init();

    info!("Starting Synthetic Transaction Generator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let api_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("http://localhost:8000");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let fraud_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.05);
    let delay_ms: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        api_url = %api_url,
        count = count,
        fraud_rate = fraud_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = reqwest::Client::new();

    // Liveness check; fall back to dry-run when the API is unreachable
    match client.get(format!("{api_url}/")).send().await {
        Ok(_) => info!("Connected to prediction API"),
        Err(e) => {
            warn!(error = %e, "Prediction API unreachable. Running in dry-run mode.");
            return run_dry_mode(count, fraud_rate, delay_ms).await;
        }
    }

    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Submitting {} transactions...", count);

    let mut submitted = 0u64;
    let mut flagged = 0u64;
    let mut errors = 0u64;

    for i in 0..count {
        let transaction = generator.generate(rng.gen_bool(fraud_rate));

        match client
            .post(format!("{api_url}/predict"))
            .json(&transaction)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                submitted += 1;
                let verdict: serde_json::Value = response.json().await?;
                if verdict["is_fraud"].as_bool().unwrap_or(false) {
                    flagged += 1;
                }
            }
            Ok(response) => {
                errors += 1;
                warn!(
                    status = %response.status(),
                    amount = transaction.amount,
                    "Prediction rejected"
                );
            }
            Err(e) => {
                errors += 1;
                warn!(error = %e, "Request failed");
            }
        }

        if (i + 1) % 10 == 0 {
            info!(
                "Submitted {}/{} transactions ({} flagged, {} errors)",
                i + 1,
                count,
                flagged,
                errors
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! {} scored, {} flagged as fraud, {} errors",
        submitted, flagged, errors
    );

    Ok(())
}

async fn run_dry_mode(count: u64, fraud_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no API connection)");

    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let transaction = generator.generate(rng.gen_bool(fraud_rate));

        if (i + 1) % 10 == 0 || i == 0 {
            let json = serde_json::to_string_pretty(&transaction)?;
            info!("Sample transaction {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
