use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use foodbridge_match_engine::{
    plan_notifications, scoring, CandidateProvider, Donation, EngineConfig, GeoLocation, MatchEngine,
    NewNgo, QualityLabel, SqliteDirectory, Unit,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "match-engine-cli")]
#[command(about = "FoodBridge Match Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database path (defaults to DB_PATH or foodbridge.db)
    #[arg(short, long)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a donation to an NGO
    Match {
        /// Food item name
        food: String,

        /// Quantity in the given unit
        quantity: u32,

        /// Unit (kg, liters, pieces, ...)
        #[arg(short, long, default_value = "kg")]
        unit: Unit,

        /// Quality label ("Fresh", "Expires Soon", ...)
        #[arg(short, long, default_value = "Fresh")]
        quality: QualityLabel,

        /// Expiry date (YYYY-MM-DD)
        #[arg(short, long)]
        expiry: NaiveDate,

        /// Donor city, resolved against known places
        #[arg(short, long)]
        city: Option<String>,

        /// Search radius in km
        #[arg(short = 'r', long)]
        max_distance: Option<f64>,
    },

    /// List active NGOs
    Ngos {
        /// Minimum capacity
        #[arg(short, long, default_value = "1")]
        min_capacity: u32,
    },

    /// Register an NGO
    Register {
        /// NGO name
        name: String,

        /// Capacity in donation units
        capacity: u32,

        /// Organization name
        #[arg(short, long, default_value = "")]
        organization: String,

        /// City of the NGO, resolved against known places
        #[arg(short, long)]
        city: Option<String>,
    },

    /// Great-circle distance between two coordinates
    Distance {
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    },

    /// Suggest known places for a city name
    Locate {
        query: String,

        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Get directory statistics
    Stats,
}

fn resolve_city(city: &str) -> anyhow::Result<GeoLocation> {
    scoring::locate(city).ok_or_else(|| anyhow::anyhow!("Unknown city: {}", city))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = EngineConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Match { food, quantity, unit, quality, expiry, city, max_distance } => {
            let directory = Arc::new(SqliteDirectory::new(&config.db_path).await?);
            let engine = MatchEngine::with_ai_settings(directory, config.options.clone(), &config.ai);

            let donation = Donation::new(food, quantity, unit, quality, expiry)?;
            let donor = city.as_deref().map(resolve_city).transpose()?;

            let request = engine.checked_request(donation, donor, max_distance)?;

            println!("🔍 Matching: {}", request.donation.display());
            let result = engine.match_donation(&request).await;

            let Some(selected) = result.selected.as_ref() else {
                println!("\n❌ {}", result.reasoning);
                return Ok(());
            };

            println!("\n✅ Selected: {}", selected.ngo.display_name());
            println!("   Score: {:.3}", selected.score);
            if let Some(distance) = selected.distance_km {
                println!("   Distance: {:.2}km", distance);
            }
            println!("   Method: {}", result.method.as_str());
            println!("   Confidence: {:.2}", result.confidence);
            println!("   Reasoning: {}", result.reasoning);

            if !result.alternatives.is_empty() {
                println!("\n📋 Alternatives:");
                for (i, alt) in result.alternatives.iter().enumerate() {
                    println!("   {}. {} ({:.3})", i + 1, alt.ngo.display_name(), alt.score);
                }
            }

            let notifications = plan_notifications(&request.donation, &result);
            if !notifications.is_empty() {
                println!("\n📨 Would notify:");
                for note in &notifications {
                    println!("   NGO {} ({:?})", note.ngo_id, note.priority);
                }
            }
        }

        Commands::Ngos { min_capacity } => {
            let directory = SqliteDirectory::new(&config.db_path).await?;
            let ngos = directory.get_candidates(min_capacity).await?;

            println!("🏢 {} active NGOs (capacity >= {}):", ngos.len(), min_capacity);
            for ngo in ngos {
                println!(
                    "   #{} {} - capacity {} - {}",
                    ngo.id,
                    ngo.display_name(),
                    ngo.capacity,
                    ngo.city().unwrap_or("no location")
                );
            }
        }

        Commands::Register { name, capacity, organization, city } => {
            let directory = SqliteDirectory::new(&config.db_path).await?;
            let mut ngo = NewNgo::new(name, capacity);
            ngo.organization = organization;
            if let Some(city) = city.as_deref() {
                ngo = ngo.with_location(resolve_city(city)?);
            }

            let id = directory.register(&ngo).await?;
            println!("✅ Registered {} as #{}", ngo.name, id);
        }

        Commands::Distance { lat1, lon1, lat2, lon2 } => {
            let from = GeoLocation::new(lat1, lon1)?;
            let to = GeoLocation::new(lat2, lon2)?;
            let distance = scoring::distance_km(&from, &to);

            println!("📏 {:.2}km", distance);
            println!(
                "   Proximity score ({}km radius): {:.3}",
                config.options.max_distance_km,
                scoring::proximity_score(distance, config.options.max_distance_km)
            );
        }

        Commands::Locate { query, limit } => {
            let places = scoring::suggest_locations(&query, limit);
            if places.is_empty() {
                println!("❌ No known place matches '{}'", query);
            }
            for place in places {
                println!("📍 {} ({:.4}, {:.4})", place.name, place.latitude, place.longitude);
            }
        }

        Commands::Stats => {
            let directory = SqliteDirectory::new(&config.db_path).await?;
            let stats = directory.stats().await?;

            println!("📊 Directory Statistics:");
            println!("   Total NGOs: {}", stats.total_ngos);
            println!("   Active NGOs: {}", stats.active_ngos);
            println!("   With location: {}", stats.located_ngos);
            println!("   Total active capacity: {}", stats.total_capacity);
        }
    }

    Ok(())
}
