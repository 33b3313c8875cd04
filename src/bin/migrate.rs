use anyhow::{anyhow, Result};
use booking_bot::config::{DatabaseSettings, ScheduleSettings};
use booking_bot::database::connection::{sqlite_file_path, DatabaseManager};
use booking_bot::database::models::Booking;
use booking_bot::services::retention::RetentionPolicy;
use booking_bot::services::timezone::LocalClock;
use booking_bot::utils::datetime::format_date;
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // sqlx reports through `log`
    env_logger::init();
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "purge" => purge_expired().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn connect() -> Result<DatabaseManager> {
    let settings = DatabaseSettings::from_env()?;
    println!("📊 Database URL: {}", mask_url(&settings.url));

    DatabaseManager::from_settings(&settings)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))
}

async fn run_migrations() -> Result<()> {
    println!("🔧 Booking Bot - Database Migration Tool");
    println!("========================================");

    let db_manager = connect().await?;

    println!("🚀 Running database migrations...");
    match db_manager.run_migrations().await {
        Ok(_) => {
            println!("✅ Migrations completed successfully!");
        }
        Err(e) => {
            eprintln!("❌ Migration failed: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");

    let db_manager = connect().await?;

    let tables = check_tables(&db_manager).await?;
    println!("✅ Database connection successful!");
    println!("📋 Found tables:");
    for table in &tables {
        println!("  • {table}");
    }

    if tables.iter().any(|t| t == "appointments") {
        let count = Booking::count(&db_manager.pool).await?;
        println!("🗓  Bookings stored: {count}");
    } else {
        println!("⚠️  Table 'appointments' is missing");
        println!("💡 Try running 'migrate up' to create the schema");
    }

    Ok(())
}

async fn purge_expired() -> Result<()> {
    let schedule = ScheduleSettings::from_env()?;
    let clock = LocalClock::from_offset_hours(schedule.utc_offset_hours)?;
    let policy = RetentionPolicy::new(schedule.retention_days, clock);

    let db_manager = connect().await?;
    db_manager.run_migrations().await?;

    println!("🧹 Removing bookings dated before {}...", format_date(policy.cutoff()));
    let report = policy.purge(&db_manager.pool).await?;
    println!("✅ Removed {} booking(s)", report.removed);

    Ok(())
}

async fn check_tables(db_manager: &DatabaseManager) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(&db_manager.pool)
    .await?;

    Ok(tables)
}

/// Shows only the file name of SQLite paths.
fn mask_url(url: &str) -> String {
    sqlite_file_path(url)
        .and_then(|path| Path::new(path).file_name())
        .map(|name| format!("sqlite:.../{}", name.to_string_lossy()))
        .unwrap_or_else(|| url.to_string())
}

fn print_help() {
    println!("💅 Booking Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up    Run database migrations (default)");
    println!("    check          Check database connection, schema and booking count");
    println!("    purge          Delete bookings older than RETENTION_DAYS");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL       Database connection string (default: sqlite:./data/bookings.db)");
    println!("    RETENTION_DAYS     Days of past bookings to keep (default: 2)");
    println!("    UTC_OFFSET_HOURS   Salon time zone offset (default: 6)");
    println!();
    println!("EXAMPLES:");
    println!("    migrate                    # Run migrations");
    println!("    migrate check              # Check database status");
    println!("    migrate purge              # Remove expired bookings");
    println!();
}
