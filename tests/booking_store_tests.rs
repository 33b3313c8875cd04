use anyhow::Result;
use booking_bot::database::{connection::DatabaseManager, models::*};
use chrono::{Duration, NaiveDate};
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url, 5).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

fn new_booking(date: &str, time: &str) -> NewBooking {
    NewBooking {
        name: "Aida".to_string(),
        service: "Eyelash extensions".to_string(),
        date: date.to_string(),
        time: time.to_string(),
        phone: "+996123456789".to_string(),
    }
}

fn two_hours() -> Duration {
    Duration::minutes(120)
}

#[tokio::test]
async fn test_booking_creation_and_retrieval() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let booking = Booking::create(&db.pool, &new_booking("2099-01-01", "14:30")).await?;
    assert!(booking.id > 0);
    assert_eq!(booking.name, "Aida");
    assert_eq!(booking.date, "2099-01-01");
    assert_eq!(booking.time, "14:30");

    let found = Booking::find_by_id(&db.pool, booking.id).await?;
    assert_eq!(found, Some(booking));

    Ok(())
}

#[tokio::test]
async fn test_ids_are_unique() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let first = Booking::create(&db.pool, &new_booking("2099-01-01", "10:00")).await?;
    let second = Booking::create(&db.pool, &new_booking("2099-01-01", "13:00")).await?;
    assert_ne!(first.id, second.id);

    Ok(())
}

#[tokio::test]
async fn test_find_all_orders_by_date_and_time() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    Booking::create(&db.pool, &new_booking("2099-01-02", "09:00")).await?;
    Booking::create(&db.pool, &new_booking("2099-01-01", "15:00")).await?;
    Booking::create(&db.pool, &new_booking("2099-01-01", "10:00")).await?;

    let slots: Vec<(String, String)> = Booking::find_all(&db.pool)
        .await?
        .into_iter()
        .map(|b| (b.date, b.time))
        .collect();

    assert_eq!(
        slots,
        vec![
            ("2099-01-01".to_string(), "10:00".to_string()),
            ("2099-01-01".to_string(), "15:00".to_string()),
            ("2099-01-02".to_string(), "09:00".to_string()),
        ]
    );

    let same_day = Booking::find_by_date(&db.pool, "2099-01-01").await?;
    assert_eq!(same_day.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_delete_missing_booking_leaves_table_intact() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let booking = Booking::create(&db.pool, &new_booking("2099-01-01", "10:00")).await?;

    assert!(!Booking::delete_by_id(&db.pool, booking.id + 100).await?);
    assert_eq!(Booking::count(&db.pool).await?, 1);

    assert!(Booking::delete_by_id(&db.pool, booking.id).await?);
    assert_eq!(Booking::count(&db.pool).await?, 0);
    assert!(Booking::find_by_id(&db.pool, booking.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_delete_before_keeps_cutoff_day() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    Booking::create(&db.pool, &new_booking("2024-12-30", "10:00")).await?;
    Booking::create(&db.pool, &new_booking("2024-12-31", "10:00")).await?;
    Booking::create(&db.pool, &new_booking("2025-01-01", "10:00")).await?;

    let cutoff = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let removed = Booking::delete_before(&db.pool, cutoff).await?;

    assert_eq!(removed, 1);
    let dates: Vec<String> = Booking::find_all(&db.pool)
        .await?
        .into_iter()
        .map(|b| b.date)
        .collect();
    assert_eq!(dates, vec!["2024-12-31".to_string(), "2025-01-01".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_checked_insert_rejects_overlap() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let outcome =
        Booking::create_if_available(&db.pool, &new_booking("2099-01-01", "14:00"), two_hours())
            .await?;
    assert!(matches!(outcome, BookingOutcome::Created(_)));

    for time in ["14:00", "15:59", "12:01"] {
        let outcome =
            Booking::create_if_available(&db.pool, &new_booking("2099-01-01", time), two_hours())
                .await?;
        assert_eq!(outcome, BookingOutcome::SlotTaken, "{time} should be taken");
    }

    let outcome =
        Booking::create_if_available(&db.pool, &new_booking("2099-01-01", "16:00"), two_hours())
            .await?;
    assert!(matches!(outcome, BookingOutcome::Created(_)));

    let outcome =
        Booking::create_if_available(&db.pool, &new_booking("2099-01-02", "14:30"), two_hours())
            .await?;
    assert!(matches!(outcome, BookingOutcome::Created(_)));

    assert_eq!(Booking::count(&db.pool).await?, 3);

    Ok(())
}

#[tokio::test]
async fn test_exact_slot_is_unique() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    Booking::create(&db.pool, &new_booking("2099-01-01", "10:00")).await?;
    assert!(Booking::create(&db.pool, &new_booking("2099-01-01", "10:00")).await.is_err());

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checked_inserts_keep_one_booking() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let mut tasks = Vec::new();
    for i in 0..4 {
        let pool = db.pool.clone();
        let mut booking = new_booking("2099-03-01", "12:00");
        booking.name = format!("Client {i}");
        tasks.push(tokio::spawn(async move {
            Booking::create_if_available(&pool, &booking, Duration::minutes(120)).await
        }));
    }

    let mut created = 0;
    for task in tasks {
        if let BookingOutcome::Created(_) = task.await?? {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(Booking::count(&db.pool).await?, 1);

    Ok(())
}
