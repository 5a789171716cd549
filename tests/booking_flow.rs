// Booking lifecycle against a live Postgres: the unique index arbitrates
// the slot-week and lazy GC frees expired holds.
//
// Run with a scratch database carrying the schema:
//   DATABASE_URL=postgres://localhost/sonarbot_test cargo test --test booking_flow -- --ignored

use chrono::{Datelike, Duration, Utc, Weekday};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::Set, EntityTrait};
use uuid::Uuid;

use sonarbot_api::config::ApiConfig;
use sonarbot_api::db::DbPool;
use sonarbot_api::entity::sponsored_spots;

fn hold_model(
    week_start: chrono::NaiveDate,
    expires_in: Duration,
) -> sponsored_spots::ActiveModel {
    let now = Utc::now();
    sponsored_spots::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        spot_type: Set("homepage_banner".to_string()),
        booked_by: Set("flow-test-agent".to_string()),
        title: Set("Flow test".to_string()),
        description: Set(None),
        url: Set("https://example.xyz".to_string()),
        image_url: Set(None),
        payment_token: Set("USDC".to_string()),
        payment_amount: Set(Decimal::from(299)),
        week_start: Set(week_start),
        week_end: Set(week_start + Duration::days(6)),
        status: Set("held".to_string()),
        hold_expires_at: Set(Some(now + expires_in)),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[tokio::test]
#[ignore] // needs DATABASE_URL pointing at a scratch Postgres
async fn expired_hold_frees_the_week_for_rebooking() {
    let config = ApiConfig::from_env();
    let pool = DbPool::new(&config).await.expect("database connection");
    let repos = pool.repositories();

    // A week far in the future so the test never collides with real rows
    let today = Utc::now().date_naive();
    let mut week = today + Duration::weeks(52);
    while week.weekday() != Weekday::Mon {
        week += Duration::days(1);
    }

    // Already-expired hold still owns the unique slot, so a second booking
    // loses the insert race
    let first = repos
        .sponsored
        .try_insert_hold(hold_model(week, Duration::minutes(-1)))
        .await
        .expect("first insert")
        .expect("week starts free");
    let blocked = repos
        .sponsored
        .try_insert_hold(hold_model(week, Duration::minutes(5)))
        .await
        .expect("second insert");
    assert!(blocked.is_none(), "held week must reject a second booking");

    // Lazy GC clears the lapsed hold and the week frees up
    let cleared = repos
        .sponsored
        .delete_expired_holds("homepage_banner", week)
        .await
        .expect("gc");
    assert_eq!(cleared, 1, "expired hold should be deleted");

    let rebooked = repos
        .sponsored
        .try_insert_hold(hold_model(week, Duration::minutes(5)))
        .await
        .expect("third insert")
        .expect("week frees after gc");
    assert_ne!(rebooked.id, first.id);

    // Activation survives and clears the expiry stamp
    let active = repos
        .sponsored
        .activate(rebooked)
        .await
        .expect("activation");
    assert_eq!(active.status, "active");
    assert!(active.hold_expires_at.is_none());

    sponsored_spots::Entity::delete_by_id(active.id)
        .exec(pool.get_connection())
        .await
        .expect("cleanup");
}
