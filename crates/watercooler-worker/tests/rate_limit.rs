use sea_orm::{EntityTrait, PaginatorTrait};

use entity::rate_limit;
use watercooler_worker::error::ClaimError;
use watercooler_worker::rate_limit::{check_rate_limit, sweep_rate_limits};

use watercooler_test_utils::{memory_db, NOW};

const WINDOW: i64 = 60;

#[tokio::test]
async fn allows_up_to_max_then_denies() {
    let db = memory_db().await;

    for expected_remaining in [2, 1, 0] {
        let d = check_rate_limit(&db, "claim:1.2.3.4", 3, WINDOW, NOW).await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.remaining, expected_remaining);
        assert_eq!(d.reset_at, NOW + WINDOW);
    }

    let denied = check_rate_limit(&db, "claim:1.2.3.4", 3, WINDOW, NOW + 10)
        .await
        .unwrap();
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 0);
    assert!(matches!(
        denied.into_result(NOW + 10),
        Err(ClaimError::RateLimited { retry_after: 50 })
    ));
}

#[tokio::test]
async fn window_resets_after_it_elapses() {
    let db = memory_db().await;

    assert!(check_rate_limit(&db, "k", 1, WINDOW, NOW).await.unwrap().allowed);
    assert!(!check_rate_limit(&db, "k", 1, WINDOW, NOW + 1).await.unwrap().allowed);

    let fresh = check_rate_limit(&db, "k", 1, WINDOW, NOW + WINDOW).await.unwrap();
    assert!(fresh.allowed);
    assert_eq!(fresh.reset_at, NOW + 2 * WINDOW);
}

#[tokio::test]
async fn keys_are_independent() {
    let db = memory_db().await;

    assert!(check_rate_limit(&db, "a", 1, WINDOW, NOW).await.unwrap().allowed);
    assert!(check_rate_limit(&db, "b", 1, WINDOW, NOW).await.unwrap().allowed);
    assert!(!check_rate_limit(&db, "a", 1, WINDOW, NOW).await.unwrap().allowed);
}

#[tokio::test]
async fn sweep_drops_closed_windows() {
    let db = memory_db().await;

    check_rate_limit(&db, "old", 5, WINDOW, NOW - 2 * WINDOW).await.unwrap();
    check_rate_limit(&db, "current", 5, WINDOW, NOW).await.unwrap();

    assert_eq!(sweep_rate_limits(&db, WINDOW, NOW).await.unwrap(), 1);
    assert_eq!(rate_limit::Entity::find().count(&db).await.unwrap(), 1);
    assert!(rate_limit::Entity::find_by_id("current".to_string())
        .one(&db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn interleaved_first_requests_are_both_counted() {
    let db = memory_db().await;

    let (a, b) = tokio::join!(
        check_rate_limit(&db, "k", 2, WINDOW, NOW),
        check_rate_limit(&db, "k", 2, WINDOW, NOW),
    );
    assert!(a.unwrap().allowed);
    assert!(b.unwrap().allowed);

    let row = rate_limit::Entity::find_by_id("k".to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.count, 2);
    assert!(!check_rate_limit(&db, "k", 2, WINDOW, NOW).await.unwrap().allowed);
}
