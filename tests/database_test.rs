//! Postgres-backed tests. They need DATABASE_URL pointing at a server where
//! `sqlx::test` can create throwaway databases:
//!
//!     cargo test --test database_test -- --ignored

mod helpers;

use helpers::*;
use penca_scoring::models::*;
use penca_scoring::RepositoryError;
use sqlx::{PgPool, Row};
use uuid::Uuid;

// ============================================================================
// Migration Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_migrations_ran(pool: PgPool) {
    let tables = vec![
        "pools",
        "memberships",
        "rulesets",
        "races",
        "race_entries",
        "race_results",
        "predictions",
        "scores",
    ];

    for table in tables {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .expect("Failed to query information_schema");

        let exists: bool = row.get(0);
        assert!(exists, "Table {} should exist", table);
    }
}

// ============================================================================
// Pool and Ruleset Repository Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_membership_requires_exactly_one_identity(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let penca = db.pool_repo.create("club", "Club").await.unwrap();

    let account = db.pool_repo.add_account_member(penca.id, "acct-42").await.unwrap();
    let guest = db.pool_repo.add_guest_member(penca.id, "tio pepe").await.unwrap();
    assert!(!account.is_guest());
    assert!(guest.is_guest());
    assert_eq!(guest.display_name(), "tio pepe");

    let both = sqlx::query(
        "INSERT INTO memberships (pool_id, account_ref, guest_name) VALUES ($1, 'x', 'y')",
    )
    .bind(penca.id)
    .execute(&db.pool)
    .await;
    assert!(both.is_err());

    let members = db.pool_repo.find_members(penca.id).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_publish_version_keeps_single_active_ruleset(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let penca = db.pool_repo.create("club", "Club").await.unwrap();

    let v1 = db.ruleset_repo.publish_version(penca.id, standard_ruleset()).await.unwrap();
    let mut next = standard_ruleset();
    next.exclusive_winner_points = 30;
    let v2 = db.ruleset_repo.publish_version(penca.id, next).await.unwrap();

    assert_eq!(v1.version, 1);
    assert_eq!(v2.version, 2);

    let active = db.ruleset_repo.find_active_by_pool(penca.id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, v2.id);
    assert_eq!(active[0].exclusive_winner_points, 30);

    let history = db.ruleset_repo.find_by_pool(penca.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].exclusive_winner_points, 25);
    assert!(!history[1].is_active);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_publish_version_rejects_negative_points(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let penca = db.pool_repo.create("club", "Club").await.unwrap();

    let mut bad = standard_ruleset();
    bad.points_by_position.second = -7;
    let err = db.ruleset_repo.publish_version(penca.id, bad).await.unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidInput(_)));

    let history = db.ruleset_repo.find_by_pool(penca.id).await.unwrap();
    assert!(history.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_publish_version_rejects_overflowing_points(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let penca = db.pool_repo.create("club", "Club").await.unwrap();

    let mut bad = standard_ruleset();
    bad.points_by_position.second = i32::MAX;
    let err = db.ruleset_repo.publish_version(penca.id, bad).await.unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidInput(_)));
}

// ============================================================================
// Race Repository Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_race_status_moves_forward_only(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let fx = DbFixtures::create(&db).await;
    assert_eq!(fx.race.status, "scheduled");

    let closed = db.race_repo.advance_status(fx.race.id, RaceStatus::Closed).await.unwrap();
    assert_eq!(closed.status_enum().unwrap(), RaceStatus::Closed);

    let err = db
        .race_repo
        .advance_status(fx.race.id, RaceStatus::Scheduled)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidInput(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_race_cannot_skip_closed(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let fx = DbFixtures::create(&db).await;

    let err = db
        .race_repo
        .advance_status(fx.race.id, RaceStatus::ResultPublished)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidInput(_)));

    let race = db.race_repo.find_by_id(fx.race.id).await.unwrap().unwrap();
    assert_eq!(race.status, "scheduled");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_published_races_filtered_by_pool_and_date(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let fx = DbFixtures::create(&db).await;
    fx.publish_result(&db, &fx.entry_ids()).await;

    let day = chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
    let dated = db.race_repo.create(fx.pool.id, 2, Some(day)).await.unwrap();
    db.race_repo.advance_status(dated.id, RaceStatus::Closed).await.unwrap();
    db.race_repo.advance_status(dated.id, RaceStatus::ResultPublished).await.unwrap();
    db.race_repo.create(fx.pool.id, 3, Some(day)).await.unwrap();

    let all = db.race_repo.find_published_by_pool(fx.pool.id, None).await.unwrap();
    assert_eq!(all.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![1, 2]);

    let on_day = db.race_repo.find_published_by_pool(fx.pool.id, Some(day)).await.unwrap();
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0].id, dated.id);
}

// ============================================================================
// Prediction and Score Repository Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_locked_prediction_is_not_replaced(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let fx = DbFixtures::create(&db).await;
    let ids = fx.entry_ids();
    let member = fx.members[0].id;

    db.prediction_repo.submit(fx.race.id, member, Some(ids[0]), None, None).await.unwrap();
    assert_eq!(db.prediction_repo.lock_race(fx.race.id).await.unwrap(), 1);

    let replaced = db
        .prediction_repo
        .submit(fx.race.id, member, Some(ids[1]), None, None)
        .await
        .unwrap();
    assert!(replaced.is_none());

    let stored = db.prediction_repo.find_by_race(fx.race.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].winner_pick, Some(ids[0]));
    assert!(stored[0].is_locked);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_score_upsert_reports_created_then_updated(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let fx = DbFixtures::create(&db).await;
    let member = fx.members[0].id;

    let mut score = NewScore {
        race_id: fx.race.id,
        participant_id: member,
        points_total: 10,
        breakdown: vec![],
        ruleset_version: 1,
    };
    assert_eq!(db.score_repo.upsert(&score).await.unwrap(), UpsertOutcome::Created);
    let first = db
        .score_repo
        .find_by_race_and_participant(fx.race.id, member)
        .await
        .unwrap()
        .unwrap();

    score.points_total = 7;
    assert_eq!(db.score_repo.upsert(&score).await.unwrap(), UpsertOutcome::Updated);
    let second = db
        .score_repo
        .find_by_race_and_participant(fx.race.id, member)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.points_total, 7);
    assert_eq!(db.score_repo.count_by_race(fx.race.id).await.unwrap(), 1);
}

// ============================================================================
// Scoring Against Postgres
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_recompute_and_correct_result(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let fx = DbFixtures::create(&db).await;
    let ids = fx.entry_ids();
    let (ana, bruno, carla) = (fx.members[0].id, fx.members[1].id, fx.members[2].id);

    db.prediction_repo.submit(fx.race.id, ana, Some(ids[0]), None, None).await.unwrap();
    db.prediction_repo
        .submit(fx.race.id, bruno, Some(ids[1]), Some(&[ids[1], ids[0]][..]), None)
        .await
        .unwrap();
    db.prediction_repo.submit(fx.race.id, carla, Some(ids[3]), None, None).await.unwrap();
    db.prediction_repo.lock_race(fx.race.id).await.unwrap();

    fx.publish_result(&db, &ids).await;

    let service = db.scoring_service();
    let report = service.recompute(fx.race.id).await.expect("recompute failed");
    assert_eq!(report.created, 3);
    assert_eq!(report.winner_backers, 2);

    let points = |scores: &[Score], who: Uuid| {
        scores
            .iter()
            .find(|s| s.participant_id == who)
            .map(|s| s.points_total)
    };
    let scores = db.score_repo.find_by_race(fx.race.id).await.unwrap();
    assert_eq!(points(&scores, ana), Some(10));
    assert_eq!(points(&scores, bruno), Some(10 + 7));
    assert_eq!(points(&scores, carla), Some(3));

    // Correct the result: the fourth-placed entry actually won
    db.race_repo
        .save_result(fx.race.id, &[ids[3], ids[1], ids[2], ids[0]])
        .await
        .unwrap();
    let report = service.recompute(fx.race.id).await.unwrap();
    assert_eq!((report.created, report.updated), (0, 3));

    let scores = db.score_repo.find_by_race(fx.race.id).await.unwrap();
    assert_eq!(scores.len(), 3);
    assert_eq!(points(&scores, ana), Some(3));
    assert_eq!(points(&scores, bruno), Some(7 + 3));
    assert_eq!(points(&scores, carla), Some(25));

    let standings = db.score_repo.standings(fx.pool.id).await.unwrap();
    assert_eq!(standings.len(), 3);
    assert_eq!(standings[0].participant_id, carla);
    assert_eq!(standings[0].points_total, 25);
    assert_eq!(standings[0].races_scored, 1);
}
