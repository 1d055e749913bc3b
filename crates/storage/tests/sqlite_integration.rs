use chrono::{DateTime, Duration, Utc};
use storage::repository::{
    ConversationStateStore, GroupRecord, ScoreUpdate, StorageError, VocabularyRepository,
};
use storage::sqlite::SqliteRepository;
use vocab_core::model::{Direction, DirectionStats, GroupId, OwnerId, WordStats};
use vocab_core::time::{fixed_clock, fixed_now};

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn word(text: &str, translations: &[&str]) -> WordStats {
    WordStats::new(
        text,
        translations.iter().map(|t| (*t).to_owned()).collect(),
        fixed_now(),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_keeps_translation_order_and_stats() {
    let repo = connect("memdb_roundtrip").await;
    let owner = OwnerId::new(7);

    let mut cat = word("cat", &["gato", "minino"]);
    cat.from = DirectionStats::new(2, 3, Some(fixed_now())).unwrap();
    repo.upsert_word(owner, "es", &cat).await.unwrap();
    repo.upsert_word(owner, "es", &word("dog", &["perro"]))
        .await
        .unwrap();
    repo.upsert_word(owner, "de", &word("dog", &["hund"]))
        .await
        .unwrap();

    let words = repo.fetch_candidates(owner, "es").await.unwrap();
    assert_eq!(words.len(), 2);
    assert_eq!(words[0], cat);
    assert_eq!(words[1].word, "dog");
    assert!(
        repo.fetch_candidates(OwnerId::new(8), "es")
            .await
            .unwrap()
            .is_empty()
    );

    // Migrations are idempotent.
    repo.migrate().await.unwrap();
}

#[tokio::test]
async fn sqlite_score_updates_are_direction_specific() {
    let repo = connect("memdb_scores").await;
    let owner = OwnerId::new(1);
    repo.upsert_word(owner, "es", &word("cat", &["gato"]))
        .await
        .unwrap();
    repo.upsert_word(owner, "es", &word("dog", &["perro"]))
        .await
        .unwrap();

    let at = fixed_now() + Duration::minutes(5);
    let updates = vec![
        ScoreUpdate {
            word: "cat".into(),
            delta_score: 1,
            delta_count: 1,
            timestamp: at,
        },
        ScoreUpdate {
            word: "dog".into(),
            delta_score: 0,
            delta_count: 1,
            timestamp: at,
        },
        ScoreUpdate {
            word: "removed".into(),
            delta_score: 1,
            delta_count: 1,
            timestamp: at,
        },
    ];
    repo.apply_score_updates(owner, "es", Direction::To, &updates)
        .await
        .unwrap();

    let words = repo.fetch_candidates(owner, "es").await.unwrap();
    let cat = &words[0];
    assert_eq!(cat.to.trained_count(), 1);
    assert_eq!(cat.to.score_sum(), 1);
    assert_eq!(cat.to.last_trained(), Some(at));
    assert_eq!(cat.from, DirectionStats::default());

    let dog = &words[1];
    assert_eq!(dog.to.trained_count(), 1);
    assert_eq!(dog.to.score_sum(), 0);
    assert_eq!(dog.to.mastery(), Some(0.0));
}

#[tokio::test]
async fn sqlite_groups_are_scoped_and_unique() {
    let repo = connect("memdb_groups").await;
    let owner = OwnerId::new(1);
    let pets = GroupRecord {
        id: GroupId::new("pets-1"),
        name: "pets".into(),
    };
    let food = GroupRecord {
        id: GroupId::new("food-1"),
        name: "food".into(),
    };
    repo.insert_group(owner, "es", &pets, &["cat".into(), "dog".into()])
        .await
        .unwrap();
    repo.insert_group(owner, "es", &food, &["bread".into()])
        .await
        .unwrap();

    let dup = GroupRecord {
        id: GroupId::new("pets-2"),
        name: "pets".into(),
    };
    let err = repo
        .insert_group(owner, "es", &dup, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let names: Vec<String> = repo
        .list_groups(owner, "es")
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["food".to_string(), "pets".to_string()]);

    let found = repo
        .find_group_by_name(owner, "es", "pets")
        .await
        .unwrap()
        .expect("group");
    assert_eq!(found, pets);
    let members = repo.fetch_group_members(owner, &found.id).await.unwrap();
    assert!(members.contains("cat") && members.contains("dog"));

    let other_owner = repo
        .fetch_group_members(OwnerId::new(2), &found.id)
        .await
        .unwrap();
    assert!(other_owner.is_empty());
}

#[tokio::test]
async fn sqlite_conversation_state_overwrites_and_clears() {
    let repo = connect("memdb_state").await;
    let owner = OwnerId::new(3);

    assert_eq!(repo.get(owner).await.unwrap(), None);
    repo.set(owner, "first").await.unwrap();
    repo.set(owner, "second").await.unwrap();
    assert_eq!(repo.get(owner).await.unwrap().as_deref(), Some("second"));
    repo.clear(owner).await.unwrap();
    assert_eq!(repo.get(owner).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_rows_are_stamped_by_the_repository_clock() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_clock?mode=memory&cache=shared")
        .await
        .expect("connect")
        .with_clock(fixed_clock());
    repo.migrate().await.expect("migrate");
    let owner = OwnerId::new(4);

    repo.set(owner, "{}").await.unwrap();
    let updated_at: DateTime<Utc> =
        sqlx::query_scalar("SELECT updated_at FROM conversation_state WHERE owner_id = ?1")
            .bind(owner.value())
            .fetch_one(repo.pool())
            .await
            .unwrap();
    assert_eq!(updated_at, fixed_now());

    let applied_at: DateTime<Utc> =
        sqlx::query_scalar("SELECT applied_at FROM schema_migrations WHERE version = 1")
            .fetch_one(repo.pool())
            .await
            .unwrap();
    assert_eq!(applied_at, fixed_now());
}
