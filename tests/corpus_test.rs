use versebot::db;

async fn setup_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

async fn seed_corpus(pool: &sqlx::SqlitePool) {
    sqlx::query("INSERT INTO books (book_id, book_name, testament) VALUES (1, 'Genesis', 'Old'), (2, 'Psalms', 'Old'), (3, 'John', 'New')")
        .execute(pool)
        .await
        .unwrap();
    let verses = [
        (1_i64, 1_i64, 1_i64, 1_i64, "In the beginning God created the heaven and the earth."),
        (2, 2, 23, 1, "The LORD is my shepherd; I shall not want."),
        (3, 2, 23, 2, "He maketh me to lie down in green pastures."),
        (4, 2, 23, 3, "He restoreth my soul."),
        (5, 3, 3, 16, "For God so loved the world, that he gave his only begotten Son."),
        (6, 3, 3, 17, "For God sent not his Son into the world to condemn the world."),
        (7, 3, 14, 6, "I am the way, the truth, and the life."),
    ];
    for (id, book_id, chapter, verse, text) in verses {
        sqlx::query("INSERT INTO verses (id, book_id, chapter, verse, text) VALUES (?, ?, ?, ?, ?)")
            .bind(id)
            .bind(book_id)
            .bind(chapter)
            .bind(verse)
            .bind(text)
            .execute(pool)
            .await
            .unwrap();
    }
    // "salvation" tags three verses; topic names are stored lowercase.
    let tags = [
        ("salvation", 3_i64, 3_i64, 16_i64),
        ("salvation", 3, 3, 17),
        ("salvation", 3, 14, 6),
        ("comfort", 2, 23, 1),
    ];
    for (topic, book_id, chapter, verse) in tags {
        sqlx::query("INSERT INTO topics (topic_name, book_id, chapter, verse) VALUES (?, ?, ?, ?)")
            .bind(topic)
            .bind(book_id)
            .bind(chapter)
            .bind(verse)
            .execute(pool)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn find_verse_matches_book_by_substring() {
    let pool = setup_pool().await;
    seed_corpus(&pool).await;

    let found = db::find_verse(&pool, "John", 3, 16).await.unwrap().unwrap();
    assert_eq!(found.book_name, "John");
    assert!(found.text.starts_with("For God so loved"));

    // Partial book name still resolves.
    let found = db::find_verse(&pool, "Jon", 3, 16).await.unwrap();
    assert!(found.is_some());

    // Missing verse is an empty result, not an error.
    let missing = db::find_verse(&pool, "John", 3, 99).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn chapter_verses_are_ordered() {
    let pool = setup_pool().await;
    seed_corpus(&pool).await;

    let verses = db::chapter_verses(&pool, "Psalm", 23).await.unwrap();
    let numbers: Vec<i64> = verses.iter().map(|v| v.verse).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let missing = db::chapter_verses(&pool, "Psalm", 99).await.unwrap();
    assert!(missing.is_empty());
}

#[tokio::test]
async fn keyword_search_respects_limit() {
    let pool = setup_pool().await;
    seed_corpus(&pool).await;

    let all = db::search_verses(&pool, "God", 10).await.unwrap();
    assert_eq!(all.len(), 3);

    let limited = db::search_verses(&pool, "God", 2).await.unwrap();
    assert_eq!(limited.len(), 2);

    let none = db::search_verses(&pool, "quux", 10).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn topic_lookup_is_exact_and_lowercased() {
    let pool = setup_pool().await;
    seed_corpus(&pool).await;

    let verses = db::verses_by_topic(&pool, "salvation", 5).await.unwrap();
    assert_eq!(verses.len(), 3);

    // Caller input is normalized to lowercase before matching.
    let verses = db::verses_by_topic(&pool, "SALVATION", 5).await.unwrap();
    assert_eq!(verses.len(), 3);

    let none = db::verses_by_topic(&pool, "nonexistent", 5).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn topics_are_distinct_and_sorted() {
    let pool = setup_pool().await;
    seed_corpus(&pool).await;

    let topics = db::list_topics(&pool).await.unwrap();
    assert_eq!(topics, vec!["comfort".to_string(), "salvation".to_string()]);
}

#[tokio::test]
async fn books_keep_canonical_order_with_testament() {
    let pool = setup_pool().await;
    seed_corpus(&pool).await;

    let books = db::list_books(&pool).await.unwrap();
    let names: Vec<&str> = books.iter().map(|b| b.book_name.as_str()).collect();
    assert_eq!(names, vec!["Genesis", "Psalms", "John"]);
    assert_eq!(books[0].testament, "Old");
    assert_eq!(books[2].testament, "New");
}

#[tokio::test]
async fn verses_by_book_uses_substring_and_limit() {
    let pool = setup_pool().await;
    seed_corpus(&pool).await;

    let verses = db::verses_by_book(&pool, "Joh", 10).await.unwrap();
    assert_eq!(verses.len(), 3);

    let limited = db::verses_by_book(&pool, "John", 1).await.unwrap();
    assert_eq!(limited.len(), 1);

    let none = db::verses_by_book(&pool, "Leviticus", 10).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn verse_count_and_lookup_by_id() {
    let pool = setup_pool().await;
    seed_corpus(&pool).await;

    assert_eq!(db::verse_count(&pool).await.unwrap(), 7);

    let verse = db::verse_by_id(&pool, 5).await.unwrap().unwrap();
    assert_eq!(verse.book_name, "John");
    assert_eq!((verse.chapter, verse.verse), (3, 16));

    assert!(db::verse_by_id(&pool, 999).await.unwrap().is_none());
}

#[tokio::test]
async fn random_verse_comes_from_corpus() {
    let pool = setup_pool().await;

    // Empty corpus yields no verse rather than an error.
    assert!(db::random_verse(&pool).await.unwrap().is_none());

    seed_corpus(&pool).await;
    let verse = db::random_verse(&pool).await.unwrap().unwrap();
    assert!((1..=7).contains(&verse.id));
}
