use artgrid_db::models::image_record::CreateImageRecord;
use artgrid_db::repositories::{ImageRecordRepo, RecordAxis};

fn record(image_path: &str, artist: &str, prompt: &str) -> CreateImageRecord {
    CreateImageRecord {
        image_path: image_path.to_string(),
        artist_file: "artists.csv".to_string(),
        artist_prompt: artist.to_string(),
        prompt_file: "prompts.csv".to_string(),
        prompt_text: prompt.to_string(),
        combined_prompt: format!("q,{artist},{prompt}"),
    }
}

#[tokio::test]
async fn open_is_idempotent_and_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let pool = artgrid_db::open_record_store(dir.path()).await.unwrap();
    ImageRecordRepo::create(&pool, &record("a.webp", "Monet", "a cat"))
        .await
        .unwrap();
    pool.close().await;

    assert!(dir.path().join("image_generation.db").is_file());

    let pool = artgrid_db::open_record_store(dir.path()).await.unwrap();
    artgrid_db::health_check(&pool).await.unwrap();
    assert_eq!(ImageRecordRepo::count(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn ids_strictly_increase() {
    let dir = tempfile::tempdir().unwrap();
    let pool = artgrid_db::open_record_store(dir.path()).await.unwrap();

    let first = ImageRecordRepo::create(&pool, &record("a.webp", "Monet", "a cat"))
        .await
        .unwrap();
    let second = ImageRecordRepo::create(&pool, &record("b.webp", "Monet", "a dog"))
        .await
        .unwrap();
    assert!(second > first);

    let stored = ImageRecordRepo::find_by_id(&pool, second).await.unwrap().unwrap();
    assert_eq!(stored.image_path, "b.webp");
    assert_eq!(stored.combined_prompt, "q,Monet,a dog");
    assert!(stored.generation_time.is_some());
}

#[tokio::test]
async fn cell_query_returns_written_path() {
    let dir = tempfile::tempdir().unwrap();
    let pool = artgrid_db::open_record_store(dir.path()).await.unwrap();
    ImageRecordRepo::create(&pool, &record("image_010203_0.webp", "van Gogh", "a cat"))
        .await
        .unwrap();

    assert_eq!(
        ImageRecordRepo::find_cell(&pool, "van Gogh", "a cat")
            .await
            .unwrap()
            .as_deref(),
        Some("image_010203_0.webp")
    );
    assert_eq!(
        ImageRecordRepo::find_cell(&pool, "van Gogh", "a dog")
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn distinct_values_are_descending() {
    let dir = tempfile::tempdir().unwrap();
    let pool = artgrid_db::open_record_store(dir.path()).await.unwrap();
    for (i, (artist, prompt)) in [
        ("Monet", "a cat"),
        ("van Gogh", "a dog"),
        ("Monet", "a dog"),
        ("van Gogh", "a cat"),
    ]
    .iter()
    .enumerate()
    {
        ImageRecordRepo::create(&pool, &record(&format!("{i}.webp"), artist, prompt))
            .await
            .unwrap();
    }

    assert_eq!(
        ImageRecordRepo::distinct(&pool, RecordAxis::Artist).await.unwrap(),
        vec!["van Gogh", "Monet"]
    );
    assert_eq!(
        ImageRecordRepo::distinct(&pool, RecordAxis::Prompt).await.unwrap(),
        vec!["a dog", "a cat"]
    );
    assert_eq!(
        ImageRecordRepo::list_image_paths(&pool, Some(2)).await.unwrap(),
        vec!["0.webp", "1.webp"]
    );
    assert_eq!(ImageRecordRepo::list_all(&pool).await.unwrap().len(), 4);
}

#[tokio::test]
async fn concurrent_appends_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let pool = artgrid_db::open_record_store(dir.path()).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let id = ImageRecordRepo::create(
                &pool,
                &record(&format!("{i}.webp"), "Monet", &format!("p{i}")),
            )
            .await
            .unwrap();
            (i, id)
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        let (i, id) = handle.await.unwrap();
        let stored = ImageRecordRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(stored.image_path, format!("{i}.webp"));
        ids.push(id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
    assert_eq!(ImageRecordRepo::count(&pool).await.unwrap(), 16);
}

#[tokio::test]
async fn open_existing_reports_absent_store() {
    let dir = tempfile::tempdir().unwrap();
    assert!(artgrid_db::open_existing(dir.path()).await.unwrap().is_none());

    let pool = artgrid_db::open_record_store(dir.path()).await.unwrap();
    ImageRecordRepo::create(&pool, &record("a.webp", "Monet", "a cat"))
        .await
        .unwrap();
    pool.close().await;

    let read_only = artgrid_db::open_existing(dir.path()).await.unwrap().unwrap();
    assert_eq!(ImageRecordRepo::count(&read_only).await.unwrap(), 1);
}
