use rowscan::{Database, RowscanConfig, SessionDriver, SessionPhase, prelude::*, startup};

#[tokio::test]
async fn seeded_store_serves_sorted_pages_through_the_facade() {
    let mut config = RowscanConfig::default();
    config.seed.total_target = 120;
    config.seed.batch_size = 50;
    config.session.page_size = 25;

    let db = Database::new(config.store.clone());
    let store = db.get_or_open().await.expect("store should open");

    let started = startup(&store, &config.seed)
        .await
        .expect("startup should count");
    assert_eq!(started.count, 0);
    let seeding = started.seeding.expect("empty store should seed");
    seeding.finish().await;

    let mut driver = SessionDriver::new(store, config.session.clone());
    driver.start();
    driver.settle().await;
    assert_eq!(driver.session().buffer().len(), 25);

    driver.click_sort(IndexName::Score);
    driver.settle().await;
    let scores: Vec<u8> = driver.session().buffer().iter().map(|r| r.score).collect();
    assert!(scores.windows(2).all(|w| w[0] <= w[1]), "scores: {scores:?}");
    assert_eq!(driver.session().mode(), QueryMode::Sorted);
    assert_eq!(driver.session().phase(), SessionPhase::Ready);
}

#[test]
fn version_matches_the_package() {
    assert!(!rowscan::VERSION.is_empty());
}
