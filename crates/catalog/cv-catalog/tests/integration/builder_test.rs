//! Builder merge tests against in-memory collaborators.

use crate::common::{
    BUCKET, ECUADOR_BURST, ECUADOR_WKT, MemoryLister, PREFIX, ROSAMOND_BURST, ROSAMOND_WKT,
    RecordingFetcher, product_key, product_url, record,
};
use chrono::NaiveDate;
use cv_catalog::{BuildConfig, Catalog, CatalogBuilder, Geometry, Partition};
use cv_error::{CvError, ListingError};

fn builder(
    lister: &MemoryLister,
    fetcher: &RecordingFetcher,
) -> CatalogBuilder<MemoryLister, RecordingFetcher> {
    CatalogBuilder::new(
        lister.clone(),
        fetcher.clone(),
        BuildConfig::new(BUCKET, PREFIX),
    )
}

fn ecuador() -> Partition {
    Partition::new(ECUADOR_BURST, "Ecuador")
}

fn rosamond() -> Partition {
    Partition::new(ROSAMOND_BURST, "Rosamond")
}

fn ecuador_keys(dates: &[&str]) -> Vec<String> {
    dates
        .iter()
        .map(|d| product_key("Ecuador", ECUADOR_BURST, d))
        .collect()
}

#[tokio::test]
async fn test_new_burst_shares_one_geometry() {
    // Listed newest first; the output must still be date ordered
    let lister =
        MemoryLister::new().with_keys(ECUADOR_BURST, ecuador_keys(&["20141108", "20141015"]));
    let fetcher = RecordingFetcher::new().with_footprint(ECUADOR_BURST, ECUADOR_WKT);

    let (catalog, stats) = builder(&lister, &fetcher)
        .build(Catalog::new(), &[ecuador()])
        .await
        .unwrap();

    let records = catalog.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2014, 10, 15).unwrap());
    assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2014, 11, 8).unwrap());
    assert_eq!(records[0].geometry, records[1].geometry);
    assert_eq!(records[0].geometry, Geometry::from_wkt(ECUADOR_WKT).unwrap());
    assert!(records.iter().all(|r| r.cslc_static_url.is_none()));

    assert_eq!(fetcher.calls().len(), 1);
    assert_eq!(stats.records_added, 2);
    assert_eq!(stats.geometries_fetched, 1);
    assert_eq!(lister.calls(), vec![format!("{PREFIX}/Ecuador/{ECUADOR_BURST}")]);
}

#[tokio::test]
async fn test_existing_url_is_skipped() {
    let existing = Catalog::from_records(vec![record(
        ECUADOR_BURST,
        "Ecuador",
        "20141015",
        ECUADOR_WKT,
    )]);
    let lister = MemoryLister::new().with_keys(ECUADOR_BURST, ecuador_keys(&["20141015"]));
    let fetcher = RecordingFetcher::new().with_footprint(ECUADOR_BURST, ECUADOR_WKT);

    let (catalog, stats) = builder(&lister, &fetcher)
        .build(existing.clone(), &[ecuador()])
        .await
        .unwrap();

    assert_eq!(catalog, existing);
    assert!(fetcher.calls().is_empty());
    assert_eq!(stats.keys_skipped, 1);
    assert!(!stats.changed());
}

#[tokio::test]
async fn test_same_date_on_two_bursts_is_kept() {
    let lister = MemoryLister::new()
        .with_keys(ECUADOR_BURST, ecuador_keys(&["20230101"]))
        .with_keys(
            ROSAMOND_BURST,
            vec![product_key("Rosamond", ROSAMOND_BURST, "20230101")],
        );
    let fetcher = RecordingFetcher::new()
        .with_footprint(ECUADOR_BURST, ECUADOR_WKT)
        .with_footprint(ROSAMOND_BURST, ROSAMOND_WKT);

    let (catalog, _) = builder(&lister, &fetcher)
        .build(Catalog::new(), &[rosamond(), ecuador()])
        .await
        .unwrap();

    let bursts: Vec<&str> = catalog.iter().map(|r| r.burst_id.as_str()).collect();
    assert_eq!(bursts, vec![ROSAMOND_BURST, ECUADOR_BURST]);
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn test_rebuild_is_idempotent() {
    let lister = MemoryLister::new()
        .with_keys(ECUADOR_BURST, ecuador_keys(&["20141108", "20141015", "20141120"]));
    let fetcher = RecordingFetcher::new().with_footprint(ECUADOR_BURST, ECUADOR_WKT);
    let builder = builder(&lister, &fetcher);

    let (once, _) = builder.build(Catalog::new(), &[ecuador()]).await.unwrap();
    let (twice, stats) = builder.build(once.clone(), &[ecuador()]).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(stats.records_added, 0);
    assert_eq!(stats.keys_skipped, 3);
    // Only the first run fetched
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn test_duplicate_dates_collapse() {
    // Two reprocessed products for the same acquisition date
    let mut keys = ecuador_keys(&["20141015", "20141108"]);
    keys.push(product_key("Ecuador", ECUADOR_BURST, "20141015").replace("v1.0", "v1.1"));
    let lister = MemoryLister::new().with_keys(ECUADOR_BURST, keys.clone());
    let fetcher = RecordingFetcher::new().with_footprint(ECUADOR_BURST, ECUADOR_WKT);

    let (catalog, stats) = builder(&lister, &fetcher)
        .build(Catalog::new(), &[ecuador()])
        .await
        .unwrap();

    assert_eq!(catalog.len(), 2);
    assert_eq!(stats.records_added, 2);
    assert_eq!(stats.keys_superseded, 1);
    assert_eq!(stats.duplicates_removed, 0);
    assert!(catalog.is_normalized());
    // The first listed product wins
    assert_eq!(catalog.records()[0].cslc_url, product_url(&keys[0]));
}

#[tokio::test]
async fn test_rebuild_with_reprocessed_product_reports_no_change() {
    let mut keys = ecuador_keys(&["20141015"]);
    keys.push(product_key("Ecuador", ECUADOR_BURST, "20141015").replace("v1.0", "v1.1"));
    let lister = MemoryLister::new().with_keys(ECUADOR_BURST, keys);
    let fetcher = RecordingFetcher::new().with_footprint(ECUADOR_BURST, ECUADOR_WKT);
    let builder = builder(&lister, &fetcher);

    let (once, _) = builder.build(Catalog::new(), &[ecuador()]).await.unwrap();
    let (twice, stats) = builder.build(once.clone(), &[ecuador()]).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(stats.records_added, 0);
    assert_eq!(stats.keys_skipped, 1);
    assert_eq!(stats.keys_superseded, 1);
    assert_eq!(stats.duplicates_removed, 0);
    assert!(!stats.changed());
}

#[tokio::test]
async fn test_partition_order_does_not_change_result() {
    let lister = MemoryLister::new()
        .with_keys(ECUADOR_BURST, ecuador_keys(&["20141108", "20141015"]))
        .with_keys(
            ROSAMOND_BURST,
            vec![
                product_key("Rosamond", ROSAMOND_BURST, "20230101"),
                product_key("Rosamond", ROSAMOND_BURST, "20141015"),
            ],
        );
    let forward_fetcher = RecordingFetcher::new()
        .with_footprint(ECUADOR_BURST, ECUADOR_WKT)
        .with_footprint(ROSAMOND_BURST, ROSAMOND_WKT);
    let reverse_fetcher = forward_fetcher.clone_empty();

    let (forward, forward_stats) = builder(&lister, &forward_fetcher)
        .build(Catalog::new(), &[ecuador(), rosamond()])
        .await
        .unwrap();
    let (reverse, reverse_stats) = builder(&lister, &reverse_fetcher)
        .build(Catalog::new(), &[rosamond(), ecuador()])
        .await
        .unwrap();

    assert_eq!(forward, reverse);
    assert_eq!(forward.len(), 4);
    assert_eq!(forward_fetcher.calls().len(), reverse_fetcher.calls().len());
    assert_eq!(forward_stats.geometries_fetched, reverse_stats.geometries_fetched);
}

#[tokio::test]
async fn test_output_is_sorted() {
    let lister = MemoryLister::new()
        .with_keys(ECUADOR_BURST, ecuador_keys(&["20150101", "20141015"]))
        .with_keys(
            ROSAMOND_BURST,
            vec![
                product_key("Rosamond", ROSAMOND_BURST, "20240301"),
                product_key("Rosamond", ROSAMOND_BURST, "20230101"),
            ],
        );
    let fetcher = RecordingFetcher::new()
        .with_footprint(ECUADOR_BURST, ECUADOR_WKT)
        .with_footprint(ROSAMOND_BURST, ROSAMOND_WKT);

    let (mut catalog, _) = builder(&lister, &fetcher)
        .build(Catalog::new(), &[ecuador(), rosamond()])
        .await
        .unwrap();

    let before = catalog.clone();
    assert_eq!(catalog.normalize(), 0);
    assert_eq!(catalog, before);

    let keys: Vec<(String, NaiveDate)> = catalog
        .iter()
        .map(|r| (r.burst_id.clone(), r.date))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn test_cataloged_geometry_is_reused() {
    let existing = Catalog::from_records(vec![record(
        ECUADOR_BURST,
        "Ecuador",
        "20141015",
        ECUADOR_WKT,
    )]);
    let lister = MemoryLister::new()
        .with_keys(ECUADOR_BURST, ecuador_keys(&["20141015", "20141108", "20141120"]));
    let fetcher = RecordingFetcher::new().with_footprint(ECUADOR_BURST, ROSAMOND_WKT);

    let (catalog, stats) = builder(&lister, &fetcher)
        .build(existing, &[ecuador()])
        .await
        .unwrap();

    assert_eq!(catalog.len(), 3);
    assert!(fetcher.calls().is_empty());
    assert_eq!(stats.geometries_reused, 1);

    let footprint = Geometry::from_wkt(ECUADOR_WKT).unwrap();
    assert!(catalog.iter().all(|r| r.geometry == footprint));
}

#[tokio::test]
async fn test_listing_drains_all_pages() {
    let lister = MemoryLister::new().with_pages(
        ECUADOR_BURST,
        vec![
            ecuador_keys(&["20141015", "20141027"]),
            ecuador_keys(&["20141108"]),
            vec![],
            ecuador_keys(&["20141120"]),
        ],
    );
    let fetcher = RecordingFetcher::new().with_footprint(ECUADOR_BURST, ECUADOR_WKT);

    let (catalog, stats) = builder(&lister, &fetcher)
        .build(Catalog::new(), &[ecuador()])
        .await
        .unwrap();

    assert_eq!(lister.pages_served(), 4);
    assert_eq!(catalog.len(), 4);
    assert_eq!(stats.keys_listed, 4);
}

#[tokio::test]
async fn test_listing_failure_aborts() {
    let lister = MemoryLister::new()
        .with_pages(
            ECUADOR_BURST,
            vec![ecuador_keys(&["20141015"]), ecuador_keys(&["20141108"])],
        )
        .failing_for(ECUADOR_BURST);
    let fetcher = RecordingFetcher::new().with_footprint(ECUADOR_BURST, ECUADOR_WKT);

    let err = builder(&lister, &fetcher)
        .build(Catalog::new(), &[ecuador(), rosamond()])
        .await
        .unwrap_err();

    assert!(matches!(err, CvError::Listing(ListingError::Request(_))));
    // The following partition is never listed
    assert_eq!(lister.calls().len(), 1);
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_unlisted_burst_contributes_nothing() {
    let lister = MemoryLister::new().with_keys(ECUADOR_BURST, ecuador_keys(&["20141015"]));
    let fetcher = RecordingFetcher::new().with_footprint(ECUADOR_BURST, ECUADOR_WKT);

    let (catalog, stats) = builder(&lister, &fetcher)
        .build(Catalog::new(), &[rosamond(), ecuador()])
        .await
        .unwrap();

    assert_eq!(catalog.len(), 1);
    assert_eq!(stats.partitions_processed, 2);
}
