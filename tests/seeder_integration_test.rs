//! End-to-end seeding runs against an in-memory DuckDB database.

use chrono::NaiveDate;
use cinema_seeder::config::SeedConfig;
use cinema_seeder::schema::SchemaLayout;
use cinema_seeder::seeder::{seeded_rng, Phase, SeedReport, Seeder};
use cinema_seeder::store::{create_schema, DuckDbStore};

fn small_config(layout: SchemaLayout) -> SeedConfig {
    let mut config = SeedConfig {
        layout,
        seed: Some(2024),
        reference_date: NaiveDate::from_ymd_opt(2024, 6, 15),
        ..Default::default()
    };
    config.counts.directors = 20;
    config.counts.stars = 30;
    config.counts.movies = 40;
    config.counts.cinemas = 5;
    config.counts.promotions = 3;
    config.counts.online_transactions = 8;
    config.counts.customers = 50;
    config.counts.transactions = 2_500;
    config.dates.days = 400;
    config.batch.size = 300;
    config.batch.commit_every = 1_000;
    config
}

fn seed(config: &SeedConfig) -> (DuckDbStore, SeedReport) {
    let mut store = DuckDbStore::open_in_memory().unwrap();
    create_schema(&mut store, &config.layout).unwrap();
    let report = Seeder::new(&mut store, config.clone(), seeded_rng(config.seed))
        .run()
        .unwrap();
    (store, report)
}

fn scalar(store: &DuckDbStore, sql: &str) -> i64 {
    store
        .connection()
        .query_row(sql, [], |row| row.get(0))
        .unwrap_or_else(|e| panic!("query failed: {sql}: {e}"))
}

// =============================================================================
// Row counts and phase reports
// =============================================================================

#[test]
fn test_classic_layout_row_counts() {
    let config = small_config(SchemaLayout::classic());
    let (store, report) = seed(&config);

    assert_eq!(store.count_rows("date_dim").unwrap(), 400);
    assert_eq!(store.count_rows("director_dim").unwrap(), 20);
    assert_eq!(store.count_rows("star_dim").unwrap(), 30);
    assert_eq!(store.count_rows("movie_dim").unwrap(), 40);
    assert_eq!(store.count_rows("cinema_dim").unwrap(), 5);
    assert_eq!(store.count_rows("promotion_dim").unwrap(), 3);
    assert_eq!(store.count_rows("online_transaction_dim").unwrap(), 8);
    assert_eq!(store.count_rows("customer_dim").unwrap(), 50);
    assert_eq!(store.count_rows("transaction_fact").unwrap(), 2_500);

    let phases: Vec<Phase> = report.phases.iter().map(|p| p.phase).collect();
    assert_eq!(
        phases,
        vec![
            Phase::Dates,
            Phase::Directors,
            Phase::Stars,
            Phase::Movies,
            Phase::Cinemas,
            Phase::Promotions,
            Phase::OnlineTransactions,
            Phase::Customers,
            Phase::Transactions,
        ]
    );
    assert_eq!(report.rows(Phase::Transactions), Some(2_500));
    assert_eq!(report.rows(Phase::MovieStars), None);
    assert_eq!(report.total_rows(), 400 + 20 + 30 + 40 + 5 + 3 + 8 + 50 + 2_500);
}

#[test]
fn test_phase_callback_sees_every_phase() {
    let config = small_config(SchemaLayout::normalized());
    let mut store = DuckDbStore::open_in_memory().unwrap();
    create_schema(&mut store, &config.layout).unwrap();

    let mut seen = Vec::new();
    let mut last_rows = 0;
    let report = Seeder::new(&mut store, config.clone(), seeded_rng(config.seed))
        .on_phase(|p| seen.push(p.phase))
        .on_rows(|n| last_rows = n)
        .run()
        .unwrap();

    assert_eq!(seen.len(), report.phases.len());
    assert!(seen.contains(&Phase::MovieStars));
    assert_eq!(last_rows, 2_500);
}

// =============================================================================
// Data invariants
// =============================================================================

#[test]
fn test_dates_contiguous_from_window_start() {
    let config = small_config(SchemaLayout::classic());
    let (store, _) = seed(&config);

    assert_eq!(scalar(&store, "SELECT MIN(date_id) FROM date_dim"), 1);
    assert_eq!(scalar(&store, "SELECT MAX(date_id) FROM date_dim"), 400);
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM date_dim WHERE \"date\" <> DATE '2014-01-01' + (date_id - 1)"
        ),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM date_dim WHERE \"year\" <> year(\"date\") OR \"month\" <> month(\"date\") OR weekday <> dayname(\"date\")"
        ),
        0
    );
}

#[test]
fn test_embedded_cast_has_one_to_five_names() {
    let config = small_config(SchemaLayout::classic());
    let (store, _) = seed(&config);

    // star1 is always set; later slots are NULL once the cast runs out
    assert_eq!(
        scalar(&store, "SELECT COUNT(*) FROM movie_dim WHERE star1_name IS NULL"),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM movie_dim WHERE \
             (star2_name IS NULL AND star3_name IS NOT NULL) OR \
             (star3_name IS NULL AND star4_name IS NOT NULL) OR \
             (star4_name IS NULL AND star5_name IS NOT NULL)"
        ),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM movie_dim m WHERE NOT EXISTS \
             (SELECT 1 FROM director_dim d WHERE d.name = m.director_name)"
        ),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM movie_dim WHERE length(title) > 100 \
             OR genre NOT IN ('Action', 'Drama', 'Comedy', 'Horror', 'Sci-Fi')"
        ),
        0
    );
}

#[test]
fn test_junction_cast_distinct_and_bounded() {
    let mut config = small_config(SchemaLayout::normalized());
    config.counts.movies = 500;
    config.counts.stars = 200;
    config.counts.transactions = 100;
    let (store, report) = seed(&config);

    let links = store.count_rows("movie_star").unwrap();
    assert!((500..=2_500).contains(&links), "links = {links}");
    assert_eq!(report.rows(Phase::MovieStars), Some(links));

    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM (SELECT movie_id FROM movie_star \
             GROUP BY movie_id HAVING COUNT(*) < 1 OR COUNT(*) > 5)"
        ),
        0
    );
    assert_eq!(
        scalar(&store, "SELECT COUNT(DISTINCT movie_id) FROM movie_star"),
        500
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM movie_star ms LEFT JOIN star_dim s ON ms.star_id = s.star_id \
             WHERE s.star_id IS NULL"
        ),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM movie_dim m LEFT JOIN director_dim d ON m.director_id = d.director_id \
             WHERE d.director_id IS NULL"
        ),
        0
    );
}

#[test]
fn test_customers_and_cinemas_in_range() {
    let config = small_config(SchemaLayout::lean());
    let (store, _) = seed(&config);

    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM customer_dim \
             WHERE dob < DATE '1934-06-15' OR dob > DATE '2014-06-15'"
        ),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM customer_dim WHERE gender NOT IN ('M', 'F', 'O')"
        ),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM cinema_dim WHERE hall_size < 50 OR hall_size > 500"
        ),
        0
    );
}

#[test]
fn test_facts_reference_existing_rows() {
    let config = small_config(SchemaLayout::classic());
    let (store, _) = seed(&config);

    for (column, table) in [
        ("customer_id", "customer_dim"),
        ("movie_id", "movie_dim"),
        ("cinema_id", "cinema_dim"),
        ("date_id", "date_dim"),
        ("promotion_id", "promotion_dim"),
    ] {
        let sql = format!(
            "SELECT COUNT(*) FROM transaction_fact f LEFT JOIN {table} d ON f.{column} = d.{column} \
             WHERE d.{column} IS NULL"
        );
        assert_eq!(scalar(&store, &sql), 0, "dangling {column}");
    }
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM transaction_fact f \
             LEFT JOIN online_transaction_dim o ON f.online_transaction_id = o.online_transaction_id \
             WHERE f.online_transaction_id IS NOT NULL AND o.online_transaction_id IS NULL"
        ),
        0
    );
}

#[test]
fn test_fact_values_and_channel() {
    let config = small_config(SchemaLayout::classic());
    let (store, _) = seed(&config);

    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM transaction_fact \
             WHERE totalprice < 5.00 OR totalprice > 50.00 \
             OR ticket_count < 1 OR ticket_count > 5"
        ),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM transaction_fact WHERE \
             (online_transaction_id IS NULL) = (offline_transaction_id IS NULL)"
        ),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM transaction_fact WHERE \
             offline_transaction_id < 1000 OR offline_transaction_id > 9999"
        ),
        0
    );

    let online = scalar(
        &store,
        "SELECT COUNT(*) FROM transaction_fact WHERE online_transaction_id IS NOT NULL",
    );
    assert!((1_000..=1_500).contains(&online), "online = {online}");
}

#[test]
fn test_fixed_value_lists() {
    let mut config = small_config(SchemaLayout::classic());
    config.values.cities = Some(vec!["Oslo".to_string(), "Bergen".to_string()]);
    config.values.promotions = Some(vec!["Two for one".to_string(), "Student night".to_string()]);
    config.values.browsers = Some(vec!["Firefox".to_string()]);
    let (store, _) = seed(&config);

    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM cinema_dim WHERE city NOT IN ('Oslo', 'Bergen')"
        ),
        0
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM online_transaction_dim WHERE browser <> 'Firefox'"
        ),
        0
    );

    let first: String = store
        .connection()
        .query_row(
            "SELECT description FROM promotion_dim ORDER BY promotion_id LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let third: String = store
        .connection()
        .query_row(
            "SELECT description FROM promotion_dim ORDER BY promotion_id LIMIT 1 OFFSET 2",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(first, "Two for one");
    assert_eq!(third, "Two for one");
}

#[test]
fn test_lean_layout_has_no_channel_columns() {
    let config = small_config(SchemaLayout::lean());
    let (store, report) = seed(&config);

    assert_eq!(store.count_rows("transaction_fact").unwrap(), 2_500);
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM information_schema.columns \
             WHERE table_name = 'transaction_fact' \
             AND column_name IN ('promotion_id', 'online_transaction_id', 'offline_transaction_id')"
        ),
        0
    );
    assert!(report.rows(Phase::MovieStars).is_none());
}

#[test]
fn test_same_seed_same_data() {
    let config = small_config(SchemaLayout::classic());
    let (a, _) = seed(&config);
    let (b, _) = seed(&config);

    let digest = |store: &DuckDbStore| -> i64 {
        scalar(
            store,
            "SELECT CAST(SUM(customer_id * 7 + movie_id * 13 + cinema_id * 17 + date_id \
             + ticket_count * 19 + CAST(totalprice * 100 AS BIGINT)) AS BIGINT) FROM transaction_fact",
        )
    };
    assert_eq!(digest(&a), digest(&b));

    let names = |store: &DuckDbStore| -> String {
        store
            .connection()
            .query_row(
                "SELECT string_agg(name, ',' ORDER BY customer_id) FROM customer_dim",
                [],
                |row| row.get(0),
            )
            .unwrap()
    };
    assert_eq!(names(&a), names(&b));
}

#[test]
fn test_default_browsers() {
    let config = small_config(SchemaLayout::classic());
    let (store, _) = seed(&config);

    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM online_transaction_dim \
             WHERE browser NOT IN ('Chrome', 'Firefox', 'Safari', 'Edge')"
        ),
        0
    );
}

#[test]
fn test_long_promotion_descriptions_truncated() {
    let mut config = small_config(SchemaLayout::classic());
    config.values.promotions = Some(vec!["x".repeat(300), "Matinee".to_string()]);
    let (store, _) = seed(&config);

    assert_eq!(
        scalar(&store, "SELECT MAX(length(description)) FROM promotion_dim"),
        255
    );
    assert_eq!(
        scalar(
            &store,
            "SELECT COUNT(*) FROM promotion_dim WHERE description = 'Matinee'"
        ),
        1
    );
}
