//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawl
//! sessions against an on-disk SQLite database.

use recipe_harvest::config::{Config, CrawlerConfig, OutputConfig, SelectorConfig, UserAgentConfig};
use recipe_harvest::crawler::{run_crawl_session, FetchError};
use recipe_harvest::storage::{RunStatus, SqliteRecipeStore};
use recipe_harvest::HarvestError;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration that starts at `start_url` with no pauses
fn create_test_config(start_url: &str, db_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            start_url: start_url.to_string(),
            navigation_pause: 0,
            expand_pause: 0,
            request_timeout: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
        selectors: SelectorConfig::default(),
    }
}

fn listing_page(paths: &[&str], load_more: Option<&str>) -> String {
    let cards: String = paths
        .iter()
        .map(|p| {
            format!(
                r#"<div class="card__content"><a data-component="Link" href="{}">Recipe</a></div>"#,
                p
            )
        })
        .collect();
    let more = load_more
        .map(|href| {
            format!(
                r#"<a data-gtm-class="search-results-load-more-button" href="{}">Load more</a>"#,
                href
            )
        })
        .unwrap_or_default();
    format!(
        r#"<html><body><div class="search-result--list">{}</div>{}</body></html>"#,
        cards, more
    )
}

fn recipe_page(id: i64, name: &str, rating: &str) -> String {
    format!(
        r#"<html><head>
        <script type="application/ld+json">{{"@type": "Recipe", "aggregateRating": {{"ratingValue": "{rating}"}}}}</script>
        </head><body>
        <div class="post recipe" data-item-id="{id}">
          <section class="post-header">
            <h1 class="heading-1">{name}</h1>
            <picture><img src="/images/{id}.jpg"></picture>
          </section>
          <div class="recipe-cook-and-prep-details__item">Prep: <time datetime="PT10M">10 mins</time></div>
          <div class="recipe-cook-and-prep-details__item"><strong>Serves 2</strong></div>
          <div class="recipe-cook-and-prep-details__item"><strong>Easy</strong></div>
          <ul class="nutrition-list"><li>Calories 250kcal</li><li>Sugars 12g</li><li>Salt 1.1g</li></ul>
          <section id="ingredients-list"><ul>
            <li class="ingredients-list__item">1 onion</li>
          </ul></section>
          <ul><li class="method-steps__list-item"><div class="editor-content"><p>Chop.</p></div></li></ul>
        </div>
        </body></html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, route: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

/// Two listing batches sharing one recipe link
async fn mount_site(server: &MockServer) {
    mount_html(
        server,
        "/search",
        listing_page(&["/recipes/a", "/recipes/b"], Some("/search/page/2")),
    )
    .await;
    mount_html(
        server,
        "/search/page/2",
        listing_page(&["/recipes/a", "/recipes/c"], None),
    )
    .await;

    mount_html(server, "/recipes/a", recipe_page(1, "Apple pie", "4.5")).await;
    mount_html(server, "/recipes/b", recipe_page(2, "Beef stew", "3.9")).await;
    mount_html(server, "/recipes/c", recipe_page(3, "Carrot cake", "5")).await;

    mount_image(server, "/images/1.jpg", b"apple").await;
    mount_image(server, "/images/2.jpg", b"beef").await;
    mount_image(server, "/images/3.jpg", b"carrot").await;
}

#[tokio::test]
async fn test_full_crawl_session() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("recipes.db");
    let config = create_test_config(&format!("{}/search", mock_server.uri()), &db_path);

    let summary = run_crawl_session(config, "test-hash").await.unwrap();

    assert_eq!(summary.recipes_written, 3);
    assert_eq!(summary.links_seen, 3);

    let store = SqliteRecipeStore::new(&db_path).unwrap();
    assert_eq!(store.count_recipes().unwrap(), 3);

    let pie = store.get_recipe_by_item_id(1).unwrap().unwrap();
    assert_eq!(pie.name, "Apple pie");
    assert_eq!(pie.source_url, format!("{}/recipes/a", mock_server.uri()));
    assert_eq!(pie.rating, Some(4));
    assert_eq!(pie.serves_count, Some(2.0));
    assert_eq!(pie.difficulty.as_deref(), Some("Easy"));
    assert_eq!(pie.prep_time.as_deref(), Some("PT10M"));
    assert_eq!(pie.cook_time, None);
    assert_eq!(pie.ingredients, vec!["1 onion"]);
    assert_eq!(pie.method, vec!["Chop."]);
    assert_eq!(pie.image.as_deref(), Some(&b"apple"[..]));

    let nutrition = pie.nutrition.unwrap();
    assert_eq!(nutrition.calories, Some(250.0));
    assert_eq!(nutrition.sugar, Some(12.0));
    assert_eq!(nutrition.salt, Some(1.1));
    assert_eq!(nutrition.fat, None);

    let stew = store.get_recipe_by_item_id(2).unwrap().unwrap();
    assert_eq!(stew.rating, Some(3));

    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.recipes_written, 3);
    assert_eq!(run.config_hash, "test-hash");
}

#[tokio::test]
async fn test_each_recipe_page_is_visited_once() {
    let mock_server = MockServer::start().await;

    // Registered first so they take precedence over the site's own mocks
    Mock::given(method("GET"))
        .and(path("/recipes/a"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(recipe_page(1, "Apple pie", "4.5")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/page/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&["/recipes/a", "/recipes/c"], None)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_site(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("recipes.db");
    let config = create_test_config(&format!("{}/search", mock_server.uri()), &db_path);

    run_crawl_session(config, "hash").await.unwrap();

    mock_server.verify().await;
}

#[tokio::test]
async fn test_detail_page_error_aborts_session() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/search",
        listing_page(&["/recipes/a", "/recipes/broken", "/recipes/c"], None),
    )
    .await;
    mount_html(&mock_server, "/recipes/a", recipe_page(1, "Apple pie", "4")).await;
    mount_html(&mock_server, "/recipes/c", recipe_page(3, "Carrot cake", "5")).await;
    Mock::given(method("GET"))
        .and(path("/recipes/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("recipes.db");
    let config = create_test_config(&format!("{}/search", mock_server.uri()), &db_path);

    let result = run_crawl_session(config, "hash").await;

    assert!(matches!(
        result,
        Err(HarvestError::Navigation(FetchError::Http { status: 500, .. }))
    ));

    let store = SqliteRecipeStore::new(&db_path).unwrap();
    // The recipe written before the failure is kept
    assert_eq!(store.count_recipes().unwrap(), 1);
    assert!(store.get_recipe_by_item_id(3).unwrap().is_none());

    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.recipes_written, 1);
}

#[tokio::test]
async fn test_missing_image_leaves_image_unset() {
    let mock_server = MockServer::start().await;

    mount_html(&mock_server, "/search", listing_page(&["/recipes/a"], None)).await;
    mount_html(&mock_server, "/recipes/a", recipe_page(1, "Apple pie", "4")).await;
    Mock::given(method("GET"))
        .and(path("/images/1.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("recipes.db");
    let config = create_test_config(&format!("{}/search", mock_server.uri()), &db_path);

    let summary = run_crawl_session(config, "hash").await.unwrap();
    assert_eq!(summary.recipes_written, 1);

    let store = SqliteRecipeStore::new(&db_path).unwrap();
    let pie = store.get_recipe_by_item_id(1).unwrap().unwrap();
    assert_eq!(pie.image, None);
    assert_eq!(pie.name, "Apple pie");
}

#[tokio::test]
async fn test_second_session_updates_existing_records() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("recipes.db");
    let start_url = format!("{}/search", mock_server.uri());

    run_crawl_session(create_test_config(&start_url, &db_path), "first")
        .await
        .unwrap();
    run_crawl_session(create_test_config(&start_url, &db_path), "second")
        .await
        .unwrap();

    let store = SqliteRecipeStore::new(&db_path).unwrap();
    assert_eq!(store.count_recipes().unwrap(), 3);

    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.config_hash, "second");
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_unreachable_listing_fails() {
    let mock_server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("recipes.db");
    // Nothing is mounted, so wiremock answers 404
    let config = create_test_config(&format!("{}/search", mock_server.uri()), &db_path);

    let result = run_crawl_session(config, "hash").await;

    assert!(matches!(
        result,
        Err(HarvestError::Navigation(FetchError::Http { status: 404, .. }))
    ));

    let store = SqliteRecipeStore::new(&db_path).unwrap();
    assert_eq!(store.count_recipes().unwrap(), 0);
}
