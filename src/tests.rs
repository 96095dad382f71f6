//! Integration tests for the pickup backend.

use std::path::Path;
use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::SessionManager;
use crate::blob::BlobStore;
use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::models::GameStatus;
use crate::{create_router, AppState};

const TEST_KEY: &str = "test-api-key";

fn test_config(dir: &Path, api_key: Option<String>, public_url: &str) -> Config {
    Config {
        api_key,
        db_path: dir.join("test.sqlite"),
        blob_dir: dir.join("blobs"),
        public_url: public_url.to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
        log_json: false,
        utc_offset: chrono::FixedOffset::east_opt(0).unwrap(),
        session_ttl: chrono::TimeDelta::hours(1),
        read_retries: 0,
        retry_backoff_ms: 0,
        unscheduled_status: GameStatus::Upcoming,
        contact_email: "hoops@example.com".to_string(),
        max_avatar_bytes: 1024,
        scrypt_log_n: 4,
    }
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_key(Some(TEST_KEY.to_string())).await
    }

    async fn with_key(api_key: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        let config = test_config(temp_dir.path(), api_key.clone(), &base_url);

        // Initialize database
        let pool = init_database(&config.db_path)
            .await
            .expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        let blobs = Arc::new(BlobStore::new(&config.blob_dir, &config.public_url));
        let sessions = Arc::new(SessionManager::new(
            repo.clone(),
            config.session_ttl,
            config.scrypt_params().expect("Invalid scrypt params"),
        ));

        let state = AppState {
            repo,
            sessions,
            blobs,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = api_key {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create an account and return its session token.
    async fn sign_up(&self, email: &str, display_name: Option<&str>) -> String {
        let resp = self
            .client
            .post(self.url("/api/auth/signup"))
            .json(&json!({
                "email": email,
                "password": "hoops123",
                "displayName": display_name,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Create a game and return its id.
    async fn create_game(&self, token: &str, title: &str, date: &str, skill: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/games"))
            .bearer_auth(token)
            .json(&json!({
                "title": title,
                "date": date,
                "time": "18:00",
                "skill": skill,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["gameId"].as_str().unwrap().to_string()
    }

    async fn get_game(&self, token: Option<&str>, id: &str) -> Value {
        let mut request = self.client.get(self.url(&format!("/api/games/{}", id)));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    async fn post(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_app_key_missing() {
    let fixture = TestFixture::new().await;

    // Request without API key
    let resp = Client::new()
        .get(fixture.url("/api/games"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_API_KEY");
}

#[tokio::test]
async fn test_app_key_invalid() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/games"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_app_key_disabled() {
    let fixture = TestFixture::with_key(None).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/games"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_account_lifecycle() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("Hooper@Example.com ", Some("Hooper")).await;

    // Current identity
    let resp = fixture
        .client
        .get(fixture.url("/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["email"], "hooper@example.com");
    assert_eq!(body["data"]["displayName"], "Hooper");

    // Sign out, then the token no longer resolves
    let resp = fixture.post(&token, "/api/auth/signout").await;
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].is_null());

    // Sign back in
    let resp = fixture
        .client
        .post(fixture.url("/api/auth/signin"))
        .json(&json!({"email": "hooper@example.com", "password": "hoops123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["token"].as_str().is_some());
}

#[tokio::test]
async fn test_account_errors() {
    let fixture = TestFixture::new().await;
    fixture.sign_up("a@x.com", None).await;

    let cases = [
        ("/api/auth/signup", json!({"email": "a@x.com", "password": "hoops123"}), 409, "EMAIL_IN_USE"),
        ("/api/auth/signup", json!({"email": "b@x.com", "password": "123"}), 400, "WEAK_PASSWORD"),
        ("/api/auth/signup", json!({"email": "not-an-email", "password": "hoops123"}), 400, "INVALID_EMAIL"),
        ("/api/auth/signin", json!({"email": "a@x.com", "password": "wrong-one"}), 401, "WRONG_PASSWORD"),
        ("/api/auth/signin", json!({"email": "z@x.com", "password": "hoops123"}), 401, "USER_NOT_FOUND"),
        ("/api/auth/signin", json!({"email": "", "password": "hoops123"}), 400, "VALIDATION_ERROR"),
    ];

    for (path, payload, status, code) in cases {
        let resp = fixture
            .client
            .post(fixture.url(path))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), status, "{} {}", path, payload);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], code);
    }
}

#[tokio::test]
async fn test_create_game_requires_login_and_valid_fields() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/games"))
        .json(&json!({"title": "Run", "date": "2025-06-01", "time": "18:00", "skill": "Beginner"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    let token = fixture.sign_up("a@x.com", None).await;
    let resp = fixture
        .client
        .post(fixture.url("/api/games"))
        .bearer_auth(&token)
        .json(&json!({"title": "Run", "date": "2025-06-01", "time": "25:00", "skill": "Beginner"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_game_returns_refreshed_catalog() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("a@x.com", Some("Alice")).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/games"))
        .bearer_auth(&token)
        .json(&json!({"title": "Sunset Run", "date": "2025-06-01", "time": "9:30", "skill": "Beginner"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["notice"], "Sunset Run created");

    let games = body["data"]["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["time"], "09:30");
    assert_eq!(games[0]["creator"], "a@x.com");
    assert_eq!(games[0]["creatorName"], "Alice");
    assert_eq!(games[0]["players"], json!([]));
    assert_eq!(games[0]["canEdit"], true);
    assert_eq!(games[0]["status"], "completed");
}

#[tokio::test]
async fn test_catalog_filters() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("a@x.com", None).await;
    fixture.create_game(&token, "Later", "2099-07-01", "Beginner").await;
    fixture.create_game(&token, "Sooner", "2099-06-01", "Advanced").await;

    // Sorted by date
    let resp = fixture
        .client
        .get(fixture.url("/api/games"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Sooner", "Later"]);
    assert_eq!(body["data"][0]["status"], "upcoming");

    let resp = fixture
        .client
        .get(fixture.url("/api/games?skill=advanced"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Sooner");

    let resp = fixture
        .client
        .get(fixture.url("/api/games?date=2099-06-15"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Later");

    let resp = fixture
        .client
        .get(fixture.url("/api/games?date=someday"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_join_is_idempotent_and_leave_restores() {
    let fixture = TestFixture::new().await;
    let owner = fixture.sign_up("owner@x.com", None).await;
    let id = fixture.create_game(&owner, "Run", "2099-06-01", "Beginner").await;
    let a = fixture.sign_up("a@x.com", None).await;

    let resp = fixture.post(&a, &format!("/api/games/{}/join", id)).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["notice"], "a joined the game");
    assert_eq!(body["data"]["games"][0]["players"], json!(["a"]));
    assert_eq!(body["data"]["games"][0]["joined"], true);

    let resp = fixture.post(&a, &format!("/api/games/{}/join", id)).await;
    assert_eq!(resp.status(), 200);
    let game = fixture.get_game(Some(&a), &id).await;
    assert_eq!(game["players"], json!(["a"]));

    let resp = fixture.post(&a, &format!("/api/games/{}/leave", id)).await;
    assert_eq!(resp.status(), 200);
    let game = fixture.get_game(Some(&a), &id).await;
    assert_eq!(game["players"], json!([]));
    assert_eq!(game["joined"], false);
}

#[tokio::test]
async fn test_join_requires_login_and_existing_game() {
    let fixture = TestFixture::new().await;
    let owner = fixture.sign_up("owner@x.com", None).await;
    let id = fixture.create_game(&owner, "Run", "2099-06-01", "Beginner").await;

    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/games/{}/join", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture.post(&owner, "/api/games/missing/join").await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_join_closed_for_past_games() {
    let fixture = TestFixture::new().await;
    let owner = fixture.sign_up("owner@x.com", None).await;
    let id = fixture.create_game(&owner, "Old Run", "2001-01-01", "Beginner").await;
    let a = fixture.sign_up("a@x.com", None).await;

    let resp = fixture.post(&a, &format!("/api/games/{}/join", id)).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Game is no longer open for joining");

    let game = fixture.get_game(Some(&a), &id).await;
    assert_eq!(game["status"], "completed");
    assert_eq!(game["players"], json!([]));
}

#[tokio::test]
async fn test_non_creator_cannot_mutate() {
    let fixture = TestFixture::new().await;
    let owner = fixture.sign_up("owner@x.com", None).await;
    let id = fixture.create_game(&owner, "Run", "2099-06-01", "Beginner").await;
    let other = fixture.sign_up("other@x.com", None).await;
    let before = fixture.get_game(None, &id).await;

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/games/{}", id)))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_CREATOR");

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/games/{}", id)))
        .bearer_auth(&other)
        .json(&json!({"title": "Hijacked"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/games/{}/notes", id)))
        .json(&json!({"notes": "guest notes"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let after = fixture.get_game(None, &id).await;
    assert_eq!(before, after);
    assert_eq!(after["canEdit"], false);
}

#[tokio::test]
async fn test_creator_edits_notes_and_deletes() {
    let fixture = TestFixture::new().await;
    let owner = fixture.sign_up("owner@x.com", None).await;
    let id = fixture.create_game(&owner, "Run", "2099-06-01", "Beginner").await;

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/games/{}/notes", id)))
        .bearer_auth(&owner)
        .json(&json!({"notes": "  Bring a white shirt  "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["notes"], "Bring a white shirt");

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/games/{}", id)))
        .bearer_auth(&owner)
        .json(&json!({"title": "Morning Run", "time": "7:00"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let game = fixture.get_game(Some(&owner), &id).await;
    assert_eq!(game["title"], "Morning Run");
    assert_eq!(game["time"], "07:00");
    assert_eq!(game["notes"], "Bring a white shirt");
    assert_eq!(game["canEdit"], true);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/games/{}", id)))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["games"], json!([]));

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/games/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_update_version_conflict() {
    let fixture = TestFixture::new().await;
    let owner = fixture.sign_up("owner@x.com", None).await;
    let id = fixture.create_game(&owner, "Run", "2099-06-01", "Beginner").await;
    let a = fixture.sign_up("a@x.com", None).await;
    fixture.post(&a, &format!("/api/games/{}/join", id)).await;

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/games/{}", id)))
        .bearer_auth(&owner)
        .json(&json!({"title": "Stale", "expectedVersion": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VERSION_MISMATCH");
    assert_eq!(body["error"]["details"]["currentVersion"], 2);
}

#[tokio::test]
async fn test_share_and_ics_endpoints() {
    let fixture = TestFixture::new().await;
    let owner = fixture.sign_up("owner@x.com", None).await;
    let id = fixture.create_game(&owner, "Sunset Run", "2099-06-01", "Beginner").await;

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/games/{}/share", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let links = &body["data"];
    assert_eq!(
        links["shareText"],
        "Check out Sunset Run at 18:00 (Beginner) on Miami Pickup Basketball!"
    );
    assert!(links["calendarLink"]
        .as_str()
        .unwrap()
        .contains("dates=20990601T180000Z/20990601T190000Z"));
    assert_eq!(links["intents"].as_array().unwrap().len(), 3);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/games/{}/share/tiktok", id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["copyToClipboard"], true);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/games/{}/share/myspace", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/games/{}/ics", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/calendar"));
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"Sunset Run.ics\""
    );
    let ics = resp.text().await.unwrap();
    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics.contains("SUMMARY:Sunset Run"));
}

#[tokio::test]
async fn test_profile_and_avatar() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("a@x.com", None).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["displayName"], "a");

    let resp = fixture
        .client
        .put(fixture.url("/api/profile"))
        .bearer_auth(&token)
        .json(&json!({"displayName": " Ace ", "phone": "555-0100"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["displayName"], "Ace");
    assert_eq!(body["data"]["phone"], "555-0100");

    // Wrong content type
    let resp = fixture
        .client
        .put(fixture.url("/api/profile/avatar"))
        .bearer_auth(&token)
        .header("content-type", "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .put(fixture.url("/api/profile/avatar"))
        .bearer_auth(&token)
        .header("content-type", "image/png")
        .body(vec![0x89, b'P', b'N', b'G'])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let avatar_url = body["data"]["avatarUrl"].as_str().unwrap().to_string();
    assert!(avatar_url.starts_with(&fixture.url("/blobs/avatars/")));

    // Public blob, no key needed
    let resp = Client::new().get(&avatar_url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &[0x89, b'P', b'N', b'G']);

    // Over the size limit
    let resp = fixture
        .client
        .put(fixture.url("/api/profile/avatar"))
        .bearer_auth(&token)
        .header("content-type", "image/png")
        .body(vec![0u8; 4096])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Avatar exceeds 1024 bytes");
    assert!(body["revisionId"].is_i64());

    // Exactly at the limit is accepted
    let resp = fixture
        .client
        .put(fixture.url("/api/profile/avatar"))
        .bearer_auth(&token)
        .header("content-type", "image/png")
        .body(vec![1u8; 1024])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_display_name_flows_into_catalog() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("a@x.com", None).await;
    let id = fixture.create_game(&token, "Run", "2099-06-01", "Beginner").await;
    fixture.post(&token, &format!("/api/games/{}/join", id)).await;

    fixture
        .client
        .put(fixture.url("/api/profile"))
        .bearer_auth(&token)
        .json(&json!({"displayName": "Ace"}))
        .send()
        .await
        .unwrap();

    let game = fixture.get_game(None, &id).await;
    assert_eq!(game["creatorName"], "Ace");
    assert_eq!(game["players"], json!(["Ace"]));
}

#[tokio::test]
async fn test_revision_increments_on_write() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/datastore/revision"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let initial_rev = body["data"]["revisionId"].as_i64().unwrap();

    let token = fixture.sign_up("a@x.com", None).await;
    fixture.create_game(&token, "Run", "2099-06-01", "Beginner").await;

    let resp = fixture
        .client
        .get(fixture.url("/api/datastore/revision"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let new_rev = body["data"]["revisionId"].as_i64().unwrap();
    assert!(new_rev > initial_rev);
    assert_eq!(body["revisionId"], new_rev);
}

#[tokio::test]
async fn test_contact() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/contact"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["email"], "hoops@example.com");
    assert_eq!(body["data"]["mailto"], "mailto:hoops@example.com");
}
