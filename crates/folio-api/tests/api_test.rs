//! HTTP behaviour of the folio API against a real router.
//!
//! Each test binds the full router on 127.0.0.1:0 over a fresh temporary
//! persist directory and drives it with reqwest.

use std::collections::HashMap;
use std::sync::OnceLock;

use folio_api::{build_router, AppState, Config};
use folio_core::CountryIndex;
use reqwest::header::{COOKIE, ETAG, IF_MATCH, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

const PASSWORD: &str = "correct horse battery staple";

const SQUARELAND: &str = r#"{
  "type": "FeatureCollection",
  "features": [{
    "type": "Feature",
    "properties": {"ADMIN": "Squareland"},
    "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}
  }]
}"#;

fn password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| folio_crypto::hash_password(PASSWORD).unwrap())
}

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    persist: TempDir,
    site: TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn data_file(&self, name: &str) -> std::path::PathBuf {
        self.persist.path().join("data").join(name)
    }

    fn read_data(&self, name: &str) -> String {
        std::fs::read_to_string(self.data_file(name)).unwrap()
    }

    fn seed(&self, name: &str, value: &Value) {
        std::fs::create_dir_all(self.persist.path().join("data")).unwrap();
        std::fs::write(self.data_file(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn session_files(&self) -> usize {
        match std::fs::read_dir(self.persist.path().join(".sessions")) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    async fn login(&self) -> String {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({"password": PASSWORD}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).expect("login sets a session cookie")
    }
}

/// `folio.sid=<value>` from a Set-Cookie header.
fn session_cookie(response: &reqwest::Response) -> Option<String> {
    let header = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    let pair = header.split(';').next()?.trim();
    pair.starts_with("folio.sid=").then(|| pair.to_string())
}

async fn spawn_server_with(vars: &[(&str, &str)]) -> TestServer {
    let persist = TempDir::new().unwrap();
    let site = TempDir::new().unwrap();

    let mut env: HashMap<String, String> = HashMap::from([
        ("PERSIST_PATH".to_string(), persist.path().display().to_string()),
        ("SITE_ROOT".to_string(), site.path().display().to_string()),
        ("SESSION_SECRET".to_string(), "integration-test-secret".to_string()),
        ("ADMIN_PASSWORD_HASH".to_string(), password_hash().to_string()),
    ]);
    for (key, value) in vars {
        env.insert(key.to_string(), value.to_string());
    }
    let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
    let countries = CountryIndex::from_geojson(SQUARELAND).unwrap();
    let state = AppState::new(config, countries).unwrap();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        persist,
        site,
    }
}

async fn spawn_server() -> TestServer {
    spawn_server_with(&[]).await
}

async fn error_message(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    body["error"].as_str().unwrap().to_string()
}

// -- Auth --

#[tokio::test]
async fn test_wrong_password_is_rejected_without_session() {
    let server = spawn_server().await;

    let response = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({"password": "wrong"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
    assert_eq!(error_message(response).await, "Invalid credentials.");
    assert_eq!(server.session_files(), 0);
}

#[tokio::test]
async fn test_empty_password_is_bad_request() {
    let server = spawn_server().await;
    let response = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({"password": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_without_configured_hash_is_server_error() {
    let server = spawn_server_with(&[("ADMIN_PASSWORD_HASH", "")]).await;
    let response = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({"password": PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_login_cookie_attributes() {
    let server = spawn_server_with(&[("NODE_ENV", "production")]).await;
    let response = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({"password": PASSWORD, "username": "admin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let header = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("SameSite=Lax"));
    assert!(header.contains("Max-Age=86400"));
    assert!(header.contains("Secure"));
    assert_eq!(server.session_files(), 1);
}

#[tokio::test]
async fn test_login_regenerates_session() {
    let server = spawn_server().await;
    let first = server.login().await;

    let response = server
        .client
        .post(server.url("/api/login"))
        .header(COOKIE, &first)
        .json(&json!({"password": PASSWORD}))
        .send()
        .await
        .unwrap();
    let second = session_cookie(&response).unwrap();

    assert_ne!(first, second);
    assert_eq!(server.session_files(), 1);

    let status: Value = server
        .client
        .get(server.url("/api/auth/status"))
        .header(COOKIE, &first)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["isAuthenticated"], false);
}

#[tokio::test]
async fn test_status_and_logout() {
    let server = spawn_server().await;
    let cookie = server.login().await;

    let status: Value = server
        .client
        .get(server.url("/api/auth/status"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status, json!({"isAuthenticated": true, "username": "admin"}));

    let response = server
        .client
        .post(server.url("/api/logout"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[SET_COOKIE]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));
    assert_eq!(server.session_files(), 0);

    let response = server
        .client
        .post(server.url("/api/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_tampered_cookie_is_rejected() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    let mut tampered = cookie.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });

    let response = server
        .client
        .post(server.url("/api/save/books"))
        .header(COOKIE, &tampered)
        .json(&json!([{"title": "T", "author": "A"}]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!server.data_file("books.json").exists());
}

#[tokio::test]
async fn test_login_rate_limit() {
    let server = spawn_server_with(&[("LOGIN_RATE_LIMIT_PER_MINUTE", "1")]).await;
    let attempt = || {
        server
            .client
            .post(server.url("/api/login"))
            .json(&json!({"password": "wrong"}))
            .send()
    };

    assert_eq!(attempt().await.unwrap().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(attempt().await.unwrap().status(), StatusCode::TOO_MANY_REQUESTS);
}

// -- Section documents --

#[tokio::test]
async fn test_public_read_and_unauthenticated_save() {
    let server = spawn_server().await;
    let books = json!([{"title": "Dune", "author": "Frank Herbert"}]);
    server.seed("books.json", &books);
    let before = server.read_data("books.json");

    let response = server
        .client
        .get(server.url("/api/data/books"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), books);

    let response = server
        .client
        .post(server.url("/api/save/books"))
        .json(&json!([]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(response).await, "Unauthorized. Please log in.");
    assert_eq!(server.read_data("books.json"), before);
}

#[tokio::test]
async fn test_save_then_read_round_trip() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    let books = json!([
        {"title": "Dune", "author": "Frank Herbert", "rating": 5, "notes": {"reread": true}},
        {"title": "Emma", "author": "Jane Austen"}
    ]);

    let response = server
        .client
        .post(server.url("/api/save/books"))
        .header(COOKIE, &cookie)
        .json(&books)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "message": "Books data saved successfully."}));

    let read: Value = server
        .client
        .get(server.url("/api/data/books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(read, books);
}

#[tokio::test]
async fn test_nested_section_keys() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    let skills = json!({"languages": ["Rust", "Python"]});

    let response = server
        .client
        .post(server.url("/api/save/cv/skills"))
        .header(COOKIE, &cookie)
        .json(&skills)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(server.data_file("cv_skills.json").exists());

    let read: Value = server
        .client
        .get(server.url("/api/data/cv/skills"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(read, skills);
}

#[tokio::test]
async fn test_missing_file_is_json_404() {
    let server = spawn_server().await;
    let response = server
        .client
        .get(server.url("/api/data/books"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(error_message(response).await.contains("books.json"));
}

#[tokio::test]
async fn test_malformed_file_is_500() {
    let server = spawn_server().await;
    std::fs::create_dir_all(server.persist.path().join("data")).unwrap();
    std::fs::write(server.data_file("trips.json"), "[{").unwrap();

    let response = server
        .client
        .get(server.url("/api/data/trips"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_section_is_400() {
    let server = spawn_server().await;
    let response = server
        .client
        .get(server.url("/api/data/recipes"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_record_is_rejected() {
    let server = spawn_server().await;
    let cookie = server.login().await;

    let response = server
        .client
        .post(server.url("/api/save/books"))
        .header(COOKIE, &cookie)
        .json(&json!([{"title": "No author"}]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("author"));
    assert!(!server.data_file("books.json").exists());
}

#[tokio::test]
async fn test_backup_holds_previous_content() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    server.seed("trips.json", &json!([{"id": "t1", "name": "Old"}]));
    let before = server.read_data("trips.json");

    let response = server
        .client
        .post(server.url("/api/save/trips"))
        .header(COOKIE, &cookie)
        .json(&json!([{"id": "t1", "name": "New"}]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.read_data("trips.json.bak"), before);
}

#[tokio::test]
async fn test_stale_if_match_is_conflict() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    server.seed("projects.json", &json!([{"id": "a"}]));

    let etag = server
        .client
        .get(server.url("/api/data/projects"))
        .send()
        .await
        .unwrap()
        .headers()[ETAG]
        .to_str()
        .unwrap()
        .to_string();

    let response = server
        .client
        .post(server.url("/api/save/projects"))
        .header(COOKIE, &cookie)
        .header(IF_MATCH, &etag)
        .json(&json!([{"id": "b"}]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let after_first = server.read_data("projects.json");

    let response = server
        .client
        .post(server.url("/api/save/projects"))
        .header(COOKIE, &cookie)
        .header(IF_MATCH, &etag)
        .json(&json!([{"id": "c"}]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(server.read_data("projects.json"), after_first);
}

// -- Reorder --

#[tokio::test]
async fn test_reorder_missing_id_writes_nothing() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    server.seed("projects.json", &json!([{"id": "a"}]));
    let before = server.read_data("projects.json");

    let response = server
        .client
        .post(server.url("/api/data/projects/order"))
        .header(COOKIE, &cookie)
        .json(&json!(["a", "b"]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Some ids do not exist: b");
    assert_eq!(server.read_data("projects.json"), before);
    assert!(!server.data_file("projects.json.bak").exists());
}

#[tokio::test]
async fn test_reorder_assigns_positions() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    server.seed(
        "research_journal.json",
        &json!([
            {"id": "x", "title": "X", "authors": "A", "venue": "J"},
            {"id": "y", "title": "Y", "authors": "A", "venue": "J"}
        ]),
    );

    let response = server
        .client
        .post(server.url("/api/data/journal/order"))
        .header(COOKIE, &cookie)
        .json(&json!(["y", "x"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let records: Value = serde_json::from_str(&server.read_data("research_journal.json")).unwrap();
    let order_of = |id: &str| {
        records
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["id"] == id)
            .unwrap()["order"]
            .clone()
    };
    assert_eq!(order_of("y"), 0);
    assert_eq!(order_of("x"), 1);
}

#[tokio::test]
async fn test_reorder_rejects_non_string_ids_and_unknown_sections() {
    let server = spawn_server().await;
    let cookie = server.login().await;

    for (path, body) in [
        ("/api/data/projects/order", json!([1, 2])),
        ("/api/data/books/order", json!(["a"])),
    ] {
        let response = server
            .client
            .post(server.url(path))
            .header(COOKIE, &cookie)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", path);
    }
}

#[tokio::test]
async fn test_reorder_photos() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    server.seed(
        "images.json",
        &json!([{"imageFull": "a.jpg"}, {"imageFull": "b.jpg"}]),
    );

    let response = server
        .client
        .post(server.url("/api/images/reorder"))
        .header(COOKIE, &cookie)
        .json(&json!([{"slug": "b.jpg", "idx": 0}, {"slug": "a.jpg", "idx": 1}]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let photos: Value = serde_json::from_str(&server.read_data("images.json")).unwrap();
    assert_eq!(photos[0]["sortIndex"], 1);
    assert_eq!(photos[1]["sortIndex"], 0);
}

// -- Country lookup and gallery --

#[tokio::test]
async fn test_save_images_assigns_missing_countries() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    let photos = json!([
        {"title": "inside", "lat": 5.0, "lng": 5.0},
        {"title": "kept", "lat": 5.0, "lng": 5.0, "country": "Elsewhere"},
        {"title": "outside", "lat": 50.0, "lng": 50.0}
    ]);

    let response = server
        .client
        .post(server.url("/api/save/images"))
        .header(COOKIE, &cookie)
        .json(&photos)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let saved: Value = serde_json::from_str(&server.read_data("images.json")).unwrap();
    assert_eq!(saved[0]["country"], "Squareland");
    assert_eq!(saved[1]["country"], "Elsewhere");
    assert!(saved[2].get("country").is_none());
}

#[tokio::test]
async fn test_gallery_by_trip() {
    let server = spawn_server().await;
    server.seed(
        "images.json",
        &json!([
            {"imageFull": "a.jpg", "tripId": "t1", "date": "2021-02-01"},
            {"imageFull": "b.jpg", "tripId": "t2"},
            {"imageFull": "c.jpg", "tripId": "t1", "date": "2021-01-01"}
        ]),
    );
    server.seed("trips.json", &json!([{"id": "t1", "name": "Alps"}]));

    let response = server
        .client
        .get(server.url("/api/gallery/0"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let gallery: Value = response.json().await.unwrap();

    assert_eq!(gallery["context"], "trip");
    assert_eq!(gallery["description"], "Trip: Alps");
    let indices: Vec<u64> = gallery["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["index"].as_u64().unwrap())
        .collect();
    assert_eq!(indices, vec![2, 0]);
    assert_eq!(gallery["startIndex"], 1);
}

#[tokio::test]
async fn test_gallery_errors() {
    let server = spawn_server().await;
    server.seed("images.json", &json!([{"imageFull": "a.jpg"}]));

    let response = server
        .client
        .get(server.url("/api/gallery/7"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server
        .client
        .get(server.url("/api/gallery/0?context=album"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Content documents --

#[tokio::test]
async fn test_homepage_is_sanitised_and_served_as_html() {
    let server = spawn_server().await;
    let cookie = server.login().await;

    let response = server
        .client
        .get(server.url("/api/content/homepage"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server
        .client
        .post(server.url("/api/content/homepage"))
        .header(COOKIE, &cookie)
        .json(&json!({"html": "<p onclick=\"x()\">Hello</p><script>alert(1)</script>"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = server
        .client
        .get(server.url("/api/content/homepage"))
        .send()
        .await
        .unwrap();
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html = response.text().await.unwrap();
    assert!(html.contains("Hello"));
    assert!(!html.contains("script"));
    assert!(!html.contains("onclick"));
}

#[tokio::test]
async fn test_homepage_requires_html_string() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    let response = server
        .client
        .post(server.url("/api/content/homepage"))
        .header(COOKIE, &cookie)
        .json(&json!({"html": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contact_banner_round_trip() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    let banner = json!({
        "html": "<b>Say hi</b>",
        "links": [{"id": "gh", "url": "https://example.org"}],
        "emails": ["me@example.org"]
    });

    let response = server
        .client
        .post(server.url("/api/content/contactBanner"))
        .header(COOKIE, &cookie)
        .json(&banner)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let read: Value = server
        .client
        .get(server.url("/api/content/contactBanner"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(read, banner);

    let response = server
        .client
        .post(server.url("/api/content/contactBanner"))
        .header(COOKIE, &cookie)
        .json(&json!({"links": "nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Uploads and static files --

fn png_bytes() -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(&[0u8; 32]);
    data
}

async fn upload(
    server: &TestServer,
    cookie: Option<&str>,
    path: &str,
    field: &str,
    part: reqwest::multipart::Part,
) -> reqwest::Response {
    let form = reqwest::multipart::Form::new().part(field.to_string(), part);
    let mut request = server.client.post(server.url(path)).multipart(form);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    request.send().await.unwrap()
}

#[tokio::test]
async fn test_image_upload_is_stored_and_served() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    let part = reqwest::multipart::Part::bytes(png_bytes())
        .file_name("holiday.png")
        .mime_str("image/png")
        .unwrap();

    let response = upload(&server, Some(&cookie), "/api/upload/image", "uploadedImage", part).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let filename = body["filename"].as_str().unwrap().to_string();
    assert!(filename.starts_with("upload-"));
    assert!(filename.ends_with(".png"));
    assert!(server.persist.path().join("img").join(&filename).exists());

    let served = server
        .client
        .get(server.url(&format!("/img/{}", filename)))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().to_vec(), png_bytes());
}

#[tokio::test]
async fn test_upload_rejects_non_images_and_anonymous_users() {
    let server = spawn_server().await;
    let cookie = server.login().await;

    let part = reqwest::multipart::Part::bytes(b"hello".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let response = upload(&server, Some(&cookie), "/api/upload/image", "uploadedImage", part).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let part = reqwest::multipart::Part::bytes(png_bytes())
        .file_name("a.png")
        .mime_str("image/png")
        .unwrap();
    let response = upload(&server, None, "/api/upload/image", "uploadedImage", part).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!server.persist.path().join("img").exists());
}

#[tokio::test]
async fn test_svg_icon_upload() {
    let server = spawn_server().await;
    let cookie = server.login().await;
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"><circle r="1"/></svg>"#.to_vec();
    let part = reqwest::multipart::Part::bytes(svg)
        .file_name("mail.svg")
        .mime_str("image/svg+xml")
        .unwrap();

    let response = upload(&server, Some(&cookie), "/api/upload/icon", "icon", part).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["filename"].as_str().unwrap().ends_with(".svg"));
}

#[tokio::test]
async fn test_site_files_and_hidden_paths() {
    let server = spawn_server().await;
    std::fs::write(server.site.path().join("index.html"), "<h1>folio</h1>").unwrap();
    std::fs::write(server.site.path().join(".env"), "SESSION_SECRET=x").unwrap();
    std::fs::create_dir_all(server.site.path().join(".sessions")).unwrap();
    std::fs::write(server.site.path().join(".sessions/x.json"), "{}").unwrap();
    std::fs::create_dir_all(server.site.path().join("icons")).unwrap();
    std::fs::write(server.site.path().join("icons/mail.svg"), "<svg/>").unwrap();

    let index = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(index.text().await.unwrap(), "<h1>folio</h1>");

    let icon = server
        .client
        .get(server.url("/icons/mail.svg"))
        .send()
        .await
        .unwrap();
    assert_eq!(icon.status(), StatusCode::OK);

    for hidden in [
        "/.env",
        "/.sessions/x.json",
        "/%2Eenv",
        "/%2eenv",
        "/%2esessions/x.json",
    ] {
        let response = server.client.get(server.url(hidden)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", hidden);
        assert!(!response.text().await.unwrap().contains("SESSION_SECRET"), "{}", hidden);
    }
}

// -- System --

#[tokio::test]
async fn test_health_and_cesium_token() {
    let server = spawn_server_with(&[("CESIUM_ION_TOKEN", "ion-token")]).await;

    let health: Value = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["version"].is_string());

    let token: Value = server
        .client
        .get(server.url("/api/config/cesium-token"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(token["token"], "ion-token");
}

#[tokio::test]
async fn test_missing_cesium_token_is_server_error() {
    let server = spawn_server().await;
    let response = server
        .client
        .get(server.url("/api/config/cesium-token"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(response).await, "Server configuration error.");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let server = spawn_server().await;
    let response = server.client.get(server.url("/health")).send().await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
