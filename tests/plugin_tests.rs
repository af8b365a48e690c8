use sentry_release_uploader::{
    BuildPlugin, Compilation, EmittedAsset, ReleaseBody, ReleaseUploader, ReleaseVersion,
    UploaderOptions, UrlScheme,
};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const RELEASES: &str = "/organizations/acme/releases/";
const FILES: &str = "/organizations/acme/releases/v1.0.0/files/";

/// Writes `app.js`, `app.js.map` and `app.css` and returns them as assets
fn build_output() -> (TempDir, Vec<EmittedAsset>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut assets = Vec::new();
    for (name, content) in [
        ("app.js", "console.log('hi')"),
        ("app.js.map", "{\"version\":3}"),
        ("app.css", "body{}"),
    ] {
        let file = dir.path().join(name);
        fs::write(&file, content).expect("Failed to write asset");
        assets.push(EmittedAsset::new(name, file));
    }
    (dir, assets)
}

fn options(server: &MockServer) -> UploaderOptions {
    UploaderOptions::new()
        .with_organization("acme")
        .with_project("web")
        .with_api_key("k")
        .with_release("v1.0.0")
        .with_base_sentry_url(&server.uri())
}

fn uploader(options: UploaderOptions) -> ReleaseUploader {
    ReleaseUploader::new(options).expect("Failed to build uploader")
}

async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

#[tokio::test]
async fn test_end_to_end_release_and_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RELEASES))
        .and(header("authorization", "Bearer k"))
        .and(body_json(json!({"version": "v1.0.0", "projects": ["web"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"version": "v1.0.0"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FILES))
        .and(header("authorization", "Bearer k"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "9"})))
        .expect(2)
        .mount(&server)
        .await;

    let (_dir, assets) = build_output();
    let mut compilation = Compilation::new("abc", assets);
    uploader(options(&server)).after_emit(&mut compilation).await;

    assert!(compilation.errors.is_empty(), "{:?}", compilation.errors);
    assert!(compilation.warnings.is_empty());

    let requests = received(&server).await;
    assert_eq!(requests.len(), 3);
    assert!(
        requests.iter().all(|r| r.method.as_str() == "POST"),
        "no listing or deletion without overwrite"
    );

    let uploads: Vec<String> = requests
        .iter()
        .filter(|r| r.url.path() == FILES)
        .map(body_text)
        .collect();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads.iter().filter(|b| b.contains("~/app.js.map")).count(), 1);
    assert!(uploads.iter().all(|b| b.contains("name=\"file\"")));
    assert!(uploads.iter().all(|b| !b.contains("app.css")));
    assert!(uploads.iter().any(|b| b.contains("console.log('hi')")));
}

#[tokio::test]
async fn test_overwrite_deletes_only_artifacts_with_ids_before_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RELEASES))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(FILES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "11", "name": "~/old.js"},
            {"id": 12, "name": "~/old.js.map"},
            {"name": "~/orphan.js"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/organizations/acme/releases/v1.0.0/files/11/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/organizations/acme/releases/v1.0.0/files/12/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FILES))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let (_dir, assets) = build_output();
    let compilation = Compilation::new("abc", assets);
    let outcome = uploader(options(&server).with_should_overwrite(true))
        .publish(&compilation)
        .await
        .expect("publish succeeds");
    assert_eq!(outcome.version, "v1.0.0");
    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.uploaded, 2);

    let requests = received(&server).await;
    let last_delete = requests
        .iter()
        .rposition(|r| r.method.as_str() == "DELETE")
        .expect("deletes issued");
    let first_upload = requests
        .iter()
        .position(|r| r.method.as_str() == "POST" && r.url.path() == FILES)
        .expect("uploads issued");
    assert!(last_delete < first_upload);
}

#[tokio::test]
async fn test_failed_delete_stops_before_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RELEASES))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(FILES))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "11", "name": "~/old.js"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/organizations/acme/releases/v1.0.0/files/11/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage down"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FILES))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, assets) = build_output();
    let mut compilation = Compilation::new("abc", assets);
    uploader(options(&server).with_should_overwrite(true))
        .after_emit(&mut compilation)
        .await;

    assert_eq!(compilation.errors.len(), 1);
    assert!(compilation.errors[0].starts_with("Sentry Plugin: "));
    assert!(compilation.errors[0].contains("500"));
    assert!(compilation.warnings.is_empty());
}

#[tokio::test]
async fn test_suppressed_conflict_becomes_warning() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RELEASES))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"detail": "Release already exists"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FILES))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, assets) = build_output();
    let mut compilation = Compilation::new("abc", assets);
    uploader(options(&server).with_suppress_conflict_error(true))
        .after_emit(&mut compilation)
        .await;

    assert!(compilation.errors.is_empty());
    assert_eq!(compilation.warnings.len(), 1);
    assert!(compilation.warnings[0].starts_with("Sentry Plugin: "));
    assert!(compilation.warnings[0].contains("409"));
}

#[tokio::test]
async fn test_unsuppressed_conflict_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RELEASES))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let mut compilation = Compilation::new("abc", Vec::new());
    uploader(options(&server)).after_emit(&mut compilation).await;

    assert_eq!(compilation.errors.len(), 1);
    assert!(compilation.errors[0].contains("409"));
    assert!(compilation.warnings.is_empty());
}

#[tokio::test]
async fn test_missing_option_never_hits_network() {
    let server = MockServer::start().await;

    let mut without_org = options(&server);
    without_org.organization = None;
    let mut without_key = options(&server);
    without_key.api_key = None;

    for (opts, expected) in [
        (without_org, "Sentry Plugin: Must provide organization"),
        (without_key, "Sentry Plugin: Must provide api key"),
        (
            options(&server).with_projects(Vec::<String>::new()),
            "Sentry Plugin: Must provide project",
        ),
    ] {
        let mut compilation = Compilation::new("abc", Vec::new());
        uploader(opts).after_emit(&mut compilation).await;
        assert_eq!(compilation.errors, vec![expected]);
    }

    assert!(received(&server).await.is_empty());
}

#[tokio::test]
async fn test_failed_upload_fails_the_stage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RELEASES))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FILES))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let (_dir, assets) = build_output();
    let mut compilation = Compilation::new("abc", assets);
    uploader(options(&server).with_suppress_errors(true))
        .after_emit(&mut compilation)
        .await;

    assert!(compilation.errors.is_empty());
    assert_eq!(compilation.warnings.len(), 1);
    assert!(compilation.warnings[0].contains("500"));
    assert!(compilation.warnings[0].contains("boom"));
}

#[tokio::test]
async fn test_derived_release_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RELEASES))
        .and(body_json(json!({
            "version": "web@f00d",
            "projects": ["web", "api"],
            "refs": [{"repository": "acme/web", "commit": "f00d"}]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/organizations/acme/releases/web@f00d/files/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, assets) = build_output();
    let options = options(&server)
        .with_projects(["web", "api"])
        .with_release(ReleaseVersion::derived(|hash| format!("web@{hash}")))
        .with_release_body(ReleaseBody::derived(|version, projects| {
            let commit = version.trim_start_matches("web@");
            json!({
                "version": version,
                "projects": projects,
                "refs": [{"repository": "acme/web", "commit": commit}]
            })
        }))
        .with_include(Some(regex::Regex::new(r"\.map$").expect("regex")));

    let uploader = uploader(options);
    let mut compilation = Compilation::new("f00d", assets);
    uploader.after_emit(&mut compilation).await;

    assert!(compilation.errors.is_empty(), "{:?}", compilation.errors);
    assert!(
        uploader.options().release.as_ref().is_some_and(|r| matches!(r, ReleaseVersion::Derived(_))),
        "options are not overwritten by resolution"
    );
}

#[tokio::test]
async fn test_project_scoped_url_scheme() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/0/projects/acme/web/releases/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/0/projects/acme/web/releases/v1.0.0/files/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let (_dir, assets) = build_output();
    let mut compilation = Compilation::new("abc", assets);
    let options = options(&server)
        .with_base_sentry_url(&format!("{}/api/0/projects/", server.uri()))
        .with_url_scheme(UrlScheme::ProjectScoped);
    uploader(options).after_emit(&mut compilation).await;

    assert!(compilation.errors.is_empty(), "{:?}", compilation.errors);
}

#[test]
fn test_done_removes_only_matching_outputs() {
    let (dir, assets) = build_output();
    let compilation = Compilation::new("abc", assets);
    let uploader = uploader(UploaderOptions::new().with_delete_after_compile(true));

    let removed = uploader.done(&compilation.stats()).expect("cleanup succeeds");

    assert_eq!(removed, vec![dir.path().join("app.js.map")]);
    assert!(dir.path().join("app.js").exists());
    assert!(dir.path().join("app.css").exists());
    assert!(!dir.path().join("app.js.map").exists());
}
