use std::fs;
use std::path::Path;

use reqwest::StatusCode;
use reqwest::header::{
    ACCEPT_RANGES, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE, IF_MODIFIED_SINCE, LAST_MODIFIED,
    RANGE,
};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

use nsdrop_server::Server;
use nsdrop_server::config::ServerConfig;

// Running server plus the directory holding both storage roots
struct TestServer {
    base_url: String,
    client: reqwest::Client,
    temp: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let temp = tempdir().unwrap();
        let config = ServerConfig {
            bind_address: "127.0.0.1".into(),
            port: 0,
            upload_root: temp.path().join("uploads").to_string_lossy().into_owned(),
            metadata_root: temp.path().join("metadata").to_string_lossy().into_owned(),
        };

        let server = Server::new(config).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.start());

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            temp,
        }
    }

    fn url(&self, namespace: &str, path: &str) -> String {
        format!("{}/files/{}/{}", self.base_url, namespace, path)
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    async fn upload(
        &self,
        namespace: &str,
        path: &str,
        content: &[u8],
        password: Option<&str>,
    ) -> reqwest::Response {
        let part = Part::bytes(content.to_vec()).file_name("upload.bin");
        let form = Form::new().part("file", part);

        let mut request = self.client.post(self.url(namespace, path)).multipart(form);
        if let Some(password) = password {
            request = request.header(AUTHORIZATION, password);
        }
        request.send().await.unwrap()
    }

    async fn download(
        &self,
        namespace: &str,
        path: &str,
        password: Option<&str>,
    ) -> reqwest::Response {
        let mut request = self.client.get(self.url(namespace, path));
        if let Some(password) = password {
            request = request.header(AUTHORIZATION, password);
        }
        request.send().await.unwrap()
    }
}

#[tokio::test]
async fn test_upload_then_download_without_password() {
    let server = TestServer::start().await;

    let response = server.upload("docs", "readme.txt", b"hello", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "file_name": "readme.txt"}));

    let response = server.download("docs", "readme.txt", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"), "got {content_type}");
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"hello");
}

#[tokio::test]
async fn test_password_protected_download() {
    let server = TestServer::start().await;

    let response = server.upload("docs", "secret.txt", b"x", Some("pw1")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.download("docs", "secret.txt", Some("wrong")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Bad password"}));

    let response = server.download("docs", "secret.txt", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server.download("docs", "secret.txt", Some("pw1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"x");
}

#[tokio::test]
async fn test_second_upload_replaces_content() {
    let server = TestServer::start().await;

    server.upload("docs", "notes.md", b"first", None).await;
    server.upload("docs", "notes.md", b"second", None).await;

    let response = server.download("docs", "notes.md", None).await;
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"second");
}

#[tokio::test]
async fn test_upload_without_password_keeps_previous_password() {
    let server = TestServer::start().await;

    server.upload("docs", "report.pdf", b"v1", Some("pw1")).await;
    let response = server.upload("docs", "report.pdf", b"v2", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.download("docs", "report.pdf", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server.download("docs", "report.pdf", Some("pw1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"v2");
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let server = TestServer::start().await;

    for password in [None, Some("anything")] {
        let response = server.download("docs", "never-uploaded.txt", password).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "File does not exist"}));
    }
}

#[tokio::test]
async fn test_upload_without_file_field_is_bad_request() {
    let server = TestServer::start().await;

    let form = Form::new().text("other", "value");
    let response = server
        .client
        .post(server.url("docs", "a.txt"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let response = server
        .client
        .post(server.url("docs", "a.txt"))
        .body("not multipart")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(!server.root().join("uploads/docs/a.txt").exists());
}

#[tokio::test]
async fn test_upload_stores_leaf_name_in_both_trees() {
    let server = TestServer::start().await;

    let response = server
        .upload("docs", "drafts/2024/plan.txt", b"plan", Some("pw"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["file_name"], "plan.txt");

    let root = server.root();
    assert_eq!(fs::read(root.join("uploads/docs/plan.txt")).unwrap(), b"plan");
    assert_eq!(fs::read(root.join("metadata/docs/plan.txt")).unwrap(), b"pw");
    assert!(!root.join("uploads/docs/drafts").exists());
}

#[tokio::test]
async fn test_download_addresses_subdirectories() {
    let server = TestServer::start().await;

    let nested = server.root().join("uploads/docs/archive/2023");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("old.txt"), b"archived").unwrap();

    let response = server.download("docs", "archive/2023/old.txt", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"archived");

    // a directory is not a file
    let response = server.download("docs", "archive", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traversal_is_rejected() {
    let server = TestServer::start().await;
    fs::write(server.root().join("outside.txt"), b"private").unwrap();

    // %2F keeps the client from resolving the dot segments itself
    let response = server.download("docs", "..%2F..%2Foutside.txt", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .upload("docs", "..%2F..%2Fescaped.txt", b"x", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!server.root().join("escaped.txt").exists());
    assert!(!server.root().join("uploads/escaped.txt").exists());
}

#[tokio::test]
async fn test_namespaces_are_isolated() {
    let server = TestServer::start().await;

    server.upload("alpha", "shared.txt", b"alpha data", Some("a-pw")).await;

    let response = server.download("beta", "shared.txt", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.upload("beta", "shared.txt", b"beta data", None).await;
    let response = server.download("beta", "shared.txt", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"beta data");

    let response = server.download("alpha", "shared.txt", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_binary_content_round_trip() {
    let server = TestServer::start().await;
    let content: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();

    let response = server.upload("bin", "blob.dat", &content, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.download("bin", "blob.dat", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), content.as_slice());
}

#[tokio::test]
async fn test_long_leaf_name_round_trip() {
    let server = TestServer::start().await;
    let name = format!("{}.txt", "n".repeat(246));

    let response = server.upload("docs", &name, b"long name", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.download("docs", &name, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"long name");
}

#[tokio::test]
async fn test_range_request_returns_partial_content() {
    let server = TestServer::start().await;
    let content: Vec<u8> = (0..1000u32).map(|i| (i % 256) as u8).collect();
    server.upload("docs", "sized.bin", &content, None).await;

    let response = server
        .client
        .get(server.url("docs", "sized.bin"))
        .header(RANGE, "bytes=0-9")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes 0-9/1000");
    assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
    assert!(response.headers().contains_key(LAST_MODIFIED));
    assert_eq!(response.bytes().await.unwrap().as_ref(), &content[..10]);

    let response = server
        .client
        .get(server.url("docs", "sized.bin"))
        .header(RANGE, "bytes=-24")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.bytes().await.unwrap().as_ref(), &content[976..]);
}

#[tokio::test]
async fn test_range_past_end_is_not_satisfiable() {
    let server = TestServer::start().await;
    server.upload("docs", "short.txt", b"0123456789", None).await;

    let response = server
        .client
        .get(server.url("docs", "short.txt"))
        .header(RANGE, "bytes=50-60")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes */10");
}

#[tokio::test]
async fn test_range_still_requires_password() {
    let server = TestServer::start().await;
    server.upload("docs", "locked.txt", b"0123456789", Some("pw")).await;

    let response = server
        .client
        .get(server.url("docs", "locked.txt"))
        .header(RANGE, "bytes=0-3")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server
        .client
        .get(server.url("docs", "locked.txt"))
        .header(RANGE, "bytes=0-3")
        .header(AUTHORIZATION, "pw")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"0123");
}

#[tokio::test]
async fn test_unchanged_file_is_not_modified() {
    let server = TestServer::start().await;
    server.upload("docs", "cached.txt", b"cache me", None).await;

    let response = server.download("docs", "cached.txt", None).await;
    let last_modified = response.headers()[LAST_MODIFIED].clone();

    let response = server
        .client
        .get(server.url("docs", "cached.txt"))
        .header(IF_MODIFIED_SINCE, last_modified)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = server
        .client
        .get(server.url("docs", "cached.txt"))
        .header(IF_MODIFIED_SINCE, "Thu, 01 Jan 1970 00:00:00 GMT")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"cache me");
}
