mod common;

use std::io::Read;
use std::sync::Arc;

use common::drain;
use microexpress::http::request::{Method, RequestBuilder};
use microexpress::storage::{FsStorage, Storage};
use microexpress::App;

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("www/css")).unwrap();
    std::fs::write(dir.path().join("www/info.html"), "<p>info</p>").unwrap();
    std::fs::write(dir.path().join("www/css/site.css"), "body{}").unwrap();
    std::fs::write(dir.path().join("secret.txt"), "top secret").unwrap();
    dir
}

#[test]
fn test_fs_storage_exists_and_open() {
    let dir = fixture();
    let storage = FsStorage::new(dir.path());

    assert!(storage.exists("/www/info.html"));
    assert!(storage.exists("www/css/site.css"));
    assert!(!storage.exists("/www/missing.html"));
    assert!(!storage.exists("/www")); // directories are not files

    let mut content = String::new();
    storage
        .open("/www/info.html")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "<p>info</p>");
}

#[test]
fn test_fs_storage_refuses_parent_components() {
    let dir = fixture();
    let storage = FsStorage::new(dir.path().join("www"));

    assert!(!storage.exists("/../secret.txt"));
    assert!(storage.open("/../secret.txt").is_err());
}

#[test]
fn test_static_mount_over_filesystem() {
    let dir = fixture();
    let app = App::new()
        .with_storage(Arc::new(FsStorage::new(dir.path())))
        .serve_static("/static", "/www");

    let mut req = RequestBuilder::new()
        .method(Method::GET)
        .path("/static/css/site.css")
        .build();
    let mut res = app.new_response();
    app.dispatch(&mut req, &mut res);

    let wire = String::from_utf8_lossy(&drain(&mut res)).into_owned();
    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(wire.contains("Content-Type: text/css\r\n"));
    assert!(wire.ends_with("\r\n\r\nbody{}"));
}
