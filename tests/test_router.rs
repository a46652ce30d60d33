//! Tests for route registration and in-process dispatch.

mod common;

use std::sync::{Arc, Mutex};

use common::{MemoryStorage, drain, split_wire};
use microexpress::app::NOT_FOUND_BODY;
use microexpress::http::request::{Method, RequestBuilder};
use microexpress::router::{Handler, Middleware, StaticMount, StaticMounts};
use microexpress::{App, Next, Request, Response};

fn dispatch(app: &App, method: Method, target: &str) -> (String, String, String) {
    let mut req = RequestBuilder::new().method(method).path(target).build();
    let mut res = app.new_response();
    app.dispatch(&mut req, &mut res);
    split_wire(&drain(&mut res))
}

#[test]
fn test_route_with_param() {
    let app = App::new().get("/user/:id", |req, res| {
        let body = format!("user {}", req.param("id"));
        res.send(body);
    });

    let (status, _, body) = dispatch(&app, Method::GET, "/user/42");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, "user 42");
}

#[test]
fn test_unmatched_request_is_404() {
    let app = App::new().get("/", |_req, res| {
        res.send("home");
    });

    let (status, _, body) = dispatch(&app, Method::GET, "/does-not-exist");
    assert_eq!(status, "HTTP/1.1 404 Not Found");
    assert_eq!(body, NOT_FOUND_BODY);
}

#[test]
fn test_empty_path_falls_through_to_404() {
    let app = App::new().get("/", |_req, res| {
        res.send("home");
    });

    let mut req = Request::new("broken");
    let mut res = app.new_response();
    app.dispatch(&mut req, &mut res);

    assert_eq!(res.status_code(), 404);
}

#[test]
fn test_method_must_match() {
    let app = App::new().post("/data", |_req, res| {
        res.send("posted");
    });

    let (status, _, _) = dispatch(&app, Method::GET, "/data");
    assert_eq!(status, "HTTP/1.1 404 Not Found");

    let (status, _, body) = dispatch(&app, Method::POST, "/data");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, "posted");
}

#[test]
fn test_first_registered_route_wins() {
    let app = App::new()
        .get("/items/:id", |_req, res| {
            res.send("param");
        })
        .get("/items/special", |_req, res| {
            res.send("literal");
        });

    let (_, _, body) = dispatch(&app, Method::GET, "/items/special");
    assert_eq!(body, "param");
}

#[test]
fn test_all_registers_every_method() {
    let app = App::new().all("/any", |req, res| {
        res.send(req.method.as_str());
    });

    assert_eq!(app.routes().len(), 5);
    for method in Method::ALL {
        let (_, _, body) = dispatch(&app, method, "/any");
        assert_eq!(body, method.as_str());
    }
}

#[test]
fn test_route_records_param_names() {
    let app = App::new().put("/a/:x/b/:y", |_req, res| {
        res.end();
    });

    let route = app.routes().iter().next().unwrap();
    assert_eq!(route.method, Method::PUT);
    assert_eq!(route.param_names, vec!["x", "y"]);
}

struct Greeter {
    greeting: &'static str,
}

impl Handler for Greeter {
    fn handle(&self, req: &mut Request, res: &mut Response) {
        let body = format!("{}, {}", self.greeting, req.param("name"));
        res.send(body);
    }
}

#[test]
fn test_struct_handler() {
    let app = App::new().route(Method::GET, "/hello/:name", Greeter { greeting: "Hello" });

    let (_, _, body) = dispatch(&app, Method::GET, "/hello/Ada%20L");
    assert_eq!(body, "Hello, Ada L");
}

#[test]
fn test_middleware_runs_in_order_then_routes() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (a, b, h) = (log.clone(), log.clone(), log.clone());

    let app = App::new()
        .use_fn(move |_req, _res| {
            a.lock().unwrap().push("first");
            Next::Continue
        })
        .use_fn(move |_req, _res| {
            b.lock().unwrap().push("second");
            Next::Continue
        })
        .get("/", move |_req, res| {
            h.lock().unwrap().push("handler");
            res.send("ok");
        });

    dispatch(&app, Method::GET, "/");
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "handler"]);
}

#[test]
fn test_middleware_short_circuit() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (b, c, h) = (log.clone(), log.clone(), log.clone());

    let app = App::new()
        .use_fn(|_req, res| {
            res.status(401).send("denied");
            Next::Stop
        })
        .use_fn(move |_req, _res| {
            b.lock().unwrap().push("second");
            Next::Continue
        })
        .use_fn(move |_req, _res| {
            c.lock().unwrap().push("third");
            Next::Continue
        })
        .get("/", move |_req, res| {
            h.lock().unwrap().push("handler");
            res.send("ok");
        });

    let (status, _, body) = dispatch(&app, Method::GET, "/");
    assert_eq!(status, "HTTP/1.1 401 Unauthorized");
    assert_eq!(body, "denied");
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_stopping_middleware_is_not_auto_finalized() {
    let app = App::new().use_fn(|_req, _res| Next::Stop);

    let mut req = RequestBuilder::new().path("/").build();
    let mut res = app.new_response();
    app.dispatch(&mut req, &mut res);

    assert!(!res.headers_sent());
    assert!(res.wire().is_empty());
}

#[test]
fn test_middleware_can_modify_request_and_response() {
    let app = App::new()
        .use_fn(|req, res| {
            req.headers.insert("X-User".to_string(), "ada".to_string());
            res.set_header("X-Served-By", "mw");
            Next::Continue
        })
        .get("/me", |req, res| {
            let user = req.header("X-User").to_string();
            res.send(user);
        });

    let (_, headers, body) = dispatch(&app, Method::GET, "/me");
    assert!(headers.contains("X-Served-By: mw"));
    assert_eq!(body, "ada");
}

struct Deny;

impl Middleware for Deny {
    fn handle(&self, req: &mut Request, res: &mut Response) -> Next {
        if req.path.starts_with("/admin") {
            res.status(403).send("forbidden");
            Next::Stop
        } else {
            Next::Continue
        }
    }
}

#[test]
fn test_struct_middleware() {
    let app = App::new().use_middleware(Deny).get("/admin/panel", |_req, res| {
        res.send("panel");
    });

    let (status, _, body) = dispatch(&app, Method::GET, "/admin/panel");
    assert_eq!(status, "HTTP/1.1 403 Forbidden");
    assert_eq!(body, "forbidden");
}

#[test]
fn test_static_mount_resolution() {
    let mount = StaticMount::new("/static", "/www");

    assert_eq!(mount.resolve("/static/info.html").unwrap(), "/www/info.html");
    assert_eq!(mount.resolve("/static/css/app.css").unwrap(), "/www/css/app.css");
    assert_eq!(mount.resolve("/staticfile.txt").unwrap(), "/www/file.txt");
    assert!(mount.resolve("/other/info.html").is_none());

    let trailing = StaticMount::new("/static", "/www/");
    assert_eq!(trailing.resolve("/static/info.html").unwrap(), "/www/info.html");
}

#[test]
fn test_static_doubled_slash_keeps_single_separator() {
    let mount = StaticMount::new("/static", "/www");
    assert_eq!(mount.resolve("/static//x.txt").unwrap(), "/www/x.txt");

    let storage = MemoryStorage::new().with_file("/www/x.txt", "x").shared();
    let app = App::new()
        .with_storage(storage)
        .serve_static("/static", "/www");

    let (status, _, body) = dispatch(&app, Method::GET, "/static//x.txt");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, "x");
}

#[test]
fn test_static_mounts_first_registered_wins() {
    let mut mounts = StaticMounts::new();
    mounts.push(StaticMount::new("/a", "/first"));
    mounts.push(StaticMount::new("/ab", "/second"));

    assert_eq!(mounts.resolve("/ab/x").unwrap(), "/first/b/x");
}

#[test]
fn test_static_file_served_before_routes() {
    let storage = MemoryStorage::new()
        .with_file("/www/info.html", "<p>info</p>")
        .shared();
    let app = App::new()
        .with_storage(storage)
        .serve_static("/static", "/www")
        .get("/static/info.html", |_req, res| {
            res.send("route");
        });

    let (status, headers, body) = dispatch(&app, Method::GET, "/static/info.html");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert!(headers.contains("Content-Type: text/html"));
    assert_eq!(body, "<p>info</p>");
}

#[test]
fn test_static_missing_file_is_404_not_route() {
    let app = App::new()
        .with_storage(MemoryStorage::new().shared())
        .serve_static("/static", "/www");

    let (status, _, body) = dispatch(&app, Method::GET, "/static/nope.js");
    assert_eq!(status, "HTTP/1.1 404 Not Found");
    assert_eq!(body, "File not found");
}

#[test]
fn test_static_only_for_get() {
    let storage = MemoryStorage::new().with_file("/www/form", "file").shared();
    let app = App::new()
        .with_storage(storage)
        .serve_static("/static", "/www")
        .post("/static/form", |_req, res| {
            res.send("route");
        });

    let (_, _, body) = dispatch(&app, Method::POST, "/static/form");
    assert_eq!(body, "route");
}

#[test]
fn test_app_render_helper() {
    let storage = MemoryStorage::new()
        .with_file("/t.html", "Hello {{name}}")
        .shared();
    let app = App::new().with_storage(storage);

    let mut res = app.new_response();
    let vars = [("name".to_string(), "world".to_string())].into_iter().collect();
    app.render(&mut res, "/t.html", &vars);

    let (_, _, body) = split_wire(res.wire());
    assert_eq!(body, "Hello world");
}
