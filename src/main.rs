use std::collections::HashMap;

use microexpress::config::Config;
use microexpress::messaging::{Messaging, WsEvent};
use microexpress::{App, Next, server};

const WELCOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Welcome to microexpress</title>
</head>
<body>
    <h1>Welcome to microexpress</h1>
    <p>Your lightweight web server is up and running!</p>
</body>
</html>
"#;

fn build_app(cfg: &Config) -> App {
    App::new()
        .configure(cfg)
        .use_fn(|req, _res| {
            tracing::info!(path = %req.path, "Request received");
            Next::Continue
        })
        .get("/", |_req, res| {
            res.send(WELCOME_PAGE);
        })
        .get("/user/:id", |req, res| {
            let body = format!("<h1>User Profile</h1><p>User ID: {}</p>", req.param("id"));
            res.send(body);
        })
        .post("/data", |req, res| {
            let body = format!("<h1>POST Data Received</h1><p>Body: {}</p>", req.body);
            res.send(body);
        })
        .put("/update", |req, res| {
            let body = format!("<h1>PUT Update</h1><p>Update data: {}</p>", req.body);
            res.send(body);
        })
        .delete("/delete", |_req, res| {
            res.send("<h1>DELETE Request</h1><p>Resource deleted.</p>");
        })
        .options("/test", |_req, res| {
            res.status(204).end();
        })
        .get("/template", |_req, res| {
            let vars = HashMap::from([
                ("title".to_string(), "microexpress Template".to_string()),
                ("message".to_string(), "Hello from a rendered template!".to_string()),
            ]);
            res.render("/www/template.html", &vars);
        })
        .ws("/ws", |bus, client, event| match event {
            WsEvent::Connected => tracing::info!(client, "WebSocket client connected"),
            WsEvent::Disconnected => tracing::info!(client, "WebSocket client disconnected"),
            WsEvent::Text(text) => bus.send_text(client, text),
            _ => {}
        })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let app = build_app(&cfg);
    let mut messaging = Messaging::new(app.ws_handlers().clone(), None);

    tokio::select! {
        res = server::listener::run(&cfg, &app, &mut messaging) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
