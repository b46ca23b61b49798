//! In-process stand-ins for vendor APIs, used by the gateway tests.

use axum::Router;

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn spawn_fake_gateway(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
