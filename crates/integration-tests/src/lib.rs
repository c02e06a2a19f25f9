//! Integration tests for ElegantHaven.
//!
//! Each test boots the full storefront router on an ephemeral port and talks
//! to it over HTTP with a cookie-holding client, so the session cookie keeps
//! one visitor's cart and room design across requests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p elegant-haven-integration-tests
//! ```

use std::net::SocketAddr;

use elegant_haven_storefront::catalog::Catalog;
use elegant_haven_storefront::config::StorefrontConfig;
use elegant_haven_storefront::state::AppState;
use reqwest::Client;

/// A storefront running in the background of the test runtime.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestServer {
    /// Bind to an ephemeral port and serve the storefront on it.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound or the catalog fails to load.
    pub async fn spawn() -> Self {
        let config = StorefrontConfig::default();
        let catalog = Catalog::embedded().expect("embedded catalog loads");
        let app = elegant_haven_storefront::app(AppState::new(config, catalog));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener has an address");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("server runs");
        });

        Self {
            addr,
            client: Self::client(),
        }
    }

    /// A fresh client with its own cookie jar, i.e. a new visitor.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

/// Encode a small solid-color PNG for upload fixtures.
///
/// # Panics
///
/// Panics if encoding fails.
#[must_use]
pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("PNG encodes");
    bytes.into_inner()
}
