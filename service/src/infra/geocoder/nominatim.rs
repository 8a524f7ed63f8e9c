//! [Nominatim] [`Geocoder`] implementation.
//!
//! [Nominatim]: https://nominatim.org

use std::convert::Infallible;

use common::operations::{By, Resolve};
use derive_more::{Display, Error as StdError, From};
use serde::Deserialize;
use smart_default::SmartDefault;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::listing::{Geometry, Place},
    infra::Geocoder,
};

/// [`Nominatim`] configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Config {
    /// Base URL of the [Nominatim] API.
    ///
    /// [Nominatim]: https://nominatim.org
    #[default("https://nominatim.openstreetmap.org".into())]
    pub base_url: String,

    /// `User-Agent` identifying this client, as required by the [usage
    /// policy].
    ///
    /// [usage policy]: https://operations.osmfoundation.org/policies/nominatim
    #[default("WanderLust/1.0 (local)".into())]
    pub user_agent: String,
}

/// [Nominatim] HTTP API client.
///
/// [Nominatim]: https://nominatim.org
#[derive(Clone, Debug)]
pub struct Nominatim {
    /// HTTP client performing requests.
    client: reqwest::Client,

    /// `/search` endpoint URL.
    search_url: String,
}

impl Nominatim {
    /// Creates a new [`Nominatim`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the HTTP client cannot be built out of the provided [`Config`].
    pub fn new(conf: &Config) -> Result<Self, Traced<Error>> {
        let client = reqwest::Client::builder()
            .user_agent(&conf.user_agent)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(Self {
            client,
            search_url: format!(
                "{}/search",
                conf.base_url.trim_end_matches('/'),
            ),
        })
    }

    /// Looks up the [`Geometry`] of the provided [`Place`].
    async fn lookup(
        &self,
        place: &Place,
    ) -> Result<Option<Geometry>, Traced<Error>> {
        let candidates = self
            .client
            .get(&self.search_url)
            .query(&[
                ("format", "json"),
                ("q", AsRef::<str>::as_ref(place)),
                ("limit", "1"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(tracerr::from_and_wrap!(=> Error))?
            .json::<Vec<Candidate>>()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        let Some(candidate) = candidates.into_iter().next() else {
            return Ok(None);
        };
        candidate
            .geometry()
            .map(Some)
            .ok_or_else(|| tracerr::new!(Error::MalformedCoordinates))
    }
}

/// Single search result of the [Nominatim] API.
///
/// [Nominatim]: https://nominatim.org
#[derive(Debug, Deserialize)]
struct Candidate {
    /// Latitude, as a decimal string.
    lat: String,

    /// Longitude, as a decimal string.
    lon: String,
}

impl Candidate {
    /// Parses the [`Geometry`] of this [`Candidate`].
    fn geometry(&self) -> Option<Geometry> {
        let lon = self.lon.trim().parse().ok()?;
        let lat = self.lat.trim().parse().ok()?;
        Geometry::from_coordinates(&[lon, lat])
    }
}

/// [`Nominatim`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP request failed, or responded with a non-success status or an
    /// unexpected body.
    #[display("HTTP request failed: {_0}")]
    Http(reqwest::Error),

    /// Coordinates of the found place are not valid.
    #[display("Malformed coordinates in response")]
    MalformedCoordinates,
}

impl Geocoder<Resolve<By<Option<Geometry>, Place>>> for Nominatim {
    type Ok = Option<Geometry>;
    type Err = Infallible;

    async fn execute(
        &self,
        Resolve(by): Resolve<By<Option<Geometry>, Place>>,
    ) -> Result<Self::Ok, Self::Err> {
        let place = by.into_inner();
        Ok(self.lookup(&place).await.unwrap_or_else(|e| {
            log::warn!("failed to geocode `{place}`: {e}");
            None
        }))
    }
}

#[cfg(test)]
mod spec {
    use std::net::SocketAddr;

    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use common::operations::{By, Resolve};
    use serde::Deserialize;
    use tokio::net::TcpListener;

    use super::{Config, Nominatim};
    use crate::{
        domain::listing::{Country, Geometry, Location, Place},
        infra::Geocoder as _,
    };

    #[derive(Deserialize)]
    struct SearchParams {
        format: String,
        q: String,
        limit: String,
    }

    async fn serve(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        }));
        addr
    }

    fn client(addr: SocketAddr) -> Nominatim {
        Nominatim::new(&Config {
            base_url: format!("http://{addr}/"),
            user_agent: "Test/1.0".into(),
        })
        .unwrap()
    }

    fn goa() -> Place {
        Place::new(
            Location::new("Goa").as_ref(),
            Country::new("India").as_ref(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn resolves_first_candidate() {
        let addr = serve(Router::new().route(
            "/search",
            get(|headers: HeaderMap, Query(p): Query<SearchParams>| async move {
                assert_eq!(headers["user-agent"], "Test/1.0");
                assert_eq!(p.format, "json");
                assert_eq!(p.q, "Goa, India");
                assert_eq!(p.limit, "1");
                Json(serde_json::json!([
                    {"lat": "15.3004543", "lon": "74.0855134"},
                ]))
            }),
        ))
        .await;

        let geometry = client(addr)
            .execute(Resolve(By::new(goa())))
            .await
            .unwrap();

        assert_eq!(
            geometry,
            Geometry::from_coordinates(&[74.085_513_4, 15.300_454_3]),
        );
    }

    #[tokio::test]
    async fn unavailable_service_resolves_nothing() {
        let addr = serve(Router::new().route(
            "/search",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;

        let geometry = client(addr)
            .execute(Resolve(By::new(goa())))
            .await
            .unwrap();

        assert_eq!(geometry, None);
    }

    #[tokio::test]
    async fn empty_or_malformed_results_resolve_nothing() {
        let addr = serve(
            Router::new()
                .route("/search", get(|| async { Json(serde_json::json!([])) }))
                .route(
                    "/bad/search",
                    get(|| async {
                        Json(serde_json::json!([{"lat": "north", "lon": "1"}]))
                    }),
                ),
        )
        .await;

        let geometry = client(addr)
            .execute(Resolve(By::new(goa())))
            .await
            .unwrap();
        assert_eq!(geometry, None);

        let bad = Nominatim::new(&Config {
            base_url: format!("http://{addr}/bad"),
            user_agent: "Test/1.0".into(),
        })
        .unwrap();
        let geometry = bad.execute(Resolve(By::new(goa()))).await.unwrap();
        assert_eq!(geometry, None);
    }

    #[tokio::test]
    async fn unreachable_service_resolves_nothing() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let geometry = client(addr)
            .execute(Resolve(By::new(goa())))
            .await
            .unwrap();

        assert_eq!(geometry, None);
    }
}
