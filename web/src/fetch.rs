//! `fetch` as the asset loader's transport.

#[cfg(test)]
#[path = "fetch_test.rs"]
mod fetch_test;

use framekit::Error;
use framekit::loader::{Asset, AssetFetcher, FetchDone};
use gloo_net::http::Request;

/// Fetches asset bodies as text with `GET`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchAssetFetcher;

impl AssetFetcher for FetchAssetFetcher {
    fn fetch(&self, url: &str, done: FetchDone) {
        let url = url.to_owned();
        wasm_bindgen_futures::spawn_local(async move {
            let result = match Request::get(&url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.map_err(|e| e.to_string());
                    into_asset(url, status, body)
                }
                Err(err) => Err(Error::Fetch { url, reason: err.to_string() }),
            };
            done(result);
        });
    }
}

/// Turn a finished HTTP exchange into an asset or a fetch error.
/// Anything outside 2xx is a failure, whatever the body says.
pub(crate) fn into_asset(url: String, status: u16, body: Result<String, String>) -> framekit::Result<Asset> {
    if !(200..300).contains(&status) {
        return Err(Error::Fetch { url, reason: format!("HTTP {status}") });
    }
    match body {
        Ok(body) => Ok(Asset { url, body }),
        Err(reason) => Err(Error::Fetch { url, reason }),
    }
}
