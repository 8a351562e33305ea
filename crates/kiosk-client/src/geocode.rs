//! Address autofill through the Google Geocoding API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Address fields resolved from a free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Place {
  pub street:      String,
  pub postal_code: String,
  pub city:        String,
  pub province:    String,
  pub country:     String,
}

#[derive(Debug, Deserialize)]
pub struct AddressComponent {
  pub long_name: String,
  #[serde(default)]
  pub types:     Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
  #[serde(default)]
  address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
  status:  String,
  #[serde(default)]
  results: Vec<GeocodeResult>,
}

impl Place {
  pub fn from_components(components: &[AddressComponent]) -> Self {
    let find = |kind: &str| {
      components
        .iter()
        .find(|c| c.types.iter().any(|t| t == kind))
        .map(|c| c.long_name.clone())
        .unwrap_or_default()
    };

    let street = format!("{} {}", find("route"), find("street_number"))
      .trim()
      .to_owned();
    let mut city = find("locality");
    if city.is_empty() {
      city = find("postal_town");
    }

    Place {
      street,
      postal_code: find("postal_code"),
      city,
      province: find("administrative_area_level_1"),
      country: find("country"),
    }
  }
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct Geocoder {
  client:  Client,
  api_key: String,
}

impl Geocoder {
  pub fn new(api_key: String) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .context("failed to build geocoding client")?;
    Ok(Self { client, api_key })
  }

  /// Resolve `query` to the first matching place, if any.
  pub async fn lookup(&self, query: &str) -> Result<Option<Place>> {
    let resp = self
      .client
      .get(GEOCODE_URL)
      .query(&[("address", query), ("key", self.api_key.as_str())])
      .send()
      .await
      .context("geocoding request failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("geocoding → {}", resp.status()));
    }
    let body: GeocodeResponse = resp.json().await.context("deserialising geocoding result")?;
    parse_response(body)
  }
}

fn parse_response(body: GeocodeResponse) -> Result<Option<Place>> {
  match body.status.as_str() {
    "OK" => Ok(
      body
        .results
        .first()
        .map(|r| Place::from_components(&r.address_components)),
    ),
    "ZERO_RESULTS" => Ok(None),
    other => Err(anyhow!("geocoding status {other}")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(json: &str) -> Result<Option<Place>> {
    parse_response(serde_json::from_str(json).unwrap())
  }

  #[test]
  fn first_result_is_mapped() {
    let place = parse(
      r#"{
        "status": "OK",
        "results": [
          { "address_components": [
              { "long_name": "12", "types": ["street_number"] },
              { "long_name": "Designer-Outlet-Straße", "types": ["route"] },
              { "long_name": "Parndorf", "types": ["locality", "political"] },
              { "long_name": "Burgenland", "types": ["administrative_area_level_1"] },
              { "long_name": "Austria", "types": ["country", "political"] },
              { "long_name": "7111", "types": ["postal_code"] }
          ] },
          { "address_components": [
              { "long_name": "Elsewhere", "types": ["locality"] }
          ] }
        ]
      }"#,
    )
    .unwrap()
    .unwrap();

    assert_eq!(place, Place {
      street:      "Designer-Outlet-Straße 12".into(),
      postal_code: "7111".into(),
      city:        "Parndorf".into(),
      province:    "Burgenland".into(),
      country:     "Austria".into(),
    });
  }

  #[test]
  fn postal_town_stands_in_for_locality() {
    let place = Place::from_components(&[
      AddressComponent { long_name: "Baker Street".into(), types: vec!["route".into()] },
      AddressComponent { long_name: "London".into(), types: vec!["postal_town".into()] },
    ]);
    assert_eq!(place.street, "Baker Street");
    assert_eq!(place.city, "London");
  }

  #[test]
  fn zero_results_is_none_and_other_statuses_fail() {
    assert_eq!(parse(r#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap(), None);
    assert!(parse(r#"{"status":"REQUEST_DENIED"}"#).is_err());
  }
}
