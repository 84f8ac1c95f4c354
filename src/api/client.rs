//! Client for the MOENV hourly AQI dataset (`aqx_p_488`).
//!
//! The endpoint returns at most [`DEFAULT_PAGE_LIMIT`] records per call. Longer periods are
//! downloaded as several extracts and combined with [`crate::TableMerger`].

use crate::api::error::ApiError;
use crate::api::range::{validate_range, AvailableRange};
use crate::api::records::{to_row_set, ApiRecord, ApiResponse};
use crate::types::column::Pollutant;
use crate::types::row_set::RowSet;
use bon::bon;
use chrono::{Duration, NaiveDateTime};
use log::{info, warn};
use reqwest::{Client, Request};

pub const DEFAULT_BASE_URL: &str = "https://data.moenv.gov.tw/api/v2/aqx_p_488";
pub const DEFAULT_PAGE_LIMIT: usize = 1000;
/// Environment variable read by [`AqiClient::from_env`].
pub const API_KEY_ENV: &str = "AQI_API_KEY";

const FILTER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct AqiClient {
    http: Client,
    api_key: String,
    base_url: String,
    limit: usize,
    language: String,
}

#[bon]
impl AqiClient {
    /// Creates a client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Personal key issued by the MOENV open data platform.
    /// * `base_url` - Dataset URL, defaults to [`DEFAULT_BASE_URL`].
    /// * `limit` - Records per request, defaults to [`DEFAULT_PAGE_LIMIT`] (the server maximum).
    /// * `language` - Response language, defaults to `en`.
    #[builder]
    pub fn new(
        #[builder(into)] api_key: String,
        #[builder(into, default = DEFAULT_BASE_URL.to_string())] base_url: String,
        #[builder(default = DEFAULT_PAGE_LIMIT)] limit: usize,
        #[builder(into, default = "en".to_string())] language: String,
    ) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url,
            limit,
            language,
        }
    }
}

impl AqiClient {
    /// Creates a client with default settings and the key from `AQI_API_KEY`.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ApiError::MissingApiKey(API_KEY_ENV))?;
        Ok(Self::builder().api_key(api_key).build())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Server-side filter selecting records created in `[start, end]`.
    ///
    /// The lower bound is exclusive on the server, so it is moved back one hour.
    pub fn range_filter(start: NaiveDateTime, end: NaiveDateTime) -> String {
        format!(
            "datacreationdate,GR,{}|datacreationdate,LE,{}",
            (start - Duration::hours(1)).format(FILTER_TIMESTAMP_FORMAT),
            end.format(FILTER_TIMESTAMP_FORMAT)
        )
    }

    /// Builds the GET request for one page, optionally filtered.
    pub fn build_request(&self, filters: Option<&str>) -> Result<Request, ApiError> {
        let limit = self.limit.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("language", self.language.as_str()),
            ("offset", "0"),
            ("limit", limit.as_str()),
            ("api_key", self.api_key.as_str()),
        ];
        if let Some(filters) = filters {
            query.push(("filters", filters));
        }
        self.http
            .get(&self.base_url)
            .query(&query)
            .build()
            .map_err(|e| ApiError::RequestBuild(self.base_url.clone(), e))
    }

    async fn get_records(&self, filters: Option<&str>) -> Result<Vec<ApiRecord>, ApiError> {
        let request = self.build_request(filters)?;
        // The URL carries the api key, log the dataset only.
        let url = self.base_url.clone();
        info!("Requesting AQI records from {} (filters: {:?})", url, filters);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ApiError::NetworkRequest(url.clone(), e.without_url()))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e.status());
                return Err(if let Some(status) = e.status() {
                    ApiError::HttpStatus {
                        url,
                        status,
                        source: e.without_url(),
                    }
                } else {
                    ApiError::NetworkRequest(url, e.without_url())
                });
            }
        };

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| ApiError::JsonDecode(url.clone(), e.without_url()))?;
        info!("Received {} records from {}", body.records.len(), url);
        Ok(body.records)
    }

    /// The newest page of records, unfiltered.
    pub async fn latest(&self) -> Result<Vec<ApiRecord>, ApiError> {
        self.get_records(None).await
    }

    /// Timestamps currently served by the API, used to offer a download window.
    pub async fn available_range(&self) -> Result<AvailableRange, ApiError> {
        let range = AvailableRange::from_records(&self.latest().await?);
        if range.is_empty() {
            return Err(ApiError::NoData);
        }
        Ok(range)
    }

    /// Downloads records created between `start` and `end` (inclusive), keeping the base
    /// columns and the selected `pollutants`.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidRange`] when `end` is not after `start`, otherwise any network,
    /// HTTP or decoding failure.
    pub async fn fetch_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        pollutants: &[Pollutant],
    ) -> Result<RowSet, ApiError> {
        validate_range(start, end)?;
        let filters = Self::range_filter(start, end);
        let records = self.get_records(Some(&filters)).await?;
        if records.len() >= self.limit {
            warn!(
                "Received {} records, the page limit; data between {} and {} may be truncated. \
                 Download shorter ranges and merge them.",
                records.len(),
                start,
                end
            );
        }
        to_row_set(&records, pollutants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_timestamp;

    #[test]
    fn test_range_filter_moves_start_back() {
        let start = parse_timestamp("2024-05-28 04:00").unwrap();
        let end = parse_timestamp("2024-05-28 05:00").unwrap();
        assert_eq!(
            AqiClient::range_filter(start, end),
            "datacreationdate,GR,2024-05-28 03:00:00|datacreationdate,LE,2024-05-28 05:00:00"
        );
    }

    #[test]
    fn test_build_request_query() {
        let client = AqiClient::builder()
            .api_key("secret")
            .base_url("https://example.org/api/v2/aqx_p_488")
            .limit(250)
            .build();
        assert_eq!(client.limit(), 250);

        let request = client.build_request(Some("datacreationdate,GR,x")).unwrap();
        let url = request.url();
        assert_eq!(url.path(), "/api/v2/aqx_p_488");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("language".to_string(), "en".to_string()),
                ("offset".to_string(), "0".to_string()),
                ("limit".to_string(), "250".to_string()),
                ("api_key".to_string(), "secret".to_string()),
                ("filters".to_string(), "datacreationdate,GR,x".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_range_rejects_reversed_range() {
        let client = AqiClient::builder().api_key("unused").build();
        let start = parse_timestamp("2024-05-28 05:00").unwrap();
        let end = parse_timestamp("2024-05-28 04:00").unwrap();
        assert!(matches!(
            client.fetch_range(start, end, &[Pollutant::Pm25]).await,
            Err(ApiError::InvalidRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_network_error_hides_api_key() {
        // Nothing listens on the discard port, so the request fails before any response.
        let client = AqiClient::builder()
            .api_key("SUPERSECRETKEY")
            .base_url("http://127.0.0.1:9/api")
            .build();
        let err = client.latest().await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkRequest(..)));

        let mut chain: Option<&dyn std::error::Error> = Some(&err);
        while let Some(link) = chain {
            let text = format!("{} {:?}", link, link);
            assert!(!text.contains("SUPERSECRETKEY"), "api key leaked: {}", text);
            chain = link.source();
        }
    }
}
