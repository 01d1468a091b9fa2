//! mfapi.in integration: scheme list and per-scheme NAV history.
//!
//! Requests are plain blocking GETs without retries; a failed request is
//! reported to the caller, who decides whether to try again.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::data::NavSource;
use crate::domain::{FundHistory, FundIdentity, FundMeta, RawNavRecord};
use crate::error::AppError;

pub struct MfapiClient {
    client: Client,
    base_url: String,
}

impl MfapiClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("navscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn get_text(&self, url: &str) -> Result<String, AppError> {
        tracing::debug!(%url, "mfapi request");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(4, format!("mfapi request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("mfapi request failed with status {}.", resp.status()),
            ));
        }

        resp.text()
            .map_err(|e| AppError::new(4, format!("Failed to read mfapi response: {e}")))
    }
}

impl NavSource for MfapiClient {
    fn name(&self) -> &str {
        "mfapi"
    }

    fn list_funds(&self) -> Result<Vec<FundIdentity>, AppError> {
        let body = self.get_text(&self.base_url)?;
        let funds = parse_scheme_list(&body)?;
        tracing::info!(count = funds.len(), "fetched scheme list");
        Ok(funds)
    }

    fn fetch_history(&self, code: &str) -> Result<FundHistory, AppError> {
        let code = code.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::new(2, format!("Invalid scheme code '{code}'.")));
        }
        let url = format!("{}/{code}", self.base_url);
        let body = self.get_text(&url)?;
        let history = parse_history(code, &body)?;
        tracing::info!(code, records = history.data.len(), "fetched NAV history");
        Ok(history)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemeEntry {
    scheme_code: CodeValue,
    scheme_name: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    meta: Option<MetaResponse>,
    #[serde(default)]
    data: Vec<RawNavRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct MetaResponse {
    fund_house: Option<String>,
    scheme_type: Option<String>,
    scheme_category: Option<String>,
    scheme_code: Option<CodeValue>,
    scheme_name: Option<String>,
}

/// Scheme codes arrive as numbers in some payloads and strings in others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CodeValue {
    Number(u64),
    Text(String),
}

impl CodeValue {
    fn into_string(self) -> String {
        match self {
            CodeValue::Number(n) => n.to_string(),
            CodeValue::Text(s) => s,
        }
    }
}

fn parse_scheme_list(body: &str) -> Result<Vec<FundIdentity>, AppError> {
    let entries: Vec<SchemeEntry> = serde_json::from_str(body)
        .map_err(|e| AppError::new(4, format!("Failed to parse mfapi scheme list: {e}")))?;
    Ok(entries
        .into_iter()
        .map(|e| FundIdentity::new(e.scheme_code.into_string(), e.scheme_name))
        .collect())
}

fn parse_history(code: &str, body: &str) -> Result<FundHistory, AppError> {
    let resp: HistoryResponse = serde_json::from_str(body)
        .map_err(|e| AppError::new(4, format!("Failed to parse mfapi history for {code}: {e}")))?;

    let meta = resp.meta.map(|m| FundMeta {
        fund_house: m.fund_house,
        scheme_type: m.scheme_type,
        scheme_category: m.scheme_category,
        scheme_code: m.scheme_code.map(CodeValue::into_string),
        scheme_name: m.scheme_name,
    });
    let name = meta
        .as_ref()
        .and_then(|m| m.scheme_name.clone())
        .unwrap_or_else(|| code.to_string());

    Ok(FundHistory {
        fund: FundIdentity::new(code, name),
        meta,
        data: resp.data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NavValue;

    #[test]
    fn parses_scheme_list_with_numeric_codes() {
        let body = r#"[
            {"schemeCode": 100027, "schemeName": "as Grindlays Super Saver Income Fund"},
            {"schemeCode": "119551", "schemeName": "Aditya Birla Sun Life Banking Scheme", "isinGrowth": null}
        ]"#;
        let funds = parse_scheme_list(body).unwrap();
        assert_eq!(funds[0], FundIdentity::new("100027", "as Grindlays Super Saver Income Fund"));
        assert_eq!(funds[1].code, "119551");
    }

    #[test]
    fn parses_history_with_meta() {
        let body = r#"{
            "meta": {
                "fund_house": "Axis Mutual Fund",
                "scheme_type": "Open Ended Schemes",
                "scheme_category": "Equity Scheme - Large Cap Fund",
                "scheme_code": 120465,
                "scheme_name": "Axis Bluechip Fund - Direct Plan - Growth"
            },
            "data": [
                {"date": "26-10-2024", "nav": "61.23000"},
                {"date": "25-10-2024", "nav": "61.10000"}
            ],
            "status": "SUCCESS"
        }"#;
        let history = parse_history("120465", body).unwrap();
        assert_eq!(history.fund.name, "Axis Bluechip Fund - Direct Plan - Growth");
        assert_eq!(history.meta.unwrap().scheme_code.as_deref(), Some("120465"));
        assert_eq!(history.data.len(), 2);
        assert_eq!(history.data[0].nav, NavValue::Text("61.23000".to_string()));
    }

    #[test]
    fn missing_data_is_an_empty_history() {
        let history = parse_history("1", r#"{"meta": {}, "status": "SUCCESS"}"#).unwrap();
        assert!(history.data.is_empty());
        assert_eq!(history.fund.name, "1");
    }

    #[test]
    fn malformed_body_is_a_data_error() {
        let err = parse_history("1", "<html>").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
