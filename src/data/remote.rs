use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::loader::{self, LoadedTable};
use crate::error::{ChartError, Result};

/// Which family of files the server should generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotLevel {
    /// Every season for one variable.
    AllSeasonsByVariable,
    /// Every variable for one season.
    AllVariablesBySeason,
}

impl Default for PlotLevel {
    fn default() -> Self {
        PlotLevel::AllSeasonsByVariable
    }
}

impl PlotLevel {
    pub fn endpoint(&self) -> &'static str {
        match self {
            PlotLevel::AllSeasonsByVariable => "/plot_by_variable",
            PlotLevel::AllVariablesBySeason => "/plot_by_season",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlotLevel::AllSeasonsByVariable => "All seasons by variable",
            PlotLevel::AllVariablesBySeason => "All variables by season",
        }
    }
}

/// Form values submitted to the regeneration endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RegenerationRequest {
    pub level: PlotLevel,
    pub model_generation: String,
    pub region: String,
    pub statistic: String,
    pub variable: String,
    pub season: String,
}

impl RegenerationRequest {
    /// Key/value pairs sent as the JSON body. Only the selector that belongs
    /// to the chosen level is included.
    pub fn options(&self) -> BTreeMap<&'static str, String> {
        let mut options = BTreeMap::new();
        options.insert("model_generation", self.model_generation.clone());
        options.insert("region", self.region.clone());
        options.insert("statistic", self.statistic.clone());
        match self.level {
            PlotLevel::AllSeasonsByVariable => {
                options.insert("variable", self.variable.clone());
            }
            PlotLevel::AllVariablesBySeason => {
                options.insert("season", self.season.clone());
            }
        }
        options
    }

    pub fn plot_title(&self) -> String {
        match self.level {
            PlotLevel::AllSeasonsByVariable => format!(
                "All Seasons for {} {} {} ({})",
                self.variable, self.region, self.statistic, self.model_generation
            ),
            PlotLevel::AllVariablesBySeason => format!(
                "All Variables for {} {} {} ({})",
                self.season, self.region, self.statistic, self.model_generation
            ),
        }
    }
}

/// A freshly generated dataset.
#[derive(Debug, Clone)]
pub struct GeneratedDataset {
    pub file_name: String,
    pub url: String,
    pub table: LoadedTable,
}

/// The server that turns form options into a new CSV file.
pub trait RegenerationClient: Send + Sync {
    fn regenerate(&self, request: &RegenerationRequest) -> Result<GeneratedDataset>;
}

#[derive(Debug, Deserialize)]
struct NewestFile {
    latestfile: String,
}

/// HTTP implementation backed by `ureq`.
#[derive(Debug, Clone)]
pub struct HttpRegenerationClient {
    base_url: String,
    timeout: Duration,
}

impl HttpRegenerationClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn dataset_url(&self, model_generation: &str, file_name: &str) -> String {
        dataset_url(&self.base_url, model_generation, file_name)
    }
}

pub fn dataset_url(base_url: &str, model_generation: &str, file_name: &str) -> String {
    format!(
        "{}/static/mean_climate_json_files/{model_generation}_csv/{file_name}",
        base_url.trim_end_matches('/')
    )
}

impl RegenerationClient for HttpRegenerationClient {
    fn regenerate(&self, request: &RegenerationRequest) -> Result<GeneratedDataset> {
        let endpoint = format!("{}{}", self.base_url, request.level.endpoint());
        tracing::info!("Requesting regeneration from {endpoint}");
        ureq::post(&endpoint)
            .timeout(self.timeout)
            .send_json(request.options())?;

        let newest: NewestFile = ureq::get(&format!("{}/newest_file", self.base_url))
            .timeout(self.timeout)
            .query("model_generation", &request.model_generation)
            .call()?
            .into_json()
            .map_err(|e| ChartError::Regeneration(format!("unreadable newest_file reply: {e}")))?;

        if newest.latestfile.trim().is_empty() {
            return Err(ChartError::Regeneration("server named no file".to_string()));
        }

        let url = self.dataset_url(&request.model_generation, &newest.latestfile);
        let table = loader::fetch_csv(&url, self.timeout)?;
        Ok(GeneratedDataset {
            file_name: newest.latestfile,
            url,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(level: PlotLevel) -> RegenerationRequest {
        RegenerationRequest {
            level,
            model_generation: "cmip5".into(),
            region: "global".into(),
            statistic: "bias_xy".into(),
            variable: "pr".into(),
            season: "djf".into(),
        }
    }

    #[test]
    fn level_picks_endpoint() {
        assert_eq!(PlotLevel::AllSeasonsByVariable.endpoint(), "/plot_by_variable");
        assert_eq!(PlotLevel::AllVariablesBySeason.endpoint(), "/plot_by_season");
    }

    #[test]
    fn options_only_carry_the_enabled_selector() {
        let by_variable = request(PlotLevel::AllSeasonsByVariable).options();
        assert_eq!(by_variable.get("variable").map(String::as_str), Some("pr"));
        assert!(!by_variable.contains_key("season"));

        let by_season = request(PlotLevel::AllVariablesBySeason).options();
        assert_eq!(by_season.get("season").map(String::as_str), Some("djf"));
        assert!(!by_season.contains_key("variable"));
        assert_eq!(by_season.len(), 4);
    }

    #[test]
    fn titles_describe_the_request() {
        assert_eq!(
            request(PlotLevel::AllSeasonsByVariable).plot_title(),
            "All Seasons for pr global bias_xy (cmip5)"
        );
        assert_eq!(
            request(PlotLevel::AllVariablesBySeason).plot_title(),
            "All Variables for djf global bias_xy (cmip5)"
        );
    }

    #[test]
    fn dataset_url_joins_generation_folder() {
        let client = HttpRegenerationClient::new("http://localhost:5000/", Duration::from_secs(5));
        assert_eq!(
            client.dataset_url("cmip6", "all_seasons_pr-cmip6-global-rms_xy.csv"),
            "http://localhost:5000/static/mean_climate_json_files/cmip6_csv/all_seasons_pr-cmip6-global-rms_xy.csv"
        );
    }

    #[test]
    fn newest_file_reply_shape() {
        let reply: NewestFile = serde_json::from_str(r#"{"latestfile": "a.csv"}"#).unwrap();
        assert_eq!(reply.latestfile, "a.csv");
    }
}
