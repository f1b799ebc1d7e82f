/// Read-through proxy to the Atlas of Living Australia species services.
/// No caching, no retries: failures surface to the caller.
// region:    --- Imports
use crate::error::MarketError;
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- Upstream Endpoints

const ALA_API_BASE: &str = "https://api.ala.org.au/species";
const ALA_BIE_BASE: &str = "https://bie.ala.org.au/ws";
const ALA_IMAGES_BASE: &str = "https://images.ala.org.au/image";

/// Queries shorter than this never reach the upstream.
pub const MIN_QUERY_LEN: usize = 2;

// endregion: --- Upstream Endpoints

// region:    --- Proxy Shapes

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesSuggestion {
    pub scientific_name: String,
    pub guid: Option<String>,
    pub common_name: Option<String>,
    pub rank: Option<String>,
    pub matched_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesDetail {
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

// Upstream payloads, only the fields the proxy maps.
#[derive(Debug, Default, Deserialize)]
struct AutoCompleteResponse {
    #[serde(default, rename = "autoCompleteList")]
    auto_complete_list: Vec<AutoCompleteItem>,
}

#[derive(Debug, Deserialize)]
struct AutoCompleteItem {
    name: String,
    guid: Option<String>,
    #[serde(rename = "commonName")]
    common_name: Option<String>,
    #[serde(rename = "rankString")]
    rank_string: Option<String>,
    #[serde(default, rename = "matchedNames")]
    matched_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BieSpecies {
    #[serde(rename = "taxonConcept")]
    taxon_concept: Option<BieTaxonConcept>,
    #[serde(rename = "nameString")]
    name_string: Option<String>,
    #[serde(default, rename = "commonNames")]
    common_names: Vec<BieCommonName>,
    #[serde(rename = "imageIdentifier")]
    image_identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BieTaxonConcept {
    #[serde(rename = "nameString")]
    name_string: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BieCommonName {
    #[serde(rename = "nameString")]
    name_string: Option<String>,
}

fn suggestions_from(payload: AutoCompleteResponse) -> Vec<SpeciesSuggestion> {
    payload
        .auto_complete_list
        .into_iter()
        .map(|item| SpeciesSuggestion {
            scientific_name: item.name,
            guid: item.guid,
            common_name: item.common_name,
            rank: item.rank_string,
            matched_names: item.matched_names,
        })
        .collect()
}

fn detail_from(doc: BieSpecies, images_base: &str) -> SpeciesDetail {
    let scientific_name = doc
        .taxon_concept
        .and_then(|t| t.name_string)
        .or(doc.name_string);
    let common_name = doc
        .common_names
        .into_iter()
        .next()
        .and_then(|c| c.name_string);
    let (image_url, thumbnail_url) = match doc.image_identifier {
        Some(id) => (
            Some(format!("{images_base}/{id}")),
            Some(format!(
                "{images_base}/proxyImageThumbnail?imageId={id}"
            )),
        ),
        None => (None, None),
    };
    SpeciesDetail {
        scientific_name,
        common_name,
        image_url,
        thumbnail_url,
    }
}

// endregion: --- Proxy Shapes

// region:    --- ALA Client

pub struct AlaClient {
    http: reqwest::Client,
    api_base: String,
    bie_base: String,
    images_base: String,
}

impl AlaClient {
    pub fn new() -> Self {
        Self::with_bases(ALA_API_BASE, ALA_BIE_BASE, ALA_IMAGES_BASE)
    }

    pub fn with_bases(api_base: &str, bie_base: &str, images_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.to_string(),
            bie_base: bie_base.to_string(),
            images_base: images_base.to_string(),
        }
    }

    /// Taxon autocomplete, capped at 10 suggestions upstream.
    pub async fn search(&self, query: &str) -> Result<Vec<SpeciesSuggestion>, MarketError> {
        info!("{:<12} --> species search '{}'", "Species", query);
        let url = format!("{}/search/auto", self.api_base);
        let payload: AutoCompleteResponse = self
            .http
            .get(&url)
            .query(&[("q", query), ("idxType", "TAXON"), ("limit", "10")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(suggestions_from(payload))
    }

    /// Species document by guid. `None` when the upstream has no match.
    pub async fn detail(&self, guid: &str) -> Result<Option<SpeciesDetail>, MarketError> {
        info!("{:<12} --> species detail '{}'", "Species", guid);
        let url = format!("{}/species/{}", self.bie_base, urlencoding::encode(guid));
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let doc: BieSpecies = response.json().await?;
        Ok(Some(detail_from(doc, &self.images_base)))
    }
}

// endregion: --- ALA Client

// endregion: --- Tests
