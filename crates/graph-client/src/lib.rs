use redpacket_models::DataWrittenRecord;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

/// The ten most recent `DataWritten` events, newest first.
pub const RECENT_DATA_WRITTENS_QUERY: &str = r#"query GetDataWrittens {
  dataWrittens(first: 10, orderBy: blockTimestamp, orderDirection: desc) {
    id
    sender
    value
    note
    blockTimestamp
  }
}"#;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to build HTTP client: {source:?}"))]
    BuildClient { source: reqwest::Error },

    #[snafu(display("Failed to send request: {source:?} at {loc}"))]
    Request {
        source: reqwest::Error,
        #[snafu(implicit)]
        loc: snafu::Location,
    },

    #[snafu(display("Failed to parse response: {source:?}"))]
    ParseResponse {
        source: reqwest::Error,
        #[snafu(implicit)]
        loc: snafu::Location,
    },

    #[snafu(display("Invalid endpoint URL: {source:?}"))]
    InvalidUrl {
        source: url::ParseError,
        #[snafu(implicit)]
        loc: snafu::Location,
    },

    #[snafu(display("Indexing service returned errors: {}", messages.join("; ")))]
    Query { messages: Vec<String> },

    #[snafu(display("Indexing service returned no data"))]
    MissingData,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    pub data_writtens: Vec<DataWrittenRecord>,
}

pub struct GraphClient {
    client: Client,
    endpoint: Url,
}

impl GraphClient {
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self> {
        let client = Client::builder().build().context(BuildClientSnafu)?;

        tracing::info!("Creating GraphClient with endpoint: {}", endpoint.as_ref());

        let endpoint = Url::parse(endpoint.as_ref()).context(InvalidUrlSnafu)?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn recent_data_writtens(&self) -> Result<Vec<DataWrittenRecord>> {
        let data: GraphData = self.request(RECENT_DATA_WRITTENS_QUERY).await?;
        tracing::debug!("Fetched {} DataWritten events", data.data_writtens.len());
        Ok(data.data_writtens)
    }

    pub async fn request<T: DeserializeOwned>(&self, query: &str) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GraphQlRequest { query })
            .send()
            .await
            .context(RequestSnafu)?
            .json::<GraphQlResponse<T>>()
            .await
            .context(ParseResponseSnafu)?;

        unwrap_response(response)
    }
}

fn unwrap_response<T>(response: GraphQlResponse<T>) -> Result<T> {
    if !response.errors.is_empty() {
        return Err(Error::Query {
            messages: response.errors.into_iter().map(|e| e.message).collect(),
        });
    }
    response.data.ok_or(Error::MissingData)
}
