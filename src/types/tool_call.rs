use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result payload of a tool that either succeeded with `T` or reported an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResult<T> {
    /// The tool reported a failure.
    Failed {
        /// Error message from the tool.
        error: String,
    },
    /// The tool succeeded.
    Success(T),
}

/// Weather lookup output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Location the report is for.
    pub location: String,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Short condition description, e.g. "Sunny".
    pub condition: String,
    /// Relative humidity in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

/// Text output shared by the web search, data query, and MCP tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContent {
    /// Raw textual content returned by the tool.
    pub content: String,
}

/// Structured body carried inside a data query's [`ToolContent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQueryReport {
    /// Kind of data that was queried.
    #[serde(rename = "type")]
    pub r#type: String,
    /// The query text.
    pub query: String,
    /// Matching records.
    pub results: Vec<Value>,
}

impl DataQueryReport {
    /// Parses the JSON document embedded in a data query's content.
    pub fn parse(content: &ToolContent) -> Option<Self> {
        serde_json::from_str(&content.content).ok()
    }
}

/// A record of an auxiliary action the assistant took while producing a response.
///
/// The variant is selected by the tool name on the wire.  Tools this client does not know, and
/// known tools whose result does not have the expected shape, land in [`ToolCall::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawToolCall", into = "RawToolCall")]
pub enum ToolCall {
    /// `get_weather`
    GetWeather(Option<ToolResult<WeatherReport>>),
    /// `web_search`
    WebSearch(Option<ToolResult<ToolContent>>),
    /// `data_query`
    DataQuery(Option<ToolResult<ToolContent>>),
    /// Any other tool, typically one provided over MCP.
    Unknown {
        /// Tool name as reported by the server.
        name: String,
        /// Untyped result payload.
        result: Option<Value>,
    },
}

const GET_WEATHER: &str = "get_weather";
const WEB_SEARCH: &str = "web_search";
const DATA_QUERY: &str = "data_query";

impl ToolCall {
    /// The tool's wire name.
    pub fn name(&self) -> &str {
        match self {
            ToolCall::GetWeather(_) => GET_WEATHER,
            ToolCall::WebSearch(_) => WEB_SEARCH,
            ToolCall::DataQuery(_) => DATA_QUERY,
            ToolCall::Unknown { name, .. } => name,
        }
    }

    /// True while the tool has not produced a result.
    pub fn is_pending(&self) -> bool {
        match self {
            ToolCall::GetWeather(result) => result.is_none(),
            ToolCall::WebSearch(result) | ToolCall::DataQuery(result) => result.is_none(),
            ToolCall::Unknown { result, .. } => result.is_none(),
        }
    }

    /// The tool's error message, if it failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            ToolCall::GetWeather(Some(ToolResult::Failed { error }))
            | ToolCall::WebSearch(Some(ToolResult::Failed { error }))
            | ToolCall::DataQuery(Some(ToolResult::Failed { error })) => Some(error),
            ToolCall::Unknown {
                result: Some(result),
                ..
            } => result
                .get("error")
                .and_then(Value::as_str)
                .filter(|e| !e.is_empty()),
            _ => None,
        }
    }

    /// A one-line description suitable for a badge next to the message.
    pub fn summary(&self) -> String {
        let name = self.name();
        if self.is_pending() {
            return format!("Executing: {name}");
        }
        if let Some(error) = self.error() {
            return format!("Error in {name}: {error}");
        }
        match self {
            ToolCall::GetWeather(Some(ToolResult::Success(weather))) => format!(
                "Weather in {}: {}°C, {}",
                weather.location, weather.temperature, weather.condition
            ),
            ToolCall::WebSearch(Some(ToolResult::Success(content))) => {
                if content.content.contains("Search results for") {
                    "Web Search: Results found".to_string()
                } else if content.content.contains("Content from") {
                    let host = browsed_host(&content.content);
                    format!(
                        "Web Browse: {}",
                        host.as_deref().unwrap_or("Content fetched")
                    )
                } else {
                    "Web Search: Executed".to_string()
                }
            }
            ToolCall::DataQuery(Some(ToolResult::Success(content))) => {
                match DataQueryReport::parse(content) {
                    Some(report) => format!(
                        "Data Query: {} results for \"{}\"",
                        report.results.len(),
                        report.query
                    ),
                    None => "Data Query: Executed".to_string(),
                }
            }
            _ => format!("{name}: Executed successfully"),
        }
    }
}

/// Extracts the host from a "Content from <url>:" marker.
fn browsed_host(content: &str) -> Option<String> {
    let (_, rest) = content.split_once("Content from ")?;
    let token = rest.split_whitespace().next()?;
    let target = token.strip_suffix(':')?;
    if !(target.starts_with("http://") || target.starts_with("https://")) {
        return None;
    }
    let url = url::Url::parse(target).ok()?;
    url.host_str().map(str::to_string)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawToolCall {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
}

fn typed<T: serde::de::DeserializeOwned>(
    result: &Option<Value>,
) -> Result<Option<ToolResult<T>>, ()> {
    match result {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|_| ()),
    }
}

impl From<RawToolCall> for ToolCall {
    fn from(raw: RawToolCall) -> Self {
        let parsed = match raw.name.as_str() {
            GET_WEATHER => typed(&raw.result).map(ToolCall::GetWeather),
            WEB_SEARCH => typed(&raw.result).map(ToolCall::WebSearch),
            DATA_QUERY => typed(&raw.result).map(ToolCall::DataQuery),
            _ => Err(()),
        };
        parsed.unwrap_or(ToolCall::Unknown {
            name: raw.name,
            result: raw.result.filter(|v| !v.is_null()),
        })
    }
}

fn untyped<T: Serialize>(result: Option<ToolResult<T>>) -> Option<Value> {
    result.and_then(|r| serde_json::to_value(r).ok())
}

impl From<ToolCall> for RawToolCall {
    fn from(call: ToolCall) -> Self {
        let name = call.name().to_string();
        let result = match call {
            ToolCall::GetWeather(result) => untyped(result),
            ToolCall::WebSearch(result) | ToolCall::DataQuery(result) => untyped(result),
            ToolCall::Unknown { result, .. } => result,
        };
        RawToolCall { name, result }
    }
}
