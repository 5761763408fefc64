// Insights report returned by the analysis service

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default)]
    pub solutions: Vec<Solution>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Analysis {
    #[serde(default)]
    problems: Vec<Problem>,
}

/// Detected software, version and problems for one uploaded log.
///
/// Every field is optional on the wire; missing values decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireInsights", into = "WireInsights")]
pub struct InsightsReport {
    pub server_name: String,
    pub version: String,
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireInsights {
    #[serde(default, deserialize_with = "null_as_empty")]
    name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    version: String,
    #[serde(default)]
    analysis: Option<Analysis>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<WireInsights> for InsightsReport {
    fn from(wire: WireInsights) -> Self {
        Self {
            server_name: wire.name,
            version: wire.version,
            problems: wire.analysis.map(|a| a.problems).unwrap_or_default(),
        }
    }
}

impl From<InsightsReport> for WireInsights {
    fn from(report: InsightsReport) -> Self {
        Self {
            name: report.server_name,
            version: report.version,
            analysis: Some(Analysis {
                problems: report.problems,
            }),
        }
    }
}

impl InsightsReport {
    pub fn display_name(&self) -> &str {
        non_empty_or(&self.server_name, "Unknown Server")
    }

    pub fn display_version(&self) -> &str {
        non_empty_or(&self.version, "Not Available")
    }

    pub fn software(&self) -> ServerSoftware {
        ServerSoftware::from_name(&self.server_name)
    }

    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }
}

impl Problem {
    pub fn display_message(&self) -> &str {
        non_empty_or(&self.message, "No problem message available.")
    }
}

impl Solution {
    pub fn display_message(&self) -> &str {
        non_empty_or(&self.message, "No solution message available.")
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Server flavours the insights service recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerSoftware {
    Arclight,
    BungeeCord,
    Canvas,
    Fabric,
    Folia,
    Forge,
    Leaves,
    Mohist,
    NeoForge,
    Paper,
    Pufferfish,
    Purpur,
    Quilt,
    Sponge,
    Vanilla,
    Velocity,
    Waterfall,
}

impl ServerSoftware {
    /// Exact, case-sensitive match on the reported name. Unknown names
    /// fall back to Vanilla.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Arclight" => ServerSoftware::Arclight,
            "BungeeCord" => ServerSoftware::BungeeCord,
            "Canvas" => ServerSoftware::Canvas,
            "Fabric" => ServerSoftware::Fabric,
            "Folia" => ServerSoftware::Folia,
            "Forge" => ServerSoftware::Forge,
            "Leaves" => ServerSoftware::Leaves,
            "Mohist" => ServerSoftware::Mohist,
            "NeoForge" => ServerSoftware::NeoForge,
            "Paper" => ServerSoftware::Paper,
            "Pufferfish" => ServerSoftware::Pufferfish,
            "Purpur" => ServerSoftware::Purpur,
            "Quilt" => ServerSoftware::Quilt,
            "Sponge" => ServerSoftware::Sponge,
            "Velocity" => ServerSoftware::Velocity,
            "Waterfall" => ServerSoftware::Waterfall,
            _ => ServerSoftware::Vanilla,
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            ServerSoftware::Arclight => "arclight",
            ServerSoftware::BungeeCord => "bungeecord",
            ServerSoftware::Canvas => "canvas",
            ServerSoftware::Fabric => "fabric",
            ServerSoftware::Folia => "folia",
            ServerSoftware::Forge => "forge",
            ServerSoftware::Leaves => "leaves",
            ServerSoftware::Mohist => "mohist",
            ServerSoftware::NeoForge => "neoforge",
            ServerSoftware::Paper => "paper",
            ServerSoftware::Pufferfish => "pufferfish",
            ServerSoftware::Purpur => "purpur",
            ServerSoftware::Quilt => "quilt",
            ServerSoftware::Sponge => "sponge",
            ServerSoftware::Vanilla => "vanilla",
            ServerSoftware::Velocity => "velocity",
            ServerSoftware::Waterfall => "waterfall",
        }
    }

    pub fn icon_path(&self) -> String {
        format!("/extensions/mclogs/versions/{}.png", self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insights_parsing() {
        let body = r#"{
            "id": "name/type",
            "name": "Paper",
            "type": "Server Log",
            "version": "1.20.4",
            "title": "Paper 1.20.4 Server Log",
            "analysis": {
                "problems": [
                    {
                        "message": "The plugin 'Foo' could not be loaded.",
                        "counter": 1,
                        "entry": {"level": 3, "time": null, "prefix": "[ERROR]", "lines": []},
                        "solutions": [{"message": "Install the dependency 'Bar'."}]
                    },
                    {"message": "Server is running out of memory."}
                ],
                "information": []
            }
        }"#;

        let report: InsightsReport = serde_json::from_str(body).unwrap();
        assert_eq!(report.server_name, "Paper");
        assert_eq!(report.version, "1.20.4");
        assert_eq!(report.problems.len(), 2);
        assert_eq!(report.problems[0].solutions[0].message, "Install the dependency 'Bar'.");
        assert!(report.problems[1].solutions.is_empty());
        assert_eq!(report.software(), ServerSoftware::Paper);
    }

    #[test]
    fn test_sparse_insights_use_fallbacks() {
        let report: InsightsReport = serde_json::from_str(r#"{"name": null, "analysis": {"problems": [{"solutions": [{}]}]}}"#).unwrap();
        assert_eq!(report.display_name(), "Unknown Server");
        assert_eq!(report.display_version(), "Not Available");
        assert_eq!(report.problems[0].display_message(), "No problem message available.");
        assert_eq!(report.problems[0].solutions[0].display_message(), "No solution message available.");

        let empty: InsightsReport = serde_json::from_str("{}").unwrap();
        assert!(!empty.has_problems());
    }

    #[test]
    fn test_server_icons() {
        assert_eq!(
            ServerSoftware::from_name("NeoForge").icon_path(),
            "/extensions/mclogs/versions/neoforge.png"
        );
        assert_eq!(ServerSoftware::from_name("paper"), ServerSoftware::Vanilla);
        assert_eq!(
            ServerSoftware::from_name("").icon_path(),
            "/extensions/mclogs/versions/vanilla.png"
        );
    }
}
