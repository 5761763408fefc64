use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Severity bucket for a single log line.
///
/// Variants are declared in precedence order, so `Ord` and `ALL` both
/// iterate ERROR, WARN, INFO, OTHER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warn,
    Info,
    Other,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Error, Severity::Warn, Severity::Info, Severity::Other];

    /// Substring that places a line in this bucket. `Other` has none.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Severity::Error => Some("ERROR"),
            Severity::Warn => Some("WARN"),
            Severity::Info => Some("INFO"),
            Severity::Other => None,
        }
    }

    /// Sections start collapsed for the noisy buckets.
    pub fn collapsed_by_default(&self) -> bool {
        matches!(self, Severity::Info | Severity::Other)
    }

    fn index(&self) -> usize {
        match self {
            Severity::Error => 0,
            Severity::Warn => 1,
            Severity::Info => 2,
            Severity::Other => 3,
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "ERROR" => Ok(Severity::Error),
            "WARN" => Ok(Severity::Warn),
            "INFO" => Ok(Severity::Info),
            "OTHER" => Ok(Severity::Other),
            _ => Err(anyhow::anyhow!("Invalid severity: {}", s)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warn => write!(f, "WARN"),
            Severity::Info => write!(f, "INFO"),
            Severity::Other => write!(f, "OTHER"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub severity: Severity,
    pub content: String,
}

/// Bucket one line. First marker found in ERROR > WARN > INFO order wins.
pub fn classify_line(line: &str) -> Severity {
    [Severity::Error, Severity::Warn, Severity::Info]
        .into_iter()
        .find(|severity| severity.marker().is_some_and(|marker| line.contains(marker)))
        .unwrap_or(Severity::Other)
}

/// Split raw text on `\n` and classify every line.
///
/// A trailing newline yields a final empty OTHER line, and empty input
/// yields a single empty OTHER line.
pub fn classify(raw: &str) -> Vec<ClassifiedLine> {
    raw.split('\n')
        .map(|line| ClassifiedLine {
            severity: classify_line(line),
            content: line.to_string(),
        })
        .collect()
}

/// Colour used when lines are shown in their original order.
///
/// This view tests WARN, then INFO, then ERROR, so a line carrying both
/// "INFO" and "ERROR" is tinted INFO here while `classify` files it under
/// ERROR.
pub fn tint(line: &str) -> Severity {
    if line.contains("WARN") {
        Severity::Warn
    } else if line.contains("INFO") {
        Severity::Info
    } else if line.contains("ERROR") {
        Severity::Error
    } else {
        Severity::Other
    }
}

/// Lines partitioned by severity, always holding all four buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedLines {
    buckets: [Vec<String>; 4],
}

impl GroupedLines {
    pub fn get(&self, severity: Severity) -> &[String] {
        &self.buckets[severity.index()]
    }

    /// All four buckets in ERROR, WARN, INFO, OTHER order.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, &[String])> {
        Severity::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// Buckets that have at least one line; this is what gets rendered.
    pub fn non_empty(&self) -> impl Iterator<Item = (Severity, &[String])> {
        self.iter().filter(|(_, lines)| !lines.is_empty())
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

pub fn group(lines: &[ClassifiedLine]) -> GroupedLines {
    let mut grouped = GroupedLines::default();
    for line in lines {
        grouped.buckets[line.severity.index()].push(line.content.clone());
    }
    grouped
}

/// Toggle caption for a grouped section, e.g. "Show 3 ERROR lines".
pub fn section_label(severity: Severity, count: usize, collapsed: bool) -> String {
    let verb = if collapsed { "Show" } else { "Hide" };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {} {} line{}", verb, count, severity, plural)
}
