//! KPI threshold checks.
//!
//! A [`KpiTest`] is a named observation compared against a threshold. Tests
//! are usually evaluated as a suite through
//! [`Monitor::update_with_kpis`](super::Monitor::update_with_kpis), which
//! folds the outcome into the session and appends each test's block to the
//! report.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::MonitorError;

/// How the observed value must relate to the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparator {
    #[serde(rename = "greater-than")]
    GreaterThan,
    #[serde(rename = "less-than")]
    LessThan,
    #[serde(rename = "equal-to")]
    EqualTo,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::GreaterThan => "greater-than",
            Comparator::LessThan => "less-than",
            Comparator::EqualTo => "equal-to",
        }
    }

    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::GreaterThan => value > threshold,
            Comparator::LessThan => value < threshold,
            Comparator::EqualTo => value == threshold,
        }
    }
}

impl FromStr for Comparator {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greater-than" => Ok(Comparator::GreaterThan),
            "less-than" => Ok(Comparator::LessThan),
            "equal-to" => Ok(Comparator::EqualTo),
            other => Err(MonitorError::InvalidParameter(format!(
                "comparator must be \"greater-than\", \"less-than\" or \"equal-to\", got \"{}\"",
                other
            ))),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = match self {
            Comparator::GreaterThan => "greater than",
            Comparator::LessThan => "less than",
            Comparator::EqualTo => "equal to",
        };
        f.write_str(words)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KpiUnit {
    Percentage,
    #[default]
    RawNumber,
}

impl KpiUnit {
    fn suffix(&self) -> &'static str {
        match self {
            KpiUnit::Percentage => "%",
            KpiUnit::RawNumber => "",
        }
    }
}

/// Unvalidated form of a [`KpiTest`], as found in TOML/JSON input.
#[derive(Debug, Clone, Deserialize)]
pub struct KpiDefinition {
    pub name: String,
    pub value: f64,
    pub comparator: String,
    pub threshold: f64,
    #[serde(default)]
    pub unit: KpiUnit,
}

/// A validated, immutable KPI check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KpiDefinition")]
pub struct KpiTest {
    name: String,
    value: f64,
    comparator: Comparator,
    threshold: f64,
    unit: KpiUnit,
}

impl KpiTest {
    /// Build a test, rejecting any comparator other than `greater-than`,
    /// `less-than` or `equal-to`.
    pub fn new(
        name: impl Into<String>,
        value: f64,
        comparator: &str,
        threshold: f64,
        unit: KpiUnit,
    ) -> Result<Self, MonitorError> {
        Ok(Self {
            name: name.into(),
            value,
            comparator: comparator.parse()?,
            threshold,
            unit,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn unit(&self) -> KpiUnit {
        self.unit
    }

    pub fn evaluate(&self) -> bool {
        self.comparator.holds(self.value, self.threshold)
    }

    /// The four report lines describing this test, already indented.
    pub fn format(&self) -> Vec<String> {
        let suffix = self.unit.suffix();
        vec![
            format!("\tKPI: {}", self.name),
            format!("\t\tValue: {}{}", self.value, suffix),
            format!("\t\tMust be {} {}{}", self.comparator, self.threshold, suffix),
            format!("\t\tValidated: {}", self.evaluate()),
        ]
    }
}

impl TryFrom<KpiDefinition> for KpiTest {
    type Error = MonitorError;

    fn try_from(def: KpiDefinition) -> Result<Self, Self::Error> {
        KpiTest::new(
            def.name,
            def.value,
            &def.comparator,
            def.threshold,
            def.unit,
        )
    }
}

impl fmt::Display for KpiTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format().join("\n"))
    }
}

/// A list of KPI tests as read from a `[[kpi]]` TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KpiFile {
    #[serde(default, rename = "kpi")]
    pub kpis: Vec<KpiTest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_comparator_is_rejected() {
        let err = KpiTest::new("rows", 1.0, "bogus", 2.0, KpiUnit::RawNumber)
            .unwrap_err();
        let msg = err.to_string();

        assert!(matches!(err, MonitorError::InvalidParameter(_)));
        assert!(msg.contains("\"greater-than\""));
        assert!(msg.contains("\"less-than\""));
        assert!(msg.contains("\"equal-to\""));
        assert!(msg.contains("\"bogus\""));
    }

    #[test]
    fn test_comparator_is_case_sensitive() {
        assert!("Less-Than".parse::<Comparator>().is_err());
        assert!("less than".parse::<Comparator>().is_err());
        assert_eq!("less-than".parse::<Comparator>().unwrap(), Comparator::LessThan);
    }

    #[test]
    fn test_evaluate() {
        let pct = KpiTest::new("null ratio", 0.06, "less-than", 0.1, KpiUnit::Percentage)
            .unwrap();
        assert!(pct.evaluate());

        let count = KpiTest::new("row count", 1235.0, "equal-to", 1235.0, KpiUnit::RawNumber)
            .unwrap();
        assert!(count.evaluate());

        let gt = KpiTest::new("throughput", 10.0, "greater-than", 10.0, KpiUnit::RawNumber)
            .unwrap();
        assert!(!gt.evaluate());

        let lt = KpiTest::new("latency", 5.0, "less-than", 5.0, KpiUnit::RawNumber)
            .unwrap();
        assert!(!lt.evaluate());
    }

    #[test]
    fn test_format_percentage() {
        let kpi = KpiTest::new("pctOfWhatever", 0.06, "less-than", 0.1, KpiUnit::Percentage)
            .unwrap();
        assert_eq!(
            kpi.format(),
            vec![
                "\tKPI: pctOfWhatever",
                "\t\tValue: 0.06%",
                "\t\tMust be less than 0.1%",
                "\t\tValidated: true",
            ]
        );
    }

    #[test]
    fn test_format_raw_number() {
        let kpi = KpiTest::new("nbr", 1235.0, "greater-than", 2000.0, KpiUnit::RawNumber)
            .unwrap();
        assert_eq!(
            kpi.to_string(),
            "\tKPI: nbr\n\t\tValue: 1235\n\t\tMust be greater than 2000\n\t\tValidated: false"
        );
    }

    #[test]
    fn test_kpi_file_from_toml() {
        let toml_str = r#"
[[kpi]]
name = "null ratio"
value = 0.06
comparator = "less-than"
threshold = 0.1
unit = "percentage"

[[kpi]]
name = "row count"
value = 1235
comparator = "equal-to"
threshold = 1235
"#;
        let file: KpiFile = toml::from_str(toml_str).unwrap();
        assert_eq!(file.kpis.len(), 2);
        assert_eq!(file.kpis[0].unit(), KpiUnit::Percentage);
        assert_eq!(file.kpis[1].unit(), KpiUnit::RawNumber);
        assert!(file.kpis.iter().all(KpiTest::evaluate));
    }

    #[test]
    fn test_kpi_file_rejects_bad_comparator() {
        let toml_str = r#"
[[kpi]]
name = "x"
value = 1.0
comparator = "bogus"
threshold = 2.0
"#;
        let err = toml::from_str::<KpiFile>(toml_str).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }
}
