use serde::Serialize;

/// Which `df` invocation / metric family a pass collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Space,
    Inodes,
}

impl MetricKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            MetricKind::Space  => "system.disk",
            MetricKind::Inodes => "system.fs.inodes",
        }
    }

    pub fn metric_name(&self, suffix: &str) -> String {
        format!("{}.{}", self.prefix(), suffix)
    }
}

/// One gauge ready for the sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub name:        String,
    pub value:       f64,
    pub tags:        Vec<String>,
    pub device_name: String,
}
