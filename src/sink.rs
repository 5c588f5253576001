use crate::models::metric::MetricSample;

/// Receives metrics produced by a check.
pub trait MetricSink {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String], device_name: &str);
}

/// Collects gauges in memory until flushed.
#[derive(Debug, Default)]
pub struct Aggregator {
    samples: Vec<MetricSample>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    /// Hand over everything gathered so far and start empty.
    pub fn flush(&mut self) -> Vec<MetricSample> {
        std::mem::take(&mut self.samples)
    }
}

impl MetricSink for Aggregator {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String], device_name: &str) {
        self.samples.push(MetricSample {
            name:        name.to_string(),
            value,
            tags:        tags.to_vec(),
            device_name: device_name.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_empties() {
        let mut agg = Aggregator::new();
        agg.gauge("system.disk.total", 1.0, &[], "/dev/sda1");
        assert_eq!(agg.samples().len(), 1);
        let out = agg.flush();
        assert_eq!(out[0].device_name, "/dev/sda1");
        assert!(agg.samples().is_empty());
    }
}
