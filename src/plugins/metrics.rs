//! Metrics sinks
//!
//! `LogMetricsSink` writes gauges to the tracing log. `StatsdMetricsSink`
//! sends them as DogStatsD-style UDP datagrams:
//! `<prefix>.<name>:<value>|g|#key:value,...`.

use crate::core::config::StatsdConfig;
use crate::core::traits::{MetricDimensions, MetricsSink};
use std::io;
use std::net::UdpSocket;

/// Gauges go to the log at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMetricsSink;

impl MetricsSink for LogMetricsSink {
    fn gauge(&self, name: &str, value: f64, dimensions: &MetricDimensions) {
        tracing::info!(metric = name, value, ?dimensions, "gauge");
    }
}

/// Gauges go to a StatsD agent over UDP
pub struct StatsdMetricsSink {
    socket: UdpSocket,
    target: String,
    prefix: String,
}

impl StatsdMetricsSink {
    pub fn connect(config: &StatsdConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            target: format!("{}:{}", config.host, config.port),
            prefix: config.prefix.clone(),
        })
    }
}

impl MetricsSink for StatsdMetricsSink {
    fn gauge(&self, name: &str, value: f64, dimensions: &MetricDimensions) {
        let line = format_statsd_line(&self.prefix, name, value, dimensions);
        if let Err(e) = self.socket.send_to(line.as_bytes(), &self.target) {
            tracing::warn!(target_addr = %self.target, error = %e, "failed to send metric");
        }
    }
}

/// Render one gauge datagram
pub fn format_statsd_line(
    prefix: &str,
    name: &str,
    value: f64,
    dimensions: &MetricDimensions,
) -> String {
    let mut line = if prefix.is_empty() {
        format!("{}:{}|g", name, value)
    } else {
        format!("{}.{}:{}|g", prefix, name, value)
    };

    if !dimensions.is_empty() {
        let tags: Vec<String> = dimensions
            .iter()
            .map(|(key, value)| format!("{}:{}", key, value))
            .collect();
        line.push_str("|#");
        line.push_str(&tags.join(","));
    }

    line
}
