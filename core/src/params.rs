//! Query parameters shared by the endpoints.

use std::time::Duration;

/// Formats a duration as an OpenSearch time value.
///
/// Whole milliseconds are used where possible; anything shorter than a
/// millisecond is sent in nanoseconds.
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_millis(1) {
        format!("{}nanos", duration.as_nanos())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Ordered list of query pairs, skipping unset values.
#[derive(Debug, Default)]
pub struct Query(Vec<(&'static str, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(
        &mut self,
        key: &'static str,
        on: bool,
    ) -> &mut Self {
        if on {
            self.0.push((key, "true".into()));
        }
        self
    }

    pub fn bool(
        &mut self,
        key: &'static str,
        value: Option<bool>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.0.push((key, value.to_string()));
        }
        self
    }

    pub fn str(
        &mut self,
        key: &'static str,
        value: Option<&str>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.0.push((key, value.to_string()));
        }
        self
    }

    pub fn duration(
        &mut self,
        key: &'static str,
        value: Option<Duration>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.0.push((key, format_duration(value)));
        }
        self
    }

    pub fn list(
        &mut self,
        key: &'static str,
        values: &[String],
    ) -> &mut Self {
        if !values.is_empty() {
            self.0.push((key, crate::join(values)));
        }
        self
    }

    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.0
    }
}

/// Parameters accepted by every endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonParams {
    pub pretty: bool,
    pub human: bool,
    pub error_trace: bool,
    pub filter_path: Vec<String>,
}

impl CommonParams {
    pub(crate) fn apply(
        &self,
        query: &mut Query,
    ) {
        query
            .flag("pretty", self.pretty)
            .flag("human", self.human)
            .flag("error_trace", self.error_trace)
            .list("filter_path", &self.filter_path);
    }
}

/// Timeouts accepted by the cluster-state changing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub timeout: Option<Duration>,
    pub cluster_manager_timeout: Option<Duration>,
    /// Deprecated in favour of `cluster_manager_timeout`, still honoured by
    /// older clusters.
    pub master_timeout: Option<Duration>,
}

impl Timeouts {
    pub(crate) fn apply(
        &self,
        query: &mut Query,
    ) {
        query
            .duration("timeout", self.timeout)
            .duration("cluster_manager_timeout", self.cluster_manager_timeout)
            .duration("master_timeout", self.master_timeout);
    }
}

/// Index resolution options for endpoints taking index expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOptions {
    pub allow_no_indices: Option<bool>,
    pub expand_wildcards: Option<String>,
    pub ignore_unavailable: Option<bool>,
}

impl IndexOptions {
    pub(crate) fn apply(
        &self,
        query: &mut Query,
    ) {
        query
            .bool("allow_no_indices", self.allow_no_indices)
            .str("expand_wildcards", self.expand_wildcards.as_deref())
            .bool("ignore_unavailable", self.ignore_unavailable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case::test_case(Duration::from_secs(30), "30000ms"; "seconds are sent as milliseconds")]
    #[test_case::test_case(Duration::from_millis(1), "1ms"; "one millisecond")]
    #[test_case::test_case(Duration::from_micros(1500), "1ms"; "partial milliseconds are truncated")]
    #[test_case::test_case(Duration::from_nanos(500), "500nanos"; "sub millisecond uses nanos")]
    #[test_case::test_case(Duration::ZERO, "0nanos"; "zero")]
    fn formats_durations(
        duration: Duration,
        expected: &str,
    ) {
        assert_eq!(format_duration(duration), expected);
    }

    #[test]
    fn unset_values_are_skipped() {
        let mut query = Query::new();
        query
            .flag("pretty", false)
            .bool("local", None)
            .str("expand_wildcards", None)
            .duration("timeout", None)
            .list("filter_path", &[]);
        assert!(query.into_pairs().is_empty());
    }

    #[test]
    fn common_params_keep_order() {
        let params = CommonParams {
            pretty: true,
            human: false,
            error_trace: true,
            filter_path: vec!["*.aliases".into(), "acknowledged".into()],
        };
        let mut query = Query::new();
        params.apply(&mut query);

        assert_eq!(
            query.into_pairs(),
            vec![
                ("pretty", "true".to_string()),
                ("error_trace", "true".to_string()),
                ("filter_path", "*.aliases,acknowledged".to_string()),
            ]
        );
    }
}
