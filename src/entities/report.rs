//! Reports (lost/found/abuse), routed to volunteers for handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntity, RecordFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
  Open,
  InProgress,
  Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub id: String,
  pub reporter_id: String,
  /// Volunteer currently handling the report, if anyone picked it up.
  pub assignee_id: Option<String>,
  pub status: ReportStatus,
  pub description: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFilter {
  ByReporter(String),
  ByAssignee(String),
  ByStatus(ReportStatus),
}

impl RecordFilter<Report> for ReportFilter {
  fn matches(&self, report: &Report) -> bool {
    match self {
      ReportFilter::ByReporter(id) => report.reporter_id == *id,
      ReportFilter::ByAssignee(id) => report.assignee_id.as_deref() == Some(id.as_str()),
      ReportFilter::ByStatus(status) => report.status == *status,
    }
  }
}

impl CacheEntity for Report {
  type Filter = ReportFilter;

  fn entity_id(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "report"
  }
}
