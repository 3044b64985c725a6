use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::budget::{Budget, BudgetReport};
use crate::schema::SchemaKind;

/// Loader configuration options.
///
/// Use this to pick the schema, set or lift the resource [`Budget`], and control how errors
/// are rendered.
///
/// Example: load a small configuration with the JSON schema and a tight budget. Under JSON
/// every string, keys included, must be quoted.
///
/// ```rust
/// use yaml_loader::{load_with_options, SchemaKind, Value};
///
/// let yaml = r#"
/// "name": "My Application"
/// "enabled": true
/// "retries": 5
/// "#;
///
/// let options = yaml_loader::options! {
///     schema: SchemaKind::Json,
///     budget: Some(yaml_loader::budget! {
///         max_documents: 2,
///     }),
/// };
///
/// let cfg = load_with_options(yaml, options).unwrap();
/// assert_eq!(cfg.get("name").and_then(Value::as_str), Some("My Application"));
/// assert_eq!(cfg.get("retries").and_then(Value::as_i64), Some(5));
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Options {
    /// Schema used to resolve tags and build values. Default: [`SchemaKind::Core`].
    pub schema: SchemaKind,
    /// Resource limits for one stream. `None` disables every limit.
    pub budget: Option<Budget>,
    /// Optional callback invoked with the final budget report after loading.
    /// It is invoked both when loading succeeds and when it fails.
    #[serde(skip)]
    pub budget_report: Option<fn(&BudgetReport)>,

    /// Same as `budget_report`, for closures that capture state.
    #[serde(skip)]
    pub budget_report_cb: Option<BudgetReportCallback>,

    /// If true (default), [`crate::Error::render`] draws a rustc-like snippet of the source
    /// around the error location. If false it returns the plain message.
    pub with_snippet: bool,

    /// Horizontal crop radius (in character columns) when rendering snippet diagnostics.
    ///
    /// The renderer crops all displayed lines (including the context lines) to the same
    /// column window around the reported error column, so they stay vertically aligned.
    ///
    /// If set to `0`, the plain message is returned instead of a snippet.
    pub crop_radius: usize,
}

pub type BudgetReportCallback = Rc<std::cell::RefCell<dyn FnMut(BudgetReport) + 'static>>;

impl Options {
    /// Registers a budget-report callback. Any closure can be used, including ones that
    /// capture state from the surrounding scope.
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let documents = Rc::new(Cell::new(0));
    /// let seen = documents.clone();
    /// let options = yaml_loader::Options::default()
    ///     .with_budget_report(move |report| seen.set(report.documents));
    ///
    /// yaml_loader::load_all_with_options("a\n---\nb\n", options).unwrap();
    /// assert_eq!(documents.get(), 2);
    /// ```
    pub fn with_budget_report<F>(mut self, cb: F) -> Self
    where
        F: FnMut(BudgetReport) + 'static,
    {
        self.budget_report_cb = Some(Rc::new(std::cell::RefCell::new(cb)));
        self
    }

    /// Hand the final report to whichever callbacks are registered.
    pub(crate) fn publish_report(&self, report: &BudgetReport) {
        if let Some(callback) = self.budget_report {
            callback(report);
        }
        if let Some(callback) = &self.budget_report_cb {
            (callback.borrow_mut())(report.clone());
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            schema: SchemaKind::Core,
            budget: Some(Budget::default()),
            budget_report: None,
            budget_report_cb: None,
            with_snippet: true,
            crop_radius: 64,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("schema", &self.schema)
            .field("budget", &self.budget)
            .field("budget_report", &self.budget_report)
            .field("budget_report_cb", &if self.budget_report_cb.is_some() { "set" } else { "none" })
            .field("with_snippet", &self.with_snippet)
            .field("crop_radius", &self.crop_radius)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let opts = Options::default();
        assert_eq!(opts.schema, SchemaKind::Core);
        assert_eq!(opts.budget.as_ref().map(|b| b.max_depth), Some(64));
        assert!(opts.budget_report.is_none());
        assert!(opts.budget_report_cb.is_none());
        assert!(opts.with_snippet);
        assert_eq!(opts.crop_radius, 64);
    }

    #[test]
    fn test_options_debug_format() {
        let opts = Options::default();
        let debug_str = format!("{:?}", opts);
        assert!(debug_str.contains("Options"));
        assert!(debug_str.contains("schema: Core"));
        assert!(debug_str.contains("budget_report_cb: \"none\""));

        let opts_with_cb = opts.with_budget_report(|_| {});
        let debug_str_cb = format!("{:?}", opts_with_cb);
        assert!(debug_str_cb.contains("budget_report_cb: \"set\""));
    }

    #[test]
    fn test_options_macro_overrides_fields() {
        let opts = crate::options! {
            schema: SchemaKind::Failsafe,
            budget: None,
            crop_radius: 0,
        };
        assert_eq!(opts.schema, SchemaKind::Failsafe);
        assert!(opts.budget.is_none());
        assert_eq!(opts.crop_radius, 0);
        assert!(opts.with_snippet);
    }
}
