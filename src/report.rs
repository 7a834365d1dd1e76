use tabled::{builder::Builder, settings::Style};

use crate::catalog::{Step, Table};

/// What happened to one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementOutcome {
    pub table: Table,
    pub step: Step,
    /// `None` when the statement succeeded, otherwise the error message.
    pub error: Option<String>,
}

impl StatementOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything one run did, in execution order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<StatementOutcome>,
    pub connection_error: Option<String>,
    pub close_error: Option<String>,
}

impl RunReport {
    pub fn new() -> Self {
        RunReport::default()
    }

    pub fn push(&mut self, outcome: StatementOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &StatementOutcome> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &StatementOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn outcome(&self, table: Table, step: Step) -> Option<&StatementOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.table == table && o.step == step)
    }

    /// True when the connection opened, every statement ran and the
    /// connection closed cleanly.
    pub fn is_success(&self) -> bool {
        self.connection_error.is_none()
            && self.close_error.is_none()
            && self.outcomes.iter().all(|o| o.is_ok())
    }

    /// Process exit code.  Failures only count when `strict` is set.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && !self.is_success() {
            1
        } else {
            0
        }
    }

    pub fn ascii_table(&self) -> tabled::Table {
        let mut builder = Builder::new();
        builder.push_record(vec!["Step", "Table", "Status", "Error"]);
        for o in &self.outcomes {
            builder.push_record(vec![
                o.step.to_string(),
                o.table.to_string(),
                if o.is_ok() { "ok" } else { "failed" }.to_string(),
                o.error.clone().unwrap_or_default(),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::sharp());
        table
    }

    pub fn summary(&self) -> String {
        format!(
            "{} statements succeeded, {} failed",
            self.succeeded().count(),
            self.failed().count()
        )
    }
}
