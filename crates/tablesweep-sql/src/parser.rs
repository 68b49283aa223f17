//! SQL parsing using datafusion-sqlparser-rs
//!
//! Logged query text is free-form and frequently unparseable (scripting,
//! truncation, vendor extensions). Parsing is therefore best-effort: callers
//! that only want references use [`SqlParser::parse_tolerant`] and treat
//! `None` as "nothing extracted".

use sqlparser::ast::Statement;
use sqlparser::dialect::{BigQueryDialect, Dialect, GenericDialect};
use sqlparser::parser::{Parser, ParserError};

/// SQL parser with configurable dialect
pub struct SqlParser {
    dialect: Box<dyn Dialect>,
}

impl SqlParser {
    /// Create a new SQL parser with the generic dialect
    pub fn new() -> Self {
        Self {
            dialect: Box::new(GenericDialect {}),
        }
    }

    /// Create a SQL parser for BigQuery, the dialect of the job history
    pub fn bigquery() -> Self {
        Self {
            dialect: Box::new(BigQueryDialect {}),
        }
    }

    /// Parse SQL text into statements
    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, ParseError> {
        Parser::parse_sql(&*self.dialect, sql).map_err(ParseError)
    }

    /// Parse SQL text, mapping failure to `None`
    pub fn parse_tolerant(&self, sql: &str) -> Option<Vec<Statement>> {
        self.parse(sql).ok()
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// SQL parsing error
#[derive(Debug, thiserror::Error)]
#[error("SQL parse error: {0}")]
pub struct ParseError(pub ParserError);
