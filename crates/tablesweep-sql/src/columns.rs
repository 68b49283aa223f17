//! Column reference extraction
//!
//! Walks the parsed AST and collects every column name a query mentions:
//! projections, predicates, join constraints, grouping, ordering, window
//! specs, and function arguments, through CTEs and subqueries. Qualified
//! references contribute their final segment (`t.amount` -> `amount`);
//! wildcards contribute nothing. This is syntactic extraction, not name
//! resolution: an alias that shadows a real column is collected as-is.

use crate::parser::SqlParser;
use sqlparser::ast::{
    Expr, Function, FunctionArg, FunctionArgExpr, FunctionArguments, GroupByExpr, JoinConstraint,
    JoinOperator, Query, Select, SelectItem, SetExpr, Statement, TableFactor, TableWithJoins,
    WindowType,
};
use std::collections::BTreeSet;

/// Extract referenced column names from free-form SQL text.
///
/// Returns `None` when the text does not parse; callers treat that as
/// "no columns extracted".
pub fn extract_columns(sql: &str) -> Option<BTreeSet<String>> {
    let statements = SqlParser::bigquery().parse_tolerant(sql)?;
    Some(referenced_columns(&statements))
}

/// Collect referenced column names from already-parsed statements
pub fn referenced_columns(statements: &[Statement]) -> BTreeSet<String> {
    let mut collector = ColumnCollector::default();
    for statement in statements {
        collector.collect_statement(statement);
    }
    collector.columns
}

#[derive(Default)]
struct ColumnCollector {
    columns: BTreeSet<String>,
}

impl ColumnCollector {
    fn add(&mut self, name: &str) {
        if !name.is_empty() {
            self.columns.insert(name.to_string());
        }
    }

    fn collect_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Query(query) => self.collect_query(query),
            Statement::Insert(insert) => {
                if let Some(source) = &insert.source {
                    self.collect_query(source);
                }
            }
            Statement::CreateTable(create) => {
                if let Some(query) = &create.query {
                    self.collect_query(query);
                }
            }
            // Other statement kinds carry no SELECT body worth mining
            _ => {}
        }
    }

    fn collect_query(&mut self, query: &Query) {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.collect_query(&cte.query);
            }
        }

        self.collect_set_expr(&query.body);

        if let Some(order_by) = &query.order_by {
            for order in &order_by.exprs {
                self.collect_expr(&order.expr);
            }
        }
    }

    fn collect_set_expr(&mut self, set_expr: &SetExpr) {
        match set_expr {
            SetExpr::Select(select) => self.collect_select(select),
            SetExpr::Query(query) => self.collect_query(query),
            SetExpr::SetOperation { left, right, .. } => {
                self.collect_set_expr(left);
                self.collect_set_expr(right);
            }
            SetExpr::Values(values) => {
                for row in &values.rows {
                    for expr in row {
                        self.collect_expr(expr);
                    }
                }
            }
            _ => {}
        }
    }

    fn collect_select(&mut self, select: &Select) {
        for item in &select.projection {
            match item {
                SelectItem::UnnamedExpr(expr) => self.collect_expr(expr),
                SelectItem::ExprWithAlias { expr, .. } => self.collect_expr(expr),
                SelectItem::QualifiedWildcard(..) | SelectItem::Wildcard(..) => {}
            }
        }

        for table_with_joins in &select.from {
            self.collect_table_with_joins(table_with_joins);
        }

        if let Some(selection) = &select.selection {
            self.collect_expr(selection);
        }

        if let GroupByExpr::Expressions(exprs, _) = &select.group_by {
            for expr in exprs {
                self.collect_expr(expr);
            }
        }

        if let Some(having) = &select.having {
            self.collect_expr(having);
        }

        if let Some(qualify) = &select.qualify {
            self.collect_expr(qualify);
        }
    }

    fn collect_table_with_joins(&mut self, table_with_joins: &TableWithJoins) {
        self.collect_table_factor(&table_with_joins.relation);

        for join in &table_with_joins.joins {
            self.collect_table_factor(&join.relation);
            self.collect_join_operator(&join.join_operator);
        }
    }

    fn collect_table_factor(&mut self, table_factor: &TableFactor) {
        match table_factor {
            // Table names come from the log row, not the text
            TableFactor::Table { .. } => {}
            TableFactor::Derived { subquery, .. } => self.collect_query(subquery),
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.collect_table_with_joins(table_with_joins),
            TableFactor::UNNEST { array_exprs, .. } => {
                for expr in array_exprs {
                    self.collect_expr(expr);
                }
            }
            _ => {}
        }
    }

    fn collect_join_operator(&mut self, operator: &JoinOperator) {
        let constraint = match operator {
            JoinOperator::Inner(c)
            | JoinOperator::LeftOuter(c)
            | JoinOperator::RightOuter(c)
            | JoinOperator::FullOuter(c)
            | JoinOperator::LeftSemi(c)
            | JoinOperator::RightSemi(c)
            | JoinOperator::LeftAnti(c)
            | JoinOperator::RightAnti(c) => c,
            _ => return,
        };

        match constraint {
            JoinConstraint::On(expr) => self.collect_expr(expr),
            JoinConstraint::Using(idents) => {
                for ident in idents {
                    self.add(&ident.value);
                }
            }
            JoinConstraint::Natural | JoinConstraint::None => {}
        }
    }

    fn collect_function(&mut self, func: &Function) {
        match &func.args {
            FunctionArguments::List(list) => {
                for arg in &list.args {
                    let arg_expr = match arg {
                        FunctionArg::Named { arg, .. } => arg,
                        FunctionArg::Unnamed(arg) => arg,
                        _ => continue,
                    };

                    if let FunctionArgExpr::Expr(expr) = arg_expr {
                        self.collect_expr(expr);
                    }
                }
            }
            FunctionArguments::Subquery(query) => self.collect_query(query),
            FunctionArguments::None => {}
        }

        if let Some(filter) = &func.filter {
            self.collect_expr(filter);
        }

        if let Some(WindowType::WindowSpec(spec)) = &func.over {
            for expr in &spec.partition_by {
                self.collect_expr(expr);
            }
            for order in &spec.order_by {
                self.collect_expr(&order.expr);
            }
        }
    }

    fn collect_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Identifier(ident) => self.add(&ident.value),
            Expr::CompoundIdentifier(idents) => {
                if let Some(last) = idents.last() {
                    self.add(&last.value);
                }
            }
            Expr::BinaryOp { left, right, .. } => {
                self.collect_expr(left);
                self.collect_expr(right);
            }
            Expr::UnaryOp { expr, .. } => self.collect_expr(expr),
            Expr::Nested(inner) => self.collect_expr(inner),
            Expr::IsNull(inner)
            | Expr::IsNotNull(inner)
            | Expr::IsTrue(inner)
            | Expr::IsNotTrue(inner)
            | Expr::IsFalse(inner)
            | Expr::IsNotFalse(inner) => self.collect_expr(inner),
            Expr::IsDistinctFrom(left, right) | Expr::IsNotDistinctFrom(left, right) => {
                self.collect_expr(left);
                self.collect_expr(right);
            }
            Expr::InList { expr, list, .. } => {
                self.collect_expr(expr);
                for item in list {
                    self.collect_expr(item);
                }
            }
            Expr::InSubquery { expr, subquery, .. } => {
                self.collect_expr(expr);
                self.collect_query(subquery);
            }
            Expr::InUnnest {
                expr, array_expr, ..
            } => {
                self.collect_expr(expr);
                self.collect_expr(array_expr);
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                self.collect_expr(expr);
                self.collect_expr(low);
                self.collect_expr(high);
            }
            Expr::Like { expr, pattern, .. }
            | Expr::ILike { expr, pattern, .. }
            | Expr::SimilarTo { expr, pattern, .. } => {
                self.collect_expr(expr);
                self.collect_expr(pattern);
            }
            Expr::Cast { expr, .. } => self.collect_expr(expr),
            Expr::Extract { expr, .. } => self.collect_expr(expr),
            Expr::Case {
                operand,
                conditions,
                results,
                else_result,
            } => {
                if let Some(operand) = operand {
                    self.collect_expr(operand);
                }
                for condition in conditions {
                    self.collect_expr(condition);
                }
                for result in results {
                    self.collect_expr(result);
                }
                if let Some(else_result) = else_result {
                    self.collect_expr(else_result);
                }
            }
            Expr::Function(func) => self.collect_function(func),
            Expr::Exists { subquery, .. } => self.collect_query(subquery),
            Expr::Subquery(query) => self.collect_query(query),
            Expr::Tuple(exprs) => {
                for item in exprs {
                    self.collect_expr(item);
                }
            }
            Expr::Array(array) => {
                for item in &array.elem {
                    self.collect_expr(item);
                }
            }
            _ => {}
        }
    }
}
