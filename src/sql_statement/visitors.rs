//! Read-only walks over statement trees.

use std::collections::HashSet;

use super::sql_expr::SqlExpr;
use super::sql_table::{JoinInfo, JoinedTables, SqlTable, TableInfo};
use super::SqlStatement;

/// Calls `f` on `expr` and every expression below it, entering nested statements.
pub fn walk_expr(expr: &SqlExpr, f: &mut dyn FnMut(&SqlExpr)) {
    f(expr);
    if let SqlExpr::SubStatement(statement) = expr {
        walk_statement(statement, f);
    }
    expr.for_each_child(&mut |child| walk_expr(child, f));
}

/// Calls `f` on every expression of `statement`, its tables, joins and nested statements.
pub fn walk_statement(statement: &SqlStatement, f: &mut dyn FnMut(&SqlExpr)) {
    for expr in statement.direct_expressions() {
        walk_expr(expr, f);
    }
    for table in statement.tables() {
        walk_table(table, f);
    }
    for combined in statement.set_operation_combined() {
        walk_statement(&combined.statement, f);
    }
}

fn walk_table(table: &SqlTable, f: &mut dyn FnMut(&SqlExpr)) {
    match &table.table_info {
        TableInfo::ResolvedSubStatement(info) => walk_statement(&info.statement, f),
        TableInfo::UnresolvedCollectionJoin(info) => walk_expr(&info.source, f),
        _ => {}
    }
    walk_joins(&table.joined_tables, f);
}

fn walk_joins(joins: &JoinedTables, f: &mut dyn FnMut(&SqlExpr)) {
    for joined in joins.values() {
        match &joined.join_info {
            JoinInfo::Resolved(info) => walk_expr(&info.join_condition, f),
            JoinInfo::UnresolvedCollection(info) => walk_expr(&info.source, f),
            JoinInfo::UnresolvedMember(_) => {}
        }
        walk_joins(&joined.joined_tables, f);
    }
}

fn for_each_sub_statement(expr: &SqlExpr, f: &mut dyn FnMut(&SqlStatement)) {
    if let SqlExpr::SubStatement(statement) = expr {
        f(statement);
        return;
    }
    expr.for_each_child(&mut |child| for_each_sub_statement(child, f));
}

fn collect_join_aliases(joins: &JoinedTables, aliases: &mut Vec<String>) {
    for joined in joins.values() {
        if let Some(alias) = joined.table_alias() {
            aliases.push(alias.to_string());
        }
        collect_join_aliases(&joined.joined_tables, aliases);
    }
}

fn collect_statement_aliases(statement: &SqlStatement, aliases: &mut Vec<String>) {
    for table in statement.tables() {
        if let Some(alias) = table.table_alias() {
            aliases.push(alias.to_string());
        }
        if let TableInfo::ResolvedSubStatement(info) = &table.table_info {
            collect_statement_aliases(&info.statement, aliases);
        }
        collect_join_aliases(&table.joined_tables, aliases);
    }
    for combined in statement.set_operation_combined() {
        collect_statement_aliases(&combined.statement, aliases);
    }
    for expr in statement.direct_expressions() {
        for_each_sub_statement(expr, &mut |nested| collect_statement_aliases(nested, aliases));
    }
}

/// Every table alias defined anywhere in the tree, in definition order, duplicates kept.
pub fn collect_table_aliases(statement: &SqlStatement) -> Vec<String> {
    let mut aliases = Vec::new();
    collect_statement_aliases(statement, &mut aliases);
    aliases
}

/// Every table alias some column or entity in the tree reads from.
pub fn referenced_table_aliases(statement: &SqlStatement) -> HashSet<String> {
    let mut aliases = HashSet::new();
    walk_statement(statement, &mut |expr| match expr {
        SqlExpr::Column(column) => {
            aliases.insert(column.owning_table_alias.clone());
        }
        SqlExpr::Entity(entity) => {
            aliases.insert(entity.table_alias.clone());
        }
        SqlExpr::EntityRefMember(reference) => {
            aliases.insert(reference.origin.table_alias.clone());
        }
        _ => {}
    });
    aliases
}

/// True if the statement reads columns of tables defined outside of it.
pub fn is_correlated(statement: &SqlStatement) -> bool {
    let defined: HashSet<String> = collect_table_aliases(statement).into_iter().collect();
    referenced_table_aliases(statement)
        .iter()
        .any(|alias| !defined.contains(alias))
}
