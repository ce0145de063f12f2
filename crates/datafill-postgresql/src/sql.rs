//! SQL statement builders.
//!
//! Identifiers are always double-quoted; values travel as parameters.

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"schema"."table"`
pub fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

pub fn count_rows_sql(schema: &str, table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", qualified(schema, table))
}

pub fn empty_table_sql(schema: &str, table: &str) -> String {
    format!("DELETE FROM {}", qualified(schema, table))
}

/// `ALTER TABLE … DISABLE|ENABLE TRIGGER USER`
pub fn triggers_sql(schema: &str, table: &str, enable: bool) -> String {
    let action = if enable { "ENABLE" } else { "DISABLE" };
    format!(
        "ALTER TABLE {} {action} TRIGGER USER",
        qualified(schema, table)
    )
}

/// Duplicate-tolerant insert of a JSON array of row objects bound to `$1`.
///
/// `json_populate_recordset` casts every field to the column type, so rows
/// need no per-type parameter binding.
pub fn insert_sql(schema: &str, table: &str, columns: &[&str]) -> String {
    let table = qualified(schema, table);
    let columns = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({columns}) SELECT {columns} FROM json_populate_recordset(NULL::{table}, $1) ON CONFLICT DO NOTHING"
    )
}

/// One row made only of column defaults.
pub fn insert_default_values_sql(schema: &str, table: &str) -> String {
    format!("INSERT INTO {} DEFAULT VALUES", qualified(schema, table))
}

/// Parameters of a foreign key candidate query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyQuery<'a> {
    pub schema: &'a str,
    pub table: &'a str,
    pub column: &'a str,
    pub foreign_table: &'a str,
    pub foreign_column: &'a str,
    pub unique: bool,
    pub filter: Option<&'a str>,
}

/// Distinct referenced values as JSON, in a stable order, limited by `$1`.
///
/// With `unique`, values already used by `table.column` are excluded.
pub fn foreign_key_sql(query: &ForeignKeyQuery<'_>) -> String {
    let foreign_table = qualified(query.schema, query.foreign_table);
    let foreign_column = format!("{foreign_table}.{}", quote_ident(query.foreign_column));
    let mut sql = format!("SELECT DISTINCT {foreign_column} AS v FROM {foreign_table}");
    let mut conditions = vec![format!("{foreign_column} IS NOT NULL")];
    if query.unique {
        sql.push_str(&format!(
            " LEFT JOIN {} AS existing ON existing.{} = {foreign_column}",
            qualified(query.schema, query.table),
            quote_ident(query.column)
        ));
        conditions.push(format!("existing.{} IS NULL", quote_ident(query.column)));
    }
    if let Some(filter) = query.filter {
        conditions.push(format!("({filter})"));
    }
    format!(
        "SELECT to_json(candidates.v) FROM ({sql} WHERE {} ORDER BY 1 LIMIT $1) AS candidates ORDER BY candidates.v",
        conditions.join(" AND ")
    )
}
