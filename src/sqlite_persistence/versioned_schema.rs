use anyhow::{bail, Result};
use rusqlite::{params, Connection};

/// Unix seconds at row insertion time.
pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

/// Offset applied to `PRAGMA user_version` so that a freshly created database
/// is distinguishable from one that predates versioned schemas.
pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // unused_mut fires when the macro is called without optional
            // field assignments (e.g. `non_null = true`)
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                default_value: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
        }
    }
}

#[allow(unused)]
pub enum ForeignKeyOnChange {
    NoAction,
    Restrict,
    SetNull,
    SetDefault,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::Restrict => "RESTRICT",
            ForeignKeyOnChange::SetNull => "SET NULL",
            ForeignKeyOnChange::SetDefault => "SET DEFAULT",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<&'static str>,
    pub foreign_key: Option<&'static ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut column_defs = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let mut def = format!("{} {}", column.name, column.sql_type.as_sql());
            if column.is_primary_key {
                def.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                def.push_str(" NOT NULL");
            }
            if let Some(default_value) = column.default_value {
                def.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(foreign_key) = column.foreign_key {
                def.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    foreign_key.foreign_table,
                    foreign_key.foreign_column,
                    foreign_key.on_delete.as_sql(),
                ));
            }
            column_defs.push(def);
        }
        for unique_constraint in self.unique_constraints {
            column_defs.push(format!("UNIQUE ({})", unique_constraint.join(", ")));
        }
        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, column_defs.join(", ")),
            params![],
        )?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    /// Column names of the foreign keys this table declares against `parent`.
    fn references_to(&self, parent: &str) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|column| {
                column
                    .foreign_key
                    .map(|fk| fk.foreign_table == parent)
                    .unwrap_or(false)
            })
            .map(|column| column.name)
            .collect()
    }
}

/// Tables that hold a foreign key into `parent`, i.e. the rows a delete on
/// `parent` cascades into. Derived from the declarations, not hand-kept.
pub fn dependents_of<'a>(tables: &'a [Table], parent: &str) -> Vec<&'a Table> {
    tables
        .iter()
        .filter(|table| !table.references_to(parent).is_empty())
        .collect()
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

struct LiveColumn {
    name: String,
    sql_type: String,
    non_null: bool,
    default_value: Option<String>,
    is_primary_key: bool,
}

struct LiveForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
    on_delete: String,
}

fn strip_outer_parens(s: &str) -> &str {
    if s.starts_with('(') && s.ends_with(')') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    /// Checks the live database against the declared tables: column sets and
    /// attributes, declared indices, unique constraints, and foreign keys
    /// (including the ON DELETE action).
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            Self::validate_columns(conn, table)?;
            Self::validate_indices(conn, table)?;
            Self::validate_unique_constraints(conn, table)?;
            Self::validate_foreign_keys(conn, table)?;
        }
        Ok(())
    }

    fn validate_columns(conn: &Connection, table: &Table) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table.name))?;
        let live_columns: Vec<LiveColumn> = stmt
            .query_map(params![], |row| {
                Ok(LiveColumn {
                    name: row.get(1)?,
                    sql_type: row.get(2)?,
                    non_null: row.get::<_, i32>(3)? == 1,
                    default_value: row.get(4)?,
                    is_primary_key: row.get::<_, i32>(5)? == 1,
                })
            })?
            .collect::<Result<_, _>>()?;

        if live_columns.len() != table.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found: {}, expected: {}",
                table.name,
                live_columns.len(),
                table.columns.len(),
                live_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                table
                    .columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (live, expected) in live_columns.iter().zip(table.columns.iter()) {
            if live.name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    table.name,
                    expected.name,
                    live.name
                );
            }
            if live.sql_type != expected.sql_type.as_sql() {
                bail!(
                    "Table {} column {} type mismatch: expected {}, got {}",
                    table.name,
                    expected.name,
                    expected.sql_type.as_sql(),
                    live.sql_type
                );
            }
            if live.non_null != expected.non_null {
                bail!(
                    "Table {} column {} non-null mismatch: expected {}, got {}",
                    table.name,
                    expected.name,
                    expected.non_null,
                    live.non_null
                );
            }
            // SQLite may report default expressions wrapped in parentheses
            if live.default_value.as_deref().map(strip_outer_parens)
                != expected.default_value.map(strip_outer_parens)
            {
                bail!(
                    "Table {} column {} default mismatch: expected {:?}, got {:?}",
                    table.name,
                    expected.name,
                    expected.default_value,
                    live.default_value
                );
            }
            if live.is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} column {} primary key mismatch: expected {}, got {}",
                    table.name,
                    expected.name,
                    expected.is_primary_key,
                    live.is_primary_key
                );
            }
        }
        Ok(())
    }

    fn validate_indices(conn: &Connection, table: &Table) -> Result<()> {
        for (index_name, _columns) in table.indices {
            let index_exists: bool = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, table.name],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if !index_exists {
                bail!("Table {} is missing index '{}'", table.name, index_name);
            }
        }
        Ok(())
    }

    // SQLite surfaces unique constraints as unique indices in PRAGMA
    // index_list, with member columns in PRAGMA index_info.
    fn validate_unique_constraints(conn: &Connection, table: &Table) -> Result<()> {
        if table.unique_constraints.is_empty() {
            return Ok(());
        }

        let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", table.name))?;
        let unique_indices: Vec<String> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(1)?, row.get::<_, i32>(2)?))
            })?
            .filter_map(|r| r.ok())
            .filter(|(_, is_unique)| *is_unique == 1)
            .map(|(name, _)| name)
            .collect();

        let mut live_unique_column_sets: Vec<Vec<String>> = Vec::new();
        for index_name in &unique_indices {
            let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
            let mut cols: Vec<String> = idx_stmt
                .query_map([], |row| row.get::<_, String>(2))?
                .filter_map(|r| r.ok())
                .collect();
            cols.sort();
            live_unique_column_sets.push(cols);
        }

        for expected_columns in table.unique_constraints {
            let mut expected_sorted: Vec<&str> = expected_columns.to_vec();
            expected_sorted.sort_unstable();

            let found = live_unique_column_sets.iter().any(|live_cols| {
                live_cols.iter().map(|s| s.as_str()).collect::<Vec<_>>() == expected_sorted
            });
            if !found {
                bail!(
                    "Table {} is missing unique constraint on columns ({})",
                    table.name,
                    expected_columns.join(", ")
                );
            }
        }
        Ok(())
    }

    fn validate_foreign_keys(conn: &Connection, table: &Table) -> Result<()> {
        // PRAGMA foreign_key_list: id, seq, table, from, to, on_update, on_delete, match
        let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", table.name))?;
        let live_fks: Vec<LiveForeignKey> = stmt
            .query_map([], |row| {
                Ok(LiveForeignKey {
                    from_column: row.get(3)?,
                    to_table: row.get(2)?,
                    to_column: row.get(4)?,
                    on_delete: row.get(6)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        for column in table.columns {
            let Some(expected_fk) = column.foreign_key else {
                continue;
            };
            let expected_on_delete = expected_fk.on_delete.as_sql();
            let found = live_fks.iter().any(|live| {
                live.from_column == column.name
                    && live.to_table == expected_fk.foreign_table
                    && live.to_column == expected_fk.foreign_column
                    && live.on_delete == expected_on_delete
            });
            if found {
                continue;
            }
            match live_fks.iter().find(|live| live.from_column == column.name) {
                Some(live) => bail!(
                    "Table {} column {} has foreign key mismatch: expected REFERENCES {}({}) ON DELETE {}, got REFERENCES {}({}) ON DELETE {}",
                    table.name,
                    column.name,
                    expected_fk.foreign_table,
                    expected_fk.foreign_column,
                    expected_on_delete,
                    live.to_table,
                    live.to_column,
                    live.on_delete
                ),
                None => bail!(
                    "Table {} column {} is missing foreign key: expected REFERENCES {}({}) ON DELETE {}",
                    table.name,
                    column.name,
                    expected_fk.foreign_table,
                    expected_fk.foreign_column,
                    expected_on_delete
                ),
            }
        }
        Ok(())
    }
}
