mod versioned_schema;

pub use versioned_schema::{
    dependents_of, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    BASE_DB_VERSION, DEFAULT_TIMESTAMP,
};
