//! Catalog query sets for the Postgres family.
//!
//! Every template takes `{schemas}` (the search path or a single resolved
//! schema) and most take `{table_filter}`. CockroachDB starts from the Postgres
//! set and swaps out the statements that rely on `information_schema._pg_*`
//! helpers or `pg_attribute.attgenerated`.

/// One catalog statement plus the column its table filter applies to.
#[derive(Debug, Clone, Copy)]
pub struct CatalogQuery {
    pub sql: &'static str,
    pub table_column: &'static str,
}

/// The statements one Postgres flavor uses.
#[derive(Debug, Clone, Copy)]
pub struct PgQueries {
    /// `table_name`, `table_schema`, `comment`
    pub tables: CatalogQuery,
    /// `table_schema` for a `{table}` bound by name
    pub locate_table: CatalogQuery,
    /// `table_name`, `column_name`, `table_schema`
    pub columns: CatalogQuery,
    /// one row per column, see [`POSTGRES`] for the column list
    pub column_info: CatalogQuery,
    /// single-column primary/unique/foreign constraints per column
    pub constraints: CatalogQuery,
    /// primary key columns in key order
    pub primary: CatalogQuery,
    pub foreign_keys: CatalogQuery,
}

pub const POSTGRES: PgQueries = PgQueries {
    tables: CatalogQuery {
        sql: r#"
            SELECT rel.relname AS table_name,
                   ns.nspname AS table_schema,
                   des.description AS comment
            FROM pg_catalog.pg_class rel
            JOIN pg_catalog.pg_namespace ns ON ns.oid = rel.relnamespace
            LEFT JOIN pg_catalog.pg_description des
              ON des.objoid = rel.oid AND des.objsubid = 0
            WHERE rel.relkind IN ('r', 'p')
              AND ns.nspname IN ({schemas})
              {table_filter}
            ORDER BY rel.relname, ns.nspname
        "#,
        table_column: "rel.relname",
    },
    locate_table: CatalogQuery {
        sql: r#"
            SELECT ns.nspname AS table_schema
            FROM pg_catalog.pg_class rel
            JOIN pg_catalog.pg_namespace ns ON ns.oid = rel.relnamespace
            WHERE rel.relkind IN ('r', 'p')
              AND ns.nspname IN ({schemas})
              AND rel.relname = {table}
        "#,
        table_column: "rel.relname",
    },
    columns: CatalogQuery {
        sql: r#"
            SELECT rel.relname AS table_name,
                   att.attname AS column_name,
                   ns.nspname AS table_schema
            FROM pg_catalog.pg_attribute att
            JOIN pg_catalog.pg_class rel ON rel.oid = att.attrelid
            JOIN pg_catalog.pg_namespace ns ON ns.oid = rel.relnamespace
            WHERE rel.relkind IN ('r', 'p')
              AND att.attnum > 0
              AND NOT att.attisdropped
              AND ns.nspname IN ({schemas})
              {table_filter}
            ORDER BY rel.relname, att.attnum
        "#,
        table_column: "rel.relname",
    },
    column_info: CatalogQuery {
        sql: r#"
            SELECT att.attname AS column_name,
                   rel.relname AS table_name,
                   ns.nspname AS table_schema,
                   pg_catalog.format_type(att.atttypid, NULL) AS data_type,
                   CASE WHEN att.attgenerated = ''
                        THEN pg_catalog.pg_get_expr(ad.adbin, ad.adrelid) END AS default_value,
                   att.attgenerated = 's' AS is_generated,
                   CASE WHEN att.attgenerated = 's'
                        THEN pg_catalog.pg_get_expr(ad.adbin, ad.adrelid) END AS generation_expression,
                   att.attidentity IN ('a', 'd') AS is_identity,
                   NOT att.attnotnull AS is_nullable,
                   information_schema._pg_char_max_length(
                       information_schema._pg_truetypid(att.*, typ.*),
                       information_schema._pg_truetypmod(att.*, typ.*))::int8 AS max_length,
                   information_schema._pg_numeric_precision(
                       information_schema._pg_truetypid(att.*, typ.*),
                       information_schema._pg_truetypmod(att.*, typ.*))::int8 AS numeric_precision,
                   information_schema._pg_numeric_scale(
                       information_schema._pg_truetypid(att.*, typ.*),
                       information_schema._pg_truetypmod(att.*, typ.*))::int8 AS numeric_scale,
                   des.description AS comment,
                   (SELECT array_agg(e.enumlabel::text ORDER BY e.enumsortorder)
                    FROM pg_catalog.pg_enum e
                    WHERE e.enumtypid = att.atttypid) AS enum_values
            FROM pg_catalog.pg_attribute att
            JOIN pg_catalog.pg_class rel ON rel.oid = att.attrelid
            JOIN pg_catalog.pg_namespace ns ON ns.oid = rel.relnamespace
            JOIN pg_catalog.pg_type typ ON typ.oid = att.atttypid
            LEFT JOIN pg_catalog.pg_attrdef ad
              ON ad.adrelid = att.attrelid AND ad.adnum = att.attnum
            LEFT JOIN pg_catalog.pg_description des
              ON des.objoid = att.attrelid AND des.objsubid = att.attnum
            WHERE rel.relkind IN ('r', 'p')
              AND att.attnum > 0
              AND NOT att.attisdropped
              AND ns.nspname IN ({schemas})
              {table_filter}
            ORDER BY rel.relname, att.attnum
        "#,
        table_column: "rel.relname",
    },
    constraints: CatalogQuery {
        sql: r#"
            SELECT con.contype::text AS constraint_type,
                   con.conname AS constraint_name,
                   rel.relname AS table_name,
                   ns.nspname AS table_schema,
                   att.attname AS column_name,
                   array_length(con.conkey, 1) AS key_count,
                   fns.nspname AS foreign_key_schema,
                   frel.relname AS foreign_key_table,
                   fatt.attname AS foreign_key_column
            FROM pg_catalog.pg_constraint con
            JOIN pg_catalog.pg_class rel ON rel.oid = con.conrelid
            JOIN pg_catalog.pg_namespace ns ON ns.oid = rel.relnamespace
            JOIN pg_catalog.pg_attribute att
              ON att.attrelid = con.conrelid AND att.attnum = ANY (con.conkey)
            LEFT JOIN pg_catalog.pg_class frel ON frel.oid = con.confrelid
            LEFT JOIN pg_catalog.pg_namespace fns ON fns.oid = frel.relnamespace
            LEFT JOIN pg_catalog.pg_attribute fatt
              ON fatt.attrelid = con.confrelid
             AND fatt.attnum = con.confkey[array_position(con.conkey, att.attnum)]
            WHERE con.contype IN ('p', 'u', 'f')
              AND ns.nspname IN ({schemas})
              {table_filter}
            ORDER BY con.conname, array_position(con.conkey, att.attnum)
        "#,
        table_column: "rel.relname",
    },
    primary: CatalogQuery {
        sql: r#"
            SELECT att.attname AS column_name
            FROM pg_catalog.pg_constraint con
            JOIN pg_catalog.pg_class rel ON rel.oid = con.conrelid
            JOIN pg_catalog.pg_namespace ns ON ns.oid = rel.relnamespace
            JOIN pg_catalog.pg_attribute att
              ON att.attrelid = con.conrelid AND att.attnum = ANY (con.conkey)
            WHERE con.contype = 'p'
              AND ns.nspname IN ({schemas})
              {table_filter}
            ORDER BY array_position(con.conkey, att.attnum)
        "#,
        table_column: "rel.relname",
    },
    foreign_keys: CatalogQuery {
        sql: r#"
            SELECT con.conname AS constraint_name,
                   rel.relname AS table_name,
                   ns.nspname AS table_schema,
                   att.attname AS column_name,
                   fns.nspname AS foreign_key_schema,
                   frel.relname AS foreign_key_table,
                   fatt.attname AS foreign_key_column,
                   CASE con.confupdtype
                        WHEN 'a' THEN 'NO ACTION'
                        WHEN 'r' THEN 'RESTRICT'
                        WHEN 'c' THEN 'CASCADE'
                        WHEN 'n' THEN 'SET NULL'
                        WHEN 'd' THEN 'SET DEFAULT'
                   END AS on_update,
                   CASE con.confdeltype
                        WHEN 'a' THEN 'NO ACTION'
                        WHEN 'r' THEN 'RESTRICT'
                        WHEN 'c' THEN 'CASCADE'
                        WHEN 'n' THEN 'SET NULL'
                        WHEN 'd' THEN 'SET DEFAULT'
                   END AS on_delete
            FROM pg_catalog.pg_constraint con
            JOIN pg_catalog.pg_class rel ON rel.oid = con.conrelid
            JOIN pg_catalog.pg_namespace ns ON ns.oid = rel.relnamespace
            JOIN pg_catalog.pg_attribute att
              ON att.attrelid = con.conrelid AND att.attnum = ANY (con.conkey)
            JOIN pg_catalog.pg_class frel ON frel.oid = con.confrelid
            JOIN pg_catalog.pg_namespace fns ON fns.oid = frel.relnamespace
            JOIN pg_catalog.pg_attribute fatt
              ON fatt.attrelid = con.confrelid
             AND fatt.attnum = con.confkey[array_position(con.conkey, att.attnum)]
            WHERE con.contype = 'f'
              AND ns.nspname IN ({schemas})
              {table_filter}
            ORDER BY rel.relname, con.conname, array_position(con.conkey, att.attnum)
        "#,
        table_column: "rel.relname",
    },
};

pub const COCKROACH: PgQueries = PgQueries {
    tables: CatalogQuery {
        sql: r#"
            SELECT t.table_name AS table_name,
                   t.table_schema AS table_schema,
                   pg_catalog.obj_description(
                       (quote_ident(t.table_schema) || '.' || quote_ident(t.table_name))::regclass::oid,
                       'pg_class') AS comment
            FROM information_schema.tables t
            WHERE t.table_type = 'BASE TABLE'
              AND t.table_schema IN ({schemas})
              {table_filter}
            ORDER BY t.table_name, t.table_schema
        "#,
        table_column: "t.table_name",
    },
    locate_table: CatalogQuery {
        sql: r#"
            SELECT t.table_schema AS table_schema
            FROM information_schema.tables t
            WHERE t.table_type = 'BASE TABLE'
              AND t.table_schema IN ({schemas})
              AND t.table_name = {table}
        "#,
        table_column: "t.table_name",
    },
    columns: CatalogQuery {
        sql: r#"
            SELECT c.table_name AS table_name,
                   c.column_name AS column_name,
                   c.table_schema AS table_schema
            FROM information_schema.columns c
            JOIN information_schema.tables t
              ON t.table_schema = c.table_schema
             AND t.table_name = c.table_name
             AND t.table_type = 'BASE TABLE'
            WHERE c.is_hidden = 'NO'
              AND c.table_schema IN ({schemas})
              {table_filter}
            ORDER BY c.table_name, c.ordinal_position
        "#,
        table_column: "c.table_name",
    },
    column_info: CatalogQuery {
        sql: r#"
            SELECT c.column_name AS column_name,
                   c.table_name AS table_name,
                   c.table_schema AS table_schema,
                   c.data_type AS data_type,
                   CASE WHEN c.is_generated = 'ALWAYS' THEN NULL
                        ELSE c.column_default END AS default_value,
                   c.is_generated = 'ALWAYS' AS is_generated,
                   NULLIF(c.generation_expression, '') AS generation_expression,
                   c.is_identity = 'YES' AS is_identity,
                   c.is_nullable = 'YES' AS is_nullable,
                   c.character_maximum_length::int8 AS max_length,
                   c.numeric_precision::int8 AS numeric_precision,
                   c.numeric_scale::int8 AS numeric_scale,
                   pg_catalog.col_description(
                       (quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass::oid,
                       c.ordinal_position::int) AS comment,
                   (SELECT array_agg(e.enumlabel::text ORDER BY e.enumsortorder)
                    FROM pg_catalog.pg_enum e
                    JOIN pg_catalog.pg_type typ ON typ.oid = e.enumtypid
                    JOIN pg_catalog.pg_namespace tns ON tns.oid = typ.typnamespace
                    WHERE typ.typname = c.udt_name
                      AND tns.nspname = c.udt_schema) AS enum_values
            FROM information_schema.columns c
            JOIN information_schema.tables t
              ON t.table_schema = c.table_schema
             AND t.table_name = c.table_name
             AND t.table_type = 'BASE TABLE'
            WHERE c.is_hidden = 'NO'
              AND c.table_schema IN ({schemas})
              {table_filter}
            ORDER BY c.table_name, c.ordinal_position
        "#,
        table_column: "c.table_name",
    },
    ..POSTGRES
};
