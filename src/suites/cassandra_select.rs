//! Select conformance for the wide-store connector: what the query engine
//! returns for tables and materialized views living in the native store.

use chrono::{DateTime, TimeZone, Utc};

use crate::engine::backend::Query;
use crate::engine::compare::{CompareMode, FloatPolicy};
use crate::engine::errors::HarnessError;
use crate::engine::runner::{CaseFuture, TestCase, TestContext};
use crate::engine::types::{Cell, ColumnType, ResultSet, Row};
use crate::row;

pub const GROUP: &str = "cassandra";

const ALL_TYPES_COLUMNS: &str =
    "a, b, bl, bo, d, do, f, fr, i, integer, l, m, s, t, ti, tu, u, v, vari";

const ALL_TYPES_TAGS: [ColumnType; 19] = [
    ColumnType::Varchar,
    ColumnType::Bigint,
    ColumnType::Varbinary,
    ColumnType::Boolean,
    ColumnType::Double,
    ColumnType::Double,
    ColumnType::Real,
    ColumnType::Varchar,
    ColumnType::Varchar,
    ColumnType::Integer,
    ColumnType::Varchar,
    ColumnType::Varchar,
    ColumnType::Varchar,
    ColumnType::Varchar,
    ColumnType::Timestamp,
    ColumnType::Varchar,
    ColumnType::Varchar,
    ColumnType::Varchar,
    ColumnType::Varchar,
];

pub fn cases() -> Vec<TestCase> {
    vec![
        case("select_nation", "nation", |ctx| Box::pin(select_nation(ctx))),
        case("select_with_equality_filter_on_partition_key", "nation", |ctx| {
            Box::pin(select_with_equality_filter_on_partition_key(ctx))
        }),
        case("select_with_range_filter_on_partition_key", "nation", |ctx| {
            Box::pin(select_with_range_filter_on_partition_key(ctx))
        }),
        case("select_with_equality_filter_on_regular_column", "nation", |ctx| {
            Box::pin(select_with_equality_filter_on_regular_column(ctx))
        }),
        case("select_with_range_filter_on_regular_column", "nation", |ctx| {
            Box::pin(select_with_range_filter_on_regular_column(ctx))
        }),
        case("select_supplier_by_key", "supplier", |ctx| {
            Box::pin(select_supplier_by_key(ctx))
        }),
        case("select_supplier_by_name", "supplier", |ctx| {
            Box::pin(select_supplier_by_name(ctx))
        }),
        case("select_all_types", "all_types", |ctx| Box::pin(select_all_types(ctx))),
        case("nation_join_nation", "nation", |ctx| Box::pin(nation_join_nation(ctx))),
        case("nation_join_region", "nation", |ctx| Box::pin(nation_join_region(ctx))),
        case("all_types_partitioned_view", "all_types", |ctx| {
            Box::pin(all_types_partitioned_view(ctx))
        }),
        case("supplier_clustering_view", "supplier", |ctx| {
            Box::pin(supplier_clustering_view(ctx))
        }),
    ]
}

fn case<F>(name: &str, fixture: &str, body: F) -> TestCase
where
    F: for<'a> Fn(&'a mut TestContext) -> CaseFuture<'a> + Send + Sync + 'static,
{
    TestCase::new(name, body).in_group(GROUP).requires(fixture)
}

async fn select_nation(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let expected = ctx.fixture("nation")?.reference_result()?;
    let sql = format!(
        "SELECT n_nationkey, n_name, n_regionkey, n_comment FROM {}",
        ctx.table("nation")
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual).matches(&expected)?;
    Ok(())
}

async fn select_with_equality_filter_on_partition_key(
    ctx: &mut TestContext,
) -> Result<(), HarnessError> {
    let sql = format!(
        "SELECT n_nationkey FROM {} WHERE n_nationkey = 0",
        ctx.table("nation")
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual).contains_only([row![0i64]])?;
    Ok(())
}

async fn select_with_range_filter_on_partition_key(
    ctx: &mut TestContext,
) -> Result<(), HarnessError> {
    let sql = format!(
        "SELECT n_nationkey FROM {} WHERE n_nationkey > 23",
        ctx.table("nation")
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual).contains_only([row![24i64]])?;
    Ok(())
}

async fn select_with_equality_filter_on_regular_column(
    ctx: &mut TestContext,
) -> Result<(), HarnessError> {
    let sql = format!(
        "SELECT n_name FROM {} WHERE n_name = 'UNITED STATES'",
        ctx.table("nation")
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual).contains_only([row!["UNITED STATES"]])?;
    Ok(())
}

async fn select_with_range_filter_on_regular_column(
    ctx: &mut TestContext,
) -> Result<(), HarnessError> {
    let sql = format!("SELECT n_name FROM {} WHERE n_name < 'B'", ctx.table("nation"));
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual)
        .contains_only([row!["ALGERIA"], row!["ARGENTINA"]])?;
    Ok(())
}

async fn select_supplier_by_key(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let sql = format!(
        "SELECT s_suppkey FROM {} WHERE s_suppkey = 10",
        ctx.table("supplier")
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual).contains_only([row![10i64]])?;
    Ok(())
}

async fn select_supplier_by_name(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let sql = format!(
        "SELECT s_suppkey FROM {} WHERE s_name = 'Supplier#000000010'",
        ctx.table("supplier")
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual).contains_only([row![10i64]])?;
    Ok(())
}

fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(year, month, day, hour, min, sec) {
        chrono::LocalResult::Single(ts) => ts,
        _ => panic!("invalid timestamp literal {}-{}-{} {}:{}:{}", year, month, day, hour, min, sec),
    }
}

/// Row keyed `"\0"`: every column at its minimum or zero value.
pub fn all_types_min_row() -> Row {
    Row::new(vec![
        Cell::from("\0"),
        Cell::from(i64::MIN),
        Cell::from(vec![0x00u8]),
        Cell::from(false),
        Cell::from(0.0f64),
        Cell::from(f64::from_bits(1)),
        Cell::from(f32::from_bits(1)),
        Cell::from("[0]"),
        Cell::from("0.0.0.0"),
        Cell::from(i32::MIN),
        Cell::from("[0]"),
        Cell::from("{\"\\u0000\":-2147483648,\"a\":0}"),
        Cell::from("[0]"),
        Cell::from("\0"),
        Cell::from(utc(1970, 1, 1, 0, 0, 0)),
        Cell::from("d2177dd0-eaa2-11de-a572-001b779c76e3"),
        Cell::from("01234567-0123-0123-0123-0123456789ab"),
        Cell::from("\0"),
        Cell::from(i64::MIN.to_string()),
    ])
}

/// Row keyed by the pangram: every column at its maximum value.
pub fn all_types_max_row() -> Row {
    Row::new(vec![
        Cell::from("the quick brown fox jumped over the lazy dog"),
        Cell::from(i64::MAX),
        Cell::from(b"01234".to_vec()),
        Cell::from(true),
        Cell::from(1e38f64),
        Cell::from(f64::MAX),
        Cell::from(f32::MAX),
        Cell::from("[4,5,6,7]"),
        Cell::from("255.255.255.255"),
        Cell::from(i32::MAX),
        Cell::from("[4,5,6]"),
        Cell::from("{\"a\":1,\"b\":2}"),
        Cell::from("[4,5,6]"),
        Cell::from("this is a text value"),
        Cell::from(utc(9999, 12, 31, 23, 59, 59)),
        Cell::from("d2177dd0-eaa2-11de-a572-001b779c76e3"),
        Cell::from("01234567-0123-0123-0123-0123456789ab"),
        Cell::from("abc"),
        Cell::from(i64::MAX.to_string()),
    ])
}

/// Row keyed `"def"` with every other column null.
pub fn all_types_null_row() -> Row {
    let mut cells = vec![Cell::from("def")];
    cells.extend(std::iter::repeat_n(Cell::Null, ALL_TYPES_TAGS.len() - 1));
    Row::new(cells)
}

async fn select_all_types(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let sql = format!(
        "SELECT {} FROM {}",
        ALL_TYPES_COLUMNS,
        ctx.table("all_types")
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual)
        .has_columns(&ALL_TYPES_TAGS)?
        .contains_only([all_types_min_row(), all_types_max_row(), all_types_null_row()])?;
    Ok(())
}

async fn nation_join_nation(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let nation = ctx.table("nation");
    let sql = format!(
        "SELECT n1.n_name, n2.n_regionkey FROM {} n1 JOIN {} n2 \
         ON n1.n_nationkey = n2.n_regionkey WHERE n1.n_nationkey = 3",
        nation, nation
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual)
        .contains_only(vec![row!["CANADA", 3i64]; 5])?;
    Ok(())
}

async fn nation_join_region(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let sql = format!(
        "SELECT c.n_name, t.name FROM {} c JOIN tpch.tiny.region t \
         ON c.n_regionkey = t.regionkey WHERE c.n_nationkey = 3",
        ctx.table("nation")
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual)
        .contains_only([row!["CANADA", "AMERICA"]])?;
    Ok(())
}

/// Drops any leftover view, creates it, registers its drop, and waits until
/// the engine lists it and the store reports it built.
async fn create_view(ctx: &mut TestContext, view: &str, create: String) -> Result<(), HarnessError> {
    let drop = Query::native(format!(
        "DROP MATERIALIZED VIEW IF EXISTS {}",
        ctx.table(view).native()
    ));
    ctx.query(&drop).await?;
    ctx.defer(drop);
    ctx.native(create).await?;

    let listed = ResultSet::from_rows(vec![row![view]])?;
    let show = Query::engine(format!(
        "SHOW TABLES FROM {}.{}",
        ctx.vars().catalog,
        ctx.vars().keyspace
    ));
    ctx.await_match(&show, &listed, CompareMode::Contains).await?;

    let built = ResultSet::from_rows(vec![row![true]])?;
    let status = Query::engine(format!(
        "SELECT status_replicated FROM {}.system.built_views WHERE view_name = '{}'",
        ctx.vars().catalog,
        view
    ));
    ctx.await_match(&status, &built, CompareMode::Contains).await?;
    Ok(())
}

async fn all_types_partitioned_view(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let view = "all_types_partitioned_mv";
    let create = format!(
        "CREATE MATERIALIZED VIEW {} AS SELECT * FROM {} \
         WHERE b IS NOT NULL PRIMARY KEY (a, b)",
        ctx.table(view).native(),
        ctx.table("all_types").native()
    );
    create_view(ctx, view, create).await?;

    let sql = format!(
        "SELECT {} FROM {} WHERE a = '\0'",
        ALL_TYPES_COLUMNS,
        ctx.table(view)
    );
    let actual = ctx.engine(sql).await?;
    ctx.assert_that(&actual)
        .has_columns(&ALL_TYPES_TAGS)?
        .contains_only([all_types_min_row()])?;
    Ok(())
}

async fn supplier_clustering_view(ctx: &mut TestContext) -> Result<(), HarnessError> {
    let view = "clustering_mv";
    let create = format!(
        "CREATE MATERIALIZED VIEW {} AS SELECT * FROM {} \
         WHERE s_nationkey IS NOT NULL PRIMARY KEY (s_nationkey, s_suppkey) \
         WITH CLUSTERING ORDER BY (s_nationkey DESC)",
        ctx.table(view).native(),
        ctx.table("supplier").native()
    );
    create_view(ctx, view, create).await?;

    // AVG over DOUBLE depends on summation order
    ctx.set_policy(FloatPolicy::Relative(1e-9));

    let aggregate = format!(
        "SELECT MAX(s_nationkey), SUM(s_suppkey), AVG(s_acctbal) FROM {} \
         WHERE s_suppkey BETWEEN 1 AND 10",
        ctx.table(view)
    );
    let actual = ctx.engine(aggregate).await?;
    ctx.assert_that(&actual)
        .contains_only([row![24i64, 55i64, 4334.653f64]])?;

    let first = format!(
        "SELECT s_nationkey, s_suppkey, s_acctbal FROM {} WHERE s_nationkey = 1 LIMIT 1",
        ctx.table(view)
    );
    let actual = ctx.engine(first).await?;
    ctx.assert_that(&actual)
        .contains_only([row![1i64, 3i64, 4192.4f64]])?;
    Ok(())
}
