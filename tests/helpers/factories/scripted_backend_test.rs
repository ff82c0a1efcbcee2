use super::ScriptedClientFactory;
use crate::engine::backend::{BackendId, ClientFactory, Query};
use crate::engine::errors::BackendError;
use crate::engine::types::ResultSet;
use crate::row;

#[tokio::test]
async fn replays_in_order_then_repeats_last() {
    let factory = ScriptedClientFactory::new();
    let q = Query::engine("SELECT 1");
    factory
        .respond(q.clone(), ResultSet::from_rows(vec![row![1i64]]).unwrap())
        .respond(q.clone(), ResultSet::from_rows(vec![row![2i64]]).unwrap());

    let mut client = factory.open(&BackendId::engine()).await.unwrap();
    let first = client.execute("SELECT 1").await.unwrap();
    let second = client.execute("SELECT  1").await.unwrap();
    let third = client.execute("SELECT 1").await.unwrap();

    assert_eq!(first.rows(), &[row![1i64]]);
    assert_eq!(second.rows(), &[row![2i64]]);
    assert_eq!(third.rows(), &[row![2i64]]);
    assert_eq!(factory.count(&q), 3);
}

#[tokio::test]
async fn unscripted_sql_returns_empty_and_is_logged() {
    let factory = ScriptedClientFactory::new();
    let mut client = factory.open(&BackendId::native()).await.unwrap();
    assert!(client.execute("DROP TABLE x").await.unwrap().is_empty());
    assert_eq!(factory.executed_sql(&BackendId::native()), vec!["DROP TABLE x"]);
    assert!(factory.executed_sql(&BackendId::engine()).is_empty());
}

#[tokio::test]
async fn closed_client_rejects_queries_and_counts_once() {
    let factory = ScriptedClientFactory::new();
    let mut client = factory.open(&BackendId::engine()).await.unwrap();
    client.close().await.unwrap();
    client.close().await.unwrap();

    let err = client.execute("SELECT 1").await.unwrap_err();
    assert!(matches!(err, BackendError::Closed(_)));
    assert_eq!(factory.opens(), 1);
    assert_eq!(factory.closes(), 1);
}
