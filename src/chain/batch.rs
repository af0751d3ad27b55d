/// Tolerant concurrent reads
///
/// All reads run together; a failed read yields `None` for its key instead of
/// failing the whole batch.
use crate::errors::ChainResult;
use crate::logger::{self, LogTag};
use futures::future::join_all;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

pub type BatchResult<K, V> = HashMap<K, Option<V>>;

pub async fn batch_read<K, V, F>(reads: Vec<(K, F)>) -> BatchResult<K, V>
where
    K: Eq + Hash + Debug,
    F: Future<Output = ChainResult<V>>,
{
    let (keys, futures): (Vec<K>, Vec<F>) = reads.into_iter().unzip();
    let results = join_all(futures).await;

    keys.into_iter()
        .zip(results)
        .map(|(key, result)| match result {
            Ok(value) => (key, Some(value)),
            Err(e) => {
                logger::warning(LogTag::Chain, &format!("Batch read {:?} failed: {}", key, e));
                (key, None)
            }
        })
        .collect()
}
