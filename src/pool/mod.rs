//! Pool identity: canonical keys, packed encoding and pool ids

pub mod info;
pub mod key;

pub use info::PoolInfo;
pub use key::{
    compute_pool_id, encode_packed, sort_pair, PoolKey, MAX_INT24, MAX_UINT24, MIN_INT24,
    PACKED_KEY_LEN,
};
