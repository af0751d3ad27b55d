/// Expected output via the v4 quoter
///
/// Quotes are read-only calls, requested once per intent and never retried.
use super::config::QUOTE_HOOK_DATA;
use super::types::{to_u128, Quote, SwapIntent};
use crate::amounts::TokenAmount;
use crate::chain::{abi, ChainReader};
use crate::errors::{ChainError, ChainResult, FailureKind, FailureStage, SwapFailure};
use crate::logger::{self, LogTag};
use crate::pool::PoolKey;
use alloy::primitives::{Address, Bytes, U256};
use chrono::Utc;
use std::sync::Arc;

pub struct QuoteService {
    reader: Arc<dyn ChainReader>,
    quoter: Address,
}

impl QuoteService {
    pub fn new(reader: Arc<dyn ChainReader>, quoter: Address) -> Self {
        Self { reader, quoter }
    }

    /// Output amount for selling `amount_in` of currency0 (`zero_for_one`) or
    /// currency1 into `pool_key`
    pub async fn get_quote(
        &self,
        pool_key: &PoolKey,
        zero_for_one: bool,
        amount_in: u128,
    ) -> ChainResult<U256> {
        let params = abi::QuoteExactSingleParams {
            poolKey: pool_key.to_abi(),
            zeroForOne: zero_for_one,
            exactAmount: amount_in,
            hookData: Bytes::from_static(&QUOTE_HOOK_DATA),
        };

        let amount_out = self
            .reader
            .quote_exact_input_single(self.quoter, params)
            .await?;

        logger::debug(
            LogTag::Quote,
            &format!(
                "Quoted {} in (zero_for_one={}) -> {} out",
                amount_in, zero_for_one, amount_out
            ),
        );
        Ok(amount_out)
    }

    /// Quote an intent against `pool_key`, classifying any failure
    pub async fn quote_intent(
        &self,
        pool_key: &PoolKey,
        intent: &SwapIntent,
    ) -> Result<Quote, SwapFailure> {
        let zero_for_one = pool_key.zero_for_one(intent.input_token).ok_or_else(|| {
            SwapFailure::new(
                FailureKind::QuoteFailure,
                format!("token {} is not part of the pool", intent.input_token),
            )
        })?;
        let amount_in = to_u128(intent.amount_in, "amount")
            .map_err(|e| SwapFailure::new(FailureKind::QuoteFailure, e.to_string()))?;

        let amount_out = self
            .get_quote(pool_key, zero_for_one, amount_in)
            .await
            .map_err(|e: ChainError| {
                logger::warning(LogTag::Quote, &format!("Quote failed: {}", e));
                SwapFailure::classify(FailureStage::Quote, &e)
            })?;

        Ok(Quote {
            amount_in: intent.amount_in,
            amount_out,
            zero_for_one,
            pool_key: *pool_key,
            quoted_at: Utc::now(),
        })
    }
}

/// One-line quote summary for the log and CLI
pub fn describe_quote(quote: &Quote, input_decimals: u8, output_decimals: u8) -> String {
    let amount_in = TokenAmount::new(quote.amount_in, input_decimals);
    let amount_out = TokenAmount::new(quote.amount_out, output_decimals);
    match crate::amounts::display_price(&amount_out, &amount_in) {
        Some(price) => format!("{} -> {} (price {:.6})", amount_in, amount_out, price),
        None => format!("{} -> {}", amount_in, amount_out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChain;
    use alloy::primitives::address;

    const CELO: Address = address!("0x471EcE3750Da237f93B8E339c536989b8978a438");
    const BTK: Address = address!("0x1111111111111111111111111111111111111111");
    const QUOTER: Address = address!("0x3333333333333333333333333333333333333333");

    fn pool_key() -> PoolKey {
        PoolKey::from_unsorted(CELO, BTK, 500, 60, Address::ZERO).unwrap()
    }

    #[tokio::test]
    async fn direction_comes_from_sorted_key() {
        let chain = Arc::new(MockChain::new(Address::ZERO));
        chain.set_quote(U256::from(995u64));
        let service = QuoteService::new(chain.clone(), QUOTER);

        let intent = SwapIntent::new(CELO, BTK, U256::from(1_000u64), None).unwrap();
        let quote = service.quote_intent(&pool_key(), &intent).await.unwrap();

        // CELO sorts after BTK, so selling CELO is one-for-zero
        assert!(!quote.zero_for_one);
        assert_eq!(quote.amount_out, U256::from(995u64));
        assert_eq!(quote.input_currency(), CELO);
        assert_eq!(quote.output_currency(), BTK);

        let requests = chain.quote_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].exactAmount, 1_000u128);
        assert!(!requests[0].zeroForOne);
        assert!(requests[0].hookData.is_empty());
    }

    #[tokio::test]
    async fn reverting_quoter_is_a_quote_failure() {
        let chain = Arc::new(MockChain::new(Address::ZERO));
        chain.fail_quotes("execution reverted: PoolNotInitialized()");
        let service = QuoteService::new(chain, QUOTER);

        let intent = SwapIntent::new(CELO, BTK, U256::from(1_000u64), None).unwrap();
        let failure = service.quote_intent(&pool_key(), &intent).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::QuoteFailure);
        assert!(failure.message.contains("PoolNotInitialized"));
    }

    #[test]
    fn summary_uses_token_decimals() {
        let quote = Quote {
            amount_in: U256::from(2_000_000_000_000_000_000u128),
            amount_out: U256::from(2_100u64),
            zero_for_one: false,
            pool_key: pool_key(),
            quoted_at: Utc::now(),
        };
        assert_eq!(describe_quote(&quote, 18, 2), "2 -> 21 (price 10.500000)");
    }
}
