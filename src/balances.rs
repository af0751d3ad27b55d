/// Balance panel reads for the two pool tokens
use crate::amounts::TokenAmount;
use crate::chain::{batch_read, ChainReader};
use crate::config::TokensConfig;
use crate::logger::{self, LogTag};
use crate::utils::short_address;
use alloy::primitives::Address;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BalanceField {
    Input,
    Output,
}

/// Both token balances of one account; `None` marks a read that failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub owner: Address,
    pub input_symbol: String,
    pub input: Option<TokenAmount>,
    pub output_symbol: String,
    pub output: Option<TokenAmount>,
}

impl BalanceSnapshot {
    pub fn is_complete(&self) -> bool {
        self.input.is_some() && self.output.is_some()
    }
}

impl std::fmt::Display for BalanceSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let render = |amount: &Option<TokenAmount>| match amount {
            Some(amount) => amount.display(4),
            None => "unavailable".to_string(),
        };
        write!(
            f,
            "{}: {} | {}: {}",
            self.input_symbol,
            render(&self.input),
            self.output_symbol,
            render(&self.output)
        )
    }
}

/// Read both balances concurrently, tolerating individual failures
pub async fn read_balances(
    reader: &dyn ChainReader,
    owner: Address,
    tokens: &TokensConfig,
) -> BalanceSnapshot {
    let reads = vec![
        (BalanceField::Input, reader.balance_of(tokens.input.address, owner)),
        (BalanceField::Output, reader.balance_of(tokens.output.address, owner)),
    ];
    let results = batch_read(reads).await;

    let amount = |field: BalanceField, decimals: u8| {
        results
            .get(&field)
            .copied()
            .flatten()
            .map(|raw| TokenAmount::new(raw, decimals))
    };

    let snapshot = BalanceSnapshot {
        owner,
        input_symbol: tokens.input.symbol.clone(),
        input: amount(BalanceField::Input, tokens.input.decimals),
        output_symbol: tokens.output.symbol.clone(),
        output: amount(BalanceField::Output, tokens.output.decimals),
    };

    logger::debug(
        LogTag::Wallet,
        &format!("Balances of {}: {}", short_address(&owner), snapshot),
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChain;
    use alloy::primitives::{address, U256};

    const OWNER: Address = address!("0x00000000000000000000000000000000000000aa");

    fn tokens() -> TokensConfig {
        let mut tokens = TokensConfig::default();
        tokens.output.address = address!("0x1111111111111111111111111111111111111111");
        tokens
    }

    #[tokio::test]
    async fn reads_both_balances_with_decimals() {
        let tokens = tokens();
        let chain = MockChain::new(OWNER);
        chain.set_balance(
            tokens.input.address,
            OWNER,
            U256::from(1_500_000_000_000_000_000u128),
        );
        chain.set_balance(tokens.output.address, OWNER, U256::from(250u64));

        let snapshot = read_balances(&chain, OWNER, &tokens).await;
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.to_string(), "CELO: 1.5000 | BTK: 2.5000");
    }

    #[tokio::test]
    async fn one_failed_read_keeps_the_other() {
        let tokens = tokens();
        let chain = MockChain::new(OWNER);
        chain.set_balance(tokens.output.address, OWNER, U256::from(7u64));
        chain.fail_balance_reads(tokens.input.address);

        let snapshot = read_balances(&chain, OWNER, &tokens).await;
        assert_eq!(snapshot.input, None);
        assert_eq!(snapshot.output, Some(TokenAmount::new(U256::from(7u64), 2)));
        assert!(snapshot.to_string().starts_with("CELO: unavailable"));
    }
}
