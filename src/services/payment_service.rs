// Payment verification against Base chain state
//
// Confirms that a transaction carries an ERC-20 Transfer of the right token
// to the configured payment address before a hold or pending subscription is
// activated. The routine performs no writes; callers decide what a failure
// means (retry for not-yet-mined, surface for wrong recipient/amount).

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::{BaseRpcClient, ReceiptLog, TransactionReceipt};

/// keccak256("Transfer(address,address,uint256)")
const TRANSFER_EVENT_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// USDC contract on Base mainnet
const USDC_CONTRACT: &str = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913";

/// SNR token contract on Base mainnet
const SNR_CONTRACT: &str = "0x5f0a1e882bd2a6a1a3c0e5f3a77b1b2d94a35cca";

/// Accepted absolute drift between the expected USD amount and the decoded
/// USDC transfer amount
const USDC_AMOUNT_TOLERANCE: f64 = 0.01;

/// Tokens accepted for slot and subscription payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentToken {
    Usdc,
    Snr,
}

impl PaymentToken {
    pub fn symbol(&self) -> &'static str {
        match self {
            PaymentToken::Usdc => "USDC",
            PaymentToken::Snr => "SNR",
        }
    }

    pub fn contract(&self) -> &'static str {
        match self {
            PaymentToken::Usdc => USDC_CONTRACT,
            PaymentToken::Snr => SNR_CONTRACT,
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            PaymentToken::Usdc => 6,
            PaymentToken::Snr => 18,
        }
    }

    /// Parse a stored token symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if symbol.eq_ignore_ascii_case("USDC") {
            Some(PaymentToken::Usdc)
        } else if symbol.eq_ignore_ascii_case("SNR") {
            Some(PaymentToken::Snr)
        } else {
            None
        }
    }
}

impl fmt::Display for PaymentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Price in the chosen token's USD denomination. SNR payments carry a fixed
/// 20% discount; results normalize to two decimal places.
pub fn price_for_token(base_usd: Decimal, token: PaymentToken) -> Decimal {
    let price = match token {
        PaymentToken::Usdc => base_usd,
        PaymentToken::Snr => base_usd * Decimal::new(8, 1),
    };
    let mut price = price.round_dp(2);
    price.rescale(2);
    price
}

/// Decoded details of a verified Transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferDetails {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// The closed set of reasons a payment fails verification
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentFailure {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction not found (invalid hash or not yet mined)")]
    TxNotFound,

    #[error("Transaction reverted on-chain")]
    TxReverted,

    #[error("No {token} Transfer event found in transaction")]
    NoTransferEvent { token: &'static str },

    #[error("Transfer recipient {actual} does not match payment address {expected}")]
    WrongRecipient { expected: String, actual: String },

    #[error("Transfer amount {actual} does not match expected {expected}")]
    AmountMismatch { expected: f64, actual: f64 },
}

impl PaymentFailure {
    /// Stable machine-readable identifier for API responses
    pub fn code(&self) -> &'static str {
        match self {
            PaymentFailure::Rpc(_) => "rpc_error",
            PaymentFailure::TxNotFound => "tx_not_found",
            PaymentFailure::TxReverted => "tx_reverted",
            PaymentFailure::NoTransferEvent { .. } => "no_transfer_event",
            PaymentFailure::WrongRecipient { .. } => "wrong_recipient",
            PaymentFailure::AmountMismatch { .. } => "amount_mismatch",
        }
    }

    /// True for failures the caller may resolve by retrying later
    /// (transport trouble, transaction not yet mined)
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentFailure::Rpc(_) | PaymentFailure::TxNotFound)
    }
}

/// Fetch the receipt for `tx_hash` and check it satisfies a payment of
/// `expected_usd` in `token` to `pay_to`.
pub async fn verify_payment(
    rpc: &BaseRpcClient,
    tx_hash: &str,
    token: PaymentToken,
    expected_usd: f64,
    pay_to: &str,
) -> Result<TransferDetails, PaymentFailure> {
    let receipt = rpc
        .get_transaction_receipt(tx_hash)
        .await
        .map_err(|e| PaymentFailure::Rpc(e.to_string()))?
        .ok_or(PaymentFailure::TxNotFound)?;

    check_receipt(&receipt, token, expected_usd, pay_to)
}

/// Check an already-fetched receipt. Pure so it can be exercised without a
/// node: scans for the token's Transfer log, then validates recipient and
/// amount.
pub fn check_receipt(
    receipt: &TransactionReceipt,
    token: PaymentToken,
    expected_usd: f64,
    pay_to: &str,
) -> Result<TransferDetails, PaymentFailure> {
    if !receipt.succeeded() {
        return Err(PaymentFailure::TxReverted);
    }

    let transfer = receipt
        .logs
        .iter()
        .find_map(|log| decode_transfer(log, token))
        .ok_or(PaymentFailure::NoTransferEvent {
            token: token.symbol(),
        })?;

    if !transfer.to.eq_ignore_ascii_case(pay_to) {
        return Err(PaymentFailure::WrongRecipient {
            expected: pay_to.to_lowercase(),
            actual: transfer.to,
        });
    }

    match token {
        PaymentToken::Usdc => {
            // USDC is treated as 1:1 with its USD denomination
            if (transfer.amount - expected_usd).abs() > USDC_AMOUNT_TOLERANCE {
                return Err(PaymentFailure::AmountMismatch {
                    expected: expected_usd,
                    actual: transfer.amount,
                });
            }
            Ok(transfer)
        }
        PaymentToken::Snr => {
            // TODO: price SNR transfers against an oracle; until one exists
            // any nonzero amount is accepted
            if transfer.amount > 0.0 {
                Ok(transfer)
            } else {
                Err(PaymentFailure::AmountMismatch {
                    expected: expected_usd,
                    actual: transfer.amount,
                })
            }
        }
    }
}

/// Decode a log entry as a Transfer of `token`, or None when the log is for
/// another contract, another event, or malformed.
fn decode_transfer(log: &ReceiptLog, token: PaymentToken) -> Option<TransferDetails> {
    if !log.address.eq_ignore_ascii_case(token.contract()) {
        return None;
    }
    if log.topics.len() < 3 || !log.topics[0].eq_ignore_ascii_case(TRANSFER_EVENT_TOPIC) {
        return None;
    }

    let from = topic_to_address(&log.topics[1])?;
    let to = topic_to_address(&log.topics[2])?;
    let amount = decode_amount(&log.data, token.decimals())?;

    Some(TransferDetails { from, to, amount })
}

/// An indexed address topic is the address left-padded to 32 bytes; keep the
/// low 20 bytes.
fn topic_to_address(topic: &str) -> Option<String> {
    let hex = topic.strip_prefix("0x")?;
    if hex.len() != 64 {
        return None;
    }
    Some(format!("0x{}", hex[24..].to_lowercase()))
}

/// Decode the data field (a 32-byte big-endian uint) and scale it by the
/// token's decimal precision.
fn decode_amount(data: &str, decimals: u32) -> Option<f64> {
    let hex = data.strip_prefix("0x").unwrap_or(data);
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        return Some(0.0);
    }
    let units = u128::from_str_radix(trimmed, 16).ok()?;
    Some(units as f64 / 10f64.powi(decimals as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAY_TO: &str = "0x9a11aa22bb33cc44dd55ee66ff77889900aabbcc";
    const SENDER: &str = "0x1111111111111111111111111111111111111111";

    fn address_topic(address: &str) -> String {
        format!("0x{:0>64}", address.trim_start_matches("0x"))
    }

    fn transfer_log(contract: &str, from: &str, to: &str, units: u128) -> ReceiptLog {
        ReceiptLog {
            address: contract.to_string(),
            topics: vec![
                TRANSFER_EVENT_TOPIC.to_string(),
                address_topic(from),
                address_topic(to),
            ],
            data: format!("0x{:064x}", units),
        }
    }

    fn receipt_with(logs: Vec<ReceiptLog>) -> TransactionReceipt {
        TransactionReceipt {
            status: Some("0x1".to_string()),
            logs,
        }
    }

    #[test]
    fn usdc_exact_amount_passes() {
        let receipt = receipt_with(vec![transfer_log(USDC_CONTRACT, SENDER, PAY_TO, 119_200_000)]);
        let details = check_receipt(&receipt, PaymentToken::Usdc, 119.2, PAY_TO).unwrap();
        assert_eq!(details.from, SENDER);
        assert_eq!(details.to, PAY_TO);
        assert!((details.amount - 119.2).abs() < 1e-9);
    }

    #[test]
    fn usdc_amount_outside_tolerance_fails() {
        // 119.22 against an expected 119.20 is 0.02 off
        let receipt = receipt_with(vec![transfer_log(USDC_CONTRACT, SENDER, PAY_TO, 119_220_000)]);
        let err = check_receipt(&receipt, PaymentToken::Usdc, 119.2, PAY_TO).unwrap_err();
        assert!(matches!(err, PaymentFailure::AmountMismatch { .. }));
        assert_eq!(err.code(), "amount_mismatch");
        assert!(!err.is_retryable());
    }

    #[test]
    fn usdc_amount_within_tolerance_passes() {
        // 0.01 off exactly is still inside the accepted drift
        let receipt = receipt_with(vec![transfer_log(USDC_CONTRACT, SENDER, PAY_TO, 119_210_000)]);
        assert!(check_receipt(&receipt, PaymentToken::Usdc, 119.2, PAY_TO).is_ok());
    }

    #[test]
    fn wrong_recipient_fails_case_insensitively() {
        let other = "0x2222222222222222222222222222222222222222";
        let receipt = receipt_with(vec![transfer_log(USDC_CONTRACT, SENDER, other, 149_000_000)]);
        let err = check_receipt(&receipt, PaymentToken::Usdc, 149.0, PAY_TO).unwrap_err();
        assert!(matches!(err, PaymentFailure::WrongRecipient { .. }));

        // Same address in a different case is a match, not a mismatch
        let receipt = receipt_with(vec![transfer_log(USDC_CONTRACT, SENDER, PAY_TO, 149_000_000)]);
        let upper = PAY_TO.to_uppercase().replace("0X", "0x");
        assert!(check_receipt(&receipt, PaymentToken::Usdc, 149.0, &upper).is_ok());
    }

    #[test]
    fn reverted_transaction_fails_regardless_of_logs() {
        let mut receipt =
            receipt_with(vec![transfer_log(USDC_CONTRACT, SENDER, PAY_TO, 149_000_000)]);
        receipt.status = Some("0x0".to_string());
        let err = check_receipt(&receipt, PaymentToken::Usdc, 149.0, PAY_TO).unwrap_err();
        assert_eq!(err, PaymentFailure::TxReverted);

        receipt.status = None;
        let err = check_receipt(&receipt, PaymentToken::Usdc, 149.0, PAY_TO).unwrap_err();
        assert_eq!(err, PaymentFailure::TxReverted);
    }

    #[test]
    fn receipt_without_logs_reports_missing_transfer_event() {
        let receipt = receipt_with(vec![]);
        let err = check_receipt(&receipt, PaymentToken::Usdc, 149.0, PAY_TO).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No USDC Transfer event found in transaction"
        );
        assert_eq!(err.code(), "no_transfer_event");
    }

    #[test]
    fn transfer_from_other_contract_is_ignored() {
        let other_contract = "0x3333333333333333333333333333333333333333";
        let receipt = receipt_with(vec![transfer_log(other_contract, SENDER, PAY_TO, 149_000_000)]);
        let err = check_receipt(&receipt, PaymentToken::Usdc, 149.0, PAY_TO).unwrap_err();
        assert!(matches!(err, PaymentFailure::NoTransferEvent { .. }));
    }

    #[test]
    fn snr_accepts_any_positive_amount() {
        // One whole SNR (18 decimals), well under the 119.20 asked for
        let one_snr = 10u128.pow(18);
        let receipt = receipt_with(vec![transfer_log(SNR_CONTRACT, SENDER, PAY_TO, one_snr)]);
        let details = check_receipt(&receipt, PaymentToken::Snr, 119.2, PAY_TO).unwrap();
        assert!((details.amount - 1.0).abs() < 1e-9);
    }

    #[test]
    fn snr_rejects_zero_amount() {
        let receipt = receipt_with(vec![transfer_log(SNR_CONTRACT, SENDER, PAY_TO, 0)]);
        let err = check_receipt(&receipt, PaymentToken::Snr, 119.2, PAY_TO).unwrap_err();
        assert!(matches!(err, PaymentFailure::AmountMismatch { .. }));
    }

    #[test]
    fn decimal_scaling_respects_token_precision() {
        assert_eq!(decode_amount("0x0000000000000000000000000000000000000000000000000000000005f5e100", 6), Some(100.0));
        let one_token_18 = format!("0x{:064x}", 10u128.pow(18));
        assert_eq!(decode_amount(&one_token_18, 18), Some(1.0));
        assert_eq!(decode_amount("0x", 6), None);
        assert_eq!(decode_amount(&format!("0x{:064}", 0), 6), Some(0.0));
    }

    #[test]
    fn topic_decoding_keeps_low_twenty_bytes() {
        let topic = address_topic("0xAbCd111122223333444455556666777788889999");
        assert_eq!(
            topic_to_address(&topic).unwrap(),
            "0xabcd111122223333444455556666777788889999"
        );
        assert_eq!(topic_to_address("0x1234"), None);
    }

    #[test]
    fn price_for_token_applies_snr_discount() {
        assert_eq!(
            price_for_token(Decimal::from(149), PaymentToken::Snr).to_string(),
            "119.20"
        );
        assert_eq!(
            price_for_token(Decimal::from(149), PaymentToken::Usdc).to_string(),
            "149.00"
        );
        assert_eq!(
            price_for_token(Decimal::from(29), PaymentToken::Snr).to_string(),
            "23.20"
        );
    }

    #[test]
    fn token_registry_is_consistent() {
        assert_eq!(PaymentToken::Usdc.decimals(), 6);
        assert_eq!(PaymentToken::Snr.decimals(), 18);
        assert_eq!(PaymentToken::from_symbol("usdc"), Some(PaymentToken::Usdc));
        assert_eq!(PaymentToken::from_symbol("SNR"), Some(PaymentToken::Snr));
        assert_eq!(PaymentToken::from_symbol("DOGE"), None);
    }
}
