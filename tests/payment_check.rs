// Receipt verification against captured eth_getTransactionReceipt JSON.
// Everything here runs offline; the one test that talks to a real node is
// ignored by default.

use sonarbot_api::chain::{BaseRpcClient, TransactionReceipt};
use sonarbot_api::services::payment_service::{check_receipt, PaymentFailure, PaymentToken};

const PAY_TO: &str = "0x9a11aa22bb33cc44dd55ee66ff77889900aabbcc";

fn receipt(json: &str) -> TransactionReceipt {
    serde_json::from_str(json).expect("receipt json should deserialize")
}

#[test]
fn usdc_payment_decodes_from_raw_receipt() {
    // One unrelated WETH Transfer, then 149 USDC to the payment address.
    // The USDC contract address is checksummed the way nodes return it.
    let json = r#"{
        "status": "0x1",
        "logs": [
            {
                "address": "0x4200000000000000000000000000000000000006",
                "topics": [
                    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                    "0x0000000000000000000000001111111111111111111111111111111111111111",
                    "0x0000000000000000000000002222222222222222222222222222222222222222"
                ],
                "data": "0x0000000000000000000000000000000000000000000000000de0b6b3a7640000"
            },
            {
                "address": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
                "topics": [
                    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                    "0x0000000000000000000000001111111111111111111111111111111111111111",
                    "0x0000000000000000000000009a11aa22bb33cc44dd55ee66ff77889900aabbcc"
                ],
                "data": "0x0000000000000000000000000000000000000000000000000000000008e18f40"
            }
        ]
    }"#;

    let details = check_receipt(&receipt(json), PaymentToken::Usdc, 149.0, PAY_TO)
        .expect("149 USDC to the payment address should verify");
    assert_eq!(details.from, "0x1111111111111111111111111111111111111111");
    assert_eq!(details.to, PAY_TO);
    assert!((details.amount - 149.0).abs() < 1e-9);
}

#[test]
fn snr_payment_decodes_from_raw_receipt() {
    // Half an SNR token (18 decimals); amount is under the quote but SNR
    // only requires a positive transfer
    let json = r#"{
        "status": "0x1",
        "logs": [
            {
                "address": "0x5f0a1e882bd2a6a1a3c0e5f3a77b1b2d94a35cca",
                "topics": [
                    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                    "0x0000000000000000000000003333333333333333333333333333333333333333",
                    "0x0000000000000000000000009a11aa22bb33cc44dd55ee66ff77889900aabbcc"
                ],
                "data": "0x00000000000000000000000000000000000000000000000006f05b59d3b20000"
            }
        ]
    }"#;

    let details = check_receipt(&receipt(json), PaymentToken::Snr, 119.2, PAY_TO)
        .expect("positive SNR transfer should verify");
    assert!((details.amount - 0.5).abs() < 1e-9);
}

#[test]
fn reverted_receipt_fails_before_log_inspection() {
    let json = r#"{
        "status": "0x0",
        "logs": []
    }"#;

    let err = check_receipt(&receipt(json), PaymentToken::Usdc, 149.0, PAY_TO).unwrap_err();
    assert_eq!(err, PaymentFailure::TxReverted);
}

#[test]
fn receipt_without_logs_field_deserializes_and_fails_cleanly() {
    // Some providers omit "logs" entirely on odd receipts
    let json = r#"{ "status": "0x1" }"#;

    let err = check_receipt(&receipt(json), PaymentToken::Usdc, 149.0, PAY_TO).unwrap_err();
    assert_eq!(
        err.to_string(),
        "No USDC Transfer event found in transaction"
    );
}

#[test]
fn transfer_to_someone_else_is_rejected() {
    let json = r#"{
        "status": "0x1",
        "logs": [
            {
                "address": "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913",
                "topics": [
                    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                    "0x0000000000000000000000001111111111111111111111111111111111111111",
                    "0x0000000000000000000000004444444444444444444444444444444444444444"
                ],
                "data": "0x0000000000000000000000000000000000000000000000000000000008e18f40"
            }
        ]
    }"#;

    let err = check_receipt(&receipt(json), PaymentToken::Usdc, 149.0, PAY_TO).unwrap_err();
    match err {
        PaymentFailure::WrongRecipient { expected, actual } => {
            assert_eq!(expected, PAY_TO);
            assert_eq!(actual, "0x4444444444444444444444444444444444444444");
        }
        other => panic!("expected WrongRecipient, got {other:?}"),
    }
}

#[tokio::test]
#[ignore] // hits the public Base RPC endpoint
async fn base_rpc_answers_block_number() {
    let rpc = BaseRpcClient::new("https://mainnet.base.org".to_string());
    let block = rpc.block_number().await.expect("block number");
    assert!(block > 0, "Base mainnet tip should be nonzero");
}
