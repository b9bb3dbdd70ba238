//! Unsigned transaction records and builders
//!
//! Pure construction of the per-operation transaction records, using the
//! ledger's capitalized wire field names. Builders never touch the
//! network; the engine fills in `Sequence` on a per-attempt clone.

use serde::{Deserialize, Serialize};

/// Issuer used when the caller does not specify one.
pub const DEFAULT_ISSUER: &str = "jGa9J9TkqtBcUoHe2zqhVFFbgUVED6o9or";

/// Native token of the ledger; native amounts carry no issuer.
pub const NATIVE_TOKEN: &str = "SWT";

/// Fixed per-transaction fee in drops.
pub const TX_FEE: u64 = 10_000;

/// OfferCreate flag marking a sell order; buy orders carry no flags.
pub const SELL_FLAG: u32 = 0x0008_0000;

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Ledger amount: native amounts serialize as a bare value string,
/// issued-token amounts as a `{value, currency, issuer}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Native(String),
    Token {
        value: String,
        currency: String,
        issuer: String,
    },
}

impl Amount {
    /// Build an amount for `token`, resolving the issuer default. The
    /// native token is matched case-insensitively and never carries an
    /// issuer.
    pub fn new(value: &str, token: &str, issuer: Option<&str>) -> Self {
        if token.eq_ignore_ascii_case(NATIVE_TOKEN) {
            Amount::Native(value.to_string())
        } else {
            Amount::Token {
                value: value.to_string(),
                currency: token.to_uppercase(),
                issuer: issuer.unwrap_or(DEFAULT_ISSUER).to_string(),
            }
        }
    }

    pub fn issuer(&self) -> Option<&str> {
        match self {
            Amount::Native(_) => None,
            Amount::Token { issuer, .. } => Some(issuer),
        }
    }
}

/// Transfer memo input: a plain text memo or a pre-split list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Memo {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoData {
    #[serde(rename = "MemoData")]
    pub memo_data: String,
}

/// Wire shape of one memo entry: `{"Memo": {"MemoData": "<hex>"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoEntry {
    #[serde(rename = "Memo")]
    pub memo: MemoData,
}

impl Memo {
    /// Hex-encode into the ledger's memo list shape.
    fn encode(&self) -> Vec<MemoEntry> {
        let texts: Vec<&str> = match self {
            Memo::Text(text) => vec![text.as_str()],
            Memo::List(items) => items.iter().map(|s| s.as_str()).collect(),
        };
        texts
            .into_iter()
            .map(|text| MemoEntry {
                memo: MemoData {
                    memo_data: hex::encode(text.as_bytes()),
                },
            })
            .collect()
    }
}

/// Operation-specific payload, tagged with the ledger transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "TransactionType")]
pub enum TxPayload {
    OfferCreate {
        #[serde(rename = "Flags")]
        flags: u32,
        #[serde(rename = "TakerGets")]
        taker_gets: Amount,
        #[serde(rename = "TakerPays")]
        taker_pays: Amount,
        #[serde(rename = "Platform")]
        platform: String,
    },
    OfferCancel {
        #[serde(rename = "OfferSequence")]
        offer_sequence: u64,
    },
    Payment {
        #[serde(rename = "Destination")]
        destination: String,
        #[serde(rename = "Amount")]
        amount: Amount,
        #[serde(rename = "Memos")]
        memos: Vec<MemoEntry>,
    },
    Brokerage {
        #[serde(rename = "FeeAccountID")]
        fee_account: String,
        #[serde(rename = "OfferFeeRateNum")]
        rate_num: u64,
        #[serde(rename = "OfferFeeRateDen")]
        rate_den: u64,
        #[serde(rename = "Amount")]
        amount: Amount,
    },
}

/// Unsigned transaction record.
///
/// `sequence` starts empty; the engine clones the record per attempt and
/// fills it in from the cache, so a template handed to `submit` is never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    #[serde(rename = "Account")]
    pub account: String,

    #[serde(rename = "Fee")]
    pub fee: u64,

    #[serde(rename = "Sequence", skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,

    #[serde(flatten)]
    pub payload: TxPayload,
}

impl UnsignedTx {
    fn new(account: &str, payload: TxPayload) -> Self {
        Self {
            account: account.to_string(),
            fee: TX_FEE,
            sequence: None,
            payload,
        }
    }
}

/// Build an order-placement record.
///
/// A buy order offers `sum` of the counter token for `amount` of the
/// base token; a sell order is the converse and carries the sell flag.
#[allow(clippy::too_many_arguments)]
pub fn build_create_order(
    address: &str,
    amount: &str,
    base: &str,
    counter: &str,
    sum: &str,
    side: OrderSide,
    platform: &str,
    issuer: Option<&str>,
) -> UnsignedTx {
    let base_amount = Amount::new(amount, base, issuer);
    let counter_amount = Amount::new(sum, counter, issuer);
    let (flags, taker_gets, taker_pays) = match side {
        OrderSide::Buy => (0, counter_amount, base_amount),
        OrderSide::Sell => (SELL_FLAG, base_amount, counter_amount),
    };
    UnsignedTx::new(
        address,
        TxPayload::OfferCreate {
            flags,
            taker_gets,
            taker_pays,
            platform: platform.to_string(),
        },
    )
}

/// Build an order-cancellation record for a previously placed offer.
pub fn build_cancel_order(address: &str, offer_sequence: u64) -> UnsignedTx {
    UnsignedTx::new(address, TxPayload::OfferCancel { offer_sequence })
}

/// Build a token-transfer record.
pub fn build_payment(
    address: &str,
    amount: &str,
    to: &str,
    token: &str,
    memo: &Memo,
    issuer: Option<&str>,
) -> UnsignedTx {
    UnsignedTx::new(
        address,
        TxPayload::Payment {
            destination: to.to_string(),
            amount: Amount::new(amount, token, issuer),
            memos: memo.encode(),
        },
    )
}

/// Build a brokerage-fee configuration record. The fee is the proportion
/// `rate_num / rate_den` collected by `fee_account` on behalf of the
/// platform account.
pub fn build_brokerage(
    platform_account: &str,
    fee_account: &str,
    rate_num: u64,
    rate_den: u64,
    token: &str,
    issuer: Option<&str>,
) -> UnsignedTx {
    UnsignedTx::new(
        platform_account,
        TxPayload::Brokerage {
            fee_account: fee_account.to_string(),
            rate_num,
            rate_den,
            amount: Amount::new("0", token, issuer),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_issuer_override_and_default() {
        let tx = build_create_order(
            "jAccount1",
            "100",
            "jjcc",
            "cny",
            "50",
            OrderSide::Buy,
            "jPlatform",
            Some("jIssuerX"),
        );
        match &tx.payload {
            TxPayload::OfferCreate {
                taker_gets,
                taker_pays,
                ..
            } => {
                assert_eq!(taker_gets.issuer(), Some("jIssuerX"));
                assert_eq!(taker_pays.issuer(), Some("jIssuerX"));
            }
            other => panic!("unexpected payload: {:?}", other),
        }

        let tx = build_create_order(
            "jAccount1",
            "100",
            "jjcc",
            "cny",
            "50",
            OrderSide::Buy,
            "jPlatform",
            None,
        );
        match &tx.payload {
            TxPayload::OfferCreate { taker_pays, .. } => {
                assert_eq!(taker_pays.issuer(), Some(DEFAULT_ISSUER));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_buy_and_sell_orientation() {
        let buy = build_create_order(
            "jA",
            "100",
            "jjcc",
            "swt",
            "50",
            OrderSide::Buy,
            "jP",
            None,
        );
        let sell = build_create_order(
            "jA",
            "100",
            "jjcc",
            "swt",
            "50",
            OrderSide::Sell,
            "jP",
            None,
        );

        match (&buy.payload, &sell.payload) {
            (
                TxPayload::OfferCreate {
                    flags: buy_flags,
                    taker_pays: buy_pays,
                    ..
                },
                TxPayload::OfferCreate {
                    flags: sell_flags,
                    taker_gets: sell_gets,
                    ..
                },
            ) => {
                assert_eq!(*buy_flags, 0);
                assert_eq!(*sell_flags, SELL_FLAG);
                // Base side of a buy equals base side of a sell
                assert_eq!(buy_pays, sell_gets);
            }
            other => panic!("unexpected payloads: {:?}", other),
        }
    }

    #[test]
    fn test_native_amount_has_no_issuer() {
        let amount = Amount::new("12.5", "swt", Some("jIssuerX"));
        assert_eq!(amount, Amount::Native("12.5".to_string()));
        assert_eq!(amount.issuer(), None);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"12.5\"");
    }

    #[test]
    fn test_wire_field_names() {
        let mut tx = build_cancel_order("jAccount1", 7);
        tx.sequence = Some(42);
        let value = serde_json::to_value(&tx).unwrap();

        assert_eq!(value["Account"], "jAccount1");
        assert_eq!(value["TransactionType"], "OfferCancel");
        assert_eq!(value["OfferSequence"], 7);
        assert_eq!(value["Sequence"], 42);
        assert_eq!(value["Fee"], TX_FEE);
    }

    #[test]
    fn test_sequence_omitted_until_assigned() {
        let tx = build_cancel_order("jAccount1", 7);
        let value = serde_json::to_value(&tx).unwrap();
        assert!(value.get("Sequence").is_none());
    }

    #[test]
    fn test_payment_memo_hex_encoding() {
        let tx = build_payment(
            "jFrom",
            "10",
            "jTo",
            "cny",
            &Memo::Text("hello".to_string()),
            None,
        );
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["TransactionType"], "Payment");
        assert_eq!(value["Destination"], "jTo");
        assert_eq!(value["Memos"][0]["Memo"]["MemoData"], hex::encode("hello"));

        let tx = build_payment(
            "jFrom",
            "10",
            "jTo",
            "cny",
            &Memo::List(vec!["a".to_string(), "b".to_string()]),
            None,
        );
        match &tx.payload {
            TxPayload::Payment { memos, .. } => assert_eq!(memos.len(), 2),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_brokerage_record() {
        let tx = build_brokerage("jPlatform", "jFeeAccount", 1, 1000, "cny", None);
        assert_eq!(tx.account, "jPlatform");
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["TransactionType"], "Brokerage");
        assert_eq!(value["FeeAccountID"], "jFeeAccount");
        assert_eq!(value["OfferFeeRateNum"], 1);
        assert_eq!(value["OfferFeeRateDen"], 1000);
        assert_eq!(value["Amount"]["issuer"], DEFAULT_ISSUER);
    }
}
