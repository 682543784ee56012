// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Data transfer objects for deserializing WazirX REST responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::common::enums::{WazirxOrderSide, WazirxOrderStatus, WazirxOrderType};

/// A single asset balance from `GET /funds`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WazirxFund {
    pub asset: Ustr,
    pub free: Decimal,
    pub locked: Decimal,
    #[serde(default)]
    pub reserved_fee: Option<Decimal>,
}

/// A 24 hour rolling ticker from `GET /ticker/24hr` or `GET /tickers/24hr`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WazirxTicker {
    pub symbol: Ustr,
    pub base_asset: Ustr,
    pub quote_asset: Ustr,
    pub open_price: Decimal,
    pub low_price: Decimal,
    pub high_price: Decimal,
    pub last_price: Decimal,
    pub volume: Decimal,
    #[serde(default)]
    pub bid_price: Option<Decimal>,
    #[serde(default)]
    pub ask_price: Option<Decimal>,
    /// Snapshot time in milliseconds since the epoch.
    pub at: u64,
}

/// An order as returned by `POST /order` and `GET /order`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WazirxOrder {
    pub id: u64,
    #[serde(default)]
    pub client_order_id: Option<String>,
    pub symbol: Ustr,
    pub price: Decimal,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    pub orig_qty: Decimal,
    pub executed_qty: Decimal,
    pub status: WazirxOrderStatus,
    #[serde(rename = "type")]
    pub order_type: WazirxOrderType,
    pub side: WazirxOrderSide,
    pub created_time: u64,
    pub updated_time: u64,
}

/// Parameters for `POST /order`.
#[derive(Clone, Debug, PartialEq)]
pub struct WazirxPlaceOrderParams {
    pub symbol: String,
    pub side: WazirxOrderSide,
    pub order_type: WazirxOrderType,
    pub price: Decimal,
    pub quantity: Decimal,
    /// Trigger price, required for stop-limit orders.
    pub stop_price: Option<Decimal>,
    pub client_order_id: Option<String>,
}

impl WazirxPlaceOrderParams {
    /// Creates parameters for a limit order.
    #[must_use]
    pub fn limit(
        symbol: impl Into<String>,
        side: WazirxOrderSide,
        price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: WazirxOrderType::Limit,
            price,
            quantity,
            stop_price: None,
            client_order_id: None,
        }
    }

    /// Turns the order into a stop-limit order triggered at `stop_price`.
    #[must_use]
    pub fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.order_type = WazirxOrderType::StopLimit;
        self.stop_price = Some(stop_price);
        self
    }

    /// Sets the caller-assigned order identifier.
    #[must_use]
    pub fn with_client_order_id(mut self, client_order_id: impl Into<String>) -> Self {
        self.client_order_id = Some(client_order_id.into());
        self
    }

    /// Returns the form fields of the request body.
    #[must_use]
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("symbol", self.symbol.clone()),
            ("side", self.side.to_string()),
            ("type", self.order_type.to_string()),
            ("price", self.price.to_string()),
            ("quantity", self.quantity.to_string()),
        ];
        if let Some(stop_price) = self.stop_price {
            fields.push(("stopPrice", stop_price.to_string()));
        }
        if let Some(client_order_id) = &self.client_order_id {
            fields.push(("clientOrderId", client_order_id.clone()));
        }
        fields
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_deserialize_funds() {
        let json = r#"[
            {"asset":"inr","free":"1000.5","locked":"0.0"},
            {"asset":"btc","free":"0.25","locked":"0.01","reservedFee":"0.0001"}
        ]"#;

        let funds: Vec<WazirxFund> = serde_json::from_str(json).unwrap();

        assert_eq!(funds.len(), 2);
        assert_eq!(funds[0].asset.as_str(), "inr");
        assert_eq!(funds[0].free, dec!(1000.5));
        assert_eq!(funds[0].reserved_fee, None);
        assert_eq!(funds[1].reserved_fee, Some(dec!(0.0001)));
    }

    #[rstest]
    fn test_deserialize_ticker() {
        let json = r#"{
            "symbol":"wrxinr","baseAsset":"wrx","quoteAsset":"inr",
            "openPrice":"94.77","lowPrice":"92.7","highPrice":"95.17","lastPrice":"94.03",
            "volume":"1671656.0","bidPrice":"94.02","askPrice":"94.03","at":1656493826000
        }"#;

        let ticker: WazirxTicker = serde_json::from_str(json).unwrap();

        assert_eq!(ticker.symbol.as_str(), "wrxinr");
        assert_eq!(ticker.last_price, dec!(94.03));
        assert_eq!(ticker.bid_price, Some(dec!(94.02)));
        assert_eq!(ticker.at, 1_656_493_826_000);
    }

    #[rstest]
    fn test_deserialize_order() {
        let json = r#"{
            "id":30,"clientOrderId":"c-1","symbol":"wrxinr","price":"9293.0","origQty":"10.0",
            "executedQty":"8.2","status":"wait","type":"limit","side":"sell",
            "createdTime":1499827319559,"updatedTime":1507725176595
        }"#;

        let order: WazirxOrder = serde_json::from_str(json).unwrap();

        assert_eq!(order.id, 30);
        assert_eq!(order.client_order_id.as_deref(), Some("c-1"));
        assert_eq!(order.status, WazirxOrderStatus::Wait);
        assert_eq!(order.order_type, WazirxOrderType::Limit);
        assert_eq!(order.side, WazirxOrderSide::Sell);
        assert_eq!(order.executed_qty, dec!(8.2));
    }

    #[rstest]
    fn test_place_order_fields() {
        let params =
            WazirxPlaceOrderParams::limit("btcinr", WazirxOrderSide::Buy, dec!(100.5), dec!(2))
                .with_stop_price(dec!(99))
                .with_client_order_id("abc");

        assert_eq!(
            params.to_fields(),
            vec![
                ("symbol", "btcinr".to_string()),
                ("side", "buy".to_string()),
                ("type", "stop_limit".to_string()),
                ("price", "100.5".to_string()),
                ("quantity", "2".to_string()),
                ("stopPrice", "99".to_string()),
                ("clientOrderId", "abc".to_string()),
            ]
        );
    }
}
