//! VNPay payment gateway
//!
//! Builds signed `vpcpay` redirect URLs and checks the signature on
//! return/IPN callbacks. Signatures are HMAC-SHA512 over the sorted,
//! form-urlencoded query string.

use std::collections::BTreeMap;

use chrono::{Duration, FixedOffset};
use hmac::{Hmac, Mac};
use sha2::Sha512;

use farmlink::domain::services::GATEWAY_AMOUNT_FACTOR;
use farmlink::{DomainError, PaymentGateway, PaymentUrlRequest};

use crate::config::VnpayConfig;

type HmacSha512 = Hmac<Sha512>;

pub const VERSION: &str = "2.1.0";
pub const SECURE_HASH: &str = "vnp_SecureHash";
pub const SECURE_HASH_TYPE: &str = "vnp_SecureHashType";
const EXPIRE_MINUTES: i64 = 15;
const DATE_FORMAT: &str = "%Y%m%d%H%M%S";

pub struct VnpayGateway {
    config: VnpayConfig,
}

impl VnpayGateway {
    pub fn new(config: VnpayConfig) -> Self {
        Self { config }
    }

    /// `key=value&...` over non-empty fields in key order, values form-urlencoded
    fn hash_data(fields: &BTreeMap<String, String>) -> String {
        fields
            .iter()
            .filter(|(key, value)| {
                !value.is_empty() && key.as_str() != SECURE_HASH && key.as_str() != SECURE_HASH_TYPE
            })
            .map(|(key, value)| format!("{}={}", key, encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn mac(&self, data: &str) -> Result<HmacSha512, DomainError> {
        let mut mac = HmacSha512::new_from_slice(self.config.hash_secret.as_bytes())
            .map_err(|e| DomainError::ExternalService(format!("Invalid VNPay hash secret: {e}")))?;
        mac.update(data.as_bytes());
        Ok(mac)
    }

    fn sign(&self, data: &str) -> Result<String, DomainError> {
        Ok(hex::encode(self.mac(data)?.finalize().into_bytes()))
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// VNPay timestamps are GMT+7
fn vietnam_time() -> Result<FixedOffset, DomainError> {
    FixedOffset::east_opt(7 * 3600)
        .ok_or_else(|| DomainError::ExternalService("invalid VNPay UTC offset".to_string()))
}

/// Loopback over IPv6 is reported the way VNPay expects it
pub fn normalize_client_ip(ip: &str) -> String {
    match ip {
        "::1" | "0:0:0:0:0:0:0:1" => "127.0.0.1".to_string(),
        other => other.strip_prefix("::ffff:").unwrap_or(other).to_string(),
    }
}

impl PaymentGateway for VnpayGateway {
    fn payment_url(&self, request: &PaymentUrlRequest) -> Result<String, DomainError> {
        let amount = request
            .amount
            .checked_mul(GATEWAY_AMOUNT_FACTOR)
            .ok_or_else(|| DomainError::validation("order total is too large for VNPay"))?;
        let created = request.created_at.with_timezone(&vietnam_time()?);
        let expires = created + Duration::minutes(EXPIRE_MINUTES);

        let mut fields = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            fields.insert(key.to_string(), value);
        };
        put("vnp_Version", VERSION.to_string());
        put("vnp_Command", "pay".to_string());
        put("vnp_TmnCode", self.config.tmn_code.clone());
        put("vnp_Amount", amount.to_string());
        put("vnp_CurrCode", "VND".to_string());
        put("vnp_TxnRef", request.order_id.to_string());
        put("vnp_OrderInfo", request.order_info.clone());
        put("vnp_OrderType", "other".to_string());
        put("vnp_Locale", "vn".to_string());
        put("vnp_ReturnUrl", self.config.return_url.clone());
        put("vnp_IpnUrl", self.config.ipn_url.clone());
        put("vnp_IpAddr", normalize_client_ip(&request.client_ip));
        put("vnp_CreateDate", created.format(DATE_FORMAT).to_string());
        put("vnp_ExpireDate", expires.format(DATE_FORMAT).to_string());

        let query = Self::hash_data(&fields);
        let signature = self.sign(&query)?;
        Ok(format!(
            "{}?{}&{}={}",
            self.config.pay_url, query, SECURE_HASH, signature
        ))
    }

    fn verify(&self, fields: &BTreeMap<String, String>) -> bool {
        let Some(received) = fields.get(SECURE_HASH) else {
            return false;
        };
        let Ok(received) = hex::decode(received) else {
            return false;
        };
        match self.mac(&Self::hash_data(fields)) {
            Ok(mac) => mac.verify_slice(&received).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn gateway() -> VnpayGateway {
        VnpayGateway::new(VnpayConfig {
            tmn_code: "FARMLINK".into(),
            hash_secret: "SECRETKEY".into(),
            pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".into(),
            return_url: "https://farmlink.vn/payment/return".into(),
            ipn_url: "https://api.farmlink.vn/api/payments/vnpay/ipn".into(),
        })
    }

    fn query_fields(url: &str) -> BTreeMap<String, String> {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    fn request() -> PaymentUrlRequest {
        PaymentUrlRequest {
            order_id: Uuid::new_v4(),
            amount: 125_000,
            order_info: "Thanh toan don hang".into(),
            client_ip: "::1".into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 15, 17, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_payment_url_fields() {
        let url = gateway().payment_url(&request()).unwrap();
        let fields = query_fields(&url);
        assert_eq!(fields["vnp_Amount"], "12500000");
        assert_eq!(fields["vnp_IpAddr"], "127.0.0.1");
        // 17:30 UTC is 00:30 the next day in Vietnam
        assert_eq!(fields["vnp_CreateDate"], "20240516003000");
        assert_eq!(fields["vnp_ExpireDate"], "20240516004500");
        assert_eq!(fields[SECURE_HASH].len(), 128);
    }

    #[test]
    fn test_generated_url_verifies() {
        let gateway = gateway();
        let url = gateway.payment_url(&request()).unwrap();
        let mut fields = query_fields(&url);
        assert!(gateway.verify(&fields));

        let upper = fields[SECURE_HASH].to_uppercase();
        fields.insert(SECURE_HASH.into(), upper);
        assert!(gateway.verify(&fields));

        fields.insert("vnp_Amount".into(), "1".into());
        assert!(!gateway.verify(&fields));
    }

    #[test]
    fn test_malformed_signature_fails() {
        let gateway = gateway();
        let url = gateway.payment_url(&request()).unwrap();
        let mut fields = query_fields(&url);
        let signature = fields[SECURE_HASH].clone();

        fields.insert(SECURE_HASH.into(), "not-hex".into());
        assert!(!gateway.verify(&fields));

        fields.insert(SECURE_HASH.into(), signature.chars().take(64).collect());
        assert!(!gateway.verify(&fields));
    }

    #[test]
    fn test_oversized_amount_rejected() {
        let mut huge = request();
        huge.amount = i64::MAX / 10;
        let err = gateway().payment_url(&huge).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_hash_data_sorts_and_skips_empty() {
        let mut fields = BTreeMap::new();
        fields.insert("vnp_b".to_string(), "x y".to_string());
        fields.insert("vnp_a".to_string(), "1".to_string());
        fields.insert("vnp_c".to_string(), String::new());
        fields.insert(SECURE_HASH.to_string(), "abc".to_string());
        assert_eq!(VnpayGateway::hash_data(&fields), "vnp_a=1&vnp_b=x+y");
    }

    #[test]
    fn test_missing_signature_fails() {
        assert!(!gateway().verify(&BTreeMap::new()));
    }
}
