//! 联盟归因
//!
//! 从请求 Cookie 解析 `{promoCode, affiliateId, expiry}`，解析、过期、
//! 查找、分佣任何一步失败都只记日志降级为"无归因"，绝不影响下单。
//!
//! Cookie 值只做一次 percent 解码。历史实现为了兼容上游双重编码的
//! cookie 做过两轮解码，这属于写入侧的 bug，读侧不再迁就：二次编码
//! 的 cookie 按畸形处理。

use rust_decimal::Decimal;
use serde::Deserialize;
use surrealdb::RecordId;

use crate::db::models::{Affiliate, AffiliateStatus, MerchantSettings};
use crate::db::repository::AffiliateRepository;

/// 归因 cookie 名
pub const ATTRIBUTION_COOKIE: &str = "affiliate_tracking";

/// Cookie payload written by the storefront
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributionCookie {
    #[serde(default)]
    promo_code: Option<String>,
    #[serde(default)]
    affiliate_id: Option<String>,
    /// Unix millis
    expiry: i64,
}

/// Resolved attribution for one order
#[derive(Debug, Clone)]
pub struct Attribution {
    pub affiliate_id: RecordId,
    pub promo_code: String,
    pub percent: Decimal,
    pub amount: Decimal,
}

/// Extract a cookie value from a `Cookie` header
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Single-pass percent decoding
///
/// Malformed escapes (`%G1`, truncated `%2`) yield None.
pub fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1)?;
                let lo = bytes.get(i + 2)?;
                let hex = [(*hi) as char, (*lo) as char];
                let value = u8::from_str_radix(&hex.iter().collect::<String>(), 16).ok()?;
                out.push(value);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

/// Resolve attribution from the request's cookie header
///
/// Returns None (no attribution) on every failure path.
pub async fn resolve(
    repo: &AffiliateRepository,
    settings: &MerchantSettings,
    cookie_header: Option<&str>,
    order_total: Decimal,
    now_ms: i64,
) -> Option<Attribution> {
    let raw = cookie_value(cookie_header?, ATTRIBUTION_COOKIE)?;

    let decoded = match percent_decode(raw) {
        Some(d) => d,
        None => {
            tracing::warn!(target: "attribution", "Malformed attribution cookie encoding");
            return None;
        }
    };

    let cookie: AttributionCookie = match serde_json::from_str(&decoded) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(target: "attribution", error = %e, "Attribution cookie is not valid JSON");
            return None;
        }
    };

    if now_ms > cookie.expiry {
        tracing::debug!(target: "attribution", "Attribution cookie expired, dropping");
        return None;
    }

    let affiliate = lookup_affiliate(repo, &cookie).await?;
    let affiliate_id = affiliate.id.clone()?;

    // 佣金按联盟客当前梯度算，不信 cookie
    let percent = settings.tier_percent(affiliate.level).unwrap_or(Decimal::ZERO);
    if percent.is_zero() {
        tracing::debug!(
            target: "attribution",
            level = affiliate.level,
            "No commission configured for tier, dropping attribution"
        );
        return None;
    }

    let amount = (order_total * percent / Decimal::ONE_HUNDRED).round_dp(2);
    if amount.is_zero() {
        return None;
    }

    Some(Attribution {
        affiliate_id,
        promo_code: affiliate.promo_code,
        percent,
        amount,
    })
}

/// Affiliate lookup: by id first, promo code as fallback; active only
async fn lookup_affiliate(
    repo: &AffiliateRepository,
    cookie: &AttributionCookie,
) -> Option<Affiliate> {
    let by_id = match &cookie.affiliate_id {
        Some(id) => match repo.find_by_id(id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(target: "attribution", error = %e, "Affiliate lookup by id failed");
                None
            }
        },
        None => None,
    };

    let affiliate = match by_id {
        Some(a) => Some(a),
        None => match &cookie.promo_code {
            Some(code) => match repo.find_by_promo_code(code).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(target: "attribution", error = %e, "Affiliate lookup by promo code failed");
                    None
                }
            },
            None => None,
        },
    }?;

    if affiliate.status != AffiliateStatus::Active {
        tracing::debug!(target: "attribution", "Affiliate is not active, dropping attribution");
        return None;
    }
    Some(affiliate)
}
