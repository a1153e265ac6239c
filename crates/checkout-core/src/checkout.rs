//! Checkout Models
//!
//! Read-only view of the BigCommerce v3 checkout payload.
//! Uses `rust_decimal` for all monetary values. Unknown fields are ignored so
//! the model keeps decoding as the upstream payload grows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sample checkout payload served by the simulated gateway
pub const SAMPLE_CHECKOUT: &str = include_str!("../fixtures/checkout.json");

/// Opaque checkout identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutId(String);

impl CheckoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Leading characters of the id, used where a short handle is needed
    pub fn prefix(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for CheckoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CheckoutId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Top-level `{data, meta}` envelope returned by the checkout endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutEnvelope {
    pub data: Checkout,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// A pre-order cart snapshot with computed totals
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkout {
    pub id: CheckoutId,
    pub cart: Cart,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub consignments: Vec<Consignment>,
    #[serde(default)]
    pub taxes: Vec<Tax>,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    #[serde(default)]
    pub shipping_cost_total_inc_tax: Decimal,
    #[serde(default)]
    pub shipping_cost_total_ex_tax: Decimal,
    #[serde(default)]
    pub handling_cost_total_inc_tax: Decimal,
    #[serde(default)]
    pub handling_cost_total_ex_tax: Decimal,
    #[serde(default)]
    pub tax_total: Decimal,
    #[serde(default)]
    pub subtotal_inc_tax: Decimal,
    #[serde(default)]
    pub subtotal_ex_tax: Decimal,
    pub grand_total: Decimal,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
    #[serde(default)]
    pub customer_message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<u64>,
    #[serde(default)]
    pub channel_id: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub base_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub cart_amount_inc_tax: Decimal,
    #[serde(default)]
    pub cart_amount_ex_tax: Decimal,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    #[serde(default)]
    pub discounts: Vec<Discount>,
    #[serde(default)]
    pub line_items: LineItems,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LineItems {
    #[serde(default)]
    pub physical_items: Vec<LineItem>,
    #[serde(default)]
    pub digital_items: Vec<LineItem>,
    #[serde(default)]
    pub gift_certificates: Vec<GiftCertificate>,
    #[serde(default)]
    pub custom_items: Vec<CustomItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub variant_id: Option<u64>,
    #[serde(default)]
    pub product_id: Option<u64>,
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub is_taxable: Option<bool>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub coupon_amount: Option<Decimal>,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    pub list_price: Decimal,
    pub sale_price: Decimal,
    pub extended_list_price: Decimal,
    pub extended_sale_price: Decimal,
    #[serde(default)]
    pub is_require_shipping: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GiftCertificate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub theme: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub is_taxable: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomItem {
    pub id: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub list_price: Decimal,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state_or_province: Option<String>,
    #[serde(default)]
    pub state_or_province_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Address {
    /// "First Last", or `None` when neither part is present
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Single-line postal address
    pub fn one_line(&self) -> String {
        [
            self.address1.as_deref(),
            self.address2.as_deref(),
            self.city.as_deref(),
            self.state_or_province_code
                .as_deref()
                .or(self.state_or_province.as_deref()),
            self.postal_code.as_deref(),
            self.country_code.as_deref().or(self.country.as_deref()),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Consignment {
    pub id: String,
    #[serde(default)]
    pub shipping_cost_inc_tax: Decimal,
    #[serde(default)]
    pub shipping_cost_ex_tax: Decimal,
    #[serde(default)]
    pub handling_cost_inc_tax: Decimal,
    #[serde(default)]
    pub handling_cost_ex_tax: Decimal,
    #[serde(default)]
    pub line_item_ids: Vec<String>,
    #[serde(default)]
    pub selected_shipping_option: Option<ShippingOption>,
    #[serde(default)]
    pub available_shipping_options: Vec<ShippingOption>,
    #[serde(default)]
    pub address: Address,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShippingOption {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub cost: Decimal,
    #[serde(default)]
    pub transit_time: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tax {
    pub name: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Coupon {
    pub id: u64,
    pub code: String,
    #[serde(default)]
    pub coupon_type: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub discounted_amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Discount {
    pub id: String,
    pub discounted_amount: Decimal,
}

/// Formatted line for the summary view
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItemSummary {
    pub name: String,
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub total: String,
    pub digital: bool,
}

/// Human-oriented digest of a checkout
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSummary {
    pub id: CheckoutId,
    pub customer_email: Option<String>,
    pub currency: String,
    pub created_time: Option<String>,
    pub updated_time: Option<String>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub handling: String,
    pub discount: String,
    pub tax: String,
    pub grand_total: String,
    pub billing_name: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_methods: Vec<String>,
    pub coupon_codes: Vec<String>,
    pub line_items: Vec<LineItemSummary>,
}

impl Checkout {
    /// Currency code, defaulting to USD when the cart omits it
    pub fn currency_code(&self) -> &str {
        self.cart
            .currency
            .as_ref()
            .map_or("USD", |c| c.code.as_str())
    }

    /// Physical and digital line items in display order
    pub fn items(&self) -> impl Iterator<Item = (&LineItem, bool)> {
        self.cart
            .line_items
            .physical_items
            .iter()
            .map(|i| (i, false))
            .chain(self.cart.line_items.digital_items.iter().map(|i| (i, true)))
    }

    /// Sum of quantities across physical and digital items
    pub fn item_count(&self) -> u32 {
        self.items().map(|(i, _)| i.quantity).sum()
    }

    /// Build the formatted summary
    pub fn summary(&self) -> CheckoutSummary {
        let code = self.currency_code();

        let line_items = self
            .items()
            .map(|(item, digital)| LineItemSummary {
                name: item.name.clone(),
                sku: item.sku.clone(),
                quantity: item.quantity,
                unit_price: format_money(item.sale_price, code),
                total: format_money(item.extended_sale_price, code),
                digital,
            })
            .collect();

        let shipping_methods = self
            .consignments
            .iter()
            .filter_map(|c| c.selected_shipping_option.as_ref())
            .map(|o| format!("{} ({})", o.description, format_money(o.cost, code)))
            .collect();

        let coupon_codes = self
            .coupons
            .iter()
            .chain(self.cart.coupons.iter())
            .map(|c| c.code.clone())
            .fold(Vec::new(), |mut acc, c| {
                if !acc.contains(&c) {
                    acc.push(c);
                }
                acc
            });

        CheckoutSummary {
            id: self.id.clone(),
            customer_email: self.cart.email.clone(),
            currency: code.to_string(),
            created_time: self.created_time.clone(),
            updated_time: self.updated_time.clone(),
            item_count: self.item_count(),
            subtotal: format_money(self.subtotal_inc_tax, code),
            shipping: format_money(self.shipping_cost_total_inc_tax, code),
            handling: format_money(self.handling_cost_total_inc_tax, code),
            discount: format_money(self.cart.discount_amount, code),
            tax: format_money(self.tax_total, code),
            grand_total: format_money(self.grand_total, code),
            billing_name: self.billing_address.as_ref().and_then(Address::full_name),
            billing_address: self
                .billing_address
                .as_ref()
                .map(Address::one_line)
                .filter(|s| !s.is_empty()),
            shipping_methods,
            coupon_codes,
            line_items,
        }
    }
}

/// Format an amount for display, e.g. `$1,234.50` or `SEK 99.00`
pub fn format_money(amount: Decimal, currency_code: &str) -> String {
    let symbol = match currency_code.to_uppercase().as_str() {
        "USD" | "CAD" | "AUD" | "NZD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        _ => "",
    };

    let rounded = amount.abs().round_dp(2);
    let formatted = format!("{rounded:.2}");
    let (whole, frac) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    if symbol.is_empty() {
        format!("{sign}{} {grouped}.{frac}", currency_code.to_uppercase())
    } else {
        format!("{sign}{symbol}{grouped}.{frac}")
    }
}
