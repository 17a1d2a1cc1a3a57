//! Supported currencies and locale-aware amount formatting.
//!
//! Currencies only govern how amounts are displayed, amounts are never converted.

use std::{fmt::Display, str::FromStr};

use numfmt::{Formatter, Precision};
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A currency an owner can choose for displaying amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// United States dollar, formatted for the en-US locale.
    Usd,
    /// Euro, formatted for the de-DE locale.
    Eur,
    /// Japanese yen, formatted for the ja-JP locale.
    Jpy,
    /// Indonesian rupiah, formatted for the id-ID locale.
    Idr,
}

/// The currency used until the owner picks one.
pub const DEFAULT_CURRENCY: Currency = Currency::Usd;

/// All supported currencies, in the order they are offered to the user.
pub const CURRENCIES: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Jpy, Currency::Idr];

impl Currency {
    /// The ISO 4217 currency code, e.g. "USD".
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Idr => "IDR",
        }
    }

    /// The BCP 47 locale amounts in this currency are formatted for.
    pub fn locale(&self) -> &'static str {
        match self {
            Currency::Usd => "en-US",
            Currency::Eur => "de-DE",
            Currency::Jpy => "ja-JP",
            Currency::Idr => "id-ID",
        }
    }

    /// A human readable name for selection lists.
    pub fn label(&self) -> &'static str {
        match self {
            Currency::Usd => "🇺🇸 Dollar",
            Currency::Eur => "🇪🇺 Euro",
            Currency::Jpy => "🇯🇵 Yen",
            Currency::Idr => "🇮🇩 Rupiah",
        }
    }

    fn style(&self) -> LocaleStyle {
        match self {
            Currency::Usd => LocaleStyle {
                prefix: "$",
                suffix: "",
                decimals: 2,
                decimal_comma: false,
            },
            Currency::Eur => LocaleStyle {
                prefix: "",
                suffix: " €",
                decimals: 2,
                decimal_comma: true,
            },
            Currency::Jpy => LocaleStyle {
                prefix: "￥",
                suffix: "",
                decimals: 0,
                decimal_comma: false,
            },
            Currency::Idr => LocaleStyle {
                prefix: "Rp ",
                suffix: "",
                decimals: 2,
                decimal_comma: true,
            },
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CURRENCIES
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedCurrency(s.to_owned()))
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            text.parse()
                .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
        })
    }
}

/// A currency as listed by the currencies endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyOption {
    /// The currency code, e.g. "USD".
    pub value: Currency,
    /// The display label, e.g. "🇺🇸 Dollar".
    pub label: String,
    /// The locale used for formatting, e.g. "en-US".
    pub locale: String,
}

impl From<Currency> for CurrencyOption {
    fn from(currency: Currency) -> Self {
        Self {
            value: currency,
            label: currency.label().to_owned(),
            locale: currency.locale().to_owned(),
        }
    }
}

/// numfmt renders amounts from this magnitude in scientific notation.
const SCIENTIFIC_CUTOFF: f64 = 1e12;

/// How a locale lays out a currency amount.
#[derive(Debug, Clone, Copy)]
struct LocaleStyle {
    prefix: &'static str,
    suffix: &'static str,
    decimals: u8,
    /// Whether the locale uses ',' for decimals and '.' for grouping.
    decimal_comma: bool,
}

/// Formats non-negative amounts for a currency and its locale,
/// e.g. `$1,234.50` for USD or `1.234,50 €` for EUR.
pub struct CurrencyFormatter {
    formatter: Formatter,
    style: LocaleStyle,
}

impl CurrencyFormatter {
    /// Create a formatter for `currency`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::CurrencyFormatError] if the underlying number formatter
    /// could not be configured.
    pub fn new(currency: Currency) -> Result<Self, Error> {
        let style = currency.style();
        let formatter = Formatter::currency("")
            .map_err(|error| {
                tracing::error!("could not create formatter for {currency}: {error:?}");
                Error::CurrencyFormatError(currency.code().to_owned())
            })?
            .precision(Precision::Decimals(style.decimals));

        Ok(Self { formatter, style })
    }

    /// Format `amount` as a display string.
    ///
    /// Amounts are magnitudes, so the sign of `amount` is ignored.
    pub fn format(&self, amount: f64) -> String {
        let decimals = usize::from(self.style.decimals);
        let factor = 10f64.powi(i32::from(self.style.decimals));
        let amount = (amount.abs() * factor).round() / factor;

        let mut number = if amount >= SCIENTIFIC_CUTOFF {
            group_thousands(amount, decimals)
        } else if amount > 0.0 {
            self.formatter.fmt_string(amount)
        } else {
            // Zero is hardcoded as "0", so we must build the formatted string for zero
            String::from("0")
        };

        // numfmt omits trailing zeros, e.g. "12.30" is rendered as "12.3".
        if decimals > 0 {
            let written = match number.find('.') {
                Some(point) => number.len() - point - 1,
                None => {
                    number.push('.');
                    0
                }
            };
            number.extend(std::iter::repeat_n('0', decimals.saturating_sub(written)));
        }

        if self.style.decimal_comma {
            number = number
                .chars()
                .map(|c| match c {
                    '.' => ',',
                    ',' => '.',
                    c => c,
                })
                .collect();
        }

        format!("{}{number}{}", self.style.prefix, self.style.suffix)
    }
}

/// Render `amount` with `decimals` places and ',' between groups of three digits.
fn group_thousands(amount: f64, decimals: usize) -> String {
    let plain = format!("{amount:.decimals$}");
    let (integer, fraction) = match plain.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut number = String::with_capacity(plain.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            number.push(',');
        }
        number.push(digit);
    }

    if let Some(fraction) = fraction {
        number.push('.');
        number.push_str(fraction);
    }

    number
}
