//! Enumerations for catalog and order records.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Order status.
///
/// Orders are created `Pending`. `Shipped` is part of the persisted format
/// but nothing in the storefront transitions an order to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Shipped => write!(f, "shipped"),
        }
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    BankTransfer,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreditCard => write!(f, "credit_card"),
            Self::Paypal => write!(f, "paypal"),
            Self::BankTransfer => write!(f, "bank_transfer"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" | "card" => Ok(Self::CreditCard),
            "paypal" => Ok(Self::Paypal),
            "bank_transfer" | "bank" => Ok(Self::BankTransfer),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Card network, detected from the leading digits of the card number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

/// Product category.
///
/// `All` is only meaningful as a browsing filter; products carry one of the
/// concrete categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    All,
    Clothes,
    Art,
    Accessories,
    #[default]
    Miscellaneous,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Clothes,
        Self::Art,
        Self::Accessories,
        Self::Miscellaneous,
    ];

    /// Whether a product in `self` passes the given browsing filter.
    #[must_use]
    pub fn matches(self, filter: Self) -> bool {
        filter == Self::All || filter == self
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "All",
            Self::Clothes => "Clothes",
            Self::Art => "Art",
            Self::Accessories => "Accessories",
            Self::Miscellaneous => "Miscellaneous",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Shipped).unwrap(),
            "\"shipped\""
        );
    }

    #[test]
    fn test_payment_method_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        assert_eq!(
            "card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_category_filter() {
        assert!(Category::Art.matches(Category::All));
        assert!(Category::Art.matches(Category::Art));
        assert!(!Category::Art.matches(Category::Clothes));
    }

    #[test]
    fn test_category_from_str_case_insensitive() {
        assert_eq!("art".parse::<Category>().unwrap(), Category::Art);
        assert_eq!(
            "ACCESSORIES".parse::<Category>().unwrap(),
            Category::Accessories
        );
    }
}
