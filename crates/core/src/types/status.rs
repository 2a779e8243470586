//! Status enums for orders, users and stock.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Checkout writes `Paid` directly; the remaining values are set from the
/// back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Paid,
        Self::Confirmed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Machine name, as stored in the database and used in query strings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human label shown to customers and staff.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Paid => "Payée",
            Self::Confirmed => "Confirmée",
            Self::Shipped => "Expédiée",
            Self::Delivered => "Livrée",
            Self::Cancelled => "Annulée",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular customer.
    #[default]
    User,
    /// Back-office access.
    Admin,
}

impl UserRole {
    /// Human label for the role.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::User => "Utilisateur",
            Self::Admin => "Administrateur",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Stock bucket used to filter the back-office product list.
///
/// | Bucket   | Condition                 |
/// |----------|---------------------------|
/// | `low`    | `stock < 10`, zero too    |
/// | `medium` | `10 <= stock <= 30`       |
/// | `high`   | `stock > 30`              |
/// | `out`    | `stock IS NULL OR = 0`    |
///
/// A product with no stock value only ever falls in `out`. The list shows
/// a product in exactly one bucket, see [`StockFilter::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    Low,
    Medium,
    High,
    Out,
}

impl StockFilter {
    /// Stock strictly below this is "low".
    pub const LOW_THRESHOLD: i32 = 10;
    /// Stock strictly above this is "high".
    pub const HIGH_THRESHOLD: i32 = 30;

    /// Every bucket, in display order.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Out];

    /// Inclusive stock bounds of a tracked-stock bucket. `Out` has none.
    const fn bounds(&self) -> Option<(Option<i32>, Option<i32>)> {
        match self {
            Self::Low => Some((None, Some(Self::LOW_THRESHOLD - 1))),
            Self::Medium => Some((Some(Self::LOW_THRESHOLD), Some(Self::HIGH_THRESHOLD))),
            Self::High => Some((Some(Self::HIGH_THRESHOLD + 1), None)),
            Self::Out => None,
        }
    }

    /// Whether a product with the given stock falls in this bucket.
    ///
    /// A stock of zero matches both `out` and `low`, as the filters do.
    #[must_use]
    pub const fn matches(&self, stock: Option<i32>) -> bool {
        let Some(n) = stock else {
            return matches!(self, Self::Out);
        };
        match self.bounds() {
            None => n == 0,
            Some((min, max)) => {
                let above = match min {
                    Some(min) => n >= min,
                    None => true,
                };
                let below = match max {
                    Some(max) => n <= max,
                    None => true,
                };
                above && below
            }
        }
    }

    /// The bucket a product is shown in. Out of stock wins over `low`.
    #[must_use]
    pub const fn classify(stock: Option<i32>) -> Self {
        match stock {
            None | Some(0) => Self::Out,
            Some(n) if n < Self::LOW_THRESHOLD => Self::Low,
            Some(n) if n <= Self::HIGH_THRESHOLD => Self::Medium,
            Some(_) => Self::High,
        }
    }

    /// SQL predicate over the `stock` column for this bucket.
    #[must_use]
    pub fn sql_predicate(&self) -> String {
        let Some((min, max)) = self.bounds() else {
            return "(stock IS NULL OR stock = 0)".to_owned();
        };

        let mut predicate = "stock IS NOT NULL".to_owned();
        if let Some(min) = min {
            predicate.push_str(&format!(" AND stock >= {min}"));
        }
        if let Some(max) = max {
            predicate.push_str(&format!(" AND stock <= {max}"));
        }
        predicate
    }

    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Out => "out",
        }
    }

    /// Label for the filter dropdown.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Stock faible (< 10)",
            Self::Medium => "Stock moyen (10-30)",
            Self::High => "Stock élevé (> 30)",
            Self::Out => "Rupture",
        }
    }
}

impl std::str::FromStr for StockFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| format!("invalid stock filter: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_labels() {
        assert_eq!(OrderStatus::Paid.label(), "Payée");
        assert_eq!(OrderStatus::Cancelled.label(), "Annulée");
    }

    #[test]
    fn test_user_role_parse() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("ROLE_ADMIN".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_stock_bucket_boundaries() {
        use StockFilter::{High, Low, Medium, Out};

        // stock, then the buckets whose filter lists it
        let table: [(i32, &[StockFilter]); 5] = [
            (0, &[Low, Out]),
            (9, &[Low]),
            (10, &[Medium]),
            (30, &[Medium]),
            (31, &[High]),
        ];
        for (stock, expected) in table {
            for bucket in StockFilter::ALL {
                assert_eq!(
                    bucket.matches(Some(stock)),
                    expected.contains(&bucket),
                    "{bucket:?} at {stock}"
                );
            }
        }
    }

    #[test]
    fn test_sql_predicate_follows_thresholds() {
        assert_eq!(
            StockFilter::Low.sql_predicate(),
            format!("stock IS NOT NULL AND stock <= {}", StockFilter::LOW_THRESHOLD - 1)
        );
        assert_eq!(
            StockFilter::Medium.sql_predicate(),
            format!(
                "stock IS NOT NULL AND stock >= {} AND stock <= {}",
                StockFilter::LOW_THRESHOLD,
                StockFilter::HIGH_THRESHOLD
            )
        );
        assert_eq!(
            StockFilter::High.sql_predicate(),
            format!("stock IS NOT NULL AND stock >= {}", StockFilter::HIGH_THRESHOLD + 1)
        );
        assert_eq!(StockFilter::Out.sql_predicate(), "(stock IS NULL OR stock = 0)");
    }

    #[test]
    fn test_classify_shows_zero_as_out() {
        assert_eq!(StockFilter::classify(None), StockFilter::Out);
        assert_eq!(StockFilter::classify(Some(0)), StockFilter::Out);
        assert_eq!(StockFilter::classify(Some(1)), StockFilter::Low);
        assert_eq!(StockFilter::classify(Some(9)), StockFilter::Low);
        assert_eq!(StockFilter::classify(Some(10)), StockFilter::Medium);
        assert_eq!(StockFilter::classify(Some(30)), StockFilter::Medium);
        assert_eq!(StockFilter::classify(Some(31)), StockFilter::High);
        for stock in [None, Some(0), Some(9), Some(10), Some(30), Some(31)] {
            assert!(StockFilter::classify(stock).matches(stock));
        }
    }

    #[test]
    fn test_missing_stock_is_only_out() {
        assert!(StockFilter::Out.matches(None));
        assert!(StockFilter::Out.matches(Some(0)));
        assert!(!StockFilter::Out.matches(Some(1)));
        for bucket in [StockFilter::Low, StockFilter::Medium, StockFilter::High] {
            assert!(!bucket.matches(None));
        }
    }

    #[test]
    fn test_stock_filter_parse() {
        assert_eq!("medium".parse::<StockFilter>().unwrap(), StockFilter::Medium);
        assert!("".parse::<StockFilter>().is_err());
    }
}
