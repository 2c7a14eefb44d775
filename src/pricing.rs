use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

pub const ADULT_FARE: Decimal = dec!(100.00);
pub const CHILD_FARE: Decimal = dec!(60.00);
pub const INFANT_FARE: Decimal = dec!(30.00);
pub const BAG_FEE: Decimal = dec!(30.00);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FareLine {
    pub item: &'static str,
    pub count: u32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FareQuote {
    pub lines: Vec<FareLine>,
    pub total: Decimal,
}

/// Itemized fare for the given traveler and bag counts. Zero-count
/// categories are left out of the breakdown; the arithmetic is exact.
pub fn quote(adults: u32, children: u32, infants: u32, bags: u32) -> FareQuote {
    let mut lines = Vec::new();
    let mut total = Decimal::ZERO;

    for (item, count, unit_price) in [
        ("adults", adults, ADULT_FARE),
        ("children", children, CHILD_FARE),
        ("infants", infants, INFANT_FARE),
        ("bags", bags, BAG_FEE),
    ] {
        if count == 0 {
            continue;
        }
        let amount = Decimal::from(count) * unit_price;
        total += amount;
        lines.push(FareLine {
            item,
            count,
            unit_price,
            amount,
        });
    }

    FareQuote { lines, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_linear_in_counts() {
        let q = quote(2, 1, 1, 3);
        assert_eq!(q.total, dec!(380.00));

        let q = quote(1, 0, 0, 0);
        assert_eq!(q.total, ADULT_FARE);

        for (a, c, i, b) in [(0, 0, 0, 0), (3, 2, 1, 4), (10, 0, 5, 0)] {
            let expected = Decimal::from(a) * ADULT_FARE
                + Decimal::from(c) * CHILD_FARE
                + Decimal::from(i) * INFANT_FARE
                + Decimal::from(b) * BAG_FEE;
            assert_eq!(quote(a, c, i, b).total, expected);
        }
    }

    #[test]
    fn test_zero_count_categories_omitted() {
        let q = quote(2, 0, 1, 0);
        let items: Vec<&str> = q.lines.iter().map(|l| l.item).collect();
        assert_eq!(items, vec!["adults", "infants"]);
    }

    #[test]
    fn test_itemized_amounts() {
        let q = quote(2, 3, 0, 1);
        assert_eq!(q.lines[0].amount, dec!(200.00));
        assert_eq!(q.lines[1].amount, dec!(180.00));
        assert_eq!(q.lines[2].amount, dec!(30.00));
        assert_eq!(q.total, dec!(410.00));
    }

    #[test]
    fn test_empty_booking_totals_zero() {
        let q = quote(0, 0, 0, 0);
        assert!(q.lines.is_empty());
        assert_eq!(q.total, Decimal::ZERO);
    }
}
