//! Offline answers used when no model API key is configured.

const STOCK_REPLY: &str = "Stock levels are tracked per product. Open the Products page to see \
     quantities on hand, or filter by low stock to find items at or below their minimum.";

const SALES_REPLY: &str = "Sales totals and the daily trend are on the Analytics page. \
     The sales trend chart covers the last 30 days by default.";

const LOW_STOCK_REPLY: &str = "Products whose quantity has reached their minimum stock level are \
     flagged as Low Stock. The dashboard shows how many there are.";

const CAPABILITIES_REPLY: &str = "I'm your inventory assistant. Ask me about products, stock \
     levels or sales. Connect a model API key for free-form answers.";

/// Picks a canned reply by keyword. Earlier rules win.
pub fn reply_for(query: &str) -> &'static str {
    let query = query.to_lowercase();
    if query.contains("product") && query.contains("stock") {
        STOCK_REPLY
    } else if query.contains("sales") {
        SALES_REPLY
    } else if query.contains("low stock") {
        LOW_STOCK_REPLY
    } else {
        CAPABILITIES_REPLY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_checked_in_order() {
        assert_eq!(reply_for("How many PRODUCTS are in stock?"), STOCK_REPLY);
        assert_eq!(reply_for("sales this month"), SALES_REPLY);
        // "product" + "stock" outranks "sales".
        assert_eq!(reply_for("product stock and sales"), STOCK_REPLY);
        assert_eq!(reply_for("anything on low stock?"), LOW_STOCK_REPLY);
        assert_eq!(reply_for("hello"), CAPABILITIES_REPLY);
    }
}
