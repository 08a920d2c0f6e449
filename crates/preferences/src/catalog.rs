use serde::Serialize;

/// Display metadata for a dashboard widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub(crate) const CATALOG: &[(&str, WidgetInfo)] = &[
    (
        "total_products",
        WidgetInfo {
            name: "Total Products",
            description: "Shows the total number of products in your inventory.",
        },
    ),
    (
        "total_categories",
        WidgetInfo {
            name: "Total Categories",
            description: "Shows the total number of product categories.",
        },
    ),
    (
        "low_stock_products",
        WidgetInfo {
            name: "Low Stock Products",
            description: "Shows the number of products with stock below minimum level.",
        },
    ),
    (
        "total_value",
        WidgetInfo {
            name: "Total Inventory Value",
            description: "Shows the total value of your current inventory.",
        },
    ),
    (
        "recent_products",
        WidgetInfo {
            name: "Recent Products",
            description: "Shows a list of recently added products.",
        },
    ),
    (
        "categories_with_counts",
        WidgetInfo {
            name: "Categories Overview",
            description: "Shows categories with their product counts.",
        },
    ),
];

/// Name and description for `widget_id`. Unknown ids are named after themselves.
pub fn describe(widget_id: &str) -> (String, String) {
    CATALOG
        .iter()
        .find(|(id, _)| *id == widget_id)
        .map(|(_, info)| (info.name.to_string(), info.description.to_string()))
        .unwrap_or_else(|| (widget_id.to_string(), String::new()))
}

/// One row of the dashboard settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_widgets_have_display_names() {
        let (name, description) = describe("total_value");
        assert_eq!(name, "Total Inventory Value");
        assert!(description.contains("total value"));
    }

    #[test]
    fn unknown_widgets_fall_back_to_their_id() {
        assert_eq!(describe("weather"), ("weather".to_string(), String::new()));
    }
}
