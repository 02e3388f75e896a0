//! Template catalog — the static list of leathercraft pattern templates.
//!
//! DESIGN
//! ======
//! Templates are authored here at build time and never change at runtime.
//! Image references are file names relative to the template asset directory;
//! the router serves that directory and prefixes the names into URLs.

use serde::Serialize;

/// A named template with its ordered reference images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub id: u32,
    pub name: &'static str,
    pub images: &'static [&'static str],
}

/// Built-in catalog, in authoring order.
pub static TEMPLATES: &[Template] = &[
    Template { id: 1, name: "Кошелёк", images: &["wallet.png"] },
    Template { id: 2, name: "Зажим для денег", images: &["money_keeper_1.png", "money_keeper_2.png"] },
    Template { id: 3, name: "Сумка", images: &["bag1.png", "bag2.png", "bag3.png"] },
    Template { id: 4, name: "Картхолдер", images: &["cardholder1.png", "cardholder2.png", "cardholder3.png"] },
    Template {
        id: 5,
        name: "Рюкзак",
        images: &[
            "backpack1.png",
            "backpack2.png",
            "backpack3.png",
            "backpack4.png",
            "backpack5.png",
            "backpack6.png",
            "backpack7.png",
            "backpack8.png",
            "backpack9.png",
            "backpack10.png",
            "backpack11.png",
            "backpack12.png",
        ],
    },
];

/// Templates whose name contains `query`, ignoring case, in catalog order.
/// An empty query matches everything.
#[must_use]
pub fn filter_templates<'a>(catalog: &'a [Template], query: &str) -> Vec<&'a Template> {
    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|template| template.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
