//! Downloadable CSV templates: the importer's own columns plus example rows.

use vitrine_core::EntityKind;

use crate::csv::generate;
use crate::importers::{
    BRAND_COLUMNS, CATEGORY_COLUMNS, CITY_ARTICLE_COLUMNS, CITY_COLUMNS, FILTER_COLUMNS,
    PRODUCT_COLUMNS,
};

const BRAND_EXAMPLES: &[&[&str]] = &[
    &[
        "Tissot",
        "tissot",
        "Swiss watchmaker since 1853",
        "Швейцария",
        "https://example.com/logos/tissot.png",
        "https://www.tissotwatches.com",
        "1",
        "1",
        "Часы Tissot",
        "Купить часы Tissot",
    ],
    &["Casio", "", "", "Япония", "", "", "2", "1", "", ""],
];

const CATEGORY_EXAMPLES: &[&[&str]] = &[
    &["Мужские часы", "men", "", "", "", "1", "1", "", ""],
    &["Хронографы", "men-chronographs", "men", "", "", "2", "1", "", ""],
];

const PRODUCT_EXAMPLES: &[&[&str]] = &[&[
    "T035.617.11.051.00",
    "Tissot Couturier Chronograph",
    "",
    "tissot",
    "men",
    "45900.00",
    "52900.00",
    "Swiss quartz chronograph",
    r#"[{"group":"case","title":"Корпус","items":[{"name":"Материал корпуса","value":"Сталь"}]}]"#,
    "3",
    "1",
    "0",
    "T035.617.11.051.00.jpg",
    "T035.617.11.051.00_2.jpg|T035.617.11.051.00_3.jpg",
    "",
    "",
]];

const CITY_EXAMPLES: &[&[&str]] = &[
    &[
        "Москва",
        "moskva",
        "Москве",
        "Московская область",
        "13010112",
        "1",
        "0",
        "1",
        "1",
        "Часы с доставкой в Москве",
        "",
    ],
    &["Казань", "", "Казани", "Татарстан", "1308660", "3", "490.00", "2", "1", "", ""],
];

const CITY_ARTICLE_EXAMPLES: &[&[&str]] = &[&[
    "moskva",
    "Доставка часов в Москве",
    "",
    "Курьерская доставка за один день",
    "Полный текст статьи",
    "",
    "1",
    "",
    "",
]];

const FILTER_EXAMPLES: &[&[&str]] = &[
    &["movement", "Механизм", "select", "quartz", "Кварцевый", "", "1"],
    &["movement", "", "", "automatic", "Автоматический", "", "2"],
];

/// Column list and example rows for `entity`.
pub fn template_parts(entity: EntityKind) -> (&'static [&'static str], &'static [&'static [&'static str]]) {
    match entity {
        EntityKind::Brands => (BRAND_COLUMNS, BRAND_EXAMPLES),
        EntityKind::Categories => (CATEGORY_COLUMNS, CATEGORY_EXAMPLES),
        EntityKind::Products => (PRODUCT_COLUMNS, PRODUCT_EXAMPLES),
        EntityKind::Cities => (CITY_COLUMNS, CITY_EXAMPLES),
        EntityKind::CityArticles => (CITY_ARTICLE_COLUMNS, CITY_ARTICLE_EXAMPLES),
        EntityKind::Filters => (FILTER_COLUMNS, FILTER_EXAMPLES),
    }
}

/// Template CSV for `entity`.
pub fn template_csv(entity: EntityKind) -> String {
    let (columns, examples) = template_parts(entity);
    generate(columns, examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse;
    use crate::format::{detect, DetectedFormat};
    use crate::importers::test_support::pool;
    use crate::importers::{
        run_import, BrandImporter, CategoryImporter, CityArticleImporter, CityImporter,
        FilterImporter, ProductImporter,
    };

    #[test]
    fn test_examples_fill_every_column() {
        for entity in EntityKind::ALL {
            let (columns, examples) = template_parts(entity);
            for example in examples {
                assert_eq!(example.len(), columns.len(), "{entity}");
            }

            let parsed = parse(&template_csv(entity));
            assert_eq!(parsed.headers, columns, "{entity}");
            assert_eq!(parsed.rows.len(), examples.len());
            assert_eq!(detect(&parsed.headers), DetectedFormat::Native);
        }
    }

    #[tokio::test]
    async fn test_templates_import_cleanly_in_dependency_order() {
        let pool = pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let rows = |entity| parse(&template_csv(entity)).rows;

        let results = [
            run_import(&mut BrandImporter, &mut conn, &rows(EntityKind::Brands)).await,
            run_import(&mut CategoryImporter, &mut conn, &rows(EntityKind::Categories)).await,
            run_import(&mut ProductImporter, &mut conn, &rows(EntityKind::Products)).await,
            run_import(&mut CityImporter, &mut conn, &rows(EntityKind::Cities)).await,
            run_import(
                &mut CityArticleImporter::new(None),
                &mut conn,
                &rows(EntityKind::CityArticles),
            )
            .await,
            run_import(&mut FilterImporter::new(), &mut conn, &rows(EntityKind::Filters)).await,
        ];

        for result in results {
            let result = result.unwrap();
            assert!(result.errors.is_empty(), "{:?}", result.errors);
            assert!(result.added > 0);
        }
    }
}
