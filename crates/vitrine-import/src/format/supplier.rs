use std::collections::BTreeMap;

use serde::Serialize;
use vitrine_core::slug::slugify;

use crate::csv::Row;

const COL_BRAND: &str = "Бренд";
const COL_MODEL: &str = "Модель";
const COL_SKU: &str = "Артикул";
const COL_PHOTO: &str = "Фото";
const COL_GENDER: &str = "Пол";
const COL_PRICE: &str = "Цена";
const COL_OLD_PRICE: &str = "Старая цена";
const COL_DESCRIPTION: &str = "Описание";
const NAME_COLUMNS: [&str; 2] = ["Наименование", "Название"];
const STOCK_COLUMNS: [&str; 2] = ["Остаток", "Количество"];

const PHOTO_SEPARATOR: char = ';';
const GALLERY_SEPARATOR: &str = "|";

/// A supplier column copied into a spec group, with the unit appended when
/// the value lacks it.
pub struct SpecColumn {
    pub column: &'static str,
    pub unit: Option<&'static str>,
}

pub struct SpecGroup {
    pub key: &'static str,
    pub title: &'static str,
    pub columns: &'static [SpecColumn],
}

const fn spec(column: &'static str, unit: Option<&'static str>) -> SpecColumn {
    SpecColumn { column, unit }
}

/// Fixed grouping of supplier attribute columns into `specs` groups.
pub const SPEC_GROUPS: [SpecGroup; 4] = [
    SpecGroup {
        key: "case",
        title: "Корпус",
        columns: &[
            spec("Материал корпуса", None),
            spec("Диаметр корпуса", Some("мм")),
            spec("Толщина корпуса", Some("мм")),
            spec("Стекло", None),
            spec("Водозащита", Some("м")),
        ],
    },
    SpecGroup {
        key: "movement",
        title: "Механизм",
        columns: &[
            spec("Механизм", None),
            spec("Калибр", None),
            spec("Запас хода", Some("ч")),
        ],
    },
    SpecGroup {
        key: "appearance",
        title: "Внешний вид",
        columns: &[
            spec("Цвет циферблата", None),
            spec("Материал браслета", None),
            spec("Цвет браслета", None),
        ],
    },
    SpecGroup {
        key: "features",
        title: "Функции",
        columns: &[
            spec("Функции", None),
            spec("Подсветка", None),
            spec("Календарь", None),
        ],
    },
];

/// Supplier gender label to category slug.
fn gender_category(label: &str) -> Option<&'static str> {
    match label.trim() {
        "Мужские" | "Мужской" => Some("men"),
        "Женские" | "Женский" => Some("women"),
        "Унисекс" => Some("unisex"),
        "Детские" | "Детский" => Some("kids"),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct SpecItem<'a> {
    name: &'a str,
    value: String,
}

#[derive(Debug, Serialize)]
struct SpecGroupValue<'a> {
    group: &'a str,
    title: &'a str,
    items: Vec<SpecItem<'a>>,
}

/// Native product rows plus the taxonomy names discovered while converting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierConversion {
    pub rows: Vec<Row>,
    /// `brand slug -> display name`
    pub brand_names: BTreeMap<String, String>,
    /// `category slug -> display name`
    pub category_names: BTreeMap<String, String>,
}

fn is_placeholder(value: &str) -> bool {
    matches!(value, "" | "-" | "—" | "–")
}

fn with_unit(value: &str, unit: Option<&str>) -> String {
    match unit {
        Some(unit) if !value.contains(unit) => format!("{} {}", value, unit),
        _ => value.to_string(),
    }
}

fn build_specs(row: &Row) -> Result<String, serde_json::Error> {
    let groups: Vec<SpecGroupValue> = SPEC_GROUPS
        .iter()
        .filter_map(|group| {
            let items: Vec<SpecItem> = group
                .columns
                .iter()
                .filter_map(|spec| {
                    let value = row.get(spec.column).trim();
                    (!is_placeholder(value)).then(|| SpecItem {
                        name: spec.column,
                        value: with_unit(value, spec.unit),
                    })
                })
                .collect();
            (!items.is_empty()).then_some(SpecGroupValue {
                group: group.key,
                title: group.title,
                items,
            })
        })
        .collect();

    if groups.is_empty() {
        return Ok(String::new());
    }
    serde_json::to_string(&groups)
}

/// Filename for one `Фото` entry: bare numeric ids get `.jpg`.
pub fn photo_reference(raw: &str) -> String {
    let raw = raw.trim();
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("{}.jpg", raw)
    } else {
        raw.to_string()
    }
}

fn first_present<'a>(row: &'a Row, columns: &[&str]) -> Option<&'a str> {
    columns
        .iter()
        .find(|column| row.has(column))
        .map(|column| row.get(column))
}

fn has_any(headers: &[&str], columns: &[&str]) -> bool {
    columns.iter().any(|column| headers.contains(column))
}

/// Rewrite supplier rows into the native product shape.
///
/// Native columns are emitted only when their supplier source column exists
/// in the header, so an absent supplier column keeps the stored value.
pub fn convert(rows: &[Row]) -> Result<SupplierConversion, serde_json::Error> {
    let mut conversion = SupplierConversion::default();
    let Some(first) = rows.first() else {
        return Ok(conversion);
    };

    let headers: Vec<&str> = first.columns().collect();
    let spec_columns: Vec<&str> = SPEC_GROUPS
        .iter()
        .flat_map(|group| group.columns.iter().map(|spec| spec.column))
        .collect();

    for row in rows {
        let mut native = Row::new(row.line);

        let brand = row.get(COL_BRAND).trim();
        let model = row.get(COL_MODEL).trim();

        if headers.contains(&COL_SKU) {
            native.set("sku", row.get(COL_SKU));
        }

        let name = match first_present(row, &NAME_COLUMNS).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("{} {}", brand, model).trim().to_string(),
        };
        native.set("name", name);

        if headers.contains(&COL_BRAND) {
            let brand_slug = slugify(brand);
            if !brand_slug.is_empty() {
                conversion
                    .brand_names
                    .entry(brand_slug.clone())
                    .or_insert_with(|| brand.to_string());
            }
            native.set("brand_slug", brand_slug);
        }

        if headers.contains(&COL_GENDER) {
            let label = row.get(COL_GENDER).trim();
            // Unknown labels leave the column out so an update keeps the stored category.
            if let Some(category_slug) = gender_category(label) {
                conversion
                    .category_names
                    .entry(category_slug.to_string())
                    .or_insert_with(|| label.to_string());
                native.set("category_slug", category_slug);
            }
        }

        if headers.contains(&COL_PRICE) {
            native.set("price", row.get(COL_PRICE));
        }
        if headers.contains(&COL_OLD_PRICE) {
            native.set("old_price", row.get(COL_OLD_PRICE));
        }
        if headers.contains(&COL_DESCRIPTION) {
            native.set("description", row.get(COL_DESCRIPTION));
        }
        if let Some(stock) = first_present(row, &STOCK_COLUMNS) {
            native.set("stock", stock);
        }

        if has_any(&headers, &spec_columns) {
            native.set("specs", build_specs(row)?);
        }

        if headers.contains(&COL_PHOTO) {
            let mut photos = row
                .get(COL_PHOTO)
                .split(PHOTO_SEPARATOR)
                .map(photo_reference)
                .filter(|photo| !photo.is_empty());
            let main = photos.next().unwrap_or_default();
            let gallery: Vec<String> = photos.collect();
            native.set("main_image", main);
            native.set("gallery_images", gallery.join(GALLERY_SEPARATOR));
        }

        conversion.rows.push(native);
    }

    tracing::debug!(
        rows = conversion.rows.len(),
        brands = conversion.brand_names.len(),
        categories = conversion.category_names.len(),
        "Supplier rows converted"
    );

    Ok(conversion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse;

    fn supplier_csv() -> Vec<Row> {
        parse(
            "Бренд,Модель,Артикул,Пол,Цена,Фото,Диаметр корпуса,Водозащита,Механизм,Цвет циферблата,Функции\n\
             Tissot ,PRX,T137.410.11.041.00,Мужские,45 990,12;34;56,40,100 м,Кварцевый,—,-\n\
             Casio,G-Shock,GA-2100,Космос,12990,,,,,,\n",
        )
        .rows
    }

    #[test]
    fn test_brand_slug_and_photos() {
        let converted = convert(&supplier_csv()).unwrap();
        let row = &converted.rows[0];

        assert_eq!(row.get("brand_slug"), "tissot");
        assert_eq!(row.get("main_image"), "12.jpg");
        assert_eq!(row.get("gallery_images"), "34.jpg|56.jpg");
        assert_eq!(row.get("sku"), "T137.410.11.041.00");
        assert_eq!(row.get("name"), "Tissot PRX");
        assert_eq!(row.get("price"), "45 990");
        assert_eq!(row.line, 2);

        assert_eq!(
            converted.brand_names.get("tissot").map(String::as_str),
            Some("Tissot")
        );
    }

    #[test]
    fn test_gender_lookup_is_closed() {
        let converted = convert(&supplier_csv()).unwrap();

        assert_eq!(converted.rows[0].get("category_slug"), "men");
        assert!(!converted.rows[1].has("category_slug"));
        assert_eq!(converted.category_names.len(), 1);
        assert_eq!(
            converted.category_names.get("men").map(String::as_str),
            Some("Мужские")
        );
    }

    #[test]
    fn test_specs_groups_skip_placeholders_and_add_units() {
        let converted = convert(&supplier_csv()).unwrap();
        let specs: serde_json::Value =
            serde_json::from_str(converted.rows[0].get("specs")).unwrap();

        let groups = specs.as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["group"], "case");
        assert_eq!(groups[0]["items"][0]["value"], "40 мм");
        // Unit already present: not appended twice.
        assert_eq!(groups[0]["items"][1]["value"], "100 м");
        assert_eq!(groups[1]["group"], "movement");
        assert_eq!(groups[1]["items"].as_array().unwrap().len(), 1);

        assert_eq!(converted.rows[1].get("specs"), "");
        assert_eq!(converted.rows[1].get("main_image"), "");
    }

    #[test]
    fn test_absent_supplier_columns_are_not_emitted() {
        let rows = parse("Артикул,Цена\nRS-1,100\n").rows;
        let converted = convert(&rows).unwrap();
        let row = &converted.rows[0];

        assert!(row.has("sku"));
        assert!(row.has("price"));
        assert!(!row.has("brand_slug"));
        assert!(!row.has("main_image"));
        assert!(!row.has("specs"));
        assert!(!row.has("old_price"));
    }

    #[test]
    fn test_named_column_wins_over_brand_and_model() {
        let rows = parse("Бренд,Модель,Наименование\nOmega,Speedmaster,Omega Moonwatch\n").rows;
        let converted = convert(&rows).unwrap();
        assert_eq!(converted.rows[0].get("name"), "Omega Moonwatch");
    }

    #[test]
    fn test_photo_reference() {
        assert_eq!(photo_reference(" 42 "), "42.jpg");
        assert_eq!(photo_reference("front.png"), "front.png");
        assert_eq!(photo_reference(""), "");
    }
}
