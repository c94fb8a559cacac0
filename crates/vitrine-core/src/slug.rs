//! Slug helpers: Cyrillic transliteration, URL slugs and the reverse
//! title-casing used when taxonomy rows are created from a bare slug.

fn transliterate_char(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}

/// Lowercases the input and replaces Cyrillic letters with Latin equivalents.
/// Everything else passes through unchanged.
pub fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.to_lowercase().chars() {
        match transliterate_char(ch) {
            Some(mapped) => out.push_str(mapped),
            None => out.push(ch),
        }
    }
    out
}

/// URL slug: transliterated, lowercase, runs of anything outside `[a-z0-9]`
/// collapsed to one `-`, no leading or trailing hyphen.
pub fn slugify(input: &str) -> String {
    let mut out = String::new();
    let mut pending_dash = false;
    for ch in transliterate(input.trim()).chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// `imaginary-brand` -> `Imaginary Brand`.
pub fn title_case_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Tissot "), "tissot");
        assert_eq!(slugify("  Frederique  Constant!! "), "frederique-constant");
        assert_eq!(slugify("T035.617.11.051.00"), "t035-617-11-051-00");
        assert_eq!(slugify("--"), "");
    }

    #[test]
    fn slugify_transliterates_cyrillic() {
        assert_eq!(slugify("Мужские часы"), "muzhskie-chasy");
        assert_eq!(slugify("Восток Амфибия"), "vostok-amfibiya");
        assert_eq!(slugify("Щука ёж"), "shchuka-yozh");
    }

    #[test]
    fn title_case_slug_splits_words() {
        assert_eq!(title_case_slug("imaginary-brand"), "Imaginary Brand");
        assert_eq!(title_case_slug("omega"), "Omega");
        assert_eq!(title_case_slug("tag_heuer"), "Tag Heuer");
    }
}
