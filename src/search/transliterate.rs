//! Cyrillic to Latin transliteration for search matching
//!
//! Follows the Ukrainian national romanization, with the Russian-only
//! letters folded to their closest Latin form. Output is lowercase.

/// Romanize `text`; non-Cyrillic characters pass through lowercased
pub fn to_latin(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        match romanize(ch) {
            Some(latin) => out.push_str(latin),
            None => out.push(ch),
        }
    }
    out
}

/// Whether `text` contains anything `to_latin` would rewrite
pub fn has_cyrillic(text: &str) -> bool {
    text.chars()
        .flat_map(char::to_lowercase)
        .any(|ch| romanize(ch).is_some())
}

fn romanize(ch: char) -> Option<&'static str> {
    let latin = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' => "ie",
        'ж' => "zh",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' => "i",
        'й' => "i",
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
        'ь' | 'ъ' | '\'' | '’' | 'ʼ' => "",
        'ю' => "iu",
        'я' => "ia",
        'ё' => "e",
        'ы' => "y",
        'э' => "e",
        _ => return None,
    };
    Some(latin)
}
