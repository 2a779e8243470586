//! ASCII slugs for category names and uploaded file names.

/// Turn arbitrary text into a lowercase ASCII slug.
///
/// Common Latin accents are folded (`é` becomes `e`, `œ` becomes `oe`),
/// every other run of non-alphanumeric characters becomes a single `-`,
/// and leading or trailing dashes are dropped. Returns `"file"` when
/// nothing usable is left.
///
/// ```
/// use auxilia_core::slugify;
///
/// assert_eq!(slugify("Maison & Décoration"), "maison-decoration");
/// assert_eq!(slugify("../../etc/passwd"), "etc-passwd");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        let folded = fold(c);
        let mut emitted = false;
        for f in folded.chars() {
            if f.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(f.to_ascii_lowercase());
                emitted = true;
            }
        }
        if !emitted {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "file".to_owned()
    } else {
        slug
    }
}

fn fold(c: char) -> String {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "o",
        'œ' | 'Œ' => "oe",
        'ß' => "ss",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        _ => return c.to_string(),
    };
    folded.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folds_french_accents() {
        assert_eq!(slugify("Électronique"), "electronique");
        assert_eq!(slugify("Vêtements"), "vetements");
        assert_eq!(slugify("Bœuf à l'étouffée"), "boeuf-a-l-etouffee");
    }

    #[test]
    fn test_collapses_separators() {
        assert_eq!(slugify("  Sport   &  Fitness!! "), "sport-fitness");
        assert_eq!(slugify("casque_audio.v2"), "casque-audio-v2");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(slugify(""), "file");
        assert_eq!(slugify("日本"), "file");
        assert_eq!(slugify("---"), "file");
    }
}
