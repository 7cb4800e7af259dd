/// Flag images of the source site
pub const FLAG_BASE_URL: &str = "https://www.worldpadeltour.com/media/images/flags";

const COUNTRIES: &[(&str, &str)] = &[
    ("AD", "Andorra"),
    ("AE", "United Arab Emirates"),
    ("AR", "Argentina"),
    ("AT", "Austria"),
    ("AU", "Australia"),
    ("BE", "Belgium"),
    ("BR", "Brazil"),
    ("CH", "Switzerland"),
    ("CL", "Chile"),
    ("CO", "Colombia"),
    ("CZ", "Czech Republic"),
    ("DE", "Germany"),
    ("DK", "Denmark"),
    ("EC", "Ecuador"),
    ("EE", "Estonia"),
    ("ES", "Spain"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("IE", "Ireland"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("MA", "Morocco"),
    ("MX", "Mexico"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("PT", "Portugal"),
    ("PY", "Paraguay"),
    ("QA", "Qatar"),
    ("RU", "Russia"),
    ("SE", "Sweden"),
    ("US", "United States"),
    ("UY", "Uruguay"),
    ("VE", "Venezuela"),
];

/// English name of an ISO 3166 alpha-2 code, when known
pub fn country_name(code: &str) -> Option<&'static str> {
    let code = code.to_uppercase();
    COUNTRIES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

pub fn flag_url(code: &str) -> String {
    format!("{}/{}.png", FLAG_BASE_URL, code.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_lookup() {
        assert_eq!(country_name("es"), Some("Spain"));
        assert_eq!(country_name("ZZ"), None);
        assert_eq!(flag_url("AR"), "https://www.worldpadeltour.com/media/images/flags/AR.png");
    }
}
