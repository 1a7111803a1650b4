//! ISO 639 language and ISO 3166 country code lookups.

/// `(ISO 639-1, ISO 639-2/B, ISO 639-3, English name)`.
const LANGUAGES: &[(&str, &str, &str, &str)] = &[
    ("af", "afr", "afr", "afrikaans"),
    ("am", "amh", "amh", "amharic"),
    ("ar", "ara", "ara", "arabic"),
    ("az", "aze", "aze", "azerbaijani"),
    ("be", "bel", "bel", "belarusian"),
    ("bg", "bul", "bul", "bulgarian"),
    ("bn", "ben", "ben", "bengali"),
    ("bo", "tib", "bod", "tibetan"),
    ("br", "bre", "bre", "breton"),
    ("bs", "bos", "bos", "bosnian"),
    ("ca", "cat", "cat", "catalan"),
    ("cs", "cze", "ces", "czech"),
    ("cy", "wel", "cym", "welsh"),
    ("da", "dan", "dan", "danish"),
    ("de", "ger", "deu", "german"),
    ("el", "gre", "ell", "greek"),
    ("en", "eng", "eng", "english"),
    ("eo", "epo", "epo", "esperanto"),
    ("es", "spa", "spa", "spanish"),
    ("et", "est", "est", "estonian"),
    ("eu", "baq", "eus", "basque"),
    ("fa", "per", "fas", "persian"),
    ("fi", "fin", "fin", "finnish"),
    ("fr", "fre", "fra", "french"),
    ("fy", "fry", "fry", "western frisian"),
    ("ga", "gle", "gle", "irish"),
    ("gd", "gla", "gla", "scottish gaelic"),
    ("gl", "glg", "glg", "galician"),
    ("gu", "guj", "guj", "gujarati"),
    ("ha", "hau", "hau", "hausa"),
    ("he", "heb", "heb", "hebrew"),
    ("hi", "hin", "hin", "hindi"),
    ("hr", "hrv", "hrv", "croatian"),
    ("hu", "hun", "hun", "hungarian"),
    ("hy", "arm", "hye", "armenian"),
    ("ia", "ina", "ina", "interlingua"),
    ("id", "ind", "ind", "indonesian"),
    ("is", "ice", "isl", "icelandic"),
    ("it", "ita", "ita", "italian"),
    ("ja", "jpn", "jpn", "japanese"),
    ("ka", "geo", "kat", "georgian"),
    ("kk", "kaz", "kaz", "kazakh"),
    ("km", "khm", "khm", "khmer"),
    ("kn", "kan", "kan", "kannada"),
    ("ko", "kor", "kor", "korean"),
    ("ku", "kur", "kur", "kurdish"),
    ("la", "lat", "lat", "latin"),
    ("lb", "ltz", "ltz", "luxembourgish"),
    ("lo", "lao", "lao", "lao"),
    ("lt", "lit", "lit", "lithuanian"),
    ("lv", "lav", "lav", "latvian"),
    ("mk", "mac", "mkd", "macedonian"),
    ("ml", "mal", "mal", "malayalam"),
    ("mn", "mon", "mon", "mongolian"),
    ("mr", "mar", "mar", "marathi"),
    ("ms", "may", "msa", "malay"),
    ("mt", "mlt", "mlt", "maltese"),
    ("my", "bur", "mya", "burmese"),
    ("nb", "nob", "nob", "norwegian bokmal"),
    ("ne", "nep", "nep", "nepali"),
    ("nl", "dut", "nld", "dutch"),
    ("nn", "nno", "nno", "norwegian nynorsk"),
    ("no", "nor", "nor", "norwegian"),
    ("oc", "oci", "oci", "occitan"),
    ("pa", "pan", "pan", "punjabi"),
    ("pl", "pol", "pol", "polish"),
    ("ps", "pus", "pus", "pashto"),
    ("pt", "por", "por", "portuguese"),
    ("rm", "roh", "roh", "romansh"),
    ("ro", "rum", "ron", "romanian"),
    ("ru", "rus", "rus", "russian"),
    ("sa", "san", "san", "sanskrit"),
    ("si", "sin", "sin", "sinhala"),
    ("sk", "slo", "slk", "slovak"),
    ("sl", "slv", "slv", "slovenian"),
    ("so", "som", "som", "somali"),
    ("sq", "alb", "sqi", "albanian"),
    ("sr", "srp", "srp", "serbian"),
    ("sv", "swe", "swe", "swedish"),
    ("sw", "swa", "swa", "swahili"),
    ("ta", "tam", "tam", "tamil"),
    ("te", "tel", "tel", "telugu"),
    ("th", "tha", "tha", "thai"),
    ("tl", "tgl", "tgl", "tagalog"),
    ("tr", "tur", "tur", "turkish"),
    ("uk", "ukr", "ukr", "ukrainian"),
    ("ur", "urd", "urd", "urdu"),
    ("uz", "uzb", "uzb", "uzbek"),
    ("vi", "vie", "vie", "vietnamese"),
    ("xh", "xho", "xho", "xhosa"),
    ("yi", "yid", "yid", "yiddish"),
    ("yo", "yor", "yor", "yoruba"),
    ("zh", "chi", "zho", "chinese"),
    ("zu", "zul", "zul", "zulu"),
    ("", "grc", "grc", "ancient greek"),
];

/// `(ISO 3166-1 alpha-2, alpha-3)`.
const COUNTRIES: &[(&str, &str)] = &[
    ("AD", "AND"), ("AE", "ARE"), ("AF", "AFG"), ("AG", "ATG"), ("AI", "AIA"),
    ("AL", "ALB"), ("AM", "ARM"), ("AO", "AGO"), ("AQ", "ATA"), ("AR", "ARG"),
    ("AS", "ASM"), ("AT", "AUT"), ("AU", "AUS"), ("AW", "ABW"), ("AX", "ALA"),
    ("AZ", "AZE"), ("BA", "BIH"), ("BB", "BRB"), ("BD", "BGD"), ("BE", "BEL"),
    ("BF", "BFA"), ("BG", "BGR"), ("BH", "BHR"), ("BI", "BDI"), ("BJ", "BEN"),
    ("BL", "BLM"), ("BM", "BMU"), ("BN", "BRN"), ("BO", "BOL"), ("BQ", "BES"),
    ("BR", "BRA"), ("BS", "BHS"), ("BT", "BTN"), ("BV", "BVT"), ("BW", "BWA"),
    ("BY", "BLR"), ("BZ", "BLZ"), ("CA", "CAN"), ("CC", "CCK"), ("CD", "COD"),
    ("CF", "CAF"), ("CG", "COG"), ("CH", "CHE"), ("CI", "CIV"), ("CK", "COK"),
    ("CL", "CHL"), ("CM", "CMR"), ("CN", "CHN"), ("CO", "COL"), ("CR", "CRI"),
    ("CU", "CUB"), ("CV", "CPV"), ("CW", "CUW"), ("CX", "CXR"), ("CY", "CYP"),
    ("CZ", "CZE"), ("DE", "DEU"), ("DJ", "DJI"), ("DK", "DNK"), ("DM", "DMA"),
    ("DO", "DOM"), ("DZ", "DZA"), ("EC", "ECU"), ("EE", "EST"), ("EG", "EGY"),
    ("EH", "ESH"), ("ER", "ERI"), ("ES", "ESP"), ("ET", "ETH"), ("FI", "FIN"),
    ("FJ", "FJI"), ("FK", "FLK"), ("FM", "FSM"), ("FO", "FRO"), ("FR", "FRA"),
    ("GA", "GAB"), ("GB", "GBR"), ("GD", "GRD"), ("GE", "GEO"), ("GF", "GUF"),
    ("GG", "GGY"), ("GH", "GHA"), ("GI", "GIB"), ("GL", "GRL"), ("GM", "GMB"),
    ("GN", "GIN"), ("GP", "GLP"), ("GQ", "GNQ"), ("GR", "GRC"), ("GS", "SGS"),
    ("GT", "GTM"), ("GU", "GUM"), ("GW", "GNB"), ("GY", "GUY"), ("HK", "HKG"),
    ("HM", "HMD"), ("HN", "HND"), ("HR", "HRV"), ("HT", "HTI"), ("HU", "HUN"),
    ("ID", "IDN"), ("IE", "IRL"), ("IL", "ISR"), ("IM", "IMN"), ("IN", "IND"),
    ("IO", "IOT"), ("IQ", "IRQ"), ("IR", "IRN"), ("IS", "ISL"), ("IT", "ITA"),
    ("JE", "JEY"), ("JM", "JAM"), ("JO", "JOR"), ("JP", "JPN"), ("KE", "KEN"),
    ("KG", "KGZ"), ("KH", "KHM"), ("KI", "KIR"), ("KM", "COM"), ("KN", "KNA"),
    ("KP", "PRK"), ("KR", "KOR"), ("KW", "KWT"), ("KY", "CYM"), ("KZ", "KAZ"),
    ("LA", "LAO"), ("LB", "LBN"), ("LC", "LCA"), ("LI", "LIE"), ("LK", "LKA"),
    ("LR", "LBR"), ("LS", "LSO"), ("LT", "LTU"), ("LU", "LUX"), ("LV", "LVA"),
    ("LY", "LBY"), ("MA", "MAR"), ("MC", "MCO"), ("MD", "MDA"), ("ME", "MNE"),
    ("MF", "MAF"), ("MG", "MDG"), ("MH", "MHL"), ("MK", "MKD"), ("ML", "MLI"),
    ("MM", "MMR"), ("MN", "MNG"), ("MO", "MAC"), ("MP", "MNP"), ("MQ", "MTQ"),
    ("MR", "MRT"), ("MS", "MSR"), ("MT", "MLT"), ("MU", "MUS"), ("MV", "MDV"),
    ("MW", "MWI"), ("MX", "MEX"), ("MY", "MYS"), ("MZ", "MOZ"), ("NA", "NAM"),
    ("NC", "NCL"), ("NE", "NER"), ("NF", "NFK"), ("NG", "NGA"), ("NI", "NIC"),
    ("NL", "NLD"), ("NO", "NOR"), ("NP", "NPL"), ("NR", "NRU"), ("NU", "NIU"),
    ("NZ", "NZL"), ("OM", "OMN"), ("PA", "PAN"), ("PE", "PER"), ("PF", "PYF"),
    ("PG", "PNG"), ("PH", "PHL"), ("PK", "PAK"), ("PL", "POL"), ("PM", "SPM"),
    ("PN", "PCN"), ("PR", "PRI"), ("PS", "PSE"), ("PT", "PRT"), ("PW", "PLW"),
    ("PY", "PRY"), ("QA", "QAT"), ("RE", "REU"), ("RO", "ROU"), ("RS", "SRB"),
    ("RU", "RUS"), ("RW", "RWA"), ("SA", "SAU"), ("SB", "SLB"), ("SC", "SYC"),
    ("SD", "SDN"), ("SE", "SWE"), ("SG", "SGP"), ("SH", "SHN"), ("SI", "SVN"),
    ("SJ", "SJM"), ("SK", "SVK"), ("SL", "SLE"), ("SM", "SMR"), ("SN", "SEN"),
    ("SO", "SOM"), ("SR", "SUR"), ("SS", "SSD"), ("ST", "STP"), ("SV", "SLV"),
    ("SX", "SXM"), ("SY", "SYR"), ("SZ", "SWZ"), ("TC", "TCA"), ("TD", "TCD"),
    ("TF", "ATF"), ("TG", "TGO"), ("TH", "THA"), ("TJ", "TJK"), ("TK", "TKL"),
    ("TL", "TLS"), ("TM", "TKM"), ("TN", "TUN"), ("TO", "TON"), ("TR", "TUR"),
    ("TT", "TTO"), ("TV", "TUV"), ("TW", "TWN"), ("TZ", "TZA"), ("UA", "UKR"),
    ("UG", "UGA"), ("UM", "UMI"), ("US", "USA"), ("UY", "URY"), ("UZ", "UZB"),
    ("VA", "VAT"), ("VC", "VCT"), ("VE", "VEN"), ("VG", "VGB"), ("VI", "VIR"),
    ("VN", "VNM"), ("VU", "VUT"), ("WF", "WLF"), ("WS", "WSM"), ("YE", "YEM"),
    ("YT", "MYT"), ("ZA", "ZAF"), ("ZM", "ZMB"), ("ZW", "ZWE"),
];

/// ISO 639-3 code, uppercased, for a language code or English name.
///
/// Accepts ISO 639-1 (`pl`), ISO 639-2 bibliographic (`ger`) or
/// terminological (`deu`) codes and English names (`english`), in any case.
#[must_use]
pub fn language_alpha3(value: &str) -> Option<String> {
    let v = value.trim().to_lowercase();
    if v.is_empty() {
        return None;
    }
    LANGUAGES
        .iter()
        .find(|(a2, bib, a3, name)| {
            (!a2.is_empty() && *a2 == v) || *bib == v || *a3 == v || *name == v
        })
        .map(|(_, _, a3, _)| a3.to_uppercase())
}

/// ISO 3166-1 alpha-3 code for an alpha-2 code (or a valid alpha-3 code).
#[must_use]
pub fn country_alpha3(value: &str) -> Option<String> {
    let v = value.trim().to_uppercase();
    COUNTRIES
        .iter()
        .find(|(a2, a3)| *a2 == v || *a3 == v)
        .map(|(_, a3)| (*a3).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_lookup() {
        assert_eq!(language_alpha3("eng").as_deref(), Some("ENG"));
        assert_eq!(language_alpha3("English").as_deref(), Some("ENG"));
        assert_eq!(language_alpha3("fre").as_deref(), Some("FRA"));
        assert_eq!(language_alpha3("pl").as_deref(), Some("POL"));
        assert_eq!(language_alpha3("ger").as_deref(), Some("DEU"));
        assert_eq!(language_alpha3("deu").as_deref(), Some("DEU"));
        assert_eq!(language_alpha3("xx"), None);
        assert_eq!(language_alpha3(""), None);
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(country_alpha3("IT").as_deref(), Some("ITA"));
        assert_eq!(country_alpha3("ch").as_deref(), Some("CHE"));
        assert_eq!(country_alpha3("CHE").as_deref(), Some("CHE"));
        assert_eq!(country_alpha3("XX"), None);
    }

    #[test]
    fn test_tables_have_unique_codes() {
        let mut seen = std::collections::HashSet::new();
        for (a2, _) in COUNTRIES {
            assert!(seen.insert(*a2), "duplicate {a2}");
        }
        let mut seen = std::collections::HashSet::new();
        for (_, _, a3, _) in LANGUAGES {
            assert!(seen.insert(*a3), "duplicate {a3}");
        }
    }
}
