//! Noise removal for CPU descriptions.
//!
//! Each rule is its own pure function; the cascade probes the index with the
//! intermediate forms, so the rules are applied piecemeal rather than only as
//! one pipeline.

/// Substrings that mark a name as coming from a known CPU vendor.
pub const VENDOR_MARKERS: [&str; 2] = ["Intel", "AMD"];

pub fn has_vendor(s: &str) -> bool {
    VENDOR_MARKERS.iter().any(|m| s.contains(m))
}

/// Rule 1: drop trademark markers and the standalone word " CPU".
pub fn strip_markers(s: &str) -> String {
    s.replace("(R)", "").replace("(TM)", "").replace(" CPU", "")
}

/// Rule 2: drop any OEM prefix before the first vendor marker.
pub fn from_vendor(s: &str) -> &str {
    VENDOR_MARKERS
        .iter()
        .filter_map(|m| s.find(m))
        .min()
        .map_or(s, |start| &s[start..])
}

/// Rule 3: drop everything from the first "w/" on (e.g. "w/ Radeon Graphics").
pub fn cut_with_slash(s: &str) -> &str {
    s.find("w/").map_or(s, |end| &s[..end]).trim()
}

/// Rule 4: drop everything from the first comma on.
pub fn cut_comma(s: &str) -> &str {
    s.find(',').map_or(s, |end| &s[..end])
}

/// Rule 5: for AMD names, drop everything from the first " with" on.
pub fn cut_amd_with(s: &str) -> &str {
    if !s.starts_with("AMD") {
        return s;
    }
    s.find(" with").map_or(s, |end| &s[..end])
}

/// Rules 1 to 4.
pub fn normalize_base(s: &str) -> String {
    let stripped = strip_markers(s);
    cut_comma(cut_with_slash(from_vendor(&stripped))).to_string()
}

/// The full pipeline, rules 1 to 5.
pub fn normalize(s: &str) -> String {
    cut_amd_with(&normalize_base(s)).to_string()
}

/// Name without its "@ clock" suffix, trimmed.
pub fn strip_clock(name: &str) -> &str {
    name.split('@').next().unwrap_or(name).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_detection() {
        assert!(has_vendor("Intel Core i5-3380M"));
        assert!(has_vendor("AMD Ryzen 5 3600"));
        assert!(!has_vendor("Apple M1"));
        // case-sensitive on purpose: "intel" in lower case is not a vendor row
        assert!(!has_vendor("intel core"));
    }

    #[test]
    fn markers_removed() {
        assert_eq!(
            strip_markers("Intel(R) Core(TM) i7-7500U CPU @ 2.70GHz"),
            "Intel Core i7-7500U @ 2.70GHz"
        );
        assert_eq!(
            strip_markers("Intel(R) Celeron(R) CPU  J1900  @ 1.99GHz"),
            "Intel Celeron  J1900  @ 1.99GHz"
        );
    }

    #[test]
    fn oem_prefix_dropped() {
        assert_eq!(from_vendor("HP ProBook Intel Core i5"), "Intel Core i5");
        assert_eq!(from_vendor("Lenovo AMD Ryzen 7 PRO 4750U"), "AMD Ryzen 7 PRO 4750U");
        assert_eq!(from_vendor("Apple M2"), "Apple M2");
    }

    #[test]
    fn earliest_vendor_wins() {
        assert_eq!(from_vendor("X AMD chipset with Intel NIC"), "AMD chipset with Intel NIC");
    }

    #[test]
    fn with_slash_cut_and_trimmed() {
        assert_eq!(
            cut_with_slash("AMD Ryzen 5 3400G w/ Radeon Vega Graphics"),
            "AMD Ryzen 5 3400G"
        );
        assert_eq!(cut_with_slash("  Intel Core i3  "), "Intel Core i3");
    }

    #[test]
    fn comma_cut() {
        assert_eq!(
            cut_comma("AMD PRO A10-8730B R5, 10 COMPUTE CORES 4C+6G"),
            "AMD PRO A10-8730B R5"
        );
        assert_eq!(cut_comma("Intel Core i3"), "Intel Core i3");
    }

    #[test]
    fn amd_with_cut_only_for_amd() {
        assert_eq!(
            cut_amd_with("AMD Ryzen 7 5800H with Radeon Graphics"),
            "AMD Ryzen 7 5800H"
        );
        assert_eq!(
            cut_amd_with("Intel Core i7 with vPro"),
            "Intel Core i7 with vPro"
        );
    }

    #[test]
    fn full_pipeline() {
        assert_eq!(
            normalize_base("Dell Inc. Intel(R) Core(TM) i5-8350U CPU @ 1.70GHz, 4 cores"),
            "Intel Core i5-8350U @ 1.70GHz"
        );
        assert_eq!(
            normalize("AMD Ryzen 5 PRO 4650U with Radeon Graphics"),
            "AMD Ryzen 5 PRO 4650U"
        );
    }

    #[test]
    fn clock_suffix_removed() {
        assert_eq!(strip_clock("Intel Core i5-3380M @ 2.90GHz"), "Intel Core i5-3380M");
        assert_eq!(strip_clock("AMD Athlon 64 3200+"), "AMD Athlon 64 3200+");
    }
}
