use regex::Regex;

/// Pulls a year token out of free text: `""`, a single year, or
/// `"<first>-<last>"`. Window bounds keep ICD revisions and similar
/// four-digit noise out of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearExtractor {
    min_year: u16,
    max_year: u16,
    prefer_adjacent_span: bool,
}

impl YearExtractor {
    /// Profile for dataset page slugs like `natality-2007-2023.html`.
    pub const PAGE_NAME: Self = Self {
        min_year: 1900,
        max_year: 2500,
        prefer_adjacent_span: false,
    };

    /// Profile for harvested link URLs and page titles. Prefers an explicit
    /// `YYYY-YYYY` span over collecting scattered years.
    pub const LINK_TEXT: Self = Self {
        min_year: 1950,
        max_year: 2050,
        prefer_adjacent_span: true,
    };

    pub fn extract(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        if self.prefer_adjacent_span {
            let span = Regex::new(r"(\d{4})\s*[-\u{2013}]\s*(\d{4})").unwrap();
            if let Some(caps) = span.captures(text) {
                if let (Ok(first), Ok(second)) =
                    (caps[1].parse::<u16>(), caps[2].parse::<u16>())
                {
                    if self.in_window(first) && self.in_window(second) {
                        return format!("{first}-{second}");
                    }
                }
            }
        }

        let year = Regex::new(r"\b\d{4}\b").unwrap();
        let mut years: Vec<u16> = year
            .find_iter(text)
            .filter_map(|m| m.as_str().parse::<u16>().ok())
            .filter(|year| self.in_window(*year))
            .collect();
        years.sort_unstable();
        years.dedup();

        match years.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            [first, .., last] => format!("{first}-{last}"),
        }
    }

    fn in_window(&self, year: u16) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }
}
