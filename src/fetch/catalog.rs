// src/fetch/catalog.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace, warn};
use url::Url;

use crate::period::Period;

/// `trips_YY_MM_MonthName` at the start of a file name.
static TRIPS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^trips_(\d{2})_(\d{2})_([a-z]+)").expect("trips file name regex")
});

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("link selector"));

/// Trip archives discovered on the index page, one URL per month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlCatalog {
    entries: BTreeMap<Period, Url>,
}

impl UrlCatalog {
    /// Collects every `href` whose file name matches `trips_YY_MM_MonthName`.
    /// Relative links are joined onto `base`. The first link seen for a month
    /// wins; links whose month name disagrees with the month number are skipped.
    pub fn from_html(html: &str, base: &Url) -> Self {
        let document = Html::parse_document(html);
        let mut entries = BTreeMap::new();

        for href in document
            .select(&LINK_SELECTOR)
            .filter_map(|el| el.value().attr("href"))
        {
            let Ok(url) = base.join(href.trim()) else {
                trace!(href, "unjoinable href");
                continue;
            };
            let Some(period) = period_from_url(&url) else {
                continue;
            };
            if let Some(existing) = entries.get(&period) {
                debug!(%period, kept = %existing, skipped = %url, "duplicate archive link");
                continue;
            }
            trace!(%period, %url, "found archive");
            entries.insert(period, url);
        }

        Self { entries }
    }

    pub fn get(&self, period: Period) -> Option<&Url> {
        self.entries.get(&period)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Months present, oldest first.
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, &Url)> {
        self.entries.iter().map(|(p, u)| (*p, u))
    }

    pub fn urls(&self) -> BTreeSet<Url> {
        self.entries.values().cloned().collect()
    }
}

/// Parses the period encoded in the last path segment of `url`.
pub fn period_from_url(url: &Url) -> Option<Period> {
    let name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())?;
    period_from_file_name(name)
}

pub fn period_from_file_name(name: &str) -> Option<Period> {
    let caps = TRIPS_RE.captures(name)?;
    let yy: i32 = caps[1].parse().ok()?;
    let mm: u32 = caps[2].parse().ok()?;
    let period = Period::new(2000 + yy, mm).ok()?;
    if !caps[3].eq_ignore_ascii_case(period.month_name()) {
        warn!(file = name, expected = period.month_name(), "month name does not match month number");
        return None;
    }
    Some(period)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Index page shaped like the EMT open-data listing: 21 monthly archives
    /// from June 2021 to February 2023 plus unrelated links.
    pub(crate) fn index_html() -> String {
        let months = [
            (21, 6, "June", "ab3776ab-ba7f-4da3-bea6-e70c21c7d8be"),
            (21, 7, "July", "2e5d4a3b-8f1c-4b6e-9d7a-1c2b3a4d5e6f"),
            (21, 8, "August", "3f6e5b4c-9a2d-4c7f-8e6b-2d3c4b5e6f70"),
            (21, 9, "September", "4a7f6c5d-0b3e-4d80-9f7c-3e4d5c6f7081"),
            (21, 10, "October", "5b807d6e-1c4f-4e91-a08d-4f5e6d708192"),
            (21, 11, "November", "6c918e7f-2d50-4fa2-b19e-506f7e8192a3"),
            (21, 12, "December", "7da29f80-3e61-40b3-c2af-617f8092a3b4"),
            (22, 1, "January", "8eb3a091-4f72-41c4-d3b0-728091a3b4c5"),
            (22, 2, "February", "9fc4b1a2-5083-42d5-e4c1-8391a2b4c5d6"),
            (22, 3, "March", "e1ea5e02-4ba9-471a-bb95-8cb327220b05"),
            (22, 4, "April", "a0d5c2b3-6194-43e6-f5d2-94a2b3c5d6e7"),
            (22, 5, "May", "b1e6d3c4-72a5-44f7-06e3-a5b3c4d6e7f8"),
            (22, 6, "June", "c2f7e4d5-83b6-4508-17f4-b6c4d5e7f809"),
            (22, 7, "July", "d308f5e6-94c7-4619-2805-c7d5e6f8091a"),
            (22, 8, "August", "e41906f7-a5d8-472a-3916-d8e6f7091a2b"),
            (22, 9, "September", "f52a1708-b6e9-483b-4a27-e9f7081a2b3c"),
            (22, 10, "October", "063b2819-c7fa-494c-5b38-fa08192b3c4d"),
            (22, 11, "November", "174c392a-d80b-4a5d-6c49-0b192a3c4d5e"),
            (22, 12, "December", "285d4a3b-e91c-4b6e-7d5a-1c2a3b4d5e6f"),
            (23, 1, "January", "20b8509b-97a8-4831-b9d2-4900322e1714"),
            (23, 2, "February", "396e5b4c-fa2d-4c7f-8e6b-2d3b4c5e6f70"),
        ];
        let mut html = String::from(
            "<html><head><title>Datos generales</title></head><body>\n\
             <a href=\"/Inicio\">Inicio</a>\n\
             <a href=\"/getattachment/0c1d2e3f-0000-4000-8000-000000000000/201704_Usage_Bicimad.aspx\">Abril 2017</a>\n\
             <a href=\"/getattachment/0c1d2e3f-0000-4000-8000-000000000001/Bicimad_Estacions_202102.aspx\">Estaciones</a>\n",
        );
        for (yy, mm, name, guid) in months {
            html.push_str(&format!(
                "<li><a href=\"/getattachment/{}/trips_{:02}_{:02}_{}-csv.aspx\" title=\"Viajes\">{} 20{}</a></li>\n",
                guid, yy, mm, name, name, yy
            ));
        }
        html.push_str("</body></html>\n");
        html
    }

    fn base() -> Url {
        Url::parse("https://opendata.emtmadrid.es/").unwrap()
    }

    #[test]
    fn finds_all_trip_archives() {
        let catalog = UrlCatalog::from_html(&index_html(), &base());
        assert_eq!(catalog.len(), 21);

        let urls = catalog.urls();
        assert!(urls.contains(
            &Url::parse("https://opendata.emtmadrid.es/getattachment/20b8509b-97a8-4831-b9d2-4900322e1714/trips_23_01_January-csv.aspx").unwrap()
        ));
        assert!(urls.contains(
            &Url::parse("https://opendata.emtmadrid.es/getattachment/e1ea5e02-4ba9-471a-bb95-8cb327220b05/trips_22_03_March-csv.aspx").unwrap()
        ));

        let periods: Vec<_> = catalog.periods().collect();
        assert_eq!(periods.first(), Some(&Period { year: 2021, month: 6 }));
        assert_eq!(periods.last(), Some(&Period { year: 2023, month: 2 }));
    }

    #[test]
    fn every_entry_encodes_its_own_period() {
        let catalog = UrlCatalog::from_html(&index_html(), &base());
        for (period, url) in catalog.iter() {
            assert_eq!(period_from_url(url), Some(period));
            let tag = format!("{:02}_{:02}", period.year % 100, period.month);
            assert!(url.as_str().contains(&tag), "{} lacks {}", url, tag);
        }
    }

    #[test]
    fn month_name_is_case_insensitive_but_must_match() {
        assert_eq!(
            period_from_file_name("TRIPS_22_05_may-csv.aspx"),
            Some(Period { year: 2022, month: 5 })
        );
        assert_eq!(period_from_file_name("trips_22_05_June-csv.aspx"), None);
        assert_eq!(period_from_file_name("trips_22_13_Foo.csv"), None);
        assert_eq!(period_from_file_name("old_trips_22_05_May.csv"), None);
    }

    #[test]
    fn first_duplicate_wins_and_absolute_links_are_kept() {
        let html = r#"
            <a href="https://mirror.example.org/a/trips_21_09_September.zip">one</a>
            <a href="/b/trips_21_09_September-csv.aspx">two</a>
        "#;
        let catalog = UrlCatalog::from_html(html, &base());
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(Period { year: 2021, month: 9 }).unwrap().as_str(),
            "https://mirror.example.org/a/trips_21_09_September.zip"
        );
    }

    #[test]
    fn page_without_archives_gives_empty_catalog() {
        let catalog = UrlCatalog::from_html("<html><a href='/x.pdf'>x</a></html>", &base());
        assert!(catalog.is_empty());
    }
}
