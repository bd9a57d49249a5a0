use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::{JoblensError, Result};

/// One place to look for a field: a CSS selector, optionally reading an
/// attribute instead of the element text.
#[derive(Debug, Clone, Copy)]
pub struct Locator {
    pub css: &'static str,
    pub attr: Option<&'static str>,
}

const fn css(selector: &'static str) -> Locator {
    Locator {
        css: selector,
        attr: None,
    }
}

const fn attr(selector: &'static str, name: &'static str) -> Locator {
    Locator {
        css: selector,
        attr: Some(name),
    }
}

const NONE: &[Locator] = &[];

/// Locators for one search-result card on a listings page.
#[derive(Debug, Clone, Copy)]
pub struct CardLocators {
    /// Selector for the card root elements
    pub root: &'static str,
    /// Attribute on the root carrying the job id, if the site exposes one
    pub id_attr: Option<&'static str>,
    pub title: &'static [Locator],
    /// Anchor whose href leads to the posting
    pub link: &'static [Locator],
    pub company: &'static [Locator],
    pub location: &'static [Locator],
    pub salary: &'static [Locator],
    pub posted: &'static [Locator],
    pub snippet: &'static [Locator],
}

/// Everything that varies between job boards, as data. Each field carries an
/// ordered locator list tried until one yields content; an empty list means
/// the site has no structural source for that field and the description
/// cascade takes over.
#[derive(Debug, Clone, Copy)]
pub struct SiteProfile {
    pub name: &'static str,
    pub base_url: &'static str,
    /// Search recipe: path plus the query/location parameter names
    pub search_path: &'static str,
    pub query_param: &'static str,
    pub location_param: &'static str,
    pub title: &'static [Locator],
    pub company: &'static [Locator],
    pub location: &'static [Locator],
    pub salary: &'static [Locator],
    pub job_type: &'static [Locator],
    pub description: &'static [Locator],
    pub skills: &'static [Locator],
    pub benefits: &'static [Locator],
    pub card: CardLocators,
    /// Job-id patterns tried against the posting URL, in order
    pub url_id_patterns: &'static [&'static str],
    /// Job-id patterns tried against the page source when the URL yields none
    pub page_id_patterns: &'static [&'static str],
}

pub static GLASSDOOR: SiteProfile = SiteProfile {
    name: "glassdoor",
    base_url: "https://www.glassdoor.co.in",
    search_path: "/Job/index.htm",
    query_param: "sc.keyword",
    location_param: "locKeyword",
    title: &[
        css("h1[id^='jd-job-title-']"),
        css("h1[data-test='job-title']"),
    ],
    company: &[
        css("h4.EmployerProfile_employerNameHeading__bXBYr"),
        css("[data-test='employer-name']"),
    ],
    location: &[css("div[data-test='location']")],
    salary: &[
        css("div[data-test='detailSalary']"),
        css("span[data-test='detailSalary']"),
    ],
    job_type: NONE,
    description: &[
        css("div.JobDetails_jobDescription__uW_fK"),
        css(".jobDescriptionContent"),
        css("[class*='jobDescription']"),
    ],
    skills: NONE,
    benefits: NONE,
    card: CardLocators {
        root: "li[data-test='jobListing']",
        id_attr: Some("data-jobid"),
        title: &[css("a[data-test='job-title']")],
        link: &[attr("a[data-test='job-title']", "href")],
        company: &[css("span.EmployerProfile_compactEmployerName__9MGcV")],
        location: &[css("div[data-test='emp-location']")],
        salary: &[css("div[data-test='detailSalary']")],
        posted: &[css("div[data-test='job-age']")],
        snippet: NONE,
    },
    url_id_patterns: &[r"jl=(\d+)"],
    page_id_patterns: &[r"job-title-(\d+)", r"jlid=(\d+)"],
};

pub static SIMPLYHIRED: SiteProfile = SiteProfile {
    name: "simplyhired",
    base_url: "https://www.simplyhired.co.in",
    search_path: "/search",
    query_param: "q",
    location_param: "l",
    title: &[
        css("h1[data-testid='viewJobTitle']"),
        css(".job-title h1"),
        css("h1"),
    ],
    company: &[
        css("[data-testid='viewJobCompanyName'] [data-testid='detailText']"),
        css("[data-testid='viewJobCompanyName']"),
        css(".company-name"),
    ],
    location: &[
        css("[data-testid='viewJobCompanyLocation'] [data-testid='detailText']"),
        css("[data-testid='viewJobCompanyLocation']"),
        css(".job-location"),
    ],
    salary: &[css("[data-testid='viewJobBodyJobCompensation']"), css(".salary-range")],
    job_type: &[css("[data-testid='viewJobBodyJobDetailsJobType']"), css(".job-type")],
    description: &[
        css("[data-testid='viewJobBodyJobFullDescriptionContent']"),
        css(".job-description-content"),
        css(".job-description"),
    ],
    skills: &[css("[data-testid='viewJobQualificationItem']")],
    benefits: &[css("[data-testid='viewJobBenefitItem']")],
    card: CardLocators {
        root: "div[data-testid='searchSerpJob']",
        id_attr: Some("data-jobkey"),
        title: &[css("h2[data-testid='searchSerpJobTitle'] a"), css("h2 a")],
        link: &[attr("h2[data-testid='searchSerpJobTitle'] a", "href"), attr("h2 a", "href")],
        company: &[css("span[data-testid='companyName']")],
        location: &[css("span[data-testid='searchSerpJobLocation']")],
        salary: &[css("[data-testid='searchSerpJobSalaryConfirmed']")],
        posted: &[css("p[data-testid='searchSerpJobDateStamp']")],
        snippet: &[css("p[data-testid='searchSerpJobSnippet']")],
    },
    url_id_patterns: &[r"jobkey=([^&]+)", r"/job/([^/?]+)"],
    page_id_patterns: &[],
};

pub static ZIPRECRUITER: SiteProfile = SiteProfile {
    name: "ziprecruiter",
    base_url: "https://www.ziprecruiter.in",
    search_path: "/jobs/search",
    query_param: "q",
    location_param: "l",
    title: &[css("h1[data-testid='job-title']"), css("h1.u-textH2"), css("h1")],
    company: &[
        css("[data-testid='company-name']"),
        css("a[data-testid='job-company']"),
    ],
    location: &[css("[data-testid='job-location']"), css(".location")],
    salary: &[
        css("[data-testid='salary']"),
        css(".salary-range"),
        css(".compensation"),
    ],
    job_type: &[css("[data-testid='employment-type']")],
    description: &[
        css("[data-testid='job-description']"),
        css(".job-description"),
        css(".job-body"),
    ],
    skills: NONE,
    benefits: NONE,
    card: CardLocators {
        root: "article.job_result, div[data-testid='job-card']",
        id_attr: Some("data-job-id"),
        title: &[css("a[data-testid='job-card-title']"), css("h2 a")],
        link: &[attr("a[data-testid='job-card-title']", "href"), attr("h2 a", "href")],
        company: &[css("[data-testid='job-card-company']")],
        location: &[css("[data-testid='job-card-location']")],
        salary: &[css("[data-testid='job-card-salary']"), css(".salary-range")],
        posted: &[css("[data-testid='job-card-posted']")],
        snippet: NONE,
    },
    url_id_patterns: &[
        r"/jobs/(\w+)-",
        r"jobkey=([^&]+)",
        r"/job/([^/?]+)",
        r"id=(\w+)",
    ],
    page_id_patterns: &[],
};

pub static FOUNDIT: SiteProfile = SiteProfile {
    name: "foundit",
    base_url: "https://www.foundit.in",
    search_path: "/srp/results",
    query_param: "query",
    location_param: "location",
    title: &[css(".jobTitle")],
    company: &[css(".companyName p"), css(".companyName")],
    location: &[css(".details.location")],
    salary: NONE,
    job_type: NONE,
    description: &[css(".jobDescInfoNew"), css(".jobDescription")],
    skills: &[css(".pillsContainer .pillItem")],
    benefits: NONE,
    card: CardLocators {
        root: "div.cardContainer",
        id_attr: Some("id"),
        title: &[css(".jobTitle")],
        link: NONE,
        company: &[css(".companyName p"), css(".companyName")],
        location: &[css(".details.location")],
        salary: NONE,
        posted: &[css(".timeText")],
        snippet: NONE,
    },
    url_id_patterns: &[r"jobId=(\d+)"],
    page_id_patterns: &[],
};

static ALL: &[&SiteProfile] = &[&GLASSDOOR, &SIMPLYHIRED, &ZIPRECRUITER, &FOUNDIT];

impl SiteProfile {
    pub fn all() -> &'static [&'static SiteProfile] {
        ALL
    }

    pub fn by_name(name: &str) -> Result<&'static SiteProfile> {
        ALL.iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| JoblensError::UnknownSite(name.to_string()))
    }

    /// Build a search-results URL for a query and location.
    pub fn search_url(&self, query: &str, location: &str) -> Result<String> {
        let mut url = Url::parse(self.base_url)?.join(self.search_path)?;
        url.query_pairs_mut()
            .append_pair(self.query_param, query)
            .append_pair(self.location_param, location);
        Ok(url.to_string())
    }

    /// Recover the posting id: URL patterns first, then page-source patterns.
    pub fn extract_job_id(&self, source_url: &str, page_html: &str) -> Option<String> {
        first_capture(self.url_id_patterns, source_url)
            .or_else(|| first_capture(self.page_id_patterns, page_html))
    }
}

/// Job-id regexes from every profile, compiled once
static ID_REGEXES: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    ALL.iter()
        .flat_map(|profile| {
            profile
                .url_id_patterns
                .iter()
                .chain(profile.page_id_patterns.iter())
        })
        .map(|pattern| {
            (
                *pattern,
                Regex::new(pattern).expect("Invalid job-id regex pattern"),
            )
        })
        .collect()
});

fn first_capture(patterns: &[&str], haystack: &str) -> Option<String> {
    patterns
        .iter()
        .filter_map(|pattern| ID_REGEXES.get(pattern))
        .find_map(|re| {
            re.captures(haystack)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
}
