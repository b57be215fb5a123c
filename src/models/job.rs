use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::format::relative_time;

/// Default page size, matching the listing endpoint's default
const DEFAULT_PAGE_LIMIT: usize = 20;

/// Deserialize a value that may be absent or an explicit JSON `null` into the
/// type's default. Plain `#[serde(default)]` only covers the *absent* case;
/// this also tolerates `null`, matching the API's nullable arrays.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    /// Free-form, as scraped ("$120k - $150k", "€90,000", ...)
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub location: String,
    /// Board the job was scraped from (RemoteOK, WeWorkRemotely, ...)
    pub source: String,
    pub url: String,
    pub posted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

impl Job {
    /// "3d ago"-style posting age for list views
    pub fn posted_display(&self) -> String {
        relative_time(self.posted_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsResponse {
    pub jobs: Vec<Job>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Listing query. All fields are optional; unset fields don't constrain the
/// result. Sent to the search endpoint as query parameters, or applied
/// locally to a cached list with [`JobFilters::apply`].
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub search: Option<String>,
    pub skills: Option<Vec<String>>,
    /// Server-side filter only; jobs carry no experience field to match against
    pub experience_level: Option<String>,
    pub salary_min: Option<u64>,
    pub salary_max: Option<u64>,
    pub source: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl JobFilters {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(skills) = &self.skills {
            if !skills.is_empty() {
                query.push(("skills", skills.join(",")));
            }
        }
        if let Some(level) = &self.experience_level {
            query.push(("experienceLevel", level.clone()));
        }
        if let Some(min) = self.salary_min {
            query.push(("salaryMin", min.to_string()));
        }
        if let Some(max) = self.salary_max {
            query.push(("salaryMax", max.to_string()));
        }
        if let Some(source) = &self.source {
            query.push(("source", source.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }

    /// True if `job` passes every set filter.
    ///
    /// Mirrors the search endpoint's semantics for the fields a job actually
    /// carries: case-insensitive substring search over title/company/
    /// description, all-of skill matching, exact source match, and a salary
    /// overlap test against the figures parsed out of the free-form salary
    /// string. Jobs with no parseable figures are not excluded by salary
    /// filters. `experience_level` is ignored here (server-side only).
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = job.title.to_lowercase().contains(&needle)
                || job.company.to_lowercase().contains(&needle)
                || job.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(skills) = &self.skills {
            let have: Vec<String> = job.skills.iter().map(|s| s.to_lowercase()).collect();
            if !skills.iter().all(|s| have.contains(&s.to_lowercase())) {
                return false;
            }
        }

        if let Some(source) = &self.source {
            if !job.source.eq_ignore_ascii_case(source) {
                return false;
            }
        }

        if self.salary_min.is_some() || self.salary_max.is_some() {
            if let Some((low, high)) = salary_bounds(&job.salary) {
                if let Some(min) = self.salary_min {
                    if high < min {
                        return false;
                    }
                }
                if let Some(max) = self.salary_max {
                    if low > max {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Filter and paginate an in-memory job list, producing the same shape
    /// the search endpoint returns. Used against cached listings when
    /// offline. Pages are 1-based; an out-of-range page yields an empty
    /// `jobs` list with truthful totals.
    pub fn apply(&self, jobs: &[Job]) -> JobsResponse {
        let matched: Vec<&Job> = jobs.iter().filter(|job| self.matches(job)).collect();
        let total = matched.len();
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
        let total_pages = total.div_ceil(limit).max(1);
        let page = self.page.unwrap_or(1).max(1);
        let start = (page - 1).saturating_mul(limit);

        JobsResponse {
            jobs: matched
                .into_iter()
                .skip(start)
                .take(limit)
                .cloned()
                .collect(),
            total,
            page,
            total_pages,
        }
    }
}

/// Extract the salary figures from a free-form salary string.
///
/// Handles "$120k - $150k", "$90,000-$110,000", "120000". Returns
/// (low, high); a single figure yields low == high. Strings with no digits
/// ("Competitive") yield None.
fn salary_bounds(salary: &str) -> Option<(u64, u64)> {
    let mut figures: Vec<u64> = Vec::new();
    let chars: Vec<char> = salary.chars().collect();
    let mut i = 0;

    while i < chars.len() && figures.len() < 2 {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let mut value: u64 = 0;
        while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == ',') {
            if let Some(digit) = chars[i].to_digit(10) {
                value = value.saturating_mul(10).saturating_add(digit as u64);
            }
            i += 1;
        }
        if i < chars.len() && (chars[i] == 'k' || chars[i] == 'K') {
            value = value.saturating_mul(1000);
            i += 1;
        }
        figures.push(value);
    }

    match figures.as_slice() {
        [] => None,
        [only] => Some((*only, *only)),
        [first, second, ..] => Some((*first.min(second), *first.max(second))),
    }
}
