//! Job board scraping: downloads a posting and maps it to a `ScrapedJob`.
//!
//! LinkedIn, Gupy and Indeed get dedicated selector sets. Any other host goes
//! through the generic parser, which always produces a record (possibly with
//! placeholder title/company and no skills) instead of rejecting the URL.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::job::ScrapedJob;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const GENERIC_RAW_HTML_LIMIT: usize = 10_000;
const NOISE_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "aside", "iframe"];

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Unsupported job URL: {0}")]
    UnsupportedBoard(String),

    #[error("Failed to fetch '{url}': {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Parse(String),
}

/// Anything that can turn a job URL into a scraped record.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_job(&self, url: &str) -> Result<ScrapedJob, ScrapeError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Board selectors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    LinkedIn,
    Gupy,
    Indeed,
    Generic,
}

impl Board {
    pub fn as_str(&self) -> &'static str {
        match self {
            Board::LinkedIn => "linkedin",
            Board::Gupy => "gupy",
            Board::Indeed => "indeed",
            Board::Generic => "generic",
        }
    }

    fn selectors(&self) -> Option<BoardSelectors> {
        match self {
            Board::LinkedIn => Some(BoardSelectors {
                title: &[
                    "h1.top-card-layout__title",
                    "h1[data-test-job-title]",
                    "h1",
                ],
                company: &[
                    "a.topcard__org-name-link",
                    "span.topcard__flavor",
                    "div.topcard__flavor",
                ],
                description: &[
                    "div.description__text",
                    "div[data-test-description]",
                    "section[data-view-name='job-details']",
                ],
                skills: &[
                    "li.description__job-criteria-item",
                    "li.skills-requirements__item",
                ],
            }),
            Board::Gupy => Some(BoardSelectors {
                title: &["h1.job-header__title", "h1"],
                company: &[
                    "span.job-header__company",
                    "span[data-testid='company-name']",
                ],
                description: &[
                    "section#job-description",
                    "div[data-testid='job-description']",
                ],
                skills: &[
                    "ul.job-requirements__list li",
                    "li[data-testid='requirement-item']",
                ],
            }),
            Board::Indeed => Some(BoardSelectors {
                title: &["h1.jobsearch-JobInfoHeader-title", "h1"],
                company: &[
                    "div.jobsearch-InlineCompanyRating",
                    "div[data-company-name]",
                ],
                description: &[
                    "div#jobDescriptionText",
                    "div.jobsearch-JobComponent-description",
                ],
                skills: &[
                    "div.jobsearch-ReqAndQualSection-item",
                    "li.jobsearch-ReqAndQualSection-item",
                ],
            }),
            Board::Generic => None,
        }
    }
}

struct BoardSelectors {
    title: &'static [&'static str],
    company: &'static [&'static str],
    description: &'static [&'static str],
    skills: &'static [&'static str],
}

/// Maps a URL to its board. Non-http(s) or unparsable URLs are rejected.
pub fn resolve_board(url: &str) -> Result<Board, ScrapeError> {
    let parsed = Url::parse(url).map_err(|_| ScrapeError::UnsupportedBoard(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScrapeError::UnsupportedBoard(url.to_string()));
    }
    let host = parsed
        .host_str()
        .ok_or_else(|| ScrapeError::UnsupportedBoard(url.to_string()))?
        .to_lowercase();

    Ok(if host.contains("linkedin") {
        Board::LinkedIn
    } else if host.contains("gupy") {
        Board::Gupy
    } else if host.contains("indeed") {
        Board::Indeed
    } else {
        Board::Generic
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Web scraper
// ────────────────────────────────────────────────────────────────────────────

/// Production `JobSource`. The HTTP client is built once and pooled.
#[derive(Clone)]
pub struct WebScraper {
    http: Client,
}

impl WebScraper {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::limited(10))
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    async fn download(&self, url: &str) -> Result<String, ScrapeError> {
        let fetch_err = |source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?;
        response.text().await.map_err(fetch_err)
    }
}

#[async_trait]
impl JobSource for WebScraper {
    async fn fetch_job(&self, url: &str) -> Result<ScrapedJob, ScrapeError> {
        let board = resolve_board(url)?;
        debug!("Fetching {} posting: {}", board.as_str(), url);
        let html = self.download(url).await?;
        parse_posting(url, board, html)
    }
}

/// Parses downloaded HTML with the selector set for `board`.
pub fn parse_posting(url: &str, board: Board, html: String) -> Result<ScrapedJob, ScrapeError> {
    let Some(selectors) = board.selectors() else {
        return Ok(parse_generic(url, html));
    };

    let document = Html::parse_document(&html);
    let title = first_text(&document, selectors.title)
        .ok_or_else(|| ScrapeError::Parse("Job title not found in document".to_string()))?;
    let company = first_text(&document, selectors.company)
        .ok_or_else(|| ScrapeError::Parse("Company name not found in document".to_string()))?;
    let description = description_text(&document, selectors.description)
        .ok_or_else(|| ScrapeError::Parse("Job description not found in document".to_string()))?;
    let skills = skill_texts(&document, selectors.skills);

    Ok(ScrapedJob {
        url: url.to_string(),
        board: board.as_str().to_string(),
        title,
        company,
        description,
        skills,
        raw_html: html,
    })
}

fn parse_generic(url: &str, html: String) -> ScrapedJob {
    let document = Html::parse_document(&html);

    let title = first_text(&document, &["h1", "title"])
        .unwrap_or_else(|| "Unknown Position".to_string());

    let company = selector("meta[property='og:site_name']")
        .and_then(|sel| document.select(&sel).next())
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown Company".to_string());

    let description = ["main", "article", "div#content", "div.content", "body"]
        .iter()
        .filter_map(|s| selector(s))
        .find_map(|sel| document.select(&sel).next())
        .map(content_text)
        .unwrap_or_default();

    ScrapedJob {
        url: url.to_string(),
        board: Board::Generic.as_str().to_string(),
        title,
        company,
        description,
        skills: vec![],
        raw_html: html.chars().take(GENERIC_RAW_HTML_LIMIT).collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DOM helpers
// ────────────────────────────────────────────────────────────────────────────

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Whitespace-stripped text of an element, fragments joined by single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Line-per-fragment text of an element, skipping scripts, navigation and chrome.
fn content_text(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let in_noise = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| NOISE_TAGS.contains(&e.name()))
            });
            let trimmed = text.trim();
            (!in_noise && !trimmed.is_empty()).then_some(trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|s| selector(s))
        .filter_map(|sel| document.select(&sel).next().map(element_text))
        .find(|t| !t.is_empty())
}

fn description_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for sel in selectors.iter().filter_map(|s| selector(s)) {
        let chunks: Vec<String> = document
            .select(&sel)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect();
        if !chunks.is_empty() {
            return Some(chunks.join("\n"));
        }
    }

    selector("body")
        .and_then(|sel| document.select(&sel).next())
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn skill_texts(document: &Html, selectors: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    selectors
        .iter()
        .filter_map(|s| selector(s))
        .flat_map(|sel| document.select(&sel).map(element_text).collect::<Vec<_>>())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKEDIN_HTML: &str = r#"
        <html><body>
          <h1 class="top-card-layout__title">Senior Backend Engineer</h1>
          <a class="topcard__org-name-link"> Tech Corp </a>
          <div class="description__text">
            <p>Build reliable APIs.</p><p>Scale distributed systems.</p>
          </div>
          <ul>
            <li class="skills-requirements__item">Python</li>
            <li class="skills-requirements__item">python</li>
            <li class="skills-requirements__item">AWS</li>
          </ul>
        </body></html>
    "#;

    #[test]
    fn test_resolve_board_from_host() {
        assert_eq!(
            resolve_board("https://www.linkedin.com/jobs/view/123").unwrap(),
            Board::LinkedIn
        );
        assert_eq!(
            resolve_board("https://empresa.gupy.io/jobs/1").unwrap(),
            Board::Gupy
        );
        assert_eq!(
            resolve_board("https://br.indeed.com/viewjob?jk=1").unwrap(),
            Board::Indeed
        );
        assert_eq!(
            resolve_board("https://careers.example.com/42").unwrap(),
            Board::Generic
        );
    }

    #[test]
    fn test_resolve_board_rejects_non_http() {
        assert!(matches!(
            resolve_board("ftp://linkedin.com/job"),
            Err(ScrapeError::UnsupportedBoard(_))
        ));
        assert!(matches!(
            resolve_board("not a url"),
            Err(ScrapeError::UnsupportedBoard(_))
        ));
    }

    #[test]
    fn test_parse_linkedin_posting() {
        let job = parse_posting(
            "https://www.linkedin.com/jobs/view/123",
            Board::LinkedIn,
            LINKEDIN_HTML.to_string(),
        )
        .unwrap();

        assert_eq!(job.board, "linkedin");
        assert_eq!(job.title, "Senior Backend Engineer");
        assert_eq!(job.company, "Tech Corp");
        assert_eq!(
            job.description,
            "Build reliable APIs. Scale distributed systems."
        );
        assert_eq!(job.skills, vec!["Python", "AWS"]);
        assert_eq!(job.raw_html, LINKEDIN_HTML);
    }

    #[test]
    fn test_missing_company_is_parse_error() {
        let html = "<html><body><h1>Engineer</h1><div class='description__text'>x</div></body></html>";
        let err = parse_posting("https://linkedin.com/j", Board::LinkedIn, html.to_string())
            .unwrap_err();
        match err {
            ScrapeError::Parse(msg) => assert!(msg.contains("Company")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_description_falls_back_to_body() {
        let html = r#"<html><body>
            <h1 class="job-header__title">Dev</h1>
            <span class="job-header__company">Acme</span>
            <p>Only body text here</p>
        </body></html>"#;
        let job = parse_posting("https://acme.gupy.io/1", Board::Gupy, html.to_string()).unwrap();
        assert!(job.description.contains("Only body text here"));
    }

    #[test]
    fn test_generic_fallback_extracts_best_effort_fields() {
        let html = r#"<html>
            <head>
              <title>Page Title</title>
              <meta property="og:site_name" content="Example Inc">
            </head>
            <body>
              <nav>Home | Jobs</nav>
              <main>
                <h1>Platform Engineer</h1>
                <script>var tracking = 1;</script>
                <p>Run our Kubernetes clusters.</p>
              </main>
            </body>
        </html>"#;

        let job = parse_posting(
            "https://careers.example.com/42",
            Board::Generic,
            html.to_string(),
        )
        .unwrap();

        assert_eq!(job.board, "generic");
        assert_eq!(job.title, "Platform Engineer");
        assert_eq!(job.company, "Example Inc");
        assert!(job.description.contains("Run our Kubernetes clusters."));
        assert!(!job.description.contains("tracking"));
        assert!(!job.description.contains("Home | Jobs"));
        assert!(job.skills.is_empty());
    }

    #[test]
    fn test_generic_fallback_placeholders_and_truncation() {
        let html = format!("<html><body>{}</body></html>", "x".repeat(20_000));
        let job = parse_posting("https://example.com/", Board::Generic, html).unwrap();
        assert_eq!(job.title, "Unknown Position");
        assert_eq!(job.company, "Unknown Company");
        assert_eq!(job.raw_html.chars().count(), GENERIC_RAW_HTML_LIMIT);
    }
}
