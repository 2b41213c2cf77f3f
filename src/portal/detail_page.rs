use scraper::{Html, Selector};
use std::sync::OnceLock;

use crate::assignment::{Assignment, AssignmentStub};
use crate::portal::session::{PortalSession, SessionError};

pub const UNKNOWN_COURSE: &str = "Unknown Course";
pub const DESCRIPTION_UNAVAILABLE: &str =
    "説明文が取得出来ませんでした．下記URLより内容を確認して下さい．";

pub const COMPLETION_MARKER: &str = "完了としてマークする";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailInfo {
    pub description: String,
    pub course: String,
    pub completed: bool,
}

struct Selectors {
    description: Selector,
    heading: Selector,
    anchor: Selector,
    completion: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        description: Selector::parse("div.no-overflow").expect("invalid description selector"),
        heading: Selector::parse("h1").expect("invalid heading selector"),
        anchor: Selector::parse("a").expect("invalid anchor selector"),
        completion: Selector::parse("div.completion-info").expect("invalid completion selector"),
    })
}

pub async fn enrich(session: &PortalSession, stub: AssignmentStub) -> Result<Assignment, SessionError> {
    tracing::info!("Fetching detail page for {}", stub.title);
    let html = session.fetch(&stub.link).await?;
    let detail = parse_detail(&html, &stub.link);

    if !detail.completed {
        tracing::debug!("{} is still outstanding", stub.title);
    }

    Ok(stub.into_assignment(detail.description, detail.course, detail.completed))
}

pub fn parse_detail(html: &str, link: &str) -> DetailInfo {
    let selectors = selectors();
    let document = Html::parse_document(html);

    let body = document
        .select(&selectors.description)
        .next()
        .map(|div| div.text().collect::<Vec<_>>().join("\n").trim().to_string())
        .unwrap_or_else(|| DESCRIPTION_UNAVAILABLE.to_string());
    let description = format!("{body}{}", link_suffix(link));

    let course = document
        .select(&selectors.heading)
        .next()
        .and_then(|h1| h1.select(&selectors.anchor).next())
        .map(|a| a.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| UNKNOWN_COURSE.to_string());

    // Completed unless the portal still offers to mark it complete.
    let completed = !document
        .select(&selectors.completion)
        .next()
        .is_some_and(|div| div.text().collect::<String>().contains(COMPLETION_MARKER));

    DetailInfo {
        description,
        course,
        completed,
    }
}

fn link_suffix(link: &str) -> String {
    format!("\n<br><a href='{link}'>詳細はこちら</a>")
}
