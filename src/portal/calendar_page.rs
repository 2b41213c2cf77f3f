use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use thiserror::Error;

use crate::assignment::AssignmentStub;

pub const MONTH_VIEW_PATH: &str = "calendar/view.php?view=month";

pub const DEADLINE_SUFFIX: &str = "の提出期限が到来しています。";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Calendar page has no {0} element")]
    MissingElement(&'static str),
    #[error("{element} element has no {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}

struct Selectors {
    wrapper: Selector,
    week: Selector,
    day: Selector,
    event: Selector,
    event_name: Selector,
    view_link: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        wrapper: Selector::parse("div.calendarwrapper").expect("invalid wrapper selector"),
        week: Selector::parse(r#"tr[data-region="month-view-week"]"#).expect("invalid week selector"),
        day: Selector::parse(r#"td[data-region="day"]"#).expect("invalid day selector"),
        event: Selector::parse(r#"li[data-region="event-item"]"#).expect("invalid event selector"),
        event_name: Selector::parse("span.eventname").expect("invalid event name selector"),
        view_link: Selector::parse(r#"a[data-action="view-event"]"#).expect("invalid view link selector"),
    })
}

pub fn extract(html: &str, keywords: &[String]) -> Result<Vec<AssignmentStub>, ExtractError> {
    let selectors = selectors();
    let document = Html::parse_document(html);

    let wrapper = document
        .select(&selectors.wrapper)
        .next()
        .ok_or(ExtractError::MissingElement("div.calendarwrapper"))?;
    let year = required_attr(wrapper, "div.calendarwrapper", "data-year")?;
    let month = required_attr(wrapper, "div.calendarwrapper", "data-month")?;

    let mut stubs = Vec::new();

    for week in document.select(&selectors.week) {
        for day in week.select(&selectors.day) {
            let day_of_month = required_attr(day, "td[data-region=day]", "data-day")?;

            for event in day.select(&selectors.event) {
                let name = event
                    .select(&selectors.event_name)
                    .next()
                    .ok_or(ExtractError::MissingElement("span.eventname"))?;
                let title = name.text().collect::<String>().trim().to_string();

                if !matches_keywords(&title, keywords) {
                    continue;
                }

                let link = event
                    .select(&selectors.view_link)
                    .next()
                    .ok_or(ExtractError::MissingElement("a[data-action=view-event]"))?;
                let href = required_attr(link, "a[data-action=view-event]", "href")?;

                stubs.push(AssignmentStub {
                    date: format!("{year}-{month}-{day_of_month}"),
                    title: clean_title(&title),
                    link: href.to_string(),
                });
            }
        }
    }

    tracing::info!("Extracted {} deadline events for {}-{}", stubs.len(), year, month);
    Ok(stubs)
}

pub fn matches_keywords(title: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| title.contains(keyword.as_str()))
}

pub fn clean_title(title: &str) -> String {
    title.replace(DEADLINE_SUFFIX, "")
}

fn required_attr<'a>(
    element: ElementRef<'a>,
    element_name: &'static str,
    attribute: &'static str,
) -> Result<&'a str, ExtractError> {
    element.value().attr(attribute).ok_or(ExtractError::MissingAttribute {
        element: element_name,
        attribute,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn event_item(name: &str, href: &str) -> String {
        format!(
            r#"<li data-region="event-item">
                 <a data-action="view-event" href="{href}">
                   <span class="eventname">{name}</span>
                 </a>
               </li>"#
        )
    }

    fn month_page(days: &[(&str, Vec<String>)]) -> String {
        let cells: String = days
            .iter()
            .map(|(day, events)| {
                format!(
                    r#"<td data-region="day" data-day="{day}"><ul>{}</ul></td>"#,
                    events.concat()
                )
            })
            .collect();

        format!(
            r#"<html><body>
                 <div class="calendarwrapper" data-year="2024" data-month="6">
                   <table><tbody>
                     <tr data-region="month-view-week">{cells}</tr>
                   </tbody></table>
                 </div>
               </body></html>"#
        )
    }

    #[test]
    fn extracts_single_deadline_event() {
        let html = month_page(&[(
            "15",
            vec![event_item(
                "レポートの提出期限が到来しています。",
                "https://lms.example.ac.jp/calendar/event.php?id=42",
            )],
        )]);

        let stubs = extract(&html, &keywords(&["レポート"])).unwrap();

        assert_eq!(
            stubs,
            vec![AssignmentStub {
                date: "2024-6-15".to_string(),
                title: "レポート".to_string(),
                link: "https://lms.example.ac.jp/calendar/event.php?id=42".to_string(),
            }]
        );
    }

    #[test]
    fn drops_events_without_keywords() {
        let html = month_page(&[(
            "3",
            vec![
                event_item("学園祭", "https://lms.example.ac.jp/e/1"),
                event_item("課題1の提出期限が到来しています。", "https://lms.example.ac.jp/e/2"),
            ],
        )]);

        let stubs = extract(&html, &keywords(&["課題", "レポート"])).unwrap();

        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].title, "課題1");
        assert_eq!(stubs[0].link, "https://lms.example.ac.jp/e/2");
    }

    #[test]
    fn empty_days_contribute_nothing() {
        let html = month_page(&[("1", vec![]), ("2", vec![])]);

        let stubs = extract(&html, &keywords(&["レポート"])).unwrap();

        assert!(stubs.is_empty());
    }

    #[test]
    fn events_keep_page_order_across_days() {
        let html = month_page(&[
            ("1", vec![event_item("レポートA", "/e/a")]),
            ("9", vec![event_item("レポートB", "/e/b"), event_item("レポートC", "/e/c")]),
        ]);

        let stubs = extract(&html, &keywords(&["レポート"])).unwrap();
        let dates: Vec<&str> = stubs.iter().map(|s| s.date.as_str()).collect();
        let titles: Vec<&str> = stubs.iter().map(|s| s.title.as_str()).collect();

        assert_eq!(dates, vec!["2024-6-1", "2024-6-9", "2024-6-9"]);
        assert_eq!(titles, vec!["レポートA", "レポートB", "レポートC"]);
    }

    #[test]
    fn keyword_match_is_case_sensitive() {
        let html = month_page(&[("5", vec![event_item("Report 2", "/e/1")])]);

        let stubs = extract(&html, &keywords(&["report"])).unwrap();

        assert!(stubs.is_empty());
    }

    #[test]
    fn missing_wrapper_is_an_error() {
        let result = extract("<html><body></body></html>", &keywords(&["レポート"]));
        assert_eq!(result, Err(ExtractError::MissingElement("div.calendarwrapper")));
    }

    #[test]
    fn missing_event_name_is_an_error() {
        let html = month_page(&[(
            "5",
            vec![r#"<li data-region="event-item"><a data-action="view-event" href="/e/1">x</a></li>"#
                .to_string()],
        )]);

        let result = extract(&html, &keywords(&["レポート"]));

        assert_eq!(result, Err(ExtractError::MissingElement("span.eventname")));
    }

    #[test]
    fn matched_event_without_view_link_is_an_error() {
        let html = month_page(&[(
            "5",
            vec![r#"<li data-region="event-item"><span class="eventname">レポート</span></li>"#
                .to_string()],
        )]);

        let result = extract(&html, &keywords(&["レポート"]));

        assert_eq!(result, Err(ExtractError::MissingElement("a[data-action=view-event]")));
    }

    #[test]
    fn unmatched_event_without_view_link_is_ignored() {
        let html = month_page(&[(
            "5",
            vec![r#"<li data-region="event-item"><span class="eventname">休講</span></li>"#
                .to_string()],
        )]);

        assert_eq!(extract(&html, &keywords(&["レポート"])), Ok(vec![]));
    }

    #[test]
    fn missing_day_attribute_is_an_error() {
        let html = r#"
            <div class="calendarwrapper" data-year="2024" data-month="6">
              <table><tbody><tr data-region="month-view-week">
                <td data-region="day"></td>
              </tr></tbody></table>
            </div>"#;

        let result = extract(html, &keywords(&["レポート"]));

        assert_eq!(
            result,
            Err(ExtractError::MissingAttribute {
                element: "td[data-region=day]",
                attribute: "data-day",
            })
        );
    }

    #[test]
    fn clean_title_only_removes_suffix() {
        assert_eq!(clean_title("第2回レポートの提出期限が到来しています。"), "第2回レポート");
        assert_eq!(clean_title("第2回レポート"), "第2回レポート");
    }

    proptest! {
        #[test]
        fn suffix_removal_preserves_prefix(prefix in "[a-zA-Z0-9 レポート課題]{0,20}") {
            let title = format!("{prefix}{DEADLINE_SUFFIX}");
            prop_assert_eq!(clean_title(&title), prefix);
        }

        #[test]
        fn title_with_keyword_always_matches(
            before in "[a-z]{0,8}",
            after in "[a-z]{0,8}",
        ) {
            let title = format!("{before}レポート{after}");
            prop_assert!(matches_keywords(&title, &keywords(&["課題", "レポート"])));
        }

        #[test]
        fn title_without_keyword_never_matches(title in "[a-z0-9 ]{0,24}") {
            prop_assert!(!matches_keywords(&title, &keywords(&["課題", "レポート"])));
        }
    }
}
