use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentStub {
    pub date: String,
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub date: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub course: String,
    pub completed: bool,
}

impl AssignmentStub {
    pub fn into_assignment(self, description: String, course: String, completed: bool) -> Assignment {
        Assignment {
            date: self.date,
            title: self.title,
            link: self.link,
            description,
            course,
            completed,
        }
    }
}

impl Assignment {
    pub fn due_date(&self) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
    }

    pub fn summary(&self) -> String {
        format!("{} - {}", self.course, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_assignment(date: &str) -> Assignment {
        AssignmentStub {
            date: date.to_string(),
            title: "第3回レポート".to_string(),
            link: "https://lms.example.ac.jp/calendar/event.php?id=1".to_string(),
        }
        .into_assignment("本文".to_string(), "情報工学概論".to_string(), false)
    }

    #[test]
    fn summary_joins_course_and_title() {
        let assignment = create_assignment("2024-06-15");
        assert_eq!(assignment.summary(), "情報工学概論 - 第3回レポート");
    }

    #[test]
    fn due_date_accepts_unpadded_month_and_day() {
        let assignment = create_assignment("2024-6-5");
        assert_eq!(
            assignment.due_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
        );
    }

    #[test]
    fn due_date_rejects_garbage() {
        let assignment = create_assignment("2024-13-40");
        assert!(assignment.due_date().is_err());
    }

    #[test]
    fn into_assignment_keeps_stub_fields() {
        let assignment = create_assignment("2024-06-15");

        assert_eq!(assignment.date, "2024-06-15");
        assert_eq!(assignment.course, "情報工学概論");
        assert!(!assignment.completed);
    }
}
