use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCode {
    LightGreen,
    Overdue,
    Blue,
}

impl ColorCode {
    pub fn color_id(&self) -> &'static str {
        match self {
            ColorCode::LightGreen => "2",
            ColorCode::Overdue => "11",
            ColorCode::Blue => "1",
        }
    }
}

pub fn classify(completed: bool, due: NaiveDate, today: NaiveDate) -> ColorCode {
    if completed {
        ColorCode::LightGreen
    } else if due < today {
        ColorCode::Overdue
    } else {
        ColorCode::Blue
    }
}
