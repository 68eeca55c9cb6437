use crate::errors::ValidationError;
use crate::format::parse_timestamp;
use crate::stats::round2;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const THEMES: [&str; 5] = ["strawberry", "lychee", "mango", "melon", "blueberry"];
pub const DEFAULT_THEME: &str = "strawberry";
pub const DEFAULT_NOTE_COLOR: &str = "#ffffff";
pub const MIN_PASSWORD_LEN: usize = 6;
const MAX_TITLE_LEN: usize = 200;

macro_rules! text_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ValidationError::UnknownValue { field: $field, value }),
                }
            }
        }
    };
}

text_enum!(Priority, "priority", { Low => "low", Medium => "medium", High => "high" });
text_enum!(TaskStatus, "status", { Pending => "pending", Completed => "completed" });
text_enum!(Frequency, "frequency", { Daily => "daily", Weekly => "weekly", Monthly => "monthly" });

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub theme: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDateTime>,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub color: String,
    pub is_pinned: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub frequency: Frequency,
    pub streak: i64,
    pub completion_rate: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HabitSkip {
    pub id: i64,
    pub habit_id: i64,
    pub reason: String,
    pub skip_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Journal {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub mood: String,
    pub color: String,
    pub entry_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SavingsGoal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FocusGoal {
    pub id: i64,
    pub user_id: i64,
    pub goal_date: NaiveDate,
    pub target_sessions: i64,
    pub completed_sessions: i64,
    pub created_at: NaiveDateTime,
}

/// One calendar day inside a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket<V> {
    pub date: NaiveDate,
    pub label: String,
    pub value: V,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            id: None,
        }
    }

    pub fn created(id: i64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            id: Some(id),
        }
    }
}

// Request bodies. Each validates into an owned, checked value before any
// statement runs.

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let username = required("username", &self.username)?;
        let email = required("email", &self.email)?;
        if !email.contains('@') {
            return Err(ValidationError::UnknownValue {
                field: "email",
                value: email,
            });
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(NewUser {
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TodoFields {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDateTime>,
    pub priority: Priority,
}

impl TodoInput {
    pub fn validate(self) -> Result<TodoFields, ValidationError> {
        let priority = match self.priority {
            Some(value) if !value.trim().is_empty() => Priority::try_from(value)?,
            _ => Priority::Medium,
        };
        Ok(TodoFields {
            title: title("title", &self.title)?,
            description: self.description.unwrap_or_default().trim().to_string(),
            due_date: optional_timestamp("due_date", self.due_date.as_deref())?,
            priority,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusInput {
    pub status: String,
}

impl TaskStatusInput {
    pub fn validate(self) -> Result<TaskStatus, ValidationError> {
        TaskStatus::try_from(self.status)
    }
}

#[derive(Debug, Deserialize)]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
    pub color: String,
}

impl NoteInput {
    pub fn validate(self) -> Result<NoteFields, ValidationError> {
        Ok(NoteFields {
            title: title("title", &self.title)?,
            content: self.content,
            color: color(self.color),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct HabitInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub frequency: String,
}

#[derive(Debug, Clone)]
pub struct HabitFields {
    pub name: String,
    pub description: String,
    pub frequency: Frequency,
}

impl HabitInput {
    pub fn validate(self) -> Result<HabitFields, ValidationError> {
        if self.frequency.trim().is_empty() {
            return Err(ValidationError::Required("frequency"));
        }
        Ok(HabitFields {
            name: title("name", &self.name)?,
            description: self.description.unwrap_or_default().trim().to_string(),
            frequency: Frequency::try_from(self.frequency)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HabitLogInput {
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct HabitSkipInput {
    pub reason: String,
}

impl HabitSkipInput {
    pub fn validate(self) -> Result<String, ValidationError> {
        required("reason", &self.reason)
    }
}

#[derive(Debug, Deserialize)]
pub struct JournalInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JournalFields {
    pub title: String,
    pub content: String,
    pub mood: String,
    pub color: String,
    pub entry_date: NaiveDate,
}

impl JournalInput {
    /// Entries without a date are filed under `today`.
    pub fn validate(self, today: NaiveDate) -> Result<JournalFields, ValidationError> {
        Ok(JournalFields {
            title: title("title", &self.title)?,
            content: self.content,
            mood: self.mood.unwrap_or_default().trim().to_string(),
            color: color(self.color),
            entry_date: optional_date("date", self.date.as_deref())?.unwrap_or(today),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpenseInput {
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExpenseFields {
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl ExpenseInput {
    pub fn validate(self, today: NaiveDate) -> Result<ExpenseFields, ValidationError> {
        Ok(ExpenseFields {
            amount: amount("amount", self.amount)?,
            category: title("category", &self.category)?,
            description: self.description.unwrap_or_default().trim().to_string(),
            date: optional_date("date", self.date.as_deref())?.unwrap_or(today),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AmountInput {
    pub amount: f64,
}

impl AmountInput {
    pub fn validate(self) -> Result<f64, ValidationError> {
        amount("amount", self.amount)
    }
}

#[derive(Debug, Deserialize)]
pub struct SavingsGoalInput {
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: Option<f64>,
    #[serde(default)]
    pub deadline: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SavingsGoalFields {
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Option<NaiveDate>,
}

impl SavingsGoalInput {
    pub fn validate(self) -> Result<SavingsGoalFields, ValidationError> {
        Ok(SavingsGoalFields {
            name: title("name", &self.name)?,
            target_amount: amount("target_amount", self.target_amount)?,
            current_amount: amount("current_amount", self.current_amount.unwrap_or(0.0))?,
            deadline: optional_date("deadline", self.deadline.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct FocusTargetInput {
    pub target_sessions: i64,
}

impl FocusTargetInput {
    pub const MAX_SESSIONS: i64 = 24;

    pub fn validate(self) -> Result<i64, ValidationError> {
        if !(1..=Self::MAX_SESSIONS).contains(&self.target_sessions) {
            return Err(ValidationError::OutOfRange {
                field: "target_sessions",
                min: 1,
                max: Self::MAX_SESSIONS,
            });
        }
        Ok(self.target_sessions)
    }
}

#[derive(Debug, Deserialize)]
pub struct FocusSessionInput {
    pub delta: i64,
}

impl FocusSessionInput {
    pub fn validate(self) -> Result<i64, ValidationError> {
        if self.delta != 1 && self.delta != -1 {
            return Err(ValidationError::OutOfRange {
                field: "delta",
                min: -1,
                max: 1,
            });
        }
        Ok(self.delta)
    }
}

#[derive(Debug, Deserialize)]
pub struct ThemeInput {
    pub theme: String,
}

impl ThemeInput {
    pub fn validate(self) -> Result<&'static str, ValidationError> {
        let wanted = self.theme.trim().to_ascii_lowercase();
        THEMES
            .iter()
            .copied()
            .find(|theme| *theme == wanted)
            .ok_or(ValidationError::UnknownValue {
                field: "theme",
                value: self.theme,
            })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value.to_string())
}

fn title(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = required(field, value)?;
    if value.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TITLE_LEN,
        });
    }
    Ok(value)
}

fn amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidAmount(field));
    }
    Ok(round2(value))
}

fn color(value: Option<String>) -> String {
    match value {
        Some(color) if !color.trim().is_empty() => color.trim().to_string(),
        _ => DEFAULT_NOTE_COLOR.to_string(),
    }
}

fn optional_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    Ok(optional_timestamp(field, value)?.map(|ts| ts.date()))
}

fn optional_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDateTime>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match parse_timestamp(raw) {
            Some(ts) => Ok(Some(ts)),
            None => Err(ValidationError::InvalidDate(field)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn todo_defaults_priority_and_parses_due_date() {
        let fields = TodoInput {
            title: "  Ship it ".into(),
            description: None,
            due_date: Some("2024-01-12".into()),
            priority: None,
        }
        .validate()
        .unwrap();
        assert_eq!(fields.title, "Ship it");
        assert_eq!(fields.priority, Priority::Medium);
        assert_eq!(
            fields.due_date.map(|ts| ts.date()),
            NaiveDate::from_ymd_opt(2024, 1, 12)
        );
    }

    #[test]
    fn todo_rejects_blank_title_and_unknown_priority() {
        let blank = TodoInput {
            title: "   ".into(),
            description: None,
            due_date: None,
            priority: None,
        };
        assert_eq!(blank.validate().unwrap_err(), ValidationError::Required("title"));

        let urgent = TodoInput {
            title: "x".into(),
            description: None,
            due_date: None,
            priority: Some("urgent".into()),
        };
        assert!(matches!(
            urgent.validate().unwrap_err(),
            ValidationError::UnknownValue { field: "priority", .. }
        ));
    }

    #[test]
    fn expense_rejects_negative_amounts_and_bad_dates() {
        let negative = ExpenseInput {
            amount: -5.0,
            category: "Food".into(),
            description: None,
            date: None,
        };
        assert_eq!(
            negative.validate(today()).unwrap_err(),
            ValidationError::InvalidAmount("amount")
        );

        let bad_date = ExpenseInput {
            amount: 5.0,
            category: "Food".into(),
            description: None,
            date: Some("yesterday".into()),
        };
        assert_eq!(
            bad_date.validate(today()).unwrap_err(),
            ValidationError::InvalidDate("date")
        );
    }

    #[test]
    fn expense_defaults_to_today_and_rounds() {
        let fields = ExpenseInput {
            amount: 12.345,
            category: "Food".into(),
            description: Some("lunch".into()),
            date: Some(String::new()),
        }
        .validate(today())
        .unwrap();
        assert_eq!(fields.date, today());
        assert_eq!(fields.amount, 12.35);
    }

    #[test]
    fn register_requires_matching_passwords() {
        let form = RegisterForm {
            username: "berry".into(),
            email: "berry@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::PasswordMismatch);
    }

    #[test]
    fn theme_must_be_known() {
        let ok = ThemeInput { theme: "Mango".into() }.validate().unwrap();
        assert_eq!(ok, "mango");
        assert!(ThemeInput { theme: "grape".into() }.validate().is_err());
    }

    #[test]
    fn focus_inputs_are_bounded() {
        assert!(FocusTargetInput { target_sessions: 0 }.validate().is_err());
        assert_eq!(FocusTargetInput { target_sessions: 4 }.validate(), Ok(4));
        assert!(FocusSessionInput { delta: 2 }.validate().is_err());
        assert_eq!(FocusSessionInput { delta: -1 }.validate(), Ok(-1));
    }
}
