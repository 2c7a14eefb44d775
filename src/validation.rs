use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::passenger::PaxType;
use crate::error::FieldError;

/// Every traveler must be at least this old on the departure date.
pub const MIN_AGE_DAYS_AT_DEPARTURE: i64 = 14;
/// Child age band in whole years, inclusive on both ends. A passenger who
/// is exactly two travels as a child, not an infant.
pub const CHILD_MIN_YEARS: u32 = 2;
pub const CHILD_MAX_YEARS: u32 = 15;
/// Minimum digits in a contact phone number, spaces removed.
pub const MIN_PHONE_DIGITS: usize = 6;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One submitted passenger record, exactly as the form posted it. Fields
/// are kept as strings so validation can report per-field errors instead
/// of failing at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub wheelchair_ssr: String,
    #[serde(default)]
    pub wheelchair_type: String,
}

impl PassengerForm {
    pub fn is_blank(&self) -> bool {
        [
            &self.title,
            &self.first_name,
            &self.last_name,
            &self.date_of_birth,
            &self.contact_number,
            &self.contact_email,
            &self.wheelchair_ssr,
            &self.wheelchair_type,
        ]
        .iter()
        .all(|f| f.trim().is_empty())
    }

    pub fn parsed_date_of_birth(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_of_birth.trim(), DATE_FORMAT).ok()
    }
}

/// Booking-level context the date rules are checked against.
#[derive(Debug, Clone, Copy)]
pub struct TripContext {
    pub today: NaiveDate,
    pub departure: NaiveDate,
    /// Set only for round trips.
    pub return_date: Option<NaiveDate>,
}

/// Validate one passenger record. All violations are collected; nothing
/// short-circuits except the blank-form case, where no further rules run.
pub fn validate_passenger(
    form: &PassengerForm,
    category: PaxType,
    sequence: u16,
    ctx: &TripContext,
) -> Vec<FieldError> {
    if form.is_blank() {
        return vec![FieldError::new("form", "Passenger details are missing")];
    }

    let mut errors = Vec::new();

    validate_name("first_name", &form.first_name, &mut errors);
    validate_name("last_name", &form.last_name, &mut errors);

    match category {
        PaxType::Adult => {
            validate_contacts(form, sequence, &mut errors);
            // Adults may omit their date of birth, but a supplied one
            // must still be a real past date.
            if !form.date_of_birth.trim().is_empty() {
                validate_past_date(form, ctx, &mut errors);
            }
        }
        PaxType::Child | PaxType::Infant => {
            validate_date_of_birth(form, category, ctx, &mut errors);
        }
    }

    errors
}

/// Validate a whole category group, prefixing each error with
/// `{group}[{index}].` so the caller can merge the three groups. A group
/// whose every record is blank collapses to a single group-level error.
pub fn validate_formset(
    forms: &[PassengerForm],
    category: PaxType,
    first_sequence: u16,
    ctx: &TripContext,
) -> Vec<FieldError> {
    let group = group_name(category);

    if !forms.is_empty() && forms.iter().all(PassengerForm::is_blank) {
        return vec![FieldError::new(group, "At least one passenger is required")];
    }

    let mut errors = Vec::new();
    for (idx, form) in forms.iter().enumerate() {
        let sequence = first_sequence + idx as u16;
        for err in validate_passenger(form, category, sequence, ctx) {
            errors.push(FieldError::new(
                format!("{}[{}].{}", group, idx, err.field),
                err.message,
            ));
        }
    }
    errors
}

pub fn group_name(category: PaxType) -> &'static str {
    match category {
        PaxType::Adult => "adults",
        PaxType::Child => "children",
        PaxType::Infant => "infants",
    }
}

fn validate_name(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, "Name is required"));
    } else if !valid_name(value) {
        errors.push(FieldError::new(
            field,
            "Names must start and end with a letter and may only contain letters, apostrophes and hyphens",
        ));
    }
}

/// Starts and ends with a letter; interior characters limited to letters,
/// apostrophe and hyphen. Single-letter names are allowed.
fn valid_name(value: &str) -> bool {
    let mut chars = value.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !first.is_alphabetic() {
        return false;
    }
    let rest: Vec<char> = chars.collect();
    match rest.last() {
        None => true,
        Some(&last) => {
            last.is_alphabetic()
                && rest[..rest.len() - 1]
                    .iter()
                    .all(|&c| c.is_alphabetic() || c == '\'' || c == '-')
        }
    }
}

fn validate_contacts(form: &PassengerForm, sequence: u16, errors: &mut Vec<FieldError>) {
    let phone = form.contact_number.trim();
    let email = form.contact_email.trim();

    // The sequence-1 adult is the principal passenger and must be reachable.
    if sequence == 1 && phone.is_empty() && email.is_empty() {
        errors.push(FieldError::new(
            "contact_number",
            "A contact phone or email is required for the principal passenger",
        ));
    }

    if !phone.is_empty() {
        let digits: String = phone.chars().filter(|c| *c != ' ').collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) || digits.len() < MIN_PHONE_DIGITS {
            errors.push(FieldError::new(
                "contact_number",
                "Contact number must be at least 6 digits",
            ));
        }
    }

    if !email.is_empty() && !valid_email(email) {
        errors.push(FieldError::new("contact_email", "Invalid email address"));
    }
}

fn valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Any supplied date of birth must parse and be strictly in the past.
/// Pushes errors and returns the parsed date when usable.
fn validate_past_date(
    form: &PassengerForm,
    ctx: &TripContext,
    errors: &mut Vec<FieldError>,
) -> Option<NaiveDate> {
    let dob = match form.parsed_date_of_birth() {
        Some(d) => d,
        None => {
            errors.push(FieldError::new("date_of_birth", "Invalid date of birth"));
            return None;
        }
    };
    if dob >= ctx.today {
        errors.push(FieldError::new(
            "date_of_birth",
            "Date of birth must be in the past",
        ));
        return None;
    }
    Some(dob)
}

fn validate_date_of_birth(
    form: &PassengerForm,
    category: PaxType,
    ctx: &TripContext,
    errors: &mut Vec<FieldError>,
) {
    if form.date_of_birth.trim().is_empty() {
        errors.push(FieldError::new("date_of_birth", "Date of birth is required"));
        return;
    }
    let dob = match validate_past_date(form, ctx, errors) {
        Some(d) => d,
        None => return,
    };

    if (ctx.departure - dob).num_days() < MIN_AGE_DAYS_AT_DEPARTURE {
        errors.push(FieldError::new(
            "date_of_birth",
            "Passengers must be at least 14 days old on the departure date",
        ));
    }

    check_age_band(dob, category, ctx.departure, "departure", errors);
    if let Some(return_date) = ctx.return_date {
        check_age_band(dob, category, return_date, "return", errors);
    }
}

fn check_age_band(
    dob: NaiveDate,
    category: PaxType,
    on: NaiveDate,
    leg: &str,
    errors: &mut Vec<FieldError>,
) {
    let years = on.years_since(dob).unwrap_or(0);
    let message = match category {
        PaxType::Child if years < CHILD_MIN_YEARS => Some(format!(
            "Under 2 years old on the {} date; book this passenger as an infant",
            leg
        )),
        PaxType::Child if years > CHILD_MAX_YEARS => Some(format!(
            "Over 15 years old on the {} date; book this passenger as an adult or choose a one-way trip",
            leg
        )),
        PaxType::Infant if years >= CHILD_MIN_YEARS => Some(format!(
            "2 years or older on the {} date; book this passenger as a child or choose a one-way trip",
            leg
        )),
        _ => None,
    };
    if let Some(message) = message {
        errors.push(FieldError::new("date_of_birth", message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TripContext {
        TripContext {
            today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            departure: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            return_date: None,
        }
    }

    fn round_trip(return_date: (i32, u32, u32)) -> TripContext {
        TripContext {
            return_date: Some(
                NaiveDate::from_ymd_opt(return_date.0, return_date.1, return_date.2).unwrap(),
            ),
            ..ctx()
        }
    }

    fn adult(first: &str, last: &str, phone: &str, email: &str) -> PassengerForm {
        PassengerForm {
            title: "Mr".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            contact_number: phone.to_string(),
            contact_email: email.to_string(),
            ..Default::default()
        }
    }

    fn minor(dob: &str) -> PassengerForm {
        PassengerForm {
            title: "Miss".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Lee".to_string(),
            date_of_birth: dob.to_string(),
            ..Default::default()
        }
    }

    fn messages(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_accepts_short_names() {
        let form = adult("Jo", "Li", "123456", "");
        assert!(validate_passenger(&form, PaxType::Adult, 1, &ctx()).is_empty());

        // Length-1 names are allowed
        let form = adult("J", "Li", "123456", "");
        assert!(validate_passenger(&form, PaxType::Adult, 1, &ctx()).is_empty());
    }

    #[test]
    fn test_rejects_empty_and_malformed_names() {
        let form = adult("", "Li", "123456", "");
        let errors = validate_passenger(&form, PaxType::Adult, 1, &ctx());
        assert_eq!(errors[0].field, "first_name");
        assert_eq!(errors[0].message, "Name is required");

        for bad in ["J0e", "-Ann", "Ann-", "'Neil", "O Neil", "Jo3-Li"] {
            let form = adult(bad, "Li", "123456", "");
            let errors = validate_passenger(&form, PaxType::Adult, 1, &ctx());
            assert!(
                errors.iter().any(|e| e.field == "first_name"),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_accepts_apostrophes_and_hyphens_inside_names() {
        for good in ["O'Brien", "Anne-Marie", "D'Arcy-Jones"] {
            let form = adult(good, "Li", "123456", "");
            assert!(
                validate_passenger(&form, PaxType::Adult, 1, &ctx()).is_empty(),
                "expected {:?} to pass",
                good
            );
        }
    }

    #[test]
    fn test_principal_passenger_needs_a_contact() {
        let form = adult("Jo", "Li", "", "");
        let errors = validate_passenger(&form, PaxType::Adult, 1, &ctx());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "contact_number");

        // Any other adult may leave both blank
        assert!(validate_passenger(&form, PaxType::Adult, 2, &ctx()).is_empty());
    }

    #[test]
    fn test_phone_needs_six_digits_spaces_ignored() {
        let form = adult("Jo", "Li", "12 34 56", "");
        assert!(validate_passenger(&form, PaxType::Adult, 1, &ctx()).is_empty());

        let form = adult("Jo", "Li", "12345", "");
        let errors = validate_passenger(&form, PaxType::Adult, 1, &ctx());
        assert_eq!(errors[0].field, "contact_number");

        let form = adult("Jo", "Li", "12345a", "");
        assert!(!validate_passenger(&form, PaxType::Adult, 1, &ctx()).is_empty());
    }

    #[test]
    fn test_email_syntax() {
        let form = adult("Jo", "Li", "", "jo@example.com");
        assert!(validate_passenger(&form, PaxType::Adult, 1, &ctx()).is_empty());

        for bad in ["jo", "jo@", "@example.com", "jo@nodot", "jo @example.com"] {
            let form = adult("Jo", "Li", "", bad);
            let errors = validate_passenger(&form, PaxType::Adult, 1, &ctx());
            assert!(
                errors.iter().any(|e| e.field == "contact_email"),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_blank_form_reports_once_and_stops() {
        let errors = validate_passenger(&PassengerForm::default(), PaxType::Adult, 1, &ctx());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "form");
    }

    #[test]
    fn test_infant_fourteen_day_rule() {
        // Departing 2024-06-05; born 2024-05-30 is six days old
        let ctx = TripContext {
            departure: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            ..ctx()
        };
        let errors = validate_passenger(&minor("2024-05-30"), PaxType::Infant, 3, &ctx);
        assert!(messages(&errors).iter().any(|m| m.contains("14 days")));

        // Fourteen days old on the dot is allowed
        assert!(validate_passenger(&minor("2024-05-22"), PaxType::Infant, 3, &ctx).is_empty());
    }

    #[test]
    fn test_infant_band_boundaries_at_departure() {
        // One day short of two years: still an infant
        assert!(validate_passenger(&minor("2022-06-16"), PaxType::Infant, 3, &ctx()).is_empty());

        // Exactly two years old on departure day: no longer an infant
        let errors = validate_passenger(&minor("2022-06-15"), PaxType::Infant, 3, &ctx());
        assert!(messages(&errors).iter().any(|m| m.contains("as a child")));

        // But valid as a child
        assert!(validate_passenger(&minor("2022-06-15"), PaxType::Child, 3, &ctx()).is_empty());
    }

    #[test]
    fn test_child_band_boundaries_at_departure() {
        // 15 years old: still a child
        assert!(validate_passenger(&minor("2009-06-14"), PaxType::Child, 2, &ctx()).is_empty());

        // 16 on departure day: must fly as an adult
        let errors = validate_passenger(&minor("2008-06-15"), PaxType::Child, 2, &ctx());
        assert!(messages(&errors).iter().any(|m| m.contains("as an adult")));

        // Under two: must fly as an infant
        let errors = validate_passenger(&minor("2023-06-15"), PaxType::Child, 2, &ctx());
        assert!(messages(&errors).iter().any(|m| m.contains("as an infant")));
    }

    #[test]
    fn test_bands_rechecked_against_return_date() {
        // Infant turns two between the legs
        let ctx = round_trip((2024, 6, 30));
        let form = minor("2022-06-20");
        let errors = validate_passenger(&form, PaxType::Infant, 3, &ctx);
        assert!(messages(&errors).iter().any(|m| m.contains("return")));

        // Child turns sixteen between the legs
        let form = minor("2008-06-20");
        let errors = validate_passenger(&form, PaxType::Child, 2, &ctx);
        assert!(messages(&errors).iter().any(|m| m.contains("return")));

        // Same traveler is fine one-way
        assert!(validate_passenger(&form, PaxType::Child, 2, &self::ctx()).is_empty());
    }

    #[test]
    fn test_dob_must_be_a_past_calendar_date() {
        let errors = validate_passenger(&minor("not-a-date"), PaxType::Child, 2, &ctx());
        assert_eq!(messages(&errors), vec!["Invalid date of birth"]);

        // Today is rejected
        let errors = validate_passenger(&minor("2024-06-01"), PaxType::Infant, 3, &ctx());
        assert_eq!(messages(&errors), vec!["Date of birth must be in the past"]);

        let errors = validate_passenger(&minor(""), PaxType::Child, 2, &ctx());
        assert_eq!(messages(&errors), vec!["Date of birth is required"]);
    }

    #[test]
    fn test_violations_are_collected_not_short_circuited() {
        let form = PassengerForm {
            first_name: "J0".to_string(),
            last_name: String::new(),
            date_of_birth: "2024-06-10".to_string(),
            ..Default::default()
        };
        let errors = validate_passenger(&form, PaxType::Infant, 3, &ctx());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"first_name"));
        assert!(fields.contains(&"last_name"));
        assert!(fields.contains(&"date_of_birth"));
    }

    #[test]
    fn test_formset_prefixes_and_all_blank_group() {
        let ctx = ctx();
        let forms = vec![PassengerForm::default(), PassengerForm::default()];
        let errors = validate_formset(&forms, PaxType::Adult, 1, &ctx);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "adults");

        let forms = vec![adult("Jo", "Li", "123456", ""), adult("", "Li", "", "")];
        let errors = validate_formset(&forms, PaxType::Adult, 1, &ctx);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "adults[1].first_name");
    }
}
