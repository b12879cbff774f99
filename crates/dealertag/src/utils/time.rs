use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

const DATE_INPUTS: [&[BorrowedFormatItem<'static>]; 5] = [
    format_description!("[year]-[month]-[day]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!(
        "[month repr:long case_sensitive:false] [day padding:none], [year]"
    ),
    format_description!(
        "[month repr:short case_sensitive:false] [day padding:none], [year]"
    ),
    format_description!(
        "[day padding:none] [month repr:long case_sensitive:false] [year]"
    ),
];

/// Reformats a displayed date as `MM/DD/YYYY`.
///
/// Accepts ISO dates, US slash dates and `March 5, 2024` style text. Returns
/// `None` for anything else.
#[must_use]
pub fn format_us_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = DATE_INPUTS
        .iter()
        .find_map(|format| Date::parse(raw, format).ok())?;
    Some(format!(
        "{:02}/{:02}/{}",
        u8::from(date.month()),
        date.day(),
        date.year()
    ))
}
