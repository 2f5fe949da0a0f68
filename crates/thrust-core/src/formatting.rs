use crate::models::Attribute;

/// Title prefix shared by every thrust chart.
pub const CHART_TITLE: &str = "Motor Thrust";

/// Spreadsheet-style name of a zero-based column index.
///
/// # Examples
///
/// ```
/// use thrust_core::formatting::column_name;
///
/// assert_eq!(column_name(Some(0)), "A");
/// assert_eq!(column_name(Some(25)), "Z");
/// assert_eq!(column_name(Some(26)), "AA");
/// assert_eq!(column_name(Some(701)), "ZZ");
/// assert_eq!(column_name(None), "?");
/// ```
pub fn column_name(index: Option<usize>) -> String {
    let Some(mut index) = index else {
        return "?".to_string();
    };

    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Label for an attribute that still spans several values.
///
/// # Examples
///
/// ```
/// use thrust_core::formatting::count_label;
/// use thrust_core::models::Attribute;
///
/// assert_eq!(count_label(Attribute::Author, 3), "3 authors");
/// assert_eq!(count_label(Attribute::Esc, 2), "2 ESCs");
/// ```
pub fn count_label(attr: Attribute, count: usize) -> String {
    format!("{} {}", count, attr.plural())
}

/// Join non-empty label parts with `", "`.
///
/// # Examples
///
/// ```
/// use thrust_core::formatting::join_labels;
///
/// assert_eq!(join_labels(["MotorA", "", "3S"]), "MotorA, 3S");
/// assert_eq!(join_labels(Vec::<String>::new()), "");
/// ```
pub fn join_labels<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Chart title: the fixed prefix followed by every single-valued dimension.
///
/// # Examples
///
/// ```
/// use thrust_core::formatting::chart_title;
///
/// assert_eq!(chart_title(["MotorA", "3S"]), "Motor Thrust, MotorA, 3S");
/// assert_eq!(chart_title(Vec::<&str>::new()), "Motor Thrust");
/// ```
pub fn chart_title<I, S>(fixed: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let rest = join_labels(fixed);
    if rest.is_empty() {
        CHART_TITLE.to_string()
    } else {
        format!("{}, {}", CHART_TITLE, rest)
    }
}
