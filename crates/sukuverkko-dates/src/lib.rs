//! Partial-date grammar, century inference, and display formatting.
//!
//! Recognizes the domain's partial-date forms: `dd.mm.yyyy`, `dd.mm.yy`,
//! `yyyy`, `yy`, an approximate-date marker `n <rest>` / `n<yyyy>` wrapping
//! any of the above, and opaque domain-literal strings (e.g. `"isoviha"`)
//! passed through unchanged.

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A year that may still need century inference (a bare two-digit form) or
/// may already be fully specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Year {
    Full(i32),
    TwoDigit(u32),
}

/// A date parsed from the domain's partial-date grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDate {
    FullDate { day: u32, month: u32, year: Year },
    YearOnly(Year),
    Approximate(Box<ParsedDate>),
    /// An opaque domain literal (e.g. `"isoviha"`) or any string that does
    /// not match the grammar, passed through unchanged.
    Literal(String),
}

/// Parse a raw date string per the grammar in the module docs.
pub fn parse(raw: &str) -> ParsedDate {
    let raw = raw.trim();
    if raw.is_empty() {
        return ParsedDate::Literal(String::new());
    }

    if let Some(rest) = raw.strip_prefix("n ") {
        return ParsedDate::Approximate(Box::new(parse(rest)));
    }
    if let Some(rest) = raw.strip_prefix('n')
        && rest.chars().next().is_some_and(|c| c.is_ascii_digit())
    {
        return ParsedDate::Approximate(Box::new(parse(rest)));
    }

    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() == 3
        && let (Ok(day), Ok(month)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>())
    {
        let year_str = parts[2];
        if year_str.len() == 4
            && year_str.chars().all(|c| c.is_ascii_digit())
            && let Ok(year) = year_str.parse::<i32>()
        {
            return ParsedDate::FullDate {
                day,
                month,
                year: Year::Full(year),
            };
        }
        if (1..=2).contains(&year_str.len())
            && year_str.chars().all(|c| c.is_ascii_digit())
            && let Ok(year) = year_str.parse::<u32>()
        {
            return ParsedDate::FullDate {
                day,
                month,
                year: Year::TwoDigit(year),
            };
        }
    }

    if raw.len() == 4
        && raw.chars().all(|c| c.is_ascii_digit())
        && let Ok(year) = raw.parse::<i32>()
    {
        return ParsedDate::YearOnly(Year::Full(year));
    }

    if (1..=2).contains(&raw.len())
        && raw.chars().all(|c| c.is_ascii_digit())
        && let Ok(year) = raw.parse::<u32>()
    {
        return ParsedDate::YearOnly(Year::TwoDigit(year));
    }

    ParsedDate::Literal(raw.to_string())
}

/// Given a two-digit year and an optional contextual birth year (the
/// parent's birth year when inferring a child's marriage year), choose the
/// most plausible century.
///
/// 1. Build candidates `{1600+yy, 1700+yy, 1800+yy}`.
/// 2. Choose the candidate `Y` such that `Y - B` falls in `[15, 50]`
///    (typical marriage-age window). If several satisfy that, the
///    smallest wins.
/// 3. If none satisfy it, choose the candidate minimizing distance to
///    that window.
/// 4. With no contextual birth year, default to `1700 + yy`.
pub fn infer_century(yy: u32, contextual_birth_year: Option<i32>) -> i32 {
    let yy = yy as i32;
    let candidates = [1600 + yy, 1700 + yy, 1800 + yy];

    let Some(birth_year) = contextual_birth_year else {
        return 1700 + yy;
    };

    let mut satisfying: Vec<i32> = candidates
        .iter()
        .copied()
        .filter(|&y| {
            let age = y - birth_year;
            (15..=50).contains(&age)
        })
        .collect();
    if !satisfying.is_empty() {
        satisfying.sort_unstable();
        return satisfying[0];
    }

    let distance = |y: i32| -> i32 {
        let age = y - birth_year;
        if age < 15 {
            15 - age
        } else {
            age - 50
        }
    };

    let mut best = candidates[0];
    let mut best_distance = distance(best);
    for &candidate in &candidates[1..] {
        let d = distance(candidate);
        if d < best_distance || (d == best_distance && candidate < best) {
            best = candidate;
            best_distance = d;
        }
    }
    best
}

fn resolve_year(year: Year, contextual_birth_year: Option<i32>) -> i32 {
    match year {
        Year::Full(y) => y,
        Year::TwoDigit(yy) => infer_century(yy, contextual_birth_year),
    }
}

/// Render a `ParsedDate` for display.
///
/// - Full dates render as `D Month YYYY`.
/// - Approximate dates render as `abt YYYY` when the payload is a
///   year-only form, else the payload is formatted first and the result
///   is prefixed with `abt `.
/// - Year-only literals render as-is (just the resolved year number).
/// - Domain literals pass through unchanged.
pub fn format(date: &ParsedDate, contextual_birth_year: Option<i32>) -> String {
    match date {
        ParsedDate::Literal(s) => s.clone(),
        ParsedDate::YearOnly(y) => resolve_year(*y, contextual_birth_year).to_string(),
        ParsedDate::FullDate { day, month, year } => {
            let y = resolve_year(*year, contextual_birth_year);
            let month_name = MONTH_NAMES
                .get((*month as usize).wrapping_sub(1))
                .copied()
                .unwrap_or("");
            format!("{day} {month_name} {y}")
        }
        ParsedDate::Approximate(inner) => match inner.as_ref() {
            ParsedDate::YearOnly(y) => format!("abt {}", resolve_year(*y, contextual_birth_year)),
            other => format!("abt {}", format(other, contextual_birth_year)),
        },
    }
}

/// Parse and format `raw` in one step. Convenience wrapper around
/// [`parse`] + [`format`].
pub fn format_str(raw: &str, contextual_birth_year: Option<i32>) -> String {
    format(&parse(raw), contextual_birth_year)
}

/// The resolved calendar year of a date, if the grammar form carries one
/// (full dates and year-only forms, including through an approximate
/// wrapper). `None` for domain literals.
pub fn year_of(date: &ParsedDate, contextual_birth_year: Option<i32>) -> Option<i32> {
    match date {
        ParsedDate::Literal(_) => None,
        ParsedDate::YearOnly(y) => Some(resolve_year(*y, contextual_birth_year)),
        ParsedDate::FullDate { year, .. } => Some(resolve_year(*year, contextual_birth_year)),
        ParsedDate::Approximate(inner) => year_of(inner, contextual_birth_year),
    }
}

/// Extract just the (possibly century-inferred) marriage year from a raw
/// shorthand date string, e.g. `extract_marriage_year("78", Some(1760))
/// == Some("1778")`.
pub fn extract_marriage_year(raw: &str, contextual_birth_year: Option<i32>) -> Option<String> {
    year_of(&parse(raw), contextual_birth_year).map(|y| y.to_string())
}
