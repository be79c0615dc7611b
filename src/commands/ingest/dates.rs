use super::*;

const NUMERIC_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

pub fn parse_added_on(raw: &str) -> Option<NaiveDateTime> {
    let composed = raw.nfc().collect::<String>();
    let trimmed = composed.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in NUMERIC_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    let text = trimmed
        .to_lowercase()
        .replace("p. m.", "pm")
        .replace("a. m.", "am")
        .replace("p.m.", "pm")
        .replace("a.m.", "am");

    let mut year = None;
    let mut month = None;
    let mut day = None;
    let mut time = None;
    let mut meridiem = None;

    for token in text
        .split(|character: char| character.is_whitespace() || character == ',')
        .map(|token| token.trim_matches(|character: char| character == '.' || character == ','))
        .filter(|token| !token.is_empty())
    {
        if token.contains(':') {
            if time.is_none() {
                time = parse_clock(token);
            }
            continue;
        }

        match token {
            "am" => {
                meridiem = Some(Meridiem::Am);
                continue;
            }
            "pm" => {
                meridiem = Some(Meridiem::Pm);
                continue;
            }
            _ => {}
        }

        if token.chars().all(|character| character.is_ascii_digit()) {
            let Ok(value) = token.parse::<u32>() else {
                continue;
            };
            if token.len() == 4 && year.is_none() {
                year = Some(value as i32);
            } else if day.is_none() && (1..=31).contains(&value) {
                day = Some(value);
            }
            continue;
        }

        if month.is_none() {
            month = month_from_name(token);
        }
    }

    let (mut hour, minute, second) = time.unwrap_or((0, 0, 0));
    match meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour += 12,
        Some(Meridiem::Am) if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveDate::from_ymd_opt(year?, month?, day?)?.and_hms_opt(hour, minute, second)
}

fn parse_clock(token: &str) -> Option<(u32, u32, u32)> {
    let mut parts = token.split(':').map(|part| part.parse::<u32>().ok());
    let hour = parts.next()??;
    let minute = parts.next()??;
    let second = match parts.next() {
        Some(value) => value?,
        None => 0,
    };
    Some((hour, minute, second))
}

fn month_from_name(token: &str) -> Option<u32> {
    let month = match token {
        "january" | "jan" | "enero" | "janvier" | "januar" | "jänner" | "gennaio" | "janeiro" => 1,
        "february" | "feb" | "febrero" | "février" | "fevrier" | "februar" | "febbraio"
        | "fevereiro" => 2,
        "march" | "mar" | "marzo" | "mars" | "märz" | "maerz" | "março" | "marco" => 3,
        "april" | "apr" | "abril" | "avril" | "aprile" => 4,
        "may" | "mayo" | "mai" | "maggio" | "maio" => 5,
        "june" | "jun" | "junio" | "juin" | "juni" | "giugno" | "junho" => 6,
        "july" | "jul" | "julio" | "juillet" | "juli" | "luglio" | "julho" => 7,
        "august" | "aug" | "agosto" | "août" | "aout" => 8,
        "september" | "sep" | "sept" | "septiembre" | "setiembre" | "septembre" | "settembre"
        | "setembro" => 9,
        "october" | "oct" | "octubre" | "octobre" | "oktober" | "ottobre" | "outubro" => 10,
        "november" | "nov" | "noviembre" | "novembre" | "novembro" => 11,
        "december" | "dec" | "diciembre" | "décembre" | "decembre" | "dezember" | "dicembre"
        | "dezembro" => 12,
        _ => return None,
    };
    Some(month)
}
