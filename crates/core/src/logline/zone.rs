use once_cell::sync::Lazy;
use regex::Regex;

/// Parse a `01` (zone change) network log record.
///
/// The zone identifier is written in hexadecimal, e.g.
/// `01|2021-11-25T08:00:00.0000000+00:00|384|Ocean Fishing|...` is zone 900.
pub fn parse_zone_change(line: &str) -> Option<u32> {
    static ZONE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^01\|[^|]*\|([0-9A-Fa-f]{1,8})\|").expect("invalid zone change regex")
    });

    let caps = ZONE_RE.captures(line)?;
    u32::from_str_radix(caps.get(1)?.as_str(), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_zone_id() {
        let line = "01|2021-11-25T08:00:00.0000000+00:00|384|The Endeavor|0123abcd";
        assert_eq!(parse_zone_change(line), Some(900));
        let lower = "01|2021-11-25T08:00:00.0000000+00:00|3a2|Limsa Lominsa|";
        assert_eq!(parse_zone_change(lower), Some(0x3a2));
    }

    #[test]
    fn ignores_other_records() {
        assert_eq!(parse_zone_change(""), None);
        assert_eq!(parse_zone_change("00|2021|384||You cast your line|"), None);
        assert_eq!(parse_zone_change("01|2021|zone|Nowhere|"), None);
        assert_eq!(parse_zone_change("01|2021|123456789|Too Long|"), None);
    }
}
