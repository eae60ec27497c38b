//! Filename grammar for parameter-encoded figures.
//!
//! A conforming filename looks like `amp=1.0_g1=-3_k0=3.14.png`: one or more
//! `name=value` segments joined by `_`, followed by a `png`, `jpg` or `gif`
//! extension.

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "gif"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    /// `None` when the text does not fit in a finite `f64`.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

/// Splits a filename into its ordered `(name, value)` pairs.
///
/// Returns `None` for anything that is not made up entirely of parameter
/// segments plus a recognized extension.
pub fn parse_parameter_filename(filename: &str) -> Option<Vec<Parameter>> {
    let (stem, extension) = filename.rsplit_once('.')?;
    if !IMAGE_EXTENSIONS.contains(&extension) {
        return None;
    }

    let mut parameters = Vec::new();
    for segment in stem.split('_') {
        let (name, value) = segment.split_once('=')?;
        if !is_parameter_name(name) || !is_decimal_literal(value) {
            return None;
        }
        parameters.push(Parameter {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    if parameters.is_empty() {
        None
    } else {
        Some(parameters)
    }
}

fn is_parameter_name(name: &str) -> bool {
    let letters = name
        .bytes()
        .take_while(|byte| byte.is_ascii_alphabetic())
        .count();
    letters > 0 && name.bytes().skip(letters).all(|byte| byte.is_ascii_digit())
}

// [+-]? (digits ('.' digits)? | '.' digits)
fn is_decimal_literal(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('+')
        .or_else(|| value.strip_prefix('-'))
        .unwrap_or(value);

    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    match fraction {
        Some(fraction) => all_digits(integer) && !fraction.is_empty() && all_digits(fraction),
        None => !integer.is_empty() && all_digits(integer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_and_values(filename: &str) -> Vec<(String, f64)> {
        parse_parameter_filename(filename)
            .expect("filename should parse")
            .into_iter()
            .map(|parameter| {
                let value = parameter.numeric_value().expect("value should be numeric");
                (parameter.name, value)
            })
            .collect()
    }

    #[test]
    fn parses_names_and_values_in_filename_order() {
        let parsed = names_and_values("amp=1.0_g1=-3_k0=3.14.png");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].0, "amp");
        assert_eq!(parsed[1].0, "g1");
        assert_eq!(parsed[2].0, "k0");
        assert!((parsed[0].1 - 1.0).abs() < 1e-12);
        assert!((parsed[1].1 + 3.0).abs() < 1e-12);
        assert!((parsed[2].1 - 3.14).abs() < 1e-12);
    }

    #[test]
    fn keeps_value_text_verbatim() {
        let parsed = parse_parameter_filename("amp4=+1.37.gif").expect("filename should parse");
        assert_eq!(
            parsed,
            vec![Parameter {
                name: "amp4".to_string(),
                value: "+1.37".to_string(),
            }]
        );
        assert_eq!(parsed[0].numeric_value(), Some(1.37));
    }

    #[test]
    fn accepts_fraction_without_integer_part() {
        let parsed = names_and_values("p=.5_q=-.25.jpg");
        assert_eq!(parsed, vec![("p".to_string(), 0.5), ("q".to_string(), -0.25)]);
    }

    #[test]
    fn rejects_missing_or_unknown_extension() {
        assert!(parse_parameter_filename("amp=1.0_g=2").is_none());
        assert!(parse_parameter_filename("amp=1.0_g=2.bmp").is_none());
        assert!(parse_parameter_filename("amp=1.0_g=2.PNG").is_none());
    }

    #[test]
    fn rejects_non_parameter_segments() {
        assert!(parse_parameter_filename("fig_amp=1.png").is_none());
        assert!(parse_parameter_filename("amp=1_final.png").is_none());
        assert!(parse_parameter_filename("amp=1__g=2.png").is_none());
    }

    #[test]
    fn rejects_filenames_without_segments() {
        assert!(parse_parameter_filename(".png").is_none());
        assert!(parse_parameter_filename("figure.png").is_none());
        assert!(parse_parameter_filename("").is_none());
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(parse_parameter_filename("1amp=1.png").is_none());
        assert!(parse_parameter_filename("a1b=1.png").is_none());
        assert!(parse_parameter_filename("=1.png").is_none());
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(parse_parameter_filename("amp=.png").is_none());
        assert!(parse_parameter_filename("amp=1..png").is_none());
        assert!(parse_parameter_filename("amp=+.png").is_none());
        assert!(parse_parameter_filename("amp=1e3.png").is_none());
        assert!(parse_parameter_filename("amp=--1.png").is_none());
        assert!(parse_parameter_filename("amp=1=2.png").is_none());
    }

    #[test]
    fn overflowing_values_have_no_numeric_value() {
        let filename = format!("a=1{}.png", "0".repeat(400));
        let parsed = parse_parameter_filename(&filename).expect("filename should parse");
        assert_eq!(parsed[0].numeric_value(), None);
    }

    #[test]
    fn names_are_case_sensitive() {
        let upper = names_and_values("Amp=1.png");
        let lower = names_and_values("amp=1.png");
        assert_ne!(upper[0].0, lower[0].0);
    }
}
