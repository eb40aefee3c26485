use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid format for '{0}'. Expected 'KEY=VALUE' (e.g., 'PF6=2.6').")]
    InvalidKeyValue(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },

    #[error("Invalid number '{value}' for '{key}'.")]
    InvalidNumber { key: String, value: String },
}

/// Splits `KEY=VALUE` at the first `=`, trimming whitespace around both parts.
pub fn parse_key_value(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidKeyValue(input.to_string()))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: input.to_string(),
        });
    }
    if value.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "value",
            input: input.to_string(),
        });
    }
    Ok((key, value))
}

/// Parses a `NAME=RADIUS` solvent radius override.
pub fn parse_radius(input: &str) -> Result<(String, f64), ParseError> {
    let (name, value) = parse_key_value(input)?;
    let radius = value.parse().map_err(|_| ParseError::InvalidNumber {
        key: name.to_string(),
        value: value.to_string(),
    })?;
    Ok((name.to_string(), radius))
}

/// Splits a comma-separated list, dropping empty entries.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_splits_at_first_equals_sign() {
        assert_eq!(parse_key_value("radii.EC=2.4"), Ok(("radii.EC", "2.4")));
        assert_eq!(parse_key_value(" a = b=c "), Ok(("a", "b=c")));
    }

    #[test]
    fn key_value_without_equals_sign_is_rejected() {
        assert_eq!(
            parse_key_value("radii.EC"),
            Err(ParseError::InvalidKeyValue("radii.EC".to_string()))
        );
    }

    #[test]
    fn key_value_with_empty_part_is_rejected() {
        assert!(matches!(
            parse_key_value("=2.4"),
            Err(ParseError::EmptyComponent { component: "key", .. })
        ));
        assert!(matches!(
            parse_key_value("EC="),
            Err(ParseError::EmptyComponent { component: "value", .. })
        ));
    }

    #[test]
    fn radius_parses_name_and_value() {
        assert_eq!(parse_radius("PF6=2.6"), Ok(("PF6".to_string(), 2.6)));
        assert_eq!(
            parse_radius("PF6=wide"),
            Err(ParseError::InvalidNumber {
                key: "PF6".to_string(),
                value: "wide".to_string()
            })
        );
    }

    #[test]
    fn list_trims_and_skips_empty_entries() {
        assert_eq!(parse_list("speciation, pairing,,"), vec!["speciation", "pairing"]);
        assert!(parse_list("").is_empty());
    }
}
